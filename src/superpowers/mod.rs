//! Variant layer: charges, the ability catalogue, the preview/commit protocol and
//! fortress zones.
//!
//! [`Superpowers`] only holds the variant state. [`crate::game_logic::GameEngine`]
//! decides when its hooks run relative to the base rules.

mod ability;
mod fortress;

pub use ability::{Ability, Activation};
pub use fortress::FortressZone;

use shakmaty::{Bitboard, ByColor, Color, Role, Square};
use thiserror::Error;

use crate::board::{Board, file_delta};
use crate::config::GameConfig;
use crate::movegen::is_in_check;
use crate::outcome::Outcome;

/// Why a superpower command was refused. Refusals never change game state,
/// except that a failed commit ends the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PowerError {
    #[error("superpowers are disabled in this game")]
    Disabled,
    #[error("game is over: {0}")]
    GameOver(Outcome),
    #[error("no piece on {0}")]
    EmptySquare(Square),
    #[error("piece on {0} does not belong to the side to move")]
    NotYourTurn(Square),
    #[error("no charges left")]
    NoCharges,
    #[error("piece on {0} has no usable target")]
    NoTargets(Square),
    #[error("no superpower is being previewed")]
    NoPreview,
    #[error("{0} is not a target of this ability")]
    NotATarget(Square),
    #[error("cannot land on own piece on {0}")]
    FriendlyTarget(Square),
    #[error("king cannot swap with itself")]
    SelfSwap,
    #[error("king on {0} cannot be captured")]
    KingNotCapturable(Square),
    #[error("piece on {0} changed since the preview began")]
    StalePreview(Square),
}

/// A staged ability waiting for commit or cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preview {
    pub from: Square,
    pub ability: Ability,
    pub targets: Bitboard,
}

/// Per-game variant state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Superpowers {
    charges: ByColor<u8>,
    zones: Vec<FortressZone>,
    preview: Option<Preview>,
    /// Whose king was in check right after the last real half-move.
    recently_checked: ByColor<bool>,
    max_charges: u8,
    fortress_ttl: u8,
}

impl Superpowers {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            charges: ByColor { white: 0, black: 0 },
            zones: Vec::new(),
            preview: None,
            recently_checked: ByColor {
                white: false,
                black: false,
            },
            max_charges: config.max_charges,
            fortress_ttl: config.fortress_ttl,
        }
    }

    #[inline]
    pub fn charges(&self, color: Color) -> u8 {
        *self.charges.get(color)
    }

    /// Set a side's charges directly, clamped to the cap.
    pub fn set_charges(&mut self, color: Color, charges: u8) {
        *self.charges.get_mut(color) = charges.min(self.max_charges);
    }

    #[inline]
    pub fn zones(&self) -> &[FortressZone] {
        &self.zones
    }

    #[inline]
    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn king_recently_checked(&self, color: Color) -> bool {
        *self.recently_checked.get(color)
    }

    /// Reward a capturing ordinary move.
    pub(crate) fn earn(&mut self, color: Color) {
        let charges = self.charges.get_mut(color);
        *charges = charges.saturating_add(1).min(self.max_charges);
    }

    pub(crate) fn spend(&mut self, color: Color) -> Result<(), PowerError> {
        let charges = self.charges.get_mut(color);
        *charges = charges.checked_sub(1).ok_or(PowerError::NoCharges)?;
        Ok(())
    }

    pub(crate) fn stage(&mut self, preview: Preview) {
        self.preview = Some(preview);
    }

    pub(crate) fn take_preview(&mut self) -> Option<Preview> {
        self.preview.take()
    }

    pub(crate) fn raise_zone(&mut self, owner: Color, center: Square) {
        self.zones
            .push(FortressZone::around(owner, center, self.fortress_ttl));
    }

    /// Run after every real half-move, whoever made it.
    ///
    /// Every zone ages by one; a zone raised by the half-move itself is added afterwards,
    /// so it stands for the next `fortress_ttl` half-moves.
    pub(crate) fn after_half_move(&mut self, board: &Board) {
        self.zones.retain_mut(FortressZone::tick);
        for color in Color::ALL {
            *self.recently_checked.get_mut(color) = is_in_check(board, color);
        }
    }

    /// Prune ordinary destinations for a `color` piece of `role` on `from`.
    ///
    /// Opponent fortress zones are off limits, and a king that was just in check
    /// may not castle.
    pub fn restrict(&self, color: Color, role: Role, from: Square, targets: Bitboard) -> Bitboard {
        targets
            .into_iter()
            .filter(|&to| !self.zones.iter().any(|zone| zone.blocks(color, to)))
            .filter(|&to| {
                !(role == Role::King
                    && self.king_recently_checked(color)
                    && from.rank() == to.rank()
                    && file_delta(from, to).abs() == 2)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    fn powers() -> Superpowers {
        Superpowers::new(&GameConfig::default())
    }

    quickcheck! {
        fn test_charges_stay_in_bounds(ops: Vec<bool>) -> bool {
            let mut powers = powers();
            ops.into_iter().all(|earn| {
                if earn {
                    powers.earn(Color::White);
                } else {
                    let _ = powers.spend(Color::White);
                }
                powers.charges(Color::White) <= 3
            })
        }
    }

    #[test]
    fn test_spend_without_charges_fails() {
        let mut powers = powers();
        assert_eq!(powers.spend(Color::Black), Err(PowerError::NoCharges));
        powers.earn(Color::Black);
        assert_eq!(powers.spend(Color::Black), Ok(()));
        assert_eq!(powers.charges(Color::Black), 0);
    }

    #[test]
    fn test_zone_lasts_two_half_moves() {
        let mut powers = powers();
        let board = Board::standard();
        powers.raise_zone(Color::Black, Square::D7);
        powers.after_half_move(&board);
        assert_eq!(powers.zones()[0].ttl(), 1);
        powers.after_half_move(&board);
        assert!(powers.zones().is_empty());
    }

    #[test]
    fn test_restrict_drops_zone_squares() {
        let mut powers = powers();
        powers.raise_zone(Color::Black, Square::E5);
        let targets = Bitboard::from_square(Square::E4) | Bitboard::from_square(Square::E3);
        let allowed = powers.restrict(Color::White, Role::Queen, Square::E1, targets);
        assert_eq!(allowed, Bitboard::from_square(Square::E3));
        assert_eq!(
            powers.restrict(Color::Black, Role::Queen, Square::E8, targets),
            targets
        );
    }

    #[test]
    fn test_restrict_forbids_castling_after_check() {
        let mut powers = powers();
        let checked = crate::position::Position::from_fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1")
            .expect("valid FEN");
        powers.after_half_move(checked.board());
        assert!(powers.king_recently_checked(Color::White));

        let targets = Bitboard::from_square(Square::G1) | Bitboard::from_square(Square::F1);
        assert_eq!(
            powers.restrict(Color::White, Role::King, Square::E1, targets),
            Bitboard::from_square(Square::F1)
        );
    }
}
