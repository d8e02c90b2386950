use std::fmt;

use shakmaty::{Bitboard, Color, Piece, Role, Square, attacks};

use super::PowerError;
use crate::board::{Board, MoveFlags, file_delta, offset, rank_delta};
use crate::movegen::is_in_check;

/// The one special ability each kind of piece has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ability {
    /// King swaps places with a friendly piece.
    RoyalTeleport,
    /// Queen jumps like a knight.
    DarkEmpress,
    /// Rook raises a fortress zone around itself.
    FortressField,
    /// Bishop slides along a diagonal through any blockers.
    PhaseShift,
    /// Knight steps to any neighbouring square.
    ShadowJump,
    /// Pawn removes itself and the enemies beside it.
    Sacrifice,
}

impl Ability {
    pub const fn of(role: Role) -> Self {
        match role {
            Role::King => Self::RoyalTeleport,
            Role::Queen => Self::DarkEmpress,
            Role::Rook => Self::FortressField,
            Role::Bishop => Self::PhaseShift,
            Role::Knight => Self::ShadowJump,
            Role::Pawn => Self::Sacrifice,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::RoyalTeleport => "royal_teleport",
            Self::DarkEmpress => "dark_empress",
            Self::FortressField => "fortress_field",
            Self::PhaseShift => "phase_shift",
            Self::ShadowJump => "shadow_jump",
            Self::Sacrifice => "sacrifice",
        }
    }

    /// Raw target squares for a `color` piece on `from`, before any validity or safety check.
    pub fn candidates(self, board: &Board, from: Square, color: Color) -> Bitboard {
        let own = board.by_color(color);
        match self {
            Self::RoyalTeleport => own & !Bitboard::from_square(from),
            Self::DarkEmpress => attacks::knight_attacks(from) & !own,
            Self::FortressField | Self::Sacrifice => Bitboard::from_square(from),
            Self::PhaseShift => attacks::bishop_attacks(from, Bitboard::EMPTY),
            Self::ShadowJump => attacks::king_attacks(from) & !own,
        }
    }

    /// Apply the ability of the piece on `from` aimed at `target`.
    ///
    /// On error `board` and `flags` are left as they were. A rook's zone is not
    /// placed here; the returned [`Activation::zone`] names its center.
    pub fn apply(
        self,
        board: &mut Board,
        flags: &mut MoveFlags,
        from: Square,
        target: Square,
    ) -> Result<Activation, PowerError> {
        let piece = board.piece_at(from).ok_or(PowerError::EmptySquare(from))?;
        if Self::of(piece.role) != self {
            return Err(PowerError::StalePreview(from));
        }
        if !self.reaches(from, target) {
            return Err(PowerError::NotATarget(target));
        }

        let mut activation = Activation {
            ability: self,
            piece,
            from,
            target,
            landed: None,
            captured: Vec::new(),
            zone: None,
            redirected: false,
        };

        match self {
            Self::RoyalTeleport => {
                if target == from {
                    return Err(PowerError::SelfSwap);
                }
                let partner = board
                    .piece_at(target)
                    .filter(|other| other.color == piece.color)
                    .ok_or(PowerError::NotATarget(target))?;
                board.set(target, Some(piece));
                board.set(from, Some(partner));
                flags.mark_moved(from);
                flags.mark_moved(target);
                activation.landed = Some(target);
            }
            Self::FortressField => {
                activation.zone = Some(from);
            }
            Self::Sacrifice => {
                for side in [-1, 1] {
                    let Some(beside) = offset(from, side, 0) else {
                        continue;
                    };
                    if let Some(enemy) = board.piece_at(beside)
                        && enemy.color != piece.color
                        && enemy.role != Role::King
                    {
                        board.take(beside);
                        flags.mark_moved(beside);
                        activation.captured.push(enemy);
                    }
                }
                board.take(from);
                flags.mark_moved(from);
            }
            Self::PhaseShift => {
                let mut landing = target;
                if let Some(occupant) = board.piece_at(target)
                    && occupant.color != piece.color
                    && occupant.role == Role::King
                {
                    landing = shield_square(board, from, target, occupant.color)
                        .ok_or(PowerError::KingNotCapturable(target))?;
                    activation.redirected = true;
                }
                relocate(board, flags, piece, from, landing, &mut activation)?;
            }
            Self::DarkEmpress | Self::ShadowJump => {
                relocate(board, flags, piece, from, target, &mut activation)?;
            }
        }
        Ok(activation)
    }

    /// Whether `target` lies in this ability's reach from `from`, ignoring occupancy.
    fn reaches(self, from: Square, target: Square) -> bool {
        match self {
            Self::RoyalTeleport => true,
            Self::DarkEmpress => attacks::knight_attacks(from).contains(target),
            Self::FortressField | Self::Sacrifice => target == from,
            Self::PhaseShift => attacks::bishop_attacks(from, Bitboard::EMPTY).contains(target),
            Self::ShadowJump => attacks::king_attacks(from).contains(target),
        }
    }

    /// Targets whose activation succeeds and leaves the acting side's king safe.
    ///
    /// Every probe runs on a scratch copy; `board` and `flags` are never touched.
    pub fn legal_targets(self, board: &Board, flags: &MoveFlags, from: Square) -> Bitboard {
        let Some(piece) = board.piece_at(from) else {
            return Bitboard::EMPTY;
        };
        self.candidates(board, from, piece.color)
            .into_iter()
            .filter(|&target| {
                let mut scratch = *board;
                let mut scratch_flags = *flags;
                self.apply(&mut scratch, &mut scratch_flags, from, target)
                    .is_ok_and(|_| !is_in_check(&scratch, piece.color))
            })
            .collect()
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The square one step back from a king on `target` towards `from`, if a
/// piece of the king's color stands there to take the hit.
fn shield_square(board: &Board, from: Square, target: Square, king_color: Color) -> Option<Square> {
    let step_file = -file_delta(from, target).signum();
    let step_rank = -rank_delta(from, target).signum();
    let shield = offset(target, step_file, step_rank)?;
    (shield != from && board.is_color(shield, king_color)).then_some(shield)
}

/// Move `piece` from `from` onto `to`, capturing whatever enemy stands there.
fn relocate(
    board: &mut Board,
    flags: &mut MoveFlags,
    piece: Piece,
    from: Square,
    to: Square,
    activation: &mut Activation,
) -> Result<(), PowerError> {
    match board.piece_at(to) {
        Some(other) if other.color == piece.color => return Err(PowerError::FriendlyTarget(to)),
        Some(other) if other.role == Role::King => return Err(PowerError::KingNotCapturable(to)),
        Some(other) => {
            activation.captured.push(other);
            flags.mark_moved(to);
        }
        None => {}
    }
    board.take(from);
    board.set(to, Some(piece));
    flags.mark_moved(from);
    activation.landed = Some(to);
    Ok(())
}

/// Everything one ability application did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub ability: Ability,
    pub piece: Piece,
    pub from: Square,
    /// The square the player aimed at.
    pub target: Square,
    /// Where the acting piece ended up; `None` if it stayed put or left the board.
    pub landed: Option<Square>,
    pub captured: Vec<Piece>,
    /// Center of the fortress zone to raise.
    pub zone: Option<Square>,
    /// Whether a phase shift hit a shield instead of the king it aimed at.
    pub redirected: bool,
}
