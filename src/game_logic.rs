use shakmaty::{Bitboard, Color, Piece, Role, Square};
use thiserror::Error;

use crate::board::{Board, LastMove};
use crate::config::{GameConfig, Variant};
use crate::outcome::{Outcome, Verdict, judge};
use crate::position::{FenError, Position, execute, is_promotion};
use crate::superpowers::{Ability, FortressZone, PowerError, Preview, Superpowers};

/// Why an ordinary move was refused. Refused moves leave the game untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("game is over: {0}")]
    GameOver(Outcome),
    #[error("no piece on {0}")]
    EmptySquare(Square),
    #[error("piece on {0} does not belong to the side to move")]
    NotYourTurn(Square),
    #[error("illegal move {from}{to}")]
    Illegal { from: Square, to: Square },
}

/// Picks the piece a pawn promotes to.
pub trait PromotionChooser {
    /// Choose a role for the `color` pawn arriving on `square`.
    ///
    /// Pawn or king choices are turned into a queen.
    fn choose(&mut self, color: Color, square: Square) -> Role;
}

/// Always promotes to a queen.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoQueen;

impl PromotionChooser for AutoQueen {
    fn choose(&mut self, _color: Color, _square: Square) -> Role {
        Role::Queen
    }
}

/// Always promotes to the same role.
#[derive(Debug, Clone, Copy)]
pub struct FixedPromotion(pub Role);

impl PromotionChooser for FixedPromotion {
    fn choose(&mut self, _color: Color, _square: Square) -> Role {
        self.0
    }
}

/// What kind of half-move a [`MoveRecord`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Ordinary,
    Ability(Ability),
}

/// One completed real half-move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub kind: MoveKind,
    pub piece: Piece,
    pub from: Square,
    /// Where the piece ended up; `None` when it left the board.
    pub to: Option<Square>,
    pub captured: Vec<Piece>,
    pub consumed_charge: bool,
    /// A phase shift took a shield instead of the king it aimed at.
    pub redirected: bool,
}

/// Rules engine for one game: base chess plus, optionally, the superpower variant.
pub struct GameEngine {
    position: Position,
    outcome: Option<Outcome>,
    /// `None` in a classic game.
    powers: Option<Superpowers>,
    config: GameConfig,
    history: Vec<MoveRecord>,
    chooser: Box<dyn PromotionChooser>,
    auto_promote: bool,
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl GameEngine {
    pub fn new(config: GameConfig) -> Self {
        Self::from_position(Position::new(), config)
    }

    #[inline]
    pub fn classic() -> Self {
        Self::new(GameConfig::classic())
    }

    #[inline]
    pub fn superchess() -> Self {
        Self::new(GameConfig::superpowers())
    }

    /// Creates a GameEngine from an existing position.
    pub fn from_position(position: Position, config: GameConfig) -> Self {
        Self {
            position,
            outcome: None,
            powers: match config.variant {
                Variant::Classic => None,
                Variant::Superpowers => Some(Superpowers::new(&config)),
            },
            config,
            history: Vec::new(),
            chooser: Box::new(AutoQueen),
            auto_promote: false,
        }
    }

    pub fn from_fen(fen: &str, config: GameConfig) -> Result<Self, FenError> {
        Ok(Self::from_position(Position::from_fen(fen)?, config))
    }

    /// Back to the starting position with no charges, zones, history or outcome.
    pub fn reset(&mut self) {
        let chooser = std::mem::replace(&mut self.chooser, Box::new(AutoQueen));
        *self = Self::new(self.config);
        self.chooser = chooser;
        log::debug!("game reset");
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn board(&self) -> &Board {
        self.position.board()
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.piece_at(square)
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Store a terminal state decided outside the engine, such as a clock running out.
    pub fn set_outcome(&mut self, outcome: Outcome) {
        log::info!("outcome assigned: {outcome}");
        if let Some(powers) = &mut self.powers {
            powers.take_preview();
        }
        self.outcome = Some(outcome);
    }

    #[inline]
    pub fn captured(&self) -> &[Piece] {
        self.position.captured()
    }

    /// Every real half-move so far, oldest first.
    #[inline]
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn set_promotion_chooser(&mut self, chooser: Box<dyn PromotionChooser>) {
        self.chooser = chooser;
    }

    /// While set, every promotion is a queen and the chooser is never asked.
    pub fn set_auto_promote(&mut self, auto_promote: bool) {
        self.auto_promote = auto_promote;
    }

    #[inline]
    pub fn auto_promote(&self) -> bool {
        self.auto_promote
    }

    #[inline]
    pub fn is_superchess(&self) -> bool {
        self.powers.is_some()
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.position.is_in_check(color)
    }

    /// Legal destinations for the piece on `from`.
    ///
    /// In the variant, opponent fortress zones and castling right after a check are pruned.
    pub fn legal_moves(&self, from: Square) -> Bitboard {
        let targets = self.position.legal_moves(from);
        match (&self.powers, self.position.piece_at(from)) {
            (Some(powers), Some(piece)) => powers.restrict(piece.color, piece.role, from, targets),
            _ => targets,
        }
    }

    /// Whether `color` has any legal move. Stops at the first one found.
    pub fn has_any_legal_move(&self, color: Color) -> bool {
        self.board()
            .pieces()
            .filter(|(_, piece)| piece.color == color)
            .any(|(from, _)| !self.legal_moves(from).is_empty())
    }

    /// Every legal `(from, to)` pair for `color`.
    pub fn all_legal_moves(&self, color: Color) -> Vec<(Square, Square)> {
        self.board()
            .pieces()
            .filter(|(_, piece)| piece.color == color)
            .flat_map(|(from, _)| self.legal_moves(from).into_iter().map(move |to| (from, to)))
            .collect()
    }

    /// The board after playing `from`→`to`, promoting to a queen. The game is not touched.
    ///
    /// Returns `None` if `from` is empty.
    pub fn simulate_move(&self, from: Square, to: Square) -> Option<Board> {
        let mut board = *self.board();
        let mut flags = *self.position.flags();
        execute(
            &mut board,
            &mut flags,
            self.position.last_move(),
            from,
            to,
            Role::Queen,
        )?;
        Some(board)
    }

    /// Play an ordinary move for the side to move, asking the configured chooser on promotion.
    pub fn attempt_move(&mut self, from: Square, to: Square) -> Result<MoveRecord, MoveError> {
        let mut chooser = std::mem::replace(&mut self.chooser, Box::new(AutoQueen));
        let result = self.attempt_move_with(from, to, chooser.as_mut());
        self.chooser = chooser;
        result
    }

    /// Play an ordinary move with an explicit promotion chooser.
    pub fn attempt_move_with(
        &mut self,
        from: Square,
        to: Square,
        chooser: &mut dyn PromotionChooser,
    ) -> Result<MoveRecord, MoveError> {
        if let Some(outcome) = self.outcome {
            log::trace!("rejected {from}{to}: game over");
            return Err(MoveError::GameOver(outcome));
        }
        let mover = self.turn();
        let piece = self.piece_at(from).ok_or(MoveError::EmptySquare(from))?;
        if piece.color != mover {
            log::trace!("rejected {from}{to}: not {mover:?}'s piece");
            return Err(MoveError::NotYourTurn(from));
        }
        if !self.legal_moves(from).contains(to) {
            log::trace!("rejected {from}{to}: illegal");
            return Err(MoveError::Illegal { from, to });
        }

        let promotion = if is_promotion(self.board(), from, to) && !self.auto_promote {
            chooser.choose(mover, to)
        } else {
            Role::Queen
        };
        let applied = self
            .position
            .play(from, to, promotion)
            .ok_or(MoveError::EmptySquare(from))?;
        log::debug!("{mover:?} played {from}{to} ({applied:?})");

        if let Some(powers) = &mut self.powers {
            powers.take_preview();
            if applied.captured.is_some() {
                powers.earn(mover);
            }
            powers.after_half_move(self.position.board());
        }

        let record = MoveRecord {
            kind: MoveKind::Ordinary,
            piece: applied.piece,
            from,
            to: Some(to),
            captured: applied.captured.into_iter().collect(),
            consumed_charge: false,
            redirected: false,
        };
        self.history.push(record.clone());
        self.conclude(mover);
        Ok(record)
    }

    /// Evaluate the position for the side that has to reply to `mover`.
    fn conclude(&mut self, mover: Color) {
        let opponent = mover.other();
        let verdict = Verdict {
            opponent_in_check: self.is_in_check(opponent),
            opponent_can_move: self.has_any_legal_move(opponent),
            repetitions: self.position.repetitions(),
        };
        if let Some(outcome) = judge(mover, verdict, self.config.repetition_limit) {
            log::info!("game over: {outcome}");
            self.outcome = Some(outcome);
        }
    }

    /// Charges held by `color`; always 0 in a classic game.
    pub fn charges(&self, color: Color) -> u8 {
        self.powers.as_ref().map_or(0, |powers| powers.charges(color))
    }

    /// Give `color` a number of charges, clamped to the cap. Ignored in a classic game.
    pub fn set_charges(&mut self, color: Color, charges: u8) {
        if let Some(powers) = &mut self.powers {
            powers.set_charges(color, charges);
        }
    }

    pub fn fortress_zones(&self) -> &[FortressZone] {
        match &self.powers {
            Some(powers) => powers.zones(),
            None => &[],
        }
    }

    pub fn superpower_preview(&self) -> Option<&Preview> {
        self.powers.as_ref().and_then(Superpowers::preview)
    }

    /// Usable ability targets for the piece on `from`, without starting a preview.
    ///
    /// An empty set means the piece may activate but has nowhere to aim.
    pub fn superpower_targets(&self, from: Square) -> Result<Bitboard, PowerError> {
        let powers = self.powers.as_ref().ok_or(PowerError::Disabled)?;
        if let Some(outcome) = self.outcome {
            return Err(PowerError::GameOver(outcome));
        }
        let piece = self.piece_at(from).ok_or(PowerError::EmptySquare(from))?;
        if piece.color != self.turn() {
            return Err(PowerError::NotYourTurn(from));
        }
        if powers.charges(piece.color) == 0 {
            return Err(PowerError::NoCharges);
        }
        Ok(Ability::of(piece.role).legal_targets(self.board(), self.position.flags(), from))
    }

    /// Stage the ability of the piece on `from` and return its targets.
    ///
    /// Replaces any preview already staged.
    pub fn begin_superpower_preview(&mut self, from: Square) -> Result<Bitboard, PowerError> {
        let targets = self.superpower_targets(from).inspect_err(|err| {
            log::trace!("no preview from {from}: {err}");
        })?;
        if targets.is_empty() {
            return Err(PowerError::NoTargets(from));
        }
        let Some(piece) = self.piece_at(from) else {
            return Err(PowerError::EmptySquare(from));
        };
        let ability = Ability::of(piece.role);
        if let Some(powers) = &mut self.powers {
            powers.stage(Preview {
                from,
                ability,
                targets,
            });
        }
        log::debug!("previewing {ability} from {from}: {} targets", targets.count());
        Ok(targets)
    }

    pub fn cancel_superpower_preview(&mut self) {
        if let Some(powers) = &mut self.powers
            && powers.take_preview().is_some()
        {
            log::debug!("preview cancelled");
        }
    }

    /// Activate the staged ability on `target`.
    ///
    /// The preview ends whatever happens. A charge is spent only once the
    /// activation has been applied successfully.
    pub fn commit_superpower_preview(&mut self, target: Square) -> Result<MoveRecord, PowerError> {
        let Some(powers) = self.powers.as_mut() else {
            return Err(PowerError::Disabled);
        };
        let preview = powers.take_preview().ok_or(PowerError::NoPreview)?;
        if let Some(outcome) = self.outcome {
            return Err(PowerError::GameOver(outcome));
        }
        if !preview.targets.contains(target) {
            log::trace!("rejected {} on {target}: not previewed", preview.ability);
            return Err(PowerError::NotATarget(target));
        }
        let mover = self.position.turn();
        let piece = self
            .position
            .piece_at(preview.from)
            .ok_or(PowerError::StalePreview(preview.from))?;
        if piece.color != mover {
            return Err(PowerError::StalePreview(preview.from));
        }
        if powers.charges(mover) == 0 {
            return Err(PowerError::NoCharges);
        }

        let mut board = *self.position.board();
        let mut flags = *self.position.flags();
        let activation = preview
            .ability
            .apply(&mut board, &mut flags, preview.from, target)
            .inspect_err(|err| log::trace!("rejected {} on {target}: {err}", preview.ability))?;
        powers.spend(mover)?;

        let last_move = LastMove {
            from: activation.from,
            to: activation.landed.unwrap_or(activation.from),
            piece: activation.piece,
        };
        self.position
            .commit(board, flags, last_move, &activation.captured);
        powers.after_half_move(self.position.board());
        if let Some(center) = activation.zone {
            powers.raise_zone(mover, center);
        }
        log::debug!(
            "{mover:?} used {} from {} on {}, captured {:?}",
            activation.ability,
            activation.from,
            activation.target,
            activation.captured
        );

        let record = MoveRecord {
            kind: MoveKind::Ability(activation.ability),
            piece: activation.piece,
            from: activation.from,
            to: match activation.ability {
                Ability::Sacrifice => None,
                Ability::FortressField => Some(preview.from),
                _ => activation.landed,
            },
            captured: activation.captured,
            consumed_charge: true,
            redirected: activation.redirected,
        };
        self.history.push(record.clone());
        self.conclude(mover);
        Ok(record)
    }
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("key", &self.position.key())
            .field("outcome", &self.outcome.map(|outcome| outcome.to_string()))
            .field("powers", &self.powers)
            .field("history", &self.history.len())
            .field("auto_promote", &self.auto_promote)
            .finish_non_exhaustive()
    }
}
