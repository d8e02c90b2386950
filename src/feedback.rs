use shakmaty::{Bitboard, Color, Piece, Role, Square};

use crate::game_logic::GameEngine;
use crate::superpowers::{FortressZone, Preview};

/// Type of visual feedback for an individual square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SquareFeedback {
    /// The selected piece, or the piece whose ability is being previewed
    Origin,
    /// The selected piece may move here
    Destination,
    /// Moving here captures an opponent piece
    Capture,
    /// The previewed ability may be aimed here
    PowerTarget,
    /// Inside a fortress zone
    Fortress,
    /// A king in check
    Check,
}

/// Contains the set of squares and their associated feedback types for the current board state.
///
/// `BoardFeedback` is computed by `compute_feedback()` and consumed by renderers to give the
/// player visual cues. It is the only thing the engine hands to the display side; the
/// selection it is computed from belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardFeedback {
    squares: Vec<(Square, SquareFeedback)>,
}

impl BoardFeedback {
    /// Create empty feedback (no highlights)
    #[inline]
    pub const fn new() -> Self {
        Self {
            squares: Vec::new(),
        }
    }

    /// Get all square feedback entries
    #[inline]
    pub fn squares(&self) -> &[(Square, SquareFeedback)] {
        &self.squares
    }

    /// Get feedback for a specific square, if any
    #[inline]
    pub fn get(&self, square: Square) -> Option<SquareFeedback> {
        self.squares
            .iter()
            .find(|(sq, _)| *sq == square)
            .map(|(_, feedback)| *feedback)
    }

    /// Set feedback for a square, replacing whatever it had.
    pub fn set(&mut self, square: Square, feedback: SquareFeedback) {
        match self.squares.iter_mut().find(|(sq, _)| *sq == square) {
            Some(entry) => entry.1 = feedback,
            None => self.squares.push((square, feedback)),
        }
    }

    /// Check if any feedback exists
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }
}

impl From<Vec<(Square, SquareFeedback)>> for BoardFeedback {
    fn from(squares: Vec<(Square, SquareFeedback)>) -> Self {
        Self { squares }
    }
}

/// Game state information needed to compute feedback
///
/// This trait defines what the feedback system needs from the game engine.
pub trait FeedbackSource {
    fn piece_at(&self, square: Square) -> Option<Piece>;

    /// Legal destinations for the piece on `from`
    fn legal_moves(&self, from: Square) -> Bitboard;

    /// The staged superpower, if any
    fn preview(&self) -> Option<&Preview>;

    fn fortress_zones(&self) -> &[FortressZone];

    /// Square of each king currently in check
    fn checked_kings(&self) -> Bitboard;
}

impl FeedbackSource for GameEngine {
    fn piece_at(&self, square: Square) -> Option<Piece> {
        GameEngine::piece_at(self, square)
    }

    fn legal_moves(&self, from: Square) -> Bitboard {
        GameEngine::legal_moves(self, from)
    }

    fn preview(&self) -> Option<&Preview> {
        self.superpower_preview()
    }

    fn fortress_zones(&self) -> &[FortressZone] {
        GameEngine::fortress_zones(self)
    }

    fn checked_kings(&self) -> Bitboard {
        Color::ALL
            .into_iter()
            .filter(|&color| self.is_in_check(color))
            .filter_map(|color| self.board().king_of(color))
            .collect()
    }
}

/// Compute visual feedback for the current game state and the caller's selection.
///
/// Layers, each drawn over the previous one:
/// - fortress zones and kings in check
/// - a staged superpower: its piece and its targets
/// - otherwise a selected piece: its legal destinations and captures
pub fn compute_feedback(source: &impl FeedbackSource, selection: Option<Square>) -> BoardFeedback {
    let mut feedback = BoardFeedback::new();

    for zone in source.fortress_zones() {
        for square in zone.squares() {
            feedback.set(square, SquareFeedback::Fortress);
        }
    }
    for king in source.checked_kings() {
        feedback.set(king, SquareFeedback::Check);
    }

    if let Some(preview) = source.preview() {
        show_power_targets(&mut feedback, preview);
    } else if let Some(from) = selection {
        show_destinations_for(&mut feedback, source, from);
    }
    feedback
}

fn show_power_targets(feedback: &mut BoardFeedback, preview: &Preview) {
    for target in preview.targets {
        feedback.set(target, SquareFeedback::PowerTarget);
    }
    // abilities aimed at their own square keep the target highlight
    if !preview.targets.contains(preview.from) {
        feedback.set(preview.from, SquareFeedback::Origin);
    }
}

/// Show legal destinations when a piece is selected
fn show_destinations_for(feedback: &mut BoardFeedback, source: &impl FeedbackSource, from: Square) {
    let Some(piece) = source.piece_at(from) else {
        return;
    };
    feedback.set(from, SquareFeedback::Origin);
    for to in source.legal_moves(from) {
        feedback.set(to, classify_move(source, piece, from, to));
    }
}

/// Classify a move as either a capture or regular destination
fn classify_move(
    source: &impl FeedbackSource,
    piece: Piece,
    from: Square,
    to: Square,
) -> SquareFeedback {
    let takes_piece = source.piece_at(to).is_some_and(|other| other.color != piece.color);
    // a pawn stepping diagonally onto an empty square takes en passant
    let en_passant = piece.role == Role::Pawn && from.file() != to.file();
    if takes_piece || en_passant {
        SquareFeedback::Capture
    } else {
        SquareFeedback::Destination
    }
}
