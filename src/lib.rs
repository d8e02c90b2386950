pub mod ai;
pub mod board;
pub mod cli;
pub mod config;
pub mod feedback;
pub mod game_logic;
pub mod movegen;
pub mod outcome;
pub mod position;
pub mod superpowers;

pub use config::{GameConfig, Variant};
pub use game_logic::{GameEngine, MoveError, MoveKind, MoveRecord};
pub use outcome::Outcome;
pub use superpowers::{Ability, PowerError};

/// Trait for displaying the board and its feedback to the player.
///
/// Abstracts over output devices, providing a uniform interface for the
/// output side of the game loop. [`cli::TerminalDisplay`] is the terminal implementation.
pub trait BoardDisplay {
    /// Error type for display update failures.
    type Error: std::fmt::Debug + std::fmt::Display;

    /// Show the given board and feedback state on the display.
    ///
    /// Implementations map [`feedback::SquareFeedback`] variants
    /// to device-specific output (terminal colors, etc.).
    fn show(
        &mut self,
        board: &board::Board,
        feedback: &feedback::BoardFeedback,
    ) -> Result<(), Self::Error>;
}
