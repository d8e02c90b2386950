use std::io::{self, Write};

use shakmaty::{File, Rank, Square};

use crate::BoardDisplay;
use crate::board::Board;
use crate::feedback::{BoardFeedback, SquareFeedback};

/// Terminal-based board display.
///
/// Renders the pieces as an 8×8 grid, with ANSI color-coded backgrounds
/// matching the [`BoardFeedback`] of each square (destinations, captures, etc.).
#[derive(Debug, Default)]
pub struct TerminalDisplay;

impl TerminalDisplay {
    /// Create a new terminal display.
    pub fn new() -> Self {
        Self
    }
}

/// Error type for terminal display operations.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to write to terminal: {0}")]
    Io(#[from] io::Error),
}

impl BoardDisplay for TerminalDisplay {
    type Error = RenderError;

    fn show(&mut self, board: &Board, feedback: &BoardFeedback) -> Result<(), Self::Error> {
        render_feedback(&mut io::stdout(), board, feedback)
    }
}

/// Render the board and its feedback to any writer.
pub fn render_feedback(
    w: &mut impl Write,
    board: &Board,
    feedback: &BoardFeedback,
) -> Result<(), RenderError> {
    for rank in Rank::ALL.iter().rev() {
        write!(w, " {} ", rank.char())?;
        for file in File::ALL {
            let square = Square::from_coords(file, *rank);
            let symbol = board.piece_at(square).map_or('·', |piece| piece.char());
            match background(feedback.get(square)) {
                Some(color) => write!(w, "\x1b[{color}m {symbol} \x1b[0m")?,
                None => write!(w, " {symbol} ")?,
            }
        }
        writeln!(w)?;
    }
    writeln!(w, "    a  b  c  d  e  f  g  h")?;
    w.flush()?;
    Ok(())
}

/// ANSI background code of a feedback variant.
fn background(feedback: Option<SquareFeedback>) -> Option<u8> {
    match feedback? {
        SquareFeedback::Destination => Some(44),
        SquareFeedback::Capture => Some(41),
        SquareFeedback::Origin => Some(42),
        SquareFeedback::Check => Some(45),
        SquareFeedback::PowerTarget => Some(43),
        SquareFeedback::Fortress => Some(46),
    }
}
