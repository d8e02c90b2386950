//! Terminal front end: a move-script DSL, a text renderer and the interactive loop.
//!
//! Everything here is an ordinary caller of [`crate::game_logic::GameEngine`].

mod render;
mod script;
mod terminal;

pub use render::{RenderError, TerminalDisplay, render_feedback};
pub use script::{ParseError, ScriptError, ScriptStep, parse_script, run_script};
pub use terminal::{Reply, Session, run_interactive_terminal};
