use std::io::{self, Write};

use shakmaty::{Color, Square};

use super::render::TerminalDisplay;
use super::script::run_script;
use crate::BoardDisplay;
use crate::ai::RandomPlayer;
use crate::board::color_name;
use crate::config::GameConfig;
use crate::feedback::compute_feedback;
use crate::game_logic::{GameEngine, MoveKind, MoveRecord};
use crate::outcome::Outcome;
use crate::superpowers::FortressZone;

const HELP: &str = "Commands: <sq> (select) | e2e4 / e7e8n / d1*c3 (play) | p <sq> (preview) | \
                    c <sq> (commit) | x (cancel) | load <fen> | r (reset) | ai | h | q";

/// Clears the screen and moves cursor to top-left.
#[inline]
fn clear_screen() {
    print!("\x1B[2J\x1B[H");
}

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Redraw the board, then print the message if any.
    Redraw(Option<String>),
    /// Print a message without redrawing.
    Message(String),
    Quit,
}

/// State of one interactive game: the engine, the player's selection and the
/// optional computer opponent.
#[derive(Debug)]
pub struct Session {
    engine: GameEngine,
    selection: Option<Square>,
    opponent: Option<(Color, RandomPlayer)>,
}

impl Session {
    pub fn new(config: GameConfig, opponent: Option<(Color, RandomPlayer)>) -> Self {
        Self {
            engine: GameEngine::new(config),
            selection: None,
            opponent,
        }
    }

    #[inline]
    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    #[inline]
    pub fn selection(&self) -> Option<Square> {
        self.selection
    }

    /// Run one line of input.
    pub fn handle(&mut self, input: &str) -> Reply {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let Some(&command) = parts.first() else {
            return Reply::Message(String::new());
        };

        match command {
            "q" => Reply::Quit,
            "h" => Reply::Redraw(None),
            "r" => {
                self.engine.reset();
                self.selection = None;
                Reply::Redraw(Some("🔄 Reset to initial state".to_string()))
            }
            "x" => {
                self.engine.cancel_superpower_preview();
                self.selection = None;
                Reply::Redraw(None)
            }
            "load" => {
                let fen = input.trim_start().trim_start_matches("load").trim();
                self.load(fen)
            }
            "ai" => match self.play_computer() {
                Some(record) => Reply::Redraw(Some(describe(&record))),
                None => Reply::Message("Nothing to play".to_string()),
            },
            "p" | "c" => {
                let Some(square) = parts.get(1).and_then(|s| s.parse::<Square>().ok()) else {
                    return Reply::Message(format!("Usage: {command} <square>"));
                };
                if command == "p" {
                    self.preview(square)
                } else {
                    self.commit(square)
                }
            }
            token => match token.parse::<Square>() {
                Ok(square) => {
                    self.selection = Some(square);
                    Reply::Redraw(None)
                }
                Err(_) => self.play_script(token),
            },
        }
    }

    fn load(&mut self, fen: &str) -> Reply {
        let config = *self.engine.config();
        let loaded = if fen.is_empty() || fen == "startpos" {
            Ok(GameEngine::new(config))
        } else {
            GameEngine::from_fen(fen, config)
        };
        match loaded {
            Ok(engine) => {
                self.engine = engine;
                self.selection = None;
                Reply::Redraw(Some("✅ Position loaded from FEN".to_string()))
            }
            Err(err) => Reply::Message(format!("❌ Invalid FEN: {err}")),
        }
    }

    fn preview(&mut self, square: Square) -> Reply {
        match self.engine.begin_superpower_preview(square) {
            Ok(targets) => {
                self.selection = Some(square);
                Reply::Redraw(Some(format!("{} target(s)", targets.count())))
            }
            Err(err) => Reply::Message(format!("❌ {err}")),
        }
    }

    fn commit(&mut self, target: Square) -> Reply {
        match self.engine.commit_superpower_preview(target) {
            Ok(record) => self.after_move(record),
            Err(err) => {
                self.selection = None;
                Reply::Redraw(Some(format!("❌ {err}")))
            }
        }
    }

    fn play_script(&mut self, token: &str) -> Reply {
        match run_script(&mut self.engine, token) {
            Ok(mut records) => match records.pop() {
                Some(record) => self.after_move(record),
                None => Reply::Redraw(None),
            },
            Err(err) => Reply::Message(format!("❌ {err}")),
        }
    }

    /// Bookkeeping after a human half-move: material check, then the computer's reply.
    fn after_move(&mut self, record: MoveRecord) -> Reply {
        self.selection = None;
        let mut message = describe(&record);
        self.check_material();
        if let Some(reply) = self.computer_reply() {
            message.push_str(" | ");
            message.push_str(&describe(&reply));
        }
        Reply::Redraw(Some(message))
    }

    fn computer_reply(&mut self) -> Option<MoveRecord> {
        let (color, _) = self.opponent.as_ref()?;
        if *color != self.engine.turn() {
            return None;
        }
        self.play_computer()
    }

    fn play_computer(&mut self) -> Option<MoveRecord> {
        let record = match &mut self.opponent {
            Some((_, player)) => player.play(&mut self.engine),
            None => RandomPlayer::new().play(&mut self.engine),
        }?;
        self.check_material();
        Some(record)
    }

    /// Assign `InsufficientMaterial` once only the kings remain.
    fn check_material(&mut self) {
        if self.engine.outcome().is_none() && self.engine.position().only_kings_left() {
            self.engine.set_outcome(Outcome::InsufficientMaterial);
        }
    }
}

fn describe(record: &MoveRecord) -> String {
    let mover = color_name(record.piece.color);
    let target = record
        .to
        .map_or_else(|| "off the board".to_string(), |to| to.to_string());
    match record.kind {
        MoveKind::Ordinary => format!("{mover} {}{target}", record.from),
        MoveKind::Ability(ability) => format!("{mover} {ability} {} -> {target}", record.from),
    }
}

/// Runs an interactive terminal game.
pub fn run_interactive_terminal(config: GameConfig, opponent: Option<(Color, RandomPlayer)>) {
    let mut session = Session::new(config, opponent);
    let mut display = TerminalDisplay::new();

    // the computer may have the first move
    if let Some(record) = session.computer_reply() {
        log::debug!("opening reply: {}", describe(&record));
    }
    clear_screen();
    draw_interface(&session, &mut display);

    loop {
        print!("> ");
        if let Err(e) = io::stdout().flush() {
            log::error!("Failed to flush stdout: {e}");
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                log::error!("Failed to read input: {e}");
                break;
            }
        }

        match session.handle(&input) {
            Reply::Quit => break,
            Reply::Message(message) => println!("{message}"),
            Reply::Redraw(message) => {
                clear_screen();
                draw_interface(&session, &mut display);
                if let Some(message) = message {
                    println!("\n{message}");
                }
            }
        }
    }
}

/// Draws the complete interface: help text, status line and board.
fn draw_interface(session: &Session, display: &mut TerminalDisplay) {
    let engine = session.engine();
    println!("♟️  Superchess");
    println!();
    println!("{HELP}");
    println!();

    let feedback = compute_feedback(engine, session.selection());
    if let Err(e) = display.show(engine.board(), &feedback) {
        log::error!("Failed to draw board: {e}");
    }

    println!();
    println!("{}", status_line(engine));
    if engine.is_superchess() {
        println!(
            "Charges: white {} | black {}",
            engine.charges(Color::White),
            engine.charges(Color::Black)
        );
        for zone in engine.fortress_zones() {
            println!("{}", describe_zone(zone));
        }
    }
}

fn status_line(engine: &GameEngine) -> String {
    match engine.outcome() {
        Some(outcome) if outcome.is_draw() => format!("Game over: {outcome} (draw)"),
        Some(outcome) => format!("Game over: {outcome}"),
        None => format!("To move: {}", color_name(engine.turn())),
    }
}

fn describe_zone(zone: &FortressZone) -> String {
    format!(
        "Fortress: {} around {}, {} half-move(s) left",
        color_name(zone.owner()),
        zone.center(),
        zone.ttl()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(GameConfig::default(), None)
    }

    #[test]
    fn test_select_then_move() {
        let mut session = session();

        assert_eq!(session.handle("e2"), Reply::Redraw(None));
        assert_eq!(session.selection(), Some(Square::E2));

        assert!(matches!(session.handle("e2e4\n"), Reply::Redraw(Some(_))));
        assert_eq!(session.selection(), None);
        assert_eq!(session.engine().turn(), Color::Black);
    }

    #[test]
    fn test_illegal_move_is_reported() {
        let mut session = session();
        assert!(matches!(session.handle("e2e5"), Reply::Message(_)));
        assert_eq!(session.engine().turn(), Color::White);
    }

    #[test]
    fn test_preview_commit_and_cancel() {
        let mut session = session();
        session.engine.set_charges(Color::White, 1);

        assert!(matches!(session.handle("p d1"), Reply::Redraw(Some(_))));
        assert!(session.engine().superpower_preview().is_some());
        assert_eq!(session.handle("x"), Reply::Redraw(None));
        assert!(session.engine().superpower_preview().is_none());

        session.handle("p d1");
        session.handle("c c3");
        assert_eq!(session.engine().charges(Color::White), 0);
        assert_eq!(session.engine().turn(), Color::Black);
    }

    #[test]
    fn test_load_and_reset() {
        let mut session = session();

        session.handle("load 4k3/8/8/8/8/8/8/4K3 b - - 0 1");
        assert_eq!(session.engine().turn(), Color::Black);

        assert!(matches!(session.handle("load nonsense"), Reply::Message(_)));
        assert_eq!(session.engine().turn(), Color::Black);

        session.handle("r");
        assert_eq!(session.engine().turn(), Color::White);
    }

    #[test]
    fn test_bare_kings_is_insufficient_material() {
        let mut session = session();
        session.handle("load 4k3/8/8/8/8/8/3q4/4K3 w - - 0 1");

        session.handle("e1d2");

        assert_eq!(
            session.engine().outcome(),
            Some(Outcome::InsufficientMaterial)
        );
    }

    #[test]
    fn test_computer_replies() {
        let mut session = Session::new(
            GameConfig::classic(),
            Some((Color::Black, RandomPlayer::seeded(5))),
        );

        session.handle("e2e4");

        assert_eq!(session.engine().history().len(), 2);
        assert_eq!(session.engine().turn(), Color::White);
    }

    #[test]
    fn test_status_line_names_draws() {
        let mut session = session();
        assert_eq!(status_line(session.engine()), "To move: white");

        session.engine.set_outcome(Outcome::Stalemate);
        assert_eq!(status_line(session.engine()), "Game over: Stalemate (draw)");

        session.engine.set_outcome(Outcome::Checkmate {
            winner: Color::Black,
        });
        assert_eq!(status_line(session.engine()), "Game over: Checkmate:black");
    }

    #[test]
    fn test_zone_description() {
        let zone = FortressZone::around(Color::Black, Square::D4, 2);
        assert_eq!(
            describe_zone(&zone),
            "Fortress: black around d4, 2 half-move(s) left"
        );
    }

    #[test]
    fn test_quit() {
        assert_eq!(session().handle("q"), Reply::Quit);
    }
}
