use clap::{Parser, ValueEnum};
use log::LevelFilter;
use shakmaty::Color;
use superchess::GameConfig;
use superchess::ai::RandomPlayer;
use superchess::cli::run_interactive_terminal;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Play standard chess without superpowers
    #[arg(long)]
    classic: bool,

    /// Let the computer play this side
    #[arg(long, value_enum)]
    ai: Option<Side>,

    /// Seed for the computer's choices
    #[arg(long)]
    seed: Option<u64>,

    /// Chance per turn that the computer tries a superpower
    #[arg(long, default_value_t = RandomPlayer::DEFAULT_POWER_PROBABILITY)]
    power_probability: f64,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Log level for a count of `-v` flags.
fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(log_level(args.verbose))
        .parse_default_env()
        .init();

    let config = if args.classic {
        GameConfig::classic()
    } else {
        GameConfig::superpowers()
    };
    let opponent = args.ai.map(|side| {
        let player = match args.seed {
            Some(seed) => RandomPlayer::seeded(seed),
            None => RandomPlayer::new(),
        };
        let player = player.with_power_probability(args.power_probability);
        log::info!(
            "computer plays {side:?}, power probability {}",
            player.power_probability()
        );
        (Color::from(side), player)
    });

    log::info!("starting {:?} game", config.variant);
    run_interactive_terminal(config, opponent);
}
