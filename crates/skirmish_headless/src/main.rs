//! Headless skirmish match runner.
//!
//! This binary runs a match controlled via JSON on stdin/stdout.
//! Designed for bots, CI testing, and replay verification.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p skirmish_headless
//!
//! # Custom rules, two named players, record a replay
//! cargo run -p skirmish_headless -- run --rules rules.ron --player alice --player bob --record match.replay
//!
//! # Re-run a replay and check its final hash
//! cargo run -p skirmish_headless -- replay match.replay
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for command/response format.

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skirmish_core::data::MatchRules;
use skirmish_core::economy::PlayerId;
use skirmish_core::replay::Replay;
use skirmish_headless::runner::{HeadlessConfig, HeadlessRunner};

#[derive(Parser)]
#[command(name = "skirmish_headless")]
#[command(about = "Headless skirmish match runner for bots and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single interactive match
    Run {
        /// RON rules file (built-in rules when omitted)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Participant id, in seat order (one or two)
        #[arg(short, long = "player", default_values_t = [String::from("alice"), String::from("bob")])]
        players: Vec<String>,

        /// Save a replay here when the match stops
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Re-run a recorded replay and verify its final state hash
    Replay {
        /// Replay file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Some(Commands::Run {
            rules,
            players,
            record,
        }) => cmd_run(rules, players, record),
        Some(Commands::Replay { file }) => cmd_replay(&file),
        None => cmd_run(None, vec!["alice".into(), "bob".into()], None),
    };

    if let Err(message) = result {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}

/// Run a single interactive match over stdin/stdout
fn cmd_run(
    rules: Option<PathBuf>,
    players: Vec<String>,
    record: Option<PathBuf>,
) -> Result<(), String> {
    let rules = match rules {
        Some(path) => MatchRules::load(&path).map_err(|e| e.to_string())?,
        None => MatchRules::default(),
    };
    let config = HeadlessConfig {
        rules,
        players: players.into_iter().map(PlayerId::new).collect(),
        record,
    };

    let mut runner = HeadlessRunner::new(config).map_err(|e| e.to_string())?;
    let stdin = io::stdin();
    runner
        .run(stdin.lock(), io::stdout().lock())
        .map_err(|e| e.to_string())
}

/// Re-run a replay file
fn cmd_replay(file: &Path) -> Result<(), String> {
    let replay = Replay::load(file).map_err(|e| e.to_string())?;
    tracing::info!(path = %file.display(), entries = replay.len(), "Verifying replay");

    let session = replay.play().map_err(|e| e.to_string())?;
    println!(
        "Replay verified: {} entries, final hash {:#018x}",
        replay.len(),
        session.state_hash()
    );
    Ok(())
}
