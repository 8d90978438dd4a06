//! Liveness escrow simulator CLI.
//!
//! Runs a deterministic batch of games and prints a report.

use clap::Parser;
use liveness_simulator::{Simulator, SimulatorConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "liveness-sim")]
#[command(about = "Deterministic simulator for the liveness escrow game")]
#[command(version)]
struct Cli {
    /// TOML config file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of games to play
    #[arg(short, long)]
    games: Option<usize>,

    /// Number of players
    #[arg(long)]
    players: Option<usize>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Round duration (e.g., "1s", "250ms")
    #[arg(long)]
    round_duration: Option<humantime::Duration>,

    /// Round wins needed to take the pot
    #[arg(long)]
    win_threshold: Option<u32>,

    /// Chance that a responder answers in time (0.0 to 1.0)
    #[arg(long)]
    availability: Option<f64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Logs go to stderr so --json output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => SimulatorConfig::load(path)?,
        None => SimulatorConfig::default(),
    };
    if let Some(games) = cli.games {
        config = config.with_games(games);
    }
    if let Some(players) = cli.players {
        config = config.with_players(players);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(duration) = cli.round_duration {
        config = config.with_round_duration(*duration);
    }
    if let Some(threshold) = cli.win_threshold {
        config = config.with_win_threshold(threshold);
    }
    if let Some(availability) = cli.availability {
        let workload = config
            .workload
            .clone()
            .with_responder_availability(availability);
        config = config.with_workload(workload);
    }

    let report = Simulator::new(config)?.run();
    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        report.print();
    }

    if !report.ledger.is_consistent() {
        return Err("ledger audit failed".into());
    }
    Ok(())
}
