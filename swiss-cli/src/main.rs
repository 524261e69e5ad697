//! Swiss CLI - Command-line calling service for the pairing engine
//!
//! Every command loads a tournament document (JSON), runs one engine
//! operation and writes the document back. Commands:
//! - init / add-section: create a document and register rosters
//! - pair / next / record / retract / complete: drive the round cycle
//! - standings / teams: ranked tables
//! - reset / withdraw: section maintenance
//! - simulate: play out a seeded random event

mod document;
mod report;
mod round_cmd;
mod simulate_cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use round_cmd::{RecordArgs, SectionArgs};
use simulate_cmd::SimulateArgs;

#[derive(Parser)]
#[command(name = "swiss")]
#[command(about = "Swiss-system pairing and standings engine")]
struct Cli {
    /// Tournament document
    #[arg(long, short, global = true, value_name = "FILE", default_value = "tournament.json")]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty tournament document
    Init {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "5")]
        rounds: u32,
        /// Full configuration JSON, overrides --rounds
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Add a section from a roster JSON file (array of players)
    AddSection {
        #[arg(long)]
        section: String,
        #[arg(long, value_name = "FILE")]
        players: PathBuf,
        /// Pair teams instead of individuals
        #[arg(long)]
        team: bool,
    },
    /// Pair a round (idempotent)
    Pair {
        #[command(flatten)]
        target: SectionArgs,
        #[arg(long)]
        round: u32,
    },
    /// Complete the open round if needed and pair the next one
    Next {
        #[command(flatten)]
        target: SectionArgs,
    },
    /// Record a game result
    Record(RecordArgs),
    /// Remove a recorded result from an open round
    Retract {
        /// Pairing id, e.g. open-r2-b5
        pairing: String,
    },
    /// Close a round once every game has a result
    Complete {
        #[command(flatten)]
        target: SectionArgs,
        #[arg(long)]
        round: u32,
    },
    /// Ranked player standings
    Standings {
        #[command(flatten)]
        target: SectionArgs,
        #[arg(long)]
        round: Option<u32>,
        /// Rank by score only
        #[arg(long)]
        no_tiebreaks: bool,
        #[arg(long)]
        json: bool,
    },
    /// Ranked team standings
    Teams {
        #[command(flatten)]
        target: SectionArgs,
        #[arg(long)]
        round: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Delete every pairing and result of a section
    Reset {
        #[command(flatten)]
        target: SectionArgs,
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Withdraw a player from a round onwards
    Withdraw {
        #[command(flatten)]
        target: SectionArgs,
        #[arg(long)]
        player: u32,
        #[arg(long)]
        from_round: u32,
    },
    /// Play out a random tournament
    Simulate(SimulateArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let file = cli.file;

    match cli.command {
        Commands::Init { id, name, rounds, config } => document::init(&file, id, name, rounds, config.as_deref()),
        Commands::AddSection { section, players, team } => document::add_section(&file, section, &players, team),
        Commands::Pair { target, round } => round_cmd::pair(&file, &target, round),
        Commands::Next { target } => round_cmd::next(&file, &target),
        Commands::Record(args) => round_cmd::record(&file, &args),
        Commands::Retract { pairing } => round_cmd::retract(&file, &pairing),
        Commands::Complete { target, round } => round_cmd::complete(&file, &target, round),
        Commands::Standings {
            target,
            round,
            no_tiebreaks,
            json,
        } => round_cmd::standings(&file, &target, round, !no_tiebreaks, json),
        Commands::Teams { target, round, json } => round_cmd::teams(&file, &target, round, json),
        Commands::Reset { target, yes } => round_cmd::reset(&file, &target, yes),
        Commands::Withdraw {
            target,
            player,
            from_round,
        } => round_cmd::withdraw(&file, &target, player, from_round),
        Commands::Simulate(args) => simulate_cmd::run(args),
    }
}
