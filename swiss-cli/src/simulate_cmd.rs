//! Simulate command - play out a random tournament
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_tournament(), report_results()
//! - Level 4: create_rng(), random_roster()

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use swiss_core::{Acceleration, Player};
use swiss_tournament::{
    play_out_tournament, PairingSystem, SectionFormat, SectionLocks, Tournament, TournamentConfig,
};

use crate::{document, report};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    /// Players per section
    #[arg(long, default_value = "16")]
    pub players: u32,

    #[arg(long, default_value = "5")]
    pub rounds: u32,

    /// Independent sections, played in parallel
    #[arg(long, default_value = "1")]
    pub sections: u32,

    /// Pair adjacent players within score groups
    #[arg(long)]
    pub monrad: bool,

    /// Baku acceleration over the first two rounds
    #[arg(long)]
    pub accelerate: bool,

    /// Random seed for rosters and results
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the finished tournament document here
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: SimulateArgs) -> Result<()> {
    let mut rng = create_rng(args.seed);
    let mut tournament = build_tournament(&args, &mut rng)?;

    info!(
        "Simulating {} sections of {} players over {} rounds",
        args.sections, args.players, args.rounds
    );
    let locks = SectionLocks::new();
    play_out_tournament(&mut tournament, rng.gen(), &locks)?;

    report_results(&tournament)?;
    if let Some(path) = &args.output {
        document::save(path, &tournament)?;
        info!("Saved tournament to {}", path.display());
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_tournament(args: &SimulateArgs, rng: &mut ChaCha8Rng) -> Result<Tournament> {
    let mut config = TournamentConfig::swiss(args.rounds);
    if args.monrad {
        config = config.with_system(PairingSystem::Monrad);
    }
    if args.accelerate {
        config = config.with_acceleration(Acceleration::baku(2));
    }

    let mut tournament = Tournament::new("simulation", "Simulated Swiss", config);
    for s in 0..args.sections {
        let section = format!("s{}", s + 1);
        let roster = random_roster(&section, s * 1000, args.players, rng);
        tournament.add_section(section, SectionFormat::Individual, roster)?;
    }
    Ok(tournament)
}

fn report_results(tournament: &Tournament) -> Result<()> {
    for section in tournament.sections() {
        let standings = tournament.compute_standings(&tournament.id, section.id(), None, true)?;
        report::print_standings(&standings);
    }
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Players with random ratings; about one in eight unrated
fn random_roster(section: &str, first_id: u32, size: u32, rng: &mut ChaCha8Rng) -> Vec<Player> {
    (1..=size)
        .map(|i| {
            let rating = (rng.gen_range(0..8) != 0).then(|| rng.gen_range(1000..2500));
            Player::new(first_id + i, format!("{section}-{i}"), rating, section)
        })
        .collect()
}
