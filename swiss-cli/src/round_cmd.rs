//! Round commands - one engine operation per invocation
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: pair(), next(), record(), ... - load, operate, save, report
//! - Level 4: argument parsing (result notation, pairing ids)

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use swiss_core::{GameResult, Outcome, PairingId, PlayerId};

use crate::document;
use crate::report;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SectionArgs {
    /// Section id
    #[arg(long, short)]
    pub section: String,
}

#[derive(Args)]
pub struct RecordArgs {
    /// Pairing id, e.g. open-r2-b5
    pub pairing: String,

    /// 1-0, 0-1, 1/2-1/2; forfeits as +- or -+
    #[arg(value_parser = parse_result)]
    pub result: GameResult,
}

// ============================================================================
// LEVEL 1 - OPERATIONS
// ============================================================================

pub fn pair(file: &Path, target: &SectionArgs, round: u32) -> Result<()> {
    let set = document::update(file, |t| {
        let id = t.id.clone();
        Ok(t.generate_pairings(&id, &target.section, round)?)
    })?;
    let tournament = document::load(file)?;
    report::print_pairings(tournament.section(&target.section)?, &set);
    Ok(())
}

pub fn next(file: &Path, target: &SectionArgs) -> Result<()> {
    let set = document::update(file, |t| {
        let id = t.id.clone();
        Ok(t.generate_next_round(&id, &target.section)?)
    })?;
    let tournament = document::load(file)?;
    report::print_pairings(tournament.section(&target.section)?, &set);
    Ok(())
}

pub fn record(file: &Path, args: &RecordArgs) -> Result<()> {
    let pairing = parse_pairing(&args.pairing)?;
    let delta = document::update(file, |t| Ok(t.record_result(&pairing, args.result)?))?;
    if delta.overwrote() {
        println!("{}: result replaced", pairing);
    }
    for change in &delta.changes {
        println!("  {} {:+}", change.player, change.delta);
    }
    Ok(())
}

pub fn retract(file: &Path, pairing: &str) -> Result<()> {
    let pairing = parse_pairing(pairing)?;
    let delta = document::update(file, |t| Ok(t.retract_result(&pairing)?))?;
    println!("{}: result retracted ({} players adjusted)", pairing, delta.changes.len());
    Ok(())
}

pub fn complete(file: &Path, target: &SectionArgs, round: u32) -> Result<()> {
    let outcome = document::update(file, |t| {
        let id = t.id.clone();
        Ok(t.complete_round(&id, &target.section, round)?)
    });

    match outcome {
        Ok(completion) => {
            println!(
                "Round {} complete: {} games, {} byes, {} points awarded ({})",
                completion.round, completion.games, completion.byes, completion.points_awarded, completion.state
            );
            Ok(())
        }
        Err(err) => {
            if let Some(engine) = err.downcast_ref::<swiss_core::EngineError>() {
                for id in engine.outstanding() {
                    println!("  missing result: {}", id);
                }
            }
            Err(err)
        }
    }
}

pub fn standings(file: &Path, target: &SectionArgs, round: Option<u32>, tiebreaks: bool, json: bool) -> Result<()> {
    let tournament = document::load(file)?;
    let standings = tournament.compute_standings(&tournament.id, &target.section, round, tiebreaks)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&standings)?);
    } else {
        report::print_standings(&standings);
    }
    Ok(())
}

pub fn teams(file: &Path, target: &SectionArgs, round: Option<u32>, json: bool) -> Result<()> {
    let tournament = document::load(file)?;
    let standings = tournament.compute_team_standings(&tournament.id, &target.section, round)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&standings)?);
    } else {
        report::print_team_standings(&standings);
    }
    Ok(())
}

pub fn reset(file: &Path, target: &SectionArgs, yes: bool) -> Result<()> {
    if !yes {
        bail!("reset deletes every pairing and result of '{}'; pass --yes to confirm", target.section);
    }
    let ack = document::update(file, |t| {
        let id = t.id.clone();
        Ok(t.reset_section(&id, &target.section)?)
    })?;
    info!("Section '{}' reset", ack.section);
    println!("Removed {} pairings from '{}'", ack.pairings_removed, ack.section);
    Ok(())
}

pub fn withdraw(file: &Path, target: &SectionArgs, player: u32, from_round: u32) -> Result<()> {
    document::update(file, |t| {
        let id = t.id.clone();
        Ok(t.withdraw_player(&id, &target.section, PlayerId(player), from_round)?)
    })?;
    println!("Player #{} withdrawn from round {}", player, from_round);
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Parse result notation into a game result
pub fn parse_result(s: &str) -> std::result::Result<GameResult, String> {
    let result = match s.trim() {
        "1-0" => GameResult::white_win(),
        "0-1" => GameResult::black_win(),
        "1/2-1/2" | "½-½" | "0.5-0.5" | "=" => GameResult::draw(),
        "+-" | "1F-0F" => GameResult::forfeit(Outcome::WhiteWin),
        "-+" | "0F-1F" => GameResult::forfeit(Outcome::BlackWin),
        other => return Err(format!("unknown result '{other}' (use 1-0, 0-1, 1/2-1/2, +- or -+)")),
    };
    Ok(result)
}

fn parse_pairing(s: &str) -> Result<PairingId> {
    s.parse::<PairingId>()
        .with_context(|| format!("Invalid pairing id '{s}'"))
}
