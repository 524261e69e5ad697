//! Swiss Tournament - Section lifecycle, pairing and standings
//!
//! This crate provides the engine operations on top of `swiss-core`:
//! - Pairing generation (Dutch and Monrad score-group pairing)
//! - Round state machine per section
//! - Tiebreaks and ranked standings
//! - Team match aggregation and team-vs-team pairing
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: Tournament, Section (orchestration)
//! - Level 2: generate, compute_standings, aggregate_round (phases)
//! - Level 3: TiebreakCalculator, team drafting (steps)
//! - Level 4: utilities, configuration

mod config;
mod generator;
mod locks;
mod round;
mod section;
mod simulate;
mod standings;
mod team;
mod tiebreak;
mod tournament;

pub use config::{
    BoardScoring, ByeConfig, ByeOpponentValue, ColorStrictness, MatchPoints, PairingConfig, PairingSystem,
    RematchPolicy, SectionFormat, TeamConfig, TournamentConfig,
};
pub use generator::{generate, Entrant, FloatDirection, PairingPlan, PairingWarning, PlannedGame};
pub use locks::{SectionLease, SectionLocks};
pub use round::{PairingSet, ResetAck, RoundCompletion, RoundState};
pub use section::{Section, SectionRecord};
pub use simulate::{expected_score, play_out_tournament, Simulator};
pub use standings::{compute_standings, RankedStandings, StandingRow, TiebreakValue};
pub use team::{
    aggregate_round, compute_team_standings, team_tallies, RankedTeamStandings, TeamMatch, TeamStandingRow,
    TeamTally,
};
pub use tiebreak::{Placement, Tiebreak, TiebreakCalculator};
pub use tournament::Tournament;
