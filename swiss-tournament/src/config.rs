//! Configuration types for a tournament
//!
//! Level 4 - Utilities and configuration

use serde::{Deserialize, Serialize};
use swiss_core::{Acceleration, ByeKind, ByePoints, Color, ColorRules};

use crate::tiebreak::Tiebreak;

/// How players inside a score group are matched
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingSystem {
    /// Top half against bottom half
    #[default]
    Dutch,
    /// Adjacent players: 1 v 2, 3 v 4
    Monrad,
}

/// Whether color limits may block a pairing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorStrictness {
    /// Avoid pairings that push a player past the limits when any alternative exists
    #[default]
    Strict,
    /// Colors never influence who meets whom
    Relaxed,
}

/// Handling of repeated opponents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RematchPolicy {
    /// Rematch only when no alternative exists, with a warning
    #[default]
    AllowForced,
    /// Fail the round instead of pairing a rematch
    Forbid,
}

/// Value of a bye when summing opponents' scores
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByeOpponentValue {
    #[default]
    Zero,
    /// The player's own score stands in for the missing opponent
    OwnScore,
}

/// Individual or team event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionFormat {
    #[default]
    Individual,
    /// Teams are paired; each team pairing expands into board pairings
    Team,
}

/// Pairing generator settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    pub system: PairingSystem,
    pub colors: ColorRules,
    pub strictness: ColorStrictness,
    pub rematch: RematchPolicy,
    /// Color of the higher-ranked player on odd boards when nobody has history
    pub initial_color: Color,
    /// Whether an odd pool may be completed with a bye
    pub allow_bye: bool,
    /// Search nodes per attempt before a constraint is relaxed
    pub search_budget: usize,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            system: PairingSystem::Dutch,
            colors: ColorRules::default(),
            strictness: ColorStrictness::Strict,
            rematch: RematchPolicy::AllowForced,
            initial_color: Color::White,
            allow_bye: true,
            search_budget: 50_000,
        }
    }
}

/// Bye settings
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ByeConfig {
    pub points: ByePoints,
    /// Kind given to players who requested a bye in advance
    pub intentional: ByeKind,
    pub opponent_value: ByeOpponentValue,
}

impl Default for ByeConfig {
    fn default() -> Self {
        Self {
            points: ByePoints::default(),
            intentional: ByeKind::HalfPoint,
            opponent_value: ByeOpponentValue::Zero,
        }
    }
}

/// Which boards count toward a team's game points
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardScoring {
    #[default]
    AllBoards,
    TopBoards(usize),
}

impl BoardScoring {
    /// Whether the board at zero-based `index` counts
    pub fn counts(&self, index: usize) -> bool {
        match *self {
            BoardScoring::AllBoards => true,
            BoardScoring::TopBoards(n) => index < n,
        }
    }
}

/// Match points for a team match win, draw and loss
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPoints {
    #[default]
    TwoOneZero,
    OneHalfZero,
}

impl MatchPoints {
    pub fn win(&self) -> f64 {
        match self {
            MatchPoints::TwoOneZero => 2.0,
            MatchPoints::OneHalfZero => 1.0,
        }
    }

    pub fn draw(&self) -> f64 {
        self.win() / 2.0
    }

    pub fn loss(&self) -> f64 {
        0.0
    }
}

/// Team event settings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    pub boards: usize,
    pub scoring: BoardScoring,
    pub match_points: MatchPoints,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            boards: 4,
            scoring: BoardScoring::AllBoards,
            match_points: MatchPoints::TwoOneZero,
        }
    }
}

/// Tournament configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    pub total_rounds: u32,
    pub pairing: PairingConfig,
    pub acceleration: Acceleration,
    pub byes: ByeConfig,
    /// Applied in order after score
    pub tiebreaks: Vec<Tiebreak>,
    pub team: TeamConfig,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            total_rounds: 5,
            pairing: PairingConfig::default(),
            acceleration: Acceleration::default(),
            byes: ByeConfig::default(),
            tiebreaks: vec![
                Tiebreak::ModifiedBuchholz {
                    drop_lowest: 1,
                    drop_highest: 1,
                },
                Tiebreak::Buchholz,
                Tiebreak::SonnebornBerger,
                Tiebreak::Cumulative,
            ],
            team: TeamConfig::default(),
        }
    }
}

impl TournamentConfig {
    /// Create a Swiss event of `rounds` rounds
    pub fn swiss(rounds: u32) -> Self {
        Self {
            total_rounds: rounds,
            ..Default::default()
        }
    }

    /// Create a team Swiss event of `rounds` rounds on `boards` boards
    pub fn team_swiss(rounds: u32, boards: usize) -> Self {
        Self {
            total_rounds: rounds,
            team: TeamConfig {
                boards,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Set the tiebreak order
    pub fn with_tiebreaks(mut self, tiebreaks: Vec<Tiebreak>) -> Self {
        self.tiebreaks = tiebreaks;
        self
    }

    /// Set acceleration
    pub fn with_acceleration(mut self, acceleration: Acceleration) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Set pairing system variant
    pub fn with_system(mut self, system: PairingSystem) -> Self {
        self.pairing.system = system;
        self
    }

    /// Set rematch policy
    pub fn with_rematch(mut self, rematch: RematchPolicy) -> Self {
        self.pairing.rematch = rematch;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tournament_config_defaults() {
        let config = TournamentConfig::default();
        assert_eq!(config.total_rounds, 5);
        assert_eq!(config.pairing.system, PairingSystem::Dutch);
        assert_eq!(config.byes.intentional, ByeKind::HalfPoint);
        assert!(!config.acceleration.enabled);
        assert_eq!(config.tiebreaks.len(), 4);
    }

    #[test]
    fn test_tournament_config_swiss() {
        let config = TournamentConfig::swiss(7).with_system(PairingSystem::Monrad);
        assert_eq!(config.total_rounds, 7);
        assert_eq!(config.pairing.system, PairingSystem::Monrad);
    }

    #[test]
    fn test_partial_config_deserializes() {
        let json = r#"{"total_rounds": 3, "team": {"scoring": {"top_boards": 3}}}"#;
        let config: TournamentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.total_rounds, 3);
        assert_eq!(config.team.scoring, BoardScoring::TopBoards(3));
        assert_eq!(config.team.boards, 4);
        assert!(config.pairing.allow_bye);
    }

    #[test]
    fn test_match_points() {
        assert_eq!(MatchPoints::TwoOneZero.win(), 2.0);
        assert_eq!(MatchPoints::TwoOneZero.draw(), 1.0);
        assert_eq!(MatchPoints::OneHalfZero.draw(), 0.5);
        assert!(BoardScoring::TopBoards(2).counts(1));
        assert!(!BoardScoring::TopBoards(2).counts(2));
    }
}
