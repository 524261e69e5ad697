//! Round state machine and the view models it hands out

use serde::{Deserialize, Serialize};
use std::fmt;
use swiss_core::{EngineError, Pairing, Result, SectionId, TeamId, TournamentId};

use crate::generator::PairingWarning;

/// Lifecycle of one section
///
/// `NotStarted -> PairingsGenerated(1) -> ResultsPending(1) -> RoundComplete(1)
/// -> PairingsGenerated(2) -> ... -> TournamentComplete`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "round", rename_all = "snake_case")]
pub enum RoundState {
    #[default]
    NotStarted,
    PairingsGenerated(u32),
    ResultsPending(u32),
    RoundComplete(u32),
    TournamentComplete,
}

impl RoundState {
    /// Round currently in play or last completed
    pub fn current_round(&self) -> Option<u32> {
        match *self {
            RoundState::PairingsGenerated(r) | RoundState::ResultsPending(r) | RoundState::RoundComplete(r) => Some(r),
            RoundState::NotStarted | RoundState::TournamentComplete => None,
        }
    }

    /// Round that `generate_next_round` would pair
    pub fn next_round(&self) -> Option<u32> {
        match *self {
            RoundState::NotStarted => Some(1),
            RoundState::PairingsGenerated(r) | RoundState::ResultsPending(r) | RoundState::RoundComplete(r) => {
                Some(r + 1)
            }
            RoundState::TournamentComplete => None,
        }
    }

    /// Whether results for `round` are still being collected
    pub fn accepts_results(&self, round: u32) -> bool {
        matches!(*self, RoundState::PairingsGenerated(r) | RoundState::ResultsPending(r) if r == round)
    }

    pub(crate) fn check_generate(&self, round: u32) -> Result<()> {
        match *self {
            RoundState::NotStarted if round == 1 => Ok(()),
            RoundState::RoundComplete(r) if round == r + 1 => Ok(()),
            RoundState::NotStarted => Err(EngineError::conflict(format!(
                "cannot pair round {round} before round 1"
            ))),
            RoundState::PairingsGenerated(r) | RoundState::ResultsPending(r) => Err(EngineError::conflict(format!(
                "round {r} is still in progress; complete it before pairing round {round}"
            ))),
            RoundState::RoundComplete(r) => Err(EngineError::conflict(format!(
                "round {r} is the last completed round; round {round} is out of sequence"
            ))),
            RoundState::TournamentComplete => Err(EngineError::conflict("tournament is complete")),
        }
    }

    pub(crate) fn check_record(&self, round: u32) -> Result<()> {
        if self.accepts_results(round) {
            return Ok(());
        }
        Err(EngineError::conflict(format!(
            "results for round {round} are not accepted while section is {self}"
        )))
    }

    pub(crate) fn check_complete(&self, round: u32) -> Result<()> {
        if self.accepts_results(round) {
            return Ok(());
        }
        match *self {
            RoundState::RoundComplete(r) if r == round => {
                Err(EngineError::conflict(format!("round {round} is already complete")))
            }
            RoundState::TournamentComplete => Err(EngineError::conflict("tournament is complete")),
            _ => Err(EngineError::conflict(format!(
                "round {round} cannot be completed while section is {self}"
            ))),
        }
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundState::NotStarted => write!(f, "not started"),
            RoundState::PairingsGenerated(r) => write!(f, "round {r}: pairings generated"),
            RoundState::ResultsPending(r) => write!(f, "round {r}: results pending"),
            RoundState::RoundComplete(r) => write!(f, "round {r}: complete"),
            RoundState::TournamentComplete => write!(f, "tournament complete"),
        }
    }
}

/// Pairings of one round with the compromises made to produce them
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairingSet {
    pub tournament: TournamentId,
    pub section: SectionId,
    pub round: u32,
    /// Board order, byes last
    pub pairings: Vec<Pairing>,
    pub warnings: Vec<PairingWarning>,
    /// Team-level warnings for team-vs-team pairing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team_warnings: Vec<PairingWarning<TeamId>>,
}

impl PairingSet {
    pub fn games(&self) -> impl Iterator<Item = &Pairing> {
        self.pairings.iter().filter(|p| !p.is_bye())
    }

    pub fn byes(&self) -> impl Iterator<Item = &Pairing> {
        self.pairings.iter().filter(|p| p.is_bye())
    }
}

/// Summary returned when a round is closed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundCompletion {
    pub tournament: TournamentId,
    pub section: SectionId,
    pub round: u32,
    pub games: usize,
    pub byes: usize,
    pub points_awarded: f64,
    pub tournament_complete: bool,
    pub state: RoundState,
}

/// Acknowledgement of a section reset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetAck {
    pub tournament: TournamentId,
    pub section: SectionId,
    pub pairings_removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sequence() {
        assert!(RoundState::NotStarted.check_generate(1).is_ok());
        assert!(RoundState::NotStarted.check_generate(2).is_err());
        assert!(RoundState::RoundComplete(2).check_generate(3).is_ok());
        assert!(RoundState::RoundComplete(2).check_generate(5).is_err());
        assert!(RoundState::ResultsPending(2).check_generate(3).is_err());
        assert!(RoundState::TournamentComplete.check_generate(1).is_err());
    }

    #[test]
    fn test_record_and_complete_guards() {
        assert!(RoundState::PairingsGenerated(1).check_record(1).is_ok());
        assert!(RoundState::ResultsPending(1).check_record(1).is_ok());
        assert!(RoundState::ResultsPending(2).check_record(1).is_err());
        assert!(RoundState::RoundComplete(1).check_record(1).is_err());

        let err = RoundState::RoundComplete(1).check_complete(1).unwrap_err();
        assert!(err.to_string().contains("already complete"));
        assert!(RoundState::PairingsGenerated(3).check_complete(3).is_ok());
    }

    #[test]
    fn test_next_round() {
        assert_eq!(RoundState::NotStarted.next_round(), Some(1));
        assert_eq!(RoundState::ResultsPending(4).next_round(), Some(5));
        assert_eq!(RoundState::TournamentComplete.next_round(), None);
        assert_eq!(RoundState::RoundComplete(2).current_round(), Some(2));
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&RoundState::ResultsPending(3)).unwrap();
        assert_eq!(json, r#"{"state":"results_pending","round":3}"#);
        let back: RoundState = serde_json::from_str(r#"{"state":"not_started"}"#).unwrap();
        assert_eq!(back, RoundState::NotStarted);
    }
}
