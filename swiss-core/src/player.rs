//! Player - identity, rating, section membership and status

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Tournament identifier supplied by the persistence collaborator
pub type TournamentId = String;

/// Section identifier, unique within a tournament
pub type SectionId = String;

/// Team identifier for team-format sections
pub type TeamId = String;

/// Player identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Participation status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlayerStatus {
    #[default]
    Active,
    /// Takes no part in rounds `>= from_round`
    Withdrawn { from_round: u32 },
}

impl PlayerStatus {
    /// Whether the player takes part in `round`
    pub fn plays_in(&self, round: u32) -> bool {
        match *self {
            PlayerStatus::Active => true,
            PlayerStatus::Withdrawn { from_round } => round < from_round,
        }
    }
}

/// A registered player
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// `None` for unrated players
    #[serde(default)]
    pub rating: Option<u32>,
    pub section: SectionId,
    #[serde(default)]
    pub status: PlayerStatus,
    /// Rounds for which a bye was requested in advance
    #[serde(default)]
    pub intentional_byes: BTreeSet<u32>,
    #[serde(default)]
    pub team: Option<TeamId>,
    /// Registration order, the final deterministic ordering key
    #[serde(default)]
    pub registration: u32,
}

impl Player {
    /// Create an active player; registration order defaults to the id
    pub fn new(id: u32, name: impl Into<String>, rating: Option<u32>, section: impl Into<SectionId>) -> Self {
        Self {
            id: PlayerId(id),
            name: name.into(),
            rating,
            section: section.into(),
            status: PlayerStatus::Active,
            intentional_byes: BTreeSet::new(),
            team: None,
            registration: id,
        }
    }

    /// Assign to a team
    pub fn with_team(mut self, team: impl Into<TeamId>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Request a bye for `round`
    pub fn with_bye(mut self, round: u32) -> Self {
        self.intentional_byes.insert(round);
        self
    }

    /// Set registration order
    pub fn with_registration(mut self, registration: u32) -> Self {
        self.registration = registration;
        self
    }

    pub fn is_unrated(&self) -> bool {
        self.rating.is_none()
    }

    /// Whether the player asked to sit out `round`
    pub fn requests_bye(&self, round: u32) -> bool {
        self.intentional_byes.contains(&round)
    }

    /// Whether the player takes part in `round` at all
    pub fn plays_in(&self, round: u32) -> bool {
        self.status.plays_in(round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withdrawn_player_rounds() {
        let status = PlayerStatus::Withdrawn { from_round: 3 };
        assert!(status.plays_in(1));
        assert!(status.plays_in(2));
        assert!(!status.plays_in(3));
        assert!(!status.plays_in(7));
        assert!(PlayerStatus::Active.plays_in(99));
    }

    #[test]
    fn test_player_builders() {
        let player = Player::new(7, "Ana", None, "open").with_team("Rooks").with_bye(2);
        assert!(player.is_unrated());
        assert!(player.requests_bye(2));
        assert!(!player.requests_bye(1));
        assert_eq!(player.team.as_deref(), Some("Rooks"));
        assert_eq!(player.registration, 7);
        assert_eq!(player.id.to_string(), "#7");
    }

    #[test]
    fn test_player_deserialize_defaults() {
        let json = r#"{"id": 4, "name": "Bo", "section": "u1600"}"#;
        let player: Player = serde_json::from_str(json).unwrap();
        assert_eq!(player.id, PlayerId(4));
        assert_eq!(player.status, PlayerStatus::Active);
        assert!(player.intentional_byes.is_empty());
        assert!(player.rating.is_none());
    }
}
