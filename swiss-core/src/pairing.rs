//! Pairing - one board of one round in one section

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;
use crate::game::{ByeKind, Color, GameResult};
use crate::player::{PlayerId, SectionId, TeamId, TournamentId};

/// Pairing identity: section, round and board are unique together
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairingId {
    pub section: SectionId,
    pub round: u32,
    pub board: u32,
}

impl PairingId {
    pub fn new(section: impl Into<SectionId>, round: u32, board: u32) -> Self {
        Self {
            section: section.into(),
            round,
            board,
        }
    }
}

impl fmt::Display for PairingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-r{}-b{}", self.section, self.round, self.board)
    }
}

impl FromStr for PairingId {
    type Err = EngineError;

    /// Parse the `section-rN-bM` form produced by `Display`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || EngineError::Validation(format!("malformed pairing id '{s}'"));
        let (rest, board) = s.rsplit_once("-b").ok_or_else(malformed)?;
        let (section, round) = rest.rsplit_once("-r").ok_or_else(malformed)?;
        if section.is_empty() {
            return Err(malformed());
        }
        Ok(Self {
            section: section.to_string(),
            round: round.parse().map_err(|_| malformed())?,
            board: board.parse().map_err(|_| malformed())?,
        })
    }
}

/// Who sits at the board
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Board {
    Game { white: PlayerId, black: PlayerId },
    /// `points` is stamped when the bye is assigned
    Bye { player: PlayerId, bye: ByeKind, points: f64 },
}

/// The two teams a board belongs to in team-format sections
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchLabel {
    /// Team with white on the first board (or the team receiving a bye)
    pub home: TeamId,
    pub away: Option<TeamId>,
}

/// A single pairing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub id: PairingId,
    pub tournament: TournamentId,
    pub board: Board,
    /// `None` until recorded; always `None` for byes
    #[serde(default)]
    pub result: Option<GameResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_match: Option<MatchLabel>,
}

impl Pairing {
    pub fn game(tournament: impl Into<TournamentId>, id: PairingId, white: PlayerId, black: PlayerId) -> Self {
        Self {
            id,
            tournament: tournament.into(),
            board: Board::Game { white, black },
            result: None,
            team_match: None,
        }
    }

    pub fn bye(tournament: impl Into<TournamentId>, id: PairingId, player: PlayerId, bye: ByeKind, points: f64) -> Self {
        Self {
            id,
            tournament: tournament.into(),
            board: Board::Bye { player, bye, points },
            result: None,
            team_match: None,
        }
    }

    pub fn with_label(mut self, label: MatchLabel) -> Self {
        self.team_match = Some(label);
        self
    }

    pub fn round(&self) -> u32 {
        self.id.round
    }

    pub fn board_number(&self) -> u32 {
        self.id.board
    }

    pub fn is_bye(&self) -> bool {
        matches!(self.board, Board::Bye { .. })
    }

    pub fn bye_kind(&self) -> Option<ByeKind> {
        match self.board {
            Board::Bye { bye, .. } => Some(bye),
            Board::Game { .. } => None,
        }
    }

    /// Byes are complete on creation; games once a result is recorded
    pub fn is_complete(&self) -> bool {
        self.is_bye() || self.result.is_some()
    }

    /// Players seated at this board
    pub fn players(&self) -> Vec<PlayerId> {
        match self.board {
            Board::Game { white, black } => vec![white, black],
            Board::Bye { player, .. } => vec![player],
        }
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        match self.board {
            Board::Game { white, black } => white == player || black == player,
            Board::Bye { player: p, .. } => p == player,
        }
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        match self.board {
            Board::Game { white, black } if white == player => Some(black),
            Board::Game { white, black } if black == player => Some(white),
            _ => None,
        }
    }

    pub fn color_of(&self, player: PlayerId) -> Option<Color> {
        match self.board {
            Board::Game { white, .. } if white == player => Some(Color::White),
            Board::Game { black, .. } if black == player => Some(Color::Black),
            _ => None,
        }
    }

    /// Points earned by `player` here, if the board is complete
    pub fn points_for(&self, player: PlayerId) -> Option<f64> {
        match self.board {
            Board::Bye { player: p, points, .. } if p == player => Some(points),
            Board::Game { .. } => {
                let color = self.color_of(player)?;
                self.result.map(|r| r.points_for(color))
            }
            Board::Bye { .. } => None,
        }
    }

    /// Total points distributed by this board once complete
    pub fn points_awarded(&self) -> Option<f64> {
        match self.board {
            Board::Bye { points, .. } => Some(points),
            Board::Game { .. } => self.result.map(|r| {
                let (white, black) = r.points();
                white + black
            }),
        }
    }
}
