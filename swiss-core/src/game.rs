//! Game results, colors and bye kinds

use serde::{Deserialize, Serialize};

/// Piece color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

/// Over-the-board outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    WhiteWin,
    BlackWin,
    Draw,
}

/// Recorded result of a paired game
///
/// Forfeits carry the same point split as the matching outcome but are
/// flagged so reporting and color history can tell them apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameResult {
    pub outcome: Outcome,
    #[serde(default)]
    pub forfeit: bool,
}

impl GameResult {
    pub const fn new(outcome: Outcome) -> Self {
        Self { outcome, forfeit: false }
    }

    pub const fn forfeit(outcome: Outcome) -> Self {
        Self { outcome, forfeit: true }
    }

    pub const fn white_win() -> Self {
        Self::new(Outcome::WhiteWin)
    }

    pub const fn black_win() -> Self {
        Self::new(Outcome::BlackWin)
    }

    pub const fn draw() -> Self {
        Self::new(Outcome::Draw)
    }

    /// Points as (white, black); always sums to 1
    pub fn points(&self) -> (f64, f64) {
        match self.outcome {
            Outcome::WhiteWin => (1.0, 0.0),
            Outcome::BlackWin => (0.0, 1.0),
            Outcome::Draw => (0.5, 0.5),
        }
    }

    /// Points earned by the side playing `color`
    pub fn points_for(&self, color: Color) -> f64 {
        let (white, black) = self.points();
        match color {
            Color::White => white,
            Color::Black => black,
        }
    }
}

/// Kind of bye a player receives
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ByeKind {
    /// Unpaired by request, awarded a full point
    UnpairedFull,
    /// Unpaired by request, awarded half a point
    HalfPoint,
    /// Assigned by the pairing generator for an odd pool
    PairingAllocated,
    /// Team board left empty by the opposing team; a forfeit win
    AbsentOpponent,
}

impl ByeKind {
    /// Whether the bye counts toward the one-allocated-bye-per-event rotation
    pub fn counts_for_rotation(self) -> bool {
        matches!(self, ByeKind::UnpairedFull | ByeKind::PairingAllocated)
    }
}

/// Point value awarded for each bye kind
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ByePoints {
    pub unpaired_full: f64,
    pub half_point: f64,
    pub pairing_allocated: f64,
}

impl Default for ByePoints {
    fn default() -> Self {
        Self {
            unpaired_full: 1.0,
            half_point: 0.5,
            pairing_allocated: 1.0,
        }
    }
}

impl ByePoints {
    pub fn points(&self, kind: ByeKind) -> f64 {
        match kind {
            ByeKind::UnpairedFull => self.unpaired_full,
            ByeKind::HalfPoint => self.half_point,
            ByeKind::PairingAllocated => self.pairing_allocated,
            ByeKind::AbsentOpponent => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_result_distributes_one_point() {
        for outcome in [Outcome::WhiteWin, Outcome::BlackWin, Outcome::Draw] {
            for result in [GameResult::new(outcome), GameResult::forfeit(outcome)] {
                let (white, black) = result.points();
                assert_eq!(white + black, 1.0);
            }
        }
    }

    #[test]
    fn test_forfeit_is_distinguishable() {
        let normal = GameResult::white_win();
        let forfeit = GameResult::forfeit(Outcome::WhiteWin);
        assert_eq!(normal.points(), forfeit.points());
        assert_ne!(normal, forfeit);
    }

    #[test]
    fn test_points_for_color() {
        let result = GameResult::black_win();
        assert_eq!(result.points_for(Color::White), 0.0);
        assert_eq!(result.points_for(Color::Black), 1.0);
        assert_eq!(GameResult::draw().points_for(Color::Black), 0.5);
    }

    #[test]
    fn test_bye_points_defaults() {
        let points = ByePoints::default();
        assert_eq!(points.points(ByeKind::PairingAllocated), 1.0);
        assert_eq!(points.points(ByeKind::HalfPoint), 0.5);
        assert_eq!(points.points(ByeKind::UnpairedFull), 1.0);
        assert!(!ByeKind::HalfPoint.counts_for_rotation());
        assert!(ByeKind::PairingAllocated.counts_for_rotation());
    }

    #[test]
    fn test_absent_opponent_is_a_full_point() {
        let points = ByePoints {
            pairing_allocated: 0.0,
            ..Default::default()
        };
        assert_eq!(points.points(ByeKind::AbsentOpponent), 1.0);
        assert!(!ByeKind::AbsentOpponent.counts_for_rotation());
        let json = serde_json::to_string(&ByeKind::AbsentOpponent).unwrap();
        assert_eq!(json, "\"absent-opponent\"");
    }

    #[test]
    fn test_bye_kind_wire_names() {
        let json = serde_json::to_string(&ByeKind::PairingAllocated).unwrap();
        assert_eq!(json, "\"pairing-allocated\"");
        assert_eq!(Color::White.opposite(), Color::Black);
    }
}
