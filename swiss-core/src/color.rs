//! Color balance tracking
//!
//! Preferences are derived from a player's color history on demand and never
//! stored on their own.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::game::Color;

/// How firmly a player's history dictates the next color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceStrength {
    #[default]
    None,
    Mild,
    Strong,
    Absolute,
}

/// Color limits for a section
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorRules {
    /// Longest run of one color a player may reach
    pub max_streak: u32,
    /// Largest |white - black| a player may reach
    pub max_imbalance: u32,
}

impl Default for ColorRules {
    fn default() -> Self {
        Self {
            max_streak: 2,
            max_imbalance: 2,
        }
    }
}

/// Derived color preference of one player
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPreference {
    /// Games as white minus games as black
    pub imbalance: i32,
    /// Length of the trailing run of `last`
    pub streak: u32,
    pub last: Option<Color>,
    /// Color the player should get next, if any
    pub direction: Option<Color>,
    pub strength: PreferenceStrength,
    /// Color that would push the player past the configured limits
    pub forbidden: Option<Color>,
}

impl ColorPreference {
    /// Compute the preference from colors actually played, oldest first
    pub fn from_history(history: &[Color], rules: &ColorRules) -> Self {
        let Some(&last) = history.last() else {
            return Self::default();
        };

        let imbalance: i32 = history
            .iter()
            .map(|c| match c {
                Color::White => 1,
                Color::Black => -1,
            })
            .sum();
        let streak = history.iter().rev().take_while(|&&c| c == last).count() as u32;
        let magnitude = imbalance.unsigned_abs();
        let underplayed = if imbalance > 0 { Color::Black } else { Color::White };

        let (direction, strength) = if streak >= rules.max_streak {
            (last.opposite(), PreferenceStrength::Absolute)
        } else if magnitude > rules.max_imbalance {
            (underplayed, PreferenceStrength::Absolute)
        } else if magnitude >= 2 {
            (underplayed, PreferenceStrength::Strong)
        } else if magnitude == 1 {
            (underplayed, PreferenceStrength::Mild)
        } else {
            // Balanced: alternate from the last game, without weight
            (last.opposite(), PreferenceStrength::None)
        };

        let forbidden = [Color::White, Color::Black]
            .into_iter()
            .find(|&c| Self::exceeds(history, c, rules));

        Self {
            imbalance,
            streak,
            last: Some(last),
            direction: Some(direction),
            strength,
            forbidden,
        }
    }

    /// Whether receiving `color` next would break the configured limits
    fn exceeds(history: &[Color], color: Color, rules: &ColorRules) -> bool {
        let run = 1 + history.iter().rev().take_while(|&&c| c == color).count() as u32;
        let imbalance: i32 = history
            .iter()
            .chain(std::iter::once(&color))
            .map(|c| match c {
                Color::White => 1,
                Color::Black => -1,
            })
            .sum();
        run > rules.max_streak || imbalance.unsigned_abs() > rules.max_imbalance
    }

    pub fn is_absolute(&self) -> bool {
        self.strength == PreferenceStrength::Absolute
    }

    /// Whether this player can receive `color` without exceeding limits
    pub fn tolerates(&self, color: Color) -> bool {
        self.forbidden != Some(color)
    }

    /// Two players can share a board unless both refuse the same color
    pub fn compatible_with(&self, other: &ColorPreference) -> bool {
        match (self.forbidden, other.forbidden) {
            (Some(a), Some(b)) => a != b,
            _ => true,
        }
    }

    /// Compare preference weight: strength, then streak, then imbalance
    pub fn weight_cmp(&self, other: &ColorPreference) -> Ordering {
        self.strength
            .cmp(&other.strength)
            .then_with(|| self.streak.cmp(&other.streak))
            .then_with(|| self.imbalance.unsigned_abs().cmp(&other.imbalance.unsigned_abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Color::{Black as B, White as W};

    fn pref(history: &[Color]) -> ColorPreference {
        ColorPreference::from_history(history, &ColorRules::default())
    }

    #[test]
    fn test_no_history_no_preference() {
        let p = pref(&[]);
        assert_eq!(p.strength, PreferenceStrength::None);
        assert_eq!(p.direction, None);
        assert_eq!(p.imbalance, 0);
    }

    #[test]
    fn test_balanced_alternates_without_weight() {
        let p = pref(&[W, B]);
        assert_eq!(p.strength, PreferenceStrength::None);
        assert_eq!(p.direction, Some(W));
    }

    #[test]
    fn test_mild_preference() {
        let p = pref(&[W]);
        assert_eq!(p.strength, PreferenceStrength::Mild);
        assert_eq!(p.direction, Some(B));
        assert_eq!(p.imbalance, 1);
    }

    #[test]
    fn test_strong_preference_without_streak() {
        let p = pref(&[B, W, B, B, W, B]);
        assert_eq!(p.imbalance, -2);
        assert_eq!(p.strength, PreferenceStrength::Strong);
        assert_eq!(p.direction, Some(W));
        assert_eq!(p.forbidden, Some(B));
    }

    #[test]
    fn test_two_in_a_row_is_absolute() {
        let p = pref(&[B, B, W, W]);
        assert_eq!(p.imbalance, 0);
        assert_eq!(p.streak, 2);
        assert_eq!(p.strength, PreferenceStrength::Absolute);
        assert_eq!(p.direction, Some(B));
        assert!(!p.tolerates(W));
        assert!(p.tolerates(B));
    }

    #[test]
    fn test_compatibility() {
        let wants_black = pref(&[W, W]);
        let also_black = pref(&[B, W, W]);
        let wants_white = pref(&[B, B]);
        assert!(!wants_black.compatible_with(&also_black));
        assert!(wants_black.compatible_with(&wants_white));
        assert!(wants_black.compatible_with(&pref(&[])));
    }

    #[test]
    fn test_weight_ordering() {
        let absolute = pref(&[W, W]);
        let mild = pref(&[W]);
        assert_eq!(absolute.weight_cmp(&mild), Ordering::Greater);
        assert_eq!(mild.weight_cmp(&mild), Ordering::Equal);
    }
}
