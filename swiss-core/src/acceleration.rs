//! Score acceleration for the opening rounds (Baku method)
//!
//! The top seeds ("group A") carry virtual points while pairing the first
//! rounds so strong players meet each other earlier. Virtual points affect
//! pairing only; standings never see them.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::player::PlayerId;

/// Acceleration settings
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Acceleration {
    pub enabled: bool,
    /// Rounds in which virtual points apply, counted from round 1
    pub accelerated_rounds: u32,
    /// Rounds receiving the full bonus; the remainder get half
    pub full_bonus_rounds: u32,
    pub bonus: f64,
}

impl Default for Acceleration {
    fn default() -> Self {
        Self {
            enabled: false,
            accelerated_rounds: 2,
            full_bonus_rounds: 1,
            bonus: 1.0,
        }
    }
}

impl Acceleration {
    /// Baku acceleration over the first `rounds` rounds
    pub fn baku(rounds: u32) -> Self {
        Self {
            enabled: true,
            accelerated_rounds: rounds,
            full_bonus_rounds: rounds.div_ceil(2),
            bonus: 1.0,
        }
    }

    /// Group A size for a section of `players`: 2 * ceil(n / 4)
    pub fn group_a_size(&self, players: usize) -> usize {
        (2 * players.div_ceil(4)).min(players)
    }

    /// Virtual points for a group A player in `round`
    pub fn bonus_for(&self, round: u32) -> f64 {
        if !self.enabled || round == 0 || round > self.accelerated_rounds {
            0.0
        } else if round <= self.full_bonus_rounds {
            self.bonus
        } else {
            self.bonus / 2.0
        }
    }

    /// Virtual points per player for `round`
    ///
    /// # Arguments
    /// * `round` - Round being paired
    /// * `seeding` - All section players in initial rank order
    ///
    /// # Returns
    /// Map holding only players that receive a non-zero bonus
    pub fn bonuses(&self, round: u32, seeding: &[PlayerId]) -> FxHashMap<PlayerId, f64> {
        let bonus = self.bonus_for(round);
        if bonus == 0.0 {
            return FxHashMap::default();
        }
        seeding
            .iter()
            .take(self.group_a_size(seeding.len()))
            .map(|&id| (id, bonus))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_gives_nothing() {
        let acc = Acceleration::default();
        assert_eq!(acc.bonus_for(1), 0.0);
        let seeding: Vec<PlayerId> = (1..=8).map(PlayerId).collect();
        assert!(acc.bonuses(1, &seeding).is_empty());
    }

    #[test]
    fn test_group_a_size() {
        let acc = Acceleration::baku(4);
        assert_eq!(acc.group_a_size(16), 8);
        assert_eq!(acc.group_a_size(18), 10);
        assert_eq!(acc.group_a_size(3), 2);
        assert_eq!(acc.group_a_size(1), 1);
        assert_eq!(acc.group_a_size(0), 0);
    }

    #[test]
    fn test_bonus_schedule() {
        let acc = Acceleration::baku(4);
        assert_eq!(acc.full_bonus_rounds, 2);
        assert_eq!(acc.bonus_for(1), 1.0);
        assert_eq!(acc.bonus_for(2), 1.0);
        assert_eq!(acc.bonus_for(3), 0.5);
        assert_eq!(acc.bonus_for(4), 0.5);
        assert_eq!(acc.bonus_for(5), 0.0);
    }

    #[test]
    fn test_bonuses_top_seeds_only() {
        let acc = Acceleration::baku(2);
        let seeding: Vec<PlayerId> = (1..=8).map(PlayerId).collect();
        let bonuses = acc.bonuses(1, &seeding);
        assert_eq!(bonuses.len(), 4);
        assert_eq!(bonuses.get(&PlayerId(1)), Some(&1.0));
        assert!(bonuses.get(&PlayerId(5)).is_none());
    }
}
