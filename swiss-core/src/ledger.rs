//! Player ledger - authoritative per-player state for one section
//!
//! Every score, opponent list, color history and bye count is derived from
//! the results applied here. Applying is idempotent per pairing id; changing
//! a recorded result retracts the prior points first.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::color::{ColorPreference, ColorRules};
use crate::error::{EngineError, Result};
use crate::game::{ByeKind, Color, GameResult};
use crate::pairing::{Board, Pairing, PairingId};
use crate::player::PlayerId;

/// What was applied for a pairing
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recorded {
    Game { result: GameResult },
    Bye { bye: ByeKind },
}

/// One round from one player's point of view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerGame {
    pub round: u32,
    pub pairing: PairingId,
    pub opponent: Option<PlayerId>,
    pub color: Option<Color>,
    pub points: f64,
    pub bye: Option<ByeKind>,
    pub forfeit: bool,
}

impl LedgerGame {
    /// A game with an opponent that was not forfeited
    pub fn is_played(&self) -> bool {
        self.opponent.is_some() && !self.forfeit
    }

    pub fn is_win(&self) -> bool {
        self.opponent.is_some() && self.points == 1.0
    }

    pub fn is_draw(&self) -> bool {
        self.opponent.is_some() && self.points == 0.5
    }

    pub fn is_loss(&self) -> bool {
        self.opponent.is_some() && self.points == 0.0
    }
}

/// Per-player ledger entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub player: PlayerId,
    pub score: f64,
    /// Kept in round order
    pub games: Vec<LedgerGame>,
}

impl LedgerEntry {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            score: 0.0,
            games: Vec::new(),
        }
    }

    /// Colors of games actually played, oldest first
    pub fn color_history(&self) -> Vec<Color> {
        self.games
            .iter()
            .filter(|g| g.is_played())
            .filter_map(|g| g.color)
            .collect()
    }

    /// Every opponent paired against, forfeits included
    pub fn opponents(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.games.iter().filter_map(|g| g.opponent)
    }

    pub fn has_faced(&self, other: PlayerId) -> bool {
        self.opponents().any(|o| o == other)
    }

    pub fn bye_rounds(&self) -> Vec<u32> {
        self.games
            .iter()
            .filter(|g| g.bye.is_some())
            .map(|g| g.round)
            .collect()
    }

    /// Byes that count toward the allocated-bye rotation
    pub fn rotation_byes(&self) -> u32 {
        self.games
            .iter()
            .filter(|g| g.bye.is_some_and(ByeKind::counts_for_rotation))
            .count() as u32
    }

    /// Cumulative score after `round`
    pub fn score_through(&self, round: u32) -> f64 {
        self.games
            .iter()
            .filter(|g| g.round <= round)
            .map(|g| g.points)
            .sum()
    }

    pub fn game_in(&self, round: u32) -> Option<&LedgerGame> {
        self.games.iter().find(|g| g.round == round)
    }

    pub fn color_preference(&self, rules: &ColorRules) -> ColorPreference {
        ColorPreference::from_history(&self.color_history(), rules)
    }

    /// Color the player is due next, if any
    pub fn due_color(&self, rules: &ColorRules) -> Option<Color> {
        self.color_preference(rules).direction
    }

    fn insert(&mut self, game: LedgerGame) {
        self.score += game.points;
        let at = self.games.partition_point(|g| g.round <= game.round);
        self.games.insert(at, game);
    }

    fn remove(&mut self, pairing: &PairingId) -> Option<LedgerGame> {
        let at = self.games.iter().position(|g| &g.pairing == pairing)?;
        let game = self.games.remove(at);
        self.score -= game.points;
        Some(game)
    }
}

/// Net point change for one player
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointDelta {
    pub player: PlayerId,
    pub delta: f64,
}

/// Outcome of applying or retracting a result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerDelta {
    pub pairing: PairingId,
    /// Value overwritten by this write, so callers learn what they replaced
    pub previous: Option<Recorded>,
    pub current: Option<Recorded>,
    pub changes: Vec<PointDelta>,
}

impl LedgerDelta {
    pub fn is_noop(&self) -> bool {
        self.previous == self.current
    }

    /// Whether a different recorded value was overwritten
    pub fn overwrote(&self) -> bool {
        self.previous.is_some() && !self.is_noop()
    }
}

/// Ledger for one section
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    reached_round: u32,
    entries: FxHashMap<PlayerId, LedgerEntry>,
    applied: FxHashMap<PairingId, Recorded>,
    withdrawals: FxHashMap<PlayerId, u32>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `round` as reached; results for later rounds are rejected
    pub fn open_round(&mut self, round: u32) {
        self.reached_round = self.reached_round.max(round);
    }

    pub fn reached_round(&self) -> u32 {
        self.reached_round
    }

    /// Reject results for `player` in rounds `>= from_round`
    pub fn register_withdrawal(&mut self, player: PlayerId, from_round: u32) {
        self.withdrawals.insert(player, from_round);
    }

    pub fn entry(&self, player: PlayerId) -> Option<&LedgerEntry> {
        self.entries.get(&player)
    }

    pub fn entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.values()
    }

    pub fn score(&self, player: PlayerId) -> f64 {
        self.entries.get(&player).map_or(0.0, |e| e.score)
    }

    pub fn recorded(&self, pairing: &PairingId) -> Option<Recorded> {
        self.applied.get(pairing).copied()
    }

    /// Apply a game result
    ///
    /// Re-applying the same result is a no-op; a different result replaces
    /// the prior one and the delta reports both.
    pub fn apply(&mut self, pairing: &Pairing, result: GameResult) -> Result<LedgerDelta> {
        if pairing.is_bye() {
            return Err(EngineError::Validation(format!(
                "pairing {} is a bye and takes no game result",
                pairing.id
            )));
        }
        self.record(pairing, Recorded::Game { result })
    }

    /// Apply the points of a bye pairing
    pub fn apply_bye(&mut self, pairing: &Pairing) -> Result<LedgerDelta> {
        match pairing.board {
            Board::Bye { bye, .. } => self.record(pairing, Recorded::Bye { bye }),
            Board::Game { .. } => Err(EngineError::Validation(format!(
                "pairing {} is a game, not a bye",
                pairing.id
            ))),
        }
    }

    /// Remove whatever was applied for `pairing`
    pub fn retract(&mut self, pairing: &PairingId) -> Result<LedgerDelta> {
        let previous = self
            .applied
            .remove(pairing)
            .ok_or_else(|| EngineError::NotFound(format!("no result recorded for {pairing}")))?;
        let changes = self.remove_games(pairing);
        Ok(LedgerDelta {
            pairing: pairing.clone(),
            previous: Some(previous),
            current: None,
            changes,
        })
    }

    /// Cumulative score of every player after `round`
    pub fn snapshot_at(&self, round: u32) -> BTreeMap<PlayerId, f64> {
        self.entries
            .values()
            .map(|e| (e.player, e.score_through(round)))
            .collect()
    }

    /// Points distributed in `round` across all players
    pub fn total_points_in(&self, round: u32) -> f64 {
        self.entries
            .values()
            .flat_map(|e| e.games.iter())
            .filter(|g| g.round == round)
            .map(|g| g.points)
            .sum()
    }

    /// Drop all state
    pub fn clear(&mut self) {
        self.reached_round = 0;
        self.entries.clear();
        self.applied.clear();
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn check_applicable(&self, pairing: &Pairing) -> Result<()> {
        let round = pairing.round();
        if round > self.reached_round {
            return Err(EngineError::conflict(format!(
                "round {round} has not been reached (section is at round {})",
                self.reached_round
            )));
        }
        for player in pairing.players() {
            if let Some(&from_round) = self.withdrawals.get(&player) {
                if round >= from_round {
                    return Err(EngineError::conflict(format!(
                        "player {player} withdrew before round {round}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn record(&mut self, pairing: &Pairing, current: Recorded) -> Result<LedgerDelta> {
        self.check_applicable(pairing)?;

        let previous = self.applied.get(&pairing.id).copied();
        if previous == Some(current) {
            return Ok(LedgerDelta {
                pairing: pairing.id.clone(),
                previous,
                current: Some(current),
                changes: Vec::new(),
            });
        }

        let mut net: BTreeMap<PlayerId, f64> = BTreeMap::new();
        if previous.is_some() {
            for change in self.remove_games(&pairing.id) {
                *net.entry(change.player).or_default() += change.delta;
            }
        }
        for (player, game) in Self::games_for(pairing, current) {
            *net.entry(player).or_default() += game.points;
            self.entries
                .entry(player)
                .or_insert_with(|| LedgerEntry::new(player))
                .insert(game);
        }
        self.applied.insert(pairing.id.clone(), current);

        Ok(LedgerDelta {
            pairing: pairing.id.clone(),
            previous,
            current: Some(current),
            changes: net
                .into_iter()
                .map(|(player, delta)| PointDelta { player, delta })
                .collect(),
        })
    }

    fn remove_games(&mut self, pairing: &PairingId) -> Vec<PointDelta> {
        self.entries
            .values_mut()
            .filter_map(|entry| {
                entry.remove(pairing).map(|g| PointDelta {
                    player: entry.player,
                    delta: -g.points,
                })
            })
            .collect()
    }

    fn games_for(pairing: &Pairing, recorded: Recorded) -> Vec<(PlayerId, LedgerGame)> {
        let round = pairing.round();
        match (&pairing.board, recorded) {
            (&Board::Game { white, black }, Recorded::Game { result }) => {
                let (white_points, black_points) = result.points();
                vec![
                    (
                        white,
                        LedgerGame {
                            round,
                            pairing: pairing.id.clone(),
                            opponent: Some(black),
                            color: Some(Color::White),
                            points: white_points,
                            bye: None,
                            forfeit: result.forfeit,
                        },
                    ),
                    (
                        black,
                        LedgerGame {
                            round,
                            pairing: pairing.id.clone(),
                            opponent: Some(white),
                            color: Some(Color::Black),
                            points: black_points,
                            bye: None,
                            forfeit: result.forfeit,
                        },
                    ),
                ]
            }
            (&Board::Bye { player, bye, points }, Recorded::Bye { .. }) => vec![(
                player,
                LedgerGame {
                    round,
                    pairing: pairing.id.clone(),
                    opponent: None,
                    color: None,
                    points,
                    bye: Some(bye),
                    forfeit: bye == ByeKind::AbsentOpponent,
                },
            )],
            _ => Vec::new(),
        }
    }
}
