//! Tiebreak criteria and ranking
//!
//! Level 3 - Every value is computed from the ledger as of a cutoff round,
//! so standings for an earlier round never see later results.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use swiss_core::{Color, Ledger, LedgerGame, PlayerId};

use crate::config::ByeOpponentValue;

/// FIDE rating difference for score fractions 0.50, 0.51, ... 1.00
const DP_TABLE: [u32; 51] = [
    0, 7, 14, 21, 29, 36, 43, 50, 57, 65, 72, 80, 87, 95, 102, 110, 117, 125, 133, 141, 149, 158, 166, 175, 184,
    193, 202, 211, 220, 230, 240, 251, 262, 273, 284, 296, 309, 322, 336, 351, 366, 383, 401, 422, 444, 470, 501,
    538, 589, 677, 800,
];

/// A secondary ranking criterion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tiebreak {
    /// Sum of opponents' scores
    Buchholz,
    /// Buchholz without the lowest and/or highest opponent scores
    ModifiedBuchholz { drop_lowest: usize, drop_highest: usize },
    /// Sum of opponent score times points scored against that opponent
    SonnebornBerger,
    /// Sum of the running score after each round
    Cumulative,
    /// Average rated opponent plus the rating difference for the score fraction
    Performance,
    /// Points scored against the other tied players, if they all met
    DirectEncounter,
    Wins,
    BlackGames,
}

impl Tiebreak {
    /// Median Buchholz: drop one lowest and one highest
    pub fn median() -> Self {
        Tiebreak::ModifiedBuchholz {
            drop_lowest: 1,
            drop_highest: 1,
        }
    }

    /// Buchholz cut `n`: drop the `n` lowest
    pub fn cut(n: usize) -> Self {
        Tiebreak::ModifiedBuchholz {
            drop_lowest: n,
            drop_highest: 0,
        }
    }

    /// Short column label
    pub fn label(&self) -> String {
        match *self {
            Tiebreak::Buchholz => "Bh".to_string(),
            Tiebreak::ModifiedBuchholz {
                drop_lowest: 1,
                drop_highest: 1,
            } => "Med".to_string(),
            Tiebreak::ModifiedBuchholz {
                drop_lowest,
                drop_highest,
            } => format!("Bh-{drop_lowest}/{drop_highest}"),
            Tiebreak::SonnebornBerger => "SB".to_string(),
            Tiebreak::Cumulative => "Cum".to_string(),
            Tiebreak::Performance => "Perf".to_string(),
            Tiebreak::DirectEncounter => "DE".to_string(),
            Tiebreak::Wins => "Wins".to_string(),
            Tiebreak::BlackGames => "Blk".to_string(),
        }
    }
}

impl fmt::Display for Tiebreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Final position of one player
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub player: PlayerId,
    /// Competition rank: 1, 2, 2, 4
    pub rank: u32,
    /// Tied with at least one other player after every criterion
    pub co_ranked: bool,
}

/// Computes tiebreaks for a section through a cutoff round
pub struct TiebreakCalculator<'a> {
    ledger: &'a Ledger,
    ratings: &'a FxHashMap<PlayerId, Option<u32>>,
    cutoff: u32,
    bye_value: ByeOpponentValue,
}

impl<'a> TiebreakCalculator<'a> {
    pub fn new(
        ledger: &'a Ledger,
        ratings: &'a FxHashMap<PlayerId, Option<u32>>,
        cutoff: u32,
        bye_value: ByeOpponentValue,
    ) -> Self {
        Self {
            ledger,
            ratings,
            cutoff,
            bye_value,
        }
    }

    pub fn cutoff(&self) -> u32 {
        self.cutoff
    }

    /// Score after the cutoff round
    pub fn score(&self, player: PlayerId) -> f64 {
        self.ledger
            .entry(player)
            .map_or(0.0, |e| e.score_through(self.cutoff))
    }

    /// Ledger rows up to the cutoff
    pub fn games(&self, player: PlayerId) -> Vec<&'a LedgerGame> {
        self.ledger
            .entry(player)
            .map(|e| e.games.iter().filter(|g| g.round <= self.cutoff).collect())
            .unwrap_or_default()
    }

    /// Score of each opponent, one value per round; byes per configuration
    pub fn opponent_scores(&self, player: PlayerId) -> Vec<f64> {
        self.games(player)
            .into_iter()
            .map(|g| self.opponent_value(player, g))
            .collect()
    }

    fn opponent_value(&self, player: PlayerId, game: &LedgerGame) -> f64 {
        match game.opponent {
            Some(opponent) => self.score(opponent),
            None => match self.bye_value {
                ByeOpponentValue::Zero => 0.0,
                ByeOpponentValue::OwnScore => self.score(player),
            },
        }
    }

    pub fn buchholz(&self, player: PlayerId) -> f64 {
        self.opponent_scores(player).iter().sum()
    }

    pub fn modified_buchholz(&self, player: PlayerId, drop_lowest: usize, drop_highest: usize) -> f64 {
        let mut scores = self.opponent_scores(player);
        scores.sort_by(f64::total_cmp);
        let end = scores.len().saturating_sub(drop_highest);
        scores
            .get(drop_lowest.min(end)..end)
            .map_or(0.0, |kept| kept.iter().sum())
    }

    pub fn sonneborn_berger(&self, player: PlayerId) -> f64 {
        self.games(player)
            .into_iter()
            .map(|g| self.opponent_value(player, g) * g.points)
            .sum()
    }

    pub fn cumulative(&self, player: PlayerId) -> f64 {
        let Some(entry) = self.ledger.entry(player) else {
            return 0.0;
        };
        (1..=self.cutoff).map(|round| entry.score_through(round)).sum()
    }

    /// Performance rating over played games against rated opponents
    ///
    /// # Returns
    /// `None` when the player has no such games
    pub fn performance(&self, player: PlayerId) -> Option<f64> {
        let rated: Vec<(u32, f64)> = self
            .games(player)
            .into_iter()
            .filter(|g| g.is_played())
            .filter_map(|g| {
                let opponent = g.opponent?;
                let rating = (*self.ratings.get(&opponent)?)?;
                Some((rating, g.points))
            })
            .collect();
        if rated.is_empty() {
            return None;
        }

        let n = rated.len() as f64;
        let average = rated.iter().map(|&(r, _)| f64::from(r)).sum::<f64>() / n;
        let fraction = rated.iter().map(|&(_, p)| p).sum::<f64>() / n;
        Some((average + rating_difference(fraction)).round())
    }

    /// Points against the rest of `group`, only when every pair in it met
    pub fn direct_encounter(&self, player: PlayerId, group: &[PlayerId]) -> Option<f64> {
        if group.len() < 2 || !group.contains(&player) {
            return None;
        }
        let all_met = group.iter().enumerate().all(|(i, &a)| {
            group[i + 1..]
                .iter()
                .all(|&b| self.games(a).iter().any(|g| g.opponent == Some(b)))
        });
        if !all_met {
            return None;
        }
        Some(
            self.games(player)
                .into_iter()
                .filter(|g| g.opponent.is_some_and(|o| o != player && group.contains(&o)))
                .map(|g| g.points)
                .sum(),
        )
    }

    pub fn wins(&self, player: PlayerId) -> f64 {
        self.games(player).into_iter().filter(|g| g.is_win()).count() as f64
    }

    pub fn black_games(&self, player: PlayerId) -> f64 {
        self.games(player)
            .into_iter()
            .filter(|g| g.is_played() && g.color == Some(Color::Black))
            .count() as f64
    }

    /// Value of `tiebreak` for `player`; `group` is the tie being broken
    pub fn value(&self, tiebreak: Tiebreak, player: PlayerId, group: &[PlayerId]) -> Option<f64> {
        match tiebreak {
            Tiebreak::Buchholz => Some(self.buchholz(player)),
            Tiebreak::ModifiedBuchholz {
                drop_lowest,
                drop_highest,
            } => Some(self.modified_buchholz(player, drop_lowest, drop_highest)),
            Tiebreak::SonnebornBerger => Some(self.sonneborn_berger(player)),
            Tiebreak::Cumulative => Some(self.cumulative(player)),
            Tiebreak::Performance => self.performance(player),
            Tiebreak::DirectEncounter => self.direct_encounter(player, group),
            Tiebreak::Wins => Some(self.wins(player)),
            Tiebreak::BlackGames => Some(self.black_games(player)),
        }
    }

    /// Rank players by score, then by each criterion in order
    ///
    /// # Arguments
    /// * `players` - Everyone to place
    /// * `order` - Criteria applied only among players still tied
    /// * `registration` - Non-sporting fallback order for unresolved ties
    ///
    /// # Returns
    /// Placements in final order
    pub fn rank(
        &self,
        players: &[PlayerId],
        order: &[Tiebreak],
        registration: &FxHashMap<PlayerId, u32>,
    ) -> Vec<Placement> {
        let mut by_score: Vec<(PlayerId, f64)> = players.iter().map(|&p| (p, self.score(p))).collect();
        by_score.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut blocks = Vec::new();
        for group in runs(&by_score) {
            self.split(group, order, &mut blocks);
        }

        let mut placements = Vec::with_capacity(players.len());
        for mut block in blocks {
            block.sort_by_key(|p| (registration.get(p).copied().unwrap_or(u32::MAX), *p));
            let rank = placements.len() as u32 + 1;
            let co_ranked = block.len() > 1;
            placements.extend(block.into_iter().map(|player| Placement {
                player,
                rank,
                co_ranked,
            }));
        }
        placements
    }

    /// Break a tied group with the first criterion, recursing on what stays tied
    fn split(&self, group: Vec<PlayerId>, order: &[Tiebreak], blocks: &mut Vec<Vec<PlayerId>>) {
        let Some((&first, rest)) = order.split_first() else {
            blocks.push(group);
            return;
        };
        if group.len() < 2 {
            blocks.push(group);
            return;
        }

        let mut keyed: Vec<(PlayerId, Option<f64>)> =
            group.iter().map(|&p| (p, self.value(first, p, &group))).collect();
        keyed.sort_by(|a, b| descending(a.1, b.1));

        for sub in runs(&keyed) {
            self.split(sub, rest, blocks);
        }
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Higher first, missing values last
fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Consecutive runs of equal keys in an already sorted list
fn runs<T: Copy + PartialEq>(sorted: &[(PlayerId, T)]) -> Vec<Vec<PlayerId>> {
    let mut out: Vec<Vec<PlayerId>> = Vec::new();
    let mut last: Option<T> = None;
    for &(player, key) in sorted {
        match out.last_mut() {
            Some(run) if last == Some(key) => run.push(player),
            _ => out.push(vec![player]),
        }
        last = Some(key);
    }
    out
}

/// Rating difference for a score fraction in `[0, 1]`
pub(crate) fn rating_difference(fraction: f64) -> f64 {
    let offset = ((fraction - 0.5).abs() * 100.0).round() as usize;
    let dp = f64::from(DP_TABLE[offset.min(DP_TABLE.len() - 1)]);
    if fraction < 0.5 {
        -dp
    } else {
        dp
    }
}
