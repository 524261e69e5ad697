//! Pairing generator - score-group pairing with floats, byes and colors
//!
//! Level 2 - Phases: choose the bye, match the pool, assign colors.
//!
//! Entrants are ranked by score, rating and seed. Each entrant gets a
//! candidate list built from the Dutch (or Monrad) structure of its score
//! group, followed by lower groups and finally higher groups. A depth-first
//! search walks the ranking and takes the first legal candidate, backtracking
//! when a later entrant is stranded. If the search fails or runs out of
//! budget, constraints are relaxed in order: color limits first, then
//! rematches. Every relaxation shows up as a warning on the plan.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use swiss_core::{Color, ColorPreference, EngineError, PlayerId, PreferenceStrength, Result};
use tracing::{debug, warn};

use crate::config::{ColorStrictness, PairingConfig, PairingSystem, RematchPolicy};

/// Bye candidates tried before falling back to a rematch
const MAX_BYE_ATTEMPTS: usize = 16;

/// Direction a player moved between score groups
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatDirection {
    Down,
    Up,
}

/// Anything that can be paired: a player, or a team in team events
#[derive(Clone, Debug)]
pub struct Entrant<K> {
    pub id: K,
    /// Pairing score, acceleration included
    pub score: f64,
    pub rating: Option<u32>,
    /// Stable ordering key after score and rating
    pub seed: u32,
    /// Colors actually played, oldest first
    pub colors: Vec<Color>,
    pub opponents: FxHashSet<K>,
    /// Byes that count toward rotation
    pub byes: u32,
    pub last_float: Option<FloatDirection>,
}

impl<K: Eq + Hash> Entrant<K> {
    pub fn new(id: K, score: f64, rating: Option<u32>, seed: u32) -> Self {
        Self {
            id,
            score,
            rating,
            seed,
            colors: Vec::new(),
            opponents: FxHashSet::default(),
            byes: 0,
            last_float: None,
        }
    }

    pub fn with_colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_opponents(mut self, opponents: impl IntoIterator<Item = K>) -> Self {
        self.opponents.extend(opponents);
        self
    }

    pub fn with_byes(mut self, byes: u32) -> Self {
        self.byes = byes;
        self
    }

    pub fn with_last_float(mut self, last_float: Option<FloatDirection>) -> Self {
        self.last_float = last_float;
        self
    }
}

/// Soft compromise made while pairing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PairingWarning<K = PlayerId> {
    /// No rematch-free pairing existed for the pool
    ForcedRematch { first: K, second: K },
    /// Player received the color opposite to its preference
    ColorOverride {
        player: K,
        wanted: Color,
        strength: PreferenceStrength,
    },
    /// Player was paired outside its score group
    Float {
        player: K,
        direction: FloatDirection,
        score: f64,
        opponent_score: f64,
    },
    /// Every remaining player had already received a bye
    RepeatedBye { player: K, previous_byes: u32 },
    /// Team fielded fewer players than boards; the empty boards are forfeited
    ShortLineup { team: K, available: u32, boards: u32 },
}

impl<K> PairingWarning<K> {
    /// Convert the subject type, e.g. team ids to display strings
    pub fn map<T>(self, mut f: impl FnMut(K) -> T) -> PairingWarning<T> {
        match self {
            PairingWarning::ForcedRematch { first, second } => PairingWarning::ForcedRematch {
                first: f(first),
                second: f(second),
            },
            PairingWarning::ColorOverride { player, wanted, strength } => PairingWarning::ColorOverride {
                player: f(player),
                wanted,
                strength,
            },
            PairingWarning::Float {
                player,
                direction,
                score,
                opponent_score,
            } => PairingWarning::Float {
                player: f(player),
                direction,
                score,
                opponent_score,
            },
            PairingWarning::RepeatedBye { player, previous_byes } => PairingWarning::RepeatedBye {
                player: f(player),
                previous_byes,
            },
            PairingWarning::ShortLineup {
                team,
                available,
                boards,
            } => PairingWarning::ShortLineup {
                team: f(team),
                available,
                boards,
            },
        }
    }
}

/// One game of the plan
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedGame<K> {
    pub white: K,
    pub black: K,
}

/// Output of the generator, games already in board order
#[derive(Clone, Debug)]
pub struct PairingPlan<K> {
    pub games: Vec<PlannedGame<K>>,
    pub bye: Option<K>,
    pub warnings: Vec<PairingWarning<K>>,
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Pair a pool of entrants
///
/// # Arguments
/// * `entrants` - Everyone to be paired this round, in any order
/// * `config` - Pairing generator settings
///
/// # Returns
/// Board-ordered games, the bye recipient (odd pools) and warnings.
/// Fails only when the pool is empty, an odd pool may not use a bye, or
/// rematches are forbidden and unavoidable.
pub fn generate<K>(entrants: Vec<Entrant<K>>, config: &PairingConfig) -> Result<PairingPlan<K>>
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    if entrants.is_empty() {
        return Err(EngineError::Algorithm("no players available to pair".to_string()));
    }

    let pool = Pool::new(entrants, config);
    debug!("pairing {} entrants", pool.len());

    let (bye, pairs) = pool.choose_bye_and_match(config)?;
    let mut warnings = Vec::new();

    if let Some(b) = bye {
        let entrant = &pool.ranked[b];
        if entrant.byes > 0 {
            warn!("{:?} receives another bye ({} before)", entrant.id, entrant.byes);
            warnings.push(PairingWarning::RepeatedBye {
                player: entrant.id.clone(),
                previous_byes: entrant.byes,
            });
        }
    }

    let games = pool.assign_colors(pairs, config, &mut warnings);
    Ok(PairingPlan {
        games,
        bye: bye.map(|b| pool.ranked[b].id.clone()),
        warnings,
    })
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// Constraint level of a search attempt, strictest first
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Relaxation {
    Ideal,
    IgnoreColors,
    AllowRematches,
}

struct Pool<K> {
    ranked: Vec<Entrant<K>>,
    prefs: Vec<ColorPreference>,
    played: Vec<Vec<bool>>,
}

impl<K> Pool<K>
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    fn new(mut entrants: Vec<Entrant<K>>, config: &PairingConfig) -> Self {
        entrants.sort_by(rank_order);
        let index: FxHashMap<K, usize> = entrants
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();

        let n = entrants.len();
        let mut played = vec![vec![false; n]; n];
        for (i, entrant) in entrants.iter().enumerate() {
            for opponent in &entrant.opponents {
                if let Some(&j) = index.get(opponent) {
                    played[i][j] = true;
                    played[j][i] = true;
                }
            }
        }

        let prefs = entrants
            .iter()
            .map(|e| ColorPreference::from_history(&e.colors, &config.colors))
            .collect();

        Self {
            ranked: entrants,
            prefs,
            played,
        }
    }

    fn len(&self) -> usize {
        self.ranked.len()
    }

    fn levels(config: &PairingConfig) -> Vec<Relaxation> {
        let mut levels = Vec::with_capacity(3);
        if config.strictness == ColorStrictness::Strict {
            levels.push(Relaxation::Ideal);
        }
        levels.push(Relaxation::IgnoreColors);
        if config.rematch == RematchPolicy::AllowForced {
            levels.push(Relaxation::AllowRematches);
        }
        levels
    }

    /// Pick the bye (odd pools) and match everyone else
    fn choose_bye_and_match(&self, config: &PairingConfig) -> Result<(Option<usize>, Vec<(usize, usize)>)> {
        let n = self.len();
        let levels = Self::levels(config);

        if n % 2 == 0 {
            let members: Vec<usize> = (0..n).collect();
            return self
                .match_members(&members, &levels, config)
                .map(|pairs| (None, pairs))
                .ok_or_else(|| self.unpairable(config));
        }

        if !config.allow_bye {
            return Err(EngineError::Algorithm(format!(
                "{n} players to pair and byes are disabled"
            )));
        }

        // Fewest byes first, lowest ranked first among equals
        let fewest = self.ranked.iter().map(|e| e.byes).min().unwrap_or(0);
        let candidates: Vec<usize> = (0..n).rev().filter(|&i| self.ranked[i].byes == fewest).collect();
        let clean_levels: Vec<Relaxation> = levels
            .iter()
            .copied()
            .filter(|&l| l < Relaxation::AllowRematches)
            .collect();

        for &candidate in candidates.iter().take(MAX_BYE_ATTEMPTS) {
            let members: Vec<usize> = (0..n).filter(|&i| i != candidate).collect();
            if let Some(pairs) = self.match_members(&members, &clean_levels, config) {
                return Ok((Some(candidate), pairs));
            }
            debug!("bye to {:?} leaves no rematch-free pairing", self.ranked[candidate].id);
        }

        let candidate = candidates[0];
        let members: Vec<usize> = (0..n).filter(|&i| i != candidate).collect();
        self.match_members(&members, &levels, config)
            .map(|pairs| (Some(candidate), pairs))
            .ok_or_else(|| self.unpairable(config))
    }

    fn unpairable(&self, config: &PairingConfig) -> EngineError {
        match config.rematch {
            RematchPolicy::Forbid => EngineError::Algorithm(format!(
                "{} players cannot be paired without a rematch",
                self.len()
            )),
            RematchPolicy::AllowForced => EngineError::Algorithm(format!(
                "search budget exhausted pairing {} players",
                self.len()
            )),
        }
    }

    /// Try each relaxation level in turn
    fn match_members(
        &self,
        members: &[usize],
        levels: &[Relaxation],
        config: &PairingConfig,
    ) -> Option<Vec<(usize, usize)>> {
        let lists = self.candidate_lists(members, config.system);
        for &level in levels {
            let lists = if level == Relaxation::AllowRematches {
                self.rematch_last(&lists)
            } else {
                lists.clone()
            };
            let mut search = Search {
                pool: self,
                lists: &lists,
                order: members,
                level,
                budget: config.search_budget,
                used: 0,
            };
            if let Some(pairs) = search.run() {
                debug!("matched {} entrants at {:?} after {} steps", members.len(), level, search.used);
                return Some(pairs);
            }
            debug!("no matching at {:?} ({} steps)", level, search.used);
        }
        None
    }

    fn legal(&self, level: Relaxation, a: usize, b: usize) -> bool {
        match level {
            Relaxation::Ideal => !self.played[a][b] && self.prefs[a].compatible_with(&self.prefs[b]),
            Relaxation::IgnoreColors => !self.played[a][b],
            Relaxation::AllowRematches => true,
        }
    }

    // ========================================================================
    // Level 3 - Steps
    // ========================================================================

    /// Split members into descending score groups
    fn score_groups(&self, members: &[usize]) -> Vec<Vec<usize>> {
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for &i in members {
            match groups.last_mut() {
                Some(group) if self.ranked[group[0]].score == self.ranked[i].score => group.push(i),
                _ => groups.push(vec![i]),
            }
        }
        groups
    }

    /// Lowest-ranked member who did not float down last round floats this time
    fn split_floater(&self, group: &[usize]) -> (Vec<usize>, Option<usize>) {
        if group.len() % 2 == 0 {
            return (group.to_vec(), None);
        }
        let floater = group
            .iter()
            .rev()
            .copied()
            .find(|&i| self.ranked[i].last_float != Some(FloatDirection::Down))
            .unwrap_or(group[group.len() - 1]);
        let core = group.iter().copied().filter(|&i| i != floater).collect();
        (core, Some(floater))
    }

    /// Preferred opponents for every member, indexed by rank
    fn candidate_lists(&self, members: &[usize], system: PairingSystem) -> Vec<Vec<usize>> {
        let groups = self.score_groups(members);
        let mut lists = vec![Vec::new(); self.len()];

        for (g, group) in groups.iter().enumerate() {
            // Lower groups best-first, but players who floated up last time go last
            let lower: Vec<usize> = groups[g + 1..]
                .iter()
                .flat_map(|lg| {
                    let (fresh, floated): (Vec<usize>, Vec<usize>) = lg
                        .iter()
                        .partition(|&&i| self.ranked[i].last_float != Some(FloatDirection::Up));
                    fresh.into_iter().chain(floated)
                })
                .collect();
            let higher: Vec<usize> = groups[..g].iter().rev().flat_map(|hg| hg.iter().rev().copied()).collect();

            let (core, floater) = self.split_floater(group);
            for (x, own) in own_group_order(&core, floater, system) {
                lists[x] = dedup(own.into_iter().chain(lower.iter().copied()).chain(higher.iter().copied()), x);
            }
            if let Some(f) = floater {
                let own_rev = core.iter().rev().copied();
                lists[f] = dedup(lower.iter().copied().chain(own_rev).chain(higher.iter().copied()), f);
            }
        }
        lists
    }

    /// Same lists with previous opponents moved to the back
    fn rematch_last(&self, lists: &[Vec<usize>]) -> Vec<Vec<usize>> {
        lists
            .iter()
            .enumerate()
            .map(|(x, list)| {
                let (fresh, repeat): (Vec<usize>, Vec<usize>) = list.iter().partition(|&&c| !self.played[x][c]);
                fresh.into_iter().chain(repeat).collect()
            })
            .collect()
    }

    /// Give each pair its colors, in board order
    fn assign_colors(
        &self,
        mut pairs: Vec<(usize, usize)>,
        config: &PairingConfig,
        warnings: &mut Vec<PairingWarning<K>>,
    ) -> Vec<PlannedGame<K>> {
        for pair in &mut pairs {
            if pair.0 > pair.1 {
                *pair = (pair.1, pair.0);
            }
        }
        pairs.sort_unstable();

        pairs
            .into_iter()
            .enumerate()
            .map(|(board, (hi, lo))| {
                self.note_floats_and_rematches(hi, lo, warnings);
                let hi_color = self.color_for_higher(board, hi, lo, config, warnings);
                let (white, black) = match hi_color {
                    Color::White => (hi, lo),
                    Color::Black => (lo, hi),
                };
                PlannedGame {
                    white: self.ranked[white].id.clone(),
                    black: self.ranked[black].id.clone(),
                }
            })
            .collect()
    }

    /// Color for the higher-ranked player of a pair
    fn color_for_higher(
        &self,
        board: usize,
        hi: usize,
        lo: usize,
        config: &PairingConfig,
        warnings: &mut Vec<PairingWarning<K>>,
    ) -> Color {
        let (ph, pl) = (&self.prefs[hi], &self.prefs[lo]);
        match (ph.direction, pl.direction) {
            (Some(x), Some(y)) if x != y => x,
            (Some(x), None) => x,
            (None, Some(y)) => y.opposite(),
            (None, None) => {
                if board % 2 == 0 {
                    config.initial_color
                } else {
                    config.initial_color.opposite()
                }
            }
            (Some(wanted), Some(_)) => {
                // Equal weight goes to the higher-ranked player, who has the
                // higher score (or the higher rating on equal score)
                let hi_wins = ph.weight_cmp(pl) != Ordering::Less;
                let (loser, loser_pref) = if hi_wins { (lo, pl) } else { (hi, ph) };
                if loser_pref.strength >= PreferenceStrength::Strong {
                    warn!(
                        "{:?} denied {:?} ({:?} preference)",
                        self.ranked[loser].id, wanted, loser_pref.strength
                    );
                    warnings.push(PairingWarning::ColorOverride {
                        player: self.ranked[loser].id.clone(),
                        wanted,
                        strength: loser_pref.strength,
                    });
                }
                if hi_wins {
                    wanted
                } else {
                    wanted.opposite()
                }
            }
        }
    }

    fn note_floats_and_rematches(&self, hi: usize, lo: usize, warnings: &mut Vec<PairingWarning<K>>) {
        let (a, b) = (&self.ranked[hi], &self.ranked[lo]);
        if self.played[hi][lo] {
            warn!("forced rematch {:?} v {:?}", a.id, b.id);
            warnings.push(PairingWarning::ForcedRematch {
                first: a.id.clone(),
                second: b.id.clone(),
            });
        }
        if a.score != b.score {
            let (down, up) = if a.score > b.score { (a, b) } else { (b, a) };
            warnings.push(PairingWarning::Float {
                player: down.id.clone(),
                direction: FloatDirection::Down,
                score: down.score,
                opponent_score: up.score,
            });
            warnings.push(PairingWarning::Float {
                player: up.id.clone(),
                direction: FloatDirection::Up,
                score: up.score,
                opponent_score: down.score,
            });
        }
    }
}

// ============================================================================
// Level 4 - Utilities
// ============================================================================

/// Score desc, rating desc (unrated last), seed asc
fn rank_order<K>(a: &Entrant<K>, b: &Entrant<K>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.rating.cmp(&a.rating))
        .then_with(|| a.seed.cmp(&b.seed))
}

/// Own-group candidate order for each core member
fn own_group_order(core: &[usize], floater: Option<usize>, system: PairingSystem) -> Vec<(usize, Vec<usize>)> {
    match system {
        PairingSystem::Dutch => {
            let (s1, s2) = core.split_at(core.len() / 2);
            let top = s1.iter().enumerate().map(|(i, &x)| {
                let list = s2[i..]
                    .iter()
                    .chain(s2[..i].iter().rev())
                    .chain(s1[i + 1..].iter())
                    .chain(floater.iter())
                    .chain(s1[..i].iter())
                    .copied()
                    .collect();
                (x, list)
            });
            let bottom = s2.iter().enumerate().map(|(j, &x)| {
                let list = s2[j + 1..]
                    .iter()
                    .chain(floater.iter())
                    .chain(s1.get(j).into_iter())
                    .chain(s1.iter())
                    .chain(s2[..j].iter().rev())
                    .copied()
                    .collect();
                (x, list)
            });
            top.chain(bottom).collect()
        }
        PairingSystem::Monrad => core
            .iter()
            .enumerate()
            .map(|(p, &x)| {
                let list = core[p + 1..]
                    .iter()
                    .chain(floater.iter())
                    .chain(core[..p].iter().rev())
                    .copied()
                    .collect();
                (x, list)
            })
            .collect(),
    }
}

/// Drop `me` and repeats, keeping first occurrences
fn dedup(candidates: impl Iterator<Item = usize>, me: usize) -> Vec<usize> {
    let mut seen = FxHashSet::default();
    candidates.filter(|&c| c != me && seen.insert(c)).collect()
}

/// Depth-first matcher over a ranked member list
struct Search<'a, K> {
    pool: &'a Pool<K>,
    lists: &'a [Vec<usize>],
    order: &'a [usize],
    level: Relaxation,
    budget: usize,
    used: usize,
}

impl<K> Search<'_, K>
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    fn run(&mut self) -> Option<Vec<(usize, usize)>> {
        let mut paired = vec![false; self.pool.len()];
        let mut pairs = Vec::with_capacity(self.order.len() / 2);
        if self.descend(&mut paired, &mut pairs, 0) {
            Some(pairs)
        } else {
            None
        }
    }

    fn descend(&mut self, paired: &mut [bool], pairs: &mut Vec<(usize, usize)>, from: usize) -> bool {
        let order = self.order;
        let Some(pos) = (from..order.len()).find(|&p| !paired[order[p]]) else {
            return true;
        };
        let x = order[pos];
        let lists = self.lists;

        for &c in &lists[x] {
            if paired[c] || !self.pool.legal(self.level, x, c) {
                continue;
            }
            if self.used >= self.budget {
                return false;
            }
            self.used += 1;

            paired[x] = true;
            paired[c] = true;
            pairs.push((x, c));
            if self.descend(paired, pairs, pos + 1) {
                return true;
            }
            pairs.pop();
            paired[x] = false;
            paired[c] = false;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entrant(id: u32, score: f64, rating: u32) -> Entrant<u32> {
        Entrant::new(id, score, Some(rating), id)
    }

    fn four() -> Vec<Entrant<u32>> {
        vec![
            entrant(1, 0.0, 2000),
            entrant(2, 0.0, 1900),
            entrant(3, 0.0, 1800),
            entrant(4, 0.0, 1700),
        ]
    }

    fn has_game(plan: &PairingPlan<u32>, a: u32, b: u32) -> bool {
        plan.games
            .iter()
            .any(|g| (g.white == a && g.black == b) || (g.white == b && g.black == a))
    }

    #[test]
    fn test_round_one_dutch() {
        let plan = generate(four(), &PairingConfig::default()).unwrap();
        assert_eq!(plan.games.len(), 2);
        assert_eq!(plan.games[0], PlannedGame { white: 1, black: 3 });
        assert_eq!(plan.games[1], PlannedGame { white: 4, black: 2 });
        assert!(plan.bye.is_none());
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_round_one_monrad() {
        let config = PairingConfig {
            system: PairingSystem::Monrad,
            ..Default::default()
        };
        let plan = generate(four(), &config).unwrap();
        assert!(has_game(&plan, 1, 2));
        assert!(has_game(&plan, 3, 4));
    }

    #[test]
    fn test_odd_pool_bye_to_lowest() {
        let mut pool = four();
        pool.push(entrant(5, 0.0, 1600));
        let plan = generate(pool, &PairingConfig::default()).unwrap();
        assert_eq!(plan.bye, Some(5));
        assert_eq!(plan.games.len(), 2);
    }

    #[test]
    fn test_bye_skips_previous_recipient() {
        let mut pool = four();
        pool.push(entrant(5, 1.0, 1600).with_byes(1));
        let plan = generate(pool, &PairingConfig::default()).unwrap();
        assert_eq!(plan.bye, Some(4));
        assert!(!plan.warnings.iter().any(|w| matches!(w, PairingWarning::RepeatedBye { .. })));
    }

    #[test]
    fn test_rematch_avoided() {
        let pool = vec![
            entrant(1, 1.0, 2000).with_opponents([3]),
            entrant(2, 1.0, 1900).with_opponents([4]),
            entrant(3, 1.0, 1800).with_opponents([1]),
            entrant(4, 1.0, 1700).with_opponents([2]),
        ];
        let plan = generate(pool, &PairingConfig::default()).unwrap();
        assert!(has_game(&plan, 1, 4));
        assert!(has_game(&plan, 2, 3));
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_forced_rematch_is_flagged() {
        let pool = vec![
            entrant(1, 1.0, 2000).with_opponents([2]),
            entrant(2, 0.0, 1900).with_opponents([1]),
        ];
        let plan = generate(pool.clone(), &PairingConfig::default()).unwrap();
        assert!(plan
            .warnings
            .iter()
            .any(|w| matches!(w, PairingWarning::ForcedRematch { .. })));

        let forbid = PairingConfig {
            rematch: RematchPolicy::Forbid,
            ..Default::default()
        };
        assert!(matches!(generate(pool, &forbid), Err(EngineError::Algorithm(_))));
    }

    #[test]
    fn test_downfloat_recorded() {
        let pool = vec![
            entrant(1, 1.0, 2000),
            entrant(2, 0.0, 1900),
            entrant(3, 0.0, 1800),
            entrant(4, 0.0, 1700),
        ];
        let plan = generate(pool, &PairingConfig::default()).unwrap();
        assert!(has_game(&plan, 1, 2));
        assert!(plan.warnings.contains(&PairingWarning::Float {
            player: 1,
            direction: FloatDirection::Down,
            score: 1.0,
            opponent_score: 0.0,
        }));
    }

    #[test]
    fn test_floater_alternates() {
        // Player 3 floated down last round, so player 2 floats this time
        let pool = vec![
            entrant(1, 1.0, 2000),
            entrant(2, 1.0, 1900),
            entrant(3, 1.0, 1800).with_last_float(Some(FloatDirection::Down)),
            entrant(4, 0.0, 1700),
        ];
        let plan = generate(pool, &PairingConfig::default()).unwrap();
        assert!(has_game(&plan, 1, 3));
        assert!(has_game(&plan, 2, 4));
    }

    #[test]
    fn test_absolute_colors_respected() {
        use Color::{Black as B, White as W};
        let pool = vec![
            entrant(1, 2.0, 2000).with_colors(vec![W, W]),
            entrant(2, 2.0, 1900).with_colors(vec![B, B]),
        ];
        let plan = generate(pool, &PairingConfig::default()).unwrap();
        assert_eq!(plan.games[0], PlannedGame { white: 2, black: 1 });
    }

    #[test]
    fn test_color_conflict_overrides_weaker() {
        use Color::{Black as B, White as W};
        // Both want black; player 2 has the absolute preference and wins it
        let pool = vec![
            entrant(1, 2.0, 2000).with_colors(vec![B, W]),
            entrant(2, 2.0, 1900).with_colors(vec![B, W, W]),
        ];
        let plan = generate(pool, &PairingConfig::default()).unwrap();
        assert_eq!(plan.games[0], PlannedGame { white: 1, black: 2 });
    }

    #[test]
    fn test_unavoidable_absolute_clash_warns() {
        use Color::White as W;
        let pool = vec![
            entrant(1, 2.0, 2000).with_colors(vec![W, W]),
            entrant(2, 2.0, 1900).with_colors(vec![W, W]),
        ];
        let plan = generate(pool, &PairingConfig::default()).unwrap();
        assert_eq!(plan.games[0], PlannedGame { white: 2, black: 1 });
        assert!(plan.warnings.contains(&PairingWarning::ColorOverride {
            player: 2,
            wanted: Color::Black,
            strength: PreferenceStrength::Absolute,
        }));
    }

    #[test]
    fn test_empty_pool_fails() {
        let result = generate(Vec::<Entrant<u32>>::new(), &PairingConfig::default());
        assert!(matches!(result, Err(EngineError::Algorithm(_))));
    }

    #[test]
    fn test_single_entrant() {
        let plan = generate(vec![entrant(1, 0.0, 1500)], &PairingConfig::default()).unwrap();
        assert_eq!(plan.bye, Some(1));
        assert!(plan.games.is_empty());

        let no_bye = PairingConfig {
            allow_bye: false,
            ..Default::default()
        };
        assert!(generate(vec![entrant(1, 0.0, 1500)], &no_bye).is_err());
    }

    #[test]
    fn test_warning_map() {
        let warning: PairingWarning<u32> = PairingWarning::ForcedRematch { first: 1, second: 2 };
        let mapped = warning.map(|k| format!("team-{k}"));
        assert_eq!(
            mapped,
            PairingWarning::ForcedRematch {
                first: "team-1".to_string(),
                second: "team-2".to_string()
            }
        );
    }
}
