//! Standings service - ledger plus tiebreaks into ranked rows

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use swiss_core::{LedgerGame, PlayerId, PlayerStatus, Result, SectionId, TeamId, TournamentId};
use tracing::debug;

use crate::config::TournamentConfig;
use crate::section::Section;
use crate::tiebreak::{Tiebreak, TiebreakCalculator};

/// One computed tiebreak
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TiebreakValue {
    pub tiebreak: Tiebreak,
    /// `None` when the criterion does not apply (e.g. no rated opponents)
    pub value: Option<f64>,
}

/// Standing of one player
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    pub rank: u32,
    /// Still tied after every criterion; row order is registration order
    pub co_ranked: bool,
    pub player: PlayerId,
    pub name: String,
    pub rating: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamId>,
    pub score: f64,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub byes: u32,
    pub withdrawn: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiebreaks: Vec<TiebreakValue>,
}

/// Ranked standings of a section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedStandings {
    pub tournament: TournamentId,
    pub section: SectionId,
    /// 0 when nothing has been paired
    pub through_round: u32,
    pub rows: Vec<StandingRow>,
}

impl RankedStandings {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn leader(&self) -> Option<&StandingRow> {
        self.rows.first()
    }

    pub fn row_for(&self, player: PlayerId) -> Option<&StandingRow> {
        self.rows.iter().find(|r| r.player == player)
    }
}

/// Rank a section as of `round` (default: the latest paired round)
///
/// # Arguments
/// * `round` - Cutoff round; later results are ignored
/// * `include_tiebreakers` - When false, equal scores share a rank
///
/// # Returns
/// Only players appearing in a pairing up to the cutoff; empty before round 1
pub fn compute_standings(
    section: &Section,
    round: Option<u32>,
    include_tiebreakers: bool,
    config: &TournamentConfig,
) -> Result<RankedStandings> {
    let cutoff = section.cutoff(round)?;
    let appeared: BTreeSet<PlayerId> = section.pairings_through(cutoff).flat_map(|p| p.players()).collect();
    let players: Vec<PlayerId> = appeared.into_iter().collect();

    let ratings: FxHashMap<PlayerId, Option<u32>> = section.players().map(|p| (p.id, p.rating)).collect();
    let registration: FxHashMap<PlayerId, u32> = section.players().map(|p| (p.id, p.registration)).collect();
    let calc = TiebreakCalculator::new(section.ledger(), &ratings, cutoff, config.byes.opponent_value);
    let order: &[Tiebreak] = if include_tiebreakers { &config.tiebreaks } else { &[] };

    let placements = calc.rank(&players, order, &registration);
    let rows = placements
        .into_iter()
        .filter_map(|placement| {
            let player = section.player(placement.player)?;
            let score = calc.score(player.id);
            let games = calc.games(player.id);
            let count = |f: fn(&LedgerGame) -> bool| games.iter().filter(|g| f(g)).count() as u32;

            // Direct encounter is shown against the whole score group
            let tied: Vec<PlayerId> = players.iter().copied().filter(|&q| calc.score(q) == score).collect();
            let tiebreaks = order
                .iter()
                .map(|&tiebreak| TiebreakValue {
                    tiebreak,
                    value: calc.value(tiebreak, player.id, &tied),
                })
                .collect();

            Some(StandingRow {
                rank: placement.rank,
                co_ranked: placement.co_ranked,
                player: player.id,
                name: player.name.clone(),
                rating: player.rating,
                team: player.team.clone(),
                score,
                played: count(|g| g.opponent.is_some()),
                wins: count(|g| g.is_win()),
                draws: count(|g| g.is_draw()),
                losses: count(|g| g.is_loss()),
                byes: count(|g| g.bye.is_some()),
                withdrawn: matches!(player.status, PlayerStatus::Withdrawn { .. }),
                tiebreaks,
            })
        })
        .collect();

    debug!("standings for '{}' through round {}", section.id(), cutoff);
    Ok(RankedStandings {
        tournament: section.tournament().to_string(),
        section: section.id().to_string(),
        through_round: cutoff,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SectionFormat;
    use swiss_core::{GameResult, Player};

    fn played_section() -> (Section, TournamentConfig) {
        let config = TournamentConfig::swiss(3);
        let players = (1..=4)
            .map(|i| Player::new(i, format!("P{i}"), Some(2000 - i * 100), "open"))
            .collect();
        let mut section = Section::new("t", "open", SectionFormat::Individual, players).unwrap();
        let set = section.generate_pairings(1, &config).unwrap();
        // 1 v 3 and 4 v 2: top board decisive, second drawn
        section.record_result(&set.pairings[0].id, GameResult::white_win()).unwrap();
        section.record_result(&set.pairings[1].id, GameResult::draw()).unwrap();
        section.complete_round(1, &config).unwrap();
        (section, config)
    }

    #[test]
    fn test_empty_before_pairing() {
        let config = TournamentConfig::swiss(3);
        let section = Section::new("t", "open", SectionFormat::Individual, vec![Player::new(1, "A", None, "open")]).unwrap();
        let standings = compute_standings(&section, None, true, &config).unwrap();
        assert!(standings.is_empty());
        assert_eq!(standings.through_round, 0);
    }

    #[test]
    fn test_rows_after_round_one() {
        let (section, config) = played_section();
        let standings = compute_standings(&section, None, true, &config).unwrap();

        assert_eq!(standings.rows.len(), 4);
        let leader = standings.leader().unwrap();
        assert_eq!(leader.player, PlayerId(1));
        assert_eq!(leader.rank, 1);
        assert_eq!(leader.wins, 1);
        assert_eq!(leader.tiebreaks.len(), config.tiebreaks.len());

        let p2 = standings.row_for(PlayerId(2)).unwrap();
        let p4 = standings.row_for(PlayerId(4)).unwrap();
        assert_eq!(p2.score, 0.5);
        assert_eq!(p2.draws, 1);
        assert_eq!(p2.rank, p4.rank);
        assert_eq!(standings.row_for(PlayerId(3)).unwrap().rank, 4);
    }

    #[test]
    fn test_without_tiebreakers_ties_share_rank() {
        let (section, config) = played_section();
        let standings = compute_standings(&section, Some(1), false, &config).unwrap();
        let p2 = standings.row_for(PlayerId(2)).unwrap();
        assert!(p2.co_ranked);
        assert_eq!(p2.rank, 2);
        assert!(p2.tiebreaks.is_empty());
        // Registration order inside a co-ranked block
        assert_eq!(standings.rows[1].player, PlayerId(2));
        assert_eq!(standings.rows[2].player, PlayerId(4));
    }

    #[test]
    fn test_round_zero_rejected() {
        let (section, config) = played_section();
        assert!(compute_standings(&section, Some(0), true, &config).is_err());
    }
}
