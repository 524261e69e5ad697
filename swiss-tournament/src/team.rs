//! Team aggregator - board results into team matches, and team pairing
//!
//! Level 2 - A team match is the set of board pairings sharing a match label.
//! The home team is the one holding white on the first board.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use swiss_core::{
    ByeKind, Color, EngineError, MatchLabel, Pairing, PairingId, Player, PlayerId, Result, SectionId, TeamId,
    TournamentId,
};
use tracing::{debug, warn};

use crate::config::{SectionFormat, TeamConfig, TournamentConfig};
use crate::generator::{generate, Entrant, PairingWarning};
use crate::section::{DraftBoard, Section};

/// One team match of one round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamMatch {
    pub round: u32,
    pub home: TeamId,
    /// `None` for a team bye
    pub away: Option<TeamId>,
    /// Board order
    pub boards: Vec<PairingId>,
    pub home_game_points: f64,
    pub away_game_points: f64,
    /// Awarded once every board has a result
    pub home_match_points: Option<f64>,
    pub away_match_points: Option<f64>,
    pub complete: bool,
}

impl TeamMatch {
    pub fn is_bye(&self) -> bool {
        self.away.is_none()
    }
}

/// Running totals of one team
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamTally {
    pub team: TeamId,
    pub match_points: f64,
    pub game_points: f64,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub byes: u32,
    pub opponents: Vec<TeamId>,
    /// Color on the first board, oldest first
    pub colors: Vec<Color>,
}

impl TeamTally {
    fn new(team: TeamId) -> Self {
        Self {
            team,
            ..Default::default()
        }
    }
}

/// Group the labelled pairings of `round` into team matches
///
/// # Arguments
/// * `pairings` - Any pairings; only labelled ones of `round` are used
/// * `teams` - Player to team, to credit each board to the right side
/// * `config` - Board scoring and match points
pub fn aggregate_round(
    pairings: &[Pairing],
    round: u32,
    teams: &FxHashMap<PlayerId, TeamId>,
    config: &TeamConfig,
) -> Vec<TeamMatch> {
    let mut grouped: BTreeMap<&MatchLabel, Vec<&Pairing>> = BTreeMap::new();
    for pairing in pairings.iter().filter(|p| p.round() == round) {
        if let Some(label) = &pairing.team_match {
            grouped.entry(label).or_default().push(pairing);
        }
    }

    let mut matches: Vec<TeamMatch> = grouped
        .into_iter()
        .map(|(label, mut boards)| {
            boards.sort_by_key(|p| p.board_number());
            let mut home_game_points = 0.0;
            let mut away_game_points = 0.0;

            for (index, board) in boards.iter().enumerate() {
                if !config.scoring.counts(index) {
                    continue;
                }
                for player in board.players() {
                    let points = board.points_for(player).unwrap_or(0.0);
                    match teams.get(&player) {
                        Some(team) if *team == label.home => home_game_points += points,
                        Some(team) if label.away.as_ref() == Some(team) => away_game_points += points,
                        _ => {}
                    }
                }
            }

            let complete = boards.iter().all(|p| p.is_complete());
            let (home_match_points, away_match_points) = match (&label.away, complete) {
                (_, false) => (None, None),
                (None, true) => (Some(config.match_points.win()), None),
                (Some(_), true) => {
                    let mp = config.match_points;
                    let (home, away) = match home_game_points.total_cmp(&away_game_points) {
                        std::cmp::Ordering::Greater => (mp.win(), mp.loss()),
                        std::cmp::Ordering::Less => (mp.loss(), mp.win()),
                        std::cmp::Ordering::Equal => (mp.draw(), mp.draw()),
                    };
                    (Some(home), Some(away))
                }
            };

            TeamMatch {
                round,
                home: label.home.clone(),
                away: label.away.clone(),
                boards: boards.iter().map(|p| p.id.clone()).collect(),
                home_game_points,
                away_game_points,
                home_match_points,
                away_match_points,
                complete,
            }
        })
        .collect();

    matches.sort_by(|a, b| a.boards.first().cmp(&b.boards.first()));
    matches
}

/// Totals for every team appearing in rounds `1..=through_round`
pub fn team_tallies(
    pairings: &[Pairing],
    teams: &FxHashMap<PlayerId, TeamId>,
    through_round: u32,
    config: &TeamConfig,
) -> BTreeMap<TeamId, TeamTally> {
    let mut tallies: BTreeMap<TeamId, TeamTally> = BTreeMap::new();

    for round in 1..=through_round {
        for m in aggregate_round(pairings, round, teams, config) {
            let home = tallies
                .entry(m.home.clone())
                .or_insert_with(|| TeamTally::new(m.home.clone()));
            home.game_points += m.home_game_points;
            home.match_points += m.home_match_points.unwrap_or(0.0);

            let Some(away_id) = m.away.clone() else {
                home.byes += 1;
                continue;
            };
            home.opponents.push(away_id.clone());
            home.colors.push(Color::White);
            if m.complete {
                home.played += 1;
                tally_outcome(home, m.home_game_points, m.away_game_points);
            }

            let away = tallies
                .entry(away_id.clone())
                .or_insert_with(|| TeamTally::new(away_id));
            away.game_points += m.away_game_points;
            away.match_points += m.away_match_points.unwrap_or(0.0);
            away.opponents.push(m.home.clone());
            away.colors.push(Color::Black);
            if m.complete {
                away.played += 1;
                tally_outcome(away, m.away_game_points, m.home_game_points);
            }
        }
    }
    tallies
}

fn tally_outcome(tally: &mut TeamTally, own: f64, other: f64) {
    if own > other {
        tally.wins += 1;
    } else if own < other {
        tally.losses += 1;
    } else {
        tally.draws += 1;
    }
}

// ============================================================================
// Team standings
// ============================================================================

/// Standing of one team
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamStandingRow {
    pub rank: u32,
    pub co_ranked: bool,
    pub team: TeamId,
    pub match_points: f64,
    pub game_points: f64,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub byes: u32,
}

/// Ranked team standings of a team section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedTeamStandings {
    pub tournament: TournamentId,
    pub section: SectionId,
    pub through_round: u32,
    pub rows: Vec<TeamStandingRow>,
    /// Matches of the cutoff round
    pub matches: Vec<TeamMatch>,
}

/// Rank teams by match points, then game points
pub fn compute_team_standings(
    section: &Section,
    round: Option<u32>,
    config: &TournamentConfig,
) -> Result<RankedTeamStandings> {
    if section.format() != SectionFormat::Team {
        return Err(EngineError::Validation(format!(
            "section '{}' is not a team section",
            section.id()
        )));
    }
    let cutoff = section.cutoff(round)?;
    let pairings: Vec<Pairing> = section.pairings_through(cutoff).cloned().collect();
    let teams = section.team_map();

    let mut tallies: Vec<TeamTally> = team_tallies(&pairings, &teams, cutoff, &config.team)
        .into_values()
        .collect();
    tallies.sort_by(|a, b| {
        b.match_points
            .total_cmp(&a.match_points)
            .then(b.game_points.total_cmp(&a.game_points))
            .then_with(|| a.team.cmp(&b.team))
    });

    let same = |a: &TeamTally, b: &TeamTally| a.match_points == b.match_points && a.game_points == b.game_points;
    let mut rows: Vec<TeamStandingRow> = Vec::with_capacity(tallies.len());
    for (i, tally) in tallies.iter().enumerate() {
        let tied_before = i > 0 && same(&tallies[i - 1], tally);
        let tied_after = tallies.get(i + 1).is_some_and(|next| same(tally, next));
        let rank = match rows.last() {
            Some(prev) if tied_before => prev.rank,
            _ => i as u32 + 1,
        };
        rows.push(TeamStandingRow {
            rank,
            co_ranked: tied_before || tied_after,
            team: tally.team.clone(),
            match_points: tally.match_points,
            game_points: tally.game_points,
            played: tally.played,
            wins: tally.wins,
            draws: tally.draws,
            losses: tally.losses,
            byes: tally.byes,
        });
    }

    Ok(RankedTeamStandings {
        tournament: section.tournament().to_string(),
        section: section.id().to_string(),
        through_round: cutoff,
        rows,
        matches: aggregate_round(&pairings, cutoff, &teams, &config.team),
    })
}

// ============================================================================
// Team-vs-team pairing
// ============================================================================

/// Pair teams for `round` and expand each team pairing into boards
///
/// # Arguments
/// * `pool` - Players available this round (intentional byes already removed)
/// * `history` - Pairings of earlier rounds
/// * `teams` - Player to team for the whole roster
///
/// Each team fields its top `boards` players by rating; reserves below that
/// sit the round out. A team with fewer available players than boards plays
/// short: its empty boards are scored as forfeit wins for the opposing board.
///
/// # Returns
/// Boards in order (matches first, then a team bye) and team-level warnings
pub(crate) fn draft_team_round(
    pool: &[&Player],
    history: &[Pairing],
    teams: &FxHashMap<PlayerId, TeamId>,
    round: u32,
    config: &TournamentConfig,
) -> Result<(Vec<DraftBoard>, Vec<PairingWarning<TeamId>>)> {
    let boards = config.team.boards;
    if boards == 0 {
        return Err(EngineError::Validation("team sections need at least one board".to_string()));
    }

    let mut rosters: BTreeMap<TeamId, Vec<&Player>> = BTreeMap::new();
    for &player in pool {
        let team = player
            .team
            .clone()
            .ok_or_else(|| EngineError::Validation(format!("player {} has no team", player.id)))?;
        rosters.entry(team).or_default().push(player);
    }
    if rosters.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let mut lineups: FxHashMap<TeamId, Vec<PlayerId>> = FxHashMap::default();
    let tallies = team_tallies(history, teams, round.saturating_sub(1), &config.team);
    let mut entrants = Vec::with_capacity(rosters.len());

    let mut short = Vec::new();

    for (team, mut members) in rosters {
        members.sort_by(|a, b| b.rating.cmp(&a.rating).then(a.registration.cmp(&b.registration)));
        let seed = members.iter().map(|p| p.registration).min().unwrap_or(u32::MAX);
        if members.len() < boards {
            warn!(
                "team {} fields {} players for {} boards in round {}",
                team,
                members.len(),
                boards,
                round
            );
            short.push(PairingWarning::ShortLineup {
                team: team.clone(),
                available: members.len() as u32,
                boards: boards as u32,
            });
        }
        for reserve in members.iter().skip(boards) {
            warn!("{} ({}) benched for round {}", reserve.id, team, round);
        }
        let lineup: Vec<&Player> = members.into_iter().take(boards).collect();

        let rated: Vec<u32> = lineup.iter().filter_map(|p| p.rating).collect();
        let rating = (!rated.is_empty())
            .then(|| (rated.iter().map(|&r| f64::from(r)).sum::<f64>() / rated.len() as f64).round() as u32);

        let tally = tallies.get(&team);
        let entrant = Entrant::new(team.clone(), tally.map_or(0.0, |t| t.match_points), rating, seed);
        let entrant = match tally {
            Some(t) => entrant
                .with_colors(t.colors.clone())
                .with_opponents(t.opponents.iter().cloned())
                .with_byes(t.byes),
            None => entrant,
        };
        entrants.push(entrant);
        lineups.insert(team, lineup.iter().map(|p| p.id).collect());
    }

    let plan = generate(entrants, &config.pairing)?;
    debug!("paired {} team matches for round {}", plan.games.len(), round);

    let mut draft = Vec::with_capacity(pool.len());
    for game in plan.games {
        let (home, away) = (&lineups[&game.white], &lineups[&game.black]);
        let label = MatchLabel {
            home: game.white.clone(),
            away: Some(game.black.clone()),
        };
        for index in 0..boards {
            let label = Some(label.clone());
            let board = match (home.get(index), away.get(index)) {
                (Some(&h), Some(&a)) => {
                    let (white, black) = if index % 2 == 0 { (h, a) } else { (a, h) };
                    DraftBoard::Game { white, black, label }
                }
                (Some(&player), None) | (None, Some(&player)) => DraftBoard::Bye {
                    player,
                    kind: ByeKind::AbsentOpponent,
                    label,
                },
                (None, None) => continue,
            };
            draft.push(board);
        }
    }
    if let Some(team) = plan.bye {
        let label = MatchLabel {
            home: team.clone(),
            away: None,
        };
        draft.extend(lineups[&team].iter().map(|&player| DraftBoard::Bye {
            player,
            kind: ByeKind::PairingAllocated,
            label: Some(label.clone()),
        }));
    }

    let mut warnings = short;
    warnings.extend(plan.warnings);
    Ok((draft, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BoardScoring, MatchPoints};
    use swiss_core::{ByeKind, GameResult};

    fn teams() -> FxHashMap<PlayerId, TeamId> {
        [(1, "north"), (2, "north"), (3, "south"), (4, "south")]
            .into_iter()
            .map(|(p, t)| (PlayerId(p), t.to_string()))
            .collect()
    }

    fn north_south() -> MatchLabel {
        MatchLabel {
            home: "north".to_string(),
            away: Some("south".to_string()),
        }
    }

    fn board(n: u32, white: u32, black: u32, result: Option<GameResult>) -> Pairing {
        let mut p = Pairing::game("t", PairingId::new("teams", 1, n), PlayerId(white), PlayerId(black))
            .with_label(north_south());
        p.result = result;
        p
    }

    #[test]
    fn test_aggregate_complete_match() {
        let pairings = vec![
            board(1, 1, 3, Some(GameResult::white_win())),
            board(2, 4, 2, Some(GameResult::draw())),
        ];
        let matches = aggregate_round(&pairings, 1, &teams(), &TeamConfig::default());
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.home_game_points, 1.5);
        assert_eq!(m.away_game_points, 0.5);
        assert_eq!(m.home_match_points, Some(2.0));
        assert_eq!(m.away_match_points, Some(0.0));
        assert!(m.complete);
    }

    #[test]
    fn test_incomplete_match_has_no_match_points() {
        let pairings = vec![board(1, 1, 3, Some(GameResult::white_win())), board(2, 4, 2, None)];
        let m = &aggregate_round(&pairings, 1, &teams(), &TeamConfig::default())[0];
        assert!(!m.complete);
        assert_eq!(m.home_match_points, None);
        assert_eq!(m.home_game_points, 1.0);
    }

    #[test]
    fn test_top_boards_scoring() {
        let pairings = vec![
            board(1, 1, 3, Some(GameResult::black_win())),
            board(2, 4, 2, Some(GameResult::black_win())),
        ];
        let config = TeamConfig {
            boards: 2,
            scoring: BoardScoring::TopBoards(1),
            match_points: MatchPoints::OneHalfZero,
        };
        let m = &aggregate_round(&pairings, 1, &teams(), &config)[0];
        assert_eq!(m.home_game_points, 0.0);
        assert_eq!(m.away_game_points, 1.0);
        assert_eq!(m.away_match_points, Some(1.0));
    }

    #[test]
    fn test_tallies_include_byes() {
        let bye_label = MatchLabel {
            home: "north".to_string(),
            away: None,
        };
        let pairings = vec![
            Pairing::bye("t", PairingId::new("teams", 1, 1), PlayerId(1), ByeKind::PairingAllocated, 1.0)
                .with_label(bye_label.clone()),
            Pairing::bye("t", PairingId::new("teams", 1, 2), PlayerId(2), ByeKind::PairingAllocated, 1.0)
                .with_label(bye_label),
        ];
        let tallies = team_tallies(&pairings, &teams(), 1, &TeamConfig::default());
        let north = &tallies["north"];
        assert_eq!(north.byes, 1);
        assert_eq!(north.match_points, 2.0);
        assert_eq!(north.game_points, 2.0);
        assert!(north.opponents.is_empty());
    }

    #[test]
    fn test_draft_expands_boards_with_alternating_colors() {
        let players: Vec<Player> = [(1, "north", 2200), (2, "north", 2100), (3, "south", 2000), (4, "south", 1900)]
            .into_iter()
            .map(|(id, team, rating)| Player::new(id, format!("P{id}"), Some(rating), "teams").with_team(team))
            .collect();
        let pool: Vec<&Player> = players.iter().collect();
        let config = TournamentConfig::team_swiss(3, 2);

        let (boards, warnings) = draft_team_round(&pool, &[], &teams(), 1, &config).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(
            boards,
            vec![
                DraftBoard::Game {
                    white: PlayerId(1),
                    black: PlayerId(3),
                    label: Some(north_south()),
                },
                DraftBoard::Game {
                    white: PlayerId(4),
                    black: PlayerId(2),
                    label: Some(north_south()),
                },
            ]
        );
    }

    #[test]
    fn test_short_team_forfeits_empty_boards() {
        let players = vec![
            Player::new(1, "A", Some(2200), "teams").with_team("north"),
            Player::new(2, "B", Some(2100), "teams").with_team("north"),
            Player::new(3, "C", Some(2000), "teams").with_team("south"),
        ];
        let pool: Vec<&Player> = players.iter().collect();
        let config = TournamentConfig::team_swiss(3, 2);

        let (boards, warnings) = draft_team_round(&pool, &[], &teams(), 1, &config).unwrap();
        assert_eq!(
            boards,
            vec![
                DraftBoard::Game {
                    white: PlayerId(1),
                    black: PlayerId(3),
                    label: Some(north_south()),
                },
                DraftBoard::Bye {
                    player: PlayerId(2),
                    kind: ByeKind::AbsentOpponent,
                    label: Some(north_south()),
                },
            ]
        );
        assert_eq!(
            warnings,
            vec![PairingWarning::ShortLineup {
                team: "south".to_string(),
                available: 1,
                boards: 2,
            }]
        );
    }

    #[test]
    fn test_forfeited_board_scores_for_present_team() {
        let pairings = vec![
            board(1, 1, 3, Some(GameResult::draw())),
            Pairing::bye("t", PairingId::new("teams", 1, 2), PlayerId(2), ByeKind::AbsentOpponent, 1.0)
                .with_label(north_south()),
        ];
        let m = &aggregate_round(&pairings, 1, &teams(), &TeamConfig::default())[0];
        assert!(m.complete);
        assert_eq!(m.home_game_points, 1.5);
        assert_eq!(m.away_game_points, 0.5);
        assert_eq!(m.home_match_points, Some(2.0));
    }

    #[test]
    fn test_reserves_sit_out() {
        let players: Vec<Player> = [(1, "north", 2200), (2, "north", 2100), (9, "north", 2300), (3, "south", 2000), (4, "south", 1900)]
            .into_iter()
            .map(|(id, team, rating)| Player::new(id, format!("P{id}"), Some(rating), "teams").with_team(team))
            .collect();
        let pool: Vec<&Player> = players.iter().collect();
        let config = TournamentConfig::team_swiss(3, 2);

        let (boards, warnings) = draft_team_round(&pool, &[], &teams(), 1, &config).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(boards.len(), 2);
        let seated: Vec<PlayerId> = boards
            .iter()
            .flat_map(|b| match b {
                DraftBoard::Game { white, black, .. } => vec![*white, *black],
                DraftBoard::Bye { player, .. } => vec![*player],
            })
            .collect();
        assert!(seated.contains(&PlayerId(9)));
        assert!(!seated.contains(&PlayerId(2)));
    }
}
