//! Section aggregate - roster, pairings, ledger and round state
//!
//! Level 1 - One section progresses independently of every other section.
//! The calling service owns the aggregate, passes it into each operation and
//! persists the result; nothing here is shared between threads.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use swiss_core::{
    ByeKind, ByePoints, EngineError, GameResult, Ledger, LedgerDelta, MatchLabel, Pairing, PairingId, Player, PlayerId,
    PlayerStatus, Result, SectionId, TeamId, TournamentId,
};
use tracing::{debug, info, warn};

use crate::config::{SectionFormat, TournamentConfig};
use crate::generator::{generate, Entrant, FloatDirection, PairingWarning};
use crate::round::{PairingSet, ResetAck, RoundCompletion, RoundState};
use crate::standings::{compute_standings, RankedStandings};
use crate::team::{compute_team_standings, draft_team_round, RankedTeamStandings};

/// A board before it is numbered
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DraftBoard {
    Game {
        white: PlayerId,
        black: PlayerId,
        label: Option<MatchLabel>,
    },
    Bye {
        player: PlayerId,
        kind: ByeKind,
        label: Option<MatchLabel>,
    },
}

impl DraftBoard {
    fn into_pairing(self, tournament: &str, id: PairingId, points: &ByePoints) -> Pairing {
        let (pairing, label) = match self {
            DraftBoard::Game { white, black, label } => (Pairing::game(tournament, id, white, black), label),
            DraftBoard::Bye { player, kind, label } => {
                (Pairing::bye(tournament, id, player, kind, points.points(kind)), label)
            }
        };
        match label {
            Some(label) => pairing.with_label(label),
            None => pairing,
        }
    }
}

/// One section of a tournament
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "SectionRecord", into = "SectionRecord")]
pub struct Section {
    tournament: TournamentId,
    id: SectionId,
    format: SectionFormat,
    players: BTreeMap<PlayerId, Player>,
    /// Round -> pairings in board order
    pairings: BTreeMap<u32, Vec<Pairing>>,
    warnings: BTreeMap<u32, Vec<PairingWarning>>,
    team_warnings: BTreeMap<u32, Vec<PairingWarning<TeamId>>>,
    state: RoundState,
    /// Derived from `pairings`; rebuilt on load
    ledger: Ledger,
}

impl Section {
    /// Create a section from its roster
    ///
    /// Fails with `Validation` when a player belongs to another section or
    /// appears twice.
    pub fn new(
        tournament: impl Into<TournamentId>,
        id: impl Into<SectionId>,
        format: SectionFormat,
        players: Vec<Player>,
    ) -> Result<Self> {
        let id = id.into();
        let mut ledger = Ledger::new();
        let mut roster = BTreeMap::new();

        for player in players {
            if player.section != id {
                return Err(EngineError::Validation(format!(
                    "player {} is registered in section '{}', not '{id}'",
                    player.id, player.section
                )));
            }
            if let PlayerStatus::Withdrawn { from_round } = player.status {
                ledger.register_withdrawal(player.id, from_round);
            }
            if roster.insert(player.id, player).is_some() {
                return Err(EngineError::Validation(format!("duplicate player in section '{id}'")));
            }
        }

        Ok(Self {
            tournament: tournament.into(),
            id,
            format,
            players: roster,
            pairings: BTreeMap::new(),
            warnings: BTreeMap::new(),
            team_warnings: BTreeMap::new(),
            state: RoundState::NotStarted,
            ledger,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tournament(&self) -> &str {
        &self.tournament
    }

    pub fn format(&self) -> SectionFormat {
        self.format
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Pairings of `round` in board order
    pub fn pairings(&self, round: u32) -> &[Pairing] {
        self.pairings.get(&round).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every pairing of rounds `<= round`
    pub fn pairings_through(&self, round: u32) -> impl Iterator<Item = &Pairing> {
        self.pairings.range(..=round).flat_map(|(_, ps)| ps.iter())
    }

    pub fn pairing(&self, id: &PairingId) -> Option<&Pairing> {
        if id.section != self.id {
            return None;
        }
        self.pairings(id.round).iter().find(|p| &p.id == id)
    }

    /// Highest round with pairings, 0 before round 1
    pub fn latest_round(&self) -> u32 {
        self.pairings.keys().next_back().copied().unwrap_or(0)
    }

    /// Stored pairing set of `round`, if generated
    pub fn pairing_set(&self, round: u32) -> Option<PairingSet> {
        let pairings = self.pairings.get(&round)?;
        Some(PairingSet {
            tournament: self.tournament.clone(),
            section: self.id.clone(),
            round,
            pairings: pairings.clone(),
            warnings: self.warnings.get(&round).cloned().unwrap_or_default(),
            team_warnings: self.team_warnings.get(&round).cloned().unwrap_or_default(),
        })
    }

    /// Player -> team for team sections
    pub fn team_map(&self) -> FxHashMap<PlayerId, TeamId> {
        self.players
            .values()
            .filter_map(|p| p.team.clone().map(|t| (p.id, t)))
            .collect()
    }

    /// Standings cutoff for an optional requested round
    pub(crate) fn cutoff(&self, round: Option<u32>) -> Result<u32> {
        match round {
            Some(0) => Err(EngineError::Validation("round numbers start at 1".to_string())),
            Some(r) => Ok(r.min(self.latest_round())),
            None => Ok(self.latest_round()),
        }
    }

    // ========================================================================
    // Level 1 - Operations
    // ========================================================================

    /// Pair `round`
    ///
    /// Returns the stored set unchanged when the round was already paired.
    pub fn generate_pairings(&mut self, round: u32, config: &TournamentConfig) -> Result<PairingSet> {
        if round == 0 || round > config.total_rounds {
            return Err(EngineError::Validation(format!(
                "round {round} is outside 1..={}",
                config.total_rounds
            )));
        }
        if let Some(existing) = self.pairing_set(round) {
            debug!("section '{}' round {} already paired", self.id, round);
            return Ok(existing);
        }
        self.state.check_generate(round)?;

        let participants: Vec<&Player> = self.players.values().filter(|p| p.plays_in(round)).collect();
        if participants.is_empty() {
            return Err(EngineError::Algorithm(format!(
                "section '{}' has no active players for round {round}",
                self.id
            )));
        }
        let (requested, pool): (Vec<&Player>, Vec<&Player>) =
            participants.into_iter().partition(|p| p.requests_bye(round));

        let mut warnings = Vec::new();
        let mut team_warnings = Vec::new();
        let mut boards = match self.format {
            SectionFormat::Individual => {
                let (boards, w) = self.draft_individual(&pool, round, config)?;
                warnings = w;
                boards
            }
            SectionFormat::Team => {
                let history: Vec<Pairing> = self.pairings_through(round - 1).cloned().collect();
                let (boards, w) = draft_team_round(&pool, &history, &self.team_map(), round, config)?;
                team_warnings = w;
                boards
            }
        };

        let mut requested = requested;
        requested.sort_by_key(|p| (p.registration, p.id));
        boards.extend(requested.iter().map(|p| DraftBoard::Bye {
            player: p.id,
            kind: config.byes.intentional,
            label: None,
        }));

        let pairings: Vec<Pairing> = boards
            .into_iter()
            .enumerate()
            .map(|(i, board)| {
                let id = PairingId::new(self.id.clone(), round, i as u32 + 1);
                board.into_pairing(&self.tournament, id, &config.byes.points)
            })
            .collect();

        self.ledger.open_round(round);
        for bye in pairings.iter().filter(|p| p.is_bye()) {
            self.ledger.apply_bye(bye)?;
        }

        info!(
            "section '{}' round {}: {} boards, {} warnings",
            self.id,
            round,
            pairings.len(),
            warnings.len() + team_warnings.len()
        );
        self.pairings.insert(round, pairings);
        self.warnings.insert(round, warnings);
        if !team_warnings.is_empty() {
            self.team_warnings.insert(round, team_warnings);
        }
        self.state = RoundState::PairingsGenerated(round);

        self.pairing_set(round)
            .ok_or_else(|| EngineError::NotFound(format!("round {round} pairings")))
    }

    /// Record a game result
    ///
    /// # Returns
    /// The ledger delta, including the previously recorded result when one
    /// was overwritten
    pub fn record_result(&mut self, id: &PairingId, result: GameResult) -> Result<LedgerDelta> {
        let round = id.round;
        let pairing = self
            .pairing(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("pairing {id}")))?;
        if pairing.is_bye() {
            return Err(EngineError::Validation(format!("pairing {id} is a bye")));
        }
        self.state.check_record(round)?;

        let delta = self.ledger.apply(&pairing, result)?;
        if delta.overwrote() {
            warn!("pairing {} result replaced: {:?} -> {:?}", id, delta.previous, delta.current);
        }
        if let Some(slot) = self.pairing_mut(id) {
            slot.result = Some(result);
        }
        self.state = RoundState::ResultsPending(round);
        Ok(delta)
    }

    /// Remove a recorded result while its round is still open
    pub fn retract_result(&mut self, id: &PairingId) -> Result<LedgerDelta> {
        let pairing = self
            .pairing(id)
            .ok_or_else(|| EngineError::NotFound(format!("pairing {id}")))?;
        if pairing.is_bye() {
            return Err(EngineError::Validation(format!("pairing {id} is a bye")));
        }
        self.state.check_record(id.round)?;

        let delta = self.ledger.retract(id)?;
        if let Some(slot) = self.pairing_mut(id) {
            slot.result = None;
        }
        info!("pairing {} result retracted", id);
        Ok(delta)
    }

    /// Close `round`; fails listing the games still missing a result
    pub fn complete_round(&mut self, round: u32, config: &TournamentConfig) -> Result<RoundCompletion> {
        self.state.check_complete(round)?;

        let pairings = self.pairings(round);
        let outstanding: Vec<PairingId> = pairings
            .iter()
            .filter(|p| !p.is_complete())
            .map(|p| p.id.clone())
            .collect();
        if !outstanding.is_empty() {
            return Err(EngineError::Conflict {
                reason: format!("{} games in round {round} have no result", outstanding.len()),
                outstanding,
            });
        }

        let byes = pairings.iter().filter(|p| p.is_bye()).count();
        let games = pairings.len() - byes;
        let points_awarded = self.ledger.total_points_in(round);
        let tournament_complete = round >= config.total_rounds;
        self.state = if tournament_complete {
            RoundState::TournamentComplete
        } else {
            RoundState::RoundComplete(round)
        };

        info!("section '{}' round {} complete ({})", self.id, round, self.state);
        Ok(RoundCompletion {
            tournament: self.tournament.clone(),
            section: self.id.clone(),
            round,
            games,
            byes,
            points_awarded,
            tournament_complete,
            state: self.state,
        })
    }

    /// Complete the open round if needed, then pair the next one
    pub fn generate_next_round(&mut self, config: &TournamentConfig) -> Result<PairingSet> {
        if let RoundState::PairingsGenerated(r) | RoundState::ResultsPending(r) = self.state {
            self.complete_round(r, config)?;
        }
        let round = self
            .state
            .next_round()
            .ok_or_else(|| EngineError::conflict("tournament is complete"))?;
        self.generate_pairings(round, config)
    }

    /// Delete every pairing and result; the section returns to `NotStarted`
    pub fn reset(&mut self) -> ResetAck {
        let pairings_removed = self.pairings.values().map(Vec::len).sum();
        self.pairings.clear();
        self.warnings.clear();
        self.team_warnings.clear();
        self.ledger.clear();
        self.state = RoundState::NotStarted;

        info!("section '{}' reset, {} pairings removed", self.id, pairings_removed);
        ResetAck {
            tournament: self.tournament.clone(),
            section: self.id.clone(),
            pairings_removed,
        }
    }

    /// Withdraw a player from `from_round` on
    pub fn withdraw_player(&mut self, player: PlayerId, from_round: u32) -> Result<()> {
        if from_round == 0 {
            return Err(EngineError::Validation("round numbers start at 1".to_string()));
        }
        if !self.players.contains_key(&player) {
            return Err(EngineError::Validation(format!(
                "player {player} is not in section '{}'",
                self.id
            )));
        }
        if let Some(paired) = self
            .pairings
            .range(from_round..)
            .flat_map(|(_, ps)| ps.iter())
            .find(|p| p.involves(player))
        {
            return Err(EngineError::Conflict {
                reason: format!("player {player} is already paired in round {}", paired.round()),
                outstanding: vec![paired.id.clone()],
            });
        }

        self.ledger.register_withdrawal(player, from_round);
        if let Some(p) = self.players.get_mut(&player) {
            p.status = PlayerStatus::Withdrawn { from_round };
        }
        info!("player {} withdrawn from section '{}' from round {}", player, self.id, from_round);
        Ok(())
    }

    pub fn standings(
        &self,
        round: Option<u32>,
        include_tiebreakers: bool,
        config: &TournamentConfig,
    ) -> Result<RankedStandings> {
        compute_standings(self, round, include_tiebreakers, config)
    }

    pub fn team_standings(&self, round: Option<u32>, config: &TournamentConfig) -> Result<RankedTeamStandings> {
        compute_team_standings(self, round, config)
    }

    // ========================================================================
    // Level 2 - Drafting
    // ========================================================================

    fn draft_individual(
        &self,
        pool: &[&Player],
        round: u32,
        config: &TournamentConfig,
    ) -> Result<(Vec<DraftBoard>, Vec<PairingWarning>)> {
        if pool.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }

        let bonuses = config.acceleration.bonuses(round, &self.seeding());
        let entrants = pool
            .iter()
            .map(|p| {
                let bonus = bonuses.get(&p.id).copied().unwrap_or(0.0);
                let entrant = Entrant::new(p.id, self.ledger.score(p.id) + bonus, p.rating, p.registration)
                    .with_last_float(self.last_float(p.id, round));
                match self.ledger.entry(p.id) {
                    Some(entry) => entrant
                        .with_colors(entry.color_history())
                        .with_opponents(entry.opponents())
                        .with_byes(entry.rotation_byes()),
                    None => entrant,
                }
            })
            .collect();

        let plan = generate(entrants, &config.pairing)?;
        let mut boards: Vec<DraftBoard> = plan
            .games
            .into_iter()
            .map(|g| DraftBoard::Game {
                white: g.white,
                black: g.black,
                label: None,
            })
            .collect();
        if let Some(player) = plan.bye {
            boards.push(DraftBoard::Bye {
                player,
                kind: ByeKind::PairingAllocated,
                label: None,
            });
        }
        Ok((boards, plan.warnings))
    }

    /// Initial rank order: rating desc, unrated last, then registration
    fn seeding(&self) -> Vec<PlayerId> {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by(|a, b| b.rating.cmp(&a.rating).then(a.registration.cmp(&b.registration)));
        players.into_iter().map(|p| p.id).collect()
    }

    /// Float direction of `player` in the round before `round`
    fn last_float(&self, player: PlayerId, round: u32) -> Option<FloatDirection> {
        let previous = round.checked_sub(1).filter(|&r| r > 0)?;
        let entry = self.ledger.entry(player)?;
        let game = entry.game_in(previous)?;
        match game.opponent {
            Some(opponent) => {
                let own = entry.score_through(previous - 1);
                let theirs = self.ledger.entry(opponent)?.score_through(previous - 1);
                if own > theirs {
                    Some(FloatDirection::Down)
                } else if own < theirs {
                    Some(FloatDirection::Up)
                } else {
                    None
                }
            }
            None => game
                .bye
                .filter(|b| b.counts_for_rotation())
                .map(|_| FloatDirection::Down),
        }
    }

    fn pairing_mut(&mut self, id: &PairingId) -> Option<&mut Pairing> {
        self.pairings.get_mut(&id.round)?.iter_mut().find(|p| &p.id == id)
    }
}

// ============================================================================
// Persistence record
// ============================================================================

/// Persisted form of a section; the ledger is rebuilt from the pairings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SectionRecord {
    pub tournament: TournamentId,
    pub id: SectionId,
    #[serde(default)]
    pub format: SectionFormat,
    pub players: Vec<Player>,
    #[serde(default)]
    pub pairings: Vec<Pairing>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub warnings: BTreeMap<u32, Vec<PairingWarning>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub team_warnings: BTreeMap<u32, Vec<PairingWarning<TeamId>>>,
    #[serde(default)]
    pub state: RoundState,
}

impl From<Section> for SectionRecord {
    fn from(section: Section) -> Self {
        Self {
            tournament: section.tournament,
            id: section.id,
            format: section.format,
            players: section.players.into_values().collect(),
            pairings: section.pairings.into_values().flatten().collect(),
            warnings: section.warnings,
            team_warnings: section.team_warnings,
            state: section.state,
        }
    }
}

impl TryFrom<SectionRecord> for Section {
    type Error = EngineError;

    fn try_from(record: SectionRecord) -> Result<Self> {
        let mut section = Section::new(record.tournament, record.id, record.format, record.players)?;

        let mut pairings = record.pairings;
        pairings.sort_by(|a, b| a.id.cmp(&b.id));
        let mut seen = BTreeSet::new();
        for pairing in pairings {
            if pairing.id.section != section.id || !seen.insert(pairing.id.clone()) {
                return Err(EngineError::Validation(format!(
                    "pairing {} does not belong in section '{}'",
                    pairing.id, section.id
                )));
            }
            section.ledger.open_round(pairing.round());
            if pairing.is_bye() {
                section.ledger.apply_bye(&pairing)?;
            } else if let Some(result) = pairing.result {
                section.ledger.apply(&pairing, result)?;
            }
            section.pairings.entry(pairing.round()).or_default().push(pairing);
        }

        section.warnings = record.warnings;
        section.team_warnings = record.team_warnings;
        section.state = record.state;
        Ok(section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(n: u32) -> Vec<Player> {
        (1..=n)
            .map(|i| Player::new(i, format!("Player {i}"), Some(2100 - i * 50), "open"))
            .collect()
    }

    fn section(n: u32) -> Section {
        Section::new("spring", "open", SectionFormat::Individual, roster(n)).unwrap()
    }

    fn decide_all(section: &mut Section, round: u32) {
        let ids: Vec<PairingId> = section
            .pairings(round)
            .iter()
            .filter(|p| !p.is_bye())
            .map(|p| p.id.clone())
            .collect();
        for id in ids {
            section.record_result(&id, GameResult::white_win()).unwrap();
        }
    }

    #[test]
    fn test_new_rejects_foreign_player() {
        let mut players = roster(3);
        players.push(Player::new(9, "Visitor", None, "reserve"));
        let err = Section::new("spring", "open", SectionFormat::Individual, players).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_generate_is_idempotent() {
        let config = TournamentConfig::swiss(3);
        let mut s = section(6);
        let first = s.generate_pairings(1, &config).unwrap();
        let second = s.generate_pairings(1, &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.pairings.len(), 3);
        assert_eq!(s.state(), RoundState::PairingsGenerated(1));
    }

    #[test]
    fn test_round_out_of_range() {
        let config = TournamentConfig::swiss(3);
        let mut s = section(4);
        assert!(matches!(s.generate_pairings(0, &config), Err(EngineError::Validation(_))));
        assert!(matches!(s.generate_pairings(4, &config), Err(EngineError::Validation(_))));
        assert!(matches!(s.generate_pairings(2, &config), Err(EngineError::Conflict { .. })));
    }

    #[test]
    fn test_completion_guard_lists_outstanding() {
        let config = TournamentConfig::swiss(3);
        let mut s = section(4);
        let set = s.generate_pairings(1, &config).unwrap();
        let first = set.pairings[0].id.clone();
        s.record_result(&first, GameResult::draw()).unwrap();
        assert_eq!(s.state(), RoundState::ResultsPending(1));

        let err = s.complete_round(1, &config).unwrap_err();
        assert_eq!(err.outstanding(), &[set.pairings[1].id.clone()]);

        decide_all(&mut s, 1);
        let done = s.complete_round(1, &config).unwrap();
        assert_eq!(done.games, 2);
        assert_eq!(done.points_awarded, 2.0);
        assert_eq!(s.state(), RoundState::RoundComplete(1));
    }

    #[test]
    fn test_record_unknown_and_bye() {
        let config = TournamentConfig::swiss(3);
        let mut s = section(3);
        let set = s.generate_pairings(1, &config).unwrap();
        let bye = set.byes().next().unwrap().id.clone();
        assert!(matches!(
            s.record_result(&bye, GameResult::draw()),
            Err(EngineError::Validation(_))
        ));
        let missing = PairingId::new("open", 1, 40);
        assert!(matches!(
            s.record_result(&missing, GameResult::draw()),
            Err(EngineError::NotFound(_))
        ));
    }

    #[test]
    fn test_overwrite_reports_previous() {
        let config = TournamentConfig::swiss(3);
        let mut s = section(2);
        let id = s.generate_pairings(1, &config).unwrap().pairings[0].id.clone();
        s.record_result(&id, GameResult::white_win()).unwrap();
        let delta = s.record_result(&id, GameResult::draw()).unwrap();
        assert!(delta.overwrote());
        assert_eq!(s.pairing(&id).unwrap().result, Some(GameResult::draw()));

        s.retract_result(&id).unwrap();
        assert_eq!(s.pairing(&id).unwrap().result, None);
        assert_eq!(s.ledger().score(PlayerId(1)), 0.0);
    }

    #[test]
    fn test_last_round_completes_tournament() {
        let config = TournamentConfig::swiss(2);
        let mut s = section(4);
        s.generate_pairings(1, &config).unwrap();
        decide_all(&mut s, 1);
        let set = s.generate_next_round(&config).unwrap();
        assert_eq!(set.round, 2);
        decide_all(&mut s, 2);
        let done = s.complete_round(2, &config).unwrap();
        assert!(done.tournament_complete);
        assert_eq!(s.state(), RoundState::TournamentComplete);
        assert!(s.generate_next_round(&config).is_err());
    }

    #[test]
    fn test_intentional_bye_comes_first() {
        let config = TournamentConfig::swiss(3);
        let mut players = roster(4);
        players[0] = players[0].clone().with_bye(1);
        let mut s = Section::new("spring", "open", SectionFormat::Individual, players).unwrap();
        let set = s.generate_pairings(1, &config).unwrap();

        let byes: Vec<&Pairing> = set.byes().collect();
        assert_eq!(byes.len(), 2);
        assert_eq!(byes[0].bye_kind(), Some(ByeKind::PairingAllocated));
        assert_eq!(byes[1].players(), vec![PlayerId(1)]);
        assert_eq!(byes[1].bye_kind(), Some(ByeKind::HalfPoint));
        assert_eq!(s.ledger().score(PlayerId(1)), 0.5);
    }

    #[test]
    fn test_withdrawn_player_not_paired() {
        let config = TournamentConfig::swiss(3);
        let mut s = section(5);
        s.withdraw_player(PlayerId(5), 1).unwrap();
        let set = s.generate_pairings(1, &config).unwrap();
        assert_eq!(set.pairings.len(), 2);
        assert!(set.pairings.iter().all(|p| !p.involves(PlayerId(5))));
        assert!(matches!(
            s.withdraw_player(PlayerId(1), 1),
            Err(EngineError::Conflict { .. })
        ));
    }

    #[test]
    fn test_reset_returns_to_start() {
        let config = TournamentConfig::swiss(3);
        let mut s = section(4);
        s.generate_pairings(1, &config).unwrap();
        let ack = s.reset();
        assert_eq!(ack.pairings_removed, 2);
        assert_eq!(s.state(), RoundState::NotStarted);
        assert_eq!(s.latest_round(), 0);
        assert!(s.generate_pairings(1, &config).is_ok());
    }

    #[test]
    fn test_record_round_trip_rebuilds_ledger() {
        let config = TournamentConfig::swiss(3);
        let mut s = section(5);
        s.generate_pairings(1, &config).unwrap();
        decide_all(&mut s, 1);

        let json = serde_json::to_string(&s).unwrap();
        let loaded: Section = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.state(), s.state());
        for p in s.players() {
            assert_eq!(loaded.ledger().score(p.id), s.ledger().score(p.id));
        }
        assert_eq!(loaded.pairing_set(1), s.pairing_set(1));
    }
}
