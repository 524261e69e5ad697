//! Tournament aggregate - routes engine operations to sections
//!
//! Level 1 - Orchestration. Sections share only player identity: a player
//! may belong to exactly one section when a round is paired.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use swiss_core::{EngineError, GameResult, LedgerDelta, PairingId, Player, PlayerId, Result, SectionId, TournamentId};
use tracing::info;

use crate::config::{SectionFormat, TournamentConfig};
use crate::round::{PairingSet, ResetAck, RoundCompletion};
use crate::section::Section;
use crate::standings::RankedStandings;
use crate::team::RankedTeamStandings;

/// A tournament: configuration plus independent sections
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    #[serde(default)]
    pub config: TournamentConfig,
    #[serde(default)]
    sections: BTreeMap<SectionId, Section>,
}

impl Tournament {
    pub fn new(id: impl Into<TournamentId>, name: impl Into<String>, config: TournamentConfig) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            config,
            sections: BTreeMap::new(),
        }
    }

    /// Add a section with its roster
    pub fn add_section(&mut self, id: impl Into<SectionId>, format: SectionFormat, players: Vec<Player>) -> Result<()> {
        let id = id.into();
        if self.sections.contains_key(&id) {
            return Err(EngineError::Validation(format!("section '{id}' already exists")));
        }
        let section = Section::new(self.id.clone(), id.clone(), format, players)?;
        info!("tournament '{}': section '{}' added", self.id, id);
        self.sections.insert(id, section);
        Ok(())
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn section(&self, id: &str) -> Result<&Section> {
        self.sections
            .get(id)
            .ok_or_else(|| EngineError::Validation(format!("unknown section '{id}'")))
    }

    pub fn section_mut(&mut self, id: &str) -> Result<&mut Section> {
        self.sections
            .get_mut(id)
            .ok_or_else(|| EngineError::Validation(format!("unknown section '{id}'")))
    }

    /// Configuration and sections borrowed apart, for parallel runs
    pub fn split_mut(&mut self) -> (&TournamentConfig, &mut BTreeMap<SectionId, Section>) {
        (&self.config, &mut self.sections)
    }

    // ========================================================================
    // Engine operations
    // ========================================================================

    pub fn generate_pairings(&mut self, tournament: &str, section: &str, round: u32) -> Result<PairingSet> {
        self.check_id(tournament)?;
        self.check_membership(section)?;
        let (config, sections) = self.split_mut();
        lookup(sections, section)?.generate_pairings(round, config)
    }

    /// Record a result; the pairing id names its section
    pub fn record_result(&mut self, pairing: &PairingId, result: GameResult) -> Result<LedgerDelta> {
        self.sections
            .get_mut(&pairing.section)
            .ok_or_else(|| EngineError::NotFound(format!("pairing {pairing}")))?
            .record_result(pairing, result)
    }

    pub fn retract_result(&mut self, pairing: &PairingId) -> Result<LedgerDelta> {
        self.sections
            .get_mut(&pairing.section)
            .ok_or_else(|| EngineError::NotFound(format!("pairing {pairing}")))?
            .retract_result(pairing)
    }

    pub fn complete_round(&mut self, tournament: &str, section: &str, round: u32) -> Result<RoundCompletion> {
        self.check_id(tournament)?;
        let (config, sections) = self.split_mut();
        lookup(sections, section)?.complete_round(round, config)
    }

    pub fn generate_next_round(&mut self, tournament: &str, section: &str) -> Result<PairingSet> {
        self.check_id(tournament)?;
        self.check_membership(section)?;
        let (config, sections) = self.split_mut();
        lookup(sections, section)?.generate_next_round(config)
    }

    pub fn reset_section(&mut self, tournament: &str, section: &str) -> Result<ResetAck> {
        self.check_id(tournament)?;
        Ok(self.section_mut(section)?.reset())
    }

    pub fn withdraw_player(&mut self, tournament: &str, section: &str, player: PlayerId, from_round: u32) -> Result<()> {
        self.check_id(tournament)?;
        self.section_mut(section)?.withdraw_player(player, from_round)
    }

    pub fn compute_standings(
        &self,
        tournament: &str,
        section: &str,
        round: Option<u32>,
        include_tiebreakers: bool,
    ) -> Result<RankedStandings> {
        self.check_id(tournament)?;
        self.section(section)?.standings(round, include_tiebreakers, &self.config)
    }

    pub fn compute_team_standings(
        &self,
        tournament: &str,
        section: &str,
        round: Option<u32>,
    ) -> Result<RankedTeamStandings> {
        self.check_id(tournament)?;
        self.section(section)?.team_standings(round, &self.config)
    }

    // ========================================================================
    // Checks
    // ========================================================================

    fn check_id(&self, tournament: &str) -> Result<()> {
        if tournament == self.id {
            Ok(())
        } else {
            Err(EngineError::NotFound(format!("tournament '{tournament}'")))
        }
    }

    /// Every player of `section` must be absent from all other sections
    fn check_membership(&self, section: &str) -> Result<()> {
        let target = self.section(section)?;
        for other in self.sections.values().filter(|s| s.id() != section) {
            if let Some(player) = target.players().find(|p| other.player(p.id).is_some()) {
                return Err(EngineError::Validation(format!(
                    "player {} is registered in both '{}' and '{}'",
                    player.id,
                    section,
                    other.id()
                )));
            }
        }
        Ok(())
    }
}

fn lookup<'a>(sections: &'a mut BTreeMap<SectionId, Section>, id: &str) -> Result<&'a mut Section> {
    sections
        .get_mut(id)
        .ok_or_else(|| EngineError::Validation(format!("unknown section '{id}'")))
}
