//! Seeded result simulator for whole sections
//!
//! Results follow the Elo expected score, so stronger players win more
//! often. Used by the CLI and integration tests to drive complete events.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use swiss_core::{Board, GameResult, Outcome, PairingId, Result, SectionId};
use tracing::debug;

use crate::config::TournamentConfig;
use crate::locks::SectionLocks;
use crate::round::{RoundCompletion, RoundState};
use crate::section::Section;
use crate::tournament::Tournament;

/// Rating assumed for unrated players
const UNRATED: f64 = 1200.0;

/// Expected score of `rating` against `opponent`
pub fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((opponent - rating) / 400.0))
}

/// Draws results from a seeded RNG
#[derive(Clone, Debug)]
pub struct Simulator {
    rng: ChaCha8Rng,
    draw_rate: f64,
    forfeit_rate: f64,
}

impl Simulator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            draw_rate: 0.2,
            forfeit_rate: 0.0,
        }
    }

    pub fn with_draw_rate(mut self, draw_rate: f64) -> Self {
        self.draw_rate = draw_rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_forfeit_rate(mut self, forfeit_rate: f64) -> Self {
        self.forfeit_rate = forfeit_rate.clamp(0.0, 1.0);
        self
    }

    /// Result of one game, keeping white's expected score
    pub fn result_for(&mut self, white: Option<u32>, black: Option<u32>) -> GameResult {
        let w = white.map_or(UNRATED, f64::from);
        let b = black.map_or(UNRATED, f64::from);
        let expected = expected_score(w, b);

        let draw = self.draw_rate.min(2.0 * expected.min(1.0 - expected));
        let white_wins = expected - draw / 2.0;
        let roll: f64 = self.rng.gen();
        let outcome = if roll < white_wins {
            Outcome::WhiteWin
        } else if roll < white_wins + draw {
            Outcome::Draw
        } else {
            Outcome::BlackWin
        };

        if outcome != Outcome::Draw && self.rng.gen_bool(self.forfeit_rate) {
            GameResult::forfeit(outcome)
        } else {
            GameResult::new(outcome)
        }
    }

    /// Record a result for every undecided game of `round`
    ///
    /// # Returns
    /// Number of results recorded
    pub fn play_round(&mut self, section: &mut Section, round: u32) -> Result<usize> {
        let games: Vec<(PairingId, Option<u32>, Option<u32>)> = section
            .pairings(round)
            .iter()
            .filter(|p| p.result.is_none())
            .filter_map(|p| match p.board {
                Board::Game { white, black } => Some((
                    p.id.clone(),
                    section.player(white).and_then(|pl| pl.rating),
                    section.player(black).and_then(|pl| pl.rating),
                )),
                Board::Bye { .. } => None,
            })
            .collect();

        for (id, white, black) in &games {
            let result = self.result_for(*white, *black);
            section.record_result(id, result)?;
        }
        Ok(games.len())
    }

    /// Play the section to its last round
    pub fn play_out(&mut self, section: &mut Section, config: &TournamentConfig) -> Result<Vec<RoundCompletion>> {
        let mut completions = Vec::new();
        while section.state() != RoundState::TournamentComplete {
            let set = section.generate_next_round(config)?;
            let recorded = self.play_round(section, set.round)?;
            debug!("section '{}' round {}: {} results simulated", section.id(), set.round, recorded);
            completions.push(section.complete_round(set.round, config)?);
        }
        Ok(completions)
    }
}

/// Play every section of a tournament in parallel
///
/// Each section runs under its own lease with a seed derived from `seed`.
pub fn play_out_tournament(
    tournament: &mut Tournament,
    seed: u64,
    locks: &SectionLocks,
) -> Result<BTreeMap<SectionId, Vec<RoundCompletion>>> {
    let tournament_id = tournament.id.clone();
    let (config, sections) = tournament.split_mut();
    let sections: Vec<(&SectionId, &mut Section)> = sections.iter_mut().collect();

    sections
        .into_par_iter()
        .enumerate()
        .map(|(i, (id, section))| {
            let _lease = locks.try_acquire(&tournament_id, id)?;
            let mut simulator = Simulator::new(seed.wrapping_add(i as u64));
            let completions = simulator.play_out(section, config)?;
            Ok((id.clone(), completions))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SectionFormat;
    use swiss_core::Player;

    #[test]
    fn test_expected_score() {
        assert!((expected_score(1500.0, 1500.0) - 0.5).abs() < 1e-9);
        assert!(expected_score(2000.0, 1600.0) > 0.9);
        let sum = expected_score(1800.0, 1650.0) + expected_score(1650.0, 1800.0);
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_results() {
        let mut a = Simulator::new(7);
        let mut b = Simulator::new(7);
        for _ in 0..20 {
            assert_eq!(a.result_for(Some(1800), Some(1700)), b.result_for(Some(1800), Some(1700)));
        }
    }

    #[test]
    fn test_no_draws_when_disabled() {
        let mut sim = Simulator::new(3).with_draw_rate(0.0);
        for _ in 0..50 {
            assert_ne!(sim.result_for(None, None).outcome, Outcome::Draw);
        }
    }

    #[test]
    fn test_play_out_section() {
        let config = TournamentConfig::swiss(4);
        let players = (1..=9)
            .map(|i| Player::new(i, format!("P{i}"), Some(1400 + i * 40), "open"))
            .collect();
        let mut section = Section::new("t", "open", SectionFormat::Individual, players).unwrap();
        let completions = Simulator::new(11).play_out(&mut section, &config).unwrap();

        assert_eq!(completions.len(), 4);
        assert!(completions.last().unwrap().tournament_complete);
        for c in &completions {
            assert_eq!(c.byes, 1);
            assert_eq!(c.points_awarded, c.games as f64 + 1.0);
        }
    }
}
