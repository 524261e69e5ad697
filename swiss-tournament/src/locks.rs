//! Section leases - mutual exclusion per (tournament, section)
//!
//! Pairing generation and round completion for the same section must never
//! overlap. A calling service holds a lease for the duration of one
//! read-modify-write; a second acquire for the same key is rejected.

use rustc_hash::FxHashSet;
use std::sync::{Mutex, PoisonError};
use swiss_core::{EngineError, Result, SectionId, TournamentId};
use tracing::debug;

type Key = (TournamentId, SectionId);

/// Table of sections currently being mutated
#[derive(Debug, Default)]
pub struct SectionLocks {
    held: Mutex<FxHashSet<Key>>,
}

impl SectionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lease for a section, or fail with `Conflict` if it is held
    pub fn try_acquire(&self, tournament: &str, section: &str) -> Result<SectionLease<'_>> {
        let key = (tournament.to_string(), section.to_string());
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        if !held.insert(key.clone()) {
            return Err(EngineError::conflict(format!(
                "section '{section}' of tournament '{tournament}' is being modified"
            )));
        }
        debug!("lease taken for {}/{}", tournament, section);
        Ok(SectionLease { locks: self, key })
    }

    pub fn is_held(&self, tournament: &str, section: &str) -> bool {
        let held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        held.contains(&(tournament.to_string(), section.to_string()))
    }
}

/// Released on drop
#[derive(Debug)]
pub struct SectionLease<'a> {
    locks: &'a SectionLocks,
    key: Key,
}

impl SectionLease<'_> {
    pub fn section(&self) -> &str {
        &self.key.1
    }
}

impl Drop for SectionLease<'_> {
    fn drop(&mut self) {
        let mut held = self.locks.held.lock().unwrap_or_else(PoisonError::into_inner);
        held.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_conflicts() {
        let locks = SectionLocks::new();
        let lease = locks.try_acquire("spring", "open").unwrap();
        assert!(locks.is_held("spring", "open"));
        assert!(matches!(
            locks.try_acquire("spring", "open"),
            Err(EngineError::Conflict { .. })
        ));
        // Other sections and tournaments are independent
        assert!(locks.try_acquire("spring", "u1600").is_ok());
        assert!(locks.try_acquire("autumn", "open").is_ok());
        assert_eq!(lease.section(), "open");
    }

    #[test]
    fn test_drop_releases() {
        let locks = SectionLocks::new();
        {
            let _lease = locks.try_acquire("spring", "open").unwrap();
        }
        assert!(!locks.is_held("spring", "open"));
        assert!(locks.try_acquire("spring", "open").is_ok());
    }

    #[test]
    fn test_parallel_sections() {
        use rayon::prelude::*;
        let locks = SectionLocks::new();
        let sections: Vec<String> = (0..8).map(|i| format!("s{i}")).collect();
        let acquired = sections
            .par_iter()
            .filter(|s| locks.try_acquire("spring", s).is_ok())
            .count();
        assert_eq!(acquired, 8);
    }
}
