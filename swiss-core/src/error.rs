//! Error taxonomy shared by every engine operation

use crate::pairing::PairingId;

/// Errors surfaced by engine operations.
///
/// Soft compromises made while pairing (floats, color overrides, forced
/// rematches) are not errors; they travel as warnings on the pairing set.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Malformed input: bad round number, unknown section, foreign player
    #[error("validation failed: {0}")]
    Validation(String),

    /// Sequencing violation; `outstanding` lists the pairings blocking progress
    #[error("conflict: {reason}")]
    Conflict {
        reason: String,
        outstanding: Vec<PairingId>,
    },

    /// The pool cannot be paired under the configured hard constraints
    #[error("pairing impossible: {0}")]
    Algorithm(String),

    /// Unknown pairing or tournament id
    #[error("not found: {0}")]
    NotFound(String),
}

impl EngineError {
    /// Conflict without outstanding pairings
    pub fn conflict(reason: impl Into<String>) -> Self {
        EngineError::Conflict {
            reason: reason.into(),
            outstanding: Vec::new(),
        }
    }

    /// Pairings the caller must resolve before retrying
    pub fn outstanding(&self) -> &[PairingId] {
        match self {
            EngineError::Conflict { outstanding, .. } => outstanding,
            _ => &[],
        }
    }

    /// Only conflicts can succeed on retry without changing the input
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Conflict { .. })
    }
}

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_carries_outstanding() {
        let id = PairingId::new("open", 2, 3);
        let err = EngineError::Conflict {
            reason: "results missing".to_string(),
            outstanding: vec![id.clone()],
        };
        assert_eq!(err.outstanding(), &[id]);
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "conflict: results missing");
    }

    #[test]
    fn test_other_errors_not_retryable() {
        assert!(!EngineError::Validation("round 0".into()).is_retryable());
        assert!(!EngineError::Algorithm("empty pool".into()).is_retryable());
        assert!(EngineError::NotFound("x".into()).outstanding().is_empty());
    }
}
