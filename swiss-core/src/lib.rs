//! Swiss Core - Data model and per-player state for Swiss-system events
//!
//! This crate provides the leaf components of the pairing engine:
//! - Players, pairings and game results
//! - Player ledger (scores, opponents, colors, byes)
//! - Color balance tracking
//! - Score acceleration for early rounds
//!
//! Nothing here performs I/O. Callers supply the in-memory state and persist
//! whatever comes back.

pub mod acceleration;
pub mod color;
pub mod error;
pub mod game;
pub mod ledger;
pub mod pairing;
pub mod player;

// Re-exports for convenient access
pub use acceleration::Acceleration;
pub use color::{ColorPreference, ColorRules, PreferenceStrength};
pub use error::{EngineError, Result};
pub use game::{ByeKind, ByePoints, Color, GameResult, Outcome};
pub use ledger::{Ledger, LedgerDelta, LedgerEntry, LedgerGame, PointDelta, Recorded};
pub use pairing::{Board, MatchLabel, Pairing, PairingId};
pub use player::{Player, PlayerId, PlayerStatus, SectionId, TeamId, TournamentId};
