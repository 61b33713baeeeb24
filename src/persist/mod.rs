/// SQLite repository.
pub mod sqlite;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    core::{
        aggregate::{Match, MatchSnapshotV1},
        error::MatchError,
    },
    types::{MatchId, MatchPeriod},
};

/// Errors raised by match repositories.
#[derive(Debug, Error)]
pub enum PersistError {
    /// SQLite failure.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Payload encoding failure.
    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
    /// Any other persistence failure.
    #[error("{0}")]
    Message(String),
}

impl From<MatchError> for PersistError {
    fn from(value: MatchError) -> Self {
        Self::Message(format!("match error: {value}"))
    }
}

/// Result alias for repository operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Row of the match list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchListing {
    /// Match id.
    pub id: MatchId,
    /// Throw-in date.
    pub date_ms: u64,
    /// Competition name.
    pub competition: String,
    /// Home side name.
    pub home: String,
    /// Away side name.
    pub away: String,
    /// Period when last saved.
    pub period: MatchPeriod,
}

/// Storage for whole match aggregates.
///
/// `save` is an atomic upsert: either the full snapshot is stored or
/// nothing changes.
pub trait MatchRepository: Send {
    /// Stores `snapshot`, replacing any earlier save of the same match.
    fn save(&mut self, snapshot: &MatchSnapshotV1) -> PersistResult<()>;
    /// Returns `false` when no match with `id` was stored.
    fn delete(&mut self, id: MatchId) -> PersistResult<bool>;
    /// All matches, newest date first.
    fn list(&self) -> PersistResult<Vec<MatchListing>>;
    /// Snapshot of match `id`, if stored.
    fn load(&self, id: MatchId) -> PersistResult<Option<MatchSnapshotV1>>;

    /// Refreshes and saves `m`.
    fn save_match(&mut self, m: &mut Match) -> PersistResult<()> {
        self.save(&m.export_snapshot())
    }

    /// Loads and rebuilds match `id`.
    fn load_match(&self, id: MatchId) -> PersistResult<Option<Match>> {
        match self.load(id)? {
            Some(snapshot) => Ok(Some(Match::from_snapshot(snapshot)?)),
            None => Ok(None),
        }
    }
}
