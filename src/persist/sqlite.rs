//! SQLite-backed match repository. One row per match, whole-aggregate payload.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    core::{aggregate::MatchSnapshotV1, clock::now_ms},
    types::{MatchId, MatchPeriod},
};

use super::{MatchListing, MatchRepository, PersistError, PersistResult};

/// Version number for serialized [`MatchEnvelope`] payloads.
pub const MATCH_FORMAT_VERSION: u16 = 1;

/// Versioned wrapper for stable on-disk payload decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MatchEnvelope {
    format_version: u16,
    snapshot: MatchSnapshotV1,
}

/// SQLite implementation of [`crate::persist::MatchRepository`].
pub struct SqliteMatchRepository {
    conn: Connection,
}

impl SqliteMatchRepository {
    /// Opens or creates a SQLite-backed repository at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory SQLite repository.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn })
    }
}

impl MatchRepository for SqliteMatchRepository {
    fn save(&mut self, snapshot: &MatchSnapshotV1) -> PersistResult<()> {
        let env = MatchEnvelope {
            format_version: MATCH_FORMAT_VERSION,
            snapshot: snapshot.clone(),
        };
        let payload = serde_json::to_vec(&env)?;
        let period = serde_json::to_string(&snapshot.clock.period())?;
        let info = &snapshot.info;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO matches(id, date_ms, competition, home, away, period, saved_at_ms, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                date_ms = excluded.date_ms,
                competition = excluded.competition,
                home = excluded.home,
                away = excluded.away,
                period = excluded.period,
                saved_at_ms = excluded.saved_at_ms,
                payload = excluded.payload",
            params![
                snapshot.id as i64,
                info.date_ms as i64,
                info.competition,
                info.home.name,
                info.away.name,
                period,
                now_ms() as i64,
                payload,
            ],
        )?;
        tx.commit()?;
        debug!(match_id = snapshot.id, events = snapshot.events.events.len(), "match saved");
        Ok(())
    }

    fn delete(&mut self, id: MatchId) -> PersistResult<bool> {
        let count = self
            .conn
            .execute("DELETE FROM matches WHERE id = ?1", params![id as i64])?;
        Ok(count > 0)
    }

    fn list(&self) -> PersistResult<Vec<MatchListing>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date_ms, competition, home, away, period FROM matches
             ORDER BY date_ms DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let date_ms: i64 = row.get(1)?;
            let period: String = row.get(5)?;
            let period: MatchPeriod = serde_json::from_str(&period).map_err(|err| {
                rusqlite::Error::FromSqlConversionFailure(
                    5,
                    rusqlite::types::Type::Text,
                    Box::new(err),
                )
            })?;
            Ok(MatchListing {
                id: id as MatchId,
                date_ms: date_ms as u64,
                competition: row.get(2)?,
                home: row.get(3)?,
                away: row.get(4)?,
                period,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn load(&self, id: MatchId) -> PersistResult<Option<MatchSnapshotV1>> {
        let payload: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT payload FROM matches WHERE id = ?1",
                params![id as i64],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        let env: MatchEnvelope = serde_json::from_slice(&payload)?;
        if env.format_version != MATCH_FORMAT_VERSION {
            return Err(PersistError::Message(format!(
                "unsupported match format version: {}",
                env.format_version
            )));
        }
        Ok(Some(env.snapshot))
    }
}
