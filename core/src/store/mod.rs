//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database. Every other module calls
//! typed store methods — nothing else executes SQL.

use crate::error::GameResult;
use crate::event::{EventLogEntry, GameEvent};
use crate::types::Round;
use rusqlite::{params, Connection};

mod group;
mod player;
mod puzzle;

pub struct GameStore {
    conn: Connection,
}

impl GameStore {
    pub fn open(path: &str) -> GameResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only matters for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GameResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GameResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_event_log.sql"))?;
        Ok(())
    }

    // ── Session ────────────────────────────────────────────────

    pub fn insert_session(
        &self,
        session_id: &str,
        seed: u64,
        task_kind: &str,
        version: &str,
        started_at: &str,
    ) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO session (session_id, seed, task_kind, version, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![session_id, seed as i64, task_kind, version, started_at],
        )?;
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (session_id, round, actor, event_type, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.session_id,
                entry.round,
                entry.actor,
                entry.event_type,
                entry.payload,
            ],
        )?;
        Ok(())
    }

    /// Serialize and append one event.
    pub fn append_game_event(
        &self,
        session_id: &str,
        round: Round,
        actor: &str,
        event: &GameEvent,
    ) -> GameResult<()> {
        self.append_event(&EventLogEntry {
            id: None,
            session_id: session_id.to_string(),
            round,
            actor: actor.to_string(),
            event_type: event.type_name().to_string(),
            payload: serde_json::to_string(event)?,
        })
    }

    pub fn events_for_round(
        &self,
        session_id: &str,
        round: Round,
    ) -> GameResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, round, actor, event_type, payload
             FROM event_log WHERE session_id = ?1 AND round = ?2
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![session_id, round], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    session_id: row.get(1)?,
                    round: row.get(2)?,
                    actor: row.get(3)?,
                    event_type: row.get(4)?,
                    payload: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn count_events(&self, session_id: &str, event_type: &str) -> GameResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE session_id = ?1 AND event_type = ?2",
            params![session_id, event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}
