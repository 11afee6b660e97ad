//! agentdesk-storage: SQLite-backed calendar entry store.
//!
//! Source of the calendar snapshot feed and target of the enable toggle.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Row};
use tokio::sync::Mutex;

use agentdesk_cron::{EntrySource, ToggleCommand};
use agentdesk_types::{CalendarEntry, EntryKind, NewCalendarEntry};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Blocking task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS calendar_entries (
    id TEXT PRIMARY KEY,
    created_at INTEGER NOT NULL,
    title TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    schedule TEXT NOT NULL DEFAULT '',
    cron_expr TEXT NOT NULL,
    enabled INTEGER NOT NULL DEFAULT 1,
    kind TEXT NOT NULL DEFAULT 'cron',
    next_run_at INTEGER,
    last_run_at INTEGER,
    agent_id TEXT NOT NULL
);";

const SELECT_COLUMNS: &str = "SELECT id, created_at, title, description, schedule, cron_expr, enabled, kind, next_run_at, last_run_at, agent_id
     FROM calendar_entries";

/// SQLite-based storage for calendar entries.
#[derive(Clone)]
pub struct CalendarStore {
    conn: Arc<Mutex<Connection>>,
}

impl CalendarStore {
    /// Open (or create) the SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        tracing::info!("Calendar store opened: {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// All entries, oldest first.
    pub async fn list_all(&self) -> Result<Vec<CalendarEntry>> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY created_at, rowid"))?;
            let rows = stmt
                .query_map([], entry_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await?
    }

    /// Get an entry by ID.
    pub async fn get(&self, id: &str) -> Result<Option<CalendarEntry>> {
        let conn = self.conn.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
            let result = stmt
                .query_row(rusqlite::params![id], entry_from_row)
                .optional()?;
            Ok(result)
        })
        .await?
    }

    /// Insert an entry, or update the existing one with the same title.
    /// Returns the entry ID.
    pub async fn upsert_by_title(&self, new: NewCalendarEntry) -> Result<String> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let existing: Option<String> = conn
                .query_row(
                    "SELECT id FROM calendar_entries WHERE title = ?1",
                    rusqlite::params![new.title],
                    |row| row.get(0),
                )
                .optional()?;

            let id = match existing {
                Some(id) => {
                    conn.execute(
                        "UPDATE calendar_entries SET
                            description = ?2, schedule = ?3, cron_expr = ?4, enabled = ?5,
                            kind = ?6, next_run_at = ?7, last_run_at = ?8, agent_id = ?9
                         WHERE id = ?1",
                        rusqlite::params![
                            id,
                            new.description,
                            new.schedule,
                            new.cron_expr,
                            new.enabled as i32,
                            new.kind.as_str(),
                            new.next_run_at,
                            new.last_run_at,
                            new.agent_id,
                        ],
                    )?;
                    tracing::debug!(entry_id = %id, title = %new.title, "Updated calendar entry");
                    id
                }
                None => {
                    let id = uuid::Uuid::new_v4().to_string();
                    let now = chrono::Utc::now().timestamp_millis();
                    let entry = new.into_entry(id.clone(), now);
                    conn.execute(
                        "INSERT INTO calendar_entries
                            (id, created_at, title, description, schedule, cron_expr, enabled, kind, next_run_at, last_run_at, agent_id)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                        rusqlite::params![
                            entry.id,
                            entry.created_at,
                            entry.title,
                            entry.description,
                            entry.schedule,
                            entry.cron_expr,
                            entry.enabled as i32,
                            entry.kind.as_str(),
                            entry.next_run_at,
                            entry.last_run_at,
                            entry.agent_id,
                        ],
                    )?;
                    tracing::debug!(entry_id = %id, title = %entry.title, "Inserted calendar entry");
                    id
                }
            };
            Ok(id)
        })
        .await?
    }

    /// Flip `enabled`. Returns the new value, or `None` if no entry has this ID.
    pub async fn toggle(&self, id: &str) -> Result<Option<bool>> {
        let conn = self.conn.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let enabled = conn
                .query_row(
                    "UPDATE calendar_entries SET enabled = 1 - enabled WHERE id = ?1 RETURNING enabled",
                    rusqlite::params![id],
                    |row| row.get::<_, i32>(0),
                )
                .optional()?;
            Ok(enabled.map(|v| v != 0))
        })
        .await?
    }

    /// Delete an entry. Returns true if a row was removed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.conn.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let count = conn.execute(
                "DELETE FROM calendar_entries WHERE id = ?1",
                rusqlite::params![id],
            )?;
            Ok(count > 0)
        })
        .await?
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<CalendarEntry> {
    Ok(CalendarEntry {
        id: row.get(0)?,
        created_at: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        schedule: row.get(4)?,
        cron_expr: row.get(5)?,
        enabled: row.get::<_, i32>(6)? != 0,
        kind: row
            .get::<_, String>(7)?
            .parse()
            .unwrap_or(EntryKind::Cron),
        next_run_at: row.get(8)?,
        last_run_at: row.get(9)?,
        agent_id: row.get(10)?,
    })
}

#[async_trait]
impl EntrySource for CalendarStore {
    async fn list_all(&self) -> anyhow::Result<Vec<CalendarEntry>> {
        Ok(CalendarStore::list_all(self).await?)
    }
}

#[async_trait]
impl ToggleCommand for CalendarStore {
    async fn toggle_enabled(&self, id: &str) -> anyhow::Result<()> {
        match self.toggle(id).await? {
            Some(enabled) => tracing::info!(entry_id = %id, enabled, "Toggled calendar entry"),
            None => tracing::warn!(entry_id = %id, "Toggle requested for unknown calendar entry"),
        }
        Ok(())
    }
}
