use serde::{Deserialize, Serialize};

// ──────────────────── Calendar Types ────────────────────

/// Kind of a calendar entry. Only affects how the entry is styled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Recurring job driven by a cron expression.
    #[default]
    Cron,
    /// One-off task.
    Task,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Cron => "cron",
            EntryKind::Task => "task",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cron" => Ok(EntryKind::Cron),
            "task" => Ok(EntryKind::Task),
            other => Err(format!("unknown entry type: {other}")),
        }
    }
}

/// A scheduled item shown on the calendar, as delivered by the data store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    /// Unique entry ID.
    pub id: String,
    /// Creation time (unix millis).
    pub created_at: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Human-readable schedule (e.g. "Every weekday at 09:00").
    #[serde(default)]
    pub schedule: String,
    /// Five-field cron expression: minute hour day-of-month month day-of-week.
    pub cron_expr: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(rename = "type", default)]
    pub kind: EntryKind,
    /// Next scheduled run (unix millis).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_at: Option<i64>,
    /// Last run (unix millis).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<i64>,
    /// Owning agent. Not validated against any agent list.
    pub agent_id: String,
}

/// Payload for creating or updating an entry, keyed by title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewCalendarEntry {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schedule: String,
    pub cron_expr: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(rename = "type", default)]
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<i64>,
    pub agent_id: String,
}

impl NewCalendarEntry {
    /// Materialize into a stored entry.
    pub fn into_entry(self, id: String, created_at: i64) -> CalendarEntry {
        CalendarEntry {
            id,
            created_at,
            title: self.title,
            description: self.description,
            schedule: self.schedule,
            cron_expr: self.cron_expr,
            enabled: self.enabled,
            kind: self.kind,
            next_run_at: self.next_run_at,
            last_run_at: self.last_run_at,
            agent_id: self.agent_id,
        }
    }
}

fn default_true() -> bool {
    true
}
