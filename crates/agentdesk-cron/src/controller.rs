//! Calendar view state: which month is shown and which entry is open.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use agentdesk_types::CalendarEntry;

use crate::feed::{Snapshot, SnapshotFeed};
use crate::grid::{GridError, MonthGrid, build_month_grid};

/// Flips the `enabled` flag of an entry in the backing store.
#[async_trait]
pub trait ToggleCommand: Send + Sync {
    async fn toggle_enabled(&self, id: &str) -> anyhow::Result<()>;
}

/// The month currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub year: i32,
    /// Month index, 0 = January.
    pub month0: u32,
}

impl ViewState {
    pub fn new(year: i32, month0: u32) -> Result<Self, GridError> {
        if month0 > 11 {
            return Err(GridError::InvalidMonth(month0));
        }
        Ok(Self { year, month0 })
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0(),
        }
    }

    pub fn prev_month(self) -> Self {
        self.shift(-1)
    }

    pub fn next_month(self) -> Self {
        self.shift(1)
    }

    /// Step `months` forward (or backward when negative). Saturates at the
    /// first and last month of the `i32` year range.
    pub fn shift(self, months: i32) -> Self {
        let min = i64::from(i32::MIN) * 12;
        let max = i64::from(i32::MAX) * 12 + 11;
        let index = (self.month_index() + i64::from(months)).clamp(min, max);
        Self::from_month_index(index)
    }

    /// Months since January of year 0.
    fn month_index(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month0)
    }

    fn from_month_index(index: i64) -> Self {
        Self {
            // The caller keeps `index` within the i32 year range.
            year: index.div_euclid(12) as i32,
            month0: index.rem_euclid(12) as u32,
        }
    }
}

/// Owns the calendar view state and forwards toggles to the store.
///
/// Entries are never modified here. A toggle shows up once the feed delivers
/// the next snapshot.
pub struct CalendarController {
    feed: SnapshotFeed,
    toggle: Arc<dyn ToggleCommand>,
    view: ViewState,
    selected_id: Option<String>,
}

impl CalendarController {
    /// Start on the month containing `today`.
    pub fn new(feed: SnapshotFeed, toggle: Arc<dyn ToggleCommand>, today: NaiveDate) -> Self {
        Self {
            feed,
            toggle,
            view: ViewState::containing(today),
            selected_id: None,
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn set_view(&mut self, year: i32, month0: u32) -> Result<(), GridError> {
        self.view = ViewState::new(year, month0)?;
        Ok(())
    }

    pub fn prev_month(&mut self) {
        self.view = self.view.prev_month();
    }

    pub fn next_month(&mut self) {
        self.view = self.view.next_month();
    }

    pub fn shift(&mut self, months: i32) {
        self.view = self.view.shift(months);
    }

    /// Open the detail view for `entry`.
    pub fn select(&mut self, entry: &CalendarEntry) {
        self.selected_id = Some(entry.id.clone());
    }

    pub fn close(&mut self) {
        self.selected_id = None;
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    /// The selected entry as it appears in `snapshot`, if it still exists.
    pub fn selected_entry<'a>(&self, snapshot: &'a [CalendarEntry]) -> Option<&'a CalendarEntry> {
        let id = self.selected_id.as_deref()?;
        snapshot.iter().find(|entry| entry.id == id)
    }

    /// Latest entries from the feed (empty until the first load).
    pub fn snapshot(&self) -> Snapshot {
        self.feed.current()
    }

    pub fn feed_mut(&mut self) -> &mut SnapshotFeed {
        &mut self.feed
    }

    /// Build the grid for the current view.
    pub fn build<'a>(
        &self,
        snapshot: &'a [CalendarEntry],
        today: NaiveDate,
    ) -> Result<MonthGrid<'a>, GridError> {
        build_month_grid(snapshot, self.view.year, self.view.month0, today)
    }

    /// Ask the store to flip `enabled` for `id`. Runs in the background; the
    /// handle may be dropped. Failures are only logged.
    pub fn toggle(&self, id: &str) -> JoinHandle<()> {
        let toggle = self.toggle.clone();
        let id = id.to_string();
        debug!(entry_id = %id, "Forwarding toggle");
        tokio::spawn(async move {
            if let Err(e) = toggle.toggle_enabled(&id).await {
                warn!("Failed to toggle calendar entry {id}: {e}");
            }
        })
    }
}
