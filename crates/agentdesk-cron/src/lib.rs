//! agentdesk-cron: Calendar projection of scheduled agent jobs.
//!
//! Evaluates five-field cron expressions at day granularity, lays a month out
//! as a Sunday-first grid with the matching entries per day, and keeps the
//! navigation/selection state of the calendar view.

pub mod controller;
pub mod cron;
pub mod feed;
pub mod grid;

pub use controller::{CalendarController, ToggleCommand, ViewState};
pub use cron::{cron_matches_date, hour_of, parse_int_prefix};
pub use feed::{EntrySource, SnapshotFeed, SnapshotPublisher, run_poller, snapshot_channel};
pub use grid::{DayCell, GridCell, GridError, MonthGrid, build_month_grid};
