//! Month grid: Sunday-first day cells with the entries that fire on each day.

use chrono::{Datelike, Months, NaiveDate};
use thiserror::Error;

use agentdesk_types::CalendarEntry;

use crate::cron::{cron_matches_date, hour_of};

pub const DAYS_PER_WEEK: usize = 7;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("Month index {0} is out of range (expected 0-11)")]
    InvalidMonth(u32),
    #[error("Date out of range: year {year}, month index {month0}")]
    OutOfRange { year: i32, month0: u32 },
}

/// A single day of the viewed month.
#[derive(Debug, Clone)]
pub struct DayCell<'a> {
    /// Day of month, 1-based.
    pub day: u32,
    pub date: NaiveDate,
    pub is_today: bool,
    /// Entries firing on this day, ascending by nominal hour.
    pub entries: Vec<&'a CalendarEntry>,
}

/// A slot in the 7-column grid.
#[derive(Debug, Clone)]
pub enum GridCell<'a> {
    /// Leading placeholder before day 1.
    Padding,
    Day(DayCell<'a>),
}

impl<'a> GridCell<'a> {
    pub fn as_day(&self) -> Option<&DayCell<'a>> {
        match self {
            GridCell::Day(day) => Some(day),
            GridCell::Padding => None,
        }
    }
}

/// Rendered layout of one month.
#[derive(Debug, Clone)]
pub struct MonthGrid<'a> {
    pub year: i32,
    /// Month index, 0 = January.
    pub month0: u32,
    leading_pad: usize,
    cells: Vec<GridCell<'a>>,
}

impl<'a> MonthGrid<'a> {
    /// Number of empty cells before day 1 (weekday of the 1st, 0 = Sunday).
    pub fn leading_pad_count(&self) -> usize {
        self.leading_pad
    }

    pub fn days_in_month(&self) -> usize {
        self.cells.len() - self.leading_pad
    }

    /// Padding cells followed by one cell per day.
    pub fn cells(&self) -> &[GridCell<'a>] {
        &self.cells
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell<'a>> {
        self.cells.iter().filter_map(GridCell::as_day)
    }

    /// Look up a day by its 1-based number.
    pub fn day(&self, day: u32) -> Option<&DayCell<'a>> {
        let index = self.leading_pad + (day as usize).checked_sub(1)?;
        self.cells.get(index).and_then(GridCell::as_day)
    }

    /// Rows of seven cells; the final row may be shorter.
    pub fn weeks(&self) -> impl Iterator<Item = &[GridCell<'a>]> {
        self.cells.chunks(DAYS_PER_WEEK)
    }

    /// e.g. "February 2024".
    pub fn title(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.month0 as usize], self.year)
    }
}

/// First day of the month, rejecting month indexes outside 0-11.
pub(crate) fn first_of_month(year: i32, month0: u32) -> Result<NaiveDate, GridError> {
    if month0 > 11 {
        return Err(GridError::InvalidMonth(month0));
    }
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).ok_or(GridError::OutOfRange { year, month0 })
}

/// Lay out `year`/`month0` and attach the entries firing on each day.
///
/// Entries are borrowed from the snapshot. Within a day they are sorted by
/// [`hour_of`] with a stable sort, so equal hours keep snapshot order.
/// Enablement plays no part in matching.
pub fn build_month_grid(
    entries: &[CalendarEntry],
    year: i32,
    month0: u32,
    today: NaiveDate,
) -> Result<MonthGrid<'_>, GridError> {
    let first = first_of_month(year, month0)?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or(GridError::OutOfRange { year, month0 })?;

    let leading_pad = first.weekday().num_days_from_sunday() as usize;
    let days_in_month = last.day() as usize;

    let mut cells = Vec::with_capacity(leading_pad + days_in_month);
    cells.extend(std::iter::repeat_with(|| GridCell::Padding).take(leading_pad));

    for date in first.iter_days().take(days_in_month) {
        let mut matched: Vec<&CalendarEntry> = entries
            .iter()
            .filter(|entry| cron_matches_date(&entry.cron_expr, date))
            .collect();
        matched.sort_by_key(|entry| hour_of(&entry.cron_expr));

        cells.push(GridCell::Day(DayCell {
            day: date.day(),
            date,
            is_today: date == today,
            entries: matched,
        }));
    }

    tracing::trace!(
        year,
        month0,
        entries = entries.len(),
        "Built month grid"
    );

    Ok(MonthGrid {
        year,
        month0,
        leading_pad,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentdesk_types::EntryKind;

    fn entry(id: &str, cron_expr: &str, enabled: bool) -> CalendarEntry {
        CalendarEntry {
            id: id.into(),
            created_at: 0,
            title: format!("job {id}"),
            description: String::new(),
            schedule: String::new(),
            cron_expr: cron_expr.into(),
            enabled,
            kind: EntryKind::Cron,
            next_run_at: None,
            last_run_at: None,
            agent_id: "agent-1".into(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ids<'a>(cell: &DayCell<'a>) -> Vec<&'a str> {
        cell.entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_leap_february_layout() {
        let grid = build_month_grid(&[], 2024, 1, date(2000, 1, 1)).unwrap();
        assert_eq!(grid.days_in_month(), 29);
        assert_eq!(grid.leading_pad_count(), 4);
        assert_eq!(grid.cells().len(), 33);
        assert!(matches!(grid.cells()[3], GridCell::Padding));
        assert_eq!(grid.cells()[4].as_day().unwrap().day, 1);
        assert_eq!(grid.title(), "February 2024");
    }

    #[test]
    fn test_month_lengths() {
        let today = date(2000, 1, 1);
        let cases = [
            (2023, 1, 28),
            (2100, 1, 28),
            (2000, 1, 29),
            (2024, 3, 30),
            (2024, 11, 31),
            (2025, 0, 31),
        ];
        for (year, month0, days) in cases {
            let grid = build_month_grid(&[], year, month0, today).unwrap();
            assert_eq!(grid.days_in_month(), days, "{year}-{month0}");
            let last = grid.days().last().unwrap();
            assert_eq!(last.day as usize, days);
            assert_eq!(last.date.month0(), month0);
        }
    }

    #[test]
    fn test_sunday_start_has_no_padding() {
        // 2024-09-01 is a Sunday.
        let grid = build_month_grid(&[], 2024, 8, date(2000, 1, 1)).unwrap();
        assert_eq!(grid.leading_pad_count(), 0);
        assert_eq!(grid.weeks().count(), 5);
        assert_eq!(grid.weeks().next().unwrap().len(), DAYS_PER_WEEK);
    }

    #[test]
    fn test_entries_sorted_by_hour_and_stable() {
        let entries = vec![
            entry("late", "0 18 * * *", true),
            entry("first-nine", "0 9 * * *", true),
            entry("bad-hour", "0 x * * *", true),
            entry("second-nine", "30 9 * * *", true),
            entry("never", "0 9 * *", true),
        ];
        let grid = build_month_grid(&entries, 2024, 2, date(2000, 1, 1)).unwrap();
        for cell in grid.days() {
            assert_eq!(
                ids(cell),
                vec!["bad-hour", "first-nine", "second-nine", "late"]
            );
        }
    }

    #[test]
    fn test_day_of_month_entry_lands_on_one_day() {
        let entries = vec![entry("mid", "0 9 15 * *", true)];
        let grid = build_month_grid(&entries, 2024, 2, date(2000, 1, 1)).unwrap();
        let hits: Vec<u32> = grid
            .days()
            .filter(|cell| !cell.entries.is_empty())
            .map(|cell| cell.day)
            .collect();
        assert_eq!(hits, vec![15]);
    }

    #[test]
    fn test_disabled_entries_still_match() {
        let entries = vec![entry("off", "0 6 * * 1", false)];
        let grid = build_month_grid(&entries, 2024, 0, date(2000, 1, 1)).unwrap();
        // Mondays in January 2024: 1, 8, 15, 22, 29.
        let mondays: Vec<u32> = grid
            .days()
            .filter(|cell| cell.entries.iter().any(|e| !e.enabled))
            .map(|cell| cell.day)
            .collect();
        assert_eq!(mondays, vec![1, 8, 15, 22, 29]);
    }

    #[test]
    fn test_is_today() {
        let grid = build_month_grid(&[], 2024, 1, date(2024, 2, 10)).unwrap();
        let today: Vec<u32> = grid.days().filter(|c| c.is_today).map(|c| c.day).collect();
        assert_eq!(today, vec![10]);

        let other_year = build_month_grid(&[], 2023, 1, date(2024, 2, 10)).unwrap();
        assert!(other_year.days().all(|c| !c.is_today));
    }

    #[test]
    fn test_day_lookup() {
        let grid = build_month_grid(&[], 2024, 1, date(2000, 1, 1)).unwrap();
        assert_eq!(grid.day(1).unwrap().date, date(2024, 2, 1));
        assert_eq!(grid.day(29).unwrap().date, date(2024, 2, 29));
        assert!(grid.day(0).is_none());
        assert!(grid.day(30).is_none());
    }

    #[test]
    fn test_invalid_month() {
        let err = build_month_grid(&[], 2024, 12, date(2000, 1, 1)).unwrap_err();
        assert_eq!(err, GridError::InvalidMonth(12));
    }

    #[test]
    fn test_year_out_of_range() {
        let err = build_month_grid(&[], i32::MAX, 0, date(2000, 1, 1)).unwrap_err();
        assert!(matches!(err, GridError::OutOfRange { .. }));
    }
}
