//! Plain-text rendering of the calendar, the entry list and the detail view.

use chrono::{DateTime, Local};

use agentdesk_cron::{GridCell, MonthGrid, hour_of};
use agentdesk_types::{CalendarEntry, EntryKind};

const CELL_WIDTH: usize = 14;
const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// One-letter marker: C cron job, T task, x disabled.
fn marker(entry: &CalendarEntry) -> char {
    match (entry.enabled, entry.kind) {
        (false, _) => 'x',
        (true, EntryKind::Cron) => 'C',
        (true, EntryKind::Task) => 'T',
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('~');
    out
}

fn cell_lines(cell: &GridCell<'_>) -> Vec<String> {
    let GridCell::Day(day) = cell else {
        return Vec::new();
    };
    let mut lines = Vec::with_capacity(day.entries.len() + 1);
    lines.push(if day.is_today {
        format!("[{}]", day.day)
    } else {
        day.day.to_string()
    });
    for entry in &day.entries {
        let line = format!(
            "{} {:02} {}",
            marker(entry),
            hour_of(&entry.cron_expr),
            entry.title
        );
        lines.push(truncate(&line, CELL_WIDTH));
    }
    lines
}

/// Render the month as a Sunday-first table. Today is bracketed.
pub fn render_month(grid: &MonthGrid<'_>) -> String {
    let width = CELL_WIDTH;
    let total_width = (width + 1) * WEEKDAYS.len() + 1;
    let separator = format!("+{}\n", format!("{}+", "-".repeat(width)).repeat(WEEKDAYS.len()));

    let mut out = format!("{:^total_width$}\n", grid.title());
    out.push_str("C cron job   T task   x disabled\n");
    out.push_str(&separator);
    out.push('|');
    for name in WEEKDAYS {
        out.push_str(&format!("{name:<width$}|"));
    }
    out.push('\n');
    out.push_str(&separator);

    for week in grid.weeks() {
        let columns: Vec<Vec<String>> = (0..WEEKDAYS.len())
            .map(|i| week.get(i).map(cell_lines).unwrap_or_default())
            .collect();
        let height = columns.iter().map(Vec::len).max().unwrap_or(0).max(1);
        for row in 0..height {
            out.push('|');
            for column in &columns {
                let text = column.get(row).map(String::as_str).unwrap_or("");
                out.push_str(&format!("{text:<width$}|"));
            }
            out.push('\n');
        }
        out.push_str(&separator);
    }
    out
}

/// The "All Scheduled Jobs" list.
pub fn render_list(entries: &[CalendarEntry]) -> String {
    let mut out = String::from("All Scheduled Jobs\n");
    if entries.is_empty() {
        out.push_str("No calendar entries\n");
        return out;
    }
    for entry in entries {
        out.push_str(&format!(
            "{:<3} {:<4} {:<36} {:<28} {:<24} {}\n",
            if entry.enabled { "ON" } else { "OFF" },
            entry.kind,
            entry.id,
            truncate(&entry.title, 28),
            truncate(&entry.schedule, 24),
            entry.agent_id,
        ));
    }
    out
}

fn format_millis(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(|t| {
        t.with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    })
}

fn detail_row(label: &str, value: &str) -> String {
    format!("{label:<10}{value}\n")
}

/// Detail view for one entry. Absent run times are left out.
pub fn render_detail(entry: &CalendarEntry) -> String {
    let mut out = format!("{}\n", entry.title);
    if !entry.description.is_empty() {
        out.push_str(&format!("{}\n", entry.description));
    }
    out.push('\n');
    out.push_str(&detail_row("Schedule", &entry.schedule));
    out.push_str(&detail_row("Cron", &entry.cron_expr));
    out.push_str(&detail_row("Agent", &entry.agent_id));
    out.push_str(&detail_row(
        "Status",
        if entry.enabled { "Enabled" } else { "Disabled" },
    ));
    if let Some(next) = entry.next_run_at.and_then(format_millis) {
        out.push_str(&detail_row("Next run", &next));
    }
    if let Some(last) = entry.last_run_at.and_then(format_millis) {
        out.push_str(&detail_row("Last run", &last));
    }
    out
}
