//! Single-entry commands: detail view, toggle, upsert.

use std::sync::Arc;

use anyhow::bail;
use chrono::NaiveDate;

use agentdesk_cron::cron::is_well_formed;
use agentdesk_cron::{CalendarController, snapshot_channel};
use agentdesk_storage::CalendarStore;
use agentdesk_types::NewCalendarEntry;

use crate::render;

pub async fn show(store: &CalendarStore, id: &str) -> anyhow::Result<()> {
    let Some(entry) = store.get(id).await? else {
        bail!("No calendar entry with id {id}");
    };
    print!("{}", render::render_detail(&entry));
    Ok(())
}

pub async fn toggle(store: Arc<CalendarStore>, id: &str, today: NaiveDate) -> anyhow::Result<()> {
    let (publisher, feed) = snapshot_channel();
    let ctl = CalendarController::new(feed, store.clone(), today);

    // Wait for the background toggle so the process does not exit first.
    ctl.toggle(id).await?;

    publisher.publish(store.list_all().await?);
    match ctl.snapshot().iter().find(|e| e.id == id) {
        Some(entry) => println!(
            "{} is now {}",
            entry.title,
            if entry.enabled { "enabled" } else { "disabled" }
        ),
        None => bail!("No calendar entry with id {id}"),
    }
    Ok(())
}

pub async fn add(store: &CalendarStore, new: NewCalendarEntry) -> anyhow::Result<()> {
    if !is_well_formed(&new.cron_expr) {
        tracing::warn!(
            cron = %new.cron_expr,
            "Cron expression does not have five fields; the entry will not appear on the calendar"
        );
    }
    let title = new.title.clone();
    let id = store.upsert_by_title(new).await?;
    println!("{id}  {title}");
    Ok(())
}
