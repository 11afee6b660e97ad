//! Live calendar: reload the store in the background and redraw on change.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use agentdesk_cron::{CalendarController, EntrySource, run_poller, snapshot_channel};
use agentdesk_storage::CalendarStore;

use crate::render;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub async fn run_watch(
    store: Arc<CalendarStore>,
    interval: Duration,
    offset: i32,
) -> anyhow::Result<()> {
    let (publisher, feed) = snapshot_channel();
    let today = chrono::Local::now().date_naive();
    let mut ctl = CalendarController::new(feed, store.clone(), today);
    ctl.shift(offset);

    let cancel = CancellationToken::new();
    let source: Arc<dyn EntrySource> = store;
    let poller = tokio::spawn(run_poller(source, publisher, interval, cancel.clone()));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch");
                break;
            }
            changed = ctl.feed_mut().changed() => {
                if !changed {
                    break;
                }
                let today = chrono::Local::now().date_naive();
                let snapshot = ctl.snapshot();
                let grid = ctl.build(&snapshot, today)?;
                print!("{CLEAR_SCREEN}{}", render::render_month(&grid));
            }
        }
    }

    cancel.cancel();
    poller.await?;
    Ok(())
}
