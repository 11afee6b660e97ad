//! Snapshot feed: delivers the latest full list of calendar entries.
//!
//! Consumers never see partial updates. Each publish replaces the whole
//! snapshot, and a feed that has not been loaded yet reads as empty.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use agentdesk_types::CalendarEntry;

/// Immutable view of all entries at one point in time.
pub type Snapshot = Arc<[CalendarEntry]>;

/// Anything that can produce the current list of calendar entries.
#[async_trait]
pub trait EntrySource: Send + Sync {
    async fn list_all(&self) -> anyhow::Result<Vec<CalendarEntry>>;
}

/// Write half of the feed.
#[derive(Debug)]
pub struct SnapshotPublisher {
    tx: watch::Sender<Option<Snapshot>>,
}

/// Read half of the feed. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SnapshotFeed {
    rx: watch::Receiver<Option<Snapshot>>,
}

/// Create a connected publisher/feed pair in the "not loaded" state.
pub fn snapshot_channel() -> (SnapshotPublisher, SnapshotFeed) {
    let (tx, rx) = watch::channel(None);
    (SnapshotPublisher { tx }, SnapshotFeed { rx })
}

impl SnapshotPublisher {
    /// Replace the current snapshot. Returns false if every feed was dropped.
    pub fn publish(&self, entries: Vec<CalendarEntry>) -> bool {
        self.tx.send(Some(entries.into())).is_ok()
    }

    /// Publish only if the entries differ from the current snapshot.
    /// Returns true when a new snapshot went out.
    pub fn publish_if_changed(&self, entries: Vec<CalendarEntry>) -> bool {
        self.tx.send_if_modified(|current| {
            let unchanged = current
                .as_deref()
                .is_some_and(|snapshot| snapshot == entries.as_slice());
            if unchanged {
                return false;
            }
            *current = Some(entries.into());
            true
        })
    }
}

impl SnapshotFeed {
    /// Latest snapshot, or an empty one if nothing has been loaded yet.
    pub fn current(&self) -> Snapshot {
        self.rx
            .borrow()
            .clone()
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    pub fn is_loaded(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Wait for the next snapshot. Returns false once the publisher is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

/// Reload `source` every `interval` and publish changed snapshots until cancelled.
///
/// A failed load keeps the previous snapshot in place.
pub async fn run_poller(
    source: Arc<dyn EntrySource>,
    publisher: SnapshotPublisher,
    interval: Duration,
    cancel: CancellationToken,
) {
    info!(interval_secs = interval.as_secs(), "Calendar feed poller started");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match source.list_all().await {
            Ok(entries) => {
                let count = entries.len();
                if publisher.publish_if_changed(entries) {
                    debug!(entries = count, "Published new calendar snapshot");
                }
            }
            Err(e) => warn!("Failed to reload calendar entries: {e}"),
        }
    }
    info!("Calendar feed poller stopped");
}
