//! In-process fan-out of sync notifications

use realtysync_core::SyncNotifier;
use realtysync_domain::SyncNotification;
use tokio::sync::broadcast;
use tracing::trace;

const DEFAULT_CAPACITY: usize = 64;

/// Broadcasts every notification to all current subscribers.
///
/// Slow subscribers lag and lose the oldest messages; the sync pipeline
/// never waits on them.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<SyncNotification>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncNotification> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SyncNotifier for BroadcastNotifier {
    fn notify(&self, notification: SyncNotification) {
        // Err only means nobody is listening.
        if self.sender.send(notification).is_err() {
            trace!("sync notification dropped, no subscribers");
        }
    }
}
