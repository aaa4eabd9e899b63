//! Storage sink: idempotent upsert of canonical events into the timeline

use std::sync::Arc;

use realtysync_domain::{CanonicalEvent, Result, StoredTimelineEntry};
use tracing::{debug, warn};

use super::ports::TimelineRepository;

/// Writes canonical events as timeline entries keyed by
/// (user, entity type, external id).
#[derive(Clone)]
pub struct TimelineSink {
    repository: Arc<dyn TimelineRepository>,
}

impl TimelineSink {
    pub fn new(repository: Arc<dyn TimelineRepository>) -> Self {
        Self { repository }
    }

    /// Persist every event, returning how many were stored.
    ///
    /// A failure on one event is logged and skipped; the rest of the batch
    /// still goes through.
    pub async fn store(
        &self,
        user_id: &str,
        account_id: &str,
        events: &[CanonicalEvent],
    ) -> usize {
        let mut stored = 0;

        for event in events {
            let entry = StoredTimelineEntry::from_canonical(user_id, account_id, event);
            match self.store_one(entry).await {
                Ok(()) => stored += 1,
                Err(err) => warn!(
                    account_id,
                    external_id = %event.external_id,
                    error = %err,
                    "failed to store timeline entry, skipping"
                ),
            }
        }

        debug!(account_id, stored, total = events.len(), "timeline batch stored");
        stored
    }

    async fn store_one(&self, entry: StoredTimelineEntry) -> Result<()> {
        if self.repository.supports_native_upsert() {
            return self.repository.upsert(&entry).await;
        }

        match self.repository.find_by_key(&entry.key()).await? {
            Some(existing) => {
                self.repository.update(&StoredTimelineEntry { id: existing.id, ..entry }).await
            }
            None => self.repository.create(&entry).await,
        }
    }
}
