//! Account sync worker: one account, one pass

use std::sync::Arc;

use chrono::{DateTime, Utc};
use realtysync_domain::{
    classify_event, CanonicalEvent, FetchWindow, Result, SyncAccount, SyncConfig,
    SyncNotification, SyncResult,
};
use tracing::{debug, info, instrument, warn};

use super::guard::SyncGuard;
use super::ports::{SyncAccountRepository, SyncNotifier, TokenProvider};
use super::registry::ProviderRegistry;
use super::retry::RetryController;
use super::sink::TimelineSink;

/// Runs the credentials → fetch → classify → store → cursor pipeline for a
/// single account under the concurrency guard.
pub struct AccountSyncWorker {
    accounts: Arc<dyn SyncAccountRepository>,
    tokens: Arc<dyn TokenProvider>,
    providers: Arc<ProviderRegistry>,
    sink: TimelineSink,
    notifier: Arc<dyn SyncNotifier>,
    guard: SyncGuard,
    retry: RetryController,
    backfill_days: i64,
}

impl AccountSyncWorker {
    pub fn new(
        accounts: Arc<dyn SyncAccountRepository>,
        tokens: Arc<dyn TokenProvider>,
        providers: Arc<ProviderRegistry>,
        sink: TimelineSink,
        notifier: Arc<dyn SyncNotifier>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            accounts,
            tokens,
            providers,
            sink,
            notifier,
            guard: SyncGuard::new(),
            retry: RetryController::from_config(config),
            backfill_days: config.backfill_days,
        }
    }

    pub fn guard(&self) -> &SyncGuard {
        &self.guard
    }

    pub fn retry(&self) -> &RetryController {
        &self.retry
    }

    /// Sync one account. Never returns an error; failures are folded into
    /// the result.
    ///
    /// On success the cursor moves to `pass_started_at`.
    #[instrument(
        skip(self, account),
        fields(account_id = %account.id, provider = %account.provider)
    )]
    pub async fn sync_account(
        &self,
        account: &SyncAccount,
        pass_started_at: DateTime<Utc>,
    ) -> SyncResult {
        let Some(_lease) = self.guard.try_acquire(&account.id) else {
            debug!("sync already in progress, skipping");
            return SyncResult::already_in_progress(&account.id);
        };

        match self.run_pipeline(account, pass_started_at).await {
            Ok(events_processed) => {
                info!(events_processed, "account sync completed");
                self.notifier.notify(SyncNotification::AccountSynced {
                    account_id: account.id.clone(),
                    user_id: account.user_id.clone(),
                    events_processed,
                    completed_at: Utc::now(),
                });
                SyncResult::completed(&account.id, events_processed)
            }
            Err(err) => {
                warn!(error = %err, kind = err.label(), "account sync failed");
                SyncResult::failed(&account.id, err.to_string())
            }
        }
    }

    async fn run_pipeline(
        &self,
        account: &SyncAccount,
        pass_started_at: DateTime<Utc>,
    ) -> Result<usize> {
        let source = self.providers.resolve_account(account)?;
        let token = self.tokens.access_token(&account.id).await?;

        let window =
            FetchWindow::for_cursor(account.last_sync_at, pass_started_at, self.backfill_days)?;
        debug!(?window, "fetching provider events");

        let source = source.as_ref();
        let token = &token;
        let raw_events =
            self.retry.run(&account.id, move || source.fetch_events(token, window)).await?;

        let events: Vec<CanonicalEvent> = raw_events.into_iter().map(classify_event).collect();
        let stored = self.sink.store(&account.user_id, &account.id, &events).await;
        if stored < events.len() {
            warn!(stored, fetched = events.len(), "some events were not stored");
        }

        self.accounts.update_last_sync(&account.id, pass_started_at).await?;
        Ok(stored)
    }
}
