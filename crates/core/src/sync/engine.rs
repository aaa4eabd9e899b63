//! Sync coordinator: scheduled pass fan-out and manual trigger

use std::sync::Arc;

use chrono::Utc;
use realtysync_domain::{
    PassReport, RealtySyncError, Result, SyncConfig, SyncNotification, SyncResult,
};
use tracing::{error, info, instrument};

use super::ports::{SyncAccountRepository, SyncNotifier, TimelineRepository, TokenProvider};
use super::registry::ProviderRegistry;
use super::sink::TimelineSink;
use super::worker::AccountSyncWorker;

/// Collaborators the engine is wired with.
#[derive(Clone)]
pub struct SyncDependencies {
    pub accounts: Arc<dyn SyncAccountRepository>,
    pub timeline: Arc<dyn TimelineRepository>,
    pub tokens: Arc<dyn TokenProvider>,
    pub providers: Arc<ProviderRegistry>,
    pub notifier: Arc<dyn SyncNotifier>,
}

/// Owns the worker (and with it the guard set and retry counters) for one
/// engine instance.
pub struct SyncEngine {
    accounts: Arc<dyn SyncAccountRepository>,
    notifier: Arc<dyn SyncNotifier>,
    worker: Arc<AccountSyncWorker>,
}

impl SyncEngine {
    pub fn new(deps: SyncDependencies, config: &SyncConfig) -> Self {
        let worker = AccountSyncWorker::new(
            Arc::clone(&deps.accounts),
            deps.tokens,
            deps.providers,
            TimelineSink::new(deps.timeline),
            Arc::clone(&deps.notifier),
            config,
        );

        Self { accounts: deps.accounts, notifier: deps.notifier, worker: Arc::new(worker) }
    }

    pub fn worker(&self) -> &AccountSyncWorker {
        &self.worker
    }

    /// Sync every enabled account concurrently and collect the outcomes.
    ///
    /// One account failing (or its task panicking) never drops the others'
    /// results.
    ///
    /// # Errors
    /// Only when the enabled-account listing itself fails.
    #[instrument(skip(self))]
    pub async fn run_pass(&self) -> Result<PassReport> {
        let started_at = Utc::now();
        let accounts = self.accounts.list_enabled().await?;
        info!(accounts = accounts.len(), "starting sync pass");

        let mut tasks = Vec::with_capacity(accounts.len());
        for account in accounts {
            let worker = Arc::clone(&self.worker);
            let account_id = account.id.clone();
            let handle =
                tokio::spawn(async move { worker.sync_account(&account, started_at).await });
            tasks.push((account_id, handle));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for (account_id, handle) in tasks {
            match handle.await {
                Ok(result) => results.push(result),
                Err(join_err) => {
                    error!(account_id = %account_id, error = %join_err, "sync task aborted");
                    let message = format!("sync task failed: {join_err}");
                    results.push(SyncResult::failed(account_id, message));
                }
            }
        }

        let report = PassReport { started_at, finished_at: Utc::now(), results };
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            skipped = report.skipped(),
            events = report.events_processed(),
            "sync pass complete"
        );
        self.notifier.notify(SyncNotification::PassCompleted(report.clone()));

        Ok(report)
    }

    /// Sync one account now, outside the schedule, through the same worker.
    #[instrument(skip(self))]
    pub async fn trigger_manual_sync(&self, account_id: &str) -> SyncResult {
        let account = match self.accounts.find_by_id(account_id).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                let err = RealtySyncError::NotFound(format!("sync account {account_id}"));
                return SyncResult::failed(account_id, err.to_string());
            }
            Err(err) => return SyncResult::failed(account_id, err.to_string()),
        };

        if !account.sync_enabled {
            info!("manual sync requested for disabled account");
            return SyncResult::failed(account_id, "sync is disabled for this account");
        }

        self.worker.sync_account(&account, Utc::now()).await
    }
}
