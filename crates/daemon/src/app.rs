//! Wiring of infra adapters into the sync engine

use std::sync::Arc;

use anyhow::Context;
use realtysync_core::{SyncDependencies, SyncEngine};
use realtysync_domain::Config;
use realtysync_infra::database::{DbManager, SqliteSyncAccountRepository, SqliteTimelineRepository};
use realtysync_infra::{build_registry, BroadcastNotifier, KeyringTokenProvider};
use tracing::info;

/// Everything the subcommands need, built once from config.
pub struct App {
    pub config: Config,
    pub accounts: Arc<SqliteSyncAccountRepository>,
    pub tokens: KeyringTokenProvider,
    pub notifier: BroadcastNotifier,
    pub engine: Arc<SyncEngine>,
}

impl App {
    pub fn build(config: Config) -> anyhow::Result<Self> {
        config.validate().context("invalid configuration")?;

        let db = Arc::new(
            DbManager::from_config(&config.database)
                .with_context(|| format!("opening database at {}", config.database.path))?,
        );
        db.run_migrations().context("applying database schema")?;

        let accounts = Arc::new(SqliteSyncAccountRepository::new(Arc::clone(&db)));
        let timeline = Arc::new(SqliteTimelineRepository::new(Arc::clone(&db)));
        let tokens = KeyringTokenProvider::new();
        let notifier = BroadcastNotifier::default();
        let providers = build_registry(&config).context("building provider adapters")?;

        info!(
            db_path = %config.database.path,
            providers = ?providers.kinds(),
            "sync engine wired"
        );

        let deps = SyncDependencies {
            accounts: accounts.clone(),
            timeline,
            tokens: Arc::new(tokens.clone()),
            providers: Arc::new(providers),
            notifier: Arc::new(notifier.clone()),
        };
        let engine = Arc::new(SyncEngine::new(deps, &config.sync));

        Ok(Self { config, accounts, tokens, notifier, engine })
    }
}

#[cfg(test)]
mod tests {
    use realtysync_core::SyncAccountRepository;
    use realtysync_domain::{ProviderKind, SyncAccount};

    use super::*;

    #[tokio::test]
    async fn builds_against_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.database.path = dir.path().join("daemon.db").display().to_string();

        let app = App::build(config).unwrap();
        app.accounts
            .upsert_account(&SyncAccount::new("acct-1", "agent-1", ProviderKind::Google))
            .unwrap();

        let enabled = app.accounts.list_enabled().await.unwrap();
        assert_eq!(enabled.len(), 1);
    }

    #[test]
    fn invalid_config_is_rejected_before_opening_database() {
        let mut config = Config::default();
        config.sync.interval_seconds = 0;
        assert!(App::build(config).is_err());
    }
}
