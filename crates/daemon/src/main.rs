//! RealtySync daemon
//!
//! # Usage
//!
//! ```bash
//! realtysync account add acct-1 --user agent-1 --provider google
//! realtysync token set acct-1 --token "$GOOGLE_ACCESS_TOKEN"
//! realtysync sync acct-1
//! realtysync run
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use realtysync_domain::{Config, SyncAccount, SyncNotification};
use realtysync_infra::config;
use realtysync_infra::observability::metrics::SyncMetrics;
use realtysync_infra::scheduling::{SyncScheduler, SyncSchedulerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod cli;

use app::App;
use cli::{AccountCommand, Cli, Command, TokenCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = load_config(&cli)?;
    let app = App::build(config)?;

    match cli.command {
        Command::Run => run(app).await,
        Command::Sync { account_id } => {
            let result = app.engine.trigger_manual_sync(&account_id).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.success() && !result.is_skipped() {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Account(command) => account(&app, command),
        Command::Token(command) => token(&app, command),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => config::load_from_file(Some(path.clone()))
            .with_context(|| format!("loading config from {}", path.display())),
        None => config::load().context("loading configuration"),
    }
}

async fn run(app: App) -> anyhow::Result<()> {
    if !app.config.sync.enabled {
        warn!("sync is disabled in configuration; nothing to run");
        return Ok(());
    }

    let mut notifications = app.notifier.subscribe();
    let listener = tokio::spawn(async move {
        while let Ok(notification) = notifications.recv().await {
            if let SyncNotification::AccountSynced { account_id, events_processed, .. } =
                notification
            {
                info!(%account_id, events_processed, "account synced");
            }
        }
    });

    let metrics = Arc::new(SyncMetrics::new());
    let mut scheduler = SyncScheduler::new(
        Arc::clone(&app.engine),
        SyncSchedulerConfig::from_sync_config(&app.config.sync),
        Arc::clone(&metrics),
    )?;
    scheduler.start().await?;

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    info!("shutdown requested");

    scheduler.stop().await?;
    listener.abort();

    let snapshot = metrics.snapshot();
    info!(
        passes = snapshot.passes,
        accounts_succeeded = snapshot.accounts_succeeded,
        accounts_failed = snapshot.accounts_failed,
        events_stored = snapshot.events_stored,
        "daemon stopped"
    );
    Ok(())
}

fn account(app: &App, command: AccountCommand) -> anyhow::Result<()> {
    match command {
        AccountCommand::Add { account_id, user, provider } => {
            let account = SyncAccount::new(&account_id, user, provider);
            app.accounts.upsert_account(&account)?;
            info!(%account_id, %provider, "account registered");
        }
        AccountCommand::Disable { account_id } => {
            app.accounts.set_sync_enabled(&account_id, false)?;
            info!(%account_id, "account disabled");
        }
        AccountCommand::Enable { account_id } => {
            app.accounts.set_sync_enabled(&account_id, true)?;
            info!(%account_id, "account enabled");
        }
    }
    Ok(())
}

fn token(app: &App, command: TokenCommand) -> anyhow::Result<()> {
    match command {
        TokenCommand::Set { account_id, token } => {
            app.tokens.store_token(&account_id, &token)?;
            info!(%account_id, "access token stored");
        }
        TokenCommand::Delete { account_id } => {
            app.tokens.delete_token(&account_id)?;
            info!(%account_id, "access token removed");
        }
    }
    Ok(())
}
