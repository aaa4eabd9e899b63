//! Command-line interface definition

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use realtysync_domain::ProviderKind;

#[derive(Debug, Parser)]
#[command(name = "realtysync", about = "Sync agent calendars into the timeline", version)]
pub struct Cli {
    /// Config file (TOML or JSON). Without it, env vars then probed files.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "REALTYSYNC_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run scheduled sync passes until Ctrl-C
    Run,
    /// Sync one account now and print the result as JSON
    Sync {
        account_id: String,
    },
    /// Manage sync accounts
    #[command(subcommand)]
    Account(AccountCommand),
    /// Manage stored access tokens
    #[command(subcommand)]
    Token(TokenCommand),
}

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Register (or update) an account
    Add {
        account_id: String,
        #[arg(long)]
        user: String,
        #[arg(long, value_parser = parse_provider)]
        provider: ProviderKind,
    },
    /// Stop syncing an account
    Disable { account_id: String },
    /// Resume syncing an account
    Enable { account_id: String },
}

#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Store the provider access token for an account in the keychain
    Set {
        account_id: String,
        #[arg(long, env = "REALTYSYNC_ACCESS_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Remove the stored token for an account
    Delete { account_id: String },
}

fn parse_provider(raw: &str) -> Result<ProviderKind, String> {
    raw.parse().map_err(|e: realtysync_domain::RealtySyncError| e.to_string())
}
