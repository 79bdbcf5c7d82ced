//! CLI entry point for the `kit` binary.

pub mod api;
pub mod auth;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::auth::events::{ACCESS_TOKEN_OPTION, REFRESH_TOKEN_OPTION};
use crate::auth::{Credentials, FileOptionStore, OptionStore, StoreTokens};
use crate::client::KitClient;
use crate::config::KitConfig;
use crate::error::Result;

/// Kit API CLI
#[derive(Parser, Debug)]
#[command(name = "kit", version, about = "Kit (ConvertKit) API client CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// OAuth authorization and token management
    Auth(AuthArgs),
    /// Show the authenticated account
    Account,
    /// List broadcast posts
    Posts(PostsArgs),
    /// List products
    Products,
    /// Send a raw API request
    Request(RequestArgs),
    /// Show or clear the failure log
    Log(LogArgs),
}

#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Print the authorize URL, then exchange the pasted code
    Login(AuthorizeArgs),
    /// Print the authorize URL only
    Url(AuthorizeArgs),
    /// Exchange an authorization code for tokens
    Exchange(ExchangeArgs),
    /// Refresh the stored token pair
    Refresh,
    /// Show stored credentials
    Status,
    /// Forget stored tokens
    Logout,
}

#[derive(Parser, Debug)]
pub struct AuthorizeArgs {
    /// URL to return to after authorization, carried in `state`
    #[arg(long)]
    pub return_to: Option<String>,
    /// Tenant name to pre-select on the consent screen
    #[arg(long)]
    pub tenant: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ExchangeArgs {
    /// Authorization code from the redirect
    pub code: String,
}

#[derive(Parser, Debug)]
pub struct PostsArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = 10)]
    pub per_page: u32,
    /// Fetch every page
    #[arg(long)]
    pub all: bool,
}

#[derive(Parser, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, DELETE)
    pub method: String,
    /// Endpoint, e.g. `account` or `subscribers`
    pub endpoint: String,
    /// Parameters as a JSON object
    #[arg(long, default_value = "{}")]
    pub params: String,
    /// Do not retry after a rate limit
    #[arg(long)]
    pub no_retry: bool,
}

#[derive(Parser, Debug)]
pub struct LogArgs {
    /// Number of lines to show
    #[arg(short = 'n', long, default_value_t = 50)]
    pub lines: usize,
    /// Empty the log instead of printing it
    #[arg(long)]
    pub clear: bool,
}

/// Option store shared by the CLI commands (`~/.kit/options.toml`).
pub fn option_store() -> Arc<FileOptionStore> {
    Arc::new(FileOptionStore::new_default())
}

/// Client built from the environment, using tokens saved by earlier
/// `auth` commands when present. New tokens are written back to the store.
pub fn build_client(store: Arc<FileOptionStore>) -> Result<KitClient> {
    let mut config = KitConfig::from_env()?;
    if config.debug && config.log_dir.is_none() {
        config.log_dir = Some(KitConfig::default_data_dir());
    }

    let mut credentials = Credentials::from_env()?;
    if let Some(access) = store.get(ACCESS_TOKEN_OPTION)? {
        credentials = credentials.with_access_token(access);
    }
    if let Some(refresh) = store.get(REFRESH_TOKEN_OPTION)? {
        credentials = credentials.with_refresh_token(refresh);
    }

    Ok(KitClient::new(credentials)
        .with_config(config)
        .with_option_store(store.clone())
        .with_listener(Arc::new(StoreTokens::new(store))))
}
