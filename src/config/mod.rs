//! Client configuration (layered: code > env > defaults).

use std::path::PathBuf;
use std::time::Duration;

use bon::Builder;

use crate::error::{KitError, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://api.kit.com/";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://app.kit.com/oauth/authorize";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(2);

/// Settings for a [`KitClient`](crate::client::KitClient).
///
/// Only the user-agent fields, `debug` and `log_dir` are cosmetic; the URLs,
/// timeout and rate-limit delay change request behavior.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use kit_api::config::KitConfig;
///
/// let config = KitConfig::builder()
///     .site_url("https://example.com/")
///     .context("sync-worker")
///     .timeout(Duration::from_secs(30))
///     .build();
/// assert_eq!(config.api_base_url, "https://api.kit.com/");
/// ```
#[derive(Debug, Clone, Builder)]
pub struct KitConfig {
    #[builder(default = DEFAULT_API_BASE_URL.to_string(), into)]
    pub api_base_url: String,
    #[builder(default = DEFAULT_AUTHORIZE_URL.to_string(), into)]
    pub authorize_url: String,
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,
    /// Pause before the single retry that follows a 429.
    #[builder(default = DEFAULT_RATE_LIMIT_DELAY)]
    pub rate_limit_delay: Duration,
    /// Name and version of the embedding runtime, first User-Agent segment.
    #[builder(default = default_host_agent(), into)]
    pub host_agent: String,
    #[builder(default = env!("CARGO_PKG_NAME").to_string(), into)]
    pub client_name: String,
    #[builder(default = env!("CARGO_PKG_VERSION").to_string(), into)]
    pub client_version: String,
    #[builder(default, into)]
    pub site_url: String,
    /// Free-text tag appended to the User-Agent as `context/{tag}`.
    #[builder(into)]
    pub context: Option<String>,
    /// Write failures to the audit log in `log_dir`.
    #[builder(default)]
    pub debug: bool,
    pub log_dir: Option<PathBuf>,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl KitConfig {
    /// Load from environment variables (`KIT_API_BASE_URL`, `KIT_TIMEOUT_SECS`, ...).
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("KIT_API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Some(url) = lookup("KIT_AUTHORIZE_URL") {
            config.authorize_url = url;
        }
        if let Some(raw) = lookup("KIT_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                KitError::Configuration(format!("KIT_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(site_url) = lookup("KIT_SITE_URL") {
            config.site_url = site_url;
        }
        if let Some(context) = lookup("KIT_CONTEXT").filter(|c| !c.trim().is_empty()) {
            config.context = Some(context);
        }
        if let Some(raw) = lookup("KIT_DEBUG") {
            config.debug = matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(dir) = lookup("KIT_LOG_DIR") {
            config.log_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// Default directory for file-backed stores and logs (`~/.kit`).
    pub fn default_data_dir() -> PathBuf {
        directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().join(".kit"))
            .unwrap_or_else(|| PathBuf::from(".kit"))
    }
}

fn default_host_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
