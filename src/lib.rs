//! Async client for the Kit (formerly ConvertKit) API.
//!
//! Every call goes through [`KitClient::request`](client::KitClient::request),
//! which builds the URL and headers, sends the request, classifies the
//! response and retries at most once: after refreshing an expired access
//! token, or after pausing on a rate limit. OAuth authorization uses PKCE.
//!
//! # Quick Start
//!
//! ```no_run
//! use kit_api::prelude::*;
//!
//! # async fn example() -> kit_api::error::Result<()> {
//! let credentials = Credentials::from_env()?;
//! let client = KitClient::new(credentials).with_config(KitConfig::from_env()?);
//!
//! // Send the user here, then exchange the returned code.
//! println!("{}", client.oauth_url(&AuthorizeOptions::default())?);
//! client.get_access_token("code-from-redirect").await?;
//!
//! let account = client.get_account().await?;
//! println!("{account}");
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod prelude;
pub mod resources;

#[cfg(feature = "cli")]
pub mod cli;
