use std::fmt;

use crate::audit::mask_string;
use crate::error::{KitError, Result};

/// OAuth client identity plus the current token pair.
///
/// Values are immutable; a refresh produces a new `Credentials` through
/// [`with_tokens`](Self::with_tokens) which the client swaps in whole.
///
/// # Example
/// ```
/// use kit_api::auth::Credentials;
///
/// let creds = Credentials::new("client-id", "https://example.com/callback")
///     .with_tokens("access", "refresh");
/// assert_eq!(creds.access_token(), Some("access"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    redirect_uri: String,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            access_token: None,
            refresh_token: None,
        }
    }

    /// Returns a copy carrying the given token pair.
    pub fn with_tokens(&self, access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            client_id: self.client_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Load from `KIT_CLIENT_ID`, `KIT_REDIRECT_URI`, `KIT_ACCESS_TOKEN` and
    /// `KIT_REFRESH_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let client_id = lookup("KIT_CLIENT_ID")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| KitError::Configuration("KIT_CLIENT_ID not set".to_string()))?;
        let redirect_uri = lookup("KIT_REDIRECT_URI").unwrap_or_default();

        let mut credentials = Self::new(client_id, redirect_uri);
        credentials.access_token = lookup("KIT_ACCESS_TOKEN").filter(|v| !v.is_empty());
        credentials.refresh_token = lookup("KIT_REFRESH_TOKEN").filter(|v| !v.is_empty());
        Ok(credentials)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("access_token", &self.access_token.as_deref().map(mask_string))
            .field("refresh_token", &self.refresh_token.as_deref().map(mask_string))
            .finish()
    }
}
