use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{KitError, Result};

/// Payload returned by the token endpoint for both code exchange and refresh.
///
/// # Example
/// ```
/// use kit_api::auth::TokenResponse;
///
/// let token: TokenResponse = serde_json::from_value(serde_json::json!({
///     "access_token": "access",
///     "refresh_token": "refresh",
///     "token_type": "Bearer",
///     "created_at": 1700000000,
///     "expires_in": 7200,
///     "scope": "public",
/// }))
/// .unwrap();
/// assert_eq!(token.expires_at().unwrap().timestamp(), 1700007200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Parse a decoded token-endpoint body, rejecting bodies without both tokens.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|_| KitError::unexpected_response())
    }

    /// Absolute expiry, when the server reported both creation time and
    /// lifetime. `None` when either is missing or the sum is out of range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let created = DateTime::<Utc>::from_timestamp(self.created_at?, 0)?;
        created.checked_add_signed(TimeDelta::try_seconds(self.expires_in?)?)
    }
}
