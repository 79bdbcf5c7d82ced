//! Token notifications for host-side persistence.

use std::sync::Arc;

use strum::Display;

use super::store::OptionStore;
use super::token::TokenResponse;

/// How a new token pair was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TokenEventKind {
    /// Authorization code exchanged for the first token pair.
    Exchanged,
    /// Refresh token traded for a new pair.
    Refreshed,
}

/// Emitted synchronously after a successful exchange or refresh.
#[derive(Debug, Clone)]
pub struct TokenEvent {
    pub kind: TokenEventKind,
    pub tokens: TokenResponse,
    pub client_id: String,
}

/// Receives new token pairs. The client never persists tokens itself.
///
/// Any `Fn(&TokenEvent) + Send + Sync` closure is a listener.
pub trait TokenListener: Send + Sync {
    fn on_token(&self, event: &TokenEvent);
}

impl<F> TokenListener for F
where
    F: Fn(&TokenEvent) + Send + Sync,
{
    fn on_token(&self, event: &TokenEvent) {
        self(event)
    }
}

pub const ACCESS_TOKEN_OPTION: &str = "access_token";
pub const REFRESH_TOKEN_OPTION: &str = "refresh_token";
pub const TOKEN_EXPIRES_OPTION: &str = "token_expires";

/// Listener that writes every new token pair into an [`OptionStore`].
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use kit_api::auth::{MemoryOptionStore, StoreTokens};
///
/// let store = Arc::new(MemoryOptionStore::new());
/// let listener = StoreTokens::new(store.clone());
/// ```
#[derive(Clone)]
pub struct StoreTokens {
    store: Arc<dyn OptionStore>,
}

impl StoreTokens {
    pub fn new(store: Arc<dyn OptionStore>) -> Self {
        Self { store }
    }
}

impl TokenListener for StoreTokens {
    fn on_token(&self, event: &TokenEvent) {
        let mut writes = vec![
            (ACCESS_TOKEN_OPTION, event.tokens.access_token.clone()),
            (REFRESH_TOKEN_OPTION, event.tokens.refresh_token.clone()),
        ];
        if let Some(expires_at) = event.tokens.expires_at() {
            writes.push((TOKEN_EXPIRES_OPTION, expires_at.timestamp().to_string()));
        }
        for (key, value) in writes {
            if let Err(error) = self.store.set(key, &value) {
                tracing::warn!(key, %error, kind = %event.kind, "failed to persist token");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryOptionStore;
    use std::sync::Mutex;

    fn event(kind: TokenEventKind) -> TokenEvent {
        TokenEvent {
            kind,
            tokens: TokenResponse {
                access_token: "access".to_string(),
                refresh_token: "refresh".to_string(),
                token_type: Some("bearer".to_string()),
                created_at: Some(1_700_000_000),
                expires_in: Some(3600),
                scope: Some("public".to_string()),
            },
            client_id: "client".to_string(),
        }
    }

    #[test]
    fn closures_are_listeners() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let listener = move |e: &TokenEvent| sink.lock().unwrap().push(e.kind);
        listener.on_token(&event(TokenEventKind::Refreshed));
        assert_eq!(*seen.lock().unwrap(), vec![TokenEventKind::Refreshed]);
    }

    #[test]
    fn store_tokens_writes_pair_and_expiry() {
        let store = Arc::new(MemoryOptionStore::new());
        StoreTokens::new(store.clone()).on_token(&event(TokenEventKind::Exchanged));

        assert_eq!(store.get(ACCESS_TOKEN_OPTION).unwrap().as_deref(), Some("access"));
        assert_eq!(store.get(REFRESH_TOKEN_OPTION).unwrap().as_deref(), Some("refresh"));
        assert_eq!(
            store.get(TOKEN_EXPIRES_OPTION).unwrap().as_deref(),
            Some("1700003600")
        );
    }

    #[test]
    fn kind_displays_snake_case() {
        assert_eq!(TokenEventKind::Exchanged.to_string(), "exchanged");
    }
}
