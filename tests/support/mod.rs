#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kit_api::auth::{Credentials, MemoryOptionStore, TokenEvent, TokenListener};
use kit_api::client::KitClient;
use kit_api::config::KitConfig;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const CLIENT_ID: &str = "client-123";
pub const REDIRECT_URI: &str = "https://example.com/oauth/callback";
pub const SITE_URL: &str = "https://example.com";
pub const HOST_AGENT: &str = "integration-tests/1.0";

/// Listener that keeps every event it receives.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<TokenEvent>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<TokenEvent> {
        self.events.lock().expect("listener lock poisoned").clone()
    }
}

impl TokenListener for RecordingListener {
    fn on_token(&self, event: &TokenEvent) {
        self.events
            .lock()
            .expect("listener lock poisoned")
            .push(event.clone());
    }
}

pub fn config(server: &MockServer) -> KitConfig {
    KitConfig::builder()
        .api_base_url(server.uri())
        .authorize_url(format!("{}/oauth/authorize", server.uri()))
        .rate_limit_delay(Duration::from_millis(20))
        .host_agent(HOST_AGENT)
        .site_url(SITE_URL)
        .build()
}

pub fn credentials(access_token: &str, refresh_token: &str) -> Credentials {
    Credentials::new(CLIENT_ID, REDIRECT_URI).with_tokens(access_token, refresh_token)
}

pub fn client(server: &MockServer, credentials: Credentials) -> KitClient {
    KitClient::new(credentials)
        .with_config(config(server))
        .with_option_store(Arc::new(MemoryOptionStore::new()))
}

/// Client with debug on and the audit log written under `log_dir`.
pub fn audited_client(server: &MockServer, credentials: Credentials, log_dir: &Path) -> KitClient {
    let mut config = config(server);
    config.debug = true;
    config.log_dir = Some(log_dir.to_path_buf());
    KitClient::new(credentials)
        .with_config(config)
        .with_option_store(Arc::new(MemoryOptionStore::new()))
}

pub fn audit_contents(client: &KitClient) -> String {
    client
        .audit_log()
        .expect("audit log enabled")
        .read(100)
        .expect("read audit log")
}

pub fn expected_user_agent() -> String {
    format!(
        "{HOST_AGENT};{}/{};{SITE_URL}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

pub fn expired_token_body() -> Value {
    json!({ "errors": ["The access token expired"] })
}

pub fn token_body(access_token: &str, refresh_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "token_type": "Bearer",
        "created_at": 1_700_000_000,
        "expires_in": 7200,
        "scope": "public"
    })
}
