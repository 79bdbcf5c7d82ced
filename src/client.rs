//! The API client: request pipeline, token refresh and rate-limit retry.

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::audit::{mask_email, mask_endpoint, mask_params, AuditLog};
use crate::auth::events::{TokenEvent, TokenEventKind, TokenListener};
use crate::auth::oauth::{build_authorize_url, AuthorizeOptions};
use crate::auth::pkce::{code_challenge, PkceVerifier};
use crate::auth::store::{MemoryOptionStore, OptionStore};
use crate::auth::{Credentials, TokenResponse};
use crate::config::KitConfig;
use crate::error::{KitError, Result};
use crate::http::builder::{append_query, endpoint_url, request_headers, Params, UserAgent};
use crate::http::classify::{classify, Classified};
use crate::http::method::Method;
use crate::http::transport::{HttpRequest, ReqwestTransport, Transport};

const TOKEN_ENDPOINT: &str = "token";

/// Everything needed to send one logical API call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub endpoint: String,
    pub method: Method,
    pub params: Params,
    /// Retry once after a pause when the first attempt is rate limited.
    pub retry_if_rate_limited: bool,
    /// Send the bearer token and refresh it once if it has expired.
    pub authenticate: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            params: Params::new(),
            retry_if_rate_limited: true,
            authenticate: true,
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn without_rate_limit_retry(mut self) -> Self {
        self.retry_if_rate_limited = false;
        self
    }

    pub fn without_auth(mut self) -> Self {
        self.authenticate = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Initial,
    Retry,
}

/// Client for the Kit API.
///
/// Each call makes at most two round-trips plus one token refresh. Token
/// pairs obtained by exchange or refresh are kept in memory and handed to
/// the registered [`TokenListener`]s; the client never persists them.
///
/// # Example
/// ```no_run
/// use kit_api::auth::Credentials;
/// use kit_api::client::KitClient;
///
/// # async fn example() -> kit_api::error::Result<()> {
/// let credentials = Credentials::new("client-id", "https://example.com/callback")
///     .with_tokens("access", "refresh");
/// let client = KitClient::new(credentials);
/// let account = client.get("account", Default::default()).await?;
/// println!("{account}");
/// # Ok(())
/// # }
/// ```
pub struct KitClient {
    config: KitConfig,
    user_agent: String,
    credentials: RwLock<Arc<Credentials>>,
    transport: Arc<dyn Transport>,
    pkce: PkceVerifier,
    listeners: Vec<Arc<dyn TokenListener>>,
    audit_log: Option<AuditLog>,
}

impl KitClient {
    pub fn new(credentials: Credentials) -> Self {
        let config = KitConfig::default();
        Self {
            user_agent: UserAgent::from_config(&config).to_string(),
            config,
            credentials: RwLock::new(Arc::new(credentials)),
            transport: Arc::new(ReqwestTransport::new()),
            pkce: PkceVerifier::new(Arc::new(MemoryOptionStore::new())),
            listeners: Vec::new(),
            audit_log: None,
        }
    }

    /// Replace the configuration. Opens the audit log when `debug` is set
    /// and a log directory is configured.
    pub fn with_config(mut self, config: KitConfig) -> Self {
        self.audit_log = match (config.debug, config.log_dir.as_ref()) {
            (true, Some(dir)) => match AuditLog::new(dir) {
                Ok(log) => Some(log),
                Err(error) => {
                    warn!(dir = %dir.display(), %error, "audit log disabled");
                    None
                }
            },
            _ => None,
        };
        self.user_agent = UserAgent::from_config(&config).to_string();
        self.config = config;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Store for the PKCE verifier. Must outlive the OAuth redirect, so
    /// multi-process hosts want a [`FileOptionStore`](crate::auth::FileOptionStore).
    pub fn with_option_store(mut self, store: Arc<dyn OptionStore>) -> Self {
        self.pkce = PkceVerifier::new(store);
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn TokenListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn config(&self) -> &KitConfig {
        &self.config
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn audit_log(&self) -> Option<&AuditLog> {
        self.audit_log.as_ref()
    }

    /// Snapshot of the current credentials.
    pub fn credentials(&self) -> Arc<Credentials> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Send a request, retrying once after a rate limit.
    ///
    /// `method` is matched case-insensitively against GET, POST, PUT and
    /// DELETE; anything else fails before any network traffic.
    pub async fn request(&self, endpoint: &str, method: &str, params: Params) -> Result<Value> {
        self.request_with_options(endpoint, method, params, true).await
    }

    pub async fn request_with_options(
        &self,
        endpoint: &str,
        method: &str,
        params: Params,
        retry_if_rate_limited: bool,
    ) -> Result<Value> {
        let method = match method.parse::<Method>() {
            Ok(method) => method,
            Err(_) => {
                let error = KitError::UnsupportedMethod(method.to_string());
                self.log_failure(&error);
                return Err(error);
            }
        };
        let mut descriptor = RequestDescriptor::new(method, endpoint).with_params(params);
        descriptor.retry_if_rate_limited = retry_if_rate_limited;
        self.execute(descriptor).await
    }

    pub async fn get(&self, endpoint: &str, params: Params) -> Result<Value> {
        self.execute(RequestDescriptor::new(Method::Get, endpoint).with_params(params))
            .await
    }

    pub async fn post(&self, endpoint: &str, params: Params) -> Result<Value> {
        self.execute(RequestDescriptor::new(Method::Post, endpoint).with_params(params))
            .await
    }

    pub async fn put(&self, endpoint: &str, params: Params) -> Result<Value> {
        self.execute(RequestDescriptor::new(Method::Put, endpoint).with_params(params))
            .await
    }

    pub async fn delete(&self, endpoint: &str, params: Params) -> Result<Value> {
        self.execute(RequestDescriptor::new(Method::Delete, endpoint).with_params(params))
            .await
    }

    /// Run a descriptor through the retry loop. Failures are written to the
    /// audit log when one is open.
    pub async fn execute(&self, descriptor: RequestDescriptor) -> Result<Value> {
        if self.audit_log.is_some() {
            self.audit(&request_line(&descriptor));
        }
        let result = self.run(&descriptor).await;
        if let Err(error) = &result {
            self.log_failure(error);
        }
        result
    }

    async fn run(&self, descriptor: &RequestDescriptor) -> Result<Value> {
        let mut attempt = Attempt::Initial;
        loop {
            let outcome = self.send_once(descriptor, attempt).await?;
            attempt = match (outcome, attempt) {
                (Classified::Success(value), _) => return Ok(value),
                (Classified::ExpiredToken(_), Attempt::Initial) if descriptor.authenticate => {
                    warn!(endpoint = %descriptor.endpoint, "access token expired, refreshing");
                    self.refresh_once().await?;
                    Attempt::Retry
                }
                (Classified::RateLimited, Attempt::Initial) if descriptor.retry_if_rate_limited => {
                    warn!(
                        endpoint = %descriptor.endpoint,
                        delay_ms = self.config.rate_limit_delay.as_millis() as u64,
                        "rate limited, retrying once"
                    );
                    tokio::time::sleep(self.config.rate_limit_delay).await;
                    Attempt::Retry
                }
                (outcome, _) => return outcome.into_result(),
            };
        }
    }

    async fn send_once(&self, descriptor: &RequestDescriptor, attempt: Attempt) -> Result<Classified> {
        let credentials = self.credentials();
        let mut url = endpoint_url(&self.config.api_base_url, &descriptor.endpoint);
        let body = if descriptor.method.uses_query() {
            url = append_query(&url, &descriptor.params);
            None
        } else {
            Some(serde_json::to_string(&descriptor.params)?)
        };
        let bearer = descriptor
            .authenticate
            .then(|| credentials.access_token().unwrap_or_default());

        debug!(method = %descriptor.method, %url, ?attempt, "sending request");
        let response = self
            .transport
            .send(HttpRequest {
                method: descriptor.method,
                url,
                headers: request_headers(bearer, &self.user_agent)?,
                body,
                timeout: self.config.timeout,
            })
            .await?;
        debug!(status = response.status, ?attempt, "received response");

        Ok(classify(response.status, &response.body))
    }

    /// Authorize URL for the PKCE flow. The verifier is created on first use
    /// and reused until [`get_access_token`](Self::get_access_token) runs.
    pub fn oauth_url(&self, options: &AuthorizeOptions) -> Result<String> {
        let verifier = self.pkce.get_or_create()?;
        let credentials = self.credentials();
        build_authorize_url(
            &self.config.authorize_url,
            credentials.client_id(),
            credentials.redirect_uri(),
            &code_challenge(&verifier),
            options,
        )
    }

    /// Stored PKCE verifier, if an authorize URL was issued and not yet used.
    pub fn code_verifier(&self) -> Result<Option<String>> {
        self.pkce.get()
    }

    /// Exchange an authorization code for a token pair.
    ///
    /// The stored verifier is deleted whatever the outcome.
    pub async fn get_access_token(&self, code: &str) -> Result<TokenResponse> {
        let verifier = self.pkce.get()?.unwrap_or_default();
        let credentials = self.credentials();
        let params = token_params(json!({
            "client_id": credentials.client_id(),
            "grant_type": "authorization_code",
            "code": code,
            "redirect_uri": credentials.redirect_uri(),
            "code_verifier": verifier,
        }));

        let result = self.execute(token_request(params)).await;
        if let Err(error) = self.pkce.delete() {
            warn!(%error, "failed to delete PKCE code verifier");
        }
        self.accept_tokens(result?, TokenEventKind::Exchanged)
    }

    /// Trade the refresh token for a new token pair.
    pub async fn refresh_token(&self) -> Result<TokenResponse> {
        let value = self.execute(token_request(self.refresh_params())).await?;
        self.accept_tokens(value, TokenEventKind::Refreshed)
    }

    // Single attempt used inside the retry loop; never nests another retry.
    async fn refresh_once(&self) -> Result<TokenResponse> {
        let value = self
            .send_once(&token_request(self.refresh_params()), Attempt::Initial)
            .await?
            .into_result()?;
        self.accept_tokens(value, TokenEventKind::Refreshed)
    }

    fn refresh_params(&self) -> Params {
        let credentials = self.credentials();
        token_params(json!({
            "client_id": credentials.client_id(),
            "grant_type": "refresh_token",
            "refresh_token": credentials.refresh_token().unwrap_or_default(),
        }))
    }

    fn accept_tokens(&self, value: Value, kind: TokenEventKind) -> Result<TokenResponse> {
        let tokens = match TokenResponse::from_value(value) {
            Ok(tokens) => tokens,
            Err(error) => {
                self.log_failure(&error);
                return Err(error);
            }
        };

        let client_id = {
            let mut guard = self
                .credentials
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let updated = guard.with_tokens(tokens.access_token.clone(), tokens.refresh_token.clone());
            *guard = Arc::new(updated);
            guard.client_id().to_string()
        };
        debug!(%kind, expires_in = ?tokens.expires_in, "stored new token pair");

        let event = TokenEvent {
            kind,
            tokens: tokens.clone(),
            client_id,
        };
        for listener in &self.listeners {
            listener.on_token(&event);
        }
        Ok(tokens)
    }

    fn log_failure(&self, error: &KitError) {
        let message = mask_email(&error.to_string());
        debug!(kind = %error.kind(), status = ?error.status(), error = %message, "request failed");
        self.audit(&format!("API: Error: {message}"));
    }

    /// Record a failure raised by a resource method and hand it back.
    pub(crate) fn reject(&self, operation: &str, error: KitError) -> KitError {
        let message = mask_email(&error.to_string());
        debug!(operation, kind = %error.kind(), error = %message, "operation failed");
        self.audit(&format!("API: {operation}(): Error: {message}"));
        error
    }

    /// Append an entry to the audit log, if one is open.
    pub(crate) fn audit(&self, entry: &str) {
        if let Some(log) = &self.audit_log {
            if let Err(write_error) = log.add(entry) {
                warn!(error = %write_error, "failed to write audit log");
            }
        }
    }
}

// `API: POST subscribers: {...}` with secrets masked.
fn request_line(descriptor: &RequestDescriptor) -> String {
    let endpoint = mask_endpoint(&descriptor.endpoint);
    if descriptor.params.is_empty() {
        format!("API: {} {endpoint}", descriptor.method)
    } else {
        format!(
            "API: {} {endpoint}: {}",
            descriptor.method,
            mask_params(&descriptor.params)
        )
    }
}

fn token_request(params: Params) -> RequestDescriptor {
    RequestDescriptor::new(Method::Post, TOKEN_ENDPOINT)
        .with_params(params)
        .without_auth()
}

fn token_params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}
