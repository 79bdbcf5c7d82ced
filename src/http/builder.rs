//! URL, query string, header and User-Agent construction.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde_json::Value;
use strum::Display;

use crate::auth::oauth::urlencoded;
use crate::config::KitConfig;
use crate::error::{KitError, Result};

/// Request parameters: a JSON object sent as query string or body.
pub type Params = serde_json::Map<String, Value>;

/// Endpoints served under `/wordpress/`. Matched by substring.
pub const WORDPRESS_ENDPOINTS: &[&str] = &[
    "posts",
    "products",
    "profile",
    "recommendations_script",
    "subscriber_authentication/send_code",
    "subscriber_authentication/verify",
];

/// Endpoints served under `/oauth/`. Matched by substring.
pub const OAUTH_ENDPOINTS: &[&str] = &["token"];

/// Path prefix an endpoint is served under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Namespace {
    #[strum(serialize = "wordpress")]
    WordPress,
    #[strum(serialize = "oauth")]
    OAuth,
    #[strum(serialize = "v4")]
    Versioned,
}

impl Namespace {
    /// Pick the namespace for an endpoint. WordPress endpoints win over
    /// OAuth ones, so `"products/token"` is a WordPress endpoint.
    pub fn for_endpoint(endpoint: &str) -> Self {
        if WORDPRESS_ENDPOINTS.iter().any(|e| endpoint.contains(e)) {
            Self::WordPress
        } else if OAUTH_ENDPOINTS.iter().any(|e| endpoint.contains(e)) {
            Self::OAuth
        } else {
            Self::Versioned
        }
    }
}

/// Absolute URL for `endpoint` under `base_url`.
pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    let endpoint = endpoint.trim_start_matches('/');
    format!(
        "{}/{}/{endpoint}",
        base_url.trim_end_matches('/'),
        Namespace::for_endpoint(endpoint)
    )
}

/// Append `params` to `url` as a query string.
///
/// Scalars become `key=value`, arrays `key[]=value` per element and nested
/// objects `key[sub]=value`. Nulls are skipped; booleans render as `1`/`0`.
pub fn append_query(url: &str, params: &Params) -> String {
    let mut pairs = Vec::new();
    for (key, value) in params {
        flatten_query(key.clone(), value, &mut pairs);
    }
    if pairs.is_empty() {
        return url.to_string();
    }
    let query = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoded(k), urlencoded(v)))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}

fn flatten_query(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((key, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => out.push((key, n.to_string())),
        Value::String(s) => out.push((key, s.clone())),
        Value::Array(items) => {
            for item in items {
                flatten_query(format!("{key}[]"), item, out);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                flatten_query(format!("{key}[{sub}]"), item, out);
            }
        }
    }
}

/// Headers for one attempt. `bearer` is `None` when authentication is
/// suppressed; `Some("")` still sends an (empty) bearer credential.
///
/// A token or User-Agent that cannot be sent as a header value (control
/// characters such as a stray newline) is a [`KitError::Configuration`].
pub fn request_headers(bearer: Option<&str>, user_agent: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    if let Some(token) = bearer {
        let val = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            KitError::Configuration("access token is not a valid header value".to_string())
        })?;
        headers.insert(AUTHORIZATION, val);
    }
    let val = HeaderValue::from_str(user_agent).map_err(|_| {
        KitError::Configuration(format!("User-Agent {user_agent:?} is not a valid header value"))
    })?;
    headers.insert(USER_AGENT, val);
    Ok(headers)
}

/// User-Agent identifying the host, this client and the site it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgent {
    pub host_agent: String,
    pub client_name: String,
    pub client_version: String,
    pub site_url: String,
    pub context: Option<String>,
}

impl UserAgent {
    pub fn from_config(config: &KitConfig) -> Self {
        Self {
            host_agent: config.host_agent.clone(),
            client_name: config.client_name.clone(),
            client_version: config.client_version.clone(),
            site_url: config.site_url.clone(),
            context: config.context.clone(),
        }
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{}/{};{}",
            self.host_agent, self.client_name, self.client_version, self.site_url
        )?;
        if let Some(context) = &self.context {
            write!(f, ";context/{context}")?;
        }
        Ok(())
    }
}
