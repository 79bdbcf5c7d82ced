//! Authorize-URL construction for the authorization-code + PKCE flow.

use serde::Serialize;

use super::pkce::base64_urlencode;
use crate::error::Result;

/// Optional parts of the authorize URL.
#[derive(Debug, Clone, Default)]
pub struct AuthorizeOptions {
    /// Where the host should send the user after the callback. Encoded into
    /// the `state` parameter together with the client ID.
    pub return_to: Option<String>,
    pub tenant_name: Option<String>,
}

#[derive(Serialize)]
struct OAuthState<'a> {
    return_to: &'a str,
    client_id: &'a str,
}

/// `state` value: base64url of `{"return_to": .., "client_id": ..}`.
pub fn encode_state(return_to: &str, client_id: &str) -> Result<String> {
    let json = serde_json::to_string(&OAuthState {
        return_to,
        client_id,
    })?;
    Ok(base64_urlencode(json))
}

/// Build the authorize URL with parameters in the order the server documents.
pub fn build_authorize_url(
    authorize_url: &str,
    client_id: &str,
    redirect_uri: &str,
    code_challenge: &str,
    options: &AuthorizeOptions,
) -> Result<String> {
    let mut params: Vec<(&str, String)> = vec![
        ("client_id", client_id.to_string()),
        ("response_type", "code".to_string()),
        ("redirect_uri", redirect_uri.to_string()),
        ("code_challenge", code_challenge.to_string()),
        ("code_challenge_method", "S256".to_string()),
    ];
    if let Some(return_to) = options.return_to.as_deref() {
        params.push(("state", encode_state(return_to, client_id)?));
    }
    if let Some(tenant_name) = options.tenant_name.as_deref() {
        params.push(("tenant_name", tenant_name.to_string()));
    }
    Ok(build_url_with_params(authorize_url, &params))
}

fn build_url_with_params(base: &str, params: &[(&str, String)]) -> String {
    let mut url = base.to_string();
    url.push(if base.contains('?') { '&' } else { '?' });
    for (i, (key, value)) in params.iter().enumerate() {
        if i > 0 {
            url.push('&');
        }
        url.push_str(&urlencoded(key));
        url.push('=');
        url.push_str(&urlencoded(value));
    }
    url
}

/// RFC 3986 percent-encoding of everything outside the unreserved set.
pub(crate) fn urlencoded(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            }
        }
    }
    out
}
