//! Passwordless subscriber sign-in: e-mailed code, verification, profile.

use reqwest::Url;
use serde_json::{json, Value};
use tracing::debug;

use super::posts::params;
use crate::audit::{mask_email, mask_string};
use crate::client::KitClient;
use crate::error::messages;
use crate::error::{KitError, Result};
use crate::http::Params;

impl KitClient {
    /// E-mail a sign-in link and code to `email`. Returns the token to pass to
    /// [`subscriber_authentication_verify`](Self::subscriber_authentication_verify).
    pub async fn subscriber_authentication_send_code(
        &self,
        email: &str,
        redirect_url: &str,
    ) -> Result<String> {
        const OPERATION: &str = "subscriber_authentication_send_code";
        let email = email.trim();
        let redirect_url = redirect_url.trim();
        debug!(email = %mask_email(email), redirect_url, "subscriber_authentication_send_code");
        self.audit(&format!(
            "API: {OPERATION}(): [ email: {email}, redirect_url: {redirect_url} ]"
        ));

        let invalid = if email.is_empty() {
            Some(messages::SEND_CODE_EMAIL_EMPTY)
        } else if redirect_url.is_empty() {
            Some(messages::SEND_CODE_REDIRECT_URL_EMPTY)
        } else if Url::parse(redirect_url).map_or(true, |url| !url.has_host()) {
            Some(messages::SEND_CODE_REDIRECT_URL_INVALID)
        } else {
            None
        };
        if let Some(message) = invalid {
            return Err(self.reject(OPERATION, KitError::InvalidArgument(message.to_string())));
        }

        let response = self
            .post(
                "subscriber_authentication/send_code",
                params(json!({ "email_address": email, "redirect_url": redirect_url })),
            )
            .await?;
        string_field(&response, "token").ok_or_else(|| {
            self.reject(
                OPERATION,
                KitError::UnexpectedResponse(messages::SEND_CODE_TOKEN_MISSING.to_string()),
            )
        })
    }

    /// Exchange the token and e-mailed code for a signed subscriber ID.
    ///
    /// A rejected code (any 4xx) comes back as [`KitError::Client`] with its
    /// status and a message fit to show the subscriber. Transport failures,
    /// 5xx and rate limiting are returned unchanged so callers can still tell
    /// an outage from a wrong code. Every failure is written to the audit log
    /// with the server's own message.
    pub async fn subscriber_authentication_verify(
        &self,
        token: &str,
        subscriber_code: &str,
    ) -> Result<String> {
        const OPERATION: &str = "subscriber_authentication_verify";
        let token = token.trim();
        let subscriber_code = subscriber_code.trim();
        let masked_token = mask_string(token);
        let masked_code = mask_string(subscriber_code);
        debug!(token = %masked_token, subscriber_code = %masked_code, "subscriber_authentication_verify");
        self.audit(&format!(
            "API: {OPERATION}(): [ token: {masked_token}, subscriber_code: {masked_code} ]"
        ));

        let invalid = if token.is_empty() {
            Some(messages::VERIFY_TOKEN_EMPTY)
        } else if subscriber_code.is_empty() {
            Some(messages::VERIFY_SUBSCRIBER_CODE_EMPTY)
        } else {
            None
        };
        if let Some(message) = invalid {
            return Err(self.reject(OPERATION, KitError::InvalidArgument(message.to_string())));
        }

        let response = self
            .post(
                "subscriber_authentication/verify",
                params(json!({ "token": token, "subscriber_code": subscriber_code })),
            )
            .await
            .map_err(|error| match self.reject(OPERATION, error) {
                KitError::Client { status, .. } => {
                    KitError::client(status, messages::VERIFY_RESPONSE_ERROR)
                }
                other => other,
            })?;
        string_field(&response, "subscriber_id").ok_or_else(|| {
            self.reject(
                OPERATION,
                KitError::UnexpectedResponse(messages::VERIFY_RESPONSE_ERROR.to_string()),
            )
        })
    }

    /// Subscriber ID and purchased products for a signed subscriber ID.
    pub async fn profile(&self, signed_subscriber_id: &str) -> Result<Value> {
        let signed_subscriber_id = signed_subscriber_id.trim();
        let masked = mask_string(signed_subscriber_id);
        debug!(signed_subscriber_id = %masked, "profile");
        self.audit(&format!("API: profile(): [ signed_subscriber_id: {masked} ]"));
        if signed_subscriber_id.is_empty() {
            return Err(self.reject(
                "profile",
                KitError::InvalidArgument(messages::PROFILE_SIGNED_SUBSCRIBER_ID_EMPTY.to_string()),
            ));
        }

        let response = self
            .get(&format!("profile/{signed_subscriber_id}"), Params::new())
            .await?;
        if let Some(message) = response.get("message").and_then(Value::as_str) {
            return Err(self.reject("profile", KitError::UnexpectedResponse(message.to_string())));
        }
        Ok(response)
    }
}

fn string_field(response: &Value, key: &str) -> Option<String> {
    match response.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
