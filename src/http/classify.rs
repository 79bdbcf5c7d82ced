//! Maps a raw status and body onto the outcome the retry loop acts on.

use serde_json::Value;

use crate::error::messages::ACCESS_TOKEN_EXPIRED;
use crate::error::{KitError, Result};

/// Outcome of one round-trip.
#[derive(Debug)]
pub enum Classified {
    Success(Value),
    /// 401 whose message is exactly the expired-token message.
    ExpiredToken(String),
    RateLimited,
    Failure(KitError),
}

impl Classified {
    /// Terminal view of the outcome, for callers that never retry.
    pub fn into_result(self) -> Result<Value> {
        match self {
            Self::Success(value) => Ok(value),
            Self::ExpiredToken(message) => Err(KitError::ExpiredToken { message }),
            Self::RateLimited => Err(KitError::RateLimited),
            Self::Failure(error) => Err(error),
        }
    }
}

pub fn classify(status: u16, body: &str) -> Classified {
    if status >= 500 {
        return Classified::Failure(KitError::server(status));
    }
    if status >= 400 {
        let message = error_message(body);
        return match status {
            401 if message == ACCESS_TOKEN_EXPIRED => Classified::ExpiredToken(message),
            429 => Classified::RateLimited,
            _ => Classified::Failure(KitError::client(status, message)),
        };
    }
    if body.trim().is_empty() {
        return Classified::Success(Value::Null);
    }
    match serde_json::from_str(body) {
        Ok(value) => Classified::Success(value),
        Err(_) => Classified::Failure(KitError::unexpected_response()),
    }
}

/// `errors` joined by newlines, else `error_description`, else empty.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return String::new();
    };
    match value.get("errors") {
        Some(Value::Array(errors)) => {
            return errors
                .iter()
                .map(|e| match e {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n");
        }
        Some(Value::String(error)) => return error.clone(),
        _ => {}
    }
    value
        .get("error_description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
