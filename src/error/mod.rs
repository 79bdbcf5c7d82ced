//! Error types for the Kit client.

pub mod kind;
pub mod messages;

pub use kind::FailureKind;

use thiserror::Error;

/// Every failure the client can return.
///
/// All failures come back as values; nothing in the request pipeline panics.
/// 4xx/5xx variants keep the HTTP status so callers can inspect it.
#[derive(Error, Debug)]
pub enum KitError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{message}")]
    Client { status: u16, message: String },

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{message}")]
    ExpiredToken { message: String },

    #[error("{}", messages::RATE_LIMIT_EXCEEDED)]
    RateLimited,

    #[error("{}", messages::request_method_unsupported(.0))]
    UnsupportedMethod(String),

    #[error("{0}")]
    UnexpectedResponse(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for KitError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for KitError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for KitError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for KitError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl KitError {
    /// Create a 4xx error.
    pub fn client(status: u16, message: impl Into<String>) -> Self {
        Self::Client {
            status,
            message: message.into(),
        }
    }

    /// Create a 5xx error with the fixed message for its status.
    pub fn server(status: u16) -> Self {
        Self::Server {
            status,
            message: messages::server_error_message(status).to_string(),
        }
    }

    /// Create an error for a response body that did not have the expected shape.
    pub fn unexpected_response() -> Self {
        Self::UnexpectedResponse(messages::RESPONSE_TYPE_UNEXPECTED.to_string())
    }

    /// Machine-readable kind of this failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::TransportError,
            Self::Client { .. } => FailureKind::ClientError,
            Self::Server { .. } => FailureKind::ServerError,
            Self::ExpiredToken { .. } => FailureKind::ExpiredToken,
            Self::RateLimited => FailureKind::RateLimitExceeded,
            Self::UnsupportedMethod(_) => FailureKind::RequestMethodUnsupported,
            Self::UnexpectedResponse(_) => FailureKind::ResponseTypeUnexpected,
            Self::InvalidArgument(_) => FailureKind::InvalidArgument,
            Self::Configuration(_) => FailureKind::Configuration,
            Self::Io(_) => FailureKind::Io,
            Self::Serialization(_) => FailureKind::Serialization,
        }
    }

    /// HTTP status of the response that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::ExpiredToken { .. } => Some(401),
            Self::RateLimited => Some(429),
            _ => None,
        }
    }

    /// Whether a later attempt at the same call could succeed unchanged.
    ///
    /// The client itself never retries on this basis; it is for callers that
    /// schedule their own retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::TransportError | FailureKind::ServerError | FailureKind::RateLimitExceeded
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, KitError>;
