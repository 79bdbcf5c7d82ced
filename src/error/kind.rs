//! Machine-readable failure classification.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Machine-checkable failure code carried by every [`KitError`](super::KitError).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    TransportError,
    ClientError,
    ServerError,
    ExpiredToken,
    RateLimitExceeded,
    RequestMethodUnsupported,
    ResponseTypeUnexpected,
    InvalidArgument,
    Configuration,
    Io,
    Serialization,
}
