//! Convenience re-exports for common use.

pub use crate::auth::{
    AuthorizeOptions, Credentials, FileOptionStore, MemoryOptionStore, OptionStore, StoreTokens,
    TokenEvent, TokenEventKind, TokenListener, TokenResponse,
};
pub use crate::client::{KitClient, RequestDescriptor};
pub use crate::config::KitConfig;
pub use crate::error::{FailureKind, KitError, Result};
pub use crate::http::{Method, Params, Transport};
pub use crate::resources::{Pagination, PostsPage, WebhookEvent};
