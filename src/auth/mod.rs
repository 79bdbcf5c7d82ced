//! Credentials, OAuth PKCE helpers, token payloads and option storage.

pub mod credentials;
pub mod events;
pub mod oauth;
pub mod pkce;
pub mod store;
pub mod token;

pub use credentials::Credentials;
pub use events::{StoreTokens, TokenEvent, TokenEventKind, TokenListener};
pub use oauth::AuthorizeOptions;
pub use pkce::{code_challenge, PkceVerifier};
pub use store::{FileOptionStore, MemoryOptionStore, OptionStore, OptionStoreConfig};
pub use token::TokenResponse;
