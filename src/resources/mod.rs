//! Thin typed wrappers over [`KitClient::request`](crate::client::KitClient::request).

pub mod account;
pub mod pagination;
pub mod posts;
pub mod products;
pub mod subscriber_auth;
pub mod webhooks;

pub use pagination::Pagination;
pub use posts::PostsPage;
pub use webhooks::WebhookEvent;
