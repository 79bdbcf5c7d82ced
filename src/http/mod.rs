//! Request building, transport and response classification.

pub mod builder;
pub mod classify;
pub mod method;
pub mod transport;

pub use builder::{endpoint_url, Namespace, Params, UserAgent};
pub use classify::{classify, Classified};
pub use method::Method;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
