use strum::{Display, EnumString};

/// HTTP methods the API client knows how to send.
///
/// Parsing is ASCII case-insensitive, so `"get"` and `"GET"` both work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Whether parameters travel in the query string rather than a JSON body.
    pub fn uses_query(self) -> bool {
        matches!(self, Self::Get)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}
