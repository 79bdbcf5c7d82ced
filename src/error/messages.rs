//! Fixed, locally-owned error messages.
//!
//! The API supplies no usable detail for 5xx responses, so those messages come
//! from this table rather than the response body.

pub const RATE_LIMIT_EXCEEDED: &str = "ConvertKit API Error: Rate limit hit.";
pub const INTERNAL_SERVER_ERROR: &str = "ConvertKit API Error: Internal server error.";
pub const METHOD_NOT_IMPLEMENTED: &str = "ConvertKit API Error: Request method not supported.";
pub const BAD_GATEWAY: &str = "ConvertKit API Error: Bad gateway.";
pub const SERVICE_UNAVAILABLE: &str = "ConvertKit API Error: Service unavailable.";
pub const GATEWAY_TIMEOUT: &str = "ConvertKit API Error: Gateway timeout.";
pub const HTTP_VERSION_NOT_SUPPORTED: &str = "ConvertKit API Error: HTTP version not supported.";
pub const RESPONSE_TYPE_UNEXPECTED: &str =
    "ConvertKit API Error: The response is not of the expected type array.";

/// Message a 401 carries when the access token can be refreshed.
pub const ACCESS_TOKEN_EXPIRED: &str = "The access token expired";

// Argument and response-shape checks in the resource wrappers.
pub const ALL_POSTS_PER_REQUEST_TOO_LOW: &str =
    "get_all_posts(): the posts_per_request parameter must be equal to or greater than 1.";
pub const ALL_POSTS_PER_REQUEST_TOO_HIGH: &str =
    "get_all_posts(): the posts_per_request parameter must be equal to or less than 50.";
pub const POSTS_PAGE_TOO_LOW: &str =
    "get_posts(): the page parameter must be equal to or greater than 1.";
pub const POSTS_PER_PAGE_TOO_LOW: &str =
    "get_posts(): the per_page parameter must be equal to or greater than 1.";
pub const POSTS_PER_PAGE_TOO_HIGH: &str =
    "get_posts(): the per_page parameter must be equal to or less than 50.";
pub const SEND_CODE_EMAIL_EMPTY: &str =
    "subscriber_authentication_send_code(): the email parameter is empty.";
pub const SEND_CODE_REDIRECT_URL_EMPTY: &str =
    "subscriber_authentication_send_code(): the redirect_url parameter is empty.";
pub const SEND_CODE_REDIRECT_URL_INVALID: &str =
    "subscriber_authentication_send_code(): the redirect_url parameter is not a valid URL.";
pub const SEND_CODE_TOKEN_MISSING: &str =
    "subscriber_authentication_send_code(): the token parameter is missing from the API response.";
pub const VERIFY_TOKEN_EMPTY: &str = "subscriber_authentication_verify(): the token parameter is empty.";
pub const VERIFY_SUBSCRIBER_CODE_EMPTY: &str =
    "subscriber_authentication_verify(): the subscriber_code parameter is empty.";
pub const VERIFY_RESPONSE_ERROR: &str =
    "The entered code is invalid. Please try again, or click the link sent in the email.";
pub const PROFILE_SIGNED_SUBSCRIBER_ID_EMPTY: &str =
    "profiles(): the signed_subscriber_id parameter is empty.";

/// Message for a 5xx status. Unmapped codes fall back to the 500 message.
pub fn server_error_message(status: u16) -> &'static str {
    match status {
        501 => METHOD_NOT_IMPLEMENTED,
        502 => BAD_GATEWAY,
        503 => SERVICE_UNAVAILABLE,
        504 => GATEWAY_TIMEOUT,
        505 => HTTP_VERSION_NOT_SUPPORTED,
        _ => INTERNAL_SERVER_ERROR,
    }
}

/// Message for a method string the client does not know how to send.
pub fn request_method_unsupported(method: &str) -> String {
    format!("API request method {method} is not supported in the Kit API client.")
}
