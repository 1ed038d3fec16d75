//! HTTP client factory with consistent timeout configuration.
//!
//! Adapters receive their `reqwest::Client` from here rather than building
//! one themselves.

use reqwest::{Client, redirect};
use std::time::Duration;

/// Default connect timeout (TCP handshake + TLS).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request timeout (total request/response time).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build an HTTP client with default timeouts.
pub fn try_build_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()
}

/// Same timeouts, but 3xx responses are returned to the caller as-is.
///
/// The workspace sign-in answers with a redirect whose `Set-Cookie` headers
/// carry the session.
pub fn try_build_no_redirect_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .redirect(redirect::Policy::none())
        .build()
}
