// ABOUTME: Endpoint-discovery error types.
// ABOUTME: Covers URL, transport, and endpoint-header parse failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported URL scheme {0:?}: only http is supported")]
    UnsupportedScheme(String),

    #[error("failed to reach {addr}: {source}")]
    Unreachable {
        addr: String,
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("failed to build HTTP request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("malformed SSH endpoint {value:?}: {reason}")]
    MalformedEndpoint { value: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
