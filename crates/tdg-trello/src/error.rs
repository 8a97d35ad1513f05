//! Error types for Trello API operations.

use thiserror::Error;

/// The error type for Trello API operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{method} {path} failed with status {status}: {body}")]
    Status {
        /// HTTP method of the failed request.
        method: &'static str,
        /// Request path relative to the API base URL.
        path: String,
        /// Status code returned by the API.
        status: u16,
        /// Response body, usually a short plain-text reason.
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured base URL cannot be used to build request URLs.
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// API key or token is missing.
    #[error("Missing Trello credentials: set TRELLO_API_KEY and TRELLO_TOKEN")]
    MissingCredentials,

    /// A referenced remote entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind (`card`, `checklist`, ...).
        kind: &'static str,
        /// Remote id that was looked up.
        id: String,
    },

    /// Failure injected by a test double.
    #[error("Injected failure: {0}")]
    Injected(String),
}

/// A specialized Result type for Trello API operations.
pub type Result<T> = std::result::Result<T, Error>;
