//! Error types for the course API client.
//!
//! # Design
//! `ApiError` keeps the cause of a failure (transport, decoding, 404, other
//! status) for Rust callers. `QueryError` is the one shape handed to UI code
//! and across the FFI boundary:
//!
//! ```json
//! { "status": "FETCH_ERROR", "error": "connection refused" }
//! { "status": 503, "error": "maintenance" }
//! ```

use std::fmt;

use serde::ser::Serializer;
use serde::Serialize;
use thiserror::Error;

/// Message used when a transport failure carries no text of its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// Message used for a 404 whose body is empty.
const NOT_FOUND_MESSAGE: &str = "resource not found";

/// Errors produced while building, executing or parsing a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx response whose body did not decode into the expected type.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The server returned 404. `body` is the response body, possibly empty.
    #[error("resource not found")]
    NotFound { body: String },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Server { status: u16, body: String },
}

/// Errors raised while resolving client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

/// The `status` member of a `QueryError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    /// Serialized as the string `"FETCH_ERROR"`.
    FetchError,
    /// Serialized as the string `"PARSING_ERROR"`.
    ParsingError,
    /// Serialized as the bare status number.
    Http(u16),
}

impl ErrorStatus {
    pub fn http_status(self) -> Option<u16> {
        match self {
            ErrorStatus::Http(status) => Some(status),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorStatus::FetchError => f.write_str("FETCH_ERROR"),
            ErrorStatus::ParsingError => f.write_str("PARSING_ERROR"),
            ErrorStatus::Http(status) => write!(f, "{status}"),
        }
    }
}

impl Serialize for ErrorStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ErrorStatus::FetchError => serializer.serialize_str("FETCH_ERROR"),
            ErrorStatus::ParsingError => serializer.serialize_str("PARSING_ERROR"),
            ErrorStatus::Http(status) => serializer.serialize_u16(*status),
        }
    }
}

/// Uniform error value returned by every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{status}: {error}")]
pub struct QueryError {
    pub status: ErrorStatus,
    pub error: String,
}

impl QueryError {
    /// A transport failure. Missing or blank messages fall back to
    /// `DEFAULT_ERROR_MESSAGE`.
    pub fn fetch(message: Option<&str>) -> Self {
        let error = match message.map(str::trim) {
            Some(msg) if !msg.is_empty() => msg.to_string(),
            _ => DEFAULT_ERROR_MESSAGE.to_string(),
        };
        Self {
            status: ErrorStatus::FetchError,
            error,
        }
    }
}

impl From<ApiError> for QueryError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(msg) => QueryError::fetch(Some(&msg)),
            ApiError::Decode(msg) => QueryError {
                status: ErrorStatus::ParsingError,
                error: msg,
            },
            ApiError::NotFound { body } if body.trim().is_empty() => QueryError {
                status: ErrorStatus::Http(404),
                error: NOT_FOUND_MESSAGE.to_string(),
            },
            ApiError::NotFound { body } => QueryError {
                status: ErrorStatus::Http(404),
                error: body,
            },
            ApiError::Server { status, body } => QueryError {
                status: ErrorStatus::Http(status),
                error: body,
            },
        }
    }
}

/// Serializable outcome of a query: `{"data": ...}` or `{"error": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryResult<T> {
    Data(T),
    Error(QueryError),
}

impl<T> From<Result<T, QueryError>> for QueryResult<T> {
    fn from(result: Result<T, QueryError>) -> Self {
        match result {
            Ok(value) => QueryResult::Data(value),
            Err(err) => QueryResult::Error(err),
        }
    }
}
