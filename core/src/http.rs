//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `CourseClient` builds
//! `HttpRequest` values and parses `HttpResponse` values; whoever sits
//! between the two (a `Transport` implementation, a test, or a C host
//! through the FFI crate) performs the actual network round-trip.
//!
//! Query parameters are kept as unencoded pairs next to the URL so the host
//! can hand them to its own HTTP client. `HttpRequest::url` renders the fully
//! encoded form for hosts that want a single string.

use url::Url;

/// HTTP method for a request. The course API is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL without the query string.
    pub path: String,
    /// Unencoded query parameters, in order.
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub(crate) fn get(path: String) -> Self {
        Self {
            method: HttpMethod::Get,
            path,
            query: Vec::new(),
            headers: vec![("accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    /// Full URL with the query string percent-encoded.
    ///
    /// Falls back to the bare path when it does not parse as an absolute URL.
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        match Url::parse_with_params(&self.path, &self.query) {
            Ok(url) => url.into(),
            Err(_) => self.path.clone(),
        }
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
