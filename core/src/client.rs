//! Stateless HTTP request builder and response parser for the course API.
//!
//! # Design
//! `CourseClient` holds only a `base_url` and carries no mutable state between
//! calls. Each query is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the round-trip in between, which keeps this type free
//! of I/O and lets the FFI crate expose it unchanged.
//!
//! Response bodies go through `Envelope<T>`, so `{ "data": [...] }` and a bare
//! `[...]` parse to the same value.

use serde::de::DeserializeOwned;
use url::Url;

use crate::cache::{CacheTag, QueryKey, COURSES_TAG};
use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Course, CourseFilter};

pub const LIST_COURSES_ENDPOINT: &str = "getCourses";
pub const GET_COURSE_ENDPOINT: &str = "getCourse";

/// Synchronous, stateless client for the course API.
#[derive(Debug, Clone)]
pub struct CourseClient {
    base_url: String,
}

impl CourseClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.api_base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_courses(&self, filter: &CourseFilter) -> HttpRequest {
        let mut req = HttpRequest::get(format!("{}/courses", self.base_url));
        if let Some(category) = &filter.category {
            req.query.push(("category".to_string(), category.clone()));
        }
        req
    }

    pub fn build_get_course(&self, id: &str) -> HttpRequest {
        let collection = format!("{}/courses", self.base_url);
        HttpRequest::get(push_segment(&collection, id))
    }

    pub fn parse_list_courses(&self, response: HttpResponse) -> Result<Vec<Course>, ApiError> {
        decode(response)
    }

    pub fn parse_get_course(&self, response: HttpResponse) -> Result<Course, ApiError> {
        decode(response)
    }

    /// Cache key for a list query.
    pub fn list_courses_key(filter: &CourseFilter) -> QueryKey {
        QueryKey::new(LIST_COURSES_ENDPOINT, filter)
    }

    /// Cache key for a single-course query.
    pub fn get_course_key(id: &str) -> QueryKey {
        QueryKey::new(GET_COURSE_ENDPOINT, &id)
    }

    /// Tags provided by a successful list query.
    pub fn list_courses_tags() -> Vec<CacheTag> {
        vec![CacheTag::of_type(COURSES_TAG)]
    }

    /// Tags provided by a successful single-course query.
    pub fn get_course_tags(id: &str) -> Vec<CacheTag> {
        vec![CacheTag::with_id(COURSES_TAG, id)]
    }
}

/// Append `segment` to `path` as a single percent-encoded path segment.
fn push_segment(path: &str, segment: &str) -> String {
    let Ok(mut url) = Url::parse(path) else {
        return format!("{path}/{segment}");
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(segment);
    }
    url.into()
}

/// Reject non-2xx responses, then decode the (possibly enveloped) body.
fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str::<Envelope<T>>(&response.body)
        .map(Envelope::into_inner)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound {
            body: response.body.clone(),
        });
    }
    Err(ApiError::Server {
        status: response.status,
        body: response.body.clone(),
    })
}
