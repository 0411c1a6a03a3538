//! Client core for the course platform API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). `CourseApi` adds a
//! `Transport` and a tag-invalidated `QueryCache` on top for callers that
//! want the whole query path in one place.
//!
//! # Design
//! - `CourseClient` is stateless; it holds only `base_url`.
//! - Responses may or may not be wrapped in `{ "data": ... }`; `Envelope`
//!   hides the difference.
//! - Every failure surfaces as `QueryError`, a single serializable shape.
//! - Cache invalidation is explicit: the cache is owned by `CourseApi` and
//!   `invalidate_tags` is the only way entries go stale.
//! - The dashboard's route matching, session gate and image allowlist live
//!   here too so every front-end shares one implementation.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod images;
pub mod layout;
pub mod route;
pub mod transport;
pub mod types;

pub use api::{CachedQuery, CourseApi};
pub use cache::{CacheTag, QueryCache, QueryKey, COURSES_TAG};
pub use client::CourseClient;
pub use config::ClientConfig;
pub use envelope::Envelope;
pub use error::{ApiError, ConfigError, ErrorStatus, QueryError, QueryResult};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use images::{ImageAllowlist, RemotePattern};
pub use layout::{DashboardView, Session, Sidebar, User};
pub use route::CourseRoute;
pub use transport::{Transport, TransportError};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{Course, CourseFilter};
