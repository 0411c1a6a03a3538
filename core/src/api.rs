//! Cached course queries over a `Transport`.
//!
//! # Design
//! `CourseApi` owns a `CourseClient`, a `Transport` and a `QueryCache`. Each
//! query first consults the cache, and on a miss (or a stale entry) builds
//! the request, executes it, parses the response and stores the result under
//! the tags the query provides. Every failure leaves as a `QueryError`; only
//! successful results are cached, so a failed query is retried on next use.
//!
//! Writes are performed elsewhere. After one, the caller declares what it
//! touched with `invalidate_tags`, e.g. `[CacheTag::of_type("Courses")]`.

use tracing::{debug, info, warn};

use crate::cache::{CacheTag, QueryCache, QueryKey};
use crate::client::CourseClient;
use crate::error::{ApiError, QueryError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{Course, CourseFilter};

/// A cached query result.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedQuery {
    Courses(Vec<Course>),
    Course(Course),
}

pub struct CourseApi<T> {
    client: CourseClient,
    transport: T,
    cache: QueryCache<CachedQuery>,
}

impl<T: Transport> CourseApi<T> {
    pub fn new(client: CourseClient, transport: T) -> Self {
        Self {
            client,
            transport,
            cache: QueryCache::new(),
        }
    }

    pub fn client(&self) -> &CourseClient {
        &self.client
    }

    /// Like `new`, but the cache holds at most `capacity` queries.
    pub fn with_cache_capacity(client: CourseClient, transport: T, capacity: usize) -> Self {
        Self {
            client,
            transport,
            cache: QueryCache::with_capacity(capacity),
        }
    }

    pub fn cache(&self) -> &QueryCache<CachedQuery> {
        &self.cache
    }

    pub fn list_courses(&mut self, filter: &CourseFilter) -> Result<Vec<Course>, QueryError> {
        let key = CourseClient::list_courses_key(filter);
        if let Some(CachedQuery::Courses(courses)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(courses.clone());
        }

        let request = self.client.build_list_courses(filter);
        let response = self.execute(&key, &request)?;
        let courses = self
            .client
            .parse_list_courses(response)
            .map_err(|e| rejected(&key, e))?;

        self.store(
            key,
            CachedQuery::Courses(courses.clone()),
            CourseClient::list_courses_tags(),
        );
        Ok(courses)
    }

    pub fn get_course(&mut self, id: &str) -> Result<Course, QueryError> {
        let key = CourseClient::get_course_key(id);
        if let Some(CachedQuery::Course(course)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(course.clone());
        }

        let request = self.client.build_get_course(id);
        let response = self.execute(&key, &request)?;
        let course = self
            .client
            .parse_get_course(response)
            .map_err(|e| rejected(&key, e))?;

        self.store(
            key,
            CachedQuery::Course(course.clone()),
            CourseClient::get_course_tags(id),
        );
        Ok(course)
    }

    fn store(&mut self, key: QueryKey, value: CachedQuery, tags: Vec<CacheTag>) {
        if let Some(evicted) = self.cache.insert(key, value, tags) {
            debug!(%evicted, "evicted cached query");
        }
    }

    /// Mark every cached query providing one of `tags` stale.
    pub fn invalidate_tags(&mut self, tags: &[CacheTag]) -> Vec<QueryKey> {
        let keys = self.cache.invalidate(tags);
        let tags: Vec<String> = tags.iter().map(ToString::to_string).collect();
        info!(?tags, invalidated = keys.len(), "invalidated cached queries");
        keys
    }

    fn execute(&self, key: &QueryKey, request: &HttpRequest) -> Result<HttpResponse, QueryError> {
        debug!(%key, url = %request.url(), method = request.method.as_str(), "cache miss, fetching");
        self.transport.execute(request).map_err(|e| {
            warn!(%key, error = %e, "transport failure");
            QueryError::fetch(e.message.as_deref())
        })
    }
}

#[cfg(feature = "ureq")]
impl CourseApi<crate::transport::UreqTransport> {
    /// Build an API handle with the blocking `ureq` transport.
    pub fn from_config(config: &crate::config::ClientConfig) -> Self {
        let transport = crate::transport::UreqTransport::new(config.request_timeout());
        Self::new(CourseClient::from_config(config), transport)
    }
}

fn rejected(key: &QueryKey, err: ApiError) -> QueryError {
    warn!(%key, error = %err, "query failed");
    QueryError::from(err)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::cache::COURSES_TAG;
    use crate::error::{ErrorStatus, DEFAULT_ERROR_MESSAGE};
    use crate::transport::TransportError;

    /// Replays canned outcomes in order and records the URLs it was asked for.
    #[derive(Default)]
    struct Scripted {
        replies: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
        seen: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn reply(self, status: u16, body: &str) -> Self {
            self.replies
                .borrow_mut()
                .push_back(Ok(HttpResponse::new(status, body)));
            self
        }

        fn fail(self, err: TransportError) -> Self {
            self.replies.borrow_mut().push_back(Err(err));
            self
        }

        fn calls(&self) -> usize {
            self.seen.borrow().len()
        }
    }

    impl Transport for Scripted {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.borrow_mut().push(request.url());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::new("no scripted reply")))
        }
    }

    fn api(transport: &Scripted) -> CourseApi<&Scripted> {
        CourseApi::new(CourseClient::new("http://localhost:3000"), transport)
    }

    #[test]
    fn list_courses_unwraps_envelope_and_sends_category() {
        let transport =
            Scripted::default().reply(200, r#"{"data":[{"id":"c1","category":"programming"}]}"#);
        let courses = api(&transport)
            .list_courses(&CourseFilter::category("programming"))
            .unwrap();

        assert_eq!(courses, vec![Course::new("c1").with_category("programming")]);
        assert_eq!(
            *transport.seen.borrow(),
            vec!["http://localhost:3000/courses?category=programming".to_string()]
        );
    }

    #[test]
    fn get_course_passes_bare_body_through() {
        let transport = Scripted::default().reply(200, r#"{"id":"c1","category":"programming"}"#);
        let course = api(&transport).get_course("c1").unwrap();
        assert_eq!(course, Course::new("c1").with_category("programming"));
    }

    #[test]
    fn second_query_is_served_from_cache() {
        let transport = Scripted::default().reply(200, r#"[{"id":"c1"}]"#);
        let mut api = api(&transport);
        let first = api.list_courses(&CourseFilter::default()).unwrap();
        let second = api.list_courses(&CourseFilter::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn bounded_cache_evicts_oldest_query() {
        let transport = Scripted::default()
            .reply(200, r#"{"id":"c1"}"#)
            .reply(200, r#"{"id":"c2"}"#)
            .reply(200, r#"{"id":"c1"}"#);
        let mut api = CourseApi::with_cache_capacity(
            CourseClient::new("http://localhost:3000"),
            &transport,
            1,
        );
        api.get_course("c1").unwrap();
        api.get_course("c2").unwrap();
        assert_eq!(api.cache().len(), 1);

        api.get_course("c1").unwrap();
        assert_eq!(transport.calls(), 3);
    }

    #[test]
    fn different_filters_are_cached_separately() {
        let transport = Scripted::default()
            .reply(200, r#"[{"id":"c1","category":"a"},{"id":"c2","category":"b"}]"#)
            .reply(200, r#"[{"id":"c1","category":"a"}]"#);
        let mut api = api(&transport);
        assert_eq!(api.list_courses(&CourseFilter::default()).unwrap().len(), 2);
        assert_eq!(api.list_courses(&CourseFilter::category("a")).unwrap().len(), 1);
        assert_eq!(transport.calls(), 2);
        assert_eq!(api.cache().len(), 2);
    }

    #[test]
    fn courses_invalidation_refetches_list_and_detail() {
        let transport = Scripted::default()
            .reply(200, r#"[{"id":"c1","title":"Old"}]"#)
            .reply(200, r#"{"id":"c1","title":"Old"}"#)
            .reply(200, r#"[{"id":"c1","title":"New"}]"#)
            .reply(200, r#"{"id":"c1","title":"New"}"#);
        let mut api = api(&transport);

        let list = api.list_courses(&CourseFilter::default()).unwrap();
        let detail = api.get_course(&list[0].id).unwrap();
        assert_eq!(detail.field("title").unwrap(), "Old");

        let keys = api.invalidate_tags(&[CacheTag::of_type(COURSES_TAG)]);
        assert_eq!(keys.len(), 2);

        let list = api.list_courses(&CourseFilter::default()).unwrap();
        let detail = api.get_course("c1").unwrap();
        assert_eq!(list[0].field("title").unwrap(), "New");
        assert_eq!(detail.field("title").unwrap(), "New");
        assert_eq!(transport.calls(), 4);
    }

    #[test]
    fn id_invalidation_leaves_list_cached() {
        let transport = Scripted::default()
            .reply(200, r#"[{"id":"c1"}]"#)
            .reply(200, r#"{"id":"c1"}"#)
            .reply(200, r#"{"id":"c1"}"#);
        let mut api = api(&transport);
        api.list_courses(&CourseFilter::default()).unwrap();
        api.get_course("c1").unwrap();

        api.invalidate_tags(&[CacheTag::with_id(COURSES_TAG, "c1")]);
        api.list_courses(&CourseFilter::default()).unwrap();
        api.get_course("c1").unwrap();
        assert_eq!(transport.calls(), 3);
    }

    #[test]
    fn transport_failure_becomes_fetch_error() {
        let transport = Scripted::default().fail(TransportError::new("connection refused"));
        let err = api(&transport).get_course("c1").unwrap_err();
        assert_eq!(
            err,
            QueryError {
                status: ErrorStatus::FetchError,
                error: "connection refused".to_string()
            }
        );
    }

    #[test]
    fn transport_failure_without_message_uses_default() {
        let transport = Scripted::default().fail(TransportError::without_message());
        let err = api(&transport)
            .list_courses(&CourseFilter::default())
            .unwrap_err();
        assert_eq!(err.status, ErrorStatus::FetchError);
        assert_eq!(err.error, DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn failures_are_not_cached() {
        let transport = Scripted::default()
            .reply(404, "")
            .reply(200, r#"{"id":"c9"}"#);
        let mut api = api(&transport);
        let err = api.get_course("c9").unwrap_err();
        assert_eq!(err.status, ErrorStatus::Http(404));
        assert!(api.cache().is_empty());
        assert_eq!(api.get_course("c9").unwrap().id, "c9");
    }

    #[test]
    fn undecodable_body_is_parsing_error() {
        let transport = Scripted::default().reply(200, "<html>");
        let err = api(&transport)
            .list_courses(&CourseFilter::default())
            .unwrap_err();
        assert_eq!(err.status, ErrorStatus::ParsingError);
    }

    #[cfg(feature = "ureq")]
    #[test]
    fn from_config_uses_configured_base_url() {
        let config = crate::config::ClientConfig::new("http://api.test/").unwrap();
        let api = CourseApi::from_config(&config);
        assert_eq!(api.client().base_url(), "http://api.test");
        assert!(api.cache().is_empty());
    }
}
