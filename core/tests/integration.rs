//! End-to-end queries against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `CourseApi` with the
//! `ureq` transport over real HTTP. Covers both response shapes (bare and
//! `{data}` envelope), the cache, and invalidation after a write.

use std::net::SocketAddr;

use course_core::{
    CacheTag, CourseApi, CourseClient, CourseFilter, ErrorStatus, UreqTransport, COURSES_TAG,
};
use mock_server::ServerOptions;

/// Start the mock server on a background thread and return its address.
fn spawn_server(options: ServerOptions) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, options).await
        })
        .unwrap();
    });

    addr
}

fn api(addr: SocketAddr) -> CourseApi<UreqTransport> {
    CourseApi::new(
        CourseClient::new(&format!("http://{addr}")),
        UreqTransport::default(),
    )
}

/// Perform a write the client itself does not model.
fn create_course(addr: SocketAddr, title: &str, category: &str) -> String {
    let body = serde_json::json!({ "title": title, "category": category }).to_string();
    let mut response = ureq::post(&format!("http://{addr}/courses"))
        .content_type("application/json")
        .send(body.as_bytes())
        .expect("create request failed");
    let created: serde_json::Value =
        serde_json::from_str(&response.body_mut().read_to_string().unwrap()).unwrap();
    created["id"].as_str().unwrap().to_string()
}

#[test]
fn bare_responses() {
    let addr = spawn_server(ServerOptions::default());
    let mut api = api(addr);

    // Step 1: full list.
    let courses = api.list_courses(&CourseFilter::default()).unwrap();
    assert_eq!(courses.len(), 3);

    // Step 2: filtered list.
    let programming = api
        .list_courses(&CourseFilter::category("programming"))
        .unwrap();
    assert_eq!(programming.len(), 2);
    assert!(programming
        .iter()
        .all(|c| c.category.as_deref() == Some("programming")));

    // Step 3: single course keeps pass-through fields.
    let course = api.get_course("c1").unwrap();
    assert_eq!(course.field("title").unwrap(), "Intro to Rust");

    // Step 4: unknown id is a 404.
    let err = api.get_course("nope").unwrap_err();
    assert_eq!(err.status, ErrorStatus::Http(404));
}

#[test]
fn enveloped_responses() {
    let addr = spawn_server(ServerOptions {
        envelope: true,
        ..ServerOptions::default()
    });
    let mut api = api(addr);

    let courses = api.list_courses(&CourseFilter::category("design")).unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].id, "c3");

    let course = api.get_course("c3").unwrap();
    assert_eq!(course.category.as_deref(), Some("design"));
}

#[test]
fn write_then_invalidate() {
    let addr = spawn_server(ServerOptions::default());
    let mut api = api(addr);

    // Step 1: warm the cache with a list and a detail.
    let before = api.list_courses(&CourseFilter::default()).unwrap();
    let detail = api.get_course(&before[0].id).unwrap();
    assert_eq!(api.cache().len(), 2);

    // Step 2: a write lands on the server; cached reads are still served.
    let id = create_course(addr, "Lifetimes", "programming");
    let cached = api.list_courses(&CourseFilter::default()).unwrap();
    assert_eq!(cached, before);

    // Step 3: invalidating "Courses" marks both entries stale.
    let stale = api.invalidate_tags(&[CacheTag::of_type(COURSES_TAG)]);
    assert_eq!(stale.len(), 2);

    // Step 4: next reads refetch and see the new course.
    let after = api.list_courses(&CourseFilter::default()).unwrap();
    assert_eq!(after.len(), before.len() + 1);
    assert!(after.iter().any(|c| c.id == id));
    assert_eq!(api.get_course(&detail.id).unwrap(), detail);
    assert_eq!(api.get_course(&id).unwrap().field("title").unwrap(), "Lifetimes");
}

#[test]
fn unreachable_server_is_fetch_error() {
    // Bind and drop to get a port with nothing listening.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let mut api = api(addr);

    let err = api.list_courses(&CourseFilter::default()).unwrap_err();
    assert_eq!(err.status, ErrorStatus::FetchError);
    assert!(!err.error.is_empty());
    assert!(api.cache().is_empty());
}
