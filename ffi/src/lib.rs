//! C-ABI wrapper around `course-core`.
//!
//! # Overview
//! Exposes the course queries through `extern "C"` functions so a host UI in
//! any language with a C FFI can build requests, run them with its own HTTP
//! stack, and hand the responses back for parsing and envelope unwrapping.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `course_build_*` / `course_parse_*` mirror the core client 1:1.
//! - When the host's own request fails before any response exists it calls
//!   `course_transport_error`, which yields the same uniform `FETCH_ERROR`
//!   result a Rust caller would see.
//! - The caller owns all returned pointers and must release them with the
//!   matching `course_free_*` function.
//! - Caching stays on the host side; results carry everything needed to key
//!   and tag them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use course_core::{CourseFilter, HttpResponse};

use types::*;

/// Borrow a C string as `&str`. `None` for null or non-UTF-8 input.
fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `CourseClient` bound to `base_url`.
///
/// Returns null if `base_url` is null, not UTF-8, not an absolute http(s)
/// URL, or if a panic occurs.
/// The caller must free the returned pointer with `course_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn course_client_new(base_url: *const c_char) -> *mut FfiCourseClient {
    catch_unwind(|| match c_str(base_url).map(course_core::ClientConfig::new) {
        Some(Ok(config)) => Box::into_raw(Box::new(FfiCourseClient {
            inner: course_core::CourseClient::from_config(&config),
        })),
        _ => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `course_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn course_client_free(client: *mut FfiCourseClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build the request listing courses. `category` may be null for no filter.
///
/// Returns null if `client` is null or `category` is not UTF-8.
/// The caller must free the returned pointer with `course_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn course_build_list_courses(
    client: *const FfiCourseClient,
    category: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let filter = if category.is_null() {
            CourseFilter::default()
        } else {
            match c_str(category) {
                Some(category) => CourseFilter::category(category),
                None => return std::ptr::null_mut(),
            }
        };
        FfiHttpRequest::from_core(client.inner.build_list_courses(&filter))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request fetching one course by id.
///
/// Returns null if `client` or `id` is null, or `id` is not UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn course_build_get_course(
    client: *const FfiCourseClient,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match c_str(id) {
            Some(id) => FfiHttpRequest::from_core(client.inner.build_get_course(id)),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body reads
/// as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> Result<HttpResponse, *mut FfiCourseResult> {
    if resp.body.is_null() {
        return Ok(HttpResponse::new(resp.status, String::new()));
    }
    match c_str(resp.body) {
        Some(body) => Ok(HttpResponse::new(resp.status, body)),
        None => Err(FfiCourseResult::invalid_arg("response.body")),
    }
}

/// Parse the response to a list-courses request.
///
/// Returns a result with `data_tag = CourseList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn course_parse_list_courses(
    client: *const FfiCourseClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCourseResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCourseResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCourseResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let core_resp = match ffi_response_to_core(unsafe { &*response }) {
            Ok(resp) => resp,
            Err(result) => return result,
        };
        match client.inner.parse_list_courses(core_resp) {
            Ok(courses) => FfiCourseResult::ok_course_list(courses),
            Err(e) => FfiCourseResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiCourseResult::panic("panic in course_parse_list_courses"))
}

/// Parse the response to a get-course request.
///
/// Returns a result with `data_tag = Course` on success.
#[unsafe(no_mangle)]
pub extern "C" fn course_parse_get_course(
    client: *const FfiCourseClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCourseResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCourseResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCourseResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let core_resp = match ffi_response_to_core(unsafe { &*response }) {
            Ok(resp) => resp,
            Err(result) => return result,
        };
        match client.inner.parse_get_course(core_resp) {
            Ok(course) => FfiCourseResult::ok_course(course),
            Err(e) => FfiCourseResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiCourseResult::panic("panic in course_parse_get_course"))
}

/// Turn a host-side transport failure into the uniform error result.
///
/// `message` may be null; null, empty or non-UTF-8 messages become
/// "An error occurred".
#[unsafe(no_mangle)]
pub extern "C" fn course_transport_error(message: *const c_char) -> *mut FfiCourseResult {
    catch_unwind(|| FfiCourseResult::fetch_error(c_str(message)))
        .unwrap_or_else(|_| FfiCourseResult::panic("panic in course_transport_error"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by any `course_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn course_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiHttpRequest::free(req) });
}

/// Free a result returned by any `course_parse_*` function or
/// `course_transport_error`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn course_free_result(result: *mut FfiCourseResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiCourseResult::free(result) });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn course_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
