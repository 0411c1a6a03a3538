//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`, and
//! enums with explicit discriminants. Conversions live here so `lib.rs` stays
//! focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use course_core::{ApiError, Course, HttpMethod, HttpRequest, QueryError};

/// Opaque handle to a `CourseClient`.
pub struct FfiCourseClient {
    pub(crate) inner: course_core::CourseClient,
}

/// Convert to an owned C string. Interior NUL bytes are dropped.
pub(crate) fn to_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

/// Free a C string produced by `to_c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Hand a `Vec` to C as pointer + length. Empty vectors become null.
fn into_raw_parts<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    let boxed = items.into_boxed_slice();
    (Box::into_raw(boxed) as *mut T, len)
}

/// Take back a pointer + length produced by `into_raw_parts`.
///
/// # Safety
/// `ptr` and `len` must come from a single `into_raw_parts` call.
unsafe fn from_raw_parts<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
        }
    }
}

/// A key-value pair of C strings (header or query parameter).
#[repr(C)]
pub struct FfiKeyValue {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

fn into_ffi_pairs(pairs: Vec<(String, String)>) -> (*mut FfiKeyValue, u32) {
    into_raw_parts(
        pairs
            .into_iter()
            .map(|(k, v)| FfiKeyValue {
                key: to_c_string(k),
                value: to_c_string(v),
            })
            .collect(),
    )
}

unsafe fn free_ffi_pairs(ptr: *mut FfiKeyValue, len: u32) {
    for pair in unsafe { from_raw_parts(ptr, len) } {
        free_c_string(pair.key);
        free_c_string(pair.value);
    }
}

/// An HTTP request described as C-compatible plain data.
///
/// `url` is ready to use as-is; `path` + `query` are the same request split
/// apart for hosts that prefer to encode parameters themselves.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub path: *mut c_char,
    pub query: *mut FfiKeyValue,
    pub query_len: u32,
    pub headers: *mut FfiKeyValue,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = to_c_string(req.url());
        let (query, query_len) = into_ffi_pairs(req.query);
        let (headers, headers_len) = into_ffi_pairs(req.headers);
        let ffi_req = Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            path: to_c_string(req.path),
            query,
            query_len,
            headers,
            headers_len,
            body: req.body.map_or(std::ptr::null_mut(), to_c_string),
        });
        Box::into_raw(ffi_req)
    }

    /// # Safety
    /// `req` must come from `from_core` and not have been freed.
    pub(crate) unsafe fn free(req: *mut Self) {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.path);
        free_c_string(req.body);
        unsafe {
            free_ffi_pairs(req.query, req.query_len);
            free_ffi_pairs(req.headers, req.headers_len);
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The host builds this on the stack after executing a request and passes a
/// pointer to a `course_parse_*` function. The FFI layer reads but does not
/// free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiCourseResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Decode = 3,
    Fetch = 4,
    Panic = 5,
    NullArg = 6,
    InvalidArg = 7,
}

/// Tag that tells `course_free_result` what `FfiCourseResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Course = 1,
    CourseList = 2,
}

/// A course exposed to C. `category` may be null; `json` holds the whole
/// object including fields the client does not interpret.
#[repr(C)]
pub struct FfiCourse {
    pub id: *mut c_char,
    pub category: *mut c_char,
    pub json: *mut c_char,
}

impl FfiCourse {
    fn from_core(course: Course) -> Self {
        let json = serde_json::to_string(&course).unwrap_or_default();
        FfiCourse {
            id: to_c_string(course.id),
            category: course.category.map_or(std::ptr::null_mut(), to_c_string),
            json: to_c_string(json),
        }
    }

    fn free_fields(&self) {
        free_c_string(self.id);
        free_c_string(self.category);
        free_c_string(self.json);
    }
}

/// A list of courses exposed to C.
#[repr(C)]
pub struct FfiCourseList {
    pub items: *mut FfiCourse,
    pub len: u32,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, both error strings are null, and `data`
/// points to the payload described by `data_tag`. On failure `data` is null,
/// `error_message` is human-readable and `error_json` holds the uniform
/// `{"status": ..., "error": ...}` object.
#[repr(C)]
pub struct FfiCourseResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub error_json: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiCourseResult {
    fn boxed(self) -> *mut Self {
        Box::into_raw(Box::new(self))
    }

    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        FfiCourseResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            error_json: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }
        .boxed()
    }

    fn error(error_code: FfiErrorCode, err: QueryError) -> *mut Self {
        let json = serde_json::to_string(&err).unwrap_or_default();
        FfiCourseResult {
            error_code,
            error_message: to_c_string(err.error),
            error_json: to_c_string(json),
            http_status: err.status.http_status().unwrap_or(0),
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }
        .boxed()
    }

    /// Build a success result carrying a single `FfiCourse`.
    pub(crate) fn ok_course(course: Course) -> *mut Self {
        let course = Box::new(FfiCourse::from_core(course));
        Self::ok(FfiDataTag::Course, Box::into_raw(course) as *mut c_void)
    }

    /// Build a success result carrying an `FfiCourseList`.
    pub(crate) fn ok_course_list(courses: Vec<Course>) -> *mut Self {
        let (items, len) = into_raw_parts(courses.into_iter().map(FfiCourse::from_core).collect());
        let list = Box::new(FfiCourseList { items, len });
        Self::ok(FfiDataTag::CourseList, Box::into_raw(list) as *mut c_void)
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let code = match &err {
            ApiError::NotFound { .. } => FfiErrorCode::NotFound,
            ApiError::Server { .. } => FfiErrorCode::Http,
            ApiError::Decode(_) => FfiErrorCode::Decode,
            ApiError::Network(_) => FfiErrorCode::Fetch,
        };
        Self::error(code, QueryError::from(err))
    }

    /// Build the uniform result for a transport failure reported by the host.
    pub(crate) fn fetch_error(message: Option<&str>) -> *mut Self {
        Self::error(FfiErrorCode::Fetch, QueryError::fetch(message))
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::plain_error(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    /// Build an error result for an argument that is not valid UTF-8.
    pub(crate) fn invalid_arg(name: &str) -> *mut Self {
        Self::plain_error(FfiErrorCode::InvalidArg, format!("invalid argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::plain_error(FfiErrorCode::Panic, msg.to_string())
    }

    fn plain_error(error_code: FfiErrorCode, msg: String) -> *mut Self {
        FfiCourseResult {
            error_code,
            error_message: to_c_string(msg),
            error_json: std::ptr::null_mut(),
            http_status: 0,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }
        .boxed()
    }

    /// # Safety
    /// `result` must come from one of the constructors above and not have
    /// been freed.
    pub(crate) unsafe fn free(result: *mut Self) {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.error_json);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Course => {
                let course = unsafe { Box::from_raw(result.data as *mut FfiCourse) };
                course.free_fields();
            }
            FfiDataTag::CourseList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiCourseList) };
                for course in unsafe { from_raw_parts(list.items, list.len) } {
                    course.free_fields();
                }
            }
            FfiDataTag::None => {}
        }
    }
}
