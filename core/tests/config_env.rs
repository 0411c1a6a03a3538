//! Configuration read from the real process environment.
//!
//! Kept in its own test binary: these tests mutate process-wide variables
//! and share the `ClientConfig::global` cell, so they serialize on `ENV`.

use std::sync::Mutex;

use course_core::{ClientConfig, ConfigError};

static ENV: Mutex<()> = Mutex::new(());

#[test]
fn from_env_rejects_non_http_base_url() {
    let _guard = ENV.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("API_BASE_URL", "ftp://x");
    std::env::remove_var("REQUEST_TIMEOUT_SECS");

    let err = ClientConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBaseUrl { ref url, .. } if url == "ftp://x"));
}

#[test]
fn from_env_rejects_zero_timeout() {
    let _guard = ENV.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("API_BASE_URL", "http://localhost:3000");
    std::env::set_var("REQUEST_TIMEOUT_SECS", "0");

    let err = ClientConfig::from_env().unwrap_err();
    std::env::remove_var("REQUEST_TIMEOUT_SECS");
    assert!(matches!(err, ConfigError::ZeroTimeout));
}

#[test]
fn global_resolves_once() {
    let _guard = ENV.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("API_BASE_URL", "http://first.example.com");
    std::env::set_var("REQUEST_TIMEOUT_SECS", "4");

    let first = ClientConfig::global().unwrap();
    assert_eq!(first.api_base_url, "http://first.example.com");
    assert_eq!(first.request_timeout_secs, 4);

    std::env::set_var("API_BASE_URL", "http://second.example.com");
    std::env::set_var("REQUEST_TIMEOUT_SECS", "9");

    let second = ClientConfig::global().unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(second.api_base_url, "http://first.example.com");
    assert_eq!(second.request_timeout_secs, 4);

    std::env::remove_var("REQUEST_TIMEOUT_SECS");
}
