//! Allowlist of remote image sources.
//!
//! A `RemotePattern` matches on protocol, hostname, port and pathname.
//! Hostnames accept `*` for exactly one label and `**` for any number of
//! leading labels; pathnames accept `*` for one segment and `**` for the
//! rest of the path. An empty port only matches URLs on the scheme's
//! default port.

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePattern {
    pub protocol: String,
    pub hostname: String,
    #[serde(default)]
    pub port: String,
    #[serde(default = "any_path")]
    pub pathname: String,
}

fn any_path() -> String {
    "/**".to_string()
}

impl RemotePattern {
    pub fn https(hostname: &str) -> Self {
        Self {
            protocol: "https".to_string(),
            hostname: hostname.to_string(),
            port: String::new(),
            pathname: any_path(),
        }
    }

    pub fn matches(&self, url: &Url) -> bool {
        if url.scheme() != self.protocol.trim_end_matches(':') {
            return false;
        }
        let port_matches = match url.port() {
            None => self.port.is_empty(),
            Some(port) => self.port == port.to_string(),
        };
        if !port_matches {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        glob_match(&self.hostname, host, '.') && glob_match(&self.pathname, url.path(), '/')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAllowlist {
    patterns: Vec<RemotePattern>,
}

impl Default for ImageAllowlist {
    fn default() -> Self {
        Self::new(vec![
            RemotePattern::https("assets.aceternity.com"),
            RemotePattern::https("images.pexels.com"),
        ])
    }
}

impl ImageAllowlist {
    pub fn new(patterns: Vec<RemotePattern>) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &[RemotePattern] {
        &self.patterns
    }

    /// Whether `url` may be loaded. Unparseable URLs are never allowed.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(url) = Url::parse(url) else {
            return false;
        };
        self.patterns.iter().any(|p| p.matches(&url))
    }
}

/// Segment-wise glob. A `**` segment matches zero or more segments; `*`
/// matches exactly one non-empty segment.
fn glob_match(pattern: &str, input: &str, sep: char) -> bool {
    let pattern: Vec<&str> = pattern.split(sep).collect();
    let input: Vec<&str> = input.split(sep).collect();
    match_segments(&pattern, &input)
}

fn match_segments(pattern: &[&str], input: &[&str]) -> bool {
    match pattern.split_first() {
        None => input.is_empty(),
        Some((&"**", rest)) => (0..=input.len()).any(|skip| match_segments(rest, &input[skip..])),
        Some((&"*", rest)) => match input.split_first() {
            Some((seg, tail)) if !seg.is_empty() => match_segments(rest, tail),
            _ => false,
        },
        Some((literal, rest)) => match input.split_first() {
            Some((seg, tail)) if seg == literal => match_segments(rest, tail),
            _ => false,
        },
    }
}
