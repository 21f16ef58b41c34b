//! HTTP cache control module
//!
//! Provides `ETag` generation, conditional request handling, and the cache
//! policy applied to each response by request path.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate `ETag` using fast hashing
///
/// # Arguments
/// * `content` - Response payload
///
/// # Returns
/// Quoted `ETag` string, e.g., `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports single `ETags`, comma-separated lists, and the `*` wildcard.
///
/// # Returns
/// Returns true if matched (should return 304), false otherwise
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == etag || e.trim() == "*")
    })
}

/// Cache policy, chosen per request path.
///
/// Download payloads are addressed by immutable keys and may be cached for
/// an hour; every rendered page reflects live bucket state and must not be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Download responses: public cache, 1 hour.
    Download,
    /// Everything else: no caching.
    Page,
}

impl CachePolicy {
    /// Select the policy for a request path.
    pub fn for_path(path: &str) -> Self {
        if path.contains("/download/") {
            Self::Download
        } else {
            Self::Page
        }
    }

    /// Cache-Control header value for this policy.
    pub const fn header_value(self) -> &'static str {
        match self {
            Self::Download => "public, max-age=3600",
            Self::Page => "no-cache",
        }
    }
}
