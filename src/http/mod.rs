//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! file-management business logic: response builders, cache policy, and
//! MIME type detection.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use cache::CachePolicy;
pub use response::{
    apply_standard_headers, build_304_response, build_400_response, build_404_response,
    build_413_response, build_500_response, build_download_response, build_html_response,
    build_page_response, build_preflight_response,
};
