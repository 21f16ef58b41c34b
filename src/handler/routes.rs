//! Route matching module
//!
//! Maps an incoming method + path onto an explicit route variant. All
//! method/prefix rules live here so dispatch rules can be tested without
//! touching rendering or storage.

use hyper::Method;
use std::borrow::Cow;

/// One request's resolved route.
///
/// `Download` and `Delete` carry the percent-decoded storage key taken from
/// the path. The key, not the display name derived from it, addresses the
/// object in every storage call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// GET `/` - management page with the object table
    Manager,
    /// GET `/files` - alternate listing page
    Listing,
    /// GET `/upload` - static upload form
    UploadForm,
    /// POST `/upload` - multipart upload submission
    UploadSubmit,
    /// GET `/download/<key>`
    Download(String),
    /// GET `/delete/<key>`
    Delete(String),
    /// OPTIONS on any path - CORS preflight
    Preflight,
    /// Everything else
    NotFound,
}

impl Route {
    /// Resolve a method + path to a route.
    pub fn resolve(method: &Method, path: &str) -> Self {
        if method == Method::OPTIONS {
            return Self::Preflight;
        }

        match (method, path) {
            (&Method::GET, "/") => Self::Manager,
            (&Method::GET, "/files") => Self::Listing,
            (&Method::GET, "/upload") => Self::UploadForm,
            (&Method::POST, "/upload") => Self::UploadSubmit,
            (&Method::GET, _) => {
                if let Some(raw_key) = path.strip_prefix("/download/") {
                    Self::Download(decode_key(raw_key))
                } else if let Some(raw_key) = path.strip_prefix("/delete/") {
                    Self::Delete(decode_key(raw_key))
                } else {
                    Self::NotFound
                }
            }
            _ => Self::NotFound,
        }
    }
}

/// Percent-decode a key taken from the request path.
///
/// A sequence that does not decode to UTF-8 falls back to the raw segment,
/// which then misses in the backend and 404s.
fn decode_key(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_string(), Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_pages() {
        assert_eq!(Route::resolve(&Method::GET, "/"), Route::Manager);
        assert_eq!(Route::resolve(&Method::GET, "/files"), Route::Listing);
        assert_eq!(Route::resolve(&Method::GET, "/upload"), Route::UploadForm);
        assert_eq!(Route::resolve(&Method::POST, "/upload"), Route::UploadSubmit);
    }

    #[test]
    fn test_resolve_download() {
        assert_eq!(
            Route::resolve(&Method::GET, "/download/1700000000000_a.txt"),
            Route::Download("1700000000000_a.txt".to_string())
        );
    }

    #[test]
    fn test_resolve_delete() {
        assert_eq!(
            Route::resolve(&Method::GET, "/delete/1700000000000_a.txt"),
            Route::Delete("1700000000000_a.txt".to_string())
        );
    }

    #[test]
    fn test_keys_are_percent_decoded() {
        assert_eq!(
            Route::resolve(&Method::GET, "/download/1_my%20report.pdf"),
            Route::Download("1_my report.pdf".to_string())
        );
        assert_eq!(
            Route::resolve(&Method::GET, "/delete/1_caf%C3%A9.txt"),
            Route::Delete("1_café.txt".to_string())
        );
    }

    #[test]
    fn test_invalid_percent_encoding_falls_back_to_raw() {
        assert_eq!(
            Route::resolve(&Method::GET, "/download/bad%ff%fe"),
            Route::Download("bad%ff%fe".to_string())
        );
    }

    #[test]
    fn test_options_short_circuits_everything() {
        assert_eq!(Route::resolve(&Method::OPTIONS, "/"), Route::Preflight);
        assert_eq!(
            Route::resolve(&Method::OPTIONS, "/download/x"),
            Route::Preflight
        );
        assert_eq!(Route::resolve(&Method::OPTIONS, "/nope"), Route::Preflight);
    }

    #[test]
    fn test_unmatched_routes() {
        assert_eq!(Route::resolve(&Method::GET, "/nope"), Route::NotFound);
        assert_eq!(Route::resolve(&Method::POST, "/"), Route::NotFound);
        assert_eq!(Route::resolve(&Method::PUT, "/upload"), Route::NotFound);
        assert_eq!(Route::resolve(&Method::HEAD, "/"), Route::NotFound);
        assert_eq!(Route::resolve(&Method::DELETE, "/delete/x"), Route::NotFound);
        // Prefix routes are GET-only
        assert_eq!(Route::resolve(&Method::POST, "/download/x"), Route::NotFound);
    }
}
