//! HTTP response building module
//!
//! Provides builders for the response shapes the file manager produces,
//! decoupled from page rendering and storage logic. Every response leaving
//! the dispatcher also passes through [`apply_standard_headers`], which adds
//! the cross-origin headers and the per-path cache directive.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header;
use hyper::{Response, StatusCode};

use super::cache::CachePolicy;

/// Add the headers every response carries: the permissive CORS trio and the
/// Cache-Control value for the request path's policy.
pub fn apply_standard_headers(response: &mut Response<Full<Bytes>>, policy: CachePolicy) {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        header::HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        header::HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        header::HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static(policy.header_value()),
    );
}

/// Build 200 HTML page response
pub fn build_html_response(content: String) -> Response<Full<Bytes>> {
    build_page_response(StatusCode::OK, content)
}

/// Build HTML page response with an explicit status
pub fn build_page_response(status: StatusCode, content: String) -> Response<Full<Bytes>> {
    let content_length = content.len();
    Response::builder()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(Bytes::from(content)))
        .unwrap_or_else(|e| {
            log_build_error("page", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 400 Bad Request response
pub fn build_400_response(message: &str) -> Response<Full<Bytes>> {
    build_plain_response(StatusCode::BAD_REQUEST, format!("400 Bad Request: {message}"))
}

/// Build 404 Not Found response (plain text, for missing objects)
pub fn build_404_response(message: &str) -> Response<Full<Bytes>> {
    build_plain_response(StatusCode::NOT_FOUND, format!("404 Not Found: {message}"))
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_plain_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        "413 Payload Too Large".to_string(),
    )
}

/// Build 500 response echoing the backend error message
pub fn build_500_response(message: &str) -> Response<Full<Bytes>> {
    build_plain_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Error: {message}"),
    )
}

fn build_plain_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let content_length = body.len();
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build OPTIONS response (CORS preflight)
///
/// Preflights short-circuit before dispatch, so this builder carries its own
/// cross-origin headers instead of relying on [`apply_standard_headers`].
pub fn build_preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header("ETag", etag)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build download response: raw object bytes served as an attachment
pub fn build_download_response(
    body: Bytes,
    content_type: &str,
    display_name: &str,
    etag: &str,
) -> Response<Full<Bytes>> {
    let content_length = body.len();
    // Double quotes and control characters would terminate the header
    // parameter; everything else passes through as-is.
    let safe_name: String = display_name
        .chars()
        .filter(|c| *c != '"' && !c.is_control())
        .collect();

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{safe_name}\""),
        )
        .header("Content-Length", content_length)
        .header("ETag", etag)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("download", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_headers_applied() {
        let mut response = build_html_response("<html></html>".to_string());
        apply_standard_headers(&mut response, CachePolicy::Page);

        assert_eq!(
            response.headers()["Access-Control-Allow-Origin"],
            "*"
        );
        assert_eq!(
            response.headers()["Access-Control-Allow-Methods"],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            response.headers()["Access-Control-Allow-Headers"],
            "Content-Type"
        );
        assert_eq!(response.headers()["Cache-Control"], "no-cache");
    }

    #[test]
    fn test_download_response_headers() {
        let response = build_download_response(
            Bytes::from_static(b"payload"),
            "application/pdf",
            "report.pdf",
            "\"abc\"",
        );

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Content-Type"], "application/pdf");
        assert_eq!(
            response.headers()["Content-Disposition"],
            "attachment; filename=\"report.pdf\""
        );
        assert_eq!(response.headers()["Content-Length"], "7");
        assert_eq!(response.headers()["ETag"], "\"abc\"");
    }

    #[test]
    fn test_download_response_strips_quotes_from_name() {
        let response = build_download_response(
            Bytes::from_static(b"x"),
            "application/octet-stream",
            "we\"ird.bin",
            "\"e\"",
        );
        assert_eq!(
            response.headers()["Content-Disposition"],
            "attachment; filename=\"weird.bin\""
        );
    }

    #[test]
    fn test_error_bodies_echo_message() {
        let response = build_500_response("bucket unreachable");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["Content-Length"], "25");
    }
}
