//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: resolves the route, runs the
//! matching storage operation, and renders the response. Every backend call
//! is wrapped here; a storage error becomes a 500 whose body echoes the
//! error message, with no retries.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode, Version};

use crate::config::AppState;
use crate::handler::routes::Route;
use crate::handler::{pages, upload};
use crate::http::{self, cache, CachePolicy};
use crate::logger::{self, AccessLogEntry};
use crate::storage::{keys, FetchedObject, ObjectStore, StoredObject};

/// Request headers the dispatcher consumes.
pub struct RequestContext {
    /// Request Content-Type, carries the multipart boundary for uploads.
    pub content_type: Option<String>,
    /// If-None-Match header for conditional downloads.
    pub if_none_match: Option<String>,
}

impl RequestContext {
    fn from_headers(headers: &hyper::HeaderMap) -> Self {
        Self {
            content_type: header_string(headers, "content-type"),
            if_none_match: header_string(headers, "if-none-match"),
        }
    }
}

fn header_string(headers: &hyper::HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);
    let http_version = version_label(req.version());

    // 1. Resolve the route; preflights bypass every other check
    let route = Route::resolve(&method, &path);

    // 2. Check declared body size before reading anything
    if route != Route::Preflight {
        if let Some(response) = check_body_size(&req, state.config.http.max_body_size) {
            log_request(&state, &remote_addr, &method, &path, query, http_version, &response, started);
            return Ok(response);
        }
    }

    let ctx = RequestContext::from_headers(req.headers());

    // 3. Only an upload submission carries a body worth reading
    let body = if route == Route::UploadSubmit {
        match req.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                let response =
                    http::build_400_response(&format!("failed to read request body: {e}"));
                log_request(&state, &remote_addr, &method, &path, query, http_version, &response, started);
                return Ok(response);
            }
        }
    } else {
        Bytes::new()
    };

    // 4. Dispatch against the injected store
    let response = dispatch(route, &path, &ctx, body, state.store.as_ref()).await;

    log_request(&state, &remote_addr, &method, &path, query, http_version, &response, started);
    Ok(response)
}

/// Run one resolved route to completion against `store`.
///
/// Separated from [`handle_request`] so route behavior is testable without a
/// live connection. Every response except the preflight short-circuit passes
/// through [`http::apply_standard_headers`].
pub async fn dispatch(
    route: Route,
    path: &str,
    ctx: &RequestContext,
    body: Bytes,
    store: &dyn ObjectStore,
) -> Response<Full<Bytes>> {
    if route == Route::Preflight {
        return http::build_preflight_response();
    }

    let mut response = match route {
        Route::Manager => list_page(store, pages::render_manager_page).await,
        Route::Listing => list_page(store, pages::render_listing_page).await,
        Route::UploadForm => http::build_html_response(pages::render_upload_form()),
        Route::UploadSubmit => handle_upload(store, ctx.content_type.as_deref(), body).await,
        Route::Download(ref key) => {
            handle_download(store, key, ctx.if_none_match.as_deref()).await
        }
        Route::Delete(ref key) => handle_delete(store, key).await,
        Route::NotFound => {
            http::build_page_response(StatusCode::NOT_FOUND, pages::render_not_found_page())
        }
        Route::Preflight => unreachable!(),
    };

    http::apply_standard_headers(&mut response, CachePolicy::for_path(path));
    response
}

/// Render a listing page over the backend's enumeration, unsorted.
async fn list_page(
    store: &dyn ObjectStore,
    render: fn(&[StoredObject]) -> String,
) -> Response<Full<Bytes>> {
    match store.list().await {
        Ok(objects) => http::build_html_response(render(&objects)),
        Err(e) => http::build_500_response(&e.to_string()),
    }
}

async fn handle_upload(
    store: &dyn ObjectStore,
    content_type: Option<&str>,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let file = match upload::extract_file(content_type, body).await {
        Ok(file) => file,
        // Rejected before any storage call
        Err(e) => return http::build_400_response(&e.to_string()),
    };

    let key = keys::encode(&file.filename);
    let size = file.data.len() as u64;
    match store.put(&key, file.data, file.content_type.as_deref()).await {
        Ok(()) => http::build_html_response(pages::render_upload_success(
            &key,
            size,
            file.content_type.as_deref(),
        )),
        Err(e) => http::build_500_response(&e.to_string()),
    }
}

async fn handle_download(
    store: &dyn ObjectStore,
    key: &str,
    if_none_match: Option<&str>,
) -> Response<Full<Bytes>> {
    let fetched = match store.get(key).await {
        Ok(Some(fetched)) => fetched,
        Ok(None) => return http::build_404_response("file not found"),
        Err(e) => return http::build_500_response(&e.to_string()),
    };

    let FetchedObject {
        body, content_type, ..
    } = fetched;

    let etag = cache::generate_etag(&body);
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    http::build_download_response(
        body,
        content_type.as_deref().unwrap_or("application/octet-stream"),
        keys::decode(key),
        &etag,
    )
}

/// Delete is idempotent: an absent key still renders the success page.
async fn handle_delete(store: &dyn ObjectStore, key: &str) -> Response<Full<Bytes>> {
    match store.delete(key).await {
        Ok(()) => http::build_html_response(pages::render_delete_success(key)),
        Err(e) => http::build_500_response(&e.to_string()),
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
}

#[allow(clippy::too_many_arguments)]
fn log_request(
    state: &AppState,
    remote_addr: &SocketAddr,
    method: &Method,
    path: &str,
    query: Option<String>,
    http_version: &str,
    response: &Response<Full<Bytes>>,
    started: Instant,
) {
    if !state.config.logging.access_log {
        return;
    }

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        method.to_string(),
        path.to_string(),
    );
    entry.query = query;
    entry.http_version = http_version.to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get("content-length")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::upload::encode_multipart;
    use crate::storage::MemoryStore;

    const BOUNDARY: &str = "router-test-boundary";

    fn plain_ctx() -> RequestContext {
        RequestContext {
            content_type: None,
            if_none_match: None,
        }
    }

    fn upload_ctx() -> RequestContext {
        RequestContext {
            content_type: Some(format!("multipart/form-data; boundary={BOUNDARY}")),
            if_none_match: None,
        }
    }

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_preflight_short_circuits() {
        let store = MemoryStore::new();
        let response =
            dispatch(Route::Preflight, "/anything", &plain_ctx(), Bytes::new(), &store).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(
            response.headers()["Access-Control-Allow-Methods"],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            response.headers()["Access-Control-Allow-Headers"],
            "Content-Type"
        );
    }

    #[tokio::test]
    async fn test_manager_page_headers() {
        let store = MemoryStore::new();
        let response = dispatch(Route::Manager, "/", &plain_ctx(), Bytes::new(), &store).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(response.headers()["Cache-Control"], "no-cache");
        assert_eq!(
            response.headers()["Content-Type"],
            "text/html; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_upload_without_file_field_skips_backend() {
        let store = MemoryStore::new();
        let body = encode_multipart(BOUNDARY, "comment", None, "text/plain", b"not a file");
        let response = dispatch(Route::UploadSubmit, "/upload", &upload_ctx(), body, &store).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_download_unknown_key_is_404() {
        let store = MemoryStore::new();
        let response = dispatch(
            Route::Download("1700000000000_missing.txt".to_string()),
            "/download/1700000000000_missing.txt",
            &plain_ctx(),
            Bytes::new(),
            &store,
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_missing_key_still_renders_success() {
        let store = MemoryStore::new();
        let response = dispatch(
            Route::Delete("never-existed".to_string()),
            "/delete/never-existed",
            &plain_ctx(),
            Bytes::new(),
            &store,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
        assert!(html.contains("Delete complete"));
    }

    #[tokio::test]
    async fn test_unmatched_route_renders_404_page() {
        let store = MemoryStore::new();
        let response =
            dispatch(Route::NotFound, "/nope", &plain_ctx(), Bytes::new(), &store).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()["Content-Type"],
            "text/html; charset=utf-8"
        );
        let html = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
        assert!(html.contains("404"));
    }

    #[tokio::test]
    async fn test_download_conditional_request_gets_304() {
        let store = MemoryStore::new();
        store
            .put("1_a.bin", Bytes::from_static(b"payload"), None)
            .await
            .unwrap();

        let first = dispatch(
            Route::Download("1_a.bin".to_string()),
            "/download/1_a.bin",
            &plain_ctx(),
            Bytes::new(),
            &store,
        )
        .await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()["Cache-Control"], "public, max-age=3600");
        let etag = first.headers()["ETag"].to_str().unwrap().to_string();

        let ctx = RequestContext {
            content_type: None,
            if_none_match: Some(etag),
        };
        let second = dispatch(
            Route::Download("1_a.bin".to_string()),
            "/download/1_a.bin",
            &ctx,
            Bytes::new(),
            &store,
        )
        .await;
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_upload_list_download_delete_cycle() {
        let store = MemoryStore::new();

        // Upload report.pdf
        let body = encode_multipart(
            BOUNDARY,
            "file",
            Some("report.pdf"),
            "application/pdf",
            b"%PDF-1.4 payload",
        );
        let response = dispatch(Route::UploadSubmit, "/upload", &upload_ctx(), body, &store).await;
        assert_eq!(response.status(), StatusCode::OK);

        // The stored key is the epoch-millis prefix plus the original name
        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        let key = listed[0].key.clone();
        let (prefix, rest) = key.split_once('_').unwrap();
        assert!(!prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(rest, "report.pdf");

        // The listing shows the display name
        let page = dispatch(Route::Manager, "/", &plain_ctx(), Bytes::new(), &store).await;
        let html = String::from_utf8(body_bytes(page).await.to_vec()).unwrap();
        assert!(html.contains("report.pdf"));

        // Download returns the original bytes as an attachment
        let download = dispatch(
            Route::Download(key.clone()),
            &format!("/download/{key}"),
            &plain_ctx(),
            Bytes::new(),
            &store,
        )
        .await;
        assert_eq!(download.status(), StatusCode::OK);
        assert_eq!(download.headers()["Content-Type"], "application/pdf");
        assert!(download.headers()["Content-Disposition"]
            .to_str()
            .unwrap()
            .contains("report.pdf"));
        assert_eq!(
            body_bytes(download).await,
            Bytes::from_static(b"%PDF-1.4 payload")
        );

        // Delete removes it from the next listing
        let deleted = dispatch(
            Route::Delete(key.clone()),
            &format!("/delete/{key}"),
            &plain_ctx(),
            Bytes::new(),
            &store,
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::OK);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_body_size_guard() {
        let oversized = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header("content-length", "2048")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = check_body_size(&oversized, 1024).unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let within = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header("content-length", "512")
            .body(Full::new(Bytes::new()))
            .unwrap();
        assert!(check_body_size(&within, 1024).is_none());
    }
}
