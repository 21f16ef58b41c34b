//! Request handler module
//!
//! Resolves each request to a route, runs the matching storage operation,
//! and renders the HTML or byte-stream response.

pub mod pages;
pub mod router;
pub mod routes;
pub mod upload;

// Re-export main entry point
pub use router::handle_request;
