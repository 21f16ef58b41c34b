//! Object storage layer
//!
//! Defines the backend contract ([`ObjectStore`]) the request handlers are
//! written against, plus the two concrete backends: a directory on local
//! disk and an in-memory store. The handlers never cache objects between
//! requests; the store is the sole source of truth.

pub mod fs;
pub mod keys;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use thiserror::Error;

pub use fs::FsStore;
pub use memory::MemoryStore;

/// Storage backend failure. The message is surfaced verbatim in the 500
/// response body.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("invalid object key: {0}")]
    InvalidKey(String),
}

/// One object as seen by a listing call. Metadata only, no payload.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Backend-unique key addressing the object.
    pub key: String,
    /// Payload size in bytes.
    pub size: u64,
    /// Upload timestamp.
    pub uploaded: DateTime<Utc>,
    /// Content type recorded for the object, if any.
    pub content_type: Option<String>,
}

/// One object as returned by a fetch call, payload included.
#[derive(Debug, Clone)]
pub struct FetchedObject {
    pub body: Bytes,
    pub size: u64,
    pub content_type: Option<String>,
}

/// Backend contract: list/get/put/delete over opaque keys.
///
/// Every operation is a single independent call; there are no transactions
/// and no retries at this layer. Implementations must be safe to share
/// across request tasks.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Enumerate all stored objects. The returned order is whatever the
    /// backend produces and is not guaranteed stable across calls.
    async fn list(&self) -> Result<Vec<StoredObject>, StorageError>;

    /// Fetch one object. `Ok(None)` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<FetchedObject>, StorageError>;

    /// Store a payload under `key`, overwriting any existing object.
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Remove one object. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
