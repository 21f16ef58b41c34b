//! In-memory object store
//!
//! Keeps objects in a `RwLock<HashMap>`. Used for ephemeral runs (nothing
//! survives a restart) and as the backend in handler tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use tokio::sync::RwLock;

use super::{FetchedObject, ObjectStore, StorageError, StoredObject};

#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, MemoryObject>>,
}

struct MemoryObject {
    data: Bytes,
    uploaded: DateTime<Utc>,
    content_type: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self) -> Result<Vec<StoredObject>, StorageError> {
        let objects = self.objects.read().await;
        Ok(objects
            .iter()
            .map(|(key, object)| StoredObject {
                key: key.clone(),
                size: object.data.len() as u64,
                uploaded: object.uploaded,
                content_type: object.content_type.clone(),
            })
            .collect())
    }

    async fn get(&self, key: &str) -> Result<Option<FetchedObject>, StorageError> {
        let objects = self.objects.read().await;
        Ok(objects.get(key).map(|object| FetchedObject {
            body: object.data.clone(),
            size: object.data.len() as u64,
            content_type: object.content_type.clone(),
        }))
    }

    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let mut objects = self.objects.write().await;
        objects.insert(
            key.to_string(),
            MemoryObject {
                data,
                uploaded: Utc::now(),
                content_type: content_type.map(ToString::to_string),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut objects = self.objects.write().await;
        objects.remove(key);
        Ok(())
    }
}
