//! Filesystem-backed object store
//!
//! Stores each object as a plain file inside a data directory: the storage
//! key is the file name. Size and upload time come from file metadata; the
//! content type is recovered from the key's extension on read, so nothing
//! beyond the payload needs to be persisted.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use tokio::fs;

use super::{FetchedObject, ObjectStore, StorageError, StoredObject};
use crate::http::mime;

pub struct FsStore {
    data_dir: PathBuf,
}

impl FsStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).await?;
        Ok(Self { data_dir })
    }

    /// Map a key to its on-disk path.
    ///
    /// Keys are file names, so path separators and `..` cannot address an
    /// object here. Such keys simply do not exist in this backend.
    fn object_path(&self, key: &str) -> Option<PathBuf> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return None;
        }
        Some(self.data_dir.join(key))
    }

    fn guess_content_type(key: &str) -> Option<String> {
        let extension = Path::new(key).extension().and_then(|e| e.to_str());
        Some(mime::get_content_type(extension).to_string())
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn list(&self) -> Result<Vec<StoredObject>, StorageError> {
        let mut objects = Vec::new();
        let mut entries = fs::read_dir(&self.data_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let Ok(key) = entry.file_name().into_string() else {
                // Non-UTF-8 file names cannot round-trip through a URL path.
                continue;
            };
            objects.push(StoredObject {
                size: metadata.len(),
                uploaded: DateTime::<Utc>::from(metadata.modified()?),
                content_type: Self::guess_content_type(&key),
                key,
            });
        }

        Ok(objects)
    }

    async fn get(&self, key: &str) -> Result<Option<FetchedObject>, StorageError> {
        let Some(path) = self.object_path(key) else {
            return Ok(None);
        };

        match fs::read(&path).await {
            Ok(data) => Ok(Some(FetchedObject {
                size: data.len() as u64,
                body: Bytes::from(data),
                content_type: Self::guess_content_type(key),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(
        &self,
        key: &str,
        data: Bytes,
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let path = self
            .object_path(key)
            .ok_or_else(|| StorageError::InvalidKey(key.to_string()))?;
        fs::write(&path, &data).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let Some(path) = self.object_path(key) else {
            return Ok(());
        };

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_scratch_store(test_name: &str) -> FsStore {
        let dir = std::env::temp_dir().join(format!(
            "rust_filemanager_{}_{test_name}",
            std::process::id()
        ));
        // A previous failed run may have left objects behind.
        let _ = fs::remove_dir_all(&dir).await;
        FsStore::open(dir).await.unwrap()
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = open_scratch_store("roundtrip").await;

        store
            .put("1700000000000_a.txt", Bytes::from_static(b"hello"), None)
            .await
            .unwrap();

        let fetched = store.get("1700000000000_a.txt").await.unwrap().unwrap();
        assert_eq!(fetched.body, Bytes::from_static(b"hello"));
        assert_eq!(fetched.size, 5);
        assert_eq!(
            fetched.content_type.as_deref(),
            Some("text/plain; charset=utf-8")
        );

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].key, "1700000000000_a.txt");
        assert_eq!(listed[0].size, 5);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = open_scratch_store("get_missing").await;
        assert!(store.get("nope.bin").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = open_scratch_store("delete").await;

        store
            .put("doomed.txt", Bytes::from_static(b"x"), None)
            .await
            .unwrap();
        store.delete("doomed.txt").await.unwrap();
        store.delete("doomed.txt").await.unwrap();

        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_traversal_keys_do_not_resolve() {
        let store = open_scratch_store("traversal").await;

        assert!(store.get("../escape.txt").await.unwrap().is_none());
        store.delete("../escape.txt").await.unwrap();
        assert!(store
            .put("../escape.txt", Bytes::from_static(b"x"), None)
            .await
            .is_err());
    }
}
