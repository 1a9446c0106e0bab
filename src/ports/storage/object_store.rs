use crate::domain::{errors::StorageResult, value_objects::StorageKey};
use async_trait::async_trait;
use bytes::Bytes;

/// Port for the bucket that holds listing photos.
/// This abstracts the actual storage backend (S3, MinIO, in-memory)
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Store an image under `key`; returns its public URL.
    /// Never overwrites an existing object.
    async fn upload(
        &self,
        key: &StorageKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<String>;

    /// Delete objects; keys that are already gone are not an error
    async fn delete(&self, keys: &[StorageKey]) -> StorageResult<()>;

    /// Public retrieval URL for a key (derived, no I/O)
    fn public_url(&self, key: &StorageKey) -> String;
}
