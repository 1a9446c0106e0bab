use async_trait::async_trait;
use bytes::Bytes;
use object_store::{
    path::Path as ObjectPath, Attribute, Attributes, ObjectStore as ApacheObjectStore, PutMode,
    PutOptions, PutPayload,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        value_objects::StorageKey,
    },
    ports::storage::ObjectStore,
};

/// Adapter that implements our ObjectStore trait using Apache object_store
pub struct ApacheObjectStoreAdapter {
    inner: Arc<dyn ApacheObjectStore>,
    public_base_url: String,
}

impl ApacheObjectStoreAdapter {
    /// `public_base_url` is the prefix under which stored keys are publicly readable
    pub fn new(store: Arc<dyn ApacheObjectStore>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            inner: store,
            public_base_url,
        }
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }
}

#[async_trait]
impl ObjectStore for ApacheObjectStoreAdapter {
    async fn upload(
        &self,
        key: &StorageKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<String> {
        let path = ObjectPath::from(key.as_str());
        let size = data.len();

        let mut attributes = Attributes::new();
        if let Some(content_type) = content_type {
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
        }

        let mut opts = PutOptions::default();
        opts.mode = PutMode::Create;
        opts.attributes = attributes;

        self.inner
            .put_opts(&path, PutPayload::from(data), opts)
            .await
            .map_err(StorageError::from)?;

        debug!(key = %key, size, "Stored object");
        Ok(self.public_url(key))
    }

    async fn delete(&self, keys: &[StorageKey]) -> StorageResult<()> {
        let mut first_error = None;

        for key in keys {
            let path = ObjectPath::from(key.as_str());
            match self.inner.delete(&path).await {
                Ok(()) => debug!(key = %key, "Deleted object"),
                Err(object_store::Error::NotFound { .. }) => {
                    debug!(key = %key, "Object already absent")
                }
                Err(e) => {
                    warn!(key = %key, "Failed to delete object: {}", e);
                    first_error.get_or_insert(StorageError::from(e));
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn public_url(&self, key: &StorageKey) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}
