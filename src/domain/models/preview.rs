use bytes::Bytes;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use uuid::Uuid;

/// Bytes kept alive for a local preview of a selected file
#[derive(Debug, Clone)]
pub struct PreviewData {
    pub content_type: String,
    pub bytes: Bytes,
}

/// Shared table of live preview handles.
///
/// Every [`PreviewHandle`] it hands out removes its own entry when dropped,
/// so an entry is released exactly once no matter which path drops the image.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    entries: Arc<Mutex<HashMap<Uuid, PreviewData>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register preview bytes and return the handle that owns them
    pub fn allocate(&self, content_type: &str, bytes: Bytes) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.lock().insert(
            id,
            PreviewData {
                content_type: content_type.to_string(),
                bytes,
            },
        );

        PreviewHandle {
            id,
            registry: self.clone(),
        }
    }

    /// Look up a live preview
    pub fn get(&self, id: &Uuid) -> Option<PreviewData> {
        self.lock().get(id).cloned()
    }

    /// Number of handles not yet released
    pub fn outstanding(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, id: &Uuid) {
        self.lock().remove(id);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, PreviewData>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for PreviewRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewRegistry")
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

/// Owning handle to one registered preview
pub struct PreviewHandle {
    id: Uuid,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(&self.id);
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PreviewHandle").field(&self.id).finish()
    }
}

/// What a staged image is displayed from
#[derive(Debug)]
pub enum Preview {
    /// Bytes of a file selected in this session
    Local(PreviewHandle),
    /// Public URL of an image that was already stored
    Remote(String),
}

impl Preview {
    pub fn local_id(&self) -> Option<Uuid> {
        match self {
            Preview::Local(handle) => Some(handle.id()),
            Preview::Remote(_) => None,
        }
    }

    pub fn remote_url(&self) -> Option<&str> {
        match self {
            Preview::Local(_) => None,
            Preview::Remote(url) => Some(url),
        }
    }
}
