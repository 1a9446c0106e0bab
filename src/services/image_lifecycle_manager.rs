use futures::future::join_all;
use std::{collections::HashSet, sync::Arc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        errors::{FailedUpload, ImageError, StoreDeleteFailure, UploadFailure, ValidationError},
        models::{
            ImageFile, ImageRecord, ImageSetEntry, ImageState, Preview, PreviewRegistry,
            StagedImage,
        },
        value_objects::{ContentSignature, LocalImageId, StorageKey},
    },
    ports::storage::ObjectStore,
};

/// What happened to a batch of selected files
#[derive(Debug, Clone)]
pub struct SelectionReport {
    /// Ids of the images that were staged, in selection order
    pub staged: Vec<LocalImageId>,
    /// Files skipped because an identical image is already staged
    pub duplicates: usize,
    /// Files that are not acceptable images
    pub rejected: Vec<ValidationError>,
    /// The reported image set after the selection
    pub images: Vec<ImageSetEntry>,
}

/// Result of removing one staged image
#[derive(Debug, Clone)]
pub struct RemovalOutcome {
    pub images: Vec<ImageSetEntry>,
    /// Set when the stored object could not be deleted; the image is gone locally anyway
    pub warning: Option<StoreDeleteFailure>,
}

/// Keeps one draft's photos in sync between local selection, the object store
/// and the image records that will be persisted.
///
/// Every mutating operation publishes the reported set (uploaded images plus
/// pending ones) to subscribers. Operations take `&mut self`, so a draft's
/// image operations are serialized by construction.
pub struct ImageLifecycleManager {
    store: Arc<dyn ObjectStore>,
    previews: PreviewRegistry,
    images: Vec<StagedImage>,
    changes: watch::Sender<Vec<ImageSetEntry>>,
}

impl ImageLifecycleManager {
    pub fn new(store: Arc<dyn ObjectStore>, previews: PreviewRegistry) -> Self {
        let (changes, _) = watch::channel(Vec::new());
        Self {
            store,
            previews,
            images: Vec::new(),
            changes,
        }
    }

    /// Observe the reported image set; the current value is available immediately
    pub fn subscribe(&self) -> watch::Receiver<Vec<ImageSetEntry>> {
        self.changes.subscribe()
    }

    /// Current reported set: every staged image, tagged uploaded or pending
    pub fn images(&self) -> Vec<ImageSetEntry> {
        self.images.iter().map(StagedImage::entry).collect()
    }

    pub fn staged(&self) -> &[StagedImage] {
        &self.images
    }

    pub fn get(&self, id: LocalImageId) -> Option<&StagedImage> {
        self.images.iter().find(|image| image.id == id)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.images.iter().filter(|image| !image.is_uploaded()).count()
    }

    /// Records of every image that has been uploaded, in staging order
    pub fn uploaded_records(&self) -> Vec<ImageRecord> {
        self.images
            .iter()
            .filter_map(|image| image.record().cloned())
            .collect()
    }

    /// Load the images of a listing being edited.
    ///
    /// Records whose storage key is already staged are skipped, so calling this
    /// again with the same records changes nothing.
    pub fn seed(&mut self, existing: &[ImageRecord]) -> Vec<ImageSetEntry> {
        let mut known: HashSet<StorageKey> = self
            .images
            .iter()
            .filter_map(|image| image.record().map(|r| r.storage_id.clone()))
            .collect();

        let before = self.images.len();
        for record in existing {
            if known.insert(record.storage_id.clone()) {
                self.images.push(StagedImage::existing(record.clone()));
            }
        }

        let added = self.images.len() - before;
        if added > 0 {
            debug!(added, "Seeded existing images");
            self.publish();
        }

        self.images()
    }

    /// Stage newly selected files.
    ///
    /// Non-image files are rejected and files whose content matches an image
    /// already staged are skipped. Fails with
    /// [`ImageError::NoNewUniqueImages`] when a non-empty selection stages nothing.
    pub fn select(&mut self, files: Vec<ImageFile>) -> Result<SelectionReport, ImageError> {
        if files.is_empty() {
            return Ok(SelectionReport {
                staged: Vec::new(),
                duplicates: 0,
                rejected: Vec::new(),
                images: self.images(),
            });
        }

        let mut known: HashSet<ContentSignature> = self
            .images
            .iter()
            .filter_map(|image| image.signature.clone())
            .collect();

        let mut staged = Vec::new();
        let mut duplicates = 0;
        let mut rejected = Vec::new();

        for file in files {
            if let Err(e) = file.validate() {
                warn!(file = %file.name, "Rejected selected file: {}", e);
                rejected.push(e);
                continue;
            }

            let signature = file.signature();
            if !known.insert(signature.clone()) {
                debug!(file = %file.name, signature = %signature, "Skipping duplicate image");
                duplicates += 1;
                continue;
            }

            let preview = Preview::Local(self.previews.allocate(&file.content_type, file.bytes.clone()));
            let image = StagedImage::selected(file, signature, preview);
            staged.push(image.id);
            self.images.push(image);
        }

        if staged.is_empty() {
            return Err(ImageError::NoNewUniqueImages {
                duplicates,
                rejected,
            });
        }

        debug!(staged = staged.len(), duplicates, "Staged selected images");
        self.publish();

        Ok(SelectionReport {
            staged,
            duplicates,
            rejected,
            images: self.images(),
        })
    }

    /// Upload every image that is not uploaded yet, all at once.
    ///
    /// Each attempt gets a fresh storage key. When some uploads fail, the ones
    /// that succeeded stay uploaded and the failed ones keep their bytes, so the
    /// next flush only re-sends the failures. On success, returns the records of
    /// all staged images.
    pub async fn flush(&mut self) -> Result<Vec<ImageRecord>, UploadFailure> {
        let mut jobs = Vec::new();
        for image in self.images.iter_mut() {
            if !image.state.needs_upload() {
                continue;
            }
            if let Some(file) = image.state.file().cloned() {
                image.state = ImageState::Uploading { file: file.clone() };
                jobs.push((image.id, file));
            }
        }

        if jobs.is_empty() {
            debug!("No pending images to upload");
            return Ok(self.uploaded_records());
        }

        info!(count = jobs.len(), "Uploading staged images");

        let uploads = jobs.into_iter().map(|(id, file)| {
            let store = Arc::clone(&self.store);
            async move {
                let key = StorageKey::generate(&file.name, &file.content_type);
                let result = store
                    .upload(&key, file.bytes.clone(), Some(&file.content_type))
                    .await;
                (id, file, key, result)
            }
        });
        let results = join_all(uploads).await;

        let mut failed = Vec::new();
        let mut uploaded = 0;
        for (id, file, key, result) in results {
            let Some(image) = self.images.iter_mut().find(|image| image.id == id) else {
                continue;
            };

            match result {
                Ok(image_url) => {
                    debug!(file = %file.name, key = %key, "Image uploaded");
                    image.state = ImageState::Uploaded {
                        record: ImageRecord {
                            image_url,
                            storage_id: key,
                        },
                    };
                    uploaded += 1;
                }
                Err(e) => {
                    warn!(file = %file.name, key = %key, "Image upload failed: {}", e);
                    let reason = e.to_string();
                    failed.push(FailedUpload {
                        local_id: id,
                        file_name: file.name.clone(),
                        reason: reason.clone(),
                    });
                    image.state = ImageState::Failed { file, reason };
                }
            }
        }

        self.publish();

        if !failed.is_empty() {
            return Err(UploadFailure { failed, uploaded });
        }

        info!(uploaded, "All staged images uploaded");
        Ok(self.uploaded_records())
    }

    /// Drop a staged image, deleting it from the store if it was uploaded.
    ///
    /// The image leaves the local set even when the store delete fails; the
    /// failure comes back as a warning.
    pub async fn remove(&mut self, id: LocalImageId) -> Result<RemovalOutcome, ImageError> {
        let index = self
            .images
            .iter()
            .position(|image| image.id == id)
            .ok_or(ImageError::ImageNotFound(id))?;

        let image = self.images.remove(index);
        self.publish();

        let mut warning = None;
        if let Some(record) = image.record() {
            let key = record.storage_id.clone();
            match self.store.delete(std::slice::from_ref(&key)).await {
                Ok(()) => info!(key = %key, "Deleted image from storage"),
                Err(e) => {
                    warn!(key = %key, "Failed to delete image from storage: {}", e);
                    warning = Some(StoreDeleteFailure { key, source: e });
                }
            }
        }

        Ok(RemovalOutcome {
            images: self.images(),
            warning,
        })
    }

    /// Forget every staged image and release their previews
    pub fn reset(&mut self) {
        if self.images.is_empty() {
            return;
        }
        debug!(count = self.images.len(), "Resetting staged images");
        self.images.clear();
        self.publish();
    }

    fn publish(&self) {
        self.changes.send_replace(self.images());
    }
}

impl std::fmt::Debug for ImageLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLifecycleManager")
            .field("images", &self.images)
            .finish()
    }
}
