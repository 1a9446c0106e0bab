use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::domain::{
    errors::ValidationError,
    models::preview::Preview,
    value_objects::{ContentSignature, ListingId, LocalImageId, StorageKey},
};

/// A stored image as the listing knows it: where to fetch it and how to delete it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub image_url: String,
    pub storage_id: StorageKey,
}

/// An image row to insert for a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImageRecord {
    pub image_url: String,
    pub storage_id: StorageKey,
    pub listing_id: ListingId,
}

impl NewImageRecord {
    pub fn for_listing(record: &ImageRecord, listing_id: ListingId) -> Self {
        Self {
            image_url: record.image_url.clone(),
            storage_id: record.storage_id.clone(),
            listing_id,
        }
    }
}

/// A persisted image row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub id: i64,
    pub listing_id: ListingId,
    #[serde(flatten)]
    pub record: ImageRecord,
}

/// A file the user picked for upload
#[derive(Clone)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Only non-empty `image/*` files can be staged
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.content_type.to_ascii_lowercase().starts_with("image/") {
            return Err(ValidationError::NotAnImage {
                file_name: self.name.clone(),
                content_type: self.content_type.clone(),
            });
        }

        if self.bytes.is_empty() {
            return Err(ValidationError::EmptyFile {
                file_name: self.name.clone(),
            });
        }

        Ok(())
    }

    pub fn signature(&self) -> ContentSignature {
        ContentSignature::compute(&self.bytes)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Where a staged image is in its upload lifecycle
#[derive(Debug, Clone)]
pub enum ImageState {
    /// Selected locally, never sent
    Staged { file: ImageFile },
    /// Handed to the object store in the current flush
    Uploading { file: ImageFile },
    /// Stored remotely
    Uploaded { record: ImageRecord },
    /// Last upload attempt failed; bytes kept for the retry
    Failed { file: ImageFile, reason: String },
}

impl ImageState {
    pub fn needs_upload(&self) -> bool {
        !matches!(self, ImageState::Uploaded { .. })
    }

    pub fn file(&self) -> Option<&ImageFile> {
        match self {
            ImageState::Staged { file }
            | ImageState::Uploading { file }
            | ImageState::Failed { file, .. } => Some(file),
            ImageState::Uploaded { .. } => None,
        }
    }

    pub fn record(&self) -> Option<&ImageRecord> {
        match self {
            ImageState::Uploaded { record } => Some(record),
            _ => None,
        }
    }
}

/// One image held in a draft's local state
#[derive(Debug)]
pub struct StagedImage {
    pub id: LocalImageId,
    pub file_name: String,
    /// Content digest; absent for images loaded from an existing listing
    pub signature: Option<ContentSignature>,
    pub preview: Preview,
    pub state: ImageState,
}

impl StagedImage {
    /// Stage a freshly selected file
    pub fn selected(file: ImageFile, signature: ContentSignature, preview: Preview) -> Self {
        Self {
            id: LocalImageId::generate(),
            file_name: file.name.clone(),
            signature: Some(signature),
            preview,
            state: ImageState::Staged { file },
        }
    }

    /// Stage an image that already lives in the store
    pub fn existing(record: ImageRecord) -> Self {
        Self {
            id: LocalImageId::generate(),
            file_name: record.storage_id.file_name().to_string(),
            signature: None,
            preview: Preview::Remote(record.image_url.clone()),
            state: ImageState::Uploaded { record },
        }
    }

    pub fn is_uploaded(&self) -> bool {
        !self.state.needs_upload()
    }

    pub fn record(&self) -> Option<&ImageRecord> {
        self.state.record()
    }

    pub fn entry(&self) -> ImageSetEntry {
        match &self.state {
            ImageState::Uploaded { record } => ImageSetEntry::Uploaded {
                local_id: self.id,
                record: record.clone(),
            },
            ImageState::Failed { reason, .. } => ImageSetEntry::Pending {
                local_id: self.id,
                file_name: self.file_name.clone(),
                last_error: Some(reason.clone()),
            },
            _ => ImageSetEntry::Pending {
                local_id: self.id,
                file_name: self.file_name.clone(),
                last_error: None,
            },
        }
    }
}

/// An image as reported to the draft: either persistable or still pending upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSetEntry {
    Uploaded {
        local_id: LocalImageId,
        record: ImageRecord,
    },
    Pending {
        local_id: LocalImageId,
        file_name: String,
        last_error: Option<String>,
    },
}

impl ImageSetEntry {
    pub fn local_id(&self) -> LocalImageId {
        match self {
            ImageSetEntry::Uploaded { local_id, .. } | ImageSetEntry::Pending { local_id, .. } => {
                *local_id
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ImageSetEntry::Pending { .. })
    }

    pub fn record(&self) -> Option<&ImageRecord> {
        match self {
            ImageSetEntry::Uploaded { record, .. } => Some(record),
            ImageSetEntry::Pending { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content_type: &str, data: &'static [u8]) -> ImageFile {
        ImageFile::new(name, content_type, Bytes::from_static(data))
    }

    #[test]
    fn test_only_images_are_accepted() {
        assert!(file("a.jpg", "image/jpeg", b"x").validate().is_ok());
        assert!(file("a.PNG", "IMAGE/PNG", b"x").validate().is_ok());
        assert!(matches!(
            file("a.pdf", "application/pdf", b"x").validate(),
            Err(ValidationError::NotAnImage { .. })
        ));
        assert!(matches!(
            file("a.jpg", "image/jpeg", b"").validate(),
            Err(ValidationError::EmptyFile { .. })
        ));
    }

    #[test]
    fn test_existing_image_is_uploaded_with_remote_preview() {
        let record = ImageRecord {
            image_url: "https://cdn.example/car-images/a.jpg".to_string(),
            storage_id: StorageKey::new("car-images/a.jpg".to_string()).unwrap(),
        };
        let staged = StagedImage::existing(record.clone());

        assert!(staged.is_uploaded());
        assert_eq!(staged.record(), Some(&record));
        assert_eq!(staged.preview.remote_url(), Some(record.image_url.as_str()));
        assert_eq!(staged.file_name, "a.jpg");
        assert!(!staged.entry().is_pending());
    }
}
