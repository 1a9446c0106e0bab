use thiserror::Error;

use crate::domain::{
    errors::{FieldErrors, PersistenceError, StorageError, ValidationError},
    value_objects::{ListingId, LocalImageId, StorageKey},
};

/// One image that could not be uploaded during a flush
#[derive(Debug, Clone)]
pub struct FailedUpload {
    pub local_id: LocalImageId,
    pub file_name: String,
    pub reason: String,
}

/// At least one staged image failed to upload.
///
/// Siblings that succeeded stay uploaded, so a retry only re-sends the
/// images listed here.
#[derive(Debug, Clone)]
pub struct UploadFailure {
    pub failed: Vec<FailedUpload>,
    /// Number of images uploaded successfully in the same flush
    pub uploaded: usize,
}

impl std::fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Failed to upload {} of {} image(s). Please try again.",
            self.failed.len(),
            self.failed.len() + self.uploaded
        )?;
        for failed in &self.failed {
            write!(f, " [{}: {}]", failed.file_name, failed.reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for UploadFailure {}

/// A best-effort store delete that did not go through.
///
/// Local state has already moved on; the object may be orphaned in the bucket.
#[derive(Debug, Clone, Error)]
#[error("Failed to delete '{key}' from storage: {source}")]
pub struct StoreDeleteFailure {
    pub key: StorageKey,
    pub source: StorageError,
}

/// Errors from the image lifecycle manager
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    /// Every selected file was a duplicate or was rejected
    #[error("No new unique images were selected ({duplicates} duplicate(s))")]
    NoNewUniqueImages {
        duplicates: usize,
        rejected: Vec<ValidationError>,
    },

    #[error("Image not found in draft: {0}")]
    ImageNotFound(LocalImageId),

    #[error(transparent)]
    Upload(#[from] UploadFailure),
}

/// Errors surfaced by listing draft operations
#[derive(Debug, Clone, Error)]
pub enum DraftError {
    #[error("Listing is not valid: {0}")]
    Validation(FieldErrors),

    #[error(transparent)]
    InvalidInput(#[from] ValidationError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Upload(#[from] UploadFailure),

    /// Nothing was written (or only the first write failed)
    #[error("Failed to save listing: {0}")]
    Persistence(PersistenceError),

    /// The listing row was written but its images were not
    #[error("Listing {listing_id} was saved but its images were not: {source}")]
    PartialPersistence {
        listing_id: ListingId,
        source: PersistenceError,
    },

    #[error("No listing was saved yet; nothing to retry")]
    NothingToRetry,
}

/// Errors from listing-level service operations
#[derive(Debug, Clone, Error)]
pub enum ListingError {
    #[error("Listing not found: {0}")]
    NotFound(ListingId),

    #[error("Listing {listing_id} is not owned by {owner}")]
    NotOwner { listing_id: ListingId, owner: String },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<PersistenceError> for DraftError {
    fn from(err: PersistenceError) -> Self {
        DraftError::Persistence(err)
    }
}
