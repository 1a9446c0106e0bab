use chrono::{Datelike, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::{
    domain::{
        errors::{DraftError, FieldErrors, ImageError, PersistenceError, ValidationError},
        models::{
            Features, ImageFile, ImageRecord, ListingField, ListingFields, ListingUpdate,
            ListingWithImages, NewImageRecord, NewListing, OwnerIdentity, StoredImage,
            IMAGES_FIELD,
        },
        value_objects::{ListingId, LocalImageId},
    },
    ports::repositories::ListingRepository,
    services::image_lifecycle_manager::{ImageLifecycleManager, RemovalOutcome, SelectionReport},
};

/// Whether submitting creates a new listing or updates an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    Create,
    Edit { listing_id: ListingId },
}

impl DraftMode {
    pub fn listing_id(&self) -> Option<ListingId> {
        match self {
            DraftMode::Create => None,
            DraftMode::Edit { listing_id } => Some(*listing_id),
        }
    }
}

/// Result of a successful submit
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub listing_id: ListingId,
    /// True when this submit inserted the listing row
    pub created: bool,
    pub images: Vec<StoredImage>,
}

/// The editable state of one listing form: field values, feature flags, the
/// current validation errors and the photos being managed.
pub struct ListingDraft {
    owner: OwnerIdentity,
    mode: DraftMode,
    fields: ListingFields,
    features: Features,
    errors: FieldErrors,
    images: ImageLifecycleManager,
    repository: Arc<dyn ListingRepository>,
    /// Listing row written by a submit whose image step failed
    unsaved_images: Option<ListingId>,
}

impl ListingDraft {
    /// An empty draft that will create a new listing
    pub fn create(
        owner: OwnerIdentity,
        repository: Arc<dyn ListingRepository>,
        images: ImageLifecycleManager,
    ) -> Self {
        Self {
            owner,
            mode: DraftMode::Create,
            fields: ListingFields::new(),
            features: Features::new(),
            errors: FieldErrors::new(),
            images,
            repository,
            unsaved_images: None,
        }
    }

    /// A draft pre-filled from an existing listing, with its images seeded as uploaded
    pub fn edit(
        owner: OwnerIdentity,
        existing: ListingWithImages,
        repository: Arc<dyn ListingRepository>,
        mut images: ImageLifecycleManager,
    ) -> Self {
        let records: Vec<ImageRecord> = existing
            .images
            .iter()
            .map(|image| image.record.clone())
            .collect();
        images.seed(&records);

        Self {
            owner,
            mode: DraftMode::Edit {
                listing_id: existing.listing.id,
            },
            fields: existing.listing.fields,
            features: existing.listing.features,
            errors: FieldErrors::new(),
            images,
            repository,
            unsaved_images: None,
        }
    }

    pub fn mode(&self) -> DraftMode {
        self.mode
    }

    pub fn owner(&self) -> &OwnerIdentity {
        &self.owner
    }

    pub fn fields(&self) -> &ListingFields {
        &self.fields
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    /// Errors from the last validation, minus fields edited since
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn images(&self) -> &ImageLifecycleManager {
        &self.images
    }

    /// Listing whose image rows still need to be written, if any
    pub fn unsaved_images(&self) -> Option<ListingId> {
        self.unsaved_images
    }

    /// Set a field by name and clear its error
    pub fn update_field(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let field: ListingField = name.parse()?;
        self.set_field(field, value);
        Ok(())
    }

    pub fn set_field(&mut self, field: ListingField, value: impl Into<String>) {
        self.fields.set(field, value);
        self.errors.remove(field.as_str());
    }

    pub fn set_feature(&mut self, name: impl Into<String>, enabled: bool) {
        self.features.set(name, enabled);
    }

    /// Validate against the current year without touching the stored errors
    pub fn validate(&self) -> FieldErrors {
        self.validate_for_year(Utc::now().year())
    }

    pub fn validate_for_year(&self, current_year: i32) -> FieldErrors {
        self.fields.validate(self.images.len(), current_year)
    }

    pub fn select_images(&mut self, files: Vec<ImageFile>) -> Result<SelectionReport, ImageError> {
        let report = self.images.select(files)?;
        if !self.images.is_empty() {
            self.errors.remove(IMAGES_FIELD);
        }
        Ok(report)
    }

    pub async fn remove_image(&mut self, id: LocalImageId) -> Result<RemovalOutcome, ImageError> {
        self.images.remove(id).await
    }

    /// Upload pending images without submitting
    pub async fn flush_images(&mut self) -> Result<Vec<ImageRecord>, DraftError> {
        Ok(self.images.flush().await?)
    }

    /// Validate, upload, then write the listing and its image rows.
    ///
    /// Stops at the first failing step. If the listing row was written but the
    /// image rows were not, the draft switches to editing that listing and
    /// [`ListingDraft::retry_image_persistence`] finishes the job. On success the
    /// draft is cleared.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, DraftError> {
        let errors = self.validate();
        if !errors.is_empty() {
            debug!(errors = errors.len(), "Draft failed validation");
            self.errors = errors.clone();
            return Err(DraftError::Validation(errors));
        }
        self.errors = FieldErrors::new();

        let records = self.images.flush().await?;
        let today = Utc::now().date_naive();

        let (listing_id, created) = match self.mode {
            DraftMode::Create => {
                let listing_id = self
                    .repository
                    .insert_listing(&NewListing {
                        fields: self.fields.clone(),
                        features: self.features.clone(),
                        created_by: self.owner.email().to_string(),
                        posted_on: today,
                    })
                    .await
                    .map_err(|e| {
                        error!("Failed to insert listing: {}", e);
                        DraftError::Persistence(e)
                    })?;
                info!(listing_id = %listing_id, owner = %self.owner, "Listing created");
                self.mode = DraftMode::Edit { listing_id };
                (listing_id, true)
            }
            DraftMode::Edit { listing_id } => {
                self.write_update(listing_id, today).await?;
                (listing_id, false)
            }
        };

        let images = self.persist_images(listing_id, &records).await?;
        self.finish();

        Ok(SubmitOutcome {
            listing_id,
            created,
            images,
        })
    }

    /// Re-run only the image-row step of a submit that partially failed
    pub async fn retry_image_persistence(&mut self) -> Result<SubmitOutcome, DraftError> {
        let listing_id = self.unsaved_images.ok_or(DraftError::NothingToRetry)?;

        if self.images.is_empty() {
            let mut errors = FieldErrors::new();
            errors.insert(IMAGES_FIELD, "At least one image is required");
            self.errors.insert(IMAGES_FIELD, "At least one image is required");
            return Err(DraftError::Validation(errors));
        }

        let records = self.images.flush().await?;
        let images = self.persist_images(listing_id, &records).await?;
        self.finish();

        Ok(SubmitOutcome {
            listing_id,
            created: false,
            images,
        })
    }

    /// Clear the form, release every staged image and forget any unsaved image rows
    pub fn reset(&mut self) {
        self.unsaved_images = None;
        self.fields.clear();
        self.features.clear();
        self.errors = FieldErrors::new();
        self.images.reset();
    }

    async fn write_update(
        &self,
        listing_id: ListingId,
        today: NaiveDate,
    ) -> Result<(), DraftError> {
        self.repository
            .update_listing(
                listing_id,
                &ListingUpdate {
                    fields: self.fields.clone(),
                    features: self.features.clone(),
                    updated_by: self.owner.email().to_string(),
                    updated_on: today,
                },
            )
            .await
            .map_err(|e| {
                error!(listing_id = %listing_id, "Failed to update listing: {}", e);
                DraftError::Persistence(e)
            })?;
        info!(listing_id = %listing_id, owner = %self.owner, "Listing updated");
        Ok(())
    }

    async fn persist_images(
        &mut self,
        listing_id: ListingId,
        records: &[ImageRecord],
    ) -> Result<Vec<StoredImage>, DraftError> {
        match self.write_image_rows(listing_id, records).await {
            Ok(stored) => {
                self.unsaved_images = None;
                debug!(listing_id = %listing_id, images = stored.len(), "Image rows written");
                Ok(stored)
            }
            Err(source) => {
                warn!(listing_id = %listing_id, "Listing saved without its images: {}", source);
                self.unsaved_images = Some(listing_id);
                self.mode = DraftMode::Edit { listing_id };
                Err(DraftError::PartialPersistence { listing_id, source })
            }
        }
    }

    async fn write_image_rows(
        &self,
        listing_id: ListingId,
        records: &[ImageRecord],
    ) -> Result<Vec<StoredImage>, PersistenceError> {
        self.repository.delete_images_for_listing(listing_id).await?;

        let mut stored = Vec::with_capacity(records.len());
        for record in records {
            let row = NewImageRecord::for_listing(record, listing_id);
            stored.push(self.repository.insert_image_record(&row).await?);
        }
        Ok(stored)
    }

    /// End of a successful submit: the next submit starts a new listing
    fn finish(&mut self) {
        self.mode = DraftMode::Create;
        self.reset();
    }
}

impl std::fmt::Debug for ListingDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingDraft")
            .field("owner", &self.owner)
            .field("mode", &self.mode)
            .field("fields", &self.fields)
            .field("errors", &self.errors)
            .field("images", &self.images.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::outbound::{
            persistence::InMemoryListingRepository, storage::ApacheObjectStoreAdapter,
        },
        domain::models::PreviewRegistry,
    };
    use bytes::Bytes;
    use object_store::memory::InMemory;

    fn draft() -> (ListingDraft, Arc<InMemoryListingRepository>) {
        let repository = Arc::new(InMemoryListingRepository::new());
        let store = Arc::new(ApacheObjectStoreAdapter::new(
            Arc::new(InMemory::new()),
            "https://cdn.example",
        ));
        let images = ImageLifecycleManager::new(store, PreviewRegistry::new());
        let owner = OwnerIdentity::new("seller@example.com").unwrap();
        (
            ListingDraft::create(owner, repository.clone(), images),
            repository,
        )
    }

    fn fill_required(draft: &mut ListingDraft) {
        for field in ListingField::ALL.iter().filter(|f| f.is_required()) {
            let value = match field {
                ListingField::Year => "2020",
                ListingField::SellingPrice => "18500",
                _ => "value",
            };
            draft.set_field(*field, value);
        }
    }

    #[test]
    fn test_update_field_clears_its_error_only() {
        let (mut draft, _) = draft();
        draft.errors.insert("make", "This field is required");
        draft.errors.insert("model", "This field is required");

        draft.update_field("make", "Volvo").unwrap();

        assert!(!draft.errors().contains("make"));
        assert!(draft.errors().contains("model"));
        assert_eq!(draft.fields().get(ListingField::Make), Some("Volvo"));
    }

    #[test]
    fn test_update_unknown_field_is_rejected() {
        let (mut draft, _) = draft();
        assert!(draft.update_field("wings", "2").is_err());
    }

    #[tokio::test]
    async fn test_submit_invalid_draft_keeps_errors_and_writes_nothing() {
        let (mut draft, repository) = draft();

        let err = draft.submit().await.unwrap_err();

        assert!(matches!(err, DraftError::Validation(_)));
        assert!(draft.errors().contains(IMAGES_FIELD));
        assert_eq!(repository.listing_count().await, 0);
    }

    #[tokio::test]
    async fn test_submit_creates_listing_and_resets() {
        let (mut draft, repository) = draft();
        fill_required(&mut draft);
        draft.set_feature("sunroof", true);
        draft
            .select_images(vec![ImageFile::new(
                "front.jpg",
                "image/jpeg",
                Bytes::from_static(b"front"),
            )])
            .unwrap();

        let outcome = draft.submit().await.unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.images.len(), 1);
        assert_eq!(repository.listing_count().await, 1);
        assert!(draft.fields().is_empty());
        assert!(draft.images().is_empty());
    }

    #[tokio::test]
    async fn test_second_submit_on_same_draft_creates_another_listing() {
        let (mut draft, repository) = draft();
        fill_required(&mut draft);
        draft
            .select_images(vec![ImageFile::new(
                "first.jpg",
                "image/jpeg",
                Bytes::from_static(b"first"),
            )])
            .unwrap();
        let first = draft.submit().await.unwrap();
        assert_eq!(draft.mode(), DraftMode::Create);

        fill_required(&mut draft);
        draft.set_field(ListingField::Make, "SecondCar");
        draft
            .select_images(vec![ImageFile::new(
                "second.jpg",
                "image/jpeg",
                Bytes::from_static(b"second"),
            )])
            .unwrap();
        let second = draft.submit().await.unwrap();

        assert!(second.created);
        assert_ne!(second.listing_id, first.listing_id);
        assert_eq!(repository.listing_count().await, 2);
        let untouched = repository.listing(first.listing_id).await.unwrap();
        assert_eq!(untouched.fields.get(ListingField::Make), Some("value"));
    }

    #[tokio::test]
    async fn test_retry_without_partial_failure() {
        let (mut draft, _) = draft();
        let result = draft.retry_image_persistence().await;
        assert!(matches!(result, Err(DraftError::NothingToRetry)));
    }
}
