use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    domain::{
        errors::{ListingError, StoreDeleteFailure},
        models::{ListingWithImages, OwnerIdentity, PreviewRegistry},
        value_objects::{ListingId, StorageKey},
    },
    ports::{
        repositories::ListingRepository,
        services::{DeleteListingOutcome, ListingService},
        storage::ObjectStore,
    },
    services::{image_lifecycle_manager::ImageLifecycleManager, listing_draft::ListingDraft},
};

/// Implementation of ListingService over a repository and an object store
#[derive(Clone)]
pub struct ListingServiceImpl {
    repository: Arc<dyn ListingRepository>,
    store: Arc<dyn ObjectStore>,
    previews: PreviewRegistry,
}

impl ListingServiceImpl {
    pub fn new(
        repository: Arc<dyn ListingRepository>,
        store: Arc<dyn ObjectStore>,
        previews: PreviewRegistry,
    ) -> Self {
        Self {
            repository,
            store,
            previews,
        }
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    fn image_manager(&self) -> ImageLifecycleManager {
        ImageLifecycleManager::new(Arc::clone(&self.store), self.previews.clone())
    }

    fn check_owner(listing: &ListingWithImages, owner: &OwnerIdentity) -> Result<(), ListingError> {
        if listing.listing.created_by != owner.email() {
            warn!(
                listing_id = %listing.listing.id,
                requested_by = %owner,
                "Rejected access to another owner's listing"
            );
            return Err(ListingError::NotOwner {
                listing_id: listing.listing.id,
                owner: owner.email().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ListingService for ListingServiceImpl {
    async fn listings_by_owner(
        &self,
        owner: &OwnerIdentity,
    ) -> Result<Vec<ListingWithImages>, ListingError> {
        let rows = self
            .repository
            .select_listings_by_owner(owner.email())
            .await?;
        Ok(ListingWithImages::group_rows(rows))
    }

    async fn get_listing(&self, id: ListingId) -> Result<ListingWithImages, ListingError> {
        let rows = self.repository.select_listing_with_images(id).await?;
        ListingWithImages::group_rows(rows)
            .into_iter()
            .next()
            .ok_or(ListingError::NotFound(id))
    }

    async fn delete_listing(
        &self,
        id: ListingId,
        owner: &OwnerIdentity,
    ) -> Result<DeleteListingOutcome, ListingError> {
        let existing = self.get_listing(id).await?;
        Self::check_owner(&existing, owner)?;

        self.repository.delete_images_for_listing(id).await?;
        if !self.repository.delete_listing(id, owner.email()).await? {
            return Err(ListingError::NotFound(id));
        }
        info!(listing_id = %id, owner = %owner, "Listing deleted");

        let keys: Vec<StorageKey> = existing
            .images
            .iter()
            .map(|image| image.record.storage_id.clone())
            .collect();

        let mut storage_warnings = Vec::new();
        for key in &keys {
            if let Err(e) = self.store.delete(std::slice::from_ref(key)).await {
                error!(listing_id = %id, key = %key, "Failed to delete listing image from storage: {}", e);
                storage_warnings.push(StoreDeleteFailure {
                    key: key.clone(),
                    source: e,
                });
            }
        }

        Ok(DeleteListingOutcome {
            listing_id: id,
            images_deleted: keys.len(),
            storage_warnings,
        })
    }

    async fn open_draft(
        &self,
        owner: OwnerIdentity,
        listing_id: Option<ListingId>,
    ) -> Result<ListingDraft, ListingError> {
        let images = self.image_manager();

        let Some(id) = listing_id else {
            return Ok(ListingDraft::create(
                owner,
                Arc::clone(&self.repository),
                images,
            ));
        };

        let existing = self.get_listing(id).await?;
        Self::check_owner(&existing, &owner)?;

        info!(listing_id = %id, images = existing.images.len(), "Opened listing for editing");
        Ok(ListingDraft::edit(
            owner,
            existing,
            Arc::clone(&self.repository),
            images,
        ))
    }
}
