use crate::{
    domain::{
        errors::{ListingError, StoreDeleteFailure},
        models::{ListingWithImages, OwnerIdentity},
        value_objects::ListingId,
    },
    services::ListingDraft,
};
use async_trait::async_trait;

/// Service port for listing-level operations
#[async_trait]
pub trait ListingService: Send + Sync + 'static {
    /// The owner's listings, newest first, each with its images
    async fn listings_by_owner(
        &self,
        owner: &OwnerIdentity,
    ) -> Result<Vec<ListingWithImages>, ListingError>;

    /// One listing with its images
    async fn get_listing(&self, id: ListingId) -> Result<ListingWithImages, ListingError>;

    /// Delete a listing, its image rows, and (best effort) its stored photos
    async fn delete_listing(
        &self,
        id: ListingId,
        owner: &OwnerIdentity,
    ) -> Result<DeleteListingOutcome, ListingError>;

    /// Start a draft session: empty for `None`, seeded from the listing for `Some(id)`
    async fn open_draft(
        &self,
        owner: OwnerIdentity,
        listing_id: Option<ListingId>,
    ) -> Result<ListingDraft, ListingError>;
}

/// Result of deleting a listing
#[derive(Debug, Clone)]
pub struct DeleteListingOutcome {
    pub listing_id: ListingId,
    pub images_deleted: usize,
    /// One entry per photo that could not be removed from the bucket
    pub storage_warnings: Vec<StoreDeleteFailure>,
}
