use crate::domain::{
    errors::PersistenceResult,
    models::{ListingImageRow, ListingUpdate, NewImageRecord, NewListing, StoredImage},
    value_objects::ListingId,
};
use async_trait::async_trait;

/// Repository for listing rows and their image rows
#[async_trait]
pub trait ListingRepository: Send + Sync + 'static {
    /// Insert a listing and return its new id
    async fn insert_listing(&self, listing: &NewListing) -> PersistenceResult<ListingId>;

    /// Overwrite the editable columns of an existing listing
    async fn update_listing(&self, id: ListingId, update: &ListingUpdate) -> PersistenceResult<()>;

    /// Remove every image row that references the listing
    async fn delete_images_for_listing(&self, id: ListingId) -> PersistenceResult<()>;

    /// Insert one image row
    async fn insert_image_record(&self, image: &NewImageRecord) -> PersistenceResult<StoredImage>;

    /// One row per image (a single row with no image when there are none).
    /// Empty when the listing does not exist.
    async fn select_listing_with_images(
        &self,
        id: ListingId,
    ) -> PersistenceResult<Vec<ListingImageRow>>;

    /// Joined rows for every listing created by `owner`, newest listing first
    async fn select_listings_by_owner(&self, owner: &str)
        -> PersistenceResult<Vec<ListingImageRow>>;

    /// Delete the listing row if it belongs to `owner`; returns whether a row went away.
    /// Image rows must be deleted first.
    async fn delete_listing(&self, id: ListingId, owner: &str) -> PersistenceResult<bool>;
}
