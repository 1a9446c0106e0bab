use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    domain::{
        errors::{PersistenceError, PersistenceResult},
        models::{
            ImageRecord, Listing, ListingImageRow, ListingUpdate, NewImageRecord, NewListing,
            StoredImage,
        },
        value_objects::ListingId,
    },
    ports::repositories::ListingRepository,
};

/// In-memory implementation of ListingRepository for testing and development
#[derive(Clone, Default)]
pub struct InMemoryListingRepository {
    data: Arc<RwLock<RepositoryData>>,
}

#[derive(Default)]
struct RepositoryData {
    listings: BTreeMap<ListingId, Listing>,
    // image id -> row
    images: BTreeMap<i64, StoredImage>,
    last_listing_id: i64,
    last_image_id: i64,
}

impl RepositoryData {
    fn rows_for(&self, listing: &Listing) -> Vec<ListingImageRow> {
        let rows: Vec<ListingImageRow> = self
            .images
            .values()
            .filter(|image| image.listing_id == listing.id)
            .map(|image| ListingImageRow {
                listing: listing.clone(),
                image: Some(image.clone()),
            })
            .collect();

        if rows.is_empty() {
            vec![ListingImageRow {
                listing: listing.clone(),
                image: None,
            }]
        } else {
            rows
        }
    }
}

impl InMemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn listing_count(&self) -> usize {
        self.data.read().await.listings.len()
    }

    pub async fn image_count(&self) -> usize {
        self.data.read().await.images.len()
    }

    /// Image records currently stored for a listing, in insertion order
    pub async fn images_for(&self, id: ListingId) -> Vec<ImageRecord> {
        self.data
            .read()
            .await
            .images
            .values()
            .filter(|image| image.listing_id == id)
            .map(|image| image.record.clone())
            .collect()
    }

    pub async fn listing(&self, id: ListingId) -> Option<Listing> {
        self.data.read().await.listings.get(&id).cloned()
    }
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn insert_listing(&self, listing: &NewListing) -> PersistenceResult<ListingId> {
        let mut data = self.data.write().await;

        data.last_listing_id += 1;
        let id = ListingId::new(data.last_listing_id).map_err(|e| PersistenceError::CorruptRow {
            message: e.to_string(),
        })?;

        data.listings.insert(
            id,
            Listing {
                id,
                fields: listing.fields.clone(),
                features: listing.features.clone(),
                created_by: listing.created_by.clone(),
                posted_on: listing.posted_on,
                updated_by: None,
                updated_on: None,
            },
        );

        Ok(id)
    }

    async fn update_listing(&self, id: ListingId, update: &ListingUpdate) -> PersistenceResult<()> {
        let mut data = self.data.write().await;

        let listing = data
            .listings
            .get_mut(&id)
            .ok_or(PersistenceError::ListingNotFound { id })?;

        listing.fields = update.fields.clone();
        listing.features = update.features.clone();
        listing.updated_by = Some(update.updated_by.clone());
        listing.updated_on = Some(update.updated_on);

        Ok(())
    }

    async fn delete_images_for_listing(&self, id: ListingId) -> PersistenceResult<()> {
        let mut data = self.data.write().await;
        data.images.retain(|_, image| image.listing_id != id);
        Ok(())
    }

    async fn insert_image_record(&self, image: &NewImageRecord) -> PersistenceResult<StoredImage> {
        let mut data = self.data.write().await;

        if !data.listings.contains_key(&image.listing_id) {
            return Err(PersistenceError::ListingNotFound {
                id: image.listing_id,
            });
        }

        data.last_image_id += 1;
        let stored = StoredImage {
            id: data.last_image_id,
            listing_id: image.listing_id,
            record: ImageRecord {
                image_url: image.image_url.clone(),
                storage_id: image.storage_id.clone(),
            },
        };
        data.images.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn select_listing_with_images(
        &self,
        id: ListingId,
    ) -> PersistenceResult<Vec<ListingImageRow>> {
        let data = self.data.read().await;

        Ok(data
            .listings
            .get(&id)
            .map(|listing| data.rows_for(listing))
            .unwrap_or_default())
    }

    async fn select_listings_by_owner(
        &self,
        owner: &str,
    ) -> PersistenceResult<Vec<ListingImageRow>> {
        let data = self.data.read().await;

        Ok(data
            .listings
            .values()
            .rev()
            .filter(|listing| listing.created_by == owner)
            .flat_map(|listing| data.rows_for(listing))
            .collect())
    }

    async fn delete_listing(&self, id: ListingId, owner: &str) -> PersistenceResult<bool> {
        let mut data = self.data.write().await;

        let owned = data
            .listings
            .get(&id)
            .is_some_and(|listing| listing.created_by == owner);
        if owned {
            data.listings.remove(&id);
        }

        Ok(owned)
    }
}
