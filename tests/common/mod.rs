#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use car_listing_server::{
    domain::{
        errors::{PersistenceError, PersistenceResult, StorageError, StorageResult},
        models::{
            Features, ImageFile, ListingField, ListingFields, ListingImageRow, ListingUpdate,
            NewImageRecord, NewListing, StoredImage,
        },
        value_objects::{ListingId, StorageKey},
    },
    InMemoryListingRepository, ListingRepository, ObjectStore,
};
use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

pub const PUBLIC_BASE_URL: &str = "https://cdn.example";
pub const OWNER: &str = "seller@example.com";

/// Object store fake that records every call and fails on demand
#[derive(Default)]
pub struct RecordingStore {
    uploaded: Mutex<Vec<(StorageKey, Bytes)>>,
    deleted: Mutex<Vec<StorageKey>>,
    failing_payloads: Mutex<HashSet<Bytes>>,
    failing_deletes: Mutex<HashSet<StorageKey>>,
    upload_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    fail_deletes: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads of exactly these bytes fail until [`RecordingStore::heal`]
    pub fn fail_uploads_of(&self, payload: &[u8]) {
        self.failing_payloads
            .lock()
            .unwrap()
            .insert(Bytes::copy_from_slice(payload));
    }

    pub fn heal(&self) {
        self.failing_payloads.lock().unwrap().clear();
        self.fail_deletes.store(false, Ordering::SeqCst);
        self.failing_deletes.lock().unwrap().clear();
    }

    /// Deletes that include this key fail
    pub fn fail_deletes_of(&self, key: &StorageKey) {
        self.failing_deletes.lock().unwrap().insert(key.clone());
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn uploaded_keys(&self) -> Vec<StorageKey> {
        self.uploaded
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Keys whose upload was attempted with this payload, successful or not
    pub fn attempted_keys_for(&self, payload: &[u8]) -> Vec<StorageKey> {
        self.uploaded
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, bytes)| bytes.as_ref() == payload)
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn deleted_keys(&self) -> Vec<StorageKey> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn upload(
        &self,
        key: &StorageKey,
        data: Bytes,
        _content_type: Option<&str>,
    ) -> StorageResult<String> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.uploaded.lock().unwrap().push((key.clone(), data.clone()));

        if self.failing_payloads.lock().unwrap().contains(&data) {
            return Err(StorageError::InfrastructureError {
                message: "connection reset".to_string(),
                source: None,
            });
        }

        Ok(self.public_url(key))
    }

    async fn delete(&self, keys: &[StorageKey]) -> StorageResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.deleted.lock().unwrap().extend(keys.iter().cloned());

        let failing = self.failing_deletes.lock().unwrap();
        let denied = keys
            .iter()
            .find(|key| self.fail_deletes.load(Ordering::SeqCst) || failing.contains(*key));
        if let Some(key) = denied {
            return Err(StorageError::AccessDenied {
                key: key.to_string(),
                operation: "delete".to_string(),
            });
        }

        Ok(())
    }

    fn public_url(&self, key: &StorageKey) -> String {
        format!("{}/{}", PUBLIC_BASE_URL, key)
    }
}

/// Repository wrapper that counts writes and can fail image inserts
#[derive(Default)]
pub struct FlakyRepository {
    pub inner: InMemoryListingRepository,
    fail_listing_writes: AtomicBool,
    fail_image_inserts: AtomicBool,
    pub listing_inserts: AtomicUsize,
    pub listing_updates: AtomicUsize,
    pub image_inserts: AtomicUsize,
}

impl FlakyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_listing_writes(&self, fail: bool) {
        self.fail_listing_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_image_inserts(&self, fail: bool) {
        self.fail_image_inserts.store(fail, Ordering::SeqCst);
    }

    fn outage() -> PersistenceError {
        PersistenceError::DatabaseError {
            message: "connection refused".to_string(),
            source: None,
        }
    }
}

#[async_trait]
impl ListingRepository for FlakyRepository {
    async fn insert_listing(&self, listing: &NewListing) -> PersistenceResult<ListingId> {
        if self.fail_listing_writes.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }
        self.listing_inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_listing(listing).await
    }

    async fn update_listing(&self, id: ListingId, update: &ListingUpdate) -> PersistenceResult<()> {
        if self.fail_listing_writes.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }
        self.listing_updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update_listing(id, update).await
    }

    async fn delete_images_for_listing(&self, id: ListingId) -> PersistenceResult<()> {
        self.inner.delete_images_for_listing(id).await
    }

    async fn insert_image_record(&self, image: &NewImageRecord) -> PersistenceResult<StoredImage> {
        if self.fail_image_inserts.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }
        self.image_inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_image_record(image).await
    }

    async fn select_listing_with_images(
        &self,
        id: ListingId,
    ) -> PersistenceResult<Vec<ListingImageRow>> {
        self.inner.select_listing_with_images(id).await
    }

    async fn select_listings_by_owner(
        &self,
        owner: &str,
    ) -> PersistenceResult<Vec<ListingImageRow>> {
        self.inner.select_listings_by_owner(owner).await
    }

    async fn delete_listing(&self, id: ListingId, owner: &str) -> PersistenceResult<bool> {
        self.inner.delete_listing(id, owner).await
    }
}

pub fn jpeg(name: &str, payload: &[u8]) -> ImageFile {
    ImageFile::new(name, "image/jpeg", Bytes::copy_from_slice(payload))
}

/// Field values that pass validation
pub fn valid_fields() -> ListingFields {
    let mut fields = ListingFields::new();
    for field in ListingField::ALL {
        if !field.is_required() {
            continue;
        }
        let value = match field {
            ListingField::Year => "2019",
            ListingField::SellingPrice => "18500.00",
            ListingField::Mileage => "42000",
            ListingField::Door => "4",
            _ => "Example",
        };
        fields.set(field, value);
    }
    fields
}

pub fn new_listing(owner: &str) -> NewListing {
    NewListing {
        fields: valid_fields(),
        features: Features::new(),
        created_by: owner.to_string(),
        posted_on: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
    }
}
