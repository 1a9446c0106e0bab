mod common;

use car_listing_server::{
    domain::{errors::ImageError, models::ImageRecord, value_objects::StorageKey},
    ImageLifecycleManager, ObjectStore, PreviewRegistry,
};
use common::{jpeg, RecordingStore, PUBLIC_BASE_URL};
use std::sync::Arc;

fn manager_with(store: &Arc<RecordingStore>) -> (ImageLifecycleManager, PreviewRegistry) {
    let previews = PreviewRegistry::new();
    let store: Arc<dyn ObjectStore> = store.clone();
    (ImageLifecycleManager::new(store, previews.clone()), previews)
}

fn existing_record(name: &str) -> ImageRecord {
    let storage_id = StorageKey::new(format!("car-images/{}", name)).unwrap();
    ImageRecord {
        image_url: format!("{}/{}", PUBLIC_BASE_URL, storage_id),
        storage_id,
    }
}

#[tokio::test]
async fn test_distinct_selections_are_all_staged_as_pending() {
    let store = Arc::new(RecordingStore::new());
    let (mut manager, previews) = manager_with(&store);

    let report = manager
        .select(vec![
            jpeg("front.jpg", b"front"),
            jpeg("rear.jpg", b"rear"),
            jpeg("interior.jpg", b"interior"),
        ])
        .unwrap();

    assert_eq!(report.staged.len(), 3);
    assert_eq!(report.duplicates, 0);
    assert_eq!(manager.len(), 3);
    assert!(manager.images().iter().all(|entry| entry.is_pending()));
    assert_eq!(previews.outstanding(), 3);
    assert_eq!(store.upload_calls(), 0);
}

#[tokio::test]
async fn test_duplicates_never_grow_the_set() {
    let store = Arc::new(RecordingStore::new());
    let (mut manager, previews) = manager_with(&store);

    let report = manager
        .select(vec![jpeg("a.jpg", b"same"), jpeg("b.jpg", b"same")])
        .unwrap();
    assert_eq!(report.staged.len(), 1);
    assert_eq!(report.duplicates, 1);

    let again = manager.select(vec![jpeg("renamed.jpg", b"same")]);
    assert!(matches!(
        again,
        Err(ImageError::NoNewUniqueImages { duplicates: 1, .. })
    ));

    assert_eq!(manager.len(), 1);
    assert_eq!(previews.outstanding(), 1);
}

#[tokio::test]
async fn test_non_images_are_rejected_alongside_valid_files() {
    let store = Arc::new(RecordingStore::new());
    let (mut manager, _previews) = manager_with(&store);

    let pdf = car_listing_server::ImageFile::new(
        "manual.pdf",
        "application/pdf",
        bytes::Bytes::from_static(b"%PDF"),
    );
    let report = manager.select(vec![pdf, jpeg("a.jpg", b"a")]).unwrap();

    assert_eq!(report.staged.len(), 1);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(manager.len(), 1);
}

#[tokio::test]
async fn test_flush_with_nothing_pending_makes_no_store_calls() {
    let store = Arc::new(RecordingStore::new());
    let (mut manager, _previews) = manager_with(&store);
    let records = vec![existing_record("a.jpg"), existing_record("b.jpg")];
    manager.seed(&records);

    let before = manager.images();
    let flushed = manager.flush().await.unwrap();

    assert_eq!(flushed, records);
    assert_eq!(manager.images(), before);
    assert_eq!(store.upload_calls(), 0);
}

#[tokio::test]
async fn test_successful_flush_uploads_every_pending_image() {
    let store = Arc::new(RecordingStore::new());
    let (mut manager, _previews) = manager_with(&store);
    manager.seed(&[existing_record("old.jpg")]);
    manager
        .select(vec![jpeg("a.jpg", b"a"), jpeg("b.jpg", b"b")])
        .unwrap();

    let records = manager.flush().await.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(store.upload_calls(), 2);
    assert_eq!(manager.pending_count(), 0);
    for record in &records {
        assert!(!record.image_url.is_empty());
        assert_eq!(
            record.image_url,
            format!("{}/{}", PUBLIC_BASE_URL, record.storage_id)
        );
    }
}

#[tokio::test]
async fn test_retry_after_partial_failure_uploads_only_the_failures() {
    let store = Arc::new(RecordingStore::new());
    let (mut manager, _previews) = manager_with(&store);
    manager
        .select(vec![
            jpeg("a.jpg", b"a"),
            jpeg("b.jpg", b"b"),
            jpeg("c.jpg", b"c"),
        ])
        .unwrap();
    store.fail_uploads_of(b"b");

    let failure = manager.flush().await.unwrap_err();
    assert_eq!(failure.uploaded, 2);
    assert_eq!(failure.failed.len(), 1);
    assert_eq!(failure.failed[0].file_name, "b.jpg");
    assert_eq!(manager.pending_count(), 1);
    assert_eq!(store.upload_calls(), 3);

    store.heal();
    let records = manager.flush().await.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(store.upload_calls(), 4);
    assert_eq!(store.attempted_keys_for(b"a").len(), 1);

    // the retry does not reuse the key of the failed attempt
    let attempts = store.attempted_keys_for(b"b");
    assert_eq!(attempts.len(), 2);
    assert_ne!(attempts[0], attempts[1]);
}

#[tokio::test]
async fn test_failed_store_delete_still_removes_locally() {
    let store = Arc::new(RecordingStore::new());
    let (mut manager, _previews) = manager_with(&store);
    let record = existing_record("old.jpg");
    let entries = manager.seed(&[record.clone()]);
    store.fail_deletes();

    let outcome = manager.remove(entries[0].local_id()).await.unwrap();

    assert!(outcome.images.is_empty());
    assert!(manager.is_empty());
    let warning = outcome.warning.expect("delete failure is reported");
    assert_eq!(warning.key, record.storage_id);
    assert_eq!(store.deleted_keys(), vec![record.storage_id]);
}

#[tokio::test]
async fn test_removing_a_pending_image_never_touches_the_store() {
    let store = Arc::new(RecordingStore::new());
    let (mut manager, previews) = manager_with(&store);
    let report = manager.select(vec![jpeg("a.jpg", b"a")]).unwrap();

    let outcome = manager.remove(report.staged[0]).await.unwrap();

    assert!(outcome.warning.is_none());
    assert_eq!(store.delete_calls(), 0);
    assert_eq!(previews.outstanding(), 0);
}

#[tokio::test]
async fn test_reset_empties_set_and_releases_previews() {
    let store = Arc::new(RecordingStore::new());
    let (mut manager, previews) = manager_with(&store);
    manager.seed(&[existing_record("old.jpg")]);
    manager
        .select(vec![jpeg("a.jpg", b"a"), jpeg("b.jpg", b"b")])
        .unwrap();
    let mut changes = manager.subscribe();

    manager.reset();

    assert!(manager.is_empty());
    assert_eq!(previews.outstanding(), 0);
    assert!(changes.has_changed().unwrap());
    assert!(changes.borrow_and_update().is_empty());
}
