mod content_signature;
mod listing_id;
mod storage_key;

pub use content_signature::ContentSignature;
pub use listing_id::{ListingId, LocalImageId};
pub use storage_key::{StorageKey, IMAGE_KEY_PREFIX};
