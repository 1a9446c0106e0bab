mod image_lifecycle_manager;
mod listing_draft;
mod listing_service_impl;

pub use image_lifecycle_manager::{ImageLifecycleManager, RemovalOutcome, SelectionReport};
pub use listing_draft::{DraftMode, ListingDraft, SubmitOutcome};
pub use listing_service_impl::ListingServiceImpl;
