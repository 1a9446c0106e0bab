pub mod repositories;
pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use repositories::ListingRepository;
pub use services::{DeleteListingOutcome, ListingService};
pub use storage::ObjectStore;
