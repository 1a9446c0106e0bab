mod in_memory_listing_repository;
mod sql_listing_repository;

pub use in_memory_listing_repository::InMemoryListingRepository;
pub use sql_listing_repository::SqlListingRepository;
