// Infrastructure error conversions
pub mod error;

pub mod apache_object_store_adapter;

// Provider-specific configuration
pub mod s3;

pub use apache_object_store_adapter::ApacheObjectStoreAdapter;
pub use s3::{create_s3_store, S3Config};
