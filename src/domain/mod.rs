pub mod errors;
pub mod models;
pub mod value_objects;

// Re-export commonly used types
pub use errors::{
    DraftError, FieldErrors, ImageError, ListingError, PersistenceError, StorageError,
    UploadFailure, ValidationError,
};
pub use models::*;
pub use value_objects::*;
