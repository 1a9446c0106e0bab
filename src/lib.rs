pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core business entities and value objects
pub use domain::{
    // Errors
    DraftError,
    FieldErrors,
    ImageError,
    // Models
    ImageFile,
    ImageRecord,
    ImageSetEntry,
    ListingError,
    ListingField,
    ListingFields,
    // Value objects
    ListingId,
    ListingWithImages,
    LocalImageId,
    OwnerIdentity,
    PersistenceError,
    PreviewRegistry,
    StorageError,
    StorageKey,
    UploadFailure,
    ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{DeleteListingOutcome, ListingRepository, ListingService, ObjectStore};

// Service implementations - business logic
pub use services::{
    DraftMode, ImageLifecycleManager, ListingDraft, ListingServiceImpl, RemovalOutcome,
    SelectionReport, SubmitOutcome,
};

// Application factory and configuration
pub use app::{
    AppBuilder, AppConfig, AppDependencies, AppError, AppServices, RepositoryBackend,
    StorageBackend, config_from_env, create_app_from_env, create_in_memory_app, create_minio_app,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::{
    persistence::{InMemoryListingRepository, SqlListingRepository},
    storage::ApacheObjectStoreAdapter,
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        ApacheObjectStoreAdapter, AppBuilder, AppServices, ImageFile, ImageLifecycleManager,
        InMemoryListingRepository, ListingDraft, ListingRepository, ListingService,
        ListingServiceImpl, ObjectStore, OwnerIdentity, PreviewRegistry, create_in_memory_app,
    };
}
