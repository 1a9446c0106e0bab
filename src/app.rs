use object_store::{memory::InMemory, ObjectStore as ObjectStoreBackend};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::info;

use crate::{
    adapters::{
        inbound::http::{router::AppState, session::DEFAULT_DRAFT_IDLE_TIMEOUT},
        outbound::{
            persistence::{InMemoryListingRepository, SqlListingRepository},
            storage::{create_s3_store, ApacheObjectStoreAdapter, S3Config},
        },
    },
    domain::models::PreviewRegistry,
    ports::{repositories::ListingRepository, storage::ObjectStore},
    services::ListingServiceImpl,
};

/// Public base URL used by the in-memory store
pub const IN_MEMORY_PUBLIC_BASE_URL: &str = "memory://car-photos";

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    pub repository_backend: RepositoryBackend,
    /// Overrides the public URL prefix derived from the storage backend
    pub public_base_url: Option<String>,
    /// Draft sessions untouched for this long are closed
    pub draft_idle_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::InMemory,
            repository_backend: RepositoryBackend::InMemory,
            public_base_url: None,
            draft_idle_timeout: DEFAULT_DRAFT_IDLE_TIMEOUT,
        }
    }
}

/// Storage backend configuration
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    S3 {
        bucket: String,
        region: String,
        access_key: Option<String>,
        secret_key: Option<String>,
        endpoint: Option<String>,
    },
    MinIO {
        endpoint: String,
        bucket: String,
        access_key: String,
        secret_key: String,
        use_ssl: bool,
    },
}

/// Repository backend configuration
#[derive(Debug, Clone)]
pub enum RepositoryBackend {
    InMemory,
    Database { connection_string: String },
}

/// Application dependencies container
pub struct AppDependencies {
    pub object_store: Arc<dyn ObjectStore>,
    pub listing_repository: Arc<dyn ListingRepository>,
    pub previews: PreviewRegistry,
}

/// Application services container
pub struct AppServices {
    pub listing_service: ListingServiceImpl,
    pub previews: PreviewRegistry,
    pub draft_idle_timeout: Duration,
}

impl AppServices {
    /// Router state with a fresh, empty set of draft sessions
    pub fn into_state(self) -> AppState {
        AppState::new(Arc::new(self.listing_service), self.previews)
    }

    /// Router state whose idle drafts are swept in the background; needs a tokio runtime
    pub fn into_state_with_sweeper(self) -> AppState {
        let idle = self.draft_idle_timeout;
        let state = self.into_state();
        state.drafts.spawn_sweeper(idle);
        info!(idle_secs = idle.as_secs(), "Draft session sweeper started");
        state
    }
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure storage backend
    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    /// Configure repository backend
    pub fn with_repository_backend(mut self, backend: RepositoryBackend) -> Self {
        self.config.repository_backend = backend;
        self
    }

    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.public_base_url = Some(url.into());
        self
    }

    pub fn with_draft_idle_timeout(mut self, idle: Duration) -> Self {
        self.config.draft_idle_timeout = idle;
        self
    }

    /// Build the application dependencies
    pub async fn build_dependencies(self) -> Result<AppDependencies, AppError> {
        let object_store = self.create_storage_adapter()?;
        let listing_repository = self.create_repository().await?;

        Ok(AppDependencies {
            object_store,
            listing_repository,
            previews: PreviewRegistry::new(),
        })
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        let draft_idle_timeout = self.config.draft_idle_timeout;
        let deps = self.build_dependencies().await?;

        let listing_service = ListingServiceImpl::new(
            deps.listing_repository,
            deps.object_store,
            deps.previews.clone(),
        );

        Ok(AppServices {
            listing_service,
            previews: deps.previews,
            draft_idle_timeout,
        })
    }

    /// Create the storage adapter based on configuration
    fn create_storage_adapter(&self) -> Result<Arc<dyn ObjectStore>, AppError> {
        let (backend, default_base_url): (Arc<dyn ObjectStoreBackend>, String) =
            match &self.config.storage_backend {
                StorageBackend::InMemory => (
                    Arc::new(InMemory::new()),
                    IN_MEMORY_PUBLIC_BASE_URL.to_string(),
                ),
                StorageBackend::S3 {
                    bucket,
                    region,
                    access_key,
                    secret_key,
                    endpoint,
                } => {
                    let config = S3Config {
                        bucket: bucket.clone(),
                        region: region.clone(),
                        access_key: access_key.clone(),
                        secret_key: secret_key.clone(),
                        endpoint: endpoint.clone(),
                        allow_http: false,
                    };
                    (Self::s3_store(&config)?, config.default_public_base_url())
                }
                StorageBackend::MinIO {
                    endpoint,
                    bucket,
                    access_key,
                    secret_key,
                    use_ssl,
                } => {
                    let config = S3Config {
                        bucket: bucket.clone(),
                        region: "us-east-1".to_string(),
                        access_key: Some(access_key.clone()),
                        secret_key: Some(secret_key.clone()),
                        endpoint: Some(endpoint.clone()),
                        allow_http: !use_ssl,
                    };
                    (Self::s3_store(&config)?, config.default_public_base_url())
                }
            };

        let public_base_url = self
            .config
            .public_base_url
            .clone()
            .unwrap_or(default_base_url);
        info!(public_base_url = %public_base_url, "Object store configured");

        Ok(Arc::new(ApacheObjectStoreAdapter::new(
            backend,
            public_base_url,
        )))
    }

    fn s3_store(config: &S3Config) -> Result<Arc<dyn ObjectStoreBackend>, AppError> {
        create_s3_store(config).map_err(|e| AppError::StorageInit {
            message: format!("Failed to build S3 store for bucket {}: {}", config.bucket, e),
        })
    }

    /// Create the repository based on configuration
    async fn create_repository(&self) -> Result<Arc<dyn ListingRepository>, AppError> {
        match &self.config.repository_backend {
            RepositoryBackend::InMemory => Ok(Arc::new(InMemoryListingRepository::new())),
            RepositoryBackend::Database { connection_string } => {
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect(connection_string)
                    .await
                    .map_err(|e| AppError::RepositoryInit {
                        message: format!("Failed to connect to database: {}", e),
                    })?;

                let repository = SqlListingRepository::new(pool);
                repository
                    .migrate()
                    .await
                    .map_err(|e| AppError::RepositoryInit {
                        message: format!("Failed to create tables: {}", e),
                    })?;

                info!("Connected to PostgreSQL listing repository");
                Ok(Arc::new(repository))
            }
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },

    #[error("Repository initialization error: {message}")]
    RepositoryInit { message: String },
}

/// Convenience functions for common configurations
///
/// Create an in-memory application for testing and development
pub async fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::InMemory)
        .with_repository_backend(RepositoryBackend::InMemory)
        .build()
        .await
}

/// Create a MinIO-backed application with an in-memory repository
pub async fn create_minio_app(
    endpoint: String,
    bucket: String,
    access_key: String,
    secret_key: String,
    use_ssl: bool,
) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::MinIO {
            endpoint,
            bucket,
            access_key,
            secret_key,
            use_ssl,
        })
        .with_repository_backend(RepositoryBackend::InMemory)
        .build()
        .await
}

fn required_env(name: &str) -> Result<String, AppError> {
    std::env::var(name).map_err(|_| AppError::Configuration {
        message: format!("{} environment variable required", name),
    })
}

/// Read the application configuration from environment variables
pub fn config_from_env() -> Result<AppConfig, AppError> {
    let storage_backend = match std::env::var("STORAGE_BACKEND").as_deref() {
        Ok("s3") => StorageBackend::S3 {
            bucket: required_env("S3_BUCKET")?,
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            access_key: std::env::var("S3_ACCESS_KEY").ok(),
            secret_key: std::env::var("S3_SECRET_KEY").ok(),
            endpoint: std::env::var("S3_ENDPOINT").ok(),
        },
        Ok("minio") => StorageBackend::MinIO {
            endpoint: required_env("S3_ENDPOINT")?,
            bucket: required_env("S3_BUCKET")?,
            access_key: required_env("S3_ACCESS_KEY")?,
            secret_key: required_env("S3_SECRET_KEY")?,
            use_ssl: std::env::var("MINIO_USE_SSL")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        },
        Ok("memory") | Err(_) => StorageBackend::InMemory,
        Ok(other) => {
            return Err(AppError::Configuration {
                message: format!("Unknown storage backend: {}", other),
            })
        }
    };

    let repository_backend = match std::env::var("REPOSITORY_BACKEND").as_deref() {
        Ok("database") => RepositoryBackend::Database {
            connection_string: required_env("DATABASE_URL")?,
        },
        Ok("memory") | Err(_) => RepositoryBackend::InMemory,
        Ok(other) => {
            return Err(AppError::Configuration {
                message: format!("Unknown repository backend: {}", other),
            })
        }
    };

    let draft_idle_timeout = match std::env::var("DRAFT_IDLE_TIMEOUT_SECS") {
        Ok(secs) => secs
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| AppError::Configuration {
                message: format!("DRAFT_IDLE_TIMEOUT_SECS must be a number of seconds: {}", secs),
            })?,
        Err(_) => DEFAULT_DRAFT_IDLE_TIMEOUT,
    };

    Ok(AppConfig {
        storage_backend,
        repository_backend,
        public_base_url: std::env::var("PUBLIC_BASE_URL").ok(),
        draft_idle_timeout,
    })
}

/// Create application from environment variables
pub async fn create_app_from_env() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_config(config_from_env()?)
        .build()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{models::OwnerIdentity, value_objects::StorageKey},
        ports::services::ListingService,
    };
    use bytes::Bytes;

    #[tokio::test]
    async fn test_create_in_memory_app() {
        let app = create_in_memory_app().await.unwrap();

        let owner = OwnerIdentity::new("seller@example.com").unwrap();
        let listings = app.listing_service.listings_by_owner(&owner).await.unwrap();

        assert!(listings.is_empty());
        assert_eq!(app.previews.outstanding(), 0);
        assert_eq!(app.draft_idle_timeout, DEFAULT_DRAFT_IDLE_TIMEOUT);
    }

    #[tokio::test]
    async fn test_draft_idle_timeout_reaches_services() {
        let app = AppBuilder::new()
            .with_draft_idle_timeout(Duration::from_secs(90))
            .build()
            .await
            .unwrap();

        assert_eq!(app.draft_idle_timeout, Duration::from_secs(90));
        let state = app.into_state_with_sweeper();
        assert!(state.drafts.is_empty().await);
    }

    #[tokio::test]
    async fn test_public_base_url_override() {
        let deps = AppBuilder::new()
            .with_public_base_url("https://cdn.example/")
            .build_dependencies()
            .await
            .unwrap();

        let key = StorageKey::new("car-images/a.jpg".to_string()).unwrap();
        let url = deps
            .object_store
            .upload(&key, Bytes::from_static(b"a"), Some("image/jpeg"))
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.example/car-images/a.jpg");
    }

    #[tokio::test]
    async fn test_minio_app_builds_without_connecting() {
        let app = create_minio_app(
            "http://localhost:9000".to_string(),
            "car-photos".to_string(),
            "minio".to_string(),
            "minio123".to_string(),
            false,
        )
        .await;

        assert!(app.is_ok());
    }
}
