use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{
    cancel_draft,
    delete_listing,
    flush_images,
    get_draft,
    get_listing,
    get_preview,
    // Listing handlers
    health,
    list_my_listings,
    // Draft handlers
    open_draft,
    remove_image,
    retry_images,
    select_images,
    submit_draft,
    update_draft,
    validate_draft,
};
use super::session::DraftSessions;

use crate::{domain::models::PreviewRegistry, ports::services::ListingService};

/// Largest multipart body accepted for a photo selection
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub listing_service: Arc<dyn ListingService>,
    pub previews: PreviewRegistry,
    pub drafts: DraftSessions,
}

impl AppState {
    pub fn new(listing_service: Arc<dyn ListingService>, previews: PreviewRegistry) -> Self {
        Self {
            listing_service,
            previews,
            drafts: DraftSessions::new(),
        }
    }
}

/// Create the main application router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(create_listing_router())
        .merge(create_draft_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        // Add state for dependency injection
        .with_state(state)
}

/// Create a router with just listing operations
pub fn create_listing_router() -> Router<AppState> {
    Router::new()
        .route("/listings", get(list_my_listings))
        .route("/listings/{id}", get(get_listing).delete(delete_listing))
}

/// Create a router with just draft operations
pub fn create_draft_router() -> Router<AppState> {
    Router::new()
        .route("/drafts", post(open_draft))
        .route("/drafts/{id}", get(get_draft).delete(cancel_draft))
        .route("/drafts/{id}/fields", patch(update_draft))
        .route("/drafts/{id}/validation", get(validate_draft))
        .route(
            "/drafts/{id}/images",
            post(select_images).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/drafts/{id}/images/{image_id}", delete(remove_image))
        .route("/drafts/{id}/previews/{preview_id}", get(get_preview))
        .route("/drafts/{id}/flush", post(flush_images))
        .route("/drafts/{id}/submit", post(submit_draft))
        .route("/drafts/{id}/retry-images", post(retry_images))
}
