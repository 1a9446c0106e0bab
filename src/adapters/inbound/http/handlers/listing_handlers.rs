use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    adapters::inbound::http::{
        dto::{DeleteListingResponseDto, ListingDto, SuccessResponseDto},
        errors::{bad_request, listing_error, ApiError},
        extractors::Owner,
        router::AppState,
    },
    domain::value_objects::ListingId,
};

/// Liveness probe
pub async fn health() -> Json<SuccessResponseDto> {
    Json(SuccessResponseDto::new("ok"))
}

pub(crate) fn parse_listing_id(id: i64) -> Result<ListingId, ApiError> {
    ListingId::new(id).map_err(|e| bad_request(&e.to_string()))
}

/// Handle listing the caller's listings
pub async fn list_my_listings(
    State(app_state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<Vec<ListingDto>>, ApiError> {
    let listings = app_state
        .listing_service
        .listings_by_owner(&owner)
        .await
        .map_err(listing_error)?;

    Ok(Json(listings.into_iter().map(ListingDto::from).collect()))
}

/// Handle listing retrieval
pub async fn get_listing(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ListingDto>, ApiError> {
    let id = parse_listing_id(id)?;

    let listing = app_state
        .listing_service
        .get_listing(id)
        .await
        .map_err(listing_error)?;

    Ok(Json(ListingDto::from(listing)))
}

/// Handle listing deletion
pub async fn delete_listing(
    State(app_state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<DeleteListingResponseDto>), ApiError> {
    let id = parse_listing_id(id)?;

    let outcome = app_state
        .listing_service
        .delete_listing(id, &owner)
        .await
        .map_err(listing_error)?;

    Ok((StatusCode::OK, Json(DeleteListingResponseDto::from(outcome))))
}
