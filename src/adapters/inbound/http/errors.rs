use axum::Json;
use http::StatusCode;

use crate::{
    adapters::inbound::http::dto::ErrorResponseDto,
    domain::errors::{DraftError, ImageError, ListingError},
};

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponseDto>);

impl From<&ImageError> for StatusCode {
    fn from(err: &ImageError) -> Self {
        match err {
            ImageError::NoNewUniqueImages { duplicates, .. } if *duplicates > 0 => {
                StatusCode::CONFLICT
            }
            ImageError::NoNewUniqueImages { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ImageError::ImageNotFound(_) => StatusCode::NOT_FOUND,
            ImageError::Upload(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<&DraftError> for StatusCode {
    fn from(err: &DraftError) -> Self {
        match err {
            DraftError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DraftError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DraftError::Image(image_error) => StatusCode::from(image_error),
            DraftError::Upload(_) => StatusCode::BAD_GATEWAY,
            DraftError::Persistence(_) | DraftError::PartialPersistence { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            DraftError::NothingToRetry => StatusCode::CONFLICT,
        }
    }
}

impl From<&ListingError> for StatusCode {
    fn from(err: &ListingError) -> Self {
        match err {
            ListingError::NotFound(_) => StatusCode::NOT_FOUND,
            ListingError::NotOwner { .. } => StatusCode::FORBIDDEN,
            ListingError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn draft_error(err: DraftError) -> ApiError {
    (
        StatusCode::from(&err),
        Json(ErrorResponseDto::from_draft_error(&err)),
    )
}

pub fn image_error(err: ImageError) -> ApiError {
    (
        StatusCode::from(&err),
        Json(ErrorResponseDto::from_image_error(&err)),
    )
}

pub fn listing_error(err: ListingError) -> ApiError {
    (
        StatusCode::from(&err),
        Json(ErrorResponseDto::from_listing_error(&err)),
    )
}

pub fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponseDto::bad_request(message)),
    )
}

pub fn not_found(message: &str) -> ApiError {
    (StatusCode::NOT_FOUND, Json(ErrorResponseDto::not_found(message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_only_is_conflict() {
        let err = ImageError::NoNewUniqueImages {
            duplicates: 2,
            rejected: Vec::new(),
        };
        assert_eq!(StatusCode::from(&err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_rejected_only_is_unprocessable() {
        let err = ImageError::NoNewUniqueImages {
            duplicates: 0,
            rejected: vec![crate::domain::errors::ValidationError::EmptyFile {
                file_name: "a.jpg".to_string(),
            }],
        };
        assert_eq!(StatusCode::from(&err), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
