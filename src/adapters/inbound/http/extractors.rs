use axum::{extract::FromRequestParts, http::request::Parts, http::StatusCode, Json};

use crate::{
    adapters::inbound::http::{dto::ErrorResponseDto, errors::ApiError},
    domain::models::OwnerIdentity,
};

/// Header carrying the signed-in user's email; authentication happens upstream
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// The caller's identity, taken from [`USER_EMAIL_HEADER`]
#[derive(Debug, Clone)]
pub struct Owner(pub OwnerIdentity);

impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let unauthorized = |message: &str| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponseDto::unauthorized(message)),
            )
        };

        let email = parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthorized("Sign in to manage listings"))?;

        OwnerIdentity::new(email)
            .map(Owner)
            .map_err(|e| unauthorized(&e.to_string()))
    }
}
