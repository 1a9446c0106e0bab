use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    adapters::inbound::http::{
        dto::{
            DraftDto, FlushResponseDto, OpenDraftDto, RemovalResponseDto, SelectionResponseDto,
            SubmitResponseDto, SuccessResponseDto, UpdateDraftDto, ValidationResponseDto,
        },
        errors::{bad_request, draft_error, image_error, listing_error, not_found, ApiError},
        extractors::Owner,
        handlers::listing_handlers::parse_listing_id,
        router::AppState,
        session::SharedDraft,
    },
    domain::{
        errors::DraftError,
        models::{ImageFile, ListingField, OwnerIdentity},
        value_objects::LocalImageId,
    },
};

async fn load_draft(
    app_state: &AppState,
    id: Uuid,
    owner: &OwnerIdentity,
) -> Result<SharedDraft, ApiError> {
    app_state
        .drafts
        .get(id, owner)
        .await
        .ok_or_else(|| not_found(&format!("Draft not found: {}", id)))
}

/// Handle opening a draft, empty or seeded from an existing listing
pub async fn open_draft(
    State(app_state): State<AppState>,
    Owner(owner): Owner,
    body: Option<Json<OpenDraftDto>>,
) -> Result<(StatusCode, Json<DraftDto>), ApiError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let listing_id = request.listing_id.map(parse_listing_id).transpose()?;

    let draft = app_state
        .listing_service
        .open_draft(owner, listing_id)
        .await
        .map_err(listing_error)?;

    let (id, shared) = app_state.drafts.open(draft).await;
    let draft = shared.lock().await;
    info!(draft_id = %id, owner = %draft.owner(), "Draft opened");

    Ok((StatusCode::CREATED, Json(DraftDto::new(id, &draft))))
}

/// Handle draft retrieval
pub async fn get_draft(
    State(app_state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<DraftDto>, ApiError> {
    let shared = load_draft(&app_state, id, &owner).await?;
    let draft = shared.lock().await;
    Ok(Json(DraftDto::new(id, &draft)))
}

/// Handle cancelling a draft: clear it and end the session
pub async fn cancel_draft(
    State(app_state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponseDto>, ApiError> {
    let shared = load_draft(&app_state, id, &owner).await?;
    shared.lock().await.reset();
    app_state.drafts.close(id).await;

    Ok(Json(SuccessResponseDto::new("Draft discarded")))
}

/// Handle field and feature updates
pub async fn update_draft(
    State(app_state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDraftDto>,
) -> Result<Json<DraftDto>, ApiError> {
    // Reject the whole patch if any field name is unknown
    let mut updates = Vec::with_capacity(request.fields.len());
    for (name, value) in request.fields {
        let field: ListingField = name
            .parse()
            .map_err(|e| draft_error(DraftError::InvalidInput(e)))?;
        updates.push((field, value));
    }

    let shared = load_draft(&app_state, id, &owner).await?;
    let mut draft = shared.lock().await;

    for (field, value) in updates {
        draft.set_field(field, value);
    }
    for (name, enabled) in request.features {
        draft.set_feature(name, enabled);
    }

    Ok(Json(DraftDto::new(id, &draft)))
}

/// Handle a validation run
pub async fn validate_draft(
    State(app_state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<ValidationResponseDto>, ApiError> {
    let shared = load_draft(&app_state, id, &owner).await?;
    let errors = shared.lock().await.validate();

    Ok(Json(ValidationResponseDto {
        valid: errors.is_empty(),
        errors,
    }))
}

/// Handle file selection (multipart, one part per file)
pub async fn select_images(
    State(app_state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<SelectionResponseDto>, ApiError> {
    let shared = load_draft(&app_state, id, &owner).await?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("Invalid multipart body: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(&format!("Failed to read {}: {}", file_name, e)))?;

        files.push(ImageFile::new(file_name, content_type, bytes));
    }
    debug!(draft_id = %id, files = files.len(), "Received selected files");

    let mut draft = shared.lock().await;
    let report = draft.select_images(files).map_err(image_error)?;

    Ok(Json(SelectionResponseDto::new(id, &draft, report)))
}

/// Handle removal of a staged image
pub async fn remove_image(
    State(app_state): State<AppState>,
    Owner(owner): Owner,
    Path((id, image_id)): Path<(Uuid, String)>,
) -> Result<Json<RemovalResponseDto>, ApiError> {
    let image_id = LocalImageId::parse(&image_id).map_err(|e| bad_request(&e.to_string()))?;

    let shared = load_draft(&app_state, id, &owner).await?;
    let mut draft = shared.lock().await;
    let outcome = draft.remove_image(image_id).await.map_err(image_error)?;

    Ok(Json(RemovalResponseDto::new(id, &draft, outcome)))
}

/// Serve the bytes behind a local preview
pub async fn get_preview(
    State(app_state): State<AppState>,
    Owner(owner): Owner,
    Path((id, preview_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    let shared = load_draft(&app_state, id, &owner).await?;

    let owned_by_draft = shared
        .lock()
        .await
        .images()
        .staged()
        .iter()
        .any(|image| image.preview.local_id() == Some(preview_id));
    if !owned_by_draft {
        return Err(not_found(&format!("Preview not found: {}", preview_id)));
    }

    let preview = app_state
        .previews
        .get(&preview_id)
        .ok_or_else(|| not_found(&format!("Preview not found: {}", preview_id)))?;

    Ok(([(header::CONTENT_TYPE, preview.content_type)], preview.bytes).into_response())
}

/// Handle uploading pending images without submitting
pub async fn flush_images(
    State(app_state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<FlushResponseDto>, ApiError> {
    let shared = load_draft(&app_state, id, &owner).await?;
    let images = shared
        .lock()
        .await
        .flush_images()
        .await
        .map_err(draft_error)?;

    Ok(Json(FlushResponseDto { images }))
}

/// Handle submit; the session ends when it succeeds
pub async fn submit_draft(
    State(app_state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SubmitResponseDto>), ApiError> {
    let shared = load_draft(&app_state, id, &owner).await?;
    let outcome = shared.lock().await.submit().await.map_err(draft_error)?;
    app_state.drafts.close(id).await;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(SubmitResponseDto::from(outcome))))
}

/// Handle retrying the image rows of a partially saved submit
pub async fn retry_images(
    State(app_state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmitResponseDto>, ApiError> {
    let shared = load_draft(&app_state, id, &owner).await?;
    let outcome = shared
        .lock()
        .await
        .retry_image_persistence()
        .await
        .map_err(draft_error)?;
    app_state.drafts.close(id).await;

    Ok(Json(SubmitResponseDto::from(outcome)))
}
