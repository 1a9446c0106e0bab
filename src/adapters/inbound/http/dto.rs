use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::{
    domain::{
        errors::{DraftError, FieldErrors, ImageError, ListingError, UploadFailure},
        models::{Features, ImageRecord, ImageState, ListingWithImages, StagedImage, StoredImage},
        value_objects::{ListingId, LocalImageId},
    },
    ports::services::DeleteListingOutcome,
    services::{DraftMode, ListingDraft, RemovalOutcome, SelectionReport, SubmitOutcome},
};

/// DTO for a persisted listing with its images
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDto {
    pub id: ListingId,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
    pub features: Features,
    pub created_by: String,
    pub posted_on: NaiveDate,
    pub updated_by: Option<String>,
    pub updated_on: Option<NaiveDate>,
    pub images: Vec<StoredImage>,
}

/// DTO for opening a draft; `listingId` switches to edit mode
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenDraftDto {
    pub listing_id: Option<i64>,
}

/// DTO for patching draft fields and feature checkboxes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDraftDto {
    #[serde(default)]
    pub fields: HashMap<String, String>,
    #[serde(default)]
    pub features: HashMap<String, bool>,
}

/// DTO for one image of a draft
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftImageDto {
    pub local_id: LocalImageId,
    /// "uploaded", "pending" or "failed"
    pub status: String,
    pub file_name: String,
    pub preview_url: String,
    pub image_url: Option<String>,
    pub storage_id: Option<String>,
    pub last_error: Option<String>,
}

/// DTO for the state of a draft session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftDto {
    pub draft_id: Uuid,
    /// "create" or "edit"
    pub mode: String,
    pub listing_id: Option<ListingId>,
    pub fields: BTreeMap<String, String>,
    pub features: Features,
    pub errors: FieldErrors,
    pub images: Vec<DraftImageDto>,
    /// Set after a submit saved the listing but not its images
    pub unsaved_images: Option<ListingId>,
}

/// DTO for a validation run
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResponseDto {
    pub valid: bool,
    pub errors: FieldErrors,
}

/// DTO for the result of selecting files
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponseDto {
    pub staged: Vec<LocalImageId>,
    pub duplicates: usize,
    pub rejected: Vec<String>,
    pub images: Vec<DraftImageDto>,
}

/// DTO for the result of removing an image
#[derive(Debug, Clone, Serialize)]
pub struct RemovalResponseDto {
    pub images: Vec<DraftImageDto>,
    pub warning: Option<String>,
}

/// DTO for the result of a flush
#[derive(Debug, Clone, Serialize)]
pub struct FlushResponseDto {
    pub images: Vec<ImageRecord>,
}

/// DTO for a successful submit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseDto {
    pub listing_id: ListingId,
    pub created: bool,
    pub images: Vec<StoredImage>,
}

/// DTO for a deleted listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteListingResponseDto {
    pub listing_id: ListingId,
    pub images_deleted: usize,
    pub storage_warnings: Vec<String>,
}

/// DTO for error responses
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponseDto {
    pub error: String,
    pub message: String,
    pub details: Option<HashMap<String, serde_json::Value>>,
    pub timestamp: DateTime<Utc>,
}

/// DTO for success responses
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponseDto {
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

// Conversion implementations

impl From<ListingWithImages> for ListingDto {
    fn from(listing: ListingWithImages) -> Self {
        let ListingWithImages { listing, images } = listing;
        ListingDto {
            id: listing.id,
            fields: listing.fields.to_json_map(),
            features: listing.features,
            created_by: listing.created_by,
            posted_on: listing.posted_on,
            updated_by: listing.updated_by,
            updated_on: listing.updated_on,
            images,
        }
    }
}

impl DraftImageDto {
    pub fn from_staged(draft_id: Uuid, image: &StagedImage) -> Self {
        let preview_url = match image.preview.local_id() {
            Some(preview_id) => format!("/drafts/{}/previews/{}", draft_id, preview_id),
            None => image.preview.remote_url().unwrap_or_default().to_string(),
        };

        let (status, record, last_error) = match &image.state {
            ImageState::Uploaded { record } => ("uploaded", Some(record), None),
            ImageState::Failed { reason, .. } => ("failed", None, Some(reason.clone())),
            _ => ("pending", None, None),
        };

        DraftImageDto {
            local_id: image.id,
            status: status.to_string(),
            file_name: image.file_name.clone(),
            preview_url,
            image_url: record.map(|r| r.image_url.clone()),
            storage_id: record.map(|r| r.storage_id.to_string()),
            last_error,
        }
    }

    pub fn list(draft_id: Uuid, draft: &ListingDraft) -> Vec<Self> {
        draft
            .images()
            .staged()
            .iter()
            .map(|image| Self::from_staged(draft_id, image))
            .collect()
    }
}

impl DraftDto {
    pub fn new(draft_id: Uuid, draft: &ListingDraft) -> Self {
        let mode = match draft.mode() {
            DraftMode::Create => "create",
            DraftMode::Edit { .. } => "edit",
        };

        DraftDto {
            draft_id,
            mode: mode.to_string(),
            listing_id: draft.mode().listing_id(),
            fields: draft.fields().to_json_map(),
            features: draft.features().clone(),
            errors: draft.errors().clone(),
            images: DraftImageDto::list(draft_id, draft),
            unsaved_images: draft.unsaved_images(),
        }
    }
}

impl SelectionResponseDto {
    pub fn new(draft_id: Uuid, draft: &ListingDraft, report: SelectionReport) -> Self {
        SelectionResponseDto {
            staged: report.staged,
            duplicates: report.duplicates,
            rejected: report.rejected.iter().map(ToString::to_string).collect(),
            images: DraftImageDto::list(draft_id, draft),
        }
    }
}

impl RemovalResponseDto {
    pub fn new(draft_id: Uuid, draft: &ListingDraft, outcome: RemovalOutcome) -> Self {
        RemovalResponseDto {
            images: DraftImageDto::list(draft_id, draft),
            warning: outcome.warning.map(|w| w.to_string()),
        }
    }
}

impl From<SubmitOutcome> for SubmitResponseDto {
    fn from(outcome: SubmitOutcome) -> Self {
        SubmitResponseDto {
            listing_id: outcome.listing_id,
            created: outcome.created,
            images: outcome.images,
        }
    }
}

impl From<DeleteListingOutcome> for DeleteListingResponseDto {
    fn from(outcome: DeleteListingOutcome) -> Self {
        DeleteListingResponseDto {
            listing_id: outcome.listing_id,
            images_deleted: outcome.images_deleted,
            storage_warnings: outcome
                .storage_warnings
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

fn upload_details(failure: &UploadFailure) -> HashMap<String, serde_json::Value> {
    let failed: Vec<serde_json::Value> = failure
        .failed
        .iter()
        .map(|f| {
            serde_json::json!({
                "localId": f.local_id,
                "fileName": f.file_name,
                "reason": f.reason,
            })
        })
        .collect();

    let mut details = HashMap::new();
    details.insert("failed".to_string(), serde_json::Value::Array(failed));
    details.insert(
        "uploaded".to_string(),
        serde_json::Value::Number(failure.uploaded.into()),
    );
    details
}

impl ErrorResponseDto {
    fn build(error: &str, message: String, details: HashMap<String, serde_json::Value>) -> Self {
        ErrorResponseDto {
            error: error.to_string(),
            message,
            details: if details.is_empty() {
                None
            } else {
                Some(details)
            },
            timestamp: Utc::now(),
        }
    }

    pub fn from_image_error(error: &ImageError) -> Self {
        let mut details = HashMap::new();

        match error {
            ImageError::NoNewUniqueImages {
                duplicates,
                rejected,
            } => {
                details.insert(
                    "duplicates".to_string(),
                    serde_json::Value::Number((*duplicates).into()),
                );
                details.insert(
                    "rejected".to_string(),
                    serde_json::Value::Array(
                        rejected
                            .iter()
                            .map(|e| serde_json::Value::String(e.to_string()))
                            .collect(),
                    ),
                );
            }
            ImageError::ImageNotFound(id) => {
                details.insert(
                    "localId".to_string(),
                    serde_json::Value::String(id.to_string()),
                );
            }
            ImageError::Upload(failure) => details = upload_details(failure),
        }

        Self::build("ImageError", error.to_string(), details)
    }

    pub fn from_draft_error(error: &DraftError) -> Self {
        let mut details = HashMap::new();

        match error {
            DraftError::Image(image_error) => return Self::from_image_error(image_error),
            DraftError::Validation(errors) => {
                details.insert(
                    "fields".to_string(),
                    serde_json::to_value(errors).unwrap_or_default(),
                );
            }
            DraftError::Upload(failure) => details = upload_details(failure),
            DraftError::PartialPersistence { listing_id, .. } => {
                details.insert(
                    "listingId".to_string(),
                    serde_json::Value::Number(listing_id.value().into()),
                );
            }
            _ => {}
        }

        Self::build("DraftError", error.to_string(), details)
    }

    pub fn from_listing_error(error: &ListingError) -> Self {
        let mut details = HashMap::new();

        match error {
            ListingError::NotFound(id) | ListingError::NotOwner { listing_id: id, .. } => {
                details.insert(
                    "listingId".to_string(),
                    serde_json::Value::Number(id.value().into()),
                );
            }
            ListingError::Persistence(_) => {}
        }

        Self::build("ListingError", error.to_string(), details)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::build("BadRequest", message.to_string(), HashMap::new())
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::build("Unauthorized", message.to_string(), HashMap::new())
    }

    pub fn not_found(message: &str) -> Self {
        Self::build("NotFound", message.to_string(), HashMap::new())
    }
}

impl SuccessResponseDto {
    pub fn new(message: &str) -> Self {
        SuccessResponseDto {
            message: message.to_string(),
            data: None,
            timestamp: Utc::now(),
        }
    }
}
