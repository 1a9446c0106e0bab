pub mod dto;
pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod session;

pub use dto::*;
pub use errors::ApiError;
pub use extractors::{Owner, USER_EMAIL_HEADER};
pub use handlers::*;
pub use router::*;
pub use session::{DraftSessions, SharedDraft, DEFAULT_DRAFT_IDLE_TIMEOUT};
