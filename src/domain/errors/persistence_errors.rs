use crate::domain::value_objects::ListingId;

/// Errors raised by the listing repository
#[derive(Debug, Clone)]
pub enum PersistenceError {
    /// Listing row does not exist
    ListingNotFound { id: ListingId },

    /// The database returned something the domain cannot represent
    CorruptRow { message: String },

    /// Database/driver failure
    DatabaseError {
        message: String,
        source: Option<String>,
    },
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::ListingNotFound { id } => {
                write!(f, "Listing not found: {}", id)
            }
            PersistenceError::CorruptRow { message } => {
                write!(f, "Corrupt listing row: {}", message)
            }
            PersistenceError::DatabaseError { message, .. } => {
                write!(f, "Database error: {}", message)
            }
        }
    }
}

impl std::error::Error for PersistenceError {}

/// Result type for repository operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;
