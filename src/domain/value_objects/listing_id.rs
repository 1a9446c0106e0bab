use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;

/// Identifier of a persisted listing row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(i64);

impl ListingId {
    /// Create a new ListingId; database ids start at 1
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if value <= 0 {
            return Err(ValidationError::InvalidListingId(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Locally generated identifier of a staged image within one draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalImageId(uuid::Uuid);

impl LocalImageId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        uuid::Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| ValidationError::InvalidField {
                field: "image_id".to_string(),
                value: value.to_string(),
                expected: "a UUID".to_string(),
            })
    }
}

impl std::fmt::Display for LocalImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_id_must_be_positive() {
        assert!(ListingId::new(1).is_ok());
        assert!(ListingId::new(0).is_err());
        assert!(ListingId::new(-4).is_err());
    }

    #[test]
    fn test_local_image_id_round_trips_through_display() {
        let id = LocalImageId::generate();
        assert_eq!(LocalImageId::parse(&id.to_string()).unwrap(), id);
        assert!(LocalImageId::parse("not-a-uuid").is_err());
    }
}
