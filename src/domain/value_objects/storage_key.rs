use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;

/// Prefix under which listing photos are stored in the bucket
pub const IMAGE_KEY_PREFIX: &str = "car-images";

/// A validated object-store key for a listing image
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageKey(String);

impl StorageKey {
    /// Create a new StorageKey with validation
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyStorageKey);
        }

        if value.len() > 1024 {
            return Err(ValidationError::StorageKeyTooLong {
                actual: value.len(),
                max: 1024,
            });
        }

        if value.contains('\0') {
            return Err(ValidationError::InvalidStorageKeyCharacter('\0'));
        }

        if value.starts_with('/') {
            return Err(ValidationError::StorageKeyStartsWithSlash);
        }

        if value.contains("//") {
            return Err(ValidationError::StorageKeyContainsDoubleSlash);
        }

        Ok(Self(value))
    }

    /// Generate a fresh key for an upload, e.g. `car-images/<uuid>.jpg`.
    ///
    /// The extension comes from the file name when it has one, otherwise from
    /// the content-type subtype. Every call yields a new key.
    pub fn generate(file_name: &str, content_type: &str) -> Self {
        let ext = extension_of(file_name)
            .or_else(|| content_type.split('/').nth(1).map(|s| s.to_string()))
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| "bin".to_string());

        Self(format!(
            "{}/{}.{}",
            IMAGE_KEY_PREFIX,
            uuid::Uuid::new_v4(),
            ext.to_ascii_lowercase()
        ))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the file name part of the key (everything after the last '/')
    pub fn file_name(&self) -> &str {
        self.0.rfind('/').map_or(&self.0, |idx| &self.0[idx + 1..])
    }

    /// Check if this key has the given prefix
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_string())
}

impl TryFrom<String> for StorageKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StorageKey::new(value)
    }
}

impl From<StorageKey> for String {
    fn from(key: StorageKey) -> Self {
        key.0
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
