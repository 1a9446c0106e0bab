use std::collections::BTreeMap;

/// Validation errors for domain value objects and selected files
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // StorageKey validation errors
    EmptyStorageKey,
    StorageKeyTooLong {
        actual: usize,
        max: usize,
    },
    InvalidStorageKeyCharacter(char),
    StorageKeyStartsWithSlash,
    StorageKeyContainsDoubleSlash,

    // Identifier validation errors
    InvalidListingId(i64),

    // Listing form errors
    UnknownField(String),

    // Selected file errors
    NotAnImage {
        file_name: String,
        content_type: String,
    },
    EmptyFile {
        file_name: String,
    },

    InvalidField {
        field: String,
        value: String,
        expected: String,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyStorageKey => write!(f, "Storage key cannot be empty"),
            ValidationError::StorageKeyTooLong { actual, max } => {
                write!(f, "Storage key too long: {} bytes (max: {})", actual, max)
            }
            ValidationError::InvalidStorageKeyCharacter(c) => {
                write!(f, "Invalid character in storage key: '{}'", c)
            }
            ValidationError::StorageKeyStartsWithSlash => {
                write!(f, "Storage key cannot start with '/'")
            }
            ValidationError::StorageKeyContainsDoubleSlash => {
                write!(f, "Storage key cannot contain '//'")
            }
            ValidationError::InvalidListingId(id) => {
                write!(f, "Invalid listing id: {}", id)
            }
            ValidationError::UnknownField(name) => {
                write!(f, "Unknown listing field: {}", name)
            }
            ValidationError::NotAnImage {
                file_name,
                content_type,
            } => {
                write!(
                    f,
                    "File '{}' is not an image (content type: {})",
                    file_name, content_type
                )
            }
            ValidationError::EmptyFile { file_name } => {
                write!(f, "File '{}' is empty", file_name)
            }
            ValidationError::InvalidField {
                field,
                value,
                expected,
            } => {
                write!(
                    f,
                    "Invalid value for field '{}': '{}' (expected: {})",
                    field, value, expected
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Field-level form errors, keyed by field name.
///
/// Empty means the draft is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}
