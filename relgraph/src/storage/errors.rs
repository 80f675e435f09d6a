//! Error types for storage operations

use std::error::Error;
use std::fmt;

/// Error type for storage operations
#[derive(Debug)]
pub enum StorageError {
    /// Configuration error
    Configuration(String),

    /// Connection error
    Connection(String),

    /// Operation error
    Operation(String),

    /// Validation error (malformed document or mutation)
    Validation(String),

    /// Data not found
    NotFound(String),

    /// Item already exists, or a unique field is already taken
    AlreadyExists(String),

    /// Serialization/deserialization error
    Serialization(String),

    /// Type mismatch error
    TypeMismatch(String),

    /// Storage timeout error
    Timeout(String),

    /// Temporary/transient error
    Temporary(String),

    /// Internal error
    Internal(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Whether the failure is transient, so that retrying the same idempotent
    /// request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::Connection(_)
                | StorageError::Operation(_)
                | StorageError::Timeout(_)
                | StorageError::Temporary(_)
        )
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            StorageError::Connection(msg) => write!(f, "Connection error: {}", msg),
            StorageError::Operation(msg) => write!(f, "Operation error: {}", msg),
            StorageError::Validation(msg) => write!(f, "Validation error: {}", msg),
            StorageError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StorageError::AlreadyExists(msg) => write!(f, "Already exists: {}", msg),
            StorageError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            StorageError::TypeMismatch(msg) => write!(f, "Type mismatch: {}", msg),
            StorageError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            StorageError::Temporary(msg) => write!(f, "Temporary error: {}", msg),
            StorageError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl Error for StorageError {}

/// Convert a JSON error to a storage error
impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Convert a standard IO error to a storage error
impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Operation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(StorageError::Timeout("slow".into()).is_transient());
        assert!(StorageError::Connection("refused".into()).is_transient());
        assert!(!StorageError::NotFound("user:1".into()).is_transient());
        assert!(!StorageError::Validation("bad".into()).is_transient());
    }

    #[test]
    fn test_display_prefixes() {
        let err = StorageError::AlreadyExists("user_name 'ada' is taken".into());
        assert_eq!(err.to_string(), "Already exists: user_name 'ada' is taken");
    }
}
