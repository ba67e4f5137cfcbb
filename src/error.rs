//! Error types for bucketwise
//!
//! Application-level errors. Everything the allocation engine rejects about
//! a draft travels inside the `Allocation` variant as a full list.

use thiserror::Error;

use crate::services::AllocationErrors;

/// The main error type for bucketwise operations
#[derive(Error, Debug)]
pub enum BucketwiseError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML output errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// Malformed event form input
    #[error("Form error: {0}")]
    Form(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// The event draft was rejected
    #[error("Event rejected: {0}")]
    Allocation(AllocationErrors),
}

impl BucketwiseError {
    /// Create a "not found" error for accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for buckets
    pub fn bucket_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Bucket",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The engine's errors, when the draft itself was rejected
    pub fn allocation_errors(&self) -> Option<&AllocationErrors> {
        match self {
            Self::Allocation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BucketwiseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BucketwiseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for BucketwiseError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

impl From<AllocationErrors> for BucketwiseError {
    fn from(errors: AllocationErrors) -> Self {
        Self::Allocation(errors)
    }
}

/// Result type alias for bucketwise operations
pub type BucketwiseResult<T> = Result<T, BucketwiseError>;
