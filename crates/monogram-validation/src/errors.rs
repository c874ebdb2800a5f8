//! Validation error type
//!
//! Validation is fail-fast: the first field that rejects its value aborts
//! the whole document validation, so a single error is enough.

use monogram_common::MonogramError;
use thiserror::Error;

/// A single field validation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{}] {message}", self.field.as_deref().unwrap_or("document"))]
pub struct ValidationError {
    /// Name of the offending field, if the failure is attributable to one
    pub field: Option<String>,
    /// Human-readable failure message
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for a named field
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Create a required-field-missing error
    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("field {} is missing", field);
        Self {
            field: Some(field),
            message,
        }
    }

    /// Create a document-level error with no field attribution
    pub fn document(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for MonogramError {
    fn from(err: ValidationError) -> Self {
        MonogramError::Validation(err.to_string())
    }
}
