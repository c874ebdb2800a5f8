//! Error types for monogram

use thiserror::Error;

/// Result type alias for monogram operations
pub type Result<T> = std::result::Result<T, MonogramError>;

/// Unified error type for all monogram operations
#[derive(Error, Debug, Clone)]
pub enum MonogramError {
    /// A field value failed schema validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A `get` matched zero documents
    #[error("Not found: {0}")]
    NotFound(String),

    /// A `get` matched more than one document
    #[error("Multiple documents found: {0}")]
    MultipleFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    /// Pass-through driver error (duplicate key, write failure, ...)
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Query error: {0}")]
    Query(String),
}

impl MonogramError {
    /// Returns true if the error indicates an identity lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, MonogramError::NotFound(_))
    }

    /// Returns true if the error originated in schema validation
    pub fn is_validation(&self) -> bool {
        matches!(self, MonogramError::Validation(_))
    }
}

impl From<serde_json::Error> for MonogramError {
    fn from(err: serde_json::Error) -> Self {
        MonogramError::Serialization(err.to_string())
    }
}

// MongoDB-specific error conversions (when mongodb-errors feature is enabled)
#[cfg(feature = "mongodb-errors")]
impl From<mongodb::error::Error> for MonogramError {
    fn from(err: mongodb::error::Error) -> Self {
        MonogramError::Database(err.to_string())
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::ser::Error> for MonogramError {
    fn from(err: bson::ser::Error) -> Self {
        MonogramError::Serialization(format!("BSON serialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::de::Error> for MonogramError {
    fn from(err: bson::de::Error) -> Self {
        MonogramError::Deserialization(format!("BSON deserialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::oid::Error> for MonogramError {
    fn from(err: bson::oid::Error) -> Self {
        MonogramError::Validation(format!("Invalid ObjectId: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let err = MonogramError::Validation("field status is missing".to_string());
        assert_eq!(err.to_string(), "Validation error: field status is missing");
    }

    #[test]
    fn test_error_display_not_found() {
        let err = MonogramError::NotFound("{\"name\": \"x\"}".to_string());
        assert_eq!(err.to_string(), "Not found: {\"name\": \"x\"}");
    }

    #[test]
    fn test_error_display_multiple_found() {
        let err = MonogramError::MultipleFound("{}".to_string());
        assert_eq!(err.to_string(), "Multiple documents found: {}");
    }

    #[test]
    fn test_error_display_connection() {
        let err = MonogramError::Connection("no connection for alias 'main'".to_string());
        assert_eq!(
            err.to_string(),
            "Connection error: no connection for alias 'main'"
        );
    }

    #[test]
    fn test_error_display_database() {
        let err = MonogramError::Database("duplicate key".to_string());
        assert_eq!(err.to_string(), "Database error: duplicate key");
    }

    #[test]
    fn test_error_classification() {
        assert!(MonogramError::NotFound("x".to_string()).is_not_found());
        assert!(!MonogramError::Database("x".to_string()).is_not_found());
        assert!(MonogramError::Validation("x".to_string()).is_validation());
        assert!(!MonogramError::NotFound("x".to_string()).is_validation());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: MonogramError = json_err.into();
        assert!(matches!(err, MonogramError::Serialization(_)));
    }

    #[test]
    fn test_result_type_err() {
        let result: Result<i32> = Err(MonogramError::Query("failed".to_string()));
        assert!(result.is_err());
    }
}
