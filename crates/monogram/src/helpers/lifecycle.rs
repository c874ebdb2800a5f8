//! Lifecycle timestamps
//!
//! An embeddable struct tracking when a document was created, last touched
//! and soft-deleted, plus the matching field declarations for schemas that
//! flatten it in.

use bson::Bson;
use serde::{Deserialize, Serialize};

use monogram_validation::{Field, FieldType};

/// Created/updated/deleted markers for a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: bson::DateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<bson::DateTime>,
}

impl Default for Timestamps {
    fn default() -> Self {
        Self::new()
    }
}

impl Timestamps {
    pub fn new() -> Self {
        Self {
            created_at: bson::DateTime::now(),
            updated_at: None,
            deleted_at: None,
        }
    }

    /// Record a modification
    pub fn touch(&mut self) {
        self.updated_at = Some(bson::DateTime::now());
    }

    /// Record a soft delete
    pub fn mark_deleted(&mut self) {
        self.deleted_at = Some(bson::DateTime::now());
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Field declarations for schemas that store the markers top-level
    pub fn fields() -> Vec<Field> {
        vec![
            Field::new("created_at", FieldType::DateTime)
                .default_factory(|| Bson::DateTime(bson::DateTime::now())),
            Field::new("updated_at", FieldType::DateTime),
            Field::new("deleted_at", FieldType::DateTime),
        ]
    }
}
