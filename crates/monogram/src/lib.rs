//! Monogram
//!
//! A thin async ODM over the official MongoDB Rust driver.
//!
//! The layer stays deliberately small: serde structs are the in-memory
//! representation, a per-type [`Schema`] owns validation and the wire/JSON
//! coercions, and [`Repository`] maps schema operations onto driver calls.
//! Connections are registered once under named aliases via
//! [`ConnectionManager`]; schemas reference aliases only.
//!
//! # Example
//!
//! ```rust,no_run
//! use bson::oid::ObjectId;
//! use monogram::{
//!     ConnectionManager, ConnectionSettings, Document, Field, FieldType, Repository, Schema,
//! };
//! use once_cell::sync::Lazy;
//! use serde::{Deserialize, Serialize};
//!
//! static TASK_SCHEMA: Lazy<Schema> = Lazy::new(|| {
//!     Schema::builder("default", "tasks")
//!         .field(Field::new("title", FieldType::string()).required())
//!         .build()
//! });
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Task {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     id: Option<ObjectId>,
//!     title: String,
//! }
//!
//! impl Document for Task {
//!     fn schema() -> &'static Schema {
//!         &TASK_SCHEMA
//!     }
//!     fn id(&self) -> Option<ObjectId> {
//!         self.id
//!     }
//!     fn set_id(&mut self, id: ObjectId) {
//!         self.id = Some(id);
//!     }
//! }
//!
//! # async fn demo() -> monogram::Result<()> {
//! ConnectionManager::connect_alias(
//!     "default",
//!     &ConnectionSettings::new("mongodb://localhost:27017/app"),
//! )
//! .await?;
//!
//! let repo = Repository::<Task>::new();
//! let task = repo.create(Task { id: None, title: "write docs".into() }).await?;
//! let found = repo.get_by_id(task.id().expect("assigned on insert")).await?;
//! assert_eq!(found.title, "write docs");
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod cursor;
pub mod document;
pub mod helpers;
pub mod index;
pub mod query;
pub mod repository;
pub mod schema;

pub use connection::{Connection, ConnectionManager, ConnectionSettings, PoolConfig};
pub use cursor::DocumentCursor;
pub use document::Document;
pub use helpers::{Counter, Timestamps};
pub use index::{IndexOrder, IndexSpec, IndexSyncReport};
pub use query::FindQuery;
pub use repository::{Repository, UpdateReport};
pub use schema::{Schema, SchemaBuilder};

pub use monogram_common::{MonogramError, Result};
pub use monogram_validation::{
    DefaultValue, Field, FieldSet, FieldType, FieldValidator, NumericConstraints,
    StringConstraints, ValidationError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
