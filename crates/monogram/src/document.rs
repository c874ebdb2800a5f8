//! The document trait
//!
//! A document type is a plain serde struct plus a static [`Schema`]. The
//! struct is the in-memory representation; the schema owns validation and
//! the wire and JSON coercions. Persistence goes through
//! [`Repository`](crate::repository::Repository), with `save` and `remove`
//! offered here as conveniences on the instance itself.

use async_trait::async_trait;
use bson::oid::ObjectId;
use serde::de::DeserializeOwned;
use serde::Serialize;

use monogram_common::{MonogramError, Result};

use crate::repository::Repository;
use crate::schema::Schema;

/// A persistable document type
///
/// Implementors provide the schema and access to the identity field; the
/// conversion and persistence methods come for free.
#[async_trait]
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Sized {
    /// The type's schema, built once in a static
    fn schema() -> &'static Schema;

    /// Identity, if the document has been assigned one
    fn id(&self) -> Option<ObjectId>;

    /// Record the identity assigned on insert
    fn set_id(&mut self, id: ObjectId);

    /// Validate the document against its schema without persisting it
    fn validate(&self) -> Result<()> {
        let doc = bson::to_document(self)?;
        Self::schema().validate(&doc)
    }

    /// Serialize, validate and coerce to the stored wire form
    fn to_wire(&self) -> Result<bson::Document> {
        let doc = bson::to_document(self)?;
        Self::schema().validate(&doc)?;
        Self::schema().to_wire(doc)
    }

    /// Rebuild an instance from a stored wire document
    ///
    /// Stored data is trusted: defaults are applied and values coerced, but
    /// no validation runs.
    fn from_wire(doc: bson::Document) -> Result<Self> {
        let doc = Self::schema().from_wire(doc)?;
        Ok(bson::from_document(doc)?)
    }

    /// Project the document to JSON (`_id` surfaced as `id`)
    fn to_json(&self) -> Result<serde_json::Value> {
        Ok(Self::schema().to_json(&self.to_wire()?))
    }

    /// Build a validated instance from JSON input
    fn from_json(value: &serde_json::Value) -> Result<Self> {
        let doc = Self::schema().from_json(value)?;
        Ok(bson::from_document(doc)?)
    }

    /// Insert the document, or replace the stored copy if it has an id
    async fn save(&mut self) -> Result<()> {
        Repository::<Self>::new().save(self).await
    }

    /// Delete the stored copy of this document
    ///
    /// Fails with a validation error if the document was never saved.
    async fn remove(&self) -> Result<bool> {
        let id = self.id().ok_or_else(|| {
            MonogramError::Validation("document has no _id, nothing to remove".to_string())
        })?;
        Repository::<Self>::new()
            .delete_one(bson::doc! { "_id": id })
            .await
    }
}
