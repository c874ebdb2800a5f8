//! Document schemas
//!
//! A `Schema` binds a field set to its storage location: the connection
//! alias and collection name, plus declared indexes. One schema exists per
//! document type, built once in a `Lazy` static.

use bson::Document;
use monogram_validation::{Field, FieldSet, FieldType};

use crate::index::IndexSpec;
use monogram_common::Result;

/// Storage binding and shape of one document type
#[derive(Debug, Clone)]
pub struct Schema {
    alias: String,
    collection: String,
    fields: FieldSet,
    indexes: Vec<IndexSpec>,
}

impl Schema {
    /// Start building a schema bound to a connection alias and collection
    pub fn builder(alias: impl Into<String>, collection: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            alias: alias.into(),
            collection: collection.into(),
            fields: FieldSet::builder().field(Field::new("_id", FieldType::ObjectId)),
            indexes: Vec::new(),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn indexes(&self) -> &[IndexSpec] {
        &self.indexes
    }

    /// Validate a document against the field set, fail-fast
    pub fn validate(&self, doc: &Document) -> Result<()> {
        self.fields.validate(doc)?;
        Ok(())
    }

    /// Coerce a document to wire form; nulls and undeclared keys are dropped
    pub fn to_wire(&self, doc: Document) -> Result<Document> {
        Ok(self.fields.to_wire(doc)?)
    }

    /// Rebuild a document from its stored wire form, applying defaults
    pub fn from_wire(&self, doc: Document) -> Result<Document> {
        Ok(self.fields.from_wire(doc)?)
    }

    /// Project a wire document to JSON (`_id` surfaced as `id`)
    pub fn to_json(&self, doc: &Document) -> serde_json::Value {
        self.fields.to_json(doc)
    }

    /// Build and validate a wire document from JSON
    pub fn from_json(&self, value: &serde_json::Value) -> Result<Document> {
        Ok(self.fields.from_json(value)?)
    }
}

/// Builder for [`Schema`]
///
/// Every schema carries an `_id: ObjectId` field; it is declared first
/// automatically.
#[derive(Debug)]
pub struct SchemaBuilder {
    alias: String,
    collection: String,
    fields: monogram_validation::FieldSetBuilder,
    indexes: Vec<IndexSpec>,
}

impl SchemaBuilder {
    pub fn field(mut self, field: Field) -> Self {
        self.fields = self.fields.field(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields = self.fields.fields(fields);
        self
    }

    pub fn index(mut self, index: IndexSpec) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            alias: self.alias,
            collection: self.collection,
            fields: self.fields.build(),
            indexes: self.indexes,
        }
    }
}
