//! Collection-level persistence
//!
//! `Repository<T>` is the gateway between a document type and its
//! collection. It resolves the collection through the type's schema
//! (connection alias + collection name) on every call, so a repository is a
//! zero-sized value that can be created wherever it is needed.

use std::marker::PhantomData;

use bson::oid::ObjectId;
use bson::{doc, Bson, Document as BsonDocument};
use futures::TryStreamExt;
use mongodb::options::ReturnDocument;
use mongodb::Collection;

use monogram_common::{MonogramError, Result};
use monogram_validation::FieldType;

use crate::connection::ConnectionManager;
use crate::document::Document;
use crate::index::IndexSyncReport;
use crate::query::FindQuery;

/// Match and modification counts of an update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub matched: u64,
    pub modified: u64,
}

/// Persistence operations for one document type
pub struct Repository<T: Document> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> Default for Repository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Document> Repository<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Resolve the collection behind the schema's alias
    pub(crate) fn collection() -> Result<Collection<BsonDocument>> {
        let schema = T::schema();
        let database = ConnectionManager::database(schema.alias())?;
        Ok(database.collection(schema.collection()))
    }

    /// Start a find over the collection
    pub fn find(&self, filter: BsonDocument) -> FindQuery<T> {
        FindQuery::new(filter)
    }

    /// First match, or `None`
    pub async fn find_one(&self, filter: BsonDocument) -> Result<Option<T>> {
        let collection = Self::collection()?;
        match collection.find_one(filter).await? {
            Some(doc) => Ok(Some(T::from_wire(doc)?)),
            None => Ok(None),
        }
    }

    /// The single document matching the filter
    ///
    /// Errors with `NotFound` when nothing matches and `MultipleFound` when
    /// the filter is ambiguous; the check fetches at most two documents.
    pub async fn get(&self, filter: BsonDocument) -> Result<T> {
        let filter_text = filter.to_string();
        let mut cursor = self.find(filter).limit(2).run().await?;
        let first = cursor.try_next().await?;
        let second = cursor.try_next().await?;
        match (first, second) {
            (Some(doc), None) => Ok(doc),
            (None, _) => Err(MonogramError::NotFound(format!(
                "no {} document matches {}",
                T::schema().collection(),
                filter_text
            ))),
            (Some(_), Some(_)) => Err(MonogramError::MultipleFound(format!(
                "multiple {} documents match {}",
                T::schema().collection(),
                filter_text
            ))),
        }
    }

    /// The document with the given identity
    pub async fn get_by_id(&self, id: ObjectId) -> Result<T> {
        self.get(doc! { "_id": id }).await
    }

    /// Validate and insert, returning the document with its assigned id
    pub async fn create(&self, mut document: T) -> Result<T> {
        let wire = document.to_wire()?;
        let result = Self::collection()?.insert_one(wire).await?;
        if let Bson::ObjectId(id) = result.inserted_id {
            document.set_id(id);
        }
        Ok(document)
    }

    /// Insert a new document, or replace the stored copy when it has an id
    ///
    /// The replace upserts, so saving a document whose stored copy was
    /// deleted re-creates it under the same id.
    pub async fn save(&self, document: &mut T) -> Result<()> {
        let wire = document.to_wire()?;
        match document.id() {
            None => {
                let result = Self::collection()?.insert_one(wire).await?;
                if let Bson::ObjectId(id) = result.inserted_id {
                    document.set_id(id);
                }
            }
            Some(id) => {
                Self::collection()?
                    .replace_one(doc! { "_id": id }, wire)
                    .upsert(true)
                    .await?;
            }
        }
        Ok(())
    }

    /// Validate and insert a batch, assigning ids in place
    pub async fn insert_many(&self, documents: &mut [T]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }
        let mut wires = Vec::with_capacity(documents.len());
        for document in documents.iter() {
            wires.push(document.to_wire()?);
        }
        let result = Self::collection()?.insert_many(wires).await?;
        for (position, id) in result.inserted_ids {
            if let (Some(document), Bson::ObjectId(id)) = (documents.get_mut(position), id) {
                document.set_id(id);
            }
        }
        Ok(())
    }

    /// Apply an update document to the first match
    pub async fn update_one(
        &self,
        filter: BsonDocument,
        update: BsonDocument,
    ) -> Result<UpdateReport> {
        let result = Self::collection()?.update_one(filter, update).await?;
        Ok(UpdateReport {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    /// Apply an update document to every match
    pub async fn update_many(
        &self,
        filter: BsonDocument,
        update: BsonDocument,
    ) -> Result<UpdateReport> {
        let result = Self::collection()?.update_many(filter, update).await?;
        Ok(UpdateReport {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    /// Atomically update one document and return it
    ///
    /// `return_new` selects the post-update copy, otherwise the pre-update
    /// one. With `upsert`, a missing match is created first.
    pub async fn find_one_and_update(
        &self,
        filter: BsonDocument,
        update: BsonDocument,
        return_new: bool,
        upsert: bool,
    ) -> Result<Option<T>> {
        let return_document = if return_new {
            ReturnDocument::After
        } else {
            ReturnDocument::Before
        };
        let found = Self::collection()?
            .find_one_and_update(filter, update)
            .return_document(return_document)
            .upsert(upsert)
            .await?;
        match found {
            Some(doc) => Ok(Some(T::from_wire(doc)?)),
            None => Ok(None),
        }
    }

    /// Delete the stored copy of a document by its id
    pub async fn remove(&self, document: &T) -> Result<bool> {
        let id = document.id().ok_or_else(|| {
            MonogramError::Validation("document has no _id, nothing to remove".to_string())
        })?;
        self.delete_one(doc! { "_id": id }).await
    }

    /// Delete the first match; returns whether anything was deleted
    pub async fn delete_one(&self, filter: BsonDocument) -> Result<bool> {
        let result = Self::collection()?.delete_one(filter).await?;
        Ok(result.deleted_count > 0)
    }

    /// Delete every match; returns the deleted count
    pub async fn delete_many(&self, filter: BsonDocument) -> Result<u64> {
        let result = Self::collection()?.delete_many(filter).await?;
        Ok(result.deleted_count)
    }

    /// Count matching documents
    pub async fn count(&self, filter: BsonDocument) -> Result<u64> {
        Ok(Self::collection()?.count_documents(filter).await?)
    }

    /// Run an aggregation pipeline, returning raw stage output
    pub async fn aggregate(&self, pipeline: Vec<BsonDocument>) -> Result<Vec<BsonDocument>> {
        let cursor = Self::collection()?.aggregate(pipeline).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Next value for a monotonically increasing integer field
    ///
    /// Computed as max(field) + 1 over the collection, starting at 1 when
    /// the collection is empty. Safe only under a unique index on the field
    /// or a single writer.
    pub async fn next_sequence(&self, field: &str) -> Result<i64> {
        let pipeline = vec![doc! {
            "$group": { "_id": Bson::Null, "max": { "$max": format!("${}", field) } }
        }];
        let results = self.aggregate(pipeline).await?;
        Ok(next_in_sequence(
            results.first().and_then(|doc| doc.get("max")),
        ))
    }

    /// Reconcile declared indexes with the server
    ///
    /// Indexes present on the server but absent from the schema are dropped
    /// (`_id_` excepted); declared indexes missing on the server are
    /// created. Names are derived from the keys, so a changed declaration
    /// shows up as one drop plus one create.
    pub async fn sync_indexes(&self) -> Result<IndexSyncReport> {
        let schema = T::schema();
        for spec in schema.indexes() {
            if spec.ttl().is_some() {
                Self::check_ttl_spec(spec)?;
            }
        }

        let collection = Self::collection()?;
        // Listing indexes on a collection that does not exist yet errors;
        // treat that as "no indexes".
        let existing: Vec<String> = collection
            .list_index_names()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|name| name != "_id_")
            .collect();
        let desired: Vec<String> = schema.indexes().iter().map(|spec| spec.name()).collect();

        let mut report = IndexSyncReport::default();
        for name in &existing {
            if !desired.contains(name) {
                collection.drop_index(name).await?;
                tracing::info!(
                    collection = schema.collection(),
                    index = name.as_str(),
                    "dropped stale index"
                );
                report.dropped.push(name.clone());
            }
        }
        for spec in schema.indexes() {
            let name = spec.name();
            if !existing.contains(&name) {
                collection.create_index(spec.to_index_model()).await?;
                tracing::info!(
                    collection = schema.collection(),
                    index = name.as_str(),
                    "created index"
                );
                report.created.push(name);
            }
        }
        Ok(report)
    }

    /// A TTL index must cover exactly one datetime field
    fn check_ttl_spec(spec: &crate::index::IndexSpec) -> Result<()> {
        let schema = T::schema();
        let [(field, _)] = spec.keys() else {
            return Err(MonogramError::Validation(format!(
                "TTL index '{}' must have exactly one key",
                spec.name()
            )));
        };
        let declared = schema.fields().get(field).ok_or_else(|| {
            MonogramError::Validation(format!(
                "TTL index '{}' references undeclared field '{}'",
                spec.name(),
                field
            ))
        })?;
        if !matches!(declared.field_type(), FieldType::DateTime) {
            return Err(MonogramError::Validation(format!(
                "TTL index '{}' requires a datetime field, '{}' is {}",
                spec.name(),
                field,
                declared.field_type().type_name()
            )));
        }
        Ok(())
    }
}

/// Step the maximum seen so far, treating any numeric width as an integer
///
/// A double shows up when the field was ever written from a float source;
/// it truncates like an integer cast. Anything non-numeric restarts at 1.
fn next_in_sequence(max: Option<&Bson>) -> i64 {
    let current = match max {
        Some(Bson::Int32(n)) => Some(i64::from(*n)),
        Some(Bson::Int64(n)) => Some(*n),
        Some(Bson::Double(n)) => Some(*n as i64),
        _ => None,
    };
    current.map_or(1, |n| n + 1)
}
