//! Find query builder
//!
//! Fluent builder over a find: filter plus sort, skip, limit and projection.
//! `run` executes the query and hands back a typed cursor; `to_vec` is the
//! drain-it-all shorthand.

use std::marker::PhantomData;

use bson::Document as BsonDocument;

use monogram_common::Result;

use crate::cursor::DocumentCursor;
use crate::document::Document;
use crate::repository::Repository;

/// A find in progress
#[derive(Debug, Clone)]
pub struct FindQuery<T: Document> {
    filter: BsonDocument,
    sort: Option<BsonDocument>,
    skip: Option<u64>,
    limit: Option<i64>,
    projection: Option<BsonDocument>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> FindQuery<T> {
    pub(crate) fn new(filter: BsonDocument) -> Self {
        Self {
            filter,
            sort: None,
            skip: None,
            limit: None,
            projection: None,
            _marker: PhantomData,
        }
    }

    /// Sort specification, e.g. `doc! { "created_at": -1 }`
    pub fn sort(mut self, sort: BsonDocument) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Number of matching documents to skip
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Maximum number of documents to return
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Field projection to apply server-side
    pub fn projection(mut self, projection: BsonDocument) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn filter(&self) -> &BsonDocument {
        &self.filter
    }

    /// Execute and return a typed cursor
    pub async fn run(self) -> Result<DocumentCursor<T>> {
        let collection = Repository::<T>::collection()?;
        let mut find = collection.find(self.filter);
        if let Some(sort) = self.sort {
            find = find.sort(sort);
        }
        if let Some(skip) = self.skip {
            find = find.skip(skip);
        }
        if let Some(limit) = self.limit {
            find = find.limit(limit);
        }
        if let Some(projection) = self.projection {
            find = find.projection(projection);
        }
        Ok(DocumentCursor::new(find.await?))
    }

    /// Execute and drain into a vector
    pub async fn to_vec(self) -> Result<Vec<T>> {
        self.run().await?.to_vec().await
    }
}
