//! Named atomic counters
//!
//! A counter is one document in a dedicated collection, keyed by name, whose
//! `value` field is bumped with an atomic `$inc`. The first call to `next`
//! upserts the document, so counters need no provisioning.

use bson::{doc, Bson};

use monogram_common::{MonogramError, Result};

use crate::connection::ConnectionManager;

/// A named, server-side atomic counter
#[derive(Debug, Clone)]
pub struct Counter {
    alias: String,
    collection: String,
    name: String,
}

impl Counter {
    /// Counter `name` stored in the `counters` collection of `alias`
    pub fn new(alias: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            collection: "counters".to_string(),
            name: name.into(),
        }
    }

    /// Use a non-default collection for counter documents
    pub fn in_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn collection(&self) -> Result<mongodb::Collection<bson::Document>> {
        Ok(ConnectionManager::database(&self.alias)?.collection(&self.collection))
    }

    /// Current value without bumping
    ///
    /// Errors with `NotFound` if the counter was never incremented.
    pub async fn value(&self) -> Result<i64> {
        let found = self
            .collection()?
            .find_one(doc! { "_id": self.name.as_str() })
            .await?;
        let doc = found.ok_or_else(|| {
            MonogramError::NotFound(format!("counter '{}' does not exist", self.name))
        })?;
        match doc.get("value") {
            Some(Bson::Int32(n)) => Ok(i64::from(*n)),
            Some(Bson::Int64(n)) => Ok(*n),
            other => Err(MonogramError::Deserialization(format!(
                "counter '{}' holds a non-integer value: {:?}",
                self.name, other
            ))),
        }
    }

    /// Atomically bump and return the new value
    pub async fn next(&self) -> Result<i64> {
        let updated = self
            .collection()?
            .find_one_and_update(
                doc! { "_id": self.name.as_str() },
                doc! { "$inc": { "value": 1i64 } },
            )
            .return_document(mongodb::options::ReturnDocument::After)
            .upsert(true)
            .await?;
        let doc = updated.ok_or_else(|| {
            MonogramError::Database(format!("counter '{}' upsert returned nothing", self.name))
        })?;
        match doc.get("value") {
            Some(Bson::Int32(n)) => Ok(i64::from(*n)),
            Some(Bson::Int64(n)) => Ok(*n),
            other => Err(MonogramError::Deserialization(format!(
                "counter '{}' holds a non-integer value: {:?}",
                self.name, other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_defaults_to_counters_collection() {
        let counter = Counter::new("default", "invoices");
        assert_eq!(counter.collection, "counters");
        assert_eq!(counter.name(), "invoices");
    }

    #[test]
    fn test_counter_collection_override() {
        let counter = Counter::new("default", "invoices").in_collection("sequences");
        assert_eq!(counter.collection, "sequences");
    }
}
