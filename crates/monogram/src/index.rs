//! Index declarations
//!
//! Schemas declare the indexes their collection should carry; the repository
//! reconciles the declaration against the server with
//! `Repository::sync_indexes`. Index names are derived from the keys so the
//! same declaration always maps to the same server-side index.

use std::time::Duration;

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::IndexModel;

/// Sort order of one index key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrder {
    Ascending,
    Descending,
}

impl IndexOrder {
    fn as_i32(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

/// Declaration of one collection index
#[derive(Debug, Clone)]
pub struct IndexSpec {
    keys: Vec<(String, IndexOrder)>,
    unique: bool,
    background: bool,
    expire_after: Option<Duration>,
}

impl IndexSpec {
    /// Single ascending-key index
    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new([(field.into(), IndexOrder::Ascending)])
    }

    /// Single descending-key index
    pub fn descending(field: impl Into<String>) -> Self {
        Self::new([(field.into(), IndexOrder::Descending)])
    }

    /// Compound index over the given keys, in order
    pub fn new(keys: impl IntoIterator<Item = (String, IndexOrder)>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            unique: false,
            background: true,
            expire_after: None,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn foreground(mut self) -> Self {
        self.background = false;
        self
    }

    /// Turn the index into a TTL index
    ///
    /// Only valid on a single-key index over a datetime field; the
    /// repository rejects anything else at sync time.
    pub fn expire_after(mut self, ttl: Duration) -> Self {
        self.expire_after = Some(ttl);
        self
    }

    pub fn keys(&self) -> &[(String, IndexOrder)] {
        &self.keys
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.expire_after
    }

    /// Deterministic index name: `field_1_other_-1`
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|(field, order)| format!("{}_{}", field, order.as_i32()))
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Driver-level index model
    pub fn to_index_model(&self) -> IndexModel {
        let mut keys = Document::new();
        for (field, order) in &self.keys {
            keys.insert(field, order.as_i32());
        }
        let options = IndexOptions::builder()
            .name(self.name())
            .unique(self.unique)
            .background(self.background)
            .expire_after(self.expire_after)
            .build();
        IndexModel::builder().keys(keys).options(options).build()
    }
}

/// Outcome of one index reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSyncReport {
    /// Names of indexes created on the server
    pub created: Vec<String>,
    /// Names of stale indexes dropped from the server
    pub dropped: Vec<String>,
}

impl IndexSyncReport {
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.dropped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_key_name() {
        assert_eq!(IndexSpec::ascending("email").name(), "email_1");
        assert_eq!(IndexSpec::descending("created_at").name(), "created_at_-1");
    }

    #[test]
    fn test_compound_name() {
        let spec = IndexSpec::new([
            ("status".to_string(), IndexOrder::Ascending),
            ("created_at".to_string(), IndexOrder::Descending),
        ]);
        assert_eq!(spec.name(), "status_1_created_at_-1");
    }

    #[test]
    fn test_index_model_carries_options() {
        let spec = IndexSpec::ascending("email")
            .unique()
            .expire_after(Duration::from_secs(3600));
        let model = spec.to_index_model();
        assert_eq!(model.keys, doc! { "email": 1 });
        let options = model.options.unwrap();
        assert_eq!(options.name.as_deref(), Some("email_1"));
        assert_eq!(options.unique, Some(true));
        assert_eq!(options.expire_after, Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_sync_report_noop() {
        assert!(IndexSyncReport::default().is_noop());
        let report = IndexSyncReport {
            created: vec!["email_1".into()],
            dropped: vec![],
        };
        assert!(!report.is_noop());
    }
}
