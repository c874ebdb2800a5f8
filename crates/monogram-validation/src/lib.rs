//! Monogram Validation
//!
//! Field descriptor layer for the monogram ODM.
//!
//! A document type declares its shape as a [`FieldSet`]: an ordered list of
//! [`Field`]s, each carrying a semantic [`FieldType`], a required flag, a
//! default, enumerated choices and optional extra validators. The field set
//! validates BSON documents fail-fast and performs the wire and JSON
//! coercions an ODM needs (hex string → ObjectId, RFC 3339 string →
//! datetime, decimal ↔ string, UUID ↔ binary).
//!
//! # Example
//!
//! ```rust
//! use monogram_validation::{Field, FieldSet, FieldType, FieldValidator};
//! use bson::doc;
//!
//! let fields = FieldSet::builder()
//!     .field(Field::new("name", FieldType::string()).required())
//!     .field(Field::new("email", FieldType::string()).validator(FieldValidator::Email))
//!     .field(
//!         Field::new("status", FieldType::string())
//!             .choices(["awaiting", "done"])
//!             .default_value("awaiting"),
//!     )
//!     .build();
//!
//! assert!(fields.validate(&doc! { "name": "contact" }).is_ok());
//! assert!(fields.validate(&doc! { "name": "contact", "status": "bogus" }).is_err());
//! ```

pub mod constraints;
pub mod errors;
pub mod field;
pub mod fieldset;
pub mod formats;
pub mod types;

pub use constraints::{NumericConstraints, StringConstraints};
pub use errors::ValidationError;
pub use field::{DefaultValue, Field, FieldValidator};
pub use fieldset::{FieldSet, FieldSetBuilder};
pub use types::FieldType;

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
