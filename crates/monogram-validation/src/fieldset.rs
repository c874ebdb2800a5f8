//! Ordered field sets
//!
//! A `FieldSet` is the declared shape of one document: an ordered mapping of
//! field name to `Field`, fixed at construction time. The builder is called
//! once per document type, typically inside a `Lazy` static, replacing the
//! registration-by-side-effect pattern common in dynamic-language mappers.

use bson::{Bson, Document};

use crate::errors::ValidationError;
use crate::field::Field;

/// Ordered, immutable set of field declarations
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    pub fn builder() -> FieldSetBuilder {
        FieldSetBuilder { fields: Vec::new() }
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate fields in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fill missing or null slots with declared defaults
    pub fn apply_defaults(&self, doc: &mut Document) {
        for field in &self.fields {
            let absent = match doc.get(field.name()) {
                None | Some(Bson::Null) => true,
                Some(_) => false,
            };
            if absent {
                if let Some(default) = field.default() {
                    doc.insert(field.name(), default.resolve());
                }
            }
        }
    }

    /// Validate a document, failing fast on the first invalid field
    ///
    /// Fields are checked in declaration order; keys not declared in the set
    /// are ignored.
    pub fn validate(&self, doc: &Document) -> Result<(), ValidationError> {
        for field in &self.fields {
            field.validate(doc.get(field.name()))?;
        }
        Ok(())
    }

    /// Convert a document to its wire form
    ///
    /// Declared fields are coerced, nulls and undeclared keys are dropped.
    /// No validation happens here; call [`FieldSet::validate`] first when the
    /// document comes from an untrusted source.
    pub fn to_wire(&self, mut doc: Document) -> Result<Document, ValidationError> {
        let mut result = Document::new();
        for field in &self.fields {
            match doc.remove(field.name()) {
                None | Some(Bson::Null) => {}
                Some(value) => {
                    result.insert(field.name(), field.to_wire(value)?);
                }
            }
        }
        Ok(result)
    }

    /// Rebuild an in-memory document from its stored wire form
    ///
    /// Defaults are applied first, then stored values are coerced on top.
    pub fn from_wire(&self, mut doc: Document) -> Result<Document, ValidationError> {
        let mut result = Document::new();
        self.apply_defaults(&mut result);
        for field in &self.fields {
            match doc.remove(field.name()) {
                None | Some(Bson::Null) => {}
                Some(value) => {
                    result.insert(field.name(), field.from_wire(value)?);
                }
            }
        }
        Ok(result)
    }

    /// Project a wire document to JSON
    ///
    /// The `_id` field is surfaced under the conventional `id` key.
    pub fn to_json(&self, doc: &Document) -> serde_json::Value {
        let mut result = serde_json::Map::new();
        for field in &self.fields {
            match doc.get(field.name()) {
                None | Some(Bson::Null) => {}
                Some(value) => {
                    let key = if field.name() == "_id" { "id" } else { field.name() };
                    result.insert(key.to_string(), field.to_json(value));
                }
            }
        }
        serde_json::Value::Object(result)
    }

    /// Build and validate a wire document from JSON
    ///
    /// Accepts either `id` or `_id` for the identity field. Defaults are
    /// applied and the result is validated (fail-fast) before it is returned.
    pub fn from_json(&self, value: &serde_json::Value) -> Result<Document, ValidationError> {
        let serde_json::Value::Object(map) = value else {
            return Err(ValidationError::document(format!(
                "expected a JSON object, got {}",
                value
            )));
        };

        let mut result = Document::new();
        for field in &self.fields {
            let slot = if field.name() == "_id" {
                map.get("id").or_else(|| map.get("_id"))
            } else {
                map.get(field.name())
            };
            match slot {
                None | Some(serde_json::Value::Null) => {}
                Some(json) => {
                    result.insert(field.name(), field.from_json(json)?);
                }
            }
        }
        self.apply_defaults(&mut result);
        self.validate(&result)?;
        Ok(result)
    }
}

/// Builder for [`FieldSet`], used once at type-definition time
#[derive(Debug, Default)]
pub struct FieldSetBuilder {
    fields: Vec<Field>,
}

impl FieldSetBuilder {
    /// Add a field declaration
    ///
    /// # Panics
    /// Panics on a duplicate field name; duplicates are a programming error
    /// in the type definition, not a runtime condition.
    pub fn field(mut self, field: Field) -> Self {
        assert!(
            !self.fields.iter().any(|f| f.name() == field.name()),
            "duplicate field declaration: {}",
            field.name()
        );
        self.fields.push(field);
        self
    }

    /// Add several field declarations
    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        for field in fields {
            self = self.field(field);
        }
        self
    }

    pub fn build(self) -> FieldSet {
        FieldSet {
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldValidator;
    use crate::types::FieldType;
    use bson::doc;

    fn contact_fields() -> FieldSet {
        FieldSet::builder()
            .field(Field::new("_id", FieldType::ObjectId))
            .field(Field::new("name", FieldType::string()).required())
            .field(Field::new("email", FieldType::string()).validator(FieldValidator::Email))
            .field(
                Field::new("status", FieldType::string())
                    .choices(["awaiting", "done"])
                    .default_value("awaiting"),
            )
            .field(Field::new("age", FieldType::int()))
            .build()
    }

    #[test]
    fn test_lookup_and_order() {
        let fields = contact_fields();
        assert_eq!(fields.len(), 5);
        assert!(fields.contains("email"));
        assert!(!fields.contains("unknown"));
        let names: Vec<_> = fields.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["_id", "name", "email", "status", "age"]);
    }

    #[test]
    #[should_panic(expected = "duplicate field declaration: name")]
    fn test_duplicate_field_panics() {
        let _ = FieldSet::builder()
            .field(Field::new("name", FieldType::string()))
            .field(Field::new("name", FieldType::string()));
    }

    #[test]
    fn test_validate_required_missing() {
        let fields = contact_fields();
        let err = fields.validate(&doc! { "email": "a@b.c" }).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("name"));
    }

    #[test]
    fn test_validate_fail_fast_order() {
        let fields = contact_fields();
        // Both name (missing) and status (bad choice) are invalid; the
        // earlier declaration wins.
        let err = fields
            .validate(&doc! { "status": "bogus" })
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("name"));
    }

    #[test]
    fn test_validate_choices() {
        let fields = contact_fields();
        let err = fields
            .validate(&doc! { "name": "n", "status": "bogus" })
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("status"));
    }

    #[test]
    fn test_apply_defaults() {
        let fields = contact_fields();
        let mut doc = doc! { "name": "n" };
        fields.apply_defaults(&mut doc);
        assert_eq!(doc.get_str("status").unwrap(), "awaiting");
        // Existing values are left alone.
        let mut doc = doc! { "name": "n", "status": "done" };
        fields.apply_defaults(&mut doc);
        assert_eq!(doc.get_str("status").unwrap(), "done");
    }

    #[test]
    fn test_to_wire_drops_nulls_and_unknown_keys() {
        let fields = contact_fields();
        let wire = fields
            .to_wire(doc! { "name": "n", "email": Bson::Null, "extra": 1 })
            .unwrap();
        assert_eq!(wire, doc! { "name": "n" });
    }

    #[test]
    fn test_wire_round_trip() {
        let fields = contact_fields();
        let original = doc! { "name": "n", "email": "a@b.c", "status": "done", "age": 30i64 };
        let wire = fields.to_wire(original.clone()).unwrap();
        let back = fields.from_wire(wire).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_from_wire_applies_defaults() {
        let fields = contact_fields();
        let back = fields.from_wire(doc! { "name": "n" }).unwrap();
        assert_eq!(back.get_str("status").unwrap(), "awaiting");
    }

    #[test]
    fn test_json_projection_renames_id() {
        let fields = contact_fields();
        let id = bson::oid::ObjectId::new();
        let json = fields.to_json(&doc! { "_id": id, "name": "n" });
        assert_eq!(json["id"], serde_json::json!(id.to_hex()));
        assert!(json.get("_id").is_none());
        assert_eq!(json["name"], serde_json::json!("n"));
    }

    #[test]
    fn test_from_json_accepts_id_alias() {
        let fields = contact_fields();
        let id = bson::oid::ObjectId::new();
        let doc = fields
            .from_json(&serde_json::json!({ "id": id.to_hex(), "name": "n" }))
            .unwrap();
        assert_eq!(doc.get_object_id("_id").unwrap(), id);
    }

    #[test]
    fn test_from_json_validates() {
        let fields = contact_fields();
        let err = fields
            .from_json(&serde_json::json!({ "email": "a@b.c" }))
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("name"));

        let err = fields
            .from_json(&serde_json::json!({ "name": "n", "status": "bogus" }))
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("status"));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let fields = contact_fields();
        assert!(fields.from_json(&serde_json::json!([1, 2])).is_err());
    }
}
