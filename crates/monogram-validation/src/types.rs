//! Semantic field types
//!
//! A `FieldType` is the type tag of one document attribute. It knows how to
//! validate a BSON value, how to coerce it to and from its wire form, and how
//! to project it to and from JSON. Coercions are the usual ODM normalizations:
//! hex strings become ObjectIds, RFC 3339 strings become datetimes, decimals
//! travel as strings.

use std::str::FromStr;
use std::sync::Arc;

use bson::spec::BinarySubtype;
use bson::{Binary, Bson, Document};
use chrono::{DateTime as ChronoDateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::constraints::{NumericConstraints, StringConstraints};
use crate::errors::ValidationError;
use crate::fieldset::FieldSet;
use crate::formats;

/// Semantic type tag for one document field
#[derive(Debug, Clone)]
pub enum FieldType {
    /// UTF-8 string with optional length/pattern constraints
    String(StringConstraints),
    /// 64-bit integer (accepts Int32 on the way in)
    Int(NumericConstraints<i64>),
    /// 64-bit float (accepts integers on the way in)
    Float(NumericConstraints<f64>),
    /// Arbitrary-precision decimal, stored as a string on the wire
    Decimal,
    Bool,
    /// UTC datetime (accepts RFC 3339 / ISO-ish strings on the way in)
    DateTime,
    /// UUID, stored as a UUID-subtype binary on the wire
    Uuid,
    ObjectId,
    /// URL string; `http_only` restricts the scheme to http/https
    Url {
        http_only: bool,
    },
    /// Homogeneous array of the inner type
    List(Box<FieldType>),
    /// String-keyed mapping with values of the inner type
    Map(Box<FieldType>),
    /// Nested document validated by its own field set
    Embedded(Arc<FieldSet>),
    /// No validation, no coercion
    Any,
}

impl FieldType {
    /// Plain string with no constraints
    pub fn string() -> Self {
        Self::String(StringConstraints::default())
    }

    /// Plain integer with no constraints
    pub fn int() -> Self {
        Self::Int(NumericConstraints::default())
    }

    /// Plain float with no constraints
    pub fn float() -> Self {
        Self::Float(NumericConstraints::default())
    }

    /// Human-readable type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Decimal => "decimal",
            Self::Bool => "boolean",
            Self::DateTime => "datetime",
            Self::Uuid => "uuid",
            Self::ObjectId => "objectid",
            Self::Url { .. } => "url",
            Self::List(_) => "array",
            Self::Map(_) => "map",
            Self::Embedded(_) => "document",
            Self::Any => "any",
        }
    }

    /// Validate a present, non-null value against this type
    pub fn validate(&self, value: &Bson, field: &str) -> Result<(), ValidationError> {
        match self {
            Self::String(constraints) => {
                let Bson::String(s) = value else {
                    return Err(type_error(field, self, value));
                };
                let chars = s.chars().count();
                if let Some(min) = constraints.min_length {
                    if chars < min {
                        return Err(ValidationError::new(
                            field,
                            format!("length {} is below the minimum of {}", chars, min),
                        ));
                    }
                }
                if let Some(max) = constraints.max_length {
                    if chars > max {
                        return Err(ValidationError::new(
                            field,
                            format!("length {} exceeds the maximum of {}", chars, max),
                        ));
                    }
                }
                if let Some(pattern) = &constraints.pattern {
                    let re = Regex::new(pattern).map_err(|e| {
                        ValidationError::new(field, format!("invalid pattern: {}", e))
                    })?;
                    if !re.is_match(s) {
                        return Err(ValidationError::new(
                            field,
                            format!("value '{}' does not match pattern '{}'", s, pattern),
                        ));
                    }
                }
                Ok(())
            }
            Self::Int(constraints) => {
                let n = match value {
                    Bson::Int32(n) => i64::from(*n),
                    Bson::Int64(n) => *n,
                    _ => return Err(type_error(field, self, value)),
                };
                check_range(n, constraints, field)
            }
            Self::Float(constraints) => {
                let n = match value {
                    Bson::Double(n) => *n,
                    Bson::Int32(n) => f64::from(*n),
                    Bson::Int64(n) => *n as f64,
                    _ => return Err(type_error(field, self, value)),
                };
                check_range(n, constraints, field)
            }
            Self::Decimal => {
                parse_decimal(value, field)?;
                Ok(())
            }
            Self::Bool => match value {
                Bson::Boolean(_) => Ok(()),
                _ => Err(type_error(field, self, value)),
            },
            Self::DateTime => match value {
                Bson::DateTime(_) => Ok(()),
                Bson::String(s) => parse_datetime(s, field).map(|_| ()),
                _ => Err(type_error(field, self, value)),
            },
            Self::Uuid => match value {
                Bson::Binary(bin) if bin.subtype == BinarySubtype::Uuid => {
                    if bin.bytes.len() == 16 {
                        Ok(())
                    } else {
                        Err(ValidationError::new(field, "uuid binary must be 16 bytes"))
                    }
                }
                Bson::String(s) => parse_uuid(s, field).map(|_| ()),
                _ => Err(type_error(field, self, value)),
            },
            Self::ObjectId => match value {
                Bson::ObjectId(_) => Ok(()),
                Bson::String(s) => parse_object_id(s, field).map(|_| ()),
                _ => Err(type_error(field, self, value)),
            },
            Self::Url { http_only } => {
                let Bson::String(s) = value else {
                    return Err(type_error(field, self, value));
                };
                let ok = if *http_only {
                    formats::is_http_url(s)
                } else {
                    formats::is_url(s)
                };
                if ok {
                    Ok(())
                } else {
                    Err(ValidationError::new(field, format!("invalid url '{}'", s)))
                }
            }
            Self::List(inner) => {
                let Bson::Array(items) = value else {
                    return Err(type_error(field, self, value));
                };
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item, &format!("{}[{}]", field, i))?;
                }
                Ok(())
            }
            Self::Map(inner) => {
                let Bson::Document(map) = value else {
                    return Err(type_error(field, self, value));
                };
                for (key, item) in map.iter() {
                    inner.validate(item, &format!("{}.{}", field, key))?;
                }
                Ok(())
            }
            Self::Embedded(fields) => {
                let Bson::Document(doc) = value else {
                    return Err(type_error(field, self, value));
                };
                fields.validate(doc).map_err(|e| prefix_error(field, e))
            }
            Self::Any => Ok(()),
        }
    }

    /// Coerce a value to its wire form
    pub fn to_wire(&self, value: Bson, field: &str) -> Result<Bson, ValidationError> {
        match self {
            Self::Int(_) => match value {
                Bson::Int32(n) => Ok(Bson::Int64(i64::from(n))),
                other => Ok(other),
            },
            Self::Float(_) => match value {
                Bson::Int32(n) => Ok(Bson::Double(f64::from(n))),
                Bson::Int64(n) => Ok(Bson::Double(n as f64)),
                other => Ok(other),
            },
            Self::Decimal => {
                let dec = parse_decimal(&value, field)?;
                Ok(Bson::String(dec.to_string()))
            }
            Self::DateTime => match value {
                Bson::String(s) => Ok(Bson::DateTime(parse_datetime(&s, field)?)),
                other => Ok(other),
            },
            Self::Uuid => match value {
                Bson::String(s) => Ok(uuid_to_bson(parse_uuid(&s, field)?)),
                other => Ok(other),
            },
            Self::ObjectId => match value {
                Bson::String(s) => Ok(Bson::ObjectId(parse_object_id(&s, field)?)),
                other => Ok(other),
            },
            Self::List(inner) => match value {
                Bson::Array(items) => {
                    let converted = items
                        .into_iter()
                        .enumerate()
                        .map(|(i, item)| inner.to_wire(item, &format!("{}[{}]", field, i)))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Bson::Array(converted))
                }
                other => Ok(other),
            },
            Self::Map(inner) => match value {
                Bson::Document(map) => {
                    let mut converted = Document::new();
                    for (key, item) in map {
                        let item = inner.to_wire(item, &format!("{}.{}", field, key))?;
                        converted.insert(key, item);
                    }
                    Ok(Bson::Document(converted))
                }
                other => Ok(other),
            },
            Self::Embedded(fields) => match value {
                Bson::Document(doc) => fields
                    .to_wire(doc)
                    .map(Bson::Document)
                    .map_err(|e| prefix_error(field, e)),
                other => Ok(other),
            },
            _ => Ok(value),
        }
    }

    /// Coerce a stored wire value back to its in-memory form
    pub fn from_wire(&self, value: Bson, field: &str) -> Result<Bson, ValidationError> {
        match self {
            Self::Decimal => {
                // Stored as a string; verify it still parses.
                let dec = parse_decimal(&value, field)?;
                Ok(Bson::String(dec.to_string()))
            }
            Self::List(inner) => match value {
                Bson::Array(items) => {
                    let converted = items
                        .into_iter()
                        .enumerate()
                        .map(|(i, item)| inner.from_wire(item, &format!("{}[{}]", field, i)))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Bson::Array(converted))
                }
                other => Ok(other),
            },
            Self::Map(inner) => match value {
                Bson::Document(map) => {
                    let mut converted = Document::new();
                    for (key, item) in map {
                        let item = inner.from_wire(item, &format!("{}.{}", field, key))?;
                        converted.insert(key, item);
                    }
                    Ok(Bson::Document(converted))
                }
                other => Ok(other),
            },
            Self::Embedded(fields) => match value {
                Bson::Document(doc) => fields
                    .from_wire(doc)
                    .map(Bson::Document)
                    .map_err(|e| prefix_error(field, e)),
                other => Ok(other),
            },
            _ => self.to_wire(value, field),
        }
    }

    /// Project a wire value to JSON
    pub fn to_json(&self, value: &Bson) -> serde_json::Value {
        match (self, value) {
            (Self::ObjectId, Bson::ObjectId(id)) => serde_json::Value::String(id.to_hex()),
            (Self::DateTime, Bson::DateTime(dt)) => {
                serde_json::Value::String(dt.to_chrono().to_rfc3339())
            }
            (Self::Uuid, Bson::Binary(bin)) if bin.subtype == BinarySubtype::Uuid => {
                match uuid::Uuid::from_slice(&bin.bytes) {
                    Ok(u) => serde_json::Value::String(u.hyphenated().to_string()),
                    Err(_) => value.clone().into_relaxed_extjson(),
                }
            }
            (Self::List(inner), Bson::Array(items)) => {
                serde_json::Value::Array(items.iter().map(|i| inner.to_json(i)).collect())
            }
            (Self::Map(inner), Bson::Document(map)) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), inner.to_json(v)))
                    .collect(),
            ),
            (Self::Embedded(fields), Bson::Document(doc)) => fields.to_json(doc),
            (Self::String(_) | Self::Url { .. } | Self::Decimal, Bson::String(s)) => {
                serde_json::Value::String(s.clone())
            }
            (Self::Bool, Bson::Boolean(b)) => serde_json::Value::Bool(*b),
            (Self::Int(_), Bson::Int64(n)) => serde_json::json!(n),
            (Self::Int(_), Bson::Int32(n)) => serde_json::json!(n),
            (Self::Float(_), Bson::Double(n)) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            // Untyped or mismatched values fall back to the driver's JSON mapping.
            _ => value.clone().into_relaxed_extjson(),
        }
    }

    /// Build a wire value from a JSON value
    pub fn from_json(
        &self,
        value: &serde_json::Value,
        field: &str,
    ) -> Result<Bson, ValidationError> {
        match self {
            Self::String(_) | Self::Url { .. } => match value {
                serde_json::Value::String(s) => Ok(Bson::String(s.clone())),
                _ => Err(json_type_error(field, self, value)),
            },
            Self::Int(_) => value
                .as_i64()
                .map(Bson::Int64)
                .ok_or_else(|| json_type_error(field, self, value)),
            Self::Float(_) => value
                .as_f64()
                .map(Bson::Double)
                .ok_or_else(|| json_type_error(field, self, value)),
            Self::Decimal => {
                let text = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Number(n) => n.to_string(),
                    _ => return Err(json_type_error(field, self, value)),
                };
                let dec = Decimal::from_str(&text).map_err(|e| {
                    ValidationError::new(field, format!("cannot parse '{}' as decimal: {}", text, e))
                })?;
                Ok(Bson::String(dec.to_string()))
            }
            Self::Bool => value
                .as_bool()
                .map(Bson::Boolean)
                .ok_or_else(|| json_type_error(field, self, value)),
            Self::DateTime => match value {
                serde_json::Value::String(s) => Ok(Bson::DateTime(parse_datetime(s, field)?)),
                _ => Err(json_type_error(field, self, value)),
            },
            Self::Uuid => match value {
                serde_json::Value::String(s) => Ok(uuid_to_bson(parse_uuid(s, field)?)),
                _ => Err(json_type_error(field, self, value)),
            },
            Self::ObjectId => match value {
                serde_json::Value::String(s) => Ok(Bson::ObjectId(parse_object_id(s, field)?)),
                _ => Err(json_type_error(field, self, value)),
            },
            Self::List(inner) => match value {
                serde_json::Value::Array(items) => {
                    let converted = items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| inner.from_json(item, &format!("{}[{}]", field, i)))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Bson::Array(converted))
                }
                _ => Err(json_type_error(field, self, value)),
            },
            Self::Map(inner) => match value {
                serde_json::Value::Object(map) => {
                    let mut converted = Document::new();
                    for (key, item) in map {
                        let item = inner.from_json(item, &format!("{}.{}", field, key))?;
                        converted.insert(key.clone(), item);
                    }
                    Ok(Bson::Document(converted))
                }
                _ => Err(json_type_error(field, self, value)),
            },
            Self::Embedded(fields) => match value {
                serde_json::Value::Object(_) => fields
                    .from_json(value)
                    .map(Bson::Document)
                    .map_err(|e| prefix_error(field, e)),
                _ => Err(json_type_error(field, self, value)),
            },
            Self::Any => Bson::try_from(value.clone())
                .map_err(|e| ValidationError::new(field, format!("invalid JSON value: {}", e))),
        }
    }
}

fn type_error(field: &str, field_type: &FieldType, value: &Bson) -> ValidationError {
    ValidationError::new(
        field,
        format!(
            "expected {}, got {:?}",
            field_type.type_name(),
            value.element_type()
        ),
    )
}

fn json_type_error(
    field: &str,
    field_type: &FieldType,
    value: &serde_json::Value,
) -> ValidationError {
    ValidationError::new(
        field,
        format!("expected {}, got JSON {}", field_type.type_name(), value),
    )
}

fn prefix_error(field: &str, err: ValidationError) -> ValidationError {
    match err.field {
        Some(inner) => ValidationError::new(format!("{}.{}", field, inner), err.message),
        None => ValidationError::new(field, err.message),
    }
}

fn check_range<T: PartialOrd + std::fmt::Display + Copy>(
    n: T,
    constraints: &NumericConstraints<T>,
    field: &str,
) -> Result<(), ValidationError> {
    if let Some(min) = constraints.minimum {
        if n < min {
            return Err(ValidationError::new(
                field,
                format!("value {} is below the minimum of {}", n, min),
            ));
        }
    }
    if let Some(max) = constraints.maximum {
        if n > max {
            return Err(ValidationError::new(
                field,
                format!("value {} exceeds the maximum of {}", n, max),
            ));
        }
    }
    Ok(())
}

fn parse_decimal(value: &Bson, field: &str) -> Result<Decimal, ValidationError> {
    match value {
        Bson::String(s) => Decimal::from_str(s).map_err(|e| {
            ValidationError::new(field, format!("cannot parse '{}' as decimal: {}", s, e))
        }),
        Bson::Double(n) => Decimal::from_f64(*n)
            .ok_or_else(|| ValidationError::new(field, format!("cannot represent {} as decimal", n))),
        Bson::Int32(n) => Ok(Decimal::from(*n)),
        Bson::Int64(n) => Ok(Decimal::from(*n)),
        other => Err(ValidationError::new(
            field,
            format!("expected decimal, got {:?}", other.element_type()),
        )),
    }
}

fn parse_datetime(s: &str, field: &str) -> Result<bson::DateTime, ValidationError> {
    if let Ok(dt) = ChronoDateTime::parse_from_rfc3339(s) {
        return Ok(bson::DateTime::from_chrono(dt.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(bson::DateTime::from_chrono(naive.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        return Ok(bson::DateTime::from_chrono(naive.and_utc()));
    }
    Err(ValidationError::new(
        field,
        format!("unable to convert '{}' to datetime", s),
    ))
}

fn parse_uuid(s: &str, field: &str) -> Result<uuid::Uuid, ValidationError> {
    uuid::Uuid::parse_str(s)
        .map_err(|e| ValidationError::new(field, format!("cannot convert '{}' to uuid: {}", s, e)))
}

fn uuid_to_bson(u: uuid::Uuid) -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Uuid,
        bytes: u.as_bytes().to_vec(),
    })
}

fn parse_object_id(s: &str, field: &str) -> Result<bson::oid::ObjectId, ValidationError> {
    bson::oid::ObjectId::parse_str(s).map_err(|e| {
        ValidationError::new(field, format!("invalid value for ObjectId '{}': {}", s, e))
    })
}
