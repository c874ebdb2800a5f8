//! Field descriptors
//!
//! A `Field` declares one document attribute: its semantic type, whether it
//! is required, its default, its enumerated choices, and any extra
//! validators. Fields are optional by default; `.required()` opts in.
//! Absent and null values are treated as value absence: a required field
//! rejects them, an optional field skips all further validation.

use bson::Bson;

use crate::errors::ValidationError;
use crate::formats;
use crate::types::FieldType;

/// Default value for an optional field
#[derive(Debug, Clone)]
pub enum DefaultValue {
    /// A fixed value
    Value(Bson),
    /// A factory invoked at construction time (e.g. "now")
    Factory(fn() -> Bson),
}

impl DefaultValue {
    /// Resolve the default to a concrete value
    pub fn resolve(&self) -> Bson {
        match self {
            Self::Value(v) => v.clone(),
            Self::Factory(f) => f(),
        }
    }
}

/// Extra per-field validator, run after the type check on present values
#[derive(Debug, Clone)]
pub enum FieldValidator {
    /// Maximum length of a string (characters) or array (items)
    MaxLength(usize),
    /// Email-shaped string
    Email,
    /// "hh:mm" wall-clock string, "24:00" allowed as end-of-day
    TimeOfDay,
    /// Caller-supplied predicate
    Custom {
        /// Short validator name used in error messages
        name: &'static str,
        check: fn(&Bson) -> bool,
    },
}

impl FieldValidator {
    fn check(&self, value: &Bson) -> bool {
        match self {
            Self::MaxLength(max) => match value {
                Bson::String(s) => s.chars().count() <= *max,
                Bson::Array(items) => items.len() <= *max,
                _ => false,
            },
            Self::Email => matches!(value, Bson::String(s) if formats::is_email(s)),
            Self::TimeOfDay => matches!(value, Bson::String(s) if formats::is_time_of_day(s)),
            Self::Custom { check, .. } => check(value),
        }
    }

    fn message(&self, field: &str, value: &Bson) -> String {
        match self {
            Self::MaxLength(max) => {
                format!("length of value for field '{}' must be at most {}", field, max)
            }
            Self::Email => format!("value of field '{}' is not a valid email: {}", field, value),
            Self::TimeOfDay => {
                format!("value of field '{}' is not a valid 'hh:mm' time: {}", field, value)
            }
            Self::Custom { name, .. } => {
                format!("value of field '{}' failed the '{}' validator: {}", field, name, value)
            }
        }
    }
}

/// Declaration of one document attribute
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    field_type: FieldType,
    required: bool,
    default: Option<DefaultValue>,
    choices: Option<Vec<Bson>>,
    validators: Vec<FieldValidator>,
}

impl Field {
    /// Create an optional field with the given name and type
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            default: None,
            choices: None,
            validators: Vec::new(),
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set a fixed default value
    pub fn default_value(mut self, value: impl Into<Bson>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Set a default factory, invoked at construction time
    pub fn default_factory(mut self, factory: fn() -> Bson) -> Self {
        self.default = Some(DefaultValue::Factory(factory));
        self
    }

    /// Restrict the field to an enumerated set of allowed values
    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    /// Attach an extra validator
    pub fn validator(mut self, validator: FieldValidator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// Validate one value slot for this field
    ///
    /// `None` and `Bson::Null` both mean "absent".
    pub fn validate(&self, value: Option<&Bson>) -> Result<(), ValidationError> {
        let value = match value {
            None | Some(Bson::Null) => {
                if self.required {
                    return Err(ValidationError::missing(&self.name));
                }
                return Ok(());
            }
            Some(v) => v,
        };

        if let Some(choices) = &self.choices {
            if !choices.contains(value) {
                return Err(ValidationError::new(
                    &self.name,
                    format!("value {} is not included in {:?}", value, choices),
                ));
            }
        }

        self.field_type.validate(value, &self.name)?;

        for validator in &self.validators {
            if !validator.check(value) {
                return Err(ValidationError::new(
                    &self.name,
                    validator.message(&self.name, value),
                ));
            }
        }
        Ok(())
    }

    /// Coerce a value to its wire form
    pub fn to_wire(&self, value: Bson) -> Result<Bson, ValidationError> {
        self.field_type.to_wire(value, &self.name)
    }

    /// Coerce a stored wire value back to its in-memory form
    pub fn from_wire(&self, value: Bson) -> Result<Bson, ValidationError> {
        self.field_type.from_wire(value, &self.name)
    }

    /// Project a wire value to JSON
    pub fn to_json(&self, value: &Bson) -> serde_json::Value {
        self.field_type.to_json(value)
    }

    /// Build a wire value from a JSON value
    pub fn from_json(&self, value: &serde_json::Value) -> Result<Bson, ValidationError> {
        self.field_type.from_json(value, &self.name)
    }
}
