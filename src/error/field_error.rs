//! Failures of a single value against a single field.

use serde_json::{json, Value};

use crate::error::{SchemaError, SchemaErrors};
use crate::path::KeyPath;

/// A rejection raised by a user-supplied `apply` transform.
///
/// ```rust
/// use edictor::ValidationError;
///
/// let error = ValidationError::new("invalid date");
/// assert_eq!(error.to_string(), "invalid date");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for ValidationError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ValidationError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Why one value was rejected by one field.
///
/// `field` is the field's name, or `(anonymous)` for a field built without one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// A required field received no value.
    #[error("Field({field}) is required")]
    Required { field: String },

    /// One or more validators rejected the value. Every failure of the chain
    /// is kept; paths are relative to the value itself.
    #[error("Field({field}) rejected the value:\n{errors}")]
    Invalid { field: String, errors: SchemaErrors },

    /// A key the schema does not declare, under strict mode.
    #[error("Field({field}) is not defined")]
    Undefined { field: String },

    /// A key declared twice in one `define` call.
    #[error("Field({field}) is declared more than once")]
    Duplicate { field: String },
}

impl FieldError {
    pub fn field(&self) -> &str {
        match self {
            FieldError::Required { field }
            | FieldError::Invalid { field, .. }
            | FieldError::Undefined { field }
            | FieldError::Duplicate { field } => field,
        }
    }

    /// The taxonomy name used in rendered error maps.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldError::Required { .. } => "RequiredError",
            FieldError::Invalid { .. } => "FieldError",
            FieldError::Undefined { .. } => "UndefinedError",
            FieldError::Duplicate { .. } => "DefineError",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, FieldError::Required { .. })
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, FieldError::Undefined { .. })
    }

    /// Flattens the failure into leaf errors rooted at the rejected value.
    pub fn to_schema_errors(&self) -> SchemaErrors {
        match self {
            FieldError::Invalid { errors, .. } => errors.clone(),
            FieldError::Required { .. } => SchemaErrors::single(
                SchemaError::new(KeyPath::root(), "value is required")
                    .with_code("required")
                    .with_expected("value"),
            ),
            FieldError::Undefined { field } => SchemaErrors::single(
                SchemaError::new(KeyPath::root(), format!("`{}` is not defined", field))
                    .with_code("undefined"),
            ),
            FieldError::Duplicate { field } => SchemaErrors::single(
                SchemaError::new(KeyPath::root(), format!("`{}` is declared twice", field))
                    .with_code("duplicate_field"),
            ),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "error": self.kind(),
            "field": self.field(),
            "errors": self.to_schema_errors().to_json(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_renders_code() {
        let error = FieldError::Required {
            field: "name".into(),
        };
        assert!(error.is_required());
        assert_eq!(error.to_string(), "Field(name) is required");
        assert_eq!(error.to_schema_errors().first().code, "required");
    }

    #[test]
    fn test_invalid_keeps_every_failure() {
        let errors = SchemaErrors::from_vec(vec![
            SchemaError::new(KeyPath::root(), "expected string").with_code("invalid_type"),
            SchemaError::new(KeyPath::root(), "too long").with_code("assertion_failed"),
        ]);
        let error = FieldError::Invalid {
            field: "name".into(),
            errors: errors.unwrap(),
        };

        let rendered = error.to_json();
        assert_eq!(rendered["error"], "FieldError");
        assert_eq!(rendered["errors"].as_array().map(Vec::len), Some(2));
        assert!(error.to_string().contains("too long"));
    }

    #[test]
    fn test_kind_names() {
        let undefined = FieldError::Undefined {
            field: "gender".into(),
        };
        assert!(undefined.is_undefined());
        assert_eq!(undefined.kind(), "UndefinedError");
        assert_eq!(undefined.field(), "gender");
    }
}
