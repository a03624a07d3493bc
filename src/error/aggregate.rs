//! Aggregate errors raised by sequences and models.
//!
//! Every throwing operation on [`ArrayOf`](crate::ArrayOf) or
//! [`Model`](crate::Model) reports the complete per-index or per-key failure
//! map, never only the first problem.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use stillwater::prelude::*;

use crate::error::{FieldError, SchemaError, SchemaErrors};
use crate::path::KeyPath;

/// Ordered mapping from record key to the reason it was rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorMap(IndexMap<String, FieldError>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, error: FieldError) {
        self.0.insert(key.into(), error);
    }

    pub fn get(&self, key: &str) -> Option<&FieldError> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flattens every entry into leaf errors located under their key.
    ///
    /// Returns `None` for an empty map.
    pub fn flatten(&self) -> Option<SchemaErrors> {
        self.0
            .iter()
            .map(|(key, error)| error.to_schema_errors().under(&KeyPath::key(key.as_str())))
            .reduce(Semigroup::combine)
    }

    /// Renders `{ key: { error, field, errors: [...] } }`.
    pub fn to_json(&self) -> Value {
        let entries: Map<String, Value> = self
            .0
            .iter()
            .map(|(key, error)| (key.clone(), error.to_json()))
            .collect();
        Value::Object(entries)
    }
}

impl Display for ErrorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, error) in &self.0 {
            writeln!(f)?;
            write!(f, "[{}] {}", key, error)?;
        }
        Ok(())
    }
}

impl FromIterator<(String, FieldError)> for ErrorMap {
    fn from_iter<I: IntoIterator<Item = (String, FieldError)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A rejected mutation of an [`ArrayOf`](crate::ArrayOf).
///
/// The sequence is unchanged whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArrayError {
    /// At least one pushed value matched none of the bound validators.
    #[error("ArrayOf{expected} rejected {} value(s):\n{errors}", .errors.len())]
    Push { expected: String, errors: SchemaErrors },

    /// An index write matched none of the bound validators.
    #[error("ArrayOf{expected} rejected [{index}]:\n{errors}")]
    SetValue {
        index: usize,
        expected: String,
        errors: SchemaErrors,
    },

    /// An index write past the end of the sequence.
    #[error("index {index} is out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },
}

impl ArrayError {
    pub fn kind(&self) -> &'static str {
        match self {
            ArrayError::Push { .. } => "PushError",
            ArrayError::SetValue { .. } | ArrayError::OutOfBounds { .. } => "SetValueError",
        }
    }

    /// Leaf errors with paths starting at the rejected index.
    pub fn to_schema_errors(&self) -> SchemaErrors {
        match self {
            ArrayError::Push { errors, .. } | ArrayError::SetValue { errors, .. } => {
                errors.clone()
            }
            ArrayError::OutOfBounds { index, len } => SchemaErrors::single(
                SchemaError::new(KeyPath::index(*index), "index is out of bounds")
                    .with_code("out_of_bounds")
                    .with_expected(format!("index <= {}", len)),
            ),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "error": self.kind(),
            "message": self.to_string(),
            "errors": self.to_schema_errors().to_json(),
        })
    }
}

/// A rejected schema definition, classification, construction or mutation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// `define` was refused; `errors` is empty when the class itself was the
    /// problem (the base type, or a class sealed twice).
    #[error("{model}.define() failed: {reason}{errors}")]
    Define {
        model: String,
        reason: String,
        errors: ErrorMap,
    },

    #[error("{model}.validate() failed:{errors}")]
    Validate { model: String, errors: ErrorMap },

    #[error("{model}.partial() failed:{errors}")]
    Partial { model: String, errors: ErrorMap },

    /// Construction failed; no instance exists.
    #[error("new {model}() failed:{errors}")]
    Init { model: String, errors: ErrorMap },

    /// The merged record was invalid; no field was changed.
    #[error("{model}.update() rejected, nothing was changed:{errors}")]
    Update { model: String, errors: ErrorMap },

    /// A single guarded write or delete was refused; the prior value is kept.
    #[error("{model}[\"{key}\"] rejected: {source}")]
    SetValue {
        model: String,
        key: String,
        #[source]
        source: FieldError,
    },

    /// Construction data was not a JSON object.
    #[error("{model} data must be an object, received {got}")]
    InputData { model: String, got: String },
}

impl ModelError {
    pub fn model(&self) -> &str {
        match self {
            ModelError::Define { model, .. }
            | ModelError::Validate { model, .. }
            | ModelError::Partial { model, .. }
            | ModelError::Init { model, .. }
            | ModelError::Update { model, .. }
            | ModelError::SetValue { model, .. }
            | ModelError::InputData { model, .. } => model,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelError::Define { .. } => "DefineError",
            ModelError::Validate { .. } => "ValidateError",
            ModelError::Partial { .. } => "PartialError",
            ModelError::Init { .. } => "InitError",
            ModelError::Update { .. } => "UpdateError",
            ModelError::SetValue { .. } => "SetValueError",
            ModelError::InputData { .. } => "InputDataError",
        }
    }

    /// The per-key failure map, for the variants that carry one.
    pub fn errors(&self) -> Option<&ErrorMap> {
        match self {
            ModelError::Define { errors, .. }
            | ModelError::Validate { errors, .. }
            | ModelError::Partial { errors, .. }
            | ModelError::Init { errors, .. }
            | ModelError::Update { errors, .. } => Some(errors),
            ModelError::SetValue { .. } | ModelError::InputData { .. } => None,
        }
    }

    /// Leaf errors with paths starting at the record's keys.
    pub fn to_schema_errors(&self) -> SchemaErrors {
        match self {
            ModelError::SetValue { key, source, .. } => {
                source.to_schema_errors().under(&KeyPath::key(key.as_str()))
            }
            ModelError::InputData { model, got } => SchemaErrors::single(
                SchemaError::new(KeyPath::root(), format!("{} data must be an object", model))
                    .with_code("not_object")
                    .with_expected("object")
                    .with_got(got.clone()),
            ),
            ModelError::Define { reason, errors, .. } => errors.flatten().unwrap_or_else(|| {
                SchemaErrors::single(
                    SchemaError::new(KeyPath::root(), reason.clone()).with_code("define"),
                )
            }),
            other => other
                .errors()
                .and_then(ErrorMap::flatten)
                .unwrap_or_else(|| {
                    SchemaErrors::single(
                        SchemaError::new(KeyPath::root(), other.to_string())
                            .with_code("model_error"),
                    )
                }),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut object = json!({
            "error": self.kind(),
            "model": self.model(),
        });
        match self {
            ModelError::Define { reason, errors, .. } => {
                object["reason"] = json!(reason);
                object["errors"] = errors.to_json();
            }
            ModelError::SetValue { key, source, .. } => {
                object["key"] = json!(key);
                object["errors"] = source.to_json();
            }
            ModelError::InputData { got, .. } => {
                object["got"] = json!(got);
            }
            other => {
                if let Some(errors) = other.errors() {
                    object["errors"] = errors.to_json();
                }
            }
        }
        object
    }
}
