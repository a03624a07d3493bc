//! Sealed schemas and record classification.
//!
//! A [`Schema`] is the compiled, read-only form of a model definition: an
//! ordered map of field name to [`Field`] template plus the model options.
//! [`Schema::classify`] checks a whole record against it and sorts every key
//! into a [`TestResult`]. It never fails; every throwing model operation is
//! derived from its result.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::data::Data;
use crate::error::{ErrorMap, FieldError};
use crate::field::Field;
use crate::model::ModelOption;
use crate::validation::ValidationContext;

/// The sealed field map of a model class.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, Field>,
    option: ModelOption,
}

impl Schema {
    pub(crate) fn new(fields: IndexMap<String, Field>, option: ModelOption) -> Self {
        Self { fields, option }
    }

    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &IndexMap<String, Field> {
        &self.fields
    }

    pub fn option(&self) -> &ModelOption {
        &self.option
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks `entries` against every field.
    ///
    /// An absent key takes the field's initial value when there is one. With
    /// `partial`, keys absent from `entries` are skipped entirely. Keys the
    /// schema does not declare are `Undefined` errors under strict mode and
    /// pass through untouched otherwise.
    pub(crate) fn classify(
        &self,
        entries: &IndexMap<String, Data>,
        option: &ModelOption,
        ctx: &ValidationContext,
        partial: bool,
    ) -> TestResult {
        let mut result = TestResult::default();

        for (key, field) in &self.fields {
            let input = entries.get(key);
            if partial && input.is_none() {
                continue;
            }
            let outcome = match input {
                Some(value) => field.validate_with(Some(value), ctx),
                None if field.initial().is_some() => field.initial_value_with(ctx),
                None => field.validate_with(None, ctx),
            };
            match outcome {
                Ok(Some(value)) => {
                    result.valid.insert(key.clone(), value);
                }
                Ok(None) => {}
                Err(error) => {
                    if let Some(value) = input {
                        result.invalid.insert(key.clone(), value.to_json());
                    }
                    result.error.insert(key.clone(), error);
                }
            }
        }

        for (key, value) in entries {
            if self.fields.contains_key(key) {
                continue;
            }
            if option.is_strict() {
                result.invalid.insert(key.clone(), value.to_json());
                result
                    .error
                    .insert(key.clone(), FieldError::Undefined { field: key.clone() });
            } else {
                result.valid.insert(key.clone(), value.clone());
            }
        }

        result
    }
}

/// Outcome of checking a record: accepted values, rejected inputs and the
/// reason for each rejection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestResult {
    /// Accepted values, already transformed by their validators.
    pub valid: IndexMap<String, Data>,
    /// Rejected input values, as supplied.
    pub invalid: IndexMap<String, Value>,
    pub error: ErrorMap,
}

impl TestResult {
    pub fn is_valid(&self) -> bool {
        self.error.is_empty()
    }

    /// Plain snapshot of the accepted values.
    pub fn valid_json(&self) -> Value {
        let entries: Map<String, Value> = self
            .valid
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();
        Value::Object(entries)
    }

    /// Returns the accepted values, or wraps the error map with `reject`.
    pub fn into_result<E>(
        self,
        reject: impl FnOnce(ErrorMap) -> E,
    ) -> Result<IndexMap<String, Data>, E> {
        if self.error.is_empty() {
            Ok(self.valid)
        } else {
            Err(reject(self.error))
        }
    }

    /// Renders `{ valid, invalid, error }`.
    pub fn to_json(&self) -> Value {
        let invalid: Map<String, Value> = self
            .invalid
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        serde_json::json!({
            "valid": self.valid_json(),
            "invalid": Value::Object(invalid),
            "error": self.error.to_json(),
        })
    }
}
