//! Guarded records.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::trace;

use crate::data::Data;
use crate::error::{FieldError, ModelError};
use crate::model::{ModelClass, ModelOption};
use crate::schema::Schema;
use crate::validation::ValidationContext;

/// A record built from a [`ModelClass`].
///
/// Every key covered by the schema holds a value that passed its field, and
/// every mutation goes through [`set`](Model::set), [`remove`](Model::remove),
/// [`modify`](Model::modify) or [`update`](Model::update), each of which
/// re-validates before committing anything.
#[derive(Clone)]
pub struct Model {
    class: ModelClass,
    schema: Arc<Schema>,
    option: ModelOption,
    record: IndexMap<String, Data>,
}

impl Model {
    /// Equivalent to `class.construct(data, ModelOption::new())`.
    pub fn new(class: &ModelClass, data: &Value) -> Result<Model, ModelError> {
        class.construct(data, ModelOption::new())
    }

    pub fn with_option(
        class: &ModelClass,
        data: &Value,
        option: ModelOption,
    ) -> Result<Model, ModelError> {
        class.construct(data, option)
    }

    pub(crate) fn from_parts(
        class: ModelClass,
        schema: Arc<Schema>,
        option: ModelOption,
        record: IndexMap<String, Data>,
    ) -> Self {
        Self {
            class,
            schema,
            option,
            record,
        }
    }

    pub fn class(&self) -> &ModelClass {
        &self.class
    }

    /// The effective options of this instance.
    pub fn option(&self) -> &ModelOption {
        &self.option
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn record(&self) -> &IndexMap<String, Data> {
        &self.record
    }

    pub fn get(&self, key: &str) -> Option<&Data> {
        self.record.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.record.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.record.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Data)> {
        self.record.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_empty()
    }

    fn context(&self) -> ValidationContext {
        ValidationContext::new(self.option.max_depth())
    }

    fn reject(&self, key: &str, source: FieldError) -> ModelError {
        trace!(model = %self.class.name(), key, error = source.kind(), "write rejected");
        ModelError::SetValue {
            model: self.class.name().to_string(),
            key: key.to_string(),
            source,
        }
    }

    /// Writes one key.
    ///
    /// A declared key is validated by its field; an undeclared key is
    /// rejected under strict mode and stored as-is otherwise.
    ///
    /// # Errors
    ///
    /// `ModelError::SetValue`; the prior value is kept.
    pub fn set(&mut self, key: &str, value: impl Into<Data>) -> Result<(), ModelError> {
        let value = value.into();
        let Some(field) = self.schema.field(key) else {
            if self.option.is_strict() {
                return Err(self.reject(key, FieldError::Undefined { field: key.to_string() }));
            }
            self.record.insert(key.to_string(), value);
            return Ok(());
        };

        match field.validate_with(Some(&value), &self.context()) {
            Ok(Some(checked)) => {
                self.record.insert(key.to_string(), checked);
                Ok(())
            }
            Ok(None) => {
                self.record.shift_remove(key);
                Ok(())
            }
            Err(error) => Err(self.reject(key, error)),
        }
    }

    /// Deletes one key, which must be allowed to be absent.
    ///
    /// # Errors
    ///
    /// `ModelError::SetValue` when the key is required; it is kept.
    pub fn remove(&mut self, key: &str) -> Result<Option<Data>, ModelError> {
        if let Some(field) = self.schema.field(key) {
            if let Err(error) = field.validate_with(None, &self.context()) {
                return Err(self.reject(key, error));
            }
        }
        Ok(self.record.shift_remove(key))
    }

    /// Edits the value under `key` in place.
    ///
    /// `edit` runs on a copy, which is then written back through
    /// [`set`](Self::set). Returns `Ok(None)` when the key holds nothing.
    ///
    /// ```rust
    /// use edictor::{define_field, Kind, ModelClass, ModelOption};
    /// use serde_json::json;
    ///
    /// let package = ModelClass::new("Package")
    ///     .define(
    ///         [("keywords", define_field().initial(json!([])).array_of([Kind::String]))],
    ///         ModelOption::new(),
    ///     )
    ///     .unwrap();
    /// let mut record = package.construct(&json!({}), ModelOption::new()).unwrap();
    ///
    /// record
    ///     .modify("keywords", |v| v.as_array_mut().map(|a| a.push([json!("validation")])))
    ///     .unwrap();
    /// assert_eq!(record.object(), json!({"keywords": ["validation"]}));
    /// ```
    pub fn modify<R>(
        &mut self,
        key: &str,
        edit: impl FnOnce(&mut Data) -> R,
    ) -> Result<Option<R>, ModelError> {
        let Some(current) = self.record.get(key) else {
            return Ok(None);
        };
        let mut copy = current.clone();
        let output = edit(&mut copy);
        self.set(key, copy)?;
        Ok(Some(output))
    }

    /// Applies every key of `patch` at once.
    ///
    /// The current record merged with `patch` is validated as a whole; only
    /// if every key passes are the patched keys committed.
    ///
    /// # Errors
    ///
    /// `ModelError::InputData` for a non-object patch, `ModelError::Update`
    /// otherwise. No key is changed in either case.
    pub fn update(&mut self, patch: &Value) -> Result<(), ModelError> {
        let Value::Object(patch) = patch else {
            return Err(ModelError::InputData {
                model: self.class.name().to_string(),
                got: Data::Plain(patch.clone()).type_name().to_string(),
            });
        };

        let mut merged = self.record.clone();
        for (key, value) in patch {
            merged.insert(key.clone(), Data::Plain(value.clone()));
        }

        let result = self
            .schema
            .classify(&merged, &self.option, &self.context(), false);
        if !result.is_valid() {
            trace!(
                model = %self.class.name(),
                rejected = result.error.len(),
                "update rolled back"
            );
            return Err(ModelError::Update {
                model: self.class.name().to_string(),
                errors: result.error,
            });
        }

        let mut valid = result.valid;
        for key in patch.keys() {
            match valid.shift_remove(key) {
                Some(value) => {
                    self.record.insert(key.clone(), value);
                }
                None => {
                    self.record.shift_remove(key);
                }
            }
        }
        Ok(())
    }

    /// Deep plain snapshot with every guard removed.
    pub fn object(&self) -> Value {
        let entries: Map<String, Value> = self
            .record
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();
        Value::Object(entries)
    }

    pub fn json(&self) -> String {
        self.object().to_string()
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.record == other.record
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.class.name())?;
        f.debug_map().entries(self.record.iter()).finish()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.json())
    }
}

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Model>();
    assert_send_sync::<ModelClass>();
};
