//! Model classes.
//!
//! A class is a cheap, shareable handle. Its schema slot is written exactly
//! once by [`ModelClass::define`] and only read afterwards.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use stillwater::Validation;
use tracing::debug;

use crate::data::Data;
use crate::error::{ErrorMap, FieldError, ModelError, SchemaError, SchemaErrors};
use crate::field::{DefineField, FieldOption};
use crate::model::{Model, ModelOption};
use crate::path::KeyPath;
use crate::schema::{Schema, TestResult};
use crate::validation::ValidationContext;

struct ClassInner {
    name: String,
    parent: Option<ModelClass>,
    sealed: RwLock<Option<Arc<Schema>>>,
}

/// A named model type.
///
/// # Example
///
/// ```rust
/// use edictor::{define_field, Kind, ModelClass, ModelOption};
/// use serde_json::json;
///
/// let user = ModelClass::new("User")
///     .define(
///         [
///             ("name", define_field().required(true).instance([Kind::String])),
///             ("enable", define_field().initial(false).instance([Kind::Boolean])),
///         ],
///         ModelOption::new(),
///     )
///     .unwrap();
///
/// let record = user.construct(&json!({"name": "First Last"}), ModelOption::new()).unwrap();
/// assert_eq!(record.object(), json!({"name": "First Last", "enable": false}));
///
/// assert!(user.construct(&json!({}), ModelOption::new()).is_err());
/// ```
#[derive(Clone)]
pub struct ModelClass(Arc<ClassInner>);

impl ModelClass {
    /// The root of every class. It has no fields and cannot be defined.
    pub fn base() -> ModelClass {
        static BASE: OnceLock<ModelClass> = OnceLock::new();
        BASE.get_or_init(|| ModelClass::with_parent("Model", None))
            .clone()
    }

    /// Declares a direct subclass of the base class.
    pub fn new(name: impl Into<String>) -> ModelClass {
        ModelClass::with_parent(name, Some(ModelClass::base()))
    }

    /// Declares a subclass that inherits this class's fields and options.
    pub fn extend(&self, name: impl Into<String>) -> ModelClass {
        ModelClass::with_parent(name, Some(self.clone()))
    }

    fn with_parent(name: impl Into<String>, parent: Option<ModelClass>) -> ModelClass {
        ModelClass(Arc::new(ClassInner {
            name: name.into(),
            parent,
            sealed: RwLock::new(None),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&ModelClass> {
        self.0.parent.as_ref()
    }

    pub fn is_base(&self) -> bool {
        self.0.parent.is_none()
    }

    /// Whether this class itself has been sealed.
    pub fn is_defined(&self) -> bool {
        self.0.sealed.read().is_some()
    }

    /// Whether this class is `other` or one of its subclasses.
    pub fn is_a(&self, other: &ModelClass) -> bool {
        let mut cursor = Some(self);
        while let Some(class) = cursor {
            if class == other {
                return true;
            }
            cursor = class.parent();
        }
        false
    }

    /// Seals the class with `fields`, merged over the inherited ones.
    ///
    /// Every problem is reported at once: keys declared twice and fields
    /// whose initial value fails their own chain.
    ///
    /// # Errors
    ///
    /// `ModelError::Define` when called on the base class, on a class that is
    /// already defined, or with invalid fields. The class stays unsealed.
    pub fn define<I, K>(&self, fields: I, option: ModelOption) -> Result<ModelClass, ModelError>
    where
        I: IntoIterator<Item = (K, DefineField)>,
        K: Into<String>,
    {
        if self.is_base() {
            return Err(self.define_error("the base Model cannot be defined, declare a subclass"));
        }
        if self.is_defined() {
            return Err(self.define_error("already defined"));
        }

        let inherited = match self.parent() {
            Some(parent) => parent.schema(),
            None => Arc::new(Schema::default()),
        };
        let option = inherited.option().merge(&option);
        let mut compiled = inherited.fields().clone();
        let mut declared = HashSet::new();
        let mut errors = ErrorMap::new();

        for (key, define) in fields {
            let key: String = key.into();
            if !declared.insert(key.clone()) {
                errors.insert(key.clone(), FieldError::Duplicate { field: key });
                continue;
            }
            let field = match define.option().name() {
                Some(_) => define.field(),
                None => define.field_with(FieldOption::new().with_name(key.as_str())),
            };
            if let Some(error) = field.initial_error() {
                errors.insert(key.clone(), error.clone());
            }
            compiled.insert(key, field);
        }

        if !errors.is_empty() {
            return Err(ModelError::Define {
                model: self.name().to_string(),
                reason: "invalid field definitions".to_string(),
                errors,
            });
        }

        let schema = Schema::new(compiled, option);
        let mut slot = self.0.sealed.write();
        if slot.is_some() {
            return Err(self.define_error("already defined"));
        }
        debug!(
            model = %self.name(),
            fields = schema.len(),
            strict = option.is_strict(),
            "model defined"
        );
        *slot = Some(Arc::new(schema));
        Ok(self.clone())
    }

    fn define_error(&self, reason: &str) -> ModelError {
        ModelError::Define {
            model: self.name().to_string(),
            reason: reason.to_string(),
            errors: ErrorMap::new(),
        }
    }

    /// The sealed schema, or the nearest defined ancestor's.
    pub fn schema(&self) -> Arc<Schema> {
        let sealed = self.0.sealed.read().clone();
        match (sealed, self.parent()) {
            (Some(schema), _) => schema,
            (None, Some(parent)) => parent.schema(),
            (None, None) => Arc::new(Schema::default()),
        }
    }

    pub fn option(&self) -> ModelOption {
        *self.schema().option()
    }

    /// Classifies `data` without failing.
    pub fn test(&self, data: &Map<String, Value>, option: ModelOption) -> TestResult {
        let schema = self.schema();
        let option = schema.option().merge(&option);
        let ctx = ValidationContext::new(option.max_depth());
        schema.classify(&plain_entries(data), &option, &ctx, false)
    }

    /// Returns the accepted values of a complete record.
    ///
    /// # Errors
    ///
    /// `ModelError::InputData` for non-object input, `ModelError::Validate`
    /// carrying every rejected key otherwise.
    pub fn validate(
        &self,
        data: &Value,
        option: ModelOption,
    ) -> Result<IndexMap<String, Data>, ModelError> {
        self.check(data, option, false)?
            .into_result(|errors| ModelError::Validate {
                model: self.name().to_string(),
                errors,
            })
    }

    /// Like [`validate`](Self::validate), checking only the keys present in
    /// `data`.
    pub fn partial(
        &self,
        data: &Value,
        option: ModelOption,
    ) -> Result<IndexMap<String, Data>, ModelError> {
        self.check(data, option, true)?
            .into_result(|errors| ModelError::Partial {
                model: self.name().to_string(),
                errors,
            })
    }

    /// Builds a guarded record.
    ///
    /// # Errors
    ///
    /// `ModelError::InputData` for non-object input, `ModelError::Init`
    /// carrying every rejected key otherwise.
    pub fn construct(&self, data: &Value, option: ModelOption) -> Result<Model, ModelError> {
        let schema = self.schema();
        let option = schema.option().merge(&option);
        let entries = self.entries_of(data)?;
        let ctx = ValidationContext::new(option.max_depth());
        let record = schema
            .classify(&entries, &option, &ctx, false)
            .into_result(|errors| ModelError::Init {
                model: self.name().to_string(),
                errors,
            })?;
        Ok(Model::from_parts(self.clone(), schema, option, record))
    }

    fn check(&self, data: &Value, option: ModelOption, partial: bool) -> Result<TestResult, ModelError> {
        let schema = self.schema();
        let option = schema.option().merge(&option);
        let entries = self.entries_of(data)?;
        let ctx = ValidationContext::new(option.max_depth());
        Ok(schema.classify(&entries, &option, &ctx, partial))
    }

    fn entries_of(&self, data: &Value) -> Result<IndexMap<String, Data>, ModelError> {
        match data {
            Value::Object(map) => Ok(plain_entries(map)),
            other => Err(ModelError::InputData {
                model: self.name().to_string(),
                got: Data::Plain(other.clone()).type_name().to_string(),
            }),
        }
    }

    /// Nested construction used by the `model` validator and model rules.
    ///
    /// An instance of this class or a subclass is accepted as it is.
    pub(crate) fn build(&self, value: &Data, ctx: &ValidationContext) -> Validation<Model, SchemaErrors> {
        let entries = match value {
            Data::Model(model) if model.class().is_a(self) => {
                return Validation::Success(model.clone())
            }
            Data::Model(model) => model.record().clone(),
            Data::Plain(Value::Object(map)) => plain_entries(map),
            other => {
                return Validation::Failure(SchemaErrors::single(
                    SchemaError::new(
                        KeyPath::root(),
                        format!("{} data must be an object", self.name()),
                    )
                    .with_code("not_object")
                    .with_expected(self.name())
                    .with_got(other.type_name()),
                ))
            }
        };
        let inner = match ctx.descend() {
            Ok(inner) => inner,
            Err(errors) => return Validation::Failure(errors),
        };

        let schema = self.schema();
        let option = *schema.option();
        let result = schema.classify(&entries, &option, &inner, false);
        match result.error.flatten() {
            None => Validation::Success(Model::from_parts(self.clone(), schema, option, result.valid)),
            Some(errors) => Validation::Failure(errors),
        }
    }
}

fn plain_entries(map: &Map<String, Value>) -> IndexMap<String, Data> {
    map.iter()
        .map(|(key, value)| (key.clone(), Data::Plain(value.clone())))
        .collect()
}

impl PartialEq for ModelClass {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ModelClass {}

impl fmt::Debug for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelClass({})", self.name())
    }
}

impl fmt::Display for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Kind;
    use crate::field::define_field;
    use serde_json::json;

    #[test]
    fn test_base_cannot_be_defined() {
        let error = ModelClass::base()
            .define([("a", define_field())], ModelOption::new())
            .unwrap_err();
        assert_eq!(error.kind(), "DefineError");
    }

    #[test]
    fn test_define_once() {
        let class = ModelClass::new("Once");
        class.define([("a", define_field())], ModelOption::new()).unwrap();
        assert!(class.is_defined());

        let error = class.define([("b", define_field())], ModelOption::new()).unwrap_err();
        assert!(error.to_string().contains("already defined"));
        assert!(class.schema().field("b").is_none());
    }

    #[test]
    fn test_define_collects_every_problem() {
        let class = ModelClass::new("Broken");
        let error = class
            .define(
                [
                    ("a", define_field().instance([Kind::String])),
                    ("a", define_field()),
                    ("b", define_field().initial(1).instance([Kind::String])),
                ],
                ModelOption::new(),
            )
            .unwrap_err();

        let errors = error.errors().unwrap();
        assert_eq!(errors.get("a").map(FieldError::kind), Some("DefineError"));
        assert_eq!(errors.get("b").map(FieldError::kind), Some("FieldError"));
        assert!(!class.is_defined());
    }

    #[test]
    fn test_fields_are_named_after_keys() {
        let class = ModelClass::new("Named")
            .define([("title", define_field())], ModelOption::new())
            .unwrap();
        assert_eq!(class.schema().field("title").and_then(|f| f.name()), Some("title"));
    }

    #[test]
    fn test_subclass_inherits_fields_and_option() {
        let base = ModelClass::new("Base")
            .define([("id", define_field().required(true))], ModelOption::permissive())
            .unwrap();
        let child = base
            .extend("Child")
            .define([("label", define_field().instance([Kind::String]))], ModelOption::new())
            .unwrap();

        let schema = child.schema();
        let keys: Vec<_> = schema.fields().keys().cloned().collect();
        assert_eq!(keys, vec!["id", "label"]);
        assert!(!schema.option().is_strict());
        assert!(child.is_a(&base));
        assert!(!base.is_a(&child));
    }

    #[test]
    fn test_non_object_input() {
        let class = ModelClass::new("Input");
        let error = class.construct(&json!([1]), ModelOption::new()).unwrap_err();
        assert_eq!(error.kind(), "InputDataError");
    }
}
