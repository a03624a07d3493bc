//! Field definitions and validated value cells.
//!
//! [`DefineField`] is an immutable builder: every chain method returns a new
//! definition with one more validator appended and leaves the receiver
//! untouched, so a partial chain can be shared by many fields. Calling
//! [`DefineField::field`] compiles the chain into a [`Field`], a cell that
//! re-runs the whole chain on every write.
//!
//! # Example
//!
//! ```rust
//! use edictor::{define_field, Kind};
//! use serde_json::json;
//!
//! let text = define_field().instance([Kind::String]);
//! let mut name = text.required(true).field();
//!
//! assert!(name.set_value("First Last").is_ok());
//! assert!(name.set_value(json!(42)).is_err());
//! assert_eq!(name.value().unwrap().and_then(|v| v.as_str()), Some("First Last"));
//!
//! // The shared prefix is unchanged
//! assert!(!text.option().is_required());
//! ```

use std::sync::Arc;

use serde_json::Value;
use stillwater::prelude::*;
use stillwater::Validation;
use tracing::trace;

use crate::array::Rule;
use crate::data::{Data, Kind};
use crate::error::{FieldError, ValidationError};
use crate::model::ModelClass;
use crate::validation::ValidationContext;
use crate::validator::{self, Message, Validator};

/// Options of a single field.
///
/// Every option is optional so that an override can be merged over a base:
/// values set in the override win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOption {
    name: Option<String>,
    required: Option<bool>,
    initial: Option<Value>,
    grant: Option<Vec<Value>>,
}

impl FieldOption {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Value used when none is supplied. It is validated like any other.
    pub fn with_initial(mut self, initial: impl Into<Value>) -> Self {
        self.initial = Some(initial.into());
        self
    }

    /// Sentinel values accepted as-is without running any validator.
    pub fn with_grant<I, V>(mut self, grant: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.grant = Some(grant.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn initial(&self) -> Option<&Value> {
        self.initial.as_ref()
    }

    pub fn grant(&self) -> &[Value] {
        self.grant.as_deref().unwrap_or(&[])
    }

    /// Returns `self` with every option set in `over` replaced.
    pub fn merge(&self, over: &FieldOption) -> FieldOption {
        FieldOption {
            name: over.name.clone().or_else(|| self.name.clone()),
            required: over.required.or(self.required),
            initial: over.initial.clone().or_else(|| self.initial.clone()),
            grant: over.grant.clone().or_else(|| self.grant.clone()),
        }
    }
}

/// Persistent append-only validator list; each append allocates one link.
#[derive(Clone, Default)]
struct Chain(Option<Arc<Link>>);

struct Link {
    validator: Validator,
    prev: Chain,
}

impl Chain {
    fn append(&self, validator: Validator) -> Chain {
        Chain(Some(Arc::new(Link {
            validator,
            prev: self.clone(),
        })))
    }

    /// Validators in registration order.
    fn to_vec(&self) -> Vec<Validator> {
        let mut validators = Vec::new();
        let mut cursor = &self.0;
        while let Some(link) = cursor {
            validators.push(link.validator.clone());
            cursor = &link.prev.0;
        }
        validators.reverse();
        validators
    }
}

/// Immutable field definition.
#[derive(Clone, Default)]
pub struct DefineField {
    option: FieldOption,
    chain: Chain,
}

/// Starts an empty field definition.
pub fn define_field() -> DefineField {
    DefineField::default()
}

impl DefineField {
    pub fn new(option: FieldOption) -> Self {
        Self {
            option,
            chain: Chain::default(),
        }
    }

    fn with_option(&self, option: FieldOption) -> Self {
        Self {
            option,
            chain: self.chain.clone(),
        }
    }

    pub fn name(&self, name: impl Into<String>) -> Self {
        self.with_option(self.option.clone().with_name(name))
    }

    pub fn required(&self, required: bool) -> Self {
        self.with_option(self.option.clone().with_required(required))
    }

    pub fn initial(&self, initial: impl Into<Value>) -> Self {
        self.with_option(self.option.clone().with_initial(initial))
    }

    pub fn grant<I, V>(&self, grant: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.with_option(self.option.clone().with_grant(grant))
    }

    /// Appends an arbitrary validator.
    pub fn with(&self, validator: Validator) -> Self {
        Self {
            option: self.option.clone(),
            chain: self.chain.append(validator),
        }
    }

    pub fn instance<I, K>(&self, kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Kind>,
    {
        self.with(validator::instance(kinds))
    }

    /// # Errors
    ///
    /// Returns the regex compilation error for an invalid pattern.
    pub fn regexp(&self, pattern: &str) -> Result<Self, regex::Error> {
        Ok(self.with(validator::regexp(pattern)?))
    }

    pub fn assert<F, M>(&self, predicate: F, message: M) -> Self
    where
        F: Fn(&Data) -> bool + Send + Sync + 'static,
        M: Into<Message>,
    {
        self.with(validator::assert(predicate, message))
    }

    pub fn apply<F>(&self, transform: F) -> Self
    where
        F: Fn(&Data) -> Result<Option<Data>, ValidationError> + Send + Sync + 'static,
    {
        self.with(validator::apply(transform))
    }

    pub fn array_of<I, R>(&self, rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Rule>,
    {
        self.with(validator::array_of(rules))
    }

    pub fn model(&self, class: &ModelClass) -> Self {
        self.with(validator::model(class))
    }

    pub fn option(&self) -> &FieldOption {
        &self.option
    }

    pub fn validators(&self) -> Vec<Validator> {
        self.chain.to_vec()
    }

    /// Compiles the definition into a runtime field holding its initial value.
    pub fn field(&self) -> Field {
        Field::new(self.option.clone(), self.chain.to_vec().into())
    }

    /// Like [`field`](Self::field), with `over` merged over the definition's
    /// own options.
    pub fn field_with(&self, over: FieldOption) -> Field {
        Field::new(self.option.merge(&over), self.chain.to_vec().into())
    }
}

impl std::fmt::Debug for DefineField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefineField")
            .field("option", &self.option)
            .field("validators", &self.chain.to_vec())
            .finish()
    }
}

/// A validated value cell.
///
/// The held value is either absent, for a field that is not required, or has
/// passed every validator of the chain.
#[derive(Debug, Clone)]
pub struct Field {
    option: FieldOption,
    validators: Arc<[Validator]>,
    value: Option<Data>,
    initial_error: Option<FieldError>,
}

impl Field {
    fn new(option: FieldOption, validators: Arc<[Validator]>) -> Self {
        let mut field = Self {
            option,
            validators,
            value: None,
            initial_error: None,
        };
        match field.initial_value_with(&ValidationContext::default()) {
            Ok(value) => field.value = value,
            Err(error) => field.initial_error = Some(error),
        }
        field
    }

    pub fn name(&self) -> Option<&str> {
        self.option.name()
    }

    /// Name used in error messages.
    pub fn label(&self) -> &str {
        self.option.name().unwrap_or("(anonymous)")
    }

    pub fn option(&self) -> &FieldOption {
        &self.option
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn initial(&self) -> Option<&Value> {
        self.option.initial()
    }

    /// The rejection of the configured initial value, if it was invalid.
    pub fn initial_error(&self) -> Option<&FieldError> {
        self.initial_error.as_ref()
    }

    /// Runs the chain against `value` without storing anything.
    ///
    /// An absent value is `Ok(None)` unless the field is required. A value in
    /// the grant list is returned unchanged. Otherwise every validator runs,
    /// each one seeing the value as replaced by the ones before it, and all
    /// failures are reported together.
    ///
    /// # Errors
    ///
    /// `FieldError::Required` or `FieldError::Invalid`.
    pub fn validate(&self, value: Option<&Data>) -> Result<Option<Data>, FieldError> {
        self.validate_with(value, &ValidationContext::default())
    }

    pub(crate) fn validate_with(
        &self,
        value: Option<&Data>,
        ctx: &ValidationContext,
    ) -> Result<Option<Data>, FieldError> {
        let Some(value) = value else {
            if self.option.is_required() {
                return Err(FieldError::Required {
                    field: self.label().to_string(),
                });
            }
            return Ok(None);
        };

        if let Data::Plain(plain) = value {
            if self.option.grant().contains(plain) {
                return Ok(Some(value.clone()));
            }
        }

        let mut current = value.clone();
        let mut failures = Vec::new();
        for validator in self.validators.iter() {
            match validator.check_with(&current, ctx) {
                Validation::Success(Some(replaced)) => current = replaced,
                Validation::Success(None) => {}
                Validation::Failure(errors) => failures.push(errors),
            }
        }

        match failures.into_iter().reduce(Semigroup::combine) {
            None => Ok(Some(current)),
            Some(errors) => Err(FieldError::Invalid {
                field: self.label().to_string(),
                errors,
            }),
        }
    }

    /// The configured initial value after validation, freshly built.
    pub(crate) fn initial_value_with(
        &self,
        ctx: &ValidationContext,
    ) -> Result<Option<Data>, FieldError> {
        match self.option.initial() {
            None => Ok(None),
            Some(initial) => self.validate_with(Some(&Data::Plain(initial.clone())), ctx),
        }
    }

    /// # Errors
    ///
    /// `FieldError::Required` when the field is required and holds nothing.
    pub fn value(&self) -> Result<Option<&Data>, FieldError> {
        match &self.value {
            None if self.option.is_required() => Err(FieldError::Required {
                field: self.label().to_string(),
            }),
            value => Ok(value.as_ref()),
        }
    }

    /// Validates and stores `value`. A rejected value leaves the cell as it was.
    pub fn set_value(&mut self, value: impl Into<Data>) -> Result<(), FieldError> {
        let value = value.into();
        match self.validate(Some(&value)) {
            Ok(checked) => {
                self.value = checked;
                Ok(())
            }
            Err(error) => {
                trace!(field = self.label(), "value rejected");
                Err(error)
            }
        }
    }

    /// Empties the cell.
    ///
    /// # Errors
    ///
    /// `FieldError::Required` for a required field; the value is kept.
    pub fn clear(&mut self) -> Result<(), FieldError> {
        self.validate(None)?;
        self.value = None;
        Ok(())
    }

    /// Restores the initial value, or empties the cell when there is none.
    pub fn reset(&mut self) -> Result<(), FieldError> {
        let initial = self.initial_value_with(&ValidationContext::default())?;
        self.value = initial;
        Ok(())
    }
}
