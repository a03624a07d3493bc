//! Validator primitives.
//!
//! A [`Validator`] inspects one value and either accepts it, optionally
//! replacing it for the rest of a field's chain, or rejects it with a
//! [`SchemaErrors`]. Leaf validators fail with exactly one error; `array_of`
//! and `model` forward every failure found inside the nested value.
//!
//! # Example
//!
//! ```rust
//! use edictor::validator::{self, Validator};
//! use edictor::{Data, Kind};
//!
//! let is_text = validator::instance([Kind::String]);
//! assert!(is_text.check(&Data::from("hello")).is_success());
//! assert!(is_text.check(&Data::from(42)).is_failure());
//! ```

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use stillwater::Validation;

use crate::array::{ArrayOf, Rule};
use crate::data::{Data, Kind};
use crate::error::{SchemaError, SchemaErrors, ValidationError};
use crate::model::ModelClass;
use crate::path::KeyPath;
use crate::validation::ValidationContext;
use crate::ValidationResult;

/// Predicate used by [`assert`].
pub type Predicate = Arc<dyn Fn(&Data) -> bool + Send + Sync>;

/// Transform used by [`apply`]. `Ok(None)` keeps the current value.
pub type Transform = Arc<dyn Fn(&Data) -> Result<Option<Data>, ValidationError> + Send + Sync>;

/// Failure message of an [`assert`] validator.
#[derive(Clone)]
pub enum Message {
    Static(String),
    /// Built from the rejected value.
    Dynamic(Arc<dyn Fn(&Data) -> String + Send + Sync>),
}

impl Message {
    pub fn dynamic<F>(render: F) -> Self
    where
        F: Fn(&Data) -> String + Send + Sync + 'static,
    {
        Message::Dynamic(Arc::new(render))
    }

    fn render(&self, value: &Data) -> String {
        let message = match self {
            Message::Static(message) => message.clone(),
            Message::Dynamic(render) => render(value),
        };
        if message.is_empty() {
            "assertion failed".to_string()
        } else {
            message
        }
    }
}

impl From<&str> for Message {
    fn from(message: &str) -> Self {
        Message::Static(message.to_string())
    }
}

impl From<String> for Message {
    fn from(message: String) -> Self {
        Message::Static(message)
    }
}

/// One link of a field's validator chain.
#[derive(Clone)]
pub enum Validator {
    /// Accepts values matching any of the kinds.
    Instance(Vec<Kind>),
    /// Accepts strings matching the pattern.
    Regexp(Regex),
    Assert { predicate: Predicate, message: Message },
    /// Runs a transform whose output replaces the value.
    Apply(Transform),
    /// Wraps an array into an `ArrayOf` bound to the rules.
    ArrayOf(Arc<[Rule]>),
    /// Constructs an instance of the class.
    Model(ModelClass),
}

impl Validator {
    pub fn name(&self) -> &'static str {
        match self {
            Validator::Instance(_) => "instance",
            Validator::Regexp(_) => "regexp",
            Validator::Assert { .. } => "assert",
            Validator::Apply(_) => "apply",
            Validator::ArrayOf(_) => "arrayOf",
            Validator::Model(_) => "model",
        }
    }

    /// Checks a value at the root of a fresh validation pass.
    ///
    /// `Success(Some(v))` means the value is accepted and replaced by `v`,
    /// `Success(None)` that it is accepted unchanged.
    pub fn check(&self, value: &Data) -> ValidationResult<Option<Data>> {
        self.check_with(value, &ValidationContext::default())
    }

    pub(crate) fn check_with(
        &self,
        value: &Data,
        ctx: &ValidationContext,
    ) -> Validation<Option<Data>, SchemaErrors> {
        match self {
            Validator::Instance(kinds) => {
                if kinds.iter().any(|kind| kind.matches(value)) {
                    Validation::Success(None)
                } else {
                    let expected = format!("instance({})", join(kinds.iter()));
                    fail(
                        SchemaError::new(
                            KeyPath::root(),
                            format!("expected {} but got {}", expected, value.type_name()),
                        )
                        .with_code("invalid_type")
                        .with_expected(expected)
                        .with_got(value.type_name()),
                    )
                }
            }
            Validator::Regexp(regex) => match value.as_str() {
                Some(text) if regex.is_match(text) => Validation::Success(None),
                Some(text) => fail(
                    SchemaError::new(
                        KeyPath::root(),
                        format!("\"{}\" doesn't match /{}/", text, regex.as_str()),
                    )
                    .with_code("pattern_mismatch")
                    .with_expected(format!("/{}/", regex.as_str()))
                    .with_got(value.describe()),
                ),
                None => fail(
                    SchemaError::new(
                        KeyPath::root(),
                        format!("/{}/ can only test strings", regex.as_str()),
                    )
                    .with_code("invalid_type")
                    .with_expected("string")
                    .with_got(value.type_name()),
                ),
            },
            Validator::Assert { predicate, message } => {
                if predicate(value) {
                    Validation::Success(None)
                } else {
                    fail(
                        SchemaError::new(KeyPath::root(), message.render(value))
                            .with_code("assertion_failed")
                            .with_got(value.describe()),
                    )
                }
            }
            Validator::Apply(transform) => match transform(value) {
                Ok(replacement) => Validation::Success(replacement),
                Err(error) => fail(
                    SchemaError::new(KeyPath::root(), error.message)
                        .with_code("apply_failed")
                        .with_got(value.describe()),
                ),
            },
            Validator::ArrayOf(rules) => {
                ArrayOf::from_data(rules, value, ctx).map(|array| Some(Data::Array(array)))
            }
            Validator::Model(class) => class
                .build(value, ctx)
                .map(|model| Some(Data::Model(model))),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Instance(kinds) => write!(f, "instance({})", join(kinds.iter())),
            Validator::Regexp(regex) => write!(f, "regexp(/{}/)", regex.as_str()),
            Validator::Assert { .. } => write!(f, "assert()"),
            Validator::Apply(_) => write!(f, "apply()"),
            Validator::ArrayOf(rules) => write!(f, "arrayOf({})", join(rules.iter())),
            Validator::Model(class) => write!(f, "model({})", class.name()),
        }
    }
}

/// Accepts values whose runtime type matches any of `kinds`.
pub fn instance<I, K>(kinds: I) -> Validator
where
    I: IntoIterator<Item = K>,
    K: Into<Kind>,
{
    Validator::Instance(kinds.into_iter().map(Into::into).collect())
}

/// Accepts strings matching `pattern`.
///
/// # Errors
///
/// Returns the regex compilation error for an invalid pattern.
pub fn regexp(pattern: &str) -> Result<Validator, regex::Error> {
    Ok(Validator::Regexp(Regex::new(pattern)?))
}

/// Accepts values for which `predicate` returns true.
///
/// ```rust
/// use edictor::validator::{self, Message};
/// use edictor::Data;
///
/// let currency = validator::assert(
///     |v| matches!(v.as_str(), Some("THB" | "USD")),
///     Message::dynamic(|v| format!("{} is not a supported currency", v.to_json())),
/// );
/// assert!(currency.check(&Data::from("THB")).is_success());
/// assert!(currency.check(&Data::from("BTC")).is_failure());
/// ```
pub fn assert<F, M>(predicate: F, message: M) -> Validator
where
    F: Fn(&Data) -> bool + Send + Sync + 'static,
    M: Into<Message>,
{
    Validator::Assert {
        predicate: Arc::new(predicate),
        message: message.into(),
    }
}

/// Runs `transform`; an `Err` rejects the value, `Ok(Some(v))` replaces it.
pub fn apply<F>(transform: F) -> Validator
where
    F: Fn(&Data) -> Result<Option<Data>, ValidationError> + Send + Sync + 'static,
{
    Validator::Apply(Arc::new(transform))
}

/// Accepts arrays whose every element satisfies at least one rule, wrapping
/// them into a guarded [`ArrayOf`].
pub fn array_of<I, R>(rules: I) -> Validator
where
    I: IntoIterator<Item = R>,
    R: Into<Rule>,
{
    Validator::ArrayOf(rules.into_iter().map(Into::into).collect())
}

/// Accepts values that construct an instance of `class`.
pub fn model(class: &ModelClass) -> Validator {
    Validator::Model(class.clone())
}

fn fail<T>(error: SchemaError) -> Validation<T, SchemaErrors> {
    Validation::Failure(SchemaErrors::single(error))
}

pub(crate) fn join<T: fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unwrap_failure<T: fmt::Debug>(v: Validation<T, SchemaErrors>) -> SchemaErrors {
        v.into_result().unwrap_err()
    }

    #[test]
    fn test_instance_accepts_any_listed_kind() {
        let validator = instance([Kind::String, Kind::Number]);
        assert!(validator.check(&Data::from("a")).is_success());
        assert!(validator.check(&Data::from(1)).is_success());

        let errors = unwrap_failure(validator.check(&Data::from(true)));
        assert_eq!(errors.first().code, "invalid_type");
        assert_eq!(errors.first().got.as_deref(), Some("boolean"));
    }

    #[test]
    fn test_regexp() {
        let email = regexp(r"^[\w\-.]+@([\w-]+\.)+[\w-]{2,4}$").unwrap();
        assert!(email.check(&Data::from("user@example.com")).is_success());

        let errors = unwrap_failure(email.check(&Data::from("user@example")));
        assert_eq!(errors.first().code, "pattern_mismatch");

        let errors = unwrap_failure(email.check(&Data::from(12)));
        assert_eq!(errors.first().code, "invalid_type");
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        assert!(regexp("(unclosed").is_err());
    }

    #[test]
    fn test_assert_static_and_empty_message() {
        let positive = assert(|v| v.as_f64().is_some_and(|n| n > 0.0), "");
        let errors = unwrap_failure(positive.check(&Data::from(-1)));
        assert_eq!(errors.first().message, "assertion failed");

        let short = assert(
            |v| v.as_str().is_some_and(|s| s.len() <= 3),
            "must be at most 3 characters",
        );
        let errors = unwrap_failure(short.check(&Data::from("abcd")));
        assert_eq!(errors.first().message, "must be at most 3 characters");
    }

    #[test]
    fn test_apply_replaces_or_keeps() {
        let upper = apply(|v| {
            v.as_str()
                .map(|s| Some(Data::from(s.to_uppercase())))
                .ok_or_else(|| ValidationError::new("not a string"))
        });
        let out = upper.check(&Data::from("abc")).into_result().unwrap();
        assert_eq!(out, Some(Data::from("ABC")));

        let errors = unwrap_failure(upper.check(&Data::from(1)));
        assert_eq!(errors.first().code, "apply_failed");
        assert_eq!(errors.first().message, "not a string");

        let keep = apply(|_| Ok(None));
        assert_eq!(keep.check(&Data::from("x")).into_result().unwrap(), None);
    }

    #[test]
    fn test_array_of_wraps() {
        let validator = array_of([Kind::String]);
        let out = validator.check(&Data::from(json!(["a", "b"]))).into_result().unwrap();
        let array = out.as_ref().and_then(Data::as_array).unwrap();
        assert_eq!(array.object(), json!(["a", "b"]));

        let errors = unwrap_failure(validator.check(&Data::from(json!(["a", 1]))));
        assert_eq!(errors.first().path.to_string(), "[1]");

        let errors = unwrap_failure(validator.check(&Data::from("a")));
        assert_eq!(errors.first().code, "not_array");
    }

    #[test]
    fn test_names() {
        assert_eq!(instance([Kind::Null]).name(), "instance");
        assert_eq!(array_of([Kind::Null]).name(), "arrayOf");
        assert_eq!(format!("{:?}", instance([Kind::String, Kind::Number])), "instance(string, number)");
    }
}
