//! Leaf validation failures and their non-empty collection.
//!
//! This module provides [`SchemaError`] for a single rejected condition and
//! [`SchemaErrors`] for accumulating every failure of one validation pass.

use std::fmt::{self, Display};

use serde_json::{json, Value};
use stillwater::prelude::*;

use crate::path::KeyPath;

/// A single validation failure with full context.
///
/// `SchemaError` captures all relevant information about a failure:
/// - **path**: where inside the validated value the failure occurred
/// - **message**: human-readable description
/// - **got**: the offending value, rendered as a string (optional)
/// - **expected**: what was expected instead (optional)
/// - **code**: machine-readable code for programmatic handling
///
/// # Example
///
/// ```rust
/// use edictor::{KeyPath, SchemaError};
///
/// let error = SchemaError::new(KeyPath::key("email"), "invalid email format")
///     .with_code("pattern_mismatch")
///     .with_got("\"not-an-email\"");
///
/// assert_eq!(error.code, "pattern_mismatch");
/// assert_eq!(error.to_string(), "email: invalid email format (got: \"not-an-email\")");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    /// The path to the value that failed validation.
    pub path: KeyPath,
    /// Human-readable error message.
    pub message: String,
    /// The actual value that was received (formatted as string).
    pub got: Option<String>,
    /// Description of what was expected.
    pub expected: Option<String>,
    /// Machine-readable error code (e.g. `invalid_type`).
    pub code: String,
}

impl SchemaError {
    /// Creates a new error with the given path and message.
    ///
    /// The code defaults to `validation_error`.
    pub fn new(path: KeyPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            got: None,
            expected: None,
            code: "validation_error".to_string(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Returns the same error located under `prefix`.
    pub fn under(mut self, prefix: &KeyPath) -> Self {
        self.path = self.path.under(prefix);
        self
    }

    /// Renders the error as a JSON object.
    pub fn to_json(&self) -> Value {
        let mut object = json!({
            "path": self.path.to_string(),
            "code": self.code,
            "message": self.message,
        });
        if let Some(ref expected) = self.expected {
            object["expected"] = json!(expected);
        }
        if let Some(ref got) = self.got {
            object["got"] = json!(got);
        }
        object
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path_str = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };

        write!(f, "{}: {}", path_str, self.message)?;

        if let Some(ref expected) = self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        if let Some(ref got) = self.got {
            write!(f, " (got: {})", got)?;
        }

        Ok(())
    }
}

impl std::error::Error for SchemaError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<SchemaError>();
    assert_sync::<SchemaError>();
};

/// A non-empty collection of validation failures.
///
/// Wraps a `NonEmptyVec<SchemaError>` so a failed validation always carries
/// at least one reason. Collections from independent checks are merged with
/// `Semigroup::combine`:
///
/// ```rust
/// use edictor::{KeyPath, SchemaError, SchemaErrors};
/// use stillwater::prelude::*;
///
/// let name = SchemaErrors::single(SchemaError::new(KeyPath::key("name"), "required"));
/// let phone = SchemaErrors::single(SchemaError::new(KeyPath::key("phone"), "bad pattern"));
///
/// assert_eq!(name.combine(phone).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaErrors(NonEmptyVec<SchemaError>);

impl SchemaErrors {
    pub fn single(error: SchemaError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Builds a collection from a vec, or `None` when nothing failed.
    ///
    /// Validation loops push into a plain `Vec` and finish with this, which
    /// doubles as the success check.
    pub fn from_vec(errors: Vec<SchemaError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaError> {
        self.0.iter()
    }

    pub fn first(&self) -> &SchemaError {
        self.0.head()
    }

    /// Returns all errors at the specified path.
    pub fn at_path(&self, path: &KeyPath) -> Vec<&SchemaError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Returns all errors with the specified code.
    pub fn with_code(&self, code: &str) -> Vec<&SchemaError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Re-roots every error under `prefix`.
    pub fn under(&self, prefix: &KeyPath) -> Self {
        let head = Self::single(self.first().clone().under(prefix));
        self.iter()
            .skip(1)
            .map(|e| Self::single(e.clone().under(prefix)))
            .fold(head, Semigroup::combine)
    }

    pub fn into_vec(self) -> Vec<SchemaError> {
        self.0.into_vec()
    }

    /// Renders the collection as a JSON array of error objects.
    pub fn to_json(&self) -> Value {
        Value::Array(self.iter().map(SchemaError::to_json).collect())
    }
}

impl Semigroup for SchemaErrors {
    fn combine(self, other: Self) -> Self {
        SchemaErrors(self.0.combine(other.0))
    }
}

impl Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

impl IntoIterator for SchemaErrors {
    type Item = SchemaError;
    type IntoIter = std::vec::IntoIter<SchemaError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a SchemaErrors {
    type Item = &'a SchemaError;
    type IntoIter = Box<dyn Iterator<Item = &'a SchemaError> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<SchemaErrors>();
    assert_sync::<SchemaErrors>();
};
