//! Error types for validation failures.
//!
//! Leaf failures are [`SchemaError`] values collected in [`SchemaErrors`].
//! They are wrapped by the aggregate that matches the operation that failed:
//!
//! - [`FieldError`]: one value against one field (`RequiredError`, `FieldError`,
//!   `UndefinedError`)
//! - [`ArrayError`]: a guarded sequence mutation (`PushError`, `SetValueError`)
//! - [`ModelError`]: schema definition, record classification, construction
//!   and guarded record mutation
//!
//! [`Error`] unifies the three for callers that mix operations.

mod aggregate;
mod field_error;
mod schema_error;

pub use aggregate::{ArrayError, ErrorMap, ModelError};
pub use field_error::{FieldError, ValidationError};
pub use schema_error::{SchemaError, SchemaErrors};

use serde_json::Value;

/// Any failure raised by this crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Array(#[from] ArrayError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl Error {
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Field(e) => e.kind(),
            Error::Array(e) => e.kind(),
            Error::Model(e) => e.kind(),
        }
    }

    pub fn to_schema_errors(&self) -> SchemaErrors {
        match self {
            Error::Field(e) => e.to_schema_errors(),
            Error::Array(e) => e.to_schema_errors(),
            Error::Model(e) => e.to_schema_errors(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Error::Field(e) => e.to_json(),
            Error::Array(e) => e.to_json(),
            Error::Model(e) => e.to_json(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
