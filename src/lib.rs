//! # Edictor
//!
//! Schema-guarded records and sequences that report ALL validation failures,
//! not just the first one.
//!
//! ## Overview
//!
//! A schema is declared once as a map of field definitions. Records built
//! from it are validated as a whole on construction and re-validated on every
//! write afterwards, so a record is never observably invalid. Failures are
//! accumulated with stillwater's `Validation` type and reported together,
//! keyed by field and located by path.
//!
//! ## Core Types
//!
//! - [`DefineField`]: immutable builder of a validator chain plus options
//! - [`Field`]: a value cell that re-runs its chain on every write
//! - [`ArrayOf`]: a sequence whose elements each satisfy one of a set of [`Rule`]s
//! - [`ModelClass`] / [`Model`]: a sealed schema and its guarded records
//! - [`TestResult`]: non-failing classification of a record into valid and
//!   invalid keys
//!
//! ## Example
//!
//! ```rust
//! use edictor::{define_field, Kind, ModelClass, ModelOption};
//! use serde_json::json;
//!
//! let user = ModelClass::new("User")
//!     .define(
//!         [
//!             ("name", define_field().required(true).instance([Kind::String])),
//!             (
//!                 "phone",
//!                 define_field()
//!                     .instance([Kind::String])
//!                     .regexp(r"^[+]*[(]{0,1}[0-9]{1,4}[)]{0,1}[-\s\./0-9]*$")
//!                     .unwrap(),
//!             ),
//!             ("enable", define_field().initial(false).instance([Kind::Boolean])),
//!         ],
//!         ModelOption::new(),
//!     )
//!     .unwrap();
//!
//! let mut record = user.construct(&json!({"name": "First Last"}), ModelOption::new()).unwrap();
//!
//! // One bad key rejects the whole update
//! assert!(record.update(&json!({"name": "test", "phone": 1})).is_err());
//! assert_eq!(record.object(), json!({"name": "First Last", "enable": false}));
//! ```

pub mod array;
pub mod data;
pub mod error;
pub mod field;
pub mod model;
pub mod path;
pub mod schema;
pub mod validation;
pub mod validator;

pub use array::{ArrayOf, Rule};
pub use data::{Data, Kind, UnknownKind};
pub use error::{
    ArrayError, Error, ErrorMap, FieldError, ModelError, Result, SchemaError, SchemaErrors,
    ValidationError,
};
pub use field::{define_field, DefineField, Field, FieldOption};
pub use model::{Model, ModelClass, ModelOption};
pub use path::{KeyPath, Segment};
pub use schema::{Schema, TestResult};
pub use validation::{ValidationContext, DEFAULT_MAX_DEPTH};
pub use validator::{Message, Validator};

/// Type alias for validation results using SchemaErrors
pub type ValidationResult<T> = stillwater::Validation<T, SchemaErrors>;
