//! Model classes and their guarded records.
//!
//! A [`ModelClass`] is sealed once with [`ModelClass::define`] and then used to
//! classify, validate and construct records. A [`Model`] is one such record;
//! every write goes through an explicit guarded accessor so an instance is
//! never observably invalid.

mod class;
mod instance;
mod option;

pub use class::ModelClass;
pub use instance::Model;
pub use option::ModelOption;
