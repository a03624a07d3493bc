//! Guarded sequences.
//!
//! This module provides [`ArrayOf`], an ordered sequence whose every element
//! satisfies at least one [`Rule`] of a fixed set. Every entry point that adds
//! or replaces elements validates all proposed values first and commits only
//! when all of them pass, so a rejected call leaves the sequence exactly as it
//! was.

use std::fmt::{self, Display};
use std::sync::Arc;

use serde_json::Value;
use stillwater::prelude::*;
use stillwater::Validation;
use tracing::trace;

use crate::data::{Data, Kind};
use crate::error::{ArrayError, SchemaError, SchemaErrors};
use crate::field::{DefineField, Field};
use crate::model::ModelClass;
use crate::path::KeyPath;
use crate::validation::ValidationContext;
use crate::validator::{join, Validator};

/// One acceptable element shape of an [`ArrayOf`].
///
/// An element is accepted by the first rule that accepts it, and stored as
/// that rule returns it: `Model` and `Array` rules wrap raw objects and
/// arrays into guarded containers.
#[derive(Debug, Clone)]
pub enum Rule {
    Kind(Kind),
    Validator(Validator),
    /// A whole field chain; compiled once from a [`DefineField`].
    Field(Field),
    Model(ModelClass),
    /// A nested sequence whose elements follow the inner rules.
    Array(Arc<[Rule]>),
}

impl Rule {
    /// A nested array rule.
    pub fn array<I, R>(rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Rule>,
    {
        Rule::Array(rules.into_iter().map(Into::into).collect())
    }

    pub(crate) fn check(&self, value: &Data, ctx: &ValidationContext) -> Validation<Data, SchemaErrors> {
        match self {
            Rule::Kind(kind) if kind.matches(value) => Validation::Success(value.clone()),
            Rule::Kind(kind) => Validation::Failure(SchemaErrors::single(
                SchemaError::new(
                    KeyPath::root(),
                    format!("expected {} but got {}", kind, value.type_name()),
                )
                .with_code("invalid_type")
                .with_expected(kind.to_string())
                .with_got(value.type_name()),
            )),
            Rule::Validator(validator) => validator
                .check_with(value, ctx)
                .map(|replaced| replaced.unwrap_or_else(|| value.clone())),
            Rule::Field(field) => match field.validate_with(Some(value), ctx) {
                Ok(checked) => Validation::Success(checked.unwrap_or_else(|| value.clone())),
                Err(error) => Validation::Failure(error.to_schema_errors()),
            },
            Rule::Model(class) => class.build(value, ctx).map(Data::Model),
            Rule::Array(rules) => ArrayOf::from_data(rules, value, ctx).map(Data::Array),
        }
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Kind(kind) => write!(f, "{}", kind),
            Rule::Validator(validator) => write!(f, "{:?}", validator),
            Rule::Field(field) => write!(f, "Field({})", field.label()),
            Rule::Model(class) => write!(f, "{}", class.name()),
            Rule::Array(rules) => write!(f, "[{}]", join(rules.iter())),
        }
    }
}

impl From<Kind> for Rule {
    fn from(kind: Kind) -> Self {
        Rule::Kind(kind)
    }
}

impl From<Validator> for Rule {
    fn from(validator: Validator) -> Self {
        Rule::Validator(validator)
    }
}

impl From<DefineField> for Rule {
    fn from(define: DefineField) -> Self {
        Rule::Field(define.field())
    }
}

impl From<&DefineField> for Rule {
    fn from(define: &DefineField) -> Self {
        Rule::Field(define.field())
    }
}

impl From<ModelClass> for Rule {
    fn from(class: ModelClass) -> Self {
        Rule::Model(class)
    }
}

impl From<&ModelClass> for Rule {
    fn from(class: &ModelClass) -> Self {
        Rule::Model(class.clone())
    }
}

impl From<Vec<Rule>> for Rule {
    fn from(rules: Vec<Rule>) -> Self {
        Rule::Array(rules.into())
    }
}

/// An ordered sequence bound to a set of acceptable element rules.
///
/// # Example
///
/// ```rust
/// use edictor::{ArrayOf, Kind};
/// use serde_json::json;
///
/// let mut array = ArrayOf::new([Kind::String, Kind::Number]);
/// assert_eq!(array.push([json!("a"), json!(1)]).unwrap(), 2);
///
/// // One bad value rejects the whole push
/// assert!(array.push([json!("b"), json!(true)]).is_err());
/// assert_eq!(array.object(), json!(["a", 1]));
/// ```
#[derive(Debug, Clone)]
pub struct ArrayOf {
    rules: Arc<[Rule]>,
    items: Vec<Data>,
}

impl ArrayOf {
    /// Creates an empty sequence. An empty rule set accepts any value.
    pub fn new<I, R>(rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Rule>,
    {
        Self {
            rules: rules.into_iter().map(Into::into).collect(),
            items: Vec::new(),
        }
    }

    /// Builds a sequence bound to `rules` from an array-shaped value.
    pub(crate) fn from_data(
        rules: &Arc<[Rule]>,
        value: &Data,
        ctx: &ValidationContext,
    ) -> Validation<ArrayOf, SchemaErrors> {
        let values: Vec<Data> = match value {
            Data::Array(array) => array.items.clone(),
            Data::Plain(Value::Array(values)) => values.iter().cloned().map(Data::Plain).collect(),
            other => {
                return Validation::Failure(SchemaErrors::single(
                    SchemaError::new(
                        KeyPath::root(),
                        format!("{} is not iterable", other.describe()),
                    )
                    .with_code("not_array")
                    .with_expected("array")
                    .with_got(other.type_name()),
                ))
            }
        };
        let inner = match ctx.descend() {
            Ok(inner) => inner,
            Err(errors) => return Validation::Failure(errors),
        };

        let mut array = ArrayOf {
            rules: Arc::clone(rules),
            items: Vec::new(),
        };
        match array.check_all(values, 0, &inner) {
            Ok(items) => {
                array.items = items;
                Validation::Success(array)
            }
            Err(errors) => Validation::Failure(errors),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Data> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Data> {
        self.items.iter()
    }

    /// Appends every value, or none of them.
    ///
    /// Returns the new length.
    ///
    /// # Errors
    ///
    /// Returns `ArrayError::Push` listing every rejected value by the index it
    /// would have occupied.
    pub fn push<I, V>(&mut self, values: I) -> Result<usize, ArrayError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Data>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push_with(values, &ValidationContext::default())
    }

    pub(crate) fn push_with(
        &mut self,
        values: Vec<Data>,
        ctx: &ValidationContext,
    ) -> Result<usize, ArrayError> {
        let checked = self
            .check_all(values, self.items.len(), ctx)
            .map_err(|errors| {
                trace!(expected = %self, rejected = errors.len(), "push rejected");
                ArrayError::Push {
                    expected: self.to_string(),
                    errors,
                }
            })?;
        self.items.extend(checked);
        Ok(self.items.len())
    }

    /// Writes one element. Writing at `len()` appends.
    ///
    /// # Errors
    ///
    /// `ArrayError::OutOfBounds` past the end, `ArrayError::SetValue` when the
    /// value matches no rule. The prior element is kept in both cases.
    pub fn set(&mut self, index: usize, value: impl Into<Data>) -> Result<(), ArrayError> {
        let len = self.items.len();
        if index > len {
            return Err(ArrayError::OutOfBounds { index, len });
        }
        let value = value.into();
        let checked = self
            .check_one(&value, index, &ValidationContext::default())
            .into_result()
            .map_err(|errors| {
                trace!(index, expected = %self, "index write rejected");
                ArrayError::SetValue {
                    index,
                    expected: self.to_string(),
                    errors,
                }
            })?;
        if index == len {
            self.items.push(checked);
        } else {
            self.items[index] = checked;
        }
        Ok(())
    }

    /// Swaps the whole contents for `values`, or keeps the current contents
    /// when any value is rejected.
    pub fn replace<I, V>(&mut self, values: I) -> Result<(), ArrayError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Data>,
    {
        let values = values.into_iter().map(Into::into).collect();
        let checked = self
            .check_all(values, 0, &ValidationContext::default())
            .map_err(|errors| ArrayError::Push {
                expected: self.to_string(),
                errors,
            })?;
        self.items = checked;
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Data> {
        self.items.pop()
    }

    /// Deep plain snapshot with every guard removed.
    pub fn object(&self) -> Value {
        Value::Array(self.items.iter().map(Data::to_json).collect())
    }

    pub fn json(&self) -> String {
        self.object().to_string()
    }

    /// Checks `values` as if placed from index `offset`, without touching
    /// the sequence.
    fn check_all(
        &self,
        values: Vec<Data>,
        offset: usize,
        ctx: &ValidationContext,
    ) -> Result<Vec<Data>, SchemaErrors> {
        let mut accepted = Vec::with_capacity(values.len());
        let mut failures = Vec::new();

        for (i, value) in values.iter().enumerate() {
            match self.check_one(value, offset + i, ctx) {
                Validation::Success(item) => accepted.push(item),
                Validation::Failure(errors) => failures.push(errors),
            }
        }

        match failures.into_iter().reduce(Semigroup::combine) {
            None => Ok(accepted),
            Some(errors) => Err(errors),
        }
    }

    fn check_one(
        &self,
        value: &Data,
        index: usize,
        ctx: &ValidationContext,
    ) -> Validation<Data, SchemaErrors> {
        if self.rules.is_empty() {
            return Validation::Success(value.clone());
        }

        let mut failures = Vec::with_capacity(self.rules.len());
        for rule in self.rules.iter() {
            match rule.check(value, ctx) {
                Validation::Success(item) => return Validation::Success(item),
                Validation::Failure(errors) => failures.push(errors),
            }
        }

        let path = KeyPath::index(index);
        match failures.pop() {
            // A single rule explains itself better than a summary
            Some(errors) if failures.is_empty() => Validation::Failure(errors.under(&path)),
            _ => Validation::Failure(SchemaErrors::single(
                SchemaError::new(
                    path,
                    format!("value did not match any of {} validators", self.rules.len()),
                )
                .with_code("array_of_none_matched")
                .with_expected(self.to_string())
                .with_got(value.describe()),
            )),
        }
    }
}

impl PartialEq for ArrayOf {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Display for ArrayOf {
    /// Renders the rule set, e.g. `(string, number, [string, number])`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", join(self.rules.iter()))
    }
}

impl<'a> IntoIterator for &'a ArrayOf {
    type Item = &'a Data;
    type IntoIter = std::slice::Iter<'a, Data>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_then_reject_keeps_length() {
        let mut array = ArrayOf::new([Kind::String, Kind::Number]);
        assert_eq!(array.push([json!("a"), json!(1)]).unwrap(), 2);

        let error = array.push([json!(true)]).unwrap_err();
        assert_eq!(error.kind(), "PushError");
        assert_eq!(array.len(), 2);
        assert_eq!(array.object(), json!(["a", 1]));
    }

    #[test]
    fn test_push_reports_every_bad_index() {
        let mut array = ArrayOf::new([Kind::String]);
        array.push([json!("a")]).unwrap();

        let error = array.push([json!(1), json!("b"), json!(null)]).unwrap_err();
        let paths: Vec<_> = error
            .to_schema_errors()
            .iter()
            .map(|e| e.path.to_string())
            .collect();
        assert_eq!(paths, vec!["[1]", "[3]"]);
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn test_set_guards_index() {
        let mut array = ArrayOf::new([Kind::String, Kind::Number]);
        array.set(0, "test string").unwrap();
        assert!(matches!(
            array.set(0, true),
            Err(ArrayError::SetValue { index: 0, .. })
        ));
        assert_eq!(array.get(0), Some(&Data::from("test string")));

        assert!(matches!(
            array.set(5, 1),
            Err(ArrayError::OutOfBounds { index: 5, len: 1 })
        ));
    }

    #[test]
    fn test_nested_rule_wraps_sub_arrays() {
        let mut array = ArrayOf::new([Rule::array([Kind::String, Kind::Number]), Kind::Boolean.into()]);
        array.push([json!(["0", 1]), json!([0, "1"]), json!(true)]).unwrap();

        assert!(array.get(0).and_then(Data::as_array).is_some());
        assert_eq!(array.object(), json!([["0", 1], [0, "1"], true]));

        assert!(array.set(0, json!([true, false])).is_err());
        assert_eq!(array.object(), json!([["0", 1], [0, "1"], true]));
    }

    #[test]
    fn test_replace_is_atomic() {
        let mut array = ArrayOf::new([Kind::Number]);
        array.push([json!(1), json!(2)]).unwrap();

        assert!(array.replace([json!(3), json!("x")]).is_err());
        assert_eq!(array.object(), json!([1, 2]));

        array.replace([json!(3)]).unwrap();
        assert_eq!(array.object(), json!([3]));
    }

    #[test]
    fn test_empty_rules_accept_anything() {
        let mut array = ArrayOf::new(Vec::<Rule>::new());
        array.push([json!(1), json!("a"), json!(null)]).unwrap();
        assert_eq!(array.len(), 3);
    }

    #[test]
    fn test_display_rules() {
        let array = ArrayOf::new([Kind::String.into(), Rule::array([Kind::Number])]);
        assert_eq!(array.to_string(), "(string, [number])");
    }

    #[test]
    fn test_json_round_trip() {
        let mut array = ArrayOf::new([Kind::String, Kind::Number]);
        array.push([json!("a"), json!("b"), json!(0), json!(1)]).unwrap();

        let parsed: Value = serde_json::from_str(&array.json()).unwrap();
        assert_eq!(parsed, array.object());
    }
}
