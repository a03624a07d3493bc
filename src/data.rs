//! Values held by fields, records and sequences.
//!
//! Input arrives as plain `serde_json::Value`. Once validated, a value may have
//! been wrapped into a guarded [`Model`] or [`ArrayOf`], so stored values are
//! [`Data`]: plain JSON or one of the two guarded containers.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde_json::Value;

use crate::array::ArrayOf;
use crate::model::{Model, ModelClass};

/// A validated value.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// Plain JSON, including `null`.
    Plain(Value),
    /// A nested guarded record.
    Model(Model),
    /// A nested guarded sequence.
    Array(ArrayOf),
}

impl Data {
    /// Deep plain snapshot with every guard removed.
    pub fn to_json(&self) -> Value {
        match self {
            Data::Plain(value) => value.clone(),
            Data::Model(model) => model.object(),
            Data::Array(array) => array.object(),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Data::Plain(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(Value::as_str)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_json().and_then(Value::as_f64)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_json().and_then(Value::as_i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_json().and_then(Value::as_bool)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Data::Plain(Value::Null))
    }

    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Data::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_model_mut(&mut self) -> Option<&mut Model> {
        match self {
            Data::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayOf> {
        match self {
            Data::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut ArrayOf> {
        match self {
            Data::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Runtime type name, as reported in `got` of type errors.
    pub fn type_name(&self) -> &str {
        match self {
            Data::Plain(Value::Null) => "null",
            Data::Plain(Value::Bool(_)) => "boolean",
            Data::Plain(Value::Number(_)) => "number",
            Data::Plain(Value::String(_)) => "string",
            Data::Plain(Value::Array(_)) => "array",
            Data::Plain(Value::Object(_)) => "object",
            Data::Model(model) => model.class().name(),
            Data::Array(_) => "ArrayOf",
        }
    }

    /// Compact JSON rendering for error messages.
    pub(crate) fn describe(&self) -> String {
        self.to_json().to_string()
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        Data::Plain(value)
    }
}

impl From<Model> for Data {
    fn from(model: Model) -> Self {
        Data::Model(model)
    }
}

impl From<ArrayOf> for Data {
    fn from(array: ArrayOf) -> Self {
        Data::Array(array)
    }
}

impl From<&str> for Data {
    fn from(value: &str) -> Self {
        Data::Plain(Value::from(value))
    }
}

impl From<String> for Data {
    fn from(value: String) -> Self {
        Data::Plain(Value::from(value))
    }
}

impl From<bool> for Data {
    fn from(value: bool) -> Self {
        Data::Plain(Value::from(value))
    }
}

impl From<i32> for Data {
    fn from(value: i32) -> Self {
        Data::Plain(Value::from(value))
    }
}

impl From<i64> for Data {
    fn from(value: i64) -> Self {
        Data::Plain(Value::from(value))
    }
}

impl From<u64> for Data {
    fn from(value: u64) -> Self {
        Data::Plain(Value::from(value))
    }
}

impl From<f64> for Data {
    fn from(value: f64) -> Self {
        Data::Plain(Value::from(value))
    }
}

/// A runtime type tag checked by the `instance` validator.
///
/// Textual tags parse with [`FromStr`]:
///
/// ```rust
/// use edictor::Kind;
///
/// assert_eq!("string".parse::<Kind>().unwrap(), Kind::String);
/// assert!("str".parse::<Kind>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    String,
    Number,
    /// A number without a fractional part.
    Integer,
    Boolean,
    Null,
    /// A plain object or any model instance.
    Object,
    /// A plain array or any `ArrayOf`.
    Array,
    /// An instance of the class or one of its subclasses.
    Model(ModelClass),
}

impl Kind {
    pub fn matches(&self, data: &Data) -> bool {
        match (self, data) {
            (Kind::String, Data::Plain(Value::String(_))) => true,
            (Kind::Number, Data::Plain(Value::Number(_))) => true,
            (Kind::Integer, Data::Plain(Value::Number(n))) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            (Kind::Boolean, Data::Plain(Value::Bool(_))) => true,
            (Kind::Null, Data::Plain(Value::Null)) => true,
            (Kind::Object, Data::Plain(Value::Object(_)) | Data::Model(_)) => true,
            (Kind::Array, Data::Plain(Value::Array(_)) | Data::Array(_)) => true,
            (Kind::Model(class), Data::Model(model)) => model.class().is_a(class),
            _ => false,
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::String => write!(f, "string"),
            Kind::Number => write!(f, "number"),
            Kind::Integer => write!(f, "integer"),
            Kind::Boolean => write!(f, "boolean"),
            Kind::Null => write!(f, "null"),
            Kind::Object => write!(f, "object"),
            Kind::Array => write!(f, "array"),
            Kind::Model(class) => write!(f, "{}", class.name()),
        }
    }
}

/// An unrecognised textual type tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown kind `{0}`")]
pub struct UnknownKind(pub String);

impl FromStr for Kind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Kind::String),
            "number" => Ok(Kind::Number),
            "integer" => Ok(Kind::Integer),
            "boolean" => Ok(Kind::Boolean),
            "null" => Ok(Kind::Null),
            "object" => Ok(Kind::Object),
            "array" => Ok(Kind::Array),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

impl From<&ModelClass> for Kind {
    fn from(class: &ModelClass) -> Self {
        Kind::Model(class.clone())
    }
}

impl From<ModelClass> for Kind {
    fn from(class: ModelClass) -> Self {
        Kind::Model(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitive_kinds() {
        assert!(Kind::String.matches(&Data::from("a")));
        assert!(Kind::Number.matches(&Data::from(1.5)));
        assert!(Kind::Boolean.matches(&Data::from(true)));
        assert!(Kind::Null.matches(&Data::from(Value::Null)));
        assert!(!Kind::String.matches(&Data::from(1)));
    }

    #[test]
    fn test_integer_kind() {
        assert!(Kind::Integer.matches(&Data::from(30)));
        assert!(Kind::Integer.matches(&Data::from(json!(30.0))));
        assert!(!Kind::Integer.matches(&Data::from(30.5)));
    }

    #[test]
    fn test_container_kinds() {
        assert!(Kind::Object.matches(&Data::from(json!({"a": 1}))));
        assert!(Kind::Array.matches(&Data::from(json!([1, 2]))));
        assert!(Kind::Array.matches(&Data::from(ArrayOf::new([Kind::Number]))));
        assert!(!Kind::Object.matches(&Data::from(json!([]))));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Data::from(json!(null)).type_name(), "null");
        assert_eq!(Data::from(json!({})).type_name(), "object");
        assert_eq!(Data::from(ArrayOf::new([Kind::String])).type_name(), "ArrayOf");
    }

    #[test]
    fn test_parse_all_tags() {
        for tag in ["string", "number", "integer", "boolean", "null", "object", "array"] {
            let kind: Kind = tag.parse().unwrap();
            assert_eq!(kind.to_string(), tag);
        }
        assert_eq!("bool".parse::<Kind>(), Err(UnknownKind("bool".into())));
    }
}
