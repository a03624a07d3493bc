//! Integration tests for field definitions and field cells.

use edictor::{define_field, Data, FieldError, FieldOption, Kind, ValidationError};
use serde_json::{json, Value};

fn to_date(v: &Data) -> Result<Option<Data>, ValidationError> {
    let text = v.as_str().ok_or("not a date string")?;
    let parts: Vec<_> = text.split('-').collect();
    match parts.as_slice() {
        [year, month, day] if year.len() == 4 && month.len() == 2 && day.len() == 2 => {
            Ok(Some(Data::from(json!({"year": year, "month": month, "day": day}))))
        }
        _ => Err(ValidationError::new(format!("invalid date \"{}\"", text))),
    }
}

#[test]
fn test_builder_is_immutable() {
    let empty = define_field();
    let text = empty.instance([Kind::String]);

    assert!(empty.validators().is_empty());
    assert_eq!(text.validators().len(), 1);

    let a = text.regexp("^a").unwrap();
    let b = text.regexp("^b").unwrap();
    assert_eq!(text.validators().len(), 1);
    assert!(a.field().validate(Some(&Data::from("abc"))).is_ok());
    assert!(b.field().validate(Some(&Data::from("abc"))).is_err());
}

#[test]
fn test_required_law() {
    let never = define_field().assert(|_| false, "never passes");

    assert_eq!(never.field().validate(None).unwrap(), None);

    let error = never.required(true).field().validate(None).unwrap_err();
    assert!(matches!(error, FieldError::Required { .. }));
    assert_eq!(error.kind(), "RequiredError");
}

#[test]
fn test_null_is_a_present_value() {
    let field = define_field().required(true).instance([Kind::String]).field();
    let error = field.validate(Some(&Data::from(Value::Null))).unwrap_err();
    assert_eq!(error.kind(), "FieldError");
}

#[test]
fn test_grant_list() {
    let field = define_field()
        .name("nickname")
        .grant([Value::Null, json!("")])
        .instance([Kind::String])
        .assert(|v| v.as_str().is_some_and(|s| s.len() >= 3), "too short")
        .field();

    assert!(field.validate(Some(&Data::from(Value::Null))).is_ok());
    assert!(field.validate(Some(&Data::from(""))).is_ok());
    assert!(field.validate(Some(&Data::from("ab"))).is_err());
    assert!(field.validate(Some(&Data::from("abc"))).is_ok());
}

#[test]
fn test_coercion_chain() {
    let field = define_field()
        .name("released")
        .instance([Kind::String])
        .apply(to_date)
        .instance([Kind::Object])
        .field();

    let value = field.validate(Some(&Data::from("2024-01-31"))).unwrap().unwrap();
    assert_eq!(value.to_json(), json!({"year": "2024", "month": "01", "day": "31"}));

    let error = field.validate(Some(&Data::from("yesterday"))).unwrap_err();
    let messages: Vec<_> = error.to_schema_errors().iter().map(|e| e.message.clone()).collect();
    assert!(messages.contains(&"invalid date \"yesterday\"".to_string()));
}

#[test]
fn test_all_failures_are_reported() {
    let field = define_field()
        .name("code")
        .instance([Kind::String])
        .regexp("^[A-Z]+$")
        .unwrap()
        .assert(|v| v.as_str().is_some_and(|s| s.len() == 3), "must be 3 letters")
        .field();

    let error = field.validate(Some(&Data::from(12))).unwrap_err();
    let codes: Vec<_> = error.to_schema_errors().iter().map(|e| e.code.clone()).collect();
    assert_eq!(codes, vec!["invalid_type", "invalid_type", "assertion_failed"]);
    assert!(error.to_string().starts_with("Field(code)"));
}

#[test]
fn test_array_of_wraps_value() {
    let field = define_field().array_of([Kind::String]).field();
    let value = field.validate(Some(&Data::from(json!(["a", "b"])))).unwrap().unwrap();

    let mut array = value.as_array().cloned().unwrap();
    assert!(array.push([json!(1)]).is_err());
    assert_eq!(array.push([json!("c")]).unwrap(), 3);
}

#[test]
fn test_cell_lifecycle() {
    let mut field = define_field()
        .initial(json!(["default"]))
        .array_of([Kind::String])
        .field();
    assert_eq!(field.value().unwrap().map(Data::to_json), Some(json!(["default"])));

    field.set_value(json!(["a", "b"])).unwrap();
    assert!(field.set_value(json!([1])).is_err());
    assert_eq!(field.value().unwrap().map(Data::to_json), Some(json!(["a", "b"])));

    field.reset().unwrap();
    assert_eq!(field.value().unwrap().map(Data::to_json), Some(json!(["default"])));
}

#[test]
fn test_option_override() {
    let define = define_field().name("title").initial("untitled");
    let field = define.field_with(FieldOption::new().with_initial("draft").with_required(true));

    assert_eq!(field.name(), Some("title"));
    assert_eq!(field.initial(), Some(&json!("draft")));
    assert!(field.option().is_required());
    assert_eq!(define.option().initial(), Some(&json!("untitled")));
}

#[test]
fn test_anonymous_label() {
    let field = define_field().required(true).field();
    assert_eq!(field.label(), "(anonymous)");
    assert_eq!(
        field.validate(None).unwrap_err().to_string(),
        "Field((anonymous)) is required"
    );
}
