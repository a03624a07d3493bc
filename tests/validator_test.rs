//! Integration tests for validator primitives.

use edictor::validator::{self, Message};
use edictor::{define_field, Data, Kind, ModelClass, ModelOption, Validator};
use serde_json::json;

fn people() -> ModelClass {
    ModelClass::new("People")
        .define(
            [
                ("name", define_field().required(true).instance([Kind::String])),
                (
                    "email",
                    define_field()
                        .instance([Kind::String])
                        .regexp(r"^[\w\-.]+@([\w-]+\.)+[\w-]{2,4}$")
                        .unwrap(),
                ),
            ],
            ModelOption::new(),
        )
        .unwrap()
}

#[test]
fn test_instance_of_class_honours_inheritance() {
    let base = people();
    let maintainer = base
        .extend("Maintainer")
        .define([("role", define_field().instance([Kind::String]))], ModelOption::new())
        .unwrap();

    let person = base.construct(&json!({"name": "A"}), ModelOption::new()).unwrap();
    let lead = maintainer
        .construct(&json!({"name": "B", "role": "lead"}), ModelOption::new())
        .unwrap();

    let is_people = validator::instance([&base]);
    assert!(is_people.check(&Data::from(person.clone())).is_success());
    assert!(is_people.check(&Data::from(lead)).is_success());
    assert!(is_people.check(&Data::from(json!({"name": "A"}))).is_failure());

    let is_maintainer = validator::instance([&maintainer]);
    assert!(is_maintainer.check(&Data::from(person)).is_failure());
}

#[test]
fn test_textual_kinds() {
    let kinds: Vec<Kind> = ["string", "number"]
        .iter()
        .map(|tag| tag.parse().unwrap())
        .collect();
    let validator = validator::instance(kinds);

    assert!(validator.check(&Data::from(1)).is_success());
    let errors = validator.check(&Data::from(false)).into_result().unwrap_err();
    assert_eq!(errors.first().expected.as_deref(), Some("instance(string, number)"));
}

#[test]
fn test_dynamic_assert_message() {
    let currency = validator::assert(
        |v| matches!(v.as_str(), Some("THB" | "USD" | "EUR")),
        Message::dynamic(|v| format!("{} is not a supported currency", v.to_json())),
    );

    let errors = currency.check(&Data::from("BTC")).into_result().unwrap_err();
    assert_eq!(errors.first().message, "\"BTC\" is not a supported currency");
    assert_eq!(errors.first().code, "assertion_failed");
}

#[test]
fn test_model_validator_constructs_instances() {
    let class = people();
    let validator = validator::model(&class);

    let built = validator
        .check(&Data::from(json!({"name": "A", "email": "a@example.com"})))
        .into_result()
        .unwrap()
        .unwrap();
    assert_eq!(built.as_model().map(|m| m.class().name()), Some("People"));

    let errors = validator
        .check(&Data::from(json!({"email": "nope"})))
        .into_result()
        .unwrap_err();
    let paths: Vec<_> = errors.iter().map(|e| e.path.to_string()).collect();
    assert_eq!(paths, vec!["name", "email"]);

    let errors = validator.check(&Data::from("A")).into_result().unwrap_err();
    assert_eq!(errors.first().code, "not_object");
}

#[test]
fn test_model_validator_keeps_existing_instance() {
    let class = people();
    let record = class.construct(&json!({"name": "A"}), ModelOption::new()).unwrap();

    let out = validator::model(&class)
        .check(&Data::from(record.clone()))
        .into_result()
        .unwrap();
    assert_eq!(out, Some(Data::from(record)));
}

#[test]
fn test_array_of_nested_models() {
    let class = people();
    let validator = validator::array_of([&class]);

    let errors = validator
        .check(&Data::from(json!([{"name": "A"}, {"name": 1}])))
        .into_result()
        .unwrap_err();
    assert_eq!(errors.first().path.to_string(), "[1].name");
}

#[test]
fn test_debug_and_names() {
    let validators: Vec<Validator> = define_field()
        .instance([Kind::String])
        .regexp("^a$")
        .unwrap()
        .apply(|_| Ok(None))
        .model(&people())
        .validators();

    let names: Vec<_> = validators.iter().map(Validator::name).collect();
    assert_eq!(names, vec!["instance", "regexp", "apply", "model"]);
    assert_eq!(format!("{:?}", validators[1]), "regexp(/^a$/)");
    assert_eq!(format!("{:?}", validators[3]), "model(People)");
}
