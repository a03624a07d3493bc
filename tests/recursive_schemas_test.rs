//! Tests for self-referential models and depth limits.

use edictor::{define_field, Kind, Model, ModelClass, ModelOption};
use serde_json::json;

fn comment() -> ModelClass {
    let comment = ModelClass::new("Comment");
    comment
        .define(
            [
                ("text", define_field().required(true).instance([Kind::String])),
                ("replies", define_field().initial(json!([])).array_of([&comment])),
            ],
            ModelOption::new(),
        )
        .unwrap()
}

#[test]
fn test_self_referencing_model() {
    let record = Model::new(
        &comment(),
        &json!({
            "text": "Top comment",
            "replies": [
                {"text": "Reply 1"},
                {"text": "Reply 2", "replies": [{"text": "Nested reply"}]}
            ]
        }),
    )
    .unwrap();

    let replies = record.get("replies").and_then(|v| v.as_array()).unwrap();
    let nested = replies
        .get(1)
        .and_then(|v| v.as_model())
        .and_then(|m| m.get("replies"))
        .and_then(|v| v.as_array())
        .unwrap();
    assert_eq!(nested.len(), 1);
    assert_eq!(record.object()["replies"][0]["replies"], json!([]));
}

#[test]
fn test_nested_failure_is_located() {
    let error = Model::new(
        &comment(),
        &json!({
            "text": "Top",
            "replies": [{"text": "ok", "replies": [{"text": 5}]}]
        }),
    )
    .unwrap_err();

    let errors = error.to_schema_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().path.to_string(), "replies[0].replies[0].text");
}

#[test]
fn test_depth_limit_rejects_deep_input() {
    let class = comment();
    let deep = json!({
        "text": "1",
        "replies": [{"text": "2", "replies": [{"text": "3"}]}]
    });

    assert!(Model::new(&class, &deep).is_ok());

    let error = Model::with_option(&class, &deep, ModelOption::new().with_max_depth(4)).unwrap_err();
    assert!(error
        .to_schema_errors()
        .iter()
        .any(|e| e.code == "max_depth_exceeded"));
}

#[test]
fn test_unbounded_initial_recursion_stops() {
    let chain = ModelClass::new("Chain");
    let chain = chain
        .define(
            [("next", define_field().initial(json!({})).model(&chain))],
            ModelOption::new().with_max_depth(10),
        )
        .unwrap();

    let error = Model::new(&chain, &json!({})).unwrap_err();
    let errors = error.to_schema_errors();
    assert_eq!(errors.first().code, "max_depth_exceeded");
    assert!(errors.first().path.to_string().starts_with("next.next.next"));
}

#[test]
fn test_mutually_recursive_models() {
    let folder = ModelClass::new("Folder");
    let file = ModelClass::new("File");

    file.define(
        [
            ("name", define_field().required(true).instance([Kind::String])),
            ("parent", define_field().model(&folder)),
        ],
        ModelOption::new(),
    )
    .unwrap();
    folder
        .define(
            [
                ("name", define_field().required(true).instance([Kind::String])),
                ("files", define_field().initial(json!([])).array_of([&file])),
            ],
            ModelOption::new(),
        )
        .unwrap();

    let record = Model::new(
        &folder,
        &json!({"name": "src", "files": [{"name": "lib.rs", "parent": {"name": "src"}}]}),
    )
    .unwrap();
    assert_eq!(
        record.object()["files"][0]["parent"],
        json!({"name": "src", "files": []})
    );
}
