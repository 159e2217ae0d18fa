//! Schema validation tests against documents on disk

use jsonmorph_schemas::{validate, validate_with, SchemaError, Validation, ValidationConfig};
use serde_json::json;
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn order_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": {
            "id": {"type": "integer"},
            "email": {"type": "string", "format": "email"},
            "items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {"qty": {"type": "integer", "minimum": 1}},
                    "required": ["qty"]
                }
            }
        },
        "required": ["id", "items"]
    })
}

#[test]
fn test_valid_document_from_files() {
    let schema = write_temp(".json", &order_schema().to_string());
    let data = write_temp(".yaml", "id: 7\nemail: a@b.io\nitems:\n  - qty: 2\n");

    let report = validate(data.path(), schema.path()).unwrap();
    assert!(report.is_valid(), "{}", report.errors_text());
}

#[test]
fn test_nested_errors_have_pointer_paths() {
    let report = validate(
        json!({"id": 7, "items": [{"qty": 1}, {"qty": 0}, {}]}),
        order_schema(),
    )
    .unwrap();

    assert!(!report.is_valid());
    let paths: Vec<_> = report
        .errors()
        .iter()
        .map(|e| (e.instance_path.as_str(), e.keyword.as_str()))
        .collect();
    assert!(paths.contains(&("/items/1/qty", "minimum")));
    assert!(paths.contains(&("/items/2", "required")));
    assert!(report.errors_text().contains("data/items/1/qty"));
}

#[test]
fn test_format_assertions_follow_config() {
    let data = json!({"id": 1, "items": [], "email": "nope"});

    assert!(!validate(data.clone(), order_schema()).unwrap().is_valid());

    let config = ValidationConfig::default().with_validate_formats(false);
    assert!(validate_with(data, order_schema(), &config).unwrap().is_valid());
}

#[test]
fn test_session_reports_latest_validation() {
    let mut validation = Validation::new();

    assert!(!validation.validate(json!({"items": []}), order_schema()).unwrap());
    assert_eq!(validation.errors().len(), 1);
    assert_eq!(validation.errors()[0].keyword, "required");

    assert!(validation
        .validate(json!({"id": 1, "items": []}), order_schema())
        .unwrap());
    assert_eq!(validation.errors_text(), "No errors");
}

#[test]
fn test_unreadable_data_is_an_error() {
    let data = write_temp(".json", "{ not json");
    let err = validate(data.path(), order_schema()).unwrap_err();
    assert!(matches!(err, SchemaError::Load { what: "data", .. }));
}
