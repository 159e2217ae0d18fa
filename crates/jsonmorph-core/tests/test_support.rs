//! Shared test support utilities for integration tests

#![allow(dead_code)]

use jsonmorph_core::{Transformer, TransformOptions};
use serde_json::{json, Value};
use std::path::PathBuf;

/// Path to a file under `tests/fixtures`
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Wrap a tree in a mapper document
pub fn mapper(map: Value) -> Value {
    json!({ "$map": map })
}

/// Compile a mapper tree, panicking on definition errors
pub fn transformer(map: Value) -> Transformer {
    Transformer::from_value(&mapper(map)).expect("mapper should compile")
}

/// Transform with default options
pub fn run(map: Value, source: Value) -> Value {
    run_with(map, source, TransformOptions::default())
}

/// Transform with explicit options
pub fn run_with(map: Value, source: Value, options: TransformOptions) -> Value {
    transformer(map)
        .transform(&source, &options)
        .expect("transform should succeed")
}

/// Expected output of the customer fixtures with default options
pub fn expected_customer_output() -> Value {
    json!({
        "id": 42,
        "profile": {"name": "Ada", "city": "unknown", "tier": "gold"},
        "status": "good-standing",
        "balance_cents": 1250
    })
}
