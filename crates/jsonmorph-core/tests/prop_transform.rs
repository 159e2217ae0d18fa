//! Property-based tests for the transform engine
//!
//! These tests verify invariants that should hold for all mapper trees and
//! source documents within the generated shapes.

mod test_support;

use jsonmorph_core::mapper::prune_nulls;
use jsonmorph_core::TransformOptions;
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use test_support::{run_with, transformer};

// Strategy functions for property testing

/// Strategy for short keys so mapper paths and source keys overlap
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}"
}

/// Strategy for scalar JSON values, null included
fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::String),
    ]
}

/// Strategy for arbitrary nested JSON documents
fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..4).prop_map(Value::Array),
            btree_map(key_strategy(), inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Strategy for source documents (always objects)
fn source_strategy() -> impl Strategy<Value = Value> {
    btree_map(key_strategy(), value_strategy(), 0..6)
        .prop_map(|m| Value::Object(m.into_iter().collect()))
}

/// Strategy for directive leaves built only from `$from` / `$default`
fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        key_strategy().prop_map(|k| json!({ "$from": k })),
        (key_strategy(), key_strategy())
            .prop_map(|(a, b)| json!({ "$from": format!("{}::{}", a, b) })),
        (key_strategy(), scalar_strategy())
            .prop_map(|(k, d)| json!({ "$from": k, "$default": d })),
        scalar_strategy().prop_map(|d| json!({ "$default": d })),
    ]
}

/// Strategy for mapper trees of containers and plain leaves
fn tree_strategy() -> impl Strategy<Value = Value> {
    let node = leaf_strategy().prop_recursive(3, 24, 3, |inner| {
        btree_map(key_strategy(), inner, 1..4).prop_map(|m| Value::Object(m.into_iter().collect()))
    });
    btree_map(key_strategy(), node, 0..5).prop_map(|m| Value::Object(m.into_iter().collect()))
}

fn is_container(node: &Value) -> bool {
    node.as_object()
        .is_some_and(|m| m.keys().any(|k| !k.starts_with('$')))
}

/// Every output key exists at the same level of the mapper tree
fn mirrors(output: &Map<String, Value>, tree: &Map<String, Value>) -> bool {
    output.iter().all(|(key, value)| match tree.get(key) {
        None => false,
        Some(node) if is_container(node) => match (value.as_object(), node.as_object()) {
            (Some(out), Some(sub)) => mirrors(out, sub),
            _ => false,
        },
        Some(_) => true,
    })
}

fn contains_null_member(value: &Value) -> bool {
    match value {
        Value::Object(map) => map
            .values()
            .any(|member| member.is_null() || contains_null_member(member)),
        Value::Array(items) => items.iter().any(contains_null_member),
        _ => false,
    }
}

proptest! {
    /// Property: output key structure mirrors the mapper tree, and re-running agrees
    #[test]
    fn prop_output_mirrors_mapper(tree in tree_strategy(), source in source_strategy()) {
        let compiled = transformer(tree.clone());
        let options = TransformOptions::default();

        let first = compiled.transform(&source, &options).unwrap();
        let second = compiled.transform(&source, &options).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert!(mirrors(first.as_object().unwrap(), tree.as_object().unwrap()));
    }

    /// Property: conditions combine with AND, never OR
    #[test]
    fn prop_conditions_use_and_semantics(flags in vec(any::<bool>(), 1..6)) {
        let conditions: Vec<Value> = (0..flags.len())
            .map(|i| json!({"$from": format!("c{}", i), "$is": true}))
            .collect();
        let source: Map<String, Value> = flags
            .iter()
            .enumerate()
            .map(|(i, flag)| (format!("c{}", i), Value::Bool(*flag)))
            .collect();

        let output = run_with(
            json!({"r": {"$if": conditions, "$then": {"$value": "then"}, "$else": {"$value": "else"}}}),
            Value::Object(source),
            TransformOptions::default(),
        );

        let expected = if flags.iter().all(|f| *f) { "then" } else { "else" };
        prop_assert_eq!(output, json!({"r": expected}));
    }

    /// Property: rename substitutes the first matching pair or leaves the value alone
    #[test]
    fn prop_rename_first_match(
        value in "[a-c]",
        pairs in vec(("[a-d]", "[w-z]{2}"), 1..5)
    ) {
        let (sources, targets): (Vec<String>, Vec<String>) = pairs.iter().cloned().unzip();
        let output = run_with(
            json!({"v": {"$from": "v", "$rename": {"$source": sources, "$target": targets}}}),
            json!({"v": value.clone()}),
            TransformOptions::default(),
        );

        let expected = pairs
            .iter()
            .find(|(s, _)| *s == value)
            .map(|(_, t)| t.clone())
            .unwrap_or(value);
        prop_assert_eq!(output, json!({"v": expected}));
    }

    /// Property: with keep_nulls off no object member is null at any depth
    #[test]
    fn prop_prune_removes_all_null_members(tree in tree_strategy(), source in source_strategy()) {
        let output = run_with(tree, source, TransformOptions::new().with_keep_nulls(false));
        prop_assert!(!contains_null_member(&output));
    }

    /// Property: pruning is idempotent and keeps non-null scalars
    #[test]
    fn prop_prune_is_idempotent(mut value in value_strategy()) {
        prune_nulls(&mut value);
        let once = value.clone();
        prune_nulls(&mut value);
        prop_assert_eq!(once, value);
    }
}
