//! Output post-processing: null pruning and orphan merging
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use crate::expression::is_truthy;
use crate::options::TransformOptions;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::trace;

/// Source keys never merged back as orphans
const RESERVED_ORPHAN_KEYS: &[&str] = &["constructor"];

/// Applies the configured post-passes to a walked output object
#[derive(Debug, Clone, Copy)]
pub struct OutputAssembler {
    options: TransformOptions,
}

impl OutputAssembler {
    /// Create an assembler for the given options
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }

    /// Prune nulls (when disabled) and then merge orphans (when enabled)
    pub fn assemble(
        &self,
        output: Map<String, Value>,
        source: &Value,
        consumed: &BTreeSet<String>,
    ) -> Value {
        let mut document = Value::Object(output);

        if !self.options.keep_nulls {
            prune_nulls(&mut document);
        }

        if self.options.merge_unmapped {
            document = merge_orphans(document, orphans(source, consumed));
        }

        document
    }
}

/// Remove every null-valued object member at any depth
///
/// Array elements are descended into but never removed, so indices stay stable.
pub fn prune_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, member| !member.is_null());
            for member in map.values_mut() {
                prune_nulls(member);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                prune_nulls(item);
            }
        }
        _ => {}
    }
}

/// Truthy top-level source members that no `$from` consumed
pub fn orphans(source: &Value, consumed: &BTreeSet<String>) -> Map<String, Value> {
    let Some(object) = source.as_object() else {
        return Map::new();
    };

    object
        .iter()
        .filter(|(key, value)| {
            !consumed.contains(key.as_str())
                && !RESERVED_ORPHAN_KEYS.contains(&key.as_str())
                && is_truthy(value)
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Orphans first, mapped keys override on collision
fn merge_orphans(document: Value, orphans: Map<String, Value>) -> Value {
    trace!(orphans = orphans.len(), "Merging unmapped source keys");

    let mut merged = orphans;
    if let Value::Object(mapped) = document {
        for (key, value) in mapped {
            merged.insert(key, value);
        }
    }
    Value::Object(merged)
}
