//! Path resolution against the source document
//!
//! Two lookup forms exist. A plain key (`state`) is a direct property lookup
//! on the object passed in. A namespaced path (`user::address::city`) always
//! starts at the document root and descends one level per `::` segment;
//! numeric segments index into arrays.
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use serde_json::Value;

/// Delimiter between nested path segments
pub const NAMESPACE_DELIMITER: &str = "::";

/// Resolves `$from` paths against a source document
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    root: &'a Value,
}

impl<'a> PathResolver<'a> {
    /// Create a resolver rooted at the given document
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// Get the document root
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// Resolve a path, falling back when any segment is missing
    pub fn resolve_or<'v>(
        &self,
        scope: &'a Value,
        path: &str,
        fallback: Option<&'v Value>,
    ) -> Option<&'v Value>
    where
        'a: 'v,
    {
        self.resolve(scope, path).or(fallback)
    }

    /// Resolve a path; `None` when the value does not exist
    pub fn resolve(&self, scope: &'a Value, path: &str) -> Option<&'a Value> {
        if is_namespaced(path) {
            path.split(NAMESPACE_DELIMITER)
                .try_fold(self.root, |current, segment| lookup(current, segment))
        } else {
            lookup(scope, path)
        }
    }
}

/// Whether a path uses the root-relative `::` form
pub fn is_namespaced(path: &str) -> bool {
    path.contains(NAMESPACE_DELIMITER)
}

/// Top-level source key a path reads from
pub fn top_level_key(path: &str) -> &str {
    path.split(NAMESPACE_DELIMITER).next().unwrap_or(path)
}

/// Single-level structural lookup; never interprets the segment beyond a key or index
fn lookup<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
