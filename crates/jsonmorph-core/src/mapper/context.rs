//! Per-call transform state
//!
//! Everything a single transform mutates lives here: the consumption set,
//! the warnings, and the options. Each call builds its own context, so
//! parallel or nested transforms never share state.
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use super::path::{top_level_key, PathResolver};
use crate::options::TransformOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Kind of non-fatal problem recorded during a transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// `$apply` failed to parse or evaluate; the value was left unchanged
    ApplyFailed,
}

/// A non-fatal problem attached to a mapper key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformWarning {
    pub key: String,
    pub kind: WarningKind,
    pub message: String,
}

impl fmt::Display for TransformWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\": {}", self.key, self.message)
    }
}

/// State for one transform call
#[derive(Debug)]
pub struct TransformContext<'a> {
    source: &'a Value,
    options: TransformOptions,
    consumed: BTreeSet<String>,
    warnings: Vec<TransformWarning>,
}

impl<'a> TransformContext<'a> {
    /// Create a context over a source document
    pub fn new(source: &'a Value, options: TransformOptions) -> Self {
        Self {
            source,
            options,
            consumed: BTreeSet::new(),
            warnings: Vec::new(),
        }
    }

    /// Get the source document
    pub fn source(&self) -> &'a Value {
        self.source
    }

    /// Get the options
    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Resolver rooted at the source document
    pub fn resolver(&self) -> PathResolver<'a> {
        PathResolver::new(self.source)
    }

    /// Record the top-level source key a `$from` path reads
    pub fn mark_consumed(&mut self, path: &str) {
        self.consumed.insert(top_level_key(path).to_string());
    }

    /// Check whether a top-level source key has been consumed
    pub fn is_consumed(&self, key: &str) -> bool {
        self.consumed.contains(key)
    }

    /// Get the consumption set
    pub fn consumed(&self) -> &BTreeSet<String> {
        &self.consumed
    }

    /// Record a warning
    pub fn warn(&mut self, key: impl Into<String>, kind: WarningKind, message: impl Into<String>) {
        self.warnings.push(TransformWarning {
            key: key.into(),
            kind,
            message: message.into(),
        });
    }

    /// Get recorded warnings
    pub fn warnings(&self) -> &[TransformWarning] {
        &self.warnings
    }

    /// Consume the context, returning the consumption set and warnings
    pub fn into_parts(self) -> (BTreeSet<String>, Vec<TransformWarning>) {
        (self.consumed, self.warnings)
    }
}
