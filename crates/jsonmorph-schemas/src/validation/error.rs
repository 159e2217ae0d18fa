//! Validation error and report types
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix used when rendering instance paths in summaries
const DATA_VAR: &str = "data";

/// A single schema violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// JSON Pointer to the offending value (empty for the root)
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed
    pub schema_path: String,
    /// Failing keyword, e.g. `required` or `type`
    pub keyword: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error; the keyword is the last schema path segment
    pub fn new<I, S, M>(instance_path: I, schema_path: S, message: M) -> Self
    where
        I: Into<String>,
        S: Into<String>,
        M: Into<String>,
    {
        let schema_path = schema_path.into();
        let keyword = schema_path
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();

        Self {
            instance_path: instance_path.into(),
            schema_path,
            keyword,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {}", DATA_VAR, self.instance_path, self.message)
    }
}

/// Outcome of validating one document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the document satisfied the schema
    pub valid: bool,
    /// Violations, empty when valid
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// A report for a document with no violations
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Build a report from collected violations
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Check whether the document was valid
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Get the violations
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Comma-separated summary of the violations
    pub fn errors_text(&self) -> String {
        errors_text(&self.errors)
    }
}

/// Render violations as `data/path message, ...`, or `No errors`
pub fn errors_text(errors: &[ValidationError]) -> String {
    if errors.is_empty() {
        return "No errors".to_string();
    }

    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
