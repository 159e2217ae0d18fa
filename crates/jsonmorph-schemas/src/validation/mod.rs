//! JSON Schema validation
//!
//! Schema semantics are delegated to the `jsonschema` crate. This module adds
//! document loading, a serialisable report, and a session type that keeps
//! the most recent report for callers that query errors after the fact.
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod validator;

// Re-export commonly used types
pub use error::{errors_text, ValidationError, ValidationReport};
pub use validator::SchemaValidator;

use crate::error::{SchemaError, SchemaResult};
use jsonmorph_core::DocumentSource;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Whether `format` keywords are asserted
    pub validate_formats: bool,
    /// Maximum number of errors to collect (0 = unlimited)
    pub max_errors: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validate_formats: true,
            max_errors: 0,
        }
    }
}

impl ValidationConfig {
    /// Toggle `format` assertions
    pub fn with_validate_formats(mut self, validate_formats: bool) -> Self {
        self.validate_formats = validate_formats;
        self
    }

    /// Set maximum number of errors to collect
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }
}

/// Validation session holding the most recent report
///
/// ```
/// use jsonmorph_schemas::Validation;
/// use serde_json::json;
///
/// let mut validation = Validation::new();
/// let schema = json!({"type": "object", "required": ["id"]});
///
/// assert!(!validation.validate(json!({}), schema)?);
/// assert_eq!(validation.errors_text(), "data \"id\" is a required property");
/// # Ok::<(), jsonmorph_schemas::SchemaError>(())
/// ```
#[derive(Debug, Default)]
pub struct Validation {
    config: ValidationConfig,
    last: Option<ValidationReport>,
}

impl Validation {
    /// Create a session with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with explicit configuration
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config, last: None }
    }

    /// Validate a document, replacing the stored report
    pub fn validate(
        &mut self,
        data: impl Into<DocumentSource>,
        schema: impl Into<DocumentSource>,
    ) -> SchemaResult<bool> {
        let report = validate_with(data, schema, &self.config)?;
        let valid = report.is_valid();
        self.last = Some(report);
        Ok(valid)
    }

    /// Violations from the most recent validation
    pub fn errors(&self) -> &[ValidationError] {
        self.last.as_ref().map(|r| r.errors()).unwrap_or_default()
    }

    /// Summary of the most recent validation
    pub fn errors_text(&self) -> String {
        errors_text(self.errors())
    }

    /// The most recent report, if any validation has run
    pub fn report(&self) -> Option<&ValidationReport> {
        self.last.as_ref()
    }
}

/// Validate a document against a schema with default configuration
pub fn validate(
    data: impl Into<DocumentSource>,
    schema: impl Into<DocumentSource>,
) -> SchemaResult<ValidationReport> {
    validate_with(data, schema, &ValidationConfig::default())
}

/// Validate a document against a schema
#[instrument(skip_all)]
pub fn validate_with(
    data: impl Into<DocumentSource>,
    schema: impl Into<DocumentSource>,
    config: &ValidationConfig,
) -> SchemaResult<ValidationReport> {
    let data = data.into().load().map_err(SchemaError::data)?;
    let schema = schema.into().load().map_err(SchemaError::schema)?;

    let report = SchemaValidator::new(&schema, config)?.validate(&data);
    debug!(valid = report.is_valid(), "Validation finished");

    Ok(report)
}
