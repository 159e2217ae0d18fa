//! Compiled JSON Schema validator
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use super::error::{ValidationError, ValidationReport};
use super::ValidationConfig;
use crate::error::{SchemaError, SchemaResult};
use serde_json::Value;
use tracing::{debug, instrument};

/// A schema compiled once and reusable across documents
pub struct SchemaValidator {
    validator: jsonschema::Validator,
    config: ValidationConfig,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compile a schema; the draft is detected from `$schema`
    pub fn new(schema: &Value, config: &ValidationConfig) -> SchemaResult<Self> {
        let validator = jsonschema::options()
            .should_validate_formats(config.validate_formats)
            .build(schema)
            .map_err(|e| SchemaError::invalid_schema(e.to_string()))?;

        Ok(Self {
            validator,
            config: config.clone(),
        })
    }

    /// Compile a schema with default configuration
    pub fn from_schema(schema: &Value) -> SchemaResult<Self> {
        Self::new(schema, &ValidationConfig::default())
    }

    /// Quick check without collecting errors
    pub fn is_valid(&self, data: &Value) -> bool {
        self.validator.is_valid(data)
    }

    /// Validate a document, collecting every violation (up to `max_errors`)
    #[instrument(skip_all)]
    pub fn validate(&self, data: &Value) -> ValidationReport {
        let limit = match self.config.max_errors {
            0 => usize::MAX,
            n => n,
        };

        let errors: Vec<ValidationError> = self
            .validator
            .iter_errors(data)
            .take(limit)
            .map(|error| {
                ValidationError::new(
                    error.instance_path.to_string(),
                    error.schema_path.to_string(),
                    error.to_string(),
                )
            })
            .collect();

        debug!(errors = errors.len(), "Validated document");
        ValidationReport::from_errors(errors)
    }
}
