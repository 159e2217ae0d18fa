//! Error types for schema validation
//!
//! A document failing its schema is not an error; it produces a report with
//! `valid == false`. Errors here mean validation could not run at all.
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that prevent validation from running
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema itself is not a valid JSON Schema
    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },

    /// The data or schema document could not be loaded
    #[error("Failed to load {what}: {source}")]
    Load {
        what: &'static str,
        #[source]
        source: jsonmorph_core::Error,
    },
}

impl SchemaError {
    /// Create an invalid schema error
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Create a load error for the data document
    pub fn data(source: jsonmorph_core::Error) -> Self {
        Self::Load {
            what: "data",
            source,
        }
    }

    /// Create a load error for the schema document
    pub fn schema(source: jsonmorph_core::Error) -> Self {
        Self::Load {
            what: "schema",
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SchemaError::invalid_schema("\"nope\" is not valid under any of the schemas");
        assert!(err.to_string().starts_with("Invalid schema:"));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = SchemaError::schema(io.into());
        assert!(err.to_string().starts_with("Failed to load schema:"));
    }
}
