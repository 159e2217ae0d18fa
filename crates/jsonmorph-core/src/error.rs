//! Error types for the jsonmorph core library
//!
//! Mapping definition problems are reported with the key path of the
//! offending node (`address.city`), so a broken mapper can be fixed without
//! guessing which directive failed.
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use crate::expression::ExpressionError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for jsonmorph operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed mapper: missing `$map`, bad directive shape, invalid condition
    #[error("Mapping definition error: \"{key}\": {message}")]
    MappingDefinition { key: String, message: String },

    /// A `$condition` expression failed while being evaluated
    #[error("Expression error in \"{key}\": {source}")]
    Expression {
        key: String,
        #[source]
        source: ExpressionError,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parsing errors
    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Document file whose format could not be determined or parsed
    #[error("Unsupported document format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a mapping definition error for the given key path
    pub fn definition(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MappingDefinition {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an expression evaluation error for the given key path
    pub fn expression(key: impl Into<String>, source: ExpressionError) -> Self {
        Error::Expression {
            key: key.into(),
            source,
        }
    }

    /// Key path of the mapper node that caused the error, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::MappingDefinition { key, .. } | Error::Expression { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Whether the error comes from the mapper rather than from reading input
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            Error::MappingDefinition { .. } | Error::Expression { .. }
        )
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}
