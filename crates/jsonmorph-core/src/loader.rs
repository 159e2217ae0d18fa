//! Document loading for source data, mapper and schema documents
//!
//! Documents arrive either as in-memory JSON values or as file paths. Files
//! are parsed as JSON or YAML based on their extension.
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use crate::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported file formats for documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml)
    Yaml,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension().and_then(|ext| ext.to_str())?;
        match extension.to_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }

    /// Get the primary file extension for this format
    pub fn primary_extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }
}

/// A document given either inline or by path
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSource {
    /// Already parsed JSON
    Value(Value),
    /// File to load
    Path(PathBuf),
}

impl DocumentSource {
    /// Resolve the source into a JSON value, reading the file if needed
    pub fn load(self) -> Result<Value> {
        match self {
            DocumentSource::Value(value) => Ok(value),
            DocumentSource::Path(path) => DocumentLoader::load(&path),
        }
    }
}

impl From<Value> for DocumentSource {
    fn from(value: Value) -> Self {
        DocumentSource::Value(value)
    }
}

impl From<&Path> for DocumentSource {
    fn from(path: &Path) -> Self {
        DocumentSource::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for DocumentSource {
    fn from(path: PathBuf) -> Self {
        DocumentSource::Path(path)
    }
}

impl From<&str> for DocumentSource {
    fn from(path: &str) -> Self {
        DocumentSource::Path(PathBuf::from(path))
    }
}

/// Reads JSON and YAML documents from disk
#[derive(Debug, Default)]
pub struct DocumentLoader;

impl DocumentLoader {
    /// Load a document, detecting the format from the extension
    pub fn load(path: &Path) -> Result<Value> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            message: format!("Failed to read {}: {}", path.display(), e),
            source: e,
        })?;

        debug!(path = %path.display(), bytes = content.len(), "Loaded document");

        match Format::from_path(path) {
            Some(format) => Self::parse(&content, format, path),
            None => Self::parse_unknown(&content, path),
        }
    }

    /// Parse content with an explicit format
    pub fn parse(content: &str, format: Format, path: &Path) -> Result<Value> {
        match format {
            Format::Json => serde_json::from_str(content).map_err(|e| Error::Json {
                message: format!("Failed to parse {}: {}", path.display(), e),
                source: e,
            }),
            Format::Yaml => serde_yaml::from_str(content).map_err(|e| Error::Yaml {
                message: format!("Failed to parse {}: {}", path.display(), e),
                source: e,
            }),
        }
    }

    /// Try JSON first, then YAML; YAML must yield a structured document
    fn parse_unknown(content: &str, path: &Path) -> Result<Value> {
        if let Ok(value) = serde_json::from_str::<Value>(content) {
            return Ok(value);
        }

        match serde_yaml::from_str::<Value>(content) {
            Ok(value) if value.is_object() || value.is_array() => Ok(value),
            _ => Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}
