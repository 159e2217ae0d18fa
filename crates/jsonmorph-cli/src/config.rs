//! Configuration management for the CLI
//!
//! Configuration is read from, in order of preference:
//! - the file given with `--config` (or `JSONMORPH_CONFIG`)
//! - `.jsonmorph.{toml,yaml,yml,json}` in the current directory
//! - `config.{toml,yaml,yml,json}` under the user config directory
//!
//! The first file found wins; missing sections take their defaults.
//! Command-line flags override whatever the file says.
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::logging::LogFormat;
use jsonmorph_core::TransformOptions;
use jsonmorph_schemas::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name under the platform config directory
const APP_DIR: &str = "jsonmorph";

/// Project-local config file stem
const PROJECT_FILE_STEM: &str = ".jsonmorph";

/// Extensions tried for every config location, in order
const EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default transform options
    pub transform: TransformOptions,

    /// Schema validation settings
    pub validation: ValidationConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingSettings,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format used when `--output` is not given
    pub format: OutputFormat,

    /// Use colored output when the terminal supports it
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level filter, e.g. `debug` or `jsonmorph_core=trace`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Log format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<LogFormat>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: true,
            progress: true,
        }
    }
}

/// Config file syntax, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Syntax {
    Toml,
    Yaml,
    Json,
}

impl Syntax {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Ok(Syntax::Toml),
            Some("yaml") | Some("yml") => Ok(Syntax::Yaml),
            Some("json") => Ok(Syntax::Json),
            _ => Err(Error::config(format!(
                "Unsupported config file extension: {}",
                path.display()
            ))),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let syntax = Syntax::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read {}: {}", path.display(), e)))?;

        let config = match syntax {
            Syntax::Toml => toml::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid TOML in {}: {}", path.display(), e)))?,
            Syntax::Yaml => serde_yaml::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid YAML in {}: {}", path.display(), e)))?,
            Syntax::Json => serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid JSON in {}: {}", path.display(), e)))?,
        };

        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        match Self::default_config_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Default configuration file paths to check
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = EXTENSIONS
            .iter()
            .map(|ext| PathBuf::from(format!("{}.{}", PROJECT_FILE_STEM, ext)))
            .collect();

        if let Some(dir) = dirs::config_dir() {
            let app_dir = dir.join(APP_DIR);
            paths.extend(EXTENSIONS.iter().map(|ext| app_dir.join(format!("config.{}", ext))));
        }

        paths
    }

    /// Path of the project config written by `config init`
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(format!("{}.toml", PROJECT_FILE_STEM))
    }

    /// Path of the user config written by `config init --user`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Transform options with command-line flags applied on top
    pub fn transform_options(&self, merge_unmapped: bool, drop_nulls: bool) -> TransformOptions {
        self.transform
            .with_merge_unmapped(self.transform.merge_unmapped || merge_unmapped)
            .with_keep_nulls(self.transform.keep_nulls && !drop_nulls)
    }

    /// Validation settings with command-line flags applied on top
    pub fn validation_config(&self, no_formats: bool, max_errors: Option<usize>) -> ValidationConfig {
        self.validation
            .clone()
            .with_validate_formats(self.validation.validate_formats && !no_formats)
            .with_max_errors(max_errors.unwrap_or(self.validation.max_errors))
    }

    /// Serialize as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))
    }

    /// Save configuration to a file, format chosen by extension
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match Syntax::from_path(path)? {
            Syntax::Toml => self.to_toml()?,
            Syntax::Yaml => serde_yaml::to_string(self)?,
            Syntax::Json => serde_json::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}
