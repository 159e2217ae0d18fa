//! Validate command handler
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use super::ensure_exists;
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use tracing::{info, instrument};

/// Handle the validate command
#[instrument(skip_all, fields(file = %args.data.display(), schema = %args.schema.display()))]
pub async fn handle_validate(
    args: ValidateArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("validate_command", &args.data.display().to_string());

    ensure_exists(&args.data)?;
    ensure_exists(&args.schema)?;
    output.info(&format!(
        "Validating {} against {}",
        args.data.display(),
        args.schema.display()
    ))?;

    let validation = config.validation_config(args.no_formats, args.max_errors);
    let report = jsonmorph_schemas::validate_with(
        args.data.as_path(),
        args.schema.as_path(),
        &validation,
    )?;

    output.validation_report(&report, args.detailed)?;
    info!(valid = report.is_valid(), errors = report.errors().len(), "Validation complete");

    if report.is_valid() {
        Ok(())
    } else {
        Err(Error::ValidationFailed {
            count: report.errors().len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::output::testing::writer;
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
        path
    }

    fn args(data: PathBuf, schema: PathBuf) -> ValidateArgs {
        ValidateArgs {
            data,
            schema,
            no_formats: false,
            max_errors: None,
            detailed: false,
        }
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "email": {"type": "string", "format": "email"},
                "age": {"type": "integer", "minimum": 0}
            },
            "required": ["email"]
        })
    }

    #[tokio::test]
    async fn test_valid_document() {
        let dir = TempDir::new().unwrap();
        let schema = write_json(&dir, "schema.json", &schema());
        let data = write_json(&dir, "data.json", &json!({"email": "a@b.io", "age": 3}));

        let (mut output, buffer) = writer(OutputFormat::Human);
        handle_validate(args(data, schema), &Config::default(), &mut output)
            .await
            .unwrap();
        assert!(buffer.contents().contains("✓ Document is valid"));
    }

    #[tokio::test]
    async fn test_invalid_document_fails_with_count() {
        let dir = TempDir::new().unwrap();
        let schema = write_json(&dir, "schema.json", &schema());
        let data = write_json(&dir, "data.json", &json!({"age": -1}));

        let (mut output, buffer) = writer(OutputFormat::Json);
        let err = handle_validate(args(data, schema), &Config::default(), &mut output)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ValidationFailed { count: 2 }));
        assert_eq!(err.exit_code(), 5);

        let printed: Value = serde_json::from_str(&buffer.contents()).unwrap();
        assert_eq!(printed["valid"], false);
        assert_eq!(printed["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_flags_relax_validation() {
        let dir = TempDir::new().unwrap();
        let schema = write_json(&dir, "schema.json", &schema());
        let data = write_json(&dir, "data.json", &json!({"email": "nope"}));

        let (mut output, _) = writer(OutputFormat::Json);
        let strict = handle_validate(
            args(data.clone(), schema.clone()),
            &Config::default(),
            &mut output,
        )
        .await;
        assert!(matches!(strict, Err(Error::ValidationFailed { count: 1 })));

        let mut lenient = args(data, schema);
        lenient.no_formats = true;
        let (mut output, _) = writer(OutputFormat::Json);
        handle_validate(lenient, &Config::default(), &mut output)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_max_errors_limits_report() {
        let dir = TempDir::new().unwrap();
        let schema = write_json(&dir, "schema.json", &schema());
        let data = write_json(&dir, "data.json", &json!({"age": -1}));

        let mut limited = args(data, schema);
        limited.max_errors = Some(1);

        let (mut output, _) = writer(OutputFormat::Json);
        let err = handle_validate(limited, &Config::default(), &mut output)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ValidationFailed { count: 1 }));
    }

    #[tokio::test]
    async fn test_invalid_schema_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let schema = write_json(&dir, "schema.json", &json!({"type": "nonsense"}));
        let data = write_json(&dir, "data.json", &json!({}));

        let (mut output, _) = writer(OutputFormat::Json);
        let err = handle_validate(args(data, schema), &Config::default(), &mut output)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[tokio::test]
    async fn test_missing_data_file() {
        let dir = TempDir::new().unwrap();
        let schema = write_json(&dir, "schema.json", &schema());

        let (mut output, _) = writer(OutputFormat::Json);
        let err = handle_validate(
            args(dir.path().join("missing.json"), schema),
            &Config::default(),
            &mut output,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
