//! Transform command handler
//!
//! The mapper is compiled once and shared; each data file is loaded and
//! transformed on its own blocking worker.
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use super::ensure_exists;
use crate::cli::TransformArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use indicatif::ProgressBar;
use jsonmorph_core::{
    DocumentLoader, Format, MapperDocument, TransformOptions, TransformOutput, Transformer,
};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Handle the transform command
#[instrument(skip_all, fields(mapper = %args.mapper.display(), inputs = args.data.len()))]
pub async fn handle_transform(
    args: TransformArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let timer = Timer::with_details("transform_command", &format!("inputs: {}", args.data.len()));

    let inputs = unique_inputs(args.data);
    if args.save_to.is_some() && inputs.len() != 1 {
        return Err(Error::invalid_args("--save-to requires exactly one data file"));
    }

    ensure_exists(&args.mapper)?;
    for path in &inputs {
        ensure_exists(path)?;
    }

    let transformer = Arc::new(Transformer::new(MapperDocument::from_source(
        args.mapper.as_path(),
    )?));
    let options = config.transform_options(args.merge_unmapped, args.drop_nulls);
    debug!(?options, keys = transformer.mapper().tree().len(), "Compiled mapper");

    let progress = if inputs.len() > 1 {
        output.progress_bar(inputs.len() as u64, "Transforming")
    } else {
        None
    };
    let results = transform_all(transformer, &inputs, options, progress).await?;

    if results.iter().any(|(_, result)| !result.warnings.is_empty()) {
        output.section("Warnings")?;
    }
    for (path, result) in &results {
        for warning in &result.warnings {
            output.warning(&format!("{}: {}", path.display(), warning))?;
        }
    }

    let payload = build_payload(results, args.report)?;
    match &args.save_to {
        Some(target) => {
            save_document(&payload, target)?;
            output.success(&format!("✓ Output saved to {}", target.display()))?;
        }
        None => output.data(&payload)?,
    }

    info!(
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "Transform command finished"
    );
    Ok(())
}

/// Drop repeated data paths, keeping the first occurrence
fn unique_inputs(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|path| {
            let first = seen.insert(path.clone());
            if !first {
                debug!(path = %path.display(), "Skipping repeated data file");
            }
            first
        })
        .collect()
}

/// Transform every input concurrently, preserving input order in the result
async fn transform_all(
    transformer: Arc<Transformer>,
    inputs: &[PathBuf],
    options: TransformOptions,
    progress: Option<ProgressBar>,
) -> Result<Vec<(PathBuf, TransformOutput)>> {
    let tasks: Vec<_> = inputs
        .iter()
        .cloned()
        .map(|path| {
            let transformer = Arc::clone(&transformer);
            tokio::task::spawn_blocking(move || {
                let result = transform_file(&transformer, &path, &options);
                (path, result)
            })
        })
        .collect();

    let mut finished = Vec::with_capacity(tasks.len());
    for task in tasks {
        let joined = task.await;
        if let Some(pb) = &progress {
            pb.inc(1);
        }
        finished.push(joined);
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    finished
        .into_iter()
        .map(|joined| {
            let (path, result) = joined?;
            Ok((path, result?))
        })
        .collect()
}

/// Load one data file and transform it
fn transform_file(
    transformer: &Transformer,
    path: &Path,
    options: &TransformOptions,
) -> Result<TransformOutput> {
    let source = DocumentLoader::load(path)?;
    let output = transformer.transform_with_report(&source, options)?;
    debug!(
        path = %path.display(),
        consumed = output.consumed.len(),
        warnings = output.warnings.len(),
        "Transformed file"
    );
    Ok(output)
}

/// One input yields its document directly; several are keyed by path
fn build_payload(results: Vec<(PathBuf, TransformOutput)>, report: bool) -> Result<Value> {
    let mut entries = results
        .into_iter()
        .map(|(path, result)| {
            let value = if report {
                serde_json::to_value(&result)?
            } else {
                result.document
            };
            Ok((path.display().to_string(), value))
        })
        .collect::<Result<Vec<(String, Value)>>>()?;

    if entries.len() == 1 {
        if let Some((_, value)) = entries.pop() {
            return Ok(value);
        }
    }

    Ok(Value::Object(entries.into_iter().collect()))
}

/// Write a payload as YAML for `.yaml`/`.yml` targets, pretty JSON otherwise
fn save_document(payload: &Value, target: &Path) -> Result<()> {
    let content = match Format::from_path(target) {
        Some(Format::Yaml) => serde_yaml::to_string(payload)?,
        _ => format!("{}\n", serde_json::to_string_pretty(payload)?),
    };
    std::fs::write(target, content)?;
    Ok(())
}
