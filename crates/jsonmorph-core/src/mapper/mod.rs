//! Mapping engine
//!
//! A [`Transformer`] holds a compiled mapper document and can be shared
//! across threads; every call builds its own [`TransformContext`], walks the
//! mapper tree, and hands the result to the [`OutputAssembler`].
//!
//! ```
//! use jsonmorph_core::{Transformer, TransformOptions};
//! use serde_json::json;
//!
//! let transformer = Transformer::from_value(&json!({
//!     "$map": {"status": {"$from": "state", "$default": "unknown"}}
//! }))?;
//! let output = transformer.transform(&json!({}), &TransformOptions::default())?;
//! assert_eq!(output, json!({"status": "unknown"}));
//! # Ok::<(), jsonmorph_core::Error>(())
//! ```
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

pub mod assembler;
pub mod context;
pub mod directive;
pub mod node;
pub mod path;
pub mod walker;

pub use assembler::{prune_nulls, OutputAssembler};
pub use context::{TransformContext, TransformWarning, WarningKind};
pub use directive::DirectiveEvaluator;
pub use node::{
    ApplyExpression, Branch, Condition, ConditionKind, ConditionTest, Directive, MapperDocument,
    MapperNode, MapperTree, Rename,
};
pub use path::{PathResolver, NAMESPACE_DELIMITER};
pub use walker::TreeWalker;

use crate::loader::DocumentSource;
use crate::options::TransformOptions;
use crate::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Result of a transform with diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformOutput {
    /// The output document
    pub document: Value,
    /// Top-level source keys read by `$from`
    pub consumed: BTreeSet<String>,
    /// Non-fatal problems, such as failed `$apply` expressions
    pub warnings: Vec<TransformWarning>,
}

/// A compiled, reusable transformer
#[derive(Debug, Clone)]
pub struct Transformer {
    document: MapperDocument,
}

impl Transformer {
    /// Create a transformer from a compiled mapper
    pub fn new(document: MapperDocument) -> Self {
        Self { document }
    }

    /// Compile a mapper document from JSON
    pub fn from_value(mapper: &Value) -> Result<Self> {
        Ok(Self::new(MapperDocument::from_value(mapper)?))
    }

    /// Get the compiled mapper
    pub fn mapper(&self) -> &MapperDocument {
        &self.document
    }

    /// Transform a source document
    pub fn transform(&self, source: &Value, options: &TransformOptions) -> Result<Value> {
        Ok(self.transform_with_report(source, options)?.document)
    }

    /// Transform a source document, returning consumption and warnings as well
    #[instrument(skip_all, fields(keys = self.document.tree().len()))]
    pub fn transform_with_report(
        &self,
        source: &Value,
        options: &TransformOptions,
    ) -> Result<TransformOutput> {
        let empty = Value::Object(Map::new());
        let source = if source.is_object() {
            source
        } else {
            debug!("Source document is not an object; treating it as empty");
            &empty
        };

        let mut context = TransformContext::new(source, *options);
        let output = TreeWalker::new(&mut context).walk(self.document.tree())?;
        let (consumed, warnings) = context.into_parts();

        let document = OutputAssembler::new(*options).assemble(output, source, &consumed);

        debug!(
            consumed = consumed.len(),
            warnings = warnings.len(),
            "Transform complete"
        );

        Ok(TransformOutput {
            document,
            consumed,
            warnings,
        })
    }
}

/// Transform a document with a mapper, loading either from disk if given a path
pub fn transform(
    data: impl Into<DocumentSource>,
    mapper: impl Into<DocumentSource>,
    options: &TransformOptions,
) -> Result<Value> {
    let data = data.into().load()?;
    let transformer = Transformer::new(MapperDocument::from_source(mapper)?);
    transformer.transform(&data, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_transformer_is_send_sync() {
        assert_send_sync::<Transformer>();
    }

    #[test]
    fn test_transform_with_report() {
        let transformer = Transformer::from_value(&json!({"$map": {
            "name": {"$from": "user::name"},
            "total": {"$from": "n", "$apply": "value / 0"}
        }}))
        .unwrap();

        let report = transformer
            .transform_with_report(&json!({"user": {"name": "Al"}, "n": 3}), &TransformOptions::default())
            .unwrap();

        assert_eq!(report.document, json!({"name": "Al", "total": 3}));
        assert_eq!(
            report.consumed.into_iter().collect::<Vec<_>>(),
            vec!["n".to_string(), "user".to_string()]
        );
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].key, "total");
        assert_eq!(report.warnings[0].kind, WarningKind::ApplyFailed);
    }

    #[test]
    fn test_non_object_source_has_no_keys() {
        let transformer = Transformer::from_value(&json!({"$map": {
            "first": {"$from": "0", "$default": "none"}
        }}))
        .unwrap();

        let options = TransformOptions::new().with_merge_unmapped(true);
        let output = transformer.transform(&json!(["a", "b"]), &options).unwrap();
        assert_eq!(output, json!({"first": "none"}));
    }

    #[test]
    fn test_transform_inline_values() {
        let output = transform(
            json!({"state": "on"}),
            json!({"$map": {"status": {"$from": "state"}}}),
            &TransformOptions::default(),
        )
        .unwrap();
        assert_eq!(output, json!({"status": "on"}));
    }

    #[test]
    fn test_transform_reports_missing_map() {
        let err = transform(json!({}), json!({}), &TransformOptions::default()).unwrap_err();
        assert!(err.is_definition_error());
    }
}
