//! Jsonmorph Schemas - JSON Schema validation for documents
//!
//! Validates data documents (inline or on disk) against JSON Schemas. The
//! schema draft is detected automatically and all violations are collected
//! into a [`ValidationReport`].
//!
//! ## Quick Start
//!
//! ```rust
//! use jsonmorph_schemas::validate;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {"age": {"type": "number"}}
//! });
//!
//! let report = validate(json!({"age": "x"}), schema).unwrap();
//! assert!(!report.is_valid());
//! assert_eq!(report.errors()[0].instance_path, "/age");
//! ```
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod validation;

pub use error::{SchemaError, SchemaResult};
pub use validation::{
    errors_text, validate, validate_with, SchemaValidator, Validation, ValidationConfig,
    ValidationError, ValidationReport,
};
