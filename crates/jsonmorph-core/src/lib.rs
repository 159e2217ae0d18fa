//! Jsonmorph Core - declarative JSON-to-JSON transformation
//!
//! This crate compiles a mapper document (`{"$map": {...}}`) into a typed
//! tree and evaluates it against source documents. The output mirrors the
//! mapper's shape; each leaf pulls, tests, renames or post-processes one
//! value from the source.
//!
//! # Main Components
//!
//! - **Mapper model**: typed container/directive tree built once per mapper
//! - **Path resolution**: `key` and root-relative `a::b::c` lookups
//! - **Expression language**: restricted interpreter for `$condition` and `$apply`
//! - **Transform engine**: directive evaluation, tree walking, output assembly
//! - **Loading**: JSON and YAML documents from disk
//!
//! # Example
//!
//! ```
//! use jsonmorph_core::{transform, TransformOptions};
//! use serde_json::json;
//!
//! let mapper = json!({"$map": {
//!     "kind": {
//!         "$if": {"$from": "age", "$typeof": "number"},
//!         "$then": {"$value": "numeric"},
//!         "$else": {"$value": "invalid"}
//!     }
//! }});
//!
//! let output = transform(json!({"age": 5}), mapper, &TransformOptions::default())?;
//! assert_eq!(output, json!({"kind": "numeric"}));
//! # Ok::<(), jsonmorph_core::Error>(())
//! ```

pub mod error;
pub mod expression;
pub mod loader;
pub mod mapper;
pub mod options;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use loader::{DocumentLoader, DocumentSource, Format};
pub use mapper::{
    transform, MapperDocument, MapperNode, MapperTree, TransformOutput, TransformWarning,
    Transformer, WarningKind,
};
pub use options::TransformOptions;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
