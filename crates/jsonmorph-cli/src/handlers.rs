//! Command handlers for CLI subcommands
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

mod completions;
mod config;
mod transform;
mod validate;

pub use completions::handle_completions;
pub use config::handle_config;
pub use transform::handle_transform;
pub use validate::handle_validate;

use crate::error::{Error, Result};
use std::path::Path;

/// Fail early with a readable error when an input file is missing
fn ensure_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}
