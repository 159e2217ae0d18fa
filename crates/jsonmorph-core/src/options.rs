//! Transform options
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};

/// Options controlling output assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Merge source keys that no `$from` consumed into the output
    #[serde(alias = "mergeUnmapped")]
    pub merge_unmapped: bool,
    /// Keep null-valued keys in the output
    #[serde(alias = "keepNulls")]
    pub keep_nulls: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            merge_unmapped: false,
            keep_nulls: true,
        }
    }
}

impl TransformOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether unconsumed source keys are merged into the output
    pub fn with_merge_unmapped(mut self, merge_unmapped: bool) -> Self {
        self.merge_unmapped = merge_unmapped;
        self
    }

    /// Set whether null-valued keys are kept
    pub fn with_keep_nulls(mut self, keep_nulls: bool) -> Self {
        self.keep_nulls = keep_nulls;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = TransformOptions::default();
        assert!(!options.merge_unmapped);
        assert!(options.keep_nulls);
    }

    #[test]
    fn test_deserialize_camel_case_aliases() {
        let options: TransformOptions =
            serde_json::from_value(json!({"mergeUnmapped": true, "keepNulls": false})).unwrap();
        assert_eq!(
            options,
            TransformOptions::new()
                .with_merge_unmapped(true)
                .with_keep_nulls(false)
        );
    }

    #[test]
    fn test_deserialize_partial() {
        let options: TransformOptions =
            serde_json::from_value(json!({"merge_unmapped": true})).unwrap();
        assert!(options.merge_unmapped);
        assert!(options.keep_nulls);
    }
}
