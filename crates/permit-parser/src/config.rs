//! Parser limits

use serde::{Deserialize, Serialize};

/// Bounds applied to every parse call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserLimits {
    /// Maximum recursion depth across text and XML parsing
    pub max_depth: usize,

    /// Maximum length in bytes of the rule text, also applied to expanded fragments
    pub max_input_len: usize,
}

impl ParserLimits {
    /// Create limits
    pub fn new(max_depth: usize, max_input_len: usize) -> Self {
        Self {
            max_depth,
            max_input_len,
        }
    }

    /// Set the maximum recursion depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum input length
    pub fn with_max_input_len(mut self, max_input_len: usize) -> Self {
        self.max_input_len = max_input_len;
        self
    }
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_input_len: 64 * 1024,
        }
    }
}
