//! Parser error types

use permit_core::CoreError;
use thiserror::Error;

/// Parser error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Malformed rule (brackets, dangling operands, missing XML attributes)
    #[error("Syntax error: {message}{}", at_fragment(.fragment))]
    Syntax {
        message: String,
        fragment: Option<String>,
    },

    /// No leaf factory recognized the token or element
    #[error("Unrecognized condition: {token}")]
    UnrecognizedLeaf { token: String },

    /// Input exceeded a configured parser limit
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    /// XML text could not be read
    #[error("XML error: {0}")]
    Xml(#[from] CoreError),
}

fn at_fragment(fragment: &Option<String>) -> String {
    match fragment {
        Some(fragment) => format!(" at \"{}\"", fragment),
        None => String::new(),
    }
}

impl ParseError {
    /// Syntax error referencing the offending fragment
    pub fn syntax(message: impl Into<String>, fragment: impl Into<String>) -> Self {
        ParseError::Syntax {
            message: message.into(),
            fragment: Some(fragment.into()),
        }
    }

    pub fn unrecognized(token: impl Into<String>) -> Self {
        ParseError::UnrecognizedLeaf {
            token: token.into(),
        }
    }

    /// Returns true for syntax errors
    pub fn is_syntax(&self) -> bool {
        matches!(self, ParseError::Syntax { .. })
    }
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
