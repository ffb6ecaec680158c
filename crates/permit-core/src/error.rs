//! Error types for PERMIT Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    #[error("Unexpected XML content: {0}")]
    UnexpectedXml(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
