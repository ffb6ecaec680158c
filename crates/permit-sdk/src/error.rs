//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Rule could not be compiled
    #[error("Parser error: {0}")]
    ParseError(#[from] permit_parser::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML configuration could not be read
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON configuration could not be read
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
