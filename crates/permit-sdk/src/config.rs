//! Configuration types for RuleEngine

use crate::error::{Result, SdkError};
use permit_parser::ParserLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main engine configuration
///
/// ```yaml
/// limits:
///   max_depth: 32
///   max_input_len: 8192
/// cache:
///   enabled: true
///   max_entries: 512
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Parser limits applied to every compiled rule
    pub limits: ParserLimits,

    /// Compiled rule cache
    pub cache: CacheConfig,
}

impl EngineConfig {
    /// Create a new engine configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set parser limits
    pub fn with_limits(mut self, limits: ParserLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set cache configuration
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Load configuration from a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a `.yaml`, `.yml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(SdkError::ConfigError(format!(
                "unsupported config file type: {}",
                path.display()
            ))),
        }
    }

    /// Reject limits no rule could satisfy
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_depth == 0 {
            return Err(SdkError::ConfigError(
                "limits.max_depth must be greater than 0".to_string(),
            ));
        }
        if self.limits.max_input_len == 0 {
            return Err(SdkError::ConfigError(
                "limits.max_input_len must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Compiled rule cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Keep compiled rules keyed by their source
    pub enabled: bool,

    /// Upper bound on cached rules; rules beyond it are compiled on every call
    pub max_entries: usize,
}

impl CacheConfig {
    /// Cache that never stores anything
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set the maximum number of cached rules
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.limits, ParserLimits::default());
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_entries, 1024);
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = EngineConfig::from_yaml_str(
            r#"
limits:
  max_depth: 16
cache:
  max_entries: 10
"#,
        )
        .unwrap();

        assert_eq!(config.limits.max_depth, 16);
        assert_eq!(config.limits.max_input_len, 65536);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_entries, 10);
    }

    #[test]
    fn test_from_json() {
        let config =
            EngineConfig::from_json_str(r#"{"cache": {"enabled": false}}"#).unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.limits, ParserLimits::default());
    }

    #[test]
    fn test_empty_json_object_is_default() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let err = EngineConfig::from_yaml_str("limits:\n  max_depth: 0\n").unwrap_err();
        assert!(matches!(err, SdkError::ConfigError(msg) if msg.contains("max_depth")));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = EngineConfig::from_yaml_str("limits: [1, 2").unwrap_err();
        assert!(matches!(err, SdkError::YamlError(_)));
    }

    #[test]
    fn test_invalid_json() {
        let err = EngineConfig::from_json_str(r#"{"cache": {"enabled": "yes"}}"#).unwrap_err();
        assert!(matches!(err, SdkError::JsonError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/permit.yaml").unwrap_err();
        assert!(matches!(err, SdkError::IoError(_)));
    }

    #[test]
    fn test_builder_methods() {
        let config = EngineConfig::new()
            .with_limits(ParserLimits::new(8, 256))
            .with_cache(CacheConfig::disabled().with_max_entries(3));

        assert_eq!(config.limits.max_depth, 8);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.max_entries, 3);
    }
}
