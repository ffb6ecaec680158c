//! Builder pattern for RuleEngine

use crate::config::EngineConfig;
use crate::engine::RuleEngine;
use crate::error::Result;
use crate::subject::{AccessSubject, SubjectConditions};
use permit_parser::{ConditionParser, LeafFactory, ParserLimits, XmlLeafFactory};

/// Builder for RuleEngine
///
/// # Example
///
/// ```rust,ignore
/// use permit_sdk::{EngineConfig, RuleEngineBuilder};
///
/// let engine = RuleEngineBuilder::<Principal>::new()
///     .with_config(EngineConfig::from_file("permit.yaml")?)
///     .with_subject_conditions()
///     .add_leaf_factory(TenantConditions::default())
///     .build()?;
///
/// let allowed = engine.check("group = admins or user = alice", &principal);
/// ```
pub struct RuleEngineBuilder<T> {
    config: EngineConfig,
    parser: ConditionParser<T>,
}

impl<T> RuleEngineBuilder<T> {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            parser: ConditionParser::new(),
        }
    }

    /// Replace the whole engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set parser limits
    pub fn with_limits(mut self, limits: ParserLimits) -> Self {
        self.config.limits = limits;
        self
    }

    /// Register a text leaf factory after the existing ones
    pub fn add_leaf_factory<F>(mut self, factory: F) -> Self
    where
        F: LeafFactory<T> + 'static,
    {
        self.parser = self.parser.with_leaf_factory(factory);
        self
    }

    /// Register an XML leaf factory after the existing ones
    pub fn add_xml_leaf_factory<F>(mut self, factory: F) -> Self
    where
        F: XmlLeafFactory<T> + 'static,
    {
        self.parser = self.parser.with_xml_leaf_factory(factory);
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<RuleEngine<T>> {
        self.config.validate()?;

        tracing::debug!(
            max_depth = self.config.limits.max_depth,
            max_input_len = self.config.limits.max_input_len,
            cache_enabled = self.config.cache.enabled,
            "Building rule engine"
        );

        let parser = self.parser.with_limits(self.config.limits);
        Ok(RuleEngine::new(parser, self.config.cache))
    }
}

impl<T: AccessSubject + 'static> RuleEngineBuilder<T> {
    /// Register the `user`, `group`, `ip` and `date` conditions on both surfaces
    pub fn with_subject_conditions(self) -> Self {
        self.add_leaf_factory(SubjectConditions)
            .add_xml_leaf_factory(SubjectConditions)
    }
}

impl<T> Default for RuleEngineBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
