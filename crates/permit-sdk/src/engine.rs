//! Rule engine with a compiled rule cache

use crate::builder::RuleEngineBuilder;
use crate::config::CacheConfig;
use crate::error::Result;
use permit_core::{Condition, XmlElement};
use permit_parser::ConditionParser;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Text(String),
    Xml(String),
}

/// Compiles access rules once and checks them against subjects.
///
/// Compiled trees are shared as `Arc<Condition<T>>`; the cache lock is only
/// held while looking up or storing a tree, never while evaluating one.
///
/// # Example
///
/// ```rust
/// use permit_sdk::RuleEngine;
///
/// let engine = RuleEngine::<()>::builder().build().unwrap();
/// assert!(engine.check("true and not false", &()));
/// assert!(!engine.check("(true", &()));
/// ```
pub struct RuleEngine<T> {
    parser: ConditionParser<T>,
    cache_config: CacheConfig,
    cache: RwLock<HashMap<CacheKey, Arc<Condition<T>>>>,
}

impl<T> RuleEngine<T> {
    /// Start building an engine
    pub fn builder() -> RuleEngineBuilder<T> {
        RuleEngineBuilder::new()
    }

    pub(crate) fn new(parser: ConditionParser<T>, cache_config: CacheConfig) -> Self {
        Self {
            parser,
            cache_config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Compile rule text, reusing a cached tree for the same text
    pub fn compile(&self, rule: &str) -> Result<Arc<Condition<T>>> {
        let key = CacheKey::Text(rule.to_string());
        if let Some(condition) = self.lookup(&key) {
            return Ok(condition);
        }

        let condition = Arc::new(self.parser.parse(rule)?);
        tracing::debug!(
            rule = %rule,
            depth = condition.depth(),
            leaves = condition.leaf_count(),
            "Compiled rule"
        );
        Ok(self.store(key, condition))
    }

    /// Compile an XML rule, cached by its serialized form
    pub fn compile_xml(&self, element: &XmlElement) -> Result<Arc<Condition<T>>> {
        let key = CacheKey::Xml(element.to_string());
        if let Some(condition) = self.lookup(&key) {
            return Ok(condition);
        }

        let condition = Arc::new(self.parser.parse_xml(Some(element))?);
        tracing::debug!(root = element.name(), "Compiled XML rule");
        Ok(self.store(key, condition))
    }

    /// Compile every rule up front, stopping at the first failure
    ///
    /// Returns the number of rules compiled.
    pub fn preload<I, S>(&self, rules: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut count = 0;
        for rule in rules {
            self.compile(rule.as_ref())?;
            count += 1;
        }
        tracing::info!(count, cached = self.cached_rules(), "Preloaded rules");
        Ok(count)
    }

    /// Check a rule against a subject; rules that fail to compile deny access
    pub fn check(&self, rule: &str, subject: &T) -> bool {
        match self.try_check(rule, subject) {
            Ok(granted) => granted,
            Err(e) => {
                tracing::warn!(rule = %rule, error = %e, "Denying access: rule failed to compile");
                false
            }
        }
    }

    /// Check a rule against a subject, surfacing compilation errors
    pub fn try_check(&self, rule: &str, subject: &T) -> Result<bool> {
        let condition = self.compile(rule)?;
        Ok(condition.evaluate(subject))
    }

    /// Check an XML rule against a subject; rules that fail to compile deny access
    pub fn check_xml(&self, element: &XmlElement, subject: &T) -> bool {
        match self.compile_xml(element) {
            Ok(condition) => condition.evaluate(subject),
            Err(e) => {
                tracing::warn!(root = element.name(), error = %e, "Denying access: XML rule failed to compile");
                false
            }
        }
    }

    /// Number of compiled rules currently cached
    pub fn cached_rules(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drop every cached rule
    pub fn clear_cache(&self) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let dropped = cache.len();
        cache.clear();
        tracing::debug!(dropped, "Cleared rule cache");
    }

    pub fn parser(&self) -> &ConditionParser<T> {
        &self.parser
    }

    pub fn cache_config(&self) -> &CacheConfig {
        &self.cache_config
    }

    fn lookup(&self, key: &CacheKey) -> Option<Arc<Condition<T>>> {
        if !self.cache_config.enabled {
            return None;
        }
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Cache a freshly compiled tree. If another caller stored the same rule
    /// first, that tree is returned instead.
    fn store(&self, key: CacheKey, condition: Arc<Condition<T>>) -> Arc<Condition<T>> {
        if !self.cache_config.enabled {
            return condition;
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = cache.get(&key) {
            return Arc::clone(existing);
        }
        if cache.len() >= self.cache_config.max_entries {
            tracing::debug!(
                max_entries = self.cache_config.max_entries,
                "Rule cache full, not caching"
            );
            return condition;
        }

        cache.insert(key, Arc::clone(&condition));
        condition
    }
}

impl<T> fmt::Debug for RuleEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEngine")
            .field("parser", &self.parser)
            .field("cache_config", &self.cache_config)
            .field("cached_rules", &self.cached_rules())
            .finish()
    }
}
