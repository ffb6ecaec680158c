//! Condition parser entry points

use crate::config::ParserLimits;
use crate::error::{ParseError, Result};
use crate::leaf::{LeafFactory, XmlLeafFactory};
use crate::placeholder::{self, PlaceholderArena};
use permit_core::{Condition, XmlElement};
use std::fmt;
use std::sync::Arc;

/// Compiles rule text and XML into condition trees.
///
/// The parser keeps no state between calls: every `parse` builds its own
/// placeholder arena, so one parser can be shared across threads.
///
/// # Example
///
/// ```rust
/// use permit_parser::ConditionParser;
///
/// let parser = ConditionParser::<()>::new();
/// let rule = parser.parse("true and not false or false").unwrap();
/// assert!(rule.evaluate(&()));
/// ```
pub struct ConditionParser<T> {
    leaf_factories: Vec<Arc<dyn LeafFactory<T>>>,
    xml_leaf_factories: Vec<Arc<dyn XmlLeafFactory<T>>>,
    limits: ParserLimits,
}

impl<T> ConditionParser<T> {
    /// Create a parser that only knows the `true`/`false` literals
    pub fn new() -> Self {
        Self {
            leaf_factories: Vec::new(),
            xml_leaf_factories: Vec::new(),
            limits: ParserLimits::default(),
        }
    }

    /// Set parser limits
    pub fn with_limits(mut self, limits: ParserLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Register a text leaf factory after the existing ones
    pub fn with_leaf_factory<F>(mut self, factory: F) -> Self
    where
        F: LeafFactory<T> + 'static,
    {
        self.leaf_factories.push(Arc::new(factory));
        self
    }

    /// Register an XML leaf factory after the existing ones
    pub fn with_xml_leaf_factory<F>(mut self, factory: F) -> Self
    where
        F: XmlLeafFactory<T> + 'static,
    {
        self.xml_leaf_factories.push(Arc::new(factory));
        self
    }

    pub fn limits(&self) -> &ParserLimits {
        &self.limits
    }

    /// Parse rule text.
    ///
    /// Empty text and `()` yield `Condition::True`. Bracket nesting deeper
    /// than `max_depth` is rejected before any group is extracted.
    pub fn parse(&self, rule: &str) -> Result<Condition<T>> {
        if rule.len() > self.limits.max_input_len {
            return Err(ParseError::LimitExceeded(format!(
                "rule is {} bytes, limit is {}",
                rule.len(),
                self.limits.max_input_len
            )));
        }
        let nesting = placeholder::bracket_nesting(rule);
        if nesting > self.limits.max_depth {
            return Err(ParseError::LimitExceeded(format!(
                "brackets nest {} deep, limit is {}",
                nesting, self.limits.max_depth
            )));
        }
        if let Some(marker) = placeholder::find_marker(rule) {
            return Err(ParseError::syntax("reserved placeholder syntax in rule text", marker));
        }

        let normalized = rule.replace(['\t', '\n', '\r'], " ");
        let mut arena = PlaceholderArena::new(
            self.limits.max_input_len,
            self.limits
                .max_input_len
                .saturating_mul(self.limits.max_depth.max(1)),
        );
        let condition = self.parse_expr(&normalized, &mut arena, 0)?;

        log::debug!(
            "parsed rule into tree of depth {} with {} leaves",
            condition.depth(),
            condition.leaf_count()
        );
        Ok(condition)
    }

    /// Parse an XML rule element; an absent element yields `Condition::True`
    pub fn parse_xml(&self, element: Option<&XmlElement>) -> Result<Condition<T>> {
        match element {
            Some(element) => self.parse_element(element, 0),
            None => Ok(Condition::True),
        }
    }

    /// Read XML text and parse its root element
    pub fn parse_xml_str(&self, xml: &str) -> Result<Condition<T>> {
        if xml.len() > self.limits.max_input_len {
            return Err(ParseError::LimitExceeded(format!(
                "XML rule is {} bytes, limit is {}",
                xml.len(),
                self.limits.max_input_len
            )));
        }
        let root = XmlElement::parse(xml)?;
        self.parse_xml(Some(&root))
    }

    pub(crate) fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.limits.max_depth {
            return Err(ParseError::LimitExceeded(format!(
                "rule nesting exceeds depth {}",
                self.limits.max_depth
            )));
        }
        Ok(())
    }

    /// Map an atomic token to a literal or a factory-built leaf
    pub(crate) fn resolve_leaf(&self, token: &str) -> Result<Condition<T>> {
        if token.eq_ignore_ascii_case("true") {
            return Ok(Condition::True);
        }
        if token.eq_ignore_ascii_case("false") {
            return Ok(Condition::False);
        }

        for factory in &self.leaf_factories {
            if let Some(condition) = factory.parse_leaf(token)? {
                return Ok(condition);
            }
        }

        Err(ParseError::unrecognized(token))
    }

    pub(crate) fn resolve_xml_leaf(&self, element: &XmlElement) -> Result<Condition<T>> {
        for factory in &self.xml_leaf_factories {
            if let Some(condition) = factory.parse_xml_leaf(element)? {
                return Ok(condition);
            }
        }

        Err(ParseError::unrecognized(element.to_string()))
    }
}

impl<T> Default for ConditionParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ConditionParser<T> {
    fn clone(&self) -> Self {
        Self {
            leaf_factories: self.leaf_factories.clone(),
            xml_leaf_factories: self.xml_leaf_factories.clone(),
            limits: self.limits,
        }
    }
}

impl<T> fmt::Debug for ConditionParser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionParser")
            .field("leaf_factories", &self.leaf_factories.len())
            .field("xml_leaf_factories", &self.xml_leaf_factories.len())
            .field("limits", &self.limits)
            .finish()
    }
}
