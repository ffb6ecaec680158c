//! Leaf factories
//!
//! Factories turn atomic tokens (text surface) or atomic elements (XML
//! surface) into domain conditions. The parser offers each token to its
//! factories in registration order and keeps the first match.
//!
//! A factory answers one of three ways:
//! - `Ok(None)` - not mine, try the next factory
//! - `Ok(Some(condition))` - recognized
//! - `Err(..)` - recognized but malformed; the parse fails

use crate::error::Result;
use permit_core::{Condition, XmlElement};
use std::fmt;

/// Creates leaf conditions from atomic rule tokens such as `group = admins`
pub trait LeafFactory<T>: Send + Sync {
    /// Try to build a condition from a trimmed token
    fn parse_leaf(&self, token: &str) -> Result<Option<Condition<T>>>;
}

/// Creates leaf conditions from XML elements such as
/// `<condition field="group" operator="=" value="admins"/>`
pub trait XmlLeafFactory<T>: Send + Sync {
    /// Try to build a condition from an element
    fn parse_xml_leaf(&self, element: &XmlElement) -> Result<Option<Condition<T>>>;
}

/// Text leaf factory backed by a closure
///
/// # Example
///
/// ```rust
/// use permit_core::Condition;
/// use permit_parser::{ConditionParser, FnLeafFactory, Result};
///
/// let always = FnLeafFactory::new(|token: &str| -> Result<Option<Condition<bool>>> {
///     Ok((token == "always").then_some(Condition::True))
/// });
/// let parser = ConditionParser::<bool>::new().with_leaf_factory(always);
/// assert!(parser.parse("always and not false").unwrap().evaluate(&false));
/// ```
pub struct FnLeafFactory<F> {
    func: F,
}

impl<F> FnLeafFactory<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<T, F> LeafFactory<T> for FnLeafFactory<F>
where
    F: Fn(&str) -> Result<Option<Condition<T>>> + Send + Sync,
{
    fn parse_leaf(&self, token: &str) -> Result<Option<Condition<T>>> {
        (self.func)(token)
    }
}

impl<F> fmt::Debug for FnLeafFactory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnLeafFactory")
    }
}

/// XML leaf factory backed by a closure
pub struct FnXmlLeafFactory<F> {
    func: F,
}

impl<F> FnXmlLeafFactory<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<T, F> XmlLeafFactory<T> for FnXmlLeafFactory<F>
where
    F: Fn(&XmlElement) -> Result<Option<Condition<T>>> + Send + Sync,
{
    fn parse_xml_leaf(&self, element: &XmlElement) -> Result<Option<Condition<T>>> {
        (self.func)(element)
    }
}

impl<F> fmt::Debug for FnXmlLeafFactory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnXmlLeafFactory")
    }
}
