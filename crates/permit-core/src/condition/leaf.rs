//! Leaf condition extension point

use crate::xml::XmlElement;
use std::fmt;

/// A domain-specific predicate stored in [`Condition::Leaf`](super::Condition::Leaf).
///
/// Leaves are produced by leaf factories at parse time and must be immutable:
/// evaluation takes `&self` and may run concurrently from several threads.
///
/// # Example
///
/// ```rust
/// use permit_core::{LeafCondition, XmlElement};
/// use std::fmt;
///
/// #[derive(Debug)]
/// struct MinimumLevel(u32);
///
/// impl fmt::Display for MinimumLevel {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "level >= {}", self.0)
///     }
/// }
///
/// impl LeafCondition<u32> for MinimumLevel {
///     fn evaluate(&self, level: &u32) -> bool {
///         *level >= self.0
///     }
///
///     fn to_xml(&self) -> XmlElement {
///         XmlElement::new("level").with_attribute("min", self.0.to_string())
///     }
/// }
/// ```
pub trait LeafCondition<T>: fmt::Debug + fmt::Display + Send + Sync {
    /// Evaluate the predicate against a context value
    fn evaluate(&self, context: &T) -> bool;

    /// Render the predicate as an XML element
    fn to_xml(&self) -> XmlElement;
}
