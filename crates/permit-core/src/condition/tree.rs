//! Condition tree nodes

use super::leaf::LeafCondition;
use crate::xml::XmlElement;
use std::fmt;
use std::sync::Arc;

/// Element name used for structural nodes in the XML form
pub const BOOLEAN_ELEMENT: &str = "boolean";

/// Attribute carrying the operator of a structural node in the XML form
pub const OPERATOR_ATTRIBUTE: &str = "operator";

/// Compiled access rule node, evaluated against a context of type `T`
pub enum Condition<T> {
    /// Always holds
    True,

    /// Never holds
    False,

    /// Holds iff the child does not
    Not(Box<Condition<T>>),

    /// Holds iff every child holds
    And(Vec<Condition<T>>),

    /// Holds iff at least one child holds
    Or(Vec<Condition<T>>),

    /// Domain predicate produced by a leaf factory
    Leaf(Arc<dyn LeafCondition<T>>),
}

impl<T> Condition<T> {
    /// Create a negation
    #[allow(clippy::should_implement_trait)]
    pub fn not(child: Condition<T>) -> Self {
        Condition::Not(Box::new(child))
    }

    /// Create a conjunction
    pub fn and(children: Vec<Condition<T>>) -> Self {
        Condition::And(children)
    }

    /// Create a disjunction
    pub fn or(children: Vec<Condition<T>>) -> Self {
        Condition::Or(children)
    }

    /// Wrap a domain predicate
    pub fn leaf<L>(leaf: L) -> Self
    where
        L: LeafCondition<T> + 'static,
    {
        Condition::Leaf(Arc::new(leaf))
    }

    /// Evaluate the tree against a context value
    pub fn evaluate(&self, context: &T) -> bool {
        match self {
            Condition::True => true,
            Condition::False => false,
            Condition::Not(child) => !child.evaluate(context),
            Condition::And(children) => children.iter().all(|c| c.evaluate(context)),
            Condition::Or(children) => children.iter().any(|c| c.evaluate(context)),
            Condition::Leaf(leaf) => leaf.evaluate(context),
        }
    }

    /// Operator keyword used by the XML form, `None` for leaves
    pub fn operator(&self) -> Option<&'static str> {
        match self {
            Condition::True => Some("true"),
            Condition::False => Some("false"),
            Condition::Not(_) => Some("not"),
            Condition::And(_) => Some("and"),
            Condition::Or(_) => Some("or"),
            Condition::Leaf(_) => None,
        }
    }

    /// Number of leaves in the tree, literals excluded
    pub fn leaf_count(&self) -> usize {
        match self {
            Condition::True | Condition::False => 0,
            Condition::Not(child) => child.leaf_count(),
            Condition::And(children) | Condition::Or(children) => {
                children.iter().map(Condition::leaf_count).sum()
            }
            Condition::Leaf(_) => 1,
        }
    }

    /// Height of the tree; a single node has depth 1
    pub fn depth(&self) -> usize {
        match self {
            Condition::True | Condition::False | Condition::Leaf(_) => 1,
            Condition::Not(child) => 1 + child.depth(),
            Condition::And(children) | Condition::Or(children) => {
                1 + children.iter().map(Condition::depth).max().unwrap_or(0)
            }
        }
    }

    /// Render the tree as nested `<boolean operator="...">` elements
    pub fn to_xml(&self) -> XmlElement {
        match self {
            Condition::Leaf(leaf) => leaf.to_xml(),
            Condition::Not(child) => boolean("not").with_child(child.to_xml()),
            Condition::And(children) | Condition::Or(children) => {
                let operator = self.operator().unwrap_or_default();
                children
                    .iter()
                    .fold(boolean(operator), |element, child| element.with_child(child.to_xml()))
            }
            Condition::True => boolean("true"),
            Condition::False => boolean("false"),
        }
    }
}

fn boolean(operator: &str) -> XmlElement {
    XmlElement::new(BOOLEAN_ELEMENT).with_attribute(OPERATOR_ATTRIBUTE, operator)
}

fn write_joined<T>(
    f: &mut fmt::Formatter<'_>,
    children: &[Condition<T>],
    separator: &str,
) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "({})", child)?;
    }
    Ok(())
}

impl<T> fmt::Display for Condition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::True => f.write_str("true"),
            Condition::False => f.write_str("false"),
            Condition::Not(child) => write!(f, "not ({})", child),
            Condition::And(children) => write_joined(f, children, " AND "),
            Condition::Or(children) => write_joined(f, children, " OR "),
            Condition::Leaf(leaf) => write!(f, "{}", leaf),
        }
    }
}

impl<T> fmt::Debug for Condition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::True => f.write_str("True"),
            Condition::False => f.write_str("False"),
            Condition::Not(child) => f.debug_tuple("Not").field(child).finish(),
            Condition::And(children) => f.debug_tuple("And").field(children).finish(),
            Condition::Or(children) => f.debug_tuple("Or").field(children).finish(),
            Condition::Leaf(leaf) => f.debug_tuple("Leaf").field(leaf).finish(),
        }
    }
}

// Manual impl: leaves are shared through `Arc`, so `T: Clone` is not required.
impl<T> Clone for Condition<T> {
    fn clone(&self) -> Self {
        match self {
            Condition::True => Condition::True,
            Condition::False => Condition::False,
            Condition::Not(child) => Condition::Not(child.clone()),
            Condition::And(children) => Condition::And(children.clone()),
            Condition::Or(children) => Condition::Or(children.clone()),
            Condition::Leaf(leaf) => Condition::Leaf(Arc::clone(leaf)),
        }
    }
}

impl<T> From<bool> for Condition<T> {
    fn from(value: bool) -> Self {
        if value {
            Condition::True
        } else {
            Condition::False
        }
    }
}
