//! Condition Tree Module
//!
//! A compiled access rule is a tree of conditions evaluated against a caller
//! supplied context value. The tree is produced once by the parser and never
//! mutated afterwards, so it can be cached and evaluated from many threads.
//!
//! # Shapes
//!
//! - `True` / `False` - boolean literals
//! - `Not` - negation of exactly one child
//! - `And` - all children must hold (an empty list holds)
//! - `Or` - at least one child must hold (an empty list does not hold)
//! - `Leaf` - a domain predicate supplied by a leaf factory
//!
//! # Rendering
//!
//! `Display` produces a debugging form such as `(true) AND (not (false))`.
//! It is not guaranteed to parse back into the same tree.
//!
//! `Condition::to_xml` mirrors the tree as nested elements:
//! ```xml
//! <boolean operator="and">
//!   <boolean operator="true"/>
//!   <boolean operator="not"><boolean operator="false"/></boolean>
//! </boolean>
//! ```

mod leaf;
mod tree;

pub use leaf::LeafCondition;
pub use tree::{Condition, BOOLEAN_ELEMENT, OPERATOR_ATTRIBUTE};
