//! PERMIT Parser - rule text and XML to condition tree
//!
//! This crate compiles access rules into [`Condition`](permit_core::Condition)
//! trees. Two surfaces produce the same shapes:
//!
//! - Text: `group = admins or (user = alice and not ip 10.0.0.0/8)`
//! - XML: `<boolean operator="or">...</boolean>`
//!
//! # Grammar
//!
//! ```text
//! expr    := orExpr
//! orExpr  := andExpr ( OR andExpr )*
//! andExpr := notExpr ( AND notExpr )*
//! notExpr := "not" WS expr | atom
//! atom    := "(" expr ")" | LITERAL
//! ```
//!
//! Keywords are case-insensitive. `OR` and `AND` are only recognized when
//! preceded by `)` or whitespace and followed by `(` or whitespace. A keyword
//! left without an operand on either side (`a or`, `a or or b`) is a syntax
//! error. Empty input and `()` compile to the permit-by-default rule `true`.
//!
//! Everything that is not `true`/`false` is offered to the registered
//! [`LeafFactory`] implementations in registration order.

pub mod config;
pub mod error;
pub mod leaf;
pub mod parser;
mod placeholder;
mod text;
mod xml;

// Re-export main parser types
pub use config::ParserLimits;
pub use error::{ParseError, Result};
pub use leaf::{FnLeafFactory, FnXmlLeafFactory, LeafFactory, XmlLeafFactory};
pub use parser::ConditionParser;
