//! XML element model
//!
//! Rules can be stored as XML. This module provides an owned element tree,
//! a reader built on `quick-xml` and a compact writer (`Display`).

mod element;
mod reader;

pub use element::XmlElement;
