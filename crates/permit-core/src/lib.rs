//! PERMIT Core - Core types for the PERMIT access rule language
//!
//! This crate provides the fundamental types shared by the parser and the SDK:
//! - The immutable condition tree and its evaluation
//! - The leaf condition extension point
//! - An owned XML element model with reader and writer
//! - Error types

pub mod condition;
pub mod error;
pub mod xml;

// Re-export commonly used types
pub use condition::{Condition, LeafCondition};
pub use error::CoreError;
pub use xml::XmlElement;
