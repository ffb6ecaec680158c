//! PERMIT SDK
//!
//! High-level API for compiling access rules once and checking them against
//! the requesting principal.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod subject;

// Re-export main types
pub use builder::RuleEngineBuilder;
pub use config::{CacheConfig, EngineConfig};
pub use engine::RuleEngine;
pub use error::{Result, SdkError};
pub use subject::{AccessSubject, SubjectConditions};

// Re-export commonly used types from dependencies
pub use permit_core::{Condition, LeafCondition, XmlElement};
pub use permit_parser::{LeafFactory, ParseError, ParserLimits, XmlLeafFactory};
