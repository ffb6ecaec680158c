//! Common test utilities for parser integration tests

#![allow(dead_code)]

use permit_core::{Condition, LeafCondition, XmlElement};
use permit_parser::{ConditionParser, LeafFactory, ParseError, Result, XmlLeafFactory};
use std::fmt;

/// Test context: the roles held by the acting user
#[derive(Debug, Clone, Default)]
pub struct Roles(pub Vec<String>);

impl Roles {
    pub fn of(roles: &[&str]) -> Self {
        Roles(roles.iter().map(|r| r.to_string()).collect())
    }
}

/// Leaf `role = <name>`
#[derive(Debug)]
pub struct HasRole(pub String);

impl fmt::Display for HasRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "role = {}", self.0)
    }
}

impl LeafCondition<Roles> for HasRole {
    fn evaluate(&self, context: &Roles) -> bool {
        context.0.iter().any(|r| r == &self.0)
    }

    fn to_xml(&self) -> XmlElement {
        XmlElement::new("role").with_attribute("name", self.0.clone())
    }
}

/// Recognizes `role = <name>` tokens and `<role name="..."/>` elements
#[derive(Debug, Default)]
pub struct RoleFactory;

impl LeafFactory<Roles> for RoleFactory {
    fn parse_leaf(&self, token: &str) -> Result<Option<Condition<Roles>>> {
        let Some(rest) = token.strip_prefix("role") else {
            return Ok(None);
        };
        let Some(name) = rest.trim_start().strip_prefix('=') else {
            return Err(ParseError::syntax("expected '=' after role", token));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(ParseError::syntax("role name missing", token));
        }
        Ok(Some(Condition::leaf(HasRole(name.to_string()))))
    }
}

impl XmlLeafFactory<Roles> for RoleFactory {
    fn parse_xml_leaf(&self, element: &XmlElement) -> Result<Option<Condition<Roles>>> {
        if element.name() != "role" {
            return Ok(None);
        }
        let name = element
            .attribute("name")
            .ok_or_else(|| ParseError::syntax("missing name attribute", element.to_string()))?;
        Ok(Some(Condition::leaf(HasRole(name.to_string()))))
    }
}

/// Parser with the role factory registered on both surfaces
pub fn role_parser() -> ConditionParser<Roles> {
    ConditionParser::new()
        .with_leaf_factory(RoleFactory)
        .with_xml_leaf_factory(RoleFactory)
}

/// Parser without any leaf factory
pub fn literal_parser() -> ConditionParser<()> {
    ConditionParser::new()
}

/// Parse a literal-only rule and evaluate it
pub fn eval(rule: &str) -> bool {
    literal_parser()
        .parse(rule)
        .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", rule, e))
        .evaluate(&())
}
