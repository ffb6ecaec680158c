//! XML surface
//!
//! ```xml
//! <boolean operator="or">
//!   <condition field="group" operator="=" value="admins"/>
//!   <boolean operator="not">
//!     <boolean operator="false"/>
//!   </boolean>
//! </boolean>
//! ```
//!
//! `<boolean>` elements carry one of `and`, `or`, `not`, `true`, `false`.
//! Any other operator value, and any other element, is handed to the XML
//! leaf factories.

use crate::error::{ParseError, Result};
use crate::parser::ConditionParser;
use permit_core::condition::{BOOLEAN_ELEMENT, OPERATOR_ATTRIBUTE};
use permit_core::{Condition, XmlElement};

impl<T> ConditionParser<T> {
    pub(crate) fn parse_element(&self, element: &XmlElement, depth: usize) -> Result<Condition<T>> {
        self.check_depth(depth)?;

        if element.name() != BOOLEAN_ELEMENT {
            return self.resolve_xml_leaf(element);
        }

        let operator = element.attribute(OPERATOR_ATTRIBUTE).ok_or_else(|| {
            ParseError::syntax("missing operator attribute", element.to_string())
        })?;

        match operator.trim().to_ascii_lowercase().as_str() {
            "not" => {
                let child = element.first_child().ok_or_else(|| {
                    ParseError::syntax("operand of NOT missing", element.to_string())
                })?;
                Ok(Condition::not(self.parse_element(child, depth + 1)?))
            }
            "and" => Ok(Condition::and(self.parse_children(element, depth)?)),
            "or" => Ok(Condition::or(self.parse_children(element, depth)?)),
            "true" => Ok(Condition::True),
            "false" => Ok(Condition::False),
            _ => self.resolve_xml_leaf(element),
        }
    }

    fn parse_children(&self, element: &XmlElement, depth: usize) -> Result<Vec<Condition<T>>> {
        element
            .children()
            .iter()
            .map(|child| self.parse_element(child, depth + 1))
            .collect()
    }
}
