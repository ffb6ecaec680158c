//! Operator-precedence parsing of rule text
//!
//! OR is split first, then AND, then a leading `not `. Splitting OR first makes
//! it the root whenever both operators appear at the top level, so AND binds
//! tighter. `not` only applies once a segment has no top-level AND/OR left:
//! `not a and b` is `(not a) and b`.

use crate::error::{ParseError, Result};
use crate::parser::ConditionParser;
use crate::placeholder::PlaceholderArena;
use once_cell::sync::Lazy;
use permit_core::Condition;
use regex::Regex;

// Preceded by `)` or whitespace, followed by `(` or whitespace.
#[allow(clippy::expect_used)]
static OR_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[)\s]+or[\s(]+").expect("static regex should not panic"));

#[allow(clippy::expect_used)]
static AND_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[)\s]+and[\s(]+").expect("static regex should not panic"));

// A keyword at either end of a segment that no boundary consumed.
#[allow(clippy::expect_used)]
static DANGLING_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(or|and)\b|\b(or|and)$").expect("static regex should not panic")
});

const NOT_PREFIX: &str = "not ";

#[derive(Debug, Clone, Copy)]
enum Junction {
    Or,
    And,
}

impl Junction {
    /// Junction whose keyword dangles at either end of `segment`
    fn dangling(segment: &str) -> Option<Self> {
        let captures = DANGLING_KEYWORD.captures(segment.trim())?;
        let keyword = captures.get(1).or_else(|| captures.get(2))?;
        if keyword.as_str().eq_ignore_ascii_case("or") {
            Some(Junction::Or)
        } else {
            Some(Junction::And)
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Junction::Or => "OR",
            Junction::And => "AND",
        }
    }

    fn boundary(self) -> &'static Regex {
        match self {
            Junction::Or => &OR_BOUNDARY,
            Junction::And => &AND_BOUNDARY,
        }
    }

    fn build<T>(self, operands: Vec<Condition<T>>) -> Condition<T> {
        match self {
            Junction::Or => Condition::or(operands),
            Junction::And => Condition::and(operands),
        }
    }

    fn missing_operand(self, rule: &str) -> ParseError {
        ParseError::syntax(format!("subclause of {} missing", self.keyword()), rule)
    }
}

impl<T> ConditionParser<T> {
    pub(crate) fn parse_expr(
        &self,
        rule: &str,
        arena: &mut PlaceholderArena,
        depth: usize,
    ) -> Result<Condition<T>> {
        self.check_depth(depth)?;

        let trimmed = rule.trim();
        if trimmed.is_empty() || trimmed == "()" {
            return Ok(Condition::True);
        }

        let rule = arena.extract(trimmed)?;
        if rule.is_empty() {
            return Ok(Condition::True);
        }

        for junction in [Junction::Or, Junction::And] {
            if let Some(operands) = self.split_junction(junction, &rule, arena, depth)? {
                return Ok(junction.build(operands));
            }
        }
        if let Some(junction) = Junction::dangling(&rule) {
            return Err(junction.missing_operand(&arena.expand(&rule)?));
        }

        if let Some(operand) = strip_not_prefix(&rule) {
            let operand = arena.expand(operand)?;
            return Ok(Condition::not(self.parse_expr(&operand, arena, depth + 1)?));
        }
        if rule.eq_ignore_ascii_case(NOT_PREFIX.trim_end()) {
            return Err(ParseError::syntax("operand of NOT missing", rule));
        }

        let expanded = arena.expand(&rule)?;
        if expanded.contains('(') && expanded.contains(')') {
            // Re-parsing an unchanged string would recurse forever.
            if expanded == rule || expanded.trim() == trimmed {
                return Err(ParseError::syntax("unbalanced or unseparated brackets", expanded));
            }
            return self.parse_expr(&expanded, arena, depth + 1);
        }

        self.resolve_leaf(expanded.trim())
    }

    /// Split `rule` at every top-level boundary of `junction`.
    ///
    /// Returns `None` when the junction does not occur.
    fn split_junction(
        &self,
        junction: Junction,
        rule: &str,
        arena: &mut PlaceholderArena,
        depth: usize,
    ) -> Result<Option<Vec<Condition<T>>>> {
        let mut operands = Vec::new();
        let mut last = 0;

        for boundary in junction.boundary().find_iter(rule) {
            if boundary.start() <= last {
                return Err(junction.missing_operand(rule));
            }
            let segment = &rule[last..boundary.start()];
            operands.push(self.parse_operand(junction, segment, rule, arena, depth)?);
            last = boundary.end();
        }

        if last == 0 {
            return Ok(None);
        }

        let tail = &rule[last..];
        operands.push(self.parse_operand(junction, tail, rule, arena, depth)?);

        log::trace!("split {:?} into {} {} operands", rule, operands.len(), junction.keyword());
        Ok(Some(operands))
    }

    fn parse_operand(
        &self,
        junction: Junction,
        segment: &str,
        rule: &str,
        arena: &mut PlaceholderArena,
        depth: usize,
    ) -> Result<Condition<T>> {
        if segment.trim().is_empty() {
            return Err(junction.missing_operand(rule));
        }
        let segment = arena.expand(segment)?;
        self.parse_expr(&segment, arena, depth + 1)
    }
}

/// Remainder after a case-insensitive `not ` prefix
fn strip_not_prefix(rule: &str) -> Option<&str> {
    let prefix = rule.get(..NOT_PREFIX.len())?;
    prefix
        .eq_ignore_ascii_case(NOT_PREFIX)
        .then(|| &rule[NOT_PREFIX.len()..])
}
