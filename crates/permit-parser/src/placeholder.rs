//! Bracket extraction into numbered placeholders
//!
//! Parenthesized groups are peeled out of a rule one innermost group at a time
//! and replaced by a marker `@<N>@`, where `N` indexes the arena entry holding
//! the captured text (brackets included). Operator splitting then only ever
//! sees top-level text, and operands are expanded back lazily.

use crate::error::{ParseError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Innermost parenthesized group: no nested brackets inside
#[allow(clippy::expect_used)]
static BRACKET_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^()]*\)").expect("static regex should not panic"));

#[allow(clippy::expect_used)]
static MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@<(\d+)>@").expect("static regex should not panic"));

/// Parse-local, append-only store of captured groups
#[derive(Debug)]
pub(crate) struct PlaceholderArena {
    clauses: Vec<String>,
    max_len: usize,
    stored: usize,
    max_stored: usize,
}

impl PlaceholderArena {
    /// `max_len` bounds a single expansion, `max_stored` the captured text
    /// held across the whole parse.
    pub(crate) fn new(max_len: usize, max_stored: usize) -> Self {
        Self {
            clauses: Vec::new(),
            max_len,
            stored: 0,
            max_stored,
        }
    }

    pub(crate) fn marker(index: usize) -> String {
        format!("@<{}>@", index)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.clauses.len()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, index: usize) -> Option<&str> {
        self.clauses.get(index).map(String::as_str)
    }

    /// Replace every bracket group with a marker.
    ///
    /// Each pass captures all innermost groups left to right, so the number
    /// of passes is the nesting depth. Fails if a lone `(` or `)` remains.
    pub(crate) fn extract(&mut self, rule: &str) -> Result<String> {
        let mut current = rule.trim().to_string();

        loop {
            current = strip_wrapping_brackets(&current).to_string();
            if !BRACKET_GROUP.is_match(&current) {
                break;
            }

            let mut rebuilt = String::with_capacity(current.len());
            let mut last = 0;
            for group in BRACKET_GROUP.find_iter(&current) {
                let clause = self.expand(group.as_str())?;
                let marker = self.store(clause)?;
                rebuilt.push_str(&current[last..group.start()]);
                rebuilt.push_str(&marker);
                last = group.end();
            }
            rebuilt.push_str(&current[last..]);
            current = rebuilt;
        }

        if current.contains('(') != current.contains(')') {
            return Err(ParseError::syntax("missing bracket", current));
        }

        Ok(current)
    }

    fn store(&mut self, clause: String) -> Result<String> {
        self.stored += clause.len();
        if self.stored > self.max_stored {
            return Err(ParseError::LimitExceeded(format!(
                "bracket groups hold more than {} bytes",
                self.max_stored
            )));
        }

        let marker = Self::marker(self.clauses.len());
        log::trace!("captured {} as {}", clause, marker);
        self.clauses.push(clause);
        Ok(marker)
    }

    /// Substitute markers until none remain.
    ///
    /// Captured text may itself contain markers, so this repeats.
    pub(crate) fn expand(&self, fragment: &str) -> Result<String> {
        let mut expanded = fragment.to_string();

        while MARKER.is_match(&expanded) {
            let mut rebuilt = String::with_capacity(expanded.len());
            let mut last = 0;
            for captures in MARKER.captures_iter(&expanded) {
                let Some(whole) = captures.get(0) else {
                    continue;
                };
                let clause = captures[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.clauses.get(index))
                    .ok_or_else(|| ParseError::syntax("unknown placeholder", whole.as_str()))?;
                rebuilt.push_str(&expanded[last..whole.start()]);
                rebuilt.push_str(clause);
                last = whole.end();

                if rebuilt.len() > self.max_len {
                    return Err(ParseError::LimitExceeded(format!(
                        "expanded rule is longer than {} bytes",
                        self.max_len
                    )));
                }
            }
            rebuilt.push_str(&expanded[last..]);
            expanded = rebuilt;
        }

        if expanded.len() > self.max_len {
            return Err(ParseError::LimitExceeded(format!(
                "expanded rule is longer than {} bytes",
                self.max_len
            )));
        }

        Ok(expanded)
    }
}

/// Deepest bracket nesting in `rule`; stray `)` never go below zero
pub(crate) fn bracket_nesting(rule: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0;
    for c in rule.chars() {
        match c {
            '(' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// First marker-shaped run in user text
pub(crate) fn find_marker(rule: &str) -> Option<&str> {
    MARKER.find(rule).map(|m| m.as_str())
}

/// Strip outer brackets while the whole string is a single group without
/// inner brackets: `( ( a ) )` is left alone, `( a )` becomes `a`.
fn strip_wrapping_brackets(rule: &str) -> &str {
    let mut current = rule.trim();
    while current.len() >= 2 && current.starts_with('(') && current.ends_with(')') {
        let inner = &current[1..current.len() - 1];
        if inner.contains('(') || inner.contains(')') {
            break;
        }
        current = inner.trim();
    }
    current
}
