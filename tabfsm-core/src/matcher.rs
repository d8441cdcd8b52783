//! Rule matchers.
//!
//! A matcher key is classified as follows:
//!
//! - `/body/flags` (flags drawn from `g`, `i`, `m`) - a regular expression,
//!   matched anywhere in the input
//! - the wildcard token (`_` by default) - matches any input
//! - anything else - a literal, compared byte for byte with the input
//!
//! Flag `i` makes the pattern case-insensitive and `m` enables multi-line
//! mode. `g` is accepted for compatibility and has no effect since matching
//! keeps no state between inputs.
//!
//! Pattern bodies use the `regex` crate syntax, not JavaScript's. Lookaround
//! (`(?=..)`, `(?<!..)`) and backreferences (`\1`) are not supported and are
//! rejected at compile time as [`CoreError::InvalidPattern`]. Matching runs in
//! time linear in the input.

use crate::error::CoreError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

const PATTERN_FLAGS: &str = "gim";

/// Kind of a compiled matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    Literal,
    Pattern,
    Wildcard,
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatcherKind::Literal => f.write_str("literal"),
            MatcherKind::Pattern => f.write_str("pattern"),
            MatcherKind::Wildcard => f.write_str("wildcard"),
        }
    }
}

/// A compiled rule condition.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Exact string equality.
    Literal(String),
    /// Regular expression written as `/body/flags`.
    Pattern { source: String, regex: Regex },
    /// Catch-all, always evaluated last within its state.
    Wildcard(String),
}

impl Matcher {
    /// Classifies and compiles a matcher key.
    pub fn parse(key: &str, wildcard: &str) -> Result<Self, CoreError> {
        if let Some((body, flags)) = split_pattern(key) {
            let regex = RegexBuilder::new(body)
                .case_insensitive(flags.contains('i'))
                .multi_line(flags.contains('m'))
                .build()
                .map_err(|source| CoreError::InvalidPattern {
                    matcher: key.to_string(),
                    source,
                })?;
            return Ok(Matcher::Pattern {
                source: key.to_string(),
                regex,
            });
        }

        if key == wildcard {
            return Ok(Matcher::Wildcard(key.to_string()));
        }

        Ok(Matcher::Literal(key.to_string()))
    }

    /// Returns true if the input satisfies this matcher.
    pub fn matches(&self, input: &str) -> bool {
        match self {
            Matcher::Literal(expected) => expected == input,
            Matcher::Pattern { regex, .. } => regex.is_match(input),
            Matcher::Wildcard(_) => true,
        }
    }

    pub fn kind(&self) -> MatcherKind {
        match self {
            Matcher::Literal(_) => MatcherKind::Literal,
            Matcher::Pattern { .. } => MatcherKind::Pattern,
            Matcher::Wildcard(_) => MatcherKind::Wildcard,
        }
    }

    /// Returns the matcher key as authored in the table.
    pub fn as_str(&self) -> &str {
        match self {
            Matcher::Literal(s) => s,
            Matcher::Pattern { source, .. } => source,
            Matcher::Wildcard(s) => s,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Matcher::Wildcard(_))
    }
}

/// Splits `/body/flags` into body and flags, or returns None when the key
/// does not follow the pattern delimiter convention.
fn split_pattern(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix('/')?;
    let close = rest.rfind('/')?;
    let (body, flags) = (&rest[..close], &rest[close + 1..]);

    if flags.chars().all(|c| PATTERN_FLAGS.contains(c)) {
        Some((body, flags))
    } else {
        None
    }
}
