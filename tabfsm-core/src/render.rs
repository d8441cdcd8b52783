//! Debug rendering of compiled dispatch logic.
//!
//! Two forms are available: a text listing that reads like the `if / else`
//! chain dispatch walks, and a serializable [`TableDescription`].

use crate::compiler::{CompileOptions, CompiledTable, Rule};
use crate::matcher::{Matcher, MatcherKind};
use serde::Serialize;
use std::fmt::{self, Write};

/// Structured view of a compiled table.
#[derive(Debug, Clone, Serialize)]
pub struct TableDescription {
    pub initial: String,
    pub checksum: String,
    pub options: CompileOptions,
    pub states: Vec<StateDescription>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateDescription {
    pub state: String,
    pub terminal: bool,
    pub rules: Vec<RuleDescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_final: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleDescription {
    pub kind: MatcherKind,
    pub matcher: String,
    pub target: String,
    pub notifications: Vec<String>,
}

impl CompiledTable {
    /// Returns a serializable description of the compiled rules.
    pub fn describe(&self) -> TableDescription {
        TableDescription {
            initial: self.initial_state().to_string(),
            checksum: self.checksum().to_string(),
            options: self.options().clone(),
            states: self
                .states()
                .iter()
                .map(|s| StateDescription {
                    state: s.name().to_string(),
                    terminal: s.is_terminal(),
                    rules: s.rules().iter().map(describe_rule).collect(),
                    in_final: s.in_final().map(|n| n.name.clone()),
                })
                .collect(),
        }
    }

    /// Renders the dispatch logic as a text listing.
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.write_listing(&mut out);
        out
    }

    fn write_listing(&self, out: &mut String) -> fmt::Result {
        writeln!(
            out,
            "# {} states, initial {:?}, checksum {}",
            self.states().len(),
            self.initial_state(),
            self.checksum()
        )?;

        for state in self.states() {
            writeln!(out, "state {:?}:", state.name())?;

            if state.is_terminal() {
                match state.in_final() {
                    Some(n) => writeln!(out, "  terminal: emit {}({:?})", n.name, state.name())?,
                    None => writeln!(out, "  terminal: ignore input")?,
                }
                continue;
            }

            for (i, rule) in state.rules().iter().enumerate() {
                let keyword = if i == 0 { "if" } else { "else if" };
                match rule.matcher() {
                    Matcher::Literal(lit) => writeln!(
                        out,
                        "  {} input == {:?} -> {:?}",
                        keyword,
                        lit,
                        rule.target()
                    )?,
                    Matcher::Pattern { source, .. } => writeln!(
                        out,
                        "  {} {} matches input -> {:?}",
                        keyword,
                        source,
                        rule.target()
                    )?,
                    Matcher::Wildcard(_) => {
                        let keyword = if i == 0 { "always" } else { "else" };
                        writeln!(out, "  {} -> {:?}", keyword, rule.target())?
                    }
                }
                writeln!(out, "      emit {}", notification_names(rule).join(", "))?;
            }

            if !state.rules().iter().any(|r| r.matcher().is_wildcard()) {
                writeln!(out, "  else: ignore input")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for CompiledTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn describe_rule(rule: &Rule) -> RuleDescription {
    RuleDescription {
        kind: rule.matcher().kind(),
        matcher: rule.matcher().as_str().to_string(),
        target: rule.target().to_string(),
        notifications: notification_names(rule),
    }
}

fn notification_names(rule: &Rule) -> Vec<String> {
    rule.notifications().iter().map(|n| n.name.clone()).collect()
}
