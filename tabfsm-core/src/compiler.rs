//! Table compilation.
//!
//! Compiling turns a [`TransitionTable`] into an immutable [`CompiledTable`]:
//! every matcher key is classified and compiled once, wildcard rules are
//! moved to the end of their state, and the notification sequence of every
//! rule is derived up front so dispatch only has to walk the rule list.

use crate::error::CoreError;
use crate::machine::Machine;
use crate::matcher::Matcher;
use crate::naming::{self, Capitalization, Notification};
use crate::table::TransitionTable;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Options fixed at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Reserved catch-all matcher token.
    pub wildcard: String,
    /// Label policy used in notification names.
    pub capitalization: Capitalization,
    /// Emit `final` / `inFinal` around states without rules.
    pub terminal_signals: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            wildcard: "_".to_string(),
            capitalization: Capitalization::FirstLetter,
            terminal_signals: false,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wildcard(mut self, wildcard: impl Into<String>) -> Self {
        self.wildcard = wildcard.into();
        self
    }

    pub fn with_capitalization(mut self, capitalization: Capitalization) -> Self {
        self.capitalization = capitalization;
        self
    }

    pub fn with_terminal_signals(mut self, enabled: bool) -> Self {
        self.terminal_signals = enabled;
        self
    }
}

/// A compiled `matcher -> target` rule.
#[derive(Debug, Clone)]
pub struct Rule {
    matcher: Matcher,
    target: String,
    notifications: Vec<Notification>,
}

impl Rule {
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Notifications emitted when this rule fires.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }
}

/// Compiled rules of one source state.
#[derive(Debug, Clone)]
pub struct CompiledState {
    name: String,
    rules: Vec<Rule>,
    in_final: Option<Notification>,
}

impl CompiledState {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_terminal(&self) -> bool {
        self.rules.is_empty()
    }

    /// The `inFinal` notification, present only for terminal states when
    /// terminal signals are enabled.
    pub fn in_final(&self) -> Option<&Notification> {
        self.in_final.as_ref()
    }
}

/// Immutable compiled transition table, shared by every [`Machine`] built
/// from it.
#[derive(Debug)]
pub struct CompiledTable {
    states: Vec<CompiledState>,
    index: HashMap<String, usize>,
    options: CompileOptions,
    source: TransitionTable,
    checksum: String,
}

impl CompiledTable {
    /// Compiles a table.
    pub fn compile(
        table: &TransitionTable,
        options: CompileOptions,
    ) -> Result<Arc<Self>, CoreError> {
        if table.is_empty() {
            return Err(CoreError::invalid_table(
                "table must declare at least one state",
            ));
        }
        if options.wildcard.is_empty() {
            return Err(CoreError::invalid_table("wildcard token must not be empty"));
        }

        let mut states = Vec::with_capacity(table.len());
        let mut index = HashMap::with_capacity(table.len());
        let mut rule_count = 0;

        for entry in table.states() {
            let mut rules = Vec::with_capacity(entry.rules.len());
            let mut wildcard = None;

            for raw in &entry.rules {
                let matcher = Matcher::parse(&raw.on, &options.wildcard)?;
                let final_signal = options.terminal_signals && is_terminal_target(table, &raw.to);
                let rule = Rule {
                    notifications: naming::transition_notifications(
                        &entry.state,
                        &raw.to,
                        options.capitalization,
                        final_signal,
                    ),
                    matcher,
                    target: raw.to.clone(),
                };

                if rule.matcher.is_wildcard() {
                    wildcard = Some(rule);
                } else {
                    rules.push(rule);
                }
            }
            rules.extend(wildcard);
            rule_count += rules.len();

            let in_final = (options.terminal_signals && rules.is_empty())
                .then(|| naming::in_final(&entry.state));

            index.insert(entry.state.clone(), states.len());
            states.push(CompiledState {
                name: entry.state.clone(),
                rules,
                in_final,
            });
        }

        let json_bytes = serde_json::to_vec(&table.to_json())?;
        let checksum = format!("{:08x}", crc32c::crc32c(&json_bytes));

        tracing::debug!(
            "Compiled transition table: {} states, {} rules (checksum {})",
            states.len(),
            rule_count,
            checksum
        );

        Ok(Arc::new(Self {
            states,
            index,
            options,
            source: table.clone(),
            checksum,
        }))
    }

    /// Parses, validates and compiles a table from JSON.
    pub fn from_json(
        json: &serde_json::Value,
        options: CompileOptions,
    ) -> Result<Arc<Self>, CoreError> {
        Self::compile(&TransitionTable::from_json(json)?, options)
    }

    /// Creates a machine in the first declared state.
    pub fn machine(self: &Arc<Self>) -> Machine {
        Machine::new(Arc::clone(self))
    }

    /// Creates a machine in the given state.
    pub fn machine_in(self: &Arc<Self>, state: impl Into<String>) -> Machine {
        Machine::with_state(Arc::clone(self), state)
    }

    /// Returns the first declared state.
    pub fn initial_state(&self) -> &str {
        &self.states[0].name
    }

    /// Looks up the compiled rules of a state.
    pub fn state(&self, name: &str) -> Option<&CompiledState> {
        self.index.get(name).map(|&idx| &self.states[idx])
    }

    /// Returns all states in declaration order.
    pub fn states(&self) -> &[CompiledState] {
        &self.states
    }

    /// Returns true if the given state is declared in the table.
    pub fn has_state(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns true if the state has no rules. Undeclared states count as
    /// terminal.
    pub fn is_terminal(&self, name: &str) -> bool {
        self.state(name).map_or(true, CompiledState::is_terminal)
    }

    /// Returns every notification name this table can emit.
    pub fn notification_names(&self) -> BTreeSet<&str> {
        self.states
            .iter()
            .flat_map(|s| {
                s.rules
                    .iter()
                    .flat_map(|r| r.notifications.iter())
                    .chain(s.in_final.iter())
            })
            .map(|n| n.name.as_str())
            .collect()
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Returns the table this was compiled from.
    pub fn source(&self) -> &TransitionTable {
        &self.source
    }

    /// Hash of the canonical source table.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }
}

fn is_terminal_target(table: &TransitionTable, state: &str) -> bool {
    table.rules(state).map_or(true, <[_]>::is_empty)
}
