//! Transition table types and validation.
//!
//! Tables use a JSON (or YAML) DSL mapping every state to its ordered rules:
//!
//! ```json
//! {
//!   "locked":   { "coin": "unlocked", "push": "locked" },
//!   "unlocked": [["push", "locked"], ["coin", "unlocked"]],
//!   "broken":   [{ "on": "/fix(ed)?/i", "to": "locked" }, { "on": "_", "to": "broken" }]
//! }
//! ```
//!
//! The first declared state is the default initial state. Rule order within a
//! state is significant, so the pair-sequence forms are the canonical way to
//! write a table; mappings are accepted with their key order preserved.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Text format of a serialized table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Json,
    Yaml,
}

impl TableFormat {
    /// Picks the format from a file extension: `.yaml`/`.yml` is YAML,
    /// anything else is JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => TableFormat::Yaml,
            _ => TableFormat::Json,
        }
    }
}

/// One `matcher -> target` rule as authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Matcher specification: a literal, a `/pattern/flags` or the wildcard.
    pub on: String,

    /// Target state identifier.
    pub to: String,
}

/// A state and its authored rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    pub state: String,
    pub rules: Vec<RuleEntry>,
}

/// Validated, order-preserving transition table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    states: Vec<StateEntry>,
}

impl TransitionTable {
    /// Creates an empty table. At least one state must be added before
    /// the table can be compiled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a state with its rules in order (builder form).
    pub fn state<S, I, M, T>(mut self, state: S, rules: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (M, T)>,
        M: Into<String>,
        T: Into<String>,
    {
        self.insert_state(state, rules);
        self
    }

    /// Adds a state with its rules in order.
    ///
    /// Re-declaring a state or a matcher keeps the first declared position
    /// and lets the last declared target win.
    pub fn insert_state<S, I, M, T>(&mut self, state: S, rules: I)
    where
        S: Into<String>,
        I: IntoIterator<Item = (M, T)>,
        M: Into<String>,
        T: Into<String>,
    {
        let state = state.into();
        let idx = match self.states.iter().position(|s| s.state == state) {
            Some(idx) => idx,
            None => {
                self.states.push(StateEntry {
                    state,
                    rules: Vec::new(),
                });
                self.states.len() - 1
            }
        };

        let entry = &mut self.states[idx];
        for (on, to) in rules {
            upsert_rule(&mut entry.rules, on.into(), to.into());
        }
    }

    /// Parses and validates a table from a JSON value.
    pub fn from_json(json: &Value) -> Result<Self, CoreError> {
        let map = json
            .as_object()
            .ok_or_else(|| CoreError::invalid_table(format!(
                "table must be a mapping of states, found {}",
                kind_of(json)
            )))?;

        if map.is_empty() {
            return Err(CoreError::invalid_table(
                "table must declare at least one state",
            ));
        }

        let mut table = Self::new();
        for (state, rules) in map {
            let rules = parse_rules(state, rules)?;
            table.insert_state(state.as_str(), rules);
        }

        Ok(table)
    }

    /// Parses and validates a table from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self, CoreError> {
        let json: Value = serde_json::from_str(s)?;
        Self::from_json(&json)
    }

    /// Parses and validates a table from YAML text.
    pub fn from_yaml_str(s: &str) -> Result<Self, CoreError> {
        let json: Value = serde_yaml::from_str(s)?;
        Self::from_json(&json)
    }

    /// Parses and validates a table from text in the given format.
    pub fn parse(s: &str, format: TableFormat) -> Result<Self, CoreError> {
        match format {
            TableFormat::Json => Self::from_json_str(s),
            TableFormat::Yaml => Self::from_yaml_str(s),
        }
    }

    /// Returns the states in declaration order.
    pub fn states(&self) -> &[StateEntry] {
        &self.states
    }

    /// Returns the first declared state.
    pub fn first_state(&self) -> Option<&str> {
        self.states.first().map(|s| s.state.as_str())
    }

    /// Returns the rules declared for a state.
    pub fn rules(&self, state: &str) -> Option<&[RuleEntry]> {
        self.states
            .iter()
            .find(|s| s.state == state)
            .map(|s| s.rules.as_slice())
    }

    /// Returns the number of declared states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the canonical JSON form: every state maps to a sequence of
    /// `{"on", "to"}` objects.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        for entry in &self.states {
            let rules = entry
                .rules
                .iter()
                .map(|r| serde_json::json!({"on": r.on, "to": r.to}))
                .collect();
            map.insert(entry.state.clone(), Value::Array(rules));
        }
        Value::Object(map)
    }
}

impl Serialize for TransitionTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TransitionTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let json = Value::deserialize(deserializer)?;
        Self::from_json(&json).map_err(serde::de::Error::custom)
    }
}

fn upsert_rule(rules: &mut Vec<RuleEntry>, on: String, to: String) {
    match rules.iter_mut().find(|r| r.on == on) {
        Some(existing) => existing.to = to,
        None => rules.push(RuleEntry { on, to }),
    }
}

fn parse_rules(state: &str, value: &Value) -> Result<Vec<(String, String)>, CoreError> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(on, to)| Ok((on.clone(), target_of(state, on, to)?)))
            .collect(),
        Value::Array(items) => items.iter().map(|item| parse_rule_item(state, item)).collect(),
        other => Err(CoreError::invalid_table(format!(
            "state '{}' must map matchers to target states, found {}",
            state,
            kind_of(other)
        ))),
    }
}

fn parse_rule_item(state: &str, item: &Value) -> Result<(String, String), CoreError> {
    match item {
        Value::Array(pair) if pair.len() == 2 => {
            let on = pair[0].as_str().ok_or_else(|| {
                CoreError::invalid_table(format!(
                    "state '{}': matcher must be a string, found {}",
                    state,
                    kind_of(&pair[0])
                ))
            })?;
            Ok((on.to_string(), target_of(state, on, &pair[1])?))
        }
        Value::Object(obj) => {
            let on = obj.get("on").and_then(Value::as_str).ok_or_else(|| {
                CoreError::invalid_table(format!(
                    "state '{}': rule object needs a string 'on' field",
                    state
                ))
            })?;
            let to = obj.get("to").unwrap_or(&Value::Null);
            Ok((on.to_string(), target_of(state, on, to)?))
        }
        other => Err(CoreError::invalid_table(format!(
            "state '{}': rule must be a [matcher, target] pair or {{on, to}} object, found {}",
            state,
            kind_of(other)
        ))),
    }
}

fn target_of(state: &str, on: &str, to: &Value) -> Result<String, CoreError> {
    to.as_str().map(str::to_string).ok_or_else(|| {
        CoreError::invalid_table(format!(
            "state '{}': target of matcher '{}' must be a state identifier, found {}",
            state,
            on,
            kind_of(to)
        ))
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
