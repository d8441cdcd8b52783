//! Notification naming.
//!
//! Every accepted transition `from -> to` produces, in order:
//!
//! - `update(from, to)`
//! - for `from == to`: `staying(from)`, `stayingIn<From>()`
//! - for `from != to`: `leaving<From>(to)`, `entering<To>(from)`,
//!   `goingFrom<From>To<To>(from, to)`
//!
//! With terminal signals enabled, a cross transition into a state without
//! rules is followed by `final(from)`, and dispatching from a state without
//! rules emits only `inFinal(state)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const UPDATE: &str = "update";
pub const STAYING: &str = "staying";
pub const FINAL: &str = "final";
pub const IN_FINAL: &str = "inFinal";

/// How state identifiers are turned into labels inside notification names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capitalization {
    /// Upper-case the first character, keep the rest (`double quote` -> `Double quote`).
    #[default]
    FirstLetter,
    /// Lower-case, then capitalize and join space separated words
    /// (`double quote` -> `DoubleQuote`).
    TitleWords,
}

impl Capitalization {
    /// Derives the label for a state identifier.
    pub fn label(self, state: &str) -> String {
        match self {
            Capitalization::FirstLetter => capitalize(state),
            Capitalization::TitleWords => state
                .to_lowercase()
                .split(' ')
                .filter(|w| !w.is_empty())
                .map(capitalize)
                .collect(),
        }
    }
}

impl FromStr for Capitalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first-letter" | "first_letter" | "first" => Ok(Capitalization::FirstLetter),
            "title-words" | "title_words" | "title" => Ok(Capitalization::TitleWords),
            other => Err(format!(
                "unknown capitalization '{}' (expected first-letter or title-words)",
                other
            )),
        }
    }
}

impl fmt::Display for Capitalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capitalization::FirstLetter => f.write_str("first-letter"),
            Capitalization::TitleWords => f.write_str("title-words"),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Payload carried by a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    Update { from: String, to: String },
    Staying { state: String },
    StayingIn { state: String },
    Leaving { from: String, to: String },
    Entering { from: String, to: String },
    GoingFrom { from: String, to: String },
    Final { from: String, to: String },
    InFinal { state: String },
}

/// A named lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub name: String,
    #[serde(flatten)]
    pub signal: Signal,
}

impl Notification {
    fn new(name: impl Into<String>, signal: Signal) -> Self {
        Self {
            name: name.into(),
            signal,
        }
    }

    /// Returns the positional handler arguments of this notification.
    ///
    /// `update` and `goingFrom..` carry `(from, to)`, `leaving..` carries the
    /// destination, `entering..` the origin, `staying`/`final`/`inFinal` a
    /// single state and `stayingIn..` nothing.
    pub fn args(&self) -> Vec<&str> {
        match &self.signal {
            Signal::Update { from, to } | Signal::GoingFrom { from, to } => {
                vec![from.as_str(), to.as_str()]
            }
            Signal::Staying { state } | Signal::InFinal { state } => vec![state.as_str()],
            Signal::StayingIn { .. } => vec![],
            Signal::Leaving { to, .. } => vec![to.as_str()],
            Signal::Entering { from, .. } | Signal::Final { from, .. } => vec![from.as_str()],
        }
    }
}

/// Derives the notification sequence of an accepted transition.
///
/// `final_signal` appends `final(from)` to cross transitions and is set by
/// the compiler when terminal signals are on and `to` has no rules.
pub fn transition_notifications(
    from: &str,
    to: &str,
    caps: Capitalization,
    final_signal: bool,
) -> Vec<Notification> {
    let from_label = caps.label(from);
    let mut out = vec![Notification::new(
        UPDATE,
        Signal::Update {
            from: from.to_string(),
            to: to.to_string(),
        },
    )];

    if from == to {
        out.push(Notification::new(
            STAYING,
            Signal::Staying {
                state: from.to_string(),
            },
        ));
        out.push(Notification::new(
            format!("stayingIn{}", from_label),
            Signal::StayingIn {
                state: from.to_string(),
            },
        ));
        return out;
    }

    let to_label = caps.label(to);
    out.push(Notification::new(
        format!("leaving{}", from_label),
        Signal::Leaving {
            from: from.to_string(),
            to: to.to_string(),
        },
    ));
    out.push(Notification::new(
        format!("entering{}", to_label),
        Signal::Entering {
            from: from.to_string(),
            to: to.to_string(),
        },
    ));
    out.push(Notification::new(
        format!("goingFrom{}To{}", from_label, to_label),
        Signal::GoingFrom {
            from: from.to_string(),
            to: to.to_string(),
        },
    ));

    if final_signal {
        out.push(Notification::new(
            FINAL,
            Signal::Final {
                from: from.to_string(),
                to: to.to_string(),
            },
        ));
    }

    out
}

/// Notification emitted when dispatching from a state without rules.
pub fn in_final(state: &str) -> Notification {
    Notification::new(
        IN_FINAL,
        Signal::InFinal {
            state: state.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(notifications: &[Notification]) -> Vec<&str> {
        notifications.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_first_letter_label() {
        let caps = Capitalization::FirstLetter;
        assert_eq!(caps.label("locked"), "Locked");
        assert_eq!(caps.label("double quote"), "Double quote");
        assert_eq!(caps.label("camelCase"), "CamelCase");
        assert_eq!(caps.label("éclair"), "Éclair");
        assert_eq!(caps.label(""), "");
    }

    #[test]
    fn test_title_words_label() {
        let caps = Capitalization::TitleWords;
        assert_eq!(caps.label("double quote"), "DoubleQuote");
        assert_eq!(caps.label("camelCase"), "Camelcase");
        assert_eq!(caps.label("a  b"), "AB");
        assert_eq!(caps.label("\""), "\"");
    }

    #[test]
    fn test_capitalization_from_str() {
        assert_eq!(
            "title-words".parse::<Capitalization>().unwrap(),
            Capitalization::TitleWords
        );
        assert_eq!(
            "First-Letter".parse::<Capitalization>().unwrap(),
            Capitalization::FirstLetter
        );
        assert!("shout".parse::<Capitalization>().is_err());
        assert_eq!(Capitalization::TitleWords.to_string(), "title-words");
    }

    #[test]
    fn test_cross_transition_sequence() {
        let seq = transition_notifications("a", "b", Capitalization::FirstLetter, false);
        assert_eq!(
            names(&seq),
            vec!["update", "leavingA", "enteringB", "goingFromAToB"]
        );
        assert_eq!(seq[0].args(), vec!["a", "b"]);
        assert_eq!(seq[1].args(), vec!["b"]);
        assert_eq!(seq[2].args(), vec!["a"]);
        assert_eq!(seq[3].args(), vec!["a", "b"]);
    }

    #[test]
    fn test_self_transition_sequence() {
        let seq = transition_notifications("idle", "idle", Capitalization::FirstLetter, true);
        assert_eq!(names(&seq), vec!["update", "staying", "stayingInIdle"]);
        assert_eq!(seq[1].args(), vec!["idle"]);
        assert!(seq[2].args().is_empty());
    }

    #[test]
    fn test_final_signal_appended() {
        let seq = transition_notifications("nic", "nice", Capitalization::FirstLetter, true);
        assert_eq!(seq.last().unwrap().name, "final");
        assert_eq!(seq.last().unwrap().args(), vec!["nic"]);
        assert_eq!(seq.len(), 5);
    }

    #[test]
    fn test_title_words_names() {
        let seq = transition_notifications(
            "initial",
            "double quote",
            Capitalization::TitleWords,
            false,
        );
        assert_eq!(seq[2].name, "enteringDoubleQuote");
        assert_eq!(seq[3].name, "goingFromInitialToDoubleQuote");
    }

    #[test]
    fn test_in_final() {
        let n = in_final("done");
        assert_eq!(n.name, "inFinal");
        assert_eq!(n.args(), vec!["done"]);
    }

    #[test]
    fn test_notification_json_shape() {
        let seq = transition_notifications("a", "b", Capitalization::FirstLetter, false);
        let json = serde_json::to_value(&seq[1]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "leavingA", "kind": "leaving", "from": "a", "to": "b"})
        );
    }
}
