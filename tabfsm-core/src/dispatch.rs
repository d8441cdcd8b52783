//! Dispatch - evaluates one input token against the current state's rules.
//!
//! Dispatch is a pure function of the compiled table, the current state and
//! the input. Applying the result (state mutation and notification fan-out)
//! is left to [`Machine`](crate::Machine).

use crate::compiler::{CompiledTable, Rule};
use crate::naming::Notification;

/// Result of dispatching one input.
#[derive(Debug, Clone, Copy)]
pub enum Step<'t> {
    /// A rule matched; the machine moves to its target.
    Matched(&'t Rule),
    /// No rule accepted the input.
    Unmatched,
    /// The current state has no rules. Carries the `inFinal` notification
    /// when terminal signals are enabled.
    Terminal(Option<&'t Notification>),
    /// The current state is not declared in the table.
    Undeclared,
}

impl<'t> Step<'t> {
    /// Returns the new state, or None when the state is left unchanged.
    pub fn target(&self) -> Option<&'t str> {
        match self {
            Step::Matched(rule) => Some(rule.target()),
            _ => None,
        }
    }

    /// Notifications to emit for this step, in order.
    pub fn notifications(&self) -> &'t [Notification] {
        match self {
            Step::Matched(rule) => rule.notifications(),
            Step::Terminal(Some(notice)) => std::slice::from_ref(*notice),
            _ => &[],
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Step::Matched(_))
    }
}

/// Evaluates `input` against the rules of `current`, first match wins.
pub fn dispatch<'t>(table: &'t CompiledTable, current: &str, input: &str) -> Step<'t> {
    let Some(state) = table.state(current) else {
        tracing::debug!("Dispatch from undeclared state '{}' ignored", current);
        return Step::Undeclared;
    };

    if state.is_terminal() {
        tracing::trace!("State '{}' is terminal, input '{}' ignored", current, input);
        return Step::Terminal(state.in_final());
    }

    match state.rules().iter().find(|rule| rule.matcher().matches(input)) {
        Some(rule) => {
            tracing::trace!(
                "'{}' --{}:{}--> '{}'",
                current,
                rule.matcher().kind(),
                rule.matcher().as_str(),
                rule.target()
            );
            Step::Matched(rule)
        }
        None => {
            tracing::trace!("No rule in state '{}' matched input '{}'", current, input);
            Step::Unmatched
        }
    }
}
