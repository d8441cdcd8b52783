//! Machine instances.

use crate::compiler::CompiledTable;
use crate::dispatch::{dispatch, Step};
use crate::listeners::{ListenerId, Listeners};
use crate::naming::Notification;
use std::sync::Arc;

/// A running state machine.
///
/// Each machine owns its current state and its listeners; the compiled
/// table is shared. A step is applied in two phases: the state is updated,
/// then every notification of the step is delivered. Handlers only see the
/// notification, and `transition` holds `&mut self` for the whole fan-out,
/// so a handler cannot re-enter the machine that is notifying it.
#[derive(Debug)]
pub struct Machine {
    table: Arc<CompiledTable>,
    state: String,
    listeners: Listeners,
}

impl Machine {
    /// Creates a machine in the table's first declared state.
    pub fn new(table: Arc<CompiledTable>) -> Self {
        let state = table.initial_state().to_string();
        Self::with_state(table, state)
    }

    /// Creates a machine in an explicit state. The state is not required to
    /// be declared in the table.
    pub fn with_state(table: Arc<CompiledTable>, state: impl Into<String>) -> Self {
        Self {
            table,
            state: state.into(),
            listeners: Listeners::new(),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the shared compiled table.
    pub fn table(&self) -> &Arc<CompiledTable> {
        &self.table
    }

    /// Returns true if the current state has no rules (or is undeclared).
    pub fn is_terminal(&self) -> bool {
        self.table.is_terminal(&self.state)
    }

    /// Feeds one input token to the machine and returns the resulting state.
    ///
    /// Unmatched input, a terminal state or an undeclared state leave the
    /// state unchanged; only a matched rule (or `inFinal`, when enabled)
    /// produces notifications.
    pub fn transition(&mut self, input: &str) -> &str {
        let Machine {
            table,
            state,
            listeners,
        } = &mut *self;

        let step = dispatch(table, state, input);
        if let Step::Matched(rule) = step {
            if rule.target() != state.as_str() {
                *state = rule.target().to_string();
            }
        }

        for notification in step.notifications() {
            listeners.emit(notification);
        }

        &self.state
    }

    /// Registers a handler for a notification name.
    pub fn on<F>(&mut self, name: impl Into<String>, handler: F) -> ListenerId
    where
        F: FnMut(&Notification) + 'static,
    {
        self.listeners.on(name, Box::new(handler))
    }

    /// Registers a handler for every notification.
    pub fn on_any<F>(&mut self, handler: F) -> ListenerId
    where
        F: FnMut(&Notification) + 'static,
    {
        self.listeners.on_any(Box::new(handler))
    }

    /// Removes a handler registered with [`on`](Self::on) or
    /// [`on_any`](Self::on_any).
    pub fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.off(id)
    }

    /// Number of handlers registered under a name.
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.count(name)
    }

    /// Total number of registered handlers, catch-all handlers included.
    pub fn handler_count(&self) -> usize {
        self.listeners.len()
    }
}
