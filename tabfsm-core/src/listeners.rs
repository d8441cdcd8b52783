//! Notification listener registry.

use crate::naming::Notification;
use std::collections::HashMap;
use std::fmt;

/// Boxed notification handler.
pub type Handler = Box<dyn FnMut(&Notification)>;

/// Identifies a registered handler, for removal with [`Listeners::off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Handlers keyed by notification name.
///
/// Fan-out is synchronous: for each notification, the handlers registered
/// under its name run in registration order, followed by the catch-all
/// handlers in registration order.
#[derive(Default)]
pub struct Listeners {
    named: HashMap<String, Vec<(ListenerId, Handler)>>,
    any: Vec<(ListenerId, Handler)>,
    next_id: u64,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for one notification name.
    pub fn on(&mut self, name: impl Into<String>, handler: Handler) -> ListenerId {
        let id = self.next_id();
        self.named.entry(name.into()).or_default().push((id, handler));
        id
    }

    /// Registers a handler for every notification.
    pub fn on_any(&mut self, handler: Handler) -> ListenerId {
        let id = self.next_id();
        self.any.push((id, handler));
        id
    }

    /// Removes a handler. Returns false if it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        if let Some(pos) = self.any.iter().position(|(i, _)| *i == id) {
            self.any.remove(pos);
            return true;
        }

        for handlers in self.named.values_mut() {
            if let Some(pos) = handlers.iter().position(|(i, _)| *i == id) {
                handlers.remove(pos);
                return true;
            }
        }

        false
    }

    /// Number of handlers registered under a name (catch-all handlers are
    /// not counted).
    pub fn count(&self, name: &str) -> usize {
        self.named.get(name).map_or(0, Vec::len)
    }

    /// Total number of registered handlers.
    pub fn len(&self) -> usize {
        self.named.values().map(Vec::len).sum::<usize>() + self.any.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers a notification to its handlers.
    pub fn emit(&mut self, notification: &Notification) {
        if let Some(handlers) = self.named.get_mut(&notification.name) {
            for (_, handler) in handlers.iter_mut() {
                handler(notification);
            }
        }
        for (_, handler) in self.any.iter_mut() {
            handler(notification);
        }
    }

    fn next_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self
            .named
            .iter()
            .filter(|(_, h)| !h.is_empty())
            .map(|(name, h)| (name.as_str(), h.len()))
            .collect();
        names.sort();

        f.debug_struct("Listeners")
            .field("named", &names)
            .field("any", &self.any.len())
            .finish()
    }
}
