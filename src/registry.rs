//! Keyed listener registry with broadcast dispatch.
//!
//! Listeners are registered under caller-chosen keys. The key namespaces
//! registration and removal only: dispatch broadcasts every event to every
//! registered listener, in registration order. Callers wanting per-key
//! filtering must filter inside the callback.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::error;

use crate::frame::EventRecord;

/// Callback invoked for every dispatched [`EventRecord`].
pub type Listener = Arc<dyn Fn(&EventRecord) + Send + Sync>;

/// Ordered mapping from key to exactly one listener.
///
/// Re-registering a key replaces the previous callback in place, keeping
/// the key's original position in dispatch order.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<(String, Listener)>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener under a key, replacing any previous one.
    pub fn add(&mut self, key: &str, listener: Listener) {
        if let Some(entry) = self.listeners.iter_mut().find(|(k, _)| k == key) {
            entry.1 = listener;
        } else {
            self.listeners.push((key.to_string(), listener));
        }
    }

    /// Remove the listener registered under a key.
    ///
    /// Removing an unknown key is a no-op.
    pub fn remove(&mut self, key: &str) {
        self.listeners.retain(|(k, _)| k != key);
    }

    /// Remove all listeners.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Snapshot the current listeners in registration order.
    ///
    /// Dispatch runs on a snapshot so listeners are free to mutate the
    /// registry (or tear down the connection) from inside a callback.
    pub fn snapshot(&self) -> Vec<(String, Listener)> {
        self.listeners.clone()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<&str> = self.listeners.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("ListenerRegistry")
            .field("keys", &keys)
            .finish()
    }
}

/// Dispatch one event to a listener snapshot, in registration order,
/// synchronously.
///
/// Each invocation is panic-isolated: a panicking listener is logged and
/// the remaining listeners still run.
pub fn dispatch(listeners: &[(String, Listener)], record: &EventRecord) {
    for (key, listener) in listeners {
        if catch_unwind(AssertUnwindSafe(|| listener(record))).is_err() {
            error!(key = %key, "event listener panicked");
        }
    }
}
