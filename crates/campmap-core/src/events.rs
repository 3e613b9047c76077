//! Typed event emitter for host notifications.
//!
//! Replaces ambient event dispatch with explicit observer registration:
//! hosts subscribe closures for a closed set of event kinds and receive
//! them synchronously on emit.

/// Handle returned by [`EventEmitter::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// An ordered list of callbacks invoked synchronously for each emitted event.
pub struct EventEmitter<E> {
    next_id: u64,
    listeners: Vec<(u64, Box<dyn FnMut(&E)>)>,
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<E> std::fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<E> EventEmitter<E> {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Listeners are invoked in subscription order.
    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        Subscription(id)
    }

    /// Remove a previously registered callback.
    /// Returns false if the subscription was already removed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription.0);
        self.listeners.len() != before
    }

    /// Invoke every listener with the given event.
    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Check whether any listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
