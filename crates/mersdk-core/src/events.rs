//! Manager notifications
//!
//! Observers subscribe a callback and receive every event synchronously, on
//! the thread that mutated the registry, in subscription order. An observer
//! therefore always sees the registry in the state that produced the event.

use std::fmt;

/// Events published by the SDK manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkManagerEvent {
    /// An SDK was added or removed, or its targets, private key or headless
    /// mode changed
    SdksUpdated,
    /// Startup reconciliation finished. Published exactly once.
    Initialized,
}

/// Handle returned by [`EventHub::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn Fn(&SdkManagerEvent) + Send + Sync>;

/// Observer list for [`SdkManagerEvent`]s
#[derive(Default)]
pub struct EventHub {
    next_id: u64,
    observers: Vec<(SubscriptionId, Callback)>,
}

impl EventHub {
    /// Create a hub with no observers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&SdkManagerEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(callback)));
        id
    }

    /// Remove an observer. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Deliver an event to every observer
    pub fn emit(&self, event: SdkManagerEvent) {
        tracing::trace!(?event, observers = self.observers.len(), "emitting");
        for (_, callback) in &self.observers {
            callback(&event);
        }
    }

    /// Number of subscribed observers
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// True if nobody is subscribed
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("observers", &self.observers.len())
            .finish()
    }
}
