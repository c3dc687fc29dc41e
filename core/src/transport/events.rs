//! Event emitter shared between a beacon transport and its listeners
//!
//! Radio callbacks publish [`TransportEvent`]s here; the session registers its
//! queue once per event kind. Emission never blocks the caller: an event with
//! no listener is discarded, and an event that finds the queue full is dropped
//! and counted.

use crate::transport::abstraction::{EventKind, TransportEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Default capacity of a session event queue
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 64;

pub type EventSender = mpsc::Sender<TransportEvent>;
pub type EventReceiver = mpsc::Receiver<TransportEvent>;

/// Create a bounded FIFO queue for transport events
pub fn event_queue(capacity: usize) -> (EventSender, EventReceiver) {
    mpsc::channel(capacity.max(1))
}

struct Listener {
    id: u64,
    sender: EventSender,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<EventKind, Vec<Listener>>,
    dropped: u64,
}

/// Cloneable handle to the event bus
#[derive(Clone, Default)]
pub struct EventEmitter {
    registry: Arc<Mutex<Registry>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sender` for events of `kind`.
    ///
    /// The listener stays registered until the returned subscription is
    /// removed or dropped.
    pub fn add_listener(&self, kind: EventKind, sender: EventSender) -> Subscription {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .listeners
            .entry(kind)
            .or_default()
            .push(Listener { id, sender });

        tracing::debug!("Listener {} registered for {} events", id, kind);

        Subscription {
            id,
            kind,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Publish an event to every listener of its kind.
    ///
    /// Returns the number of listeners that accepted the event.
    pub fn emit(&self, event: TransportEvent) -> usize {
        let kind = event.kind();
        let mut registry = self.registry.lock();
        let Registry {
            listeners, dropped, ..
        } = &mut *registry;

        let Some(targets) = listeners.get_mut(&kind) else {
            tracing::trace!("No listener for {}, discarding", event);
            return 0;
        };

        let mut delivered = 0;
        targets.retain(|listener| match listener.sender.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                *dropped += 1;
                tracing::warn!("Event queue full, dropping {}", event);
                true
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("Listener {} queue closed, unregistering", listener.id);
                false
            }
        });

        delivered
    }

    /// Number of listeners currently registered for `kind`
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.registry
            .lock()
            .listeners
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Number of events dropped because a listener queue was full
    pub fn dropped_events(&self) -> u64 {
        self.registry.lock().dropped
    }
}

/// Registration handle returned by [`EventEmitter::add_listener`]
pub struct Subscription {
    id: u64,
    kind: EventKind,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Unregister the listener
    pub fn remove(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Emitter already gone
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock();
        if let Some(listeners) = registry.listeners.get_mut(&self.kind) {
            listeners.retain(|listener| listener.id != self.id);
        }
        tracing::debug!("Listener {} removed from {} events", self.id, self.kind);
    }
}
