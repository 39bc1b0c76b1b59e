//! Explicit publish/subscribe lists.
//!
//! Each emitting component (wallet adapter, network registry, client) owns one
//! `Observers<E>`. Subscribers are registered and removed explicitly; there is
//! no global registry.
//!
//! # Delivery
//! - Synchronous: `emit` returns after every callback has run.
//! - Ordered: callbacks run in registration order, events in emission order.
//! - The subscriber list is snapshotted before dispatch, so a callback may
//!   subscribe or unsubscribe without deadlocking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

/// Handle returned by `subscribe`, used to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Observer callback.
pub type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Ordered list of observers for one event type.
pub struct Observers<E> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(ObserverId, Callback<E>)>>,
}

impl<E> Observers<E> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Register a callback. It sees every event emitted after this call.
    pub fn subscribe(&self, callback: Callback<E>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.lock().push((id, callback));
        id
    }

    /// Remove a callback. Returns false if the id was not registered.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Deliver an event to every registered callback.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Callback<E>> = self.lock().iter().map(|(_, cb)| cb.clone()).collect();
        for callback in snapshot {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(ObserverId, Callback<E>)>> {
        // A panicking observer must not disable delivery for everyone else.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<E: Clone + Send + 'static> Observers<E> {
    /// Subscribe with an unbounded channel instead of a callback.
    ///
    /// The sender is dropped from the list the first time a send fails, i.e.
    /// once the receiver is gone.
    pub fn subscribe_channel(self: &Arc<Self>) -> (ObserverId, mpsc::UnboundedReceiver<E>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let weak = Arc::downgrade(self);
        let slot: Arc<Mutex<Option<ObserverId>>> = Arc::new(Mutex::new(None));
        let slot_in_cb = slot.clone();

        let id = self.subscribe(Arc::new(move |event: &E| {
            if tx.send(event.clone()).is_err() {
                let own_id = *slot_in_cb.lock().unwrap_or_else(|p| p.into_inner());
                if let (Some(observers), Some(id)) = (weak.upgrade(), own_id) {
                    observers.unsubscribe(id);
                }
            }
        }));
        *slot.lock().unwrap_or_else(|p| p.into_inner()) = Some(id);
        (id, rx)
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.len())
            .finish()
    }
}
