use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use warren_protocol::Event;

/// Identifies one registration on a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Sending half of a subscription queue. A send only fails once the
/// receiver is gone, which the bus treats as "unregister me".
type EventSender = mpsc::UnboundedSender<Event>;

#[derive(Default)]
struct Registry {
    subscribers: Mutex<HashMap<SubscriptionId, EventSender>>,
    next_id: AtomicU64,
}

impl Registry {
    fn remove(&self, id: SubscriptionId) -> bool {
        self.subscribers.lock().remove(&id).is_some()
    }
}

/// A process-local fan-out broadcaster. Cloning is cheap and every clone
/// talks to the same set of subscriptions.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Registry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh subscription. It receives every event broadcast
    /// from now on, and none from before.
    pub fn register(&self) -> Subscription {
        let id = SubscriptionId(
            self.registry.next_id.fetch_add(1, Ordering::Relaxed),
        );
        let (tx, rx) = mpsc::unbounded_channel();
        self.registry.subscribers.lock().insert(id, tx);
        tracing::debug!(%id, "subscription registered");

        Subscription {
            id,
            rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Retires a subscription. Anything still queued for it is dropped.
    ///
    /// Dropping the [`Subscription`] does the same thing; this just makes
    /// the intent explicit at the call site.
    pub fn unregister(&self, subscription: Subscription) {
        drop(subscription);
    }

    /// Queues a copy of `event` for every registered subscription and
    /// returns how many received it.
    ///
    /// Subscriptions whose receiver has gone away are pruned.
    pub fn broadcast(&self, event: Event) -> usize {
        let mut subscribers = self.registry.subscribers.lock();
        let mut delivered = 0;
        subscribers.retain(|id, tx| match tx.send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(_) => {
                tracing::debug!(%id, "pruning closed subscription");
                false
            }
        });
        delivered
    }

    /// Number of live registrations.
    pub fn subscriber_count(&self) -> usize {
        self.registry.subscribers.lock().len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// One session's view of the bus.
///
/// Owned by exactly one session and never shared. Unregisters itself when
/// dropped.
pub struct Subscription {
    id: SubscriptionId,
    rx: mpsc::UnboundedReceiver<Event>,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Waits for the next event. Returns `None` only if the bus itself is
    /// gone.
    ///
    /// Cancel-safe: can be used as a `tokio::select!` branch without
    /// losing events.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// The next already-queued event, if any.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.id) {
                tracing::debug!(id = %self.id, "subscription unregistered");
            }
        }
        self.rx.close();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
