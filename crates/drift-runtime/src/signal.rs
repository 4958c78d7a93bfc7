//! Environment signals (resize, pointer movement) and their subscriptions

use tracing::trace;

/// The kinds of signal a field can subscribe to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Resize,
    PointerMove,
}

/// A notification from the host environment
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Signal {
    /// The viewport changed size (logical pixels)
    Resize { width: u32, height: u32 },
    /// The pointer moved to viewport-relative coordinates
    PointerMove { x: f32, y: f32 },
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Resize { .. } => SignalKind::Resize,
            Signal::PointerMove { .. } => SignalKind::PointerMove,
        }
    }
}

/// Token returned by `subscribe`, needed to unsubscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Subscription side of a signal source, as seen by a consumer
pub trait SignalSource {
    fn subscribe(&mut self, kind: SignalKind) -> SubscriptionId;

    /// Returns false if the subscription was not active
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;

    /// Take all queued signals, oldest first
    fn drain(&mut self) -> Vec<Signal>;
}

/// Subscription registry plus a queue of signals awaiting dispatch.
///
/// Hosts `publish` signals as they arrive; the consumer drains the queue
/// between frames. Signals of a kind nobody subscribes to are dropped at
/// publish time.
#[derive(Debug, Default)]
pub struct SignalBus {
    next_id: u64,
    subscriptions: Vec<(SubscriptionId, SignalKind)>,
    queue: Vec<Signal>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a signal. Returns false if no subscription wants it.
    pub fn publish(&mut self, signal: Signal) -> bool {
        if !self.is_subscribed(signal.kind()) {
            trace!(?signal, "dropping signal with no subscriber");
            return false;
        }
        self.queue.push(signal);
        true
    }

    pub fn is_subscribed(&self, kind: SignalKind) -> bool {
        self.subscriptions.iter().any(|(_, k)| *k == kind)
    }

    /// Number of active subscriptions
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Number of queued signals
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl SignalSource for SignalBus {
    fn subscribe(&mut self, kind: SignalKind) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push((id, kind));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(index) = self.subscriptions.iter().position(|(sid, _)| *sid == id) else {
            return false;
        };
        let (_, kind) = self.subscriptions.remove(index);
        // Queued signals of a kind nobody listens to anymore must not be delivered
        if !self.is_subscribed(kind) {
            self.queue.retain(|s| s.kind() != kind);
        }
        true
    }

    fn drain(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.queue)
    }
}
