use super::types::RunEvent;
use tokio::sync::broadcast;

/// Default event buffer capacity per subscriber
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Broadcast fan-out for run lifecycle events.
///
/// The run loop publishes without awaiting: a subscriber that falls more
/// than the buffer capacity behind starts seeing `RecvError::Lagged` and
/// should resynchronize from the run record instead of replaying events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RunEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus whose subscribers may lag up to `capacity` events
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    /// Subscribe to all future run events
    ///
    /// Every subscriber receives an independent copy of each event,
    /// regardless of which run produced it; filter by
    /// [`RunEvent::run_id`] when following a single run.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.sender.subscribe()
    }

    /// Publish an event, returning how many subscribers received it
    ///
    /// With no subscribers the event is dropped; runs never block on
    /// observers.
    pub fn publish(&self, event: RunEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Current number of active subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// The per-subscriber buffer capacity this bus was created with
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
