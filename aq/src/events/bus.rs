//! Event Bus - pub/sub for queue transitions
//!
//! The EventBus is a [`QueueObserver`] that republishes every transition on a
//! tokio broadcast channel. Consumers (the CLI printer, the file logger)
//! subscribe and process events on their own tasks, off the scheduler actor.

use tokio::sync::broadcast;
use tracing::debug;

use crate::observer::QueueObserver;
use crate::scheduler::{CompletedTask, DEFAULT_EVENT_CAPACITY, InFlightTask, QueueStats};

use super::types::QueueEvent;

/// Broadcast channel of [`QueueEvent`]s
///
/// Cloning shares the channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<QueueEvent>,
}

impl EventBus {
    /// Create a new event bus with the given capacity
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventBus::new: creating event bus");
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Emit an event to all subscribers
    ///
    /// With no subscribers the event is dropped. Slow subscribers lose the
    /// oldest events and see a lag error.
    pub fn emit(&self, event: QueueEvent) {
        debug!(event_type = event.event_type(), task_id = ?event.task_id(), "EventBus::emit");
        let _ = self.tx.send(event);
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        debug!("EventBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl QueueObserver for EventBus {
    fn on_in_flight(&self, task: &InFlightTask) {
        self.emit(QueueEvent::from(task));
    }

    fn on_done(&self, task: &CompletedTask) {
        self.emit(QueueEvent::from(task));
    }

    fn on_drain(&self, stats: &QueueStats) {
        self.emit(QueueEvent::QueueDrained { stats: *stats });
    }
}
