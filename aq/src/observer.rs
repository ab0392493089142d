//! Observer callbacks for queue transitions
//!
//! Observers run on the scheduler actor, inside the transition they report,
//! so they must not block. Hand heavy work to another task (see
//! [`crate::events::EventBus`]).

use std::sync::Arc;

use crate::scheduler::{CompletedTask, InFlightTask, QueueStats};

/// Receives notifications as tasks move through the queue
///
/// Every method has a no-op default; implement only what you need.
pub trait QueueObserver: Send + Sync {
    /// A task moved to in-flight; its operation has not been started yet
    fn on_in_flight(&self, _task: &InFlightTask) {}

    /// A task settled (success or failure) and left in-flight
    fn on_done(&self, _task: &CompletedTask) {}

    /// The queue emptied after completing work; fires once per empty period
    fn on_drain(&self, _stats: &QueueStats) {}
}

impl<T: QueueObserver + ?Sized> QueueObserver for Arc<T> {
    fn on_in_flight(&self, task: &InFlightTask) {
        (**self).on_in_flight(task)
    }

    fn on_done(&self, task: &CompletedTask) {
        (**self).on_done(task)
    }

    fn on_drain(&self, stats: &QueueStats) {
        (**self).on_drain(stats)
    }
}

type InFlightFn = Box<dyn Fn(&InFlightTask) + Send + Sync>;
type DoneFn = Box<dyn Fn(&CompletedTask) + Send + Sync>;
type DrainFn = Box<dyn Fn(&QueueStats) + Send + Sync>;

/// Closure-based observer; each callback is optional
///
/// ```ignore
/// let callbacks = Callbacks::new()
///     .on_done(|task| println!("{} finished", task.id))
///     .on_drain(|_| println!("all done"));
/// let scheduler = Scheduler::new(SchedulerConfig::default()).with_observer(callbacks);
/// ```
#[derive(Default)]
pub struct Callbacks {
    in_flight: Option<InFlightFn>,
    done: Option<DoneFn>,
    drain: Option<DrainFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_in_flight(mut self, f: impl Fn(&InFlightTask) + Send + Sync + 'static) -> Self {
        self.in_flight = Some(Box::new(f));
        self
    }

    pub fn on_done(mut self, f: impl Fn(&CompletedTask) + Send + Sync + 'static) -> Self {
        self.done = Some(Box::new(f));
        self
    }

    pub fn on_drain(mut self, f: impl Fn(&QueueStats) + Send + Sync + 'static) -> Self {
        self.drain = Some(Box::new(f));
        self
    }
}

impl QueueObserver for Callbacks {
    fn on_in_flight(&self, task: &InFlightTask) {
        if let Some(f) = &self.in_flight {
            f(task);
        }
    }

    fn on_done(&self, task: &CompletedTask) {
        if let Some(f) = &self.done {
            f(task);
        }
    }

    fn on_drain(&self, stats: &QueueStats) {
        if let Some(f) = &self.drain {
            f(stats);
        }
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("in_flight", &self.in_flight.is_some())
            .field("done", &self.done.is_some())
            .field("drain", &self.drain.is_some())
            .finish()
    }
}
