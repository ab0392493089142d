//! Scheduler actor implementation

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::{Outcome, Task, TaskId};
use crate::observer::QueueObserver;

use super::config::{ConcurrencyLimit, SchedulerConfig};
use super::handle::SchedulerHandle;
use super::messages::{ActorEvent, SchedulerRequest};
use super::queue::{CompletedTask, InFlightTask, QueueState, QueueStats, SchedulerMetrics};

/// Bounded-concurrency task scheduler
///
/// All bookkeeping happens on one actor task that owns the pending and
/// in-flight collections and processes messages one at a time. Task
/// operations run as separate tokio tasks and report back on an internal
/// channel, so reconciliation passes never interleave.
pub struct Scheduler {
    config: SchedulerConfig,
    tx: mpsc::UnboundedSender<SchedulerRequest>,
    rx: mpsc::UnboundedReceiver<SchedulerRequest>,
    stats_tx: watch::Sender<QueueStats>,
    observers: Vec<Arc<dyn QueueObserver>>,
}

impl Scheduler {
    /// Create a new scheduler with the given configuration
    pub fn new(config: SchedulerConfig) -> Self {
        debug!(?config, "Scheduler::new: called");
        let (tx, rx) = mpsc::unbounded_channel();
        let (stats_tx, _) = watch::channel(QueueStats::default());
        Self {
            config,
            tx,
            rx,
            stats_tx,
            observers: Vec::new(),
        }
    }

    /// Register an observer; observers are notified in registration order
    pub fn with_observer(mut self, observer: impl QueueObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Get a handle for submitting tasks and reading stats
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle::new(self.tx.clone(), self.stats_tx.subscribe())
    }

    /// Spawn the actor on the current runtime and return a handle to it
    pub fn spawn(self) -> SchedulerHandle {
        let handle = self.handle();
        tokio::spawn(self.run());
        info!("Scheduler spawned");
        handle
    }

    /// Run the actor until shutdown is requested, or until every handle is
    /// dropped and all accepted work has finished
    ///
    /// Returns the final stats. On shutdown, operations still running keep
    /// running; their completions are discarded.
    pub async fn run(self) -> QueueStats {
        let Self {
            config,
            tx,
            mut rx,
            stats_tx,
            observers,
        } = self;
        // Only handles keep the request channel open.
        drop(tx);

        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let mut actor = Actor {
            limit: config.concurrency,
            state: QueueState::new(),
            metrics: SchedulerMetrics::default(),
            observers,
            events_tx,
            stats_tx,
            drain_epoch: 0,
            drains_scheduled: 0,
        };
        let mut handles_open = true;

        info!(limit = %actor.limit, "Scheduler started");

        loop {
            tokio::select! {
                // Requests first, so work submitted from a callback lands
                // before a drain scheduled in the same pass is handled.
                biased;
                req = rx.recv(), if handles_open => match req {
                    Some(SchedulerRequest::Shutdown) => {
                        info!("Scheduler shutdown requested");
                        break;
                    }
                    Some(req) => actor.handle_request(req),
                    None => {
                        debug!("Scheduler::run: all handles dropped");
                        handles_open = false;
                    }
                },
                Some(event) = events_rx.recv() => actor.handle_event(event),
                else => break,
            }

            if !handles_open && actor.is_settled() {
                info!("All handles dropped and queue settled");
                break;
            }
        }

        let stats = actor.state.stats();
        info!(?stats, "Scheduler stopped");
        stats
    }
}

/// State owned by the running actor
struct Actor {
    limit: ConcurrencyLimit,
    state: QueueState,
    metrics: SchedulerMetrics,
    observers: Vec<Arc<dyn QueueObserver>>,
    /// Held by the actor itself, so operations can always report back
    events_tx: mpsc::UnboundedSender<ActorEvent>,
    stats_tx: watch::Sender<QueueStats>,
    /// Bumped for every scheduled drain; only the latest one may fire
    drain_epoch: u64,
    /// Drain signals sent but not yet handled
    drains_scheduled: usize,
}

impl Actor {
    fn handle_request(&mut self, req: SchedulerRequest) {
        match req {
            SchedulerRequest::Submit { task } => self.submit(task),
            SchedulerRequest::SetConcurrency { limit } => self.set_concurrency(limit),
            SchedulerRequest::GetStats { reply_tx } => {
                let _ = reply_tx.send(self.state.stats());
            }
            SchedulerRequest::GetMetrics { reply_tx } => {
                let _ = reply_tx.send(self.metrics.clone());
            }
            // Handled by the run loop.
            SchedulerRequest::Shutdown => {}
        }
    }

    fn handle_event(&mut self, event: ActorEvent) {
        match event {
            ActorEvent::Completed { id, outcome } => self.complete(id, outcome),
            ActorEvent::Drain { epoch } => self.drain(epoch),
        }
    }

    /// Nothing pending, nothing running, no drain left to signal
    fn is_settled(&self) -> bool {
        self.state.stats().is_idle() && self.drains_scheduled == 0
    }

    fn submit(&mut self, task: Task) {
        let id = task.id().clone();
        debug!(%id, "Scheduler::submit: called");

        if !self.state.enqueue(task) {
            debug!(%id, "Scheduler::submit: already pending or in flight, ignoring");
            self.metrics.total_duplicates += 1;
            return;
        }

        self.metrics.total_submitted += 1;
        self.publish();
        self.reconcile();
    }

    fn complete(&mut self, id: TaskId, outcome: Outcome) {
        debug!(%id, success = outcome.is_success(), "Scheduler::complete: called");

        let Some(elapsed) = self.state.complete(&id, Instant::now()) else {
            warn!(%id, "Completion for a task that is not in flight");
            return;
        };

        if outcome.is_success() {
            self.metrics.total_succeeded += 1;
        } else {
            self.metrics.total_failed += 1;
        }

        let done = CompletedTask {
            id,
            outcome,
            stats: self.publish(),
            elapsed,
        };
        for observer in &self.observers {
            observer.on_done(&done);
        }

        self.reconcile();
    }

    fn set_concurrency(&mut self, limit: ConcurrencyLimit) {
        info!(from = %self.limit, to = %limit, "Concurrency limit changed");
        self.limit = limit;
        self.reconcile();
    }

    /// Signal a drain if due, otherwise start tasks until the limit is saturated
    fn reconcile(&mut self) {
        if self.state.take_drain() {
            self.drain_epoch += 1;
            self.drains_scheduled += 1;
            debug!(epoch = self.drain_epoch, "Scheduler::reconcile: queue empty, scheduling drain");
            // The actor owns the receiver, so this cannot fail while it runs.
            let _ = self.events_tx.send(ActorEvent::Drain {
                epoch: self.drain_epoch,
            });
            return;
        }

        while let Some(task) = self.state.start_next(self.limit, Instant::now()) {
            self.start(task);
        }
    }

    fn start(&mut self, task: Task) {
        let (id, operation) = task.into_parts();
        let stats = self.publish();
        debug!(%id, ?stats, "Scheduler::start: task in flight");

        let started = InFlightTask { id: id.clone(), stats };
        for observer in &self.observers {
            observer.on_in_flight(&started);
        }

        let tx = self.events_tx.clone();
        let future = match std::panic::catch_unwind(AssertUnwindSafe(operation)) {
            Ok(future) => future,
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                warn!(%id, %reason, "Task operation panicked while starting");
                let _ = tx.send(ActorEvent::Completed {
                    id,
                    outcome: Outcome::failure(reason),
                });
                return;
            }
        };

        tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(future).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(panic) => {
                    let reason = panic_message(panic.as_ref());
                    warn!(%id, %reason, "Task operation panicked");
                    Outcome::failure(reason)
                }
            };
            // The actor may have shut down; the completion is then dropped.
            let _ = tx.send(ActorEvent::Completed { id, outcome });
        });
    }

    fn drain(&mut self, epoch: u64) {
        self.drains_scheduled = self.drains_scheduled.saturating_sub(1);
        if epoch != self.drain_epoch || !self.state.is_drained() {
            debug!(epoch, current = self.drain_epoch, "Scheduler::drain: superseded, skipping");
            return;
        }

        self.metrics.total_drains += 1;
        let stats = self.state.stats();
        info!(?stats, "Queue drained");
        for observer in &self.observers {
            observer.on_drain(&stats);
        }
    }

    /// Push the current stats to watchers and return them
    fn publish(&mut self) -> QueueStats {
        let stats = self.state.stats();
        self.metrics.peak_in_flight = self.metrics.peak_in_flight.max(stats.num_in_flight);
        self.metrics.peak_pending = self.metrics.peak_pending.max(stats.num_pending);
        self.stats_tx.send_replace(stats);
        stats
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("task panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("task panicked: {}", s)
    } else {
        "task panicked".to_string()
    }
}
