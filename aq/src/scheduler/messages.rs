//! Requests processed by the scheduler actor

use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::{Outcome, Task, TaskId};

use super::config::ConcurrencyLimit;
use super::queue::{QueueStats, SchedulerMetrics};

/// Errors from talking to the scheduler
///
/// Task failures never show up here; they are delivered as [`Outcome::Failure`].
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Scheduler channel closed")]
    ChannelClosed,

    #[error("Scheduler shut down before replying")]
    NoReply,
}

/// Result alias for scheduler handle operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Requests to the scheduler actor, handled one at a time in arrival order
#[derive(Debug)]
pub enum SchedulerRequest {
    /// Enqueue a task (ignored if its id is pending or in flight)
    Submit { task: Task },

    /// Change the concurrency limit
    SetConcurrency { limit: ConcurrencyLimit },

    /// Stats after every earlier request has been applied
    GetStats { reply_tx: oneshot::Sender<QueueStats> },

    /// Lifetime metrics
    GetMetrics {
        reply_tx: oneshot::Sender<SchedulerMetrics>,
    },

    /// Stop the actor; running operations are not cancelled
    Shutdown,
}

/// Messages the actor receives from running operations and from itself
#[derive(Debug)]
pub(crate) enum ActorEvent {
    /// A running operation settled
    Completed { id: TaskId, outcome: Outcome },

    /// Deferred drain signal
    Drain { epoch: u64 },
}
