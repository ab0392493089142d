//! Queue state and the snapshots handed to callers

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::domain::{Outcome, Task, TaskId};

use super::config::ConcurrencyLimit;

/// Counters visible to callers
///
/// `num_pending` and `num_in_flight` always equal the sizes of the pending and
/// in-flight collections when no transition is in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    #[serde(rename = "num-pending")]
    pub num_pending: usize,

    #[serde(rename = "num-in-flight")]
    pub num_in_flight: usize,

    #[serde(rename = "num-done")]
    pub num_done: usize,
}

impl QueueStats {
    /// Nothing pending and nothing running
    pub fn is_idle(&self) -> bool {
        self.num_pending == 0 && self.num_in_flight == 0
    }

    /// Every task ever accepted
    pub fn total(&self) -> usize {
        self.num_pending + self.num_in_flight + self.num_done
    }
}

/// Lifetime statistics for the scheduler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SchedulerMetrics {
    pub total_submitted: u64,
    pub total_duplicates: u64,
    pub total_succeeded: u64,
    pub total_failed: u64,
    pub total_drains: u64,
    pub peak_in_flight: usize,
    pub peak_pending: usize,
}

/// Payload of the in-flight notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlightTask {
    pub id: TaskId,
    /// Stats right after the task moved to in-flight
    pub stats: QueueStats,
}

/// Payload of the done notification
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedTask {
    pub id: TaskId,
    pub outcome: Outcome,
    /// Stats right after the task left in-flight
    pub stats: QueueStats,
    /// Time between start and settlement
    pub elapsed: Duration,
}

/// Pending and in-flight collections plus the done counter
///
/// Owned by the scheduler actor. Every method is a single transition and
/// leaves the counters consistent with the collections.
#[derive(Debug)]
pub(crate) struct QueueState {
    /// Oldest submission at the front
    pending: VecDeque<Task>,
    pending_ids: HashSet<TaskId>,
    /// Start time of every running task
    in_flight: HashMap<TaskId, Instant>,
    num_done: usize,
    /// Set once the current empty period has been signaled; cleared when a task starts
    drained: bool,
}

impl QueueState {
    pub(crate) fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            pending_ids: HashSet::new(),
            in_flight: HashMap::new(),
            num_done: 0,
            drained: true,
        }
    }

    pub(crate) fn stats(&self) -> QueueStats {
        QueueStats {
            num_pending: self.pending.len(),
            num_in_flight: self.in_flight.len(),
            num_done: self.num_done,
        }
    }

    /// Whether a task with this id is pending or running
    pub(crate) fn contains(&self, id: &TaskId) -> bool {
        self.pending_ids.contains(id) || self.in_flight.contains_key(id)
    }

    /// Append to pending; returns false (and drops the task) on a duplicate id
    pub(crate) fn enqueue(&mut self, task: Task) -> bool {
        if self.contains(task.id()) {
            return false;
        }
        self.pending_ids.insert(task.id().clone());
        self.pending.push_back(task);
        true
    }

    /// Move the oldest pending task to in-flight if the limit allows
    pub(crate) fn start_next(&mut self, limit: ConcurrencyLimit, now: Instant) -> Option<Task> {
        if !limit.allows(self.in_flight.len()) {
            return None;
        }
        let task = self.pending.pop_front()?;
        self.pending_ids.remove(task.id());
        self.in_flight.insert(task.id().clone(), now);
        self.drained = false;
        Some(task)
    }

    /// Move a running task to done, returning how long it ran
    pub(crate) fn complete(&mut self, id: &TaskId, now: Instant) -> Option<Duration> {
        let started = self.in_flight.remove(id)?;
        self.num_done += 1;
        Some(now.saturating_duration_since(started))
    }

    /// True once per empty period: something finished, nothing is left, not yet signaled
    pub(crate) fn take_drain(&mut self) -> bool {
        if self.drained || self.num_done == 0 || !self.pending.is_empty() || !self.in_flight.is_empty() {
            return false;
        }
        self.drained = true;
        true
    }

    /// Still empty and no task has started since the drain was taken
    pub(crate) fn is_drained(&self) -> bool {
        self.drained && self.pending.is_empty() && self.in_flight.is_empty()
    }
}
