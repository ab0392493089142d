//! Event types for queue activity streaming

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Outcome, TaskId};
use crate::scheduler::{CompletedTask, InFlightTask, QueueStats};

/// Observable queue transitions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QueueEvent {
    /// A task moved to in-flight
    TaskStarted { task_id: TaskId, stats: QueueStats },

    /// A task settled
    TaskCompleted {
        task_id: TaskId,
        outcome: Outcome,
        elapsed_ms: u64,
        stats: QueueStats,
    },

    /// The queue emptied after completing work
    QueueDrained { stats: QueueStats },
}

impl QueueEvent {
    /// Task the event is about, `None` for queue-wide events
    pub fn task_id(&self) -> Option<&TaskId> {
        match self {
            QueueEvent::TaskStarted { task_id, .. } | QueueEvent::TaskCompleted { task_id, .. } => Some(task_id),
            QueueEvent::QueueDrained { .. } => None,
        }
    }

    /// Stats attached to the event
    pub fn stats(&self) -> &QueueStats {
        match self {
            QueueEvent::TaskStarted { stats, .. }
            | QueueEvent::TaskCompleted { stats, .. }
            | QueueEvent::QueueDrained { stats } => stats,
        }
    }

    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            QueueEvent::TaskStarted { .. } => "TaskStarted",
            QueueEvent::TaskCompleted { .. } => "TaskCompleted",
            QueueEvent::QueueDrained { .. } => "QueueDrained",
        }
    }
}

impl From<&InFlightTask> for QueueEvent {
    fn from(task: &InFlightTask) -> Self {
        QueueEvent::TaskStarted {
            task_id: task.id.clone(),
            stats: task.stats,
        }
    }
}

impl From<&CompletedTask> for QueueEvent {
    fn from(task: &CompletedTask) -> Self {
        QueueEvent::TaskCompleted {
            task_id: task.id.clone(),
            outcome: task.outcome.clone(),
            elapsed_ms: u64::try_from(task.elapsed.as_millis()).unwrap_or(u64::MAX),
            stats: task.stats,
        }
    }
}

/// A timestamped event log entry for file persistence
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventLogEntry {
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    pub event: QueueEvent,
}

impl EventLogEntry {
    /// Create a new log entry with current timestamp
    pub fn new(event: QueueEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}
