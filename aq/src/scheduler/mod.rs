//! Bounded-concurrency scheduler
//!
//! The scheduler accepts tasks keyed by id, runs at most a configured number
//! of them at once, and reports three transitions to its observers:
//! - **In flight:** a task left pending and its operation is about to start
//! - **Done:** a running task settled, successfully or not
//! - **Drain:** the queue emptied after doing work
//!
//! Pending tasks start in submission order.

mod config;
mod core;
mod handle;
mod messages;
mod queue;

pub use config::{ConcurrencyLimit, DEFAULT_CONCURRENCY, DEFAULT_EVENT_CAPACITY, SchedulerConfig};
pub use core::Scheduler;
pub use handle::SchedulerHandle;
pub use messages::{SchedulerError, SchedulerRequest, SchedulerResult};
pub use queue::{CompletedTask, InFlightTask, QueueStats, SchedulerMetrics};
