//! asyncqueue - bounded-concurrency async task queue
//!
//! Tasks are submitted with an id and a one-shot async operation. The
//! scheduler keeps at most a configured number of operations running,
//! starts pending tasks in submission order, ignores submissions whose id is
//! already pending or running, and tells observers when a task starts, when
//! it settles, and when the queue drains.
//!
//! # Modules
//!
//! - [`domain`] - Task ids, tasks and outcomes
//! - [`scheduler`] - The scheduler actor and its handle
//! - [`observer`] - Transition callbacks
//! - [`events`] - Broadcast event bus and JSONL event logger
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```rust,ignore
//! let handle = Scheduler::new(SchedulerConfig::with_concurrency(2usize))
//!     .with_observer(Callbacks::new().on_drain(|stats| println!("drained: {:?}", stats)))
//!     .spawn();
//! handle.submit(Task::new("fetch", || async { Ok::<_, String>(serde_json::json!(42)) }))?;
//! ```

pub mod cli;
pub mod config;
pub mod demo;
pub mod domain;
pub mod events;
pub mod observer;
pub mod scheduler;

// Re-export commonly used types
pub use config::Config;
pub use demo::DemoWorkload;
pub use domain::{Outcome, Task, TaskId, TaskOperation};
pub use events::{EventBus, EventLogEntry, EventLogger, QueueEvent};
pub use observer::{Callbacks, QueueObserver};
pub use scheduler::{
    CompletedTask, ConcurrencyLimit, InFlightTask, QueueStats, Scheduler, SchedulerConfig, SchedulerError,
    SchedulerHandle, SchedulerMetrics, SchedulerResult,
};
