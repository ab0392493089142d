//! Event streaming for queue activity
//!
//! [`EventBus`] turns scheduler callbacks into a broadcast stream of
//! [`QueueEvent`]s. Consumers subscribe independently; [`EventLogger`]
//! is one such consumer and writes the stream to a JSONL file.
//!
//! ```rust,ignore
//! let bus = EventBus::new(1024);
//! let mut rx = bus.subscribe();
//! let handle = Scheduler::new(config).with_observer(bus.clone()).spawn();
//! while let Ok(event) = rx.recv().await {
//!     println!("{:?}", event);
//! }
//! ```

mod bus;
mod logger;
mod types;

pub use bus::EventBus;
pub use logger::{EventLogger, read_events, spawn_event_logger};
pub use types::{EventLogEntry, QueueEvent};
