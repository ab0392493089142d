//! Scheduler configuration

use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

/// Default number of simultaneously running tasks
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default capacity of the event broadcast channel
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Maximum number of simultaneously in-flight tasks
///
/// Any configured value that is zero, negative or not a number is treated
/// as [`ConcurrencyLimit::Unbounded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyLimit {
    /// No upper limit.
    Unbounded,

    /// At most this many tasks run at once.
    Max(NonZeroUsize),
}

impl ConcurrencyLimit {
    /// Normalize a raw configured value
    pub fn from_configured(value: i64) -> Self {
        usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self::Max)
            .unwrap_or(Self::Unbounded)
    }

    /// Whether another task may start with `in_flight` already running
    pub fn allows(&self, in_flight: usize) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Max(max) => in_flight < max.get(),
        }
    }

    /// The numeric limit, `None` when unbounded
    pub fn get(&self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::Max(max) => Some(max.get()),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl Default for ConcurrencyLimit {
    fn default() -> Self {
        Self::from(DEFAULT_CONCURRENCY)
    }
}

impl From<usize> for ConcurrencyLimit {
    fn from(value: usize) -> Self {
        NonZeroUsize::new(value).map(Self::Max).unwrap_or(Self::Unbounded)
    }
}

impl From<i64> for ConcurrencyLimit {
    fn from(value: i64) -> Self {
        Self::from_configured(value)
    }
}

impl From<i32> for ConcurrencyLimit {
    fn from(value: i32) -> Self {
        Self::from_configured(i64::from(value))
    }
}

impl fmt::Display for ConcurrencyLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => write!(f, "unbounded"),
            Self::Max(max) => write!(f, "{}", max),
        }
    }
}

// Unbounded round-trips as 0, which normalizes back to unbounded.
impl Serialize for ConcurrencyLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.get().unwrap_or(0) as u64)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLimit {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl<'de> Deserialize<'de> for ConcurrencyLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let limit = match RawLimit::deserialize(deserializer)? {
            RawLimit::Int(value) => Self::from_configured(value),
            RawLimit::Float(value) if value.is_finite() && value >= 1.0 => Self::from(value.ceil() as usize),
            RawLimit::Float(value) => {
                debug!(value, "ConcurrencyLimit::deserialize: float below 1, unbounded");
                Self::Unbounded
            }
            RawLimit::Text(text) => match text.trim().parse::<i64>() {
                Ok(value) => Self::from_configured(value),
                Err(_) => {
                    warn!(%text, "Non-numeric concurrency, running unbounded");
                    Self::Unbounded
                }
            },
            RawLimit::Other(_) => {
                warn!("Concurrency is not a scalar number, running unbounded");
                Self::Unbounded
            }
        };
        Ok(limit)
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Max simultaneously running tasks (<= 0 or non-numeric means unbounded)
    #[serde(default)]
    pub concurrency: ConcurrencyLimit,

    /// Buffer size of the event bus used by observers
    #[serde(rename = "event-capacity", default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: ConcurrencyLimit::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl SchedulerConfig {
    /// Config with the given concurrency and default everything else
    pub fn with_concurrency(concurrency: impl Into<ConcurrencyLimit>) -> Self {
        Self {
            concurrency: concurrency.into(),
            ..Default::default()
        }
    }
}
