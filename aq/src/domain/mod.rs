//! Domain types for asyncqueue
//!
//! A [`Task`] pairs a [`TaskId`] with a one-shot async operation. Running the
//! operation yields an [`Outcome`], which is either a success payload or a
//! failure message. Failures are ordinary results, not scheduler errors.

mod id;
mod outcome;
mod task;

pub use id::TaskId;
pub use outcome::Outcome;
pub use task::{Task, TaskOperation};
