//! Submitted unit of work

use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;

use super::{Outcome, TaskId};

/// One-shot async operation carried by a task
///
/// Calling it produces the future; the future does no work until it is
/// polled by the scheduler.
pub type TaskOperation = Box<dyn FnOnce() -> BoxFuture<'static, Outcome> + Send>;

/// A unit of submitted work: an identity plus an operation run at most once
pub struct Task {
    id: TaskId,
    operation: TaskOperation,
}

impl Task {
    /// Create a task from an operation returning `Result`
    ///
    /// `Ok` becomes [`Outcome::Success`], `Err` becomes [`Outcome::Failure`]
    /// carrying the error's display text.
    pub fn new<F, Fut, E>(id: impl Into<TaskId>, operation: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<serde_json::Value, E>> + Send + 'static,
        E: fmt::Display + 'static,
    {
        Self {
            id: id.into(),
            operation: Box::new(move || operation().map(Outcome::from).boxed()),
        }
    }

    /// Create a task from an operation that builds its own [`Outcome`]
    pub fn with_outcome<F, Fut>(id: impl Into<TaskId>, operation: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        Self {
            id: id.into(),
            operation: Box::new(move || operation().boxed()),
        }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    /// Split into id and operation; consuming the task keeps the operation one-shot
    pub(crate) fn into_parts(self) -> (TaskId, TaskOperation) {
        (self.id, self.operation)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("id", &self.id).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_result_operation_maps_to_outcome() {
        let task = Task::new(1, || async { Err::<serde_json::Value, _>("nope") });
        assert_eq!(task.id(), &TaskId::from(1));

        let (_, operation) = task.into_parts();
        assert_eq!(operation().await, Outcome::failure("nope"));
    }

    #[tokio::test]
    async fn test_outcome_operation_passes_through() {
        let task = Task::with_outcome("a", || async { Outcome::success("done") });
        let (id, operation) = task.into_parts();
        assert_eq!(id.as_str(), "a");
        assert_eq!(operation().await.value(), Some(&serde_json::json!("done")));
    }

    #[test]
    fn test_debug_hides_operation() {
        let task = Task::with_outcome("dbg", || async { Outcome::success(1) });
        let rendered = format!("{:?}", task);
        assert!(rendered.contains("dbg"));
    }
}
