//! Simulated workload used by `aq run`

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Task, TaskId};

/// Shape of the simulated workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoWorkload {
    /// Number of distinct tasks to submit
    pub tasks: usize,

    /// Base run time of each task
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Random extra run time, up to this many milliseconds
    #[serde(rename = "jitter-ms")]
    pub jitter_ms: u64,

    /// Every n-th task fails (0 = none)
    #[serde(rename = "fail-every")]
    pub fail_every: usize,

    /// Submit every task a second time right after the first
    pub duplicates: bool,
}

impl Default for DemoWorkload {
    fn default() -> Self {
        Self {
            tasks: 10,
            delay_ms: 1000,
            jitter_ms: 0,
            fail_every: 0,
            duplicates: false,
        }
    }
}

impl DemoWorkload {
    /// Id of the task at `index`
    pub fn task_id(index: usize) -> TaskId {
        TaskId::new(format!("task-{}", index))
    }

    /// Whether the task at `index` is scheduled to fail
    pub fn fails(&self, index: usize) -> bool {
        self.fail_every > 0 && (index + 1) % self.fail_every == 0
    }

    /// Build the submission sequence, duplicates included
    pub fn tasks(&self) -> Vec<Task> {
        debug!(?self, "DemoWorkload::tasks: called");
        let mut rng = rand::rng();
        let copies = if self.duplicates { 2 } else { 1 };
        let mut out = Vec::with_capacity(self.tasks * copies);

        for index in 0..self.tasks {
            for _ in 0..copies {
                let jitter = if self.jitter_ms > 0 {
                    rng.random_range(0..=self.jitter_ms)
                } else {
                    0
                };
                out.push(self.task(index, self.delay_ms + jitter));
            }
        }
        out
    }

    fn task(&self, index: usize, sleep_ms: u64) -> Task {
        let fails = self.fails(index);
        Task::new(Self::task_id(index), move || async move {
            tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
            if fails {
                Err(format!("task-{} failed after {}ms", index, sleep_ms))
            } else {
                Ok(serde_json::json!({ "index": index, "slept-ms": sleep_ms }))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_every() {
        let workload = DemoWorkload {
            fail_every: 3,
            ..Default::default()
        };
        let failing: Vec<_> = (0..9).filter(|i| workload.fails(*i)).collect();
        assert_eq!(failing, vec![2, 5, 8]);
        assert!(!DemoWorkload::default().fails(0));
    }

    #[test]
    fn test_duplicates_double_the_submissions() {
        let workload = DemoWorkload {
            tasks: 4,
            duplicates: true,
            ..Default::default()
        };
        let tasks = workload.tasks();
        assert_eq!(tasks.len(), 8);
        assert_eq!(tasks[0].id(), tasks[1].id());
        assert_eq!(tasks[2].id(), &DemoWorkload::task_id(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_outcomes() {
        let workload = DemoWorkload {
            tasks: 2,
            delay_ms: 10,
            fail_every: 2,
            ..Default::default()
        };
        let mut tasks = workload.tasks().into_iter();

        let (_, op) = tasks.next().unwrap().into_parts();
        assert_eq!(op().await.value().unwrap()["slept-ms"], 10);

        let (_, op) = tasks.next().unwrap().into_parts();
        assert_eq!(op().await.error(), Some("task-1 failed after 10ms"));
    }
}
