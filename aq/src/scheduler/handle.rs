//! SchedulerHandle - Client interface for the scheduler actor

use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

use crate::domain::Task;

use super::config::ConcurrencyLimit;
use super::messages::{SchedulerError, SchedulerRequest, SchedulerResult};
use super::queue::{QueueStats, SchedulerMetrics};

/// Handle for submitting work to a running scheduler
///
/// Cheap to clone. Submission never waits: the request is queued on the
/// actor's channel and the call returns immediately.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::UnboundedSender<SchedulerRequest>,
    stats_rx: watch::Receiver<QueueStats>,
}

impl SchedulerHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<SchedulerRequest>, stats_rx: watch::Receiver<QueueStats>) -> Self {
        Self { tx, stats_rx }
    }

    /// Submit a task; ignored by the scheduler if its id is pending or in flight
    pub fn submit(&self, task: Task) -> SchedulerResult<()> {
        debug!(id = %task.id(), "SchedulerHandle::submit: called");
        self.send(SchedulerRequest::Submit { task })
    }

    /// Change the concurrency limit; running tasks are never interrupted
    pub fn set_concurrency(&self, limit: impl Into<ConcurrencyLimit>) -> SchedulerResult<()> {
        let limit = limit.into();
        debug!(%limit, "SchedulerHandle::set_concurrency: called");
        self.send(SchedulerRequest::SetConcurrency { limit })
    }

    /// Latest published stats
    ///
    /// Does not wait for earlier requests; use [`Self::snapshot`] for that.
    pub fn stats(&self) -> QueueStats {
        *self.stats_rx.borrow()
    }

    /// Receiver that observes every stats change
    pub fn subscribe_stats(&self) -> watch::Receiver<QueueStats> {
        self.stats_rx.clone()
    }

    /// Wait until the published stats satisfy `predicate`
    pub async fn wait_for(&self, mut predicate: impl FnMut(&QueueStats) -> bool) -> SchedulerResult<QueueStats> {
        debug!("SchedulerHandle::wait_for: called");
        let mut rx = self.stats_rx.clone();
        let stats = rx
            .wait_for(|stats| predicate(stats))
            .await
            .map_err(|_| SchedulerError::ChannelClosed)?;
        Ok(*stats)
    }

    /// Stats after every request sent before this call has been applied
    pub async fn snapshot(&self) -> SchedulerResult<QueueStats> {
        debug!("SchedulerHandle::snapshot: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SchedulerRequest::GetStats { reply_tx })?;
        reply_rx.await.map_err(|_| SchedulerError::NoReply)
    }

    /// Lifetime metrics
    pub async fn metrics(&self) -> SchedulerResult<SchedulerMetrics> {
        debug!("SchedulerHandle::metrics: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SchedulerRequest::GetMetrics { reply_tx })?;
        reply_rx.await.map_err(|_| SchedulerError::NoReply)
    }

    /// Stop the scheduler after the requests already queued
    pub fn shutdown(&self) -> SchedulerResult<()> {
        debug!("SchedulerHandle::shutdown: called");
        self.send(SchedulerRequest::Shutdown)
    }

    /// Whether the scheduler has stopped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, req: SchedulerRequest) -> SchedulerResult<()> {
        self.tx.send(req).map_err(|_| SchedulerError::ChannelClosed)
    }
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("stats", &self.stats())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closed_channel_errors() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (_stats_tx, stats_rx) = watch::channel(QueueStats::default());
        let handle = SchedulerHandle::new(tx, stats_rx);
        drop(rx);

        assert!(handle.is_closed());
        assert!(matches!(handle.shutdown(), Err(SchedulerError::ChannelClosed)));
        assert!(matches!(handle.snapshot().await, Err(SchedulerError::ChannelClosed)));
    }

    #[tokio::test]
    async fn test_dropped_reply_is_no_reply() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (_stats_tx, stats_rx) = watch::channel(QueueStats::default());
        let handle = SchedulerHandle::new(tx, stats_rx);

        tokio::spawn(async move {
            // Receive and drop the request without replying.
            let _ = rx.recv().await;
        });
        assert!(matches!(handle.metrics().await, Err(SchedulerError::NoReply)));
    }

    #[tokio::test]
    async fn test_wait_for_sees_published_stats() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let (stats_tx, stats_rx) = watch::channel(QueueStats::default());
        let handle = SchedulerHandle::new(tx, stats_rx);

        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.wait_for(|s| s.num_done == 2).await })
        };
        stats_tx.send_replace(QueueStats { num_pending: 0, num_in_flight: 1, num_done: 1 });
        stats_tx.send_replace(QueueStats { num_pending: 0, num_in_flight: 0, num_done: 2 });

        let stats = waiter.await.unwrap().unwrap();
        assert_eq!(stats.num_done, 2);
        assert_eq!(handle.stats().num_done, 2);
    }
}
