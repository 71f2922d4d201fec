use crate::domain::recommendation::Recommendations;
use crate::recommend::ranker::Ranker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::{AbortHandle, JoinHandle};

#[derive(Debug, Clone)]
pub enum RecommendationOutcome {
    Ready(Recommendations),
    TimedOut(Duration),
    Cancelled,
    Failed(String),
}

impl RecommendationOutcome {
    /// Why recommendations cannot be shown, if they cannot.
    pub fn unavailable_reason(&self) -> Option<String> {
        match self {
            Self::Ready(recs) if recs.is_empty() => {
                Some("market data feed returned no usable series".to_string())
            }
            Self::Ready(_) => None,
            Self::TimedOut(after) => Some(format!("market data fetch timed out after {after:?}")),
            Self::Cancelled => Some("market data fetch was cancelled".to_string()),
            Self::Failed(msg) => Some(format!("market data fetch failed: {msg}")),
        }
    }
}

/// Ranking running off the caller's task, bounded by a timeout.
///
/// Dropping the task aborts the ranking along with its in-flight fetches.
pub struct RecommendationTask {
    rx: oneshot::Receiver<RecommendationOutcome>,
    handle: JoinHandle<()>,
}

impl RecommendationTask {
    pub fn spawn(ranker: Arc<Ranker>, timeout: Duration) -> Self {
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let t0 = std::time::Instant::now();
            let outcome = match tokio::time::timeout(timeout, ranker.recommend()).await {
                Ok(recs) => {
                    tracing::info!(
                        elapsed_ms = t0.elapsed().as_millis(),
                        skipped = recs.skipped_count(),
                        "recommendations ready"
                    );
                    RecommendationOutcome::Ready(recs)
                }
                Err(_) => {
                    tracing::warn!(?timeout, "recommendations timed out");
                    RecommendationOutcome::TimedOut(timeout)
                }
            };
            // The receiver may already be gone; nobody is waiting then.
            let _ = tx.send(outcome);
        });

        Self { rx, handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Lets another task cancel while this one awaits `outcome`.
    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.abort_handle()
    }

    pub async fn outcome(mut self) -> RecommendationOutcome {
        match (&mut self.rx).await {
            Ok(outcome) => outcome,
            Err(_) => match (&mut self.handle).await {
                Err(err) if err.is_cancelled() => RecommendationOutcome::Cancelled,
                Err(err) => RecommendationOutcome::Failed(err.to_string()),
                Ok(()) => RecommendationOutcome::Failed("task ended without a result".to_string()),
            },
        }
    }
}

impl Drop for RecommendationTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
