//! Metrics dashboard: formatted snapshot plus a cancellable polling task.

use std::sync::Arc;
use std::time::Duration;

use finrag_client::config::DEFAULT_REFRESH_INTERVAL_SECS;
use finrag_client::{ApiClient, ApiError, MetricsSnapshot, QueryCache};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub use finrag_client::metrics::MetricsDisplay;

#[derive(Debug, Clone, PartialEq)]
pub enum MetricsView {
    Loading,
    /// Latest successful snapshot; `refresh_error` is set when the last poll failed.
    Ready {
        display: MetricsDisplay,
        refresh_error: Option<String>,
    },
    Error(String),
}

pub struct MetricsPanel {
    client: ApiClient,
    cache: Arc<QueryCache>,
    interval: Duration,
}

impl MetricsPanel {
    /// A zero `interval` falls back to the default refresh period.
    pub fn new(client: ApiClient, cache: Arc<QueryCache>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            tracing::warn!("metrics refresh interval is zero, using the default");
            Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS)
        } else {
            interval
        };
        Self {
            client,
            cache,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetch a new snapshot, replacing the cached one on success.
    pub async fn refresh(&self) -> Result<Arc<MetricsSnapshot>, ApiError> {
        self.cache
            .refetch(|| self.client.fetch_metrics_summary())
            .await
    }

    pub fn view(&self) -> MetricsView {
        let snap = self.cache.snapshot::<MetricsSnapshot>();
        match (snap.data, snap.error) {
            (Some(data), refresh_error) => MetricsView::Ready {
                display: MetricsDisplay::from(data.as_ref()),
                refresh_error,
            },
            (None, Some(error)) => MetricsView::Error(error),
            (None, None) => MetricsView::Loading,
        }
    }

    /// Start polling: one fetch now, then one per interval until the poller is dropped.
    pub fn start_polling(&self) -> MetricsPoller {
        MetricsPoller::spawn(self.client.clone(), self.cache.clone(), self.interval)
    }
}

/// Background metrics refresh. Dropping it cancels the task.
pub struct MetricsPoller {
    handle: JoinHandle<()>,
    updates: watch::Receiver<u64>,
}

impl MetricsPoller {
    fn spawn(client: ApiClient, cache: Arc<QueryCache>, period: Duration) -> Self {
        let (tx, updates) = watch::channel(0u64);
        tracing::info!(period_secs = period.as_secs(), "metrics polling started");
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = cache.refetch(|| client.fetch_metrics_summary()).await {
                    tracing::warn!(error = %e, "metrics refresh failed");
                }
                tx.send_modify(|n| *n += 1);
            }
        });
        Self { handle, updates }
    }

    /// Number of completed polls, successful or not.
    pub fn polls(&self) -> u64 {
        *self.updates.borrow()
    }

    /// Wait for the next completed poll.
    pub async fn changed(&mut self) {
        if self.updates.changed().await.is_err() {
            // Task ended; nothing more will arrive.
            std::future::pending::<()>().await;
        }
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for MetricsPoller {
    fn drop(&mut self) {
        self.handle.abort();
        tracing::info!("metrics polling stopped");
    }
}
