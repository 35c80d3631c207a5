use std::sync::Arc;
use std::time::Duration;

use tirta_client::ValveApi;
use tirta_core::FleetOverview;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::session::ValveSession;

/// Keeps one valve session fresh on a fixed cadence.
///
/// Refresh outcomes travel through the session's event channel; this
/// type only owns the loop.
pub struct StatusWatcher {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl StatusWatcher {
    /// Spawns the poll loop. The first fetch happens immediately.
    pub fn spawn<V: ValveApi>(session: ValveSession<V>, poll_interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            loop {
                tokio::select! {
                    _ = cancel_task.cancelled() => {
                        info!(valve = %session.valve(), "status watcher shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        session.refresh().await;
                    }
                }
            }
        });
        Self { cancel, handle }
    }

    /// Stops polling and waits for the loop to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}

/// Polls the fleet overview and publishes each result.
pub struct FleetWatcher {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    overview: watch::Receiver<Option<FleetOverview>>,
}

impl FleetWatcher {
    /// Spawns the poll loop. A failed fetch keeps the last good overview
    /// on the channel.
    pub fn spawn<V: ValveApi>(api: Arc<V>, poll_interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();
        let (tx, overview) = watch::channel(None);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            loop {
                tokio::select! {
                    _ = cancel_task.cancelled() => {
                        info!("fleet watcher shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match api.overview().await {
                            Ok(fresh) => {
                                tx.send_replace(Some(fresh));
                            }
                            Err(err) => {
                                warn!(error = %err, "fleet overview fetch failed, keeping last");
                            }
                        }
                    }
                }
            }
        });
        Self {
            cancel,
            handle,
            overview,
        }
    }

    /// Channel carrying the latest overview; `None` until the first
    /// successful fetch.
    pub fn subscribe(&self) -> watch::Receiver<Option<FleetOverview>> {
        self.overview.clone()
    }

    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}
