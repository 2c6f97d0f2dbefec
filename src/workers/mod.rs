pub mod session_reaper;

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::WorkerConfig;
use session_reaper::SessionReaper;

/// Background workers of this process, tied to the shutdown broadcast.
pub struct WorkerManager {
    session_reaper: Arc<SessionReaper>,
    shutdown_rx: broadcast::Receiver<()>,
    config: WorkerConfig,
}

impl WorkerManager {
    pub fn new(
        session_reaper: Arc<SessionReaper>,
        shutdown_rx: broadcast::Receiver<()>,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            session_reaper,
            shutdown_rx,
            config: config.clone(),
        }
    }

    /// Start enabled workers and keep them running until shutdown is broadcast.
    pub async fn run(mut self) {
        if !self.config.session_reaper_enabled {
            tracing::info!("Session reaper disabled; skipping worker startup");
            return;
        }

        self.session_reaper.start();
        tracing::info!("Worker manager started");

        let _ = self.shutdown_rx.recv().await;

        tracing::info!("Worker manager shutting down");
        self.session_reaper.stop_and_wait().await;
    }
}
