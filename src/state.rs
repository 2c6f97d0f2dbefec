use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::services::starter_content::StarterContentService;
use crate::store::Store;
use crate::workers::session_reaper::SessionReaper;

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    starter: Arc<StarterContentService>,
    reaper: Arc<SessionReaper>,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<Store>,
        starter: Arc<StarterContentService>,
        reaper: Arc<SessionReaper>,
        config: &Config,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            store,
            starter,
            reaper,
            config: Arc::new(config.clone()),
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn starter(&self) -> &StarterContentService {
        &self.starter
    }

    pub fn reaper(&self) -> &Arc<SessionReaper> {
        &self.reaper
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
