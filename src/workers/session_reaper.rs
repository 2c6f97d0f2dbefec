//! Periodic deletion of expired authentication sessions.
//!
//! The reaper owns its schedule: `start` spawns the timer task and keeps its
//! handle, `stop` signals it and clears the handle. A pass that is already
//! running when `stop` is called finishes normally.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::store::{Store, StoreError};

/// Shortest accepted interval; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Delete every expired session once. Only non-zero results are logged.
pub fn cleanup_pass(store: &Store) -> Result<u64, StoreError> {
    let deleted = store.delete_expired_sessions(Utc::now())?;
    if deleted > 0 {
        tracing::info!(deleted, "session_reaper: removed expired sessions");
    }
    Ok(deleted)
}

struct ReaperTask {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct SessionReaper {
    store: Arc<Store>,
    interval: Duration,
    task: Mutex<Option<ReaperTask>>,
    scheduled_passes: Arc<AtomicU64>,
}

impl SessionReaper {
    pub fn new(store: Arc<Store>, interval: Duration) -> Self {
        Self {
            store,
            interval: interval.max(MIN_INTERVAL),
            task: Mutex::new(None),
            scheduled_passes: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Begin the schedule: one pass right away, then one per interval.
    /// Calling it again while running does nothing. Must be called from
    /// within a tokio runtime.
    pub fn start(&self) {
        let mut task = self.lock_task();
        if task.is_some() {
            tracing::info!("session_reaper: already running");
            return;
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let store = self.store.clone();
        let passes = self.scheduled_passes.clone();
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    // Err means the reaper itself was dropped.
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                if let Err(e) = cleanup_pass(&store) {
                    tracing::error!(error = %e, "session_reaper: scheduled pass failed");
                }
                passes.fetch_add(1, Ordering::SeqCst);
            }

            tracing::debug!("session_reaper: schedule ended");
        });

        *task = Some(ReaperTask { stop_tx, handle });
        tracing::info!(interval_secs = period.as_secs(), "session_reaper: started");
    }

    /// Cancel future passes. No-op if not running.
    pub fn stop(&self) {
        if let Some(task) = self.take_task() {
            let _ = task.stop_tx.send(true);
            tracing::info!("session_reaper: stopped");
        }
    }

    /// Like [`SessionReaper::stop`], but waits for an in-flight pass to finish.
    pub async fn stop_and_wait(&self) {
        let Some(task) = self.take_task() else {
            return;
        };
        let _ = task.stop_tx.send(true);
        if let Err(e) = task.handle.await {
            tracing::error!(error = %e, "session_reaper: task panicked");
        }
        tracing::info!("session_reaper: stopped");
    }

    /// Run one pass on demand. Unlike scheduled passes, errors are returned.
    pub fn trigger(&self) -> Result<u64, StoreError> {
        cleanup_pass(&self.store).map_err(|e| {
            tracing::error!(error = %e, "session_reaper: manual pass failed");
            e
        })
    }

    pub fn is_running(&self) -> bool {
        self.lock_task().is_some()
    }

    /// Number of scheduled passes completed since construction.
    pub fn scheduled_passes(&self) -> u64 {
        self.scheduled_passes.load(Ordering::SeqCst)
    }

    fn take_task(&self) -> Option<ReaperTask> {
        self.lock_task().take()
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<ReaperTask>> {
        self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for SessionReaper {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;
    use tracing::Level;

    use super::*;
    use crate::store::operations::sessions::Session;
    use crate::test_support::{capture_logs, capture_logs_at, temp_store};

    const HOUR: Duration = Duration::from_secs(3600);

    fn session(token_hash: &str, expires_in_hours: i64) -> Session {
        Session {
            token_hash: token_hash.to_string(),
            user_id: "u1".to_string(),
            created_at: Utc::now(),
            expires_at: Utc::now() + ChronoDuration::hours(expires_in_hours),
        }
    }

    /// Let spawned tasks run up to their next await point.
    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn pass_without_expired_sessions_is_silent() {
        let (_dir, store) = temp_store("reaper-silent");
        store.create_session(&session("alive", 1)).unwrap();

        let (deleted, logs) = capture_logs_at(Level::TRACE, || cleanup_pass(&store).unwrap());

        assert_eq!(deleted, 0);
        assert!(logs.is_empty(), "unexpected logs: {logs}");
        assert_eq!(store.count_sessions().unwrap(), 1);
    }

    #[test]
    fn pass_deletes_exactly_the_expired_sessions() {
        let (_dir, store) = temp_store("reaper-expired");
        for i in 0..3 {
            store.create_session(&session(&format!("expired-{i}"), -1)).unwrap();
        }
        store.create_session(&session("alive", 1)).unwrap();
        let reaper = SessionReaper::new(store.clone(), HOUR);

        let (deleted, logs) = capture_logs(|| reaper.trigger().unwrap());

        assert_eq!(deleted, 3);
        assert!(logs.contains("removed expired sessions"));
        assert_eq!(store.count_sessions().unwrap(), 1);
        assert!(store.get_session("alive").unwrap().is_some());
    }

    #[test]
    fn manual_trigger_skips_corrupt_rows() {
        let (_dir, store) = temp_store("reaper-corrupt");
        store.sessions.insert("garbage", "not json").unwrap();
        store.create_session(&session("expired", -1)).unwrap();
        let reaper = SessionReaper::new(store.clone(), HOUR);

        let (result, logs) = capture_logs(|| reaper.trigger());

        assert_eq!(result.unwrap(), 1);
        assert!(logs.contains("Skipping undecodable session row"));
        assert!(!logs.contains("manual pass failed"));
        assert!(store.sessions.get("garbage").unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn start_runs_immediately_then_every_interval() {
        let (_dir, store) = temp_store("reaper-schedule");
        store.create_session(&session("expired", -1)).unwrap();
        let reaper = SessionReaper::new(store.clone(), HOUR);

        reaper.start();
        settle().await;
        assert!(reaper.is_running());
        assert_eq!(reaper.scheduled_passes(), 1);
        assert_eq!(store.count_sessions().unwrap(), 0);

        tokio::time::advance(HOUR / 2).await;
        settle().await;
        assert_eq!(reaper.scheduled_passes(), 1);

        tokio::time::advance(HOUR / 2).await;
        settle().await;
        assert_eq!(reaper.scheduled_passes(), 2);

        reaper.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_keeps_a_single_schedule() {
        let (_dir, store) = temp_store("reaper-double-start");
        let reaper = SessionReaper::new(store, HOUR);

        reaper.start();
        reaper.start();
        settle().await;
        assert_eq!(reaper.scheduled_passes(), 1);

        tokio::time::advance(HOUR).await;
        settle().await;
        assert_eq!(reaper.scheduled_passes(), 2);

        tokio::time::advance(HOUR).await;
        settle().await;
        assert_eq!(reaper.scheduled_passes(), 3);

        reaper.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_without_start_is_noop() {
        let (_dir, store) = temp_store("reaper-stop-idle");
        let reaper = SessionReaper::new(store, HOUR);

        reaper.stop();
        reaper.stop();
        assert!(!reaper.is_running());

        tokio::time::advance(HOUR * 3).await;
        settle().await;
        assert_eq!(reaper.scheduled_passes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_future_passes_and_allows_restart() {
        let (_dir, store) = temp_store("reaper-stop");
        let reaper = SessionReaper::new(store, HOUR);

        reaper.start();
        settle().await;
        reaper.stop();
        assert!(!reaper.is_running());

        tokio::time::advance(HOUR * 3).await;
        settle().await;
        assert_eq!(reaper.scheduled_passes(), 1);

        reaper.start();
        settle().await;
        assert_eq!(reaper.scheduled_passes(), 2);
        reaper.stop_and_wait().await;
        assert!(!reaper.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn corrupt_row_does_not_block_scheduled_deletions() {
        let (_dir, store) = temp_store("reaper-scheduled-corrupt");
        store.sessions.insert("garbage", "not json").unwrap();
        store.create_session(&session("expired", -1)).unwrap();
        let reaper = SessionReaper::new(store.clone(), HOUR);

        reaper.start();
        settle().await;
        assert!(store.get_session("expired").unwrap().is_none());
        assert_eq!(store.count_sessions().unwrap(), 1);

        store.create_session(&session("later", -1)).unwrap();
        tokio::time::advance(HOUR).await;
        settle().await;

        assert!(reaper.is_running());
        assert_eq!(reaper.scheduled_passes(), 2);
        assert_eq!(store.count_sessions().unwrap(), 1);
        reaper.stop();
    }

    #[test]
    fn zero_interval_is_clamped() {
        let (_dir, store) = temp_store("reaper-zero");
        let reaper = SessionReaper::new(store, Duration::ZERO);
        assert_eq!(reaper.interval(), MIN_INTERVAL);
    }
}
