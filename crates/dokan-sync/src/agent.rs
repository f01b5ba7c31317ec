//! # Sync Agent
//!
//! Long-running task that keeps the snapshot fresh.
//!
//! ## Agent Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SyncAgent::run                                 │
//! │                                                                         │
//! │  startup ──► refresh(Foreground)                                        │
//! │                                                                         │
//! │  loop select! {                                                         │
//! │     interval.tick()      ──► refresh(Background)                        │
//! │     command_rx.recv()    ──► refresh(mode), reply on oneshot            │
//! │     shutdown_rx.recv()   ──► break                                      │
//! │  }                                                                      │
//! │                                                                         │
//! │  Refreshes never overlap: the loop runs one at a time.                  │
//! │                                                                         │
//! │  EVENTS (to the emitter):                                               │
//! │  ────────────────────────                                               │
//! │  status changed     - SyncStatus after every refresh                    │
//! │  refresh completed  - RefreshReport                                     │
//! │  progress           - customer upserts done / total                     │
//! │  error              - message, retryable                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::engine::{RefreshMode, RefreshReport, SyncEngine};
use crate::error::{SyncError, SyncResult};

// =============================================================================
// Sync Status
// =============================================================================

/// Current agent status for external queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    /// The loop is alive.
    pub running: bool,

    /// A refresh is in progress.
    pub refreshing: bool,

    pub last_refresh_at: Option<DateTime<Utc>>,

    /// Last refresh error message (cleared by a successful refresh).
    pub last_error: Option<String>,

    pub refresh_count: u64,
    pub failed_count: u64,

    /// Commerce credentials were present at the last refresh.
    pub has_config: bool,
}

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Receives agent events (a UI bridge, a log sink, a test probe).
pub trait SyncEventEmitter: Send + Sync {
    fn emit_status(&self, status: &SyncStatus);

    fn emit_refresh_completed(&self, report: &RefreshReport);

    /// Customer upsert progress during a foreground refresh.
    fn emit_progress(&self, current: usize, total: usize);

    fn emit_error(&self, message: &str, retryable: bool);
}

/// Emitter that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpEmitter;

impl SyncEventEmitter for NoOpEmitter {
    fn emit_status(&self, _status: &SyncStatus) {}
    fn emit_refresh_completed(&self, _report: &RefreshReport) {}
    fn emit_progress(&self, _current: usize, _total: usize) {}
    fn emit_error(&self, _message: &str, _retryable: bool) {}
}

// =============================================================================
// Sync Agent
// =============================================================================

enum AgentCommand {
    Refresh {
        mode: RefreshMode,
        reply: oneshot::Sender<SyncResult<RefreshReport>>,
    },
}

/// Periodic refresh runner.
pub struct SyncAgent {
    engine: SyncEngine,
    interval: Duration,
    status: Arc<RwLock<SyncStatus>>,
    emitter: Arc<dyn SyncEventEmitter>,
}

impl SyncAgent {
    /// Spawns the agent loop and returns its handle.
    pub fn start(self) -> (SyncAgentHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let handle = SyncAgentHandle {
            command_tx,
            shutdown_tx,
            status: self.status.clone(),
        };

        info!(interval_secs = self.interval.as_secs(), "Starting sync agent");
        let task = tokio::spawn(self.run(command_rx, shutdown_rx));
        (handle, task)
    }

    async fn run(
        self,
        mut command_rx: mpsc::Receiver<AgentCommand>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        self.status.write().await.running = true;

        let _ = self.refresh(RefreshMode::Foreground).await;

        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let _ = self.refresh(RefreshMode::Background).await;
                }

                Some(command) = command_rx.recv() => match command {
                    AgentCommand::Refresh { mode, reply } => {
                        let result = self.refresh(mode).await;
                        if reply.send(result).is_err() {
                            debug!("Refresh requester went away");
                        }
                    }
                },

                _ = shutdown_rx.recv() => {
                    info!("Sync agent received shutdown");
                    break;
                }
            }
        }

        let mut status = self.status.write().await;
        status.running = false;
        status.refreshing = false;
        self.emitter.emit_status(&status);
        info!("Sync agent stopped");
    }

    /// Runs one refresh and folds the outcome into the status.
    async fn refresh(&self, mode: RefreshMode) -> SyncResult<RefreshReport> {
        self.status.write().await.refreshing = true;
        let result = self.engine.refresh(mode).await;

        let snapshot = {
            let mut status = self.status.write().await;
            status.refreshing = false;
            match &result {
                Ok(report) => {
                    status.refresh_count += 1;
                    status.last_refresh_at = Some(Utc::now());
                    status.last_error = None;
                    status.has_config = report.has_config;
                }
                Err(SyncError::StaleRefresh) => {
                    debug!("Refresh superseded by a newer snapshot");
                }
                Err(e) => {
                    status.failed_count += 1;
                    status.last_error = Some(e.to_string());
                }
            }
            status.clone()
        };

        match &result {
            Ok(report) => self.emitter.emit_refresh_completed(report),
            Err(SyncError::StaleRefresh) => {}
            Err(e) => {
                error!(?mode, error = %e, "Refresh failed");
                self.emitter.emit_error(&e.to_string(), e.is_retryable());
            }
        }
        self.emitter.emit_status(&snapshot);
        result
    }
}

// =============================================================================
// Agent Handle (for external control)
// =============================================================================

/// Handle for controlling a running agent, cheap to clone.
#[derive(Clone)]
pub struct SyncAgentHandle {
    command_tx: mpsc::Sender<AgentCommand>,
    shutdown_tx: mpsc::Sender<()>,
    status: Arc<RwLock<SyncStatus>>,
}

impl SyncAgentHandle {
    pub async fn status(&self) -> SyncStatus {
        self.status.read().await.clone()
    }

    /// Queues a refresh and waits for it to finish.
    pub async fn refresh_now(&self, mode: RefreshMode) -> SyncResult<RefreshReport> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(AgentCommand::Refresh { mode, reply })
            .await
            .map_err(|_| SyncError::ShuttingDown)?;
        response
            .await
            .map_err(|e| SyncError::ChannelError(e.to_string()))?
    }

    /// Signals the agent to shut down gracefully.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for [`SyncAgent`].
pub struct SyncAgentBuilder {
    engine: SyncEngine,
    interval: Duration,
    emitter: Option<Arc<dyn SyncEventEmitter>>,
}

impl SyncAgentBuilder {
    pub fn new(engine: SyncEngine) -> Self {
        SyncAgentBuilder {
            engine,
            interval: Duration::from_secs(300),
            emitter: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the event emitter; the engine reports progress to it too.
    pub fn with_emitter(mut self, emitter: Arc<dyn SyncEventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn build(self) -> SyncResult<SyncAgent> {
        if self.interval.is_zero() {
            return Err(SyncError::InvalidConfig(
                "Refresh interval must be greater than 0".into(),
            ));
        }

        let emitter = self.emitter.unwrap_or_else(|| Arc::new(NoOpEmitter));
        Ok(SyncAgent {
            engine: self.engine.with_emitter(emitter.clone()),
            interval: self.interval,
            status: Arc::new(RwLock::new(SyncStatus::default())),
            emitter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::order;
    use crate::engine::tests::FakeSource;
    use dokan_core::OrderStatus;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEmitter {
        reports: Mutex<Vec<RefreshMode>>,
        errors: Mutex<Vec<String>>,
        progress: Mutex<Vec<(usize, usize)>>,
    }

    impl SyncEventEmitter for RecordingEmitter {
        fn emit_status(&self, _status: &SyncStatus) {}

        fn emit_refresh_completed(&self, report: &RefreshReport) {
            self.reports.lock().unwrap().push(report.mode);
        }

        fn emit_progress(&self, current: usize, total: usize) {
            self.progress.lock().unwrap().push((current, total));
        }

        fn emit_error(&self, message: &str, _retryable: bool) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    fn agent(source: Arc<FakeSource>, emitter: Arc<RecordingEmitter>) -> SyncAgent {
        SyncAgentBuilder::new(SyncEngine::new(source))
            .with_interval(Duration::from_secs(60))
            .with_emitter(emitter)
            .build()
            .unwrap()
    }

    #[test]
    fn test_sync_status_default() {
        let status = SyncStatus::default();
        assert!(!status.running);
        assert_eq!(status.refresh_count, 0);
        assert!(status.last_error.is_none());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = SyncAgentBuilder::new(SyncEngine::new(Arc::new(FakeSource::default())))
            .with_interval(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(SyncError::InvalidConfig(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_foreground_then_background_ticks() {
        let orders = (1..=6).map(|i| order(&i.to_string(), OrderStatus::Pending)).collect();
        let source = Arc::new(FakeSource::with_orders(orders));
        let emitter = Arc::new(RecordingEmitter::default());
        let (handle, task) = agent(source, emitter.clone()).start();

        tokio::time::sleep(Duration::from_secs(130)).await;
        handle.shutdown().await;
        task.await.unwrap();

        let reports = emitter.reports.lock().unwrap().clone();
        assert_eq!(
            reports,
            [RefreshMode::Foreground, RefreshMode::Background, RefreshMode::Background]
        );
        assert_eq!(emitter.progress.lock().unwrap().last(), Some(&(6, 6)));

        let status = handle.status().await;
        assert!(!status.running);
        assert_eq!(status.refresh_count, 3);
        assert!(status.has_config);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_now_waits_for_result() {
        let source = Arc::new(FakeSource::with_orders(vec![order("1", OrderStatus::Pending)]));
        let (handle, task) = agent(source, Arc::new(RecordingEmitter::default())).start();

        let report = handle.refresh_now(RefreshMode::Foreground).await.unwrap();
        assert_eq!(report.orders, 1);

        handle.shutdown().await;
        task.await.unwrap();
        assert!(matches!(
            handle.refresh_now(RefreshMode::Background).await,
            Err(SyncError::ShuttingDown)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_recorded() {
        let source = Arc::new(FakeSource::with_orders(vec![order("1", OrderStatus::Pending)]));
        source.fail_products.store(true, Ordering::SeqCst);
        let emitter = Arc::new(RecordingEmitter::default());
        let (handle, task) = agent(source.clone(), emitter.clone()).start();

        assert!(handle.refresh_now(RefreshMode::Background).await.is_err());
        let status = handle.status().await;
        assert_eq!(status.failed_count, 2);
        assert!(status.last_error.is_some());

        source.fail_products.store(false, Ordering::SeqCst);
        handle.refresh_now(RefreshMode::Background).await.unwrap();
        assert!(handle.status().await.last_error.is_none());
        assert_eq!(emitter.errors.lock().unwrap().len(), 2);

        handle.shutdown().await;
        task.await.unwrap();
    }
}
