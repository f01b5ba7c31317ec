//! # Application State
//!
//! Everything a route handler needs, built once at startup.
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  DokanConfig                                                            │
//! │      │                                                                  │
//! │      ├──► Store (settings, tracking, expenses, customers)               │
//! │      │       │                                                          │
//! │      │       ├──► RemoteSource ──► SyncEngine ──► SyncAgent (spawned)   │
//! │      │       │                        │   ▲                             │
//! │      │       │                        │   └── SmsAutomation (notifier)  │
//! │      │       │                        ▼                                 │
//! │      │       │                  SnapshotCache  ◄── read by the routes   │
//! │      │       │                                                          │
//! │      │       ├──► SteadfastClient, PathaoClient (courier proxies)       │
//! │      │                                                                  │
//! │      └──► SmsGateway ──► BulkSender                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use dokan_store::Store;
use dokan_sync::{
    BulkSender, CustomerSyncPolicy, DokanConfig, PathaoClient, RefreshReport, RemoteSource,
    SmsAutomation, SmsGateway, SmsSender, SteadfastClient, SyncAgentBuilder, SyncAgentHandle,
    SyncEngine, SyncEventEmitter, SyncResult, SyncStatus,
};

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub engine: SyncEngine,
    pub agent: SyncAgentHandle,
    pub source: Arc<RemoteSource>,
    pub steadfast: SteadfastClient,
    pub pathao: PathaoClient,
    pub bulk: BulkSender,
}

impl AppState {
    /// Builds every service from the configuration and starts the agent.
    ///
    /// The returned task finishes after [`SyncAgentHandle::shutdown`].
    pub fn from_config(config: &DokanConfig) -> SyncResult<(Self, JoinHandle<()>)> {
        let endpoints = config.endpoints.resolve()?;
        let store = Store::new(config.store_config()?)?;

        let source = Arc::new(RemoteSource::new(
            store.clone(),
            config.commerce_override(),
            config.sync.retry_policy(),
        ));

        let gateway: Arc<dyn SmsSender> =
            Arc::new(SmsGateway::new(store.client().clone(), endpoints.sms_relay));
        let automation = Arc::new(SmsAutomation::new(store.settings(), gateway.clone()));

        let emitter: Arc<dyn SyncEventEmitter> = Arc::new(TracingEmitter);
        let engine = SyncEngine::new(source.clone())
            .with_notifier(automation)
            .with_customer_sync(CustomerSyncPolicy::from(&config.sync))
            .with_emitter(emitter.clone());

        let agent = SyncAgentBuilder::new(engine.clone())
            .with_interval(config.sync.interval())
            .with_emitter(emitter)
            .build()?;
        let (handle, task) = agent.start();

        let state = AppState {
            engine,
            agent: handle,
            source,
            steadfast: SteadfastClient::new(store.clone(), endpoints.steadfast_proxy),
            pathao: PathaoClient::new(store, endpoints.pathao_proxy),
            bulk: BulkSender::new(gateway, config.bulk_delay()),
        };

        Ok((state, task))
    }

    pub fn store(&self) -> &Store {
        self.source.store()
    }
}

// =============================================================================
// Event Emitter
// =============================================================================

/// Writes agent events to the log. The daemon has no push channel; the
/// browser polls `/api/sync/status` instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEmitter;

impl SyncEventEmitter for TracingEmitter {
    fn emit_status(&self, status: &SyncStatus) {
        debug!(
            running = status.running,
            refreshing = status.refreshing,
            refreshes = status.refresh_count,
            failures = status.failed_count,
            "Sync status changed"
        );
    }

    fn emit_refresh_completed(&self, report: &RefreshReport) {
        info!(
            mode = ?report.mode,
            orders = report.orders,
            customers_synced = report.customers_synced,
            transitions = report.transitions.len(),
            has_config = report.has_config,
            "Refresh completed"
        );
    }

    fn emit_progress(&self, current: usize, total: usize) {
        debug!(current, total, "Syncing customers");
    }

    fn emit_error(&self, message: &str, retryable: bool) {
        if retryable {
            warn!(retryable, "Sync error: {}", message);
        } else {
            error!(retryable, "Sync error: {}", message);
        }
    }
}
