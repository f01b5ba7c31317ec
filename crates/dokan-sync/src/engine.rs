//! # Sync Engine
//!
//! One refresh of the shop: fetch everything, reconcile courier state,
//! commit a snapshot, and fire automations for orders whose status moved.
//!
//! ## Refresh Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  begin_refresh ──► ticket                                               │
//! │        │                                                                │
//! │        ▼  try_join!  (any failure discards the refresh)                 │
//! │  orders · products · expenses · categories · tracking                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  overlay_tracking → enrich_images → sort_newest_first                   │
//! │        │                                                                │
//! │        ├── Foreground only: upsert customers in paced batches           │
//! │        ▼                                                                │
//! │  customers → stats → cache.commit(ticket) → transitions                 │
//! │        │                                                                │
//! │        ▼  spawned, never awaited by the caller                          │
//! │  StatusNotifier::notify(order, new_status) for each transition          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use dokan_core::reconcile::{enrich_images, overlay_tracking, sort_newest_first};
use dokan_core::{CoreError, Order, OrderStatus, StatusTransition};
use dokan_store::CustomerUpsert;

use crate::agent::{NoOpEmitter, SyncEventEmitter};
use crate::cache::{Snapshot, SnapshotCache};
use crate::config::SyncSettings;
use crate::error::{SyncError, SyncResult};
use crate::source::{NoOpNotifier, OrderSource, StatusNotifier};

/// Whether a refresh was asked for by the operator or by the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshMode {
    /// Full refresh including the customer upsert pass.
    Foreground,
    /// Periodic poll; skips customer upserts.
    Background,
}

/// Outcome of a committed refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub mode: RefreshMode,
    pub orders: usize,
    pub customers_synced: usize,
    pub transitions: Vec<StatusTransition>,
    pub has_config: bool,
}

/// Customer upsert pacing.
#[derive(Debug, Clone, Copy)]
pub struct CustomerSyncPolicy {
    pub limit: usize,
    pub batch_size: usize,
    pub pause: Duration,
}

impl Default for CustomerSyncPolicy {
    fn default() -> Self {
        CustomerSyncPolicy::from(&SyncSettings::default())
    }
}

impl From<&SyncSettings> for CustomerSyncPolicy {
    fn from(settings: &SyncSettings) -> Self {
        CustomerSyncPolicy {
            limit: settings.customer_sync_limit,
            batch_size: settings.customer_batch_size.max(1),
            pause: Duration::from_millis(settings.customer_batch_pause_ms),
        }
    }
}

/// Upper bound on one platform status push.
pub const DEFAULT_PUSH_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs refreshes and manual status edits against one cache.
#[derive(Clone)]
pub struct SyncEngine {
    source: Arc<dyn OrderSource>,
    notifier: Arc<dyn StatusNotifier>,
    cache: Arc<SnapshotCache>,
    emitter: Arc<dyn SyncEventEmitter>,
    customers: CustomerSyncPolicy,
    push_timeout: Duration,
}

impl SyncEngine {
    pub fn new(source: Arc<dyn OrderSource>) -> Self {
        SyncEngine {
            source,
            notifier: Arc::new(NoOpNotifier),
            cache: Arc::new(SnapshotCache::new()),
            emitter: Arc::new(NoOpEmitter),
            customers: CustomerSyncPolicy::default(),
            push_timeout: DEFAULT_PUSH_TIMEOUT,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn StatusNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_cache(mut self, cache: Arc<SnapshotCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn SyncEventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn with_customer_sync(mut self, policy: CustomerSyncPolicy) -> Self {
        self.customers = policy;
        self
    }

    pub fn with_push_timeout(mut self, timeout: Duration) -> Self {
        self.push_timeout = timeout;
        self
    }

    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    pub fn source(&self) -> &Arc<dyn OrderSource> {
        &self.source
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Fetches, reconciles and commits a new snapshot.
    ///
    /// Nothing is committed when any fetch fails. Automations for the
    /// returned transitions are already running when this returns.
    pub async fn refresh(&self, mode: RefreshMode) -> SyncResult<RefreshReport> {
        let ticket = self.cache.begin_refresh().await;
        debug!(?mode, "Refresh started");

        let source = &self.source;
        let (orders, products, expenses, categories, tracking) = tokio::try_join!(
            source.orders(),
            source.products(),
            source.expenses(),
            source.categories(),
            source.tracking(),
        )?;

        let has_config = orders.is_some();
        let mut orders = orders.unwrap_or_default();
        overlay_tracking(&mut orders, &tracking);
        enrich_images(&mut orders, &products);
        sort_newest_first(&mut orders);

        let customers_synced = match mode {
            RefreshMode::Foreground => self.sync_customers(&orders).await,
            RefreshMode::Background => 0,
        };
        let customers = self.source.customers().await?;

        let mut snapshot = Snapshot {
            orders,
            products,
            categories,
            expenses,
            customers,
            has_config,
            ..Default::default()
        };
        snapshot.recompute_stats();
        let order_count = snapshot.orders.len();

        let transitions = self.cache.commit(ticket, snapshot).await?;
        for t in &transitions {
            info!(order_id = %t.order_id, from = %t.from, to = %t.to, "Auto-detected status change");
        }
        if !transitions.is_empty() {
            self.dispatch(&transitions).await;
        }

        info!(?mode, orders = order_count, has_config, "Refresh committed");
        Ok(RefreshReport {
            mode,
            orders: order_count,
            customers_synced,
            transitions,
            has_config,
        })
    }

    /// Upserts the newest orders' customers in paced batches.
    async fn sync_customers(&self, orders: &[Order]) -> usize {
        let recent = &orders[..orders.len().min(self.customers.limit)];
        let total = recent.len();
        let mut synced = 0;
        let mut done = 0;

        for (i, batch) in recent.chunks(self.customers.batch_size).enumerate() {
            if i > 0 {
                tokio::time::sleep(self.customers.pause).await;
            }

            let results = join_all(batch.iter().map(|order| {
                let upsert = CustomerUpsert::from_order(order);
                async move { (order.id.as_str(), self.source.upsert_customer(&upsert).await) }
            }))
            .await;

            for (order_id, result) in results {
                match result {
                    Ok(()) => synced += 1,
                    Err(e) => warn!(order_id, error = %e, "Customer upsert failed"),
                }
            }
            done += batch.len();
            self.emitter.emit_progress(done, total);
        }

        debug!(synced, total, "Customer sync finished");
        synced
    }

    /// Spawns one task that notifies every transition in order.
    async fn dispatch(&self, transitions: &[StatusTransition]) {
        let snapshot = self.cache.snapshot().await;
        let jobs: Vec<(Order, OrderStatus)> = transitions
            .iter()
            .filter_map(|t| snapshot.order(&t.order_id).map(|o| (o.clone(), t.to)))
            .collect();

        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            for (order, status) in jobs {
                if let Err(e) = notifier.notify(&order, status).await {
                    warn!(order_id = %order.id, status = %status, error = %e, "Automation failed");
                }
            }
        });
    }

    // =========================================================================
    // Manual Status Update
    // =========================================================================

    /// Changes an order's status on the platform.
    ///
    /// The cache shows the new status immediately. On success the edit is
    /// confirmed and the automation for the new status fires; on failure
    /// or timeout the previous status is restored and the error returned.
    /// Setting the status an order already has does nothing.
    ///
    /// The push and its confirm or revert run on their own task, so the
    /// edit is always settled even when the caller is dropped midway.
    pub async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> SyncResult<Order> {
        let current = self
            .cache
            .order(order_id)
            .await
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;
        if current.status == status {
            debug!(order_id, %status, "Status unchanged, nothing to push");
            return Ok(current);
        }

        let before = self.cache.begin_edit(order_id, status).await?;
        let engine = self.clone();
        let id = order_id.to_string();
        tokio::spawn(async move { engine.settle_edit(id, before, status).await })
            .await
            .map_err(|e| SyncError::ChannelError(format!("status update task failed: {e}")))?
    }

    async fn settle_edit(&self, order_id: String, before: Order, status: OrderStatus) -> SyncResult<Order> {
        let pushed = match tokio::time::timeout(
            self.push_timeout,
            self.source.push_status(&order_id, status),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(SyncError::Http {
                service: "woocommerce".to_string(),
                message: format!("status push timed out after {:?}", self.push_timeout),
            }),
        };

        if let Err(e) = pushed {
            warn!(order_id = %order_id, %status, error = %e, "Status push failed, reverting");
            self.cache.revert_edit(&order_id).await;
            return Err(e);
        }

        self.cache.confirm_edit(&order_id).await;
        info!(order_id = %order_id, from = %before.status, to = %status, "Order status updated");

        let mut updated = before;
        updated.status = status;
        self.dispatch_one(updated.clone(), status);
        Ok(updated)
    }

    fn dispatch_one(&self, order: Order, status: OrderStatus) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&order, status).await {
                warn!(order_id = %order.id, status = %status, error = %e, "Automation failed");
            }
        });
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cache::tests::order;
    use crate::error::SyncError;
    use crate::sms::SmsResponse;
    use async_trait::async_trait;
    use dokan_core::{Category, Customer, Expense, InventoryProduct, TrackingRecord};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// In-memory source with switchable failures.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub(crate) orders: Mutex<Option<Vec<Order>>>,
        pub(crate) tracking: Mutex<Vec<TrackingRecord>>,
        pub(crate) fail_products: AtomicBool,
        pub(crate) fail_push: AtomicBool,
        pub(crate) hang_push: AtomicBool,
        pub(crate) push_delay: Mutex<Option<Duration>>,
        pub(crate) upserts: AtomicUsize,
        pub(crate) pushed: Mutex<Vec<(String, OrderStatus)>>,
    }

    impl FakeSource {
        pub(crate) fn with_orders(orders: Vec<Order>) -> Self {
            FakeSource {
                orders: Mutex::new(Some(orders)),
                ..Default::default()
            }
        }

        pub(crate) fn set_status(&self, id: &str, status: OrderStatus) {
            if let Some(orders) = self.orders.lock().unwrap().as_mut() {
                for o in orders.iter_mut().filter(|o| o.id == id) {
                    o.status = status;
                }
            }
        }
    }

    #[async_trait]
    impl OrderSource for FakeSource {
        async fn orders(&self) -> SyncResult<Option<Vec<Order>>> {
            Ok(self.orders.lock().unwrap().clone())
        }

        async fn products(&self) -> SyncResult<Vec<InventoryProduct>> {
            if self.fail_products.load(Ordering::SeqCst) {
                return Err(SyncError::Http {
                    service: "woocommerce".into(),
                    message: "connection reset".into(),
                });
            }
            Ok(Vec::new())
        }

        async fn categories(&self) -> SyncResult<Vec<Category>> {
            Ok(Vec::new())
        }

        async fn expenses(&self) -> SyncResult<Vec<Expense>> {
            Ok(Vec::new())
        }

        async fn tracking(&self) -> SyncResult<Vec<TrackingRecord>> {
            Ok(self.tracking.lock().unwrap().clone())
        }

        async fn customers(&self) -> SyncResult<Vec<Customer>> {
            Ok(Vec::new())
        }

        async fn upsert_customer(&self, _customer: &CustomerUpsert) -> SyncResult<()> {
            self.upserts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn push_status(&self, order_id: &str, status: OrderStatus) -> SyncResult<()> {
            if self.fail_push.load(Ordering::SeqCst) {
                return Err(SyncError::remote("woocommerce", "Invalid order status"));
            }
            if self.hang_push.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            let delay = *self.push_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.pushed
                .lock()
                .unwrap()
                .push((order_id.to_string(), status));
            Ok(())
        }
    }

    /// Forwards every notification to a channel.
    pub(crate) struct ChannelNotifier(pub(crate) mpsc::UnboundedSender<(String, OrderStatus)>);

    #[async_trait]
    impl StatusNotifier for ChannelNotifier {
        async fn notify(&self, order: &Order, status: OrderStatus) -> SyncResult<Option<SmsResponse>> {
            let _ = self.0.send((order.id.clone(), status));
            Ok(None)
        }
    }

    fn engine(source: Arc<FakeSource>) -> (SyncEngine, mpsc::UnboundedReceiver<(String, OrderStatus)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = SyncEngine::new(source)
            .with_notifier(Arc::new(ChannelNotifier(tx)))
            .with_customer_sync(CustomerSyncPolicy {
                limit: 100,
                batch_size: 5,
                pause: Duration::ZERO,
            });
        (engine, rx)
    }

    #[tokio::test]
    async fn test_missing_commerce_config_commits_empty_snapshot() {
        let source = Arc::new(FakeSource::default());
        let (engine, _rx) = engine(source);

        let report = engine.refresh(RefreshMode::Background).await.unwrap();

        assert!(!report.has_config);
        assert_eq!(report.orders, 0);
        assert!(!engine.cache().snapshot().await.has_config);
    }

    #[tokio::test]
    async fn test_courier_status_overrides_platform_and_notifies() {
        let source = Arc::new(FakeSource::with_orders(vec![order("1", OrderStatus::Processing)]));
        let (engine, mut rx) = engine(source.clone());
        engine.refresh(RefreshMode::Background).await.unwrap();

        *source.tracking.lock().unwrap() = vec![TrackingRecord {
            id: "1".to_string(),
            courier_tracking_code: "SF1".to_string(),
            courier_status: Some("delivered".to_string()),
            courier_name: Some("Steadfast".to_string()),
        }];
        let report = engine.refresh(RefreshMode::Background).await.unwrap();

        assert_eq!(report.transitions.len(), 1);
        assert_eq!(
            rx.recv().await,
            Some(("1".to_string(), OrderStatus::Completed))
        );
    }

    #[tokio::test]
    async fn test_unchanged_remote_does_not_renotify() {
        let source = Arc::new(FakeSource::with_orders(vec![order("1", OrderStatus::Processing)]));
        let (engine, mut rx) = engine(source);

        engine.refresh(RefreshMode::Background).await.unwrap();
        engine.refresh(RefreshMode::Background).await.unwrap();
        let report = engine.refresh(RefreshMode::Background).await.unwrap();

        assert!(report.transitions.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_fetch_failure_discards_refresh() {
        let source = Arc::new(FakeSource::with_orders(vec![order("1", OrderStatus::Processing)]));
        let (engine, _rx) = engine(source.clone());
        engine.refresh(RefreshMode::Background).await.unwrap();

        source.set_status("1", OrderStatus::Cancelled);
        source.fail_products.store(true, Ordering::SeqCst);

        assert!(engine.refresh(RefreshMode::Background).await.is_err());
        assert_eq!(
            engine.cache().order("1").await.unwrap().status,
            OrderStatus::Processing
        );
    }

    #[tokio::test]
    async fn test_foreground_upserts_customers_in_batches() {
        let orders = (1..=12).map(|i| order(&i.to_string(), OrderStatus::Pending)).collect();
        let source = Arc::new(FakeSource::with_orders(orders));
        let (engine, _rx) = engine(source.clone());

        let report = engine.refresh(RefreshMode::Foreground).await.unwrap();
        assert_eq!(report.customers_synced, 12);

        engine.refresh(RefreshMode::Background).await.unwrap();
        assert_eq!(source.upserts.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn test_customer_sync_respects_limit() {
        let orders = (1..=8).map(|i| order(&i.to_string(), OrderStatus::Pending)).collect();
        let source = Arc::new(FakeSource::with_orders(orders));
        let (engine, _rx) = engine(source.clone());
        let engine = engine.with_customer_sync(CustomerSyncPolicy {
            limit: 3,
            batch_size: 2,
            pause: Duration::ZERO,
        });

        engine.refresh(RefreshMode::Foreground).await.unwrap();
        assert_eq!(source.upserts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_manual_update_pushes_and_notifies() {
        let source = Arc::new(FakeSource::with_orders(vec![order("5", OrderStatus::Processing)]));
        let (engine, mut rx) = engine(source.clone());
        engine.refresh(RefreshMode::Background).await.unwrap();

        let updated = engine
            .update_order_status("5", OrderStatus::Completed)
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Completed);
        assert_eq!(
            source.pushed.lock().unwrap().as_slice(),
            [("5".to_string(), OrderStatus::Completed)]
        );
        assert_eq!(rx.recv().await, Some(("5".to_string(), OrderStatus::Completed)));
    }

    #[tokio::test]
    async fn test_manual_update_reverts_on_failure() {
        let source = Arc::new(FakeSource::with_orders(vec![order("5", OrderStatus::Processing)]));
        source.fail_push.store(true, Ordering::SeqCst);
        let (engine, mut rx) = engine(source);
        engine.refresh(RefreshMode::Background).await.unwrap();

        let err = engine
            .update_order_status("5", OrderStatus::Completed)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid order status");
        assert_eq!(
            engine.cache().order("5").await.unwrap().status,
            OrderStatus::Processing
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_manual_update_to_same_status_is_noop() {
        let source = Arc::new(FakeSource::with_orders(vec![order("5", OrderStatus::Processing)]));
        let (engine, _rx) = engine(source.clone());
        engine.refresh(RefreshMode::Background).await.unwrap();

        engine
            .update_order_status("5", OrderStatus::Processing)
            .await
            .unwrap();
        assert!(source.pushed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirmed_edit_survives_background_poll_with_stale_remote() {
        let source = Arc::new(FakeSource::with_orders(vec![order("5", OrderStatus::Processing)]));
        let (engine, mut rx) = engine(source.clone());
        engine.refresh(RefreshMode::Background).await.unwrap();

        let ticket = engine.cache().begin_refresh().await;
        engine
            .update_order_status("5", OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(rx.recv().await, Some(("5".to_string(), OrderStatus::Cancelled)));

        // a poll that fetched before the push landed still sees "processing"
        let mut stale = Snapshot {
            orders: vec![order("5", OrderStatus::Processing)],
            has_config: true,
            ..Default::default()
        };
        stale.recompute_stats();
        let transitions = engine.cache().commit(ticket, stale).await.unwrap();

        assert!(transitions.is_empty());
        assert_eq!(
            engine.cache().order("5").await.unwrap().status,
            OrderStatus::Cancelled
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_caller_still_settles_edit() {
        let source = Arc::new(FakeSource::with_orders(vec![order("5", OrderStatus::Processing)]));
        *source.push_delay.lock().unwrap() = Some(Duration::from_millis(50));
        let (engine, mut rx) = engine(source.clone());
        engine.refresh(RefreshMode::Background).await.unwrap();

        let dropped = tokio::time::timeout(
            Duration::from_millis(20),
            engine.update_order_status("5", OrderStatus::Cancelled),
        )
        .await;
        assert!(dropped.is_err());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(engine.cache().pending_edits().await, 0);
        assert_eq!(
            source.pushed.lock().unwrap().as_slice(),
            [("5".to_string(), OrderStatus::Cancelled)]
        );
        assert_eq!(rx.recv().await, Some(("5".to_string(), OrderStatus::Cancelled)));

        // later platform changes are no longer masked by the edit
        source.set_status("5", OrderStatus::Completed);
        engine.refresh(RefreshMode::Background).await.unwrap();
        assert_eq!(
            engine.cache().order("5").await.unwrap().status,
            OrderStatus::Completed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_push_times_out_and_reverts() {
        let source = Arc::new(FakeSource::with_orders(vec![order("5", OrderStatus::Processing)]));
        source.hang_push.store(true, Ordering::SeqCst);
        let (engine, mut rx) = engine(source.clone());
        let engine = engine.with_push_timeout(Duration::from_secs(1));
        engine.refresh(RefreshMode::Background).await.unwrap();

        let dropped = tokio::time::timeout(
            Duration::from_millis(20),
            engine.update_order_status("5", OrderStatus::Cancelled),
        )
        .await;
        assert!(dropped.is_err());
        assert_eq!(
            engine.cache().order("5").await.unwrap().status,
            OrderStatus::Cancelled
        );

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(engine.cache().pending_edits().await, 0);
        assert_eq!(
            engine.cache().order("5").await.unwrap().status,
            OrderStatus::Processing
        );

        source.set_status("5", OrderStatus::Completed);
        for _ in 0..3 {
            engine.refresh(RefreshMode::Background).await.unwrap();
        }
        assert_eq!(
            engine.cache().order("5").await.unwrap().status,
            OrderStatus::Completed
        );
        assert_eq!(rx.recv().await, Some(("5".to_string(), OrderStatus::Completed)));
    }

    #[tokio::test]
    async fn test_hung_push_returns_timeout_error() {
        let source = Arc::new(FakeSource::with_orders(vec![order("5", OrderStatus::Processing)]));
        source.hang_push.store(true, Ordering::SeqCst);
        let (engine, _rx) = engine(source);
        let engine = engine.with_push_timeout(Duration::from_millis(10));
        engine.refresh(RefreshMode::Background).await.unwrap();

        let err = engine
            .update_order_status("5", OrderStatus::Cancelled)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Http { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    /// Collects formatted log output.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_each_transition_is_logged() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let source = Arc::new(FakeSource::with_orders(vec![
            order("1", OrderStatus::Processing),
            order("2", OrderStatus::Processing),
        ]));
        let (engine, _rx) = engine(source.clone());
        engine.refresh(RefreshMode::Background).await.unwrap();

        source.set_status("1", OrderStatus::Completed);
        source.set_status("2", OrderStatus::Cancelled);
        engine.refresh(RefreshMode::Background).await.unwrap();

        let out = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = out
            .lines()
            .filter(|l| l.contains("Auto-detected status change"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.contains(" INFO ")));
        assert!(lines.iter().any(|l| l.contains("order_id=1") && l.contains("to=completed")));
        assert!(lines.iter().any(|l| l.contains("order_id=2") && l.contains("to=cancelled")));
    }
}
