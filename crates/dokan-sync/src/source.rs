//! # I/O Seams
//!
//! Traits the engine talks through, and their production implementation.
//!
//! ```text
//! ┌────────────────────────┐      ┌─────────────────────────────────────┐
//! │      SyncEngine        │      │  RemoteSource                       │
//! │                        │─────►│  ├── CommerceClient (WooCommerce)   │
//! │  dyn OrderSource       │      │  └── Store (settings, tracking,     │
//! │  dyn StatusNotifier ───┼──┐   │          expenses, customers)       │
//! └────────────────────────┘  │   └─────────────────────────────────────┘
//!                             │   ┌─────────────────────────────────────┐
//!                             └──►│  SmsAutomation ──► dyn SmsSender    │
//!                                 └─────────────────────────────────────┘
//! ```
//!
//! Tests swap in in-memory fakes for each seam.

use async_trait::async_trait;
use tracing::debug;

use dokan_core::{Category, Customer, Expense, InventoryProduct, Order, OrderStatus, TrackingRecord};
use dokan_store::{CustomerUpsert, RetryPolicy, SmsConfig, Store, WpConfig};

use crate::commerce::CommerceClient;
use crate::error::{SyncError, SyncResult};
use crate::sms::SmsResponse;

// =============================================================================
// Traits
// =============================================================================

/// Everything a refresh reads, and the one write a status edit needs.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Platform orders, or `None` when no commerce credentials exist.
    async fn orders(&self) -> SyncResult<Option<Vec<Order>>>;

    /// Products; empty when commerce is not configured.
    async fn products(&self) -> SyncResult<Vec<InventoryProduct>>;

    /// Categories; empty when commerce is not configured.
    async fn categories(&self) -> SyncResult<Vec<Category>>;

    async fn expenses(&self) -> SyncResult<Vec<Expense>>;

    async fn tracking(&self) -> SyncResult<Vec<TrackingRecord>>;

    async fn customers(&self) -> SyncResult<Vec<Customer>>;

    async fn upsert_customer(&self, customer: &CustomerUpsert) -> SyncResult<()>;

    /// Writes a status back to the platform.
    async fn push_status(&self, order_id: &str, status: OrderStatus) -> SyncResult<()>;
}

/// Reacts to an order entering a new status.
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    /// Returns the gateway response, or `None` when nothing was sent.
    async fn notify(&self, order: &Order, status: OrderStatus) -> SyncResult<Option<SmsResponse>>;
}

/// Delivers one SMS.
///
/// Never fails: transport problems come back as `success: false`.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, config: &SmsConfig, phone: &str, message: &str) -> SmsResponse;
}

/// Notifier that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotifier;

#[async_trait]
impl StatusNotifier for NoOpNotifier {
    async fn notify(&self, _order: &Order, _status: OrderStatus) -> SyncResult<Option<SmsResponse>> {
        Ok(None)
    }
}

// =============================================================================
// Remote Source
// =============================================================================

/// Production [`OrderSource`] over WooCommerce and the key-value store.
///
/// Commerce credentials are resolved on every call: the configured
/// override when present, otherwise the `wp_config` setting. Saving new
/// credentials from the dashboard therefore takes effect on the next
/// refresh.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    store: Store,
    commerce_override: Option<WpConfig>,
    retry: RetryPolicy,
}

impl RemoteSource {
    pub fn new(store: Store, commerce_override: Option<WpConfig>, retry: RetryPolicy) -> Self {
        RemoteSource {
            store,
            commerce_override,
            retry,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The commerce client, or `None` when no usable credentials exist.
    pub async fn commerce(&self) -> SyncResult<Option<CommerceClient>> {
        let config = match &self.commerce_override {
            Some(config) => Some(config.clone()),
            None => self.store.settings().wp_config().await?,
        };

        match config.filter(WpConfig::is_configured) {
            Some(config) => Ok(Some(CommerceClient::new(
                self.store.client().clone(),
                config,
                self.retry.clone(),
            )?)),
            None => {
                debug!("WooCommerce credentials not configured");
                Ok(None)
            }
        }
    }

    /// The commerce client, failing when it is not configured.
    pub async fn require_commerce(&self) -> SyncResult<CommerceClient> {
        self.commerce().await?.ok_or_else(|| {
            SyncError::NotConfigured("WordPress connection not configured.".to_string())
        })
    }
}

#[async_trait]
impl OrderSource for RemoteSource {
    async fn orders(&self) -> SyncResult<Option<Vec<Order>>> {
        match self.commerce().await? {
            Some(client) => Ok(Some(client.orders().await?)),
            None => Ok(None),
        }
    }

    async fn products(&self) -> SyncResult<Vec<InventoryProduct>> {
        match self.commerce().await? {
            Some(client) => client.products().await,
            None => Ok(Vec::new()),
        }
    }

    async fn categories(&self) -> SyncResult<Vec<Category>> {
        match self.commerce().await? {
            Some(client) => client.categories().await,
            None => Ok(Vec::new()),
        }
    }

    async fn expenses(&self) -> SyncResult<Vec<Expense>> {
        Ok(self.store.expenses().all().await?)
    }

    async fn tracking(&self) -> SyncResult<Vec<TrackingRecord>> {
        Ok(self.store.tracking().all().await?)
    }

    async fn customers(&self) -> SyncResult<Vec<Customer>> {
        Ok(self.store.customers().all().await?)
    }

    async fn upsert_customer(&self, customer: &CustomerUpsert) -> SyncResult<()> {
        Ok(self.store.customers().upsert(customer).await?)
    }

    async fn push_status(&self, order_id: &str, status: OrderStatus) -> SyncResult<()> {
        self.require_commerce()
            .await?
            .update_order_status(order_id, status)
            .await
    }
}
