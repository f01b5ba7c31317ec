//! # dokan-store: Persistence Layer for Dokan
//!
//! Dokan keeps no database of its own. Settings, courier tracking,
//! expenses and customers live behind small PHP endpoints on the shop's
//! host; this crate wraps them in typed repositories.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dokan Data Flow                                  │
//! │                                                                         │
//! │  SyncEngine / dashboard handlers                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   dokan-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Store      │    │  Repositories │    │ RetryPolicy  │  │   │
//! │  │   │  (client.rs)  │    │               │    │  (retry.rs)  │  │   │
//! │  │   │               │    │ Settings      │    │              │  │   │
//! │  │   │ reqwest       │◄───│ Tracking      │    │ exponential  │  │   │
//! │  │   │ Client        │    │ Expense       │    │ backoff on   │  │   │
//! │  │   │               │    │ Customer      │    │ reads        │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  api/settings.php · api/local_tracking.php · api/customers.php         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dokan_store::{Store, StoreConfig};
//!
//! let config = StoreConfig::from_base(&"https://shop.example.com/".parse()?)?;
//! let store = Store::new(config)?;
//!
//! let records = store.tracking().all().await?;
//! let rules = store.settings().sms_automation_config().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod error;
pub mod repository;
pub mod retry;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::{Store, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use retry::{RetryPolicy, Transient};

pub use repository::customer::{CustomerRepository, CustomerUpsert};
pub use repository::expense::{ExpenseRepository, NewExpense};
pub use repository::settings::{
    keys, CourierConfig, PathaoConfig, SettingsRepository, SmsConfig, SmsTemplate, WpConfig,
    DEFAULT_SMS_ENDPOINT,
};
pub use repository::tracking::TrackingRepository;

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A store pointed at a mock server, with retries disabled.
    pub(crate) fn store_for(base: &str) -> Store {
        let base = url::Url::parse(base).expect("mock server url");
        let config = StoreConfig::from_base(&base)
            .expect("endpoint layout")
            .retry(RetryPolicy::none());
        Store::new(config).expect("store")
    }
}
