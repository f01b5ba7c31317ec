//! # dokan-sync: Sync Engine for Dokan
//!
//! Remote clients, the refresh engine and the periodic agent that keep a
//! consistent snapshot of the shop for the dashboard API.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sync Engine Architecture                         │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                   SyncAgent (periodic runner)                    │  │
//! │  │                                                                  │  │
//! │  │  Foreground refresh at startup, Background every interval,       │  │
//! │  │  on-demand refreshes through SyncAgentHandle                     │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               ▼                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  SyncEngine ──► OrderSource ──► RemoteSource                      │  │
//! │  │      │                            ├── CommerceClient (WooCommerce)│  │
//! │  │      │                            └── Store (PHP endpoints)       │  │
//! │  │      ├──► SnapshotCache (generation check, local edits)           │  │
//! │  │      └──► StatusNotifier ──► SmsAutomation ──► SmsGateway         │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Operator actions outside the loop:                                    │
//! │  • SteadfastClient / PathaoClient  - book consignments                 │
//! │  • BulkSender                      - paced bulk SMS                    │
//! │  • CommerceClient                  - product writes, media upload      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`agent`] - `SyncAgent`, its handle, status and event emitter
//! - [`cache`] - Versioned snapshot store
//! - [`commerce`] - WooCommerce REST client and payload mapping
//! - [`config`] - Daemon configuration (TOML + environment)
//! - [`courier`] - Steadfast and Pathao clients
//! - [`engine`] - Refresh pipeline and manual status updates
//! - [`error`] - Sync error types
//! - [`sms`] - SMS relay, automation and bulk sending
//! - [`source`] - I/O seams and the production `RemoteSource`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dokan_sync::{DokanConfig, RemoteSource, SyncAgentBuilder, SyncEngine};
//!
//! let config = DokanConfig::load(None)?;
//! let store = Store::new(config.store_config()?)?;
//! let source = RemoteSource::new(store, config.commerce_override(), config.sync.retry_policy());
//!
//! let engine = SyncEngine::new(Arc::new(source));
//! let (agent, task) = SyncAgentBuilder::new(engine)
//!     .with_interval(config.sync.interval())
//!     .build()?
//!     .start();
//!
//! let report = agent.refresh_now(RefreshMode::Foreground).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod agent;
pub mod cache;
pub mod commerce;
pub mod config;
pub mod courier;
pub mod engine;
pub mod error;
pub mod sms;
pub mod source;

// =============================================================================
// Re-exports
// =============================================================================

pub use agent::{
    NoOpEmitter, SyncAgent, SyncAgentBuilder, SyncAgentHandle, SyncEventEmitter, SyncStatus,
};
pub use cache::{RefreshTicket, Snapshot, SnapshotCache};
pub use commerce::{CategoryRef, CommerceClient, ImageRef, ProductInput};
pub use config::{DokanConfig, ResolvedEndpoints};
pub use courier::{Consignment, DeliveryLocation, PathaoClient, SteadfastClient};
pub use engine::{CustomerSyncPolicy, RefreshMode, RefreshReport, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use sms::{BulkReport, BulkSender, SendLog, SendStatus, SmsAutomation, SmsGateway, SmsResponse};
pub use source::{NoOpNotifier, OrderSource, RemoteSource, SmsSender, StatusNotifier};
