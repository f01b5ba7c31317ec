//! # dokan-core: Pure Domain Logic for Dokan
//!
//! This crate holds every rule Dokan applies to storefront data, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Dokan Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                apps/dashboard (HTTP API)                        │   │
//! │  │    /api/orders, /api/stats, /api/courier/..., /api/sms/...     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        dokan-sync (engine, agent, remote clients)               │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────────┐  ┌────────────▼────────────────┐  │
//! │  │  ★ dokan-core (THIS CRATE) ★    │  │  dokan-store (KV endpoints) │  │
//! │  │                                 │  └─────────────────────────────┘  │
//! │  │  types     money     status     │                                   │
//! │  │  reconcile automation stats     │                                   │
//! │  │  filter    validation           │                                   │
//! │  │                                 │                                   │
//! │  │  NO I/O • NO NETWORK • PURE     │                                   │
//! │  └─────────────────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Orders, customers, products, expenses, tracking records
//! - [`money`] - Integer taka amounts (poisha), lenient JSON parsing
//! - [`status`] - Courier status vocabulary → canonical status
//! - [`reconcile`] - Tracking overlay and transition detection
//! - [`automation`] - Per-status SMS rules and template rendering
//! - [`stats`] - Dashboard totals, status counts, analytics report
//! - [`filter`] - Order, customer and consignment queries
//! - [`validation`] - Phone formats, SMS segments, input checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use dokan_core::{map_courier_status, Courier, OrderStatus};
//!
//! let status = map_courier_status(Courier::identify("SF9921AB"), "in_transit");
//! assert_eq!(status, OrderStatus::Processing);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod automation;
pub mod error;
pub mod filter;
pub mod money;
pub mod reconcile;
pub mod stats;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use automation::{AutomationConfig, AutomationRule};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use reconcile::StatusTransition;
pub use stats::{AnalyticsReport, DashboardStats, DateRange, StatusCounts};
pub use status::map_courier_status;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size requested from the commerce platform.
///
/// WooCommerce caps `per_page` at 100; Dokan reads a single page.
pub const COMMERCE_PAGE_SIZE: u32 = 100;
