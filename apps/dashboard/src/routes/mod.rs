//! # HTTP Routes
//!
//! Every handler the dashboard exposes, grouped by screen.
//!
//! ## Route Organization
//! ```text
//! routes/
//! ├── mod.rs        ◄─── You are here (health, shared helpers)
//! ├── sync.rs       ◄─── Agent status, manual refresh
//! ├── orders.rs     ◄─── Order list, detail, status edits, counts
//! ├── insights.rs   ◄─── Dashboard stats, analytics report
//! ├── customers.rs  ◄─── Customer directory filters
//! ├── products.rs   ◄─── Inventory, product edits, media upload
//! ├── expenses.rs   ◄─── Expense CRUD
//! ├── sms.rs        ◄─── Bulk SMS, segment counter
//! ├── courier.rs    ◄─── Steadfast and Pathao dispatch
//! └── settings.rs   ◄─── Stored credentials, rules, templates
//! ```
//!
//! ## Reads vs. Writes
//! Reads are served from the in-memory snapshot and never touch the
//! network. Writes go to the remote service first; the ones that change
//! what the snapshot shows then wait for a refresh before answering.

pub mod courier;
pub mod customers;
pub mod expenses;
pub mod insights;
pub mod orders;
pub mod products;
pub mod settings;
pub mod sms;
pub mod sync;

use tracing::warn;

use dokan_sync::RefreshMode;

use crate::state::AppState;

/// Liveness probe.
pub async fn health() -> &'static str {
    "OK"
}

/// Asks the agent for a refresh after a write. A failed refresh does not
/// fail the write; the next poll picks the change up.
pub(crate) async fn refresh_after_write(app: &AppState, mode: RefreshMode) {
    if let Err(e) = app.agent.refresh_now(mode).await {
        warn!(?mode, error = %e, "Refresh after write failed");
    }
}
