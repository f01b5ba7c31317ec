//! # Snapshot Cache
//!
//! The committed view of the shop that every read is served from, plus
//! the bookkeeping that stops a slow background refresh from undoing a
//! manual status change.
//!
//! ## Generation Check
//! ```text
//! clock ─────1──────────2──────────3──────────4───────────►
//!            │          │          │          │
//!   refresh A: begin(1) │          │          commit(1) → kept edit
//!                       │          │
//!   edit #7:   begin_edit  push ok → confirm(3)
//!                                  │
//!   refresh B:          begin(2) … commit(2)  → edit confirmed at 3 > 2,
//!                                               remote may predate it: keep
//!
//!   refresh C: begin(5) … commit(5)           → confirmed at 3 < 5,
//!                                               remote is authoritative: drop
//! ```
//!
//! - Every `begin_refresh` and `confirm_edit` advances a logical clock.
//! - A commit is rejected when a refresh that started later already committed.
//! - A pending edit, or one confirmed after the refresh began, overrides the
//!   fetched status and is excluded from transition detection.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use dokan_core::reconcile::detect_transitions;
use dokan_core::{
    Category, CoreError, Customer, DashboardStats, Expense, InventoryProduct, Order, OrderStatus,
    StatusTransition,
};

use crate::error::{SyncError, SyncResult};

/// One consistent view of the shop.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub orders: Vec<Order>,
    pub products: Vec<InventoryProduct>,
    pub categories: Vec<Category>,
    pub expenses: Vec<Expense>,
    pub customers: Vec<Customer>,
    pub stats: DashboardStats,
    pub committed_at: Option<DateTime<Utc>>,
    /// Commerce credentials were available for this refresh.
    pub has_config: bool,
}

impl Snapshot {
    /// Recomputes `stats` from the snapshot's own lists.
    pub fn recompute_stats(&mut self) {
        self.stats = DashboardStats::compute(
            &self.orders,
            &self.expenses,
            self.customers.len(),
            self.products.len(),
        );
    }

    pub fn order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }
}

/// Proof that a refresh began, carrying its position on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    started_at: u64,
}

#[derive(Debug, Clone)]
struct LocalEdit {
    status: OrderStatus,
    previous: OrderStatus,
    /// `None` while the platform write is in flight.
    confirmed_at: Option<u64>,
}

impl LocalEdit {
    fn outlives(&self, ticket: RefreshTicket) -> bool {
        self.confirmed_at
            .map_or(true, |confirmed| confirmed > ticket.started_at)
    }
}

#[derive(Debug, Default)]
struct Inner {
    snapshot: Arc<Snapshot>,
    clock: u64,
    /// Start of the newest refresh that has committed.
    committed_start: u64,
    edits: HashMap<String, LocalEdit>,
}

/// Shared, versioned snapshot store.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    inner: RwLock<Inner>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.read().await.snapshot.clone()
    }

    pub async fn order(&self, id: &str) -> Option<Order> {
        self.inner.read().await.snapshot.order(id).cloned()
    }

    /// Number of manual edits still tracked.
    pub async fn pending_edits(&self) -> usize {
        self.inner.read().await.edits.len()
    }

    // -------------------------------------------------------------------------
    // Refresh
    // -------------------------------------------------------------------------

    pub async fn begin_refresh(&self) -> RefreshTicket {
        let mut inner = self.inner.write().await;
        inner.clock += 1;
        RefreshTicket {
            started_at: inner.clock,
        }
    }

    /// Installs a freshly fetched snapshot.
    ///
    /// Returns the status transitions between the previous snapshot and
    /// this one that should be notified.
    pub async fn commit(
        &self,
        ticket: RefreshTicket,
        mut next: Snapshot,
    ) -> SyncResult<Vec<StatusTransition>> {
        let mut inner = self.inner.write().await;
        if ticket.started_at < inner.committed_start {
            debug!(
                started_at = ticket.started_at,
                committed_start = inner.committed_start,
                "Discarding stale refresh"
            );
            return Err(SyncError::StaleRefresh);
        }

        inner.edits.retain(|_, edit| edit.outlives(ticket));

        let mut preserved = Vec::new();
        for order in next.orders.iter_mut() {
            if let Some(edit) = inner.edits.get(&order.id) {
                order.status = edit.status;
                preserved.push(order.id.clone());
            }
        }
        if !preserved.is_empty() {
            next.recompute_stats();
        }

        let transitions: Vec<StatusTransition> =
            detect_transitions(&inner.snapshot.orders, &next.orders)
                .into_iter()
                .filter(|t| !preserved.contains(&t.order_id))
                .collect();

        next.committed_at = Some(Utc::now());
        inner.snapshot = Arc::new(next);
        inner.committed_start = ticket.started_at;
        Ok(transitions)
    }

    // -------------------------------------------------------------------------
    // Local Edits
    // -------------------------------------------------------------------------

    /// Applies a status change optimistically and returns the order as it
    /// was before.
    pub async fn begin_edit(&self, order_id: &str, status: OrderStatus) -> SyncResult<Order> {
        let mut inner = self.inner.write().await;
        let snapshot = Arc::make_mut(&mut inner.snapshot);
        let order = snapshot
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        let before = order.clone();
        order.status = status;
        snapshot.recompute_stats();

        let previous = inner
            .edits
            .get(order_id)
            .map_or(before.status, |edit| edit.previous);
        inner.edits.insert(
            order_id.to_string(),
            LocalEdit {
                status,
                previous,
                confirmed_at: None,
            },
        );
        Ok(before)
    }

    /// Marks an edit as accepted by the platform.
    pub async fn confirm_edit(&self, order_id: &str) {
        let mut inner = self.inner.write().await;
        inner.clock += 1;
        let now = inner.clock;
        if let Some(edit) = inner.edits.get_mut(order_id) {
            edit.confirmed_at = Some(now);
        }
    }

    /// Rolls an edit back to the status it replaced.
    pub async fn revert_edit(&self, order_id: &str) {
        let mut inner = self.inner.write().await;
        let Some(edit) = inner.edits.remove(order_id) else {
            return;
        };
        let snapshot = Arc::make_mut(&mut inner.snapshot);
        if let Some(order) = snapshot.orders.iter_mut().find(|o| o.id == order_id) {
            order.status = edit.previous;
            snapshot.recompute_stats();
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
