//! # Status Reconciliation
//!
//! Merges locally stored courier tracking into platform orders and detects
//! the status transitions that drive SMS automation.
//!
//! ## Refresh Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  platform orders ──┐                                                    │
//! │                    ├──► overlay_tracking ──► enrich_images ──► sort     │
//! │  tracking records ─┘          │                                  │      │
//! │                               │                                  ▼      │
//! │                     courier status wins            detect_transitions   │
//! │                     over platform status          (previous vs. next)   │
//! │                                                          │              │
//! │                                                          ▼              │
//! │                                              Vec<StatusTransition>      │
//! │                                              → automation trigger       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::status::map_courier_status;
use crate::types::{InventoryProduct, Order, OrderStatus, TrackingRecord};

/// A detected change of canonical status between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StatusTransition {
    pub order_id: String,
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// Overlays tracking records onto orders.
///
/// ## Rules
/// - Records are matched by order id; when several share an id the last one wins
/// - The courier is the record's name, or identified from the tracking code
/// - A non-blank courier status replaces the platform status via
///   [`map_courier_status`]; otherwise the platform status is kept
/// - Courier name, tracking code and raw courier status are always copied
pub fn overlay_tracking(orders: &mut [Order], records: &[TrackingRecord]) {
    let by_order: HashMap<&str, &TrackingRecord> = records
        .iter()
        .map(|record| (record.id.as_str(), record))
        .collect();

    for order in orders.iter_mut() {
        let Some(record) = by_order.get(order.id.as_str()) else {
            continue;
        };

        let courier = record.courier();
        if let Some(raw) = record.status() {
            order.status = map_courier_status(courier, raw);
        }

        order.courier_name = Some(courier);
        order.courier_tracking_code =
            Some(record.courier_tracking_code.clone()).filter(|code| !code.is_empty());
        order.courier_status = record.status().map(str::to_string);
    }
}

/// Replaces line item placeholder images with the product's image.
pub fn enrich_images(orders: &mut [Order], products: &[InventoryProduct]) {
    let images: HashMap<&str, &str> = products
        .iter()
        .filter(|p| !p.image.is_empty())
        .map(|p| (p.id.as_str(), p.image.as_str()))
        .collect();

    for item in orders.iter_mut().flat_map(|o| o.line_items.iter_mut()) {
        if let Some(image) = images.get(item.id.as_str()) {
            item.image = (*image).to_string();
        }
    }
}

/// Sorts orders newest first. Ties keep their platform order.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Compares two snapshots and returns every order whose status changed.
///
/// ## Rules
/// - Only orders present in both snapshots are compared
/// - An empty `previous` snapshot is the first load and yields nothing
/// - Output follows the order of `next`
///
/// ## Idempotence
/// Running this with identical snapshots always returns an empty list, so
/// an unchanged remote never re-fires automations.
pub fn detect_transitions(previous: &[Order], next: &[Order]) -> Vec<StatusTransition> {
    if previous.is_empty() {
        return Vec::new();
    }

    let before: HashMap<&str, OrderStatus> = previous
        .iter()
        .map(|o| (o.id.as_str(), o.status))
        .collect();

    next.iter()
        .filter_map(|order| {
            let from = *before.get(order.id.as_str())?;
            (from != order.status).then(|| StatusTransition {
                order_id: order.id.clone(),
                from,
                to: order.status,
            })
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
