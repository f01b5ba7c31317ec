//! # Courier Status Mapping
//!
//! Reduces courier-specific status vocabulary to the canonical [`OrderStatus`].
//!
//! ## Keyword Tables
//! ```text
//! ┌───────────────┬─────────────────────────────────────┬─────────────────┐
//! │ Courier       │ substring (case-insensitive)        │ canonical       │
//! ├───────────────┼─────────────────────────────────────┼─────────────────┤
//! │ Steadfast     │ delivered                           │ completed       │
//! │               │ cancelled, reject                   │ cancelled       │
//! │               │ return                              │ refunded        │
//! │               │ transit, shipping, out_for_delivery,│ processing      │
//! │               │ picked                              │                 │
//! │               │ pending, hold, packaging            │ on-hold         │
//! ├───────────────┼─────────────────────────────────────┼─────────────────┤
//! │ Pathao        │ delivered, paid                     │ completed       │
//! │               │ returned, failed                    │ refunded        │
//! │               │ cancelled, rejected                 │ cancelled       │
//! │               │ transit, sorting, assigned, picked  │ processing      │
//! │               │ created, requested                  │ on-hold         │
//! ├───────────────┼─────────────────────────────────────┼─────────────────┤
//! │ (no match)    │                                     │ pending         │
//! └───────────────┴─────────────────────────────────────┴─────────────────┘
//! ```
//!
//! Rows are checked top to bottom and the first match wins, so
//! `"partial_delivered_returned"` is `completed` for both couriers.

use crate::types::{Courier, OrderStatus};

type KeywordTable = &'static [(&'static [&'static str], OrderStatus)];

const STEADFAST: KeywordTable = &[
    (&["delivered"], OrderStatus::Completed),
    (&["cancelled", "reject"], OrderStatus::Cancelled),
    (&["return"], OrderStatus::Refunded),
    (
        &["transit", "shipping", "out_for_delivery", "picked"],
        OrderStatus::Processing,
    ),
    (&["pending", "hold", "packaging"], OrderStatus::OnHold),
];

const PATHAO: KeywordTable = &[
    (&["delivered", "paid"], OrderStatus::Completed),
    (&["returned", "failed"], OrderStatus::Refunded),
    (&["cancelled", "rejected"], OrderStatus::Cancelled),
    (
        &["transit", "sorting", "assigned", "picked"],
        OrderStatus::Processing,
    ),
    (&["created", "requested"], OrderStatus::OnHold),
];

/// Maps a raw courier status string to the canonical status.
///
/// Never fails: unrecognised input maps to [`OrderStatus::Pending`].
///
/// ## Example
/// ```rust
/// use dokan_core::{map_courier_status, Courier, OrderStatus};
///
/// assert_eq!(map_courier_status(Courier::Steadfast, "Delivered"), OrderStatus::Completed);
/// assert_eq!(map_courier_status(Courier::Pathao, "Pickup_Requested"), OrderStatus::OnHold);
/// assert_eq!(map_courier_status(Courier::Pathao, "???"), OrderStatus::Pending);
/// ```
pub fn map_courier_status(courier: Courier, raw: &str) -> OrderStatus {
    let table = match courier {
        Courier::Steadfast => STEADFAST,
        Courier::Pathao => PATHAO,
    };
    lookup(table, &raw.to_lowercase())
}

fn lookup(table: KeywordTable, status: &str) -> OrderStatus {
    table
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| status.contains(k)))
        .map(|(_, mapped)| *mapped)
        .unwrap_or(OrderStatus::Pending)
}

// =============================================================================
// Unit Tests
// =============================================================================
