//! # List Filters
//!
//! Query types for the order list, customer list and courier consignment
//! views. All filtering happens over the in-memory snapshot.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::types::{Courier, Customer, InventoryProduct, Order, OrderStatus};

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

/// Order list query.
///
/// Every field is optional; an empty query returns all orders newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    /// Case-insensitive match on order id or customer name.
    pub search: Option<String>,
    /// Exact payment method title.
    pub payment_method: Option<String>,
    #[ts(as = "Option<String>")]
    pub from: Option<NaiveDate>,
    /// Inclusive: covers the whole day.
    #[ts(as = "Option<String>")]
    pub to: Option<NaiveDate>,
    pub sort: SortOrder,
}

impl OrderQuery {
    pub fn matches(&self, order: &Order) -> bool {
        if self.status.is_some_and(|s| s != order.status) {
            return false;
        }

        if let Some(term) = non_blank(&self.search) {
            let term = term.to_lowercase();
            if !order.id.to_lowercase().contains(&term)
                && !order.customer.name.to_lowercase().contains(&term)
            {
                return false;
            }
        }

        if let Some(method) = non_blank(&self.payment_method) {
            if order.payment_method != method {
                return false;
            }
        }

        let placed = order.placed_on();
        if self.from.is_some_and(|from| placed < from) || self.to.is_some_and(|to| placed > to) {
            return false;
        }

        true
    }

    /// Filters and sorts.
    pub fn apply<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        let mut result: Vec<&Order> = orders.iter().filter(|o| self.matches(o)).collect();
        match self.sort {
            SortOrder::Newest => result.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            SortOrder::Oldest => result.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
        }
        result
    }
}

/// Distinct payment method titles, in first-seen order.
pub fn payment_methods(orders: &[Order]) -> Vec<String> {
    let mut seen = Vec::new();
    for order in orders {
        if !seen.contains(&order.payment_method) {
            seen.push(order.payment_method.clone());
        }
    }
    seen
}

// =============================================================================
// Customers
// =============================================================================

/// Order count filter: exact (`"3"`) or at least (`"5+"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum OrderCountFilter {
    #[default]
    Any,
    Exactly(u32),
    AtLeast(u32),
}

impl OrderCountFilter {
    pub fn matches(&self, count: u32) -> bool {
        match *self {
            OrderCountFilter::Any => true,
            OrderCountFilter::Exactly(n) => count == n,
            OrderCountFilter::AtLeast(n) => count >= n,
        }
    }
}

impl FromStr for OrderCountFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(OrderCountFilter::Any);
        }

        let invalid = || {
            CoreError::Validation(ValidationError::InvalidFormat {
                field: "orders".to_string(),
                reason: format!("expected a count like 3 or 5+, got {s:?}"),
            })
        };

        match s.strip_suffix('+') {
            Some(n) => n.trim().parse().map(OrderCountFilter::AtLeast).map_err(|_| invalid()),
            None => s.parse().map(OrderCountFilter::Exactly).map_err(|_| invalid()),
        }
    }
}

/// Customer list query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerQuery {
    /// Name (case-insensitive), phone or email.
    pub search: Option<String>,
    pub order_count: OrderCountFilter,
    /// Customer bought something in this product category.
    pub category: Option<String>,
    /// Customer bought this product.
    pub product_id: Option<String>,
}

impl CustomerQuery {
    /// Filters customers, then sorts by order count descending.
    ///
    /// Purchase history is matched through orders carrying the same phone
    /// number, with categories looked up in the product list.
    pub fn apply<'a>(
        &self,
        customers: &'a [Customer],
        orders: &[Order],
        products: &[InventoryProduct],
    ) -> Vec<&'a Customer> {
        let catalog: HashMap<&str, &InventoryProduct> =
            products.iter().map(|p| (p.id.as_str(), p)).collect();
        let category = non_blank(&self.category);
        let product_id = non_blank(&self.product_id);

        let purchased = |customer: &Customer| -> bool {
            orders
                .iter()
                .filter(|o| o.customer.phone == customer.phone)
                .flat_map(|o| o.line_items.iter())
                .filter_map(|item| catalog.get(item.id.as_str()))
                .any(|p| {
                    category.map_or(true, |c| p.category == c)
                        && product_id.map_or(true, |id| p.id == id)
                })
        };

        let mut result: Vec<&Customer> = customers
            .iter()
            .filter(|c| self.matches_search(c))
            .filter(|c| self.order_count.matches(c.order_count))
            .filter(|c| (category.is_none() && product_id.is_none()) || purchased(c))
            .collect();

        result.sort_by(|a, b| b.order_count.cmp(&a.order_count));
        result
    }

    fn matches_search(&self, customer: &Customer) -> bool {
        let Some(term) = non_blank(&self.search) else {
            return true;
        };
        let lower = term.to_lowercase();
        customer.name.to_lowercase().contains(&lower)
            || customer.phone.contains(term)
            || customer.email.to_lowercase().contains(&lower)
    }
}

// =============================================================================
// Courier Consignments
// =============================================================================

/// Orders handed to `courier`, optionally searched, newest first.
///
/// Search matches order id, tracking code, or customer name
/// (case-insensitive).
pub fn courier_orders<'a>(orders: &'a [Order], courier: Courier, search: Option<&str>) -> Vec<&'a Order> {
    let term = search.map(str::trim).filter(|s| !s.is_empty());

    let mut result: Vec<&Order> = orders
        .iter()
        .filter(|o| o.courier_tracking_code.as_deref().is_some_and(|c| !c.is_empty()))
        .filter(|o| o.courier() == Some(courier))
        .filter(|o| {
            term.map_or(true, |t| {
                o.id.contains(t)
                    || o.courier_tracking_code.as_deref().is_some_and(|c| c.contains(t))
                    || o.customer.name.to_lowercase().contains(&t.to_lowercase())
            })
        })
        .collect();

    result.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    result
}

/// Consignments for `courier` that are still in flight.
pub fn active_shipments(orders: &[Order], courier: Courier) -> usize {
    courier_orders(orders, courier, None)
        .into_iter()
        .filter(|o| {
            !matches!(
                o.status,
                OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Refunded
            )
        })
        .count()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================
