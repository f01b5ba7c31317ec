//! # Domain Types
//!
//! Core domain types used throughout Dokan.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │ TrackingRecord  │   │    Expense      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (platform)  │◄──│  id (order id)  │   │  id (UUID)      │       │
//! │  │  status         │   │  tracking code  │   │  category       │       │
//! │  │  customer       │   │  courier_status │   │  amount         │       │
//! │  │  line_items     │   │  courier_name   │   │  date           │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  OrderStatus    │   │    Courier      │   │InventoryProduct │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  7 canonical    │   │  Steadfast      │   │  id, price      │       │
//! │  │  values         │   │  Pathao         │   │  stock, image   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! Orders, products and categories are owned by the commerce platform.
//! Tracking records, expenses and customers live behind the key-value
//! endpoints. Dokan only ever holds an in-memory copy.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Order Status
// =============================================================================

/// The canonical order status.
///
/// Every source (platform status, courier status strings) is reduced to
/// exactly one of these seven values.
///
/// ## Wire Format
/// Lowercase, with `on-hold` hyphenated, the same strings WooCommerce uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
}

impl OrderStatus {
    /// All statuses in display order.
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::OnHold,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
        OrderStatus::Failed,
    ];

    /// Wire string (`"on-hold"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::OnHold => "on-hold",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Failed => "failed",
        }
    }

    /// Human label (`"On Hold"`).
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::OnHold => "On Hold",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Refunded => "Refunded",
            OrderStatus::Failed => "Failed",
        }
    }

    /// Parses a platform status, falling back to `Pending` for anything
    /// outside the canonical set (custom WooCommerce statuses, drafts).
    pub fn from_platform(raw: &str) -> OrderStatus {
        raw.parse().unwrap_or(OrderStatus::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

// =============================================================================
// Courier
// =============================================================================

/// Third-party delivery partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Courier {
    Steadfast,
    Pathao,
}

impl Courier {
    /// Guesses the courier from a consignment tracking code.
    ///
    /// Pathao consignment ids are purely numeric; Steadfast codes are
    /// alphanumeric. An empty code defaults to Steadfast.
    ///
    /// ## Example
    /// ```rust
    /// use dokan_core::Courier;
    ///
    /// assert_eq!(Courier::identify("231012ABCD"), Courier::Steadfast);
    /// assert_eq!(Courier::identify("4401298"), Courier::Pathao);
    /// assert_eq!(Courier::identify(""), Courier::Steadfast);
    /// ```
    pub fn identify(tracking_code: &str) -> Courier {
        if !tracking_code.is_empty() && tracking_code.bytes().all(|b| b.is_ascii_digit()) {
            Courier::Pathao
        } else {
            Courier::Steadfast
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Courier::Steadfast => "Steadfast",
            Courier::Pathao => "Pathao",
        }
    }
}

impl fmt::Display for Courier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Courier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "steadfast" => Ok(Courier::Steadfast),
            "pathao" => Ok(Courier::Pathao),
            _ => Err(CoreError::UnknownCourier(s.to_string())),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// Customer snapshot, either embedded in an order or from the customer list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "de::string_or_null")]
    pub email: String,

    #[serde(default, deserialize_with = "de::string_or_null")]
    pub phone: String,

    #[serde(default, deserialize_with = "de::string_or_null")]
    pub avatar: String,

    /// Orders placed by this customer. Zero for embedded order snapshots.
    #[serde(default, deserialize_with = "de::lenient_u32")]
    pub order_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_spent: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

// =============================================================================
// Order
// =============================================================================

/// One purchased line on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Platform product id.
    pub id: String,
    pub name: String,
    pub price: Money,
    pub qty: u32,
    pub image: String,
}

/// A storefront order with its courier overlay.
///
/// ## Status Ownership
/// ```text
/// platform status ──┐
///                   ├──► overlay_tracking ──► Order.status
/// courier_status ───┘   (courier wins when present)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,

    /// Creation time reported by the platform.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    pub customer: Customer,
    pub address: String,
    pub line_items: Vec<LineItem>,
    pub payment_method: String,

    /// `total - shipping`.
    pub subtotal: Money,
    pub shipping: Money,
    pub discount: Money,
    pub total: Money,

    pub status: OrderStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courier_name: Option<Courier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courier_tracking_code: Option<String>,

    /// Raw status string last reported by the courier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courier_status: Option<String>,
}

impl Order {
    /// Sum of line quantities.
    pub fn item_count(&self) -> u32 {
        self.line_items.iter().map(|item| item.qty).sum()
    }

    /// Calendar date the order was placed (UTC).
    pub fn placed_on(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Courier handling this order, if a consignment exists.
    ///
    /// Uses the stored courier name, falling back to identifying it from
    /// the tracking code.
    pub fn courier(&self) -> Option<Courier> {
        match (&self.courier_name, &self.courier_tracking_code) {
            (Some(courier), _) => Some(*courier),
            (None, Some(code)) if !code.is_empty() => Some(Courier::identify(code)),
            _ => None,
        }
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// A product from the commerce platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryProduct {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: Money,
    pub stock: i64,
    /// `true` when the platform status is `publish`.
    pub published: bool,
    pub image: String,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub count: u64,
}

// =============================================================================
// Expense
// =============================================================================

/// A business expense recorded from the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Expense {
    pub id: String,
    pub category: String,
    pub amount: Money,

    /// Date the expense applies to (`YYYY-MM-DD`).
    #[ts(as = "String")]
    pub date: NaiveDate,

    #[serde(default)]
    pub description: String,

    /// Creation time, epoch milliseconds on the wire.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(as = "i64")]
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Tracking Record
// =============================================================================

/// Association between an order and its courier consignment.
///
/// This is the authoritative source of courier state. The key-value
/// endpoint returns ids as numbers or strings, both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrackingRecord {
    /// Order id this consignment belongs to.
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,

    #[serde(default, deserialize_with = "de::string_or_null")]
    pub courier_tracking_code: String,

    #[serde(default)]
    pub courier_status: Option<String>,

    #[serde(default)]
    pub courier_name: Option<String>,
}

impl TrackingRecord {
    /// Resolves the courier: the stored name when it parses, otherwise
    /// identified from the tracking code.
    pub fn courier(&self) -> Courier {
        self.courier_name
            .as_deref()
            .and_then(|name| name.parse().ok())
            .unwrap_or_else(|| Courier::identify(&self.courier_tracking_code))
    }

    /// Courier status, ignoring blank strings.
    pub fn status(&self) -> Option<&str> {
        self.courier_status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

// =============================================================================
// Lenient Deserializers
// =============================================================================

/// The PHP endpoints are loosely typed; these helpers absorb the variance.
pub(crate) mod de {
    use super::*;
    use serde_json::Value;

    pub fn string_or_null<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
    }

    pub fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Value::deserialize(d)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number, got {other}"
            ))),
        }
    }

    pub fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()).unwrap_or(0),
            Value::String(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_strings() {
        assert_eq!(serde_json::to_string(&OrderStatus::OnHold).unwrap(), "\"on-hold\"");
        let parsed: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn test_status_from_str_is_forgiving() {
        assert_eq!("On Hold".parse::<OrderStatus>().unwrap(), OrderStatus::OnHold);
        assert_eq!("on_hold".parse::<OrderStatus>().unwrap(), OrderStatus::OnHold);
        assert_eq!(" COMPLETED ".parse::<OrderStatus>().unwrap(), OrderStatus::Completed);
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::from_platform("checkout-draft"), OrderStatus::Pending);
    }

    #[test]
    fn test_courier_identify() {
        assert_eq!(Courier::identify("12345678"), Courier::Pathao);
        assert_eq!(Courier::identify("SFR123"), Courier::Steadfast);
        assert_eq!(Courier::identify(""), Courier::Steadfast);
        assert_eq!("pathao".parse::<Courier>().unwrap(), Courier::Pathao);
        assert!("redx".parse::<Courier>().is_err());
    }

    #[test]
    fn test_tracking_record_accepts_numeric_id() {
        let json = r#"{"id": 1042, "courier_tracking_code": "99887766", "courier_status": "", "courier_name": null}"#;
        let record: TrackingRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, "1042");
        assert_eq!(record.status(), None);
        assert_eq!(record.courier(), Courier::Pathao);
    }

    #[test]
    fn test_tracking_record_named_courier_wins() {
        let record = TrackingRecord {
            id: "7".to_string(),
            courier_tracking_code: "12345".to_string(),
            courier_status: Some("in_review".to_string()),
            courier_name: Some("Steadfast".to_string()),
        };
        assert_eq!(record.courier(), Courier::Steadfast);
        assert_eq!(record.status(), Some("in_review"));
    }

    #[test]
    fn test_customer_tolerates_php_types() {
        let json = r#"{"name": "Rahim", "phone": "01711000000", "email": null, "avatar": "", "orderCount": "4"}"#;
        let customer: Customer = serde_json::from_str(json).unwrap();

        assert_eq!(customer.order_count, 4);
        assert_eq!(customer.email, "");
    }

    #[test]
    fn test_expense_wire_format() {
        let json = r#"{"id":"e1","category":"Rent","amount":15000,"date":"2024-03-01","description":"March","timestamp":1709251200000}"#;
        let expense: Expense = serde_json::from_str(json).unwrap();

        assert_eq!(expense.amount, Money::from_taka(15000));
        assert_eq!(expense.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(expense.timestamp.timestamp_millis(), 1709251200000);
    }
}
