//! # SMS Automation Rules
//!
//! Per-status SMS rules and template rendering. Sending lives in
//! `dokan-sync`; this module only decides *what* to send.
//!
//! ## Placeholders
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────────┐
//! │ Token            │ Replaced with                                    │
//! ├──────────────────┼──────────────────────────────────────────────────┤
//! │ [name]           │ customer first name, "Customer" when blank       │
//! │ [order_id]       │ order id                                         │
//! │ [tracking_code]  │ courier tracking code, "Pending" when absent     │
//! └──────────────────┴──────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,ignore
//! let config = AutomationConfig::default();
//! // All rules ship disabled; a stored config turns them on.
//! assert!(config.message_for(&order, OrderStatus::Completed).is_none());
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Order, OrderStatus};

/// Fallback for an empty customer name.
pub const DEFAULT_FIRST_NAME: &str = "Customer";

/// Fallback for an order that has not been handed to a courier.
pub const PENDING_TRACKING: &str = "Pending";

/// One status's automation setting.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AutomationRule {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub template: String,
}

impl AutomationRule {
    fn disabled(template: &str) -> Self {
        AutomationRule {
            enabled: false,
            template: template.to_string(),
        }
    }
}

/// Automation rules for every canonical status.
///
/// Stored under the `sms_automation_config` setting, keyed by status
/// string. Missing keys fall back to the disabled defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct AutomationConfig {
    pub pending: AutomationRule,
    pub processing: AutomationRule,
    #[serde(rename = "on-hold")]
    pub on_hold: AutomationRule,
    pub completed: AutomationRule,
    pub cancelled: AutomationRule,
    pub refunded: AutomationRule,
    pub failed: AutomationRule,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        AutomationConfig {
            pending: AutomationRule::disabled(
                "Hi [name], your order #[order_id] is pending payment.",
            ),
            processing: AutomationRule::disabled(
                "Hi [name], your order #[order_id] is being processed.",
            ),
            on_hold: AutomationRule::disabled("Hi [name], your order #[order_id] is on hold."),
            completed: AutomationRule::disabled(
                "Hi [name], your order #[order_id] has been completed! Tracking: [tracking_code]",
            ),
            cancelled: AutomationRule::disabled("Hi [name], your order #[order_id] was cancelled."),
            refunded: AutomationRule::disabled(
                "Hi [name], your order #[order_id] has been refunded.",
            ),
            failed: AutomationRule::disabled("Hi [name], your order #[order_id] has failed."),
        }
    }
}

impl AutomationConfig {
    /// Rule for a status.
    pub fn rule(&self, status: OrderStatus) -> &AutomationRule {
        match status {
            OrderStatus::Pending => &self.pending,
            OrderStatus::Processing => &self.processing,
            OrderStatus::OnHold => &self.on_hold,
            OrderStatus::Completed => &self.completed,
            OrderStatus::Cancelled => &self.cancelled,
            OrderStatus::Refunded => &self.refunded,
            OrderStatus::Failed => &self.failed,
        }
    }

    pub fn rule_mut(&mut self, status: OrderStatus) -> &mut AutomationRule {
        match status {
            OrderStatus::Pending => &mut self.pending,
            OrderStatus::Processing => &mut self.processing,
            OrderStatus::OnHold => &mut self.on_hold,
            OrderStatus::Completed => &mut self.completed,
            OrderStatus::Cancelled => &mut self.cancelled,
            OrderStatus::Refunded => &mut self.refunded,
            OrderStatus::Failed => &mut self.failed,
        }
    }

    /// Rendered message for an order entering `status`.
    ///
    /// `None` when the rule is disabled or its template is blank.
    pub fn message_for(&self, order: &Order, status: OrderStatus) -> Option<String> {
        let rule = self.rule(status);
        if !rule.enabled || rule.template.trim().is_empty() {
            return None;
        }
        Some(render_template(&rule.template, order))
    }
}

/// First whitespace-separated token of a name, or `"Customer"`.
///
/// ## Example
/// ```rust
/// use dokan_core::automation::first_name;
///
/// assert_eq!(first_name("Jane Doe"), "Jane");
/// assert_eq!(first_name("   "), "Customer");
/// ```
pub fn first_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(DEFAULT_FIRST_NAME)
}

/// Substitutes every placeholder in `template` from the order.
pub fn render_template(template: &str, order: &Order) -> String {
    let tracking = order
        .courier_tracking_code
        .as_deref()
        .filter(|code| !code.is_empty())
        .unwrap_or(PENDING_TRACKING);

    template
        .replace("[name]", first_name(&order.customer.name))
        .replace("[order_id]", &order.id)
        .replace("[tracking_code]", tracking)
}

// =============================================================================
// Unit Tests
// =============================================================================
