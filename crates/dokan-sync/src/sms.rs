//! # SMS
//!
//! SMS relay client, per-status automation, and paced bulk sending.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  StatusTransition ──► SmsAutomation::notify(order, status)             │
//! │                          │                                              │
//! │                          ├── load sms_config ─┐  (concurrently)         │
//! │                          ├── load automation ─┘                         │
//! │                          ├── no api key?  → skip                        │
//! │                          ├── rule disabled / blank template? → skip     │
//! │                          └── render → SmsSender::send (once, no retry)  │
//! │                                                                         │
//! │  Bulk request ──► BulkSender::send_all                                 │
//! │                     for each phone: personalise [name] → send → log    │
//! │                     sleep(bulk_delay) between sends                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use dokan_core::automation::first_name;
use dokan_core::validation::{normalize_sms_phone, validate_sms_body, SmsEncoding};
use dokan_core::{Customer, Order, OrderStatus};
use dokan_store::{SettingsRepository, SmsConfig};

use crate::error::{SyncError, SyncResult};
use crate::source::{SmsSender, StatusNotifier};

// =============================================================================
// Gateway
// =============================================================================

/// Relay response, `{success, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsResponse {
    pub success: bool,
    pub message: String,
}

impl SmsResponse {
    fn failed(message: impl Into<String>) -> Self {
        SmsResponse {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    api_key: &'a str,
    senderid: &'a str,
    #[serde(rename = "type")]
    encoding: SmsEncoding,
    msg: &'a str,
    contacts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

/// Client for the `send_sms.php` relay.
#[derive(Debug, Clone)]
pub struct SmsGateway {
    http: reqwest::Client,
    relay_url: Url,
}

impl SmsGateway {
    pub fn new(http: reqwest::Client, relay_url: Url) -> Self {
        SmsGateway { http, relay_url }
    }
}

#[async_trait]
impl SmsSender for SmsGateway {
    async fn send(&self, config: &SmsConfig, phone: &str, message: &str) -> SmsResponse {
        let body = RelayRequest {
            api_key: &config.api_key,
            senderid: &config.sender_id,
            encoding: SmsEncoding::detect(message),
            msg: message,
            contacts: normalize_sms_phone(phone),
            url: Some(config.endpoint.as_str()).filter(|e| !e.trim().is_empty()),
        };

        let response = match self.http.post(self.relay_url.clone()).json(&body).send().await {
            Ok(response) => response,
            Err(e) => return SmsResponse::failed(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            return SmsResponse::failed(format!("Server Error: {status}"));
        }

        match response.json::<SmsResponse>().await {
            Ok(parsed) => parsed,
            Err(e) => SmsResponse::failed(format!("Invalid response from SMS relay: {e}")),
        }
    }
}

// =============================================================================
// Automation
// =============================================================================

/// Sends the configured SMS when an order enters a status.
#[derive(Clone)]
pub struct SmsAutomation {
    settings: SettingsRepository,
    sender: Arc<dyn SmsSender>,
}

impl SmsAutomation {
    pub fn new(settings: SettingsRepository, sender: Arc<dyn SmsSender>) -> Self {
        SmsAutomation { settings, sender }
    }
}

#[async_trait]
impl StatusNotifier for SmsAutomation {
    async fn notify(&self, order: &Order, status: OrderStatus) -> SyncResult<Option<SmsResponse>> {
        let (config, rules) = tokio::try_join!(
            self.settings.sms_config(),
            self.settings.sms_automation_config()
        )?;

        let Some(config) = config.filter(SmsConfig::is_configured) else {
            debug!(order_id = %order.id, "SMS not configured, automation skipped");
            return Ok(None);
        };

        let Some(message) = rules.message_for(order, status) else {
            return Ok(None);
        };

        if order.customer.phone.trim().is_empty() {
            warn!(order_id = %order.id, "Order has no phone, automation skipped");
            return Ok(None);
        }

        let response = self.sender.send(&config, &order.customer.phone, &message).await;
        if response.success {
            info!(order_id = %order.id, status = %status, "Automation SMS sent");
        } else {
            warn!(order_id = %order.id, status = %status, reason = %response.message, "Automation SMS failed");
        }
        Ok(Some(response))
    }
}

// =============================================================================
// Bulk Sending
// =============================================================================

/// Delivery outcome of one bulk entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    Sent,
    Failed,
}

/// One line of the bulk send log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendLog {
    pub phone: String,
    pub status: SendStatus,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Summary of a bulk send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkReport {
    pub sent: usize,
    pub failed: usize,
    pub log: Vec<SendLog>,
}

/// Sends one message to many recipients, one at a time.
#[derive(Clone)]
pub struct BulkSender {
    sender: Arc<dyn SmsSender>,
    delay: Duration,
}

impl BulkSender {
    pub fn new(sender: Arc<dyn SmsSender>, delay: Duration) -> Self {
        BulkSender { sender, delay }
    }

    /// Sends `template` to every phone.
    ///
    /// `[name]` becomes the first name of the customer with that phone,
    /// or "Customer" when the phone is not in `customers`. A failed send
    /// is logged and the loop continues.
    pub async fn send_all(
        &self,
        config: &SmsConfig,
        phones: &[String],
        template: &str,
        customers: &[Customer],
    ) -> SyncResult<BulkReport> {
        if !config.is_configured() {
            return Err(SyncError::NotConfigured("SMS API is not configured".to_string()));
        }
        validate_sms_body(template)?;

        let names: HashMap<&str, &str> = customers
            .iter()
            .map(|c| (c.phone.as_str(), c.name.as_str()))
            .collect();

        let mut report = BulkReport::default();
        for (i, phone) in phones.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.delay).await;
            }

            let name = names.get(phone.as_str()).map_or("Customer", |n| first_name(n));
            let message = template.replace("[name]", name);
            let response = self.sender.send(config, phone, &message).await;

            let status = if response.success {
                report.sent += 1;
                SendStatus::Sent
            } else {
                report.failed += 1;
                SendStatus::Failed
            };
            let message = if response.message.is_empty() {
                "Unknown error occurred".to_string()
            } else {
                response.message
            };

            report.log.push(SendLog {
                phone: phone.clone(),
                status,
                message,
                at: Utc::now(),
            });
        }

        info!(sent = report.sent, failed = report.failed, "Bulk SMS finished");
        Ok(report)
    }

    /// Runs [`send_all`](Self::send_all) on its own task.
    ///
    /// Once started the loop runs to completion even if the returned
    /// handle is dropped.
    pub fn spawn_send(
        &self,
        config: SmsConfig,
        phones: Vec<String>,
        template: String,
        customers: Vec<Customer>,
    ) -> JoinHandle<SyncResult<BulkReport>> {
        let bulk = self.clone();
        tokio::spawn(async move { bulk.send_all(&config, &phones, &template, &customers).await })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
