//! # Settings Repository
//!
//! Typed access to the generic key-value settings endpoint.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  READ   GET  settings.php?key=sms_config                               │
//! │         ◄──  "{\"apiKey\":\"k\",\"senderId\":\"Shop\"}"   (double)      │
//! │         ◄──  {"apiKey":"k","senderId":"Shop"}             (plain)       │
//! │         ◄──  null  /  (empty body)                        → None        │
//! │                                                                         │
//! │  WRITE  POST settings.php                                              │
//! │         ──►  {"key":"sms_config","value":"{\"apiKey\":\"k\",...}"}      │
//! │              value is always a JSON-encoded string                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Older writers stored values already stringified, so a read decodes a
//! second time whenever the first pass yields a JSON string.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use dokan_core::AutomationConfig;

use crate::client::{endpoint_name, is_empty_body, StoreHttp};
use crate::error::{StoreError, StoreResult};

/// Setting keys used by the dashboard.
pub mod keys {
    pub const WP_CONFIG: &str = "wp_config";
    pub const COURIER_CONFIG: &str = "courier_config";
    pub const PATHAO_CONFIG: &str = "pathao_config";
    pub const SMS_CONFIG: &str = "sms_config";
    pub const SMS_AUTOMATION_CONFIG: &str = "sms_automation_config";
    pub const SMS_TEMPLATES: &str = "sms_templates";
    pub const BUSINESS_EXPENSES: &str = "business_expenses";
}

/// Default SMS relay provider endpoint.
pub const DEFAULT_SMS_ENDPOINT: &str = "https://sms.mram.com.bd/smsapi";

// =============================================================================
// Stored Configuration Types
// =============================================================================

/// WooCommerce REST credentials (`wp_config`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WpConfig {
    pub url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
}

impl WpConfig {
    /// Both the store URL and the consumer key are present.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.consumer_key.trim().is_empty()
    }
}

/// Steadfast credentials (`courier_config`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourierConfig {
    pub api_key: String,
    pub secret_key: String,
}

impl CourierConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.secret_key.trim().is_empty()
    }
}

/// Pathao merchant credentials (`pathao_config`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathaoConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub store_id: String,
    pub is_sandbox: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,
}

impl Default for PathaoConfig {
    fn default() -> Self {
        PathaoConfig {
            client_id: String::new(),
            client_secret: String::new(),
            username: String::new(),
            password: String::new(),
            store_id: String::new(),
            is_sandbox: true,
            webhook_secret: None,
        }
    }
}

impl PathaoConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty()
    }
}

/// SMS relay credentials (`sms_config`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmsConfig {
    /// Provider endpoint forwarded to the relay.
    pub endpoint: String,
    pub api_key: String,
    pub sender_id: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        SmsConfig {
            endpoint: DEFAULT_SMS_ENDPOINT.to_string(),
            api_key: String::new(),
            sender_id: String::new(),
        }
    }
}

impl SmsConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// A saved bulk SMS template (`sms_templates`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsTemplate {
    pub id: String,
    pub name: String,
    pub content: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the settings endpoint.
///
/// ## Usage
/// ```rust,ignore
/// let settings = store.settings();
///
/// let wp = settings.wp_config().await?;          // Option<WpConfig>
/// let rules = settings.sms_automation_config().await?; // defaults when absent
/// settings.put("sms_templates", &templates).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    http: StoreHttp,
    url: Url,
}

impl SettingsRepository {
    pub(crate) fn new(http: StoreHttp, url: Url) -> Self {
        SettingsRepository { http, url }
    }

    /// Reads and decodes a setting.
    ///
    /// ## Returns
    /// - `Ok(None)` for an empty body or `null`
    /// - `Err(StoreError::Status)` for a non-2xx response
    /// - `Err(StoreError::Decode)` when the value does not fit `T`
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("key", key);

        let body = self.http.get_text(url).await?;
        let Some(value) = decode_setting(&endpoint_name(&self.url), &body)? else {
            debug!(key = %key, "Setting not stored");
            return Ok(None);
        };

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::decode(key, e))
    }

    /// Stores a setting, JSON-encoding `value` into the `value` string.
    pub async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let encoded = serde_json::to_string(value).map_err(|e| StoreError::decode(key, e))?;
        let body = serde_json::json!({ "key": key, "value": encoded });

        self.http.post_json(self.url.clone(), &body).await?;
        debug!(key = %key, "Setting saved");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Typed accessors
    // -------------------------------------------------------------------------

    pub async fn wp_config(&self) -> StoreResult<Option<WpConfig>> {
        self.get(keys::WP_CONFIG).await
    }

    pub async fn save_wp_config(&self, config: &WpConfig) -> StoreResult<()> {
        self.put(keys::WP_CONFIG, config).await
    }

    pub async fn courier_config(&self) -> StoreResult<Option<CourierConfig>> {
        self.get(keys::COURIER_CONFIG).await
    }

    pub async fn save_courier_config(&self, config: &CourierConfig) -> StoreResult<()> {
        self.put(keys::COURIER_CONFIG, config).await
    }

    /// Pathao credentials, or an empty sandbox config when none are stored.
    pub async fn pathao_config(&self) -> StoreResult<PathaoConfig> {
        Ok(self.get(keys::PATHAO_CONFIG).await?.unwrap_or_default())
    }

    pub async fn save_pathao_config(&self, config: &PathaoConfig) -> StoreResult<()> {
        self.put(keys::PATHAO_CONFIG, config).await
    }

    pub async fn sms_config(&self) -> StoreResult<Option<SmsConfig>> {
        self.get(keys::SMS_CONFIG).await
    }

    pub async fn save_sms_config(&self, config: &SmsConfig) -> StoreResult<()> {
        self.put(keys::SMS_CONFIG, config).await
    }

    /// Automation rules; missing statuses keep their disabled defaults.
    pub async fn sms_automation_config(&self) -> StoreResult<AutomationConfig> {
        Ok(self
            .get(keys::SMS_AUTOMATION_CONFIG)
            .await?
            .unwrap_or_default())
    }

    pub async fn save_sms_automation_config(&self, config: &AutomationConfig) -> StoreResult<()> {
        self.put(keys::SMS_AUTOMATION_CONFIG, config).await
    }

    pub async fn sms_templates(&self) -> StoreResult<Vec<SmsTemplate>> {
        Ok(self.get(keys::SMS_TEMPLATES).await?.unwrap_or_default())
    }

    pub async fn save_sms_templates(&self, templates: &[SmsTemplate]) -> StoreResult<()> {
        self.put(keys::SMS_TEMPLATES, templates).await
    }
}

/// Parses a settings body, unwrapping one level of string encoding.
fn decode_setting(endpoint: &str, body: &str) -> StoreResult<Option<Value>> {
    if is_empty_body(body) {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(body).map_err(|e| StoreError::decode(endpoint, e))?;
    match value {
        Value::Null => Ok(None),
        Value::String(inner) => {
            if is_empty_body(&inner) {
                return Ok(None);
            }
            serde_json::from_str(&inner)
                .map(Some)
                .map_err(|e| StoreError::decode(endpoint, e))
        }
        other => Ok(Some(other)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::store_for;
    use dokan_core::OrderStatus;
    use mockito::Matcher;

    #[test]
    fn test_decode_plain_and_double_encoded() {
        let plain = decode_setting("settings.php", r#"{"apiKey":"k"}"#).unwrap();
        let double = decode_setting("settings.php", r#""{\"apiKey\":\"k\"}""#).unwrap();
        assert_eq!(plain, double);
        assert_eq!(plain.unwrap()["apiKey"], "k");
    }

    #[test]
    fn test_decode_empty_and_null() {
        assert!(decode_setting("s", "").unwrap().is_none());
        assert!(decode_setting("s", "null").unwrap().is_none());
        assert!(decode_setting("s", r#""null""#).unwrap().is_none());
        assert!(decode_setting("s", "<b>Warning</b>").is_err());
    }

    #[tokio::test]
    async fn test_get_double_encoded_setting() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/settings.php")
            .match_query(Matcher::UrlEncoded("key".into(), "sms_config".into()))
            .with_body(r#""{\"apiKey\":\"abc\",\"senderId\":\"Dokan\"}""#)
            .create_async()
            .await;

        let store = store_for(&server.url());
        let config = store.settings().sms_config().await.unwrap().unwrap();

        assert_eq!(config.api_key, "abc");
        assert_eq!(config.sender_id, "Dokan");
        assert_eq!(config.endpoint, DEFAULT_SMS_ENDPOINT);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_settings_use_defaults() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/settings.php")
            .match_query(Matcher::Any)
            .with_body("null")
            .create_async()
            .await;

        let settings = store_for(&server.url()).settings();

        assert!(settings.wp_config().await.unwrap().is_none());
        assert!(settings.pathao_config().await.unwrap().is_sandbox);
        assert_eq!(
            settings.sms_automation_config().await.unwrap(),
            AutomationConfig::default()
        );
        assert!(settings.sms_templates().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/settings.php")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let err = store_for(&server.url())
            .settings()
            .courier_config()
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_put_encodes_value_as_string() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/settings.php")
            .match_body(Matcher::Json(serde_json::json!({
                "key": "courier_config",
                "value": r#"{"apiKey":"a","secretKey":"s"}"#
            })))
            .with_body(r#"{"status":"success"}"#)
            .create_async()
            .await;

        let config = CourierConfig {
            api_key: "a".to_string(),
            secret_key: "s".to_string(),
        };
        store_for(&server.url())
            .settings()
            .save_courier_config(&config)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_automation_config_status_keys() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/settings.php")
            .match_query(Matcher::UrlEncoded(
                "key".into(),
                "sms_automation_config".into(),
            ))
            .with_body(r#"{"on-hold":{"enabled":true,"template":"Hold [name]"}}"#)
            .create_async()
            .await;

        let config = store_for(&server.url())
            .settings()
            .sms_automation_config()
            .await
            .unwrap();

        assert!(config.rule(OrderStatus::OnHold).enabled);
        assert!(!config.rule(OrderStatus::Completed).enabled);
    }

    #[test]
    fn test_configured_checks() {
        assert!(!WpConfig::default().is_configured());
        assert!(WpConfig {
            url: "https://shop.example".to_string(),
            consumer_key: "ck".to_string(),
            consumer_secret: String::new(),
        }
        .is_configured());
        assert!(!SmsConfig::default().is_configured());
        assert!(!PathaoConfig::default().is_configured());
    }
}
