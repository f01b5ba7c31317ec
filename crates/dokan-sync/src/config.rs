//! # Daemon Configuration
//!
//! Configuration for the sync engine and the dashboard daemon.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     DOKAN_BASE_URL=https://shop.example.com/                           │
//! │     DOKAN_SYNC_INTERVAL_SECS=120                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/dashboard/config.toml (Linux)                            │
//! │     ~/Library/Application Support/com.dokan.dashboard/config.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost endpoints, 5 minute background refresh                   │
//! │                                                                         │
//! │  Remote credentials (WooCommerce, couriers, SMS) are NOT here: they    │
//! │  live in the settings store. [commerce] is an optional override.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [endpoints]
//! base_url = "https://shop.example.com/"
//! # settings = "https://shop.example.com/api/settings.php"
//!
//! [sync]
//! interval_secs = 300
//! customer_sync_limit = 100
//!
//! [sms]
//! bulk_delay_ms = 200
//!
//! [server]
//! bind_addr = "127.0.0.1:8088"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use dokan_store::{RetryPolicy, StoreConfig, WpConfig};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Endpoints
// =============================================================================

/// Locations of the PHP helper endpoints.
///
/// Each endpoint defaults to a fixed path under `base_url`; setting one
/// explicitly overrides only that endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointSettings {
    /// Host serving the `api/*.php` helpers.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customers: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms_relay: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steadfast_proxy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathao_proxy: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost/".to_string()
}

impl Default for EndpointSettings {
    fn default() -> Self {
        EndpointSettings {
            base_url: default_base_url(),
            settings: None,
            tracking: None,
            customers: None,
            sms_relay: None,
            steadfast_proxy: None,
            pathao_proxy: None,
        }
    }
}

/// Fully resolved endpoint URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoints {
    pub settings: Url,
    pub tracking: Url,
    pub customers: Url,
    pub sms_relay: Url,
    pub steadfast_proxy: Url,
    pub pathao_proxy: Url,
}

impl EndpointSettings {
    /// Resolves every endpoint to an absolute URL.
    pub fn resolve(&self) -> SyncResult<ResolvedEndpoints> {
        let mut base = Url::parse(&self.base_url)
            .map_err(|e| SyncError::InvalidUrl(format!("base_url '{}': {e}", self.base_url)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let pick = |explicit: &Option<String>, default_path: &str| -> SyncResult<Url> {
            match explicit {
                Some(url) => Url::parse(url)
                    .map_err(|e| SyncError::InvalidUrl(format!("'{url}': {e}"))),
                None => Ok(base.join(default_path)?),
            }
        };

        Ok(ResolvedEndpoints {
            settings: pick(&self.settings, "api/settings.php")?,
            tracking: pick(&self.tracking, "api/local_tracking.php")?,
            customers: pick(&self.customers, "api/customers.php")?,
            sms_relay: pick(&self.sms_relay, "api/send_sms.php")?,
            steadfast_proxy: pick(&self.steadfast_proxy, "api/courier.php")?,
            pathao_proxy: pick(&self.pathao_proxy, "api/pathao_proxy.php")?,
        })
    }
}

// =============================================================================
// Commerce Override
// =============================================================================

/// Optional WooCommerce credentials that take precedence over the
/// `wp_config` setting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommerceSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub consumer_key: String,
    #[serde(default)]
    pub consumer_secret: String,
}

impl CommerceSettings {
    pub fn as_wp_config(&self) -> WpConfig {
        WpConfig {
            url: self.url.clone(),
            consumer_key: self.consumer_key.clone(),
            consumer_secret: self.consumer_secret.clone(),
        }
    }
}

// =============================================================================
// Sync Settings
// =============================================================================

/// Refresh loop behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Seconds between background refreshes.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Newest orders whose customers are upserted on a foreground refresh.
    #[serde(default = "default_customer_sync_limit")]
    pub customer_sync_limit: usize,

    /// Customer upserts sent concurrently per batch.
    #[serde(default = "default_customer_batch_size")]
    pub customer_batch_size: usize,

    /// Pause between customer batches (milliseconds).
    #[serde(default = "default_customer_batch_pause")]
    pub customer_batch_pause_ms: u64,

    /// Per-request timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Retries for idempotent GETs. Writes are never retried.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First retry delay (milliseconds), doubled per attempt.
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
}

fn default_interval() -> u64 {
    300
}
fn default_customer_sync_limit() -> usize {
    100
}
fn default_customer_batch_size() -> usize {
    5
}
fn default_customer_batch_pause() -> u64 {
    50
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_initial_backoff() -> u64 {
    250
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            interval_secs: default_interval(),
            customer_sync_limit: default_customer_sync_limit(),
            customer_batch_size: default_customer_batch_size(),
            customer_batch_pause_ms: default_customer_batch_pause(),
            request_timeout_secs: default_request_timeout(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
        }
    }
}

impl SyncSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            ..Default::default()
        }
    }
}

// =============================================================================
// SMS and Server Settings
// =============================================================================

/// Bulk SMS pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsSettings {
    /// Delay between consecutive bulk sends (milliseconds).
    #[serde(default = "default_bulk_delay")]
    pub bulk_delay_ms: u64,
}

fn default_bulk_delay() -> u64 {
    200
}

impl Default for SmsSettings {
    fn default() -> Self {
        SmsSettings {
            bulk_delay_ms: default_bulk_delay(),
        }
    }
}

/// HTTP API listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8088".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DokanConfig {
    #[serde(default)]
    pub endpoints: EndpointSettings,

    /// WooCommerce override; when absent the `wp_config` setting is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commerce: Option<CommerceSettings>,

    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub sms: SmsSettings,

    #[serde(default)]
    pub server: ServerSettings,
}

impl DokanConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (config.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        self.endpoints.resolve()?;

        if self.sync.interval_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "interval_secs must be greater than 0".into(),
            ));
        }

        if self.sync.customer_batch_size == 0 {
            return Err(SyncError::InvalidConfig(
                "customer_batch_size must be greater than 0".into(),
            ));
        }

        if let Some(commerce) = &self.commerce {
            if !commerce.url.is_empty() {
                Url::parse(&commerce.url).map_err(|e| {
                    SyncError::InvalidUrl(format!("commerce url '{}': {e}", commerce.url))
                })?;
            }
        }

        self.server
            .bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|e| {
                SyncError::InvalidConfig(format!("bind_addr '{}': {e}", self.server.bind_addr))
            })?;

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DOKAN_BASE_URL") {
            debug!(url = %url, "Overriding base URL from environment");
            self.endpoints.base_url = url;
        }

        if let Ok(url) = std::env::var("DOKAN_WC_URL") {
            self.commerce.get_or_insert_with(Default::default).url = url;
        }
        if let Ok(key) = std::env::var("DOKAN_WC_CONSUMER_KEY") {
            self.commerce.get_or_insert_with(Default::default).consumer_key = key;
        }
        if let Ok(secret) = std::env::var("DOKAN_WC_CONSUMER_SECRET") {
            self.commerce.get_or_insert_with(Default::default).consumer_secret = secret;
        }

        if let Ok(interval) = std::env::var("DOKAN_SYNC_INTERVAL_SECS") {
            match interval.parse::<u64>() {
                Ok(secs) => self.sync.interval_secs = secs,
                Err(_) => warn!(value = %interval, "Ignoring invalid DOKAN_SYNC_INTERVAL_SECS"),
            }
        }

        if let Ok(addr) = std::env::var("DOKAN_BIND_ADDR") {
            debug!(addr = %addr, "Overriding bind address from environment");
            self.server.bind_addr = addr;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "dokan", "dashboard")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Store configuration derived from the endpoint and sync sections.
    pub fn store_config(&self) -> SyncResult<StoreConfig> {
        let endpoints = self.endpoints.resolve()?;
        Ok(StoreConfig {
            settings_url: endpoints.settings,
            tracking_url: endpoints.tracking,
            customers_url: endpoints.customers,
            timeout: self.sync.request_timeout(),
            retry: self.sync.retry_policy(),
        })
    }

    /// Commerce override, only when it carries usable credentials.
    pub fn commerce_override(&self) -> Option<WpConfig> {
        self.commerce
            .as_ref()
            .map(CommerceSettings::as_wp_config)
            .filter(WpConfig::is_configured)
    }

    pub fn bulk_delay(&self) -> Duration {
        Duration::from_millis(self.sms.bulk_delay_ms)
    }
}
