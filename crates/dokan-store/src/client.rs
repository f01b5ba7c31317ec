//! # Store Client
//!
//! HTTP access to the PHP helper endpoints that persist Dokan's own data.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Key-Value Store Access                             │
//! │                                                                         │
//! │  Daemon startup                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreConfig::from_base(url) ← endpoint URLs, timeout, retry policy    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store::new(config) ← one shared reqwest::Client (connection pool)     │
//! │       │                                                                 │
//! │       ├── store.settings()   → GET/POST api/settings.php               │
//! │       ├── store.tracking()   → GET/POST api/local_tracking.php         │
//! │       ├── store.expenses()   → settings key "business_expenses"        │
//! │       └── store.customers()  → GET/POST api/customers.php              │
//! │                                                                         │
//! │  Reads retry with backoff. Writes go out exactly once.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::error::{StoreError, StoreResult};
use crate::repository::customer::CustomerRepository;
use crate::repository::expense::ExpenseRepository;
use crate::repository::settings::SettingsRepository;
use crate::repository::tracking::TrackingRepository;
use crate::retry::RetryPolicy;

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
///
/// ## Example
/// ```rust,ignore
/// let base = Url::parse("https://shop.example.com/")?;
/// let config = StoreConfig::from_base(&base)?
///     .timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Generic settings endpoint (`?key=` reads, `{key, value}` writes).
    pub settings_url: Url,

    /// Courier tracking records.
    pub tracking_url: Url,

    /// Customer directory.
    pub customers_url: Url,

    /// Per-request timeout.
    /// Default: 30 seconds
    pub timeout: Duration,

    /// Retry policy for reads.
    pub retry: RetryPolicy,
}

impl StoreConfig {
    /// Derives the standard endpoint layout under `base`.
    pub fn from_base(base: &Url) -> StoreResult<Self> {
        let base = with_trailing_slash(base);
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| StoreError::Config(format!("cannot join {path} onto {base}: {e}")))
        };

        Ok(StoreConfig {
            settings_url: join("api/settings.php")?,
            tracking_url: join("api/local_tracking.php")?,
            customers_url: join("api/customers.php")?,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        })
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

fn with_trailing_slash(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

// =============================================================================
// Store
// =============================================================================

/// Handle providing repository access.
///
/// Cheap to clone; every clone shares the same connection pool.
#[derive(Debug, Clone)]
pub struct Store {
    http: StoreHttp,
    config: Arc<StoreConfig>,
}

impl Store {
    /// Builds a store with its own HTTP client.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {e}")))?;

        info!(
            settings = %config.settings_url,
            tracking = %config.tracking_url,
            customers = %config.customers_url,
            "Store endpoints configured"
        );

        Ok(Self::with_client(client, config))
    }

    /// Builds a store around an existing client (shared with other services).
    pub fn with_client(client: reqwest::Client, config: StoreConfig) -> Self {
        Store {
            http: StoreHttp {
                client,
                retry: config.retry.clone(),
            },
            config: Arc::new(config),
        }
    }

    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.http.clone(), self.config.settings_url.clone())
    }

    pub fn tracking(&self) -> TrackingRepository {
        TrackingRepository::new(self.http.clone(), self.config.tracking_url.clone())
    }

    pub fn expenses(&self) -> ExpenseRepository {
        ExpenseRepository::new(self.settings())
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.http.clone(), self.config.customers_url.clone())
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &reqwest::Client {
        &self.http.client
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

// =============================================================================
// HTTP Helpers
// =============================================================================

/// Thin request helper shared by every repository.
#[derive(Debug, Clone)]
pub(crate) struct StoreHttp {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl StoreHttp {
    /// GET returning the raw body, retried on transient failures.
    pub(crate) async fn get_text(&self, url: Url) -> StoreResult<String> {
        let endpoint = endpoint_name(&url);
        self.retry
            .run(&endpoint, || {
                let url = url.clone();
                let endpoint = endpoint.clone();
                async move {
                    debug!(%url, "GET");
                    let response = self
                        .client
                        .get(url)
                        .send()
                        .await
                        .map_err(|e| StoreError::transport(&endpoint, e))?;
                    read_body(&endpoint, response).await
                }
            })
            .await
    }

    /// POST a JSON body once and return the raw response body.
    pub(crate) async fn post_json<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> StoreResult<String> {
        let endpoint = endpoint_name(&url);
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::transport(&endpoint, e))?;
        read_body(&endpoint, response).await
    }
}

async fn read_body(endpoint: &str, response: reqwest::Response) -> StoreResult<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| StoreError::transport(endpoint, e))?;

    if !status.is_success() {
        return Err(StoreError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

/// Last path segment, used to label logs and errors (`settings.php`).
pub(crate) fn endpoint_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back().map(str::to_string))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| url.to_string())
}

/// True for bodies the PHP endpoints use to mean "nothing stored".
pub(crate) fn is_empty_body(body: &str) -> bool {
    let trimmed = body.trim();
    trimmed.is_empty() || trimmed == "null"
}
