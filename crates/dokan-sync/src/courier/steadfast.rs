//! Steadfast client over the `courier.php` proxy.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use dokan_core::{Courier, Money, Order};
use dokan_store::{CourierConfig, Store};

use crate::error::{SyncError, SyncResult};

const SERVICE: &str = "steadfast";

/// Note attached to every consignment booked from the dashboard.
pub const CONSIGNMENT_NOTE: &str = "Order from Admin Dashboard";

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    invoice: &'a str,
    recipient_name: &'a str,
    recipient_phone: &'a str,
    recipient_address: &'a str,
    cod_amount: Money,
    note: &'a str,
}

/// A booked Steadfast consignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consignment {
    #[serde(default, deserialize_with = "number_or_string")]
    pub consignment_id: String,
    pub tracking_code: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    #[serde(default)]
    status: Value,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    consignment: Option<Consignment>,
}

fn number_or_string<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Steadfast client.
///
/// Credentials are read from `courier_config` on each call.
#[derive(Debug, Clone)]
pub struct SteadfastClient {
    store: Store,
    proxy_url: Url,
}

impl SteadfastClient {
    pub fn new(store: Store, proxy_url: Url) -> Self {
        SteadfastClient { store, proxy_url }
    }

    async fn credentials(&self) -> SyncResult<CourierConfig> {
        self.store
            .settings()
            .courier_config()
            .await?
            .filter(CourierConfig::is_configured)
            .ok_or_else(|| SyncError::NotConfigured("Courier API not configured".to_string()))
    }

    async fn call(
        &self,
        method: Method,
        query: &[(&str, &str)],
        body: Option<&CreateRequest<'_>>,
    ) -> SyncResult<Value> {
        let config = self.credentials().await?;
        let mut url = self.proxy_url.clone();
        url.query_pairs_mut().extend_pairs(query);

        let mut request = self
            .store
            .client()
            .request(method, url)
            .header("Api-Key", &config.api_key)
            .header("Secret-Key", &config.secret_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| SyncError::http(SERVICE, e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| SyncError::http(SERVICE, e))?;
        if status.is_server_error() {
            return Err(SyncError::Upstream {
                service: SERVICE.to_string(),
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }
        serde_json::from_str(&text).map_err(|e| SyncError::decode(SERVICE, e))
    }

    /// Account balance: `current_balance`, then `balance`, else zero.
    pub async fn balance(&self) -> SyncResult<Money> {
        let body = self.call(Method::GET, &[("action", "balance")], None).await?;
        Ok(balance_from(&body))
    }

    /// Books a consignment for an order and records its tracking locally.
    pub async fn create_consignment(&self, order: &Order) -> SyncResult<Consignment> {
        let request = CreateRequest {
            invoice: &order.id,
            recipient_name: &order.customer.name,
            recipient_phone: &order.customer.phone,
            recipient_address: &order.address,
            cod_amount: order.total,
            note: CONSIGNMENT_NOTE,
        };

        let body = self
            .call(Method::POST, &[("action", "create")], Some(&request))
            .await?;
        let response: CreateResponse =
            serde_json::from_value(body).map_err(|e| SyncError::decode(SERVICE, e))?;

        let accepted = response.status.as_i64() == Some(200)
            || response.status.as_str() == Some("200");
        match response.consignment {
            Some(consignment) if accepted => {
                self.store
                    .tracking()
                    .save(
                        &order.id,
                        &consignment.tracking_code,
                        &consignment.status,
                        Some(Courier::Steadfast),
                    )
                    .await?;
                info!(
                    order_id = %order.id,
                    tracking_code = %consignment.tracking_code,
                    "Steadfast consignment booked"
                );
                Ok(consignment)
            }
            _ => {
                let message = response
                    .message
                    .unwrap_or_else(|| "Consignment was not created".to_string());
                warn!(order_id = %order.id, reason = %message, "Steadfast rejected consignment");
                Err(SyncError::remote(SERVICE, message))
            }
        }
    }

    /// Raw delivery status for a tracking code.
    pub async fn delivery_status(&self, tracking_code: &str) -> SyncResult<Value> {
        debug!(tracking_code, "Steadfast status lookup");
        self.call(
            Method::GET,
            &[("action", "status"), ("tracking_code", tracking_code)],
            None,
        )
        .await
    }
}

fn balance_from(body: &Value) -> Money {
    ["current_balance", "balance"]
        .iter()
        .filter_map(|key| serde_json::from_value::<Money>(body[*key].clone()).ok())
        .find(|amount| !amount.is_zero())
        .unwrap_or_default()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dokan_store::{RetryPolicy, StoreConfig};
    use mockito::Matcher;

    async fn client(server: &mut mockito::Server, courier_config: &str) -> SteadfastClient {
        server
            .mock("GET", "/api/settings.php")
            .match_query(Matcher::UrlEncoded("key".into(), "courier_config".into()))
            .with_body(courier_config)
            .create_async()
            .await;

        let base = Url::parse(&server.url()).unwrap();
        let store = Store::new(
            StoreConfig::from_base(&base)
                .unwrap()
                .retry(RetryPolicy::none()),
        )
        .unwrap();
        SteadfastClient::new(store, base.join("api/courier.php").unwrap())
    }

    fn order() -> Order {
        serde_json::from_value(serde_json::json!({
            "id": "1042",
            "timestamp": "2024-05-02T10:00:00Z",
            "customer": {"name": "Rahim Uddin", "phone": "01711000000"},
            "address": "House 4, Mirpur",
            "lineItems": [],
            "paymentMethod": "Cash on delivery",
            "subtotal": 1150, "shipping": 60, "discount": 0, "total": 1210,
            "status": "processing"
        }))
        .unwrap()
    }

    #[test]
    fn test_balance_fallbacks() {
        assert_eq!(
            balance_from(&serde_json::json!({"current_balance": 500, "balance": 10})),
            Money::from_taka(500)
        );
        assert_eq!(
            balance_from(&serde_json::json!({"current_balance": 0, "balance": "75.5"})),
            Money::parse_decimal("75.5")
        );
        assert_eq!(balance_from(&serde_json::json!({})), Money::zero());
    }

    #[tokio::test]
    async fn test_balance_sends_credential_headers() {
        let mut server = mockito::Server::new_async().await;
        let proxy = server
            .mock("GET", "/api/courier.php")
            .match_query(Matcher::UrlEncoded("action".into(), "balance".into()))
            .match_header("Api-Key", "ak")
            .match_header("Secret-Key", "sk")
            .with_body(r#"{"status": 200, "current_balance": 1500}"#)
            .create_async()
            .await;

        let client = client(&mut server, r#"{"apiKey": "ak", "secretKey": "sk"}"#).await;
        assert_eq!(client.balance().await.unwrap(), Money::from_taka(1500));
        proxy.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let mut server = mockito::Server::new_async().await;
        let client = client(&mut server, "null").await;

        let err = client.balance().await.unwrap_err();
        assert_eq!(err.to_string(), "Courier API not configured");
    }

    #[tokio::test]
    async fn test_create_consignment_saves_tracking() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/courier.php")
            .match_query(Matcher::UrlEncoded("action".into(), "create".into()))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "invoice": "1042",
                "recipient_phone": "01711000000",
                "cod_amount": 1210,
                "note": "Order from Admin Dashboard"
            })))
            .with_body(
                r#"{"status": 200, "consignment": {"consignment_id": 998, "tracking_code": "SF77A", "status": "in_review"}}"#,
            )
            .create_async()
            .await;
        let tracking = server
            .mock("POST", "/api/local_tracking.php")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "order_id": "1042",
                "tracking_code": "SF77A",
                "courier_name": "Steadfast"
            })))
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;

        let client = client(&mut server, r#"{"apiKey": "ak", "secretKey": "sk"}"#).await;
        let consignment = client.create_consignment(&order()).await.unwrap();

        assert_eq!(consignment.consignment_id, "998");
        assert_eq!(consignment.tracking_code, "SF77A");
        tracking.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_consignment_saves_nothing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/courier.php")
            .match_query(Matcher::Any)
            .with_body(r#"{"status": 400, "message": "Invalid phone number"}"#)
            .create_async()
            .await;
        let tracking = server
            .mock("POST", "/api/local_tracking.php")
            .expect(0)
            .create_async()
            .await;

        let client = client(&mut server, r#"{"apiKey": "ak", "secretKey": "sk"}"#).await;
        let err = client.create_consignment(&order()).await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid phone number");
        tracking.assert_async().await;
    }
}
