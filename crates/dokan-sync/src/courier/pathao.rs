//! # Pathao Client
//!
//! Pathao's merchant API through `pathao_proxy.php`. The proxy takes the
//! stored credentials in the request body, handles the OAuth token
//! exchange, and forwards `{endpoint, method, data}`.
//!
//! ## Envelope
//! ```text
//! request:  {config: PathaoConfig, endpoint: "aladdin/api/v1/…", method, data}
//! success:  {code: 200|201|202 (number or string), data: …}
//! failure:  {code, message?, errors?: {field: [first, …]}}
//! ```

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use dokan_core::validation::{normalize_pathao_phone, truncate_chars};
use dokan_core::{Courier, Order};
use dokan_store::{PathaoConfig, Store};

use crate::error::{SyncError, SyncResult};

const SERVICE: &str = "pathao";

const MAX_NAME_CHARS: usize = 50;
const MAX_ADDRESS_CHARS: usize = 200;
const MAX_DESCRIPTION_CHARS: usize = 200;

/// Normal (48 hour) delivery.
const DELIVERY_TYPE_NORMAL: u32 = 48;
/// Parcel, as opposed to document.
const ITEM_TYPE_PARCEL: u32 = 2;
const DEFAULT_ITEM_WEIGHT_KG: f64 = 0.5;

/// Status recorded locally for a freshly booked Pathao order.
pub const BOOKED_STATUS: &str = "Pending";

/// City, zone and area chosen for a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryLocation {
    pub city: u64,
    pub zone: u64,
    pub area: u64,
}

#[derive(Debug, Serialize)]
struct ProxyRequest<'a> {
    config: &'a PathaoConfig,
    endpoint: &'a str,
    method: &'a str,
    data: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
struct OrderPayload {
    store_id: u64,
    merchant_order_id: String,
    recipient_name: String,
    recipient_phone: String,
    recipient_address: String,
    recipient_city: u64,
    recipient_zone: u64,
    recipient_area: u64,
    delivery_type: u32,
    item_type: u32,
    item_quantity: u32,
    item_weight: f64,
    amount_to_collect: i64,
    item_description: String,
}

impl OrderPayload {
    fn build(order: &Order, store_id: u64, location: DeliveryLocation) -> Self {
        let description = order
            .line_items
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        OrderPayload {
            store_id,
            merchant_order_id: order.id.clone(),
            recipient_name: truncate_chars(&order.customer.name, MAX_NAME_CHARS),
            recipient_phone: normalize_pathao_phone(&order.customer.phone),
            recipient_address: truncate_chars(&order.address, MAX_ADDRESS_CHARS),
            recipient_city: location.city,
            recipient_zone: location.zone,
            recipient_area: location.area,
            delivery_type: DELIVERY_TYPE_NORMAL,
            item_type: ITEM_TYPE_PARCEL,
            item_quantity: order.item_count().max(1),
            item_weight: DEFAULT_ITEM_WEIGHT_KG,
            amount_to_collect: order.total.round_to_taka(),
            item_description: truncate_chars(&description, MAX_DESCRIPTION_CHARS),
        }
    }
}

/// Pathao client.
///
/// Credentials are read from `pathao_config` on each call.
#[derive(Debug, Clone)]
pub struct PathaoClient {
    store: Store,
    proxy_url: Url,
}

impl PathaoClient {
    pub fn new(store: Store, proxy_url: Url) -> Self {
        PathaoClient { store, proxy_url }
    }

    async fn config(&self) -> SyncResult<PathaoConfig> {
        let config = self.store.settings().pathao_config().await?;
        if !config.is_configured() {
            return Err(SyncError::NotConfigured(
                "Pathao is not configured in settings.".to_string(),
            ));
        }
        Ok(config)
    }

    async fn request(&self, endpoint: &str, method: Method, data: Option<&Value>) -> SyncResult<Value> {
        let config = self.config().await?;
        self.request_with(&config, endpoint, method, data).await
    }

    async fn request_with(
        &self,
        config: &PathaoConfig,
        endpoint: &str,
        method: Method,
        data: Option<&Value>,
    ) -> SyncResult<Value> {
        debug!(endpoint, %method, "Pathao request");
        let body = ProxyRequest {
            config,
            endpoint,
            method: method.as_str(),
            data,
        };

        let response = self
            .store
            .client()
            .post(self.proxy_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::http(SERVICE, e))?;
        let result: Value = response
            .json()
            .await
            .map_err(|e| SyncError::decode(SERVICE, e))?;

        if is_success_code(&result["code"]) {
            Ok(result)
        } else {
            let message = error_message(&result);
            warn!(endpoint, reason = %message, "Pathao request rejected");
            Err(SyncError::remote(SERVICE, message))
        }
    }

    /// Consignment details for a tracking code.
    pub async fn order_info(&self, consignment_id: &str) -> SyncResult<Value> {
        self.request(
            &format!("aladdin/api/v1/orders/{consignment_id}/info"),
            Method::GET,
            None,
        )
        .await
    }

    /// Verifies the stored credentials by listing stores.
    pub async fn check_connection(&self) -> SyncResult<()> {
        self.request("aladdin/api/v1/stores", Method::GET, None).await?;
        info!("Pathao connection verified");
        Ok(())
    }

    pub async fn cities(&self) -> SyncResult<Vec<Value>> {
        let result = self.request("aladdin/api/v1/city-list", Method::GET, None).await?;
        Ok(location_list(result))
    }

    pub async fn zones(&self, city_id: u64) -> SyncResult<Vec<Value>> {
        let result = self
            .request(&format!("aladdin/api/v1/cities/{city_id}/zone-list"), Method::GET, None)
            .await?;
        Ok(location_list(result))
    }

    pub async fn areas(&self, zone_id: u64) -> SyncResult<Vec<Value>> {
        let result = self
            .request(&format!("aladdin/api/v1/zones/{zone_id}/area-list"), Method::GET, None)
            .await?;
        Ok(location_list(result))
    }

    /// Books an order with Pathao.
    ///
    /// When the response carries a `consignment_id` it is saved as the
    /// order's tracking code with status [`BOOKED_STATUS`].
    pub async fn create_order(&self, order: &Order, location: DeliveryLocation) -> SyncResult<Value> {
        let config = self.config().await?;
        let store_id = config.store_id.trim().parse::<u64>().map_err(|_| {
            SyncError::InvalidConfig(format!(
                "Pathao store id '{}' is not a number",
                config.store_id
            ))
        })?;

        let payload = OrderPayload::build(order, store_id, location);
        let data = serde_json::to_value(&payload).map_err(|e| SyncError::decode(SERVICE, e))?;
        let result = self
            .request_with(&config, "aladdin/api/v1/orders", Method::POST, Some(&data))
            .await?;

        if let Some(consignment_id) = consignment_id(&result) {
            self.store
                .tracking()
                .save(&order.id, &consignment_id, BOOKED_STATUS, Some(Courier::Pathao))
                .await?;
            info!(order_id = %order.id, consignment_id = %consignment_id, "Pathao order booked");
        }
        Ok(result)
    }
}

// =============================================================================
// Envelope Helpers
// =============================================================================

fn is_success_code(code: &Value) -> bool {
    match code {
        Value::Number(n) => matches!(n.as_u64(), Some(200..=202)),
        Value::String(s) => matches!(s.as_str(), "200" | "201" | "202"),
        _ => false,
    }
}

/// `"field: first error"` from `errors`, else `message`, else a generic one.
fn error_message(result: &Value) -> String {
    if let Some((field, value)) = result["errors"].as_object().and_then(|e| e.iter().next()) {
        let first = match value {
            Value::Array(items) => items.first().cloned().unwrap_or(Value::Null),
            other => other.clone(),
        };
        let first = match first {
            Value::String(s) => s,
            other => other.to_string(),
        };
        return format!("{field}: {first}");
    }

    result["message"]
        .as_str()
        .filter(|m| !m.is_empty())
        .unwrap_or("API Connection Error")
        .to_string()
}

/// `data.data`, else `data` when it is a list, else empty.
fn location_list(result: Value) -> Vec<Value> {
    let data = &result["data"];
    data["data"]
        .as_array()
        .or_else(|| data.as_array())
        .cloned()
        .unwrap_or_default()
}

fn consignment_id(result: &Value) -> Option<String> {
    match &result["data"]["consignment_id"] {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dokan_store::{RetryPolicy, StoreConfig};
    use mockito::Matcher;
    use serde_json::json;

    const CONFIGURED: &str =
        r#"{"clientId": "cid", "clientSecret": "sec", "username": "u", "password": "p", "storeId": "7788"}"#;

    async fn client(server: &mut mockito::Server, pathao_config: &str) -> PathaoClient {
        server
            .mock("GET", "/api/settings.php")
            .match_query(Matcher::UrlEncoded("key".into(), "pathao_config".into()))
            .with_body(pathao_config)
            .create_async()
            .await;

        let base = Url::parse(&server.url()).unwrap();
        let store = Store::new(
            StoreConfig::from_base(&base)
                .unwrap()
                .retry(RetryPolicy::none()),
        )
        .unwrap();
        PathaoClient::new(store, base.join("api/pathao_proxy.php").unwrap())
    }

    fn order() -> Order {
        serde_json::from_value(json!({
            "id": "2001",
            "timestamp": "2024-05-02T10:00:00Z",
            "customer": {"name": "Nasrin Akter", "phone": "+880 1811-000000"},
            "address": "Road 5, Dhanmondi",
            "lineItems": [
                {"id": "1", "name": "Saree", "price": 2000, "qty": 1, "image": ""},
                {"id": "2", "name": "Orna", "price": 450.6, "qty": 2, "image": ""}
            ],
            "paymentMethod": "Cash on delivery",
            "subtotal": 2901.2, "shipping": 0, "discount": 0, "total": 2901.6,
            "status": "processing"
        }))
        .unwrap()
    }

    #[test]
    fn test_success_codes() {
        assert!(is_success_code(&json!(200)));
        assert!(is_success_code(&json!("202")));
        assert!(!is_success_code(&json!(401)));
        assert!(!is_success_code(&json!("ok")));
        assert!(!is_success_code(&Value::Null));
    }

    #[test]
    fn test_error_message_precedence() {
        let with_errors = json!({
            "code": 422,
            "message": "Please fix the given errors",
            "errors": {"recipient_phone": ["The recipient phone format is invalid."]}
        });
        assert_eq!(
            error_message(&with_errors),
            "recipient_phone: The recipient phone format is invalid."
        );
        assert_eq!(error_message(&json!({"message": "Unauthorized"})), "Unauthorized");
        assert_eq!(error_message(&json!({"code": 500})), "API Connection Error");
    }

    #[test]
    fn test_location_list_shapes() {
        let nested = json!({"code": 200, "data": {"data": [{"city_id": 1, "city_name": "Dhaka"}]}});
        assert_eq!(location_list(nested).len(), 1);
        let flat = json!({"code": 200, "data": [{"zone_id": 3}, {"zone_id": 4}]});
        assert_eq!(location_list(flat).len(), 2);
        assert!(location_list(json!({"code": 200})).is_empty());
    }

    #[test]
    fn test_order_payload() {
        let location = DeliveryLocation { city: 1, zone: 52, area: 600 };
        let payload = OrderPayload::build(&order(), 7788, location);

        assert_eq!(payload.recipient_phone, "01811000000");
        assert_eq!(payload.item_quantity, 3);
        assert_eq!(payload.amount_to_collect, 2902);
        assert_eq!(payload.item_description, "Saree, Orna");
        assert_eq!(payload.delivery_type, 48);
    }

    #[test]
    fn test_empty_order_ships_one_item() {
        let mut order = order();
        order.line_items.clear();
        order.customer.name = "ক".repeat(80);
        let payload = OrderPayload::build(&order, 1, DeliveryLocation { city: 1, zone: 1, area: 1 });

        assert_eq!(payload.item_quantity, 1);
        assert_eq!(payload.recipient_name.chars().count(), 50);
    }

    #[tokio::test]
    async fn test_not_configured() {
        let mut server = mockito::Server::new_async().await;
        let client = client(&mut server, "null").await;

        let err = client.cities().await.unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(err.to_string(), "Pathao is not configured in settings.");
    }

    #[tokio::test]
    async fn test_zones_forward_envelope() {
        let mut server = mockito::Server::new_async().await;
        let proxy = server
            .mock("POST", "/api/pathao_proxy.php")
            .match_body(Matcher::PartialJson(json!({
                "config": {"clientId": "cid", "storeId": "7788"},
                "endpoint": "aladdin/api/v1/cities/1/zone-list",
                "method": "GET"
            })))
            .with_body(r#"{"code": "200", "data": {"data": [{"zone_id": 52, "zone_name": "Dhanmondi"}]}}"#)
            .create_async()
            .await;

        let client = client(&mut server, CONFIGURED).await;
        let zones = client.zones(1).await.unwrap();

        assert_eq!(zones[0]["zone_name"], "Dhanmondi");
        proxy.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_order_saves_consignment() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/pathao_proxy.php")
            .match_body(Matcher::PartialJson(json!({
                "endpoint": "aladdin/api/v1/orders",
                "method": "POST",
                "data": {"store_id": 7788, "merchant_order_id": "2001", "recipient_area": 600}
            })))
            .with_body(r#"{"code": 200, "data": {"consignment_id": "DL121224VS8TTJ", "order_status": "Pending"}}"#)
            .create_async()
            .await;
        let tracking = server
            .mock("POST", "/api/local_tracking.php")
            .match_body(Matcher::PartialJson(json!({
                "order_id": "2001",
                "tracking_code": "DL121224VS8TTJ",
                "status": "Pending",
                "courier_name": "Pathao"
            })))
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;

        let client = client(&mut server, CONFIGURED).await;
        let location = DeliveryLocation { city: 1, zone: 52, area: 600 };
        client.create_order(&order(), location).await.unwrap();

        tracking.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_order_surfaces_first_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/pathao_proxy.php")
            .with_body(r#"{"code": 422, "errors": {"recipient_address": ["The recipient address must be at least 10 characters."]}}"#)
            .create_async()
            .await;

        let client = client(&mut server, CONFIGURED).await;
        let location = DeliveryLocation { city: 1, zone: 52, area: 600 };
        let err = client.create_order(&order(), location).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "recipient_address: The recipient address must be at least 10 characters."
        );
    }
}
