//! # WooCommerce Client
//!
//! REST client for the storefront's WooCommerce API, with the mapping
//! from WooCommerce payloads to Dokan's domain types.
//!
//! ## Request Shape
//! ```text
//! {url}/wp-json/wc/v3/orders?consumer_key=ck_…&consumer_secret=cs_…&per_page=100
//! {url}/wp-json/wc/v3/products/{id}?consumer_key=…&consumer_secret=…
//! {url}/wp-json/bdcommerce/v1/upload            (multipart, plugin endpoint)
//! ```
//!
//! Key-based auth travels in the query string; the storefront URL has any
//! trailing `/` trimmed before paths are appended.

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use dokan_core::{
    Category, Customer, InventoryProduct, LineItem, Money, Order, OrderStatus, COMMERCE_PAGE_SIZE,
};
use dokan_store::{RetryPolicy, WpConfig};

use crate::error::{SyncError, SyncResult};

const SERVICE: &str = "woocommerce";

/// Message shown when the upload plugin endpoint does not exist.
pub const PLUGIN_MISSING: &str =
    "Plugin not installed. Please install 'BdCommerce Connect' plugin on WordPress.";

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct WcOrder {
    id: u64,
    #[serde(default)]
    date_created: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    billing: WcBilling,
    #[serde(default)]
    line_items: Vec<WcLineItem>,
    #[serde(default)]
    payment_method_title: Option<String>,
    #[serde(default)]
    total: Money,
    #[serde(default)]
    shipping_total: Money,
    #[serde(default)]
    discount_total: Money,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WcBilling {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address_1: Option<String>,
    city: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WcLineItem {
    product_id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    price: Money,
    #[serde(default)]
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct WcProduct {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    price: Money,
    #[serde(default)]
    stock_quantity: Option<i64>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    categories: Vec<WcNamed>,
    #[serde(default)]
    images: Vec<WcImage>,
}

#[derive(Debug, Deserialize)]
struct WcNamed {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct WcImage {
    #[serde(default)]
    src: String,
}

// =============================================================================
// Product Input
// =============================================================================

/// Category reference in a product write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: u64,
}

/// Image reference in a product write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
}

/// Fields accepted when creating or updating a product.
///
/// Absent fields are omitted from the request, so the same type serves
/// full creates and partial updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manage_stock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
}

impl ProductInput {
    /// A create needs a name and a regular price.
    pub fn validate_for_create(&self) -> SyncResult<()> {
        dokan_core::validation::validate_credentials(&[
            ("name", self.name.as_deref().unwrap_or_default()),
            ("regular_price", self.regular_price.as_deref().unwrap_or_default()),
        ])?;
        Ok(())
    }
}

// =============================================================================
// Client
// =============================================================================

/// WooCommerce REST client bound to one set of credentials.
///
/// ## Usage
/// ```rust,ignore
/// let client = CommerceClient::new(http, wp_config, RetryPolicy::default())?;
/// let orders = client.orders().await?;
/// client.update_order_status("1042", OrderStatus::Completed).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CommerceClient {
    http: reqwest::Client,
    config: WpConfig,
    base: String,
    retry: RetryPolicy,
}

impl CommerceClient {
    /// Creates a client, rejecting incomplete credentials.
    pub fn new(http: reqwest::Client, config: WpConfig, retry: RetryPolicy) -> SyncResult<Self> {
        if !config.is_configured() {
            return Err(SyncError::NotConfigured(
                "WordPress connection not configured.".to_string(),
            ));
        }

        let base = config.url.trim().trim_end_matches('/').to_string();
        Url::parse(&base).map_err(|e| SyncError::InvalidUrl(format!("'{base}': {e}")))?;

        Ok(CommerceClient {
            http,
            config,
            base,
            retry,
        })
    }

    fn url(&self, path: &str, paged: bool) -> SyncResult<Url> {
        let mut url = Url::parse(&format!("{}/wp-json/{path}", self.base))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("consumer_key", &self.config.consumer_key)
                .append_pair("consumer_secret", &self.config.consumer_secret);
            if paged {
                query.append_pair("per_page", &COMMERCE_PAGE_SIZE.to_string());
            }
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, paged: bool) -> SyncResult<T> {
        let url = self.url(path, paged)?;
        self.retry
            .run(path, || {
                let url = url.clone();
                async move {
                    debug!(path, "WooCommerce GET");
                    let response = self
                        .http
                        .get(url)
                        .send()
                        .await
                        .map_err(|e| SyncError::http(SERVICE, e))?;
                    read_json(response).await
                }
            })
            .await
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> SyncResult<T> {
        let url = self.url(path, false)?;
        debug!(path, %method, "WooCommerce write");
        let response = self
            .http
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(|e| SyncError::http(SERVICE, e))?;
        read_json(response).await
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// The newest page of orders, mapped and sorted newest first.
    ///
    /// Orders that cannot be mapped are skipped with a warning.
    pub async fn orders(&self) -> SyncResult<Vec<Order>> {
        let raw: Vec<WcOrder> = self.get("wc/v3/orders", true).await?;
        let mut orders: Vec<Order> = raw
            .into_iter()
            .filter_map(|wc| match map_order(wc) {
                Ok(order) => Some(order),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable order");
                    None
                }
            })
            .collect();
        dokan_core::reconcile::sort_newest_first(&mut orders);
        debug!(count = orders.len(), "Fetched orders");
        Ok(orders)
    }

    pub async fn products(&self) -> SyncResult<Vec<InventoryProduct>> {
        let raw: Vec<WcProduct> = self.get("wc/v3/products", true).await?;
        Ok(raw.into_iter().map(map_product).collect())
    }

    pub async fn categories(&self) -> SyncResult<Vec<Category>> {
        self.get("wc/v3/products/categories", true).await
    }

    /// One product as WooCommerce returns it, for the edit form.
    pub async fn product(&self, id: &str) -> SyncResult<Value> {
        self.get(&format!("wc/v3/products/{id}"), false).await
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    pub async fn create_product(&self, input: &ProductInput) -> SyncResult<Value> {
        input.validate_for_create()?;
        let product: Value = self.send(Method::POST, "wc/v3/products", input).await?;
        info!(id = %product["id"], "Product created");
        Ok(product)
    }

    pub async fn update_product(&self, id: &str, input: &ProductInput) -> SyncResult<Value> {
        let product = self
            .send(Method::PUT, &format!("wc/v3/products/{id}"), input)
            .await?;
        info!(id = %id, "Product updated");
        Ok(product)
    }

    /// Pushes a status to the platform.
    pub async fn update_order_status(&self, id: &str, status: OrderStatus) -> SyncResult<()> {
        let body = serde_json::json!({ "status": status });
        let _: Value = self
            .send(Method::PUT, &format!("wc/v3/orders/{id}"), &body)
            .await?;
        info!(order_id = %id, status = %status, "Order status pushed");
        Ok(())
    }

    /// Uploads an image through the BdCommerce Connect plugin and returns
    /// its public URL.
    pub async fn upload_media(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> SyncResult<String> {
        let url = Url::parse(&format!("{}/wp-json/bdcommerce/v1/upload", self.base))?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| SyncError::InvalidConfig(format!("content type '{content_type}': {e}")))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("consumer_key", self.config.consumer_key.clone())
            .text("consumer_secret", self.config.consumer_secret.clone());

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SyncError::http(SERVICE, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SyncError::remote(SERVICE, PLUGIN_MISSING));
        }

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| SyncError::decode(SERVICE, e))?;

        if !status.is_success() {
            let message = body["message"]
                .as_str()
                .or_else(|| body["code"].as_str())
                .unwrap_or("Upload failed");
            return Err(SyncError::remote(SERVICE, message));
        }

        match body["url"].as_str() {
            Some(url) if !url.is_empty() => {
                info!(file = %file_name, "Media uploaded");
                Ok(url.to_string())
            }
            _ => Err(SyncError::remote(SERVICE, "Invalid response from plugin")),
        }
    }
}

/// Decodes a JSON response, surfacing the platform's `message` on failure.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> SyncResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| SyncError::http(SERVICE, e))?;

    if !status.is_success() {
        return Err(error_from_body(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| SyncError::decode(SERVICE, e))
}

fn error_from_body(status: StatusCode, body: &str) -> SyncError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["message"].as_str().map(str::to_string));

    match message {
        Some(message) if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS => {
            SyncError::remote(SERVICE, message)
        }
        message => SyncError::Upstream {
            service: SERVICE.to_string(),
            status: status.as_u16(),
            message: message.unwrap_or_else(|| body.chars().take(200).collect()),
        },
    }
}

// =============================================================================
// Mapping
// =============================================================================

/// Placeholder image for a product or line item without one.
pub fn placeholder_image(product_id: u64) -> String {
    format!("https://picsum.photos/seed/{product_id}/100/100")
}

fn avatar_url(first: &str, last: &str) -> String {
    let encode = |s: &str| url::form_urlencoded::byte_serialize(s.as_bytes()).collect::<String>();
    let first = if first.is_empty() { "U" } else { first };
    let last = if last.is_empty() { "C" } else { last };
    format!(
        "https://ui-avatars.com/api/?name={}+{}&background=random",
        encode(first),
        encode(last)
    )
}

/// Parses WooCommerce's `date_created`, a naive local-less timestamp
/// read as UTC. A trailing `Z` or offset is accepted too.
fn parse_created(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn map_order(wc: WcOrder) -> SyncResult<Order> {
    let created = wc.date_created.as_deref().unwrap_or_default();
    let timestamp = parse_created(created).ok_or_else(|| {
        SyncError::decode(
            SERVICE,
            format!("order {} has invalid date_created '{created}'", wc.id),
        )
    })?;

    let billing = wc.billing;
    let first = billing.first_name.unwrap_or_default();
    let last = billing.last_name.unwrap_or_default();
    let email = billing.email.unwrap_or_default();

    let full_name = format!("{first} {last}").trim().to_string();
    let name = if !full_name.is_empty() {
        full_name
    } else if !email.is_empty() {
        email.clone()
    } else {
        "Guest Customer".to_string()
    };

    let address = match billing.city.filter(|c| !c.is_empty()) {
        Some(city) => format!("{}, {city}", billing.address_1.unwrap_or_default()),
        None => billing.address_1.unwrap_or_default(),
    };

    let line_items = wc
        .line_items
        .into_iter()
        .map(|item| LineItem {
            id: item.product_id.to_string(),
            name: item.name,
            price: item.price,
            qty: item.quantity,
            image: placeholder_image(item.product_id),
        })
        .collect();

    Ok(Order {
        id: wc.id.to_string(),
        timestamp,
        customer: Customer {
            avatar: avatar_url(&first, &last),
            name,
            email,
            phone: billing.phone.unwrap_or_default(),
            ..Default::default()
        },
        address,
        line_items,
        payment_method: wc
            .payment_method_title
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        subtotal: wc.total - wc.shipping_total,
        shipping: wc.shipping_total,
        discount: wc.discount_total,
        total: wc.total,
        status: OrderStatus::from_platform(&wc.status),
        courier_name: None,
        courier_tracking_code: None,
        courier_status: None,
    })
}

fn map_product(wc: WcProduct) -> InventoryProduct {
    InventoryProduct {
        id: wc.id.to_string(),
        name: wc.name,
        category: wc
            .categories
            .into_iter()
            .next()
            .map(|c| c.name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Uncategorized".to_string()),
        price: wc.price,
        stock: wc.stock_quantity.unwrap_or(0),
        published: wc.status == "publish",
        image: wc
            .images
            .into_iter()
            .next()
            .map(|i| i.src)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| placeholder_image(wc.id)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::Matcher;

    const ORDERS: &str = r#"[
        {
            "id": 1041,
            "date_created": "2024-05-01T09:30:00",
            "status": "processing",
            "billing": {"first_name": "", "last_name": "", "email": "buyer@example.com",
                        "phone": "01811000000", "address_1": "Road 2", "city": ""},
            "line_items": [],
            "payment_method_title": "",
            "total": "500.00", "shipping_total": "0.00", "discount_total": "0.00"
        },
        {
            "id": 1042,
            "date_created": "2024-05-02T10:15:00",
            "status": "checkout-draft",
            "billing": {"first_name": "Rahim", "last_name": "Uddin", "email": "",
                        "phone": "01711000000", "address_1": "House 5", "city": "Dhaka"},
            "line_items": [{"product_id": 77, "name": "Panjabi", "price": 1150.5, "quantity": 2}],
            "payment_method_title": "Cash on delivery",
            "total": "2421.00", "shipping_total": "120.00", "discount_total": "0.00"
        }
    ]"#;

    fn client_for(server: &mockito::Server) -> CommerceClient {
        CommerceClient::new(
            reqwest::Client::new(),
            WpConfig {
                url: format!("{}/", server.url()),
                consumer_key: "ck_test".to_string(),
                consumer_secret: "cs_test".to_string(),
            },
            RetryPolicy::none(),
        )
        .unwrap()
    }

    fn auth_query(paged: bool) -> Matcher {
        let mut matchers = vec![
            Matcher::UrlEncoded("consumer_key".into(), "ck_test".into()),
            Matcher::UrlEncoded("consumer_secret".into(), "cs_test".into()),
        ];
        if paged {
            matchers.push(Matcher::UrlEncoded("per_page".into(), "100".into()));
        }
        Matcher::AllOf(matchers)
    }

    #[test]
    fn test_requires_credentials() {
        let err = CommerceClient::new(
            reqwest::Client::new(),
            WpConfig::default(),
            RetryPolicy::none(),
        )
        .unwrap_err();
        assert!(err.is_config_error());
    }

    #[tokio::test]
    async fn test_orders_mapping() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/wp-json/wc/v3/orders")
            .match_query(auth_query(true))
            .with_body(ORDERS)
            .create_async()
            .await;

        let orders = client_for(&server).orders().await.unwrap();

        // Newest first
        assert_eq!(orders[0].id, "1042");
        let rahim = &orders[0];
        assert_eq!(rahim.customer.name, "Rahim Uddin");
        assert_eq!(
            rahim.customer.avatar,
            "https://ui-avatars.com/api/?name=Rahim+Uddin&background=random"
        );
        assert_eq!(rahim.address, "House 5, Dhaka");
        assert_eq!(rahim.subtotal, Money::parse_decimal("2301.00"));
        assert_eq!(rahim.shipping, Money::from_taka(120));
        assert_eq!(rahim.status, OrderStatus::Pending);
        assert_eq!(rahim.line_items[0].price, Money::parse_decimal("1150.50"));
        assert_eq!(rahim.line_items[0].image, "https://picsum.photos/seed/77/100/100");
        assert_eq!(
            rahim.timestamp,
            Utc.with_ymd_and_hms(2024, 5, 2, 10, 15, 0).unwrap()
        );

        let guest = &orders[1];
        assert_eq!(guest.customer.name, "buyer@example.com");
        assert_eq!(guest.address, "Road 2");
        assert_eq!(guest.payment_method, "Unknown");
        assert_eq!(guest.status, OrderStatus::Processing);
        assert!(guest.customer.avatar.contains("name=U+C"));
    }

    #[test]
    fn test_guest_customer_name() {
        let wc: WcOrder = serde_json::from_str(
            r#"{"id": 1, "date_created": "2024-05-01T00:00:00Z", "status": "on-hold", "total": "10"}"#,
        )
        .unwrap();
        let order = map_order(wc).unwrap();
        assert_eq!(order.customer.name, "Guest Customer");
        assert_eq!(order.status, OrderStatus::OnHold);
    }

    #[test]
    fn test_invalid_date_is_decode_error() {
        let wc: WcOrder =
            serde_json::from_str(r#"{"id": 1, "date_created": "yesterday"}"#).unwrap();
        assert!(matches!(map_order(wc), Err(SyncError::Decode { .. })));

        let wc: WcOrder = serde_json::from_str(r#"{"id": 2, "date_created": null}"#).unwrap();
        assert!(matches!(map_order(wc), Err(SyncError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_orders_skip_unreadable_dates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/wp-json/wc/v3/orders")
            .match_query(auth_query(true))
            .with_body(
                r#"[
                    {"id": 1, "date_created": "yesterday", "status": "processing", "total": "100"},
                    {"id": 2, "date_created": null, "status": "processing", "total": "100"},
                    {"id": 3, "date_created": "2024-05-03T08:00:00", "status": "completed", "total": "250"}
                ]"#,
            )
            .create_async()
            .await;

        let orders = client_for(&server).orders().await.unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, "3");
        assert_eq!(orders[0].status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_products_tolerate_malformed_price() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/wp-json/wc/v3/products")
            .match_query(auth_query(true))
            .with_body(r#"[{"id": 1, "price": "1,250"}, {"id": 2, "price": "300"}]"#)
            .create_async()
            .await;

        let products = client_for(&server).products().await.unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price, Money::zero());
        assert_eq!(products[1].price, Money::from_taka(300));
    }

    #[tokio::test]
    async fn test_products_mapping() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/wp-json/wc/v3/products")
            .match_query(auth_query(true))
            .with_body(
                r#"[
                    {"id": 5, "name": "Saree", "price": "3200", "stock_quantity": 4, "status": "publish",
                     "categories": [{"name": "Women"}, {"name": "Sale"}], "images": [{"src": "https://cdn/saree.jpg"}]},
                    {"id": 6, "name": "Draft", "price": "", "stock_quantity": null, "status": "draft",
                     "categories": [], "images": []}
                ]"#,
            )
            .create_async()
            .await;

        let products = client_for(&server).products().await.unwrap();

        assert_eq!(products[0].category, "Women");
        assert_eq!(products[0].stock, 4);
        assert!(products[0].published);
        assert_eq!(products[0].image, "https://cdn/saree.jpg");

        assert_eq!(products[1].category, "Uncategorized");
        assert_eq!(products[1].stock, 0);
        assert!(!products[1].published);
        assert_eq!(products[1].price, Money::zero());
        assert_eq!(products[1].image, placeholder_image(6));
    }

    #[tokio::test]
    async fn test_update_order_status_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/wp-json/wc/v3/orders/1042")
            .match_query(auth_query(false))
            .match_body(Matcher::Json(serde_json::json!({"status": "on-hold"})))
            .with_body(r#"{"id": 1042, "status": "on-hold"}"#)
            .create_async()
            .await;

        client_for(&server)
            .update_order_status("1042", OrderStatus::OnHold)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_product_surfaces_platform_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/wp-json/wc/v3/products")
            .match_query(auth_query(false))
            .with_status(400)
            .with_body(r#"{"code":"product_invalid_sku","message":"Invalid or duplicated SKU."}"#)
            .create_async()
            .await;

        let input = ProductInput {
            name: Some("Panjabi".to_string()),
            regular_price: Some("1200".to_string()),
            sku: Some("PJ-1".to_string()),
            ..Default::default()
        };
        let err = client_for(&server).create_product(&input).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid or duplicated SKU.");
    }

    #[tokio::test]
    async fn test_create_product_requires_name_and_price() {
        let server = mockito::Server::new_async().await;
        let err = client_for(&server)
            .create_product(&ProductInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Core(_)));
    }

    #[test]
    fn test_product_input_omits_absent_fields() {
        let input = ProductInput {
            stock_quantity: Some(3),
            product_type: Some("simple".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({"type": "simple", "stock_quantity": 3}));
    }

    #[tokio::test]
    async fn test_upload_plugin_missing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/wp-json/bdcommerce/v1/upload")
            .with_status(404)
            .create_async()
            .await;

        let err = client_for(&server)
            .upload_media("a.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), PLUGIN_MISSING);
    }

    #[tokio::test]
    async fn test_upload_returns_url_or_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("POST", "/wp-json/bdcommerce/v1/upload")
            .with_body(r#"{"url": "https://shop/wp-content/uploads/a.jpg"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(
            client.upload_media("a.jpg", vec![1], "image/jpeg").await.unwrap(),
            "https://shop/wp-content/uploads/a.jpg"
        );
        ok.remove_async().await;

        server
            .mock("POST", "/wp-json/bdcommerce/v1/upload")
            .with_body(r#"{"id": 9}"#)
            .create_async()
            .await;
        assert_eq!(
            client
                .upload_media("a.jpg", vec![1], "image/jpeg")
                .await
                .unwrap_err()
                .to_string(),
            "Invalid response from plugin"
        );
    }

    #[tokio::test]
    async fn test_server_error_is_retryable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/wp-json/wc/v3/products/categories")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let err = client_for(&server).categories().await.unwrap_err();
        assert!(err.is_retryable());
    }
}
