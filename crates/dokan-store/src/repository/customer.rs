//! # Customer Repository
//!
//! The customer directory kept alongside the storefront. The endpoint
//! aggregates order totals per phone number on upsert.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use dokan_core::{Customer, Money, Order};

use crate::client::{endpoint_name, is_empty_body, StoreHttp};
use crate::error::{StoreError, StoreResult};

/// Upsert payload, keyed by phone on the server side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerUpsert {
    pub phone: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub total: Money,
    pub avatar: String,
    pub order_id: String,
}

impl CustomerUpsert {
    /// Builds the upsert for an order's customer.
    pub fn from_order(order: &Order) -> Self {
        CustomerUpsert {
            phone: order.customer.phone.clone(),
            name: order.customer.name.clone(),
            email: order.customer.email.clone(),
            address: order.address.clone(),
            total: order.total,
            avatar: order.customer.avatar.clone(),
            order_id: order.id.clone(),
        }
    }
}

/// Repository for the customer endpoint.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    http: StoreHttp,
    url: Url,
}

impl CustomerRepository {
    pub(crate) fn new(http: StoreHttp, url: Url) -> Self {
        CustomerRepository { http, url }
    }

    /// The full customer list. An empty body yields an empty list.
    pub async fn all(&self) -> StoreResult<Vec<Customer>> {
        let endpoint = endpoint_name(&self.url);
        let body = self.http.get_text(self.url.clone()).await?;
        if is_empty_body(&body) {
            return Ok(Vec::new());
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| StoreError::decode(&endpoint, e))?;
        if !value.is_array() {
            warn!(endpoint = %endpoint, "Customer endpoint returned a non-array body");
            return Ok(Vec::new());
        }

        serde_json::from_value(value).map_err(|e| StoreError::decode(&endpoint, e))
    }

    /// Inserts or updates one customer.
    pub async fn upsert(&self, customer: &CustomerUpsert) -> StoreResult<()> {
        self.http.post_json(self.url.clone(), customer).await?;
        debug!(phone = %customer.phone, order_id = %customer.order_id, "Customer synced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::store_for;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_all_parses_loose_rows() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/customers.php")
            .with_body(
                r#"[{"name":"Rahim","email":null,"phone":"01711000000","avatar":"","orderCount":"3","totalSpent":"4500.00"}]"#,
            )
            .create_async()
            .await;

        let customers = store_for(&server.url()).customers().all().await.unwrap();

        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].order_count, 3);
        assert_eq!(customers[0].email, "");
        assert_eq!(customers[0].total_spent, Some(Money::from_taka(4500)));
    }

    #[tokio::test]
    async fn test_all_empty_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/customers.php")
            .with_body("  ")
            .create_async()
            .await;

        assert!(store_for(&server.url()).customers().all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_failure_surfaces_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/customers.php")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "phone": "01711000000",
                "order_id": "1042"
            })))
            .with_status(500)
            .with_body("Fatal error")
            .create_async()
            .await;

        let upsert = CustomerUpsert {
            phone: "01711000000".to_string(),
            name: "Rahim".to_string(),
            email: String::new(),
            address: "Mirpur".to_string(),
            total: Money::from_taka(1200),
            avatar: String::new(),
            order_id: "1042".to_string(),
        };
        let err = store_for(&server.url())
            .customers()
            .upsert(&upsert)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Status { status: 500, .. }));
    }
}
