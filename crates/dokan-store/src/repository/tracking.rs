//! # Tracking Repository
//!
//! Locally stored courier consignments, the authoritative source of
//! courier status for every dispatched order.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use dokan_core::{Courier, TrackingRecord};

use crate::client::{endpoint_name, is_empty_body, StoreHttp};
use crate::error::{StoreError, StoreResult};

/// Body posted when a consignment is created or its status changes.
#[derive(Debug, Serialize)]
struct TrackingUpsert<'a> {
    order_id: &'a str,
    tracking_code: &'a str,
    status: &'a str,
    courier_name: Courier,
}

/// Repository for the tracking endpoint.
///
/// ## Usage
/// ```rust,ignore
/// let records = store.tracking().all().await?;
/// store.tracking().save("1042", "SF-98231", "in_review", None).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TrackingRepository {
    http: StoreHttp,
    url: Url,
}

impl TrackingRepository {
    pub(crate) fn new(http: StoreHttp, url: Url) -> Self {
        TrackingRepository { http, url }
    }

    /// Every stored tracking record.
    ///
    /// Empty and `null` bodies yield an empty list. A body that is valid
    /// JSON but not an array (the endpoint's error envelope) is logged and
    /// treated as empty.
    pub async fn all(&self) -> StoreResult<Vec<TrackingRecord>> {
        let endpoint = endpoint_name(&self.url);
        let body = self.http.get_text(self.url.clone()).await?;
        if is_empty_body(&body) {
            return Ok(Vec::new());
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| StoreError::decode(&endpoint, e))?;
        if !value.is_array() {
            warn!(endpoint = %endpoint, "Tracking endpoint returned a non-array body");
            return Ok(Vec::new());
        }

        let records: Vec<TrackingRecord> =
            serde_json::from_value(value).map_err(|e| StoreError::decode(&endpoint, e))?;
        debug!(count = records.len(), "Loaded tracking records");
        Ok(records)
    }

    /// Saves a consignment for an order.
    ///
    /// When `courier` is `None` it is identified from the tracking code.
    pub async fn save(
        &self,
        order_id: &str,
        tracking_code: &str,
        status: &str,
        courier: Option<Courier>,
    ) -> StoreResult<TrackingRecord> {
        let courier = courier.unwrap_or_else(|| Courier::identify(tracking_code));
        let body = TrackingUpsert {
            order_id,
            tracking_code,
            status,
            courier_name: courier,
        };

        self.http.post_json(self.url.clone(), &body).await?;
        debug!(order_id = %order_id, courier = %courier, "Tracking saved");

        Ok(TrackingRecord {
            id: order_id.to_string(),
            courier_tracking_code: tracking_code.to_string(),
            courier_status: Some(status.to_string()),
            courier_name: Some(courier.as_str().to_string()),
        })
    }
}
