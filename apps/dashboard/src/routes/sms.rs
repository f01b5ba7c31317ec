//! # SMS Routes
//!
//! ```text
//! POST /api/sms/bulk       {"phones": [...], "message": "Hi [name]"}
//!                          {"manual": "017...\n018...", "message": "..."}
//! POST /api/sms/segments   {"message": "..."}
//! ```

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use dokan_core::validation::{parse_manual_numbers, segments as count_segments, SmsSegments};
use dokan_sync::BulkReport;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    /// Phones picked from the customer list.
    #[serde(default)]
    pub phones: Vec<String>,
    /// Pasted numbers; replaces `phones` when not blank.
    #[serde(default)]
    pub manual: Option<String>,
    pub message: String,
}

impl BulkRequest {
    fn recipients(&self) -> Vec<String> {
        match self.manual.as_deref().filter(|m| !m.trim().is_empty()) {
            Some(text) => parse_manual_numbers(text),
            None => {
                let mut phones: Vec<String> = Vec::with_capacity(self.phones.len());
                for phone in self.phones.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
                    if !phones.iter().any(|seen| seen == phone) {
                        phones.push(phone.to_string());
                    }
                }
                phones
            }
        }
    }
}

/// Sends one message to every recipient, paced, and returns the send log.
///
/// The loop keeps running if the client goes away before it finishes.
pub async fn bulk(
    State(app): State<AppState>,
    Json(request): Json<BulkRequest>,
) -> ApiResult<Json<BulkReport>> {
    let recipients = request.recipients();
    if recipients.is_empty() {
        return Err(ApiError::validation("No recipients selected"));
    }

    let config = app.store().settings().sms_config().await?.unwrap_or_default();
    let customers = app.engine.cache().snapshot().await.customers.clone();

    // Runs to completion even if the connection closes.
    let report = app
        .bulk
        .spawn_send(config, recipients, request.message, customers)
        .await
        .map_err(|e| ApiError::internal(format!("bulk send task failed: {e}")))??;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct SegmentRequest {
    pub message: String,
}

pub async fn segments(Json(request): Json<SegmentRequest>) -> Json<SmsSegments> {
    Json(count_segments(&request.message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(phones: &[&str], manual: Option<&str>) -> BulkRequest {
        BulkRequest {
            phones: phones.iter().map(|p| p.to_string()).collect(),
            manual: manual.map(str::to_string),
            message: "Hi".to_string(),
        }
    }

    #[test]
    fn test_manual_text_replaces_selection() {
        let req = request(&["01711000000"], Some("01811000000\n01911000000"));
        assert_eq!(req.recipients(), ["01811000000", "01911000000"]);
    }

    #[test]
    fn test_blank_manual_uses_selection_without_duplicates() {
        let req = request(&["01711000000", " ", "01711000000", "01811000000"], Some("  "));
        assert_eq!(req.recipients(), ["01711000000", "01811000000"]);
    }
}
