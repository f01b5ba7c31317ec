//! # API Error Type
//!
//! Unified error type for the HTTP routes.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Dokan                                  │
//! │                                                                         │
//! │  Browser                     Rust Backend                               │
//! │  ───────                     ────────────                               │
//! │                                                                         │
//! │  POST /api/courier/steadfast/orders/1042                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Route handler                                                   │  │
//! │  │  Result<Json<T>, ApiError>                                       │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Keys missing? ──── SyncError::NotConfigured ──────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Courier refused? ─ SyncError::Remote ──────────► ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄──── 502 {"code": "UPSTREAM_ERROR", "message": "Invalid phone"} ────  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use dokan_core::{CoreError, ValidationError};
use dokan_store::StoreError;
use dokan_sync::SyncError;

/// Error body returned by every failing route.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_CONFIGURED",
///   "message": "Courier API not configured"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[error("{message}")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Credentials for a remote service are missing (412)
    NotConfigured,

    /// A remote service failed or refused the request (502)
    UpstreamError,

    /// A newer refresh won the race (409)
    Conflict,

    /// The sync agent is stopping (503)
    Unavailable,

    /// Internal server error (500)
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotConfigured => StatusCode::PRECONDITION_FAILED,
            ErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InternalError, message)
    }
}

/// Result type for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::OrderNotFound(id) => ApiError::not_found("Order", &id),
            CoreError::Validation(e) => e.into(),
            other @ (CoreError::UnknownStatus(_)
            | CoreError::UnknownCourier(_)
            | CoreError::InvalidDateRange { .. }) => ApiError::validation(other.to_string()),
        }
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            StoreError::Validation(e) => e.into(),
            StoreError::Config(message) => {
                tracing::error!("Store configuration error: {}", message);
                ApiError::internal("Store is misconfigured")
            }
            other @ (StoreError::Transport { .. }
            | StoreError::Status { .. }
            | StoreError::Decode { .. }) => {
                tracing::warn!(error = %other, "Store request failed");
                ApiError::new(ErrorCode::UpstreamError, other.to_string())
            }
        }
    }
}

/// Converts sync errors to API errors.
impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Store(e) => e.into(),
            SyncError::Core(e) => e.into(),
            SyncError::NotConfigured(message) => ApiError::new(ErrorCode::NotConfigured, message),
            SyncError::StaleRefresh => ApiError::new(ErrorCode::Conflict, err.to_string()),
            SyncError::ShuttingDown => ApiError::new(ErrorCode::Unavailable, err.to_string()),
            SyncError::Http { .. }
            | SyncError::Upstream { .. }
            | SyncError::Remote { .. }
            | SyncError::Decode { .. } => {
                tracing::warn!(error = %err, "Remote service call failed");
                ApiError::new(ErrorCode::UpstreamError, err.to_string())
            }
            SyncError::InvalidConfig(_)
            | SyncError::InvalidUrl(_)
            | SyncError::ConfigLoadFailed(_)
            | SyncError::ConfigSaveFailed(_)
            | SyncError::ChannelError(_) => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal(err.to_string())
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_serialize_screaming_snake_case() {
        let json = serde_json::to_value(ApiError::new(ErrorCode::NotConfigured, "x")).unwrap();
        assert_eq!(json["code"], "NOT_CONFIGURED");
        assert_eq!(json["message"], "x");
    }

    #[test]
    fn test_remote_message_passes_through_verbatim() {
        let err: ApiError = SyncError::remote("Steadfast", "Invalid phone number").into();
        assert_eq!(err.code, ErrorCode::UpstreamError);
        assert_eq!(err.message, "Invalid phone number");
        assert_eq!(err.code.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_not_found_through_every_layer() {
        let err: ApiError = SyncError::Core(CoreError::OrderNotFound("9".into())).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Order not found: 9");

        let err: ApiError = SyncError::Store(StoreError::not_found("Expense", "e1")).into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_validation_and_config_mapping() {
        let err: ApiError = CoreError::InvalidDateRange {
            from: "2024-05-02".into(),
            to: "2024-05-01".into(),
        }
        .into();
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = SyncError::NotConfigured("SMS API is not configured".into()).into();
        assert_eq!(err.code.status(), StatusCode::PRECONDITION_FAILED);
        assert_eq!(err.message, "SMS API is not configured");
    }
}
