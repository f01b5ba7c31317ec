//! # Store Error Types
//!
//! Error types for the key-value persistence endpoints.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  reqwest::Error / HTTP status / malformed body                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds endpoint context and categorization   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SyncError (engine) → ApiError (dashboard) → JSON for the client       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use dokan_core::ValidationError;

/// Key-value store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Request never produced a response.
    ///
    /// ## When This Occurs
    /// - PHP host unreachable or DNS failure
    /// - Timeout
    /// - Connection reset mid-body
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// Endpoint answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Body could not be decoded into the expected shape.
    ///
    /// ## When This Occurs
    /// - Setting stored by an older dashboard with a different schema
    /// - PHP warning text printed ahead of the JSON
    #[error("Malformed response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// Entity not present in the stored collection.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Rejected before sending.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Endpoint URL is missing or invalid.
    #[error("Store configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn decode(endpoint: impl Into<String>, message: impl ToString) -> Self {
        StoreError::Decode {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn transport(endpoint: &str, err: reqwest::Error) -> Self {
        StoreError::Transport {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Transport failures and 5xx/429 responses are worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Transport { .. } => true,
            StoreError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let server_error = StoreError::Status {
            endpoint: "settings".to_string(),
            status: 502,
            body: String::new(),
        };
        let client_error = StoreError::Status {
            endpoint: "settings".to_string(),
            status: 404,
            body: String::new(),
        };

        assert!(server_error.is_retryable());
        assert!(!client_error.is_retryable());
        assert!(!StoreError::not_found("Expense", "e1").is_retryable());
        assert!(StoreError::not_found("Expense", "e1").is_not_found());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            StoreError::not_found("Expense", "e1").to_string(),
            "Expense not found: e1"
        );
    }
}
