//! # Sync Error Types
//!
//! Error types for the sync engine and the remote clients it drives.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Remote              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Http           │  │  Remote (provider msg)  │ │
//! │  │  InvalidUrl     │  │  Upstream (5xx) │  │  Decode                 │ │
//! │  │  NotConfigured  │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Store       │  │     Domain      │  │      Engine             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  StoreError     │  │  CoreError      │  │  StaleRefresh           │ │
//! │  │  (wrapped)      │  │  (wrapped)      │  │  ShuttingDown           │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use dokan_core::{CoreError, ValidationError};
use dokan_store::{StoreError, Transient};

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering every engine and client failure.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid daemon configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unparsable URL in configuration or settings.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// A remote service has no stored credentials.
    ///
    /// The message is shown to the operator as is.
    #[error("{0}")]
    NotConfigured(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Request never produced a response.
    #[error("{service} request failed: {message}")]
    Http { service: String, message: String },

    /// Remote answered with a non-success status and no usable message.
    #[error("{service} returned HTTP {status}: {message}")]
    Upstream {
        service: String,
        status: u16,
        message: String,
    },

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// Business error reported by a provider, carried verbatim.
    #[error("{message}")]
    Remote { service: String, message: String },

    /// Provider response did not match the expected shape.
    #[error("Malformed {service} response: {message}")]
    Decode { service: String, message: String },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Engine Errors
    // =========================================================================
    /// A refresh started later has already committed its snapshot.
    #[error("Refresh discarded: a newer snapshot was committed first")]
    StaleRefresh,

    /// Agent is shutting down.
    #[error("Sync agent is shutting down")]
    ShuttingDown,

    /// Channel send/receive failed.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

// =============================================================================
// Error Constructors
// =============================================================================

impl SyncError {
    pub fn remote(service: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::Remote {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn decode(service: impl Into<String>, message: impl ToString) -> Self {
        SyncError::Decode {
            service: service.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn http(service: &str, err: reqwest::Error) -> Self {
        SyncError::Http {
            service: service.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<ValidationError> for SyncError {
    fn from(err: ValidationError) -> Self {
        SyncError::Core(CoreError::Validation(err))
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl SyncError {
    /// Returns true if the operation may succeed when repeated.
    ///
    /// ## Retryable Errors
    /// - Connection failures and timeouts
    /// - 5xx and 429 responses
    /// - Retryable store errors
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Http { .. } => true,
            SyncError::Upstream { status, .. } => *status >= 500 || *status == 429,
            SyncError::Store(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
                | SyncError::NotConfigured(_)
        )
    }

    /// Returns true if the error names a missing entity.
    pub fn is_not_found(&self) -> bool {
        match self {
            SyncError::Core(CoreError::OrderNotFound(_)) => true,
            SyncError::Store(e) => e.is_not_found(),
            _ => false,
        }
    }
}

impl Transient for SyncError {
    fn is_transient(&self) -> bool {
        self.is_retryable()
    }
}
