//! # Error Types
//!
//! Domain-specific error types for dokan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  dokan-core errors (this file)                                         │
//! │  ├── CoreError        - Domain rule violations, unknown vocabulary     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  dokan-store errors   - StoreError (key-value endpoints)               │
//! │  dokan-sync errors    - SyncError (remote services, cache)             │
//! │  dashboard errors     - ApiError (what HTTP clients see)               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SyncError → ApiError → Client     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Order id is not present in the current snapshot.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// A status string outside the canonical set.
    ///
    /// ## When This Occurs
    /// - API client sends `"shipped"` as a manual status
    /// - Query string filter uses an unknown status
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    /// A courier name other than Steadfast or Pathao.
    #[error("Unknown courier: {0}")]
    UnknownCourier(String),

    /// Analytics range where `from` is after `to`.
    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange { from: String, to: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (bad URL, bad phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
