//! # Repository Module
//!
//! Repositories over the key-value persistence endpoints.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Sync engine / HTTP handler                                            │
//! │       │                                                                 │
//! │       │  store.tracking().all()                                        │
//! │       ▼                                                                 │
//! │  TrackingRepository                                                    │
//! │  ├── all(&self)                                                        │
//! │  └── save(&self, order_id, code, status, courier)                      │
//! │       │                                                                 │
//! │       │  GET / POST (JSON)                                              │
//! │       ▼                                                                 │
//! │  PHP helper endpoint (file or MySQL backed)                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SettingsRepository`](settings::SettingsRepository) - Generic settings and typed credentials
//! - [`TrackingRepository`](tracking::TrackingRepository) - Courier consignments per order
//! - [`ExpenseRepository`](expense::ExpenseRepository) - Business expenses
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer directory

pub mod customer;
pub mod expense;
pub mod settings;
pub mod tracking;
