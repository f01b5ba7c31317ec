//! # Dokan Dashboard
//!
//! JSON HTTP API over the sync engine's snapshot.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dashboard Server                                 │
//! │                                                                         │
//! │  Browser ───► axum (8088) ───► routes ───► SnapshotCache (reads)       │
//! │                                   │                                     │
//! │                                   ├──────► SyncEngine (status edits)    │
//! │                                   ├──────► couriers / SMS / commerce    │
//! │                                   └──────► SyncAgentHandle (refresh)    │
//! │                                                                         │
//! │  SyncAgent ──(every interval)──► SyncEngine::refresh                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::{AppState, TracingEmitter};

use routes::{courier, customers, expenses, insights, orders, products, settings, sms, sync};

/// Builds the full router with CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        // Sync
        .route("/api/sync", post(sync::refresh))
        .route("/api/sync/status", get(sync::status))
        // Orders
        .route("/api/orders", get(orders::list))
        .route("/api/orders/status-counts", get(orders::status_counts))
        .route("/api/orders/payment-methods", get(orders::payment_methods))
        .route("/api/orders/{id}", get(orders::get))
        .route("/api/orders/{id}/status", put(orders::update_status))
        // Insights
        .route("/api/stats", get(insights::stats))
        .route("/api/analytics", get(insights::analytics))
        // Customers
        .route("/api/customers", get(customers::list))
        // Inventory
        .route("/api/products", get(products::list).post(products::create))
        .route("/api/products/{id}", get(products::get).post(products::update))
        .route("/api/categories", get(products::categories))
        .route("/api/media", post(products::upload_media))
        // Expenses
        .route("/api/expenses", get(expenses::list).post(expenses::create))
        .route("/api/expenses/{id}", delete(expenses::delete))
        // SMS
        .route("/api/sms/bulk", post(sms::bulk))
        .route("/api/sms/segments", post(sms::segments))
        // Couriers
        .route("/api/courier/{courier}/orders", get(courier::orders))
        .route("/api/courier/steadfast/balance", get(courier::steadfast_balance))
        .route("/api/courier/steadfast/status/{code}", get(courier::steadfast_status))
        .route("/api/courier/steadfast/orders/{id}", post(courier::steadfast_create))
        .route("/api/courier/pathao/connection", get(courier::pathao_connection))
        .route("/api/courier/pathao/cities", get(courier::pathao_cities))
        .route("/api/courier/pathao/zones/{city}", get(courier::pathao_zones))
        .route("/api/courier/pathao/areas/{zone}", get(courier::pathao_areas))
        .route("/api/courier/pathao/consignments/{id}", get(courier::pathao_consignment))
        .route("/api/courier/pathao/orders/{id}", post(courier::pathao_create))
        // Settings
        .route(
            "/api/settings/commerce",
            get(settings::get_commerce).put(settings::put_commerce),
        )
        .route(
            "/api/settings/courier",
            get(settings::get_courier).put(settings::put_courier),
        )
        .route(
            "/api/settings/pathao",
            get(settings::get_pathao).put(settings::put_pathao),
        )
        .route("/api/settings/sms", get(settings::get_sms).put(settings::put_sms))
        .route(
            "/api/settings/automation",
            get(settings::get_automation).put(settings::put_automation),
        )
        .route(
            "/api/settings/templates",
            get(settings::get_templates).put(settings::put_templates),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Router Tests
// =============================================================================
