//! # Order Routes
//!
//! ```text
//! GET  /api/orders                   OrderQuery in the query string
//! GET  /api/orders/status-counts     one count per status tab
//! GET  /api/orders/payment-methods   distinct payment titles
//! GET  /api/orders/{id}
//! PUT  /api/orders/{id}/status       {"status": "completed"}
//! ```

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use dokan_core::filter::{payment_methods as distinct_payment_methods, OrderQuery};
use dokan_core::stats::status_counts as count_statuses;
use dokan_core::{Order, OrderStatus, StatusCounts};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn list(
    State(app): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Json<Vec<Order>> {
    let snapshot = app.engine.cache().snapshot().await;
    Json(query.apply(&snapshot.orders).into_iter().cloned().collect())
}

pub async fn get(State(app): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Order>> {
    app.engine
        .cache()
        .order(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Order", &id))
}

pub async fn status_counts(State(app): State<AppState>) -> Json<StatusCounts> {
    let snapshot = app.engine.cache().snapshot().await;
    Json(count_statuses(&snapshot.orders))
}

pub async fn payment_methods(State(app): State<AppState>) -> Json<Vec<String>> {
    let snapshot = app.engine.cache().snapshot().await;
    Json(distinct_payment_methods(&snapshot.orders))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Manual status change. The snapshot shows the new status before the
/// platform confirms it and rolls back if the platform refuses.
pub async fn update_status(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdate>,
) -> ApiResult<Json<Order>> {
    let order = app.engine.update_order_status(&id, body.status).await?;
    Ok(Json(order))
}
