//! # Courier Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET  /api/courier/{courier}/orders?search=   consignments + in flight  │
//! │                                                                         │
//! │  GET  /api/courier/steadfast/balance                                    │
//! │  GET  /api/courier/steadfast/status/{code}                              │
//! │  POST /api/courier/steadfast/orders/{id}      book a consignment        │
//! │                                                                         │
//! │  GET  /api/courier/pathao/connection                                    │
//! │  GET  /api/courier/pathao/cities                                        │
//! │  GET  /api/courier/pathao/zones/{city}                                  │
//! │  GET  /api/courier/pathao/areas/{zone}                                  │
//! │  GET  /api/courier/pathao/consignments/{id}                             │
//! │  POST /api/courier/pathao/orders/{id}         {city, zone, area}        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Booking saves a tracking record, so both booking routes refresh before
//! answering; the order then carries its tracking code.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use dokan_core::filter::{active_shipments, courier_orders};
use dokan_core::{Courier, Order};
use dokan_sync::{Consignment, DeliveryLocation, RefreshMode};

use super::refresh_after_write;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

async fn cached_order(app: &AppState, id: &str) -> ApiResult<Order> {
    app.engine
        .cache()
        .order(id)
        .await
        .ok_or_else(|| ApiError::not_found("Order", id))
}

// =============================================================================
// Consignment Lists
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourierOrders {
    pub courier: Courier,
    /// Consignments not yet completed, cancelled or refunded.
    pub active: usize,
    pub orders: Vec<Order>,
}

pub async fn orders(
    State(app): State<AppState>,
    Path(courier): Path<String>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<CourierOrders>> {
    let courier: Courier = courier.parse()?;
    let snapshot = app.engine.cache().snapshot().await;

    Ok(Json(CourierOrders {
        courier,
        active: active_shipments(&snapshot.orders, courier),
        orders: courier_orders(&snapshot.orders, courier, params.search.as_deref())
            .into_iter()
            .cloned()
            .collect(),
    }))
}

// =============================================================================
// Steadfast
// =============================================================================

pub async fn steadfast_balance(State(app): State<AppState>) -> ApiResult<Json<Value>> {
    let balance = app.steadfast.balance().await?;
    Ok(Json(json!({ "balance": balance })))
}

pub async fn steadfast_status(
    State(app): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<Value>> {
    Ok(Json(app.steadfast.delivery_status(&code).await?))
}

pub async fn steadfast_create(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Consignment>> {
    let order = cached_order(&app, &id).await?;
    let consignment = app.steadfast.create_consignment(&order).await?;

    refresh_after_write(&app, RefreshMode::Background).await;
    Ok(Json(consignment))
}

// =============================================================================
// Pathao
// =============================================================================

pub async fn pathao_connection(State(app): State<AppState>) -> ApiResult<Json<Value>> {
    app.pathao.check_connection().await?;
    Ok(Json(json!({ "connected": true })))
}

pub async fn pathao_cities(State(app): State<AppState>) -> ApiResult<Json<Vec<Value>>> {
    Ok(Json(app.pathao.cities().await?))
}

pub async fn pathao_zones(
    State(app): State<AppState>,
    Path(city): Path<u64>,
) -> ApiResult<Json<Vec<Value>>> {
    Ok(Json(app.pathao.zones(city).await?))
}

pub async fn pathao_areas(
    State(app): State<AppState>,
    Path(zone): Path<u64>,
) -> ApiResult<Json<Vec<Value>>> {
    Ok(Json(app.pathao.areas(zone).await?))
}

pub async fn pathao_consignment(
    State(app): State<AppState>,
    Path(consignment_id): Path<String>,
) -> ApiResult<Json<Value>> {
    Ok(Json(app.pathao.order_info(&consignment_id).await?))
}

pub async fn pathao_create(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(location): Json<DeliveryLocation>,
) -> ApiResult<Json<Value>> {
    let order = cached_order(&app, &id).await?;
    let created = app.pathao.create_order(&order, location).await?;

    refresh_after_write(&app, RefreshMode::Background).await;
    Ok(Json(created))
}
