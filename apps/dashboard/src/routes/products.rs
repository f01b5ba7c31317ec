//! # Product Routes
//!
//! Inventory lists come from the snapshot. Single-product reads and all
//! writes pass through to WooCommerce, then refresh so the inventory
//! screen shows the change.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use dokan_core::{Category, InventoryProduct};
use dokan_sync::{ProductInput, RefreshMode};

use super::refresh_after_write;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn list(State(app): State<AppState>) -> Json<Vec<InventoryProduct>> {
    Json(app.engine.cache().snapshot().await.products.clone())
}

pub async fn categories(State(app): State<AppState>) -> Json<Vec<Category>> {
    Json(app.engine.cache().snapshot().await.categories.clone())
}

pub async fn get(State(app): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let commerce = app.source.require_commerce().await?;
    Ok(Json(commerce.product(&id).await?))
}

pub async fn create(
    State(app): State<AppState>,
    Json(input): Json<ProductInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    input.validate_for_create()?;
    let commerce = app.source.require_commerce().await?;
    let created = commerce.create_product(&input).await?;

    refresh_after_write(&app, RefreshMode::Background).await;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> ApiResult<Json<Value>> {
    let commerce = app.source.require_commerce().await?;
    let updated = commerce.update_product(&id, &input).await?;

    refresh_after_write(&app, RefreshMode::Background).await;
    Ok(Json(updated))
}

// =============================================================================
// Media Upload
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct Uploaded {
    pub url: String,
}

/// Uploads the raw request body as an image; the response URL goes into a
/// product's `images`.
pub async fn upload_media(
    State(app): State<AppState>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Uploaded>)> {
    if body.is_empty() {
        return Err(ApiError::validation("file is required"));
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    let commerce = app.source.require_commerce().await?;
    let url = commerce
        .upload_media(&params.file_name, body.to_vec(), content_type)
        .await?;
    Ok((StatusCode::CREATED, Json(Uploaded { url })))
}
