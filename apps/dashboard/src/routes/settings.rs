//! # Settings Routes
//!
//! Read and replace the values kept in the remote settings store.
//!
//! ```text
//! ┌──────────────────────────────┬───────────────────────┬──────────────────┐
//! │ Path                         │ Setting key           │ Required fields  │
//! ├──────────────────────────────┼───────────────────────┼──────────────────┤
//! │ /api/settings/commerce       │ wp_config             │ url, keys        │
//! │ /api/settings/courier        │ courier_config        │ apiKey, secret   │
//! │ /api/settings/pathao         │ pathao_config         │ client + login   │
//! │ /api/settings/sms            │ sms_config            │ apiKey           │
//! │ /api/settings/automation     │ sms_automation_config │ -                │
//! │ /api/settings/templates      │ sms_templates         │ name, content    │
//! └──────────────────────────────┴───────────────────────┴──────────────────┘
//! ```
//!
//! Unset values read back as their defaults, so the settings forms always
//! receive a complete object.

use axum::extract::State;
use axum::Json;

use dokan_core::validation::{require, validate_credentials};
use dokan_core::AutomationConfig;
use dokan_store::{CourierConfig, PathaoConfig, SmsConfig, SmsTemplate, WpConfig};
use dokan_sync::RefreshMode;

use super::refresh_after_write;
use crate::error::ApiResult;
use crate::state::AppState;

// =============================================================================
// Commerce
// =============================================================================

pub async fn get_commerce(State(app): State<AppState>) -> ApiResult<Json<WpConfig>> {
    Ok(Json(app.store().settings().wp_config().await?.unwrap_or_default()))
}

/// Saves WooCommerce credentials and reloads orders with them.
pub async fn put_commerce(
    State(app): State<AppState>,
    Json(config): Json<WpConfig>,
) -> ApiResult<Json<WpConfig>> {
    validate_credentials(&[
        ("url", config.url.as_str()),
        ("consumerKey", config.consumer_key.as_str()),
        ("consumerSecret", config.consumer_secret.as_str()),
    ])?;
    app.store().settings().save_wp_config(&config).await?;

    refresh_after_write(&app, RefreshMode::Foreground).await;
    Ok(Json(config))
}

// =============================================================================
// Couriers
// =============================================================================

pub async fn get_courier(State(app): State<AppState>) -> ApiResult<Json<CourierConfig>> {
    Ok(Json(app.store().settings().courier_config().await?.unwrap_or_default()))
}

pub async fn put_courier(
    State(app): State<AppState>,
    Json(config): Json<CourierConfig>,
) -> ApiResult<Json<CourierConfig>> {
    validate_credentials(&[
        ("apiKey", config.api_key.as_str()),
        ("secretKey", config.secret_key.as_str()),
    ])?;
    app.store().settings().save_courier_config(&config).await?;
    Ok(Json(config))
}

pub async fn get_pathao(State(app): State<AppState>) -> ApiResult<Json<PathaoConfig>> {
    Ok(Json(app.store().settings().pathao_config().await?))
}

pub async fn put_pathao(
    State(app): State<AppState>,
    Json(config): Json<PathaoConfig>,
) -> ApiResult<Json<PathaoConfig>> {
    validate_credentials(&[
        ("clientId", config.client_id.as_str()),
        ("clientSecret", config.client_secret.as_str()),
        ("username", config.username.as_str()),
        ("password", config.password.as_str()),
        ("storeId", config.store_id.as_str()),
    ])?;
    app.store().settings().save_pathao_config(&config).await?;
    Ok(Json(config))
}

// =============================================================================
// SMS
// =============================================================================

pub async fn get_sms(State(app): State<AppState>) -> ApiResult<Json<SmsConfig>> {
    Ok(Json(app.store().settings().sms_config().await?.unwrap_or_default()))
}

pub async fn put_sms(
    State(app): State<AppState>,
    Json(config): Json<SmsConfig>,
) -> ApiResult<Json<SmsConfig>> {
    require("apiKey", config.api_key.as_str())?;
    app.store().settings().save_sms_config(&config).await?;
    Ok(Json(config))
}

pub async fn get_automation(State(app): State<AppState>) -> ApiResult<Json<AutomationConfig>> {
    Ok(Json(app.store().settings().sms_automation_config().await?))
}

pub async fn put_automation(
    State(app): State<AppState>,
    Json(config): Json<AutomationConfig>,
) -> ApiResult<Json<AutomationConfig>> {
    app.store().settings().save_sms_automation_config(&config).await?;
    Ok(Json(config))
}

pub async fn get_templates(State(app): State<AppState>) -> ApiResult<Json<Vec<SmsTemplate>>> {
    Ok(Json(app.store().settings().sms_templates().await?))
}

pub async fn put_templates(
    State(app): State<AppState>,
    Json(templates): Json<Vec<SmsTemplate>>,
) -> ApiResult<Json<Vec<SmsTemplate>>> {
    for template in &templates {
        validate_credentials(&[
            ("name", template.name.as_str()),
            ("content", template.content.as_str()),
        ])?;
    }
    app.store().settings().save_sms_templates(&templates).await?;
    Ok(Json(templates))
}
