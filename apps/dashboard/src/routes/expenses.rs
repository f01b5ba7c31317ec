//! Expense CRUD. Every write is followed by a foreground refresh so the
//! stats cards include it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use dokan_core::Expense;
use dokan_store::NewExpense;
use dokan_sync::RefreshMode;

use super::refresh_after_write;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list(State(app): State<AppState>) -> Json<Vec<Expense>> {
    Json(app.engine.cache().snapshot().await.expenses.clone())
}

pub async fn create(
    State(app): State<AppState>,
    Json(new): Json<NewExpense>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    let expense = app.store().expenses().add(new).await?;
    refresh_after_write(&app, RefreshMode::Foreground).await;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn delete(State(app): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    app.store().expenses().delete(&id).await?;
    refresh_after_write(&app, RefreshMode::Foreground).await;
    Ok(StatusCode::NO_CONTENT)
}
