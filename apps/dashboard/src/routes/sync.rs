//! Agent status and on-demand refresh.

use axum::extract::State;
use axum::Json;

use dokan_sync::{RefreshMode, RefreshReport, SyncStatus};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn status(State(app): State<AppState>) -> Json<SyncStatus> {
    Json(app.agent.status().await)
}

/// Runs a foreground refresh and waits for it to commit.
pub async fn refresh(State(app): State<AppState>) -> ApiResult<Json<RefreshReport>> {
    let report = app.agent.refresh_now(RefreshMode::Foreground).await?;
    Ok(Json(report))
}
