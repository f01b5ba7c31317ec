//! Dashboard headline numbers and the analytics report.

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use dokan_core::{AnalyticsReport, DashboardStats, DateRange};

use crate::error::ApiResult;
use crate::state::AppState;

/// Optional bounds for the stats cards. Both inclusive.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Stats over the whole snapshot, or over orders and expenses inside the
/// given dates. Customer and product totals are never date filtered.
pub async fn stats(
    State(app): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Json<DashboardStats> {
    let snapshot = app.engine.cache().snapshot().await;
    if query.from.is_none() && query.to.is_none() {
        return Json(snapshot.stats.clone());
    }

    let within = |date: NaiveDate| {
        query.from.map_or(true, |from| date >= from) && query.to.map_or(true, |to| date <= to)
    };
    let orders: Vec<_> = snapshot
        .orders
        .iter()
        .filter(|o| within(o.placed_on()))
        .cloned()
        .collect();
    let expenses: Vec<_> = snapshot
        .expenses
        .iter()
        .filter(|e| within(e.date))
        .cloned()
        .collect();

    Json(DashboardStats::compute(
        &orders,
        &expenses,
        snapshot.customers.len(),
        snapshot.products.len(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

pub async fn analytics(
    State(app): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Json<AnalyticsReport>> {
    let range = DateRange::new(query.from, query.to)?;
    let snapshot = app.engine.cache().snapshot().await;
    Ok(Json(AnalyticsReport::compute(
        &snapshot.orders,
        &snapshot.expenses,
        range,
    )))
}
