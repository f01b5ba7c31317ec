//! Customer directory.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use dokan_core::filter::{CustomerQuery, OrderCountFilter};
use dokan_core::Customer;

use crate::error::ApiResult;
use crate::state::AppState;

/// Query string form of [`CustomerQuery`]; `orders` takes `3` or `5+`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerParams {
    pub search: Option<String>,
    pub orders: Option<String>,
    pub category: Option<String>,
    pub product_id: Option<String>,
}

impl CustomerParams {
    fn into_query(self) -> ApiResult<CustomerQuery> {
        let order_count = match self.orders.as_deref() {
            Some(raw) => raw.parse::<OrderCountFilter>()?,
            None => OrderCountFilter::Any,
        };
        Ok(CustomerQuery {
            search: self.search,
            order_count,
            category: self.category,
            product_id: self.product_id,
        })
    }
}

pub async fn list(
    State(app): State<AppState>,
    Query(params): Query<CustomerParams>,
) -> ApiResult<Json<Vec<Customer>>> {
    let query = params.into_query()?;
    let snapshot = app.engine.cache().snapshot().await;
    let customers = query
        .apply(&snapshot.customers, &snapshot.orders, &snapshot.products)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(customers))
}
