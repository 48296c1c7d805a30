//! Report endpoints: read-only grouped summaries, optionally narrowed to
//! one office.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::state::AppState;
use stockroom_core::{InventorySummary, Office, RestockReport};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/inventory-summary", get(inventory_summary))
        .route("/restock", get(restock_report))
}

#[derive(Debug, Deserialize)]
struct OfficeQuery {
    office: Option<Office>,
}

async fn inventory_summary(
    State(state): State<AppState>,
    Query(query): Query<OfficeQuery>,
) -> ApiResult<Json<ApiResponse<InventorySummary>>> {
    let summary = state.db.reports().inventory_summary(query.office).await?;
    Ok(Json(ApiResponse::ok(summary)))
}

async fn restock_report(
    State(state): State<AppState>,
    Query(query): Query<OfficeQuery>,
) -> ApiResult<Json<ApiResponse<RestockReport>>> {
    let report = state.db.reports().restock_report(query.office).await?;
    Ok(Json(ApiResponse::ok(report)))
}
