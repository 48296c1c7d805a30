//! Audit trail endpoints. Read-only: audit rows are written as a side
//! effect of mutations elsewhere, never through this surface.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::state::AppState;
use stockroom_core::{validation, ActionCount, AuditLogEntry, Office, TableActivity};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/recent", get(recent))
        .route("/stats", get(stats))
        .route("/record/:table/:id", get(record_history))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    table_name: Option<String>,
    action: Option<String>,
    office: Option<Office>,
    #[serde(default = "default_limit")]
    limit: i64,
}

#[derive(Debug, Deserialize)]
struct WindowQuery {
    #[serde(default = "default_days")]
    days: i64,
    #[serde(default = "default_limit")]
    limit: i64,
    office: Option<Office>,
}

/// Grouped activity counts inside a look-back window.
#[derive(Debug, Serialize)]
struct AuditStats {
    days: i64,
    actions: Vec<ActionCount>,
    tables: Vec<TableActivity>,
}

fn default_limit() -> i64 {
    100
}

fn default_days() -> i64 {
    30
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<AuditLogEntry>>>> {
    validation::validate_limit(query.limit)?;

    let entries = state
        .db
        .audit_log()
        .find_all(
            query.table_name.as_deref(),
            query.action.as_deref(),
            query.office,
            query.limit,
        )
        .await?;

    Ok(Json(ApiResponse::list(entries)))
}

async fn recent(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<ApiResponse<Vec<AuditLogEntry>>>> {
    validation::validate_days(query.days)?;
    validation::validate_limit(query.limit)?;

    let entries = state
        .db
        .audit_log()
        .find_recent(query.days, query.limit, query.office)
        .await?;

    Ok(Json(ApiResponse::list(entries)))
}

async fn stats(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<ApiResponse<AuditStats>>> {
    validation::validate_days(query.days)?;

    let stats = AuditStats {
        days: query.days,
        actions: state
            .db
            .audit_log()
            .action_counts(query.days, query.office)
            .await?,
        tables: state
            .db
            .audit_log()
            .table_activity(query.days, query.office)
            .await?,
    };

    Ok(Json(ApiResponse::ok(stats)))
}

async fn record_history(
    State(state): State<AppState>,
    Path((table, id)): Path<(String, String)>,
) -> ApiResult<Json<ApiResponse<Vec<AuditLogEntry>>>> {
    let entries = state.db.audit_log().find_by_record(&table, &id).await?;
    Ok(Json(ApiResponse::list(entries)))
}
