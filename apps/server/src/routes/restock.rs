//! Restock request endpoints.
//!
//! ```text
//!   GET    /api/restock-requests           list (status/office/priority/category)
//!   GET    /api/restock-requests/open      open requests by urgency
//!   GET    /api/restock-requests/stats     grouped counts
//!   GET    /api/restock-requests/:id       fetch one
//!   POST   /api/restock-requests           create
//!   PUT    /api/restock-requests/:id       partial update
//!   PATCH  /api/restock-requests/:id/status  move status
//!   DELETE /api/restock-requests/:id       delete
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::{AppState, NONE_SNAPSHOT};
use stockroom_core::{
    validation, ItemCategory, Office, Priority, PriorityCount, RestockRequest, RestockStatus,
    StatusCount, MAX_NAME_LEN,
};

const TABLE: &str = "restock_requests";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/open", get(list_open))
        .route("/stats", get(stats))
        .route("/:id", get(get_one).put(update).delete(delete_one))
        .route("/:id/status", patch(set_status))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<RestockStatus>,
    office: Option<Office>,
    priority: Option<Priority>,
    item_category: Option<ItemCategory>,
}

#[derive(Debug, Deserialize)]
struct OfficeQuery {
    office: Option<Office>,
}

#[derive(Debug, Deserialize)]
struct CreateRequest {
    item_category: ItemCategory,
    item_description: String,
    make_id: Option<String>,
    model_id: Option<String>,
    #[serde(default = "default_quantity")]
    quantity_requested: i64,
    office: Office,
    #[serde(default)]
    priority: Priority,
    requested_by: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateRequest {
    item_category: Option<ItemCategory>,
    item_description: Option<String>,
    make_id: Option<String>,
    model_id: Option<String>,
    quantity_requested: Option<i64>,
    office: Option<Office>,
    priority: Option<Priority>,
    status: Option<RestockStatus>,
    requested_by: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SetStatus {
    status: RestockStatus,
}

/// Grouped counts for the restock dashboard.
#[derive(Debug, Serialize)]
struct RestockStats {
    status_counts: Vec<StatusCount>,
    pending_priority_counts: Vec<PriorityCount>,
}

fn default_quantity() -> i64 {
    1
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<RestockRequest>>>> {
    let requests = state
        .db
        .restock_requests()
        .find_all(query.status, query.office, query.priority, query.item_category)
        .await?;

    Ok(Json(ApiResponse::list(requests)))
}

async fn list_open(
    State(state): State<AppState>,
    Query(query): Query<OfficeQuery>,
) -> ApiResult<Json<ApiResponse<Vec<RestockRequest>>>> {
    let requests = state
        .db
        .restock_requests()
        .find_open_by_urgency(query.office)
        .await?;
    Ok(Json(ApiResponse::list(requests)))
}

async fn stats(
    State(state): State<AppState>,
    Query(query): Query<OfficeQuery>,
) -> ApiResult<Json<ApiResponse<RestockStats>>> {
    let stats = RestockStats {
        status_counts: state
            .db
            .restock_requests()
            .status_counts(query.office)
            .await?,
        pending_priority_counts: state
            .db
            .restock_requests()
            .pending_priority_counts(query.office)
            .await?,
    };

    Ok(Json(ApiResponse::ok(stats)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<RestockRequest>>> {
    let request = state
        .db
        .restock_requests()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Restock request not found: {id}")))?;

    Ok(Json(ApiResponse::ok(request)))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<RestockRequest>>)> {
    validation::validate_description(&payload.item_description)?;
    validation::validate_quantity(payload.quantity_requested)?;
    validation::validate_notes(payload.notes.as_deref())?;
    validation::validate_optional_text(payload.requested_by.as_deref(), "requested_by", MAX_NAME_LEN)?;

    let now = Utc::now();
    let request = RestockRequest {
        id: Uuid::new_v4().to_string(),
        item_category: payload.item_category,
        item_description: payload.item_description.trim().to_string(),
        make_id: payload.make_id,
        model_id: payload.model_id,
        quantity_requested: payload.quantity_requested,
        office: payload.office,
        priority: payload.priority,
        status: RestockStatus::Pending,
        requested_by: payload.requested_by,
        notes: payload.notes,
        created_at: now,
        updated_at: now,
        make_name: None,
        model_name: None,
    };

    let created = state.db.restock_requests().insert(&request).await?;

    state
        .record_audit(
            TABLE,
            &created.id,
            "CREATE",
            NONE_SNAPSHOT,
            Some(&created),
            Some(created.office),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(created, "Restock request created")),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRequest>,
) -> ApiResult<Json<ApiResponse<RestockRequest>>> {
    let existing = state
        .db
        .restock_requests()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Restock request not found: {id}")))?;

    let mut updated = existing.clone();
    if let Some(category) = payload.item_category {
        updated.item_category = category;
    }
    if let Some(description) = payload.item_description {
        validation::validate_description(&description)?;
        updated.item_description = description.trim().to_string();
    }
    if let Some(make_id) = payload.make_id {
        updated.make_id = Some(make_id).filter(|v| !v.is_empty());
    }
    if let Some(model_id) = payload.model_id {
        updated.model_id = Some(model_id).filter(|v| !v.is_empty());
    }
    if let Some(quantity) = payload.quantity_requested {
        validation::validate_quantity(quantity)?;
        updated.quantity_requested = quantity;
    }
    if let Some(office) = payload.office {
        updated.office = office;
    }
    if let Some(priority) = payload.priority {
        updated.priority = priority;
    }
    if let Some(status) = payload.status {
        updated.status = status;
    }
    if let Some(requested_by) = payload.requested_by {
        validation::validate_optional_text(Some(&requested_by), "requested_by", MAX_NAME_LEN)?;
        updated.requested_by = Some(requested_by).filter(|v| !v.trim().is_empty());
    }
    if let Some(notes) = payload.notes {
        validation::validate_notes(Some(&notes))?;
        updated.notes = Some(notes).filter(|v| !v.trim().is_empty());
    }

    let saved = state.db.restock_requests().update(&updated).await?;

    state
        .record_audit(
            TABLE,
            &saved.id,
            "UPDATE",
            Some(&existing),
            Some(&saved),
            Some(saved.office),
        )
        .await;

    Ok(Json(ApiResponse::with_message(saved, "Restock request updated")))
}

async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SetStatus>,
) -> ApiResult<Json<ApiResponse<RestockRequest>>> {
    let existing = state
        .db
        .restock_requests()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Restock request not found: {id}")))?;

    let saved = state
        .db
        .restock_requests()
        .set_status(&id, payload.status)
        .await?;

    state
        .record_audit(
            TABLE,
            &saved.id,
            "UPDATE",
            Some(&existing),
            Some(&saved),
            Some(saved.office),
        )
        .await;

    Ok(Json(ApiResponse::with_message(saved, "Status updated")))
}

async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let existing = state
        .db
        .restock_requests()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Restock request not found: {id}")))?;

    state.db.restock_requests().delete(&id).await?;

    state
        .record_audit(
            TABLE,
            &id,
            "DELETE",
            Some(&existing),
            NONE_SNAPSHOT,
            Some(existing.office),
        )
        .await;

    Ok(Json(ApiResponse::message_only("Restock request deleted")))
}
