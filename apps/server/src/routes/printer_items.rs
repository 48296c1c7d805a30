//! Printer consumable endpoints. Quantity-tracked supplies; no serial
//! routes exist here.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::{AppState, NONE_SNAPSHOT};
use stockroom_core::{
    validation, ItemStatus, Office, OfficeCount, PrinterItem, MAX_NAME_LEN, MAX_PRINTER_MODEL_LEN,
};

const TABLE: &str = "printer_items";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats", get(stats))
        .route("/:id", get(get_one).put(update).delete(delete_one))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    office: Option<Office>,
    search: Option<String>,
    /// Exact consumable kind filter ("toner", "drum", ...).
    #[serde(rename = "type")]
    item_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatePrinterItem {
    item_type: String,
    make: Option<String>,
    model: Option<String>,
    #[serde(default = "default_quantity")]
    quantity: i64,
    office: Office,
    #[serde(default)]
    status: ItemStatus,
}

#[derive(Debug, Deserialize)]
struct UpdatePrinterItem {
    item_type: Option<String>,
    make: Option<String>,
    model: Option<String>,
    quantity: Option<i64>,
    office: Option<Office>,
    status: Option<ItemStatus>,
}

fn default_quantity() -> i64 {
    1
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<PrinterItem>>>> {
    let items = if let Some(kind) = query.item_type {
        validation::validate_name(&kind, "type", MAX_NAME_LEN)?;
        state
            .db
            .printer_items()
            .find_by_type(&kind, query.office)
            .await?
    } else if let Some(term) = query.search {
        validation::validate_search_term(&term)?;
        state.db.printer_items().search(&term, query.office).await?
    } else {
        state.db.printer_items().find_all(query.office).await?
    };

    Ok(Json(ApiResponse::list(items)))
}

async fn stats(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<OfficeCount>>>> {
    let counts = state.db.printer_items().counts_by_office().await?;
    Ok(Json(ApiResponse::list(counts)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<PrinterItem>>> {
    let item = state
        .db
        .printer_items()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Printer item not found: {id}")))?;

    Ok(Json(ApiResponse::ok(item)))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreatePrinterItem>,
) -> ApiResult<(StatusCode, Json<ApiResponse<PrinterItem>>)> {
    validation::validate_name(&payload.item_type, "item_type", MAX_NAME_LEN)?;
    validation::validate_optional_text(payload.make.as_deref(), "make", MAX_NAME_LEN)?;
    validation::validate_optional_text(payload.model.as_deref(), "model", MAX_PRINTER_MODEL_LEN)?;
    validation::validate_quantity(payload.quantity)?;

    let now = Utc::now();
    let item = PrinterItem {
        id: Uuid::new_v4().to_string(),
        item_type: payload.item_type.trim().to_string(),
        make: clean_optional(payload.make),
        model: clean_optional(payload.model),
        quantity: payload.quantity,
        office: payload.office,
        status: payload.status,
        created_at: now,
        updated_at: now,
    };

    let created = state.db.printer_items().insert(&item).await?;

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
        Json(ApiResponse::with_message(created, "Printer item created")),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePrinterItem>,
) -> ApiResult<Json<ApiResponse<PrinterItem>>> {
    let existing = state
        .db
        .printer_items()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Printer item not found: {id}")))?;

    let mut updated = existing.clone();
    if let Some(item_type) = payload.item_type {
        validation::validate_name(&item_type, "item_type", MAX_NAME_LEN)?;
        updated.item_type = item_type.trim().to_string();
    }
    if let Some(make) = payload.make {
        validation::validate_optional_text(Some(&make), "make", MAX_NAME_LEN)?;
        updated.make = clean_optional(Some(make));
    }
    if let Some(model) = payload.model {
        validation::validate_optional_text(Some(&model), "model", MAX_PRINTER_MODEL_LEN)?;
        updated.model = clean_optional(Some(model));
    }
    if let Some(quantity) = payload.quantity {
        validation::validate_quantity(quantity)?;
        updated.quantity = quantity;
    }
    if let Some(office) = payload.office {
        updated.office = office;
    }
    if let Some(status) = payload.status {
        updated.status = status;
    }

    let saved = state.db.printer_items().update(&updated).await?;

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

    Ok(Json(ApiResponse::with_message(saved, "Printer item updated")))
}

async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let existing = state
        .db
        .printer_items()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Printer item not found: {id}")))?;

    state.db.printer_items().delete(&id).await?;

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

    Ok(Json(ApiResponse::message_only("Printer item deleted")))
}
