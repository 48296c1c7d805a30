//! Peripheral endpoints. Same surface as computers, with a required
//! `item_name` and optional make/model.

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
use stockroom_core::{validation, ItemStatus, Office, OfficeCount, Peripheral, MAX_NAME_LEN};

const TABLE: &str = "peripherals";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats", get(stats))
        .route("/serial/:serial", get(find_by_serial))
        .route("/:id", get(get_one).put(update).delete(delete_one))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    office: Option<Office>,
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatePeripheral {
    item_name: String,
    make: Option<String>,
    model: Option<String>,
    #[serde(default = "default_quantity")]
    quantity: i64,
    office: Office,
    #[serde(default)]
    status: ItemStatus,
    #[serde(default)]
    serial_numbers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UpdatePeripheral {
    item_name: Option<String>,
    make: Option<String>,
    model: Option<String>,
    quantity: Option<i64>,
    office: Option<Office>,
    status: Option<ItemStatus>,
    serial_numbers: Option<Vec<String>>,
}

fn default_quantity() -> i64 {
    1
}

/// Normalizes an optional free-text field: blank collapses to absent.
fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Peripheral>>>> {
    let peripherals = match query.search {
        Some(term) => {
            validation::validate_search_term(&term)?;
            state.db.peripherals().search(&term, query.office).await?
        }
        None => state.db.peripherals().find_all(query.office).await?,
    };

    Ok(Json(ApiResponse::list(peripherals)))
}

async fn stats(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<OfficeCount>>>> {
    let counts = state.db.peripherals().counts_by_office().await?;
    Ok(Json(ApiResponse::list(counts)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Peripheral>>> {
    let peripheral = state
        .db
        .peripherals()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Peripheral not found: {id}")))?;

    Ok(Json(ApiResponse::ok(peripheral)))
}

async fn find_by_serial(
    State(state): State<AppState>,
    Path(serial): Path<String>,
) -> ApiResult<Json<ApiResponse<Peripheral>>> {
    let peripheral = state
        .db
        .peripherals()
        .find_by_serial_number(&serial)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("No peripheral with serial number: {serial}"))
        })?;

    Ok(Json(ApiResponse::ok(peripheral)))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreatePeripheral>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Peripheral>>)> {
    validation::validate_name(&payload.item_name, "item_name", MAX_NAME_LEN)?;
    validation::validate_optional_text(payload.make.as_deref(), "make", MAX_NAME_LEN)?;
    validation::validate_optional_text(payload.model.as_deref(), "model", MAX_NAME_LEN)?;
    validation::validate_quantity(payload.quantity)?;
    validation::validate_serial_numbers(&payload.serial_numbers)?;

    for serial in &payload.serial_numbers {
        let value = serial.trim();
        if value.is_empty() {
            continue;
        }
        if state
            .db
            .serials()
            .find_by_serial_number(value)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict(format!(
                "Serial number '{value}' already exists"
            )));
        }
    }

    let now = Utc::now();
    let peripheral = Peripheral {
        id: Uuid::new_v4().to_string(),
        item_name: payload.item_name.trim().to_string(),
        make: clean_optional(payload.make),
        model: clean_optional(payload.model),
        quantity: payload.quantity,
        office: payload.office,
        status: payload.status,
        created_at: now,
        updated_at: now,
        serial_numbers: Vec::new(),
    };

    let created = state
        .db
        .peripherals()
        .insert(&peripheral, &payload.serial_numbers)
        .await?;

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
        Json(ApiResponse::with_message(created, "Peripheral created")),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePeripheral>,
) -> ApiResult<Json<ApiResponse<Peripheral>>> {
    let existing = state
        .db
        .peripherals()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Peripheral not found: {id}")))?;

    let mut updated = existing.clone();
    if let Some(item_name) = payload.item_name {
        validation::validate_name(&item_name, "item_name", MAX_NAME_LEN)?;
        updated.item_name = item_name.trim().to_string();
    }
    if let Some(make) = payload.make {
        validation::validate_optional_text(Some(&make), "make", MAX_NAME_LEN)?;
        updated.make = clean_optional(Some(make));
    }
    if let Some(model) = payload.model {
        validation::validate_optional_text(Some(&model), "model", MAX_NAME_LEN)?;
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
    if let Some(ref serials) = payload.serial_numbers {
        validation::validate_serial_numbers(serials)?;
    }

    let saved = state
        .db
        .peripherals()
        .update(&updated, payload.serial_numbers.as_deref())
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

    Ok(Json(ApiResponse::with_message(saved, "Peripheral updated")))
}

async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let existing = state
        .db
        .peripherals()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Peripheral not found: {id}")))?;

    state.db.peripherals().delete(&id).await?;

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

    Ok(Json(ApiResponse::message_only("Peripheral deleted")))
}
