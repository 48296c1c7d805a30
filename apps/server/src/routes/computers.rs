//! Computer endpoints.
//!
//! ```text
//!   GET    /api/computers                 list (office / search filters)
//!   GET    /api/computers/stats           per-office counts
//!   GET    /api/computers/:id             fetch one
//!   GET    /api/computers/serial/:serial  resolve owner of a serial
//!   POST   /api/computers                 create with serial batch
//!   PUT    /api/computers/:id             partial update, serial replacement
//!   DELETE /api/computers/:id             delete with serial cascade
//! ```

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
use stockroom_core::{validation, Computer, ItemStatus, Office, OfficeCount, MAX_NAME_LEN};

const TABLE: &str = "computers";

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
struct CreateComputer {
    make: String,
    model: String,
    #[serde(default = "default_quantity")]
    quantity: i64,
    office: Office,
    #[serde(default)]
    status: ItemStatus,
    #[serde(default)]
    serial_numbers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateComputer {
    make: Option<String>,
    model: Option<String>,
    quantity: Option<i64>,
    office: Option<Office>,
    status: Option<ItemStatus>,
    /// `Some` replaces the registered serial list, absent leaves it alone.
    serial_numbers: Option<Vec<String>>,
}

fn default_quantity() -> i64 {
    1
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Computer>>>> {
    let computers = match query.search {
        Some(term) => {
            validation::validate_search_term(&term)?;
            state
                .db
                .computers()
                .search_by_make_or_model(&term, query.office)
                .await?
        }
        None => state.db.computers().find_all(query.office).await?,
    };

    Ok(Json(ApiResponse::list(computers)))
}

async fn stats(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<OfficeCount>>>> {
    let counts = state.db.computers().counts_by_office().await?;
    Ok(Json(ApiResponse::list(counts)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Computer>>> {
    let computer = state
        .db
        .computers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Computer not found: {id}")))?;

    Ok(Json(ApiResponse::ok(computer)))
}

async fn find_by_serial(
    State(state): State<AppState>,
    Path(serial): Path<String>,
) -> ApiResult<Json<ApiResponse<Computer>>> {
    let computer = state
        .db
        .computers()
        .find_by_serial_number(&serial)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("No computer with serial number: {serial}"))
        })?;

    Ok(Json(ApiResponse::ok(computer)))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateComputer>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Computer>>)> {
    validation::validate_name(&payload.make, "make", MAX_NAME_LEN)?;
    validation::validate_name(&payload.model, "model", MAX_NAME_LEN)?;
    validation::validate_quantity(payload.quantity)?;
    validation::validate_serial_numbers(&payload.serial_numbers)?;

    // friendly conflict message before the UNIQUE index has its say
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
    let computer = Computer {
        id: Uuid::new_v4().to_string(),
        make: payload.make.trim().to_string(),
        model: payload.model.trim().to_string(),
        quantity: payload.quantity,
        office: payload.office,
        status: payload.status,
        created_at: now,
        updated_at: now,
        serial_numbers: Vec::new(),
    };

    let created = state
        .db
        .computers()
        .insert(&computer, &payload.serial_numbers)
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
        Json(ApiResponse::with_message(created, "Computer created")),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateComputer>,
) -> ApiResult<Json<ApiResponse<Computer>>> {
    let existing = state
        .db
        .computers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Computer not found: {id}")))?;

    let mut updated = existing.clone();
    if let Some(make) = payload.make {
        validation::validate_name(&make, "make", MAX_NAME_LEN)?;
        updated.make = make.trim().to_string();
    }
    if let Some(model) = payload.model {
        validation::validate_name(&model, "model", MAX_NAME_LEN)?;
        updated.model = model.trim().to_string();
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
        .computers()
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

    Ok(Json(ApiResponse::with_message(saved, "Computer updated")))
}

async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let existing = state
        .db
        .computers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Computer not found: {id}")))?;

    state.db.computers().delete(&id).await?;

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

    Ok(Json(ApiResponse::message_only("Computer deleted")))
}
