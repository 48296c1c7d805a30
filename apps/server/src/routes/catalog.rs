//! Reference catalog endpoints: makes and models.
//!
//! Renames are the interesting path here: changing a make or model name
//! rewrites the matching free-text values on the category's item table,
//! inside the catalog repository's transaction. Audit entries for catalog
//! mutations carry no office (catalog entries are global).

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
use stockroom_core::{validation, Make, MakeCategory, Model, MAX_NAME_LEN};

pub fn makes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_makes).post(create_make))
        .route("/:id", get(get_make).put(update_make).delete(delete_make))
}

pub fn models_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_models).post(create_model))
        .route(
            "/:id",
            get(get_model).put(update_model).delete(delete_model),
        )
}

// =============================================================================
// Makes
// =============================================================================

#[derive(Debug, Deserialize)]
struct MakeListQuery {
    category: Option<MakeCategory>,
}

#[derive(Debug, Deserialize)]
struct CreateMake {
    name: String,
    category: MakeCategory,
}

#[derive(Debug, Deserialize)]
struct UpdateMake {
    name: Option<String>,
    category: Option<MakeCategory>,
}

async fn list_makes(
    State(state): State<AppState>,
    Query(query): Query<MakeListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Make>>>> {
    let makes = state.db.catalog().find_makes(query.category).await?;
    Ok(Json(ApiResponse::list(makes)))
}

async fn get_make(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Make>>> {
    let make = state
        .db
        .catalog()
        .get_make(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Make not found: {id}")))?;

    Ok(Json(ApiResponse::ok(make)))
}

async fn create_make(
    State(state): State<AppState>,
    Json(payload): Json<CreateMake>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Make>>)> {
    validation::validate_name(&payload.name, "name", MAX_NAME_LEN)?;

    let name = payload.name.trim().to_string();
    if state
        .db
        .catalog()
        .find_make_by_name(&name, payload.category)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "Make '{name}' already exists in category '{}'",
            payload.category
        )));
    }

    let now = Utc::now();
    let make = Make {
        id: Uuid::new_v4().to_string(),
        name,
        category: payload.category,
        created_at: now,
        updated_at: now,
    };

    let created = state.db.catalog().insert_make(&make).await?;

    state
        .record_audit("makes", &created.id, "CREATE", NONE_SNAPSHOT, Some(&created), None)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(created, "Make created")),
    ))
}

async fn update_make(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMake>,
) -> ApiResult<Json<ApiResponse<Make>>> {
    let existing = state
        .db
        .catalog()
        .get_make(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Make not found: {id}")))?;

    let mut updated = existing.clone();
    if let Some(name) = payload.name {
        validation::validate_name(&name, "name", MAX_NAME_LEN)?;
        updated.name = name.trim().to_string();
    }
    if let Some(category) = payload.category {
        updated.category = category;
    }

    if updated.name != existing.name || updated.category != existing.category {
        if let Some(other) = state
            .db
            .catalog()
            .find_make_by_name(&updated.name, updated.category)
            .await?
        {
            if other.id != id {
                return Err(ApiError::Conflict(format!(
                    "Make '{}' already exists in category '{}'",
                    updated.name, updated.category
                )));
            }
        }
    }

    let saved = state.db.catalog().update_make(&updated).await?;

    state
        .record_audit("makes", &saved.id, "UPDATE", Some(&existing), Some(&saved), None)
        .await;

    Ok(Json(ApiResponse::with_message(saved, "Make updated")))
}

async fn delete_make(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let existing = state
        .db
        .catalog()
        .get_make(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Make not found: {id}")))?;

    state.db.catalog().delete_make(&id).await?;

    state
        .record_audit("makes", &id, "DELETE", Some(&existing), NONE_SNAPSHOT, None)
        .await;

    Ok(Json(ApiResponse::message_only("Make deleted")))
}

// =============================================================================
// Models
// =============================================================================

#[derive(Debug, Deserialize)]
struct ModelListQuery {
    category: Option<MakeCategory>,
    make_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateModel {
    name: String,
    make_id: String,
    category: MakeCategory,
}

#[derive(Debug, Deserialize)]
struct UpdateModel {
    name: Option<String>,
    make_id: Option<String>,
    category: Option<MakeCategory>,
}

async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ModelListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Model>>>> {
    let models = state
        .db
        .catalog()
        .find_models(query.category, query.make_id.as_deref())
        .await?;

    Ok(Json(ApiResponse::list(models)))
}

async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Model>>> {
    let model = state
        .db
        .catalog()
        .get_model(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Model not found: {id}")))?;

    Ok(Json(ApiResponse::ok(model)))
}

async fn create_model(
    State(state): State<AppState>,
    Json(payload): Json<CreateModel>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Model>>)> {
    validation::validate_name(&payload.name, "name", MAX_NAME_LEN)?;

    let name = payload.name.trim().to_string();
    if state
        .db
        .catalog()
        .find_model_by_name(&name, &payload.make_id)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "Model '{name}' already exists for this make"
        )));
    }

    let now = Utc::now();
    let model = Model {
        id: Uuid::new_v4().to_string(),
        name,
        make_id: payload.make_id,
        category: payload.category,
        created_at: now,
        updated_at: now,
        make_name: None,
    };

    let created = state.db.catalog().insert_model(&model).await?;

    state
        .record_audit("models", &created.id, "CREATE", NONE_SNAPSHOT, Some(&created), None)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(created, "Model created")),
    ))
}

async fn update_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateModel>,
) -> ApiResult<Json<ApiResponse<Model>>> {
    let existing = state
        .db
        .catalog()
        .get_model(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Model not found: {id}")))?;

    let mut updated = existing.clone();
    if let Some(name) = payload.name {
        validation::validate_name(&name, "name", MAX_NAME_LEN)?;
        updated.name = name.trim().to_string();
    }
    if let Some(make_id) = payload.make_id {
        updated.make_id = make_id;
    }
    if let Some(category) = payload.category {
        updated.category = category;
    }

    if updated.name != existing.name || updated.make_id != existing.make_id {
        if let Some(other) = state
            .db
            .catalog()
            .find_model_by_name(&updated.name, &updated.make_id)
            .await?
        {
            if other.id != id {
                return Err(ApiError::Conflict(format!(
                    "Model '{}' already exists for this make",
                    updated.name
                )));
            }
        }
    }

    let saved = state.db.catalog().update_model(&updated).await?;

    state
        .record_audit("models", &saved.id, "UPDATE", Some(&existing), Some(&saved), None)
        .await;

    Ok(Json(ApiResponse::with_message(saved, "Model updated")))
}

async fn delete_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let existing = state
        .db
        .catalog()
        .get_model(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Model not found: {id}")))?;

    state.db.catalog().delete_model(&id).await?;

    state
        .record_audit("models", &id, "DELETE", Some(&existing), NONE_SNAPSHOT, None)
        .await;

    Ok(Json(ApiResponse::message_only("Model deleted")))
}
