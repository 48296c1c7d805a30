//! Route assembly.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::response::ApiResponse;
use crate::state::AppState;

pub mod audit;
pub mod catalog;
pub mod computers;
pub mod peripherals;
pub mod printer_items;
pub mod reports;
pub mod restock;

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/computers", computers::router())
        .nest("/api/peripherals", peripherals::router())
        .nest("/api/printer-items", printer_items::router())
        .nest("/api/makes", catalog::makes_router())
        .nest("/api/models", catalog::models_router())
        .nest("/api/restock-requests", restock::router())
        .nest("/api/audit-log", audit::router())
        .nest("/api/reports", reports::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, (StatusCode, Json<ApiResponse<()>>)> {
    if state.db.health_check().await {
        Ok(Json(ApiResponse::message_only("ok")))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::failure("database unavailable")),
        ))
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
