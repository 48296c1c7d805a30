//! API error type and its HTTP mapping.
//!
//! ## Status Mapping
//! ```text
//!   ValidationError                  → 400
//!   DbError::UniqueViolation         → 400
//!   DbError::DuplicateSerial         → 400
//!   DbError::CategoryMismatch        → 400
//!   DbError::ForeignKeyViolation     → 400
//!   DbError::NotFound                → 404
//!   everything else                  → 500 (detail logged, not leaked)
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::response::ApiResponse;
use stockroom_core::ValidationError;
use stockroom_db::DbError;

/// Errors surfaced by route handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request payload failed a validation rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage layer failure; mapped per variant.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with existing state (duplicate names, serials).
    #[error("{0}")]
    Conflict(String),

    /// Malformed request outside the validation rules.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) | ApiError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Db(db) => match db {
                DbError::NotFound { .. } => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. }
                | DbError::DuplicateSerial { .. }
                | DbError::CategoryMismatch { .. }
                | DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Internal error while handling request");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ApiResponse::failure(detail))).into_response()
    }
}

/// Convenience alias for handler results.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_variants_map_to_expected_statuses() {
        let dup = ApiError::Db(DbError::DuplicateSerial {
            serial: "SN-1".into(),
        });
        assert_eq!(dup.status(), StatusCode::BAD_REQUEST);

        let missing = ApiError::Db(DbError::not_found("Computer", "c1"));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let busy = ApiError::Db(DbError::Busy("database is locked".into()));
        assert_eq!(busy.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let mismatch = ApiError::Db(DbError::CategoryMismatch {
            model_category: "computer".into(),
            make_category: "printer".into(),
        });
        assert_eq!(mismatch.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let err = ApiError::Db(DbError::Internal("secret path /var/db".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
