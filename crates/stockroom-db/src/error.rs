//! # Database Error Types
//!
//! Error taxonomy for database operations.
//!
//! ## Error Flow
//! ```text
//!   SQLite error (sqlx::Error)
//!        │
//!        ▼
//!   DbError (this module)   classifies constraint subtypes
//!        │
//!        ▼
//!   ApiError (apps/server)  maps to HTTP status + response envelope
//! ```

use thiserror::Error;

/// Database operation errors.
///
/// These wrap sqlx errors and classify engine-level constraint failures so
/// callers can react without parsing message strings themselves.
#[derive(Debug, Error)]
pub enum DbError {
    /// Lookup by id or name yielded nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (duplicate make name, model name, ...).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A serial number value is already registered, possibly under a
    /// different item type. Serial uniqueness is global.
    #[error("Serial number '{serial}' already exists")]
    DuplicateSerial { serial: String },

    /// Foreign key constraint violation (dangling make_id, model_id, ...).
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A model's category does not match its parent make's category.
    /// Rejected before any write occurs.
    #[error("Model category '{model_category}' does not match make category '{make_category}'")]
    CategoryMismatch {
        model_category: String,
        make_category: String,
    },

    /// Database connection failed (missing file, permissions, disk full).
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The engine stayed locked past the busy-wait window.
    #[error("Database busy: {0}")]
    Busy(String),

    /// Pool exhausted (all connections in use past the acquire timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// SQLite reports constraint failures as message text:
/// - `UNIQUE constraint failed: <table>.<column>`
/// - `FOREIGN KEY constraint failed`
/// - `database is locked` once the busy wait runs out
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("database is locked") {
                    DbError::Busy(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
