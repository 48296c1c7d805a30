//! # stockroom-core: Pure Domain Logic for Stockroom
//!
//! This crate holds the domain model for the office IT inventory backend:
//! the entities (computers, peripherals, printer consumables, serial
//! numbers, restock requests, audit entries), the closed enum domains every
//! layer agrees on, and the input validation rules applied at the API
//! boundary before anything touches the database.
//!
//! ## Architecture Position
//! ```text
//!   apps/server (axum REST boundary)
//!        │  payload schemas, error mapping
//!        ▼
//!   stockroom-core (THIS CRATE)         ← types, enums, validation
//!        │  typed entities
//!        ▼
//!   stockroom-db (SQLite repositories)  ← all I/O lives there
//! ```
//!
//! ## Design Principles
//!
//! 1. **No I/O**: database, network, and file system access are forbidden here
//! 2. **Closed domains**: offices, categories, statuses and priorities are
//!    Rust enums, mirrored by CHECK constraints in the schema
//! 3. **Explicit errors**: validation failures are typed, never strings

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length for names and free-text make/model fields.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length for printer consumable model names.
///
/// Printer supplies carry longer vendor strings ("TN-2420 High Yield
/// Toner ...") than the 100-character cap used everywhere else.
pub const MAX_PRINTER_MODEL_LEN: usize = 200;

/// Maximum length for a serial number value.
pub const MAX_SERIAL_LEN: usize = 100;

/// Maximum length for a restock request description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Maximum length for restock request notes.
pub const MAX_NOTES_LEN: usize = 1000;

/// Maximum look-back window, in days, for audit trail queries.
pub const MAX_AUDIT_WINDOW_DAYS: i64 = 365;

/// Maximum number of rows a list query may request.
pub const MAX_QUERY_LIMIT: i64 = 1000;
