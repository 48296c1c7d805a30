//! # stockroom-db: Database Layer for Stockroom
//!
//! SQLite persistence for the office IT inventory backend, using sqlx for
//! async operations.
//!
//! ## Architecture Position
//! ```text
//!   apps/server (axum handler)
//!        │
//!        │  db.computers().insert(&computer, &serials)
//!        ▼
//!   stockroom-db (THIS CRATE)
//!   ├── pool.rs        Database handle + DbConfig
//!   ├── migrations.rs  embedded schema migrations
//!   ├── error.rs       DbError taxonomy
//!   └── repository/    one repository per aggregate
//!        │
//!        ▼
//!   SQLite (WAL mode, foreign keys, 30s busy wait)
//! ```
//!
//! ## Transaction Discipline
//! Every multi-statement mutation (item insert with serials, serial
//! replacement on update, cascading delete, catalog rename propagation)
//! runs inside a single transaction. A failure at any step rolls the whole
//! mutation back; readers never observe a half-written item.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::audit::AuditLogRepository;
pub use repository::catalog::CatalogRepository;
pub use repository::computer::ComputerRepository;
pub use repository::peripheral::PeripheralRepository;
pub use repository::printer_item::PrinterItemRepository;
pub use repository::reports::ReportsRepository;
pub use repository::restock::RestockRepository;
pub use repository::serial::SerialNumberRepository;
