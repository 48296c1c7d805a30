//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! Each repository wraps the pool and exposes a typed API over one
//! aggregate; SQL never leaks out of this module.
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - makes and models, rename propagation
//! - [`serial::SerialNumberRepository`] - globally unique serial numbers
//! - [`computer::ComputerRepository`] - computers + owned serials
//! - [`peripheral::PeripheralRepository`] - peripherals + owned serials
//! - [`printer_item::PrinterItemRepository`] - printer consumables
//! - [`restock::RestockRepository`] - restock request lifecycle
//! - [`audit::AuditLogRepository`] - append-only mutation history
//! - [`reports::ReportsRepository`] - cross-table grouped summaries

pub mod audit;
pub mod catalog;
pub mod computer;
pub mod peripheral;
pub mod printer_item;
pub mod reports;
pub mod restock;
pub mod serial;
