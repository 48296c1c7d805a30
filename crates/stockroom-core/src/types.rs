//! # Domain Types
//!
//! Entities and enum domains for the Stockroom inventory backend.
//!
//! ## Entity Map
//! ```text
//!   Make ──< Model            reference catalog (canonical names)
//!     │
//!     │ rename propagation (free-text bridge)
//!     ▼
//!   Computer / Peripheral / PrinterItem     inventory items per office
//!     │
//!     └──< SerialNumber       globally unique serial values
//!
//!   RestockRequest            pending → approved → ordered → received
//!   AuditLogEntry             append-only mutation history
//! ```
//!
//! ## Identity
//! Every entity id is a UUIDv4 string minted by the application before the
//! insert. Nothing waits on the engine for an id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Enum Domains
// =============================================================================
// These are the closed value sets shared by the API boundary, the domain
// layer, and the CHECK constraints in the schema. Adding a variant means
// touching the schema migration too.

/// Office location. Nearly every query is scoped by office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum Office {
    #[serde(rename = "Office 1")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Office 1"))]
    Office1,
    #[serde(rename = "Office 2")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Office 2"))]
    Office2,
    #[serde(rename = "Office 3")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Office 3"))]
    Office3,
}

impl Office {
    /// Returns the canonical display name (also the stored value).
    pub fn as_str(&self) -> &'static str {
        match self {
            Office::Office1 => "Office 1",
            Office::Office2 => "Office 2",
            Office::Office3 => "Office 3",
        }
    }
}

impl std::fmt::Display for Office {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status for an inventory item.
///
/// This is a soft lifecycle signal only: items are hard-deleted by id,
/// `Retired` does not remove the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ItemStatus {
    Active,
    Inactive,
    Maintenance,
    Retired,
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Active
    }
}

/// Category of a make or model in the reference catalog.
///
/// A model's category must always match its parent make's category; the
/// catalog repository rejects a mismatch before writing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum MakeCategory {
    Computer,
    Peripheral,
    Printer,
}

impl MakeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MakeCategory::Computer => "computer",
            MakeCategory::Peripheral => "peripheral",
            MakeCategory::Printer => "printer",
        }
    }
}

impl std::fmt::Display for MakeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item table a restock request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ItemCategory {
    Computers,
    Peripherals,
    PrinterItems,
}

/// Which kind of item a serial number belongs to.
///
/// Printer consumables are tracked by quantity only and never own serial
/// numbers, so they are deliberately absent here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ItemType {
    Computer,
    Peripheral,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Computer => "computer",
            ItemType::Peripheral => "peripheral",
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restock request priority, ranked urgent > high > normal > low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// Restock request status.
///
/// Any status may move to any other; there is no state machine beyond the
/// enum domain. Strict transitions were considered and deliberately left
/// out (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RestockStatus {
    Pending,
    Approved,
    Ordered,
    Received,
    Cancelled,
}

impl Default for RestockStatus {
    fn default() -> Self {
        RestockStatus::Pending
    }
}

// =============================================================================
// Reference Catalog
// =============================================================================

/// A canonical manufacturer name, unique per (name, category).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Make {
    pub id: String,
    pub name: String,
    pub category: MakeCategory,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A canonical model name under a make, unique per (name, make_id).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub make_id: String,
    pub category: MakeCategory,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Parent make name, filled in by joined reads only.
    #[cfg_attr(feature = "sqlx", sqlx(default))]
    #[serde(default)]
    pub make_name: Option<String>,
}

// =============================================================================
// Serial Registry
// =============================================================================

/// A serial number owned by a computer or peripheral.
///
/// The serial value is unique across the whole system, not just within one
/// item type. The schema enforces this with a UNIQUE index.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SerialNumber {
    pub id: String,
    pub item_type: ItemType,
    pub item_id: String,
    pub serial_number: String,
    pub status: ItemStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Inventory Items
// =============================================================================

/// A computer entry: make/model are free text, bridged to the reference
/// catalog by rename propagation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Computer {
    pub id: String,
    pub make: String,
    pub model: String,
    pub quantity: i64,
    pub office: Office,
    pub status: ItemStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Owned serial numbers, attached by the repository after the row read.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub serial_numbers: Vec<SerialNumber>,
}

/// A peripheral (monitor, dock, keyboard, ...). Unlike computers these are
/// named, and make/model are optional.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Peripheral {
    pub id: String,
    pub item_name: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub quantity: i64,
    pub office: Office,
    pub status: ItemStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub serial_numbers: Vec<SerialNumber>,
}

/// A printer consumable (toner, drum, paper). Quantity-tracked only; no
/// serial number relationship exists for these.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PrinterItem {
    pub id: String,
    /// Kind of consumable ("toner", "drum", ...). Free text, not an enum.
    pub item_type: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub quantity: i64,
    pub office: Office,
    pub status: ItemStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Restock Ledger
// =============================================================================

/// A request to restock some item category at an office.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RestockRequest {
    pub id: String,
    pub item_category: ItemCategory,
    pub item_description: String,
    pub make_id: Option<String>,
    pub model_id: Option<String>,
    pub quantity_requested: i64,
    pub office: Office,
    pub priority: Priority,
    pub status: RestockStatus,
    pub requested_by: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Catalog names, filled in by joined reads only.
    #[cfg_attr(feature = "sqlx", sqlx(default))]
    #[serde(default)]
    pub make_name: Option<String>,
    #[cfg_attr(feature = "sqlx", sqlx(default))]
    #[serde(default)]
    pub model_name: Option<String>,
}

// =============================================================================
// Audit Trail
// =============================================================================

/// One append-only audit record for a mutation.
///
/// Old/new snapshots are stored as serialized JSON text. Rows are never
/// updated or deleted by the application.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AuditLogEntry {
    pub id: String,
    pub table_name: String,
    pub record_id: String,
    pub action: String,
    pub old_values: Option<String>,
    pub new_values: Option<String>,
    pub office: Option<Office>,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Parses the old-value snapshot. Malformed JSON degrades to `None`
    /// rather than failing the read.
    pub fn old_values_json(&self) -> Option<serde_json::Value> {
        self.old_values
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }

    /// Parses the new-value snapshot, same degradation rule.
    pub fn new_values_json(&self) -> Option<serde_json::Value> {
        self.new_values
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}

// =============================================================================
// Report Rows
// =============================================================================
// Plain grouped-query results. These only ever travel outward, so they
// serialize but never deserialize.

/// COUNT/SUM of active items per office.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OfficeCount {
    pub office: Office,
    pub total: i64,
    pub total_quantity: i64,
}

/// Restock request counts per status.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StatusCount {
    pub status: RestockStatus,
    pub count: i64,
}

/// Pending restock request counts per priority.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: i64,
}

/// Audit action counts inside a time window.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ActionCount {
    pub action: String,
    pub count: i64,
}

/// Audit activity per table inside a time window.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TableActivity {
    pub table_name: String,
    pub activity_count: i64,
}

/// Inventory summary row for one item table, grouped by office.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OfficeSummary {
    pub office: Office,
    pub total_items: i64,
    pub total_quantity: i64,
    pub active_items: i64,
}

/// Cross-category totals row for the inventory summary report.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CategorySummary {
    pub category: String,
    pub office: Office,
    pub total_items: i64,
    pub total_quantity: i64,
}

/// Grouped restock statistics row for the restock report.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RestockSummary {
    pub status: RestockStatus,
    pub priority: Priority,
    pub office: Office,
    pub count: i64,
    pub total_quantity: i64,
}

/// The full inventory summary report: per-office breakdowns for each item
/// table plus a flattened cross-category totals list.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct InventorySummary {
    pub computers: Vec<OfficeSummary>,
    pub peripherals: Vec<OfficeSummary>,
    pub printer_items: Vec<OfficeSummary>,
    pub totals: Vec<CategorySummary>,
}

/// The restock report: grouped statistics plus the most recent requests.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct RestockReport {
    pub statistics: Vec<RestockSummary>,
    pub recent_requests: Vec<RestockRequest>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn office_serializes_with_display_name() {
        let json = serde_json::to_string(&Office::Office2).unwrap();
        assert_eq!(json, "\"Office 2\"");

        let back: Office = serde_json::from_str("\"Office 2\"").unwrap();
        assert_eq!(back, Office::Office2);
    }

    #[test]
    fn enum_domains_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&ItemStatus::Maintenance).unwrap(),
            "\"maintenance\""
        );
        assert_eq!(
            serde_json::to_string(&Priority::Urgent).unwrap(),
            "\"urgent\""
        );
        assert_eq!(
            serde_json::to_string(&ItemCategory::PrinterItems).unwrap(),
            "\"printer_items\""
        );
    }

    #[test]
    fn audit_snapshot_parsing_degrades_to_none() {
        let entry = AuditLogEntry {
            id: "a1".into(),
            table_name: "computers".into(),
            record_id: "c1".into(),
            action: "UPDATE".into(),
            old_values: Some("{not json".into()),
            new_values: Some(r#"{"make":"Dell"}"#.into()),
            office: Some(Office::Office1),
            timestamp: Utc::now(),
        };

        assert!(entry.old_values_json().is_none());
        assert_eq!(
            entry.new_values_json().unwrap()["make"],
            serde_json::json!("Dell")
        );
    }

    #[test]
    fn absent_snapshots_parse_to_none() {
        let entry = AuditLogEntry {
            id: "a2".into(),
            table_name: "makes".into(),
            record_id: "m1".into(),
            action: "CREATE".into(),
            old_values: None,
            new_values: None,
            office: None,
            timestamp: Utc::now(),
        };

        assert!(entry.old_values_json().is_none());
        assert!(entry.new_values_json().is_none());
    }
}
