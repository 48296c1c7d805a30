//! # Reports Repository
//!
//! Grouped read-only summaries across the inventory tables.
//!
//! The item tables that feed the cross-category totals are a fixed list
//! baked into the queries below. Nothing here interpolates runtime input
//! into SQL.

use sqlx::SqlitePool;

use crate::error::DbResult;
use stockroom_core::{
    CategorySummary, InventorySummary, Office, OfficeSummary, RestockReport, RestockRequest,
    RestockSummary,
};

/// Repository for cross-table summary reports.
#[derive(Debug, Clone)]
pub struct ReportsRepository {
    pool: SqlitePool,
}

impl ReportsRepository {
    /// Creates a new ReportsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportsRepository { pool }
    }

    /// Builds the full inventory summary: a per-office breakdown for each
    /// item table plus flattened cross-category totals. Passing an office
    /// narrows every section to that office.
    pub async fn inventory_summary(&self, office: Option<Office>) -> DbResult<InventorySummary> {
        let computers = self.office_summary("computers", office).await?;
        let peripherals = self.office_summary("peripherals", office).await?;
        let printer_items = self.office_summary("printer_items", office).await?;

        let office_clause = office_clause(office);
        let sql = format!(
            r#"
            SELECT 'computers' AS category, office,
                   COUNT(*) AS total_items, SUM(quantity) AS total_quantity
            FROM computers{office_clause} GROUP BY office
            UNION ALL
            SELECT 'peripherals' AS category, office,
                   COUNT(*) AS total_items, SUM(quantity) AS total_quantity
            FROM peripherals{office_clause} GROUP BY office
            UNION ALL
            SELECT 'printer_items' AS category, office,
                   COUNT(*) AS total_items, SUM(quantity) AS total_quantity
            FROM printer_items{office_clause} GROUP BY office
            ORDER BY category ASC, office ASC
            "#
        );

        let mut query = sqlx::query_as::<_, CategorySummary>(&sql);
        if let Some(office) = office {
            query = query.bind(office).bind(office).bind(office);
        }
        let totals = query.fetch_all(&self.pool).await?;

        Ok(InventorySummary {
            computers,
            peripherals,
            printer_items,
            totals,
        })
    }

    /// Builds the restock report: statistics grouped by status, priority,
    /// and office, plus the ten most recent requests. Passing an office
    /// narrows both sections to that office.
    pub async fn restock_report(&self, office: Option<Office>) -> DbResult<RestockReport> {
        let office_clause = office_clause(office);
        let sql = format!(
            r#"
            SELECT status, priority, office,
                   COUNT(*) AS count, SUM(quantity_requested) AS total_quantity
            FROM restock_requests{office_clause}
            GROUP BY status, priority, office
            ORDER BY status ASC, priority ASC, office ASC
            "#
        );

        let mut query = sqlx::query_as::<_, RestockSummary>(&sql);
        if let Some(office) = office {
            query = query.bind(office);
        }
        let statistics = query.fetch_all(&self.pool).await?;

        let recent_clause = if office.is_some() {
            " WHERE r.office = ?"
        } else {
            ""
        };
        let sql = format!(
            r#"
            SELECT r.*, mk.name AS make_name, md.name AS model_name
            FROM restock_requests r
            LEFT JOIN makes mk ON r.make_id = mk.id
            LEFT JOIN models md ON r.model_id = md.id{recent_clause}
            ORDER BY r.created_at DESC
            LIMIT 10
            "#
        );

        let mut query = sqlx::query_as::<_, RestockRequest>(&sql);
        if let Some(office) = office {
            query = query.bind(office);
        }
        let recent_requests = query.fetch_all(&self.pool).await?;

        Ok(RestockReport {
            statistics,
            recent_requests,
        })
    }

    /// Per-office breakdown for one item table.
    ///
    /// `table` is one of the three literals passed by
    /// [`Self::inventory_summary`], never caller input.
    async fn office_summary(
        &self,
        table: &'static str,
        office: Option<Office>,
    ) -> DbResult<Vec<OfficeSummary>> {
        let office_clause = office_clause(office);
        let sql = format!(
            r#"
            SELECT office,
                   COUNT(*) AS total_items,
                   SUM(quantity) AS total_quantity,
                   SUM(CASE WHEN status = 'active' THEN 1 ELSE 0 END) AS active_items
            FROM {table}{office_clause}
            GROUP BY office
            ORDER BY office ASC
            "#
        );

        let mut query = sqlx::query_as::<_, OfficeSummary>(&sql);
        if let Some(office) = office {
            query = query.bind(office);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }
}

fn office_clause(office: Option<Office>) -> &'static str {
    if office.is_some() {
        " WHERE office = ?"
    } else {
        ""
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use stockroom_core::{
        Computer, ItemCategory, ItemStatus, Office, PrinterItem, Priority, RestockStatus,
    };
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn computer(office: Office, quantity: i64, status: ItemStatus) -> Computer {
        let now = Utc::now();
        Computer {
            id: Uuid::new_v4().to_string(),
            make: "Dell".to_string(),
            model: "XPS 13".to_string(),
            quantity,
            office,
            status,
            created_at: now,
            updated_at: now,
            serial_numbers: Vec::new(),
        }
    }

    fn toner(office: Office, quantity: i64) -> PrinterItem {
        let now = Utc::now();
        PrinterItem {
            id: Uuid::new_v4().to_string(),
            item_type: "toner".to_string(),
            make: None,
            model: None,
            quantity,
            office,
            status: ItemStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(office: Office, priority: Priority, quantity: i64) -> RestockRequest {
        let now = Utc::now();
        RestockRequest {
            id: Uuid::new_v4().to_string(),
            item_category: ItemCategory::PrinterItems,
            item_description: "supplies".to_string(),
            make_id: None,
            model_id: None,
            quantity_requested: quantity,
            office,
            priority,
            status: RestockStatus::Pending,
            requested_by: None,
            notes: None,
            created_at: now,
            updated_at: now,
            make_name: None,
            model_name: None,
        }
    }

    #[tokio::test]
    async fn inventory_summary_counts_active_items_separately() {
        let db = test_db().await;

        db.computers()
            .insert(&computer(Office::Office1, 2, ItemStatus::Active), &[])
            .await
            .unwrap();
        db.computers()
            .insert(&computer(Office::Office1, 1, ItemStatus::Retired), &[])
            .await
            .unwrap();
        db.printer_items()
            .insert(&toner(Office::Office2, 5))
            .await
            .unwrap();

        let summary = db.reports().inventory_summary(None).await.unwrap();

        assert_eq!(summary.computers.len(), 1);
        let office1 = &summary.computers[0];
        assert_eq!(office1.total_items, 2);
        assert_eq!(office1.total_quantity, 3);
        assert_eq!(office1.active_items, 1);

        assert!(summary.peripherals.is_empty());
        assert_eq!(summary.printer_items.len(), 1);

        // totals flatten both populated tables
        assert_eq!(summary.totals.len(), 2);
        let categories: Vec<&str> =
            summary.totals.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(categories, vec!["computers", "printer_items"]);
    }

    #[tokio::test]
    async fn restock_report_groups_and_lists_recent() {
        let db = test_db().await;
        let repo = db.restock_requests();

        repo.insert(&request(Office::Office1, Priority::Urgent, 2))
            .await
            .unwrap();
        repo.insert(&request(Office::Office1, Priority::Urgent, 3))
            .await
            .unwrap();
        repo.insert(&request(Office::Office2, Priority::Low, 1))
            .await
            .unwrap();

        let report = db.reports().restock_report(None).await.unwrap();

        assert_eq!(report.recent_requests.len(), 3);

        let urgent = report
            .statistics
            .iter()
            .find(|s| s.priority == Priority::Urgent)
            .unwrap();
        assert_eq!(urgent.count, 2);
        assert_eq!(urgent.total_quantity, 5);
        assert_eq!(urgent.office, Office::Office1);
    }

    #[tokio::test]
    async fn office_filter_narrows_both_reports() {
        let db = test_db().await;

        db.computers()
            .insert(&computer(Office::Office1, 2, ItemStatus::Active), &[])
            .await
            .unwrap();
        db.computers()
            .insert(&computer(Office::Office2, 4, ItemStatus::Active), &[])
            .await
            .unwrap();
        db.restock_requests()
            .insert(&request(Office::Office1, Priority::Normal, 1))
            .await
            .unwrap();
        db.restock_requests()
            .insert(&request(Office::Office2, Priority::Normal, 1))
            .await
            .unwrap();

        let summary = db
            .reports()
            .inventory_summary(Some(Office::Office2))
            .await
            .unwrap();
        assert_eq!(summary.computers.len(), 1);
        assert_eq!(summary.computers[0].office, Office::Office2);
        assert_eq!(summary.totals.len(), 1);
        assert_eq!(summary.totals[0].total_quantity, 4);

        let report = db
            .reports()
            .restock_report(Some(Office::Office2))
            .await
            .unwrap();
        assert_eq!(report.recent_requests.len(), 1);
        assert_eq!(report.recent_requests[0].office, Office::Office2);
    }

    #[tokio::test]
    async fn empty_database_yields_empty_report_sections() {
        let db = test_db().await;

        let summary = db.reports().inventory_summary(None).await.unwrap();
        assert!(summary.computers.is_empty());
        assert!(summary.totals.is_empty());

        let report = db.reports().restock_report(None).await.unwrap();
        assert!(report.statistics.is_empty());
        assert!(report.recent_requests.is_empty());
    }
}
