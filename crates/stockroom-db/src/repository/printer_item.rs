//! # Printer Consumable Repository
//!
//! Toner, drums, paper and other printer supplies. Quantity-tracked only;
//! nothing here touches the serial registry.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::{Office, OfficeCount, PrinterItem};

/// Repository for printer consumable operations.
#[derive(Debug, Clone)]
pub struct PrinterItemRepository {
    pool: SqlitePool,
}

impl PrinterItemRepository {
    /// Creates a new PrinterItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PrinterItemRepository { pool }
    }

    /// Lists printer consumables, optionally scoped to one office,
    /// newest first.
    pub async fn find_all(&self, office: Option<Office>) -> DbResult<Vec<PrinterItem>> {
        let items = match office {
            Some(office) => {
                sqlx::query_as::<_, PrinterItem>(
                    "SELECT * FROM printer_items WHERE office = ?1 ORDER BY created_at DESC",
                )
                .bind(office)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, PrinterItem>(
                    "SELECT * FROM printer_items ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(items)
    }

    /// Gets a printer consumable by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PrinterItem>> {
        let item = sqlx::query_as::<_, PrinterItem>("SELECT * FROM printer_items WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Lists consumables of one kind ("toner", "drum", ...), optionally
    /// scoped to one office. The kind match is exact, not a substring.
    pub async fn find_by_type(
        &self,
        item_type: &str,
        office: Option<Office>,
    ) -> DbResult<Vec<PrinterItem>> {
        let items = match office {
            Some(office) => {
                sqlx::query_as::<_, PrinterItem>(
                    r#"
                    SELECT * FROM printer_items
                    WHERE item_type = ?1 AND office = ?2
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(item_type)
                .bind(office)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, PrinterItem>(
                    "SELECT * FROM printer_items WHERE item_type = ?1 ORDER BY created_at DESC",
                )
                .bind(item_type)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(items)
    }

    /// Searches consumables whose kind, make, or model contains `term`,
    /// optionally scoped to one office.
    pub async fn search(&self, term: &str, office: Option<Office>) -> DbResult<Vec<PrinterItem>> {
        let pattern = format!("%{}%", term.trim());

        let items = match office {
            Some(office) => {
                sqlx::query_as::<_, PrinterItem>(
                    r#"
                    SELECT * FROM printer_items
                    WHERE (item_type LIKE ?1 OR make LIKE ?1 OR model LIKE ?1) AND office = ?2
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(&pattern)
                .bind(office)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, PrinterItem>(
                    r#"
                    SELECT * FROM printer_items
                    WHERE item_type LIKE ?1 OR make LIKE ?1 OR model LIKE ?1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(items)
    }

    /// Counts active consumables per office (row count and summed quantity).
    pub async fn counts_by_office(&self) -> DbResult<Vec<OfficeCount>> {
        let counts = sqlx::query_as::<_, OfficeCount>(
            r#"
            SELECT office, COUNT(*) AS total, SUM(quantity) AS total_quantity
            FROM printer_items
            WHERE status = 'active'
            GROUP BY office
            ORDER BY office ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Inserts a printer consumable.
    pub async fn insert(&self, item: &PrinterItem) -> DbResult<PrinterItem> {
        debug!(id = %item.id, item_type = %item.item_type, "Inserting printer item");

        sqlx::query(
            r#"
            INSERT INTO printer_items (id, item_type, make, model, quantity, office, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&item.id)
        .bind(&item.item_type)
        .bind(&item.make)
        .bind(&item.model)
        .bind(item.quantity)
        .bind(item.office)
        .bind(item.status)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&item.id)
            .await?
            .ok_or_else(|| DbError::not_found("PrinterItem", &item.id))
    }

    /// Updates a printer consumable.
    pub async fn update(&self, item: &PrinterItem) -> DbResult<PrinterItem> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE printer_items
            SET item_type = ?2, make = ?3, model = ?4, quantity = ?5, office = ?6, status = ?7, updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(&item.item_type)
        .bind(&item.make)
        .bind(&item.model)
        .bind(item.quantity)
        .bind(item.office)
        .bind(item.status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PrinterItem", &item.id));
        }

        self.get_by_id(&item.id)
            .await?
            .ok_or_else(|| DbError::not_found("PrinterItem", &item.id))
    }

    /// Deletes a printer consumable. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM printer_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stockroom_core::ItemStatus;
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn item(kind: &str, office: Office, quantity: i64) -> PrinterItem {
        let now = Utc::now();
        PrinterItem {
            id: Uuid::new_v4().to_string(),
            item_type: kind.to_string(),
            make: Some("Brother".to_string()),
            model: None,
            quantity,
            office,
            status: ItemStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_update_delete_round_trip() {
        let db = test_db().await;
        let repo = db.printer_items();

        let mut created = repo.insert(&item("toner", Office::Office1, 5)).await.unwrap();
        assert_eq!(created.quantity, 5);

        created.quantity = 2;
        created.status = ItemStatus::Inactive;
        let updated = repo.update(&created).await.unwrap();
        assert_eq!(updated.quantity, 2);
        assert_eq!(updated.status, ItemStatus::Inactive);

        assert!(repo.delete(&created.id).await.unwrap());
        assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_by_type_matches_exactly() {
        let db = test_db().await;
        let repo = db.printer_items();

        repo.insert(&item("toner", Office::Office1, 3)).await.unwrap();
        repo.insert(&item("toner cartridge", Office::Office1, 1))
            .await
            .unwrap();
        repo.insert(&item("drum", Office::Office2, 1)).await.unwrap();

        let toner = repo.find_by_type("toner", None).await.unwrap();
        assert_eq!(toner.len(), 1);
        assert_eq!(toner[0].item_type, "toner");

        let scoped = repo
            .find_by_type("drum", Some(Office::Office1))
            .await
            .unwrap();
        assert!(scoped.is_empty());
    }

    #[tokio::test]
    async fn update_missing_row_is_not_found() {
        let db = test_db().await;
        let repo = db.printer_items();

        let ghost = item("toner", Office::Office1, 1);
        let err = repo.update(&ghost).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn search_spans_kind_make_and_model() {
        let db = test_db().await;
        let repo = db.printer_items();

        let mut paper = item("paper", Office::Office3, 10);
        paper.make = Some("HP".to_string());
        paper.model = Some("A4 80gsm".to_string());
        repo.insert(&paper).await.unwrap();
        repo.insert(&item("toner", Office::Office3, 2)).await.unwrap();

        assert_eq!(repo.search("80gsm", None).await.unwrap().len(), 1);
        assert_eq!(repo.search("brother", None).await.unwrap().len(), 1);
        assert_eq!(
            repo.search("paper", Some(Office::Office1))
                .await
                .unwrap()
                .len(),
            0
        );
    }
}
