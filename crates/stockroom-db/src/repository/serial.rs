//! # Serial Number Registry
//!
//! Ownership and global uniqueness of serial numbers.
//!
//! ## Uniqueness
//! A serial value is unique across the whole system, not per item type.
//! The `serial_numbers.serial_number` UNIQUE index is the enforcement
//! point; route-level pre-checks only exist to produce a friendlier
//! conflict message. Two concurrent creates racing past the pre-check are
//! still serialized by the index, and the loser gets
//! [`DbError::DuplicateSerial`].
//!
//! ## Ownership
//! Serial rows belong to a computer or peripheral via `item_id`. Printer
//! consumables are not a supported item type. Cascades are explicit: item
//! repositories call [`SerialNumberRepository::delete_for_item`] on the
//! same transaction that touches the item row.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockroom_core::{ItemStatus, ItemType, SerialNumber};

/// Repository for serial number operations.
#[derive(Debug, Clone)]
pub struct SerialNumberRepository {
    pool: SqlitePool,
}

impl SerialNumberRepository {
    /// Creates a new SerialNumberRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SerialNumberRepository { pool }
    }

    /// Lists serial numbers, optionally filtered by item type and/or owner.
    pub async fn find_all(
        &self,
        item_type: Option<ItemType>,
        item_id: Option<&str>,
    ) -> DbResult<Vec<SerialNumber>> {
        let mut sql = String::from("SELECT * FROM serial_numbers");
        let mut conditions: Vec<&str> = Vec::new();

        if item_type.is_some() {
            conditions.push("item_type = ?");
        }
        if item_id.is_some() {
            conditions.push("item_id = ?");
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query_as::<_, SerialNumber>(&sql);
        if let Some(item_type) = item_type {
            query = query.bind(item_type);
        }
        if let Some(item_id) = item_id {
            query = query.bind(item_id);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Gets a serial number row by its id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SerialNumber>> {
        let row = sqlx::query_as::<_, SerialNumber>("SELECT * FROM serial_numbers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Looks a serial value up globally, across both item types.
    ///
    /// This is the uniqueness-enforcement primitive: item creation goes
    /// through here before writing, and the UNIQUE index backs it up.
    pub async fn find_by_serial_number(&self, serial: &str) -> DbResult<Option<SerialNumber>> {
        let row = sqlx::query_as::<_, SerialNumber>(
            "SELECT * FROM serial_numbers WHERE serial_number = ?1",
        )
        .bind(serial.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Lists the serial numbers owned by one item, oldest first.
    pub async fn find_by_item_id(&self, item_id: &str) -> DbResult<Vec<SerialNumber>> {
        let rows = sqlx::query_as::<_, SerialNumber>(
            "SELECT * FROM serial_numbers WHERE item_id = ?1 ORDER BY created_at ASC",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts a single serial number row.
    ///
    /// ## Returns
    /// * `Err(DbError::DuplicateSerial)` - value already registered
    pub async fn insert(&self, serial: &SerialNumber) -> DbResult<SerialNumber> {
        debug!(id = %serial.id, serial_number = %serial.serial_number, "Inserting serial number");

        sqlx::query(
            r#"
            INSERT INTO serial_numbers (id, item_type, item_id, serial_number, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&serial.id)
        .bind(serial.item_type)
        .bind(&serial.item_id)
        .bind(&serial.serial_number)
        .bind(serial.status)
        .bind(serial.created_at)
        .bind(serial.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| classify_serial_error(e, &serial.serial_number))?;

        self.get_by_id(&serial.id)
            .await?
            .ok_or_else(|| DbError::not_found("SerialNumber", &serial.id))
    }

    /// Updates a serial number row (full overwrite of mutable fields).
    pub async fn update(&self, serial: &SerialNumber) -> DbResult<SerialNumber> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE serial_numbers
            SET item_type = ?2, item_id = ?3, serial_number = ?4, status = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&serial.id)
        .bind(serial.item_type)
        .bind(&serial.item_id)
        .bind(&serial.serial_number)
        .bind(serial.status)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| classify_serial_error(e, &serial.serial_number))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SerialNumber", &serial.id));
        }

        self.get_by_id(&serial.id)
            .await?
            .ok_or_else(|| DbError::not_found("SerialNumber", &serial.id))
    }

    /// Deletes a serial number row. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM serial_numbers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every serial number owned by an item. Returns the count.
    pub async fn delete_by_item_id(&self, item_id: &str) -> DbResult<u64> {
        let mut conn = self.pool.acquire().await?;
        Self::delete_for_item(&mut conn, item_id).await
    }

    // =========================================================================
    // Transaction-scoped helpers
    // =========================================================================
    // Item repositories call these on their own transaction connection so
    // the serial writes commit or roll back together with the item row.

    /// Registers a batch of serial values for one item, sequentially.
    ///
    /// Entries are trimmed; blank or whitespace-only values are skipped.
    /// The first duplicate aborts the batch with
    /// [`DbError::DuplicateSerial`], rolling back the caller's transaction.
    pub(crate) async fn insert_for_item(
        conn: &mut SqliteConnection,
        item_type: ItemType,
        item_id: &str,
        values: &[String],
    ) -> DbResult<u64> {
        let mut inserted = 0u64;

        for raw in values {
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }

            let now = Utc::now();
            sqlx::query(
                r#"
                INSERT INTO serial_numbers (id, item_type, item_id, serial_number, status, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(item_type)
            .bind(item_id)
            .bind(value)
            .bind(ItemStatus::Active)
            .bind(now)
            .bind(now)
            .execute(&mut *conn)
            .await
            .map_err(|e| classify_serial_error(e, value))?;

            inserted += 1;
        }

        debug!(item_id = %item_id, count = inserted, "Registered serial numbers");
        Ok(inserted)
    }

    /// Deletes every serial owned by an item on the caller's connection.
    pub(crate) async fn delete_for_item(
        conn: &mut SqliteConnection,
        item_id: &str,
    ) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM serial_numbers WHERE item_id = ?1")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Turns a UNIQUE violation on the serial column into the typed duplicate
/// error, preserving the offending value for the conflict message.
fn classify_serial_error(err: sqlx::Error, value: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } if field.contains("serial_number") => {
            DbError::DuplicateSerial {
                serial: value.to_string(),
            }
        }
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn serial(id: &str, item_id: &str, value: &str) -> SerialNumber {
        let now = Utc::now();
        SerialNumber {
            id: id.to_string(),
            item_type: ItemType::Computer,
            item_id: item_id.to_string(),
            serial_number: value.to_string(),
            status: ItemStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn serial_values_are_globally_unique() {
        let db = test_db().await;
        let repo = db.serials();

        repo.insert(&serial("s1", "item-a", "SN-100")).await.unwrap();

        // same value under a different item type still collides
        let mut dup = serial("s2", "item-b", "SN-100");
        dup.item_type = ItemType::Peripheral;

        let err = repo.insert(&dup).await.unwrap_err();
        assert!(matches!(err, DbError::DuplicateSerial { ref serial } if serial == "SN-100"));
    }

    #[tokio::test]
    async fn batch_insert_trims_and_skips_blanks() {
        let db = test_db().await;
        let repo = db.serials();

        let values = vec![
            "  SN-1  ".to_string(),
            "".to_string(),
            "   ".to_string(),
            "SN-2".to_string(),
        ];

        let mut conn = db.pool().acquire().await.unwrap();
        let inserted =
            SerialNumberRepository::insert_for_item(&mut conn, ItemType::Computer, "item-a", &values)
                .await
                .unwrap();
        drop(conn);

        assert_eq!(inserted, 2);

        let rows = repo.find_by_item_id("item-a").await.unwrap();
        let stored: Vec<&str> = rows.iter().map(|s| s.serial_number.as_str()).collect();
        assert_eq!(stored, vec!["SN-1", "SN-2"]);
    }

    #[tokio::test]
    async fn global_lookup_trims_its_input() {
        let db = test_db().await;
        let repo = db.serials();

        repo.insert(&serial("s1", "item-a", "SN-9")).await.unwrap();

        let found = repo.find_by_serial_number("  SN-9 ").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().item_id, "item-a");
    }

    #[tokio::test]
    async fn delete_by_item_id_removes_only_that_owner() {
        let db = test_db().await;
        let repo = db.serials();

        repo.insert(&serial("s1", "item-a", "SN-1")).await.unwrap();
        repo.insert(&serial("s2", "item-a", "SN-2")).await.unwrap();
        repo.insert(&serial("s3", "item-b", "SN-3")).await.unwrap();

        let removed = repo.delete_by_item_id("item-a").await.unwrap();
        assert_eq!(removed, 2);

        assert!(repo.find_by_item_id("item-a").await.unwrap().is_empty());
        assert_eq!(repo.find_by_item_id("item-b").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn find_all_filters_compose() {
        let db = test_db().await;
        let repo = db.serials();

        repo.insert(&serial("s1", "item-a", "SN-1")).await.unwrap();
        let mut p = serial("s2", "item-b", "SN-2");
        p.item_type = ItemType::Peripheral;
        repo.insert(&p).await.unwrap();

        let all = repo.find_all(None, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let computers = repo.find_all(Some(ItemType::Computer), None).await.unwrap();
        assert_eq!(computers.len(), 1);

        let scoped = repo
            .find_all(Some(ItemType::Peripheral), Some("item-b"))
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].serial_number, "SN-2");
    }
}
