//! # Peripheral Repository
//!
//! Peripherals (monitors, docks, keyboards) with their owned serials.
//!
//! Same shape as the computer repository, with two differences: the
//! leading descriptor is a required free-text `item_name` (make and model
//! are optional), and search also matches the item name.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::serial::SerialNumberRepository;
use stockroom_core::{ItemType, Office, OfficeCount, Peripheral, SerialNumber};

/// Repository for peripheral inventory operations.
#[derive(Debug, Clone)]
pub struct PeripheralRepository {
    pool: SqlitePool,
}

impl PeripheralRepository {
    /// Creates a new PeripheralRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PeripheralRepository { pool }
    }

    /// Lists peripherals, optionally scoped to one office, newest first.
    /// Serial numbers are attached to every row.
    pub async fn find_all(&self, office: Option<Office>) -> DbResult<Vec<Peripheral>> {
        let mut peripherals = match office {
            Some(office) => {
                sqlx::query_as::<_, Peripheral>(
                    "SELECT * FROM peripherals WHERE office = ?1 ORDER BY created_at DESC",
                )
                .bind(office)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Peripheral>(
                    "SELECT * FROM peripherals ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        for peripheral in &mut peripherals {
            peripheral.serial_numbers = self.serial_rows(&peripheral.id).await?;
        }

        Ok(peripherals)
    }

    /// Gets a peripheral by id with its serial numbers attached.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Peripheral>> {
        let peripheral = sqlx::query_as::<_, Peripheral>("SELECT * FROM peripherals WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match peripheral {
            Some(mut peripheral) => {
                peripheral.serial_numbers = self.serial_rows(&peripheral.id).await?;
                Ok(Some(peripheral))
            }
            None => Ok(None),
        }
    }

    /// Finds the peripheral that owns a serial number, if any.
    pub async fn find_by_serial_number(&self, serial: &str) -> DbResult<Option<Peripheral>> {
        let row = sqlx::query_as::<_, SerialNumber>(
            "SELECT * FROM serial_numbers WHERE serial_number = ?1 AND item_type = ?2",
        )
        .bind(serial.trim())
        .bind(ItemType::Peripheral)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => self.get_by_id(&row.item_id).await,
            None => Ok(None),
        }
    }

    /// Searches peripherals whose name, make, or model contains `term`,
    /// optionally scoped to one office.
    pub async fn search(&self, term: &str, office: Option<Office>) -> DbResult<Vec<Peripheral>> {
        let pattern = format!("%{}%", term.trim());

        let mut peripherals = match office {
            Some(office) => {
                sqlx::query_as::<_, Peripheral>(
                    r#"
                    SELECT * FROM peripherals
                    WHERE (item_name LIKE ?1 OR make LIKE ?1 OR model LIKE ?1) AND office = ?2
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(&pattern)
                .bind(office)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Peripheral>(
                    r#"
                    SELECT * FROM peripherals
                    WHERE item_name LIKE ?1 OR make LIKE ?1 OR model LIKE ?1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?
            }
        };

        for peripheral in &mut peripherals {
            peripheral.serial_numbers = self.serial_rows(&peripheral.id).await?;
        }

        Ok(peripherals)
    }

    /// Counts active peripherals per office (row count and summed quantity).
    pub async fn counts_by_office(&self) -> DbResult<Vec<OfficeCount>> {
        let counts = sqlx::query_as::<_, OfficeCount>(
            r#"
            SELECT office, COUNT(*) AS total, SUM(quantity) AS total_quantity
            FROM peripherals
            WHERE status = 'active'
            GROUP BY office
            ORDER BY office ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Inserts a peripheral and registers its serial numbers atomically.
    pub async fn insert(&self, peripheral: &Peripheral, serials: &[String]) -> DbResult<Peripheral> {
        debug!(id = %peripheral.id, item_name = %peripheral.item_name, "Inserting peripheral");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO peripherals (id, item_name, make, model, quantity, office, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&peripheral.id)
        .bind(&peripheral.item_name)
        .bind(&peripheral.make)
        .bind(&peripheral.model)
        .bind(peripheral.quantity)
        .bind(peripheral.office)
        .bind(peripheral.status)
        .bind(peripheral.created_at)
        .bind(peripheral.updated_at)
        .execute(&mut *tx)
        .await?;

        SerialNumberRepository::insert_for_item(
            &mut *tx,
            ItemType::Peripheral,
            &peripheral.id,
            serials,
        )
        .await?;

        tx.commit().await?;

        self.get_by_id(&peripheral.id)
            .await?
            .ok_or_else(|| DbError::not_found("Peripheral", &peripheral.id))
    }

    /// Updates a peripheral; `serials: Some(..)` replaces the registered
    /// serial list wholesale, `None` leaves it untouched.
    pub async fn update(
        &self,
        peripheral: &Peripheral,
        serials: Option<&[String]>,
    ) -> DbResult<Peripheral> {
        let mut tx = self.pool.begin().await?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE peripherals
            SET item_name = ?2, make = ?3, model = ?4, quantity = ?5, office = ?6, status = ?7, updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&peripheral.id)
        .bind(&peripheral.item_name)
        .bind(&peripheral.make)
        .bind(&peripheral.model)
        .bind(peripheral.quantity)
        .bind(peripheral.office)
        .bind(peripheral.status)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Peripheral", &peripheral.id));
        }

        if let Some(serials) = serials {
            SerialNumberRepository::delete_for_item(&mut *tx, &peripheral.id).await?;
            SerialNumberRepository::insert_for_item(
                &mut *tx,
                ItemType::Peripheral,
                &peripheral.id,
                serials,
            )
            .await?;
        }

        tx.commit().await?;

        self.get_by_id(&peripheral.id)
            .await?
            .ok_or_else(|| DbError::not_found("Peripheral", &peripheral.id))
    }

    /// Deletes a peripheral and its serial numbers atomically.
    /// Returns whether the peripheral existed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        SerialNumberRepository::delete_for_item(&mut *tx, id).await?;

        let result = sqlx::query("DELETE FROM peripherals WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn serial_rows(&self, item_id: &str) -> DbResult<Vec<SerialNumber>> {
        let rows = sqlx::query_as::<_, SerialNumber>(
            "SELECT * FROM serial_numbers WHERE item_id = ?1 ORDER BY created_at ASC",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
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

    fn peripheral(name: &str, office: Office) -> Peripheral {
        let now = Utc::now();
        Peripheral {
            id: Uuid::new_v4().to_string(),
            item_name: name.to_string(),
            make: None,
            model: None,
            quantity: 1,
            office,
            status: ItemStatus::Active,
            created_at: now,
            updated_at: now,
            serial_numbers: Vec::new(),
        }
    }

    #[tokio::test]
    async fn make_and_model_are_optional() {
        let db = test_db().await;
        let repo = db.peripherals();

        let created = repo
            .insert(&peripheral("USB-C Dock", Office::Office1), &[])
            .await
            .unwrap();

        assert!(created.make.is_none());
        assert!(created.model.is_none());
    }

    #[tokio::test]
    async fn search_matches_item_name() {
        let db = test_db().await;
        let repo = db.peripherals();

        let mut dock = peripheral("USB-C Dock", Office::Office1);
        dock.make = Some("Dell".to_string());
        repo.insert(&dock, &[]).await.unwrap();
        repo.insert(&peripheral("Wireless Mouse", Office::Office1), &[])
            .await
            .unwrap();

        let by_name = repo.search("dock", None).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].item_name, "USB-C Dock");

        let by_make = repo.search("dell", None).await.unwrap();
        assert_eq!(by_make.len(), 1);
    }

    #[tokio::test]
    async fn serials_are_scoped_to_the_peripheral_type() {
        let db = test_db().await;
        let repo = db.peripherals();

        let created = repo
            .insert(
                &peripheral("Monitor", Office::Office2),
                &["MON-1".to_string()],
            )
            .await
            .unwrap();

        let found = repo.find_by_serial_number("MON-1").await.unwrap();
        assert_eq!(found.unwrap().id, created.id);

        // a computer-typed lookup must not resolve a peripheral serial
        assert!(db
            .computers()
            .find_by_serial_number("MON-1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_replaces_serials_and_delete_cascades() {
        let db = test_db().await;
        let repo = db.peripherals();

        let created = repo
            .insert(
                &peripheral("Keyboard", Office::Office1),
                &["KB-1".to_string(), "KB-2".to_string()],
            )
            .await
            .unwrap();

        let updated = repo
            .update(&created, Some(&["KB-3".to_string()]))
            .await
            .unwrap();
        let stored: Vec<&str> = updated
            .serial_numbers
            .iter()
            .map(|s| s.serial_number.as_str())
            .collect();
        assert_eq!(stored, vec!["KB-3"]);

        assert!(repo.delete(&created.id).await.unwrap());
        assert!(db
            .serials()
            .find_by_serial_number("KB-3")
            .await
            .unwrap()
            .is_none());
    }
}
