//! # Computer Repository
//!
//! Computers with their owned serial numbers.
//!
//! ## Serial Attachment
//! The `computers` table never stores serials; every read re-attaches them
//! from the registry so callers always see the full unit list. Writes that
//! touch serials (create with serials, update with a replacement list,
//! delete) run the item row and the serial rows in one transaction.
//!
//! ## Replacement Semantics
//! An update that supplies a serial list REPLACES the item's registered
//! serials wholesale: old rows are deleted, the new list is inserted. An
//! update that supplies no list leaves the registered serials alone.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::serial::SerialNumberRepository;
use stockroom_core::{Computer, ItemType, Office, OfficeCount, SerialNumber};

/// Repository for computer inventory operations.
#[derive(Debug, Clone)]
pub struct ComputerRepository {
    pool: SqlitePool,
}

impl ComputerRepository {
    /// Creates a new ComputerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ComputerRepository { pool }
    }

    /// Lists computers, optionally scoped to one office, newest first.
    /// Serial numbers are attached to every row.
    pub async fn find_all(&self, office: Option<Office>) -> DbResult<Vec<Computer>> {
        let mut computers = match office {
            Some(office) => {
                sqlx::query_as::<_, Computer>(
                    "SELECT * FROM computers WHERE office = ?1 ORDER BY created_at DESC",
                )
                .bind(office)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Computer>("SELECT * FROM computers ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        for computer in &mut computers {
            computer.serial_numbers = self.serial_rows(&computer.id).await?;
        }

        Ok(computers)
    }

    /// Gets a computer by id with its serial numbers attached.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Computer>> {
        let computer = sqlx::query_as::<_, Computer>("SELECT * FROM computers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match computer {
            Some(mut computer) => {
                computer.serial_numbers = self.serial_rows(&computer.id).await?;
                Ok(Some(computer))
            }
            None => Ok(None),
        }
    }

    /// Finds the computer that owns a serial number, if any.
    pub async fn find_by_serial_number(&self, serial: &str) -> DbResult<Option<Computer>> {
        let row = sqlx::query_as::<_, SerialNumber>(
            "SELECT * FROM serial_numbers WHERE serial_number = ?1 AND item_type = ?2",
        )
        .bind(serial.trim())
        .bind(ItemType::Computer)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => self.get_by_id(&row.item_id).await,
            None => Ok(None),
        }
    }

    /// Searches computers whose make or model contains `term`,
    /// optionally scoped to one office.
    pub async fn search_by_make_or_model(
        &self,
        term: &str,
        office: Option<Office>,
    ) -> DbResult<Vec<Computer>> {
        let pattern = format!("%{}%", term.trim());

        let mut computers = match office {
            Some(office) => {
                sqlx::query_as::<_, Computer>(
                    r#"
                    SELECT * FROM computers
                    WHERE (make LIKE ?1 OR model LIKE ?1) AND office = ?2
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(&pattern)
                .bind(office)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Computer>(
                    r#"
                    SELECT * FROM computers
                    WHERE make LIKE ?1 OR model LIKE ?1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?
            }
        };

        for computer in &mut computers {
            computer.serial_numbers = self.serial_rows(&computer.id).await?;
        }

        Ok(computers)
    }

    /// Counts active computers per office (row count and summed quantity).
    pub async fn counts_by_office(&self) -> DbResult<Vec<OfficeCount>> {
        let counts = sqlx::query_as::<_, OfficeCount>(
            r#"
            SELECT office, COUNT(*) AS total, SUM(quantity) AS total_quantity
            FROM computers
            WHERE status = 'active'
            GROUP BY office
            ORDER BY office ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Inserts a computer and registers its serial numbers atomically.
    ///
    /// ## Returns
    /// * `Err(DbError::DuplicateSerial)` - a serial in the batch is already
    ///   registered; the computer row is rolled back with it
    pub async fn insert(&self, computer: &Computer, serials: &[String]) -> DbResult<Computer> {
        debug!(id = %computer.id, make = %computer.make, model = %computer.model, "Inserting computer");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO computers (id, make, model, quantity, office, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&computer.id)
        .bind(&computer.make)
        .bind(&computer.model)
        .bind(computer.quantity)
        .bind(computer.office)
        .bind(computer.status)
        .bind(computer.created_at)
        .bind(computer.updated_at)
        .execute(&mut *tx)
        .await?;

        SerialNumberRepository::insert_for_item(&mut *tx, ItemType::Computer, &computer.id, serials)
            .await?;

        tx.commit().await?;

        self.get_by_id(&computer.id)
            .await?
            .ok_or_else(|| DbError::not_found("Computer", &computer.id))
    }

    /// Updates a computer; `serials: Some(..)` replaces the registered
    /// serial list wholesale, `None` leaves it untouched.
    pub async fn update(
        &self,
        computer: &Computer,
        serials: Option<&[String]>,
    ) -> DbResult<Computer> {
        let mut tx = self.pool.begin().await?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE computers
            SET make = ?2, model = ?3, quantity = ?4, office = ?5, status = ?6, updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&computer.id)
        .bind(&computer.make)
        .bind(&computer.model)
        .bind(computer.quantity)
        .bind(computer.office)
        .bind(computer.status)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Computer", &computer.id));
        }

        if let Some(serials) = serials {
            SerialNumberRepository::delete_for_item(&mut *tx, &computer.id).await?;
            SerialNumberRepository::insert_for_item(
                &mut tx,
                ItemType::Computer,
                &computer.id,
                serials,
            )
            .await?;
        }

        tx.commit().await?;

        self.get_by_id(&computer.id)
            .await?
            .ok_or_else(|| DbError::not_found("Computer", &computer.id))
    }

    /// Deletes a computer and its serial numbers atomically.
    /// Returns whether the computer existed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        SerialNumberRepository::delete_for_item(&mut *tx, id).await?;

        let result = sqlx::query("DELETE FROM computers WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Serial rows for one computer, oldest registration first.
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

    fn computer(make: &str, model: &str, office: Office) -> Computer {
        let now = Utc::now();
        Computer {
            id: Uuid::new_v4().to_string(),
            make: make.to_string(),
            model: model.to_string(),
            quantity: 1,
            office,
            status: ItemStatus::Active,
            created_at: now,
            updated_at: now,
            serial_numbers: Vec::new(),
        }
    }

    fn values(computer: &Computer) -> Vec<&str> {
        computer
            .serial_numbers
            .iter()
            .map(|s| s.serial_number.as_str())
            .collect()
    }

    #[tokio::test]
    async fn insert_attaches_registered_serials() {
        let db = test_db().await;
        let repo = db.computers();

        let created = repo
            .insert(
                &computer("Dell", "XPS 13", Office::Office1),
                &["SN-1".to_string(), " SN-2 ".to_string(), "".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(values(&created), vec!["SN-1", "SN-2"]);
    }

    #[tokio::test]
    async fn duplicate_serial_rolls_back_the_computer_row() {
        let db = test_db().await;
        let repo = db.computers();

        repo.insert(
            &computer("Dell", "XPS 13", Office::Office1),
            &["SN-1".to_string()],
        )
        .await
        .unwrap();

        let second = computer("Lenovo", "T14", Office::Office2);
        let err = repo
            .insert(&second, &["SN-9".to_string(), "SN-1".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateSerial { ref serial } if serial == "SN-1"));

        // neither the computer nor its first serial survived the rollback
        assert!(repo.get_by_id(&second.id).await.unwrap().is_none());
        assert!(db
            .serials()
            .find_by_serial_number("SN-9")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_with_serials_replaces_the_list() {
        let db = test_db().await;
        let repo = db.computers();

        let created = repo
            .insert(
                &computer("Dell", "XPS 13", Office::Office1),
                &["SN-1".to_string(), "SN-2".to_string()],
            )
            .await
            .unwrap();

        let updated = repo
            .update(&created, Some(&["SN-1".to_string(), "SN-3".to_string()]))
            .await
            .unwrap();
        assert_eq!(values(&updated), vec!["SN-1", "SN-3"]);

        // SN-2 was released and is free for another item
        assert!(db
            .serials()
            .find_by_serial_number("SN-2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_without_serials_leaves_registrations_alone() {
        let db = test_db().await;
        let repo = db.computers();

        let mut created = repo
            .insert(
                &computer("Dell", "XPS 13", Office::Office1),
                &["SN-1".to_string()],
            )
            .await
            .unwrap();

        created.quantity = 4;
        let updated = repo.update(&created, None).await.unwrap();

        assert_eq!(updated.quantity, 4);
        assert_eq!(values(&updated), vec!["SN-1"]);
    }

    #[tokio::test]
    async fn delete_cascades_to_serials() {
        let db = test_db().await;
        let repo = db.computers();

        let created = repo
            .insert(
                &computer("Dell", "XPS 13", Office::Office1),
                &["SN-1".to_string()],
            )
            .await
            .unwrap();

        assert!(repo.delete(&created.id).await.unwrap());
        assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
        assert!(db
            .serials()
            .find_by_serial_number("SN-1")
            .await
            .unwrap()
            .is_none());

        assert!(!repo.delete(&created.id).await.unwrap());
    }

    #[tokio::test]
    async fn serial_lookup_resolves_the_owning_computer() {
        let db = test_db().await;
        let repo = db.computers();

        let created = repo
            .insert(
                &computer("Dell", "XPS 13", Office::Office1),
                &["SN-42".to_string()],
            )
            .await
            .unwrap();

        let found = repo.find_by_serial_number(" SN-42 ").await.unwrap();
        assert_eq!(found.unwrap().id, created.id);

        assert!(repo
            .find_by_serial_number("SN-404")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn search_matches_make_or_model_scoped_by_office() {
        let db = test_db().await;
        let repo = db.computers();

        repo.insert(&computer("Dell", "XPS 13", Office::Office1), &[])
            .await
            .unwrap();
        repo.insert(&computer("Lenovo", "ThinkPad X1", Office::Office2), &[])
            .await
            .unwrap();

        let hits = repo.search_by_make_or_model("think", None).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].make, "Lenovo");

        let scoped = repo
            .search_by_make_or_model("think", Some(Office::Office1))
            .await
            .unwrap();
        assert!(scoped.is_empty());
    }

    #[tokio::test]
    async fn counts_by_office_sum_quantities() {
        let db = test_db().await;
        let repo = db.computers();

        let mut a = computer("Dell", "XPS 13", Office::Office1);
        a.quantity = 3;
        repo.insert(&a, &[]).await.unwrap();
        repo.insert(&computer("Dell", "XPS 15", Office::Office1), &[])
            .await
            .unwrap();
        repo.insert(&computer("Lenovo", "T14", Office::Office2), &[])
            .await
            .unwrap();
        let mut retired = computer("Acer", "Aspire", Office::Office1);
        retired.status = ItemStatus::Retired;
        repo.insert(&retired, &[]).await.unwrap();

        // retired rows stay out of the per-office stats
        let counts = repo.counts_by_office().await.unwrap();
        assert_eq!(counts.len(), 2);

        let office1 = counts
            .iter()
            .find(|c| c.office == Office::Office1)
            .unwrap();
        assert_eq!(office1.total, 2);
        assert_eq!(office1.total_quantity, 4);
    }
}
