//! # Reference Catalog Repository
//!
//! Canonical make and model names, per category.
//!
//! ## Rename Propagation
//! Inventory items carry free-text `make`/`model` columns that duplicate
//! catalog names. Renaming a make or model therefore rewrites the matching
//! free-text values in the one item table that belongs to the catalog
//! entry's category:
//!
//! ```text
//!   UPDATE makes SET name = 'Dell Inc' ...          (category: computer)
//!   UPDATE computers SET make = 'Dell Inc'
//!    WHERE make = 'Dell'                            same transaction
//! ```
//!
//! The category→table mapping is a closed `match`; no table name is ever
//! built from runtime input. Propagation failure rolls back the rename
//! itself, so catalog and item tables never disagree.
//!
//! ## Duplicate Names
//! `find_make_by_name` / `find_model_by_name` are the pre-check primitives
//! the route layer uses before create/update; the UNIQUE indexes on
//! (name, category) and (name, make_id) back them up.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::{Make, MakeCategory, Model};

/// Repository for the make/model reference catalog.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Makes
    // =========================================================================

    /// Lists makes, optionally filtered by category, name ascending.
    pub async fn find_makes(&self, category: Option<MakeCategory>) -> DbResult<Vec<Make>> {
        let makes = match category {
            Some(category) => {
                sqlx::query_as::<_, Make>(
                    "SELECT * FROM makes WHERE category = ?1 ORDER BY name ASC",
                )
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Make>("SELECT * FROM makes ORDER BY name ASC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(makes)
    }

    /// Gets a make by id.
    pub async fn get_make(&self, id: &str) -> DbResult<Option<Make>> {
        let make = sqlx::query_as::<_, Make>("SELECT * FROM makes WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(make)
    }

    /// Looks a make up by (name, category); the duplicate pre-check.
    pub async fn find_make_by_name(
        &self,
        name: &str,
        category: MakeCategory,
    ) -> DbResult<Option<Make>> {
        let make =
            sqlx::query_as::<_, Make>("SELECT * FROM makes WHERE name = ?1 AND category = ?2")
                .bind(name)
                .bind(category)
                .fetch_optional(&self.pool)
                .await?;

        Ok(make)
    }

    /// Inserts a new make.
    pub async fn insert_make(&self, make: &Make) -> DbResult<Make> {
        debug!(id = %make.id, name = %make.name, category = %make.category, "Inserting make");

        sqlx::query(
            r#"
            INSERT INTO makes (id, name, category, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&make.id)
        .bind(&make.name)
        .bind(make.category)
        .bind(make.created_at)
        .bind(make.updated_at)
        .execute(&self.pool)
        .await?;

        self.get_make(&make.id)
            .await?
            .ok_or_else(|| DbError::not_found("Make", &make.id))
    }

    /// Updates a make; a changed name propagates to the free-text `make`
    /// column of the category's item table in the same transaction.
    pub async fn update_make(&self, make: &Make) -> DbResult<Make> {
        let mut tx = self.pool.begin().await?;

        let old = sqlx::query_as::<_, Make>("SELECT * FROM makes WHERE id = ?1")
            .bind(&make.id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Make", &make.id))?;

        let now = Utc::now();
        sqlx::query("UPDATE makes SET name = ?2, category = ?3, updated_at = ?4 WHERE id = ?1")
            .bind(&make.id)
            .bind(&make.name)
            .bind(make.category)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        if old.name != make.name {
            debug!(
                old = %old.name,
                new = %make.name,
                category = %make.category,
                "Propagating make rename to item table"
            );
            propagate_make_rename(&mut *tx, make.category, &old.name, &make.name).await?;
        }

        tx.commit().await?;

        self.get_make(&make.id)
            .await?
            .ok_or_else(|| DbError::not_found("Make", &make.id))
    }

    /// Deletes a make by id.
    ///
    /// Item rows keep their free-text make value; restock references are
    /// nulled by the schema. A make that still has models cannot be
    /// deleted and surfaces [`DbError::ForeignKeyViolation`].
    pub async fn delete_make(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM makes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Models
    // =========================================================================

    /// Lists models with their make names joined in, ordered by make name
    /// then model name.
    pub async fn find_models(
        &self,
        category: Option<MakeCategory>,
        make_id: Option<&str>,
    ) -> DbResult<Vec<Model>> {
        let mut sql = String::from(
            "SELECT m.*, mk.name AS make_name FROM models m JOIN makes mk ON m.make_id = mk.id",
        );
        let mut conditions: Vec<&str> = Vec::new();

        if category.is_some() {
            conditions.push("m.category = ?");
        }
        if make_id.is_some() {
            conditions.push("m.make_id = ?");
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY mk.name ASC, m.name ASC");

        let mut query = sqlx::query_as::<_, Model>(&sql);
        if let Some(category) = category {
            query = query.bind(category);
        }
        if let Some(make_id) = make_id {
            query = query.bind(make_id);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Gets a model by id, make name joined in.
    pub async fn get_model(&self, id: &str) -> DbResult<Option<Model>> {
        let model = sqlx::query_as::<_, Model>(
            r#"
            SELECT m.*, mk.name AS make_name
            FROM models m
            JOIN makes mk ON m.make_id = mk.id
            WHERE m.id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(model)
    }

    /// Looks a model up by (name, make_id); the duplicate pre-check.
    pub async fn find_model_by_name(&self, name: &str, make_id: &str) -> DbResult<Option<Model>> {
        let model =
            sqlx::query_as::<_, Model>("SELECT * FROM models WHERE name = ?1 AND make_id = ?2")
                .bind(name)
                .bind(make_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(model)
    }

    /// Inserts a new model.
    ///
    /// The referenced make must exist and share the model's category; both
    /// checks run before anything is written.
    pub async fn insert_model(&self, model: &Model) -> DbResult<Model> {
        debug!(id = %model.id, name = %model.name, make_id = %model.make_id, "Inserting model");

        let mut tx = self.pool.begin().await?;

        check_make_category(&mut *tx, &model.make_id, model.category).await?;

        sqlx::query(
            r#"
            INSERT INTO models (id, name, make_id, category, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&model.id)
        .bind(&model.name)
        .bind(&model.make_id)
        .bind(model.category)
        .bind(model.created_at)
        .bind(model.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_model(&model.id)
            .await?
            .ok_or_else(|| DbError::not_found("Model", &model.id))
    }

    /// Updates a model; category coherence with the make is re-checked and
    /// a changed name propagates to the category's item table, all in one
    /// transaction.
    pub async fn update_model(&self, model: &Model) -> DbResult<Model> {
        let mut tx = self.pool.begin().await?;

        let old = sqlx::query_as::<_, Model>("SELECT * FROM models WHERE id = ?1")
            .bind(&model.id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Model", &model.id))?;

        check_make_category(&mut *tx, &model.make_id, model.category).await?;

        let now = Utc::now();
        sqlx::query(
            "UPDATE models SET name = ?2, make_id = ?3, category = ?4, updated_at = ?5 WHERE id = ?1",
        )
        .bind(&model.id)
        .bind(&model.name)
        .bind(&model.make_id)
        .bind(model.category)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if old.name != model.name {
            debug!(
                old = %old.name,
                new = %model.name,
                category = %model.category,
                "Propagating model rename to item table"
            );
            propagate_model_rename(&mut *tx, model.category, &old.name, &model.name).await?;
        }

        tx.commit().await?;

        self.get_model(&model.id)
            .await?
            .ok_or_else(|| DbError::not_found("Model", &model.id))
    }

    /// Deletes a model by id.
    pub async fn delete_model(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM models WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Transaction-scoped helpers
// =============================================================================

/// Verifies the referenced make exists and shares `category`.
async fn check_make_category(
    conn: &mut SqliteConnection,
    make_id: &str,
    category: MakeCategory,
) -> DbResult<()> {
    let make = sqlx::query_as::<_, Make>("SELECT * FROM makes WHERE id = ?1")
        .bind(make_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Make", make_id))?;

    if make.category != category {
        return Err(DbError::CategoryMismatch {
            model_category: category.to_string(),
            make_category: make.category.to_string(),
        });
    }

    Ok(())
}

/// Rewrites the free-text `make` column for one category's item table.
/// The mapping is a closed match, so runtime input never picks a table.
async fn propagate_make_rename(
    conn: &mut SqliteConnection,
    category: MakeCategory,
    old_name: &str,
    new_name: &str,
) -> DbResult<()> {
    let statement = match category {
        MakeCategory::Computer => "UPDATE computers SET make = ?1 WHERE make = ?2",
        MakeCategory::Peripheral => "UPDATE peripherals SET make = ?1 WHERE make = ?2",
        MakeCategory::Printer => "UPDATE printer_items SET make = ?1 WHERE make = ?2",
    };

    sqlx::query(statement)
        .bind(new_name)
        .bind(old_name)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Rewrites the free-text `model` column for one category's item table.
async fn propagate_model_rename(
    conn: &mut SqliteConnection,
    category: MakeCategory,
    old_name: &str,
    new_name: &str,
) -> DbResult<()> {
    let statement = match category {
        MakeCategory::Computer => "UPDATE computers SET model = ?1 WHERE model = ?2",
        MakeCategory::Peripheral => "UPDATE peripherals SET model = ?1 WHERE model = ?2",
        MakeCategory::Printer => "UPDATE printer_items SET model = ?1 WHERE model = ?2",
    };

    sqlx::query(statement)
        .bind(new_name)
        .bind(old_name)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stockroom_core::{Computer, ItemStatus, Office, Peripheral};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn make(name: &str, category: MakeCategory) -> Make {
        let now = Utc::now();
        Make {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            category,
            created_at: now,
            updated_at: now,
        }
    }

    fn model(name: &str, make_id: &str, category: MakeCategory) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            make_id: make_id.to_string(),
            category,
            created_at: now,
            updated_at: now,
            make_name: None,
        }
    }

    fn computer(make: &str, model: &str) -> Computer {
        let now = Utc::now();
        Computer {
            id: Uuid::new_v4().to_string(),
            make: make.to_string(),
            model: model.to_string(),
            quantity: 1,
            office: Office::Office1,
            status: ItemStatus::Active,
            created_at: now,
            updated_at: now,
            serial_numbers: Vec::new(),
        }
    }

    fn peripheral(make: &str) -> Peripheral {
        let now = Utc::now();
        Peripheral {
            id: Uuid::new_v4().to_string(),
            item_name: "USB Dock".to_string(),
            make: Some(make.to_string()),
            model: Some("D6000".to_string()),
            quantity: 1,
            office: Office::Office1,
            status: ItemStatus::Active,
            created_at: now,
            updated_at: now,
            serial_numbers: Vec::new(),
        }
    }

    #[tokio::test]
    async fn duplicate_make_name_in_category_is_rejected() {
        let db = test_db().await;
        let repo = db.catalog();

        repo.insert_make(&make("Dell", MakeCategory::Computer))
            .await
            .unwrap();

        // pre-check sees it
        let existing = repo
            .find_make_by_name("Dell", MakeCategory::Computer)
            .await
            .unwrap();
        assert!(existing.is_some());

        // the index rejects it even without the pre-check
        let err = repo
            .insert_make(&make("Dell", MakeCategory::Computer))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // same name in another category is fine
        repo.insert_make(&make("Dell", MakeCategory::Peripheral))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn make_rename_propagates_only_to_its_category_table() {
        let db = test_db().await;
        let repo = db.catalog();

        let mut dell = repo
            .insert_make(&make("Dell", MakeCategory::Computer))
            .await
            .unwrap();

        db.computers()
            .insert(&computer("Dell", "XPS 13"), &[])
            .await
            .unwrap();
        db.computers()
            .insert(&computer("Lenovo", "T14"), &[])
            .await
            .unwrap();
        db.peripherals()
            .insert(&peripheral("Dell"), &[])
            .await
            .unwrap();

        dell.name = "Dell Inc".to_string();
        repo.update_make(&dell).await.unwrap();

        let computers = db.computers().find_all(None).await.unwrap();
        let makes: Vec<&str> = computers.iter().map(|c| c.make.as_str()).collect();
        assert!(makes.contains(&"Dell Inc"));
        assert!(makes.contains(&"Lenovo"));
        assert!(!makes.contains(&"Dell"));

        // peripherals table untouched: the make was a computer make
        let peripherals = db.peripherals().find_all(None).await.unwrap();
        assert_eq!(peripherals[0].make.as_deref(), Some("Dell"));
    }

    #[tokio::test]
    async fn model_rename_propagates_to_item_rows() {
        let db = test_db().await;
        let repo = db.catalog();

        let dell = repo
            .insert_make(&make("Dell", MakeCategory::Computer))
            .await
            .unwrap();
        let mut xps = repo
            .insert_model(&model("XPS 13", &dell.id, MakeCategory::Computer))
            .await
            .unwrap();

        db.computers()
            .insert(&computer("Dell", "XPS 13"), &[])
            .await
            .unwrap();

        xps.name = "XPS 13 Plus".to_string();
        let updated = repo.update_model(&xps).await.unwrap();
        assert_eq!(updated.make_name.as_deref(), Some("Dell"));

        let computers = db.computers().find_all(None).await.unwrap();
        assert_eq!(computers[0].model, "XPS 13 Plus");
    }

    #[tokio::test]
    async fn model_category_must_match_make_category() {
        let db = test_db().await;
        let repo = db.catalog();

        let brother = repo
            .insert_make(&make("Brother", MakeCategory::Printer))
            .await
            .unwrap();

        let err = repo
            .insert_model(&model("HL-L2350", &brother.id, MakeCategory::Computer))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CategoryMismatch { .. }));

        // rejected before any write
        let models = repo.find_models(None, None).await.unwrap();
        assert!(models.is_empty());
    }

    #[tokio::test]
    async fn model_requires_existing_make() {
        let db = test_db().await;
        let repo = db.catalog();

        let err = repo
            .insert_model(&model("XPS 13", "no-such-make", MakeCategory::Computer))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn find_models_joins_make_names() {
        let db = test_db().await;
        let repo = db.catalog();

        let dell = repo
            .insert_make(&make("Dell", MakeCategory::Computer))
            .await
            .unwrap();
        repo.insert_model(&model("XPS 13", &dell.id, MakeCategory::Computer))
            .await
            .unwrap();

        let models = repo
            .find_models(Some(MakeCategory::Computer), None)
            .await
            .unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].make_name.as_deref(), Some("Dell"));

        let by_make = repo.find_models(None, Some(&dell.id)).await.unwrap();
        assert_eq!(by_make.len(), 1);
    }

    #[tokio::test]
    async fn delete_make_reports_whether_a_row_was_removed() {
        let db = test_db().await;
        let repo = db.catalog();

        let dell = repo
            .insert_make(&make("Dell", MakeCategory::Computer))
            .await
            .unwrap();

        assert!(repo.delete_make(&dell.id).await.unwrap());
        assert!(!repo.delete_make(&dell.id).await.unwrap());
    }
}
