//! # Restock Ledger Repository
//!
//! Requests to restock an item category at an office.
//!
//! Requests may reference catalog entries by id; reads join the catalog
//! names in so consumers never chase ids. The references are soft: a
//! deleted make or model leaves the request standing with a NULL name.
//!
//! Status is a plain enum field. Any status may move to any other; the
//! ledger records what happened, it does not police workflow.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::{
    ItemCategory, Office, Priority, PriorityCount, RestockRequest, RestockStatus, StatusCount,
};

const SELECT_JOINED: &str = r#"
SELECT r.*, mk.name AS make_name, md.name AS model_name
FROM restock_requests r
LEFT JOIN makes mk ON r.make_id = mk.id
LEFT JOIN models md ON r.model_id = md.id
"#;

/// Repository for restock request operations.
#[derive(Debug, Clone)]
pub struct RestockRepository {
    pool: SqlitePool,
}

impl RestockRepository {
    /// Creates a new RestockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RestockRepository { pool }
    }

    /// Lists restock requests, filtered by any combination of status,
    /// office, priority, and item category, newest first.
    pub async fn find_all(
        &self,
        status: Option<RestockStatus>,
        office: Option<Office>,
        priority: Option<Priority>,
        category: Option<ItemCategory>,
    ) -> DbResult<Vec<RestockRequest>> {
        let mut sql = String::from(SELECT_JOINED);
        let mut conditions: Vec<&str> = Vec::new();

        if status.is_some() {
            conditions.push("r.status = ?");
        }
        if office.is_some() {
            conditions.push("r.office = ?");
        }
        if priority.is_some() {
            conditions.push("r.priority = ?");
        }
        if category.is_some() {
            conditions.push("r.item_category = ?");
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY r.created_at DESC");

        let mut query = sqlx::query_as::<_, RestockRequest>(&sql);
        if let Some(status) = status {
            query = query.bind(status);
        }
        if let Some(office) = office {
            query = query.bind(office);
        }
        if let Some(priority) = priority {
            query = query.bind(priority);
        }
        if let Some(category) = category {
            query = query.bind(category);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Gets a restock request by id, catalog names joined in.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<RestockRequest>> {
        let sql = format!("{SELECT_JOINED} WHERE r.id = ?1");

        let request = sqlx::query_as::<_, RestockRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    /// Lists open (pending or approved) requests ranked by urgency, most
    /// urgent first, oldest first within a rank. Optionally scoped to one
    /// office.
    pub async fn find_open_by_urgency(
        &self,
        office: Option<Office>,
    ) -> DbResult<Vec<RestockRequest>> {
        let office_clause = if office.is_some() {
            " AND r.office = ?"
        } else {
            ""
        };
        let sql = format!(
            r#"{SELECT_JOINED}
            WHERE r.status IN ('pending', 'approved'){office_clause}
            ORDER BY
                CASE r.priority
                    WHEN 'urgent' THEN 0
                    WHEN 'high' THEN 1
                    WHEN 'normal' THEN 2
                    WHEN 'low' THEN 3
                END ASC,
                r.created_at ASC
            "#
        );

        let mut query = sqlx::query_as::<_, RestockRequest>(&sql);
        if let Some(office) = office {
            query = query.bind(office);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Counts requests per status, optionally scoped to one office.
    pub async fn status_counts(&self, office: Option<Office>) -> DbResult<Vec<StatusCount>> {
        let office_clause = if office.is_some() {
            " WHERE office = ?"
        } else {
            ""
        };
        let sql = format!(
            "SELECT status, COUNT(*) AS count FROM restock_requests{office_clause} GROUP BY status"
        );

        let mut query = sqlx::query_as::<_, StatusCount>(&sql);
        if let Some(office) = office {
            query = query.bind(office);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Counts pending requests per priority, optionally scoped to one
    /// office.
    pub async fn pending_priority_counts(
        &self,
        office: Option<Office>,
    ) -> DbResult<Vec<PriorityCount>> {
        let office_clause = if office.is_some() {
            " AND office = ?"
        } else {
            ""
        };
        let sql = format!(
            r#"
            SELECT priority, COUNT(*) AS count
            FROM restock_requests
            WHERE status = 'pending'{office_clause}
            GROUP BY priority
            "#
        );

        let mut query = sqlx::query_as::<_, PriorityCount>(&sql);
        if let Some(office) = office {
            query = query.bind(office);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Inserts a restock request.
    pub async fn insert(&self, request: &RestockRequest) -> DbResult<RestockRequest> {
        debug!(
            id = %request.id,
            category = ?request.item_category,
            office = %request.office,
            "Inserting restock request"
        );

        sqlx::query(
            r#"
            INSERT INTO restock_requests
                (id, item_category, item_description, make_id, model_id, quantity_requested,
                 office, priority, status, requested_by, notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&request.id)
        .bind(request.item_category)
        .bind(&request.item_description)
        .bind(&request.make_id)
        .bind(&request.model_id)
        .bind(request.quantity_requested)
        .bind(request.office)
        .bind(request.priority)
        .bind(request.status)
        .bind(&request.requested_by)
        .bind(&request.notes)
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&request.id)
            .await?
            .ok_or_else(|| DbError::not_found("RestockRequest", &request.id))
    }

    /// Updates a restock request (full overwrite of mutable fields).
    pub async fn update(&self, request: &RestockRequest) -> DbResult<RestockRequest> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE restock_requests
            SET item_category = ?2, item_description = ?3, make_id = ?4, model_id = ?5,
                quantity_requested = ?6, office = ?7, priority = ?8, status = ?9,
                requested_by = ?10, notes = ?11, updated_at = ?12
            WHERE id = ?1
            "#,
        )
        .bind(&request.id)
        .bind(request.item_category)
        .bind(&request.item_description)
        .bind(&request.make_id)
        .bind(&request.model_id)
        .bind(request.quantity_requested)
        .bind(request.office)
        .bind(request.priority)
        .bind(request.status)
        .bind(&request.requested_by)
        .bind(&request.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("RestockRequest", &request.id));
        }

        self.get_by_id(&request.id)
            .await?
            .ok_or_else(|| DbError::not_found("RestockRequest", &request.id))
    }

    /// Moves a request to a new status without touching anything else.
    pub async fn set_status(&self, id: &str, status: RestockStatus) -> DbResult<RestockRequest> {
        debug!(id = %id, status = ?status, "Setting restock request status");

        let now = Utc::now();
        let result =
            sqlx::query("UPDATE restock_requests SET status = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(status)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("RestockRequest", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("RestockRequest", id))
    }

    /// Deletes a restock request. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM restock_requests WHERE id = ?1")
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
    use stockroom_core::{Make, MakeCategory};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn request(description: &str, priority: Priority, office: Office) -> RestockRequest {
        let now = Utc::now();
        RestockRequest {
            id: Uuid::new_v4().to_string(),
            item_category: ItemCategory::PrinterItems,
            item_description: description.to_string(),
            make_id: None,
            model_id: None,
            quantity_requested: 2,
            office,
            priority,
            status: RestockStatus::Pending,
            requested_by: Some("it-desk".to_string()),
            notes: None,
            created_at: now,
            updated_at: now,
            make_name: None,
            model_name: None,
        }
    }

    #[tokio::test]
    async fn joined_reads_resolve_catalog_names() {
        let db = test_db().await;
        let repo = db.restock_requests();

        let now = Utc::now();
        let brother = db
            .catalog()
            .insert_make(&Make {
                id: Uuid::new_v4().to_string(),
                name: "Brother".to_string(),
                category: MakeCategory::Printer,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let mut req = request("TN-760 toner", Priority::Normal, Office::Office1);
        req.make_id = Some(brother.id.clone());
        let created = repo.insert(&req).await.unwrap();

        assert_eq!(created.make_name.as_deref(), Some("Brother"));
        assert!(created.model_name.is_none());
    }

    #[tokio::test]
    async fn deleting_the_make_leaves_the_request_standing() {
        let db = test_db().await;
        let repo = db.restock_requests();

        let now = Utc::now();
        let brother = db
            .catalog()
            .insert_make(&Make {
                id: Uuid::new_v4().to_string(),
                name: "Brother".to_string(),
                category: MakeCategory::Printer,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let mut req = request("TN-760 toner", Priority::Normal, Office::Office1);
        req.make_id = Some(brother.id.clone());
        let created = repo.insert(&req).await.unwrap();

        db.catalog().delete_make(&brother.id).await.unwrap();

        let reread = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert!(reread.make_name.is_none());
    }

    #[tokio::test]
    async fn open_requests_rank_urgent_before_low() {
        let db = test_db().await;
        let repo = db.restock_requests();

        repo.insert(&request("paper", Priority::Low, Office::Office1))
            .await
            .unwrap();
        repo.insert(&request("toner", Priority::Urgent, Office::Office2))
            .await
            .unwrap();
        let ordered = repo
            .insert(&request("drum", Priority::High, Office::Office1))
            .await
            .unwrap();
        let cancelled = repo
            .insert(&request("cables", Priority::Urgent, Office::Office3))
            .await
            .unwrap();

        repo.set_status(&ordered.id, RestockStatus::Approved)
            .await
            .unwrap();
        repo.set_status(&cancelled.id, RestockStatus::Cancelled)
            .await
            .unwrap();

        let open = repo.find_open_by_urgency(None).await.unwrap();
        let descriptions: Vec<&str> =
            open.iter().map(|r| r.item_description.as_str()).collect();
        assert_eq!(descriptions, vec!["toner", "drum", "paper"]);
    }

    #[tokio::test]
    async fn filters_compose_over_status_office_priority() {
        let db = test_db().await;
        let repo = db.restock_requests();

        repo.insert(&request("toner", Priority::Urgent, Office::Office1))
            .await
            .unwrap();
        repo.insert(&request("paper", Priority::Low, Office::Office1))
            .await
            .unwrap();
        repo.insert(&request("drum", Priority::Urgent, Office::Office2))
            .await
            .unwrap();

        let all = repo.find_all(None, None, None, None).await.unwrap();
        assert_eq!(all.len(), 3);

        let scoped = repo
            .find_all(
                Some(RestockStatus::Pending),
                Some(Office::Office1),
                Some(Priority::Urgent),
                Some(ItemCategory::PrinterItems),
            )
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].item_description, "toner");

        let none = repo
            .find_all(None, None, None, Some(ItemCategory::Computers))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn grouped_counts_track_status_and_priority() {
        let db = test_db().await;
        let repo = db.restock_requests();

        repo.insert(&request("toner", Priority::Urgent, Office::Office1))
            .await
            .unwrap();
        repo.insert(&request("paper", Priority::Urgent, Office::Office1))
            .await
            .unwrap();
        let received = repo
            .insert(&request("drum", Priority::Low, Office::Office2))
            .await
            .unwrap();
        repo.set_status(&received.id, RestockStatus::Received)
            .await
            .unwrap();

        let statuses = repo.status_counts(None).await.unwrap();
        let pending = statuses
            .iter()
            .find(|s| s.status == RestockStatus::Pending)
            .unwrap();
        assert_eq!(pending.count, 2);

        let priorities = repo.pending_priority_counts(None).await.unwrap();
        assert_eq!(priorities.len(), 1);
        assert_eq!(priorities[0].priority, Priority::Urgent);
        assert_eq!(priorities[0].count, 2);

        let office2 = repo.status_counts(Some(Office::Office2)).await.unwrap();
        assert_eq!(office2.len(), 1);
        assert_eq!(office2[0].status, RestockStatus::Received);
    }

    #[tokio::test]
    async fn set_status_on_missing_request_is_not_found() {
        let db = test_db().await;
        let repo = db.restock_requests();

        let err = repo
            .set_status("no-such-id", RestockStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
