//! # Audit Trail Repository
//!
//! Append-only history of inventory mutations.
//!
//! Every successful create, update, or delete on an inventory table gets
//! one row with JSON snapshots of the record before and after. The
//! application never updates or deletes audit rows.
//!
//! Time windows are computed here, in Rust, and bound as parameters. The
//! stored RFC 3339 timestamps compare correctly as text.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockroom_core::{ActionCount, AuditLogEntry, Office, TableActivity};

/// Repository for the append-only audit log.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    /// Creates a new AuditLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditLogRepository { pool }
    }

    /// Records one mutation. Snapshots arrive pre-serialized; a `None`
    /// snapshot means the record did not exist on that side (creates have
    /// no old value, deletes no new value).
    pub async fn record(
        &self,
        table_name: &str,
        record_id: &str,
        action: &str,
        old_values: Option<String>,
        new_values: Option<String>,
        office: Option<Office>,
    ) -> DbResult<AuditLogEntry> {
        let entry = AuditLogEntry {
            id: Uuid::new_v4().to_string(),
            table_name: table_name.to_string(),
            record_id: record_id.to_string(),
            action: action.to_string(),
            old_values,
            new_values,
            office,
            timestamp: Utc::now(),
        };

        self.insert(&entry).await
    }

    /// Inserts a pre-built audit entry.
    pub async fn insert(&self, entry: &AuditLogEntry) -> DbResult<AuditLogEntry> {
        debug!(
            table = %entry.table_name,
            record_id = %entry.record_id,
            action = %entry.action,
            "Recording audit entry"
        );

        sqlx::query(
            r#"
            INSERT INTO audit_log (id, table_name, record_id, action, old_values, new_values, office, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.table_name)
        .bind(&entry.record_id)
        .bind(&entry.action)
        .bind(&entry.old_values)
        .bind(&entry.new_values)
        .bind(entry.office)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&entry.id)
            .await?
            .ok_or_else(|| DbError::not_found("AuditLogEntry", &entry.id))
    }

    /// Gets one audit entry by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<AuditLogEntry>> {
        let entry = sqlx::query_as::<_, AuditLogEntry>("SELECT * FROM audit_log WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entry)
    }

    /// Lists audit entries, newest first, filtered by any combination of
    /// table, action, and office, capped at `limit` rows.
    pub async fn find_all(
        &self,
        table_name: Option<&str>,
        action: Option<&str>,
        office: Option<Office>,
        limit: i64,
    ) -> DbResult<Vec<AuditLogEntry>> {
        let mut sql = String::from("SELECT * FROM audit_log");
        let mut conditions: Vec<&str> = Vec::new();

        if table_name.is_some() {
            conditions.push("table_name = ?");
        }
        if action.is_some() {
            conditions.push("action = ?");
        }
        if office.is_some() {
            conditions.push("office = ?");
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY timestamp DESC LIMIT ?");

        let mut query = sqlx::query_as::<_, AuditLogEntry>(&sql);
        if let Some(table_name) = table_name {
            query = query.bind(table_name);
        }
        if let Some(action) = action {
            query = query.bind(action);
        }
        if let Some(office) = office {
            query = query.bind(office);
        }
        query = query.bind(limit);

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Full mutation history for one record, newest first.
    pub async fn find_by_record(
        &self,
        table_name: &str,
        record_id: &str,
    ) -> DbResult<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT * FROM audit_log
            WHERE table_name = ?1 AND record_id = ?2
            ORDER BY timestamp DESC
            "#,
        )
        .bind(table_name)
        .bind(record_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Entries within the last `days` days, newest first, capped at
    /// `limit`, optionally scoped to one office.
    pub async fn find_recent(
        &self,
        days: i64,
        limit: i64,
        office: Option<Office>,
    ) -> DbResult<Vec<AuditLogEntry>> {
        let office_clause = office_clause(office);
        let sql = format!(
            r#"
            SELECT * FROM audit_log
            WHERE timestamp >= ?{office_clause}
            ORDER BY timestamp DESC
            LIMIT ?
            "#
        );

        let mut query = sqlx::query_as::<_, AuditLogEntry>(&sql).bind(cutoff(days));
        if let Some(office) = office {
            query = query.bind(office);
        }
        query = query.bind(limit);

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Counts entries per action within the last `days` days, optionally
    /// scoped to one office.
    pub async fn action_counts(
        &self,
        days: i64,
        office: Option<Office>,
    ) -> DbResult<Vec<ActionCount>> {
        let office_clause = office_clause(office);
        let sql = format!(
            r#"
            SELECT action, COUNT(*) AS count
            FROM audit_log
            WHERE timestamp >= ?{office_clause}
            GROUP BY action
            ORDER BY count DESC
            "#
        );

        let mut query = sqlx::query_as::<_, ActionCount>(&sql).bind(cutoff(days));
        if let Some(office) = office {
            query = query.bind(office);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Counts entries per table within the last `days` days, optionally
    /// scoped to one office.
    pub async fn table_activity(
        &self,
        days: i64,
        office: Option<Office>,
    ) -> DbResult<Vec<TableActivity>> {
        let office_clause = office_clause(office);
        let sql = format!(
            r#"
            SELECT table_name, COUNT(*) AS activity_count
            FROM audit_log
            WHERE timestamp >= ?{office_clause}
            GROUP BY table_name
            ORDER BY activity_count DESC
            "#
        );

        let mut query = sqlx::query_as::<_, TableActivity>(&sql).bind(cutoff(days));
        if let Some(office) = office {
            query = query.bind(office);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }
}

fn office_clause(office: Option<Office>) -> &'static str {
    if office.is_some() {
        " AND office = ?"
    } else {
        ""
    }
}

fn cutoff(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
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

    #[tokio::test]
    async fn record_round_trips_snapshots() {
        let db = test_db().await;
        let repo = db.audit_log();

        let entry = repo
            .record(
                "computers",
                "c1",
                "UPDATE",
                Some(r#"{"quantity":1}"#.to_string()),
                Some(r#"{"quantity":3}"#.to_string()),
                Some(Office::Office2),
            )
            .await
            .unwrap();

        assert_eq!(entry.table_name, "computers");
        assert_eq!(entry.office, Some(Office::Office2));
        assert_eq!(
            entry.old_values_json().unwrap()["quantity"],
            serde_json::json!(1)
        );
        assert_eq!(
            entry.new_values_json().unwrap()["quantity"],
            serde_json::json!(3)
        );
    }

    #[tokio::test]
    async fn filters_and_limit_shape_the_listing() {
        let db = test_db().await;
        let repo = db.audit_log();

        repo.record("computers", "c1", "CREATE", None, Some("{}".into()), None)
            .await
            .unwrap();
        repo.record("computers", "c1", "UPDATE", Some("{}".into()), Some("{}".into()), None)
            .await
            .unwrap();
        repo.record("makes", "m1", "CREATE", None, Some("{}".into()), None)
            .await
            .unwrap();

        let computers = repo.find_all(Some("computers"), None, None, 100).await.unwrap();
        assert_eq!(computers.len(), 2);

        let creates = repo.find_all(None, Some("CREATE"), None, 100).await.unwrap();
        assert_eq!(creates.len(), 2);

        let capped = repo.find_all(None, None, None, 1).await.unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[tokio::test]
    async fn record_history_is_newest_first() {
        let db = test_db().await;
        let repo = db.audit_log();

        repo.record("computers", "c1", "CREATE", None, Some("{}".into()), None)
            .await
            .unwrap();
        repo.record("computers", "c1", "DELETE", Some("{}".into()), None, None)
            .await
            .unwrap();
        repo.record("computers", "c2", "CREATE", None, Some("{}".into()), None)
            .await
            .unwrap();

        let history = repo.find_by_record("computers", "c1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, "DELETE");
    }

    #[tokio::test]
    async fn window_queries_only_see_recent_entries() {
        let db = test_db().await;
        let repo = db.audit_log();

        // one fresh entry, one backdated past any window we ask for
        repo.record("computers", "c1", "CREATE", None, Some("{}".into()), None)
            .await
            .unwrap();

        let stale = AuditLogEntry {
            id: "old-entry".to_string(),
            table_name: "makes".to_string(),
            record_id: "m1".to_string(),
            action: "DELETE".to_string(),
            old_values: Some("{}".to_string()),
            new_values: None,
            office: None,
            timestamp: Utc::now() - Duration::days(400),
        };
        repo.insert(&stale).await.unwrap();

        let recent = repo.find_recent(30, 100, None).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].table_name, "computers");

        let actions = repo.action_counts(30, None).await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, "CREATE");

        let tables = repo.table_activity(365, None).await.unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].table_name, "computers");
    }

    #[tokio::test]
    async fn window_queries_scope_to_an_office() {
        let db = test_db().await;
        let repo = db.audit_log();

        repo.record("computers", "c1", "CREATE", None, Some("{}".into()), None)
            .await
            .unwrap();
        repo.record(
            "peripherals",
            "p1",
            "CREATE",
            None,
            Some("{}".into()),
            Some(Office::Office1),
        )
        .await
        .unwrap();

        let scoped = repo
            .find_recent(30, 100, Some(Office::Office1))
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].table_name, "peripherals");

        let actions = repo.action_counts(30, Some(Office::Office1)).await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].count, 1);
    }
}
