//! Shared application state.

use serde::Serialize;
use tracing::warn;

use stockroom_core::Office;
use stockroom_db::Database;

/// State handed to every route handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }

    /// Records an audit entry for a completed mutation.
    ///
    /// Audit recording is best-effort: the mutation already committed, so
    /// a failure here is logged and swallowed rather than turning a
    /// successful request into an error.
    pub async fn record_audit<O, N>(
        &self,
        table_name: &str,
        record_id: &str,
        action: &str,
        old: Option<&O>,
        new: Option<&N>,
        office: Option<Office>,
    ) where
        O: Serialize,
        N: Serialize,
    {
        let old_values = old.and_then(|v| serde_json::to_string(v).ok());
        let new_values = new.and_then(|v| serde_json::to_string(v).ok());

        if let Err(err) = self
            .db
            .audit_log()
            .record(table_name, record_id, action, old_values, new_values, office)
            .await
        {
            warn!(
                table = table_name,
                record_id,
                action,
                error = %err,
                "Failed to record audit entry"
            );
        }
    }
}

/// Marker for the absent side of an audit snapshot pair, so call sites can
/// write `NONE_SNAPSHOT` instead of spelling out a turbofish.
pub const NONE_SNAPSHOT: Option<&()> = None;
