use deadpool_postgres::Pool;
use druglabel_core::QueryLogEntry;

use crate::error::AppError;

const INSERT_SQL: &str = r#"INSERT INTO "userQueryAI" ("userQuery", "aiResponse", "statusCode", "responseTime", "dateCreated") VALUES ($1, $2, $3, $4, $5)"#;

/// Repository for the query log table
#[derive(Clone)]
pub struct QueryLogRepository {
    pool: Pool,
}

impl QueryLogRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Insert one query log row
    pub async fn insert(&self, entry: &QueryLogEntry) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        let response_time = entry.response_time_seconds.to_string();
        let created_at = entry.created_at.naive_utc();
        client
            .execute(
                INSERT_SQL,
                &[
                    &entry.user_query,
                    &entry.serialized_filters,
                    &entry.status_code,
                    &response_time,
                    &created_at,
                ],
            )
            .await?;
        Ok(())
    }

    /// Check the database answers
    pub async fn ping(&self) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        Ok(())
    }
}

/// Record `entry` in the background.
///
/// The caller never waits on the insert; a failed insert is logged and
/// dropped. Without a repository the entry only goes to the trace log.
pub fn spawn_log(repo: Option<QueryLogRepository>, entry: QueryLogEntry) {
    let Some(repo) = repo else {
        tracing::debug!(
            user_query = %entry.user_query,
            status = entry.status_code,
            "Query log disabled, entry not persisted"
        );
        return;
    };

    tokio::spawn(async move {
        match repo.insert(&entry).await {
            Ok(()) => tracing::debug!(user_query = %entry.user_query, "Query log row inserted"),
            Err(e) => tracing::error!(
                error = ?e,
                user_query = %entry.user_query,
                "Failed to insert query log row"
            ),
        }
    });
}
