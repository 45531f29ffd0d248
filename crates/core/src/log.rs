use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row for the query log, recorded for successful and failed extractions
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryLogEntry {
    pub user_query: String,
    /// Filters as sent to the caller, or the error kind when extraction failed
    pub serialized_filters: String,
    /// Oracle HTTP status; 0 when no response was received
    pub status_code: i32,
    pub response_time_seconds: f64,
    pub created_at: DateTime<Utc>,
}

impl QueryLogEntry {
    pub fn new(
        user_query: impl Into<String>,
        serialized_filters: impl Into<String>,
        status_code: Option<u16>,
        response_time_seconds: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_query: user_query.into(),
            serialized_filters: serialized_filters.into(),
            status_code: status_code.map(i32::from).unwrap_or(0),
            response_time_seconds,
            created_at,
        }
    }
}
