//! Health check endpoint

use axum::{Extension, Json};
use serde::Serialize;

use crate::ai::OracleClient;
use crate::db::QueryLogRepository;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    oracle: &'static str,
    query_log: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// GET /health - Report whether the oracle is configured and the query log reachable
///
/// The query log is best-effort, so an unreachable database is reported but
/// does not make the service unhealthy.
pub async fn check(
    Extension(client): Extension<Option<OracleClient>>,
    Extension(query_log): Extension<Option<QueryLogRepository>>,
) -> Json<HealthResponse> {
    let oracle = if client.is_some() { "configured" } else { "disabled" };

    let (query_log, reason) = match query_log {
        None => ("disabled", None),
        Some(repo) => match repo.ping().await {
            Ok(()) => ("ok", None),
            Err(e) => {
                tracing::error!(error = ?e, "Health check query failed");
                ("unavailable", Some(format!("{e:?}")))
            }
        },
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        oracle,
        query_log,
        reason,
    })
}
