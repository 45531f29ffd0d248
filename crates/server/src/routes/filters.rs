//! Free-text query -> structured filter endpoint

use axum::{Extension, Json, extract::Query};
use druglabel_core::FilterSet;
use serde::Deserialize;

use crate::ai::{OracleClient, extract_filters};
use crate::db::{QueryLogRepository, spawn_log};
use crate::error::AppError;

/// Query string for filter generation
#[derive(Debug, Deserialize)]
pub struct GenerateParmParams {
    user_query: String,
}

/// POST /generate-parm?user_query=... - Convert a label query into filters
///
/// Responds with a single filter object, or an array when the query has
/// several conditions. Every attempt is written to the query log in the
/// background, whether or not it succeeded.
pub async fn generate_parm(
    Extension(client): Extension<Option<OracleClient>>,
    Extension(query_log): Extension<Option<QueryLogRepository>>,
    Query(params): Query<GenerateParmParams>,
) -> Result<Json<FilterSet>, AppError> {
    let client = client.ok_or(AppError::OracleNotConfigured)?;

    tracing::info!(query = %params.user_query, model = client.model(), "Filter extraction request");

    let extraction = extract_filters(&client, &params.user_query).await;
    spawn_log(query_log, extraction.log_entry(&params.user_query));

    Ok(Json(extraction.outcome?))
}
