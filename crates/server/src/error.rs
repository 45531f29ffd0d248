//! Application error handling

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use druglabel_core::FilterError;
use serde::Serialize;

use crate::pdf::PdfError;

/// Shown to end users whenever a query could not be turned into filters
pub const REPHRASE_MESSAGE: &str = "Please give more clear text";

/// JSON error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: &'static str,
    pub detail: String,
}

impl ErrorBody {
    pub fn new(error: &'static str, message: &'static str, detail: impl Into<String>) -> Self {
        Self {
            error,
            message,
            detail: detail.into(),
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    Filter(FilterError),
    OracleNotConfigured,
    Pdf(PdfError),
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Filter(FilterError::OracleTimeout) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Filter(e) if e.is_oracle_failure() => StatusCode::BAD_GATEWAY,
            AppError::Filter(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::OracleNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Pdf(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Filter(e) => ErrorBody::new(e.kind(), REPHRASE_MESSAGE, e.to_string()),
            AppError::OracleNotConfigured => ErrorBody::new(
                "oracle_not_configured",
                REPHRASE_MESSAGE,
                "GROQ_API_KEY not configured",
            ),
            AppError::Pdf(e) => ErrorBody::new(
                "pdf_render_failed",
                "An error occurred while generating the PDF",
                e.to_string(),
            ),
            AppError::Internal(msg) => ErrorBody::new("internal", "Internal server error", msg),
        };

        (status, Json(body)).into_response()
    }
}

impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        AppError::Filter(err)
    }
}

impl From<PdfError> for AppError {
    fn from(err: PdfError) -> Self {
        AppError::Pdf(err)
    }
}

impl From<deadpool_postgres::PoolError> for AppError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        AppError::Internal(format!("Database pool error: {}", err))
    }
}

impl From<tokio_postgres::Error> for AppError {
    fn from(err: tokio_postgres::Error) -> Self {
        AppError::Internal(format!("Database error: {}", err))
    }
}
