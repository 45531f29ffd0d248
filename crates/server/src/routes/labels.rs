//! Label HTML -> PDF endpoint

use axum::{http::header, response::IntoResponse};

use crate::error::AppError;
use crate::pdf;

/// POST /generate-pdf - Render label HTML (request body) as a PDF download
pub async fn generate_pdf(html: String) -> Result<impl IntoResponse, AppError> {
    tracing::info!(html_bytes = html.len(), "PDF generation request");

    let bytes = tokio::task::spawn_blocking(move || pdf::render_pdf(&html))
        .await
        .map_err(|e| AppError::Internal(format!("PDF task failed: {e}")))??;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf"),
        (header::CONTENT_DISPOSITION, "attachment; filename=generated.pdf"),
    ];

    Ok((headers, bytes))
}
