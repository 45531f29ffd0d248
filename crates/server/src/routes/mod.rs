pub mod filters;
pub mod health;
pub mod labels;
pub mod metrics;

use axum::{Router, routing::post};

/// Build the label query routes
pub fn api_routes() -> Router {
    Router::new()
        .route("/generate-parm", post(filters::generate_parm))
        .route("/generate-pdf", post(labels::generate_pdf))
}
