//! druglabel-server library crate
//!
//! Exposes `build_app` and `config` for integration tests.
//! The actual binary entrypoint is in `main.rs`.

pub mod ai;
pub mod config;
pub mod db;
pub mod error;
mod middleware;
pub mod pdf;
mod routes;

use axum::{Extension, Router, http::Method, middleware as axum_mw, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::QueryLogRepository;

/// Build the full application router with all routes and middleware.
///
/// `query_log` is `None` when no database is configured; extractions are
/// then only traced. Extracted from `main()` so integration tests can
/// construct the app without binding to a TCP port.
pub fn build_app(config: &Config, query_log: Option<QueryLogRepository>) -> Router {
    // Create rate limiter
    let rate_limiter = middleware::create_rate_limiter(config.rate_limit_rps);

    // Create oracle client (None if GROQ_API_KEY not set)
    let oracle_client: Option<ai::OracleClient> =
        config.oracle_api_key.as_ref().and_then(|key| {
            ai::OracleClient::new(
                key.clone(),
                config.oracle_api_url.clone(),
                config.oracle_model.clone(),
                config.oracle_timeout,
            )
            .inspect_err(|e| tracing::error!(error = %e, "Failed to build oracle client"))
            .ok()
        });

    // Rate-limited label routes
    let api_routes = routes::api_routes()
        .layer(axum_mw::from_fn(middleware::rate_limit_middleware))
        .layer(Extension(rate_limiter));

    // Install Prometheus metrics recorder.
    // Use build_recorder() + set_global_recorder() so that repeated calls
    // (e.g. in integration tests) don't panic; the second install is
    // silently ignored and we still get a valid handle for /metrics.
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    // Operational routes (not rate limited)
    let public_routes = Router::new()
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::get))
        .layer(Extension(prometheus_handle));

    // Build CORS layer
    let methods = [Method::GET, Method::POST];
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };

    // Build application
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(Extension(oracle_client))
        .layer(Extension(query_log))
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
