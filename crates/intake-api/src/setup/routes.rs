//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::constants::{HEALTH_PATH, OPENAPI_PATH, SUBMIT_PROJECT_PATH};
use crate::handlers;
use crate::middleware::{request_id_middleware, security_headers_middleware, SecurityHeadersConfig};
use crate::state::AppState;
use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use intake_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let security_headers_config = Arc::new(SecurityHeadersConfig::new(config.is_production()));

    let max_request_body_bytes = config.max_request_body_bytes();
    tracing::info!(
        max_request_body_bytes = max_request_body_bytes,
        request_timeout_secs = config.request_timeout_secs(),
        http_concurrency_limit = config.http_concurrency_limit(),
        "HTTP limits configured"
    );

    let app = Router::new()
        .route(
            SUBMIT_PROJECT_PATH,
            post(handlers::submit_project::submit_project),
        )
        .route(HEALTH_PATH, get(handlers::health::health_check))
        .route(OPENAPI_PATH, get(openapi_json))
        // The multipart reader streams; the transport limit below is the only cap
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_request_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs(),
        )))
        .layer(ConcurrencyLimitLayer::new(config.http_concurrency_limit()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ))
        .with_state(state);

    Ok(app)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin '{}'", o))
            })
            .collect::<Result<Vec<HeaderValue>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
