//! # API REST
//!
//! REST API implementation for the upload relay.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Multipart parsing and streaming the `file` part into the transfer engine
//! - OpenAPI documentation
//! - REST-specific concerns (status codes, plain-text error bodies, request tracing)
//!
//! Uses `api-shared` for common types and `relay-core` for everything that touches storage.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;

pub use error::ApiError;

use api_shared::{HealthCheckRes, HealthService};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use relay_core::{RelayServices, TransferEngine};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: TransferEngine,
    pub health: HealthService,
}

impl From<RelayServices> for AppState {
    fn from(services: RelayServices) -> Self {
        Self {
            engine: services.engine,
            health: HealthService::new(services.prober),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handlers::healthcheck, handlers::upload_file),
    components(schemas(HealthCheckRes))
)]
pub struct ApiDoc;

/// Build the relay's HTTP router.
///
/// Request bodies are unbounded in size; uploads are streamed to storage and bounded by the
/// engine's request timeout instead.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(handlers::healthcheck))
        .route("/upload/:id/:filename", post(handlers::upload_file))
        .route("/api-docs/openapi.json", get(handlers::openapi))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve the router until the process is stopped.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails while running.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("++ Relay REST listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
