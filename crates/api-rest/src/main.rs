//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the relay's REST API on its own.
//!
//! ## Intended use
//! Useful during development when iterating on the HTTP layer. The workspace's main
//! `relay-run` binary serves the same router and is what deployments run.

use relay_core::RelayConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the standalone relay REST API server
///
/// # Environment Variables
/// - `RELAY_ADDR`: Server address (default: "0.0.0.0:8091")
/// - `RELAY_BACKEND` and the `RELAY_FTP_*` / `RELAY_LOCAL_ROOT` settings select the storage
///   backend (see `relay_core::config`)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the storage configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("relay_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RelayConfig::from_lookup(|key| std::env::var(key).ok())?;
    let addr = std::env::var(relay_core::config::ENV_ADDR)
        .unwrap_or_else(|_| relay_core::DEFAULT_LISTEN_ADDR.into());

    tracing::info!(
        "-- Starting relay REST API on {} ({} backend at {})",
        addr,
        config.backend().kind(),
        config.backend().location()
    );

    let services = relay_core::RelayServices::from_config(&config);
    api_rest::serve(&addr, services.into()).await
}
