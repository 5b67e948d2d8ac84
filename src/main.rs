//! Upload relay server.
//!
//! Resolves storage configuration once at startup, then serves the relay's REST API:
//! `POST /upload/{id}/{filename}` and `GET /healthcheck`.

use relay_core::{config::ENV_ADDR, RelayConfig, RelayServices, DEFAULT_LISTEN_ADDR};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the upload relay
///
/// # Environment Variables
/// - `RELAY_ADDR`: REST server address (default: "0.0.0.0:8091")
/// - `RELAY_BACKEND`: `ftp` (default) or `local`
/// - `RELAY_FTP_HOST`, `RELAY_FTP_PORT`, `RELAY_FTP_USER`, `RELAY_FTP_PASS`, `RELAY_FTP_ROOT`:
///   FTP server settings
/// - `RELAY_LOCAL_ROOT`: Root directory for the local backend (default: "upload_data")
/// - `RELAY_REQUEST_TIMEOUT_SECS`: Upper bound on one transfer or health probe (default: 15)
///
/// A `.env` file in the working directory is loaded first if present.
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration is invalid, or server startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("relay_run=info".parse()?)
                .add_directive("relay_core=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RelayConfig::from_lookup(|key| std::env::var(key).ok())?;
    let addr = std::env::var(ENV_ADDR).unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.into());

    tracing::info!("++ Starting relay on {}", addr);
    tracing::info!(
        "++ Storage: {} backend at {} (timeout {:?})",
        config.backend().kind(),
        config.backend().location(),
        config.request_timeout()
    );

    let services = RelayServices::from_config(&config);
    api_rest::serve(&addr, services.into()).await
}
