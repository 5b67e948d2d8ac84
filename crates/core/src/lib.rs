//! # Relay Core
//!
//! Core logic of the upload relay: placing uploaded files into per-collection containers on
//! a storage backend, and probing that backend for health.
//!
//! This crate contains:
//! - Startup configuration ([`RelayConfig`])
//! - Storage bindings for a remote FTP server and a local directory tree ([`backend`])
//! - The [`TransferEngine`] (select, create on demand, store)
//! - The [`HealthProber`]
//!
//! **No API concerns**: HTTP routing, multipart parsing and response formatting belong in
//! `api-rest` and `api-shared`.

pub mod backend;
pub mod config;
pub mod constants;
pub mod error;
pub mod health;
mod stream;
pub mod transfer;
pub mod validation;

pub use backend::{ContainerSession, StorageBackend};
pub use config::{BackendConfig, BackendKind, FtpConfig, LocalConfig, RelayConfig};
pub use constants::{DEFAULT_LISTEN_ADDR, DEFAULT_REQUEST_TIMEOUT};
pub use error::{
    ConfigError, StorageError, StorageResult, TransferError, TransferResult, ValidationError,
};
pub use health::{HealthProber, HealthStatus};
pub use transfer::{TransferEngine, TransferReceipt};
pub use validation::PathSegment;

use std::sync::Arc;

/// The engine and prober for one configured backend, sharing a single backend instance.
#[derive(Clone, Debug)]
pub struct RelayServices {
    pub engine: TransferEngine,
    pub prober: HealthProber,
}

impl RelayServices {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self::with_backend(backend::from_config(config.backend()), config.request_timeout())
    }

    pub fn with_backend(backend: Arc<dyn StorageBackend>, timeout: std::time::Duration) -> Self {
        Self {
            engine: TransferEngine::new(backend.clone(), timeout),
            prober: HealthProber::new(backend, timeout),
        }
    }
}
