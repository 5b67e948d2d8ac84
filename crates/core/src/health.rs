//! Storage health probe.
//!
//! A probe opens one session against the storage backend (connect and log in for FTP) and
//! drops it straight away, which logs out. Failures are logged and reduced to
//! [`HealthStatus::Unhealthy`]; the probe never returns an error and never retries.

use crate::backend::StorageBackend;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(self) -> bool {
        self == HealthStatus::Healthy
    }
}

#[derive(Clone, Debug)]
pub struct HealthProber {
    backend: Arc<dyn StorageBackend>,
    timeout: Duration,
}

impl HealthProber {
    pub fn new(backend: Arc<dyn StorageBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Probe the backend on the current thread.
    pub fn check(&self) -> HealthStatus {
        match self.backend.open() {
            Ok(session) => {
                drop(session);
                tracing::debug!(
                    backend = %self.backend.kind(),
                    location = %self.backend.location(),
                    "storage health ok"
                );
                HealthStatus::Healthy
            }
            Err(e) => {
                tracing::error!(
                    backend = %self.backend.kind(),
                    location = %self.backend.location(),
                    "storage health check failed: {}",
                    e
                );
                HealthStatus::Unhealthy
            }
        }
    }

    /// Probe the backend from async code, bounded by the request timeout.
    pub async fn probe(&self) -> HealthStatus {
        let prober = self.clone();
        let check = tokio::task::spawn_blocking(move || prober.check());

        match tokio::time::timeout(self.timeout, check).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                tracing::error!("storage health check task failed: {}", e);
                HealthStatus::Unhealthy
            }
            Err(_) => {
                tracing::error!(
                    location = %self.backend.location(),
                    "storage health check timed out after {:?}",
                    self.timeout
                );
                HealthStatus::Unhealthy
            }
        }
    }
}
