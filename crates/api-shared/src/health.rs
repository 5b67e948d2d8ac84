use crate::{STATUS_FAILED, STATUS_OK};
use relay_core::{HealthProber, HealthStatus};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health response body.
///
/// Field names are capitalised on the wire (`{"Status":"OK","Ftp":"OK"}`) for compatibility
/// with existing monitors. `Ftp` reports the storage tier whichever binding is configured,
/// and both fields currently always carry the same value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthCheckRes {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Ftp")]
    pub ftp: String,
}

impl From<HealthStatus> for HealthCheckRes {
    fn from(status: HealthStatus) -> Self {
        let value = if status.is_healthy() {
            STATUS_OK
        } else {
            STATUS_FAILED
        };
        Self {
            status: value.into(),
            ftp: value.into(),
        }
    }
}

/// Health service usable by any API surface.
///
/// Wraps the storage prober; every check opens and closes one backend connection.
#[derive(Clone, Debug)]
pub struct HealthService {
    prober: HealthProber,
}

impl HealthService {
    pub fn new(prober: HealthProber) -> Self {
        Self { prober }
    }

    /// Probe storage and build the response. Never fails; an unreachable backend is reported
    /// as `FAILED`.
    pub async fn check_health(&self) -> HealthCheckRes {
        self.prober.probe().await.into()
    }

    /// Blocking variant for callers outside an async runtime.
    pub fn check_health_blocking(&self) -> HealthCheckRes {
        self.prober.check().into()
    }
}
