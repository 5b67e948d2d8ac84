//! # API Shared
//!
//! Shared definitions for the relay's API surfaces.
//!
//! Contains:
//! - Wire types (`HealthCheckRes`)
//! - `HealthService`, which turns a storage probe into a health response
//! - Response text shared by every upload surface
//!
//! Used by `api-rest` and `relay-cli`.

pub mod health;

pub use health::{HealthCheckRes, HealthService};

/// Reported for a component that is up.
pub const STATUS_OK: &str = "OK";

/// Reported for a component that is down.
pub const STATUS_FAILED: &str = "FAILED";

/// Body of a successful upload response.
pub const UPLOAD_OK_BODY: &str = "OK";

/// Prefix of every upload error message returned to a caller.
pub const UPLOAD_ERROR_PREFIX: &str = "Error uploading file: ";

/// Format an upload failure for a caller.
pub fn upload_error_message(cause: impl std::fmt::Display) -> String {
    format!("{UPLOAD_ERROR_PREFIX}{cause}")
}
