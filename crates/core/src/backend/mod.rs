//! Storage backends.
//!
//! A backend hands out one [`ContainerSession`] per transfer. The session owns the underlying
//! connection (or filesystem cursor) and releases it when dropped, so every exit path of a
//! transfer (success, error or panic) gives the connection back.
//!
//! Both bindings are blocking. Async callers run them on the blocking thread pool.

mod ftp;
mod local;

pub use ftp::FtpBackend;
pub use local::LocalBackend;

use crate::config::{BackendConfig, BackendKind};
use crate::error::StorageResult;
use crate::validation::PathSegment;
use std::io::Read;
use std::sync::Arc;

/// An open connection to the storage tier, scoped to a single transfer.
pub trait ContainerSession: Send {
    /// Enter the container for `collection_id`.
    ///
    /// Must return [`StorageError::NotFound`](crate::StorageError::NotFound) when, and only
    /// when, the container is absent. Every other failure is reported as some other variant.
    fn select_container(&mut self, collection_id: &PathSegment) -> StorageResult<()>;

    /// Create the container for `collection_id`.
    ///
    /// A container that already exists is success, so concurrent first uploads for the same
    /// collection do not reject each other.
    fn create_container(&mut self, collection_id: &PathSegment) -> StorageResult<()>;

    /// Write `content` to `filename` inside the selected container, replacing any existing
    /// file. Returns the number of bytes written.
    fn store(&mut self, filename: &PathSegment, content: &mut dyn Read) -> StorageResult<u64>;
}

/// A configured storage binding.
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> BackendKind;

    /// Human-readable location used in log lines (host:port or a directory).
    fn location(&self) -> String;

    /// Connect and authenticate, returning a session ready for container operations.
    fn open(&self) -> StorageResult<Box<dyn ContainerSession>>;
}

/// Build the backend selected in configuration.
pub fn from_config(config: &BackendConfig) -> Arc<dyn StorageBackend> {
    match config {
        BackendConfig::Ftp(ftp) => Arc::new(FtpBackend::new(ftp.clone())),
        BackendConfig::Local(local) => Arc::new(LocalBackend::new(local.clone())),
    }
}
