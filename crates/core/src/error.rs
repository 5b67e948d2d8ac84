use std::time::Duration;

/// Rejection reasons for a collection id or filename.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{kind} cannot be empty")]
    Empty { kind: &'static str },
    #[error("{kind} '{value}' is a relative path component")]
    RelativeComponent { kind: &'static str, value: String },
    #[error("{kind} '{value}' contains a path separator")]
    Separator { kind: &'static str, value: String },
    #[error("{kind} contains control characters")]
    ControlCharacter { kind: &'static str },
    #[error("{kind} exceeds maximum length of {max} bytes")]
    TooLong { kind: &'static str, max: usize },
}

/// Failures reported by a storage backend session.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },
    #[error("login rejected for user '{user}': {reason}")]
    Auth { user: String, reason: String },
    #[error("container '{0}' does not exist")]
    NotFound(String),
    #[error("{operation} rejected by backend: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },
    #[error("I/O error during {operation}: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Signals produced by the transfer engine.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("invalid upload target: {0}")]
    InvalidName(#[from] ValidationError),
    #[error("storage backend unavailable: {0}")]
    Connection(#[source] StorageError),
    #[error("unable to create container '{container}': {source}")]
    ContainerCreate {
        container: String,
        #[source]
        source: StorageError,
    },
    #[error("unable to enter container '{container}' after creating it: {source}")]
    ContainerSelect {
        container: String,
        #[source]
        source: StorageError,
    },
    #[error("unable to store '{filename}': {source}")]
    Write {
        filename: String,
        #[source]
        source: StorageError,
    },
    #[error("transfer did not complete within {0:?}")]
    Timeout(Duration),
    #[error("transfer aborted: {0}")]
    Aborted(String),
}

impl TransferError {
    /// True when the failure was caused by the caller's input rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TransferError::InvalidName(_))
    }

    /// Pipeline stage the error belongs to, used as a log field.
    pub fn stage(&self) -> &'static str {
        match self {
            TransferError::InvalidName(_) => "validate",
            TransferError::Connection(_) => "connect",
            TransferError::ContainerCreate { .. } => "create_container",
            TransferError::ContainerSelect { .. } => "select_container",
            TransferError::Write { .. } => "store",
            TransferError::Timeout(_) => "timeout",
            TransferError::Aborted(_) => "aborted",
        }
    }
}

/// Invalid startup configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown storage backend '{0}' (expected 'ftp' or 'local')")]
    UnknownBackend(String),
    #[error("{key} is not a valid {expected}: '{value}'")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

pub type TransferResult<T> = std::result::Result<T, TransferError>;
