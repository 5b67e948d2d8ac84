//! Relay runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the transfer
//! engine and health prober. Request handling never reads process-wide environment
//! variables.
//!
//! [`RelayConfig::from_lookup`] takes a key lookup closure rather than reading the
//! environment itself, so binaries pass `std::env::var` and tests pass a map.

use crate::constants::{
    DEFAULT_FTP_HOST, DEFAULT_FTP_PASSWORD, DEFAULT_FTP_PORT, DEFAULT_FTP_USER,
    DEFAULT_LOCAL_ROOT, DEFAULT_REQUEST_TIMEOUT,
};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const ENV_ADDR: &str = "RELAY_ADDR";
pub const ENV_BACKEND: &str = "RELAY_BACKEND";
pub const ENV_FTP_HOST: &str = "RELAY_FTP_HOST";
pub const ENV_FTP_PORT: &str = "RELAY_FTP_PORT";
pub const ENV_FTP_USER: &str = "RELAY_FTP_USER";
pub const ENV_FTP_PASS: &str = "RELAY_FTP_PASS";
pub const ENV_FTP_ROOT: &str = "RELAY_FTP_ROOT";
pub const ENV_LOCAL_ROOT: &str = "RELAY_LOCAL_ROOT";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "RELAY_REQUEST_TIMEOUT_SECS";

/// Which storage binding is in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Ftp,
    Local,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ftp" => Ok(BackendKind::Ftp),
            "local" | "fs" | "filesystem" => Ok(BackendKind::Local),
            other => Err(ConfigError::UnknownBackend(other.to_owned())),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Ftp => f.write_str("ftp"),
            BackendKind::Local => f.write_str("local"),
        }
    }
}

/// Connection settings for the remote FTP storage tier.
#[derive(Clone)]
pub struct FtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Remote directory under which containers are created. Empty means the login directory.
    pub root: String,
    /// Applied to connect, read and write on the control and data sockets.
    pub timeout: Duration,
}

impl FtpConfig {
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Remote path of the container for `collection_id`.
    pub fn container_path(&self, collection_id: &str) -> String {
        let root = self.root.trim_end_matches('/');
        if self.root.is_empty() {
            collection_id.to_owned()
        } else if root.is_empty() {
            format!("/{collection_id}")
        } else {
            format!("{root}/{collection_id}")
        }
    }
}

impl std::fmt::Debug for FtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("root", &self.root)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Settings for the local filesystem binding.
#[derive(Clone, Debug)]
pub struct LocalConfig {
    pub root: PathBuf,
}

impl LocalConfig {
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[derive(Clone, Debug)]
pub enum BackendConfig {
    Ftp(FtpConfig),
    Local(LocalConfig),
}

impl BackendConfig {
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendConfig::Ftp(_) => BackendKind::Ftp,
            BackendConfig::Local(_) => BackendKind::Local,
        }
    }

    /// Human-readable location of the storage tier, for logs. Never includes credentials.
    pub fn location(&self) -> String {
        match self {
            BackendConfig::Ftp(ftp) => ftp.endpoint(),
            BackendConfig::Local(local) => local.root.display().to_string(),
        }
    }
}

/// Relay configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    backend: BackendConfig,
    request_timeout: Duration,
}

impl RelayConfig {
    /// Create a new `RelayConfig`.
    pub fn new(backend: BackendConfig, request_timeout: Duration) -> Result<Self, ConfigError> {
        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: ENV_REQUEST_TIMEOUT_SECS,
                value: "0".into(),
                expected: "non-zero number of seconds",
            });
        }

        if let BackendConfig::Ftp(ftp) = &backend {
            if ftp.host.trim().is_empty() {
                return Err(ConfigError::Empty(ENV_FTP_HOST));
            }
            if ftp.user.trim().is_empty() {
                return Err(ConfigError::Empty(ENV_FTP_USER));
            }
        }

        Ok(Self {
            backend,
            request_timeout,
        })
    }

    /// Resolve configuration from a key lookup, falling back to the defaults for absent keys.
    ///
    /// Blank values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let request_timeout = match get(ENV_REQUEST_TIMEOUT_SECS) {
            Some(raw) => Duration::from_secs(parse_number(
                ENV_REQUEST_TIMEOUT_SECS,
                &raw,
                "number of seconds",
            )?),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let kind = get(ENV_BACKEND)
            .map(|v| v.parse::<BackendKind>())
            .transpose()?
            .unwrap_or(BackendKind::Ftp);

        let backend = match kind {
            BackendKind::Ftp => BackendConfig::Ftp(FtpConfig {
                host: get(ENV_FTP_HOST).unwrap_or_else(|| DEFAULT_FTP_HOST.into()),
                port: get(ENV_FTP_PORT)
                    .map(|raw| parse_number(ENV_FTP_PORT, &raw, "port number"))
                    .transpose()?
                    .unwrap_or(DEFAULT_FTP_PORT),
                user: get(ENV_FTP_USER).unwrap_or_else(|| DEFAULT_FTP_USER.into()),
                // The password is taken verbatim; surrounding whitespace may be significant.
                password: lookup(ENV_FTP_PASS)
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_FTP_PASSWORD.into()),
                root: get(ENV_FTP_ROOT).unwrap_or_default(),
                timeout: request_timeout,
            }),
            BackendKind::Local => BackendConfig::Local(LocalConfig {
                root: get(ENV_LOCAL_ROOT)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_ROOT)),
            }),
        };

        Self::new(backend, request_timeout)
    }

    pub fn backend(&self) -> &BackendConfig {
        &self.backend
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

fn parse_number<T: FromStr>(
    key: &'static str,
    raw: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    raw.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_owned(),
        expected,
    })
}
