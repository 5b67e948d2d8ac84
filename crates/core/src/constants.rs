//! Constants used throughout the relay core crate.
//!
//! Defaults mirror the values the service has historically been deployed with, so an
//! unconfigured process behaves the same as before configuration was externalised.

use std::time::Duration;

/// Default listen address for the HTTP surface.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8091";

/// Default FTP host.
pub const DEFAULT_FTP_HOST: &str = "localhost";

/// Default FTP control port.
pub const DEFAULT_FTP_PORT: u16 = 2021;

/// Default FTP user name.
pub const DEFAULT_FTP_USER: &str = "ons-inbound";

/// Default FTP password.
pub const DEFAULT_FTP_PASSWORD: &str = "ons-inbound";

/// Default local root directory when the filesystem backend is selected.
pub const DEFAULT_LOCAL_ROOT: &str = "upload_data";

/// Overall request timeout, matching the read/write timeout of the HTTP server.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum length in bytes of a collection id or filename.
pub const MAX_SEGMENT_LEN: usize = 255;

/// Number of body chunks buffered between the HTTP reader and the blocking writer.
pub const STREAM_CHANNEL_CAPACITY: usize = 8;
