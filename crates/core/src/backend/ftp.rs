//! Remote FTP binding.
//!
//! Each session is one control connection: connect, log in, switch to binary mode, then
//! container and store commands. The connection is closed with `QUIT` when the session is
//! dropped.
//!
//! FTP has no distinct reply for "directory does not exist"; a `550` reply to `CWD` is taken
//! as not-found and anything else as a connectivity problem.

use super::{ContainerSession, StorageBackend};
use crate::config::{BackendKind, FtpConfig};
use crate::error::{StorageError, StorageResult};
use crate::validation::PathSegment;
use std::io::Read;
use std::net::{SocketAddr, ToSocketAddrs};
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream, Status};

#[derive(Debug)]
pub struct FtpBackend {
    config: FtpConfig,
}

impl FtpBackend {
    pub fn new(config: FtpConfig) -> Self {
        Self { config }
    }

    fn resolve(&self) -> StorageResult<SocketAddr> {
        let endpoint = self.config.endpoint();
        endpoint
            .to_socket_addrs()
            .map_err(|e| StorageError::Connect {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?
            .next()
            .ok_or_else(|| StorageError::Connect {
                endpoint: endpoint.clone(),
                reason: "host did not resolve to any address".into(),
            })
    }

    fn connect(&self) -> StorageResult<FtpStream> {
        let endpoint = self.config.endpoint();
        let connect_err = |e: FtpError| StorageError::Connect {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        };

        let addr = self.resolve()?;
        let mut stream =
            FtpStream::connect_timeout(addr, self.config.timeout).map_err(connect_err)?;

        let socket = stream.get_ref();
        socket
            .set_read_timeout(Some(self.config.timeout))
            .and_then(|_| socket.set_write_timeout(Some(self.config.timeout)))
            .map_err(|e| StorageError::Connect {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        if let Err(e) = stream.login(self.config.user.as_str(), self.config.password.as_str()) {
            tracing::warn!(
                endpoint = %endpoint,
                user = %self.config.user,
                "FTP login rejected: {}",
                e
            );
            let _ = stream.quit();
            return Err(StorageError::Auth {
                user: self.config.user.clone(),
                reason: e.to_string(),
            });
        }

        if let Err(e) = stream.transfer_type(FileType::Binary) {
            tracing::warn!(
                endpoint = %endpoint,
                "unable to switch FTP session to binary mode: {}",
                e
            );
            let _ = stream.quit();
            return Err(StorageError::Rejected {
                operation: "binary mode",
                reason: e.to_string(),
            });
        }

        Ok(stream)
    }
}

impl StorageBackend for FtpBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Ftp
    }

    fn location(&self) -> String {
        self.config.endpoint()
    }

    fn open(&self) -> StorageResult<Box<dyn ContainerSession>> {
        let mut stream = self.connect()?;
        let home = match stream.pwd() {
            Ok(home) => home,
            Err(e) => {
                let _ = stream.quit();
                return Err(session_error("working directory", e));
            }
        };
        tracing::debug!(endpoint = %self.config.endpoint(), home = %home, "FTP session opened");
        Ok(Box::new(FtpSession {
            stream,
            config: self.config.clone(),
            home,
        }))
    }
}

struct FtpSession {
    stream: FtpStream,
    config: FtpConfig,
    /// Login directory, used to anchor relative roots so paths stay valid after a `CWD`.
    home: String,
}

impl FtpSession {
    fn remote_path(&self, collection_id: &PathSegment) -> String {
        let path = self.config.container_path(collection_id.as_str());
        if path.starts_with('/') {
            path
        } else {
            format!("{}/{}", self.home.trim_end_matches('/'), path)
        }
    }
}

impl ContainerSession for FtpSession {
    fn select_container(&mut self, collection_id: &PathSegment) -> StorageResult<()> {
        let path = self.remote_path(collection_id);
        match self.stream.cwd(&path) {
            Ok(()) => Ok(()),
            Err(FtpError::UnexpectedResponse(resp))
                if matches!(resp.status, Status::FileUnavailable) =>
            {
                Err(StorageError::NotFound(collection_id.to_string()))
            }
            Err(e) => Err(session_error("select container", e)),
        }
    }

    fn create_container(&mut self, collection_id: &PathSegment) -> StorageResult<()> {
        let path = self.remote_path(collection_id);
        match self.stream.mkdir(&path) {
            Ok(()) => Ok(()),
            // Servers answer MKD on an existing directory with an error reply. If the
            // directory can be entered, it exists and creation is considered done.
            Err(FtpError::UnexpectedResponse(resp)) => {
                if self.stream.cwd(&path).is_ok() {
                    tracing::debug!(container = %path, "container already exists");
                    Ok(())
                } else {
                    Err(StorageError::Rejected {
                        operation: "create container",
                        reason: String::from_utf8_lossy(&resp.body).trim().to_string(),
                    })
                }
            }
            Err(e) => Err(session_error("create container", e)),
        }
    }

    fn store(&mut self, filename: &PathSegment, content: &mut dyn Read) -> StorageResult<u64> {
        let mut reader = content;
        self.stream
            .put_file(filename.as_str(), &mut reader)
            .map_err(|e| session_error("store", e))
    }
}

impl Drop for FtpSession {
    fn drop(&mut self) {
        if let Err(e) = self.stream.quit() {
            tracing::debug!(endpoint = %self.config.endpoint(), "FTP logout failed: {}", e);
        }
    }
}

fn session_error(operation: &'static str, e: FtpError) -> StorageError {
    match e {
        FtpError::ConnectionError(source) => StorageError::Io { operation, source },
        FtpError::UnexpectedResponse(resp) => StorageError::Rejected {
            operation,
            reason: format!(
                "{:?}: {}",
                resp.status,
                String::from_utf8_lossy(&resp.body).trim()
            ),
        },
        other => StorageError::Rejected {
            operation,
            reason: other.to_string(),
        },
    }
}
