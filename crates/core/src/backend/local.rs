//! Local filesystem binding.
//!
//! Containers are directories directly below the configured root:
//!
//! ```text
//! <root>/
//! └── <collection_id>/
//!     ├── report.csv
//!     └── …
//! ```
//!
//! The root itself is created on demand together with the first container.

use super::{ContainerSession, StorageBackend};
use crate::config::{BackendKind, LocalConfig};
use crate::error::{StorageError, StorageResult};
use crate::validation::PathSegment;
use std::fs;
use std::io::{self, BufWriter, Read};
use std::path::PathBuf;

#[derive(Debug)]
pub struct LocalBackend {
    config: LocalConfig,
}

impl LocalBackend {
    pub fn new(config: LocalConfig) -> Self {
        Self { config }
    }
}

impl StorageBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn location(&self) -> String {
        self.config.root().display().to_string()
    }

    /// The filesystem is reachable when the root exists as a directory, or does not exist yet
    /// but its parent does (the root will be created with the first container).
    fn open(&self) -> StorageResult<Box<dyn ContainerSession>> {
        let root = self.config.root();
        match fs::metadata(root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(StorageError::Connect {
                    endpoint: self.location(),
                    reason: "storage root is not a directory".into(),
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let parent_ok = root
                    .parent()
                    .map(|p| p.as_os_str().is_empty() || p.is_dir())
                    .unwrap_or(false);
                if !parent_ok {
                    return Err(StorageError::Connect {
                        endpoint: self.location(),
                        reason: "storage root and its parent do not exist".into(),
                    });
                }
            }
            Err(e) => {
                return Err(StorageError::Connect {
                    endpoint: self.location(),
                    reason: e.to_string(),
                })
            }
        }

        Ok(Box::new(LocalSession {
            root: root.to_path_buf(),
            selected: None,
        }))
    }
}

#[derive(Debug)]
struct LocalSession {
    root: PathBuf,
    selected: Option<PathBuf>,
}

impl ContainerSession for LocalSession {
    fn select_container(&mut self, collection_id: &PathSegment) -> StorageResult<()> {
        let dir = self.root.join(collection_id);
        match fs::metadata(&dir) {
            Ok(meta) if meta.is_dir() => {
                self.selected = Some(dir);
                Ok(())
            }
            // A plain file in the container's place is treated as a missing container; the
            // follow-up creation then fails and reports the conflict.
            Ok(_) => Err(StorageError::NotFound(collection_id.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(collection_id.to_string()))
            }
            Err(source) => Err(StorageError::Io {
                operation: "select container",
                source,
            }),
        }
    }

    fn create_container(&mut self, collection_id: &PathSegment) -> StorageResult<()> {
        // create_dir_all succeeds when the directory already exists, including when a
        // concurrent upload created it between our check and this call.
        fs::create_dir_all(self.root.join(collection_id)).map_err(|source| StorageError::Io {
            operation: "create container",
            source,
        })
    }

    fn store(&mut self, filename: &PathSegment, content: &mut dyn Read) -> StorageResult<u64> {
        let dir = self.selected.as_ref().ok_or_else(|| StorageError::Rejected {
            operation: "store",
            reason: "no container selected".into(),
        })?;

        let io_err = |source| StorageError::Io {
            operation: "store",
            source,
        };

        let file = fs::File::create(dir.join(filename)).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        let written = io::copy(content, &mut writer).map_err(io_err)?;
        let file = writer.into_inner().map_err(|e| io_err(e.into_error()))?;
        file.sync_all().map_err(io_err)?;

        Ok(written)
    }
}
