//! Transfer engine.
//!
//! Places one uploaded file into the container named after its collection id:
//!
//! 1. open a session on the storage backend
//! 2. enter the container; if it is missing, create it once and enter it again
//! 3. stream the content into the container under the given filename
//!
//! Only a not-found reply leads to creation. Any other failure to enter the container is a
//! connectivity problem and aborts the transfer before anything is created. The engine never
//! retries and never removes a partially written file.

use crate::backend::{ContainerSession, StorageBackend};
use crate::constants::STREAM_CHANNEL_CAPACITY;
use crate::error::{StorageError, TransferError, TransferResult};
use crate::stream;
use crate::validation::PathSegment;
use bytes::Bytes;
use futures::future::{self, Either};
use futures::Stream;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a successful transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub collection_id: String,
    pub filename: String,
    pub bytes_written: u64,
}

/// Stateless transfer engine over a configured storage backend.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone, Debug)]
pub struct TransferEngine {
    backend: Arc<dyn StorageBackend>,
    timeout: Duration,
}

impl TransferEngine {
    pub fn new(backend: Arc<dyn StorageBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Upper bound on one transfer, also used by callers to bound the whole request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Store `content` as `filename` in the container for `collection_id`, blocking the
    /// current thread until the write completes.
    ///
    /// # Errors
    ///
    /// - [`TransferError::InvalidName`] if either name is not a safe path segment. No
    ///   connection is opened in that case.
    /// - [`TransferError::Connection`] if the backend cannot be reached or rejects the login,
    ///   or if entering the container fails for a reason other than not-found.
    /// - [`TransferError::ContainerCreate`] if the container was missing and creating it failed.
    /// - [`TransferError::ContainerSelect`] if the container still cannot be entered after
    ///   being created.
    /// - [`TransferError::Write`] if the content could not be fully stored.
    pub fn transfer(
        &self,
        content: &mut dyn Read,
        filename: &str,
        collection_id: &str,
    ) -> TransferResult<TransferReceipt> {
        let collection = PathSegment::collection_id(collection_id)?;
        let file = PathSegment::filename(filename)?;

        let result = self.run(content, &file, &collection);
        match &result {
            Ok(receipt) => tracing::info!(
                collection_id = %collection,
                filename = %file,
                bytes = receipt.bytes_written,
                backend = %self.backend.kind(),
                "file stored"
            ),
            Err(e) => tracing::error!(
                collection_id = %collection,
                filename = %file,
                stage = e.stage(),
                backend = %self.backend.kind(),
                "transfer failed: {}",
                e
            ),
        }
        result
    }

    fn run(
        &self,
        content: &mut dyn Read,
        file: &PathSegment,
        collection: &PathSegment,
    ) -> TransferResult<TransferReceipt> {
        // The session is released when it goes out of scope, on every path out of this fn.
        let mut session = self.backend.open().map_err(TransferError::Connection)?;

        enter_container(session.as_mut(), collection)?;

        let bytes_written =
            session
                .store(file, content)
                .map_err(|source| TransferError::Write {
                    filename: file.to_string(),
                    source,
                })?;

        Ok(TransferReceipt {
            collection_id: collection.to_string(),
            filename: file.to_string(),
            bytes_written,
        })
    }

    /// Async variant of [`transfer`](Self::transfer) for a streamed body.
    ///
    /// Names are validated before anything else happens. The blocking write runs on the
    /// blocking thread pool while `content` is forwarded to it through a bounded channel, so
    /// memory use does not grow with the size of the upload. The whole operation is bounded
    /// by the configured request timeout; on expiry the transfer is abandoned and
    /// [`TransferError::Timeout`] is returned. The abandoned write then fails on its own
    /// rather than completing with truncated content.
    pub async fn transfer_stream<S, E>(
        &self,
        content: S,
        filename: &str,
        collection_id: &str,
    ) -> TransferResult<TransferReceipt>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        PathSegment::collection_id(collection_id)?;
        PathSegment::filename(filename)?;

        let (tx, mut reader) = stream::channel(STREAM_CHANNEL_CAPACITY);
        let engine = self.clone();
        let filename_owned = filename.to_owned();
        let collection_owned = collection_id.to_owned();

        let write = tokio::task::spawn_blocking(move || {
            engine.transfer(&mut reader, &filename_owned, &collection_owned)
        });

        let work = async {
            // The writer decides the outcome. Once it has finished (stored or failed), the
            // rest of the body is not needed.
            let pump = Box::pin(stream::pump(content, tx));
            let joined = match future::select(write, pump).await {
                Either::Left((joined, _)) => joined,
                Either::Right(((), write)) => write.await,
            };
            match joined {
                Ok(result) => result,
                Err(e) => Err(TransferError::Aborted(e.to_string())),
            }
        };

        match tokio::time::timeout(self.timeout, work).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    collection_id = %collection_id,
                    filename = %filename,
                    stage = "timeout",
                    "transfer abandoned after {:?}",
                    self.timeout
                );
                Err(TransferError::Timeout(self.timeout))
            }
        }
    }
}

/// Enter the container, creating it once if it does not exist.
fn enter_container(
    session: &mut dyn ContainerSession,
    collection: &PathSegment,
) -> TransferResult<()> {
    match session.select_container(collection) {
        Ok(()) => return Ok(()),
        Err(StorageError::NotFound(_)) => {
            tracing::info!(
                collection_id = %collection,
                "container does not exist - attempting to create"
            );
        }
        Err(e) => return Err(TransferError::Connection(e)),
    }

    session
        .create_container(collection)
        .map_err(|source| TransferError::ContainerCreate {
            container: collection.to_string(),
            source,
        })?;

    session
        .select_container(collection)
        .map_err(|source| TransferError::ContainerSelect {
            container: collection.to_string(),
            source,
        })
}
