//! Bridge from an async chunk stream to a blocking [`Read`].
//!
//! The HTTP layer produces the upload body as an async stream, while both storage bindings
//! write through blocking I/O. [`pump`] forwards chunks into a bounded channel from the async
//! side and [`ChannelReader`] drains it on a blocking thread. The channel bound caps how much
//! of the body is held in memory at once.
//!
//! The producer sends an explicit end marker after the last chunk. A channel that closes
//! without one means the producer was dropped (request timeout or client gone) and the
//! reader reports `UnexpectedEof`, so a truncated body is never stored as a complete file.

use bytes::{Buf, Bytes};
use futures::{Stream, StreamExt};
use std::io::{self, Read};
use tokio::sync::mpsc;

pub(crate) enum Chunk {
    Data(Bytes),
    Failed(io::Error),
    End,
}

/// Create a connected producer/reader pair holding at most `capacity` chunks in flight.
pub(crate) fn channel(capacity: usize) -> (mpsc::Sender<Chunk>, ChannelReader) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        tx,
        ChannelReader {
            rx,
            current: Bytes::new(),
            finished: false,
        },
    )
}

/// Forward every chunk of `stream` into `tx`, then the end marker.
///
/// Stops early when the reader has gone away or the stream yields an error; the error is
/// passed on to the reader.
pub(crate) async fn pump<S, E>(stream: S, tx: mpsc::Sender<Chunk>)
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut stream = std::pin::pin!(stream);
    while let Some(item) = stream.next().await {
        let (chunk, last) = match item {
            Ok(bytes) if bytes.is_empty() => continue,
            Ok(bytes) => (Chunk::Data(bytes), false),
            Err(e) => (Chunk::Failed(io::Error::other(e)), true),
        };
        if tx.send(chunk).await.is_err() || last {
            return;
        }
    }
    let _ = tx.send(Chunk::End).await;
}

/// Blocking reader over chunks received from [`pump`].
///
/// Must only be read from outside the async runtime (e.g. inside `spawn_blocking`).
pub(crate) struct ChannelReader {
    rx: mpsc::Receiver<Chunk>,
    current: Bytes,
    finished: bool,
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if !self.current.is_empty() {
                let n = buf.len().min(self.current.len());
                buf[..n].copy_from_slice(&self.current[..n]);
                self.current.advance(n);
                return Ok(n);
            }

            if self.finished {
                return Ok(0);
            }

            match self.rx.blocking_recv() {
                Some(Chunk::Data(bytes)) => self.current = bytes,
                Some(Chunk::End) => self.finished = true,
                Some(Chunk::Failed(e)) => return Err(e),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "upload stream ended before completion",
                    ))
                }
            }
        }
    }
}
