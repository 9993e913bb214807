//! Adapter from a chunk stream to a [`ByteSource`]
//!
//! Streaming HTTP clients expose bodies as a `Stream` of byte chunks whose
//! sizes they choose. [`StreamSource`] re-chunks that stream so readers see at
//! most `max_bytes` per read.

use futures::{Stream, StreamExt};
use tracing::trace;

use crate::source::ByteSource;
use crate::{BoardError, Result};

/// Byte source over any `Stream` of body chunks.
pub struct StreamSource<S> {
    stream: Option<S>,
    url: String,
    pending: Vec<u8>,
    offset: usize,
}

impl<S> StreamSource<S>
where
    S: Stream<Item = std::io::Result<Vec<u8>>> + Send + Unpin,
{
    /// Wrap `stream`; `url` is used for error context only.
    pub fn new(url: impl Into<String>, stream: S) -> Self {
        Self { stream: Some(stream), url: url.into(), pending: Vec::new(), offset: 0 }
    }
}

#[async_trait::async_trait]
impl<S> ByteSource for StreamSource<S>
where
    S: Stream<Item = std::io::Result<Vec<u8>>> + Send + Unpin,
{
    async fn read(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        while self.offset >= self.pending.len() {
            let Some(stream) = self.stream.as_mut() else {
                return Ok(Vec::new());
            };
            match stream.next().await {
                // Empty chunks would read as end-of-stream downstream
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => {
                    self.pending = chunk;
                    self.offset = 0;
                }
                Some(Err(e)) => {
                    self.stream = None;
                    return Err(BoardError::transport_failed_with_source(
                        self.url.clone(),
                        "body read failed",
                        Box::new(e),
                    ));
                }
                None => {
                    self.stream = None;
                    return Ok(Vec::new());
                }
            }
        }

        let end = self.pending.len().min(self.offset + max_bytes.max(1));
        let chunk = self.pending[self.offset..end].to_vec();
        self.offset = end;
        trace!(url = %self.url, bytes = chunk.len(), "Stream chunk");
        Ok(chunk)
    }

    async fn close(&mut self) {
        self.stream = None;
        self.pending.clear();
        self.offset = 0;
    }
}
