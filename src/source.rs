//! Byte source and transport traits
//!
//! The board never talks HTTP itself. A [`Transport`] opens a URL and hands
//! back a [`ByteSource`] streaming the response body; feed readers pull
//! chunks from it until it reports end-of-stream with an empty read.

use crate::Result;

/// Streamed response body.
#[async_trait::async_trait]
pub trait ByteSource: Send {
    /// Read up to `max_bytes`.
    ///
    /// Returns:
    /// - `Ok(bytes)` with `bytes` non-empty - more data
    /// - `Ok(bytes)` with `bytes` empty - end of stream
    /// - `Err(e)` - transport failure or timeout
    async fn read(&mut self, max_bytes: usize) -> Result<Vec<u8>>;

    /// Release the underlying connection.
    ///
    /// Called exactly once per successful [`Transport::open`], on every path.
    async fn close(&mut self);
}

/// Opens byte sources for URLs.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Check the network link before a poll cycle.
    ///
    /// A failure here degrades the whole cycle to "no result" without
    /// attempting any fetch.
    async fn ensure_link(&mut self) -> Result<()> {
        Ok(())
    }

    /// Open a streamed GET for `url`. Non-success statuses are errors.
    async fn open(&mut self, url: &str) -> Result<Box<dyn ByteSource>>;
}

/// Consumes a byte source into a parsed result.
#[async_trait::async_trait]
pub trait FeedReader: Send + Sized {
    type Output: Send;

    async fn read_feed(self, source: &mut dyn ByteSource) -> Result<Self::Output>;
}

/// Open `url`, run `reader` over the body and close the source.
///
/// The source is closed whether or not `reader` succeeds.
pub async fn fetch_feed<R: FeedReader>(
    transport: &mut dyn Transport,
    url: &str,
    reader: R,
) -> Result<R::Output> {
    let mut source = transport.open(url).await?;
    let result = reader.read_feed(source.as_mut()).await;
    source.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoardError;
    use crate::sources::memory::MemoryTransport;

    struct FailingReader;

    #[async_trait::async_trait]
    impl FeedReader for FailingReader {
        type Output = ();

        async fn read_feed(self, source: &mut dyn ByteSource) -> Result<()> {
            let _ = source.read(4).await?;
            Err(BoardError::parse_error("test", "reader failed"))
        }
    }

    struct CountingReader;

    #[async_trait::async_trait]
    impl FeedReader for CountingReader {
        type Output = usize;

        async fn read_feed(self, source: &mut dyn ByteSource) -> Result<usize> {
            let mut total = 0;
            loop {
                let chunk = source.read(3).await?;
                if chunk.is_empty() {
                    return Ok(total);
                }
                total += chunk.len();
            }
        }
    }

    #[tokio::test]
    async fn source_closed_after_success() {
        let mut transport = MemoryTransport::new(2);
        transport.set_body("http://t/a", b"0123456789".to_vec());

        let count = fetch_feed(&mut transport, "http://t/a", CountingReader).await.unwrap();
        assert_eq!(count, 10);
        assert_eq!(transport.open_count(), 1);
        assert_eq!(transport.close_count(), 1);
    }

    #[tokio::test]
    async fn source_closed_after_reader_failure() {
        let mut transport = MemoryTransport::new(2);
        transport.set_body("http://t/a", b"{}".to_vec());

        let result = fetch_feed(&mut transport, "http://t/a", FailingReader).await;
        assert!(matches!(result, Err(BoardError::Parse { .. })));
        assert_eq!(transport.open_count(), 1);
        assert_eq!(transport.close_count(), 1);
    }

    #[tokio::test]
    async fn failed_open_has_nothing_to_close() {
        let mut transport = MemoryTransport::new(2);
        transport.set_status("http://t/a", 503);

        let result = fetch_feed(&mut transport, "http://t/a", CountingReader).await;
        assert!(matches!(result, Err(BoardError::Transport { status: Some(503), .. })));
        assert_eq!(transport.open_count(), 0);
        assert_eq!(transport.close_count(), 0);
    }
}
