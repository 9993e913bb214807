//! In-memory transport that replays fixed response bodies

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, trace};

use crate::source::{ByteSource, Transport};
use crate::{BoardError, Result};

#[derive(Debug, Clone)]
enum Route {
    Body(Arc<[u8]>),
    Status(u16),
    Unreachable(String),
}

#[derive(Debug, Default)]
struct Shared {
    routes: Mutex<HashMap<String, Route>>,
    link_error: Mutex<Option<String>>,
    requests: Mutex<Vec<String>>,
    opens: AtomicUsize,
    closes: AtomicUsize,
}

/// URL-routed replay transport.
///
/// Clones share routes and counters, so a test can keep a handle while the
/// board owns another and swap bodies between poll cycles.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    chunk_size: usize,
    shared: Arc<Shared>,
}

impl MemoryTransport {
    /// Create a transport that delivers bodies in chunks of at most `chunk_size` bytes.
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size: chunk_size.max(1), shared: Arc::new(Shared::default()) }
    }

    /// Serve `body` for `url`.
    pub fn set_body(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        let body: Vec<u8> = body.into();
        lock(&self.shared.routes).insert(url.into(), Route::Body(body.into()));
    }

    /// Answer `url` with a non-success HTTP status.
    pub fn set_status(&self, url: impl Into<String>, status: u16) {
        lock(&self.shared.routes).insert(url.into(), Route::Status(status));
    }

    /// Fail `url` at the connection level.
    pub fn set_unreachable(&self, url: impl Into<String>, reason: impl Into<String>) {
        lock(&self.shared.routes).insert(url.into(), Route::Unreachable(reason.into()));
    }

    /// Take the link down (`Some`) or bring it back (`None`).
    pub fn set_link_error(&self, reason: Option<&str>) {
        *lock(&self.shared.link_error) = reason.map(str::to_string);
    }

    /// Sources opened successfully.
    pub fn open_count(&self) -> usize {
        self.shared.opens.load(Ordering::SeqCst)
    }

    /// Sources closed.
    pub fn close_count(&self) -> usize {
        self.shared.closes.load(Ordering::SeqCst)
    }

    /// Every URL requested, including failed ones, in order.
    pub fn requests(&self) -> Vec<String> {
        lock(&self.shared.requests).clone()
    }

    /// Number of requests made, including failed ones.
    pub fn request_count(&self) -> usize {
        lock(&self.shared.requests).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait::async_trait]
impl Transport for MemoryTransport {
    async fn ensure_link(&mut self) -> Result<()> {
        match lock(&self.shared.link_error).as_ref() {
            Some(reason) => Err(BoardError::link_down(reason.clone())),
            None => Ok(()),
        }
    }

    async fn open(&mut self, url: &str) -> Result<Box<dyn ByteSource>> {
        lock(&self.shared.requests).push(url.to_string());
        let route = lock(&self.shared.routes).get(url).cloned();
        match route {
            Some(Route::Body(body)) => {
                self.shared.opens.fetch_add(1, Ordering::SeqCst);
                debug!(url, bytes = body.len(), "Opened replay body");
                Ok(Box::new(MemorySource {
                    body,
                    position: 0,
                    chunk_size: self.chunk_size,
                    shared: Arc::clone(&self.shared),
                    closed: false,
                }))
            }
            Some(Route::Status(status)) => Err(BoardError::http_status(url, status)),
            Some(Route::Unreachable(reason)) => Err(BoardError::transport_failed(url, reason)),
            None => Err(BoardError::http_status(url, 404)),
        }
    }
}

/// Chunked reader over a shared body.
pub struct MemorySource {
    body: Arc<[u8]>,
    position: usize,
    chunk_size: usize,
    shared: Arc<Shared>,
    closed: bool,
}

impl MemorySource {
    /// A standalone source over `body`, not tied to any transport.
    pub fn new(body: impl Into<Vec<u8>>, chunk_size: usize) -> Self {
        let body: Vec<u8> = body.into();
        Self {
            body: body.into(),
            position: 0,
            chunk_size: chunk_size.max(1),
            shared: Arc::new(Shared::default()),
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait::async_trait]
impl ByteSource for MemorySource {
    async fn read(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        let take = max_bytes.min(self.chunk_size).min(self.body.len() - self.position);
        let chunk = self.body[self.position..self.position + take].to_vec();
        self.position += take;
        trace!(bytes = take, remaining = self.body.len() - self.position, "Replayed chunk");
        Ok(chunk)
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.shared.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_chunks() {
        let mut source = MemorySource::new(b"abcdefg".to_vec(), 3);
        assert_eq!(source.read(10).await.unwrap(), b"abc");
        assert_eq!(source.read(2).await.unwrap(), b"de");
        assert_eq!(source.read(10).await.unwrap(), b"fg");
        assert!(source.read(10).await.unwrap().is_empty());
        source.close().await;
        assert!(source.is_closed());
    }

    #[tokio::test]
    async fn routes_statuses_and_link() {
        let mut transport = MemoryTransport::new(4);
        transport.set_status("http://t/down", 500);
        transport.set_unreachable("http://t/gone", "timed out");

        assert!(matches!(
            transport.open("http://t/down").await,
            Err(BoardError::Transport { status: Some(500), .. })
        ));
        assert!(matches!(
            transport.open("http://t/gone").await,
            Err(BoardError::Transport { status: None, .. })
        ));
        assert!(matches!(
            transport.open("http://t/missing").await,
            Err(BoardError::Transport { status: Some(404), .. })
        ));
        assert_eq!(transport.request_count(), 3);
        assert_eq!(transport.open_count(), 0);

        assert!(transport.ensure_link().await.is_ok());
        transport.set_link_error(Some("no ip"));
        assert!(matches!(transport.ensure_link().await, Err(BoardError::Link { .. })));
    }

    #[tokio::test]
    async fn clones_share_routes() {
        let handle = MemoryTransport::new(4);
        let mut owned = handle.clone();
        handle.set_body("http://t/a", b"[]".to_vec());
        let mut source = owned.open("http://t/a").await.unwrap();
        source.close().await;
        assert_eq!(handle.open_count(), 1);
        assert_eq!(handle.close_count(), 1);
        assert_eq!(handle.requests(), vec!["http://t/a".to_string()]);
    }
}
