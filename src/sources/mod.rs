//! Byte source implementations

pub mod memory;
pub mod stream;

pub use memory::{MemorySource, MemoryTransport};
pub use stream::StreamSource;
