//! Byte sources for inspection.
//!
//! Decoders work on an in-memory buffer; this module fills that buffer from
//! a local file or a remote URL, optionally stopping after a byte budget.

mod http;
mod local;

pub use http::HttpRangeReader;
pub use local::LocalFileReader;

use anyhow::{Result, bail};
use async_trait::async_trait;

/// Trait for random access reading from a data source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}

/// Load the first `limit` bytes of `reader` (all of it when `None`).
pub async fn read_prefix<R: ReadAt + ?Sized>(reader: &R, limit: Option<u64>) -> Result<Vec<u8>> {
    let len = limit.map_or(reader.size(), |l| l.min(reader.size()));
    let mut buf = vec![0u8; len as usize];

    let mut filled = 0usize;
    while filled < buf.len() {
        let n = reader.read_at(filled as u64, &mut buf[filled..]).await?;
        if n == 0 {
            bail!("source ended after {} of {} bytes", filled, len);
        }
        filled += n;
    }

    if len < reader.size() {
        log::info!("loaded {} of {} bytes", len, reader.size());
    }
    Ok(buf)
}
