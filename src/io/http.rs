use async_trait::async_trait;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, HeaderMap, RANGE};
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use url::Url;

use super::ReadAt;
use anyhow::{Result, anyhow, bail};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ATTEMPTS: u32 = 10;
const RETRY_STEP: Duration = Duration::from_millis(500);

/// Reads a remote file through HTTP `Range` requests.
///
/// Only the requested windows are downloaded, so inspecting the head of a
/// large remote file with a byte budget transfers just that prefix.
pub struct HttpRangeReader {
    client: Client,
    url: Url,
    size: u64,
    transferred_bytes: AtomicU64,
}

impl HttpRangeReader {
    /// Probe `url` with a HEAD request for its size and range support.
    pub async fn new(url: String) -> Result<Self> {
        let url = Url::parse(&url)?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("{}: only http and https URLs can be read", url);
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let resp = client.head(url.clone()).send().await?;
        if !resp.status().is_success() {
            bail!("HEAD {} failed with status: {}", url, resp.status());
        }
        let size = probe(&url, resp.headers())?;
        log::debug!("{}: {} bytes, ranges supported", url, size);

        Ok(Self {
            client,
            url,
            size,
            transferred_bytes: AtomicU64::new(0),
        })
    }

    /// Bytes received so far across all requests.
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }

    /// GET the inclusive byte range `start..=end`, retrying on timeouts and
    /// connection failures with a growing delay.
    async fn fetch(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        let range = format!("bytes={}-{}", start, end);
        let mut attempt = 1;
        loop {
            let sent = self
                .client
                .get(self.url.clone())
                .header(RANGE, &range)
                .send()
                .await;
            match sent {
                Ok(resp) if resp.status() == StatusCode::PARTIAL_CONTENT => {
                    return Ok(resp.bytes().await?.to_vec());
                }
                Ok(resp) => bail!("GET {} ({}) failed with status: {}", self.url, range, resp.status()),
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < MAX_ATTEMPTS => {
                    log::warn!("{}: {} (attempt {}/{})", self.url, e, attempt, MAX_ATTEMPTS);
                    tokio::time::sleep(RETRY_STEP * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(anyhow!("GET {} ({}): {}", self.url, range, e)),
            }
        }
    }
}

/// Size of the resource, provided the server honours byte ranges.
fn probe(url: &Url, headers: &HeaderMap) -> Result<u64> {
    let header = |name| headers.get(name).and_then(|v| v.to_str().ok());

    if !header(ACCEPT_RANGES).is_some_and(|v| v.contains("bytes")) {
        bail!("{} does not support Range requests", url);
    }
    header(CONTENT_LENGTH)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| anyhow!("{} did not return Content-Length", url))
}

#[async_trait]
impl ReadAt for HttpRangeReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || offset >= self.size {
            return Ok(0);
        }
        let end = (offset + buf.len() as u64).min(self.size) - 1;
        let wanted = (end - offset + 1) as usize;

        let mut received = 0;
        while received < wanted {
            let bytes = self.fetch(offset + received as u64, end).await?;
            if bytes.is_empty() {
                break;
            }
            let n = bytes.len().min(wanted - received);
            buf[received..received + n].copy_from_slice(&bytes[..n]);
            received += n;
            self.transferred_bytes.fetch_add(n as u64, Ordering::Relaxed);
        }
        Ok(received)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(reqwest::header::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn probe_reads_size_when_ranges_supported() {
        let url = Url::parse("https://example.com/a.mp3").unwrap();
        let map = headers(&[(ACCEPT_RANGES, "bytes"), (CONTENT_LENGTH, "4096")]);
        assert_eq!(probe(&url, &map).unwrap(), 4096);
    }

    #[test]
    fn probe_rejects_missing_ranges_or_length() {
        let url = Url::parse("https://example.com/a.zip").unwrap();
        assert!(probe(&url, &headers(&[(CONTENT_LENGTH, "10")])).is_err());
        assert!(probe(&url, &headers(&[(ACCEPT_RANGES, "none"), (CONTENT_LENGTH, "10")])).is_err());
        assert!(probe(&url, &headers(&[(ACCEPT_RANGES, "bytes")])).is_err());
    }
}
