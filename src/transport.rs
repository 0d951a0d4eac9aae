use std::pin::Pin;
use std::time::Duration;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, ACCEPT_RANGES, CONTENT_LENGTH, RANGE};
use crate::error::{DownloadError, Result};

/// What a header-only probe learned about the resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Total length in bytes, `None` when the server reports none.
    pub total_length: Option<u64>,
    /// Whether the server advertises `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
}

impl ResourceInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let total_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());
        let accept_ranges = headers
            .get(ACCEPT_RANGES)
            .map(|value| value.as_bytes().eq(b"bytes"))
            .unwrap_or(false);
        Self {
            total_length,
            accept_ranges,
        }
    }
}

/// Response body delivered as a sequence of byte chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// The HTTP collaborator: one probe primitive, one (possibly ranged) fetch
/// primitive. Kept behind a trait so tests can substitute an in-memory
/// transport for the real client.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Issues a header-only request and reports length and range support.
    async fn probe(&self, url: &str) -> Result<ResourceInfo>;

    /// Starts a GET, restricted to the inclusive byte range when one is
    /// given, and hands back the body as a chunk stream.
    async fn fetch(&self, url: &str, range: Option<(u64, u64)>) -> Result<BodyStream>;
}

/// `reqwest`-backed transport. Redirects are followed on every request.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds the underlying client. A zero timeout means no deadline.
    pub fn new(timeout_secs: u64) -> Result<HttpTransport> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("segfetch/", env!("CARGO_PKG_VERSION")));
        if timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        match builder.build() {
            Ok(client) => Ok(HttpTransport { client }),
            Err(e) => Err(DownloadError::Client(e.to_string())),
        }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn probe(&self, url: &str) -> Result<ResourceInfo> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| DownloadError::Probe(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status.as_u16()));
        }
        Ok(ResourceInfo::from_headers(response.headers()))
    }

    async fn fetch(&self, url: &str, range: Option<(u64, u64)>) -> Result<BodyStream> {
        let mut request = self.client.get(url);
        if let Some((start, end)) = range {
            request = request.header(RANGE, format!("bytes={}-{}", start, end));
        }
        let response = request
            .send()
            .await
            .map_err(|e| DownloadError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status.as_u16()));
        }
        let body = response.bytes_stream().map(|chunk| match chunk {
            Ok(bytes) => Ok(bytes.to_vec()),
            Err(e) => Err(DownloadError::Request(e.to_string())),
        });
        Ok(Box::pin(body))
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;
    use super::*;

    #[test]
    fn parses_length_and_range_support() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("1048576"));
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        let info = ResourceInfo::from_headers(&headers);
        assert_eq!(info.total_length, Some(1_048_576));
        assert!(info.accept_ranges);
    }

    #[test]
    fn missing_length_reads_as_unknown() {
        let info = ResourceInfo::from_headers(&HeaderMap::new());
        assert_eq!(info.total_length, None);
        assert!(!info.accept_ranges);
    }

    #[test]
    fn garbage_length_reads_as_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("a lot"));
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static("none"));
        let info = ResourceInfo::from_headers(&headers);
        assert_eq!(info.total_length, None);
        assert!(!info.accept_ranges);
    }
}
