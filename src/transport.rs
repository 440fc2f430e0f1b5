// src/transport.rs

use crate::error::DownloadError;
use crate::models::Range;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, RANGE};
use reqwest::{Client, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Fetches one byte range of a remote resource into a file.
#[async_trait]
pub trait RangeFetcher: Send + Sync {
    /// Returns the number of bytes written to `destination`.
    async fn fetch(
        &self,
        url: &str,
        range: &Range,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64, DownloadError>;
}

/// `RangeFetcher` over HTTP: one GET with a `Range` header per call.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RangeFetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        range: &Range,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64, DownloadError> {
        let resp = tokio::select! {
            _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
            resp = self.client.get(url).header(RANGE, range.header_value()).send() => resp?,
        };
        // A 200 would carry the whole body, not this worker's slice.
        if resp.status() != StatusCode::PARTIAL_CONTENT {
            return Err(DownloadError::Status(resp.status()));
        }

        let mut file = File::create(destination).await?;
        let mut stream = resp.bytes_stream();
        let mut written = 0u64;
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
                next = stream.next() => next,
            };
            let Some(chunk) = next else { break };
            let bytes = chunk?;
            file.write_all(&bytes).await?;
            written += bytes.len() as u64;
            trace!(worker = range.worker(), written, "chunk written");
        }
        file.flush().await?;

        debug!(
            worker = range.worker(),
            low = range.low(),
            high = range.high(),
            written,
            "range fetched"
        );
        Ok(written)
    }
}

/// Asks the server for the resource size and checks it serves byte ranges.
/// The whole HEAD request is bounded by `timeout`.
pub async fn probe(client: &Client, url: &str, timeout: Duration) -> Result<u64, DownloadError> {
    let resp = client
        .head(url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?;

    let accepts_ranges = resp
        .headers()
        .get(ACCEPT_RANGES)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("bytes"))
        .unwrap_or(false);
    if !accepts_ranges {
        return Err(DownloadError::RangesUnsupported);
    }

    let size = resp
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or(DownloadError::MissingContentLength)?;
    debug!(url, size, "probed remote size");
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn probe_reads_content_length() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/file.bin"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Accept-Ranges", "bytes")
                    .set_body_bytes(vec![0u8; 1234]),
            )
            .mount(&server)
            .await;

        let size = probe(&Client::new(), &format!("{}/file.bin", server.uri()), TIMEOUT)
            .await
            .unwrap();
        assert_eq!(size, 1234);
    }

    #[tokio::test]
    async fn probe_rejects_servers_without_range_support() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 10]))
            .mount(&server)
            .await;

        let err = probe(&Client::new(), &format!("{}/file.bin", server.uri()), TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::RangesUnsupported));
    }

    #[tokio::test]
    async fn stalled_head_request_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Accept-Ranges", "bytes")
                    .set_body_bytes(vec![0u8; 10])
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let started = std::time::Instant::now();
        let err = probe(
            &Client::new(),
            &format!("{}/file.bin", server.uri()),
            Duration::from_millis(200),
        )
        .await
        .unwrap_err();
        assert!(matches!(&err, DownloadError::Network(e) if e.is_timeout()), "{err:?}");
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn fetch_writes_the_requested_slice() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/file.bin"))
            .and(header("Range", "bytes=3-5"))
            .respond_with(ResponseTemplate::new(206).set_body_bytes(b"def".to_vec()))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("part");

        let fetcher = HttpFetcher::new(Client::new());
        let written = fetcher
            .fetch(
                &format!("{}/file.bin", server.uri()),
                &Range::new(3, 5, 1),
                &dest,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(written, 3);
        assert_eq!(std::fs::read(&dest).unwrap(), b"def");
    }

    #[tokio::test]
    async fn fetch_rejects_a_full_body_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abcdef".to_vec()))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();

        let err = HttpFetcher::new(Client::new())
            .fetch(
                &format!("{}/file.bin", server.uri()),
                &Range::new(0, 2, 0),
                &dir.path().join("part"),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::Status(StatusCode::OK)));
    }

    #[tokio::test]
    async fn fetch_stops_when_cancelled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(206)
                    .set_body_bytes(b"abc".to_vec())
                    .set_delay(std::time::Duration::from_secs(30)),
            )
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = HttpFetcher::new(Client::new())
            .fetch(
                &format!("{}/file.bin", server.uri()),
                &Range::new(0, 2, 0),
                &dir.path().join("part"),
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
