//! Blocking HTTP fetches with per-request timeouts.
//!
//! Failures are not retried: a timeout or non-success status is returned
//! to the caller as a `Download` error.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use tracing::debug;

use crate::error::{LintError, Result};

/// Fetches release artifacts over HTTP/HTTPS.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    /// Create a downloader with the crate user agent.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("replicated-lint/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LintError::Other(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn get(&self, url: &str, timeout: Duration) -> Result<Response> {
        debug!("GET {} (timeout {:?})", url, timeout);
        let download_error = |message: String| LintError::Download {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| download_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(download_error(format!("HTTP {}", response.status())));
        }
        Ok(response)
    }

    /// Fetch a body fully into memory.
    pub fn fetch_bytes(&self, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        let response = self.get(url, timeout)?;
        let bytes = response.bytes().map_err(|e| LintError::Download {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }

    /// Fetch a body as text.
    pub fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self.get(url, timeout)?;
        response.text().map_err(|e| LintError::Download {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn fetches_bytes() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/archive.tar.gz");
            then.status(200).body("payload");
        });

        let downloader = Downloader::new().unwrap();
        let bytes = downloader
            .fetch_bytes(&server.url("/archive.tar.gz"), Duration::from_secs(5))
            .unwrap();
        assert_eq!(bytes, b"payload");
        mock.assert();
    }

    #[test]
    fn non_success_status_is_an_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let downloader = Downloader::new().unwrap();
        let err = downloader
            .fetch_text(&server.url("/missing"), Duration::from_secs(5))
            .unwrap_err();
        assert!(err.to_string().contains("404"));
        // No retry on failure.
        mock.assert_hits(1);
    }
}
