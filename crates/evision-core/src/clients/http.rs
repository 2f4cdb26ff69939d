//! PDF download over HTTP

use crate::error::{EvisionError, Result};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::path::Path;
use std::time::Duration;

/// Fetches a URL into a file
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` with `headers` and write the body to `dest`, returning its size
    async fn fetch(&self, url: &str, headers: &[(String, String)], dest: &Path) -> Result<u64>;
}

pub struct HttpFetcher {
    http_client: HttpClient,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http_client })
    }
}

/// True when the data starts with the PDF magic bytes
pub fn looks_like_pdf(data: &[u8]) -> bool {
    data.starts_with(b"%PDF")
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, headers: &[(String, String)], dest: &Path) -> Result<u64> {
        let mut request = self.http_client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(EvisionError::Download(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        if !looks_like_pdf(&bytes) {
            log::warn!(
                "Response for {} does not look like a PDF ({} bytes)",
                dest.display(),
                bytes.len()
            );
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &bytes).await?;
        Ok(bytes.len() as u64)
    }
}
