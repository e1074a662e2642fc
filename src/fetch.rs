use crate::{
    config::Config,
    error::{MintError, Result},
};
use async_trait::async_trait;
use reqwest::Client;

/// Largest body `HttpBlobFetcher` will read before giving up.
pub const MAX_FETCH_BYTES: u64 = 50 * 1024 * 1024;

#[async_trait]
pub trait BlobFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Clone)]
pub struct HttpBlobFetcher {
    client: Client,
    max_bytes: u64,
}

impl HttpBlobFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| MintError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            max_bytes: MAX_FETCH_BYTES,
        })
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn too_large(&self, url: &str, len: u64) -> MintError {
        MintError::ResponseError(format!(
            "{} is {} bytes, over the {} byte limit",
            url, len, self.max_bytes
        ))
    }
}

#[async_trait]
impl BlobFetcher for HttpBlobFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MintError::RequestError(format!("Fetching {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MintError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        if let Some(len) = response.content_length() {
            if len > self.max_bytes {
                return Err(self.too_large(url, len));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MintError::ResponseError(format!("Reading {} failed: {}", url, e)))?;

        // Chunked responses carry no length header.
        if bytes.len() as u64 > self.max_bytes {
            return Err(self.too_large(url, bytes.len() as u64));
        }

        Ok(bytes.to_vec())
    }
}
