pub mod ipfs;
pub mod traits;

use crate::{
    config::Config,
    error::{MintError, Result},
    models::storage::FileBlob,
};
use std::sync::Arc;

pub use ipfs::IpfsClient;
pub use traits::ContentStore;

pub struct ContentStorageManager {
    backend: Arc<dyn ContentStore>,
}

impl ContentStorageManager {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_backend(Arc::new(IpfsClient::new(config)?)))
    }

    pub fn with_backend(backend: Arc<dyn ContentStore>) -> Self {
        Self { backend }
    }

    pub fn storage(&self) -> &Arc<dyn ContentStore> {
        &self.backend
    }

    /// Uploads a file and returns its content hash. Input that is not
    /// file-like is rejected without touching the network.
    pub async fn store(&self, blob: &FileBlob) -> Result<String> {
        if !blob.is_file_like() {
            log::warn!(
                "Refusing to upload '{}' ({}): not a file",
                blob.name,
                blob.mime_type
            );
            return Err(MintError::InvalidInput(format!(
                "'{}' with type '{}' is not a file",
                blob.name, blob.mime_type
            )));
        }

        log::info!(
            "Uploading {} ({}, {} bytes) to IPFS",
            blob.name,
            blob.mime_type,
            blob.len()
        );

        let results = self.backend.add(blob).await.map_err(|e| {
            log::error!("IPFS upload of {} failed: {}", blob.name, e);
            e
        })?;

        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| MintError::ResponseError("IPFS add returned no entries".into()))?;

        log::info!("Stored {} as {}", blob.name, first.hash);
        Ok(first.hash)
    }

    pub async fn health_check(&self) -> Result<bool> {
        self.backend.health_check().await
    }
}
