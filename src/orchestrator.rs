use crate::{
    error::Result,
    fetch::BlobFetcher,
    logger,
    models::storage::{FileBlob, UploadOutcome, UploadReport},
    storage::ContentStorageManager,
};
use std::sync::Arc;

/// What is available for upload at the moment the user asks for it.
#[derive(Debug, Clone, Default)]
pub struct UploadSources {
    pub image_url: Option<String>,
    pub audio: Option<FileBlob>,
}

pub struct UploadOrchestrator {
    fetcher: Arc<dyn BlobFetcher>,
    storage: Arc<ContentStorageManager>,
}

impl UploadOrchestrator {
    pub fn new(fetcher: Arc<dyn BlobFetcher>, storage: Arc<ContentStorageManager>) -> Self {
        Self { fetcher, storage }
    }

    /// Never fails: each source ends up stored, skipped or failed on its own.
    pub async fn upload(&self, sources: &UploadSources) -> UploadReport {
        let _timer = logger::timer("upload");

        let image = match sources.image_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => Self::outcome("image", self.upload_image(url).await),
            None => UploadOutcome::Skipped,
        };

        let audio = match &sources.audio {
            Some(blob) => Self::outcome("audio", self.storage.store(blob).await),
            None => UploadOutcome::Skipped,
        };

        UploadReport { image, audio }
    }

    pub async fn health_check(&self) -> Result<bool> {
        self.storage.health_check().await
    }

    async fn upload_image(&self, url: &str) -> Result<String> {
        let bytes = self.fetcher.fetch(url).await?;
        let file = FileBlob::generated_image(bytes);
        self.storage.store(&file).await
    }

    fn outcome(kind: &str, result: Result<String>) -> UploadOutcome {
        match result {
            Ok(hash) => UploadOutcome::Stored { hash },
            Err(e) => {
                log::error!("Uploading {} failed: {}", kind, e);
                UploadOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
