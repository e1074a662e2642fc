use crate::{
    config::Config,
    error::{MintError, Result},
    fetch::HttpBlobFetcher,
    logger,
    models::{
        audio_mime_for_path, parse_image_count, FileBlob, ImageGenerationRequest, UploadReport,
        DEFAULT_IMAGE_SIZE,
    },
    openai::{ImageClient, ImageGenerator},
    orchestrator::{UploadOrchestrator, UploadSources},
    storage::ContentStorageManager,
};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct SessionState {
    prompt: String,
    count: String,
    size: String,
    audio: Option<FileBlob>,
    image_url: Option<String>,
    image_hash: Option<String>,
    audio_hash: Option<String>,
    // Bumped whenever the source behind a hash changes.
    image_epoch: u64,
    audio_epoch: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            count: "1".to_string(),
            size: DEFAULT_IMAGE_SIZE.to_string(),
            audio: None,
            image_url: None,
            image_hash: None,
            audio_hash: None,
            image_epoch: 0,
            audio_epoch: 0,
        }
    }
}

/// Read-only view of a session, safe to print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub prompt: String,
    pub count: String,
    pub size: String,
    pub audio_name: Option<String>,
    pub image_url: Option<String>,
    pub image_hash: Option<String>,
    pub audio_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Applied(String),
    /// The form was reset while the request was in flight.
    Superseded,
}

struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool, kind: &str) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                log::warn!("Ignoring {} request, one is already running", kind);
                MintError::Busy(kind.to_string())
            })?;
        Ok(Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Form state plus the two user actions, generate and upload.
pub struct MintSession {
    state: RwLock<SessionState>,
    generator: Option<Arc<dyn ImageGenerator>>,
    uploader: UploadOrchestrator,
    generating: AtomicBool,
    uploading: AtomicBool,
    generation_ticket: AtomicU64,
}

impl MintSession {
    pub fn new(generator: Arc<dyn ImageGenerator>, uploader: UploadOrchestrator) -> Self {
        Self::build(Some(generator), uploader)
    }

    /// A session that can only upload; `generate` fails with `ConfigError`.
    pub fn upload_only(uploader: UploadOrchestrator) -> Self {
        Self::build(None, uploader)
    }

    fn build(generator: Option<Arc<dyn ImageGenerator>>, uploader: UploadOrchestrator) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            generator,
            uploader,
            generating: AtomicBool::new(false),
            uploading: AtomicBool::new(false),
            generation_ticket: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        log::info!(
            "Using OpenAI at {} (key {}) and IPFS at {}",
            config.openai.base_url,
            config.openai.masked_key(),
            config.ipfs.api_base()
        );

        let fetcher = Arc::new(HttpBlobFetcher::new(config)?);
        let storage = Arc::new(ContentStorageManager::new(config)?);
        let uploader = UploadOrchestrator::new(fetcher, storage);

        if config.openai.api_key.is_none() {
            log::warn!("No OpenAI API key configured, image generation is disabled");
            return Ok(Self::upload_only(uploader));
        }
        Ok(Self::new(Arc::new(ImageClient::new(config)?), uploader))
    }

    pub async fn set_prompt(&self, prompt: impl Into<String>) {
        self.state.write().await.prompt = prompt.into();
    }

    pub async fn set_count(&self, count: impl Into<String>) {
        self.state.write().await.count = count.into();
    }

    pub async fn set_size(&self, size: impl Into<String>) {
        self.state.write().await.size = size.into();
    }

    /// Uses an existing image URL as the preview, e.g. one generated earlier.
    pub async fn set_image_url(&self, url: impl Into<String>) {
        let mut state = self.state.write().await;
        state.image_url = Some(url.into());
        state.image_hash = None;
        state.image_epoch += 1;
    }

    pub async fn set_audio(&self, blob: FileBlob) -> Result<()> {
        if !blob.is_audio() {
            return Err(MintError::InvalidInput(format!(
                "'{}' is {}, expected an audio file",
                blob.name, blob.mime_type
            )));
        }

        log::info!("Selected audio {} ({} bytes)", blob.name, blob.len());
        let mut state = self.state.write().await;
        state.audio = Some(blob);
        state.audio_hash = None;
        state.audio_epoch += 1;
        Ok(())
    }

    /// Reads a local file into the session. Only audio extensions are accepted.
    pub async fn select_audio(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mime = audio_mime_for_path(path).ok_or_else(|| {
            MintError::InvalidInput(format!("{} is not an audio file", path.display()))
        })?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MintError::InvalidInput(format!("{} has no file name", path.display())))?
            .to_string();

        let bytes = tokio::fs::read(path).await?;
        self.set_audio(FileBlob::new(name, mime, bytes)).await
    }

    pub async fn clear_audio(&self) {
        let mut state = self.state.write().await;
        state.audio = None;
        state.audio_hash = None;
        state.audio_epoch += 1;
    }

    /// Clears the form and drops the result of any in-flight generation.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        self.generation_ticket.fetch_add(1, Ordering::AcqRel);
        let image_epoch = state.image_epoch + 1;
        let audio_epoch = state.audio_epoch + 1;
        *state = SessionState {
            image_epoch,
            audio_epoch,
            ..SessionState::default()
        };
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            prompt: state.prompt.clone(),
            count: state.count.clone(),
            size: state.size.clone(),
            audio_name: state.audio.as_ref().map(|a| a.name.clone()),
            image_url: state.image_url.clone(),
            image_hash: state.image_hash.clone(),
            audio_hash: state.audio_hash.clone(),
        }
    }

    pub async fn generate(&self) -> Result<Generation> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| MintError::ConfigError("OpenAI API key is required".into()))?;
        let _guard = InFlight::acquire(&self.generating, "generate")?;

        let request = {
            let state = self.state.read().await;
            let n = parse_image_count(&state.count)?;
            ImageGenerationRequest::new(state.prompt.clone(), n, state.size.clone())
        };
        let ticket = self.generation_ticket.fetch_add(1, Ordering::AcqRel) + 1;

        let _timer = logger::timer("generate");
        let url = generator.generate(&request).await?;

        let mut state = self.state.write().await;
        if self.generation_ticket.load(Ordering::Acquire) != ticket {
            log::warn!("Discarding generated image, the form was reset meanwhile");
            return Ok(Generation::Superseded);
        }
        state.image_url = Some(url.clone());
        state.image_hash = None;
        state.image_epoch += 1;
        Ok(Generation::Applied(url))
    }

    pub async fn upload(&self) -> Result<UploadReport> {
        let _guard = InFlight::acquire(&self.uploading, "upload")?;

        let (sources, image_epoch, audio_epoch) = {
            let state = self.state.read().await;
            (
                UploadSources {
                    image_url: state.image_url.clone(),
                    audio: state.audio.clone(),
                },
                state.image_epoch,
                state.audio_epoch,
            )
        };

        let report = self.uploader.upload(&sources).await;

        let mut state = self.state.write().await;
        if let Some(hash) = report.image_hash() {
            if state.image_epoch == image_epoch {
                state.image_hash = Some(hash.to_string());
            } else {
                log::warn!("Image changed during upload, not recording {}", hash);
            }
        }
        if let Some(hash) = report.audio_hash() {
            if state.audio_epoch == audio_epoch {
                state.audio_hash = Some(hash.to_string());
            } else {
                log::warn!("Audio changed during upload, not recording {}", hash);
            }
        }
        Ok(report)
    }

    pub async fn health_check(&self) -> Result<bool> {
        self.uploader.health_check().await
    }
}
