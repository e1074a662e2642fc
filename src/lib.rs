pub mod config;
pub mod error;
pub mod fetch;
pub mod logger;
pub mod models;
pub mod openai;
pub mod orchestrator;
pub mod session;
pub mod storage;

pub use config::{Config, IpfsConfig, OpenAiConfig};
pub use error::{MintError, Result};
pub use fetch::{BlobFetcher, HttpBlobFetcher, MAX_FETCH_BYTES};
pub use models::*;
pub use openai::{ImageClient, ImageGenerator};
pub use orchestrator::{UploadOrchestrator, UploadSources};
pub use session::{Generation, MintSession, SessionSnapshot};
pub use storage::{ContentStorageManager, ContentStore, IpfsClient};
