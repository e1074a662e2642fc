pub mod image_client;

use crate::{error::Result, models::ImageGenerationRequest};
use async_trait::async_trait;

pub use image_client::ImageClient;

/// Text-to-image backend. Returns the URL of the first generated image.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &ImageGenerationRequest) -> Result<String>;
}
