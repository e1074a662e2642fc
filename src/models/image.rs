use crate::error::{MintError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGE_SIZE: &str = "256x256";

/// Sizes the Images API is known to accept. Not enforced client-side.
pub const KNOWN_IMAGE_SIZES: [&str; 3] = ["256x256", "512x512", "1024x1024"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub n: u32,
    pub size: String,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>, n: u32, size: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            n,
            size: size.into(),
        }
    }

    pub fn has_known_size(&self) -> bool {
        KNOWN_IMAGE_SIZES.contains(&self.size.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiImageData {
    pub url: Option<String>,
    pub b64_json: Option<String>,
    pub revised_prompt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiImageResponse {
    pub created: Option<i64>,
    #[serde(default)]
    pub data: Vec<OpenAiImageData>,
}

impl OpenAiImageResponse {
    pub fn first_url(&self) -> Option<&str> {
        self.data.first().and_then(|d| d.url.as_deref())
    }
}

/// Parses the user's "Amount" field. Rejects anything that is not a
/// positive integer.
pub fn parse_image_count(raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    match trimmed.parse::<u32>() {
        Ok(0) => Err(MintError::InvalidInput(
            "image count must be at least 1".into(),
        )),
        Ok(n) => Ok(n),
        Err(_) => Err(MintError::InvalidInput(format!(
            "image count '{}' is not a positive integer",
            trimmed
        ))),
    }
}
