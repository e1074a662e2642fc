use crate::{
    config::Config,
    error::{MintError, Result},
    models::{ImageGenerationRequest, OpenAiImageResponse, KNOWN_IMAGE_SIZES},
    openai::ImageGenerator,
};
use async_trait::async_trait;
use reqwest::Client;

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ImageClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .openai
            .api_key
            .clone()
            .ok_or_else(|| MintError::ConfigError("OpenAI API key is required".into()))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| MintError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.openai.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn supported_sizes() -> &'static [&'static str] {
        &KNOWN_IMAGE_SIZES
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/images/generations", self.base_url)
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate(&self, request: &ImageGenerationRequest) -> Result<String> {
        if !request.has_known_size() {
            log::warn!(
                "Image size '{}' is not one of {:?}, forwarding as-is",
                request.size,
                KNOWN_IMAGE_SIZES
            );
        }

        log::info!(
            "Requesting {} image(s) at {} from {}",
            request.n,
            request.size,
            self.base_url
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| MintError::RequestError(format!("Image generation request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Image generation failed with status {}", status);
            return Err(MintError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OpenAiImageResponse = response.json().await.map_err(|e| {
            MintError::ResponseError(format!("Failed to parse image response: {}", e))
        })?;

        let url = parsed
            .first_url()
            .ok_or_else(|| MintError::ResponseError("No image URL in response".into()))?;

        log::debug!("Image generated: {}", url);
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenAiConfig;

    #[test]
    fn test_requires_api_key() {
        let result = ImageClient::new(&Config::new());
        assert!(matches!(result, Err(MintError::ConfigError(_))));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = Config::new().with_openai(
            OpenAiConfig::new()
                .with_api_key("sk-test")
                .with_base_url("http://localhost:9999/"),
        );
        let client = ImageClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1/images/generations"
        );
    }

    #[test]
    fn test_supported_sizes() {
        assert!(ImageClient::supported_sizes().contains(&"256x256"));
        assert_eq!(ImageClient::supported_sizes().len(), 3);
    }
}
