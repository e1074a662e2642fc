use crate::{
    config::{Config, IpfsConfig},
    error::{MintError, Result},
    models::storage::{AddResult, FileBlob},
    storage::traits::ContentStore,
};
use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder};

/// Client for the Kubo-compatible HTTP RPC exposed by hosted gateways.
pub struct IpfsClient {
    client: Client,
    api_base: String,
    credentials: Option<(String, String)>,
}

impl IpfsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| MintError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, &config.ipfs))
    }

    pub fn with_client(client: Client, config: &IpfsConfig) -> Self {
        let credentials = match (&config.project_id, &config.project_secret) {
            (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
            (Some(_), None) | (None, Some(_)) => {
                log::warn!("Only one of IPFS_PROJECT_ID/IPFS_PROJECT_SECRET is set, ignoring both");
                None
            }
            (None, None) => None,
        };

        Self {
            client,
            api_base: config.api_base(),
            credentials,
        }
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((id, secret)) => builder.basic_auth(id, Some(secret)),
            None => builder,
        }
    }
}

/// The add endpoint streams one JSON object per line.
pub(crate) fn parse_add_response(body: &str) -> Result<Vec<AddResult>> {
    let results = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            serde_json::from_str::<AddResult>(line).map_err(|e| {
                MintError::ResponseError(format!("Failed to parse IPFS add response: {}", e))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if results.is_empty() {
        return Err(MintError::ResponseError("IPFS add returned no entries".into()));
    }
    Ok(results)
}

#[async_trait]
impl ContentStore for IpfsClient {
    async fn add(&self, blob: &FileBlob) -> Result<Vec<AddResult>> {
        let part = multipart::Part::bytes(blob.bytes.clone())
            .file_name(blob.name.clone())
            .mime_str(&blob.mime_type)
            .map_err(|e| MintError::InvalidInput(format!("Bad MIME type: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        let request = self
            .client
            .post(format!("{}/add", self.api_base))
            .query(&[("pin", "true")])
            .multipart(form);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| MintError::RequestError(format!("IPFS add failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            MintError::ResponseError(format!("Failed to read IPFS add response: {}", e))
        })?;

        if !status.is_success() {
            return Err(MintError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        parse_add_response(&body)
    }

    async fn health_check(&self) -> Result<bool> {
        let request = self.client.post(format!("{}/version", self.api_base));
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| MintError::RequestError(format!("IPFS health check failed: {}", e)))?;

        Ok(response.status().is_success())
    }
}
