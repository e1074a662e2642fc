use crate::{
    error::Result,
    models::storage::{AddResult, FileBlob},
};
use async_trait::async_trait;

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Uploads one file. The first returned entry describes that file.
    async fn add(&self, blob: &FileBlob) -> Result<Vec<AddResult>>;

    async fn health_check(&self) -> Result<bool>;
}
