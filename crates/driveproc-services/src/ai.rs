//! AI metadata generation client.

use async_trait::async_trait;
use reqwest::Method;

use driveproc_core::models::{GenerateMetadataRequest, GeneratedMetadata};
use driveproc_core::RemoteError;

use crate::remote::RemoteClient;

/// Seam for the AI enrichment dependency.
#[async_trait]
pub trait MetadataGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerateMetadataRequest,
    ) -> Result<GeneratedMetadata, RemoteError>;
}

/// HTTP client for the AI metadata service.
#[derive(Clone)]
pub struct AiMetadataClient {
    remote: RemoteClient,
    base_url: String,
}

impl AiMetadataClient {
    pub fn new(remote: RemoteClient, base_url: impl Into<String>) -> Self {
        Self {
            remote,
            base_url: base_url.into(),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/api/v1/metadata/generate", self.base_url)
    }
}

#[async_trait]
impl MetadataGenerator for AiMetadataClient {
    #[tracing::instrument(skip(self, request), fields(content_id = %request.content_id))]
    async fn generate(
        &self,
        request: &GenerateMetadataRequest,
    ) -> Result<GeneratedMetadata, RemoteError> {
        self.remote
            .call(Method::POST, &self.generate_url(), request)
            .await
    }
}
