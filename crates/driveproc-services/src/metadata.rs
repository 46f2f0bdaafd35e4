//! Metadata store client.
//!
//! Two idempotent operations against the store, both keyed by content id:
//! replace the full metadata document, and patch the processing status. Callers
//! decide how write failures propagate; this client just reports them.

use async_trait::async_trait;
use reqwest::Method;

use driveproc_core::models::{EnrichmentResult, ProcessingStatus, StatusUpdate};
use driveproc_core::WriteError;

use crate::remote::RemoteClient;

/// Seam for the metadata store.
#[async_trait]
pub trait MetadataSink: Send + Sync {
    /// Replace all metadata fields for `content_id`.
    async fn replace_metadata(
        &self,
        content_id: &str,
        result: &EnrichmentResult,
    ) -> Result<(), WriteError>;

    /// Set the processing status for `content_id`.
    async fn set_status(
        &self,
        content_id: &str,
        status: ProcessingStatus,
        error: Option<&str>,
    ) -> Result<(), WriteError>;
}

/// HTTP client for the metadata service.
#[derive(Clone)]
pub struct MetadataStoreClient {
    remote: RemoteClient,
    base_url: String,
}

impl MetadataStoreClient {
    pub fn new(remote: RemoteClient, base_url: impl Into<String>) -> Self {
        Self {
            remote,
            base_url: base_url.into(),
        }
    }

    fn file_url(&self, content_id: &str) -> String {
        format!("{}/api/v1/metadata/files/{}", self.base_url, content_id)
    }

    fn status_url(&self, content_id: &str) -> String {
        format!(
            "{}/api/v1/metadata/files/{}/status",
            self.base_url, content_id
        )
    }
}

#[async_trait]
impl MetadataSink for MetadataStoreClient {
    #[tracing::instrument(skip(self, result))]
    async fn replace_metadata(
        &self,
        content_id: &str,
        result: &EnrichmentResult,
    ) -> Result<(), WriteError> {
        self.remote
            .send(Method::PUT, &self.file_url(content_id), result)
            .await?;

        tracing::debug!(content_id = content_id, "Metadata replaced");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn set_status(
        &self,
        content_id: &str,
        status: ProcessingStatus,
        error: Option<&str>,
    ) -> Result<(), WriteError> {
        let update = StatusUpdate::new(content_id, status, error);
        self.remote
            .send(Method::PATCH, &self.status_url(content_id), &update)
            .await?;

        tracing::debug!(content_id = content_id, status = %status, "Processing status updated");
        Ok(())
    }
}
