//! Enrichment result and metadata service wire types.
//!
//! `EnrichmentResult` is the full document written to the metadata store: AI (or
//! fallback) content fields plus processing bookkeeping. It is constructed fresh
//! for every orchestration attempt and its `processing_status` always ends up
//! COMPLETED or FAILED.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::constants::{
    FALLBACK_CATEGORY, FALLBACK_ERROR_MESSAGE, FALLBACK_SUMMARY, FALLBACK_TAG, PROCESSING_VERSION,
};
use crate::models::UploadEvent;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    /// Terminal statuses are the only ones an orchestration may leave behind.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Failed)
    }
}

impl Display for ProcessingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProcessingStatus::Pending => write!(f, "PENDING"),
            ProcessingStatus::Processing => write!(f, "PROCESSING"),
            ProcessingStatus::Completed => write!(f, "COMPLETED"),
            ProcessingStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for ProcessingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ProcessingStatus::Pending),
            "PROCESSING" => Ok(ProcessingStatus::Processing),
            "COMPLETED" => Ok(ProcessingStatus::Completed),
            "FAILED" => Ok(ProcessingStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid processing status: {}", s)),
        }
    }
}

/// Request body for the AI metadata generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMetadataRequest {
    pub content_id: String,
    pub s3_key: String,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
}

impl GenerateMetadataRequest {
    pub fn from_event(event: &UploadEvent) -> Self {
        Self {
            content_id: event.content_id.clone(),
            s3_key: event.s3_key.clone(),
            file_name: event.file_name.clone(),
            content_type: event.content_type.clone(),
            size: event.size,
        }
    }
}

/// Response body of the AI metadata generation endpoint.
///
/// Every field is optional; the provider returns whatever applies to the file
/// type, and unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMetadata {
    #[serde(default)]
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub detected_language: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub image_labels: Vec<String>,
    #[serde(default)]
    pub image_objects: Vec<String>,
    #[serde(default)]
    pub image_colors: Vec<String>,
    #[serde(default)]
    pub image_faces: Vec<String>,
    #[serde(default)]
    pub image_text: Vec<String>,
    #[serde(default)]
    pub image_embedding: Vec<f32>,
    #[serde(default)]
    pub custom_metadata: HashMap<String, Value>,
    #[serde(default)]
    pub ai_provider: Option<String>,
}

/// Full metadata document for one content id, written with replace semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentResult {
    pub content_id: String,
    pub processing_status: ProcessingStatus,
    pub processed_at: DateTime<Utc>,
    pub processing_error: Option<String>,

    // AI generated metadata
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub detected_language: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub entities: Vec<String>,
    pub document_type: Option<String>,

    // Image analysis results
    #[serde(default)]
    pub image_labels: Vec<String>,
    #[serde(default)]
    pub image_objects: Vec<String>,
    #[serde(default)]
    pub image_colors: Vec<String>,
    #[serde(default)]
    pub image_faces: Vec<String>,
    #[serde(default)]
    pub image_text: Vec<String>,
    #[serde(default)]
    pub image_embedding: Vec<f32>,

    // Free-form custom metadata
    #[serde(default)]
    pub custom_metadata: HashMap<String, Value>,

    // Processing bookkeeping
    pub processing_time_ms: Option<i64>,
    pub ai_provider: Option<String>,
    pub processing_version: Option<String>,
}

impl EnrichmentResult {
    /// Build a COMPLETED result from a provider response.
    pub fn from_generated(
        content_id: &str,
        generated: GeneratedMetadata,
        processed_at: DateTime<Utc>,
        processing_time_ms: i64,
    ) -> Self {
        Self {
            content_id: content_id.to_string(),
            processing_status: ProcessingStatus::Completed,
            processed_at,
            processing_error: None,
            extracted_text: generated.extracted_text,
            detected_language: generated.detected_language,
            tags: generated.tags,
            categories: generated.categories,
            summary: generated.summary,
            keywords: generated.keywords,
            entities: generated.entities,
            document_type: generated.document_type,
            image_labels: generated.image_labels,
            image_objects: generated.image_objects,
            image_colors: generated.image_colors,
            image_faces: generated.image_faces,
            image_text: generated.image_text,
            image_embedding: generated.image_embedding,
            custom_metadata: generated.custom_metadata,
            processing_time_ms: Some(processing_time_ms),
            ai_provider: generated.ai_provider,
            processing_version: Some(PROCESSING_VERSION.to_string()),
        }
    }

    /// Build the basic fallback result used when the AI dependency is
    /// unavailable. Still COMPLETED: losing enrichment degrades quality but is
    /// not a processing failure.
    pub fn basic_fallback(content_id: &str, processed_at: DateTime<Utc>) -> Self {
        Self {
            content_id: content_id.to_string(),
            processing_status: ProcessingStatus::Completed,
            processed_at,
            processing_error: Some(FALLBACK_ERROR_MESSAGE.to_string()),
            extracted_text: None,
            detected_language: Vec::new(),
            tags: vec![FALLBACK_TAG.to_string()],
            categories: vec![FALLBACK_CATEGORY.to_string()],
            summary: Some(FALLBACK_SUMMARY.to_string()),
            keywords: Vec::new(),
            entities: Vec::new(),
            document_type: None,
            image_labels: Vec::new(),
            image_objects: Vec::new(),
            image_colors: Vec::new(),
            image_faces: Vec::new(),
            image_text: Vec::new(),
            image_embedding: Vec::new(),
            custom_metadata: HashMap::new(),
            processing_time_ms: None,
            ai_provider: None,
            processing_version: Some(PROCESSING_VERSION.to_string()),
        }
    }
}

/// Partial-update body for the processing status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub content_id: String,
    pub processing_status: ProcessingStatus,
    pub processed_at: DateTime<Utc>,
    /// Empty string when there is no error, matching the store's contract.
    pub processing_error: String,
}

impl StatusUpdate {
    pub fn new(content_id: &str, status: ProcessingStatus, error: Option<&str>) -> Self {
        Self {
            content_id: content_id.to_string(),
            processing_status: status,
            processed_at: Utc::now(),
            processing_error: error.unwrap_or_default().to_string(),
        }
    }
}
