//! Upload event model.
//!
//! One completed file upload in need of enrichment. The wire shape is the
//! camelCase JSON emitted by the upload pipeline; the event is immutable once
//! received and owned by the orchestration invocation that handles it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadEventType {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl Display for UploadEventType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadEventType::Uploaded => write!(f, "UPLOADED"),
            UploadEventType::Processing => write!(f, "PROCESSING"),
            UploadEventType::Completed => write!(f, "COMPLETED"),
            UploadEventType::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for UploadEventType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPLOADED" => Ok(UploadEventType::Uploaded),
            "PROCESSING" => Ok(UploadEventType::Processing),
            "COMPLETED" => Ok(UploadEventType::Completed),
            "FAILED" => Ok(UploadEventType::Failed),
            _ => Err(anyhow::anyhow!("Invalid upload event type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadEvent {
    pub content_id: String,
    pub s3_key: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub bucket_name: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub event_id: Option<Uuid>,
    #[serde(default)]
    pub event_type: Option<UploadEventType>,
}
