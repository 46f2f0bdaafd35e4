pub mod enrichment;
pub mod upload_event;

pub use enrichment::{
    EnrichmentResult, GenerateMetadataRequest, GeneratedMetadata, ProcessingStatus, StatusUpdate,
};
pub use upload_event::{UploadEvent, UploadEventType};
