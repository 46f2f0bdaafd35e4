//! Processing orchestrator.
//!
//! Turns one upload event into one metadata write and one status write. The
//! enrichment call goes through the circuit breaker and degrades to basic
//! metadata when the AI dependency is unavailable; the stored status always
//! reaches COMPLETED or FAILED, whatever the dependencies do.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

use driveproc_core::models::{
    EnrichmentResult, GenerateMetadataRequest, ProcessingStatus, UploadEvent,
};
use driveproc_core::{ProcessError, RemoteError};

use crate::ai::MetadataGenerator;
use crate::breaker::CircuitBreaker;
use crate::metadata::MetadataSink;

/// Summary of one orchestration. Informational only: the durable record is the
/// status stored against the content id.
#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    pub content_id: String,
    pub status: ProcessingStatus,
    /// Whether AI enrichment (as opposed to the basic fallback) made it into
    /// the store.
    pub enriched: bool,
    pub processing_error: Option<String>,
}

pub struct ProcessingService {
    generator: Arc<dyn MetadataGenerator>,
    sink: Arc<dyn MetadataSink>,
    breaker: Arc<CircuitBreaker>,
}

impl ProcessingService {
    pub fn new(
        generator: Arc<dyn MetadataGenerator>,
        sink: Arc<dyn MetadataSink>,
        breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self {
            generator,
            sink,
            breaker,
        }
    }

    /// Process one upload event to a terminal status.
    ///
    /// The only error returned is [`ProcessError::InvalidEvent`] for a
    /// malformed event; every downstream failure is absorbed and reflected in
    /// the stored status instead.
    #[tracing::instrument(skip(self, event), fields(content_id = %event.content_id))]
    pub async fn process_file(
        &self,
        event: &UploadEvent,
    ) -> Result<ProcessingOutcome, ProcessError> {
        validate_event(event)?;

        tracing::info!(
            file_name = %event.file_name,
            content_type = %event.content_type,
            size = event.size,
            "Processing file"
        );

        let started = Instant::now();
        let request = GenerateMetadataRequest::from_event(event);
        let generator = self.generator.as_ref();
        let content_id = event.content_id.as_str();

        let result = self
            .breaker
            .guard(
                || async {
                    let generated = generator.generate(&request).await?;
                    Ok::<_, RemoteError>(EnrichmentResult::from_generated(
                        content_id,
                        generated,
                        Utc::now(),
                        started.elapsed().as_millis() as i64,
                    ))
                },
                |failure| {
                    tracing::warn!(
                        error = %failure,
                        "AI enrichment unavailable, using basic metadata"
                    );
                    EnrichmentResult::basic_fallback(content_id, Utc::now())
                },
            )
            .await;

        let enriched = result.processing_error.is_none();

        let (status, processing_error) =
            match self.sink.replace_metadata(content_id, &result).await {
                Ok(()) => {
                    tracing::info!(enriched = enriched, "Metadata written");
                    (ProcessingStatus::Completed, result.processing_error)
                }
                Err(err) => {
                    // Enrichment that cannot be persisted is discarded; only
                    // the failure is recorded.
                    tracing::error!(error = %err, "Failed to write metadata");
                    (ProcessingStatus::Failed, Some(err.to_string()))
                }
            };

        if let Err(err) = self
            .sink
            .set_status(content_id, status, processing_error.as_deref())
            .await
        {
            // Non-critical: the outcome is already decided.
            tracing::warn!(error = %err, status = %status, "Failed to update processing status");
        }

        tracing::info!(status = %status, "File processing finished");

        Ok(ProcessingOutcome {
            content_id: content_id.to_string(),
            status,
            enriched: enriched && status == ProcessingStatus::Completed,
            processing_error,
        })
    }
}

fn validate_event(event: &UploadEvent) -> Result<(), ProcessError> {
    if event.content_id.trim().is_empty() {
        return Err(ProcessError::InvalidEvent(
            "contentId must not be empty".to_string(),
        ));
    }
    if event.s3_key.trim().is_empty() {
        return Err(ProcessError::InvalidEvent(
            "s3Key must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use driveproc_core::models::GeneratedMetadata;
    use driveproc_core::{BreakerConfig, WriteError};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct StubGenerator {
        metadata: Option<GeneratedMetadata>,
        calls: AtomicUsize,
    }

    impl StubGenerator {
        fn succeeding(metadata: GeneratedMetadata) -> Self {
            Self {
                metadata: Some(metadata),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                metadata: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MetadataGenerator for StubGenerator {
        async fn generate(
            &self,
            _request: &GenerateMetadataRequest,
        ) -> Result<GeneratedMetadata, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.metadata {
                Some(metadata) => Ok(metadata.clone()),
                None => Err(RemoteError::Timeout {
                    url: "http://localhost:8082/api/v1/metadata/generate".to_string(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        fail_replace: bool,
        fail_status: bool,
        metadata_writes: Mutex<Vec<EnrichmentResult>>,
        status_writes: Mutex<Vec<(String, ProcessingStatus, Option<String>)>>,
    }

    impl RecordingSink {
        fn write_error() -> WriteError {
            WriteError::from(RemoteError::BadStatus {
                url: "http://localhost:8085/api/v1/metadata/files/c1".to_string(),
                status: 500,
                body: "store offline".to_string(),
            })
        }
    }

    #[async_trait]
    impl MetadataSink for RecordingSink {
        async fn replace_metadata(
            &self,
            _content_id: &str,
            result: &EnrichmentResult,
        ) -> Result<(), WriteError> {
            if self.fail_replace {
                return Err(Self::write_error());
            }
            self.metadata_writes.lock().unwrap().push(result.clone());
            Ok(())
        }

        async fn set_status(
            &self,
            content_id: &str,
            status: ProcessingStatus,
            error: Option<&str>,
        ) -> Result<(), WriteError> {
            if self.fail_status {
                return Err(Self::write_error());
            }
            self.status_writes.lock().unwrap().push((
                content_id.to_string(),
                status,
                error.map(str::to_string),
            ));
            Ok(())
        }
    }

    fn event() -> UploadEvent {
        serde_json::from_value(json!({
            "contentId": "c1",
            "s3Key": "k1",
            "fileName": "a.pdf",
            "contentType": "application/pdf",
            "size": 1024
        }))
        .unwrap()
    }

    fn service(
        generator: Arc<StubGenerator>,
        sink: Arc<RecordingSink>,
    ) -> (ProcessingService, Arc<CircuitBreaker>) {
        let breaker = Arc::new(CircuitBreaker::new(BreakerConfig {
            failure_rate_threshold: 1.0,
            window_size: 3,
            open_cooldown: Duration::from_secs(60),
            half_open_max_calls: 1,
        }));
        (
            ProcessingService::new(generator, sink.clone(), breaker.clone()),
            breaker,
        )
    }

    #[tokio::test]
    async fn test_successful_enrichment_writes_metadata_and_completed_status() {
        let generated: GeneratedMetadata =
            serde_json::from_value(json!({ "summary": "doc", "tags": ["report"] })).unwrap();
        let generator = Arc::new(StubGenerator::succeeding(generated));
        let sink = Arc::new(RecordingSink::default());
        let (service, _) = service(generator, sink.clone());

        let outcome = service.process_file(&event()).await.unwrap();

        assert_eq!(outcome.status, ProcessingStatus::Completed);
        assert!(outcome.enriched);
        assert_eq!(outcome.processing_error, None);

        let writes = sink.metadata_writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].summary.as_deref(), Some("doc"));
        assert_eq!(writes[0].tags, vec!["report"]);
        assert_eq!(writes[0].processing_status, ProcessingStatus::Completed);

        let statuses = sink.status_writes.lock().unwrap();
        assert_eq!(statuses.len(), 1);
        assert_eq!(
            statuses[0],
            ("c1".to_string(), ProcessingStatus::Completed, None)
        );
    }

    #[tokio::test]
    async fn test_enrichment_failure_falls_back_to_basic_metadata() {
        let generator = Arc::new(StubGenerator::failing());
        let sink = Arc::new(RecordingSink::default());
        let (service, _) = service(generator, sink.clone());

        let outcome = service.process_file(&event()).await.unwrap();

        // Degraded, not failed.
        assert_eq!(outcome.status, ProcessingStatus::Completed);
        assert!(!outcome.enriched);

        let writes = sink.metadata_writes.lock().unwrap();
        assert_eq!(writes[0].tags, vec!["basic"]);
        assert_eq!(writes[0].categories, vec!["general"]);
        assert_eq!(writes[0].summary.as_deref(), Some("Basic file metadata"));

        let statuses = sink.status_writes.lock().unwrap();
        assert_eq!(statuses[0].1, ProcessingStatus::Completed);
        assert_eq!(
            statuses[0].2.as_deref(),
            Some("AI service unavailable, using basic metadata")
        );
    }

    #[tokio::test]
    async fn test_metadata_write_failure_records_failed_status() {
        let generated: GeneratedMetadata =
            serde_json::from_value(json!({ "summary": "doc" })).unwrap();
        let generator = Arc::new(StubGenerator::succeeding(generated));
        let sink = Arc::new(RecordingSink {
            fail_replace: true,
            ..Default::default()
        });
        let (service, _) = service(generator, sink.clone());

        let outcome = service.process_file(&event()).await.unwrap();

        assert_eq!(outcome.status, ProcessingStatus::Failed);
        assert!(!outcome.enriched);
        assert!(outcome.processing_error.unwrap().contains("500"));

        let statuses = sink.status_writes.lock().unwrap();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].1, ProcessingStatus::Failed);
        assert!(statuses[0].2.as_deref().unwrap().contains("store offline"));
    }

    #[tokio::test]
    async fn test_status_write_failure_is_swallowed() {
        let generated: GeneratedMetadata =
            serde_json::from_value(json!({ "summary": "doc" })).unwrap();
        let generator = Arc::new(StubGenerator::succeeding(generated));
        let sink = Arc::new(RecordingSink {
            fail_status: true,
            ..Default::default()
        });
        let (service, _) = service(generator, sink.clone());

        // Does not raise; the decided outcome stands.
        let outcome = service.process_file(&event()).await.unwrap();
        assert_eq!(outcome.status, ProcessingStatus::Completed);
        assert_eq!(sink.metadata_writes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_event_propagates() {
        let generator = Arc::new(StubGenerator::failing());
        let sink = Arc::new(RecordingSink::default());
        let (service, _) = service(generator.clone(), sink.clone());

        let mut bad = event();
        bad.content_id = "  ".to_string();
        let err = service.process_file(&bad).await.unwrap_err();
        assert!(matches!(err, ProcessError::InvalidEvent(_)));

        // Nothing was attempted downstream.
        assert_eq!(generator.calls(), 0);
        assert!(sink.status_writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_processing_is_idempotent_per_classification() {
        let generator = Arc::new(StubGenerator::failing());
        let sink = Arc::new(RecordingSink::default());
        let (service, _) = service(generator, sink.clone());

        let first = service.process_file(&event()).await.unwrap();
        let second = service.process_file(&event()).await.unwrap();
        assert_eq!(first.status, second.status);
        assert_eq!(first.processing_error, second.processing_error);
    }

    #[tokio::test]
    async fn test_open_breaker_skips_enrichment_calls() {
        let generator = Arc::new(StubGenerator::failing());
        let sink = Arc::new(RecordingSink::default());
        let (service, breaker) = service(generator.clone(), sink.clone());

        // Window of three consecutive failures trips the breaker.
        for _ in 0..3 {
            service.process_file(&event()).await.unwrap();
        }
        assert_eq!(breaker.state(), crate::breaker::BreakerState::Open);
        assert_eq!(generator.calls(), 3);

        // Short-circuited: no further network attempts, still COMPLETED.
        let outcome = service.process_file(&event()).await.unwrap();
        assert_eq!(generator.calls(), 3);
        assert_eq!(outcome.status, ProcessingStatus::Completed);

        let writes = sink.metadata_writes.lock().unwrap();
        assert_eq!(writes.last().unwrap().tags, vec!["basic"]);
    }

    #[tokio::test]
    async fn test_every_invocation_leaves_terminal_status() {
        // Even with everything failing except the status write, the stored
        // status is terminal.
        let generator = Arc::new(StubGenerator::failing());
        let sink = Arc::new(RecordingSink {
            fail_replace: true,
            ..Default::default()
        });
        let (service, _) = service(generator, sink.clone());

        service.process_file(&event()).await.unwrap();

        let statuses = sink.status_writes.lock().unwrap();
        assert_eq!(statuses.len(), 1);
        assert!(statuses[0].1.is_terminal());
    }
}
