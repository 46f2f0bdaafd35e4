//! Processing worker.
//!
//! Thin runtime around the processing service: loads configuration, wires the
//! shared circuit breaker and HTTP clients, then consumes newline-delimited
//! JSON upload events from stdin and processes each one concurrently up to a
//! configured cap. Event delivery (queueing, transport retries, dedup) is the
//! upstream pipeline's job, not this worker's.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use driveproc_core::models::UploadEvent;
use driveproc_core::ProcessingConfig;
use driveproc_services::{
    AiMetadataClient, CircuitBreaker, MetadataStoreClient, ProcessingService, RemoteClient,
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ProcessingConfig::from_env()?;
    tracing::info!(
        ai_service_url = %config.ai_service_url,
        metadata_service_url = %config.metadata_service_url,
        "Starting processing worker"
    );

    let remote =
        RemoteClient::new(config.request_timeout).context("Failed to build remote client")?;
    let generator = Arc::new(AiMetadataClient::new(
        remote.clone(),
        config.ai_service_url.clone(),
    ));
    let sink = Arc::new(MetadataStoreClient::new(
        remote,
        config.metadata_service_url.clone(),
    ));
    let breaker = Arc::new(CircuitBreaker::new(config.breaker.clone()));
    let service = Arc::new(ProcessingService::new(generator, sink, breaker));

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_events));
    let mut in_flight = JoinSet::new();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let event: UploadEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(err) => {
                tracing::error!(error = %err, "Skipping malformed upload event");
                continue;
            }
        };

        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .context("Semaphore closed")?;
        let service = service.clone();

        in_flight.spawn(async move {
            let result = service.process_file(&event).await;
            drop(permit);

            match result {
                Ok(outcome) => {
                    tracing::info!(
                        content_id = %outcome.content_id,
                        status = %outcome.status,
                        enriched = outcome.enriched,
                        "Event processed"
                    );
                }
                Err(err) => {
                    tracing::error!(
                        content_id = %event.content_id,
                        error = %err,
                        "Unrecoverable event"
                    );
                }
            }
        });

        // Reap finished tasks without blocking intake.
        while let Some(joined) = in_flight.try_join_next() {
            if let Err(err) = joined {
                tracing::error!(error = %err, "Processing task panicked");
            }
        }
    }

    while let Some(joined) = in_flight.join_next().await {
        if let Err(err) = joined {
            tracing::error!(error = %err, "Processing task panicked");
        }
    }

    tracing::info!("Input exhausted, worker exiting");
    Ok(())
}
