//! Driveproc Services
//!
//! Processing pipeline for uploaded files: the remote call client, the circuit
//! breaker guarding the AI enrichment dependency, clients for the AI and
//! metadata services, and the orchestrator that ties them together.

pub mod ai;
pub mod breaker;
pub mod metadata;
pub mod processing;
pub mod remote;

pub use ai::{AiMetadataClient, MetadataGenerator};
pub use breaker::{BreakerState, CallFailure, CircuitBreaker};
pub use metadata::{MetadataSink, MetadataStoreClient};
pub use processing::{ProcessingOutcome, ProcessingService};
pub use remote::RemoteClient;
