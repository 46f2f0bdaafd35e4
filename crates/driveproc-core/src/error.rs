//! Error types module
//!
//! The error taxonomy mirrors the service boundaries: `RemoteError` for a single
//! outbound request/response exchange, `WriteError` for metadata store writes,
//! and `ProcessError` for failures the orchestrator cannot absorb.
//!
//! Everything else that can go wrong during processing is absorbed internally
//! (fallback metadata, FAILED status) and never surfaces as an `Err`.

/// Failure of one outbound request/response exchange.
///
/// A single variant per failure class, each carrying the target URL so log lines
/// and stored error messages identify which dependency misbehaved.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}: {body}")]
    BadStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    BadBody {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl RemoteError {
    /// Classify a transport-level reqwest error for `url`.
    pub fn from_transport(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            RemoteError::Timeout {
                url: url.to_string(),
            }
        } else {
            RemoteError::Network {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Failure of a metadata store write (replace or status update).
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("metadata store write failed: {0}")]
    Remote(#[from] RemoteError),
}

/// Unrecoverable orchestration failure.
///
/// The only error `process_file` propagates to its caller; every remote failure
/// is handled internally and reflected through the stored status instead.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("invalid upload event: {0}")]
    InvalidEvent(String),
}
