//! Driveproc Core Library
//!
//! This crate provides the domain models, error taxonomy, and configuration
//! shared across all driveproc components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BreakerConfig, ProcessingConfig};
pub use error::{ProcessError, RemoteError, WriteError};
