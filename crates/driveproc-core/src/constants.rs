//! Shared constants.

/// Version tag recorded in `processingVersion` on every enrichment result.
pub const PROCESSING_VERSION: &str = "1.0.0";

/// Human-readable error recorded when enrichment degrades to basic metadata.
pub const FALLBACK_ERROR_MESSAGE: &str = "AI service unavailable, using basic metadata";

/// Summary recorded on fallback results.
pub const FALLBACK_SUMMARY: &str = "Basic file metadata";

/// Tag recorded on fallback results.
pub const FALLBACK_TAG: &str = "basic";

/// Category recorded on fallback results.
pub const FALLBACK_CATEGORY: &str = "general";
