// Error taxonomy for the recommendation core.
//
// Load-time problems (ArtifactError) are fatal for the catalog but not for
// the process: the engine drops into an Unavailable state instead. Per-request
// problems (RecommendError) only fail the one request that hit them.

use std::path::PathBuf;

use thiserror::Error;

/// Problems found while loading or validating the on-disk artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("required artifact not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{artifact} has {found} rows but the catalog has {expected} items")]
    Inconsistent {
        artifact: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{artifact} is invalid: {reason}")]
    Invalid {
        artifact: &'static str,
        reason: String,
    },
}

/// Recoverable, per-request failures surfaced to the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecommendError {
    /// The normalized query has no entry in the title index.
    #[error("Movie '{query}' not found in database!")]
    TitleNotFound { query: String },

    /// Artifacts failed to load; no recommendations can be served.
    #[error("recommendations unavailable: {reason}")]
    CatalogUnavailable { reason: String },

    #[error("position {position} is outside the catalog (size {size})")]
    PositionOutOfRange { position: usize, size: usize },

    /// The requested scorer needs an artifact that was not loaded.
    #[error("scorer '{scorer}' is not available: {reason}")]
    ScorerUnavailable { scorer: String, reason: String },

    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}
