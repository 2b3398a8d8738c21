//! Analysis error types
//!
//! Fatal conditions of a run. Each is raised at the boundary where it is
//! first detectable: collection failures by the collector, pattern
//! failures before any grouping work.

use thiserror::Error;

/// Errors that abort an impact analysis run
#[derive(Error, Debug)]
pub enum ImpactError {
    /// No indices present in the index-stats payload
    #[error("Collection error: {0}")]
    Collection(String),

    /// A per-index entry is structurally invalid
    #[error("Schema error for index {index}: {reason}")]
    Schema { index: String, reason: String },

    /// The grouping pattern is unusable
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// A payload envelope could not be decoded at all
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Result type alias for analysis operations
pub type ImpactResult<T> = Result<T, ImpactError>;
