//! Stats Sources
//!
//! Fetch the raw documents the analysis consumes. The analysis itself does
//! no I/O; a source runs once per run, before it.
//!
//! - **ElasticsearchClient**: live cluster over HTTP(S)
//! - **FileSource**: a directory of previously captured documents

mod elasticsearch;
mod files;

pub use elasticsearch::{ElasticsearchClient, ElasticsearchConfig};
pub use files::FileSource;

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

use crate::collector::RawPayloads;

/// Provider of the three statistics documents
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Human-readable location of the source
    fn describe(&self) -> String;

    /// Index-level stats
    async fn index_stats(&self) -> Result<Value, ClientError>;

    /// Index-level settings
    async fn index_settings(&self) -> Result<Value, ClientError>;

    /// Per-node capacity stats
    async fn node_stats(&self) -> Result<Value, ClientError>;

    /// Fetch all documents
    ///
    /// Node stats only matter for normalized scoring and replica
    /// auto-expansion; when `require_nodes` is false a failure there is
    /// logged and an empty document used instead.
    async fn fetch_all(&self, require_nodes: bool) -> Result<RawPayloads, ClientError> {
        let index_stats = self.index_stats().await?;
        let index_settings = self.index_settings().await?;

        let node_stats = match self.node_stats().await {
            Ok(nodes) => nodes,
            Err(e) if !require_nodes => {
                tracing::warn!(
                    source = %self.describe(),
                    error = %e,
                    "Failed to fetch node stats; auto-expanded replica counts may be inaccurate"
                );
                Value::Null
            }
            Err(e) => return Err(e),
        };

        Ok(RawPayloads::new(index_stats, index_settings, node_stats))
    }
}

/// Errors that can occur while fetching statistics
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Cluster unavailable at {0}")]
    Unavailable(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to read {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to decode {path:?}: {error}")]
    Decode { path: PathBuf, error: String },
}
