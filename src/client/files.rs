//! Captured-snapshot source
//!
//! Reads `stats.json`, `settings.json` and `nodes.json` from a directory.
//! Only `stats.json` is required.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::{ClientError, StatsSource};

pub const STATS_FILE: &str = "stats.json";
pub const SETTINGS_FILE: &str = "settings.json";
pub const NODES_FILE: &str = "nodes.json";

/// Directory of captured cluster documents
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read(&self, name: &str, required: bool) -> Result<Value, ClientError> {
        let path = self.dir.join(name);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = ?path, "Optional snapshot file missing");
                return Ok(Value::Null);
            }
            Err(e) => {
                return Err(ClientError::Io {
                    path,
                    error: e.to_string(),
                })
            }
        };

        serde_json::from_str(&content).map_err(|e| ClientError::Decode {
            path,
            error: e.to_string(),
        })
    }
}

#[async_trait]
impl StatsSource for FileSource {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    async fn index_stats(&self) -> Result<Value, ClientError> {
        self.read(STATS_FILE, true).await
    }

    async fn index_settings(&self) -> Result<Value, ClientError> {
        self.read(SETTINGS_FILE, false).await
    }

    async fn node_stats(&self) -> Result<Value, ClientError> {
        self.read(NODES_FILE, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_reads_snapshot_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(STATS_FILE),
            r#"{"indices": {"logstash-app-000001": {}}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join(NODES_FILE), r#"{"nodes": {}}"#).unwrap();

        let source = FileSource::new(dir.path());
        let payloads = source.fetch_all(true).await.unwrap();

        assert!(payloads.index_stats["indices"].is_object());
        assert!(payloads.index_settings.is_null());
        assert!(payloads.node_stats["nodes"].is_object());
    }

    #[tokio::test]
    async fn test_missing_stats_file_is_an_error() {
        let dir = tempdir().unwrap();
        let source = FileSource::new(dir.path());

        let err = source.index_stats().await.unwrap_err();
        assert!(matches!(err, ClientError::Io { .. }));
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(STATS_FILE), "not json").unwrap();

        let err = FileSource::new(dir.path()).index_stats().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_node_failure_tolerated_when_not_required() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(STATS_FILE), r#"{"indices": {}}"#).unwrap();
        std::fs::write(dir.path().join(NODES_FILE), "{").unwrap();

        let source = FileSource::new(dir.path());
        assert!(source.fetch_all(true).await.is_err());

        let payloads = source.fetch_all(false).await.unwrap();
        assert!(payloads.node_stats.is_null());
    }
}
