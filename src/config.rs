//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides; command
//! line flags are applied on top by the binary.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::analysis::AnalysisOptions;
use crate::client::ElasticsearchConfig;
use crate::grouping::DEFAULT_INDEX_PATTERN;
use crate::report::OutputFormat;
use crate::scoring::{ScoreMode, ScoringOptions, Weights};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cluster: ClusterConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Cluster connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub ssl: bool,

    #[serde(default)]
    pub insecure: bool,

    pub user: Option<String>,

    pub password: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9200
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ssl: false,
            insecure: false,
            user: None,
            password: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ClusterConfig {
    pub fn to_client_config(&self) -> ElasticsearchConfig {
        ElasticsearchConfig {
            host: self.host.clone(),
            port: self.port,
            ssl: self.ssl,
            insecure: self.insecure,
            user: self.user.clone(),
            password: self.password.clone(),
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

/// Scoring and grouping configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub mode: ScoreMode,

    #[serde(default = "default_index_pattern")]
    pub index_pattern: String,

    #[serde(default)]
    pub weights: Weights,

    pub top: Option<usize>,

    /// Monthly cluster cost to apportion across groups
    pub total_cost: Option<f64>,
}

fn default_index_pattern() -> String {
    DEFAULT_INDEX_PATTERN.to_string()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mode: ScoreMode::default(),
            index_pattern: default_index_pattern(),
            weights: Weights::default(),
            top: None,
            total_cost: None,
        }
    }
}

impl ScoringConfig {
    pub fn to_analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            index_pattern: Some(self.index_pattern.clone()),
            scoring: ScoringOptions {
                mode: self.mode,
                weights: self.weights,
                top: self.top,
                total_cost: self.total_cost,
            },
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Write the report here instead of stdout
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    ///
    /// Nothing is logged here: the outcome is returned so the caller can
    /// report it once the subscriber is installed.
    pub fn load_default() -> ConfigSearch {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("es-impact").join("config.toml")),
            Some(PathBuf::from("/etc/es-impact/config.toml")),
            Some(PathBuf::from("./es-impact.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::search(&config_paths)
    }

    /// Load the first candidate file that parses, else defaults
    pub fn search(paths: &[PathBuf]) -> ConfigSearch {
        let mut failures = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    return ConfigSearch {
                        config,
                        source: Some(path.clone()),
                        failures,
                    }
                }
                Err(e) => failures.push(e),
            }
        }

        ConfigSearch {
            config: Self::from_env(),
            source: None,
            failures,
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Cluster overrides
        if let Some(host) = var("ES_IMPACT_HOST") {
            self.cluster.host = host;
        }
        if let Some(port) = var("ES_IMPACT_PORT") {
            match port.parse() {
                Ok(p) => self.cluster.port = p,
                Err(_) => tracing::warn!("Ignoring invalid ES_IMPACT_PORT: {}", port),
            }
        }
        if let Some(user) = var("ES_IMPACT_USER") {
            self.cluster.user = Some(user);
        }
        if let Some(password) = var("ES_IMPACT_PASSWORD") {
            self.cluster.password = Some(password);
        }

        // Scoring overrides
        if let Some(mode) = var("ES_IMPACT_SCORE_MODE") {
            match mode.parse() {
                Ok(m) => self.scoring.mode = m,
                Err(e) => tracing::warn!("Ignoring ES_IMPACT_SCORE_MODE: {}", e),
            }
        }
        if let Some(pattern) = var("ES_IMPACT_INDEX_PATTERN") {
            self.scoring.index_pattern = pattern;
        }

        // Logging overrides
        if let Some(level) = var("ES_IMPACT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("ES_IMPACT_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Outcome of searching the default config locations
#[derive(Debug)]
pub struct ConfigSearch {
    pub config: Config,
    /// File the config came from; `None` when defaults were used
    pub source: Option<PathBuf>,
    /// Candidates that exist but failed to load
    pub failures: Vec<ConfigError>,
}

impl ConfigSearch {
    /// Log where the config came from
    pub fn log(&self) {
        for failure in &self.failures {
            tracing::warn!("{}", failure);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::debug!("Using default config with environment overrides"),
        }
    }
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# es-impact Configuration
#
# Environment variables override these settings:
# - ES_IMPACT_HOST
# - ES_IMPACT_PORT
# - ES_IMPACT_USER
# - ES_IMPACT_PASSWORD
# - ES_IMPACT_SCORE_MODE
# - ES_IMPACT_INDEX_PATTERN
# - ES_IMPACT_LOG_LEVEL
# - ES_IMPACT_LOG_FORMAT

[cluster]
# Elasticsearch host and port
host = "localhost"
port = 9200

# Use HTTPS
ssl = false

# Skip TLS certificate verification (HTTPS only)
insecure = false

# Basic auth credentials (both or neither)
# user = "elastic"
# password = "changeme"

# Request timeout in seconds
request_timeout_secs = 30

[scoring]
# Scoring mode: normalized (share of cluster capacity) or weighted
mode = "normalized"

# Regex grouping indices into log groups; must capture (?P<log_name>...)
index_pattern = '^[^-]+-(?P<log_name>.+)-\d{6}$'

# Show only the top N groups (percentages still cover all groups)
# top = 20

# Monthly cluster cost to apportion across groups
# total_cost = 1000.0

[scoring.weights]
# Weighted mode only
storage_gb = 1.0
shard_count = 5.0
segment_count = 0.1
fielddata_mb = 2.0
query_cache_mb = 0.5

[output]
# Report format: table or json
format = "table"

# Optional report file (default: stdout)
# path = "impact.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for terminals) or json (for log shippers)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_generated_config_matches_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.cluster.host, defaults.cluster.host);
        assert_eq!(config.cluster.port, defaults.cluster.port);
        assert_eq!(config.scoring.mode, ScoreMode::Normalized);
        assert_eq!(config.scoring.index_pattern, DEFAULT_INDEX_PATTERN);
        assert_eq!(config.scoring.weights, Weights::default());
        assert_eq!(config.output.format, OutputFormat::Table);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [cluster]
            host = "es.internal"

            [scoring]
            mode = "weighted"
            total_cost = 2500.0

            [scoring.weights]
            shard_count = 8.0
            "#,
        )
        .unwrap();

        assert_eq!(config.cluster.host, "es.internal");
        assert_eq!(config.cluster.port, 9200);
        assert_eq!(config.scoring.mode, ScoreMode::Weighted);
        assert_eq!(config.scoring.weights.shard_count, 8.0);
        assert_eq!(config.scoring.weights.storage_gb, 1.0);

        let options = config.scoring.to_analysis_options();
        assert_eq!(options.scoring.total_cost, Some(2500.0));
        assert_eq!(options.index_pattern.as_deref(), Some(DEFAULT_INDEX_PATTERN));
    }

    #[test]
    fn test_invalid_mode_is_parse_error() {
        assert!(Config::parse("[scoring]\nmode = \"linear\"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cluster]\nport = 9243\nssl = true\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.cluster.port, 9243);
        assert_eq!(
            config.cluster.to_client_config().base_url(),
            "https://localhost:9243"
        );
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[cluster\n").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_search_reports_source_and_failures() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("good.toml");
        let later = dir.path().join("later.toml");
        std::fs::write(&broken, "[scoring\n").unwrap();
        std::fs::write(&good, "[scoring]\ntotal_cost = 750.0\n").unwrap();
        std::fs::write(&later, "[scoring]\ntotal_cost = 1.0\n").unwrap();

        let search = Config::search(&[missing, broken.clone(), good.clone(), later]);

        assert_eq!(search.source.as_deref(), Some(good.as_path()));
        assert_eq!(search.config.scoring.total_cost, Some(750.0));
        assert_eq!(search.failures.len(), 1);
        assert!(matches!(&search.failures[0], ConfigError::Parse { path, .. } if *path == broken));
    }

    #[test]
    fn test_search_without_files_uses_defaults() {
        let dir = tempdir().unwrap();
        let search = Config::search(&[dir.path().join("none.toml")]);

        assert!(search.source.is_none());
        assert!(search.failures.is_empty());
        assert_eq!(search.config.scoring.total_cost, None);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ES_IMPACT_HOST", "es-prod"),
            ("ES_IMPACT_PORT", "not-a-port"),
            ("ES_IMPACT_USER", "analyst"),
            ("ES_IMPACT_SCORE_MODE", "weighted"),
            ("ES_IMPACT_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.cluster.host, "es-prod");
        assert_eq!(config.cluster.port, 9200);
        assert_eq!(config.cluster.user.as_deref(), Some("analyst"));
        assert_eq!(config.scoring.mode, ScoreMode::Weighted);
        assert_eq!(config.logging.format, "json");
    }
}
