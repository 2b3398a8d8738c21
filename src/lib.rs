//! # es-impact
//!
//! Index impact analysis for multi-tenant Elasticsearch clusters: apportion
//! shared cluster cost across log groups by the storage and heap their
//! indices consume.
//!
//! ## Pipeline
//!
//! ```text
//! stats/settings/nodes documents
//!   → collector  (per-index MetricRecord + ClusterCapacity)
//!   → grouping   (log name → GroupRecord)
//!   → scoring    (ranked ScoredGroup with percentage and cost)
//!   → report     (table or JSON)
//! ```
//!
//! ## Modules
//!
//! - [`model`]: Metric, capacity and group records
//! - [`collector`]: Typed payloads and metric extraction
//! - [`grouping`]: Index classifiers and aggregation
//! - [`scoring`]: Normalized and weighted impact scores
//! - [`report`]: Text and JSON rendering
//! - [`client`]: Live and offline sources of the raw documents
//!
//! ## Quick Start
//!
//! ```rust
//! use es_impact::{analyze, AnalysisOptions, RawPayloads};
//! use serde_json::json;
//!
//! let payloads = RawPayloads::new(
//!     json!({"indices": {
//!         "logstash-app-000001": {"total": {"store": {"size_in_bytes": 1_000_000}}}
//!     }}),
//!     json!({}),
//!     json!({"nodes": {"n1": {"fs": {"total": {"total_in_bytes": 10_000_000}}}}}),
//! );
//!
//! let analysis = analyze(&payloads, &AnalysisOptions::default()).unwrap();
//! assert_eq!(analysis.report.groups[0].group.log_name, "app");
//! assert!((analysis.report.groups[0].impact_score - 0.1).abs() < 1e-9);
//! ```

pub mod analysis;
pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod grouping;
pub mod model;
pub mod report;
pub mod scoring;

// Re-export top-level types for convenience
pub use analysis::{analyze, analyze_with, Analysis, AnalysisOptions};

pub use error::{ImpactError, ImpactResult};

pub use model::{ClusterCapacity, GroupRecord, MetricRecord};

pub use collector::{collect, Collection, RawPayloads};

pub use grouping::{
    group_indices, Grouping, IndexClassifier, PatternClassifier, DEFAULT_INDEX_PATTERN,
};

pub use scoring::{
    score_groups, Caveat, ScoreMode, ScoreReport, ScoredGroup, ScoringOptions, Weights,
};

pub use report::{render, render_json, render_table, JsonReport, OutputFormat};

pub use client::{ClientError, ElasticsearchClient, ElasticsearchConfig, FileSource, StatsSource};

pub use config::{generate_default_config, Config, ConfigError, ConfigSearch, LoggingConfig};
