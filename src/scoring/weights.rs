//! Scoring configuration values

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How impact scores are computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    /// Share of provisioned disk plus share of provisioned heap
    #[default]
    Normalized,
    /// Linear combination of storage, shards, segments and caches
    Weighted,
}

impl std::fmt::Display for ScoreMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreMode::Normalized => write!(f, "normalized"),
            ScoreMode::Weighted => write!(f, "weighted"),
        }
    }
}

impl FromStr for ScoreMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normalized" => Ok(ScoreMode::Normalized),
            "weighted" => Ok(ScoreMode::Weighted),
            other => Err(format!(
                "unknown score mode '{}', expected 'normalized' or 'weighted'",
                other
            )),
        }
    }
}

/// Weights for weighted-mode scoring
///
/// Each term is `metric × weight`; storage is in GB, fielddata and query
/// cache in MB, shards and segments are plain counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    #[serde(default = "default_storage_weight")]
    pub storage_gb: f64,
    #[serde(default = "default_shard_weight")]
    pub shard_count: f64,
    #[serde(default = "default_segment_weight")]
    pub segment_count: f64,
    #[serde(default = "default_fielddata_weight")]
    pub fielddata_mb: f64,
    #[serde(default = "default_query_cache_weight")]
    pub query_cache_mb: f64,
}

fn default_storage_weight() -> f64 {
    1.0
}

fn default_shard_weight() -> f64 {
    5.0
}

fn default_segment_weight() -> f64 {
    0.1
}

fn default_fielddata_weight() -> f64 {
    2.0
}

fn default_query_cache_weight() -> f64 {
    0.5
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            storage_gb: default_storage_weight(),
            shard_count: default_shard_weight(),
            segment_count: default_segment_weight(),
            fielddata_mb: default_fielddata_weight(),
            query_cache_mb: default_query_cache_weight(),
        }
    }
}

impl std::fmt::Display for Weights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "storage_gb={}, shard_count={}, segment_count={}, fielddata_mb={}, query_cache_mb={}",
            self.storage_gb, self.shard_count, self.segment_count, self.fielddata_mb, self.query_cache_mb
        )
    }
}

/// Everything the scorer needs besides the groups and capacity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringOptions {
    pub mode: ScoreMode,
    pub weights: Weights,
    /// Keep only the top N groups in the output
    pub top: Option<usize>,
    /// Monthly cluster cost to apportion
    pub total_cost: Option<f64>,
}

impl ScoringOptions {
    pub fn new(mode: ScoreMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Builder method: set weights
    pub fn weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Builder method: limit output to the top N groups
    pub fn top(mut self, top: usize) -> Self {
        self.top = Some(top);
        self
    }

    /// Builder method: apportion a total cost
    pub fn total_cost(mut self, cost: f64) -> Self {
        self.total_cost = Some(cost);
        self
    }
}
