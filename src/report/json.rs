//! Machine-readable report
//!
//! One object per displayed group, with storage in GB and heap figures in
//! MB, rounded for presentation. Caveats about the inputs sit next to the
//! groups so machine consumers see them too.

use serde::Serialize;

use crate::model::bytes_to_mb;
use crate::scoring::{Caveat, ScoreReport, ScoredGroup};

/// Top-level JSON document
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub groups: Vec<JsonGroup>,
    pub caveats: Vec<Caveat>,
}

/// JSON view of one scored group
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    pub log_name: String,
    pub index_count: usize,
    pub impact_score: f64,
    pub impact_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    pub metrics: JsonMetrics,
    pub indices: Vec<String>,
}

/// Human-unit metrics of a group
#[derive(Debug, Clone, Serialize)]
pub struct JsonMetrics {
    pub primary_storage_gb: f64,
    pub total_storage_gb: f64,
    pub doc_count: u64,
    pub total_shards: u64,
    pub total_segments: u64,
    pub segment_memory_mb: f64,
    pub fielddata_mb: f64,
    pub query_cache_mb: f64,
    pub request_cache_mb: f64,
}

impl From<&ScoredGroup> for JsonGroup {
    fn from(scored: &ScoredGroup) -> Self {
        let m = &scored.group.metrics;
        Self {
            log_name: scored.group.log_name.clone(),
            index_count: scored.group.index_count,
            impact_score: round_to(scored.impact_score, 6),
            impact_percentage: round_to(scored.impact_percentage, 4),
            estimated_cost: scored.estimated_cost.map(|c| round_to(c, 2)),
            metrics: JsonMetrics {
                primary_storage_gb: round_to(m.primary_storage_gb(), 3),
                total_storage_gb: round_to(m.total_storage_gb(), 3),
                doc_count: m.doc_count,
                total_shards: m.shard_count,
                total_segments: m.segment_count,
                segment_memory_mb: round_to(bytes_to_mb(m.segment_memory_bytes), 2),
                fielddata_mb: round_to(m.fielddata_mb(), 2),
                query_cache_mb: round_to(m.query_cache_mb(), 2),
                request_cache_mb: round_to(bytes_to_mb(m.request_cache_bytes), 2),
            },
            indices: scored.group.indices.clone(),
        }
    }
}

/// JSON document for the displayed groups
pub fn json_groups(report: &ScoreReport) -> Vec<JsonGroup> {
    report.groups.iter().map(JsonGroup::from).collect()
}

/// Pretty-printed JSON report of the displayed groups and caveats
pub fn render_json(report: &ScoreReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        groups: json_groups(report),
        caveats: report.caveats.clone(),
    })
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
