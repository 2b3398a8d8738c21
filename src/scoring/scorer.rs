//! Impact scoring
//!
//! Scores every log group, derives each group's share of the total, and
//! ranks the result.
//!
//! # Formulas
//!
//! ```text
//! normalized = total_storage / disk_total + heap_usage / heap_max
//! weighted   = storage_gb·Ws + shards·Wsh + segments·Wseg
//!            + fielddata_mb·Wfd + query_cache_mb·Wqc
//! percentage = 100 · score / Σ score
//! cost       = total_cost · score / Σ score
//! ```
//!
//! A zero capacity term or a zero total contributes zero instead of
//! dividing; each such substitution is reported as a [`Caveat`].

use serde::Serialize;
use std::cmp::Ordering;

use super::weights::{ScoreMode, ScoringOptions, Weights};
use crate::model::{ClusterCapacity, GroupRecord, MetricRecord};

/// A log group with its impact figures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredGroup {
    #[serde(flatten)]
    pub group: GroupRecord,
    pub impact_score: f64,
    /// Share of the total score over all groups, 0–100
    pub impact_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
}

impl ScoredGroup {
    pub fn log_name(&self) -> &str {
        &self.group.log_name
    }
}

/// Degenerate but non-fatal conditions met during a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Caveat {
    /// Normalized mode without disk capacity: storage term is zero
    DiskCapacityMissing,
    /// Normalized mode without heap capacity: heap term is zero
    HeapCapacityMissing,
    /// Every score is zero: all percentages are zero
    ZeroTotalScore,
    /// Indices reporting less total storage than primary storage
    StorageInconsistency { indices: Vec<String> },
}

impl std::fmt::Display for Caveat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Caveat::DiskCapacityMissing => {
                write!(f, "cluster disk capacity is zero; storage term omitted from scores")
            }
            Caveat::HeapCapacityMissing => {
                write!(f, "cluster heap capacity is zero; heap term omitted from scores")
            }
            Caveat::ZeroTotalScore => {
                write!(f, "total impact score is zero; percentages reported as 0")
            }
            Caveat::StorageInconsistency { indices } => write!(
                f,
                "{} indices report total storage below primary storage: {}",
                indices.len(),
                indices.join(", ")
            ),
        }
    }
}

/// Ranked, annotated output of the scorer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub mode: ScoreMode,
    pub weights: Weights,
    pub capacity: ClusterCapacity,
    /// Sum of scores over every group, including truncated ones
    pub total_score: f64,
    /// Number of groups scored before truncation
    pub total_groups: usize,
    /// Ranked groups, truncated to the requested top N
    pub groups: Vec<ScoredGroup>,
    pub caveats: Vec<Caveat>,
}

/// Capacity-normalized score of one group
pub fn normalized_score(metrics: &MetricRecord, capacity: &ClusterCapacity) -> f64 {
    let storage_term = if capacity.disk_total_bytes == 0 {
        0.0
    } else {
        metrics.total_storage_bytes as f64 / capacity.disk_total_bytes as f64
    };

    let heap_term = if capacity.heap_max_bytes == 0 {
        0.0
    } else {
        metrics.heap_usage_bytes() as f64 / capacity.heap_max_bytes as f64
    };

    storage_term + heap_term
}

/// Weighted score of one group
pub fn weighted_score(metrics: &MetricRecord, weights: &Weights) -> f64 {
    metrics.total_storage_gb() * weights.storage_gb
        + metrics.shard_count as f64 * weights.shard_count
        + metrics.segment_count as f64 * weights.segment_count
        + metrics.fielddata_mb() * weights.fielddata_mb
        + metrics.query_cache_mb() * weights.query_cache_mb
}

/// Score, rank and annotate groups
///
/// Percentages and costs are computed over the full group set before the
/// top-N truncation. Ties in score rank by ascending log name.
pub fn score_groups<I>(groups: I, capacity: &ClusterCapacity, options: &ScoringOptions) -> ScoreReport
where
    I: IntoIterator<Item = GroupRecord>,
{
    let mut caveats = Vec::new();
    if options.mode == ScoreMode::Normalized {
        if capacity.disk_total_bytes == 0 {
            tracing::warn!("Disk capacity is zero; normalized scores skip the storage term");
            caveats.push(Caveat::DiskCapacityMissing);
        }
        if capacity.heap_max_bytes == 0 {
            tracing::warn!("Heap capacity is zero; normalized scores skip the heap term");
            caveats.push(Caveat::HeapCapacityMissing);
        }
    }

    let scored: Vec<(GroupRecord, f64)> = groups
        .into_iter()
        .map(|group| {
            let score = match options.mode {
                ScoreMode::Normalized => normalized_score(&group.metrics, capacity),
                ScoreMode::Weighted => weighted_score(&group.metrics, &options.weights),
            };
            (group, score)
        })
        .collect();

    let total_score: f64 = scored.iter().map(|(_, score)| score).sum();
    let total_groups = scored.len();

    if total_groups > 0 && total_score == 0.0 {
        tracing::warn!(groups = total_groups, "Total impact score is zero");
        caveats.push(Caveat::ZeroTotalScore);
    }

    let mut ranked: Vec<ScoredGroup> = scored
        .into_iter()
        .map(|(group, impact_score)| {
            let share = if total_score == 0.0 {
                0.0
            } else {
                impact_score / total_score
            };
            ScoredGroup {
                group,
                impact_score,
                impact_percentage: share * 100.0,
                estimated_cost: options.total_cost.map(|cost| cost * share),
            }
        })
        .collect();

    ranked.sort_by(rank_order);

    if let Some(top) = options.top {
        ranked.truncate(top);
    }

    tracing::debug!(
        mode = %options.mode,
        groups = total_groups,
        shown = ranked.len(),
        total_score,
        "Scored log groups"
    );

    ScoreReport {
        mode: options.mode,
        weights: options.weights,
        capacity: *capacity,
        total_score,
        total_groups,
        groups: ranked,
        caveats,
    }
}

/// Descending score, then ascending log name
fn rank_order(a: &ScoredGroup, b: &ScoredGroup) -> Ordering {
    b.impact_score
        .total_cmp(&a.impact_score)
        .then_with(|| a.log_name().cmp(b.log_name()))
}
