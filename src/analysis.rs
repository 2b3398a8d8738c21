//! Analysis pipeline
//!
//! Runs collection, grouping and scoring over one snapshot of raw payloads:
//!
//! ```text
//! RawPayloads → collect → group_indices → score_groups → Analysis
//! ```
//!
//! Every stage is a pure function of its inputs, so the same payloads and
//! options always produce the same analysis.

use serde::Serialize;

use crate::collector::{collect, RawPayloads};
use crate::error::ImpactResult;
use crate::grouping::{group_indices, IndexClassifier, PatternClassifier};
use crate::scoring::{score_groups, Caveat, ScoreReport, ScoringOptions};

/// Options for one analysis run
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Grouping pattern with a `log_name` capture; `None` uses the default
    pub index_pattern: Option<String>,
    pub scoring: ScoringOptions,
}

impl AnalysisOptions {
    pub fn new(scoring: ScoringOptions) -> Self {
        Self {
            index_pattern: None,
            scoring,
        }
    }

    /// Builder method: group with a custom pattern
    pub fn index_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.index_pattern = Some(pattern.into());
        self
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Ranked, scored log groups
    pub report: ScoreReport,
    /// Number of indices in the stats payload
    pub indices_collected: usize,
    /// Indices outside the naming convention
    pub unmatched: Vec<String>,
}

/// Analyze raw payloads with a pattern-based grouping rule
///
/// The pattern is compiled before any payload is read, so a bad pattern
/// fails the run without doing collection work.
pub fn analyze(payloads: &RawPayloads, options: &AnalysisOptions) -> ImpactResult<Analysis> {
    let classifier = match options.index_pattern.as_deref() {
        Some(pattern) => PatternClassifier::new(pattern)?,
        None => PatternClassifier::default_pattern(),
    };

    analyze_with(payloads, &classifier, &options.scoring)
}

/// Analyze raw payloads with any classifier
pub fn analyze_with<C>(
    payloads: &RawPayloads,
    classifier: &C,
    scoring: &ScoringOptions,
) -> ImpactResult<Analysis>
where
    C: IndexClassifier + ?Sized,
{
    let collection = collect(payloads)?;
    let grouping = group_indices(&collection.indices, classifier);

    if grouping.groups.is_empty() {
        tracing::warn!(
            rule = %classifier.describe(),
            "No indices matched the grouping rule"
        );
    }

    let mut report = score_groups(grouping.groups.into_values(), &collection.capacity, scoring);

    if !collection.inconsistent.is_empty() {
        report.caveats.push(Caveat::StorageInconsistency {
            indices: collection.inconsistent.clone(),
        });
    }

    Ok(Analysis {
        report,
        indices_collected: collection.indices.len(),
        unmatched: grouping.unmatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImpactError;
    use crate::scoring::ScoreMode;
    use serde_json::{json, Value};

    const MB: u64 = 1024 * 1024;
    const GB: u64 = 1024 * MB;

    fn entry(primary: u64, total: u64, fielddata: u64) -> Value {
        json!({
            "primaries": {
                "store": {"size_in_bytes": primary},
                "fielddata": {"memory_size_in_bytes": fielddata}
            },
            "total": {"store": {"size_in_bytes": total}}
        })
    }

    fn payloads() -> RawPayloads {
        RawPayloads::new(
            json!({"indices": {
                "logstash-app-000001": entry(5 * GB, 10 * GB, 100 * MB),
                "logstash-app-000002": entry(10 * GB, 20 * GB, 50 * MB),
                "logstash-web-000001": entry(GB, 2 * GB, 0),
                "other-2024-01-01": entry(GB, GB, 0)
            }}),
            json!({
                "logstash-app-000001": {"settings": {"index": {"number_of_shards": "1", "number_of_replicas": "1"}}},
                "logstash-app-000002": {"settings": {"index": {"number_of_shards": "1", "number_of_replicas": "1"}}}
            }),
            json!({"nodes": {"n1": {
                "roles": ["data"],
                "jvm": {"mem": {"heap_max_in_bytes": 1000 * MB}},
                "fs": {"total": {"total_in_bytes": 1000 * GB}}
            }}}),
        )
    }

    #[test]
    fn test_end_to_end_normalized() {
        let analysis = analyze(&payloads(), &AnalysisOptions::default()).unwrap();

        assert_eq!(analysis.indices_collected, 4);
        assert_eq!(analysis.unmatched, vec!["other-2024-01-01"]);

        let report = &analysis.report;
        assert_eq!(report.total_groups, 2);
        let app = &report.groups[0];
        assert_eq!(app.log_name(), "app");
        assert_eq!(app.group.metrics.shard_count, 4);
        assert!((app.impact_score - 0.18).abs() < 1e-9);
        assert_eq!(report.groups[1].log_name(), "web");
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let options = AnalysisOptions::new(ScoringOptions::new(ScoreMode::Weighted).total_cost(100.0));
        let a = analyze(&payloads(), &options).unwrap();
        let b = analyze(&payloads(), &options).unwrap();
        assert_eq!(a.report, b.report);
    }

    #[test]
    fn test_bad_pattern_fails_before_collection() {
        // Empty stats would be a collection error; the pattern error wins.
        let empty = RawPayloads::default();
        let options = AnalysisOptions::default().index_pattern(r"^(.+)-\d+$");
        assert!(matches!(analyze(&empty, &options), Err(ImpactError::Pattern(_))));
    }

    #[test]
    fn test_empty_stats_is_collection_error() {
        let empty = RawPayloads::new(json!({"indices": {}}), Value::Null, Value::Null);
        assert!(matches!(
            analyze(&empty, &AnalysisOptions::default()),
            Err(ImpactError::Collection(_))
        ));
    }

    #[test]
    fn test_no_matching_groups_is_not_fatal() {
        let options = AnalysisOptions::default().index_pattern(r"^nomatch-(?P<log_name>.+)$");
        let analysis = analyze(&payloads(), &options).unwrap();
        assert!(analysis.report.groups.is_empty());
        assert_eq!(analysis.unmatched.len(), 4);
    }

    #[test]
    fn test_members_follow_payload_order() {
        let stats: Value = serde_json::from_str(
            r#"{"indices":{"logstash-app-000002":{},"logstash-app-000001":{}}}"#,
        )
        .unwrap();
        let payloads = RawPayloads::new(stats, Value::Null, Value::Null);

        let analysis = analyze(&payloads, &AnalysisOptions::default()).unwrap();
        assert_eq!(
            analysis.report.groups[0].group.indices,
            vec!["logstash-app-000002", "logstash-app-000001"]
        );
    }

    #[test]
    fn test_storage_inconsistency_surfaces_as_caveat() {
        let payloads = RawPayloads::new(
            json!({"indices": {"logstash-odd-000001": entry(10 * GB, 5 * GB, 0)}}),
            Value::Null,
            json!({"nodes": {"n1": {"fs": {"total": {"total_in_bytes": 100 * GB}}, "jvm": {"mem": {"heap_max_in_bytes": GB}}}}}),
        );

        let analysis = analyze(&payloads, &AnalysisOptions::default()).unwrap();
        assert_eq!(
            analysis.report.caveats,
            vec![Caveat::StorageInconsistency {
                indices: vec!["logstash-odd-000001".to_string()]
            }]
        );
    }
}
