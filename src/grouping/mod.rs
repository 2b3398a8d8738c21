//! Grouper
//!
//! Partitions collected indices into log groups and sums each group's
//! metrics.
//!
//! Membership is decided by an [`IndexClassifier`]. The stock classifier is
//! [`PatternClassifier`], a regular expression with a `log_name` capture:
//!
//! ```text
//! logstash-nginx-access-000001  ->  nginx-access
//! other-2024-01-01              ->  (not grouped)
//! ```

mod classifier;

pub use classifier::{IndexClassifier, PatternClassifier, DEFAULT_INDEX_PATTERN, LOG_NAME_GROUP};

use std::collections::BTreeMap;

use crate::model::{GroupRecord, MetricRecord};

/// Result of grouping one collection
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    /// Log name to aggregated group
    pub groups: BTreeMap<String, GroupRecord>,
    /// Indices rejected by the classifier, in visit order
    pub unmatched: Vec<String>,
}

impl Grouping {
    /// Number of indices placed in some group
    pub fn matched_count(&self) -> usize {
        self.groups.values().map(|g| g.index_count).sum()
    }
}

/// Group indices by the key the classifier extracts
///
/// Indices are visited in iteration order of `indices`; each group's member
/// list keeps that order. Rejected indices are excluded from every group.
pub fn group_indices<'a, I, C>(indices: I, classifier: &C) -> Grouping
where
    I: IntoIterator<Item = (&'a String, &'a MetricRecord)>,
    C: IndexClassifier + ?Sized,
{
    let mut grouping = Grouping::default();

    for (name, record) in indices {
        match classifier.classify(name) {
            Some(log_name) => {
                tracing::debug!(index = %name, log_name = %log_name, "Grouped index");
                grouping
                    .groups
                    .entry(log_name.clone())
                    .or_insert_with(|| GroupRecord::new(log_name))
                    .absorb(name.as_str(), record);
            }
            None => {
                tracing::debug!(index = %name, "Index does not match grouping rule");
                grouping.unmatched.push(name.clone());
            }
        }
    }

    if !grouping.unmatched.is_empty() {
        tracing::info!(
            skipped = grouping.unmatched.len(),
            rule = %classifier.describe(),
            "Skipped indices outside the naming convention"
        );
    }

    grouping
}
