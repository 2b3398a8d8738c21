//! Stats collection
//!
//! Turns the three raw cluster documents into per-index metric records and
//! a cluster capacity snapshot. Performs no I/O.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::payload::{
    IndexSettings, IndexSettingsEntry, IndexStats, IndexStatsResponse, NodeStats,
    NodesStatsResponse,
};
use crate::error::{ImpactError, ImpactResult};
use crate::model::{ClusterCapacity, MetricRecord};

/// Raw documents as fetched from the cluster
#[derive(Debug, Clone, Default)]
pub struct RawPayloads {
    /// `GET /_stats?level=indices`
    pub index_stats: Value,
    /// `GET /_settings`
    pub index_settings: Value,
    /// `GET /_nodes/stats/jvm,fs`
    pub node_stats: Value,
}

impl RawPayloads {
    pub fn new(index_stats: Value, index_settings: Value, node_stats: Value) -> Self {
        Self {
            index_stats,
            index_settings,
            node_stats,
        }
    }
}

/// Output of one collection run
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Index name to normalized metrics, in payload order
    pub indices: IndexMap<String, MetricRecord>,
    /// Provisioned data node capacity
    pub capacity: ClusterCapacity,
    /// Indices whose total storage is below their primary storage
    pub inconsistent: Vec<String>,
}

impl Collection {
    /// Sum of every collected record
    pub fn totals(&self) -> MetricRecord {
        self.indices.values().copied().sum()
    }
}

/// Collect per-index metrics and cluster capacity
///
/// Node stats are read first: the data node count feeds replica
/// auto-expansion when computing shard counts.
///
/// # Errors
///
/// - [`ImpactError::Collection`] when index stats list no indices
/// - [`ImpactError::Schema`] when an index entry is not an object
/// - [`ImpactError::Payload`] when an envelope has the wrong shape
pub fn collect(payloads: &RawPayloads) -> ImpactResult<Collection> {
    let capacity = collect_capacity(&payloads.node_stats)?;
    let settings = collect_settings(&payloads.index_settings)?;

    let stats: IndexStatsResponse = decode(&payloads.index_stats)?;
    if stats.indices.is_empty() {
        return Err(ImpactError::Collection(
            "index stats payload contains no indices".to_string(),
        ));
    }

    let mut indices = IndexMap::with_capacity(stats.indices.len());
    let mut inconsistent = Vec::new();

    for (name, entry) in &stats.indices {
        if !entry.is_object() {
            return Err(ImpactError::Schema {
                index: name.clone(),
                reason: format!("expected an object, found {}", json_kind(entry)),
            });
        }

        let parsed = IndexStats::deserialize(entry).map_err(|e| ImpactError::Schema {
            index: name.clone(),
            reason: e.to_string(),
        })?;

        let shard_count = settings
            .get(name)
            .map(|s| s.shard_count(capacity.data_nodes))
            .unwrap_or(1);
        let record = parsed.to_record(shard_count);

        if !record.is_storage_consistent() {
            tracing::warn!(
                index = %name,
                primary_bytes = record.primary_storage_bytes,
                total_bytes = record.total_storage_bytes,
                "Total storage is below primary storage"
            );
            inconsistent.push(name.clone());
        }

        tracing::debug!(
            index = %name,
            total_bytes = record.total_storage_bytes,
            shards = record.shard_count,
            heap_bytes = record.heap_usage_bytes(),
            "Collected index metrics"
        );

        indices.insert(name.clone(), record);
    }

    tracing::info!(
        indices = indices.len(),
        data_nodes = capacity.data_nodes,
        "Collected index statistics"
    );

    Ok(Collection {
        indices,
        capacity,
        inconsistent,
    })
}

/// Sum disk and heap capacity over the data nodes
///
/// Node entries that are not objects are skipped with a warning.
pub fn collect_capacity(node_stats: &Value) -> ImpactResult<ClusterCapacity> {
    let response: NodesStatsResponse = decode(node_stats)?;

    let mut capacity = ClusterCapacity::default();
    for (id, entry) in &response.nodes {
        let node = match NodeStats::deserialize(entry) {
            Ok(node) => node,
            Err(e) => {
                tracing::warn!(node = %id, error = %e, "Ignoring malformed node stats");
                continue;
            }
        };
        if !node.is_data_node() {
            continue;
        }
        capacity.data_nodes = capacity.data_nodes.saturating_add(1);
        capacity.heap_max_bytes = capacity
            .heap_max_bytes
            .saturating_add(node.jvm.mem.heap_max_in_bytes);
        capacity.disk_total_bytes = capacity
            .disk_total_bytes
            .saturating_add(node.fs.total.total_in_bytes);
    }

    Ok(capacity)
}

/// Shard layout settings keyed by index name
///
/// Entries with an unusable shape are skipped with a warning; the index
/// then falls back to a single primary without replicas.
fn collect_settings(payload: &Value) -> ImpactResult<BTreeMap<String, IndexSettings>> {
    let entries: BTreeMap<String, Value> = decode(payload)?;

    let mut settings = BTreeMap::new();
    for (name, entry) in entries {
        match IndexSettingsEntry::deserialize(&entry) {
            Ok(parsed) => {
                settings.insert(name, parsed.settings.index);
            }
            Err(e) => {
                tracing::warn!(index = %name, error = %e, "Ignoring malformed index settings");
            }
        }
    }

    Ok(settings)
}

/// Decode an envelope, reading `null` as an empty document
fn decode<T: DeserializeOwned + Default>(value: &Value) -> ImpactResult<T> {
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(T::deserialize(value)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GB: u64 = 1024 * 1024 * 1024;

    fn index_entry(primary: u64, total: u64, docs: u64) -> Value {
        json!({
            "primaries": {
                "docs": {"count": docs},
                "store": {"size_in_bytes": primary}
            },
            "total": {"store": {"size_in_bytes": total}}
        })
    }

    fn nodes() -> Value {
        json!({
            "nodes": {
                "n1": {
                    "roles": ["data", "master"],
                    "jvm": {"mem": {"heap_max_in_bytes": 4 * GB}},
                    "fs": {"total": {"total_in_bytes": 500 * GB}}
                },
                "n2": {
                    "roles": ["data_hot"],
                    "jvm": {"mem": {"heap_max_in_bytes": 4 * GB}},
                    "fs": {"total": {"total_in_bytes": 500 * GB}}
                },
                "coordinator": {
                    "roles": ["ingest"],
                    "jvm": {"mem": {"heap_max_in_bytes": 2 * GB}},
                    "fs": {"total": {"total_in_bytes": 50 * GB}}
                }
            }
        })
    }

    #[test]
    fn test_collect_builds_records_and_capacity() {
        let payloads = RawPayloads::new(
            json!({"indices": {
                "logstash-app-000001": index_entry(5 * GB, 10 * GB, 1000),
                "logstash-app-000002": index_entry(10 * GB, 20 * GB, 2000)
            }}),
            json!({
                "logstash-app-000001": {"settings": {"index": {"number_of_shards": "1", "number_of_replicas": "1"}}},
                "logstash-app-000002": {"settings": {"index": {"number_of_shards": "2", "number_of_replicas": "0"}}}
            }),
            nodes(),
        );

        let collection = collect(&payloads).unwrap();

        assert_eq!(collection.indices.len(), 2);
        let first = &collection.indices["logstash-app-000001"];
        assert_eq!(first.primary_storage_bytes, 5 * GB);
        assert_eq!(first.total_storage_bytes, 10 * GB);
        assert_eq!(first.doc_count, 1000);
        assert_eq!(first.shard_count, 2);
        assert_eq!(collection.indices["logstash-app-000002"].shard_count, 2);
        assert_eq!(collection.totals().total_storage_bytes, 30 * GB);
        assert_eq!(collection.totals().doc_count, 3000);

        assert_eq!(collection.capacity.data_nodes, 2);
        assert_eq!(collection.capacity.disk_total_bytes, 1000 * GB);
        assert_eq!(collection.capacity.heap_max_bytes, 8 * GB);
        assert!(collection.inconsistent.is_empty());
    }

    #[test]
    fn test_missing_settings_yield_single_shard() {
        let payloads = RawPayloads::new(
            json!({"indices": {"orphan": index_entry(1, 2, 3)}}),
            Value::Null,
            Value::Null,
        );

        let collection = collect(&payloads).unwrap();
        assert_eq!(collection.indices["orphan"].shard_count, 1);
        assert_eq!(collection.capacity, ClusterCapacity::default());
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let payloads = RawPayloads::new(
            json!({"indices": {"bare": {}}}),
            json!({}),
            json!({}),
        );

        let collection = collect(&payloads).unwrap();
        let record = collection.indices["bare"];
        assert_eq!(record.total_storage_bytes, 0);
        assert_eq!(record.heap_usage_bytes(), 0);
        assert_eq!(record.shard_count, 1);
    }

    #[test]
    fn test_empty_stats_is_collection_error() {
        let payloads = RawPayloads::new(json!({"indices": {}}), json!({}), nodes());
        assert!(matches!(collect(&payloads), Err(ImpactError::Collection(_))));

        let payloads = RawPayloads::new(json!({}), json!({}), nodes());
        assert!(matches!(collect(&payloads), Err(ImpactError::Collection(_))));
    }

    #[test]
    fn test_non_object_entry_is_schema_error() {
        let payloads = RawPayloads::new(
            json!({"indices": {"good": index_entry(1, 2, 3), "bad": [1, 2, 3]}}),
            json!({}),
            nodes(),
        );

        match collect(&payloads) {
            Err(ImpactError::Schema { index, reason }) => {
                assert_eq!(index, "bad");
                assert!(reason.contains("an array"));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_inconsistent_storage_is_kept_and_reported() {
        let payloads = RawPayloads::new(
            json!({"indices": {"odd": index_entry(10, 4, 1)}}),
            json!({}),
            json!({}),
        );

        let collection = collect(&payloads).unwrap();
        assert_eq!(collection.inconsistent, vec!["odd"]);
        assert_eq!(collection.indices["odd"].primary_storage_bytes, 10);
        assert_eq!(collection.indices["odd"].total_storage_bytes, 4);
    }

    #[test]
    fn test_auto_expand_uses_data_node_count() {
        let payloads = RawPayloads::new(
            json!({"indices": {".kibana": index_entry(1, 2, 1)}}),
            json!({".kibana": {"settings": {"index": {
                "number_of_shards": "1",
                "auto_expand_replicas": "0-all"
            }}}}),
            nodes(),
        );

        let collection = collect(&payloads).unwrap();
        // two data nodes: one replica
        assert_eq!(collection.indices[".kibana"].shard_count, 2);
    }

    #[test]
    fn test_malformed_settings_entry_is_ignored() {
        let payloads = RawPayloads::new(
            json!({"indices": {"a": index_entry(1, 2, 1)}}),
            json!({"a": {"settings": "broken"}}),
            json!({}),
        );

        let collection = collect(&payloads).unwrap();
        assert_eq!(collection.indices["a"].shard_count, 1);
    }

    #[test]
    fn test_indices_keep_payload_order() {
        let stats: Value = serde_json::from_str(
            r#"{"indices": {"logstash-app-000002": {}, "logstash-app-000001": {}}}"#,
        )
        .unwrap();
        let payloads = RawPayloads::new(stats, Value::Null, Value::Null);

        let collection = collect(&payloads).unwrap();
        let names: Vec<&str> = collection.indices.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["logstash-app-000002", "logstash-app-000001"]);
    }

    #[test]
    fn test_malformed_subsection_reads_as_zero() {
        let payloads = RawPayloads::new(
            json!({"indices": {"logstash-app-000001": {
                "primaries": {"store": "5gb", "docs": {"count": 7}},
                "total": {"store": {"size_in_bytes": 10}}
            }}}),
            json!({}),
            json!({}),
        );

        let collection = collect(&payloads).unwrap();
        let record = collection.indices["logstash-app-000001"];
        assert_eq!(record.primary_storage_bytes, 0);
        assert_eq!(record.total_storage_bytes, 10);
        assert_eq!(record.doc_count, 7);
    }

    #[test]
    fn test_malformed_node_entries_are_tolerated() {
        let node_stats = json!({"nodes": {
            "n1": {
                "roles": "data",
                "jvm": {"mem": {"heap_max_in_bytes": 4 * GB}},
                "fs": {"total": {"total_in_bytes": 100 * GB}}
            },
            "n2": "gone",
            "n3": {
                "roles": ["data"],
                "jvm": [],
                "fs": {"total": {"total_in_bytes": 100 * GB}}
            }
        }});

        let capacity = collect_capacity(&node_stats).unwrap();
        assert_eq!(capacity.data_nodes, 2);
        assert_eq!(capacity.heap_max_bytes, 4 * GB);
        assert_eq!(capacity.disk_total_bytes, 200 * GB);
    }

    #[test]
    fn test_huge_shard_settings_do_not_panic() {
        let payloads = RawPayloads::new(
            json!({"indices": {"logstash-app-000001": index_entry(1, 2, 1)}}),
            json!({"logstash-app-000001": {"settings": {"index": {
                "number_of_shards": "4294967296",
                "number_of_replicas": "4294967296"
            }}}}),
            json!({}),
        );

        let collection = collect(&payloads).unwrap();
        assert_eq!(collection.indices["logstash-app-000001"].shard_count, u64::MAX);
    }

    #[test]
    fn test_non_object_envelope_is_payload_error() {
        let payloads = RawPayloads::new(json!([1, 2]), json!({}), json!({}));
        assert!(matches!(collect(&payloads), Err(ImpactError::Payload(_))));
    }
}
