//! Typed statistics payloads
//!
//! Strongly typed views over the three cluster documents the collector
//! consumes. Every field is optional in the wire format; absent fields
//! read as zero (stats) or as unset (settings). Numbers may arrive as JSON
//! numbers or as numeric strings. A sub-section of the wrong shape reads as
//! empty and is logged.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::model::MetricRecord;

// ============================================
// Lenient field decoding
// ============================================

fn numeric_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(numeric_u64).unwrap_or(0))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Decode a nested section, falling back to its default when malformed
fn lenient_section<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => T::default(),
        Some(value) => T::deserialize(&value).unwrap_or_else(|e| {
            tracing::warn!(
                section = std::any::type_name::<T>(),
                error = %e,
                "Ignoring malformed stats section"
            );
            T::default()
        }),
    })
}

/// Role list; a bare string counts as a single role
fn lenient_roles<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => vec![s],
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            tracing::warn!(roles = %other, "Ignoring malformed node roles");
            Vec::new()
        }
    })
}

// ============================================
// Index stats (`GET /_stats?level=indices`)
// ============================================

/// Envelope of the index-level stats document
#[derive(Debug, Default, Deserialize)]
pub struct IndexStatsResponse {
    /// Index name to raw per-index entry, in payload order; entries are
    /// validated one by one
    #[serde(default)]
    pub indices: IndexMap<String, Value>,
}

/// Stats of a single index
#[derive(Debug, Default, Deserialize)]
pub struct IndexStats {
    #[serde(default, deserialize_with = "lenient_section")]
    pub primaries: ShardStats,
    #[serde(default, deserialize_with = "lenient_section")]
    pub total: ShardStats,
}

/// Stats section for either primaries or primaries + replicas
#[derive(Debug, Default, Deserialize)]
pub struct ShardStats {
    #[serde(default, deserialize_with = "lenient_section")]
    pub docs: DocsStats,
    #[serde(default, deserialize_with = "lenient_section")]
    pub store: StoreStats,
    #[serde(default, deserialize_with = "lenient_section")]
    pub segments: SegmentsStats,
    #[serde(default, deserialize_with = "lenient_section")]
    pub fielddata: MemoryStats,
    #[serde(default, deserialize_with = "lenient_section")]
    pub query_cache: MemoryStats,
    #[serde(default, deserialize_with = "lenient_section")]
    pub request_cache: MemoryStats,
}

#[derive(Debug, Default, Deserialize)]
pub struct DocsStats {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub count: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreStats {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub size_in_bytes: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SegmentsStats {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub count: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub memory_in_bytes: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct MemoryStats {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub memory_size_in_bytes: u64,
}

impl IndexStats {
    /// Build the normalized record; shard count comes from the settings
    pub fn to_record(&self, shard_count: u64) -> MetricRecord {
        let p = &self.primaries;
        MetricRecord {
            primary_storage_bytes: p.store.size_in_bytes,
            total_storage_bytes: self.total.store.size_in_bytes,
            doc_count: p.docs.count,
            shard_count,
            segment_count: p.segments.count,
            segment_memory_bytes: p.segments.memory_in_bytes,
            fielddata_bytes: p.fielddata.memory_size_in_bytes,
            query_cache_bytes: p.query_cache.memory_size_in_bytes,
            request_cache_bytes: p.request_cache.memory_size_in_bytes,
        }
    }
}

// ============================================
// Index settings (`GET /_settings`)
// ============================================

/// One entry of the settings document, keyed by index name
#[derive(Debug, Default, Deserialize)]
pub struct IndexSettingsEntry {
    #[serde(default)]
    pub settings: SettingsBody,
}

#[derive(Debug, Default, Deserialize)]
pub struct SettingsBody {
    #[serde(default)]
    pub index: IndexSettings,
}

/// Shard layout settings of one index
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexSettings {
    #[serde(default, deserialize_with = "lenient_string")]
    pub number_of_shards: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub number_of_replicas: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub auto_expand_replicas: Option<String>,
}

impl IndexSettings {
    /// Primary shard count, 1 when unset or unparseable
    pub fn primaries(&self) -> u64 {
        self.number_of_shards
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(1)
    }

    /// Effective replica count
    ///
    /// A numeric `number_of_replicas` always wins. Otherwise an
    /// auto-expand range (`"0-1"`, `"0-all"`) expands to one replica per
    /// additional data node, clamped to the range. Without a known data
    /// node count the range minimum is used.
    pub fn replicas(&self, data_nodes: u32) -> u64 {
        let configured = self.number_of_replicas.as_deref().map(str::trim);
        if let Some(n) = configured.and_then(|r| r.parse::<u64>().ok()) {
            return n;
        }

        let auto = match self.auto_expand_replicas.as_deref().map(str::trim) {
            Some(v) if is_enabled(v) => v,
            _ => match configured {
                Some(v) if is_enabled(v) => v,
                _ => return 0,
            },
        };

        let (min, max) = parse_auto_expand(auto);
        if data_nodes == 0 {
            return min;
        }

        let expanded = min.max(u64::from(data_nodes) - 1);
        max.map_or(expanded, |cap| expanded.min(cap))
    }

    /// primaries × (1 + replicas), saturating on absurd settings
    pub fn shard_count(&self, data_nodes: u32) -> u64 {
        self.primaries()
            .saturating_mul(self.replicas(data_nodes).saturating_add(1))
    }
}

fn is_enabled(value: &str) -> bool {
    !value.is_empty() && value != "false"
}

/// Parse an auto-expand range into (min, max); `None` max means unbounded
fn parse_auto_expand(value: &str) -> (u64, Option<u64>) {
    let Some((min, max)) = value.split_once('-') else {
        return (0, None);
    };

    let min = min.trim().parse().unwrap_or(0);
    match max.trim() {
        "all" => (min, None),
        other => (min, Some(other.parse().unwrap_or(0))),
    }
}

// ============================================
// Node stats (`GET /_nodes/stats/jvm,fs`)
// ============================================

/// Envelope of the per-node stats document
#[derive(Debug, Default, Deserialize)]
pub struct NodesStatsResponse {
    /// Node id to raw node entry; entries are decoded one by one
    #[serde(default)]
    pub nodes: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NodeStats {
    #[serde(default, deserialize_with = "lenient_roles")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "lenient_section")]
    pub jvm: JvmStats,
    #[serde(default, deserialize_with = "lenient_section")]
    pub fs: FsStats,
}

#[derive(Debug, Default, Deserialize)]
pub struct JvmStats {
    #[serde(default, deserialize_with = "lenient_section")]
    pub mem: JvmMemStats,
}

#[derive(Debug, Default, Deserialize)]
pub struct JvmMemStats {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub heap_max_in_bytes: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct FsStats {
    #[serde(default, deserialize_with = "lenient_section")]
    pub total: FsTotalStats,
}

#[derive(Debug, Default, Deserialize)]
pub struct FsTotalStats {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_in_bytes: u64,
}

impl NodeStats {
    /// Nodes without a role list predate roles and hold data
    pub fn is_data_node(&self) -> bool {
        self.roles.is_empty()
            || self
                .roles
                .iter()
                .any(|role| role == "data" || role.starts_with("data_"))
    }
}
