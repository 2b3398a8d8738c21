//! Core data types for impact analysis
//!
//! This module defines the records that flow between the pipeline stages:
//! - `MetricRecord`: Storage and heap consumption of one index (or a sum of indices)
//! - `ClusterCapacity`: Provisioned disk and heap across the data nodes
//! - `GroupRecord`: A log group with its aggregated metrics and member indices

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Bytes in one binary megabyte
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Bytes in one binary gigabyte
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Convert a byte count to gigabytes (1024-based)
pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

/// Convert a byte count to megabytes (1024-based)
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Normalized metrics for one index
///
/// The same shape is reused for a log group, where every field holds the
/// sum over the group's member indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Disk used by primary shards only
    pub primary_storage_bytes: u64,
    /// Disk used by primary and replica shards
    pub total_storage_bytes: u64,
    /// Documents in primary shards
    pub doc_count: u64,
    /// primaries × (1 + replicas)
    pub shard_count: u64,
    /// Lucene segments
    pub segment_count: u64,
    /// Heap held by segment metadata
    pub segment_memory_bytes: u64,
    /// Heap held by fielddata
    pub fielddata_bytes: u64,
    /// Heap held by the query cache
    pub query_cache_bytes: u64,
    /// Heap held by the request cache
    pub request_cache_bytes: u64,
}

impl MetricRecord {
    /// Total heap attributable to this record
    pub fn heap_usage_bytes(&self) -> u64 {
        self.segment_memory_bytes
            .saturating_add(self.fielddata_bytes)
            .saturating_add(self.query_cache_bytes)
            .saturating_add(self.request_cache_bytes)
    }

    /// Whether total storage is at least primary storage
    pub fn is_storage_consistent(&self) -> bool {
        self.total_storage_bytes >= self.primary_storage_bytes
    }

    pub fn total_storage_gb(&self) -> f64 {
        bytes_to_gb(self.total_storage_bytes)
    }

    pub fn primary_storage_gb(&self) -> f64 {
        bytes_to_gb(self.primary_storage_bytes)
    }

    pub fn fielddata_mb(&self) -> f64 {
        bytes_to_mb(self.fielddata_bytes)
    }

    pub fn query_cache_mb(&self) -> f64 {
        bytes_to_mb(self.query_cache_bytes)
    }
}

impl Add for MetricRecord {
    type Output = MetricRecord;

    fn add(mut self, rhs: MetricRecord) -> MetricRecord {
        self += rhs;
        self
    }
}

/// Field-wise, saturating at `u64::MAX`
impl AddAssign for MetricRecord {
    fn add_assign(&mut self, rhs: MetricRecord) {
        self.primary_storage_bytes = self.primary_storage_bytes.saturating_add(rhs.primary_storage_bytes);
        self.total_storage_bytes = self.total_storage_bytes.saturating_add(rhs.total_storage_bytes);
        self.doc_count = self.doc_count.saturating_add(rhs.doc_count);
        self.shard_count = self.shard_count.saturating_add(rhs.shard_count);
        self.segment_count = self.segment_count.saturating_add(rhs.segment_count);
        self.segment_memory_bytes = self.segment_memory_bytes.saturating_add(rhs.segment_memory_bytes);
        self.fielddata_bytes = self.fielddata_bytes.saturating_add(rhs.fielddata_bytes);
        self.query_cache_bytes = self.query_cache_bytes.saturating_add(rhs.query_cache_bytes);
        self.request_cache_bytes = self.request_cache_bytes.saturating_add(rhs.request_cache_bytes);
    }
}

impl std::iter::Sum for MetricRecord {
    fn sum<I: Iterator<Item = MetricRecord>>(iter: I) -> Self {
        iter.fold(MetricRecord::default(), Add::add)
    }
}

/// Provisioned capacity of the cluster's data nodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterCapacity {
    /// Total disk across data nodes
    pub disk_total_bytes: u64,
    /// Maximum heap across data nodes
    pub heap_max_bytes: u64,
    /// Number of nodes that contributed to the totals
    pub data_nodes: u32,
}

impl ClusterCapacity {
    pub fn new(disk_total_bytes: u64, heap_max_bytes: u64) -> Self {
        Self {
            disk_total_bytes,
            heap_max_bytes,
            data_nodes: 0,
        }
    }

    /// Builder method: set the data node count
    pub fn data_nodes(mut self, data_nodes: u32) -> Self {
        self.data_nodes = data_nodes;
        self
    }
}

impl std::fmt::Display for ClusterCapacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "disk {:.2}G, heap {:.0}MB ({} data nodes)",
            bytes_to_gb(self.disk_total_bytes),
            bytes_to_mb(self.heap_max_bytes),
            self.data_nodes
        )
    }
}

/// A logical log group: rolled-over indices sharing one log name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    /// Group key extracted from the index names
    pub log_name: String,
    /// Number of member indices
    pub index_count: usize,
    /// Field-wise sum over the members
    pub metrics: MetricRecord,
    /// Member index names in first-seen order
    pub indices: Vec<String>,
}

impl GroupRecord {
    /// Create an empty group
    pub fn new(log_name: impl Into<String>) -> Self {
        Self {
            log_name: log_name.into(),
            index_count: 0,
            metrics: MetricRecord::default(),
            indices: Vec::new(),
        }
    }

    /// Add one member index to the aggregate
    pub fn absorb(&mut self, index_name: impl Into<String>, record: &MetricRecord) {
        self.metrics += *record;
        self.indices.push(index_name.into());
        self.index_count = self.indices.len();
    }
}
