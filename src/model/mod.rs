//! Metric Record Model
//!
//! Plain data shared by every pipeline stage. Records are created once per
//! run and never mutated after the stage that produced them returns.

pub mod types;

pub use types::{
    bytes_to_gb, bytes_to_mb, ClusterCapacity, GroupRecord, MetricRecord, BYTES_PER_GB,
    BYTES_PER_MB,
};
