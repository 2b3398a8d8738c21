//! Stats Collector
//!
//! Normalizes the cluster's statistics documents into typed records.
//!
//! ## Inputs
//!
//! - **index stats**: per-index store, docs, segments and heap caches
//! - **index settings**: primary shard and replica counts
//! - **node stats**: per-node disk and heap capacity
//!
//! Absent fields read as zero. Only an index entry that is not an object,
//! or a stats document without any index, stops the run.

mod collect;
pub mod payload;

pub use collect::{collect, collect_capacity, Collection, RawPayloads};
pub use payload::{IndexSettings, IndexStats, NodeStats};
