//! # idcache
//!
//! Memoization store for identification features.
//!
//! ## Architecture
//! - **Buckets**: one AHash map per [`ObjectType`], each behind its own lock
//! - **Partitions**: object types are tagged small or large; each partition
//!   has its own capacity and item counter
//! - **Eviction**: coarse, a whole bucket at a time, after inserts that push a
//!   partition over capacity
//! - **Selections**: single-slot caches for the current protein/peptide
//!   drill-down and the protein display orderings

#![warn(missing_docs)]

mod cache;
mod config;
mod object_type;
mod selection;
mod stats;

pub use cache::FeaturesCache;
pub use config::CacheConfig;
pub use object_type::{ObjectType, Partition};
pub use selection::{
    DisplayedProteins, PeptideListMetrics, PsmListMetrics, Selection, Slot,
};
pub use stats::{CacheStats, StatsSnapshot};
