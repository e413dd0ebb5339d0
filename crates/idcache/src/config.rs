//! Cache capacities

use crate::object_type::Partition;

/// Default number of entries shared by the small object types
pub const DEFAULT_SMALL_CAPACITY: usize = 1_000_000;

/// Default number of entries shared by the large object types
pub const DEFAULT_LARGE_CAPACITY: usize = 1_000;

/// Capacity of each partition, in entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entries shared by all small object types
    pub small_capacity: usize,
    /// Entries shared by all large object types
    pub large_capacity: usize,
}

impl CacheConfig {
    /// Create a configuration with explicit capacities
    pub fn new(small_capacity: usize, large_capacity: usize) -> Self {
        Self {
            small_capacity,
            large_capacity,
        }
    }

    /// Capacity of the given partition
    pub fn capacity(&self, partition: Partition) -> usize {
        match partition {
            Partition::Small => self.small_capacity,
            Partition::Large => self.large_capacity,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SMALL_CAPACITY, DEFAULT_LARGE_CAPACITY)
    }
}
