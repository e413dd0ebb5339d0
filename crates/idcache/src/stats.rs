//! Cache statistics, kept per object type

use std::ops::AddAssign;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::object_type::{ObjectType, Partition};

#[derive(Debug, Default)]
struct TypeCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    evicted_buckets: AtomicU64,
    evicted_entries: AtomicU64,
}

impl TypeCounters {
    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            evicted_buckets: self.evicted_buckets.load(Ordering::Relaxed),
            evicted_entries: self.evicted_entries.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.inserts.store(0, Ordering::Relaxed);
        self.evicted_buckets.store(0, Ordering::Relaxed);
        self.evicted_entries.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time copy of the counters of one or more object types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Lookups that found a value
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// New entries
    pub inserts: u64,
    /// Buckets emptied by eviction
    pub evicted_buckets: u64,
    /// Entries dropped by eviction
    pub evicted_entries: u64,
}

impl StatsSnapshot {
    /// Share of lookups that hit, 0 when nothing was looked up
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl AddAssign for StatsSnapshot {
    fn add_assign(&mut self, other: Self) {
        self.hits += other.hits;
        self.misses += other.misses;
        self.inserts += other.inserts;
        self.evicted_buckets += other.evicted_buckets;
        self.evicted_entries += other.evicted_entries;
    }
}

/// Lookup, insert and eviction counters for each [`ObjectType`].
///
/// Totals and per-partition figures are summed on demand.
#[derive(Debug, Default)]
pub struct CacheStats {
    by_type: [TypeCounters; ObjectType::COUNT],
}

impl CacheStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    fn counters(&self, object_type: ObjectType) -> &TypeCounters {
        &self.by_type[object_type.index()]
    }

    /// Record a lookup that found a value
    pub fn record_hit(&self, object_type: ObjectType) {
        self.counters(object_type).hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lookup that found nothing
    pub fn record_miss(&self, object_type: ObjectType) {
        self.counters(object_type)
            .misses
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a new entry
    pub fn record_insert(&self, object_type: ObjectType) {
        self.counters(object_type)
            .inserts
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record the bucket of `victim` cleared by the eviction pass
    pub fn record_eviction(&self, victim: ObjectType, entries: usize) {
        let counters = self.counters(victim);
        counters.evicted_buckets.fetch_add(1, Ordering::Relaxed);
        counters
            .evicted_entries
            .fetch_add(entries as u64, Ordering::Relaxed);
    }

    /// Counters of one object type
    pub fn for_type(&self, object_type: ObjectType) -> StatsSnapshot {
        self.counters(object_type).snapshot()
    }

    /// Counters summed over the object types of a partition
    pub fn for_partition(&self, partition: Partition) -> StatsSnapshot {
        self.sum(|object_type| object_type.partition() == partition)
    }

    /// Counters summed over every object type
    pub fn total(&self) -> StatsSnapshot {
        self.sum(|_| true)
    }

    fn sum(&self, include: impl Fn(ObjectType) -> bool) -> StatsSnapshot {
        let mut total = StatsSnapshot::default();
        for object_type in ObjectType::ALL.into_iter().filter(|t| include(*t)) {
            total += self.for_type(object_type);
        }
        total
    }

    /// Get total hits
    pub fn hits(&self) -> u64 {
        self.total().hits
    }

    /// Get total misses
    pub fn misses(&self) -> u64 {
        self.total().misses
    }

    /// Get total inserts
    pub fn inserts(&self) -> u64 {
        self.total().inserts
    }

    /// Get the number of buckets emptied by eviction
    pub fn evicted_buckets(&self) -> u64 {
        self.total().evicted_buckets
    }

    /// Get the number of entries dropped by eviction
    pub fn evicted_entries(&self) -> u64 {
        self.total().evicted_entries
    }

    /// Hit ratio over all object types (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        self.total().hit_ratio()
    }

    /// Reset all statistics
    pub fn reset(&self) {
        self.by_type.iter().for_each(TypeCounters::reset);
    }
}
