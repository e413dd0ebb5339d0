//! FeaturesCache: type-partitioned memoization store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use ahash::RandomState;
use parking_lot::RwLock;
use tracing::debug;

use crate::config::CacheConfig;
use crate::object_type::{ObjectType, Partition};
use crate::selection::{DisplayedProteins, PeptideListMetrics, PsmListMetrics, Selection, Slot};
use crate::stats::CacheStats;

type Bucket<V> = HashMap<u64, V, RandomState>;

/// Memoization store for features keyed by `(ObjectType, match key)`.
///
/// Each object type has its own bucket behind its own lock. The write side of
/// that lock is the mutation permit; lookups only take the shared side for
/// the duration of the map access. Partition item counters are relaxed
/// atomics and only approximate the bucket sizes between eviction passes.
pub struct FeaturesCache<V> {
    /// One bucket per object type, indexed by declaration order
    buckets: Vec<RwLock<Bucket<V>>>,

    /// Approximate number of entries per partition
    counts: [AtomicUsize; 2],

    /// Partition capacities
    config: CacheConfig,

    /// When set, inserts are ignored
    read_only: AtomicBool,

    /// Whether protein hiding filters were ever applied
    filtered: AtomicBool,

    /// Ranked proteins before hiding filters
    ranked_proteins: Slot<Arc<[u64]>>,

    /// Ranked proteins after hiding filters
    displayed_proteins: Slot<DisplayedProteins>,

    /// Peptides of the currently selected protein
    peptide_selection: Slot<Selection<PeptideListMetrics>>,

    /// PSMs of the currently selected peptide
    psm_selection: Slot<Selection<PsmListMetrics>>,

    /// Cache statistics
    stats: CacheStats,
}

impl<V: Clone> FeaturesCache<V> {
    /// Create a cache with the default capacities
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create a cache with the given capacities
    pub fn with_config(config: CacheConfig) -> Self {
        let buckets = ObjectType::ALL
            .iter()
            .map(|_| RwLock::new(HashMap::with_hasher(RandomState::new())))
            .collect();

        Self {
            buckets,
            counts: [AtomicUsize::new(0), AtomicUsize::new(0)],
            config,
            read_only: AtomicBool::new(false),
            filtered: AtomicBool::new(false),
            ranked_proteins: Slot::new(),
            displayed_proteins: Slot::new(),
            peptide_selection: Slot::new(),
            psm_selection: Slot::new(),
            stats: CacheStats::new(),
        }
    }

    /// Look up a value. A miss is the caller's signal to compute it.
    pub fn get_object(&self, object_type: ObjectType, key: u64) -> Option<V> {
        let value = self.bucket(object_type).read().get(&key).cloned();
        match value {
            Some(_) => self.stats.record_hit(object_type),
            None => self.stats.record_miss(object_type),
        }
        value
    }

    /// Whether a value is stored, without touching the statistics
    pub fn contains(&self, object_type: ObjectType, key: u64) -> bool {
        self.bucket(object_type).read().contains_key(&key)
    }

    /// Store a value unless one is already present for this key.
    ///
    /// Returns `true` if the value was inserted. The first writer wins: a
    /// racing insert for the same key is dropped. A successful insert runs
    /// the eviction pass for the partition of `object_type`.
    pub fn add_object(&self, object_type: ObjectType, key: u64, value: V) -> bool {
        if self.is_read_only() {
            return false;
        }

        {
            let mut bucket = self.bucket(object_type).write();
            if bucket.contains_key(&key) {
                return false;
            }
            bucket.insert(key, value);
            self.counter(object_type.partition())
                .fetch_add(1, Ordering::Relaxed);
        }

        self.stats.record_insert(object_type);
        self.evict(object_type);
        true
    }

    /// Store a value, overwriting any previous one.
    ///
    /// Used when an upstream change invalidates a value for an unchanged key.
    pub fn replace_object(&self, object_type: ObjectType, key: u64, value: V) {
        if self.is_read_only() {
            return;
        }

        let added = {
            let mut bucket = self.bucket(object_type).write();
            let added = bucket.insert(key, value).is_none();
            if added {
                self.counter(object_type.partition())
                    .fetch_add(1, Ordering::Relaxed);
            }
            added
        };

        if added {
            self.stats.record_insert(object_type);
            self.evict(object_type);
        }
    }

    /// Drop every value of the given type.
    ///
    /// Returns the number of entries removed.
    pub fn remove_objects(&self, object_type: ObjectType) -> usize {
        let mut bucket = self.bucket(object_type).write();
        let removed = std::mem::take(&mut *bucket);
        self.counter(object_type.partition())
            .fetch_sub(removed.len(), Ordering::Relaxed);
        removed.len()
    }

    /// Drop every value and every selection
    pub fn clear(&self) {
        for object_type in ObjectType::ALL {
            self.remove_objects(object_type);
        }
        self.ranked_proteins.clear();
        self.displayed_proteins.clear();
        self.peptide_selection.clear();
        self.psm_selection.clear();
        self.filtered.store(false, Ordering::Relaxed);
    }

    /// Number of values stored for a type
    pub fn len(&self, object_type: ObjectType) -> usize {
        self.bucket(object_type).read().len()
    }

    /// Whether no value of the given type is stored
    pub fn is_empty(&self, object_type: ObjectType) -> bool {
        self.bucket(object_type).read().is_empty()
    }

    /// Approximate number of values stored in a partition
    pub fn partition_len(&self, partition: Partition) -> usize {
        self.counts[partition.index()].load(Ordering::Relaxed)
    }

    /// Partition capacities
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Set whether inserts are ignored
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::Relaxed);
    }

    /// Whether inserts are ignored
    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::Relaxed)
    }

    /// Record whether hiding filters were applied to the protein list
    pub fn set_filtered(&self, filtered: bool) {
        self.filtered.store(filtered, Ordering::Relaxed);
    }

    /// Whether hiding filters were applied to the protein list
    pub fn is_filtered(&self) -> bool {
        self.filtered.load(Ordering::Relaxed)
    }

    /// Ranked proteins before hiding filters
    pub fn ranked_proteins(&self) -> Option<Arc<[u64]>> {
        self.ranked_proteins.get()
    }

    /// Replace the ranked protein list
    pub fn set_ranked_proteins(&self, keys: Arc<[u64]>) {
        self.ranked_proteins.set(keys);
    }

    /// Ranked proteins after hiding filters
    pub fn displayed_proteins(&self) -> Option<DisplayedProteins> {
        self.displayed_proteins.get()
    }

    /// Replace the displayed protein lists
    pub fn set_displayed_proteins(&self, proteins: DisplayedProteins) {
        self.displayed_proteins.set(proteins);
    }

    /// Peptide selection, if it was computed for `protein_key`
    pub fn peptide_selection(&self, protein_key: u64) -> Option<Selection<PeptideListMetrics>> {
        self.peptide_selection
            .get()
            .filter(|selection| selection.is_for(protein_key))
    }

    /// Most recent peptide selection, whatever its protein
    pub fn last_peptide_selection(&self) -> Option<Selection<PeptideListMetrics>> {
        self.peptide_selection.get()
    }

    /// Replace the peptide selection
    pub fn set_peptide_selection(&self, selection: Selection<PeptideListMetrics>) {
        self.peptide_selection.set(selection);
    }

    /// PSM selection, if it was computed for `peptide_key`
    pub fn psm_selection(&self, peptide_key: u64) -> Option<Selection<PsmListMetrics>> {
        self.psm_selection
            .get()
            .filter(|selection| selection.is_for(peptide_key))
    }

    /// Most recent PSM selection, whatever its peptide
    pub fn last_psm_selection(&self) -> Option<Selection<PsmListMetrics>> {
        self.psm_selection.get()
    }

    /// Replace the PSM selection
    pub fn set_psm_selection(&self, selection: Selection<PsmListMetrics>) {
        self.psm_selection.set(selection);
    }

    fn bucket(&self, object_type: ObjectType) -> &RwLock<Bucket<V>> {
        &self.buckets[object_type.index()]
    }

    fn counter(&self, partition: Partition) -> &AtomicUsize {
        &self.counts[partition.index()]
    }

    /// Clear whole buckets of the partition of `inserted` until it is back
    /// under capacity, scanning the object types at most once.
    ///
    /// Each victim is locked only while it is cleared.
    fn evict(&self, inserted: ObjectType) {
        let partition = inserted.partition();
        let capacity = self.config.capacity(partition);

        let mut candidates = ObjectType::ALL
            .into_iter()
            .filter(|candidate| candidate.partition() == partition && *candidate != inserted);

        while self.partition_len(partition) > capacity {
            let Some(victim) = candidates.next() else {
                debug!(
                    ?partition,
                    len = self.partition_len(partition),
                    capacity,
                    "partition still over capacity after eviction scan"
                );
                break;
            };

            let removed = self.remove_objects(victim);
            if removed > 0 {
                self.stats.record_eviction(victim, removed);
                debug!(?victim, removed, ?partition, "evicted feature bucket");
            }
        }
    }
}

impl<V: Clone> Default for FeaturesCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
