//! FeaturesGenerator: compute-if-absent access to identification features
//!
//! Every accessor looks the feature up in the [`FeaturesCache`], and on a
//! miss estimates it from the identification store, stores it and returns
//! it. `update_*` methods recompute and overwrite, `*_in_cache` methods only
//! report presence.

mod counts;
mod coverage;
mod modifications;
mod ranking;
mod spectrum_counting;
mod value;

#[cfg(test)]
pub(crate) mod fixtures;

use std::sync::Arc;
use idcache::{CacheConfig, FeaturesCache, ObjectType};
use parking_lot::RwLock;

use crate::enzyme::DigestionParameters;
use crate::error::{Error, MatchKind, Result};
use crate::metrics::Metrics;
use crate::model::{PeptideMatch, ProteinMatch, SpectrumMatch};
use crate::quantification::SpectrumCountingParameters;
use crate::store::{IdentificationStore, SequenceProvider};

pub use coverage::CoverageFilter;
pub use modifications::ModifiedMatch;
pub use value::{FeatureValue, LevelCoverage};
use value::CachedFeature;

/// Cache holding generator features
pub type Cache = FeaturesCache<FeatureValue>;

/// Computes and memoizes protein, peptide and PSM features
pub struct FeaturesGenerator {
    store: Arc<dyn IdentificationStore>,
    sequences: Arc<dyn SequenceProvider>,
    digestion: DigestionParameters,
    metrics: Arc<Metrics>,
    spectrum_counting: RwLock<SpectrumCountingParameters>,
    cache: RwLock<Arc<Cache>>,
}

impl FeaturesGenerator {
    /// Create a generator with default spectrum counting settings, empty
    /// metrics and a cache with default capacities
    pub fn new(
        store: Arc<dyn IdentificationStore>,
        sequences: Arc<dyn SequenceProvider>,
        digestion: DigestionParameters,
    ) -> Self {
        Self {
            store,
            sequences,
            digestion,
            metrics: Arc::new(Metrics::new()),
            spectrum_counting: RwLock::new(SpectrumCountingParameters::default()),
            cache: RwLock::new(Arc::new(Cache::new())),
        }
    }

    /// Use the given spectrum counting settings
    pub fn with_spectrum_counting(mut self, parameters: SpectrumCountingParameters) -> Self {
        self.spectrum_counting = RwLock::new(parameters);
        self
    }

    /// Share metrics with other components
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Use a cache with the given capacities
    pub fn with_cache_config(self, config: CacheConfig) -> Self {
        self.set_cache(Arc::new(Cache::with_config(config)));
        self
    }

    /// Current cache
    pub fn cache(&self) -> Arc<Cache> {
        self.cache.read().clone()
    }

    /// Replace the cache, e.g. with one restored by the caller
    pub fn set_cache(&self, cache: Arc<Cache>) {
        *self.cache.write() = cache;
    }

    /// Drop every cached feature by switching to an empty cache with the same
    /// capacities
    pub fn reset_cache(&self) {
        let config = *self.cache().config();
        self.set_cache(Arc::new(Cache::with_config(config)));
    }

    /// Dataset metrics
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Digestion settings
    pub fn digestion(&self) -> &DigestionParameters {
        &self.digestion
    }

    /// Identification store
    pub fn store(&self) -> &Arc<dyn IdentificationStore> {
        &self.store
    }

    /// Return the cached feature, or estimate and cache it
    fn cached<T, F>(&self, object_type: ObjectType, key: u64, estimate: F) -> Result<T>
    where
        T: CachedFeature,
        F: FnOnce() -> Result<T>,
    {
        let cache = self.cache();
        if let Some(value) = cache.get_object(object_type, key).and_then(T::from_value) {
            return Ok(value);
        }

        let value = estimate()?;
        cache.add_object(object_type, key, value.clone().into_value());
        Ok(value)
    }

    /// Overwrite a cached feature
    fn refresh<T: CachedFeature>(&self, object_type: ObjectType, key: u64, value: T) {
        self.cache()
            .replace_object(object_type, key, value.into_value());
    }

    fn in_cache(&self, object_type: ObjectType, key: u64) -> bool {
        self.cache().contains(object_type, key)
    }

    fn protein(&self, key: u64) -> Result<Arc<ProteinMatch>> {
        self.store.protein_match(key).ok_or(Error::MissingMatch {
            kind: MatchKind::Protein,
            key,
        })
    }

    fn peptide(&self, key: u64) -> Result<Arc<PeptideMatch>> {
        self.store.peptide_match(key).ok_or(Error::MissingMatch {
            kind: MatchKind::Peptide,
            key,
        })
    }

    fn spectrum(&self, key: u64) -> Result<Arc<SpectrumMatch>> {
        self.store.spectrum_match(key).ok_or(Error::MissingMatch {
            kind: MatchKind::Spectrum,
            key,
        })
    }

    fn sequence(&self, accession: &str) -> Result<Arc<str>> {
        self.sequences
            .sequence(accession)
            .ok_or_else(|| Error::MissingSequence(accession.to_string()))
    }
}
