//! Dataset-wide metrics shared by the generator and its callers

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use parking_lot::RwLock;

use crate::distribution::{MassErrorDistribution, PeptideLengthDistribution};

/// Largest values over the displayed protein groups
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DatasetMaxima {
    /// Most peptides in a group
    pub max_peptides: usize,
    /// Most PSMs in a group
    pub max_spectra: usize,
    /// Highest normalized spectrum counting
    pub max_spectrum_counting: f64,
    /// Highest molecular weight in kDa
    pub max_molecular_weight: f64,
}

impl DatasetMaxima {
    /// Whether every maximum is set to a positive value
    pub fn is_complete(&self) -> bool {
        self.max_peptides > 0
            && self.max_spectra > 0
            && self.max_spectrum_counting > 0.0
            && self.max_molecular_weight > 0.0
    }
}

/// Sums of spectrum counting over the validated target protein groups
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpectrumCountingTotals {
    /// Sum of the raw spectrum counting values
    pub total: f64,
    /// Sum of the values weighted by molecular weight in kDa
    pub total_mass: f64,
}

#[derive(Default)]
struct Inner {
    maxima: Option<DatasetMaxima>,
    n_validated_proteins: Option<usize>,
    n_confident_proteins: Option<usize>,
    spectrum_counting_totals: Option<SpectrumCountingTotals>,
    peptide_length_distribution: Option<Arc<PeptideLengthDistribution>>,
    mass_error_distributions: BTreeMap<String, MassErrorDistribution>,
    found_modifications: Option<Arc<BTreeSet<String>>>,
}

/// Dataset metrics, filled lazily by the generator
#[derive(Default)]
pub struct Metrics {
    inner: RwLock<Inner>,
}

impl Metrics {
    /// Create empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Current maxima
    pub fn maxima(&self) -> Option<DatasetMaxima> {
        self.inner.read().maxima
    }

    /// Whether the maxima need to be recomputed
    pub fn maxima_stale(&self) -> bool {
        self.inner
            .read()
            .maxima
            .map_or(true, |maxima| !maxima.is_complete())
    }

    /// Store the maxima
    pub fn set_maxima(&self, maxima: DatasetMaxima) {
        self.inner.write().maxima = Some(maxima);
    }

    /// Reset the spectrum counting maximum, marking the maxima stale
    pub fn clear_max_spectrum_counting(&self) {
        if let Some(maxima) = self.inner.write().maxima.as_mut() {
            maxima.max_spectrum_counting = 0.0;
        }
    }

    /// Number of validated target protein groups
    pub fn n_validated_proteins(&self) -> Option<usize> {
        self.inner.read().n_validated_proteins
    }

    /// Number of confident target protein groups
    pub fn n_confident_proteins(&self) -> Option<usize> {
        self.inner.read().n_confident_proteins
    }

    /// Store the validated and confident protein counts
    pub fn set_protein_counts(&self, n_validated: usize, n_confident: usize) {
        let mut inner = self.inner.write();
        inner.n_validated_proteins = Some(n_validated);
        inner.n_confident_proteins = Some(n_confident);
    }

    /// Spectrum counting totals used for normalization
    pub fn spectrum_counting_totals(&self) -> Option<SpectrumCountingTotals> {
        self.inner.read().spectrum_counting_totals
    }

    /// Store the spectrum counting totals
    pub fn set_spectrum_counting_totals(&self, totals: SpectrumCountingTotals) {
        self.inner.write().spectrum_counting_totals = Some(totals);
    }

    /// Forget the spectrum counting totals
    pub fn clear_spectrum_counting_totals(&self) {
        self.inner.write().spectrum_counting_totals = None;
    }

    /// Peptide length distribution, absent when too few peptides were validated
    pub fn peptide_length_distribution(&self) -> Option<Arc<PeptideLengthDistribution>> {
        self.inner.read().peptide_length_distribution.clone()
    }

    /// Store the peptide length distribution
    pub fn set_peptide_length_distribution(&self, distribution: Option<PeptideLengthDistribution>) {
        self.inner.write().peptide_length_distribution = distribution.map(Arc::new);
    }

    /// Precursor mass error distribution of a spectrum file
    pub fn mass_error_distribution(&self, spectrum_file: &str) -> Option<MassErrorDistribution> {
        self.inner
            .read()
            .mass_error_distributions
            .get(spectrum_file)
            .copied()
    }

    /// Store the precursor mass error distribution of a spectrum file
    pub fn set_mass_error_distribution(
        &self,
        spectrum_file: &str,
        distribution: MassErrorDistribution,
    ) {
        self.inner
            .write()
            .mass_error_distributions
            .insert(spectrum_file.to_string(), distribution);
    }

    /// Names of the variable modifications found in the dataset
    pub fn found_modifications(&self) -> Option<Arc<BTreeSet<String>>> {
        self.inner.read().found_modifications.clone()
    }

    /// Store the names of the variable modifications found in the dataset
    pub fn set_found_modifications(&self, modifications: Arc<BTreeSet<String>>) {
        self.inner.write().found_modifications = Some(modifications);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maxima_staleness() {
        let metrics = Metrics::new();
        assert!(metrics.maxima_stale());

        metrics.set_maxima(DatasetMaxima {
            max_peptides: 3,
            max_spectra: 10,
            max_spectrum_counting: 0.5,
            max_molecular_weight: 42.0,
        });
        assert!(!metrics.maxima_stale());

        metrics.clear_max_spectrum_counting();
        assert!(metrics.maxima_stale());
        assert_eq!(metrics.maxima().unwrap().max_peptides, 3);
    }

    #[test]
    fn test_protein_counts() {
        let metrics = Metrics::new();
        assert_eq!(metrics.n_validated_proteins(), None);

        metrics.set_protein_counts(5, 2);
        assert_eq!(metrics.n_validated_proteins(), Some(5));
        assert_eq!(metrics.n_confident_proteins(), Some(2));
    }

    #[test]
    fn test_mass_error_per_file() {
        let metrics = Metrics::new();
        metrics.set_mass_error_distribution("a.mgf", MassErrorDistribution::new(1.0, 2.0, 3.0));

        assert_eq!(metrics.mass_error_distribution("a.mgf").unwrap().std_up(), 3.0);
        assert!(metrics.mass_error_distribution("b.mgf").is_none());
    }
}
