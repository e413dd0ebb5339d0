//! Spectrum counting abundance indices

use idcache::ObjectType;
use tracing::{debug, warn};

use super::FeaturesGenerator;
use crate::error::Result;
use crate::metrics::SpectrumCountingTotals;
use crate::quantification::{
    empai, finite_or_zero, normalize, nsaf, SpectrumCountingMethod, SpectrumCountingParameters,
};
use crate::sequence::{molecular_weight, n_cleavage_sites, observable_length};
use crate::store::ProgressHandler;
use crate::units::Unit;

impl FeaturesGenerator {
    /// Current spectrum counting settings
    pub fn spectrum_counting_parameters(&self) -> SpectrumCountingParameters {
        self.spectrum_counting.read().clone()
    }

    /// Replace the spectrum counting settings, dropping the values computed
    /// with the previous ones
    pub fn set_spectrum_counting_parameters(&self, parameters: SpectrumCountingParameters) {
        *self.spectrum_counting.write() = parameters;
        self.clear_spectrum_counting();
    }

    /// Drop the cached spectrum counting values, their totals and maximum
    pub fn clear_spectrum_counting(&self) {
        let removed = self.cache().remove_objects(ObjectType::SpectrumCounting);
        self.metrics.clear_max_spectrum_counting();
        self.metrics.clear_spectrum_counting_totals();
        debug!(removed, "cleared spectrum counting");
    }

    /// Spectrum counting index of a protein group with the configured method
    pub fn spectrum_counting(&self, protein_key: u64) -> Result<f64> {
        self.cached(ObjectType::SpectrumCounting, protein_key, || {
            self.estimate_spectrum_counting(protein_key, &self.spectrum_counting_parameters())
        })
    }

    /// Spectrum counting index with the given method. Only values of the
    /// configured method are cached.
    ///
    /// Another method is computed with the default settings, including the
    /// default validation level, not with the configured ones.
    pub fn spectrum_counting_with(
        &self,
        protein_key: u64,
        method: SpectrumCountingMethod,
    ) -> Result<f64> {
        if method == self.spectrum_counting_parameters().method {
            return self.spectrum_counting(protein_key);
        }
        let parameters = SpectrumCountingParameters::default().with_method(method);
        self.estimate_spectrum_counting(protein_key, &parameters)
    }

    /// Whether the spectrum counting index of the configured method is cached
    pub fn spectrum_counting_in_cache(&self, protein_key: u64) -> bool {
        self.in_cache(ObjectType::SpectrumCounting, protein_key)
    }

    /// Spectrum counting index in the configured unit
    pub fn normalized_spectrum_counting(&self, protein_key: u64) -> Result<f64> {
        let parameters = self.spectrum_counting_parameters();
        self.normalized_spectrum_counting_with(protein_key, parameters.unit, parameters.method)
    }

    /// Spectrum counting index with the given method, in the given unit.
    ///
    /// Returns the raw index when normalization is disabled. Totals are those
    /// of the configured method.
    pub fn normalized_spectrum_counting_with(
        &self,
        protein_key: u64,
        unit: Unit,
        method: SpectrumCountingMethod,
    ) -> Result<f64> {
        let value = self.spectrum_counting_with(protein_key, method)?;

        let parameters = self.spectrum_counting_parameters();
        if !parameters.normalize {
            return Ok(value);
        }

        let totals = self.spectrum_counting_totals()?;
        normalize(value, unit, parameters.reference_mass, totals)
    }

    /// Dataset totals used for normalization, computed if needed
    pub fn spectrum_counting_totals(&self) -> Result<SpectrumCountingTotals> {
        if let Some(totals) = self.metrics.spectrum_counting_totals() {
            return Ok(totals);
        }
        let totals = self.estimate_spectrum_counting_totals(None)?;
        Ok(totals.unwrap_or_default())
    }

    /// Sum the spectrum counting of the validated target protein groups, plain
    /// and weighted by molecular weight, and store the totals in the metrics.
    ///
    /// Returns `None` if the progress handler cancelled the pass.
    pub fn estimate_spectrum_counting_totals(
        &self,
        progress: Option<&dyn ProgressHandler>,
    ) -> Result<Option<SpectrumCountingTotals>> {
        if let Some(progress) = progress {
            progress.set_status("Computing spectrum counting totals");
            progress.start(self.store.protein_count());
        }

        let mut totals = SpectrumCountingTotals::default();
        for key in self.store.protein_keys() {
            let protein = self.protein(key)?;
            if !protein.decoy && protein.status.level.is_validated() {
                let value = self.spectrum_counting(key)?;
                let sequence = self.sequence(&protein.leading_accession)?;
                totals.total += value;
                totals.total_mass += value * molecular_weight(&sequence);
            }

            if let Some(progress) = progress {
                progress.increment();
                if progress.is_cancelled() {
                    return Ok(None);
                }
            }
        }

        if totals.total <= 0.0 {
            warn!("spectrum counting total is zero, normalized values will be zero");
        }
        self.metrics.set_spectrum_counting_totals(totals);
        Ok(Some(totals))
    }

    fn estimate_spectrum_counting(
        &self,
        protein_key: u64,
        parameters: &SpectrumCountingParameters,
    ) -> Result<f64> {
        let protein = self.protein(protein_key)?;
        let level = parameters.validation_level;

        match parameters.method {
            SpectrumCountingMethod::Nsaf => {
                let mut ratio_sum = 0.0;
                for &peptide_key in &protein.peptide_keys {
                    let peptide = self.peptide(peptide_key)?;
                    if peptide.status.level < level {
                        continue;
                    }

                    // positions on the validated groups sharing the peptide
                    let mut occurrence = 0;
                    for group_key in self.store.protein_groups(peptide_key) {
                        let group = self.protein(group_key)?;
                        if group.status.level >= level {
                            occurrence += peptide.starts(&group.leading_accession).len();
                        }
                    }

                    let mut n_spectra = 0;
                    for &spectrum_key in &peptide.spectrum_keys {
                        if self.spectrum(spectrum_key)?.status.level >= level {
                            n_spectra += 1;
                        }
                    }

                    // no qualifying group leaves the ratio infinite and the
                    // protein index at zero
                    ratio_sum += n_spectra as f64 / occurrence as f64;
                }

                let sequence = self.sequence(&protein.leading_accession)?;
                let length = if self.digestion.uses_enzyme() {
                    observable_length(
                        &sequence,
                        &self.digestion,
                        self.digestion.max_peptide_length as f64,
                    )
                } else {
                    sequence.len()
                };
                Ok(nsaf(ratio_sum, length))
            }
            SpectrumCountingMethod::Empai => {
                let mut n_peptides = 0;
                for &peptide_key in &protein.peptide_keys {
                    if self.peptide(peptide_key)?.status.level >= level {
                        n_peptides += 1;
                    }
                }

                let n_sites = if self.digestion.uses_enzyme() {
                    let sequence = self.sequence(&protein.leading_accession)?;
                    Some(n_cleavage_sites(&sequence, &self.digestion))
                } else {
                    None
                };
                Ok(empai(n_peptides, n_sites))
            }
            SpectrumCountingMethod::Lfq => {
                let mut intensity = 0.0;
                for &peptide_key in &protein.peptide_keys {
                    let peptide = self.peptide(peptide_key)?;
                    if peptide.status.level < level {
                        continue;
                    }
                    for &spectrum_key in &peptide.spectrum_keys {
                        if let Some(value) = self.spectrum(spectrum_key)?.precursor_intensity {
                            intensity += value;
                        }
                    }
                }
                Ok(finite_or_zero(intensity))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enzyme::DigestionParameters;
    use crate::generator::fixtures::{DatasetBuilder, TWENTY};
    use crate::model::ValidationLevel::{Confident, Doubtful, None as NotValidated};

    /// P1 carries a unique peptide and shares another with P2
    fn shared() -> DatasetBuilder {
        let mut builder = DatasetBuilder::new()
            .sequence("P1", TWENTY)
            .sequence("P2", "MASGGASGGKMMMMMMMMMM")
            .protein(1, "P1", &[10, 11, 12], Confident, 0.1)
            .protein(2, "P2", &[10], Doubtful, 0.2)
            .peptide(10, &TWENTY[0..10], "P1", 0, &[100, 101], Confident)
            .peptide(11, &TWENTY[10..20], "P1", 10, &[102], Doubtful)
            .peptide(12, &TWENTY[2..10], "P1", 2, &[103], NotValidated)
            .spectrum(100, 2, Confident)
            .spectrum(101, 2, Confident)
            .spectrum(102, 2, Doubtful)
            .spectrum(103, 2, Confident);
        builder
            .peptide_mut(10)
            .protein_mapping
            .insert("P2".to_string(), vec![0]);
        builder.spectrum_mut(100).precursor_intensity = Some(1000.0);
        builder.spectrum_mut(102).precursor_intensity = Some(500.0);
        builder.spectrum_mut(103).precursor_intensity = Some(2000.0);
        builder
    }

    #[test]
    fn test_nsaf() {
        let generator = shared().generator();

        // (2 spectra / 2 occurrences + 1 spectrum / 1 occurrence) / 20 residues
        assert!((generator.spectrum_counting(1).unwrap() - 0.1).abs() < 1e-12);
        assert!(generator.spectrum_counting_in_cache(1));
    }

    #[test]
    fn test_nsaf_protein_below_counting_level() {
        // peptide 11 sits on P1 only, and P1 is not validated
        let mut builder = DatasetBuilder::new()
            .sequence("P1", TWENTY)
            .sequence("P2", "MASGGASGGKMMMMMMMMMM")
            .protein(1, "P1", &[10, 11], NotValidated, 0.5)
            .protein(2, "P2", &[10], Confident, 0.1)
            .peptide(10, &TWENTY[0..10], "P1", 0, &[100], Confident)
            .peptide(11, &TWENTY[10..20], "P1", 10, &[101], Confident)
            .spectrum(100, 2, Confident)
            .spectrum(101, 2, Confident);
        builder
            .peptide_mut(10)
            .protein_mapping
            .insert("P2".to_string(), vec![0]);
        let generator = builder.generator();

        assert_eq!(generator.spectrum_counting(1).unwrap(), 0.0);
        assert!(generator.spectrum_counting(2).unwrap() > 0.0);
    }

    #[test]
    fn test_nsaf_without_enzyme() {
        let generator = shared()
            .digestion(DigestionParameters::unspecific())
            .generator();

        assert!((generator.spectrum_counting(1).unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_empai_and_lfq_are_not_cached() {
        let generator = shared().generator();

        // 2 validated peptides, 1 cleavage site: 10^(2/2) - 1
        let empai = generator
            .spectrum_counting_with(1, SpectrumCountingMethod::Empai)
            .unwrap();
        assert!((empai - 9.0).abs() < 1e-9);

        let lfq = generator
            .spectrum_counting_with(1, SpectrumCountingMethod::Lfq)
            .unwrap();
        assert_eq!(lfq, 1500.0);

        assert!(!generator.spectrum_counting_in_cache(1));
    }

    #[test]
    fn test_other_method_uses_default_settings() {
        let generator = shared().generator();
        generator.set_spectrum_counting_parameters(SpectrumCountingParameters {
            validation_level: Confident,
            ..SpectrumCountingParameters::default()
        });

        // doubtful peptide 11 still counts: 10^(2/2) - 1
        let empai = generator
            .spectrum_counting_with(1, SpectrumCountingMethod::Empai)
            .unwrap();
        assert!((empai - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalization() {
        let generator = shared().generator();

        let totals = generator.spectrum_counting_totals().unwrap();
        let p1 = generator.spectrum_counting(1).unwrap();
        let p2 = generator.spectrum_counting(2).unwrap();
        assert!((totals.total - (p1 + p2)).abs() < 1e-12);

        let percentage = generator
            .normalized_spectrum_counting_with(1, Unit::PERCENTAGE, SpectrumCountingMethod::Nsaf)
            .unwrap();
        let ppm = generator
            .normalized_spectrum_counting_with(1, Unit::PPM, SpectrumCountingMethod::Nsaf)
            .unwrap();
        assert!((percentage - 100.0 * p1 / (p1 + p2)).abs() < 1e-9);
        assert!((ppm - 10_000.0 * percentage).abs() < 1e-6);

        assert!(generator.normalized_spectrum_counting(1).unwrap() > 0.0);
    }

    #[test]
    fn test_normalization_disabled() {
        let generator = shared().generator();
        generator.set_spectrum_counting_parameters(SpectrumCountingParameters {
            normalize: false,
            ..SpectrumCountingParameters::default()
        });

        assert_eq!(
            generator.normalized_spectrum_counting(1).unwrap(),
            generator.spectrum_counting(1).unwrap()
        );
        assert!(generator.metrics().spectrum_counting_totals().is_none());
    }

    #[test]
    fn test_missing_reference_mass() {
        let generator = shared().generator();
        generator.set_spectrum_counting_parameters(SpectrumCountingParameters {
            reference_mass: None,
            ..SpectrumCountingParameters::default()
        });

        assert_eq!(
            generator.normalized_spectrum_counting(1),
            Err(crate::error::Error::MissingReferenceMass)
        );
    }

    #[test]
    fn test_parameter_change_clears_values() {
        let generator = shared().generator();
        generator.spectrum_counting(1).unwrap();
        generator.spectrum_counting_totals().unwrap();

        generator.set_spectrum_counting_parameters(
            SpectrumCountingParameters::default().with_method(SpectrumCountingMethod::Lfq),
        );

        assert!(!generator.spectrum_counting_in_cache(1));
        assert!(generator.metrics().spectrum_counting_totals().is_none());
        assert_eq!(generator.spectrum_counting(1).unwrap(), 1500.0);
    }

    #[test]
    fn test_totals_cancelled() {
        let generator = shared().generator();
        let progress = crate::generator::fixtures::CancelAfter::new(1);

        assert_eq!(
            generator
                .estimate_spectrum_counting_totals(Some(&progress))
                .unwrap(),
            None
        );
        assert!(generator.metrics().spectrum_counting_totals().is_none());
    }
}
