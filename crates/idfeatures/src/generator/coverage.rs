//! Sequence coverage and digestion models

use std::sync::Arc;
use idcache::ObjectType;
use tracing::debug;

use super::value::LevelCoverage;
use super::FeaturesGenerator;
use crate::distribution::PeptideLengthDistribution;
use crate::error::Result;
use crate::model::{PeptideMatch, ValidationLevel};
use crate::quantification::finite_or_zero;
use crate::sequence::{cleavage_intervals, is_enzymatic, n_enzymatic_termini, observable_length};

/// Cumulative probability capping the observable peptide length
const OBSERVABLE_LENGTH_QUANTILE: f64 = 0.99;

/// Peptides taken into account for amino acid coverage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoverageFilter {
    /// Every peptide
    #[default]
    All,
    /// Fully enzymatic peptides only
    Enzymatic,
    /// Peptides that are not fully enzymatic only
    NonEnzymatic,
}

impl FeaturesGenerator {
    /// Best validation level of the peptides covering each residue of the
    /// leading protein.
    ///
    /// Covered positions are gathered per level, then written from the lowest
    /// level up so that the best evidence wins at shared positions.
    pub fn estimate_aa_coverage(
        &self,
        protein_key: u64,
        filter: CoverageFilter,
    ) -> Result<Vec<ValidationLevel>> {
        let protein = self.protein(protein_key)?;
        let accession = protein.leading_accession.as_str();
        let sequence = self.sequence(accession)?;
        let length = sequence.len();

        let mut covered = vec![vec![false; length]; ValidationLevel::COUNT];
        for &peptide_key in &protein.peptide_keys {
            let peptide = self.peptide(peptide_key)?;

            let included = match filter {
                CoverageFilter::All => true,
                CoverageFilter::Enzymatic | CoverageFilter::NonEnzymatic => {
                    let enzymatic = self.digestion.uses_enzyme()
                        && is_enzymatic(&peptide, accession, &sequence, &self.digestion);
                    enzymatic == (filter == CoverageFilter::Enzymatic)
                }
            };
            if !included {
                continue;
            }

            let positions = &mut covered[peptide.status.level.index()];
            for &start in peptide.starts(accession) {
                let end = peptide.end(start).min(length.saturating_sub(1));
                for position in positions.iter_mut().take(end + 1).skip(start) {
                    *position = true;
                }
            }
        }

        let mut result = vec![ValidationLevel::None; length];
        for level in ValidationLevel::ALL {
            for (residue, _) in covered[level.index()]
                .iter()
                .enumerate()
                .filter(|(_, covered)| **covered)
            {
                result[residue] = level;
            }
        }
        Ok(result)
    }

    /// Amino acid coverage over all peptides
    pub fn aa_coverage(&self, protein_key: u64) -> Result<Arc<[ValidationLevel]>> {
        self.cached(ObjectType::AaCoverage, protein_key, || {
            Ok(self
                .estimate_aa_coverage(protein_key, CoverageFilter::All)?
                .into())
        })
    }

    /// Probability for each residue to be covered by a peptide
    pub fn coverable_aa(&self, protein_key: u64) -> Result<Arc<[f64]>> {
        self.cached(ObjectType::CoverableAaProbability, protein_key, || {
            self.estimate_coverable_aa(protein_key)
        })
    }

    /// Recompute the coverable residue probabilities
    pub fn update_coverable_aa(&self, protein_key: u64) -> Result<()> {
        let value = self.estimate_coverable_aa(protein_key)?;
        self.refresh(ObjectType::CoverableAaProbability, protein_key, value);
        Ok(())
    }

    fn estimate_coverable_aa(&self, protein_key: u64) -> Result<Arc<[f64]>> {
        let protein = self.protein(protein_key)?;
        let sequence = self.sequence(&protein.leading_accession)?;

        if !self.digestion.uses_enzyme() {
            return Ok(vec![1.0; sequence.len()].into());
        }

        let distribution = self.metrics.peptide_length_distribution();
        let mut result = vec![0.0; sequence.len()];
        for interval in cleavage_intervals(&sequence, &self.digestion) {
            let p = match &distribution {
                Some(distribution) => distribution.probability_at(interval.len()),
                None if interval.len() > self.digestion.max_peptide_length => 0.0,
                None => 1.0,
            };
            result[interval].fill(p);
        }
        Ok(result.into())
    }

    /// Fraction of the sequence covered at each validation level
    pub fn sequence_coverage(&self, protein_key: u64) -> Result<LevelCoverage> {
        self.cached(ObjectType::SequenceValidationCoverage, protein_key, || {
            self.estimate_sequence_coverage(protein_key)
        })
    }

    /// Recompute the per-level sequence coverage
    pub fn update_sequence_coverage(&self, protein_key: u64) -> Result<()> {
        let value = self.estimate_sequence_coverage(protein_key)?;
        self.refresh(ObjectType::SequenceValidationCoverage, protein_key, value);
        Ok(())
    }

    /// Whether the per-level sequence coverage is cached
    pub fn sequence_coverage_in_cache(&self, protein_key: u64) -> bool {
        self.in_cache(ObjectType::SequenceValidationCoverage, protein_key)
    }

    fn estimate_sequence_coverage(&self, protein_key: u64) -> Result<LevelCoverage> {
        let coverage = self.aa_coverage(protein_key)?;
        let mut counts = [0; ValidationLevel::COUNT];
        for level in coverage.iter() {
            counts[level.index()] += 1;
        }
        Ok(LevelCoverage::from_counts(counts, coverage.len()))
    }

    /// Fraction of the sequence covered by validated peptides
    pub fn validated_sequence_coverage(&self, protein_key: u64) -> Result<f64> {
        self.cached(ObjectType::SequenceCoverage, protein_key, || {
            let coverage = self.aa_coverage(protein_key)?;
            let validated = coverage.iter().filter(|level| level.is_validated()).count();
            Ok(finite_or_zero(validated as f64 / coverage.len() as f64))
        })
    }

    /// Whether the validated sequence coverage is cached
    pub fn validated_sequence_coverage_in_cache(&self, protein_key: u64) -> bool {
        self.in_cache(ObjectType::SequenceCoverage, protein_key)
    }

    /// Best coverage achievable with the digestion settings
    pub fn observable_coverage(&self, protein_key: u64) -> Result<f64> {
        self.cached(ObjectType::ObservableCoverage, protein_key, || {
            self.estimate_observable_coverage(protein_key)
        })
    }

    /// Recompute the observable coverage
    pub fn update_observable_coverage(&self, protein_key: u64) -> Result<()> {
        let value = self.estimate_observable_coverage(protein_key)?;
        self.refresh(ObjectType::ObservableCoverage, protein_key, value);
        Ok(())
    }

    /// Whether the observable coverage is cached
    pub fn observable_coverage_in_cache(&self, protein_key: u64) -> bool {
        self.in_cache(ObjectType::ObservableCoverage, protein_key)
    }

    fn estimate_observable_coverage(&self, protein_key: u64) -> Result<f64> {
        if !self.digestion.uses_enzyme() {
            return Ok(1.0);
        }

        let protein = self.protein(protein_key)?;
        let sequence = self.sequence(&protein.leading_accession)?;

        let mut max_length = self.digestion.max_peptide_length as f64;
        if let Some(distribution) = self.metrics.peptide_length_distribution() {
            max_length =
                max_length.min(distribution.value_at_cumulative_probability(OBSERVABLE_LENGTH_QUANTILE));
        }

        let observable = observable_length(&sequence, &self.digestion, max_length);
        Ok(finite_or_zero(observable as f64 / sequence.len() as f64))
    }

    /// Validated peptides of a protein that are not enzymatic on any protein
    pub fn non_enzymatic_peptides(&self, protein_key: u64) -> Result<Arc<[u64]>> {
        self.cached(ObjectType::NonEnzymaticPeptides, protein_key, || {
            if !self.digestion.uses_enzyme() {
                return Ok(Arc::from(Vec::new()));
            }

            let protein = self.protein(protein_key)?;
            let mut keys = Vec::new();
            for &peptide_key in &protein.peptide_keys {
                let peptide = self.peptide(peptide_key)?;
                if peptide.status.level.is_validated() && !self.peptide_is_enzymatic(&peptide)? {
                    keys.push(peptide_key);
                }
            }
            Ok(keys.into())
        })
    }

    /// Whether any peptide of a protein is enzymatic
    pub fn has_enzymatic_peptides(&self, protein_key: u64) -> Result<bool> {
        self.cached(ObjectType::ContainsEnzymaticPeptides, protein_key, || {
            if !self.digestion.uses_enzyme() {
                return Ok(true);
            }

            let protein = self.protein(protein_key)?;
            for &peptide_key in &protein.peptide_keys {
                if self.peptide_is_enzymatic(&*self.peptide(peptide_key)?)? {
                    return Ok(true);
                }
            }
            Ok(false)
        })
    }

    /// Most enzymatic termini of a peptide over its positions on a protein
    pub fn n_enzymatic_termini(&self, peptide_key: u64, accession: &str) -> Result<usize> {
        let peptide = self.peptide(peptide_key)?;
        let starts = peptide.starts(accession);
        if starts.is_empty() {
            return Ok(0);
        }
        if !self.digestion.uses_enzyme() {
            return Ok(2);
        }

        let sequence = self.sequence(accession)?;
        let best = self
            .digestion
            .enzymes
            .iter()
            .flat_map(|enzyme| {
                starts.iter().map(|&start| {
                    n_enzymatic_termini(start, peptide.end(start), &sequence, enzyme)
                })
            })
            .max()
            .unwrap_or(0);
        Ok(best)
    }

    /// Build the peptide length distribution from the validated peptides and
    /// store it in the metrics. Below the minimal sample size the metrics are
    /// left without a distribution.
    pub fn populate_peptide_length_distribution(&self) -> Result<()> {
        let mut lengths = Vec::new();
        for key in self.store.peptide_keys() {
            let peptide = self.peptide(key)?;
            if peptide.status.level.is_validated() {
                lengths.push(peptide.len());
            }
        }

        let n_validated = lengths.len();
        let distribution = PeptideLengthDistribution::from_lengths(lengths);
        debug!(
            n_validated,
            available = distribution.is_some(),
            "peptide length distribution"
        );
        self.metrics.set_peptide_length_distribution(distribution);
        Ok(())
    }

    /// Whether the peptide is fully enzymatic on one of the proteins it maps to
    fn peptide_is_enzymatic(&self, peptide: &PeptideMatch) -> Result<bool> {
        for accession in peptide.protein_mapping.keys() {
            let sequence = self.sequence(accession)?;
            if is_enzymatic(peptide, accession, &sequence, &self.digestion) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enzyme::DigestionParameters;
    use crate::generator::fixtures::{DatasetBuilder, TWENTY};
    use crate::model::ValidationLevel::{Confident, Doubtful, None as NotValidated};

    /// Doubtful enzymatic peptide on residues 1-10, confident non-enzymatic
    /// peptide on residues 5-15
    fn overlapping() -> DatasetBuilder {
        DatasetBuilder::new()
            .sequence("P1", TWENTY)
            .protein(1, "P1", &[10, 11], Confident, 0.0)
            .peptide(10, &TWENTY[0..10], "P1", 0, &[], Doubtful)
            .peptide(11, &TWENTY[4..15], "P1", 4, &[], Confident)
    }

    #[test]
    fn test_higher_level_wins() {
        let generator = overlapping().generator();

        let coverage = generator.estimate_aa_coverage(1, CoverageFilter::All).unwrap();

        assert_eq!(coverage.len(), 20);
        assert!(coverage[0..4].iter().all(|level| *level == Doubtful));
        assert!(coverage[4..15].iter().all(|level| *level == Confident));
        assert!(coverage[15..20].iter().all(|level| *level == NotValidated));
    }

    #[test]
    fn test_coverage_filters() {
        let generator = overlapping().generator();

        let enzymatic = generator
            .estimate_aa_coverage(1, CoverageFilter::Enzymatic)
            .unwrap();
        assert!(enzymatic[0..10].iter().all(|level| *level == Doubtful));
        assert!(enzymatic[10..].iter().all(|level| *level == NotValidated));

        let non_enzymatic = generator
            .estimate_aa_coverage(1, CoverageFilter::NonEnzymatic)
            .unwrap();
        assert_eq!(non_enzymatic[0], NotValidated);
        assert_eq!(non_enzymatic[4], Confident);
    }

    #[test]
    fn test_sequence_coverage() {
        let generator = overlapping().generator();

        let coverage = generator.sequence_coverage(1).unwrap();
        assert_eq!(coverage.at(Doubtful), 0.2);
        assert_eq!(coverage.at(Confident), 0.55);
        assert_eq!(coverage.at(NotValidated), 0.25);

        assert!(!generator.validated_sequence_coverage_in_cache(1));
        assert_eq!(generator.validated_sequence_coverage(1).unwrap(), 0.75);
        assert!(generator.validated_sequence_coverage_in_cache(1));
        assert!(generator.sequence_coverage_in_cache(1));
    }

    #[test]
    fn test_enzymatic_peptides() {
        let generator = overlapping().generator();

        assert_eq!(&*generator.non_enzymatic_peptides(1).unwrap(), &[11]);
        assert!(generator.has_enzymatic_peptides(1).unwrap());
        assert_eq!(generator.n_enzymatic_termini(10, "P1").unwrap(), 2);
        assert_eq!(generator.n_enzymatic_termini(11, "P1").unwrap(), 0);
        assert_eq!(generator.n_enzymatic_termini(11, "P2").unwrap(), 0);
    }

    #[test]
    fn test_unspecific_digestion() {
        let generator = overlapping()
            .digestion(DigestionParameters::unspecific())
            .generator();

        assert!(generator.non_enzymatic_peptides(1).unwrap().is_empty());
        assert!(generator.has_enzymatic_peptides(1).unwrap());
        assert_eq!(generator.n_enzymatic_termini(11, "P1").unwrap(), 2);
        assert_eq!(generator.observable_coverage(1).unwrap(), 1.0);
        assert!(generator.coverable_aa(1).unwrap().iter().all(|p| *p == 1.0));
    }

    #[test]
    fn test_coverable_aa_without_distribution() {
        let generator = overlapping()
            .digestion(DigestionParameters::default().with_peptide_lengths(4, 9))
            .generator();

        // fragments of 10 residues each, one over the maximal length
        let coverable = generator.coverable_aa(1).unwrap();
        assert!(coverable.iter().all(|p| *p == 0.0));

        let generator = overlapping().generator();
        let coverable = generator.coverable_aa(1).unwrap();
        assert!(coverable.iter().all(|p| *p == 1.0));
    }

    #[test]
    fn test_coverable_aa_with_distribution() {
        let mut builder = overlapping();
        for key in 0..100 {
            let length = if key < 25 { 10 } else { 12 };
            builder = builder.peptide(1000 + key, &"A".repeat(length), "P9", 0, &[], Doubtful);
        }
        let generator = builder.generator();
        generator.populate_peptide_length_distribution().unwrap();

        // 26 of the 102 validated peptides have 10 residues
        let coverable = generator.coverable_aa(1).unwrap();
        assert!((coverable[0] - 26.0 / 102.0).abs() < 1e-12);
        assert_eq!(coverable[0], coverable[19]);
    }

    #[test]
    fn test_observable_coverage() {
        let generator = overlapping()
            .digestion(DigestionParameters::default().with_peptide_lengths(4, 9))
            .generator();
        assert_eq!(generator.observable_coverage(1).unwrap(), 0.0);

        let generator = overlapping().generator();
        assert_eq!(generator.observable_coverage(1).unwrap(), 1.0);
        assert!(generator.observable_coverage_in_cache(1));
    }

    #[test]
    fn test_update_replaces_value() {
        let generator = overlapping().generator();
        let before = generator.coverable_aa(1).unwrap();

        generator.update_coverable_aa(1).unwrap();

        assert_eq!(generator.coverable_aa(1).unwrap(), before);
        assert_eq!(generator.cache().len(ObjectType::CoverableAaProbability), 1);
    }
}
