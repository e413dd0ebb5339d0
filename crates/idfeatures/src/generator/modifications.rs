//! Modification summaries and precursor mass error distributions

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use idcache::ObjectType;
use tracing::debug;

use super::FeaturesGenerator;
use crate::distribution::MassErrorDistribution;
use crate::error::Result;
use crate::model::ModificationMatch;
use crate::modifications::{self, residue_number};

/// A match whose sequence carries modifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifiedMatch {
    /// Protein group, on the sequence of its leading accession
    Protein(u64),
    /// Peptide
    Peptide(u64),
}

impl FeaturesGenerator {
    /// Modifications of the validated peptides of a protein group, placed on
    /// its leading accession. Fixed modifications are left out.
    ///
    /// A site is confident if any peptide localizes it confidently.
    pub fn protein_modifications(&self, protein_key: u64) -> Result<Arc<[ModificationMatch]>> {
        self.cached(ObjectType::ProteinModifications, protein_key, || {
            self.estimate_protein_modifications(protein_key)
        })
    }

    /// Recompute the modifications of a protein group
    pub fn update_protein_modifications(&self, protein_key: u64) -> Result<()> {
        let value = self.estimate_protein_modifications(protein_key)?;
        self.refresh(ObjectType::ProteinModifications, protein_key, value);
        Ok(())
    }

    fn estimate_protein_modifications(
        &self,
        protein_key: u64,
    ) -> Result<Arc<[ModificationMatch]>> {
        let protein = self.protein(protein_key)?;
        let accession = &protein.leading_accession;

        let mut sites: BTreeMap<(usize, String), bool> = BTreeMap::new();
        for &peptide_key in &protein.peptide_keys {
            let peptide = self.peptide(peptide_key)?;
            if !peptide.status.level.is_validated() {
                continue;
            }

            for modification in peptide.modifications.iter().filter(|m| !m.fixed) {
                let number = residue_number(modification.site, peptide.len())?;
                for &start in peptide.starts(accession) {
                    let confident = sites
                        .entry((start + number, modification.name.clone()))
                        .or_insert(false);
                    *confident |= modification.confident;
                }
            }
        }

        Ok(sites
            .into_iter()
            .map(|((site, name), confident)| ModificationMatch {
                name,
                site,
                confident,
                fixed: false,
            })
            .collect())
    }

    fn sequence_and_modifications(
        &self,
        target: ModifiedMatch,
    ) -> Result<(Arc<str>, Arc<[ModificationMatch]>)> {
        match target {
            ModifiedMatch::Protein(key) => {
                let protein = self.protein(key)?;
                let sequence = self.sequence(&protein.leading_accession)?;
                Ok((sequence, self.protein_modifications(key)?))
            }
            ModifiedMatch::Peptide(key) => {
                let peptide = self.peptide(key)?;
                Ok((
                    Arc::from(peptide.sequence.as_str()),
                    Arc::from(peptide.modifications.as_slice()),
                ))
            }
        }
    }

    /// Modifications and the residues carrying them, e.g.
    /// `Oxidation (M1); Phosphorylation (S13)`, for the confidently localized
    /// modifications or the others
    pub fn modification_sites(&self, target: ModifiedMatch, confident: bool) -> Result<String> {
        let (sequence, found) = self.sequence_and_modifications(target)?;
        modifications::modification_sites(&sequence, &found, confident)
    }

    /// Occurrences per modification, e.g. `Oxidation (1);Phosphorylation (2)`
    pub fn modification_sites_number(
        &self,
        target: ModifiedMatch,
        confident: bool,
    ) -> Result<String> {
        let (_, found) = self.sequence_and_modifications(target)?;
        Ok(modifications::modification_sites_number(&found, confident))
    }

    /// Residues carrying one of the targeted modifications, e.g. `S3,T7`
    pub fn targeted_modification_sites(
        &self,
        target: ModifiedMatch,
        confident: bool,
        targets: &BTreeSet<String>,
    ) -> Result<String> {
        let (sequence, found) = self.sequence_and_modifications(target)?;
        modifications::targeted_modification_sites(&sequence, &found, confident, targets)
    }

    /// Number of sites carrying one of the targeted modifications
    pub fn targeted_modification_sites_number(
        &self,
        target: ModifiedMatch,
        confident: bool,
        targets: &BTreeSet<String>,
    ) -> Result<usize> {
        let (_, found) = self.sequence_and_modifications(target)?;
        Ok(modifications::targeted_modification_sites_number(
            &found, confident, targets,
        ))
    }

    /// Sequence annotated with its modifications. Only peptide sequences are
    /// cached.
    pub fn modified_sequence(&self, target: ModifiedMatch) -> Result<Arc<str>> {
        let estimate = || -> Result<Arc<str>> {
            let (sequence, found) = self.sequence_and_modifications(target)?;
            Ok(Arc::from(modifications::modified_sequence(&sequence, &found)?))
        };
        match target {
            ModifiedMatch::Peptide(key) => {
                self.cached(ObjectType::ModifiedSequence, key, estimate)
            }
            ModifiedMatch::Protein(_) => estimate(),
        }
    }

    /// Whether the modified sequence of a peptide is cached
    pub fn modified_sequence_in_cache(&self, peptide_key: u64) -> bool {
        self.in_cache(ObjectType::ModifiedSequence, peptide_key)
    }

    /// Names of the variable modifications found on the peptides of the
    /// dataset, unless set in the metrics beforehand
    pub fn found_modifications(&self) -> Result<Arc<BTreeSet<String>>> {
        if let Some(found) = self.metrics.found_modifications() {
            return Ok(found);
        }

        let mut found = BTreeSet::new();
        for peptide_key in self.store.peptide_keys() {
            let peptide = self.peptide(peptide_key)?;
            found.extend(
                peptide
                    .modifications
                    .iter()
                    .filter(|modification| !modification.fixed)
                    .map(|modification| modification.name.clone()),
            );
        }
        debug!(n_modifications = found.len(), "collected found modifications");

        let found = Arc::new(found);
        self.metrics.set_found_modifications(found.clone());
        Ok(found)
    }

    /// Precursor mass error distribution of the validated target PSMs of a
    /// spectrum file, estimated on first access
    pub fn mass_error_distribution(&self, spectrum_file: &str) -> Result<MassErrorDistribution> {
        if let Some(distribution) = self.metrics.mass_error_distribution(spectrum_file) {
            return Ok(distribution);
        }

        let mut errors = Vec::new();
        for key in self.store.spectrum_keys_in_file(spectrum_file) {
            let spectrum = self.spectrum(key)?;
            if spectrum.status.level.is_validated() && !spectrum.decoy {
                errors.extend(spectrum.precursor_mz_error);
            }
        }
        debug!(spectrum_file, n_errors = errors.len(), "estimating mass error distribution");

        Ok(self.set_mass_error_distribution(spectrum_file, errors))
    }

    /// Estimate the mass error distribution of a spectrum file from the given
    /// errors and store it, replacing any previous one
    pub fn set_mass_error_distribution(
        &self,
        spectrum_file: &str,
        mut errors: Vec<f64>,
    ) -> MassErrorDistribution {
        errors.sort_by(f64::total_cmp);
        let distribution = MassErrorDistribution::from_sorted(&errors);
        self.metrics
            .set_mass_error_distribution(spectrum_file, distribution);
        distribution
    }
}
