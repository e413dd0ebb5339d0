//! Peptide, PSM and protein group counts

use idcache::ObjectType;

use super::FeaturesGenerator;
use crate::error::Result;
use crate::model::{MatchStatus, ValidationLevel};

fn is_confident(status: &MatchStatus) -> bool {
    status.level == ValidationLevel::Confident
}

fn is_validated(status: &MatchStatus) -> bool {
    status.level.is_validated()
}

impl FeaturesGenerator {
    /// Number of validated peptides of a protein group
    pub fn n_validated_peptides(&self, protein_key: u64) -> Result<usize> {
        self.cached(ObjectType::ValidatedPeptides, protein_key, || {
            self.count_peptides(protein_key, is_validated)
        })
    }

    /// Recompute the number of validated peptides
    pub fn update_n_validated_peptides(&self, protein_key: u64) -> Result<()> {
        let value = self.count_peptides(protein_key, is_validated)?;
        self.refresh(ObjectType::ValidatedPeptides, protein_key, value);
        Ok(())
    }

    /// Whether the number of validated peptides is cached
    pub fn n_validated_peptides_in_cache(&self, protein_key: u64) -> bool {
        self.in_cache(ObjectType::ValidatedPeptides, protein_key)
    }

    /// Number of confident peptides of a protein group
    pub fn n_confident_peptides(&self, protein_key: u64) -> Result<usize> {
        self.cached(ObjectType::ConfidentPeptides, protein_key, || {
            self.count_peptides(protein_key, is_confident)
        })
    }

    /// Recompute the number of confident peptides
    pub fn update_n_confident_peptides(&self, protein_key: u64) -> Result<()> {
        let value = self.count_peptides(protein_key, is_confident)?;
        self.refresh(ObjectType::ConfidentPeptides, protein_key, value);
        Ok(())
    }

    /// Number of peptides found in this protein group only
    pub fn n_unique_peptides(&self, protein_key: u64) -> Result<usize> {
        self.cached(ObjectType::UniquePeptides, protein_key, || {
            self.count_unique_peptides(protein_key, |_| true)
        })
    }

    /// Number of validated peptides found in this protein group only
    pub fn n_unique_validated_peptides(&self, protein_key: u64) -> Result<usize> {
        self.cached(ObjectType::UniqueValidatedPeptides, protein_key, || {
            self.count_unique_peptides(protein_key, is_validated)
        })
    }

    /// Number of PSMs of a protein group
    pub fn n_spectra(&self, protein_key: u64) -> Result<usize> {
        self.cached(ObjectType::Spectra, protein_key, || {
            let protein = self.protein(protein_key)?;
            let mut total = 0;
            for &peptide_key in &protein.peptide_keys {
                total += self.peptide(peptide_key)?.spectrum_count();
            }
            Ok(total)
        })
    }

    /// Whether the number of PSMs is cached
    pub fn n_spectra_in_cache(&self, protein_key: u64) -> bool {
        self.in_cache(ObjectType::Spectra, protein_key)
    }

    /// Number of validated PSMs of a protein group
    pub fn n_validated_spectra(&self, protein_key: u64) -> Result<usize> {
        self.cached(ObjectType::ValidatedSpectra, protein_key, || {
            self.count_protein_spectra(protein_key, is_validated)
        })
    }

    /// Whether the number of validated PSMs is cached
    pub fn n_validated_spectra_in_cache(&self, protein_key: u64) -> bool {
        self.in_cache(ObjectType::ValidatedSpectra, protein_key)
    }

    /// Number of confident PSMs of a protein group
    pub fn n_confident_spectra(&self, protein_key: u64) -> Result<usize> {
        self.cached(ObjectType::ConfidentSpectra, protein_key, || {
            self.count_protein_spectra(protein_key, is_confident)
        })
    }

    /// Recompute the number of confident PSMs
    pub fn update_n_confident_spectra(&self, protein_key: u64) -> Result<()> {
        let value = self.count_protein_spectra(protein_key, is_confident)?;
        self.refresh(ObjectType::ConfidentSpectra, protein_key, value);
        Ok(())
    }

    /// Number of validated PSMs of a peptide
    pub fn n_validated_spectra_for_peptide(&self, peptide_key: u64) -> Result<usize> {
        self.cached(ObjectType::PeptideValidatedSpectra, peptide_key, || {
            self.count_peptide_spectra(peptide_key, is_validated)
        })
    }

    /// Whether the number of validated PSMs of a peptide is cached
    pub fn n_validated_spectra_for_peptide_in_cache(&self, peptide_key: u64) -> bool {
        self.in_cache(ObjectType::PeptideValidatedSpectra, peptide_key)
    }

    /// Number of confident PSMs of a peptide
    pub fn n_confident_spectra_for_peptide(&self, peptide_key: u64) -> Result<usize> {
        self.cached(ObjectType::PeptideConfidentSpectra, peptide_key, || {
            self.count_peptide_spectra(peptide_key, is_confident)
        })
    }

    /// Recompute the number of confident PSMs of a peptide
    pub fn update_n_confident_spectra_for_peptide(&self, peptide_key: u64) -> Result<()> {
        let value = self.count_peptide_spectra(peptide_key, is_confident)?;
        self.refresh(ObjectType::PeptideConfidentSpectra, peptide_key, value);
        Ok(())
    }

    /// Number of validated protein groups containing a peptide
    pub fn n_validated_protein_groups(&self, peptide_key: u64) -> Result<usize> {
        self.cached(ObjectType::ValidatedProteinGroups, peptide_key, || {
            let mut count = 0;
            for group_key in self.store.protein_groups(peptide_key) {
                if is_validated(&self.protein(group_key)?.status) {
                    count += 1;
                }
            }
            Ok(count)
        })
    }

    /// Number of validated target protein groups in the dataset
    pub fn n_validated_proteins(&self) -> Result<usize> {
        if let Some(count) = self.metrics.n_validated_proteins() {
            return Ok(count);
        }
        Ok(self.estimate_protein_counts()?.0)
    }

    /// Number of confident target protein groups in the dataset
    pub fn n_confident_proteins(&self) -> Result<usize> {
        if let Some(count) = self.metrics.n_confident_proteins() {
            return Ok(count);
        }
        Ok(self.estimate_protein_counts()?.1)
    }

    fn estimate_protein_counts(&self) -> Result<(usize, usize)> {
        let (mut n_validated, mut n_confident) = (0, 0);
        for key in self.store.protein_keys() {
            let protein = self.protein(key)?;
            if protein.decoy {
                continue;
            }
            if is_validated(&protein.status) {
                n_validated += 1;
            }
            if is_confident(&protein.status) {
                n_confident += 1;
            }
        }
        self.metrics.set_protein_counts(n_validated, n_confident);
        Ok((n_validated, n_confident))
    }

    fn count_peptides(&self, protein_key: u64, keep: fn(&MatchStatus) -> bool) -> Result<usize> {
        let protein = self.protein(protein_key)?;
        let mut count = 0;
        for &peptide_key in &protein.peptide_keys {
            if keep(&self.peptide(peptide_key)?.status) {
                count += 1;
            }
        }
        Ok(count)
    }

    fn count_unique_peptides(
        &self,
        protein_key: u64,
        keep: fn(&MatchStatus) -> bool,
    ) -> Result<usize> {
        let protein = self.protein(protein_key)?;
        let mut count = 0;
        for &peptide_key in &protein.peptide_keys {
            let peptide = self.peptide(peptide_key)?;
            if keep(&peptide.status) && self.store.protein_groups(peptide_key).len() == 1 {
                count += 1;
            }
        }
        Ok(count)
    }

    fn count_protein_spectra(
        &self,
        protein_key: u64,
        keep: fn(&MatchStatus) -> bool,
    ) -> Result<usize> {
        let protein = self.protein(protein_key)?;
        let mut count = 0;
        for &peptide_key in &protein.peptide_keys {
            count += self.count_peptide_spectra(peptide_key, keep)?;
        }
        Ok(count)
    }

    fn count_peptide_spectra(
        &self,
        peptide_key: u64,
        keep: fn(&MatchStatus) -> bool,
    ) -> Result<usize> {
        let peptide = self.peptide(peptide_key)?;
        let mut count = 0;
        for &spectrum_key in &peptide.spectrum_keys {
            if keep(&self.spectrum(spectrum_key)?.status) {
                count += 1;
            }
        }
        Ok(count)
    }
}
