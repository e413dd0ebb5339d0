//! In-memory identification store and sequence provider

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use ahash::RandomState;
use serde::{Deserialize, Serialize};

use crate::model::{PeptideMatch, ProteinMatch, SpectrumMatch};
use crate::store::{IdentificationStore, SequenceProvider};

/// Serializable snapshot of a dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Protein groups
    #[serde(default)]
    pub proteins: Vec<ProteinMatch>,
    /// Peptides
    #[serde(default)]
    pub peptides: Vec<PeptideMatch>,
    /// PSMs
    #[serde(default)]
    pub spectra: Vec<SpectrumMatch>,
    /// Protein sequences by accession
    #[serde(default)]
    pub sequences: BTreeMap<String, String>,
}

/// Identification store and sequence provider backed by hash maps
pub struct InMemoryStore {
    proteins: HashMap<u64, Arc<ProteinMatch>, RandomState>,
    peptides: HashMap<u64, Arc<PeptideMatch>, RandomState>,
    spectra: HashMap<u64, Arc<SpectrumMatch>, RandomState>,
    sequences: HashMap<String, Arc<str>, RandomState>,
    /// Peptide key to the groups containing it, ascending
    groups_by_peptide: HashMap<u64, Vec<u64>, RandomState>,
    /// Spectrum file to the PSMs it holds, ascending
    spectra_by_file: HashMap<String, Vec<u64>, RandomState>,
    /// Protein keys, ascending
    protein_order: Vec<u64>,
    /// Peptide keys, ascending
    peptide_order: Vec<u64>,
}

impl InMemoryStore {
    /// Index a dataset
    pub fn from_dataset(dataset: Dataset) -> Self {
        let mut groups_by_peptide: HashMap<u64, Vec<u64>, RandomState> = HashMap::default();
        for protein in &dataset.proteins {
            for &peptide_key in &protein.peptide_keys {
                groups_by_peptide
                    .entry(peptide_key)
                    .or_default()
                    .push(protein.key);
            }
        }
        for groups in groups_by_peptide.values_mut() {
            groups.sort_unstable();
            groups.dedup();
        }

        let mut spectra_by_file: HashMap<String, Vec<u64>, RandomState> = HashMap::default();
        for spectrum in &dataset.spectra {
            spectra_by_file
                .entry(spectrum.spectrum_file.clone())
                .or_default()
                .push(spectrum.key);
        }
        for keys in spectra_by_file.values_mut() {
            keys.sort_unstable();
        }

        let mut protein_order: Vec<u64> = dataset.proteins.iter().map(|p| p.key).collect();
        protein_order.sort_unstable();
        let mut peptide_order: Vec<u64> = dataset.peptides.iter().map(|p| p.key).collect();
        peptide_order.sort_unstable();

        Self {
            proteins: dataset
                .proteins
                .into_iter()
                .map(|p| (p.key, Arc::new(p)))
                .collect(),
            peptides: dataset
                .peptides
                .into_iter()
                .map(|p| (p.key, Arc::new(p)))
                .collect(),
            spectra: dataset
                .spectra
                .into_iter()
                .map(|s| (s.key, Arc::new(s)))
                .collect(),
            sequences: dataset
                .sequences
                .into_iter()
                .map(|(accession, sequence)| (accession, Arc::from(sequence)))
                .collect(),
            groups_by_peptide,
            spectra_by_file,
            protein_order,
            peptide_order,
        }
    }

    /// Number of peptides
    pub fn peptide_count(&self) -> usize {
        self.peptides.len()
    }

    /// Number of PSMs
    pub fn spectrum_count(&self) -> usize {
        self.spectra.len()
    }
}

impl IdentificationStore for InMemoryStore {
    fn protein_match(&self, key: u64) -> Option<Arc<ProteinMatch>> {
        self.proteins.get(&key).cloned()
    }

    fn peptide_match(&self, key: u64) -> Option<Arc<PeptideMatch>> {
        self.peptides.get(&key).cloned()
    }

    fn spectrum_match(&self, key: u64) -> Option<Arc<SpectrumMatch>> {
        self.spectra.get(&key).cloned()
    }

    fn protein_keys(&self) -> Box<dyn Iterator<Item = u64> + '_> {
        Box::new(self.protein_order.iter().copied())
    }

    fn peptide_keys(&self) -> Box<dyn Iterator<Item = u64> + '_> {
        Box::new(self.peptide_order.iter().copied())
    }

    fn protein_count(&self) -> usize {
        self.proteins.len()
    }

    fn protein_groups(&self, peptide_key: u64) -> Vec<u64> {
        self.groups_by_peptide
            .get(&peptide_key)
            .cloned()
            .unwrap_or_default()
    }

    fn spectrum_keys_in_file(&self, spectrum_file: &str) -> Vec<u64> {
        self.spectra_by_file
            .get(spectrum_file)
            .cloned()
            .unwrap_or_default()
    }
}

impl SequenceProvider for InMemoryStore {
    fn sequence(&self, accession: &str) -> Option<Arc<str>> {
        self.sequences.get(accession).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET: &str = r#"{
        "proteins": [
            {"key": 2, "leading_accession": "P2", "peptide_keys": [10, 11]},
            {"key": 1, "leading_accession": "P1", "peptide_keys": [10]}
        ],
        "peptides": [
            {"key": 11, "sequence": "AAK", "protein_mapping": {"P2": [0]}},
            {"key": 10, "sequence": "PEPK", "protein_mapping": {"P1": [2], "P2": [5]}}
        ],
        "spectra": [
            {"key": 101, "charge": 2, "spectrum_file": "run1.mgf"},
            {"key": 100, "charge": 2, "spectrum_file": "run1.mgf"},
            {"key": 102, "charge": 3, "spectrum_file": "run2.mgf"}
        ],
        "sequences": {"P1": "MKPEPKR", "P2": "AAKMKPEPK"}
    }"#;

    fn store() -> InMemoryStore {
        InMemoryStore::from_dataset(serde_json::from_str(DATASET).unwrap())
    }

    #[test]
    fn test_lookup() {
        let store = store();

        assert_eq!(store.protein_match(1).unwrap().leading_accession, "P1");
        assert_eq!(store.peptide_match(11).unwrap().sequence, "AAK");
        assert_eq!(store.spectrum_match(100).unwrap().charge, 2);
        assert!(store.protein_match(3).is_none());
        assert_eq!(&*store.sequence("P1").unwrap(), "MKPEPKR");
    }

    #[test]
    fn test_key_order() {
        let store = store();

        assert_eq!(store.protein_keys().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(store.peptide_keys().collect::<Vec<_>>(), vec![10, 11]);
        assert_eq!(store.protein_count(), 2);
    }

    #[test]
    fn test_protein_groups() {
        let store = store();

        assert_eq!(store.protein_groups(10), vec![1, 2]);
        assert_eq!(store.protein_groups(11), vec![2]);
        assert!(store.protein_groups(12).is_empty());
    }

    #[test]
    fn test_spectra_by_file() {
        let store = store();

        assert_eq!(store.spectrum_keys_in_file("run1.mgf"), vec![100, 101]);
        assert_eq!(store.spectrum_keys_in_file("run2.mgf"), vec![102]);
        assert!(store.spectrum_keys_in_file("run3.mgf").is_empty());
    }
}
