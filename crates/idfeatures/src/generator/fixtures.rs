//! Small datasets for generator tests

use std::collections::BTreeMap;
use std::sync::Arc;

use super::FeaturesGenerator;
use crate::enzyme::DigestionParameters;
use crate::memory::{Dataset, InMemoryStore};
use crate::model::{MatchStatus, PeptideMatch, ProteinMatch, SpectrumMatch, ValidationLevel};
use crate::store::ProgressHandler;

pub(crate) struct DatasetBuilder {
    pub dataset: Dataset,
    digestion: DigestionParameters,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self {
            dataset: Dataset::default(),
            digestion: DigestionParameters::default(),
        }
    }

    pub fn digestion(mut self, digestion: DigestionParameters) -> Self {
        self.digestion = digestion;
        self
    }

    pub fn sequence(mut self, accession: &str, sequence: &str) -> Self {
        self.dataset
            .sequences
            .insert(accession.to_string(), sequence.to_string());
        self
    }

    pub fn protein(
        mut self,
        key: u64,
        accession: &str,
        peptide_keys: &[u64],
        level: ValidationLevel,
        score: f64,
    ) -> Self {
        self.dataset.proteins.push(ProteinMatch {
            key,
            leading_accession: accession.to_string(),
            accessions: vec![accession.to_string()],
            peptide_keys: peptide_keys.to_vec(),
            decoy: false,
            status: MatchStatus::new(level, score),
        });
        self
    }

    pub fn peptide(
        mut self,
        key: u64,
        sequence: &str,
        accession: &str,
        start: usize,
        spectrum_keys: &[u64],
        level: ValidationLevel,
    ) -> Self {
        self.dataset.peptides.push(PeptideMatch {
            key,
            sequence: sequence.to_string(),
            protein_mapping: BTreeMap::from([(accession.to_string(), vec![start])]),
            spectrum_keys: spectrum_keys.to_vec(),
            modifications: Vec::new(),
            status: MatchStatus::new(level, 0.0),
        });
        self
    }

    pub fn spectrum(mut self, key: u64, charge: i32, level: ValidationLevel) -> Self {
        self.dataset.spectra.push(SpectrumMatch {
            key,
            spectrum_file: String::new(),
            charge,
            retention_time: None,
            precursor_intensity: None,
            precursor_mz_error: None,
            decoy: false,
            status: MatchStatus::new(level, 0.0),
        });
        self
    }

    pub fn protein_mut(&mut self, key: u64) -> &mut ProteinMatch {
        self.dataset
            .proteins
            .iter_mut()
            .find(|protein| protein.key == key)
            .unwrap()
    }

    pub fn peptide_mut(&mut self, key: u64) -> &mut PeptideMatch {
        self.dataset
            .peptides
            .iter_mut()
            .find(|peptide| peptide.key == key)
            .unwrap()
    }

    pub fn spectrum_mut(&mut self, key: u64) -> &mut SpectrumMatch {
        self.dataset
            .spectra
            .iter_mut()
            .find(|spectrum| spectrum.key == key)
            .unwrap()
    }

    pub fn generator(self) -> FeaturesGenerator {
        let store = Arc::new(InMemoryStore::from_dataset(self.dataset));
        FeaturesGenerator::new(store.clone(), store, self.digestion)
    }
}

/// 20 residues, trypsin cleaves once after residue 10
pub(crate) const TWENTY: &str = "MASGGASGGKAGSGGASGGS";

/// Progress handler cancelling after a number of increments
pub(crate) struct CancelAfter {
    remaining: std::sync::atomic::AtomicUsize,
}

impl CancelAfter {
    pub fn new(increments: usize) -> Self {
        Self {
            remaining: std::sync::atomic::AtomicUsize::new(increments),
        }
    }
}

impl ProgressHandler for CancelAfter {
    fn start(&self, _max: usize) {}

    fn increment(&self) {
        let _ = self.remaining.fetch_update(
            std::sync::atomic::Ordering::Relaxed,
            std::sync::atomic::Ordering::Relaxed,
            |remaining| remaining.checked_sub(1),
        );
    }

    fn is_cancelled(&self) -> bool {
        self.remaining.load(std::sync::atomic::Ordering::Relaxed) == 0
    }
}
