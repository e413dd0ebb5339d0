//! Collaborators the generator reads from

use std::sync::Arc;

use crate::model::{PeptideMatch, ProteinMatch, SpectrumMatch};

/// Access to the identification matches of a dataset
pub trait IdentificationStore: Send + Sync {
    /// Protein group by key
    fn protein_match(&self, key: u64) -> Option<Arc<ProteinMatch>>;

    /// Peptide by key
    fn peptide_match(&self, key: u64) -> Option<Arc<PeptideMatch>>;

    /// PSM by key
    fn spectrum_match(&self, key: u64) -> Option<Arc<SpectrumMatch>>;

    /// Keys of all protein groups
    fn protein_keys(&self) -> Box<dyn Iterator<Item = u64> + '_>;

    /// Keys of all peptides
    fn peptide_keys(&self) -> Box<dyn Iterator<Item = u64> + '_>;

    /// Number of protein groups
    fn protein_count(&self) -> usize;

    /// Keys of the protein groups containing a peptide
    fn protein_groups(&self, peptide_key: u64) -> Vec<u64>;

    /// Keys of the PSMs of a spectrum file
    fn spectrum_keys_in_file(&self, spectrum_file: &str) -> Vec<u64>;
}

/// Protein sequences by accession
pub trait SequenceProvider: Send + Sync {
    /// Residue sequence of a protein
    fn sequence(&self, accession: &str) -> Option<Arc<str>>;
}

/// Progress reporting and cancellation for dataset-wide passes.
///
/// Passes poll [`ProgressHandler::is_cancelled`] between matches and return
/// without a result when it reports `true`.
pub trait ProgressHandler: Send + Sync {
    /// Describe the current step
    fn set_status(&self, _status: &str) {}

    /// Reset the counter and set its maximum
    fn start(&self, max: usize);

    /// Advance the counter by one
    fn increment(&self);

    /// Whether the pass should stop
    fn is_cancelled(&self) -> bool;
}
