//! Identification matches and their validation attributes

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Ordered confidence classification of a match
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    /// Not validated
    #[default]
    None,
    /// Validated with low confidence
    Doubtful,
    /// Validated with high confidence
    Confident,
}

impl ValidationLevel {
    /// Number of validation levels
    pub const COUNT: usize = 3;

    /// All levels, lowest first
    pub const ALL: [ValidationLevel; ValidationLevel::COUNT] = [
        ValidationLevel::None,
        ValidationLevel::Doubtful,
        ValidationLevel::Confident,
    ];

    /// Doubtful or confident
    pub fn is_validated(self) -> bool {
        self >= ValidationLevel::Doubtful
    }

    /// Position of the level in [`ValidationLevel::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Validation attribute attached to every match
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStatus {
    /// Validation level
    #[serde(default)]
    pub level: ValidationLevel,
    /// Match score, lower is better
    #[serde(default)]
    pub score: f64,
    /// Hidden by the user
    #[serde(default)]
    pub hidden: bool,
}

impl MatchStatus {
    /// Status with the given level and score, not hidden
    pub fn new(level: ValidationLevel, score: f64) -> Self {
        Self {
            level,
            score,
            hidden: false,
        }
    }
}

/// A protein group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinMatch {
    /// Match key
    pub key: u64,
    /// Accession representing the group
    pub leading_accession: String,
    /// All accessions of the group
    #[serde(default)]
    pub accessions: Vec<String>,
    /// Keys of the peptides of the group
    #[serde(default)]
    pub peptide_keys: Vec<u64>,
    /// Whether the group is a decoy
    #[serde(default)]
    pub decoy: bool,
    /// Validation attribute
    #[serde(default)]
    pub status: MatchStatus,
}

/// A modification localized on a sequence.
///
/// Sites are numbered 0 for the N-terminus, 1 to the sequence length for
/// residues and length + 1 for the C-terminus.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModificationMatch {
    /// Modification name
    pub name: String,
    /// Site on the sequence
    pub site: usize,
    /// Whether the localization is confident
    #[serde(default)]
    pub confident: bool,
    /// Set by the search settings rather than found
    #[serde(default)]
    pub fixed: bool,
}

impl ModificationMatch {
    /// Variable modification with a confident localization
    pub fn confident(name: &str, site: usize) -> Self {
        Self {
            name: name.to_string(),
            site,
            confident: true,
            fixed: false,
        }
    }

    /// Variable modification with an ambiguous localization
    pub fn ambiguous(name: &str, site: usize) -> Self {
        Self {
            confident: false,
            ..Self::confident(name, site)
        }
    }
}

/// A peptide and where it maps on proteins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeptideMatch {
    /// Match key
    pub key: u64,
    /// Amino acid sequence
    pub sequence: String,
    /// Accession to 0-based start positions on that protein
    #[serde(default)]
    pub protein_mapping: BTreeMap<String, Vec<usize>>,
    /// Keys of the PSMs of the peptide
    #[serde(default)]
    pub spectrum_keys: Vec<u64>,
    /// Modifications on the peptide sequence
    #[serde(default)]
    pub modifications: Vec<ModificationMatch>,
    /// Validation attribute
    #[serde(default)]
    pub status: MatchStatus,
}

impl PeptideMatch {
    /// Number of PSMs
    pub fn spectrum_count(&self) -> usize {
        self.spectrum_keys.len()
    }

    /// Peptide length in residues
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Whether the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Start positions on the given protein
    pub fn starts(&self, accession: &str) -> &[usize] {
        self.protein_mapping
            .get(accession)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Inclusive 0-based end position for a start position
    pub fn end(&self, start: usize) -> usize {
        (start + self.len()).saturating_sub(1)
    }
}

/// A peptide-spectrum match, reduced to its best peptide assumption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumMatch {
    /// Match key
    pub key: u64,
    /// Name of the spectrum file
    #[serde(default)]
    pub spectrum_file: String,
    /// Identification charge of the best assumption
    #[serde(default)]
    pub charge: i32,
    /// Precursor retention time in seconds
    #[serde(default)]
    pub retention_time: Option<f64>,
    /// MS1 precursor intensity of the best assumption
    #[serde(default)]
    pub precursor_intensity: Option<f64>,
    /// Precursor m/z error of the best assumption, absent without one
    #[serde(default)]
    pub precursor_mz_error: Option<f64>,
    /// Whether the best assumption is a decoy peptide
    #[serde(default)]
    pub decoy: bool,
    /// Validation attribute
    #[serde(default)]
    pub status: MatchStatus,
}
