//! Error types for idfeatures

use std::fmt;

/// Result type alias for feature computations
pub type Result<T> = std::result::Result<T, Error>;

/// Level of the identification hierarchy a match belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Protein group
    Protein,
    /// Peptide
    Peptide,
    /// Peptide-spectrum match
    Spectrum,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Protein => write!(f, "protein"),
            MatchKind::Peptide => write!(f, "peptide"),
            MatchKind::Spectrum => write!(f, "spectrum"),
        }
    }
}

/// Error types for feature computations
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The identification store has no match for this key
    MissingMatch {
        /// Hierarchy level of the match
        kind: MatchKind,
        /// Key that was looked up
        key: u64,
    },

    /// The sequence provider has no sequence for this accession
    MissingSequence(String),

    /// Normalization unit not supported
    UnsupportedUnit(String),

    /// Molar normalization requested without a reference mass
    MissingReferenceMass,

    /// Enzyme cleavage rule could not be parsed
    InvalidEnzymeRule(String),

    /// Modification site beyond the termini of its sequence
    ModificationSiteOutOfSequence {
        /// Site of the modification
        site: usize,
        /// Length of the sequence
        length: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingMatch { kind, key } => write!(f, "No {} match for key {}", kind, key),
            Error::MissingSequence(accession) => write!(f, "No sequence for protein {}", accession),
            Error::UnsupportedUnit(unit) => write!(f, "Unit {} not supported", unit),
            Error::MissingReferenceMass => {
                write!(f, "Reference mass missing for abundance normalization")
            }
            Error::InvalidEnzymeRule(msg) => write!(f, "Invalid enzyme rule: {}", msg),
            Error::ModificationSiteOutOfSequence { site, length } => write!(
                f,
                "Modification site {} out of a sequence of {} residues",
                site, length
            ),
        }
    }
}

impl std::error::Error for Error {}

impl From<nom::Err<nom::error::Error<&str>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&str>>) -> Self {
        Error::InvalidEnzymeRule(format!("{:?}", err))
    }
}
