//! Feature categories and their size partitions

/// Size partition of an object type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Scalars and short values
    Small,
    /// Whole-protein arrays
    Large,
}

impl Partition {
    /// All partitions
    pub const ALL: [Partition; 2] = [Partition::Small, Partition::Large];

    pub(crate) fn index(self) -> usize {
        match self {
            Partition::Small => 0,
            Partition::Large => 1,
        }
    }
}

/// The feature categories held by the cache.
///
/// Declaration order matters: the eviction pass walks [`ObjectType::ALL`]
/// from the first variant to the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// Validated non-enzymatic peptides of a protein
    NonEnzymaticPeptides,
    /// Per-residue likelihood to be covered
    CoverableAaProbability,
    /// Per-residue validation level of the coverage
    AaCoverage,
    /// Number of validated peptides of a protein
    ValidatedPeptides,
    /// Number of confident peptides of a protein
    ConfidentPeptides,
    /// Number of spectra of a protein
    Spectra,
    /// Number of validated spectra of a protein
    ValidatedSpectra,
    /// Number of confident spectra of a protein
    ConfidentSpectra,
    /// Number of validated spectra of a peptide
    PeptideValidatedSpectra,
    /// Number of confident spectra of a peptide
    PeptideConfidentSpectra,
    /// Number of peptides unique to a protein group
    UniquePeptides,
    /// Number of validated peptides unique to a protein group
    UniqueValidatedPeptides,
    /// Number of validated protein groups a peptide maps to
    ValidatedProteinGroups,
    /// Whether a protein has enzymatic peptides
    ContainsEnzymaticPeptides,
    /// Sequence coverage using validated peptides
    SequenceCoverage,
    /// Sequence coverage per validation level
    SequenceValidationCoverage,
    /// Theoretically observable sequence coverage
    ObservableCoverage,
    /// Spectrum counting index with the selected method
    SpectrumCounting,
    /// Modifications of the validated peptides, placed on the protein
    ProteinModifications,
    /// Peptide sequence annotated with its modifications
    ModifiedSequence,
}

impl ObjectType {
    /// Number of object types
    pub const COUNT: usize = 20;

    /// All object types in declaration order
    pub const ALL: [ObjectType; ObjectType::COUNT] = [
        ObjectType::NonEnzymaticPeptides,
        ObjectType::CoverableAaProbability,
        ObjectType::AaCoverage,
        ObjectType::ValidatedPeptides,
        ObjectType::ConfidentPeptides,
        ObjectType::Spectra,
        ObjectType::ValidatedSpectra,
        ObjectType::ConfidentSpectra,
        ObjectType::PeptideValidatedSpectra,
        ObjectType::PeptideConfidentSpectra,
        ObjectType::UniquePeptides,
        ObjectType::UniqueValidatedPeptides,
        ObjectType::ValidatedProteinGroups,
        ObjectType::ContainsEnzymaticPeptides,
        ObjectType::SequenceCoverage,
        ObjectType::SequenceValidationCoverage,
        ObjectType::ObservableCoverage,
        ObjectType::SpectrumCounting,
        ObjectType::ProteinModifications,
        ObjectType::ModifiedSequence,
    ];

    /// Whether this category holds large objects
    pub const fn is_large(self) -> bool {
        matches!(
            self,
            ObjectType::NonEnzymaticPeptides
                | ObjectType::CoverableAaProbability
                | ObjectType::AaCoverage
        )
    }

    /// The partition this category belongs to
    pub const fn partition(self) -> Partition {
        if self.is_large() {
            Partition::Large
        } else {
            Partition::Small
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}
