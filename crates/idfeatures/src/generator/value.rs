//! Values stored in the features cache

use std::sync::Arc;

use crate::model::{ModificationMatch, ValidationLevel};

/// Fraction of a protein sequence covered at each validation level
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LevelCoverage {
    fractions: [f64; ValidationLevel::COUNT],
}

impl LevelCoverage {
    /// Build from per-level residue counts and the sequence length
    pub fn from_counts(counts: [usize; ValidationLevel::COUNT], length: usize) -> Self {
        let fractions = counts.map(|count| {
            let fraction = count as f64 / length as f64;
            if fraction.is_finite() {
                fraction
            } else {
                0.0
            }
        });
        Self { fractions }
    }

    /// Fraction of residues whose best covering level is `level`
    pub fn at(&self, level: ValidationLevel) -> f64 {
        self.fractions[level.index()]
    }

    /// Fraction covered at doubtful or confident level
    pub fn validated(&self) -> f64 {
        self.at(ValidationLevel::Doubtful) + self.at(ValidationLevel::Confident)
    }
}

/// A cached feature value
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// A number of matches
    Count(usize),
    /// A ratio or an abundance
    Fraction(f64),
    /// A yes/no property
    Flag(bool),
    /// Match keys
    Keys(Arc<[u64]>),
    /// Best validation level per residue
    Residues(Arc<[ValidationLevel]>),
    /// Weight per residue
    Weights(Arc<[f64]>),
    /// Sequence coverage per validation level
    CoverageByLevel(LevelCoverage),
    /// Localized modifications
    Modifications(Arc<[ModificationMatch]>),
    /// Annotated sequence
    Text(Arc<str>),
}

/// Conversion between a feature and its cached representation
pub(crate) trait CachedFeature: Clone {
    fn into_value(self) -> FeatureValue;

    /// `None` when the value holds another kind of feature
    fn from_value(value: FeatureValue) -> Option<Self>;
}

macro_rules! cached_feature {
    ($ty:ty, $variant:ident) => {
        impl CachedFeature for $ty {
            fn into_value(self) -> FeatureValue {
                FeatureValue::$variant(self)
            }

            fn from_value(value: FeatureValue) -> Option<Self> {
                match value {
                    FeatureValue::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

cached_feature!(usize, Count);
cached_feature!(f64, Fraction);
cached_feature!(bool, Flag);
cached_feature!(Arc<[u64]>, Keys);
cached_feature!(Arc<[ValidationLevel]>, Residues);
cached_feature!(Arc<[f64]>, Weights);
cached_feature!(LevelCoverage, CoverageByLevel);
cached_feature!(Arc<[ModificationMatch]>, Modifications);
cached_feature!(Arc<str>, Text);
