//! # idfeatures
//!
//! Memoized features of protein, peptide and PSM identifications.
//!
//! ## Architecture
//! - **Model**: matches with their validation status ([`model`])
//! - **Collaborators**: identification store, sequence provider and progress
//!   handler traits ([`store`]), with an in-memory implementation ([`memory`])
//! - **Digestion**: enzymes parsed from cleavage rules, cleavage sites and
//!   observable lengths ([`enzyme`], [`sequence`])
//! - **Quantification**: NSAF, emPAI and LFQ with unit normalization
//!   ([`quantification`], [`units`])
//! - **Modifications**: site summaries and annotated sequences
//!   ([`modifications`]), precursor mass error distributions per spectrum
//!   file ([`distribution`])
//! - **Generator**: compute-if-absent accessors backed by an
//!   [`idcache::FeaturesCache`] ([`FeaturesGenerator`])
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use idfeatures::{Dataset, DigestionParameters, FeaturesGenerator, InMemoryStore};
//!
//! let store = Arc::new(InMemoryStore::from_dataset(Dataset::default()));
//! let generator = FeaturesGenerator::new(store.clone(), store, DigestionParameters::default());
//! let proteins = generator.processed_protein_keys(None, None, false).unwrap();
//! assert_eq!(proteins.map(|keys| keys.len()), Some(0));
//! ```

#![warn(missing_docs)]

pub mod distribution;
pub mod enzyme;
pub mod error;
pub mod filter;
pub mod generator;
pub mod memory;
pub mod metrics;
pub mod model;
pub mod modifications;
pub mod parser;
pub mod quantification;
pub mod sequence;
pub mod store;
pub mod units;

pub use distribution::MassErrorDistribution;
pub use enzyme::{Cleavage, DigestionParameters, Enzyme};
pub use error::{Error, MatchKind, Result};
pub use filter::{FilterParameters, ProteinHideFilter};
pub use generator::{
    CoverageFilter, FeatureValue, FeaturesGenerator, LevelCoverage, ModifiedMatch,
};
pub use memory::{Dataset, InMemoryStore};
pub use metrics::{DatasetMaxima, Metrics, SpectrumCountingTotals};
pub use model::{
    MatchStatus, ModificationMatch, PeptideMatch, ProteinMatch, SpectrumMatch, ValidationLevel,
};
pub use quantification::{SpectrumCountingMethod, SpectrumCountingParameters};
pub use store::{IdentificationStore, ProgressHandler, SequenceProvider};
pub use units::Unit;
