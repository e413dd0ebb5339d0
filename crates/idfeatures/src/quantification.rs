//! Spectrum counting abundance indices and their normalization
//!
//! Three indices are supported:
//! - NSAF: validated spectra per peptide, shared across the protein groups a
//!   peptide maps to, summed and divided by the observable protein length
//! - emPAI: `10^(n / (cleavage sites + 1)) - 1` over the validated peptides
//! - LFQ: summed precursor intensities
//!
//! Normalized values are expressed relative to the dataset totals, either as
//! a share (percentage, ppm) or as an amount of substance for a reference
//! sample mass.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metrics::SpectrumCountingTotals;
use crate::model::ValidationLevel;
use crate::units::{StandardUnit, Unit};

/// Default reference sample mass
pub const DEFAULT_REFERENCE_MASS: f64 = 2.0;

/// Abundance index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumCountingMethod {
    /// Normalized spectral abundance factor
    #[default]
    Nsaf,
    /// Exponentially modified protein abundance index
    Empai,
    /// Label-free quantification from precursor intensities
    Lfq,
}

/// Spectrum counting settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumCountingParameters {
    /// Index to compute
    pub method: SpectrumCountingMethod,
    /// Whether normalized accessors apply the unit
    pub normalize: bool,
    /// Normalization unit
    pub unit: Unit,
    /// Reference sample mass, required for molar units
    pub reference_mass: Option<f64>,
    /// Lowest validation level of the matches counted
    pub validation_level: ValidationLevel,
}

impl Default for SpectrumCountingParameters {
    fn default() -> Self {
        Self {
            method: SpectrumCountingMethod::default(),
            normalize: true,
            unit: Unit::default(),
            reference_mass: Some(DEFAULT_REFERENCE_MASS),
            validation_level: ValidationLevel::Doubtful,
        }
    }
}

impl SpectrumCountingParameters {
    /// Same settings with another index
    pub fn with_method(&self, method: SpectrumCountingMethod) -> Self {
        Self {
            method,
            ..self.clone()
        }
    }
}

/// Replace NaN and infinities with zero
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// NSAF from the summed spectral ratios and the protein length
pub fn nsaf(spectral_ratio_sum: f64, length: usize) -> f64 {
    finite_or_zero(spectral_ratio_sum / length as f64)
}

/// emPAI from the number of counted peptides.
///
/// `n_cleavage_sites` is `None` when the digestion is not enzymatic.
pub fn empai(n_peptides: usize, n_cleavage_sites: Option<usize>) -> f64 {
    let exponent = match n_cleavage_sites {
        Some(sites) => n_peptides as f64 / (sites + 1) as f64,
        None => n_peptides as f64,
    };
    finite_or_zero(10f64.powf(exponent) - 1.0)
}

/// Express a spectrum counting value in the given unit
pub fn normalize(
    value: f64,
    unit: Unit,
    reference_mass: Option<f64>,
    totals: SpectrumCountingTotals,
) -> Result<f64> {
    let result = match unit.standard() {
        StandardUnit::Mol => {
            let reference_mass = reference_mass.ok_or(Error::MissingReferenceMass)?;
            let correction = 9 + unit.prefix().exponent();
            value * 10f64.powi(-correction) * reference_mass / totals.total_mass
        }
        StandardUnit::Percentage => 100.0 * value / totals.total,
        StandardUnit::Ppm => 1_000_000.0 * value / totals.total,
    };
    Ok(finite_or_zero(result))
}
