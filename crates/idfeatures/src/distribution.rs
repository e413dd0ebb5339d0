//! Empirical distributions of validated matches
//!
//! The peptide length distribution is built from the lengths of validated
//! peptides. Below [`MIN_PEPTIDES_FOR_DISTRIBUTION`] peptides the sample is
//! considered too small and no distribution is built.
//!
//! The mass error distribution is a normal distribution with one spread below
//! the median and another above, estimated from percentiles so that outliers
//! do not widen it.

use std::collections::BTreeMap;
use statrs::distribution::{ContinuousCDF, Normal};

/// Minimal number of validated peptides for an empirical distribution
pub const MIN_PEPTIDES_FOR_DISTRIBUTION: usize = 100;

/// Distribution of peptide lengths
#[derive(Debug, Clone, PartialEq)]
pub struct PeptideLengthDistribution {
    /// Length to number of peptides
    counts: BTreeMap<usize, usize>,
    /// Number of peptides
    n: usize,
}

impl PeptideLengthDistribution {
    /// Build a distribution, `None` when fewer than
    /// [`MIN_PEPTIDES_FOR_DISTRIBUTION`] lengths are given
    pub fn from_lengths<I: IntoIterator<Item = usize>>(lengths: I) -> Option<Self> {
        let mut counts = BTreeMap::new();
        let mut n = 0;
        for length in lengths {
            *counts.entry(length).or_insert(0) += 1;
            n += 1;
        }

        if n < MIN_PEPTIDES_FOR_DISTRIBUTION {
            return None;
        }

        Some(Self { counts, n })
    }

    /// Number of peptides in the sample
    pub fn len(&self) -> usize {
        self.n
    }

    /// Whether the sample is empty
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Share of peptides with exactly this length
    pub fn probability_at(&self, length: usize) -> f64 {
        match self.counts.get(&length) {
            Some(&count) => count as f64 / self.n as f64,
            None => 0.0,
        }
    }

    /// Share of peptides no longer than this length
    pub fn cumulative_probability_at(&self, length: usize) -> f64 {
        let count: usize = self.counts.range(..=length).map(|(_, count)| count).sum();
        count as f64 / self.n as f64
    }

    /// Smallest length whose cumulative probability reaches `p`
    pub fn value_at_cumulative_probability(&self, p: f64) -> f64 {
        let target = p.clamp(0.0, 1.0) * self.n as f64;
        let mut cumulative = 0;
        for (&length, &count) in &self.counts {
            cumulative += count;
            if cumulative as f64 >= target {
                return length as f64;
            }
        }
        self.counts.keys().next_back().copied().unwrap_or(0) as f64
    }
}

/// Percentile of the normal distribution one standard deviation below the mean
const LOWER_SIGMA_PERCENTILE: f64 = 0.159;

/// Percentile of the normal distribution one standard deviation above the mean
const UPPER_SIGMA_PERCENTILE: f64 = 0.841;

/// Precursor mass error distribution of a spectrum file
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MassErrorDistribution {
    median: f64,
    std_down: f64,
    std_up: f64,
}

impl MassErrorDistribution {
    /// Distribution with the given center and spreads
    pub fn new(median: f64, std_down: f64, std_up: f64) -> Self {
        Self {
            median,
            std_down,
            std_up,
        }
    }

    /// Robust estimate from ascending errors. All parameters are zero for an
    /// empty sample.
    pub fn from_sorted(errors: &[f64]) -> Self {
        let median = percentile(errors, 0.5);
        Self {
            median,
            std_down: median - percentile(errors, LOWER_SIGMA_PERCENTILE),
            std_up: percentile(errors, UPPER_SIGMA_PERCENTILE) - median,
        }
    }

    /// Center of the distribution
    pub fn median(&self) -> f64 {
        self.median
    }

    /// Spread below the median
    pub fn std_down(&self) -> f64 {
        self.std_down
    }

    /// Spread above the median
    pub fn std_up(&self) -> f64 {
        self.std_up
    }

    /// Probability of an error no larger than `error`
    pub fn cumulative_probability_at(&self, error: f64) -> f64 {
        let std = if error <= self.median {
            self.std_down
        } else {
            self.std_up
        };
        match Normal::new(self.median, std) {
            Ok(normal) => normal.cdf(error),
            // no spread on this side
            Err(_) if error < self.median => 0.0,
            Err(_) => 1.0,
        }
    }

    /// Probability of an error no smaller than `error`
    pub fn descending_cumulative_probability_at(&self, error: f64) -> f64 {
        1.0 - self.cumulative_probability_at(error)
    }
}

/// Linearly interpolated percentile of ascending values, 0 when empty
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let Some(&last) = sorted.last() else {
        return 0.0;
    };
    let position = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let below = position.floor() as usize;
    match sorted.get(below + 1) {
        Some(&above) => sorted[below] + (position - below as f64) * (above - sorted[below]),
        None => last,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths() -> Vec<usize> {
        // 50 peptides of length 10, 40 of 12, 10 of 25
        std::iter::repeat(10)
            .take(50)
            .chain(std::iter::repeat(12).take(40))
            .chain(std::iter::repeat(25).take(10))
            .collect()
    }

    #[test]
    fn test_too_few_peptides() {
        assert!(PeptideLengthDistribution::from_lengths(vec![10; 99]).is_none());
        assert!(PeptideLengthDistribution::from_lengths(vec![10; 100]).is_some());
    }

    #[test]
    fn test_probability_at() {
        let distribution = PeptideLengthDistribution::from_lengths(lengths()).unwrap();

        assert_eq!(distribution.len(), 100);
        assert_eq!(distribution.probability_at(10), 0.5);
        assert_eq!(distribution.probability_at(12), 0.4);
        assert_eq!(distribution.probability_at(11), 0.0);
    }

    #[test]
    fn test_cumulative() {
        let distribution = PeptideLengthDistribution::from_lengths(lengths()).unwrap();

        assert_eq!(distribution.cumulative_probability_at(11), 0.5);
        assert_eq!(distribution.cumulative_probability_at(30), 1.0);
        assert_eq!(distribution.value_at_cumulative_probability(0.5), 10.0);
        assert_eq!(distribution.value_at_cumulative_probability(0.9), 12.0);
        assert_eq!(distribution.value_at_cumulative_probability(0.99), 25.0);
    }

    #[test]
    fn test_mass_error_symmetric() {
        let errors: Vec<f64> = (0..=100).map(|i| i as f64 - 50.0).collect();
        let distribution = MassErrorDistribution::from_sorted(&errors);

        assert!(distribution.median().abs() < 1e-9);
        assert!((distribution.std_down() - 34.1).abs() < 1e-9);
        assert!((distribution.std_up() - 34.1).abs() < 1e-9);
        assert!((distribution.cumulative_probability_at(0.0) - 0.5).abs() < 1e-9);
        assert!((distribution.cumulative_probability_at(-34.1) - 0.1587).abs() < 1e-3);
        assert!((distribution.descending_cumulative_probability_at(34.1) - 0.1587).abs() < 1e-3);
    }

    #[test]
    fn test_mass_error_skewed() {
        let distribution = MassErrorDistribution::from_sorted(&[0.0, 0.0, 0.0, 1.0, 10.0]);

        assert_eq!(distribution.median(), 0.0);
        assert_eq!(distribution.std_down(), 0.0);
        assert!((distribution.std_up() - 4.276).abs() < 1e-9);
        assert_eq!(distribution.cumulative_probability_at(-0.5), 0.0);
        assert!(distribution.cumulative_probability_at(4.276) > 0.8);
    }

    #[test]
    fn test_mass_error_empty_sample() {
        let distribution = MassErrorDistribution::from_sorted(&[]);

        assert_eq!(distribution, MassErrorDistribution::new(0.0, 0.0, 0.0));
        assert_eq!(distribution.cumulative_probability_at(-1.0), 0.0);
        assert_eq!(distribution.descending_cumulative_probability_at(1.0), 0.0);
    }
}
