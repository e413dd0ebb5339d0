//! Single-slot caches
//!
//! A slot holds at most one value and is replaced wholesale. Selections pair
//! an ordering of children with the parent it was computed for and the
//! scratch metrics derived alongside it, so the three can never disagree.

use std::sync::Arc;
use parking_lot::Mutex;

/// A single value replaced atomically
#[derive(Debug)]
pub struct Slot<T> {
    value: Mutex<Option<T>>,
}

impl<T: Clone> Slot<T> {
    /// Create an empty slot
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    /// Current value, if any
    pub fn get(&self) -> Option<T> {
        self.value.lock().clone()
    }

    /// Replace the current value
    pub fn set(&self, value: T) {
        *self.value.lock() = Some(value);
    }

    /// Empty the slot
    pub fn clear(&self) {
        self.value.lock().take();
    }

    /// Whether the slot holds a value
    pub fn is_set(&self) -> bool {
        self.value.lock().is_some()
    }
}

impl<T: Clone> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered children of one parent match, with scratch metrics
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<M> {
    /// Key of the parent match the ordering belongs to
    pub parent_key: u64,
    /// Ordered child keys
    pub children: Arc<[u64]>,
    /// Values computed in the same pass as the ordering
    pub metrics: M,
}

impl<M> Selection<M> {
    /// Create a selection for the given parent
    pub fn new(parent_key: u64, children: Vec<u64>, metrics: M) -> Self {
        Self {
            parent_key,
            children: children.into(),
            metrics,
        }
    }

    /// Whether this selection was computed for `parent_key`
    pub fn is_for(&self, parent_key: u64) -> bool {
        self.parent_key == parent_key
    }
}

/// Scratch values of a protein's peptide list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeptideListMetrics {
    /// Largest number of spectra among the listed peptides
    pub max_spectrum_count: usize,
}

/// Scratch values of a peptide's PSM list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PsmListMetrics {
    /// Number of validated PSMs in the list
    pub validated_psms: usize,
}

/// Protein list after hiding filters, with its validated subset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedProteins {
    /// Non-decoy, non-hidden proteins in ranked order
    pub visible: Arc<[u64]>,
    /// The validated proteins of `visible`, same order
    pub validated: Arc<[u64]>,
}
