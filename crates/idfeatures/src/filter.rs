//! Protein hiding filters

use serde::{Deserialize, Serialize};

/// A named filter hiding protein groups from the displayed list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProteinHideFilter {
    /// Filter name
    pub name: String,
    /// Whether the filter is applied
    #[serde(default)]
    pub active: bool,
}

/// Hiding filters set by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParameters {
    /// Protein hiding filters
    #[serde(default)]
    pub hide_filters: Vec<ProteinHideFilter>,
}

impl FilterParameters {
    /// Whether any hiding filter is applied
    pub fn any_active(&self) -> bool {
        self.hide_filters.iter().any(|filter| filter.active)
    }
}
