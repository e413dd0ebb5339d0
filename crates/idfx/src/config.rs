//! Settings and dataset files

use anyhow::{Context, Result};
use idcache::CacheConfig;
use idfeatures::{Dataset, DigestionParameters, SpectrumCountingParameters};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Cache capacities as written in the settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Entries shared by the small feature types
    pub small_capacity: usize,
    /// Entries shared by the per-residue feature types
    pub large_capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let config = CacheConfig::default();
        Self {
            small_capacity: config.small_capacity,
            large_capacity: config.large_capacity,
        }
    }
}

impl CacheSettings {
    /// Cache configuration
    pub fn config(&self) -> CacheConfig {
        CacheConfig::new(self.small_capacity, self.large_capacity)
    }
}

/// Analysis settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Digestion used in the search
    pub digestion: DigestionParameters,
    /// Spectrum counting method and unit
    pub spectrum_counting: SpectrumCountingParameters,
    /// Cache capacities
    pub cache: CacheSettings,
}

impl Settings {
    /// Load settings from a JSON file, defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            info!("No settings file given, using defaults");
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Settings =
            serde_json::from_str(&content).context("Failed to parse settings file")?;

        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

/// Load a dataset from a JSON file
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    let dataset: Dataset = serde_json::from_str(&content).context("Failed to parse dataset")?;

    info!(
        "Loaded {} protein groups, {} peptides and {} PSMs from {}",
        dataset.proteins.len(),
        dataset.peptides.len(),
        dataset.spectra.len(),
        path.display()
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idfeatures::{SpectrumCountingMethod, Unit};
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::load(None).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.cache.config(), CacheConfig::default());
    }

    #[test]
    fn test_partial_settings_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(
            &path,
            r#"{
                "digestion": {"enzymes": [{"name": "Lys-C", "rule": "[K]|{P}"}]},
                "spectrum_counting": {"method": "lfq", "unit": "ppm"},
                "cache": {"large_capacity": 10}
            }"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();

        assert_eq!(settings.digestion.enzymes[0].name(), "Lys-C");
        assert_eq!(settings.spectrum_counting.method, SpectrumCountingMethod::Lfq);
        assert_eq!(settings.spectrum_counting.unit, Unit::PPM);
        assert_eq!(settings.cache.large_capacity, 10);
        assert_eq!(settings.cache.small_capacity, CacheSettings::default().small_capacity);
    }

    #[test]
    fn test_invalid_settings_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(&path, r#"{"spectrum_counting": {"unit": "gram"}}"#).unwrap();

        assert!(Settings::load(Some(&path)).is_err());
        assert!(Settings::load(Some(&temp.path().join("missing.json"))).is_err());
    }

    #[test]
    fn test_load_dataset() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dataset.json");
        fs::write(
            &path,
            r#"{
                "proteins": [{"key": 1, "leading_accession": "P1", "peptide_keys": [10]}],
                "peptides": [{"key": 10, "sequence": "AAK", "protein_mapping": {"P1": [0]}}],
                "sequences": {"P1": "AAKR"}
            }"#,
        )
        .unwrap();

        let dataset = load_dataset(&path).unwrap();

        assert_eq!(dataset.proteins.len(), 1);
        assert_eq!(dataset.peptides[0].sequence, "AAK");
        assert!(dataset.spectra.is_empty());
    }
}
