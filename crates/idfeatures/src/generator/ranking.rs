//! Ranked protein, peptide and PSM lists

use std::cmp::Ordering;
use std::sync::Arc;
use idcache::{DisplayedProteins, PeptideListMetrics, PsmListMetrics, Selection};
use tracing::debug;

use super::{Cache, FeaturesGenerator};
use crate::error::Result;
use crate::filter::FilterParameters;
use crate::metrics::DatasetMaxima;
use crate::model::ValidationLevel;
use crate::sequence::molecular_weight;
use crate::store::ProgressHandler;

/// Ranking key of a protein group
struct RankedProtein {
    score: f64,
    n_peptides: usize,
    n_spectra: usize,
    key: u64,
}

impl RankedProtein {
    /// Ascending score, then more peptides, then more spectra, then key
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.n_peptides.cmp(&self.n_peptides))
            .then_with(|| other.n_spectra.cmp(&self.n_spectra))
            .then_with(|| self.key.cmp(&other.key))
    }
}

/// Poll the progress handler after one match, `true` when cancelled
fn step(progress: Option<&dyn ProgressHandler>) -> bool {
    match progress {
        Some(progress) => {
            progress.increment();
            progress.is_cancelled()
        }
        None => false,
    }
}

impl FeaturesGenerator {
    /// Ranked protein groups after hiding filters.
    ///
    /// The ranking runs when no ranked list exists or `force_update` is set.
    /// When the dataset maxima are stale they are computed in the same pass.
    /// Hiding runs again when a filter is or was active, or has never run.
    /// Returns `None` if the progress handler cancelled, leaving the stored
    /// lists unchanged.
    pub fn processed_protein_keys(
        &self,
        progress: Option<&dyn ProgressHandler>,
        filters: Option<&FilterParameters>,
        force_update: bool,
    ) -> Result<Option<Arc<[u64]>>> {
        let cache = self.cache();

        let (ranked, newly_ranked) = match cache.ranked_proteins() {
            Some(ranked) if !force_update => (ranked, false),
            _ => match self.rank_proteins(progress)? {
                Some(ranked) => (ranked, true),
                None => return Ok(None),
            },
        };

        if self.hiding_needed(&cache, filters) || cache.displayed_proteins().is_none() || newly_ranked {
            let Some(displayed) = self.hide_proteins(&ranked, progress)? else {
                return Ok(None);
            };
            cache.set_displayed_proteins(displayed);
        }
        if newly_ranked {
            cache.set_ranked_proteins(ranked);
        }

        Ok(cache.displayed_proteins().map(|displayed| displayed.visible))
    }

    /// Ranked protein groups before hiding filters, ranking them if needed
    pub fn protein_keys(
        &self,
        progress: Option<&dyn ProgressHandler>,
        filters: Option<&FilterParameters>,
    ) -> Result<Option<Arc<[u64]>>> {
        if self.cache().ranked_proteins().is_none()
            && self.processed_protein_keys(progress, filters, true)?.is_none()
        {
            return Ok(None);
        }
        Ok(self.cache().ranked_proteins())
    }

    /// Validated protein groups of the displayed list
    pub fn validated_protein_keys(
        &self,
        progress: Option<&dyn ProgressHandler>,
        filters: Option<&FilterParameters>,
    ) -> Result<Option<Arc<[u64]>>> {
        if self.cache().displayed_proteins().is_none()
            && self.processed_protein_keys(progress, filters, true)?.is_none()
        {
            return Ok(None);
        }
        Ok(self
            .cache()
            .displayed_proteins()
            .map(|displayed| displayed.validated))
    }

    /// Replace the ranked protein list
    pub fn set_protein_keys(&self, keys: Vec<u64>) {
        self.cache().set_ranked_proteins(keys.into());
    }

    fn rank_proteins(&self, progress: Option<&dyn ProgressHandler>) -> Result<Option<Arc<[u64]>>> {
        if let Some(progress) = progress {
            progress.set_status("Loading protein information");
            progress.start(self.store.protein_count());
        }

        let needs_maxima = self.metrics.maxima_stale();
        let mut maxima = DatasetMaxima::default();
        let (mut n_validated, mut n_confident) = (0, 0);

        let mut proteins = Vec::new();
        for key in self.store.protein_keys() {
            let protein = self.protein(key)?;
            if !protein.decoy && !protein.status.hidden {
                let n_peptides = protein.peptide_keys.len();
                let n_spectra = self.n_spectra(key)?;

                if needs_maxima {
                    maxima.max_peptides = maxima.max_peptides.max(n_peptides);
                    maxima.max_spectra = maxima.max_spectra.max(n_spectra);
                    maxima.max_spectrum_counting = maxima
                        .max_spectrum_counting
                        .max(self.normalized_spectrum_counting(key)?);
                    let sequence = self.sequence(&protein.leading_accession)?;
                    maxima.max_molecular_weight =
                        maxima.max_molecular_weight.max(molecular_weight(&sequence));

                    if protein.status.level.is_validated() {
                        n_validated += 1;
                    }
                    if protein.status.level == ValidationLevel::Confident {
                        n_confident += 1;
                    }
                }

                proteins.push(RankedProtein {
                    score: protein.status.score,
                    n_peptides,
                    n_spectra,
                    key,
                });
            }

            if step(progress) {
                return Ok(None);
            }
        }

        if needs_maxima {
            self.metrics.set_maxima(maxima);
            self.metrics.set_protein_counts(n_validated, n_confident);
        }

        proteins.sort_by(RankedProtein::cmp);
        debug!(n_proteins = proteins.len(), needs_maxima, "ranked proteins");

        Ok(Some(proteins.iter().map(|protein| protein.key).collect()))
    }

    /// Whether the displayed list must be recomputed for these filters.
    ///
    /// Once a filter has been active, hiding runs on every call.
    fn hiding_needed(&self, cache: &Cache, filters: Option<&FilterParameters>) -> bool {
        let Some(filters) = filters else {
            return false;
        };
        if cache.is_filtered() {
            return true;
        }
        if filters.any_active() {
            cache.set_filtered(true);
            return true;
        }
        false
    }

    fn hide_proteins(
        &self,
        ranked: &[u64],
        progress: Option<&dyn ProgressHandler>,
    ) -> Result<Option<DisplayedProteins>> {
        if let Some(progress) = progress {
            progress.set_status("Updating protein list");
            progress.start(ranked.len());
        }

        let mut visible = Vec::with_capacity(ranked.len());
        let mut validated = Vec::new();
        let mut n_confident = 0;
        for &key in ranked {
            let protein = self.protein(key)?;
            if !protein.decoy && !protein.status.hidden {
                visible.push(key);
                if protein.status.level.is_validated() {
                    validated.push(key);
                    if protein.status.level == ValidationLevel::Confident {
                        n_confident += 1;
                    }
                }
            }

            if step(progress) {
                return Ok(None);
            }
        }

        self.metrics.set_protein_counts(validated.len(), n_confident);
        Ok(Some(DisplayedProteins {
            visible: visible.into(),
            validated: validated.into(),
        }))
    }

    /// Visible peptides of a protein group: ascending score, then more
    /// spectra first, then key.
    ///
    /// The list is kept as the current peptide selection until another
    /// protein is requested.
    pub fn sorted_peptide_keys(&self, protein_key: u64) -> Result<Arc<[u64]>> {
        let cache = self.cache();
        if let Some(selection) = cache.peptide_selection(protein_key) {
            return Ok(selection.children);
        }

        let protein = self.protein(protein_key)?;
        let mut peptides = Vec::with_capacity(protein.peptide_keys.len());
        for &peptide_key in &protein.peptide_keys {
            let peptide = self.peptide(peptide_key)?;
            if !peptide.status.hidden {
                peptides.push((peptide.status.score, peptide.spectrum_count(), peptide_key));
            }
        }

        peptides.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| b.1.cmp(&a.1))
                .then_with(|| a.2.cmp(&b.2))
        });
        peptides.dedup_by_key(|peptide| peptide.2);

        let max_spectrum_count = peptides.iter().map(|peptide| peptide.1).max().unwrap_or(0);
        let selection = Selection::new(
            protein_key,
            peptides.into_iter().map(|peptide| peptide.2).collect(),
            PeptideListMetrics { max_spectrum_count },
        );
        let children = selection.children.clone();
        cache.set_peptide_selection(selection);
        Ok(children)
    }

    /// Most PSMs of a peptide in the current peptide selection
    pub fn max_spectrum_count(&self) -> usize {
        self.cache()
            .last_peptide_selection()
            .map_or(0, |selection| selection.metrics.max_spectrum_count)
    }

    /// Visible PSMs of a peptide: ascending charge, then retention time or
    /// score, then key.
    ///
    /// Retention times are used only when `sort_on_rt` is set and every
    /// visible PSM has one.
    pub fn sorted_psm_keys(
        &self,
        peptide_key: u64,
        sort_on_rt: bool,
        force_update: bool,
    ) -> Result<Arc<[u64]>> {
        let cache = self.cache();
        if !force_update {
            if let Some(selection) = cache.psm_selection(peptide_key) {
                return Ok(selection.children);
            }
        }

        let peptide = self.peptide(peptide_key)?;
        let mut spectra = Vec::with_capacity(peptide.spectrum_keys.len());
        for &spectrum_key in &peptide.spectrum_keys {
            let spectrum = self.spectrum(spectrum_key)?;
            if !spectrum.status.hidden {
                spectra.push(spectrum);
            }
        }

        let use_rt = sort_on_rt
            && spectra.iter().all(|spectrum| {
                spectrum
                    .retention_time
                    .map_or(false, |rt| !rt.is_nan())
            });
        let validated_psms = spectra
            .iter()
            .filter(|spectrum| spectrum.status.level.is_validated())
            .count();

        let mut ordered: Vec<(i32, f64, u64)> = spectra
            .iter()
            .map(|spectrum| {
                let secondary = match spectrum.retention_time {
                    Some(rt) if use_rt => rt,
                    _ => spectrum.status.score,
                };
                (spectrum.charge, secondary, spectrum.key)
            })
            .collect();
        ordered.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| a.1.total_cmp(&b.1))
                .then_with(|| a.2.cmp(&b.2))
        });

        let selection = Selection::new(
            peptide_key,
            ordered.into_iter().map(|spectrum| spectrum.2).collect(),
            PsmListMetrics { validated_psms },
        );
        let children = selection.children.clone();
        cache.set_psm_selection(selection);
        Ok(children)
    }

    /// Validated PSMs in the current PSM selection
    pub fn n_validated_psms(&self) -> usize {
        self.cache()
            .last_psm_selection()
            .map_or(0, |selection| selection.metrics.validated_psms)
    }
}
