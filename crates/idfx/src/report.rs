//! Report rows and their rendering

use anyhow::Result;
use idfeatures::{
    FeaturesGenerator, ModifiedMatch, SpectrumCountingMethod, Unit, ValidationLevel,
};
use serde::Serialize;
use std::io::Write;

/// A row printable as a table line
pub trait TextRow {
    /// Column names
    fn header() -> &'static str;

    /// Tab-separated values
    fn line(&self) -> String;
}

/// A ranked protein group with its features
#[derive(Debug, Clone, Serialize)]
pub struct ProteinRow {
    pub rank: usize,
    pub key: u64,
    pub accession: String,
    pub level: ValidationLevel,
    pub score: f64,
    pub n_peptides: usize,
    pub n_validated_peptides: usize,
    pub n_unique_peptides: usize,
    pub n_spectra: usize,
    pub n_validated_spectra: usize,
    pub validated_coverage: f64,
    pub observable_coverage: f64,
    pub enzymatic: bool,
    pub abundance: f64,
    pub unit: String,
}

impl TextRow for ProteinRow {
    fn header() -> &'static str {
        "rank\tkey\taccession\tlevel\tscore\tpeptides\tvalidated_peptides\tunique_peptides\tspectra\tvalidated_spectra\tcoverage\tobservable\tenzymatic\tabundance"
    }

    fn line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{:?}\t{:.4}\t{}\t{}\t{}\t{}\t{}\t{:.1}%\t{:.1}%\t{}\t{:.4} {}",
            self.rank,
            self.key,
            self.accession,
            self.level,
            self.score,
            self.n_peptides,
            self.n_validated_peptides,
            self.n_unique_peptides,
            self.n_spectra,
            self.n_validated_spectra,
            100.0 * self.validated_coverage,
            100.0 * self.observable_coverage,
            self.enzymatic,
            self.abundance,
            self.unit
        )
    }
}

/// A peptide of a protein group
#[derive(Debug, Clone, Serialize)]
pub struct PeptideRow {
    pub rank: usize,
    pub key: u64,
    pub sequence: String,
    pub modified_sequence: String,
    pub confident_sites: String,
    pub level: ValidationLevel,
    pub score: f64,
    pub n_spectra: usize,
    pub n_validated_spectra: usize,
    pub n_validated_protein_groups: usize,
    pub n_enzymatic_termini: usize,
}

impl TextRow for PeptideRow {
    fn header() -> &'static str {
        "rank\tkey\tsequence\tmodified_sequence\tconfident_sites\tlevel\tscore\tspectra\tvalidated_spectra\tvalidated_groups\tenzymatic_termini"
    }

    fn line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{:?}\t{:.4}\t{}\t{}\t{}\t{}",
            self.rank,
            self.key,
            self.sequence,
            self.modified_sequence,
            self.confident_sites,
            self.level,
            self.score,
            self.n_spectra,
            self.n_validated_spectra,
            self.n_validated_protein_groups,
            self.n_enzymatic_termini
        )
    }
}

/// A PSM of a peptide
#[derive(Debug, Clone, Serialize)]
pub struct PsmRow {
    pub rank: usize,
    pub key: u64,
    pub charge: i32,
    pub retention_time: Option<f64>,
    pub level: ValidationLevel,
    pub score: f64,
}

impl TextRow for PsmRow {
    fn header() -> &'static str {
        "rank\tkey\tcharge\trt\tlevel\tscore"
    }

    fn line(&self) -> String {
        let rt = self
            .retention_time
            .map_or_else(|| "-".to_string(), |rt| format!("{:.2}", rt));
        format!(
            "{}\t{}\t{}\t{}\t{:?}\t{:.4}",
            self.rank, self.key, self.charge, rt, self.level, self.score
        )
    }
}

/// Build protein rows for the ranked keys
pub fn protein_rows(
    generator: &FeaturesGenerator,
    keys: &[u64],
    method: SpectrumCountingMethod,
    unit: Unit,
) -> Result<Vec<ProteinRow>> {
    let store = generator.store();
    let mut rows = Vec::with_capacity(keys.len());

    for (rank, &key) in keys.iter().enumerate() {
        let Some(protein) = store.protein_match(key) else {
            continue;
        };

        rows.push(ProteinRow {
            rank: rank + 1,
            key,
            accession: protein.leading_accession.clone(),
            level: protein.status.level,
            score: protein.status.score,
            n_peptides: protein.peptide_keys.len(),
            n_validated_peptides: generator.n_validated_peptides(key)?,
            n_unique_peptides: generator.n_unique_peptides(key)?,
            n_spectra: generator.n_spectra(key)?,
            n_validated_spectra: generator.n_validated_spectra(key)?,
            validated_coverage: generator.validated_sequence_coverage(key)?,
            observable_coverage: generator.observable_coverage(key)?,
            enzymatic: generator.has_enzymatic_peptides(key)?,
            abundance: generator.normalized_spectrum_counting_with(key, unit, method)?,
            unit: unit.to_string(),
        });
    }

    Ok(rows)
}

/// Build peptide rows for a protein group
pub fn peptide_rows(generator: &FeaturesGenerator, protein_key: u64) -> Result<Vec<PeptideRow>> {
    let store = generator.store();
    let protein = store
        .protein_match(protein_key)
        .ok_or_else(|| anyhow::anyhow!("Protein group {} not found", protein_key))?;

    let keys = generator.sorted_peptide_keys(protein_key)?;
    let mut rows = Vec::with_capacity(keys.len());
    for (rank, &key) in keys.iter().enumerate() {
        let Some(peptide) = store.peptide_match(key) else {
            continue;
        };

        let modified = ModifiedMatch::Peptide(key);
        rows.push(PeptideRow {
            rank: rank + 1,
            key,
            sequence: peptide.sequence.clone(),
            modified_sequence: generator.modified_sequence(modified)?.to_string(),
            confident_sites: generator.modification_sites(modified, true)?,
            level: peptide.status.level,
            score: peptide.status.score,
            n_spectra: peptide.spectrum_count(),
            n_validated_spectra: generator.n_validated_spectra_for_peptide(key)?,
            n_validated_protein_groups: generator.n_validated_protein_groups(key)?,
            n_enzymatic_termini: generator.n_enzymatic_termini(key, &protein.leading_accession)?,
        });
    }

    Ok(rows)
}

/// Build PSM rows for a peptide
pub fn psm_rows(
    generator: &FeaturesGenerator,
    peptide_key: u64,
    sort_on_rt: bool,
) -> Result<Vec<PsmRow>> {
    let store = generator.store();
    let keys = generator.sorted_psm_keys(peptide_key, sort_on_rt, true)?;

    let mut rows = Vec::with_capacity(keys.len());
    for (rank, &key) in keys.iter().enumerate() {
        let Some(spectrum) = store.spectrum_match(key) else {
            continue;
        };

        rows.push(PsmRow {
            rank: rank + 1,
            key,
            charge: spectrum.charge,
            retention_time: spectrum.retention_time,
            level: spectrum.status.level,
            score: spectrum.status.score,
        });
    }

    Ok(rows)
}

/// Write rows as a table, or as a JSON array
pub fn render<R, W>(rows: &[R], json: bool, mut writer: W) -> Result<()>
where
    R: TextRow + Serialize,
    W: Write,
{
    if json {
        serde_json::to_writer_pretty(&mut writer, rows)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "{}", R::header())?;
    for row in rows {
        writeln!(writer, "{}", row.line())?;
    }
    Ok(())
}
