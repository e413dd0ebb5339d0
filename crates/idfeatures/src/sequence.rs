//! Digestion-aware protein sequence utilities

use std::ops::Range;

use crate::enzyme::{DigestionParameters, Enzyme};
use crate::model::PeptideMatch;

/// Average mass of water in Da
const WATER_MASS: f64 = 18.01528;

/// Average residue mass in Da, 0 for unknown residues
fn residue_mass(residue: u8) -> f64 {
    match residue.to_ascii_uppercase() {
        b'A' => 71.0788,
        b'R' => 156.1875,
        b'N' => 114.1038,
        b'D' => 115.0886,
        b'C' => 103.1388,
        b'E' => 129.1155,
        b'Q' => 128.1307,
        b'G' => 57.0519,
        b'H' => 137.1411,
        b'I' | b'L' | b'J' => 113.1594,
        b'K' => 128.1741,
        b'M' => 131.1926,
        b'F' => 147.1766,
        b'P' => 97.1167,
        b'S' => 87.0782,
        b'T' => 101.1051,
        b'W' => 186.2132,
        b'Y' => 163.1760,
        b'V' => 99.1326,
        b'U' => 150.0388,
        b'O' => 237.3018,
        _ => 0.0,
    }
}

/// Average molecular weight of a protein in kDa
pub fn molecular_weight(sequence: &str) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }
    let residues: f64 = sequence.bytes().map(residue_mass).sum();
    (residues + WATER_MASS) / 1000.0
}

/// Number of bonds cleaved by any of the enzymes
pub fn n_cleavage_sites(sequence: &str, digestion: &DigestionParameters) -> usize {
    sequence
        .as_bytes()
        .windows(2)
        .filter(|pair| digestion.is_cleavage_site(pair[0], pair[1]))
        .count()
}

/// Fully cleaved fragments of a sequence, as residue ranges covering it
pub fn cleavage_intervals(sequence: &str, digestion: &DigestionParameters) -> Vec<Range<usize>> {
    let residues = sequence.as_bytes();
    if residues.is_empty() {
        return Vec::new();
    }

    let mut intervals = Vec::new();
    let mut start = 0;
    for (i, pair) in residues.windows(2).enumerate() {
        if digestion.is_cleavage_site(pair[0], pair[1]) {
            intervals.push(start..i + 1);
            start = i + 1;
        }
    }
    intervals.push(start..residues.len());
    intervals
}

/// Number of residues in fragments no longer than `max_length`
pub fn observable_length(sequence: &str, digestion: &DigestionParameters, max_length: f64) -> usize {
    cleavage_intervals(sequence, digestion)
        .into_iter()
        .map(|interval| interval.len())
        .filter(|&length| length as f64 <= max_length)
        .sum()
}

/// Number of peptide termini (0 to 2) compatible with the enzyme
pub fn n_enzymatic_termini(start: usize, end: usize, sequence: &str, enzyme: &Enzyme) -> usize {
    let residues = sequence.as_bytes();
    let mut n_enzymatic = 0;

    if start == 0
        || (start < residues.len() && enzyme.is_cleavage_site(residues[start - 1], residues[start]))
    {
        n_enzymatic += 1;
    }

    if end + 1 >= residues.len() || enzyme.is_cleavage_site(residues[end], residues[end + 1]) {
        n_enzymatic += 1;
    }

    n_enzymatic
}

/// Whether a peptide is fully enzymatic at one of its positions on a protein
pub fn is_enzymatic(
    peptide: &PeptideMatch,
    accession: &str,
    sequence: &str,
    digestion: &DigestionParameters,
) -> bool {
    let starts = peptide.starts(accession);
    digestion.enzymes.iter().any(|enzyme| {
        starts
            .iter()
            .any(|&start| n_enzymatic_termini(start, peptide.end(start), sequence, enzyme) == 2)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::model::MatchStatus;

    const SEQUENCE: &str = "MAKPEPTIDERAAAK";

    fn peptide(sequence: &str, start: usize) -> PeptideMatch {
        PeptideMatch {
            key: 1,
            sequence: sequence.to_string(),
            protein_mapping: BTreeMap::from([("P1".to_string(), vec![start])]),
            spectrum_keys: Vec::new(),
            modifications: Vec::new(),
            status: MatchStatus::default(),
        }
    }

    #[test]
    fn test_cleavage_sites() {
        let trypsin = DigestionParameters::default();

        // K-P is blocked, only R-A is cleaved
        assert_eq!(n_cleavage_sites(SEQUENCE, &trypsin), 1);
        assert_eq!(n_cleavage_sites("", &trypsin), 0);
    }

    #[test]
    fn test_intervals_cover_sequence() {
        let trypsin = DigestionParameters::default();

        let intervals = cleavage_intervals("AKGGRGG", &trypsin);
        assert_eq!(intervals, vec![0..2, 2..5, 5..7]);
        assert!(cleavage_intervals("", &trypsin).is_empty());
    }

    #[test]
    fn test_observable_length() {
        let trypsin = DigestionParameters::default();

        assert_eq!(observable_length("AKGGRGG", &trypsin, 3.0), 7);
        assert_eq!(observable_length("AKGGRGG", &trypsin, 2.0), 4);
        assert_eq!(observable_length("AKGGRGG", &trypsin, 1.0), 0);
    }

    #[test]
    fn test_enzymatic_termini() {
        let trypsin = Enzyme::trypsin();

        // PEPTIDER follows a K-P bond, which trypsin does not cleave
        assert_eq!(n_enzymatic_termini(3, 10, SEQUENCE, &trypsin), 1);
        // AAAK at the C-terminus, preceded by R
        assert_eq!(n_enzymatic_termini(11, 14, SEQUENCE, &trypsin), 2);
        // MAK at the N-terminus, K followed by P
        assert_eq!(n_enzymatic_termini(0, 2, SEQUENCE, &trypsin), 1);
    }

    #[test]
    fn test_is_enzymatic() {
        let trypsin = DigestionParameters::default();

        assert!(is_enzymatic(&peptide("AAAK", 11), "P1", SEQUENCE, &trypsin));
        assert!(!is_enzymatic(&peptide("PEPTIDER", 3), "P1", SEQUENCE, &trypsin));
        assert!(!is_enzymatic(&peptide("AAAK", 11), "P2", SEQUENCE, &trypsin));
    }

    #[test]
    fn test_molecular_weight() {
        assert_eq!(molecular_weight(""), 0.0);

        let glycine = molecular_weight("G");
        assert!((glycine - (57.0519 + WATER_MASS) / 1000.0).abs() < 1e-9);
        assert!(molecular_weight("GG") > glycine);
    }
}
