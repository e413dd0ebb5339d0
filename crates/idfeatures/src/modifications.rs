//! Modification site summaries
//!
//! Terminal sites are reported on the terminal residue: the N-terminus on
//! residue 1, the C-terminus on the last residue.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::model::ModificationMatch;

/// 1-based number of the residue carrying a modification site
pub fn residue_number(site: usize, length: usize) -> Result<usize> {
    match site {
        _ if length == 0 => Err(Error::ModificationSiteOutOfSequence { site, length }),
        0 => Ok(1),
        site if site <= length => Ok(site),
        site if site == length + 1 => Ok(length),
        site => Err(Error::ModificationSiteOutOfSequence { site, length }),
    }
}

/// Residue letter at a 1-based residue number
fn residue_at(sequence: &str, number: usize) -> char {
    sequence.as_bytes()[number - 1] as char
}

fn localized(
    modifications: &[ModificationMatch],
    confident: bool,
) -> impl Iterator<Item = &ModificationMatch> {
    modifications
        .iter()
        .filter(move |modification| modification.confident == confident)
}

/// Modifications and where they sit, e.g. `Phosphorylation (S1); Oxidation (M6)`.
///
/// Only modifications whose localization confidence matches `confident` are
/// listed, ordered by site then name. Empty when none qualifies.
pub fn modification_sites(
    sequence: &str,
    modifications: &[ModificationMatch],
    confident: bool,
) -> Result<String> {
    let mut by_site: BTreeMap<usize, BTreeSet<&str>> = BTreeMap::new();
    for modification in localized(modifications, confident) {
        by_site
            .entry(modification.site)
            .or_default()
            .insert(&modification.name);
    }

    let mut entries = Vec::new();
    for (site, names) in by_site {
        let number = residue_number(site, sequence.len())?;
        let residue = residue_at(sequence, number);
        for name in names {
            entries.push(format!("{} ({}{})", name, residue, number));
        }
    }
    Ok(entries.join("; "))
}

/// Occurrences per modification name, e.g. `Oxidation (2);Phosphorylation (1)`
pub fn modification_sites_number(modifications: &[ModificationMatch], confident: bool) -> String {
    let mut occurrences: BTreeMap<&str, usize> = BTreeMap::new();
    for modification in localized(modifications, confident) {
        *occurrences.entry(&modification.name).or_insert(0) += 1;
    }

    occurrences
        .into_iter()
        .map(|(name, count)| format!("{} ({})", name, count))
        .collect::<Vec<_>>()
        .join(";")
}

/// Residues carrying one of the targeted modifications, e.g. `S3,T7`
pub fn targeted_modification_sites(
    sequence: &str,
    modifications: &[ModificationMatch],
    confident: bool,
    targets: &BTreeSet<String>,
) -> Result<String> {
    let mut numbers = BTreeSet::new();
    for modification in localized(modifications, confident) {
        if targets.contains(&modification.name) {
            numbers.insert(residue_number(modification.site, sequence.len())?);
        }
    }

    Ok(numbers
        .into_iter()
        .map(|number| format!("{}{}", residue_at(sequence, number), number))
        .collect::<Vec<_>>()
        .join(","))
}

/// Number of distinct sites carrying one of the targeted modifications
pub fn targeted_modification_sites_number(
    modifications: &[ModificationMatch],
    confident: bool,
    targets: &BTreeSet<String>,
) -> usize {
    localized(modifications, confident)
        .filter(|modification| targets.contains(&modification.name))
        .map(|modification| modification.site)
        .collect::<BTreeSet<_>>()
        .len()
}

/// Sequence with the modification names after their residue, e.g.
/// `PEM<Oxidation>K`
pub fn modified_sequence(sequence: &str, modifications: &[ModificationMatch]) -> Result<String> {
    let mut by_residue: BTreeMap<usize, BTreeSet<&str>> = BTreeMap::new();
    for modification in modifications {
        by_residue
            .entry(residue_number(modification.site, sequence.len())?)
            .or_default()
            .insert(&modification.name);
    }

    let mut result = String::with_capacity(sequence.len() + 16 * by_residue.len());
    for (index, residue) in sequence.chars().enumerate() {
        result.push(residue);
        if let Some(names) = by_residue.get(&(index + 1)) {
            result.push('<');
            result.push_str(&names.iter().copied().collect::<Vec<_>>().join(","));
            result.push('>');
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mods() -> Vec<ModificationMatch> {
        vec![
            ModificationMatch::confident("Oxidation", 6),
            ModificationMatch::confident("Phosphorylation", 1),
            ModificationMatch::confident("Acetylation", 0),
            ModificationMatch::ambiguous("Phosphorylation", 4),
            ModificationMatch::confident("Oxidation", 6),
        ]
    }

    fn targets(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_residue_number() {
        assert_eq!(residue_number(0, 8).unwrap(), 1);
        assert_eq!(residue_number(3, 8).unwrap(), 3);
        assert_eq!(residue_number(9, 8).unwrap(), 8);
        assert_eq!(
            residue_number(10, 8),
            Err(Error::ModificationSiteOutOfSequence { site: 10, length: 8 })
        );
        assert!(residue_number(0, 0).is_err());
    }

    #[test]
    fn test_modification_sites() {
        let sites = modification_sites("SPEQVMCE", &mods(), true).unwrap();
        assert_eq!(sites, "Acetylation (S1); Phosphorylation (S1); Oxidation (M6)");

        let ambiguous = modification_sites("SPEQVMCE", &mods(), false).unwrap();
        assert_eq!(ambiguous, "Phosphorylation (Q4)");

        assert_eq!(modification_sites("SPEQVMCE", &[], true).unwrap(), "");
        let beyond = [ModificationMatch::confident("Oxidation", 12)];
        assert!(modification_sites("SPEQVMCE", &beyond, true).is_err());
    }

    #[test]
    fn test_c_terminal_site() {
        let amidation = [ModificationMatch::confident("Amidation", 9)];

        assert_eq!(
            modification_sites("SPEQVMCE", &amidation, true).unwrap(),
            "Amidation (E8)"
        );
    }

    #[test]
    fn test_modification_sites_number() {
        assert_eq!(
            modification_sites_number(&mods(), true),
            "Acetylation (1);Oxidation (2);Phosphorylation (1)"
        );
        assert_eq!(modification_sites_number(&mods(), false), "Phosphorylation (1)");
        assert_eq!(modification_sites_number(&[], true), "");
    }

    #[test]
    fn test_targeted_sites() {
        let phospho = targets(&["Phosphorylation", "Oxidation"]);

        assert_eq!(
            targeted_modification_sites("SPEQVMCE", &mods(), true, &phospho).unwrap(),
            "S1,M6"
        );
        assert_eq!(targeted_modification_sites_number(&mods(), true, &phospho), 2);
        assert_eq!(targeted_modification_sites_number(&mods(), false, &phospho), 1);
        assert_eq!(
            targeted_modification_sites("SPEQVMCE", &mods(), true, &targets(&["Deamidation"]))
                .unwrap(),
            ""
        );
    }

    #[test]
    fn test_modified_sequence() {
        assert_eq!(
            modified_sequence("SPEQVMCE", &mods()).unwrap(),
            "S<Acetylation,Phosphorylation>PEQ<Phosphorylation>VM<Oxidation>CE"
        );
        assert_eq!(modified_sequence("SPEQVMCE", &[]).unwrap(), "SPEQVMCE");
    }
}
