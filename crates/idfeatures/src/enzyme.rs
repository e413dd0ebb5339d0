//! Enzymes and digestion settings

use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::{parse_rule, ResidueGroup};

/// Cleavage rule of trypsin
pub const TRYPSIN_RULE: &str = "[KR]|{P}";

/// Default minimal peptide length
pub const DEFAULT_MIN_PEPTIDE_LENGTH: usize = 8;

/// Default maximal peptide length
pub const DEFAULT_MAX_PEPTIDE_LENGTH: usize = 30;

/// Name and rule of an enzyme, as written in settings files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnzymeDefinition {
    /// Enzyme name
    pub name: String,
    /// Cleavage rule, e.g. `[KR]|{P}`
    pub rule: String,
}

/// A protease and the bonds it cleaves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EnzymeDefinition", into = "EnzymeDefinition")]
pub struct Enzyme {
    name: String,
    rule: String,
    /// Cleaves after these residues
    cleave_after: BTreeSet<char>,
    /// Cleaves before these residues
    cleave_before: BTreeSet<char>,
    /// No cleavage after a trigger residue when the next residue is one of these
    blocked_after: BTreeSet<char>,
    /// No cleavage before a trigger residue when the previous residue is one of these
    blocked_before: BTreeSet<char>,
}

impl Enzyme {
    /// Create an enzyme from its cleavage rule
    pub fn new(name: &str, rule: &str) -> Result<Self> {
        let parsed = parse_rule(rule)?;

        let mut enzyme = Self {
            name: name.to_string(),
            rule: rule.trim().to_string(),
            cleave_after: BTreeSet::new(),
            cleave_before: BTreeSet::new(),
            blocked_after: BTreeSet::new(),
            blocked_before: BTreeSet::new(),
        };

        for group in parsed.before {
            match group {
                ResidueGroup::Cleave(residues) => enzyme.cleave_after.extend(residues.chars()),
                ResidueGroup::Block(residues) => enzyme.blocked_before.extend(residues.chars()),
            }
        }
        for group in parsed.after {
            match group {
                ResidueGroup::Cleave(residues) => enzyme.cleave_before.extend(residues.chars()),
                ResidueGroup::Block(residues) => enzyme.blocked_after.extend(residues.chars()),
            }
        }

        Ok(enzyme)
    }

    /// Trypsin: after K or R, not before P
    pub fn trypsin() -> Self {
        Self {
            name: "Trypsin".to_string(),
            rule: TRYPSIN_RULE.to_string(),
            cleave_after: BTreeSet::from(['K', 'R']),
            cleave_before: BTreeSet::new(),
            blocked_after: BTreeSet::from(['P']),
            blocked_before: BTreeSet::new(),
        }
    }

    /// Enzyme name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cleavage rule
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Whether the bond between `before` and `after` is cleaved
    pub fn is_cleavage_site(&self, before: u8, after: u8) -> bool {
        let before = before.to_ascii_uppercase() as char;
        let after = after.to_ascii_uppercase() as char;

        (self.cleave_after.contains(&before) && !self.blocked_after.contains(&after))
            || (self.cleave_before.contains(&after) && !self.blocked_before.contains(&before))
    }
}

impl TryFrom<EnzymeDefinition> for Enzyme {
    type Error = Error;

    fn try_from(definition: EnzymeDefinition) -> Result<Self> {
        Enzyme::new(&definition.name, &definition.rule)
    }
}

impl From<Enzyme> for EnzymeDefinition {
    fn from(enzyme: Enzyme) -> Self {
        EnzymeDefinition {
            name: enzyme.name,
            rule: enzyme.rule,
        }
    }
}

/// How proteins were digested in the search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cleavage {
    /// Specific enzymatic cleavage
    #[default]
    Enzyme,
    /// Any bond
    Unspecific,
    /// No digestion
    WholeProtein,
}

/// Digestion settings of the search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestionParameters {
    /// Cleavage mode
    #[serde(default)]
    pub cleavage: Cleavage,
    /// Enzymes used when cleavage is enzymatic
    #[serde(default = "default_enzymes")]
    pub enzymes: Vec<Enzyme>,
    /// Minimal peptide length
    #[serde(default = "default_min_peptide_length")]
    pub min_peptide_length: usize,
    /// Maximal peptide length
    #[serde(default = "default_max_peptide_length")]
    pub max_peptide_length: usize,
}

fn default_enzymes() -> Vec<Enzyme> {
    vec![Enzyme::trypsin()]
}

fn default_min_peptide_length() -> usize {
    DEFAULT_MIN_PEPTIDE_LENGTH
}

fn default_max_peptide_length() -> usize {
    DEFAULT_MAX_PEPTIDE_LENGTH
}

impl DigestionParameters {
    /// Enzymatic digestion with the given enzymes
    pub fn enzymatic(enzymes: Vec<Enzyme>) -> Self {
        Self {
            cleavage: Cleavage::Enzyme,
            enzymes,
            min_peptide_length: DEFAULT_MIN_PEPTIDE_LENGTH,
            max_peptide_length: DEFAULT_MAX_PEPTIDE_LENGTH,
        }
    }

    /// Unspecific digestion
    pub fn unspecific() -> Self {
        Self {
            cleavage: Cleavage::Unspecific,
            enzymes: Vec::new(),
            min_peptide_length: DEFAULT_MIN_PEPTIDE_LENGTH,
            max_peptide_length: DEFAULT_MAX_PEPTIDE_LENGTH,
        }
    }

    /// Set the peptide length bounds
    pub fn with_peptide_lengths(mut self, min: usize, max: usize) -> Self {
        self.min_peptide_length = min;
        self.max_peptide_length = max;
        self
    }

    /// Whether an enzyme rule applies
    pub fn uses_enzyme(&self) -> bool {
        self.cleavage == Cleavage::Enzyme && !self.enzymes.is_empty()
    }

    /// Whether any enzyme cleaves the bond between `before` and `after`
    pub fn is_cleavage_site(&self, before: u8, after: u8) -> bool {
        self.enzymes
            .iter()
            .any(|enzyme| enzyme.is_cleavage_site(before, after))
    }
}

impl Default for DigestionParameters {
    fn default() -> Self {
        Self::enzymatic(default_enzymes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trypsin_sites() {
        let trypsin = Enzyme::trypsin();

        assert!(trypsin.is_cleavage_site(b'K', b'A'));
        assert!(trypsin.is_cleavage_site(b'R', b'G'));
        assert!(!trypsin.is_cleavage_site(b'K', b'P'));
        assert!(!trypsin.is_cleavage_site(b'A', b'K'));
    }

    #[test]
    fn test_parsed_trypsin_matches_builtin() {
        let parsed = Enzyme::new("Trypsin", TRYPSIN_RULE).unwrap();
        assert_eq!(parsed, Enzyme::trypsin());
    }

    #[test]
    fn test_cleave_before() {
        let asp_n = Enzyme::new("Asp-N", "|[D]").unwrap();

        assert!(asp_n.is_cleavage_site(b'A', b'D'));
        assert!(!asp_n.is_cleavage_site(b'D', b'A'));
    }

    #[test]
    fn test_blocked_before() {
        let enzyme = Enzyme::new("Test", "{P}|[D]").unwrap();

        assert!(enzyme.is_cleavage_site(b'A', b'D'));
        assert!(!enzyme.is_cleavage_site(b'P', b'D'));
    }

    #[test]
    fn test_digestion_from_json() {
        let parameters: DigestionParameters = serde_json::from_str(
            r#"{"enzymes": [{"name": "Lys-C", "rule": "[K]|{P}"}], "max_peptide_length": 25}"#,
        )
        .unwrap();

        assert!(parameters.uses_enzyme());
        assert_eq!(parameters.enzymes[0].name(), "Lys-C");
        assert_eq!(parameters.min_peptide_length, DEFAULT_MIN_PEPTIDE_LENGTH);
        assert_eq!(parameters.max_peptide_length, 25);
        assert!(parameters.is_cleavage_site(b'K', b'A'));
        assert!(!parameters.is_cleavage_site(b'R', b'A'));
    }

    #[test]
    fn test_invalid_rule_from_json() {
        let result: std::result::Result<DigestionParameters, _> =
            serde_json::from_str(r#"{"enzymes": [{"name": "Bad", "rule": "KR"}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unspecific() {
        let parameters = DigestionParameters::unspecific();
        assert!(!parameters.uses_enzyme());
    }
}
