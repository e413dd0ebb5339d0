//! Units for normalized abundances

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Base unit of a normalized abundance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardUnit {
    /// Amount of substance
    Mol,
    /// Share of the total, times 100
    Percentage,
    /// Share of the total, times 10^6
    Ppm,
}

/// SI prefix applied to mol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetricsPrefix {
    /// No prefix
    #[default]
    None,
    /// 10^-3
    Milli,
    /// 10^-6
    Micro,
    /// 10^-9
    Nano,
    /// 10^-12
    Pico,
    /// 10^-15
    Femto,
    /// 10^-18
    Atto,
}

impl MetricsPrefix {
    /// Power of ten of the prefix
    pub fn exponent(self) -> i32 {
        match self {
            MetricsPrefix::None => 0,
            MetricsPrefix::Milli => -3,
            MetricsPrefix::Micro => -6,
            MetricsPrefix::Nano => -9,
            MetricsPrefix::Pico => -12,
            MetricsPrefix::Femto => -15,
            MetricsPrefix::Atto => -18,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            MetricsPrefix::None => "",
            MetricsPrefix::Milli => "m",
            MetricsPrefix::Micro => "µ",
            MetricsPrefix::Nano => "n",
            MetricsPrefix::Pico => "p",
            MetricsPrefix::Femto => "f",
            MetricsPrefix::Atto => "a",
        }
    }
}

/// Unit of a normalized abundance, e.g. fmol or ppm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Unit {
    standard: StandardUnit,
    prefix: MetricsPrefix,
}

impl Unit {
    /// Percentage
    pub const PERCENTAGE: Unit = Unit {
        standard: StandardUnit::Percentage,
        prefix: MetricsPrefix::None,
    };

    /// Parts per million
    pub const PPM: Unit = Unit {
        standard: StandardUnit::Ppm,
        prefix: MetricsPrefix::None,
    };

    /// Femtomol, the default abundance unit
    pub const FMOL: Unit = Unit {
        standard: StandardUnit::Mol,
        prefix: MetricsPrefix::Femto,
    };

    /// Create a unit. Only mol takes a prefix.
    pub fn new(standard: StandardUnit, prefix: MetricsPrefix) -> Result<Self> {
        if standard != StandardUnit::Mol && prefix != MetricsPrefix::None {
            return Err(Error::UnsupportedUnit(format!(
                "{}{}",
                prefix.symbol(),
                Unit::new_unchecked(standard)
            )));
        }
        Ok(Self { standard, prefix })
    }

    fn new_unchecked(standard: StandardUnit) -> Self {
        Self {
            standard,
            prefix: MetricsPrefix::None,
        }
    }

    /// Base unit
    pub fn standard(&self) -> StandardUnit {
        self.standard
    }

    /// SI prefix
    pub fn prefix(&self) -> MetricsPrefix {
        self.prefix
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::FMOL
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.standard {
            StandardUnit::Mol => write!(f, "{}mol", self.prefix.symbol()),
            StandardUnit::Percentage => write!(f, "%"),
            StandardUnit::Ppm => write!(f, "ppm"),
        }
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        let lowercase = name.to_ascii_lowercase();
        match lowercase.as_str() {
            "%" | "percent" | "percentage" => return Ok(Unit::PERCENTAGE),
            "ppm" => return Ok(Unit::PPM),
            _ => {}
        }

        let prefix = match lowercase.strip_suffix("mol") {
            Some("") => MetricsPrefix::None,
            Some("m") => MetricsPrefix::Milli,
            Some("µ") | Some("u") => MetricsPrefix::Micro,
            Some("n") => MetricsPrefix::Nano,
            Some("p") => MetricsPrefix::Pico,
            Some("f") => MetricsPrefix::Femto,
            Some("a") => MetricsPrefix::Atto,
            _ => return Err(Error::UnsupportedUnit(name.to_string())),
        };
        Unit::new(StandardUnit::Mol, prefix)
    }
}

impl TryFrom<String> for Unit {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!("fmol".parse::<Unit>().unwrap(), Unit::FMOL);
        assert_eq!("%".parse::<Unit>().unwrap(), Unit::PERCENTAGE);
        assert_eq!("PPM".parse::<Unit>().unwrap(), Unit::PPM);

        let micro: Unit = "umol".parse().unwrap();
        assert_eq!(micro.prefix(), MetricsPrefix::Micro);
        assert_eq!(micro.to_string(), "µmol");
        assert_eq!(micro.prefix().exponent(), -6);

        let mol: Unit = "mol".parse().unwrap();
        assert_eq!(mol.prefix(), MetricsPrefix::None);
    }

    #[test]
    fn test_parse_mol_any_case() {
        assert_eq!("FMOL".parse::<Unit>().unwrap(), Unit::FMOL);
        assert_eq!("Fmol".parse::<Unit>().unwrap(), Unit::FMOL);
        assert_eq!(" PMol ".parse::<Unit>().unwrap().prefix(), MetricsPrefix::Pico);
        assert_eq!("µMOL".parse::<Unit>().unwrap().prefix(), MetricsPrefix::Micro);
        assert!(matches!("KMOL".parse::<Unit>(), Err(Error::UnsupportedUnit(_))));
    }

    #[test]
    fn test_unsupported_units() {
        assert!(matches!("gram".parse::<Unit>(), Err(Error::UnsupportedUnit(_))));
        assert!(matches!("kmol".parse::<Unit>(), Err(Error::UnsupportedUnit(_))));
        assert!(matches!(
            Unit::new(StandardUnit::Ppm, MetricsPrefix::Milli),
            Err(Error::UnsupportedUnit(_))
        ));
    }

    #[test]
    fn test_unit_serde() {
        let unit: Unit = serde_json::from_str("\"pmol\"").unwrap();
        assert_eq!(unit.prefix(), MetricsPrefix::Pico);
        assert_eq!(serde_json::to_string(&Unit::PPM).unwrap(), "\"ppm\"");
        assert!(serde_json::from_str::<Unit>("\"liter\"").is_err());
    }
}
