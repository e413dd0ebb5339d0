//! Cleavage rule parser using nom
//!
//! Rule format:
//! ```text
//! [KR]|{P}      cleave after K or R, unless followed by P
//! |[D]          cleave before D
//! {P}[KR]|      groups on one side may come in any order
//! ```
//!
//! `[..]` lists residues that trigger a cleavage, `{..}` lists residues that
//! prevent it. The side of the `|` tells whether the residue sits before
//! (N-terminal of) or after (C-terminal of) the cleaved bond.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::{all_consuming, map},
    multi::many0,
    sequence::{delimited, separated_pair},
    IResult,
};

use crate::error::{Error, Result};

/// A bracketed residue group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidueGroup<'a> {
    /// Residues triggering a cleavage
    Cleave(&'a str),
    /// Residues preventing a cleavage
    Block(&'a str),
}

/// Residue groups on each side of the cleaved bond
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleavageRule<'a> {
    /// Groups on the N-terminal side
    pub before: Vec<ResidueGroup<'a>>,
    /// Groups on the C-terminal side
    pub after: Vec<ResidueGroup<'a>>,
}

fn residues(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_uppercase())(input)
}

fn group(input: &str) -> IResult<&str, ResidueGroup<'_>> {
    alt((
        map(delimited(char('['), residues, char(']')), ResidueGroup::Cleave),
        map(delimited(char('{'), residues, char('}')), ResidueGroup::Block),
    ))(input)
}

/// Parse a cleavage rule
pub fn parse_rule(input: &str) -> Result<CleavageRule<'_>> {
    let (_, (before, after)) =
        all_consuming(separated_pair(many0(group), char('|'), many0(group)))(input.trim())?;

    let cleaves = before
        .iter()
        .chain(after.iter())
        .any(|g| matches!(g, ResidueGroup::Cleave(_)));
    if !cleaves {
        return Err(Error::InvalidEnzymeRule(format!(
            "rule '{}' has no cleavage residues",
            input
        )));
    }

    Ok(CleavageRule { before, after })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trypsin() {
        let rule = parse_rule("[KR]|{P}").unwrap();

        assert_eq!(rule.before, vec![ResidueGroup::Cleave("KR")]);
        assert_eq!(rule.after, vec![ResidueGroup::Block("P")]);
    }

    #[test]
    fn test_parse_before_only() {
        let rule = parse_rule(" |[DE] ").unwrap();

        assert!(rule.before.is_empty());
        assert_eq!(rule.after, vec![ResidueGroup::Cleave("DE")]);
    }

    #[test]
    fn test_parse_mixed_side() {
        let rule = parse_rule("{P}[FYW]|").unwrap();

        assert_eq!(
            rule.before,
            vec![ResidueGroup::Block("P"), ResidueGroup::Cleave("FYW")]
        );
        assert!(rule.after.is_empty());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(parse_rule("[KR]"), Err(Error::InvalidEnzymeRule(_))));
        assert!(matches!(parse_rule("[kr]|"), Err(Error::InvalidEnzymeRule(_))));
        assert!(matches!(parse_rule("|{P}"), Err(Error::InvalidEnzymeRule(_))));
        assert!(matches!(parse_rule("[KR]|{P}x"), Err(Error::InvalidEnzymeRule(_))));
    }
}
