//! Handle the sugar pattern library.
//!
//! The linear patterns are aldoses, ketoses, and sugar alcohols with three to
//! seven carbon atoms plus one deoxy sugar; the acidic list adds open-chain
//! sugar acids. The circular templates only describe the ring itself (one
//! oxygen atom, the rest carbon); the exocyclic decoration is judged
//! separately.

use std::sync::LazyLock;

use itertools::Itertools;

use crate::chemistry::Molecule;
use crate::graph::Pattern;
use crate::smiles::parse_smiles;

/// The linear sugar patterns searched during linear sugar detection.
pub const LINEAR_SUGAR_SMILES: [&str; 16] = [
    // aldoses
    "C(C(C(C(C(C(C=O)O)O)O)O)O)O", // aldoheptose
    "C(C(C(C(C(C=O)O)O)O)O)O",     // aldohexose
    "C(C(C(C(C=O)O)O)O)O",         // aldopentose
    "C(C(C(C=O)O)O)O",             // aldotetrose
    "C(C(C=O)O)O",                 // aldotriose
    // ketoses
    "C(C(C(C(C(C(CO)O)O)O)O)=O)O", // 2-ketoheptose
    "C(C(C(C(C(CO)O)O)O)=O)O",     // 2-ketohexose
    "C(C(C(C(CO)O)O)=O)O",         // 2-ketopentose
    "C(C(C(CO)O)=O)O",             // 2-ketotetrose
    "C(C(CO)=O)O",                 // 2-ketotriose
    // sugar alcohols
    "C(C(C(C(C(C(CO)O)O)O)O)O)O", // heptitol
    "C(C(C(C(C(CO)O)O)O)O)O",     // hexitol
    "C(C(C(C(CO)O)O)O)O",         // pentitol
    "C(C(C(CO)O)O)O",             // tetraitol
    "C(C(CO)O)O",                 // triol
    // deoxy sugars
    "C(C(C(C(CC=O)O)O)O)O", // 2-deoxyhexose
];

/// The linear sugar acid patterns, only searched when the respective setting
/// is enabled.
pub const LINEAR_ACIDIC_SUGAR_SMILES: [&str; 5] = [
    "C(C(CC(C(CO)O)O)O)(O)=O", // 3-deoxyhexonic acid
    "CC(CC(CC(=O)O)O)O",       // 3,5-dihydroxyhexanoic acid
    "O=C(O)CC(O)CC(=O)O",      // 3-hydroxypentanedioic acid
    "O=C(O)CCC(O)C(=O)O",      // 2-hydroxypentanedioic acid
    "C(C(C(CC(=O)O)O)O)O",     // 2-deoxypentonic acid
];

/// The ring templates circular sugar candidates are compared against.
pub const CIRCULAR_SUGAR_TEMPLATE_SMILES: [&str; 3] = [
    "C1CCOC1",   // tetrahydrofuran, matches all five-membered rings (furanoses)
    "C1CCOCC1",  // tetrahydropyran, matches all six-membered rings (pyranoses)
    "C1CCCOCC1", // oxepane, matches all seven-membered rings (heptoses)
];

fn compile(smiles: &[&str]) -> Vec<Pattern> {
    smiles
        .iter()
        .map(|code| Pattern::new(parse_smiles(code).expect("valid built-in sugar pattern")))
        // biggest patterns first so large sugars are not eaten up piecemeal
        .sorted_by_key(|pattern| std::cmp::Reverse(pattern.size()))
        .collect()
}

pub(crate) static LINEAR_SUGAR_PATTERNS: LazyLock<Vec<Pattern>> =
    LazyLock::new(|| compile(&LINEAR_SUGAR_SMILES));

pub(crate) static LINEAR_ACIDIC_SUGAR_PATTERNS: LazyLock<Vec<Pattern>> =
    LazyLock::new(|| compile(&LINEAR_ACIDIC_SUGAR_SMILES));

pub(crate) static CIRCULAR_SUGAR_TEMPLATES: LazyLock<Vec<Molecule>> = LazyLock::new(|| {
    CIRCULAR_SUGAR_TEMPLATE_SMILES
        .iter()
        .map(|code| parse_smiles(code).expect("valid built-in ring template"))
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_patterns_compile() {
        assert_eq!(LINEAR_SUGAR_PATTERNS.len(), 16);
        assert_eq!(LINEAR_ACIDIC_SUGAR_PATTERNS.len(), 5);
        assert_eq!(CIRCULAR_SUGAR_TEMPLATES.len(), 3);
    }

    #[test]
    fn patterns_are_sorted_biggest_first() {
        let sizes: Vec<usize> = LINEAR_SUGAR_PATTERNS.iter().map(Pattern::size).collect();
        assert!(sizes.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn glucose_chain_matches_the_aldohexose_pattern() {
        let glucose_open_chain = parse_smiles("OCC(O)C(O)C(O)C(O)C=O").unwrap();
        assert!(
            LINEAR_SUGAR_PATTERNS
                .iter()
                .any(|pattern| pattern.matches(&glucose_open_chain))
        );
    }
}
