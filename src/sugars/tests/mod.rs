#![allow(clippy::missing_panics_doc)]
mod detection;
mod extraction;
mod removal;

use crate::chemistry::Molecule;
use crate::graph::are_isomorphic;

pub(crate) fn parse(smiles: &str) -> Molecule {
    smiles
        .parse()
        .unwrap_or_else(|error| panic!("invalid test SMILES {smiles}: {error}"))
}

/// Assert that the molecule has the same constitution as the expected SMILES,
/// implicit hydrogens included.
pub(crate) fn assert_structure(actual: &Molecule, expected: &str) {
    let expected_molecule = parse(expected);
    assert!(
        are_isomorphic(actual, &expected_molecule),
        "expected {expected}, got {}",
        actual.to_smiles()
    );
}
