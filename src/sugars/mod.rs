//! Handle sugar moiety detection, removal, and extraction.
//!
//! Circular sugars are oxygen-containing rings of size 5 to 7 with enough
//! exocyclic oxygen decoration; linear sugars are open-chain polyols, aldoses,
//! ketoses, and (optionally) sugar acids matched against a fixed pattern
//! library. Removal discriminates terminal from non-terminal moieties and
//! iterates until nothing changes, because one sugar can shield another.
//! Extraction keeps the input untouched and returns the aglycone and the
//! sugar fragments as separate copies with correspondence maps.

mod circular;
mod extraction;
mod linear;
mod patterns;
mod removal;
mod settings;
#[cfg(test)]
mod tests;

pub use circular::*;
pub use extraction::*;
pub use linear::*;
pub use patterns::{
    CIRCULAR_SUGAR_TEMPLATE_SMILES, LINEAR_ACIDIC_SUGAR_SMILES, LINEAR_SUGAR_SMILES,
};
pub use removal::*;
pub use settings::*;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// What kind of sugar a candidate is.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum SugarKind {
    /// A ring-shaped carbohydrate (furanose, pyranose, heptose).
    Circular,
    /// An open-chain carbohydrate.
    Linear,
    /// An open-chain sugar acid, only detected when the respective setting is
    /// enabled.
    LinearAcidic,
}

/// A connected set of atoms flagged as a potential sugar moiety. Candidates
/// are created fresh by every detection call and store atom indices into the
/// molecule they were detected in; they become stale as soon as that molecule
/// is mutated.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SugarCandidate {
    /// The kind of sugar this candidate represents.
    pub kind: SugarKind,
    /// The atoms of the moiety.
    pub atoms: BTreeSet<usize>,
    /// Atoms that join this moiety to another ring as a spiro junction; they
    /// are preserved when the moiety is removed so the neighbouring ring
    /// stays intact.
    pub spiro_atoms: BTreeSet<usize>,
}

impl SugarCandidate {
    /// Whether this candidate is a ring-based sugar.
    pub const fn is_circular(&self) -> bool {
        matches!(self.kind, SugarKind::Circular)
    }

    /// The number of carbon atoms in this candidate.
    pub fn carbon_count(&self, molecule: &crate::chemistry::Molecule) -> usize {
        self.atoms
            .iter()
            .filter(|&&atom| molecule.atom(atom).is_carbon())
            .count()
    }
}
