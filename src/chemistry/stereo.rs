//! Handle stereo descriptors.
//!
//! Stereo information is stored per molecule as a list of descriptors whose
//! carriers are atom indices. A descriptor is dropped as soon as one of its
//! carriers disappears from the molecule; when a bond-splitting step
//! duplicates a connecting atom, the descriptor can be retargeted to the
//! duplicate instead so the configuration survives the cut.

use serde::{Deserialize, Serialize};

/// One of the four positions around a tetrahedral stereocentre.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum StereoRef {
    /// A neighbouring atom, by index.
    Atom(usize),
    /// The implicit hydrogen of the focus atom.
    ImplicitHydrogen,
}

impl StereoRef {
    /// The referenced atom index, if this is an explicit neighbour.
    pub const fn atom(self) -> Option<usize> {
        match self {
            Self::Atom(index) => Some(index),
            Self::ImplicitHydrogen => None,
        }
    }
}

/// The winding of the remaining three neighbours when looking at the focus
/// from the first neighbour.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Winding {
    /// `@` in SMILES
    CounterClockwise,
    /// `@@` in SMILES
    Clockwise,
}

/// A tetrahedral stereocentre.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct TetrahedralStereo {
    /// The central atom.
    pub focus: usize,
    /// The four neighbour positions in the order they were defined.
    pub neighbors: [StereoRef; 4],
    /// The winding of neighbours 2..4 seen from neighbour 1.
    pub winding: Winding,
}

impl TetrahedralStereo {
    /// Whether the given atom is the focus or one of the carriers.
    pub fn contains(&self, atom: usize) -> bool {
        self.focus == atom || self.neighbors.iter().any(|n| n.atom() == Some(atom))
    }

    /// Replace one carrier atom by another, e.g. after duplicating a
    /// connecting oxygen during a bond split.
    pub fn replace_carrier(&mut self, old: usize, new: usize) {
        for neighbor in &mut self.neighbors {
            if neighbor.atom() == Some(old) {
                *neighbor = StereoRef::Atom(new);
            }
        }
    }

    /// Remap all indices through `mapping` (old index to new index). Returns
    /// `None` if the focus or any carrier was removed.
    pub fn remap(&self, mapping: &[Option<usize>]) -> Option<Self> {
        let focus = mapping.get(self.focus).copied().flatten()?;
        let mut neighbors = self.neighbors;
        for neighbor in &mut neighbors {
            if let StereoRef::Atom(index) = *neighbor {
                *neighbor = StereoRef::Atom(mapping.get(index).copied().flatten()?);
            }
        }
        Some(Self {
            focus,
            neighbors,
            winding: self.winding,
        })
    }
}

/// The relative arrangement of the two reference substituents of a double
/// bond.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum BondArrangement {
    /// Both reference substituents on the same side (cis)
    Together,
    /// The reference substituents on opposite sides (trans)
    Opposite,
}

/// A cis/trans configured double bond.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct DoubleBondStereo {
    /// First atom of the double bond.
    pub begin: usize,
    /// Second atom of the double bond.
    pub end: usize,
    /// The reference substituent on `begin`.
    pub begin_reference: usize,
    /// The reference substituent on `end`.
    pub end_reference: usize,
    /// How the two references are arranged.
    pub arrangement: BondArrangement,
}

impl DoubleBondStereo {
    /// Whether the given atom takes part in this descriptor.
    pub const fn contains(&self, atom: usize) -> bool {
        self.begin == atom
            || self.end == atom
            || self.begin_reference == atom
            || self.end_reference == atom
    }

    /// Whether both atoms of the configured double bond itself are involved.
    pub const fn is_on_bond(&self, a: usize, b: usize) -> bool {
        (self.begin == a && self.end == b) || (self.begin == b && self.end == a)
    }

    /// Remap all indices through `mapping` (old index to new index). Returns
    /// `None` if any involved atom was removed.
    pub fn remap(&self, mapping: &[Option<usize>]) -> Option<Self> {
        Some(Self {
            begin: mapping.get(self.begin).copied().flatten()?,
            end: mapping.get(self.end).copied().flatten()?,
            begin_reference: mapping.get(self.begin_reference).copied().flatten()?,
            end_reference: mapping.get(self.end_reference).copied().flatten()?,
            arrangement: self.arrangement,
        })
    }
}
