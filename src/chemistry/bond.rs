//! Handle bonds.

use serde::{Deserialize, Serialize};

/// The order of a bond.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum BondOrder {
    /// A single bond
    Single,
    /// A double bond
    Double,
    /// A triple bond
    Triple,
    /// A delocalised aromatic bond
    Aromatic,
}

impl BondOrder {
    /// The number of valences one end of a bond of this order occupies.
    /// Aromatic bonds count as one sigma bond; the pi system is accounted for
    /// separately during saturation.
    pub const fn numeric(self) -> u8 {
        match self {
            Self::Single | Self::Aromatic => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }
}

/// A bond between two atoms, stored as indices into the owning molecule.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Bond {
    /// Index of the first atom.
    pub begin: usize,
    /// Index of the second atom.
    pub end: usize,
    /// The bond order.
    pub order: BondOrder,
    /// Whether this bond is part of an aromatic system.
    pub aromatic: bool,
}

impl Bond {
    /// Create a non-aromatic bond.
    pub const fn new(begin: usize, end: usize, order: BondOrder) -> Self {
        Self {
            begin,
            end,
            order,
            aromatic: false,
        }
    }

    /// The atom on the other end of this bond.
    ///
    /// # Panics
    /// If the given atom is not part of this bond.
    pub fn other(&self, atom: usize) -> usize {
        if atom == self.begin {
            self.end
        } else {
            assert_eq!(atom, self.end, "atom is not part of this bond");
            self.begin
        }
    }

    /// Whether this bond connects the two given atoms (in either direction).
    pub const fn connects(&self, a: usize, b: usize) -> bool {
        (self.begin == a && self.end == b) || (self.begin == b && self.end == a)
    }
}
