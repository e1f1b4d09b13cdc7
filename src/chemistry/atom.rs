//! Handle atoms.

use serde::{Deserialize, Serialize};

use crate::chemistry::Element;

/// An atom in a molecular graph. Hydrogen atoms are normally carried
/// implicitly in [`Self::implicit_hydrogens`]; explicit hydrogens are ordinary
/// graph nodes.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Atom {
    /// The element of this atom.
    pub element: Element,
    /// The formal charge.
    pub formal_charge: i8,
    /// The number of implicit hydrogen atoms bound to this atom.
    pub implicit_hydrogens: u8,
    /// Whether this atom is part of an aromatic system.
    pub aromatic: bool,
    /// The isotope mass number, if one was specified.
    pub isotope: Option<u16>,
}

impl Atom {
    /// Create a neutral, non-aromatic atom of the given element with no
    /// implicit hydrogens.
    pub const fn new(element: Element) -> Self {
        Self {
            element,
            formal_charge: 0,
            implicit_hydrogens: 0,
            aromatic: false,
            isotope: None,
        }
    }

    /// Whether this atom counts as a heavy atom (anything but hydrogen and
    /// attachment-point pseudo-atoms).
    pub const fn is_heavy(&self) -> bool {
        !matches!(self.element, Element::H | Element::R)
    }

    /// Whether this is a carbon atom.
    pub const fn is_carbon(&self) -> bool {
        matches!(self.element, Element::C)
    }

    /// Whether this is an oxygen atom.
    pub const fn is_oxygen(&self) -> bool {
        matches!(self.element, Element::O)
    }

    /// Whether this is an attachment-point pseudo-atom.
    pub const fn is_pseudo(&self) -> bool {
        matches!(self.element, Element::R)
    }

    /// Whether this atom is a heteroatom, i.e. neither carbon, nor hydrogen,
    /// nor a pseudo-atom.
    pub const fn is_heteroatom(&self) -> bool {
        !matches!(self.element, Element::C | Element::H | Element::R)
    }
}
