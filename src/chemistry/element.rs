//! Handle chemical elements.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// The chemical elements this crate can represent.
///
/// The list covers the SMILES organic subset, the heteroatoms commonly found
/// in glycosylated natural products, and a few elements without a valence
/// model (those are parsed and carried along but cannot be re-saturated, see
/// [`Element::default_valences`]). [`Element::R`] is the attachment-point
/// pseudo-element used to mark where a bond was cut.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Element {
    /// Hydrogen
    H,
    /// Boron
    B,
    /// Carbon
    C,
    /// Nitrogen
    N,
    /// Oxygen
    O,
    /// Fluorine
    F,
    /// Sodium
    Na,
    /// Silicon
    Si,
    /// Phosphorus
    P,
    /// Sulfur
    S,
    /// Chlorine
    Cl,
    /// Potassium
    K,
    /// Iron
    Fe,
    /// Arsenic
    As,
    /// Selenium
    Se,
    /// Bromine
    Br,
    /// Iodine
    I,
    /// Attachment point pseudo-element, written as `*` in SMILES
    R,
}

impl Element {
    /// The element symbol as written in SMILES.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::H => "H",
            Self::B => "B",
            Self::C => "C",
            Self::N => "N",
            Self::O => "O",
            Self::F => "F",
            Self::Na => "Na",
            Self::Si => "Si",
            Self::P => "P",
            Self::S => "S",
            Self::Cl => "Cl",
            Self::K => "K",
            Self::Fe => "Fe",
            Self::As => "As",
            Self::Se => "Se",
            Self::Br => "Br",
            Self::I => "I",
            Self::R => "*",
        }
    }

    /// Look an element up by its symbol (case sensitive, `*` gives [`Self::R`]).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "H" => Self::H,
            "B" => Self::B,
            "C" => Self::C,
            "N" => Self::N,
            "O" => Self::O,
            "F" => Self::F,
            "Na" => Self::Na,
            "Si" => Self::Si,
            "P" => Self::P,
            "S" => Self::S,
            "Cl" => Self::Cl,
            "K" => Self::K,
            "Fe" => Self::Fe,
            "As" => Self::As,
            "Se" => Self::Se,
            "Br" => Self::Br,
            "I" => Self::I,
            "*" | "R" => Self::R,
            _ => return None,
        })
    }

    /// The atomic number, 0 for the attachment-point pseudo-element.
    pub const fn atomic_number(self) -> u8 {
        match self {
            Self::R => 0,
            Self::H => 1,
            Self::B => 5,
            Self::C => 6,
            Self::N => 7,
            Self::O => 8,
            Self::F => 9,
            Self::Na => 11,
            Self::Si => 14,
            Self::P => 15,
            Self::S => 16,
            Self::Cl => 17,
            Self::K => 19,
            Self::Fe => 26,
            Self::As => 33,
            Self::Se => 34,
            Self::Br => 35,
            Self::I => 53,
        }
    }

    /// The standard atomic weight in Dalton, 0 for the pseudo-element.
    pub const fn atomic_weight(self) -> f64 {
        match self {
            Self::R => 0.0,
            Self::H => 1.008,
            Self::B => 10.81,
            Self::C => 12.011,
            Self::N => 14.007,
            Self::O => 15.999,
            Self::F => 18.998,
            Self::Na => 22.990,
            Self::Si => 28.085,
            Self::P => 30.974,
            Self::S => 32.06,
            Self::Cl => 35.45,
            Self::K => 39.098,
            Self::Fe => 55.845,
            Self::As => 74.922,
            Self::Se => 78.971,
            Self::Br => 79.904,
            Self::I => 126.904,
        }
    }

    /// The accepted valences of the neutral element, smallest first, or `None`
    /// for elements without a valence model. Open valences are filled up to
    /// the smallest entry that accommodates the existing bonds.
    pub const fn default_valences(self) -> Option<&'static [u8]> {
        Some(match self {
            Self::H | Self::F | Self::Cl | Self::Br | Self::I => &[1],
            Self::O | Self::Se => &[2],
            Self::B | Self::N => &[3],
            Self::C | Self::Si => &[4],
            Self::P => &[3, 5],
            Self::S => &[2, 4, 6],
            Self::R => &[0],
            Self::Na | Self::K | Self::Fe | Self::As => return None,
        })
    }

    /// Whether this element belongs to the SMILES organic subset and can be
    /// written without brackets.
    pub const fn is_organic_subset(self) -> bool {
        matches!(
            self,
            Self::B
                | Self::C
                | Self::N
                | Self::O
                | Self::F
                | Self::P
                | Self::S
                | Self::Cl
                | Self::Br
                | Self::I
        )
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
