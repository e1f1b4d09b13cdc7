#![doc = include_str!("../README.md")]

/// Contains the molecular graph model: elements, atoms, bonds, stereo
/// descriptors, and the [`Molecule`](chemistry::Molecule) arena they live in.
pub mod chemistry;
/// Contains the error types of this crate.
pub mod errors;
/// Contains ring perception, connectivity helpers, and substructure matching.
pub mod graph;
/// Contains the SMILES parser and writer.
pub mod smiles;
/// Contains sugar moiety detection, removal, and extraction.
pub mod sugars;

/// A subset of the types and functions that are envisioned to be used the
/// most, importing this is a good starting point for working with the crate.
pub mod prelude {
    pub use crate::chemistry::{Atom, Bond, BondOrder, Element, Molecule};
    pub use crate::errors::SugarRemovalError;
    pub use crate::smiles::SmilesError;
    pub use crate::sugars::{
        Extraction, ExtractionOptions, PreservationMode, RemovedSugar, SugarCandidate, SugarKind,
        SugarRemovalSettings, circular_sugar_candidates, extract_aglycone_and_sugars,
        has_circular_or_linear_sugars, has_circular_sugars, has_linear_sugars,
        linear_sugar_candidates, remove_circular_and_linear_sugars, remove_circular_sugars,
        remove_linear_sugars,
    };
}
