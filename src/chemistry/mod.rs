//! Handle the molecular graph model.
//!
//! Atoms and bonds live in flat arrays owned by a [`Molecule`]; everything
//! that refers to them (rings, sugar candidates, stereo descriptors,
//! correspondence maps) stores plain indices into those arrays. Copies are
//! therefore cheap and index-to-index maps are all that is needed to relate
//! a copy back to its original.

mod atom;
mod bond;
mod element;
mod molecule;
mod stereo;

pub use atom::*;
pub use bond::*;
pub use element::*;
pub use molecule::*;
pub(crate) use molecule::effective_valences;
pub use stereo::*;
