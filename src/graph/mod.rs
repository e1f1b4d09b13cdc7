//! Handle graph algorithms on molecules: ring perception and substructure
//! matching.

mod matching;
mod rings;

pub use matching::*;
pub use rings::*;
