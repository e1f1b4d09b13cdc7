//! Handle reading and writing SMILES strings.
//!
//! The parser covers the organic subset, bracket atoms with isotopes,
//! charges, and hydrogen counts, tetrahedral (`@`/`@@`) and cis/trans
//! (`/`/`\`) stereo descriptors, ring closures (including `%nn`), branches,
//! and disconnected structures. The writer produces a deterministic SMILES
//! form with Morgan-style canonical ranking; attachment-point pseudo-atoms
//! round-trip as `*`.

mod parser;
mod writer;

pub use parser::*;
pub use writer::*;

use thiserror::Error;

/// The ways a SMILES string can fail to parse.
#[derive(Clone, Debug, Error, Eq, Hash, PartialEq)]
pub enum SmilesError {
    /// A character that has no meaning at its position.
    #[error("unexpected character '{character}' at position {position}")]
    UnexpectedCharacter {
        /// The offending character.
        character: char,
        /// Byte position in the input.
        position: usize,
    },
    /// The input ended in the middle of a token.
    #[error("unexpected end of input")]
    UnexpectedEnd,
    /// An element symbol that is not known to this crate.
    #[error("unknown element '{symbol}' at position {position}")]
    UnknownElement {
        /// The symbol as written.
        symbol: String,
        /// Byte position in the input.
        position: usize,
    },
    /// A ring closure label that was opened but never closed.
    #[error("unmatched ring closure {label}")]
    UnmatchedRingClosure {
        /// The ring closure label.
        label: u16,
    },
    /// More `(` than `)` or the other way around.
    #[error("unbalanced branch parentheses")]
    UnbalancedBranches,
    /// A bond symbol with no atom to attach to.
    #[error("bond at position {position} has no preceding atom")]
    DanglingBond {
        /// Byte position in the input.
        position: usize,
    },
}
