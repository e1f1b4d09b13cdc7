//! Handle the error types of this crate.

use thiserror::Error;

use crate::chemistry::Element;

/// The failures sugar detection, removal, and extraction can run into.
///
/// A molecule without detectable sugars is not an error; the corresponding
/// operations report that as `false` or an empty list.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SugarRemovalError {
    /// An atom could not be re-saturated after a removal step because its
    /// element has no valence model.
    #[error("element {element} is not supported by the valence model")]
    UnsupportedElement {
        /// The offending element.
        element: Element,
    },
    /// The exocyclic oxygen ratio threshold must be a finite number between
    /// 0 and 1.
    #[error("exocyclic oxygen ratio threshold {value} is not within [0, 1]")]
    RatioThresholdOutOfRange {
        /// The rejected value.
        value: f64,
    },
    /// Linear sugar candidate sizes are counted in carbon atoms and must be
    /// at least 1.
    #[error("a linear sugar candidate size of zero carbon atoms is not allowed")]
    ZeroLinearSugarSize,
}
