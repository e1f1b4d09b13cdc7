//! Handle the detection and removal settings.

use serde::{Deserialize, Serialize};

use crate::errors::SugarRemovalError;

/// How to decide whether a structure that gets disconnected during sugar
/// removal is worth preserving or can be discarded along with the sugar.
/// This plays a major role in discriminating terminal from non-terminal
/// moieties.
#[derive(Copy, Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum PreservationMode {
    /// Preserve every disconnected structure, even single atoms.
    All,
    /// Judge structures by their heavy atom count (default threshold 5).
    #[default]
    HeavyAtomCount,
    /// Judge structures by their molecular weight (default threshold 60 Da,
    /// roughly five carbon atoms).
    MolecularWeight,
}

impl PreservationMode {
    /// The default threshold to preserve a structure (inclusive) for this
    /// mode.
    pub const fn default_threshold(self) -> usize {
        match self {
            Self::All => 0,
            Self::HeavyAtomCount => 5,
            Self::MolecularWeight => 60,
        }
    }
}

/// The immutable configuration of one detection, removal, or extraction call.
///
/// `SugarRemovalSettings::default()` gives the default settings of the
/// published algorithm version 1.2.0. Builders derive variations:
///
/// ```
/// use deglyco::prelude::*;
///
/// let settings = SugarRemovalSettings::default()
///     .with_glycosidic_bond_required(true)
///     .with_linear_sugar_candidate_min_size(3)
///     .unwrap();
/// assert!(settings.is_glycosidic_bond_required());
/// ```
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct SugarRemovalSettings {
    glycosidic_bond_required: bool,
    remove_only_terminal: bool,
    preservation_mode: PreservationMode,
    preservation_threshold: usize,
    exocyclic_oxygens_required: bool,
    exocyclic_oxygen_ratio_threshold: f64,
    linear_sugars_in_rings: bool,
    linear_sugar_min_size: usize,
    linear_sugar_max_size: usize,
    linear_acidic_sugars: bool,
    spiro_rings_as_circular_sugars: bool,
    keto_groups_allowed: bool,
}

impl Default for SugarRemovalSettings {
    fn default() -> Self {
        Self {
            glycosidic_bond_required: false,
            remove_only_terminal: true,
            preservation_mode: PreservationMode::HeavyAtomCount,
            preservation_threshold: PreservationMode::HeavyAtomCount.default_threshold(),
            exocyclic_oxygens_required: true,
            exocyclic_oxygen_ratio_threshold: 0.5,
            linear_sugars_in_rings: false,
            linear_sugar_min_size: 4,
            linear_sugar_max_size: 7,
            linear_acidic_sugars: false,
            spiro_rings_as_circular_sugars: false,
            keto_groups_allowed: false,
        }
    }
}

impl SugarRemovalSettings {
    /// Whether circular sugars are only detected when they connect to the
    /// rest of the molecule through an O-glycosidic bond.
    pub const fn is_glycosidic_bond_required(&self) -> bool {
        self.glycosidic_bond_required
    }

    /// Require (or stop requiring) an O-glycosidic bond for circular sugar
    /// detection. A molecule that consists of nothing but one sugar ring is
    /// exempt from the requirement.
    #[must_use]
    pub const fn with_glycosidic_bond_required(mut self, required: bool) -> Self {
        self.glycosidic_bond_required = required;
        self
    }

    /// Whether only terminal sugar moieties are removed.
    pub const fn removes_only_terminal_sugars(&self) -> bool {
        self.remove_only_terminal
    }

    /// Remove only terminal moieties (default) or every detected moiety.
    #[must_use]
    pub const fn with_remove_only_terminal_sugars(mut self, only_terminal: bool) -> Self {
        self.remove_only_terminal = only_terminal;
        self
    }

    /// The preservation mode.
    pub const fn preservation_mode(&self) -> PreservationMode {
        self.preservation_mode
    }

    /// Set the preservation mode. The threshold is reset to the default
    /// threshold of the chosen mode.
    #[must_use]
    pub const fn with_preservation_mode(mut self, mode: PreservationMode) -> Self {
        self.preservation_mode = mode;
        self.preservation_threshold = mode.default_threshold();
        self
    }

    /// The preservation threshold (inclusive): disconnected structures at or
    /// above it are preserved, smaller ones are discarded.
    pub const fn preservation_threshold(&self) -> usize {
        self.preservation_threshold
    }

    /// Set the preservation threshold. Ignored while the preservation mode is
    /// [`PreservationMode::All`].
    #[must_use]
    pub const fn with_preservation_threshold(mut self, threshold: usize) -> Self {
        self.preservation_threshold = threshold;
        self
    }

    /// Whether circular sugar candidates need enough single-bonded exocyclic
    /// oxygen atoms to qualify.
    pub const fn are_exocyclic_oxygens_required(&self) -> bool {
        self.exocyclic_oxygens_required
    }

    /// Require (or stop requiring) the exocyclic oxygen check for circular
    /// sugar detection.
    #[must_use]
    pub const fn with_exocyclic_oxygens_required(mut self, required: bool) -> Self {
        self.exocyclic_oxygens_required = required;
        self
    }

    /// The minimum ratio of exocyclic oxygen atoms to ring size, default 0.5
    /// (three oxygen atoms on a six-membered ring, for example).
    pub const fn exocyclic_oxygen_ratio_threshold(&self) -> f64 {
        self.exocyclic_oxygen_ratio_threshold
    }

    /// Set the exocyclic oxygen ratio threshold.
    ///
    /// # Errors
    /// If the value is not a finite number between 0 and 1.
    pub fn with_exocyclic_oxygen_ratio_threshold(
        mut self,
        threshold: f64,
    ) -> Result<Self, SugarRemovalError> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(SugarRemovalError::RatioThresholdOutOfRange { value: threshold });
        }
        self.exocyclic_oxygen_ratio_threshold = threshold;
        Ok(self)
    }

    /// Whether linear sugars are also searched within rings.
    pub const fn are_linear_sugars_in_rings_detected(&self) -> bool {
        self.linear_sugars_in_rings
    }

    /// Detect (or stop detecting) linear sugars that are part of rings, e.g.
    /// in macrocycles.
    #[must_use]
    pub const fn with_linear_sugars_in_rings(mut self, detect: bool) -> Self {
        self.linear_sugars_in_rings = detect;
        self
    }

    /// The minimum carbon count of a linear sugar candidate (inclusive).
    pub const fn linear_sugar_candidate_min_size(&self) -> usize {
        self.linear_sugar_min_size
    }

    /// Set the minimum carbon count of linear sugar candidates.
    ///
    /// # Errors
    /// If the size is zero.
    pub fn with_linear_sugar_candidate_min_size(
        mut self,
        size: usize,
    ) -> Result<Self, SugarRemovalError> {
        if size == 0 {
            return Err(SugarRemovalError::ZeroLinearSugarSize);
        }
        self.linear_sugar_min_size = size;
        Ok(self)
    }

    /// The maximum carbon count of a linear sugar candidate (inclusive).
    pub const fn linear_sugar_candidate_max_size(&self) -> usize {
        self.linear_sugar_max_size
    }

    /// Set the maximum carbon count of linear sugar candidates.
    ///
    /// # Errors
    /// If the size is zero.
    pub fn with_linear_sugar_candidate_max_size(
        mut self,
        size: usize,
    ) -> Result<Self, SugarRemovalError> {
        if size == 0 {
            return Err(SugarRemovalError::ZeroLinearSugarSize);
        }
        self.linear_sugar_max_size = size;
        Ok(self)
    }

    /// Whether the linear acidic sugar patterns take part in detection.
    pub const fn are_linear_acidic_sugars_detected(&self) -> bool {
        self.linear_acidic_sugars
    }

    /// Include (or exclude) the linear sugar acid patterns in detection.
    #[must_use]
    pub const fn with_linear_acidic_sugars(mut self, detect: bool) -> Self {
        self.linear_acidic_sugars = detect;
        self
    }

    /// Whether spiro rings qualify as circular sugar candidates.
    pub const fn are_spiro_rings_detected_as_circular_sugars(&self) -> bool {
        self.spiro_rings_as_circular_sugars
    }

    /// Include (or exclude) spiro rings in circular sugar detection. When a
    /// spiro sugar ring is removed, the atom connecting it to the neighbour
    /// ring is preserved.
    #[must_use]
    pub const fn with_spiro_rings_as_circular_sugars(mut self, detect: bool) -> Self {
        self.spiro_rings_as_circular_sugars = detect;
        self
    }

    /// Whether sugar-like rings with keto groups are detected as circular
    /// sugars.
    pub const fn are_keto_groups_allowed(&self) -> bool {
        self.keto_groups_allowed
    }

    /// Tolerate (or reject) exocyclic keto groups on circular sugar
    /// candidates. When enabled, double-bonded oxygen atoms also count
    /// towards the exocyclic oxygen ratio.
    #[must_use]
    pub const fn with_keto_groups_allowed(mut self, allowed: bool) -> Self {
        self.keto_groups_allowed = allowed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_algorithm_version_1_2_0() {
        let settings = SugarRemovalSettings::default();
        assert!(!settings.is_glycosidic_bond_required());
        assert!(settings.removes_only_terminal_sugars());
        assert_eq!(settings.preservation_mode(), PreservationMode::HeavyAtomCount);
        assert_eq!(settings.preservation_threshold(), 5);
        assert!(settings.are_exocyclic_oxygens_required());
        assert!((settings.exocyclic_oxygen_ratio_threshold() - 0.5).abs() < f64::EPSILON);
        assert!(!settings.are_linear_sugars_in_rings_detected());
        assert_eq!(settings.linear_sugar_candidate_min_size(), 4);
        assert_eq!(settings.linear_sugar_candidate_max_size(), 7);
        assert!(!settings.are_linear_acidic_sugars_detected());
        assert!(!settings.are_spiro_rings_detected_as_circular_sugars());
        assert!(!settings.are_keto_groups_allowed());
    }

    #[test]
    fn preservation_mode_resets_threshold() {
        let settings = SugarRemovalSettings::default()
            .with_preservation_threshold(11)
            .with_preservation_mode(PreservationMode::MolecularWeight);
        assert_eq!(settings.preservation_threshold(), 60);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(
            SugarRemovalSettings::default()
                .with_exocyclic_oxygen_ratio_threshold(1.5)
                .is_err()
        );
        assert!(
            SugarRemovalSettings::default()
                .with_exocyclic_oxygen_ratio_threshold(f64::NAN)
                .is_err()
        );
        assert!(
            SugarRemovalSettings::default()
                .with_linear_sugar_candidate_min_size(0)
                .is_err()
        );
    }
}
