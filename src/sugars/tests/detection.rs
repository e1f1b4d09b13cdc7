//! Detection tests on specific molecules: which rings and chains count as
//! sugar candidates under which settings.

use super::parse;
use crate::sugars::{
    SugarKind, SugarRemovalSettings, circular_sugar_candidates, circular_sugar_count,
    has_circular_sugars, has_linear_sugars, is_qualified_for_glycosidic_bond_exemption,
    linear_sugar_candidates, linear_sugar_count,
};

#[test]
fn glucopyranose_ring_is_detected() {
    let molecule = parse("OC1OC(CO)C(O)C(O)C1O");
    let settings = SugarRemovalSettings::default();
    assert!(has_circular_sugars(&molecule, &settings));
    assert_eq!(circular_sugar_count(&molecule, &settings), 1);
    let candidates = circular_sugar_candidates(&molecule, &settings);
    assert_eq!(candidates[0].kind, SugarKind::Circular);
    // the candidate is the ring itself, not its exocyclic oxygens
    assert_eq!(candidates[0].atoms.len(), 6);
}

#[test]
fn plain_carbocycles_and_aromatics_are_no_sugars() {
    let settings = SugarRemovalSettings::default();
    assert!(!has_circular_sugars(&parse("C1CCCCC1"), &settings));
    assert!(!has_circular_sugars(&parse("c1ccccc1O"), &settings));
    assert!(!has_linear_sugars(&parse("c1ccccc1O"), &settings));
}

#[test]
fn undecorated_oxane_needs_the_exocyclic_oxygen_check_disabled() {
    let molecule = parse("C1CCOCC1");
    let settings = SugarRemovalSettings::default();
    // no exocyclic oxygen at all, ratio 0 < 0.5
    assert!(!has_circular_sugars(&molecule, &settings));
    let relaxed = settings.with_exocyclic_oxygens_required(false);
    assert_eq!(circular_sugar_count(&molecule, &relaxed), 1);
}

#[test]
fn glycosidic_bond_requirement_and_its_exemption() {
    let settings = SugarRemovalSettings::default().with_glycosidic_bond_required(true);
    // a methyl glycoside has a real O-glycosidic bond
    assert!(has_circular_sugars(
        &parse("COC1OC(CO)C(O)C(O)C1O"),
        &settings
    ));
    // a C-C linked pseudo-glycoside has none and the heptyl chain is big
    // enough to survive, so there is no exemption either
    let c_glycoside = parse("CCCCCCCC1OC(O)C(O)C(O)C1O");
    assert!(!has_circular_sugars(&c_glycoside, &settings));
    assert!(has_circular_sugars(
        &c_glycoside,
        &SugarRemovalSettings::default()
    ));
    // a molecule that is nothing but one sugar ring is exempt
    let bare_ring = parse("OC1OC(O)C(O)C(O)C1O");
    assert!(has_circular_sugars(&bare_ring, &settings));
    assert!(is_qualified_for_glycosidic_bond_exemption(
        &bare_ring, &settings
    ));
    assert!(!is_qualified_for_glycosidic_bond_exemption(
        &parse("COC1OC(CO)C(O)C(O)C1O"),
        &settings
    ));
}

#[test]
fn keto_groups_are_only_tolerated_on_request() {
    // a furanose-like ring with one ring carbon oxidised to a ketone
    let molecule = parse("OCC1OC(O)C(O)C1=O");
    let settings = SugarRemovalSettings::default();
    assert!(!has_circular_sugars(&molecule, &settings));
    let tolerant = settings.with_keto_groups_allowed(true);
    assert_eq!(circular_sugar_count(&molecule, &tolerant), 1);
}

#[test]
fn spiro_rings_are_excluded_by_default() {
    // a furanose sharing one atom with a cyclohexane
    let molecule = parse("OC1OC(O)C(O)C12CCCCC2");
    let settings = SugarRemovalSettings::default();
    assert!(!has_circular_sugars(&molecule, &settings));
    let spiro = settings.with_spiro_rings_as_circular_sugars(true);
    let candidates = circular_sugar_candidates(&molecule, &spiro);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].spiro_atoms.len(), 1);
}

#[test]
fn open_chain_glucose_is_a_linear_sugar() {
    let molecule = parse("OCC(O)C(O)C(O)C(O)C=O");
    let settings = SugarRemovalSettings::default();
    assert!(has_linear_sugars(&molecule, &settings));
    let candidates = linear_sugar_candidates(&molecule, &settings);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].kind, SugarKind::Linear);
    // the whole molecule is the moiety, hydroxy groups included
    assert_eq!(candidates[0].atoms.len(), molecule.atom_count());
}

#[test]
fn polyol_patterns_do_not_reach_into_carbocycles() {
    // inositol: six ring carbons, six hydroxy groups, but no ring oxygen
    let molecule = parse("OC1C(O)C(O)C(O)C(O)C1O");
    let settings = SugarRemovalSettings::default();
    assert!(!has_circular_sugars(&molecule, &settings));
    assert!(!has_linear_sugars(&molecule, &settings));
}

#[test]
fn ester_linked_chains_are_separate_candidates() {
    // two C4 units joined through an ester bond
    let molecule = parse("OCC(O)C(O)COC(=O)C(O)C(O)CO");
    let settings = SugarRemovalSettings::default();
    assert_eq!(linear_sugar_count(&molecule, &settings), 2);
}

#[test]
fn sugar_acids_need_their_setting() {
    // 3,5-dihydroxyhexanoic acid
    let molecule = parse("CC(CC(CC(=O)O)O)O");
    let settings = SugarRemovalSettings::default();
    assert!(!has_linear_sugars(&molecule, &settings));
    let acidic = settings.with_linear_acidic_sugars(true);
    let candidates = linear_sugar_candidates(&molecule, &acidic);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].kind, SugarKind::LinearAcidic);
}

#[test]
fn linear_sugar_size_limits_are_inclusive() {
    let molecule = parse("OCC(O)C(O)C(O)C(O)C=O");
    let settings = SugarRemovalSettings::default();
    // six carbons fit the default 4..=7 window
    assert_eq!(linear_sugar_count(&molecule, &settings), 1);
    let narrow = settings
        .with_linear_sugar_candidate_max_size(5)
        .unwrap();
    assert_eq!(linear_sugar_count(&molecule, &narrow), 0);
    let exact = settings
        .with_linear_sugar_candidate_min_size(6)
        .unwrap()
        .with_linear_sugar_candidate_max_size(6)
        .unwrap();
    assert_eq!(linear_sugar_count(&molecule, &exact), 1);
}

#[test]
fn circular_candidate_atoms_are_blocked_for_linear_detection() {
    // open-chain tetritol attached to a pyranose through an ether oxygen;
    // the ring must not leak into the linear candidate
    let molecule = parse("OCC(O)C(O)COC1OC(O)C(O)C(O)C1O");
    let settings = SugarRemovalSettings::default();
    assert_eq!(circular_sugar_count(&molecule, &settings), 1);
    let linear = linear_sugar_candidates(&molecule, &settings);
    assert_eq!(linear.len(), 1);
    let ring_atoms = &circular_sugar_candidates(&molecule, &settings)[0].atoms;
    assert!(linear[0].atoms.is_disjoint(ring_atoms));
}
