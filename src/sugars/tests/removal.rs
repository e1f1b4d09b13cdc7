//! Removal tests on specific molecules, including the terminal-only rounds,
//! the preservation threshold cascade, and disconnected inputs.

use super::{assert_structure, parse};
use crate::chemistry::{Element, Molecule};
use crate::errors::SugarRemovalError;
use crate::sugars::{
    PreservationMode, SugarRemovalSettings, biggest_fragment, has_circular_sugars,
    remove_circular_and_linear_sugars, remove_circular_and_linear_sugars_and_return,
    remove_circular_sugars, remove_linear_sugars, sorted_fragments,
};

#[test]
fn glycosylated_dipeptide_loses_its_pyranose() {
    // CHEMBL56258
    let mut molecule = parse("CC(N)C(=O)NC(CCC(N)=O)C(=O)NOC1OC(O)C(O)C(O)C1O");
    let settings = SugarRemovalSettings::default();
    assert!(has_circular_sugars(&molecule, &settings));
    assert!(remove_circular_and_linear_sugars(&mut molecule, &settings).unwrap());
    assert_structure(&molecule, "O=C(N)CCC(NC(=O)C(N)C)C(=O)NO");
}

#[test]
fn a_molecule_that_is_all_sugar_ends_up_empty() {
    // CNP0171089, a glucuronic acid: the carboxy leftover is below the
    // preservation threshold and the ring itself is the only candidate
    let settings = SugarRemovalSettings::default();
    for settings in [
        settings,
        settings.with_glycosidic_bond_required(true),
    ] {
        let mut molecule = parse("O=C(O)C1OC(O)C(O)C(O)C1O");
        assert!(remove_circular_and_linear_sugars(&mut molecule, &settings).unwrap());
        assert!(molecule.is_empty(), "got {}", molecule.to_smiles());
    }
}

#[test]
fn preservation_threshold_gates_the_phosphate_cascade() {
    // CNP0125332, a furanose flanked by two phosphate groups
    let input = "O=P(O)(O)OCC1OC(OP(=O)(O)O)C(O)C1O";
    let settings = SugarRemovalSettings::default();

    // threshold 5: both phosphates are big enough to keep, so the ring is
    // not terminal and nothing happens
    let mut molecule = parse(input);
    assert!(!remove_circular_and_linear_sugars(&mut molecule, &settings).unwrap());
    assert_structure(&molecule, input);

    // threshold 6: one phosphate (5 heavy atoms) becomes discardable, the
    // ring turns terminal, and the removal cascades
    let mut molecule = parse(input);
    let raised = settings.with_preservation_threshold(6);
    assert!(remove_circular_and_linear_sugars(&mut molecule, &raised).unwrap());
    assert_structure(&molecule, "O=P(O)(O)OC");

    // threshold 7: nothing is worth keeping
    let mut molecule = parse(input);
    let high = settings.with_preservation_threshold(7);
    assert!(remove_circular_and_linear_sugars(&mut molecule, &high).unwrap());
    assert!(molecule.is_empty());

    // without the terminal-only restriction both phosphates survive as
    // disconnected fragments
    let mut molecule = parse(input);
    let all = settings.with_remove_only_terminal_sugars(false);
    assert!(remove_circular_and_linear_sugars(&mut molecule, &all).unwrap());
    assert_structure(&molecule, "O=P(O)(O)O.O=P(O)(O)OC");

    // a stricter exocyclic oxygen ratio disqualifies the ring (3 of 5)
    let mut molecule = parse(input);
    let strict = settings
        .with_exocyclic_oxygen_ratio_threshold(0.7)
        .unwrap();
    assert!(!remove_circular_and_linear_sugars(&mut molecule, &strict).unwrap());
    assert_structure(&molecule, input);
}

#[test]
fn non_terminal_rings_stay_unless_requested() {
    // a pyranose carrying a pentyl chain on both sides of the ring
    let input = "CCCCCC1OC(CCCCC)C(O)C(O)C1O";
    let settings = SugarRemovalSettings::default();
    let mut molecule = parse(input);
    assert!(!remove_circular_and_linear_sugars(&mut molecule, &settings).unwrap());
    assert_structure(&molecule, input);

    let all = settings.with_remove_only_terminal_sugars(false);
    let mut molecule = parse(input);
    assert!(remove_circular_and_linear_sugars(&mut molecule, &all).unwrap());
    assert_structure(&molecule, "CCCCC.CCCCC");
}

#[test]
fn removal_of_a_linear_sugar_can_expose_a_circular_one() {
    // heptyl - pyranose - O - tetritol: the ring shields the open chain on
    // one side and the heptyl chain on the other, so it only becomes
    // terminal once the tetritol is gone
    let input = "CCCCCCCC1OC(OCC(O)C(O)CO)C(O)C(O)C1O";
    let settings = SugarRemovalSettings::default();

    // circular removal alone finds the ring non-terminal
    let mut molecule = parse(input);
    assert!(!remove_circular_sugars(&mut molecule, &settings).unwrap());
    assert_structure(&molecule, input);

    // the combined loop removes the chain first and then the ring
    let mut molecule = parse(input);
    let removed = remove_circular_and_linear_sugars_and_return(&mut molecule, &settings).unwrap();
    assert_eq!(removed.len(), 2);
    assert_structure(&molecule, "CCCCCCC");
}

#[test]
fn open_chain_glucose_is_removed_entirely() {
    let mut molecule = parse("OCC(O)C(O)C(O)C(O)C=O");
    let settings = SugarRemovalSettings::default();
    assert!(remove_linear_sugars(&mut molecule, &settings).unwrap());
    assert!(molecule.is_empty());
}

#[test]
fn disconnected_structures_are_processed_independently() {
    // a bare sugar ring and an unrelated propane in one input
    let mut molecule = parse("OC1OC(O)C(O)C(O)C1O.CCC");
    let settings = SugarRemovalSettings::default();
    assert!(remove_circular_and_linear_sugars(&mut molecule, &settings).unwrap());
    assert_structure(&molecule, "CCC");
}

#[test]
fn removal_is_idempotent() {
    let settings = SugarRemovalSettings::default();
    for input in [
        "CC(N)C(=O)NC(CCC(N)=O)C(=O)NOC1OC(O)C(O)C(O)C1O",
        "CCCCCCCC1OC(OCC(O)C(O)CO)C(O)C(O)C1O",
        "O=P(O)(O)OCC1OC(OP(=O)(O)O)C(O)C1O",
    ] {
        let mut molecule = parse(input);
        remove_circular_and_linear_sugars(&mut molecule, &settings).unwrap();
        let after_first = molecule.clone();
        assert!(!remove_circular_and_linear_sugars(&mut molecule, &settings).unwrap());
        assert_eq!(molecule, after_first);
    }
}

#[test]
fn removing_all_sugars_never_removes_less_than_terminal_only() {
    let settings = SugarRemovalSettings::default();
    let all = settings.with_remove_only_terminal_sugars(false);
    for input in [
        "CCCCCC1OC(CCCCC)C(O)C(O)C1O",
        "O=P(O)(O)OCC1OC(OP(=O)(O)O)C(O)C1O",
        "CC(N)C(=O)NC(CCC(N)=O)C(=O)NOC1OC(O)C(O)C(O)C1O",
    ] {
        let mut terminal_only = parse(input);
        remove_circular_and_linear_sugars(&mut terminal_only, &settings).unwrap();
        let mut everything = parse(input);
        remove_circular_and_linear_sugars(&mut everything, &all).unwrap();
        assert!(everything.atom_count() <= terminal_only.atom_count());
    }
}

#[test]
fn spiro_junctions_are_spared() {
    let mut molecule = parse("OC1OC(O)C(O)C12CCCCC2");
    let settings =
        SugarRemovalSettings::default().with_spiro_rings_as_circular_sugars(true);
    assert!(remove_circular_sugars(&mut molecule, &settings).unwrap());
    assert_structure(&molecule, "C1CCCCC1");
}

#[test]
fn keto_tolerant_removal_clears_the_oxidised_ring() {
    let mut molecule = parse("OCC1OC(O)C(O)C1=O");
    let settings = SugarRemovalSettings::default().with_keto_groups_allowed(true);
    assert!(remove_circular_sugars(&mut molecule, &settings).unwrap());
    assert!(molecule.is_empty());
}

#[test]
fn preservation_mode_all_keeps_every_leftover() {
    // with ALL, even lone hydroxy oxygens survive the ring removal
    let mut molecule = parse("COC1OC(O)C(O)C(O)C1O");
    let settings =
        SugarRemovalSettings::default().with_preservation_mode(PreservationMode::All);
    // the ring is not terminal under ALL: its hydroxy groups would be
    // stranded, so nothing happens in terminal-only mode
    assert!(!remove_circular_and_linear_sugars(&mut molecule, &settings).unwrap());
    let all = settings.with_remove_only_terminal_sugars(false);
    assert!(remove_circular_and_linear_sugars(&mut molecule, &all).unwrap());
    // methanol plus four stranded hydroxy oxygens
    assert_structure(&molecule, "CO.O.O.O.O");
}

#[test]
fn unsupported_elements_surface_as_errors_and_leave_the_input_alone() {
    let input = "CCCCCC[Fe]C1OC(O)C(O)C(O)C1O";
    let mut molecule = parse(input);
    let settings = SugarRemovalSettings::default();
    assert_eq!(
        remove_circular_sugars(&mut molecule, &settings),
        Err(SugarRemovalError::UnsupportedElement {
            element: Element::Fe
        })
    );
    assert_structure(&molecule, input);
}

#[test]
fn returned_moieties_cover_the_removed_atoms() {
    let mut molecule = parse("CC(N)C(=O)NC(CCC(N)=O)C(=O)NOC1OC(O)C(O)C(O)C1O");
    let before = molecule.atom_count();
    let settings = SugarRemovalSettings::default();
    let removed =
        remove_circular_and_linear_sugars_and_return(&mut molecule, &settings).unwrap();
    assert_eq!(removed.len(), 1);
    // the moiety is the six ring atoms; the stranded hydroxy groups were
    // cleared, not returned
    assert_eq!(removed[0].structure.atom_count(), 6);
    assert!(molecule.atom_count() < before);
}

#[test]
fn fragment_selectors_order_by_size() {
    let molecule = parse("CCCCC.CC.CCC");
    let sorted = sorted_fragments(&molecule);
    let sizes: Vec<usize> = sorted.iter().map(Molecule::atom_count).collect();
    assert_eq!(sizes, vec![5, 3, 2]);
    assert_structure(&biggest_fragment(&molecule), "CCCCC");
}
