//! Extraction tests: aglycone/sugar separation, the C6 correction,
//! attachment markers, postprocessing splits, and group reporting.

use super::{assert_structure, parse};
use crate::sugars::{
    ExtractionOptions, SugarRemovalSettings, extract_aglycone_and_sugars,
};

#[test]
fn no_sugars_means_a_single_unchanged_fragment() {
    let molecule = parse("CCCCO");
    let settings = SugarRemovalSettings::default();
    let extraction =
        extract_aglycone_and_sugars(&molecule, &settings, &ExtractionOptions::default()).unwrap();
    assert_eq!(extraction.fragments().len(), 1);
    assert_structure(extraction.aglycone(), "CCCCO");
}

#[test]
fn hexyl_glucoside_separates_into_hexanol_and_glucose() {
    // the glycosidic oxygen stays with the aglycone and is duplicated onto
    // the sugar so both educts are complete
    let molecule = parse("CCCCCCOC1OC(CO)C(O)C(O)C1O");
    let settings = SugarRemovalSettings::default();
    let extraction =
        extract_aglycone_and_sugars(&molecule, &settings, &ExtractionOptions::default()).unwrap();
    assert_eq!(extraction.fragments().len(), 2);
    assert_structure(extraction.aglycone(), "OCCCCCC");
    assert_structure(&extraction.sugar_fragments()[0], "OCC1OC(O)C(O)C(O)C1O");
}

#[test]
fn stranded_c6_carbon_is_handed_back_to_its_sugar() {
    // the sugar connects through its exocyclic C6; the removal leaves that
    // carbon with the aglycone and the extraction has to fix it up
    let molecule = parse("CCCCCCOCC1OC(O)C(O)C(O)C1O");
    let settings = SugarRemovalSettings::default();
    let extraction =
        extract_aglycone_and_sugars(&molecule, &settings, &ExtractionOptions::default()).unwrap();
    assert_eq!(extraction.fragments().len(), 2);
    assert_structure(extraction.aglycone(), "OCCCCCC");
    assert_structure(&extraction.sugar_fragments()[0], "OCC1OC(O)C(O)C(O)C1O");
}

#[test]
fn attachment_markers_replace_the_implicit_hydrogens() {
    let molecule = parse("CCCCCCOC1OC(CO)C(O)C(O)C1O");
    let settings = SugarRemovalSettings::default();
    let options = ExtractionOptions {
        mark_attachment_points: true,
        ..ExtractionOptions::default()
    };
    let extraction = extract_aglycone_and_sugars(&molecule, &settings, &options).unwrap();
    assert_eq!(extraction.fragments().len(), 2);
    assert_structure(extraction.aglycone(), "*OCCCCCC");
    assert_structure(&extraction.sugar_fragments()[0], "*OC1OC(CO)C(O)C(O)C1O");
    for fragment in extraction.fragments() {
        assert_eq!(
            fragment.atoms().iter().filter(|atom| atom.is_pseudo()).count(),
            1
        );
    }
}

#[test]
fn connected_sugar_units_split_only_in_postprocessing() {
    // hexyl glycoside of a 1,2-linked diglucoside
    let molecule = parse("CCCCCCOC1OC(CO)C(O)C(O)C1OC2OC(CO)C(O)C(O)C2O");
    let settings = SugarRemovalSettings::default();
    let plain =
        extract_aglycone_and_sugars(&molecule, &settings, &ExtractionOptions::default()).unwrap();
    // without postprocessing both rings come out as one connected fragment
    assert_eq!(plain.fragments().len(), 2);
    assert_structure(plain.aglycone(), "OCCCCCC");

    let options = ExtractionOptions {
        postprocess_sugars: true,
        ..ExtractionOptions::default()
    };
    let split = extract_aglycone_and_sugars(&molecule, &settings, &options).unwrap();
    assert_eq!(split.fragments().len(), 3);
    assert_structure(split.aglycone(), "OCCCCCC");
    for fragment in split.sugar_fragments() {
        assert_structure(fragment, "OCC1OC(O)C(O)C(O)C1O");
    }
}

#[test]
fn an_all_sugar_molecule_leaves_an_empty_aglycone() {
    let molecule = parse("OC1OC(O)C(O)C(O)C1O");
    let settings = SugarRemovalSettings::default();
    let extraction =
        extract_aglycone_and_sugars(&molecule, &settings, &ExtractionOptions::default()).unwrap();
    assert!(extraction.aglycone().is_empty());
    assert_eq!(extraction.fragments().len(), 2);
    assert_structure(&extraction.sugar_fragments()[0], "OC1OC(O)C(O)C(O)C1O");
}

#[test]
fn group_indices_partition_the_input_atoms() {
    let molecule = parse("CCCCCCOC1OC(CO)C(O)C(O)C1O");
    let settings = SugarRemovalSettings::default();
    let extraction =
        extract_aglycone_and_sugars(&molecule, &settings, &ExtractionOptions::default()).unwrap();
    let groups = extraction.group_index_per_atom();
    // the hexyl chain belongs to the aglycone
    for atom in 0..6 {
        assert_eq!(groups[atom], Some(0));
    }
    // the duplicated glycosidic oxygen is reported with the sugar side
    assert_eq!(groups[6], Some(1));
    // every ring atom belongs to the sugar fragment
    for atom in 7..molecule.atom_count() {
        assert_eq!(groups[atom], Some(1));
    }
    let aglycone_atoms = extraction.atom_indices_of_group(0);
    assert!(aglycone_atoms.contains(&0));
    assert!(aglycone_atoms.contains(&6));
    assert!(!aglycone_atoms.contains(&7));
}

#[test]
fn stereo_descriptors_survive_the_extraction() {
    let molecule = parse("CCCCCCO[C@H]1OC(CO)[C@@H](O)[C@H](O)[C@H]1O");
    assert_eq!(molecule.tetrahedral_stereo().len(), 4);
    let settings = SugarRemovalSettings::default();
    let extraction =
        extract_aglycone_and_sugars(&molecule, &settings, &ExtractionOptions::default()).unwrap();
    assert_eq!(extraction.fragments().len(), 2);
    assert_eq!(extraction.aglycone().tetrahedral_stereo().len(), 0);
    // all four centres sit in the sugar, the anomeric one now pointing at
    // the duplicated oxygen
    assert_eq!(
        extraction.sugar_fragments()[0].tetrahedral_stereo().len(),
        4
    );

    let options = ExtractionOptions {
        include_stereo: false,
        ..ExtractionOptions::default()
    };
    let stripped = extract_aglycone_and_sugars(&molecule, &settings, &options).unwrap();
    for fragment in stripped.fragments() {
        assert!(fragment.tetrahedral_stereo().is_empty());
    }
}
