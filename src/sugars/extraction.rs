//! Handle aglycone and sugar extraction.
//!
//! Extraction never touches the input molecule: one copy is deglycosylated
//! into the aglycone, a second copy is reduced to the removed sugar atoms,
//! and the bonds broken between the two are repaired on both sides. A
//! heteroatom that connected sugar and aglycone (the glycosidic oxygen,
//! typically) is duplicated so both educts stay chemically sensible; open
//! valences are filled with implicit hydrogen or marked with `*` pseudo
//! atoms on request. Two removal artefacts are corrected before that: an
//! exocyclic C6 carbon stranded in the aglycone is handed back to its sugar,
//! and an ester's carboxy carbon is moved over entirely so the sugar leaves
//! as the acid and the aglycone as the alcohol.

use std::collections::BTreeSet;

use crate::chemistry::{Atom, Bond, BondOrder, Element, Molecule};
use crate::errors::SugarRemovalError;
use crate::graph::RingSearch;
use crate::sugars::removal::{compose_maps, deglycosylate, is_too_small_to_preserve};
use crate::sugars::SugarRemovalSettings;

/// The options of one extraction call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExtractionOptions {
    /// Detect and extract circular sugars (default true).
    pub extract_circular: bool,
    /// Detect and extract linear sugars (default false).
    pub extract_linear: bool,
    /// Mark attachment points with `*` pseudo atoms instead of saturating
    /// them with implicit hydrogen (default false).
    pub mark_attachment_points: bool,
    /// Split O-glycosidic, ester, and peroxide bonds between extracted sugar
    /// moieties so every unit becomes its own fragment (default false).
    pub postprocess_sugars: bool,
    /// Only split a bond in postprocessing when both resulting pieces are
    /// big enough: above the preservation threshold for circular sugars,
    /// at least the linear minimum size for linear sugars (default false).
    pub limit_postprocessing_by_size: bool,
    /// Carry stereo descriptors into the extracted copies (default true).
    pub include_stereo: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            extract_circular: true,
            extract_linear: false,
            mark_attachment_points: false,
            postprocess_sugars: false,
            limit_postprocessing_by_size: false,
            include_stereo: true,
        }
    }
}

/// The result of [`extract_aglycone_and_sugars`]: the aglycone, the sugar
/// fragments, and the correspondence back to the input molecule.
#[derive(Clone, Debug)]
pub struct Extraction {
    /// Index 0 is always the aglycone, even when it is empty; the remaining
    /// entries are the extracted sugar fragments.
    fragments: Vec<Molecule>,
    atom_in_aglycone: Vec<Option<usize>>,
    bond_in_aglycone: Vec<Option<usize>>,
    /// Input atom to (fragment index, atom index); fragment indices start
    /// at 1.
    atom_in_sugars: Vec<Option<(usize, usize)>>,
    bond_in_sugars: Vec<Option<(usize, usize)>>,
}

impl Extraction {
    /// All fragments; index 0 is the aglycone.
    pub fn fragments(&self) -> &[Molecule] {
        &self.fragments
    }

    /// Consume the extraction, keeping only the fragments.
    pub fn into_fragments(self) -> Vec<Molecule> {
        self.fragments
    }

    /// The aglycone (may be empty when the molecule was all sugar).
    pub fn aglycone(&self) -> &Molecule {
        &self.fragments[0]
    }

    /// The extracted sugar fragments.
    pub fn sugar_fragments(&self) -> &[Molecule] {
        &self.fragments[1..]
    }

    /// The input atom indices that correspond to atoms of the given fragment
    /// (0 for the aglycone). Atoms invented during extraction (duplicated
    /// heteroatoms' partners, attachment markers) have no input counterpart
    /// and do not appear.
    pub fn atom_indices_of_group(&self, group: usize) -> Vec<usize> {
        (0..self.atom_in_aglycone.len())
            .filter(|&atom| {
                if group == 0 {
                    self.atom_in_aglycone[atom].is_some()
                } else {
                    self.atom_in_sugars[atom].is_some_and(|(fragment, _)| fragment == group)
                }
            })
            .collect()
    }

    /// The input bond indices that correspond to bonds of the given fragment
    /// (0 for the aglycone).
    pub fn bond_indices_of_group(&self, group: usize) -> Vec<usize> {
        (0..self.bond_in_aglycone.len())
            .filter(|&bond| {
                if group == 0 {
                    self.bond_in_aglycone[bond].is_some()
                } else {
                    self.bond_in_sugars[bond].is_some_and(|(fragment, _)| fragment == group)
                }
            })
            .collect()
    }

    /// For every input atom the fragment it ended up in: 0 for the aglycone,
    /// 1 and up for sugar fragments, `None` for atoms that were discarded
    /// (e.g. cleared undersized leftovers). A heteroatom duplicated onto
    /// both sides is reported with its sugar fragment.
    pub fn group_index_per_atom(&self) -> Vec<Option<usize>> {
        (0..self.atom_in_aglycone.len())
            .map(|atom| {
                self.atom_in_sugars[atom]
                    .map(|(fragment, _)| fragment)
                    .or_else(|| self.atom_in_aglycone[atom].map(|_| 0))
            })
            .collect()
    }
}

/// Copy the molecule and separate it into its aglycone and sugar moieties.
///
/// The first fragment of the result is always the aglycone, even when
/// nothing is left of it; the sugar fragments follow in detection order. If
/// no sugars are found the result holds a single fragment, the unchanged
/// copy. All current settings apply, including terminal-only removal and the
/// preservation mode.
///
/// # Errors
/// If re-saturation hits an element without a valence model.
pub fn extract_aglycone_and_sugars(
    molecule: &Molecule,
    settings: &SugarRemovalSettings,
    options: &ExtractionOptions,
) -> Result<Extraction, SugarRemovalError> {
    let atom_count = molecule.atom_count();
    let bond_count = molecule.bond_count();
    let mut aglycone = molecule.clone();
    if !options.include_stereo {
        aglycone.clear_stereo();
    }
    if molecule.is_empty() || (!options.extract_circular && !options.extract_linear) {
        return Ok(single_fragment(aglycone, atom_count, bond_count));
    }
    let run = deglycosylate(
        &mut aglycone,
        settings,
        options.extract_circular,
        options.extract_linear,
    )?;
    if run.removed.is_empty() {
        return Ok(single_fragment(aglycone, atom_count, bond_count));
    }
    // spiro junction atoms spared by the removal live on in both copies
    let spared = run.spared_moiety_atoms();
    let mut sugars = molecule.clone();
    if !options.include_stereo {
        sugars.clear_stereo();
    }
    let sugars_delete: BTreeSet<usize> = (0..atom_count)
        .filter(|&atom| run.map[atom].is_some() && !spared.contains(&atom))
        .collect();
    let mut agly_atom = run.map;
    let mut sug_atom = sugars.remove_atoms(&sugars_delete).atoms;

    correct_separations(
        molecule,
        &mut aglycone,
        &mut sugars,
        &mut agly_atom,
        &mut sug_atom,
    );
    repair_broken_bonds(
        molecule,
        &mut aglycone,
        &mut sugars,
        &mut agly_atom,
        &mut sug_atom,
        options.mark_attachment_points,
    );
    saturate_spared_junctions(
        &spared,
        &mut aglycone,
        &mut sugars,
        &agly_atom,
        &sug_atom,
        options.mark_attachment_points,
    );
    if options.postprocess_sugars {
        if options.extract_circular {
            split_esters(&mut sugars, settings, options, true);
            split_peroxides(&mut sugars, settings, options, true);
            split_glycosidic_ethers(&mut sugars, settings, options, true);
        }
        if options.extract_linear {
            split_esters(&mut sugars, settings, options, false);
            split_cross_linking_ethers(&mut sugars, settings, options);
            split_glycosidic_ethers(&mut sugars, settings, options, false);
            split_peroxides(&mut sugars, settings, options, false);
        }
    }

    // partition the sugar container into its fragments
    let components = sugars.components();
    let mut fragment_of_sugar_atom: Vec<Option<(usize, usize)>> =
        vec![None; sugars.atom_count()];
    let mut fragments = Vec::with_capacity(components.len() + 1);
    fragments.push(aglycone);
    for component in &components {
        let (fragment, fragment_to_sugars) = sugars.induced_subgraph(component);
        let fragment_index = fragments.len();
        for (atom_in_fragment, &atom_in_sugars) in fragment_to_sugars.iter().enumerate() {
            fragment_of_sugar_atom[atom_in_sugars] = Some((fragment_index, atom_in_fragment));
        }
        fragments.push(fragment);
    }
    let atom_in_sugars: Vec<Option<(usize, usize)>> = sug_atom
        .iter()
        .map(|entry| entry.and_then(|sugar_atom| fragment_of_sugar_atom[sugar_atom]))
        .collect();
    let bond_in_aglycone: Vec<Option<usize>> = molecule
        .bonds()
        .iter()
        .map(|bond| mapped_bond(&fragments[0], &agly_atom, bond))
        .collect();
    let bond_in_sugars: Vec<Option<(usize, usize)>> = molecule
        .bonds()
        .iter()
        .map(|bond| {
            let (fragment_a, atom_a) = atom_in_sugars[bond.begin]?;
            let (fragment_b, atom_b) = atom_in_sugars[bond.end]?;
            if fragment_a != fragment_b {
                return None;
            }
            fragments[fragment_a]
                .bond_between(atom_a, atom_b)
                .map(|index| (fragment_a, index))
        })
        .collect();
    Ok(Extraction {
        fragments,
        atom_in_aglycone: agly_atom,
        bond_in_aglycone,
        atom_in_sugars,
        bond_in_sugars,
    })
}

fn single_fragment(aglycone: Molecule, atom_count: usize, bond_count: usize) -> Extraction {
    Extraction {
        fragments: vec![aglycone],
        atom_in_aglycone: (0..atom_count).map(Some).collect(),
        bond_in_aglycone: (0..bond_count).map(Some).collect(),
        atom_in_sugars: vec![None; atom_count],
        bond_in_sugars: vec![None; bond_count],
    }
}

/// The copy of an input bond in the given container, if both its atoms and
/// the bond survived there.
fn mapped_bond(container: &Molecule, map: &[Option<usize>], bond: &Bond) -> Option<usize> {
    match (map[bond.begin], map[bond.end]) {
        (Some(begin), Some(end)) => container.bond_between(begin, end),
        _ => None,
    }
}

/// Correct two artefacts of the removal engine on broken carbon-carbon
/// bonds: a stranded C6 carbon whose only aglycone neighbour is an oxygen is
/// moved back to its sugar, and a carboxy group split off an ester bond is
/// moved over entirely (the ether oxygen stays with the aglycone).
fn correct_separations(
    original: &Molecule,
    aglycone: &mut Molecule,
    sugars: &mut Molecule,
    agly_atom: &mut Vec<Option<usize>>,
    sug_atom: &mut Vec<Option<usize>>,
) {
    for bond_index in 0..original.bond_count() {
        let bond = *original.bond(bond_index);
        if !original.atom(bond.begin).is_carbon() || !original.atom(bond.end).is_carbon() {
            continue;
        }
        if mapped_bond(aglycone, agly_atom, &bond).is_some()
            || mapped_bond(sugars, sug_atom, &bond).is_some()
        {
            continue;
        }
        let (carbon_in_aglycone, carbon_in_sugars) =
            if agly_atom[bond.begin].is_some() && sug_atom[bond.end].is_some() {
                (bond.begin, bond.end)
            } else if agly_atom[bond.end].is_some() && sug_atom[bond.begin].is_some() {
                (bond.end, bond.begin)
            } else {
                continue;
            };
        let Some(current) = agly_atom[carbon_in_aglycone] else {
            continue;
        };
        match aglycone.degree(current) {
            1 => {
                let (neighbor, _) = aglycone
                    .bonds_of(current)
                    .next()
                    .expect("degree checked above");
                if aglycone.atom(neighbor).is_oxygen() {
                    move_atom_to_sugars(
                        original,
                        aglycone,
                        sugars,
                        agly_atom,
                        sug_atom,
                        carbon_in_aglycone,
                        carbon_in_sugars,
                        &bond,
                        &[current],
                    );
                }
            }
            2 => {
                let mut keto: Option<usize> = None;
                let mut ether = false;
                for (neighbor, neighbor_bond) in aglycone.bonds_of(current) {
                    if !aglycone.atom(neighbor).is_oxygen() {
                        keto = None;
                        break;
                    }
                    match aglycone.bond(neighbor_bond).order {
                        BondOrder::Double if keto.is_none() => keto = Some(neighbor),
                        BondOrder::Single if !ether => ether = true,
                        _ => {
                            keto = None;
                            break;
                        }
                    }
                }
                if let (Some(keto_current), true) = (keto, ether) {
                    // find the input atom behind the keto oxygen copy
                    let keto_original = agly_atom
                        .iter()
                        .position(|&mapped| mapped == Some(keto_current));
                    let Some(keto_original) = keto_original else {
                        continue;
                    };
                    move_atom_to_sugars(
                        original,
                        aglycone,
                        sugars,
                        agly_atom,
                        sug_atom,
                        carbon_in_aglycone,
                        carbon_in_sugars,
                        &bond,
                        &[current, keto_current],
                    );
                    // re-attach the keto oxygen to the moved carbon
                    let new_carbon = sug_atom[carbon_in_aglycone].expect("just moved");
                    let new_keto = sugars.add_atom(*original.atom(keto_original));
                    sugars.add_bond(Bond::new(new_carbon, new_keto, BondOrder::Double));
                    sug_atom[keto_original] = Some(new_keto);
                }
            }
            _ => {}
        }
    }
}

/// Move the copy of `carbon` from the aglycone into the sugars container,
/// bond it to its sugar-side partner with the broken bond's order, and carry
/// the bond's stereo descriptors over.
#[expect(clippy::too_many_arguments)]
fn move_atom_to_sugars(
    original: &Molecule,
    aglycone: &mut Molecule,
    sugars: &mut Molecule,
    agly_atom: &mut Vec<Option<usize>>,
    sug_atom: &mut Vec<Option<usize>>,
    carbon: usize,
    partner: usize,
    broken_bond: &Bond,
    remove_from_aglycone: &[usize],
) {
    let new_carbon = sugars.add_atom(*original.atom(carbon));
    sug_atom[carbon] = Some(new_carbon);
    if let Some(partner_current) = sug_atom[partner] {
        sugars.add_bond(Bond {
            begin: new_carbon,
            end: partner_current,
            order: broken_bond.order,
            aromatic: false,
        });
    }
    transfer_bond_stereo(original, broken_bond, sugars, sug_atom);
    let removal = aglycone.remove_atoms(&remove_from_aglycone.iter().copied().collect());
    *agly_atom = compose_maps(agly_atom, &removal.atoms);
}

/// Copy stereo descriptors of the original molecule that sit on the given
/// bond into the receiving container, as far as all their carriers exist
/// there.
fn transfer_bond_stereo(
    original: &Molecule,
    bond: &Bond,
    receiver: &mut Molecule,
    receiver_map: &[Option<usize>],
) {
    let mut tetrahedral = Vec::new();
    for stereo in original.tetrahedral_stereo() {
        if stereo.contains(bond.begin)
            && stereo.contains(bond.end)
            && !receiver
                .tetrahedral_stereo()
                .iter()
                .any(|existing| Some(existing.focus) == receiver_map[stereo.focus])
        {
            if let Some(mapped) = stereo.remap(receiver_map) {
                tetrahedral.push(mapped);
            }
        }
    }
    receiver.tetrahedral_stereo_mut().extend(tetrahedral);
    let mut double_bond = Vec::new();
    for stereo in original.double_bond_stereo() {
        if stereo.contains(bond.begin) && stereo.contains(bond.end) {
            if let Some(mapped) = stereo.remap(receiver_map) {
                double_bond.push(mapped);
            }
        }
    }
    receiver.double_bond_stereo_mut().extend(double_bond);
}

/// Walk every input bond that survived in neither copy and repair both
/// sides: a connecting heteroatom is duplicated onto the carbon's side, all
/// open ends are saturated with implicit hydrogen or attachment markers.
fn repair_broken_bonds(
    original: &Molecule,
    aglycone: &mut Molecule,
    sugars: &mut Molecule,
    agly_atom: &mut Vec<Option<usize>>,
    sug_atom: &mut Vec<Option<usize>>,
    mark_attachment_points: bool,
) {
    for bond_index in 0..original.bond_count() {
        let bond = *original.bond(bond_index);
        if mapped_bond(aglycone, agly_atom, &bond).is_some()
            || mapped_bond(sugars, sug_atom, &bond).is_some()
        {
            continue;
        }
        let begin = original.atom(bond.begin);
        let end = original.atom(bond.end);
        let carbon_hetero = if begin.is_carbon() && end.is_heteroatom() {
            Some((bond.begin, bond.end))
        } else if end.is_carbon() && begin.is_heteroatom() {
            Some((bond.end, bond.begin))
        } else {
            None
        };
        if let Some((carbon, hetero)) = carbon_hetero {
            let hetero_in_sugars = sug_atom[hetero].is_some();
            let hetero_in_aglycone = agly_atom[hetero].is_some();
            if !hetero_in_sugars && !hetero_in_aglycone {
                continue;
            }
            if hetero_in_sugars {
                // duplicate the heteroatom into the aglycone
                let Some(carbon_current) = agly_atom[carbon] else {
                    continue;
                };
                let copy = aglycone.add_atom(*original.atom(hetero));
                aglycone.add_bond(Bond {
                    begin: carbon_current,
                    end: copy,
                    order: bond.order,
                    aromatic: false,
                });
                agly_atom[hetero] = Some(copy);
                saturate_open(aglycone, copy, bond.order, mark_attachment_points);
                transfer_bond_stereo(original, &bond, aglycone, agly_atom);
                let hetero_current = sug_atom[hetero].expect("checked above");
                saturate_open(sugars, hetero_current, bond.order, mark_attachment_points);
            } else {
                // duplicate the heteroatom into the sugars
                let Some(carbon_current) = sug_atom[carbon] else {
                    continue;
                };
                let copy = sugars.add_atom(*original.atom(hetero));
                sugars.add_bond(Bond {
                    begin: carbon_current,
                    end: copy,
                    order: bond.order,
                    aromatic: false,
                });
                sug_atom[hetero] = Some(copy);
                saturate_open(sugars, copy, bond.order, mark_attachment_points);
                transfer_bond_stereo(original, &bond, sugars, sug_atom);
                let hetero_current = agly_atom[hetero].expect("checked above");
                saturate_open(aglycone, hetero_current, bond.order, mark_attachment_points);
            }
        } else {
            // carbon-carbon or heteroatom-heteroatom cut, saturate both ends
            for endpoint in [bond.begin, bond.end] {
                if let Some(current) = agly_atom[endpoint] {
                    saturate_open(aglycone, current, bond.order, mark_attachment_points);
                } else if let Some(current) = sug_atom[endpoint] {
                    saturate_open(sugars, current, bond.order, mark_attachment_points);
                }
            }
        }
    }
}

/// Fill one open valence left by a broken bond, either with implicit
/// hydrogen or with an explicit attachment marker.
fn saturate_open(container: &mut Molecule, atom: usize, order: BondOrder, mark: bool) {
    if mark {
        let marker = container.add_atom(Atom::new(Element::R));
        container.add_bond(Bond::new(atom, marker, order));
    } else {
        container.atom_mut(atom).implicit_hydrogens += order.numeric();
    }
}

/// A spiro junction spared during removal sits in both copies with two open
/// valences each (unless all four bonds survived on one side).
fn saturate_spared_junctions(
    spared: &BTreeSet<usize>,
    aglycone: &mut Molecule,
    sugars: &mut Molecule,
    agly_atom: &[Option<usize>],
    sug_atom: &[Option<usize>],
    mark_attachment_points: bool,
) {
    for &atom in spared {
        if let Some(current) = agly_atom[atom] {
            if aglycone.degree(current) != 4 {
                saturate_open(aglycone, current, BondOrder::Single, mark_attachment_points);
                saturate_open(aglycone, current, BondOrder::Single, mark_attachment_points);
            }
        }
        if let Some(current) = sug_atom[atom] {
            if sugars.degree(current) != 4 {
                saturate_open(sugars, current, BondOrder::Single, mark_attachment_points);
                saturate_open(sugars, current, BondOrder::Single, mark_attachment_points);
            }
        }
    }
}

/// Whether splitting the given bond would leave a fragment that is too small
/// by the applicable criterion.
fn splitting_leaves_undersized_fragment(
    molecule: &Molecule,
    bond_index: usize,
    circular_criterion: bool,
    settings: &SugarRemovalSettings,
) -> bool {
    let mut copy = molecule.clone();
    copy.remove_bonds(&BTreeSet::from([bond_index]));
    copy.components().into_iter().any(|component| {
        if circular_criterion {
            is_too_small_to_preserve(&copy, &component, settings)
        } else {
            component.len() < settings.linear_sugar_candidate_min_size()
        }
    })
}

/// Split the bond between `carbon` and `oxygen`, duplicating the oxygen onto
/// the carbon so an alcohol (or acid) remains on both sides. Tetrahedral
/// descriptors on the carbon are retargeted to the duplicate.
fn split_with_duplicated_oxygen(
    molecule: &mut Molecule,
    carbon: usize,
    oxygen: usize,
    circular_criterion: bool,
    settings: &SugarRemovalSettings,
    options: &ExtractionOptions,
) {
    let Some(bond_index) = molecule.bond_between(carbon, oxygen) else {
        return;
    };
    if options.limit_postprocessing_by_size
        && splitting_leaves_undersized_fragment(molecule, bond_index, circular_criterion, settings)
    {
        return;
    }
    let duplicate = molecule.add_atom(Atom::new(Element::O));
    molecule.add_bond(Bond::new(carbon, duplicate, BondOrder::Single));
    for stereo in molecule.tetrahedral_stereo_mut() {
        if stereo.focus == carbon {
            stereo.replace_carrier(oxygen, duplicate);
        }
    }
    molecule.remove_bonds(&BTreeSet::from([bond_index]));
    saturate_open(molecule, oxygen, BondOrder::Single, options.mark_attachment_points);
    saturate_open(
        molecule,
        duplicate,
        BondOrder::Single,
        options.mark_attachment_points,
    );
}

/// Split the given bond without duplication and saturate both ends.
fn split_plain(
    molecule: &mut Molecule,
    bond_index: usize,
    circular_criterion: bool,
    settings: &SugarRemovalSettings,
    options: &ExtractionOptions,
) {
    if options.limit_postprocessing_by_size
        && splitting_leaves_undersized_fragment(molecule, bond_index, circular_criterion, settings)
    {
        return;
    }
    let bond = *molecule.bond(bond_index);
    molecule.remove_bonds(&BTreeSet::from([bond_index]));
    saturate_open(molecule, bond.begin, bond.order, options.mark_attachment_points);
    saturate_open(molecule, bond.end, bond.order, options.mark_attachment_points);
}

/// Whether the atom is an uncharged, non-aromatic carbon that satisfies the
/// ring-side constraint of the circular patterns (in a ring with three or
/// four explicit connections) or the chain-side constraint of the linear
/// patterns (not in a ring).
fn qualifies_as_sugar_carbon(
    molecule: &Molecule,
    rings: &RingSearch,
    atom: usize,
    circular: bool,
) -> bool {
    let a = molecule.atom(atom);
    if !a.is_carbon() || a.aromatic || a.formal_charge != 0 {
        return false;
    }
    if circular {
        rings.is_cyclic_atom(atom) && (3..=4).contains(&molecule.degree(atom))
    } else {
        !rings.is_cyclic_atom(atom)
    }
}

/// An uncharged two-coordinate acyclic ether oxygen.
fn qualifies_as_connecting_oxygen(molecule: &Molecule, rings: &RingSearch, atom: usize) -> bool {
    let a = molecule.atom(atom);
    a.is_oxygen()
        && !a.aromatic
        && a.formal_charge == 0
        && molecule.degree(atom) == 2
        && !rings.is_cyclic_atom(atom)
        && molecule
            .bonds_of(atom)
            .all(|(_, bond)| molecule.bond(bond).order == BondOrder::Single)
}

/// Whether the carbon carries an exocyclic keto oxygen (the carbonyl
/// environment of an ester).
fn has_keto_oxygen(molecule: &Molecule, rings: &RingSearch, atom: usize) -> bool {
    molecule.bonds_of(atom).any(|(neighbor, bond)| {
        let partner = molecule.atom(neighbor);
        partner.is_oxygen()
            && !partner.aromatic
            && partner.formal_charge == 0
            && molecule.bond(bond).order == BondOrder::Double
            && !rings.is_cyclic_bond(bond)
    })
}

/// Find and split ester bonds between sugar moieties: the bond between the
/// carbonyl carbon and the connecting oxygen is cut and the oxygen
/// duplicated, so the educts are an acid and an alcohol.
fn split_esters(
    molecule: &mut Molecule,
    settings: &SugarRemovalSettings,
    options: &ExtractionOptions,
    circular: bool,
) {
    let rings = RingSearch::new(molecule);
    let mut cuts = Vec::new();
    for oxygen in 0..molecule.atom_count() {
        if !qualifies_as_connecting_oxygen(molecule, &rings, oxygen) {
            continue;
        }
        let neighbors: Vec<usize> = molecule.neighbors(oxygen).collect();
        let carbonyl = neighbors.iter().copied().find(|&carbon| {
            qualifies_as_sugar_carbon(molecule, &rings, carbon, circular)
                && has_keto_oxygen(molecule, &rings, carbon)
        });
        let Some(carbonyl) = carbonyl else { continue };
        let other_qualifies = neighbors.iter().any(|&other| {
            other != carbonyl
                && molecule.atom(other).is_carbon()
                && molecule.atom(other).formal_charge == 0
                && (circular || !rings.is_cyclic_atom(other))
        });
        if other_qualifies {
            cuts.push((carbonyl, oxygen));
        }
    }
    for (carbon, oxygen) in cuts {
        split_with_duplicated_oxygen(molecule, carbon, oxygen, circular, settings, options);
    }
}

/// Find and split O-glycosidic bonds (circular) or plain ether bonds
/// (linear) with oxygen duplication.
fn split_glycosidic_ethers(
    molecule: &mut Molecule,
    settings: &SugarRemovalSettings,
    options: &ExtractionOptions,
    circular: bool,
) {
    let rings = RingSearch::new(molecule);
    let mut cuts = Vec::new();
    for oxygen in 0..molecule.atom_count() {
        if !qualifies_as_connecting_oxygen(molecule, &rings, oxygen) {
            continue;
        }
        let neighbors: Vec<usize> = molecule.neighbors(oxygen).collect();
        let anchor = neighbors
            .iter()
            .copied()
            .find(|&carbon| qualifies_as_sugar_carbon(molecule, &rings, carbon, circular));
        let Some(anchor) = anchor else { continue };
        let other_qualifies = neighbors.iter().any(|&other| {
            other != anchor
                && molecule.atom(other).is_carbon()
                && molecule.atom(other).formal_charge == 0
                && (circular || !rings.is_cyclic_atom(other))
        });
        if other_qualifies {
            cuts.push((anchor, oxygen));
        }
    }
    for (carbon, oxygen) in cuts {
        split_with_duplicated_oxygen(molecule, carbon, oxygen, circular, settings, options);
    }
}

/// Find and split cross-linking ether bonds between linear sugars: the
/// oxygen stays with its first carbon, the cut happens towards the carbon
/// that carries a free hydroxy group.
fn split_cross_linking_ethers(
    molecule: &mut Molecule,
    settings: &SugarRemovalSettings,
    options: &ExtractionOptions,
) {
    let rings = RingSearch::new(molecule);
    let mut cuts = Vec::new();
    for oxygen in 0..molecule.atom_count() {
        if !qualifies_as_connecting_oxygen(molecule, &rings, oxygen) {
            continue;
        }
        let neighbors: Vec<usize> = molecule.neighbors(oxygen).collect();
        if neighbors.len() != 2
            || !neighbors
                .iter()
                .all(|&carbon| qualifies_as_sugar_carbon(molecule, &rings, carbon, false))
        {
            continue;
        }
        let hydroxylated = neighbors.iter().copied().find(|&carbon| {
            molecule.bonds_of(carbon).any(|(partner, bond)| {
                partner != oxygen
                    && molecule.atom(partner).is_oxygen()
                    && molecule.atom(partner).formal_charge == 0
                    && !molecule.atom(partner).aromatic
                    && molecule.degree(partner) == 1
                    && molecule.atom(partner).implicit_hydrogens == 1
                    && molecule.bond(bond).order == BondOrder::Single
                    && !rings.is_cyclic_bond(bond)
            })
        });
        if let Some(target) = hydroxylated {
            cuts.push((target, oxygen));
        }
    }
    for (carbon, oxygen) in cuts {
        // splitting shifts bond indices, so the bond is looked up again
        if let Some(bond_index) = molecule.bond_between(carbon, oxygen) {
            split_plain(molecule, bond_index, false, settings, options);
        }
    }
}

/// Find and split peroxide bridges at their oxygen-oxygen bond; no
/// duplication, both oxygens keep their side.
fn split_peroxides(
    molecule: &mut Molecule,
    settings: &SugarRemovalSettings,
    options: &ExtractionOptions,
    circular: bool,
) {
    let rings = RingSearch::new(molecule);
    let mut cuts = Vec::new();
    for bond_index in 0..molecule.bond_count() {
        let bond = *molecule.bond(bond_index);
        if bond.order != BondOrder::Single
            || !qualifies_as_connecting_oxygen(molecule, &rings, bond.begin)
            || !qualifies_as_connecting_oxygen(molecule, &rings, bond.end)
        {
            continue;
        }
        let begin_carbon = molecule.neighbors(bond.begin).find(|&n| n != bond.end);
        let end_carbon = molecule.neighbors(bond.end).find(|&n| n != bond.begin);
        let (Some(begin_carbon), Some(end_carbon)) = (begin_carbon, end_carbon) else {
            continue;
        };
        let one_side_anchored = qualifies_as_sugar_carbon(molecule, &rings, begin_carbon, circular)
            || qualifies_as_sugar_carbon(molecule, &rings, end_carbon, circular);
        let both_carbon = molecule.atom(begin_carbon).is_carbon()
            && molecule.atom(end_carbon).is_carbon()
            && molecule.atom(begin_carbon).formal_charge == 0
            && molecule.atom(end_carbon).formal_charge == 0;
        if one_side_anchored && both_carbon {
            cuts.push((bond.begin, bond.end));
        }
    }
    for (first, second) in cuts {
        // splitting shifts bond indices, so the bond is looked up again
        if let Some(bond_index) = molecule.bond_between(first, second) {
            split_plain(molecule, bond_index, circular, settings, options);
        }
    }
}
