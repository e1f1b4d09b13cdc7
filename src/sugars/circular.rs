//! Handle circular sugar detection.

use std::collections::BTreeSet;

use crate::chemistry::{BondOrder, Molecule};
use crate::graph::{Pattern, RingSearch};
use crate::sugars::patterns::CIRCULAR_SUGAR_TEMPLATES;
use crate::sugars::removal::{is_too_small_to_preserve, remove_too_small_components};
use crate::sugars::{SugarCandidate, SugarKind, SugarRemovalSettings};

/// Detect the circular sugar candidates of the given molecule according to
/// the settings for circular sugar detection. The result includes terminal
/// and non-terminal moieties alike; the terminal-only discrimination happens
/// at removal time.
pub fn circular_sugar_candidates(
    molecule: &Molecule,
    settings: &SugarRemovalSettings,
) -> Vec<SugarCandidate> {
    if molecule.is_empty() {
        return Vec::new();
    }
    let potential = potential_sugar_cycles(
        molecule,
        settings.are_spiro_rings_detected_as_circular_sugars(),
        settings.are_keto_groups_allowed(),
    );
    if potential.is_empty() {
        return Vec::new();
    }
    let cycle_count = potential.len();
    let mut candidates = Vec::with_capacity(cycle_count);
    for cycle in potential {
        if settings.is_glycosidic_bond_required() && !has_glycosidic_bond(molecule, &cycle.atoms) {
            // a molecule that consists of nothing but this one sugar ring has
            // nothing to form a glycosidic bond with and is exempt
            let exempt = cycle_count == 1
                && is_molecule_empty_after_ring_removal(molecule, &cycle.atoms, settings);
            if !exempt {
                continue;
            }
        }
        if settings.are_exocyclic_oxygens_required() {
            let oxygens = exocyclic_oxygen_count(molecule, &cycle.atoms);
            if !has_enough_exocyclic_oxygens(cycle.atoms.len(), oxygens, settings) {
                continue;
            }
        }
        candidates.push(SugarCandidate {
            kind: SugarKind::Circular,
            atoms: cycle.atoms,
            spiro_atoms: cycle.spiro_atoms,
        });
    }
    candidates
}

/// Whether the molecule qualifies for the glycosidic bond exemption: it has
/// exactly one potential sugar cycle, that cycle has no glycosidic bond, and
/// nothing (above the preservation threshold) remains when the cycle is
/// removed.
pub fn is_qualified_for_glycosidic_bond_exemption(
    molecule: &Molecule,
    settings: &SugarRemovalSettings,
) -> bool {
    if molecule.is_empty() {
        return false;
    }
    let potential = potential_sugar_cycles(
        molecule,
        settings.are_spiro_rings_detected_as_circular_sugars(),
        settings.are_keto_groups_allowed(),
    );
    let [cycle] = potential.as_slice() else {
        return false;
    };
    !has_glycosidic_bond(molecule, &cycle.atoms)
        && is_molecule_empty_after_ring_removal(molecule, &cycle.atoms, settings)
}

/// One ring that looks like the core of a circular sugar.
#[derive(Clone, Debug)]
pub(crate) struct PotentialSugarCycle {
    pub atoms: BTreeSet<usize>,
    pub spiro_atoms: BTreeSet<usize>,
}

/// Detect the isolated cycles of the molecule that are isomorphic to one of
/// the circular sugar templates and have only single exocyclic bonds (keto
/// groups tolerated on request). These are the general circular sugar
/// candidates before the glycosidic bond and exocyclic oxygen filters.
pub(crate) fn potential_sugar_cycles(
    molecule: &Molecule,
    include_spiro_rings: bool,
    ignore_keto_groups: bool,
) -> Vec<PotentialSugarCycle> {
    if molecule.is_empty() {
        return Vec::new();
    }
    let rings = RingSearch::new(molecule);
    let mut cycles = Vec::new();
    for ring in rings.isolated_rings() {
        let spiro_atoms: BTreeSet<usize> = ring
            .atoms
            .iter()
            .copied()
            .filter(|&atom| rings.is_spiro_atom(atom))
            .collect();
        if !include_spiro_rings && !spiro_atoms.is_empty() {
            continue;
        }
        if !matches_ring_template(molecule, &ring.atoms) {
            continue;
        }
        if !all_exocyclic_bonds_single(molecule, &ring.atoms, &ring.bonds, ignore_keto_groups) {
            continue;
        }
        cycles.push(PotentialSugarCycle {
            atoms: ring.atoms.clone(),
            spiro_atoms,
        });
    }
    cycles
}

/// Whether the induced ring subgraph is isomorphic to one of the circular
/// sugar templates (element and bond order, ignoring hydrogen counts and
/// charges).
fn matches_ring_template(molecule: &Molecule, ring_atoms: &BTreeSet<usize>) -> bool {
    let (ring, _) = molecule.induced_subgraph(ring_atoms);
    CIRCULAR_SUGAR_TEMPLATES.iter().any(|template| {
        template.atom_count() == ring.atom_count()
            && template.bond_count() == ring.bond_count()
            && Pattern::new(template.clone()).matches(&ring)
    })
}

/// Whether every bond that leaves the ring is a single bond. With
/// `ignore_keto_groups`, exocyclic C=O double bonds are tolerated.
fn all_exocyclic_bonds_single(
    molecule: &Molecule,
    ring_atoms: &BTreeSet<usize>,
    ring_bonds: &BTreeSet<usize>,
    ignore_keto_groups: bool,
) -> bool {
    for &atom in ring_atoms {
        for (_, bond_index) in molecule.bonds_of(atom) {
            if ring_bonds.contains(&bond_index) {
                continue;
            }
            let bond = molecule.bond(bond_index);
            if bond.order == BondOrder::Single {
                continue;
            }
            let is_keto = bond.order == BondOrder::Double
                && (molecule.atom(bond.begin).is_oxygen() || molecule.atom(bond.end).is_oxygen());
            if !(ignore_keto_groups && is_keto) {
                return false;
            }
        }
    }
    true
}

/// Whether one of the ring atoms carries an exocyclic oxygen that connects
/// onwards to another heavy atom: an oxygen with exactly two bonds, both of
/// single order, and no hydrogen partner. Ester oxygens qualify as well, so
/// many glycoside-like connections count as O-glycosidic bonds here.
pub(crate) fn has_glycosidic_bond(molecule: &Molecule, ring_atoms: &BTreeSet<usize>) -> bool {
    for &ring_atom in ring_atoms {
        for neighbor in molecule.neighbors(ring_atom) {
            if ring_atoms.contains(&neighbor) || !molecule.atom(neighbor).is_oxygen() {
                continue;
            }
            let bonds: Vec<usize> = molecule.bonds_of(neighbor).map(|(_, bond)| bond).collect();
            let two_single_bonds = bonds.len() == 2
                && bonds
                    .iter()
                    .all(|&bond| molecule.bond(bond).order == BondOrder::Single);
            let binds_hydrogen = molecule
                .neighbors(neighbor)
                .any(|partner| molecule.atom(partner).element == crate::chemistry::Element::H);
            if two_single_bonds && !binds_hydrogen {
                return true;
            }
        }
    }
    false
}

/// Whether removing the given ring (and clearing every leftover fragment
/// below the preservation threshold) leaves the molecule empty. Used for the
/// glycosidic bond exemption.
pub(crate) fn is_molecule_empty_after_ring_removal(
    molecule: &Molecule,
    ring_atoms: &BTreeSet<usize>,
    settings: &SugarRemovalSettings,
) -> bool {
    let mut clone = molecule.clone();
    clone.remove_atoms(ring_atoms);
    if clone.is_empty() {
        return true;
    }
    remove_too_small_components(&mut clone, settings);
    clone.is_empty()
}

/// The number of exocyclic oxygen neighbours of the ring atoms. The oxygen
/// atoms are not checked for being attached by a single bond because the
/// exocyclic single bond test precedes this in the algorithm; glycosidic
/// oxygens count just like hydroxy groups.
pub(crate) fn exocyclic_oxygen_count(molecule: &Molecule, ring_atoms: &BTreeSet<usize>) -> usize {
    ring_atoms
        .iter()
        .flat_map(|&atom| molecule.neighbors(atom))
        .filter(|&neighbor| {
            molecule.atom(neighbor).is_oxygen() && !ring_atoms.contains(&neighbor)
        })
        .count()
}

/// Whether the ratio of attached exocyclic oxygen atoms to ring size reaches
/// the configured threshold.
pub(crate) fn has_enough_exocyclic_oxygens(
    ring_size: usize,
    oxygen_count: usize,
    settings: &SugarRemovalSettings,
) -> bool {
    if ring_size == 0 {
        return false;
    }
    oxygen_count as f64 / ring_size as f64 >= settings.exocyclic_oxygen_ratio_threshold()
}

/// Whether the whole substructure is below the preservation threshold, see
/// [`is_too_small_to_preserve`].
pub fn is_structure_too_small_to_preserve(
    molecule: &Molecule,
    settings: &SugarRemovalSettings,
) -> bool {
    let all: BTreeSet<usize> = (0..molecule.atom_count()).collect();
    is_too_small_to_preserve(molecule, &all, settings)
}
