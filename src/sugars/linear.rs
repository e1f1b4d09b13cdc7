//! Handle linear sugar detection.
//!
//! Detection works in six steps: pattern matching, merging of overlapping
//! matches, splitting of ether/ester/peroxide linkages inside the merged
//! candidates, removal of atoms claimed by potential circular sugars,
//! removal of cyclic atoms (unless linear sugars in rings are requested),
//! and a final size filter on the carbon count.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::chemistry::{BondOrder, Molecule};
use crate::graph::{RingSearch, cyclic_bonds_of_subgraph};
use crate::sugars::circular::potential_sugar_cycles;
use crate::sugars::patterns::{LINEAR_ACIDIC_SUGAR_PATTERNS, LINEAR_SUGAR_PATTERNS};
use crate::sugars::{SugarCandidate, SugarKind, SugarRemovalSettings};

/// A working candidate during the linear detection pipeline: a subgraph of
/// the parent molecule given by atom and bond index sets.
#[derive(Clone, Debug)]
struct CandidateGraph {
    atoms: BTreeSet<usize>,
    bonds: BTreeSet<usize>,
}

impl CandidateGraph {
    /// Split this candidate into its connected parts, connectivity taken
    /// over the candidate's own bonds only.
    fn components(&self, molecule: &Molecule) -> Vec<CandidateGraph> {
        let mut adjacency: BTreeMap<usize, Vec<(usize, usize)>> = BTreeMap::new();
        for &bond_index in &self.bonds {
            let bond = molecule.bond(bond_index);
            adjacency.entry(bond.begin).or_default().push((bond.end, bond_index));
            adjacency.entry(bond.end).or_default().push((bond.begin, bond_index));
        }
        let mut seen = BTreeSet::new();
        let mut parts = Vec::new();
        for &start in &self.atoms {
            if seen.contains(&start) {
                continue;
            }
            let mut atoms = BTreeSet::new();
            let mut bonds = BTreeSet::new();
            let mut queue = VecDeque::from([start]);
            seen.insert(start);
            while let Some(current) = queue.pop_front() {
                atoms.insert(current);
                for &(neighbor, bond_index) in
                    adjacency.get(&current).map(Vec::as_slice).unwrap_or_default()
                {
                    bonds.insert(bond_index);
                    if seen.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
            parts.push(CandidateGraph { atoms, bonds });
        }
        parts
    }

    /// Restrict this candidate to the given atoms, dropping bonds that lose
    /// an end.
    fn retain_atoms(&mut self, molecule: &Molecule, keep: impl Fn(usize) -> bool) {
        self.atoms.retain(|&atom| keep(atom));
        self.bonds.retain(|&bond_index| {
            let bond = molecule.bond(bond_index);
            self.atoms.contains(&bond.begin) && self.atoms.contains(&bond.end)
        });
    }
}

/// Detect the linear sugar candidates of the given molecule according to the
/// settings for linear sugar detection. The result includes terminal and
/// non-terminal moieties alike.
pub fn linear_sugar_candidates(
    molecule: &Molecule,
    settings: &SugarRemovalSettings,
) -> Vec<SugarCandidate> {
    if molecule.is_empty() {
        return Vec::new();
    }
    let (mut candidates, acidic_atoms) = initial_matches(molecule, settings);
    if !candidates.is_empty() {
        candidates = combine_overlapping(molecule, candidates);
        candidates = split_ether_ester_peroxide_bonds(molecule, candidates);
        remove_circular_sugar_atoms(molecule, &mut candidates);
    }
    if !settings.are_linear_sugars_in_rings_detected() && !candidates.is_empty() {
        remove_cyclic_atoms(molecule, &mut candidates);
    }
    candidates
        .into_iter()
        .filter(|candidate| {
            let carbons = candidate
                .atoms
                .iter()
                .filter(|&&atom| molecule.atom(atom).is_carbon())
                .count();
            (settings.linear_sugar_candidate_min_size()
                ..=settings.linear_sugar_candidate_max_size())
                .contains(&carbons)
        })
        .map(|candidate| SugarCandidate {
            kind: if candidate.atoms.iter().any(|atom| acidic_atoms.contains(atom)) {
                SugarKind::LinearAcidic
            } else {
                SugarKind::Linear
            },
            atoms: candidate.atoms,
            spiro_atoms: BTreeSet::new(),
        })
        .collect()
}

/// Match the linear sugar pattern library (and the acidic patterns when
/// enabled) against the molecule. The matches may overlap; the atoms matched
/// by acidic patterns are reported separately so the candidates can be
/// tagged later.
fn initial_matches(
    molecule: &Molecule,
    settings: &SugarRemovalSettings,
) -> (Vec<CandidateGraph>, BTreeSet<usize>) {
    let mut candidates = Vec::new();
    let mut acidic_atoms = BTreeSet::new();
    let acidic: &[crate::graph::Pattern] = if settings.are_linear_acidic_sugars_detected() {
        LINEAR_ACIDIC_SUGAR_PATTERNS.as_slice()
    } else {
        &[]
    };
    let mut library: Vec<(&crate::graph::Pattern, bool)> = LINEAR_SUGAR_PATTERNS
        .iter()
        .map(|pattern| (pattern, false))
        .chain(acidic.iter().map(|pattern| (pattern, true)))
        .collect();
    library.sort_by_key(|(pattern, _)| std::cmp::Reverse(pattern.size()));
    for (pattern, is_acidic) in library {
        for found in pattern.unique_matches(molecule) {
            if is_acidic {
                acidic_atoms.extend(found.atoms.iter().copied());
            }
            candidates.push(CandidateGraph {
                atoms: found.atoms,
                bonds: found.bonds,
            });
        }
    }
    (candidates, acidic_atoms)
}

/// Merge all overlapping matches into connected, non-overlapping candidates.
/// The merged structures can grow very big; that is dealt with in the
/// splitting step.
fn combine_overlapping(molecule: &Molecule, candidates: Vec<CandidateGraph>) -> Vec<CandidateGraph> {
    let mut union = CandidateGraph {
        atoms: BTreeSet::new(),
        bonds: BTreeSet::new(),
    };
    for candidate in candidates {
        union.atoms.extend(candidate.atoms);
        union.bonds.extend(candidate.bonds);
    }
    union.components(molecule)
}

/// Split all ether, ester, and peroxide bonds within the candidates and
/// separate the parts that get disconnected. Merged candidates often span
/// several sugar units strung together through such linkages; each unit
/// should be judged on its own. Ring bonds of the candidate are protected.
/// Esters have to be processed before ethers because the ether motif also
/// matches esters.
fn split_ether_ester_peroxide_bonds(
    molecule: &Molecule,
    candidates: Vec<CandidateGraph>,
) -> Vec<CandidateGraph> {
    let mut processed = Vec::with_capacity(candidates.len() * 2);
    for mut candidate in candidates {
        split_esters(molecule, &mut candidate);
        split_ethers(molecule, &mut candidate);
        split_peroxides(molecule, &mut candidate);
        processed.extend(candidate.components(molecule));
    }
    processed
}

/// Ring atoms of the candidate subgraph, i.e. atoms on a cycle formed by
/// candidate bonds.
fn candidate_ring_atoms(molecule: &Molecule, candidate: &CandidateGraph) -> BTreeSet<usize> {
    cyclic_bonds_of_subgraph(molecule, &candidate.bonds)
        .iter()
        .flat_map(|&bond_index| {
            let bond = molecule.bond(bond_index);
            [bond.begin, bond.end]
        })
        .collect()
}

/// Cut `C(=O)-O-C` motifs between the carbonyl carbon and the connecting
/// oxygen.
fn split_esters(molecule: &Molecule, candidate: &mut CandidateGraph) {
    let ring_atoms = candidate_ring_atoms(molecule, candidate);
    let mut cuts = BTreeSet::new();
    for &carbon in &candidate.atoms {
        if !molecule.atom(carbon).is_carbon() {
            continue;
        }
        let mut keto = false;
        let mut connecting: Option<(usize, usize)> = None;
        for (neighbor, bond_index) in molecule.bonds_of(carbon) {
            if !candidate.bonds.contains(&bond_index) || !molecule.atom(neighbor).is_oxygen() {
                continue;
            }
            match molecule.bond(bond_index).order {
                BondOrder::Double => keto = true,
                BondOrder::Single if !ring_atoms.contains(&neighbor) => {
                    // the connecting oxygen must bind another carbon of the
                    // candidate
                    let onwards = molecule.bonds_of(neighbor).any(|(partner, partner_bond)| {
                        partner != carbon
                            && candidate.bonds.contains(&partner_bond)
                            && molecule.atom(partner).is_carbon()
                            && molecule.bond(partner_bond).order == BondOrder::Single
                    });
                    if onwards {
                        connecting = Some((neighbor, bond_index));
                    }
                }
                _ => {}
            }
        }
        if keto {
            if let Some((_, bond_index)) = connecting {
                cuts.insert(bond_index);
            }
        }
    }
    for cut in cuts {
        candidate.bonds.remove(&cut);
    }
}

/// Cut `C-O-C` motifs; of the two carbon bonds, the one to the higher-index
/// carbon is removed.
fn split_ethers(molecule: &Molecule, candidate: &mut CandidateGraph) {
    let ring_atoms = candidate_ring_atoms(molecule, candidate);
    let mut cuts = BTreeSet::new();
    for &oxygen in &candidate.atoms {
        if !molecule.atom(oxygen).is_oxygen() || ring_atoms.contains(&oxygen) {
            continue;
        }
        let carbons: Vec<(usize, usize)> = molecule
            .bonds_of(oxygen)
            .filter(|&(neighbor, bond_index)| {
                candidate.bonds.contains(&bond_index)
                    && !cuts.contains(&bond_index)
                    && molecule.atom(neighbor).is_carbon()
                    && molecule.bond(bond_index).order == BondOrder::Single
            })
            .collect();
        if carbons.len() >= 2 {
            let (_, bond_index) = carbons
                .iter()
                .copied()
                .max_by_key(|&(neighbor, _)| neighbor)
                .unwrap_or(carbons[0]);
            cuts.insert(bond_index);
        }
    }
    for cut in cuts {
        candidate.bonds.remove(&cut);
    }
}

/// Cut `C-O-O-C` motifs at the oxygen-oxygen bond.
fn split_peroxides(molecule: &Molecule, candidate: &mut CandidateGraph) {
    let ring_atoms = candidate_ring_atoms(molecule, candidate);
    let mut cuts = BTreeSet::new();
    for &bond_index in &candidate.bonds {
        let bond = molecule.bond(bond_index);
        if bond.order != BondOrder::Single
            || !molecule.atom(bond.begin).is_oxygen()
            || !molecule.atom(bond.end).is_oxygen()
            || ring_atoms.contains(&bond.begin)
            || ring_atoms.contains(&bond.end)
        {
            continue;
        }
        let flanked_by_carbons = [bond.begin, bond.end].into_iter().all(|oxygen| {
            molecule.bonds_of(oxygen).any(|(neighbor, neighbor_bond)| {
                neighbor_bond != bond_index
                    && candidate.bonds.contains(&neighbor_bond)
                    && molecule.atom(neighbor).is_carbon()
            })
        });
        if flanked_by_carbons {
            cuts.insert(bond_index);
        }
    }
    for cut in cuts {
        candidate.bonds.remove(&cut);
    }
}

/// Remove the atoms of potential circular sugars from the candidates so
/// circular and linear sugars stay separate; the linear patterns also match
/// parts of sugar rings. Disconnected leftovers become candidates of their
/// own.
fn remove_circular_sugar_atoms(molecule: &Molecule, candidates: &mut Vec<CandidateGraph>) {
    let circular_atoms: BTreeSet<usize> = potential_sugar_cycles(molecule, true, true)
        .into_iter()
        .flat_map(|cycle| cycle.atoms)
        .collect();
    if circular_atoms.is_empty() {
        return;
    }
    strip_atoms(molecule, candidates, |atom| !circular_atoms.contains(&atom));
}

/// Remove every cyclic atom from the candidates. Linear sugar patterns also
/// match in plain carbocycles, pseudo-sugars, and macrocycles; whether those
/// should be reported is a setting.
fn remove_cyclic_atoms(molecule: &Molecule, candidates: &mut Vec<CandidateGraph>) {
    let rings = RingSearch::new(molecule);
    if !rings.has_rings() {
        return;
    }
    strip_atoms(molecule, candidates, |atom| !rings.is_cyclic_atom(atom));
}

fn strip_atoms(
    molecule: &Molecule,
    candidates: &mut Vec<CandidateGraph>,
    keep: impl Fn(usize) -> bool,
) {
    let mut stripped = Vec::with_capacity(candidates.len());
    for candidate in candidates.drain(..) {
        let mut candidate = candidate;
        candidate.retain_atoms(molecule, &keep);
        if candidate.atoms.is_empty() {
            continue;
        }
        stripped.extend(candidate.components(molecule));
    }
    *candidates = stripped;
}
