//! Handle ring perception.
//!
//! Rings are found through biconnected components: every cyclic component of
//! the graph is either a single simple cycle (an "isolated ring") or a fused
//! system of several rings sharing bonds. Two rings that share exactly one
//! atom (a spiro junction) end up in two different components meeting at a
//! cut vertex, which is exactly the classification the sugar detection rules
//! need.

use std::collections::BTreeSet;

use crate::chemistry::Molecule;

/// One cyclic part of a molecule.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RingSystem {
    /// The atoms of this ring system.
    pub atoms: BTreeSet<usize>,
    /// The bonds of this ring system.
    pub bonds: BTreeSet<usize>,
    /// Whether this system is one simple cycle (as opposed to a fused system
    /// of several rings sharing bonds).
    pub is_simple_cycle: bool,
}

/// The rings of one molecule, computed once and queried many times.
#[derive(Clone, Debug)]
pub struct RingSearch {
    cyclic_atoms: Vec<bool>,
    cyclic_bonds: Vec<bool>,
    systems: Vec<RingSystem>,
    /// Number of cyclic systems each atom belongs to; 2 or more marks a spiro
    /// junction.
    membership: Vec<u8>,
}

impl RingSearch {
    /// Perceive the rings of the given molecule.
    pub fn new(molecule: &Molecule) -> Self {
        let components = biconnected_components(molecule);
        let mut cyclic_atoms = vec![false; molecule.atom_count()];
        let mut cyclic_bonds = vec![false; molecule.bond_count()];
        let mut membership = vec![0u8; molecule.atom_count()];
        let mut systems = Vec::new();
        for edges in components {
            if edges.len() < 2 {
                continue;
            }
            let mut atoms = BTreeSet::new();
            let mut bonds = BTreeSet::new();
            for &bond_index in &edges {
                let bond = molecule.bond(bond_index);
                atoms.insert(bond.begin);
                atoms.insert(bond.end);
                bonds.insert(bond_index);
                cyclic_bonds[bond_index] = true;
            }
            for &atom in &atoms {
                cyclic_atoms[atom] = true;
                membership[atom] = membership[atom].saturating_add(1);
            }
            let is_simple_cycle = bonds.len() == atoms.len();
            systems.push(RingSystem {
                atoms,
                bonds,
                is_simple_cycle,
            });
        }
        Self {
            cyclic_atoms,
            cyclic_bonds,
            systems,
            membership,
        }
    }

    /// Whether the given atom is part of any ring.
    pub fn is_cyclic_atom(&self, atom: usize) -> bool {
        self.cyclic_atoms[atom]
    }

    /// Whether the given bond is part of any ring.
    pub fn is_cyclic_bond(&self, bond: usize) -> bool {
        self.cyclic_bonds[bond]
    }

    /// Whether the molecule contains any ring at all.
    pub fn has_rings(&self) -> bool {
        !self.systems.is_empty()
    }

    /// All cyclic systems.
    pub fn systems(&self) -> &[RingSystem] {
        &self.systems
    }

    /// The isolated rings, i.e. cyclic systems that are one simple cycle.
    /// Spiro rings are isolated in this sense; rings sharing a bond are not.
    pub fn isolated_rings(&self) -> impl Iterator<Item = &RingSystem> {
        self.systems.iter().filter(|system| system.is_simple_cycle)
    }

    /// Whether the given atom connects two ring systems as a spiro junction.
    pub fn is_spiro_atom(&self, atom: usize) -> bool {
        self.membership[atom] >= 2
    }
}

/// The biconnected components of the molecule as sets of bond indices.
fn biconnected_components(molecule: &Molecule) -> Vec<Vec<usize>> {
    struct State<'m> {
        molecule: &'m Molecule,
        discovery: Vec<usize>,
        low: Vec<usize>,
        time: usize,
        edge_stack: Vec<usize>,
        components: Vec<Vec<usize>>,
    }

    fn visit(state: &mut State<'_>, atom: usize, parent_bond: Option<usize>) {
        state.time += 1;
        state.discovery[atom] = state.time;
        state.low[atom] = state.time;
        let neighbors: Vec<(usize, usize)> = state.molecule.bonds_of(atom).collect();
        for (neighbor, bond) in neighbors {
            if Some(bond) == parent_bond {
                continue;
            }
            if state.discovery[neighbor] == 0 {
                state.edge_stack.push(bond);
                visit(state, neighbor, Some(bond));
                state.low[atom] = state.low[atom].min(state.low[neighbor]);
                if state.low[neighbor] >= state.discovery[atom] {
                    let mut component = Vec::new();
                    while let Some(edge) = state.edge_stack.pop() {
                        component.push(edge);
                        if edge == bond {
                            break;
                        }
                    }
                    state.components.push(component);
                }
            } else if state.discovery[neighbor] < state.discovery[atom] {
                state.edge_stack.push(bond);
                state.low[atom] = state.low[atom].min(state.discovery[neighbor]);
            }
        }
    }

    let mut state = State {
        molecule,
        discovery: vec![0; molecule.atom_count()],
        low: vec![0; molecule.atom_count()],
        time: 0,
        edge_stack: Vec::new(),
        components: Vec::new(),
    };
    for atom in 0..molecule.atom_count() {
        if state.discovery[atom] == 0 {
            visit(&mut state, atom, None);
        }
    }
    state.components
}

/// The bonds of the given subgraph that lie on a cycle within that subgraph.
/// Used to protect ring bonds while cutting ether, ester, and peroxide
/// linkages inside a sugar candidate.
pub fn cyclic_bonds_of_subgraph(molecule: &Molecule, bonds: &BTreeSet<usize>) -> BTreeSet<usize> {
    // bridge detection restricted to the subgraph; a bond is cyclic iff it is
    // not a bridge
    let n = molecule.atom_count();
    let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
    for &bond_index in bonds {
        let bond = molecule.bond(bond_index);
        adjacency[bond.begin].push((bond.end, bond_index));
        adjacency[bond.end].push((bond.begin, bond_index));
    }

    struct State {
        adjacency: Vec<Vec<(usize, usize)>>,
        discovery: Vec<usize>,
        low: Vec<usize>,
        time: usize,
        bridges: BTreeSet<usize>,
    }

    fn visit(state: &mut State, atom: usize, parent_bond: Option<usize>) {
        state.time += 1;
        state.discovery[atom] = state.time;
        state.low[atom] = state.time;
        let neighbors = state.adjacency[atom].clone();
        for (neighbor, bond) in neighbors {
            if Some(bond) == parent_bond {
                continue;
            }
            if state.discovery[neighbor] == 0 {
                visit(state, neighbor, Some(bond));
                state.low[atom] = state.low[atom].min(state.low[neighbor]);
                if state.low[neighbor] > state.discovery[atom] {
                    state.bridges.insert(bond);
                }
            } else {
                state.low[atom] = state.low[atom].min(state.discovery[neighbor]);
            }
        }
    }

    let mut state = State {
        adjacency,
        discovery: vec![0; n],
        low: vec![0; n],
        time: 0,
        bridges: BTreeSet::new(),
    };
    for atom in 0..n {
        if state.discovery[atom] == 0 && !state.adjacency[atom].is_empty() {
            visit(&mut state, atom, None);
        }
    }
    bonds.iter().copied().filter(|bond| !state.bridges.contains(bond)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    #[test]
    fn pyranose_is_one_isolated_ring() {
        let molecule = parse_smiles("OC1OC(CO)C(O)C(O)C1O").unwrap();
        let rings = RingSearch::new(&molecule);
        assert_eq!(rings.systems().len(), 1);
        assert_eq!(rings.isolated_rings().count(), 1);
        let ring = rings.isolated_rings().next().unwrap();
        assert_eq!(ring.atoms.len(), 6);
        assert!(!(0..molecule.atom_count()).any(|atom| rings.is_spiro_atom(atom)));
    }

    #[test]
    fn fused_rings_are_one_system() {
        // decalin
        let molecule = parse_smiles("C1CCC2CCCCC2C1").unwrap();
        let rings = RingSearch::new(&molecule);
        assert_eq!(rings.systems().len(), 1);
        assert!(!rings.systems()[0].is_simple_cycle);
        assert_eq!(rings.isolated_rings().count(), 0);
    }

    #[test]
    fn spiro_rings_are_two_isolated_systems() {
        // spiro[4.5]decane
        let molecule = parse_smiles("C1CCC2(C1)CCCCC2").unwrap();
        let rings = RingSearch::new(&molecule);
        assert_eq!(rings.isolated_rings().count(), 2);
        let spiro_atoms: Vec<usize> = (0..molecule.atom_count())
            .filter(|&atom| rings.is_spiro_atom(atom))
            .collect();
        assert_eq!(spiro_atoms.len(), 1);
        assert_eq!(molecule.degree(spiro_atoms[0]), 4);
    }

    #[test]
    fn acyclic_molecule_has_no_rings() {
        let molecule = parse_smiles("CCCCO").unwrap();
        let rings = RingSearch::new(&molecule);
        assert!(!rings.has_rings());
        assert!(!(0..molecule.atom_count()).any(|atom| rings.is_cyclic_atom(atom)));
    }

    #[test]
    fn subgraph_cycle_detection_spares_bridges() {
        let molecule = parse_smiles("C1CC1CCC1CC1").unwrap();
        let all: BTreeSet<usize> = (0..molecule.bond_count()).collect();
        let cyclic = cyclic_bonds_of_subgraph(&molecule, &all);
        // the two cyclopropane rings are cyclic, the connecting chain is not
        assert_eq!(cyclic.len(), 6);
    }
}
