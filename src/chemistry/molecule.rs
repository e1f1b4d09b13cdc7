//! Handle the molecule arena.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::chemistry::{Atom, Bond, BondOrder, DoubleBondStereo, Element, TetrahedralStereo};
use crate::errors::SugarRemovalError;

/// A molecular graph. Atoms and bonds are stored in flat arrays; all
/// references to them (neighbour lists, stereo descriptors, ring systems,
/// sugar candidates) are plain indices. Indices are stable until atoms or
/// bonds are removed; removal operations return an old-to-new mapping so that
/// external index collections can be carried across.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    /// adjacency[atom] = (neighbour atom, bond index) pairs
    adjacency: Vec<Vec<(usize, usize)>>,
    tetrahedral: Vec<TetrahedralStereo>,
    double_bond_stereo: Vec<DoubleBondStereo>,
}

/// The index mapping produced by a removal operation, `None` for entries that
/// were removed.
#[derive(Clone, Debug)]
pub struct RemovalMap {
    /// Old atom index to new atom index.
    pub atoms: Vec<Option<usize>>,
    /// Old bond index to new bond index.
    pub bonds: Vec<Option<usize>>,
}

impl Molecule {
    /// Create an empty molecule.
    pub const fn new() -> Self {
        Self {
            atoms: Vec::new(),
            bonds: Vec::new(),
            adjacency: Vec::new(),
            tetrahedral: Vec::new(),
            double_bond_stereo: Vec::new(),
        }
    }

    /// Build a molecule from parts, creating the adjacency lists.
    ///
    /// # Panics
    /// If a bond references a non-existent atom.
    pub fn from_parts(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (index, bond) in bonds.iter().enumerate() {
            assert!(
                bond.begin < atoms.len() && bond.end < atoms.len(),
                "bond references a non-existent atom"
            );
            adjacency[bond.begin].push((bond.end, index));
            adjacency[bond.end].push((bond.begin, index));
        }
        Self {
            atoms,
            bonds,
            adjacency,
            tetrahedral: Vec::new(),
            double_bond_stereo: Vec::new(),
        }
    }

    /// The number of atoms.
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// The number of bonds.
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Whether this molecule has no atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// The atom at the given index.
    pub fn atom(&self, index: usize) -> &Atom {
        &self.atoms[index]
    }

    /// Mutable access to the atom at the given index.
    pub fn atom_mut(&mut self, index: usize) -> &mut Atom {
        &mut self.atoms[index]
    }

    /// All atoms in index order.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// The bond at the given index.
    pub fn bond(&self, index: usize) -> &Bond {
        &self.bonds[index]
    }

    /// All bonds in index order.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Append an atom and return its index.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.adjacency.push(Vec::new());
        self.atoms.len() - 1
    }

    /// Append a bond and return its index.
    ///
    /// # Panics
    /// If the bond references a non-existent atom.
    pub fn add_bond(&mut self, bond: Bond) -> usize {
        assert!(
            bond.begin < self.atoms.len() && bond.end < self.atoms.len(),
            "bond references a non-existent atom"
        );
        let index = self.bonds.len();
        self.adjacency[bond.begin].push((bond.end, index));
        self.adjacency[bond.end].push((bond.begin, index));
        self.bonds.push(bond);
        index
    }

    /// The neighbouring atoms of the given atom.
    pub fn neighbors(&self, atom: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[atom].iter().map(|&(neighbor, _)| neighbor)
    }

    /// The (neighbour atom, bond index) pairs of the given atom.
    pub fn bonds_of(&self, atom: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency[atom].iter().copied()
    }

    /// The number of explicit bonds of the given atom.
    pub fn degree(&self, atom: usize) -> usize {
        self.adjacency[atom].len()
    }

    /// The index of the bond between the two atoms, if there is one.
    pub fn bond_between(&self, a: usize, b: usize) -> Option<usize> {
        self.adjacency[a]
            .iter()
            .find(|&&(neighbor, _)| neighbor == b)
            .map(|&(_, bond)| bond)
    }

    /// The number of heavy atoms (anything but hydrogen and pseudo-atoms),
    /// counting implicit hydrogens as nothing.
    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|atom| atom.is_heavy()).count()
    }

    /// The molecular weight in Dalton, implicit hydrogens included.
    pub fn molecular_weight(&self) -> f64 {
        self.atoms
            .iter()
            .map(|atom| {
                atom.element.atomic_weight()
                    + f64::from(atom.implicit_hydrogens) * Element::H.atomic_weight()
            })
            .sum()
    }

    /// The connected components as sorted atom index sets.
    pub fn components(&self) -> Vec<BTreeSet<usize>> {
        let mut seen = vec![false; self.atoms.len()];
        let mut components = Vec::new();
        for start in 0..self.atoms.len() {
            if seen[start] {
                continue;
            }
            let mut component = BTreeSet::new();
            let mut queue = VecDeque::from([start]);
            seen[start] = true;
            while let Some(current) = queue.pop_front() {
                component.insert(current);
                for neighbor in self.neighbors(current) {
                    if !seen[neighbor] {
                        seen[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }
            components.push(component);
        }
        components
    }

    /// Whether this molecule consists of at most one connected structure. The
    /// empty molecule counts as connected.
    pub fn is_connected(&self) -> bool {
        self.components().len() <= 1
    }

    /// Remove the given atoms (and every bond touching them), compacting the
    /// arrays. Stereo descriptors that lose a carrier are dropped. Returns the
    /// old-to-new index mapping.
    pub fn remove_atoms(&mut self, to_remove: &BTreeSet<usize>) -> RemovalMap {
        let mut atom_map = vec![None; self.atoms.len()];
        let mut kept_atoms = Vec::with_capacity(self.atoms.len() - to_remove.len());
        for (index, atom) in self.atoms.iter().enumerate() {
            if !to_remove.contains(&index) {
                atom_map[index] = Some(kept_atoms.len());
                kept_atoms.push(*atom);
            }
        }
        let mut bond_map = vec![None; self.bonds.len()];
        let mut kept_bonds = Vec::with_capacity(self.bonds.len());
        for (index, bond) in self.bonds.iter().enumerate() {
            if let (Some(begin), Some(end)) = (atom_map[bond.begin], atom_map[bond.end]) {
                bond_map[index] = Some(kept_bonds.len());
                kept_bonds.push(Bond { begin, end, ..*bond });
            }
        }
        self.atoms = kept_atoms;
        self.bonds = kept_bonds;
        self.rebuild_adjacency();
        self.tetrahedral = self
            .tetrahedral
            .iter()
            .filter_map(|stereo| stereo.remap(&atom_map))
            .collect();
        self.double_bond_stereo = self
            .double_bond_stereo
            .iter()
            .filter_map(|stereo| stereo.remap(&atom_map))
            .collect();
        RemovalMap {
            atoms: atom_map,
            bonds: bond_map,
        }
    }

    /// Remove the given bonds, compacting the bond array. Double-bond stereo
    /// descriptors referencing a removed bond or reference substituent bond
    /// are dropped. Returns the old-to-new bond index mapping.
    pub fn remove_bonds(&mut self, to_remove: &BTreeSet<usize>) -> Vec<Option<usize>> {
        let mut bond_map = vec![None; self.bonds.len()];
        let mut kept_bonds = Vec::with_capacity(self.bonds.len() - to_remove.len());
        for (index, bond) in self.bonds.iter().enumerate() {
            if !to_remove.contains(&index) {
                bond_map[index] = Some(kept_bonds.len());
                kept_bonds.push(*bond);
            }
        }
        let removed: Vec<Bond> = to_remove.iter().map(|&index| self.bonds[index]).collect();
        self.bonds = kept_bonds;
        self.rebuild_adjacency();
        self.double_bond_stereo.retain(|stereo| {
            !removed.iter().any(|bond| {
                stereo.is_on_bond(bond.begin, bond.end)
                    || (bond.connects(stereo.begin, stereo.begin_reference))
                    || (bond.connects(stereo.end, stereo.end_reference))
            })
        });
        bond_map
    }

    /// The subgraph induced by the given atoms (all bonds between them).
    /// Returns the new molecule and the new-to-old atom index mapping. Stereo
    /// descriptors fully contained in the subgraph are carried over.
    pub fn induced_subgraph(&self, atoms: &BTreeSet<usize>) -> (Self, Vec<usize>) {
        let mut copy = self.clone();
        let to_remove: BTreeSet<usize> = (0..self.atoms.len())
            .filter(|index| !atoms.contains(index))
            .collect();
        let map = copy.remove_atoms(&to_remove);
        let mut new_to_old = vec![0; copy.atom_count()];
        for (old, new) in map.atoms.iter().enumerate() {
            if let Some(new) = new {
                new_to_old[*new] = old;
            }
        }
        (copy, new_to_old)
    }

    /// Append all atoms, bonds, and stereo descriptors of another molecule as
    /// a disconnected part of this one. Returns the atom index offset of the
    /// appended part.
    pub fn disjoint_union(&mut self, other: &Self) -> usize {
        let atom_offset = self.atoms.len();
        let bond_offset = self.bonds.len();
        self.atoms.extend_from_slice(&other.atoms);
        for bond in &other.bonds {
            self.bonds.push(Bond {
                begin: bond.begin + atom_offset,
                end: bond.end + atom_offset,
                ..*bond
            });
        }
        for neighbors in &other.adjacency {
            self.adjacency.push(
                neighbors
                    .iter()
                    .map(|&(neighbor, bond)| (neighbor + atom_offset, bond + bond_offset))
                    .collect(),
            );
        }
        let identity: Vec<Option<usize>> = (0..other.atoms.len())
            .map(|index| Some(index + atom_offset))
            .collect();
        self.tetrahedral.extend(
            other
                .tetrahedral
                .iter()
                .filter_map(|stereo| stereo.remap(&identity)),
        );
        self.double_bond_stereo.extend(
            other
                .double_bond_stereo
                .iter()
                .filter_map(|stereo| stereo.remap(&identity)),
        );
        atom_offset
    }

    /// Fill the open valences of the given atoms with implicit hydrogens. The
    /// target valence is the smallest accepted valence of the (charge
    /// adjusted) element that accommodates the existing bonds.
    ///
    /// # Errors
    /// If one of the atoms is of an element without a valence model.
    pub fn saturate(&mut self, atoms: &[usize]) -> Result<(), SugarRemovalError> {
        for &index in atoms {
            let atom = self.atoms[index];
            if atom.is_pseudo() {
                continue;
            }
            let valences = effective_valences(atom.element, atom.formal_charge)
                .ok_or(SugarRemovalError::UnsupportedElement {
                    element: atom.element,
                })?;
            let mut used: u8 = self
                .bonds_of(index)
                .map(|(_, bond)| self.bonds[bond].order.numeric())
                .sum();
            if atom.aromatic {
                // one electron sits in the pi system
                used += 1;
            }
            let target = valences
                .iter()
                .copied()
                .find(|&valence| valence >= used)
                .unwrap_or_else(|| valences.last().copied().unwrap_or(0));
            self.atoms[index].implicit_hydrogens = target.saturating_sub(used);
        }
        Ok(())
    }

    /// The tetrahedral stereo descriptors.
    pub fn tetrahedral_stereo(&self) -> &[TetrahedralStereo] {
        &self.tetrahedral
    }

    /// Mutable access to the tetrahedral stereo descriptors.
    pub fn tetrahedral_stereo_mut(&mut self) -> &mut Vec<TetrahedralStereo> {
        &mut self.tetrahedral
    }

    /// The double-bond stereo descriptors.
    pub fn double_bond_stereo(&self) -> &[DoubleBondStereo] {
        &self.double_bond_stereo
    }

    /// Mutable access to the double-bond stereo descriptors.
    pub fn double_bond_stereo_mut(&mut self) -> &mut Vec<DoubleBondStereo> {
        &mut self.double_bond_stereo
    }

    /// Drop all stereo descriptors.
    pub fn clear_stereo(&mut self) {
        self.tetrahedral.clear();
        self.double_bond_stereo.clear();
    }

    /// The sum of the bond orders over all bonds between heavy atoms.
    pub fn bond_order_sum(&self) -> u32 {
        self.bonds
            .iter()
            .filter(|bond| self.atoms[bond.begin].is_heavy() && self.atoms[bond.end].is_heavy())
            .map(|bond| u32::from(bond.order.numeric()))
            .sum()
    }

    fn rebuild_adjacency(&mut self) {
        self.adjacency = vec![Vec::new(); self.atoms.len()];
        for (index, bond) in self.bonds.iter().enumerate() {
            self.adjacency[bond.begin].push((bond.end, index));
            self.adjacency[bond.end].push((bond.begin, index));
        }
    }
}

/// The accepted valences of an element carrying the given formal charge,
/// smallest first, or `None` if no valence model applies.
pub(crate) fn effective_valences(element: Element, charge: i8) -> Option<&'static [u8]> {
    match (element, charge) {
        (_, 0) => element.default_valences(),
        (Element::N | Element::P, 1) => Some(&[4]),
        (Element::N, -1) | (Element::O | Element::S, 1) => Some(&[3]),
        (Element::O | Element::S, -1) => Some(&[1]),
        (Element::C, 1 | -1) => Some(&[3]),
        (Element::B, -1) => Some(&[4]),
        _ => element.default_valences(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ethanol() -> Molecule {
        let mut molecule = Molecule::new();
        let c1 = molecule.add_atom(Atom::new(Element::C));
        let c2 = molecule.add_atom(Atom::new(Element::C));
        let o = molecule.add_atom(Atom::new(Element::O));
        molecule.add_bond(Bond::new(c1, c2, BondOrder::Single));
        molecule.add_bond(Bond::new(c2, o, BondOrder::Single));
        molecule.saturate(&[c1, c2, o]).unwrap();
        molecule
    }

    #[test]
    fn saturation_fills_open_valences() {
        let molecule = ethanol();
        assert_eq!(molecule.atom(0).implicit_hydrogens, 3);
        assert_eq!(molecule.atom(1).implicit_hydrogens, 2);
        assert_eq!(molecule.atom(2).implicit_hydrogens, 1);
    }

    #[test]
    fn atom_removal_remaps_indices() {
        let mut molecule = ethanol();
        let map = molecule.remove_atoms(&BTreeSet::from([1]));
        assert_eq!(molecule.atom_count(), 2);
        assert_eq!(molecule.bond_count(), 0);
        assert_eq!(map.atoms, vec![Some(0), None, Some(1)]);
        assert!(!molecule.is_connected());
        assert_eq!(molecule.components().len(), 2);
    }

    #[test]
    fn unsupported_element_is_reported() {
        let mut molecule = Molecule::new();
        let iron = molecule.add_atom(Atom::new(Element::Fe));
        assert_eq!(
            molecule.saturate(&[iron]),
            Err(SugarRemovalError::UnsupportedElement {
                element: Element::Fe
            })
        );
    }
}
