//! Handle SMILES generation.
//!
//! The writer assigns Morgan-style canonical ranks (iterative neighbourhood
//! refinement with deterministic tie splitting) and emits the molecule in a
//! rank-guided depth-first traversal, so equal structures built in the same
//! atom order always serialise identically. Stereo descriptors are not
//! emitted; structural comparisons in this crate go through graph
//! isomorphism instead.

use crate::chemistry::{BondOrder, Element, Molecule, effective_valences};

impl Molecule {
    /// Serialise this molecule to SMILES. Disconnected parts are joined with
    /// `.`, attachment-point pseudo-atoms are written as `*`.
    pub fn to_smiles(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let ranks = canonical_ranks(self);
        let closures = precompute_ring_closures(self, &ranks);
        let mut visited = vec![false; self.atom_count()];
        let mut output = String::new();
        loop {
            let Some(start) = (0..self.atom_count())
                .filter(|&atom| !visited[atom])
                .min_by_key(|&atom| (ranks[atom], atom))
            else {
                break;
            };
            if !output.is_empty() {
                output.push('.');
            }
            emit(self, start, None, &ranks, &mut visited, &closures, &mut output);
        }
        output
    }
}

/// Ring closure digits to write at each atom: (label, order, is opening side).
struct RingClosures {
    per_atom: Vec<Vec<(usize, BondOrder, bool)>>,
}

fn canonical_ranks(molecule: &Molecule) -> Vec<u64> {
    let n = molecule.atom_count();
    let mut invariants: Vec<u64> = (0..n)
        .map(|index| {
            let atom = molecule.atom(index);
            (u64::from(atom.element.atomic_number()) << 40)
                | ((molecule.degree(index) as u64) << 32)
                | (u64::from(atom.implicit_hydrogens) << 24)
                | (((i64::from(atom.formal_charge) + 128) as u64) << 16)
                | (u64::from(atom.isotope.unwrap_or(0)) << 1)
                | u64::from(atom.aromatic)
        })
        .collect();
    loop {
        invariants = refine(molecule, invariants);
        let mut ranks = to_ranks(&invariants);
        let distinct = {
            let mut sorted = ranks.clone();
            sorted.sort_unstable();
            sorted.dedup();
            sorted.len()
        };
        if distinct == n {
            return ranks;
        }
        // split the lowest tied class deterministically and refine again
        let tied = (0..n)
            .filter(|&atom| ranks.iter().filter(|&&r| r == ranks[atom]).count() > 1)
            .min_by_key(|&atom| (ranks[atom], atom));
        match tied {
            Some(chosen) => {
                for rank in &mut ranks {
                    *rank *= 2;
                }
                ranks[chosen] -= 1;
                invariants = ranks;
            }
            None => return ranks,
        }
    }
}

fn refine(molecule: &Molecule, mut invariants: Vec<u64>) -> Vec<u64> {
    let n = molecule.atom_count();
    let mut distinct_before = count_distinct(&invariants);
    for _ in 0..n {
        let mut next = Vec::with_capacity(n);
        for index in 0..n {
            let mut combined = invariants[index].wrapping_mul(1_000_003);
            let mut neighbor_values: Vec<u64> = molecule
                .bonds_of(index)
                .map(|(neighbor, bond)| {
                    invariants[neighbor]
                        .wrapping_mul(31)
                        .wrapping_add(molecule.bond(bond).order as u64 + 1)
                })
                .collect();
            neighbor_values.sort_unstable();
            for value in neighbor_values {
                combined = combined.wrapping_mul(1_000_003).wrapping_add(value);
            }
            next.push(combined);
        }
        let distinct_after = count_distinct(&next);
        if distinct_after <= distinct_before {
            break;
        }
        distinct_before = distinct_after;
        invariants = next;
    }
    invariants
}

fn to_ranks(invariants: &[u64]) -> Vec<u64> {
    let mut indexed: Vec<(u64, usize)> = invariants
        .iter()
        .copied()
        .enumerate()
        .map(|(index, value)| (value, index))
        .collect();
    indexed.sort_unstable();
    let mut ranks = vec![0u64; invariants.len()];
    let mut rank = 0;
    for window in 0..indexed.len() {
        if window > 0 && indexed[window].0 != indexed[window - 1].0 {
            rank += 1;
        }
        ranks[indexed[window].1] = rank;
    }
    ranks
}

fn count_distinct(values: &[u64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

fn precompute_ring_closures(molecule: &Molecule, ranks: &[u64]) -> RingClosures {
    let n = molecule.atom_count();
    let mut visited = vec![false; n];
    let mut used_bonds = vec![false; molecule.bond_count()];
    let mut per_atom = vec![Vec::new(); n];
    let mut next_label = 1;
    loop {
        let Some(start) = (0..n)
            .filter(|&atom| !visited[atom])
            .min_by_key(|&atom| (ranks[atom], atom))
        else {
            break;
        };
        closure_dfs(
            molecule,
            start,
            None,
            ranks,
            &mut visited,
            &mut used_bonds,
            &mut per_atom,
            &mut next_label,
        );
    }
    RingClosures { per_atom }
}

#[expect(clippy::too_many_arguments)]
fn closure_dfs(
    molecule: &Molecule,
    atom: usize,
    from: Option<usize>,
    ranks: &[u64],
    visited: &mut [bool],
    used_bonds: &mut [bool],
    per_atom: &mut [Vec<(usize, BondOrder, bool)>],
    next_label: &mut usize,
) {
    visited[atom] = true;
    let mut neighbors: Vec<(usize, usize)> = molecule
        .bonds_of(atom)
        .filter(|&(neighbor, _)| Some(neighbor) != from)
        .collect();
    neighbors.sort_by_key(|&(neighbor, _)| (ranks[neighbor], neighbor));
    for (neighbor, bond_index) in neighbors {
        if visited[neighbor] {
            if !used_bonds[bond_index] {
                used_bonds[bond_index] = true;
                let order = molecule.bond(bond_index).order;
                let label = *next_label;
                *next_label += 1;
                per_atom[neighbor].push((label, order, true));
                per_atom[atom].push((label, order, false));
            }
        } else {
            closure_dfs(
                molecule,
                neighbor,
                Some(atom),
                ranks,
                visited,
                used_bonds,
                per_atom,
                next_label,
            );
        }
    }
}

fn emit(
    molecule: &Molecule,
    atom: usize,
    from: Option<usize>,
    ranks: &[u64],
    visited: &mut [bool],
    closures: &RingClosures,
    output: &mut String,
) {
    visited[atom] = true;
    write_atom(molecule, atom, output);
    let mut digits = closures.per_atom[atom].clone();
    digits.sort_by_key(|&(label, _, _)| label);
    for (label, order, opening) in digits {
        if opening {
            write_bond_symbol(order, false, output);
        }
        if label < 10 {
            output.push(char::from(b'0' + label as u8));
        } else {
            output.push('%');
            output.push_str(&label.to_string());
        }
    }
    let mut neighbors: Vec<(usize, usize)> = molecule
        .bonds_of(atom)
        .filter(|&(neighbor, _)| Some(neighbor) != from)
        .collect();
    neighbors.sort_by_key(|&(neighbor, _)| (ranks[neighbor], neighbor));
    for position in 0..neighbors.len() {
        let (neighbor, bond_index) = neighbors[position];
        if visited[neighbor] {
            continue;
        }
        let has_more = neighbors[position + 1..]
            .iter()
            .any(|&(later, _)| !visited[later]);
        let bond = molecule.bond(bond_index);
        let aromatic_pair =
            molecule.atom(atom).aromatic && molecule.atom(neighbor).aromatic && !bond.aromatic;
        if has_more {
            output.push('(');
            write_bond_symbol(bond.order, aromatic_pair, output);
            emit(molecule, neighbor, Some(atom), ranks, visited, closures, output);
            output.push(')');
        } else {
            write_bond_symbol(bond.order, aromatic_pair, output);
            emit(molecule, neighbor, Some(atom), ranks, visited, closures, output);
        }
    }
}

fn write_bond_symbol(order: BondOrder, single_between_aromatic_atoms: bool, output: &mut String) {
    match order {
        BondOrder::Single => {
            if single_between_aromatic_atoms {
                output.push('-');
            }
        }
        BondOrder::Double => output.push('='),
        BondOrder::Triple => output.push('#'),
        BondOrder::Aromatic => {}
    }
}

fn write_atom(molecule: &Molecule, index: usize, output: &mut String) {
    let atom = molecule.atom(index);
    if atom.element == Element::R {
        output.push('*');
        return;
    }
    let symbol = if atom.aromatic {
        atom.element.symbol().to_ascii_lowercase()
    } else {
        atom.element.symbol().to_string()
    };
    if needs_brackets(molecule, index) {
        output.push('[');
        if let Some(isotope) = atom.isotope {
            output.push_str(&isotope.to_string());
        }
        output.push_str(&symbol);
        match atom.implicit_hydrogens {
            0 => {}
            1 => output.push('H'),
            n => {
                output.push('H');
                output.push_str(&n.to_string());
            }
        }
        match atom.formal_charge {
            0 => {}
            1 => output.push('+'),
            -1 => output.push('-'),
            charge if charge > 0 => output.push_str(&format!("+{charge}")),
            charge => output.push_str(&charge.to_string()),
        }
        output.push(']');
    } else {
        output.push_str(&symbol);
    }
}

/// Whether an atom cannot be written as a bare organic-subset symbol because
/// a reader would reconstruct different properties.
fn needs_brackets(molecule: &Molecule, index: usize) -> bool {
    let atom = molecule.atom(index);
    if atom.formal_charge != 0 || atom.isotope.is_some() || !atom.element.is_organic_subset() {
        return true;
    }
    let Some(valences) = effective_valences(atom.element, 0) else {
        return true;
    };
    let mut used: u8 = molecule
        .bonds_of(index)
        .map(|(_, bond)| molecule.bond(bond).order.numeric())
        .sum();
    if atom.aromatic {
        used += 1;
    }
    let target = valences
        .iter()
        .copied()
        .find(|&valence| valence >= used)
        .unwrap_or_else(|| valences.last().copied().unwrap_or(0));
    target.saturating_sub(used) != atom.implicit_hydrogens
}

#[cfg(test)]
mod tests {
    use crate::smiles::parse_smiles;

    #[test]
    fn round_trip_is_stable() {
        for smiles in [
            "CCO",
            "OC1OC(CO)C(O)C(O)C1O",
            "O=P(O)(O)OCC1OC(OP(=O)(O)O)C(O)C1O",
            "O=C(N)CCC(NC(=O)C(N)C)C(=O)NO",
            "CC.OCC",
        ] {
            let molecule = parse_smiles(smiles).unwrap();
            let written = molecule.to_smiles();
            let reparsed = parse_smiles(&written).unwrap();
            assert_eq!(
                reparsed.to_smiles(),
                written,
                "unstable serialisation for {smiles}"
            );
            assert_eq!(molecule.atom_count(), reparsed.atom_count());
            assert_eq!(molecule.bond_count(), reparsed.bond_count());
        }
    }

    #[test]
    fn charged_atoms_are_bracketed() {
        let molecule = parse_smiles("[NH4+]").unwrap();
        assert_eq!(molecule.to_smiles(), "[NH4+]");
    }

    #[test]
    fn attachment_points_round_trip() {
        let molecule = parse_smiles("*OC").unwrap();
        let written = molecule.to_smiles();
        assert!(written.contains('*'));
        let reparsed = parse_smiles(&written).unwrap();
        assert!(reparsed.atoms().iter().any(|atom| atom.is_pseudo()));
    }
}
