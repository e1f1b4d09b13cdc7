//! Handle substructure matching.
//!
//! One generic backtracking matcher serves every pattern in the crate: the
//! linear sugar library, the circular sugar ring templates, and the exact
//! structure comparisons in the tests. A pattern is simply a small molecule;
//! atoms match on element and aromaticity, bonds on order and aromaticity.

use std::collections::{BTreeSet, HashSet};

use crate::chemistry::Molecule;

/// A substructure query compiled from a molecule.
#[derive(Clone, Debug)]
pub struct Pattern {
    pattern: Molecule,
    /// Atom visit order; every entry after the first is adjacent to an
    /// earlier one as long as the pattern is connected.
    order: Vec<usize>,
}

/// One substructure match as sets of target atom and bond indices.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Match {
    /// The matched atoms.
    pub atoms: BTreeSet<usize>,
    /// The target bonds matched by pattern bonds.
    pub bonds: BTreeSet<usize>,
}

impl Pattern {
    /// Compile a molecule into a pattern.
    pub fn new(pattern: Molecule) -> Self {
        let n = pattern.atom_count();
        let mut order = Vec::with_capacity(n);
        let mut seen = vec![false; n];
        // breadth-first from every component root, keeping each new atom
        // adjacent to an already ordered one where possible
        for root in 0..n {
            if seen[root] {
                continue;
            }
            seen[root] = true;
            order.push(root);
            let mut cursor = order.len() - 1;
            while cursor < order.len() {
                let current = order[cursor];
                for neighbor in pattern.neighbors(current) {
                    if !seen[neighbor] {
                        seen[neighbor] = true;
                        order.push(neighbor);
                    }
                }
                cursor += 1;
            }
        }
        Self { pattern, order }
    }

    /// The number of atoms in the pattern.
    pub fn size(&self) -> usize {
        self.pattern.atom_count()
    }

    /// All matches of this pattern in the target, deduplicated by matched
    /// atom set (the same atoms are reported once even if the pattern maps
    /// onto them in several ways, but different matches may overlap).
    pub fn unique_matches(&self, target: &Molecule) -> Vec<Match> {
        let mut results = Vec::new();
        let mut seen: HashSet<BTreeSet<usize>> = HashSet::new();
        let mut mapping = vec![usize::MAX; self.pattern.atom_count()];
        let mut used = vec![false; target.atom_count()];
        self.search(target, 0, &mut mapping, &mut used, &mut |mapping| {
            let atoms: BTreeSet<usize> = mapping.iter().copied().collect();
            if seen.insert(atoms.clone()) {
                let bonds = self
                    .pattern
                    .bonds()
                    .iter()
                    .filter_map(|bond| {
                        target.bond_between(mapping[bond.begin], mapping[bond.end])
                    })
                    .collect();
                results.push(Match { atoms, bonds });
            }
            true
        });
        results
    }

    /// Whether this pattern matches the target at least once.
    pub fn matches(&self, target: &Molecule) -> bool {
        let mut mapping = vec![usize::MAX; self.pattern.atom_count()];
        let mut used = vec![false; target.atom_count()];
        !self.search(target, 0, &mut mapping, &mut used, &mut |_| false)
    }

    /// Backtracking search. The callback receives every complete mapping and
    /// returns whether the search should continue; the function returns
    /// whether the search ran to completion.
    fn search(
        &self,
        target: &Molecule,
        depth: usize,
        mapping: &mut Vec<usize>,
        used: &mut Vec<bool>,
        on_match: &mut impl FnMut(&[usize]) -> bool,
    ) -> bool {
        if depth == self.order.len() {
            return on_match(mapping.as_slice());
        }
        let pattern_atom = self.order[depth];
        let anchor = self
            .pattern
            .neighbors(pattern_atom)
            .find(|&neighbor| mapping[neighbor] != usize::MAX);
        let candidates: Vec<usize> = match anchor {
            Some(anchor) => target.neighbors(mapping[anchor]).collect(),
            None => (0..target.atom_count()).collect(),
        };
        for candidate in candidates {
            if used[candidate] || !self.atoms_compatible(pattern_atom, target, candidate) {
                continue;
            }
            if !self.bonds_compatible(pattern_atom, candidate, target, mapping) {
                continue;
            }
            mapping[pattern_atom] = candidate;
            used[candidate] = true;
            let keep_going = self.search(target, depth + 1, mapping, used, on_match);
            mapping[pattern_atom] = usize::MAX;
            used[candidate] = false;
            if !keep_going {
                return false;
            }
        }
        true
    }

    fn atoms_compatible(&self, pattern_atom: usize, target: &Molecule, candidate: usize) -> bool {
        let p = self.pattern.atom(pattern_atom);
        let t = target.atom(candidate);
        p.element == t.element && p.aromatic == t.aromatic
    }

    /// Every pattern bond from this atom to an already mapped atom must have
    /// a matching target bond.
    fn bonds_compatible(
        &self,
        pattern_atom: usize,
        candidate: usize,
        target: &Molecule,
        mapping: &[usize],
    ) -> bool {
        for (pattern_neighbor, pattern_bond) in self.pattern.bonds_of(pattern_atom) {
            let mapped = mapping[pattern_neighbor];
            if mapped == usize::MAX {
                continue;
            }
            let Some(target_bond) = target.bond_between(candidate, mapped) else {
                return false;
            };
            let p = self.pattern.bond(pattern_bond);
            let t = target.bond(target_bond);
            if p.order != t.order || p.aromatic != t.aromatic {
                return false;
            }
        }
        true
    }
}

/// Whether the two molecules are the same structure: same atoms (element,
/// charge, implicit hydrogens, aromaticity, isotope) connected the same way.
/// Stereo descriptors are not compared.
pub fn are_isomorphic(a: &Molecule, b: &Molecule) -> bool {
    if a.atom_count() != b.atom_count() || a.bond_count() != b.bond_count() {
        return false;
    }
    if a.is_empty() {
        return true;
    }
    let pattern = Pattern::new(a.clone());
    // a monomorphism between graphs of equal size is an isomorphism, but the
    // atom comparison has to be exact here
    let mut mapping = vec![usize::MAX; pattern.pattern.atom_count()];
    let mut used = vec![false; b.atom_count()];
    !search_exact(&pattern, b, 0, &mut mapping, &mut used)
}

fn search_exact(
    pattern: &Pattern,
    target: &Molecule,
    depth: usize,
    mapping: &mut Vec<usize>,
    used: &mut Vec<bool>,
) -> bool {
    if depth == pattern.order.len() {
        return false; // found one, stop the search
    }
    let pattern_atom = pattern.order[depth];
    let anchor = pattern
        .pattern
        .neighbors(pattern_atom)
        .find(|&neighbor| mapping[neighbor] != usize::MAX);
    let candidates: Vec<usize> = match anchor {
        Some(anchor) => target.neighbors(mapping[anchor]).collect(),
        None => (0..target.atom_count()).collect(),
    };
    for candidate in candidates {
        if used[candidate] {
            continue;
        }
        let p = pattern.pattern.atom(pattern_atom);
        let t = target.atom(candidate);
        if p.element != t.element
            || p.formal_charge != t.formal_charge
            || p.implicit_hydrogens != t.implicit_hydrogens
            || p.aromatic != t.aromatic
            || p.isotope != t.isotope
            || pattern.pattern.degree(pattern_atom) != target.degree(candidate)
        {
            continue;
        }
        if !pattern.bonds_compatible(pattern_atom, candidate, target, mapping) {
            continue;
        }
        mapping[pattern_atom] = candidate;
        used[candidate] = true;
        let keep_going = search_exact(pattern, target, depth + 1, mapping, used);
        mapping[pattern_atom] = usize::MAX;
        used[candidate] = false;
        if !keep_going {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    #[test]
    fn finds_overlapping_matches_once_per_atom_set() {
        let target = parse_smiles("OCC(O)CO").unwrap();
        let pattern = Pattern::new(parse_smiles("OCC").unwrap());
        let matches = pattern.unique_matches(&target);
        assert!(!matches.is_empty());
        let mut sets: Vec<_> = matches.iter().map(|m| m.atoms.clone()).collect();
        sets.dedup();
        assert_eq!(sets.len(), matches.len());
    }

    #[test]
    fn no_match_across_aromatic_systems() {
        let target = parse_smiles("c1ccccc1").unwrap();
        let pattern = Pattern::new(parse_smiles("CCC").unwrap());
        assert!(!pattern.matches(&target));
    }

    #[test]
    fn isomorphism_ignores_atom_order() {
        let a = parse_smiles("OCC1OC(O)C(O)C(O)C1O").unwrap();
        let b = parse_smiles("C1(O)C(O)C(O)OC(CO)C1O").unwrap();
        assert!(are_isomorphic(&a, &b));
    }

    #[test]
    fn isomorphism_distinguishes_constitution() {
        let a = parse_smiles("CCO").unwrap();
        let b = parse_smiles("COC").unwrap();
        assert!(!are_isomorphic(&a, &b));
        assert!(!are_isomorphic(
            &parse_smiles("CC(N)=O").unwrap(),
            &parse_smiles("CC(N)O").unwrap()
        ));
    }
}
