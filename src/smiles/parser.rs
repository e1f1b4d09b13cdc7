//! Handle SMILES parsing.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::chemistry::{
    Atom, Bond, BondArrangement, BondOrder, DoubleBondStereo, Element, Molecule, StereoRef,
    TetrahedralStereo, Winding,
};
use crate::smiles::SmilesError;

/// Parse a SMILES string into a [`Molecule`].
///
/// # Errors
/// If the string is not valid SMILES or uses an element this crate does not
/// know.
pub fn parse_smiles(input: &str) -> Result<Molecule, SmilesError> {
    let mut parser = Parser::new(input);
    parser.run()?;
    parser.finish()
}

impl FromStr for Molecule {
    type Err = SmilesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_smiles(s)
    }
}

/// The direction of a single bond as written, used for cis/trans perception.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Direction {
    /// `/`
    Up,
    /// `\`
    Down,
}

/// A neighbour position of a stereocentre that may not be resolvable yet.
#[derive(Copy, Clone, Debug)]
enum PendingRef {
    Atom(usize),
    ImplicitHydrogen,
    /// A ring closure digit seen at the stereocentre but not yet closed.
    Ring(u16),
}

#[derive(Clone, Debug)]
struct PendingStereo {
    focus: usize,
    winding: Winding,
    refs: Vec<PendingRef>,
}

#[derive(Copy, Clone, Debug)]
struct RingOpen {
    atom: usize,
    order: Option<BondOrder>,
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    /// Whether the atom was written in brackets (hydrogen count explicit).
    bracket: Vec<bool>,
    directions: Vec<Option<Direction>>,
    ring_closures: BTreeMap<u16, RingOpen>,
    branch_stack: Vec<usize>,
    prev: Option<usize>,
    pending_order: Option<BondOrder>,
    pending_direction: Option<Direction>,
    stereo: Vec<PendingStereo>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            bracket: Vec::new(),
            directions: Vec::new(),
            ring_closures: BTreeMap::new(),
            branch_stack: Vec::new(),
            prev: None,
            pending_order: None,
            pending_direction: None,
            stereo: Vec::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.peek();
        if byte.is_some() {
            self.pos += 1;
        }
        byte
    }

    fn run(&mut self) -> Result<(), SmilesError> {
        while let Some(byte) = self.peek() {
            match byte {
                b'(' => {
                    self.advance();
                    match self.prev {
                        Some(prev) => self.branch_stack.push(prev),
                        None => return Err(SmilesError::UnbalancedBranches),
                    }
                }
                b')' => {
                    self.advance();
                    self.prev = Some(
                        self.branch_stack
                            .pop()
                            .ok_or(SmilesError::UnbalancedBranches)?,
                    );
                    self.pending_order = None;
                    self.pending_direction = None;
                }
                b'-' => {
                    self.advance();
                    self.pending_order = Some(BondOrder::Single);
                }
                b'=' => {
                    self.advance();
                    self.pending_order = Some(BondOrder::Double);
                }
                b'#' => {
                    self.advance();
                    self.pending_order = Some(BondOrder::Triple);
                }
                b':' => {
                    self.advance();
                    self.pending_order = Some(BondOrder::Aromatic);
                }
                b'/' => {
                    self.advance();
                    self.pending_direction = Some(Direction::Up);
                }
                b'\\' => {
                    self.advance();
                    self.pending_direction = Some(Direction::Down);
                }
                b'.' => {
                    self.advance();
                    self.prev = None;
                    self.pending_order = None;
                    self.pending_direction = None;
                }
                b'%' => {
                    let position = self.pos;
                    self.advance();
                    let first = self.advance().ok_or(SmilesError::UnexpectedEnd)?;
                    let second = self.advance().ok_or(SmilesError::UnexpectedEnd)?;
                    if !first.is_ascii_digit() || !second.is_ascii_digit() {
                        return Err(SmilesError::UnexpectedCharacter {
                            character: char::from(first),
                            position: position + 1,
                        });
                    }
                    let label = u16::from(first - b'0') * 10 + u16::from(second - b'0');
                    self.ring_closure(label, position)?;
                }
                b'[' => self.bracket_atom()?,
                b'*' => {
                    self.advance();
                    self.push_atom(Atom::new(Element::R), true, None)?;
                }
                digit if digit.is_ascii_digit() => {
                    let position = self.pos;
                    self.advance();
                    self.ring_closure(u16::from(digit - b'0'), position)?;
                }
                other if is_organic_start(other) => self.organic_atom()?,
                other => {
                    return Err(SmilesError::UnexpectedCharacter {
                        character: char::from(other),
                        position: self.pos,
                    });
                }
            }
        }
        Ok(())
    }

    fn organic_atom(&mut self) -> Result<(), SmilesError> {
        let position = self.pos;
        let byte = self.advance().ok_or(SmilesError::UnexpectedEnd)?;
        let aromatic = byte.is_ascii_lowercase();
        let upper = byte.to_ascii_uppercase();
        let symbol = match (upper, self.peek()) {
            (b'B', Some(b'r')) if !aromatic => {
                self.advance();
                "Br"
            }
            (b'C', Some(b'l')) if !aromatic => {
                self.advance();
                "Cl"
            }
            _ => match upper {
                b'B' => "B",
                b'C' => "C",
                b'N' => "N",
                b'O' => "O",
                b'P' => "P",
                b'S' => "S",
                b'F' => "F",
                b'I' => "I",
                _ => {
                    return Err(SmilesError::UnknownElement {
                        symbol: char::from(byte).to_string(),
                        position,
                    });
                }
            },
        };
        let element = Element::from_symbol(symbol).ok_or_else(|| SmilesError::UnknownElement {
            symbol: symbol.to_string(),
            position,
        })?;
        let mut atom = Atom::new(element);
        atom.aromatic = aromatic;
        self.push_atom(atom, false, None)
    }

    fn bracket_atom(&mut self) -> Result<(), SmilesError> {
        self.advance(); // consume '['
        let isotope = self.number();
        let position = self.pos;
        let byte = self.advance().ok_or(SmilesError::UnexpectedEnd)?;
        if byte == b'*' {
            return self.finish_bracket_atom(Atom::new(Element::R), None, position);
        }
        let aromatic = byte.is_ascii_lowercase();
        let upper = byte.to_ascii_uppercase();
        let mut symbol = char::from(upper).to_string();
        if let Some(next) = self.peek() {
            if next.is_ascii_lowercase() {
                let two_letter = format!("{symbol}{}", char::from(next));
                if Element::from_symbol(&two_letter).is_some() {
                    self.advance();
                    symbol = two_letter;
                }
            }
        }
        let element = Element::from_symbol(&symbol).ok_or_else(|| SmilesError::UnknownElement {
            symbol: symbol.clone(),
            position,
        })?;
        let mut atom = Atom::new(element);
        atom.aromatic = aromatic;
        atom.isotope = isotope.map(|n| n as u16);

        // stereo descriptor
        let mut winding = None;
        if self.peek() == Some(b'@') {
            self.advance();
            if self.peek() == Some(b'@') {
                self.advance();
                winding = Some(Winding::Clockwise);
            } else {
                winding = Some(Winding::CounterClockwise);
            }
        }

        // hydrogen count
        if self.peek() == Some(b'H') {
            self.advance();
            atom.implicit_hydrogens = match self.peek() {
                Some(digit) if digit.is_ascii_digit() => {
                    self.advance();
                    digit - b'0'
                }
                _ => 1,
            };
        }

        // charge
        match self.peek() {
            Some(b'+') => {
                self.advance();
                atom.formal_charge = self.charge_magnitude(b'+');
            }
            Some(b'-') => {
                self.advance();
                atom.formal_charge = -self.charge_magnitude(b'-');
            }
            _ => {}
        }

        // atom class, carried in the input but not modelled
        if self.peek() == Some(b':') {
            self.advance();
            let _ = self.number();
        }

        self.finish_bracket_atom(atom, winding, position)
    }

    fn finish_bracket_atom(
        &mut self,
        atom: Atom,
        winding: Option<Winding>,
        position: usize,
    ) -> Result<(), SmilesError> {
        if self.advance() != Some(b']') {
            return Err(SmilesError::UnexpectedCharacter {
                character: self
                    .input
                    .get(self.pos.saturating_sub(1))
                    .map_or('\0', |&b| char::from(b)),
                position: position.max(self.pos.saturating_sub(1)),
            });
        }
        let implicit_h = atom.implicit_hydrogens;
        self.push_atom(atom, true, winding)?;
        if winding.is_some() && implicit_h == 1 {
            // the in-bracket hydrogen occupies this position in the
            // neighbour ordering of the stereocentre
            if let Some(stereo) = self.stereo.last_mut() {
                stereo.refs.push(PendingRef::ImplicitHydrogen);
            }
        }
        Ok(())
    }

    fn charge_magnitude(&mut self, sign: u8) -> i8 {
        match self.peek() {
            Some(digit) if digit.is_ascii_digit() => {
                self.advance();
                (digit - b'0') as i8
            }
            _ => {
                let mut magnitude = 1i8;
                while self.peek() == Some(sign) {
                    self.advance();
                    magnitude += 1;
                }
                magnitude
            }
        }
    }

    fn number(&mut self) -> Option<u32> {
        let mut value: u32 = 0;
        let mut any = false;
        while let Some(digit) = self.peek() {
            if digit.is_ascii_digit() {
                self.advance();
                value = value * 10 + u32::from(digit - b'0');
                any = true;
            } else {
                break;
            }
        }
        any.then_some(value)
    }

    fn push_atom(
        &mut self,
        atom: Atom,
        bracket: bool,
        winding: Option<Winding>,
    ) -> Result<(), SmilesError> {
        let index = self.atoms.len();
        self.atoms.push(atom);
        self.bracket.push(bracket);
        if let Some(winding) = winding {
            self.stereo.push(PendingStereo {
                focus: index,
                winding,
                refs: Vec::with_capacity(4),
            });
        }
        if let Some(prev) = self.prev {
            self.bond(prev, index);
        }
        self.prev = Some(index);
        Ok(())
    }

    fn bond(&mut self, from: usize, to: usize) {
        let both_aromatic = self.atoms[from].aromatic && self.atoms[to].aromatic;
        let order = self.pending_order.take().unwrap_or({
            if both_aromatic {
                BondOrder::Aromatic
            } else {
                BondOrder::Single
            }
        });
        let aromatic = both_aromatic && order == BondOrder::Aromatic;
        self.bonds.push(Bond {
            begin: from,
            end: to,
            order,
            aromatic,
        });
        self.directions.push(self.pending_direction.take());
        self.note_stereo_neighbor(from, to);
        self.note_stereo_neighbor(to, from);
    }

    fn note_stereo_neighbor(&mut self, focus: usize, neighbor: usize) {
        if let Some(stereo) = self.stereo.iter_mut().find(|s| s.focus == focus) {
            stereo.refs.push(PendingRef::Atom(neighbor));
        }
    }

    fn ring_closure(&mut self, label: u16, position: usize) -> Result<(), SmilesError> {
        let current = self.prev.ok_or(SmilesError::DanglingBond { position })?;
        if let Some(open) = self.ring_closures.remove(&label) {
            let order = self
                .pending_order
                .take()
                .or(open.order)
                .unwrap_or(BondOrder::Single);
            let both_aromatic = self.atoms[open.atom].aromatic && self.atoms[current].aromatic;
            let order = if both_aromatic && order == BondOrder::Single {
                BondOrder::Aromatic
            } else {
                order
            };
            self.bonds.push(Bond {
                begin: open.atom,
                end: current,
                order,
                aromatic: both_aromatic && order == BondOrder::Aromatic,
            });
            self.directions.push(self.pending_direction.take());
            // the opening atom reserved this position with a placeholder
            if let Some(stereo) = self.stereo.iter_mut().find(|s| s.focus == open.atom) {
                for reference in &mut stereo.refs {
                    if matches!(reference, PendingRef::Ring(l) if *l == label) {
                        *reference = PendingRef::Atom(current);
                    }
                }
            }
            self.note_stereo_neighbor(current, open.atom);
        } else {
            self.ring_closures.insert(
                label,
                RingOpen {
                    atom: current,
                    order: self.pending_order.take(),
                },
            );
            self.pending_direction = None;
            if let Some(stereo) = self.stereo.iter_mut().find(|s| s.focus == current) {
                stereo.refs.push(PendingRef::Ring(label));
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Molecule, SmilesError> {
        if let Some((&label, _)) = self.ring_closures.iter().next() {
            return Err(SmilesError::UnmatchedRingClosure { label });
        }
        if !self.branch_stack.is_empty() {
            return Err(SmilesError::UnbalancedBranches);
        }
        let Self {
            atoms,
            bonds,
            bracket,
            directions,
            stereo,
            ..
        } = self;
        let mut molecule = Molecule::from_parts(atoms, bonds);
        let unspecified: Vec<usize> = bracket
            .iter()
            .enumerate()
            .filter_map(|(index, &was_bracket)| (!was_bracket).then_some(index))
            .collect();
        // organic subset elements always have a valence model
        molecule
            .saturate(&unspecified)
            .map_err(|_| SmilesError::UnexpectedEnd)?;
        for pending in stereo {
            let mut refs = [StereoRef::ImplicitHydrogen; 4];
            if pending.refs.len() != 4 {
                continue;
            }
            let mut valid = true;
            for (slot, reference) in refs.iter_mut().zip(&pending.refs) {
                *slot = match reference {
                    PendingRef::Atom(index) => StereoRef::Atom(*index),
                    PendingRef::ImplicitHydrogen => StereoRef::ImplicitHydrogen,
                    PendingRef::Ring(_) => {
                        valid = false;
                        break;
                    }
                };
            }
            if valid {
                molecule.tetrahedral_stereo_mut().push(TetrahedralStereo {
                    focus: pending.focus,
                    neighbors: refs,
                    winding: pending.winding,
                });
            }
        }
        derive_double_bond_stereo(&mut molecule, &directions);
        Ok(molecule)
    }
}

/// Turn the directional single bonds noted during parsing into cis/trans
/// descriptors on the double bonds they flank.
fn derive_double_bond_stereo(molecule: &mut Molecule, directions: &[Option<Direction>]) {
    let mut derived = Vec::new();
    for bond in molecule.bonds() {
        if bond.order != BondOrder::Double {
            continue;
        }
        let begin_ref = directional_neighbor(molecule, directions, bond.begin);
        let end_ref = directional_neighbor(molecule, directions, bond.end);
        if let (Some((begin_reference, begin_up)), Some((end_reference, end_up))) =
            (begin_ref, end_ref)
        {
            derived.push(DoubleBondStereo {
                begin: bond.begin,
                end: bond.end,
                begin_reference,
                end_reference,
                arrangement: if begin_up == end_up {
                    BondArrangement::Together
                } else {
                    BondArrangement::Opposite
                },
            });
        }
    }
    molecule.double_bond_stereo_mut().extend(derived);
}

/// Find a directional single bond on the given double-bond atom and report
/// whether its substituent sits on the upper side of the double-bond axis.
fn directional_neighbor(
    molecule: &Molecule,
    directions: &[Option<Direction>],
    atom: usize,
) -> Option<(usize, bool)> {
    for (neighbor, bond_index) in molecule.bonds_of(atom) {
        if let Some(direction) = directions.get(bond_index).copied().flatten() {
            let bond = molecule.bond(bond_index);
            if bond.order != BondOrder::Single {
                continue;
            }
            let up = if bond.begin == atom {
                direction == Direction::Up
            } else {
                direction == Direction::Down
            };
            return Some((neighbor, up));
        }
    }
    None
}

const fn is_organic_start(byte: u8) -> bool {
    matches!(
        byte,
        b'B' | b'C' | b'N' | b'O' | b'P' | b'S' | b'F' | b'I' | b'b' | b'c' | b'n' | b'o' | b'p'
            | b's'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ethanol() {
        let molecule = parse_smiles("CCO").unwrap();
        assert_eq!(molecule.atom_count(), 3);
        assert_eq!(molecule.bond_count(), 2);
        assert_eq!(molecule.atom(0).implicit_hydrogens, 3);
        assert_eq!(molecule.atom(1).implicit_hydrogens, 2);
        assert_eq!(molecule.atom(2).implicit_hydrogens, 1);
    }

    #[test]
    fn parse_pyranose_ring() {
        let molecule = parse_smiles("OC1OC(CO)C(O)C(O)C1O").unwrap();
        assert_eq!(molecule.atom_count(), 12);
        assert_eq!(molecule.bond_count(), 12);
        assert_eq!(
            molecule
                .atoms()
                .iter()
                .filter(|atom| atom.is_oxygen())
                .count(),
            6
        );
    }

    #[test]
    fn parse_charges_and_brackets() {
        let molecule = parse_smiles("[NH4+].[Cl-]").unwrap();
        assert_eq!(molecule.atom_count(), 2);
        assert_eq!(molecule.atom(0).formal_charge, 1);
        assert_eq!(molecule.atom(0).implicit_hydrogens, 4);
        assert_eq!(molecule.atom(1).formal_charge, -1);
        assert!(!molecule.is_connected());
    }

    #[test]
    fn parse_phosphate() {
        let molecule = parse_smiles("O=P(O)(O)OC").unwrap();
        assert_eq!(molecule.atom(1).implicit_hydrogens, 0);
        assert_eq!(molecule.atom(0).implicit_hydrogens, 0);
        assert_eq!(molecule.atom(2).implicit_hydrogens, 1);
    }

    #[test]
    fn parse_tetrahedral_stereo() {
        let molecule = parse_smiles("N[C@@H](C)C(=O)O").unwrap();
        assert_eq!(molecule.tetrahedral_stereo().len(), 1);
        let stereo = molecule.tetrahedral_stereo()[0];
        assert_eq!(stereo.focus, 1);
        assert_eq!(stereo.winding, Winding::Clockwise);
        assert_eq!(stereo.neighbors[0], StereoRef::Atom(0));
        assert_eq!(stereo.neighbors[1], StereoRef::ImplicitHydrogen);
    }

    #[test]
    fn parse_cis_trans() {
        let trans = parse_smiles("F/C=C/F").unwrap();
        assert_eq!(trans.double_bond_stereo().len(), 1);
        assert_eq!(
            trans.double_bond_stereo()[0].arrangement,
            BondArrangement::Opposite
        );
        let cis = parse_smiles("F/C=C\\F").unwrap();
        assert_eq!(
            cis.double_bond_stereo()[0].arrangement,
            BondArrangement::Together
        );
    }

    #[test]
    fn parse_attachment_point() {
        let molecule = parse_smiles("*OC").unwrap();
        assert!(molecule.atom(0).is_pseudo());
        assert_eq!(molecule.atom(0).implicit_hydrogens, 0);
    }

    #[test]
    fn reject_invalid_input() {
        assert!(parse_smiles("C(").is_err());
        assert!(parse_smiles("C1CC").is_err());
        assert!(parse_smiles("[Xx]").is_err());
        assert!(parse_smiles("C$C").is_err());
    }

    #[test]
    fn aromatic_ring_hydrogens() {
        let molecule = parse_smiles("c1ccccc1").unwrap();
        assert_eq!(molecule.atom_count(), 6);
        for atom in molecule.atoms() {
            assert!(atom.aromatic);
            assert_eq!(atom.implicit_hydrogens, 1);
        }
    }
}
