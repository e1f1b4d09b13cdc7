//! Handle the terminality discrimination and the removal engine.
//!
//! Removal always works on a freshly detected candidate set. In
//! terminal-only mode the candidates are tested one by one; whenever a
//! terminal one is found it is removed, the molecule is cleaned up
//! (undersized disconnected leftovers cleared, open valences saturated), and
//! the scan starts over, because a removal can turn a previously
//! non-terminal neighbour terminal. Removing everything at once is the
//! simpler alternative branch. The combined circular-and-linear entry point
//! alternates both detectors around the removal engine until a fixed point
//! is reached.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::chemistry::Molecule;
use crate::errors::SugarRemovalError;
use crate::sugars::circular::circular_sugar_candidates;
use crate::sugars::linear::linear_sugar_candidates;
use crate::sugars::{
    PreservationMode, SugarCandidate, SugarKind, SugarRemovalSettings,
};

/// Whether the molecule contains circular sugar moieties, terminal or not,
/// according to the settings for circular sugar detection.
pub fn has_circular_sugars(molecule: &Molecule, settings: &SugarRemovalSettings) -> bool {
    !circular_sugar_candidates(molecule, settings).is_empty()
}

/// Whether the molecule contains linear sugar moieties, terminal or not,
/// according to the settings for linear sugar detection.
pub fn has_linear_sugars(molecule: &Molecule, settings: &SugarRemovalSettings) -> bool {
    !linear_sugar_candidates(molecule, settings).is_empty()
}

/// Whether the molecule contains sugar moieties of any kind.
pub fn has_circular_or_linear_sugars(molecule: &Molecule, settings: &SugarRemovalSettings) -> bool {
    has_circular_sugars(molecule, settings) || has_linear_sugars(molecule, settings)
}

/// The number of detected circular sugar moieties.
pub fn circular_sugar_count(molecule: &Molecule, settings: &SugarRemovalSettings) -> usize {
    circular_sugar_candidates(molecule, settings).len()
}

/// The number of detected linear sugar moieties.
pub fn linear_sugar_count(molecule: &Molecule, settings: &SugarRemovalSettings) -> usize {
    linear_sugar_candidates(molecule, settings).len()
}

/// The number of detected sugar moieties of both kinds together.
pub fn circular_and_linear_sugar_count(
    molecule: &Molecule,
    settings: &SugarRemovalSettings,
) -> usize {
    circular_sugar_count(molecule, settings) + linear_sugar_count(molecule, settings)
}

/// A sugar moiety that was removed from a molecule.
#[derive(Clone, Debug)]
pub struct RemovedSugar {
    /// The kind of sugar.
    pub kind: SugarKind,
    /// The moiety as its own structure. Valences at atoms that were bonded
    /// to the rest of the molecule are left open.
    pub structure: Molecule,
}

/// Remove the circular sugar moieties of the molecule in place.
///
/// Disconnected input structures are processed independently of each other.
/// The molecule may be empty afterwards if it consisted of nothing but
/// sugars, and it may be disconnected if non-terminal moieties are removed
/// as well.
///
/// Returns whether anything was removed.
///
/// # Errors
/// If re-saturation hits an element without a valence model.
pub fn remove_circular_sugars(
    molecule: &mut Molecule,
    settings: &SugarRemovalSettings,
) -> Result<bool, SugarRemovalError> {
    Ok(!deglycosylate_committed(molecule, settings, true, false)?
        .removed
        .is_empty())
}

/// Remove the linear sugar moieties of the molecule in place. See
/// [`remove_circular_sugars`] for the contract.
///
/// # Errors
/// If re-saturation hits an element without a valence model.
pub fn remove_linear_sugars(
    molecule: &mut Molecule,
    settings: &SugarRemovalSettings,
) -> Result<bool, SugarRemovalError> {
    Ok(!deglycosylate_committed(molecule, settings, false, true)?
        .removed
        .is_empty())
}

/// Remove circular and linear sugar moieties in place, alternating both
/// detectors until neither finds anything left to remove. A linear sugar can
/// shield a circular one (and the other way round), so a single pass of each
/// detector is not enough. See [`remove_circular_sugars`] for the rest of
/// the contract.
///
/// # Errors
/// If re-saturation hits an element without a valence model.
pub fn remove_circular_and_linear_sugars(
    molecule: &mut Molecule,
    settings: &SugarRemovalSettings,
) -> Result<bool, SugarRemovalError> {
    Ok(!deglycosylate_committed(molecule, settings, true, true)?
        .removed
        .is_empty())
}

/// Like [`remove_circular_sugars`], additionally returning the removed
/// moieties in removal order.
///
/// # Errors
/// If re-saturation hits an element without a valence model.
pub fn remove_circular_sugars_and_return(
    molecule: &mut Molecule,
    settings: &SugarRemovalSettings,
) -> Result<Vec<RemovedSugar>, SugarRemovalError> {
    Ok(into_removed_sugars(deglycosylate_committed(
        molecule, settings, true, false,
    )?))
}

/// Like [`remove_linear_sugars`], additionally returning the removed
/// moieties in removal order.
///
/// # Errors
/// If re-saturation hits an element without a valence model.
pub fn remove_linear_sugars_and_return(
    molecule: &mut Molecule,
    settings: &SugarRemovalSettings,
) -> Result<Vec<RemovedSugar>, SugarRemovalError> {
    Ok(into_removed_sugars(deglycosylate_committed(
        molecule, settings, false, true,
    )?))
}

/// Like [`remove_circular_and_linear_sugars`], additionally returning the
/// removed moieties in removal order.
///
/// # Errors
/// If re-saturation hits an element without a valence model.
pub fn remove_circular_and_linear_sugars_and_return(
    molecule: &mut Molecule,
    settings: &SugarRemovalSettings,
) -> Result<Vec<RemovedSugar>, SugarRemovalError> {
    Ok(into_removed_sugars(deglycosylate_committed(
        molecule, settings, true, true,
    )?))
}

/// Run the removal on a working copy and only commit it on success, so a
/// failed run leaves the caller's molecule untouched.
fn deglycosylate_committed(
    molecule: &mut Molecule,
    settings: &SugarRemovalSettings,
    circular: bool,
    linear: bool,
) -> Result<DeglycosylationRun, SugarRemovalError> {
    let mut work = molecule.clone();
    let run = deglycosylate(&mut work, settings, circular, linear)?;
    *molecule = work;
    Ok(run)
}

fn into_removed_sugars(run: DeglycosylationRun) -> Vec<RemovedSugar> {
    run.removed
        .into_iter()
        .map(|moiety| RemovedSugar {
            kind: moiety.kind,
            structure: moiety.structure,
        })
        .collect()
}

/// The unconnected part of the molecule with the highest heavy atom count,
/// e.g. to pick the actual aglycone after removing non-terminal moieties.
/// Returns the input unchanged when it is connected or empty.
pub fn biggest_fragment(molecule: &Molecule) -> Molecule {
    fragments(molecule)
        .into_iter()
        .max_by_key(Molecule::heavy_atom_count)
        .unwrap_or_default()
}

/// The unconnected part of the molecule with the highest molecular weight.
pub fn heaviest_fragment(molecule: &Molecule) -> Molecule {
    fragments(molecule)
        .into_iter()
        .max_by(|a, b| a.molecular_weight().total_cmp(&b.molecular_weight()))
        .unwrap_or_default()
}

/// The unconnected parts of the molecule, in decreasing order of atom count,
/// molecular weight, bond count, and bond order sum.
pub fn sorted_fragments(molecule: &Molecule) -> Vec<Molecule> {
    fragments(molecule)
        .into_iter()
        .sorted_by(|a, b| {
            b.atom_count()
                .cmp(&a.atom_count())
                .then(b.molecular_weight().total_cmp(&a.molecular_weight()))
                .then(b.bond_count().cmp(&a.bond_count()))
                .then(b.bond_order_sum().cmp(&a.bond_order_sum()))
        })
        .collect()
}

fn fragments(molecule: &Molecule) -> Vec<Molecule> {
    if molecule.is_empty() {
        return vec![molecule.clone()];
    }
    molecule
        .components()
        .into_iter()
        .map(|component| molecule.induced_subgraph(&component).0)
        .collect()
}

/// Whether the given atom subset is too small to be kept, judged by the
/// preservation mode and threshold.
pub(crate) fn is_too_small_to_preserve(
    molecule: &Molecule,
    atoms: &BTreeSet<usize>,
    settings: &SugarRemovalSettings,
) -> bool {
    if atoms.is_empty() {
        return true;
    }
    match settings.preservation_mode() {
        PreservationMode::All => false,
        PreservationMode::HeavyAtomCount => {
            let heavy = atoms
                .iter()
                .filter(|&&atom| molecule.atom(atom).is_heavy())
                .count();
            heavy < settings.preservation_threshold()
        }
        PreservationMode::MolecularWeight => {
            let weight: f64 = atoms
                .iter()
                .map(|&atom| {
                    let a = molecule.atom(atom);
                    a.element.atomic_weight()
                        + f64::from(a.implicit_hydrogens)
                            * crate::chemistry::Element::H.atomic_weight()
                })
                .sum();
            weight < settings.preservation_threshold() as f64
        }
    }
}

/// Clear every unconnected structure of the molecule that is too small to be
/// preserved. Returns the old-to-new atom index mapping (the identity when
/// nothing was cleared).
pub(crate) fn remove_too_small_components(
    molecule: &mut Molecule,
    settings: &SugarRemovalSettings,
) -> Vec<Option<usize>> {
    let identity: Vec<Option<usize>> = (0..molecule.atom_count()).map(Some).collect();
    if molecule.is_empty() || settings.preservation_mode() == PreservationMode::All {
        return identity;
    }
    let mut to_clear = BTreeSet::new();
    for component in molecule.components() {
        if is_too_small_to_preserve(molecule, &component, settings) {
            to_clear.extend(component);
        }
    }
    if to_clear.is_empty() {
        return identity;
    }
    molecule.remove_atoms(&to_clear).atoms
}

/// Whether the candidate is terminal in its parent molecule, i.e. whether it
/// can be removed without stranding retained structure. The hypothetical
/// removal is played through on a copy; disconnected leftovers below the
/// preservation threshold do not count against terminality as long as they
/// are not part of another candidate.
///
/// Only immediately terminal moieties are recognised; a moiety that becomes
/// terminal after another removal is caught by the next round.
pub(crate) fn is_terminal(
    molecule: &Molecule,
    candidate: &SugarCandidate,
    candidates: &[SugarCandidate],
    settings: &SugarRemovalSettings,
) -> bool {
    debug_assert!(molecule.is_connected(), "terminality needs a connected parent");
    let mut clone = molecule.clone();
    let map = clone.remove_atoms(&candidate.atoms);
    if clone.is_empty() || clone.is_connected() {
        return true;
    }
    if settings.preservation_mode() == PreservationMode::All {
        return false;
    }
    let mut new_to_old = vec![0; clone.atom_count()];
    for (old, new) in map.atoms.iter().enumerate() {
        if let Some(new) = new {
            new_to_old[*new] = old;
        }
    }
    let candidate_atoms: BTreeSet<usize> = candidates
        .iter()
        .flat_map(|other| other.atoms.iter().copied())
        .collect();
    let mut to_clear = BTreeSet::new();
    for component in clone.components() {
        let original: BTreeSet<usize> = component.iter().map(|&atom| new_to_old[atom]).collect();
        let too_small = is_too_small_to_preserve(molecule, &original, settings);
        let part_of_candidate = original.iter().any(|atom| candidate_atoms.contains(atom));
        if too_small && !part_of_candidate {
            to_clear.extend(component);
        }
    }
    if !to_clear.is_empty() {
        clone.remove_atoms(&to_clear);
    }
    clone.is_connected()
}

/// A removed moiety as recorded by the engine, with atom indices into the
/// molecule the engine was called on.
#[derive(Clone, Debug)]
pub(crate) struct RemovedMoiety {
    pub kind: SugarKind,
    pub atoms: BTreeSet<usize>,
    pub structure: Molecule,
}

/// Compose two removal mappings.
pub(crate) fn compose_maps(
    first: &[Option<usize>],
    second: &[Option<usize>],
) -> Vec<Option<usize>> {
    first
        .iter()
        .map(|entry| entry.and_then(|middle| second[middle]))
        .collect()
}

fn identity_map(len: usize) -> Vec<Option<usize>> {
    (0..len).map(Some).collect()
}

/// Translate a candidate through an input-to-current mapping. Returns `None`
/// when none of its atoms is left.
fn translate_candidate(
    candidate: &SugarCandidate,
    map: &[Option<usize>],
) -> Option<SugarCandidate> {
    let atoms: BTreeSet<usize> = candidate
        .atoms
        .iter()
        .filter_map(|&atom| map[atom])
        .collect();
    if atoms.is_empty() {
        return None;
    }
    let spiro_atoms = candidate
        .spiro_atoms
        .iter()
        .filter_map(|&atom| map[atom])
        .collect();
    Some(SugarCandidate {
        kind: candidate.kind,
        atoms,
        spiro_atoms,
    })
}

/// Remove the given candidates from the molecule, honouring the terminal-only
/// setting, the preservation mode, and spiro junction preservation. Returns
/// the removed moieties (atom indices into the input state of `molecule`)
/// and the input-to-output atom mapping.
pub(crate) fn remove_candidates(
    molecule: &mut Molecule,
    candidates: &[SugarCandidate],
    settings: &SugarRemovalSettings,
) -> Result<(Vec<RemovedMoiety>, Vec<Option<usize>>), SugarRemovalError> {
    let mut map = identity_map(molecule.atom_count());
    if candidates.is_empty() || molecule.is_empty() {
        return Ok((Vec::new(), map));
    }
    let mut pending: Vec<SugarCandidate> = candidates.to_vec();
    let mut removed = Vec::new();
    // input indices of spiro atoms already spared once; a second candidate
    // claiming the same junction removes it
    let mut spiro_spared: BTreeSet<usize> = BTreeSet::new();

    if settings.removes_only_terminal_sugars() {
        'rounds: loop {
            for index in 0..pending.len() {
                let Some(current) = translate_candidate(&pending[index], &map) else {
                    pending.remove(index);
                    continue 'rounds;
                };
                let peers: Vec<SugarCandidate> = pending
                    .iter()
                    .filter_map(|candidate| translate_candidate(candidate, &map))
                    .collect();
                if is_terminal(molecule, &current, &peers, settings) {
                    let candidate = pending.remove(index);
                    removed.push(capture_moiety(molecule, &candidate, &map));
                    let affected =
                        delete_candidate_atoms(molecule, &mut map, &candidate, &mut spiro_spared);
                    if molecule.is_empty() {
                        break 'rounds;
                    }
                    let cleanup = remove_too_small_components(molecule, settings);
                    map = compose_maps(&map, &cleanup);
                    let to_saturate: Vec<usize> =
                        affected.iter().filter_map(|&atom| cleanup[atom]).collect();
                    molecule.saturate(&to_saturate)?;
                    if molecule.is_empty() {
                        break 'rounds;
                    }
                    continue 'rounds;
                }
            }
            break;
        }
    } else {
        let snapshot = molecule.clone();
        for candidate in pending {
            if translate_candidate(&candidate, &map).is_none() {
                continue;
            }
            removed.push(capture_moiety(molecule, &candidate, &map));
            delete_candidate_atoms(molecule, &mut map, &candidate, &mut spiro_spared);
        }
        if !molecule.is_empty() {
            let cleanup = remove_too_small_components(molecule, settings);
            map = compose_maps(&map, &cleanup);
            // every surviving atom that lost a bond needs its valence refilled
            let to_saturate: Vec<usize> = (0..snapshot.atom_count())
                .filter_map(|input| map[input].map(|current| (input, current)))
                .filter(|&(input, current)| snapshot.degree(input) > molecule.degree(current))
                .map(|(_, current)| current)
                .collect();
            molecule.saturate(&to_saturate)?;
        }
    }
    Ok((removed, map))
}

/// Record the moiety a candidate covers right before its removal.
fn capture_moiety(
    molecule: &Molecule,
    candidate: &SugarCandidate,
    map: &[Option<usize>],
) -> RemovedMoiety {
    let current: BTreeSet<usize> = candidate
        .atoms
        .iter()
        .filter_map(|&atom| map[atom])
        .collect();
    let (structure, _) = molecule.induced_subgraph(&current);
    RemovedMoiety {
        kind: candidate.kind,
        atoms: candidate.atoms.clone(),
        structure,
    }
}

/// Delete the atoms of the candidate from the molecule, sparing spiro
/// junction atoms on their first removal. Returns the surviving neighbour
/// atoms (current indices after the removal) whose valences need saturation.
fn delete_candidate_atoms(
    molecule: &mut Molecule,
    map: &mut Vec<Option<usize>>,
    candidate: &SugarCandidate,
    spiro_spared: &mut BTreeSet<usize>,
) -> BTreeSet<usize> {
    let mut delete = BTreeSet::new();
    for &atom in &candidate.atoms {
        let Some(current) = map[atom] else { continue };
        if candidate.spiro_atoms.contains(&atom) && spiro_spared.insert(atom) {
            // the junction stays to protect the neighbouring ring
            continue;
        }
        delete.insert(current);
    }
    let affected: BTreeSet<usize> = delete
        .iter()
        .flat_map(|&atom| molecule.neighbors(atom))
        .filter(|atom| !delete.contains(atom))
        .collect();
    let removal = molecule.remove_atoms(&delete);
    *map = compose_maps(map, &removal.atoms);
    affected
        .into_iter()
        .filter_map(|atom| removal.atoms[atom])
        .collect()
}

/// The result of one full removal run.
#[derive(Clone, Debug)]
pub(crate) struct DeglycosylationRun {
    /// Input atom index to output atom index.
    pub map: Vec<Option<usize>>,
    /// The removed moieties with atom indices into the input molecule.
    pub removed: Vec<RemovedMoiety>,
}

impl DeglycosylationRun {
    /// The input atoms that belonged to a removed moiety but survived in the
    /// output, i.e. spared spiro junctions.
    pub fn spared_moiety_atoms(&self) -> BTreeSet<usize> {
        self.removed
            .iter()
            .flat_map(|moiety| moiety.atoms.iter().copied())
            .filter(|&atom| self.map[atom].is_some())
            .collect()
    }
}

/// Remove sugars from the molecule in place, processing disconnected input
/// structures independently.
pub(crate) fn deglycosylate(
    molecule: &mut Molecule,
    settings: &SugarRemovalSettings,
    circular: bool,
    linear: bool,
) -> Result<DeglycosylationRun, SugarRemovalError> {
    if molecule.is_empty() || (!circular && !linear) {
        return Ok(DeglycosylationRun {
            map: identity_map(molecule.atom_count()),
            removed: Vec::new(),
        });
    }
    if molecule.is_connected() {
        return deglycosylate_connected(molecule, settings, circular, linear);
    }
    // disconnected input: every component is its own little molecule
    let components = molecule.components();
    let mut union = Molecule::new();
    let mut map = vec![None; molecule.atom_count()];
    let mut removed = Vec::new();
    for component in components {
        let (mut part, part_to_input) = molecule.induced_subgraph(&component);
        let run = deglycosylate_connected(&mut part, settings, circular, linear)?;
        let offset = union.disjoint_union(&part);
        for (part_atom, &input_atom) in part_to_input.iter().enumerate() {
            map[input_atom] = run.map[part_atom].map(|output| output + offset);
        }
        removed.extend(run.removed.into_iter().map(|moiety| RemovedMoiety {
            atoms: moiety
                .atoms
                .iter()
                .map(|&atom| part_to_input[atom])
                .collect(),
            ..moiety
        }));
    }
    *molecule = union;
    Ok(DeglycosylationRun { map, removed })
}

fn deglycosylate_connected(
    molecule: &mut Molecule,
    settings: &SugarRemovalSettings,
    circular: bool,
    linear: bool,
) -> Result<DeglycosylationRun, SugarRemovalError> {
    let input_atoms = molecule.atom_count();
    let mut map = identity_map(input_atoms);
    let mut removed: Vec<RemovedMoiety> = Vec::new();
    loop {
        let mut removed_this_round = 0;
        if circular && !molecule.is_empty() {
            let candidates = circular_sugar_candidates(molecule, settings);
            removed_this_round +=
                removal_pass(molecule, &mut map, &mut removed, &candidates, settings)?;
        }
        if linear && !molecule.is_empty() {
            let candidates = linear_sugar_candidates(molecule, settings);
            removed_this_round +=
                removal_pass(molecule, &mut map, &mut removed, &candidates, settings)?;
        }
        // a single detector cannot unlock new candidates of its own kind, and
        // without the terminal-only restriction one pass removes everything
        let may_cascade = circular && linear && settings.removes_only_terminal_sugars();
        if molecule.is_empty() || removed_this_round == 0 || !may_cascade {
            break;
        }
    }
    Ok(DeglycosylationRun { map, removed })
}

/// One detection-and-removal pass; candidates are given in current-molecule
/// indices, the recorded moieties are translated back to run-input indices.
fn removal_pass(
    molecule: &mut Molecule,
    map: &mut Vec<Option<usize>>,
    removed: &mut Vec<RemovedMoiety>,
    candidates: &[SugarCandidate],
    settings: &SugarRemovalSettings,
) -> Result<usize, SugarRemovalError> {
    if candidates.is_empty() {
        return Ok(0);
    }
    // current index back to run input index, needed to report moieties
    let mut inverse = vec![0; molecule.atom_count()];
    for (input, current) in map.iter().enumerate() {
        if let Some(current) = current {
            inverse[*current] = input;
        }
    }
    let (moieties, pass_map) = remove_candidates(molecule, candidates, settings)?;
    let count = moieties.len();
    removed.extend(moieties.into_iter().map(|moiety| RemovedMoiety {
        atoms: moiety.atoms.iter().map(|&atom| inverse[atom]).collect(),
        ..moiety
    }));
    *map = compose_maps(map, &pass_map);
    Ok(count)
}
