//! Dimension reduction (§4.4): removing wires that are provably redundant for the search, and
//! reconstructing a full-circuit failure from a reduced one.
//!
//! Two passes are provided. [`basic_reduce`] is cheap and always sound: it drops wires that are
//! nothing but a single input share, a single unrefreshed product, or (in the probing-only
//! model) a single random. [`advanced_reduce`] implements the Bordes-Karpman closure test and
//! is considerably more expensive; per the design notes (§9c) it removes *all* qualifying
//! candidates in one pass, which for multiplication schemes other than ISW-style products may
//! occasionally miss a probe the fully exhaustive search would have found. This is a documented
//! limitation inherited from the original tool, not a bug to fix here.

use hashbrown::HashMap;
use itertools::Itertools;

use crate::bitdep::BitDep;
use crate::circuit::{Circuit, Wire};
use crate::comb::Comb;
use crate::failure::{check_failure, FailureConfig};
use crate::gauss::GaussState;

/// The bookkeeping a dimension-reduction pass must keep so a reduced-circuit failure can be
/// translated back into an original-circuit one (§3, "DimRedData").
#[derive(Clone, Debug)]
pub struct DimRedData {
    /// `new_to_old[i]` is the original wire index of reduced wire `i`.
    pub new_to_old: Vec<usize>,
    /// The wires dropped by this pass, in the order they were encountered.
    pub removed_wires: Vec<usize>,
    /// `elementary_wires[i * n + j]` lists the original wires that are themselves exactly share
    /// `j` of input `i`, with no masking — these are the expansions reconstruction draws from
    /// when it needs to "put a share back" into a reduced tuple.
    pub elementary_wires: Vec<Vec<usize>>,
}

impl DimRedData {
    pub fn elementary_wires_for(&self, input: usize, share: usize, share_count: usize) -> &[usize] {
        &self.elementary_wires[input * share_count + share]
    }
}

fn is_output_wire(circuit: &Circuit, index: usize) -> bool {
    circuit.output_wire_range().contains(&index)
}

fn is_pure_single_share(dep: &BitDep) -> Option<(usize, usize)> {
    for i in 0..2 {
        if dep.secrets[i].count_ones() == 1
            && dep.secrets[1 - i] == 0
            && !dep.has_randoms()
            && !dep.has_correction_outputs()
            && dep.popcount_mults() == 0
            && !dep.constant
        {
            return Some((i, dep.secrets[i].trailing_zeros() as usize));
        }
    }
    None
}

fn is_pure_single_product(dep: &BitDep) -> bool {
    dep.popcount_mults() == 1
        && dep.secrets == [0, 0]
        && !dep.has_randoms()
        && !dep.has_correction_outputs()
        && !dep.constant
}

pub(crate) fn is_pure_single_random(dep: &BitDep) -> bool {
    dep.popcount_randoms() == 1
        && dep.secrets == [0, 0]
        && dep.popcount_mults() == 0
        && !dep.has_correction_outputs()
        && !dep.constant
}

/// Removes every internal wire that is a single input share, a single unrefreshed product, or
/// (when `probing_only` is set) a single random, and returns the reduced circuit alongside the
/// [`DimRedData`] needed to reconstruct failures found in it. Output wires are never removed:
/// they are the probe targets the property drivers prefix tuples with.
pub fn basic_reduce(circuit: &Circuit, probing_only: bool) -> (Circuit, DimRedData) {
    let n = circuit.share_count;
    let mut elementary_wires = vec![Vec::new(); 2 * n];
    let mut removed = Vec::new();
    let mut kept = Vec::new();

    for wire in &circuit.wires {
        if is_output_wire(circuit, wire.index) {
            kept.push(wire.index);
            continue;
        }
        if let Some((i, j)) = is_pure_single_share(&wire.dep) {
            elementary_wires[i * n + j].push(wire.index);
            removed.push(wire.index);
            continue;
        }
        if is_pure_single_product(&wire.dep) {
            removed.push(wire.index);
            continue;
        }
        if probing_only && is_pure_single_random(&wire.dep) {
            removed.push(wire.index);
            continue;
        }
        kept.push(wire.index);
    }

    let mut new_wires = Vec::with_capacity(kept.len());
    let mut new_to_old = Vec::with_capacity(kept.len());
    for (new_idx, &old_idx) in kept.iter().enumerate() {
        new_to_old.push(old_idx);
        new_wires.push(Wire {
            index: new_idx,
            name: circuit.wires[old_idx].name.clone(),
            dep: circuit.wires[old_idx].dep.clone(),
        });
    }

    let reduced = Circuit {
        wires: new_wires,
        ..circuit.clone()
    };

    log::debug!(
        "basic_reduce: kept {} of {} wires (probing_only={probing_only})",
        reduced.wires.len(),
        circuit.wires.len()
    );

    (
        reduced,
        DimRedData {
            new_to_old,
            removed_wires: removed,
            elementary_wires,
        },
    )
}

/// A linear combination's classification key for the Bordes-Karpman closure test: which
/// randoms and which multiplication terms it touches, independent of secret shares or length.
type ComboKey = (Vec<u64>, Vec<u64>);

fn combo_key(dep: &BitDep) -> ComboKey {
    (dep.randoms.clone(), dep.mults.clone())
}

/// Enumerates every non-empty linear combination of up to `max_combo_len` wires drawn from
/// `wires`, keyed by [`combo_key`], keeping the shortest combination length seen for each key.
/// This is the closure the candidate-removal test compares between the full and the
/// candidate-excluded wire sets.
fn enumerate_combo_lengths(wires: &[&BitDep], max_combo_len: usize) -> HashMap<ComboKey, usize> {
    let mut table = HashMap::new();
    for len in 1..=max_combo_len.min(wires.len()) {
        for combo in wires.iter().copied().combinations(len) {
            let mut acc = combo[0].clone();
            for dep in &combo[1..] {
                acc.xor_in_place(dep);
            }
            let key = combo_key(&acc);
            let entry = table.entry(key).or_insert(len);
            if len < *entry {
                *entry = len;
            }
        }
    }
    table
}

/// Bordes-Karpman advanced reduction (§4.4) over one sub-circuit (in practice, the whole
/// circuit's non-output wires, since recovering per-output sub-circuits from bit-packed
/// dependencies alone would require the connectivity graph the parser discards). A wire of
/// shape `X + a_i*b_j` is a *candidate* when another wire of shape `X + a_i*b_j + a_m*b_n`
/// exists in the same set; it is removable when every linear combination realisable with it
/// can be realised at equal-or-lower cost without it.
///
/// `max_combo_len` bounds the closure enumeration; callers must keep sub-circuits small enough
/// that this remains tractable; the original tool has the same practical limit.
pub fn advanced_reduce(circuit: &Circuit, basic: &DimRedData, max_combo_len: usize) -> DimRedData {
    let wires: Vec<&BitDep> = circuit.wires.iter().map(|w| &w.dep).collect();

    let mut candidates = Vec::new();
    for (i, wire_i) in circuit.wires.iter().enumerate() {
        if is_output_wire(circuit, wire_i.index) || wire_i.dep.popcount_mults() != 1 {
            continue;
        }
        let Some(candidate_mult) = wire_i.dep.mult_indices().next() else {
            continue;
        };
        let has_partner = circuit
            .wires
            .iter()
            .enumerate()
            .any(|(j, wire_j)| j != i && wire_j.dep.popcount_mults() == 2 && wire_j.dep.mult_bit(candidate_mult));
        if has_partner {
            candidates.push(i);
        }
    }

    if candidates.is_empty() || wires.len() > max_combo_len * 4 {
        log::debug!(
            "advanced_reduce: skipping ({} candidates, {} wires against max_combo_len={max_combo_len})",
            candidates.len(),
            wires.len()
        );
        return basic.clone();
    }

    let full_table = enumerate_combo_lengths(&wires, max_combo_len);

    let mut removed = basic.removed_wires.clone();
    let mut kept_mask = vec![true; circuit.wires.len()];
    for &c in &candidates {
        let reduced_wires: Vec<&BitDep> = circuit
            .wires
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != c && kept_mask[*i])
            .map(|(_, w)| &w.dep)
            .collect();
        let reduced_table = enumerate_combo_lengths(&reduced_wires, max_combo_len);

        let removable = full_table
            .iter()
            .all(|(key, &len)| reduced_table.get(key).is_some_and(|&rlen| rlen <= len));

        if removable {
            kept_mask[c] = false;
            removed.push(circuit.wires[c].index);
        }
    }

    let mut new_to_old = Vec::new();
    for (i, keep) in kept_mask.iter().enumerate() {
        if *keep {
            new_to_old.push(circuit.wires[i].index);
        }
    }

    log::debug!(
        "advanced_reduce: removed {} additional candidate(s) of {}",
        removed.len() - basic.removed_wires.len(),
        candidates.len()
    );

    DimRedData {
        new_to_old,
        removed_wires: removed,
        elementary_wires: basic.elementary_wires.clone(),
    }
}

/// Reconstructs a full-circuit failure from a reduced tuple `T` that did not, on its own, reach
/// the leakage threshold (§4.4, "Reconstruction"): enumerates combinations of the wires
/// [`basic_reduce`]/[`advanced_reduce`] dropped, of size `[k_min, max_len - |T|]`, re-running
/// the failure predicate against `T` extended with each combination over the *original*
/// circuit (dimension reduction is a search-space optimization; the original circuit's wires
/// are the ground truth for what a real probe set can touch).
pub fn reconstruct_failure(
    original_circuit: &Circuit,
    dim_red: &DimRedData,
    reduced_tuple_old_indices: &[usize],
    max_len: usize,
    k_min: usize,
    t_in: usize,
    pini: bool,
) -> Option<(Comb, [bool; 2])> {
    let room = max_len.saturating_sub(reduced_tuple_old_indices.len());
    if room < k_min {
        return None;
    }

    for extra_len in k_min..=room {
        for extra in dim_red.removed_wires.iter().copied().combinations(extra_len) {
            let mut full: Comb = reduced_tuple_old_indices.to_vec();
            full.extend(extra.iter().copied());
            full.sort_unstable();
            full.dedup();
            if full.len() != reduced_tuple_old_indices.len() + extra_len {
                continue;
            }

            let mut state = GaussState::with_capacity(full.len());
            for &wire_idx in &full {
                let row = state.replace_correction_outputs_in_dep(
                    original_circuit.wires[wire_idx].dep.clone(),
                    original_circuit,
                );
                state.gauss_step(row, original_circuit);
            }
            let cfg = FailureConfig {
                t_in,
                comb_free_space: 0,
                pini,
                shares_to_ignore: [0, 0],
            };
            if let Some(leaked) = check_failure(&state, original_circuit, &cfg) {
                return Some((full, leaked));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn basic_reduce_drops_single_share_wires_but_not_outputs() {
        let (circuit, _) = fixtures::linear_refresh();
        let (reduced, dim_red) = basic_reduce(&circuit, true);
        // x0 and x1 are pure single shares and get dropped; r is a pure single random (dropped
        // under probing_only); y0/y1 are outputs and survive.
        assert_eq!(reduced.wires.len(), 2);
        assert_eq!(dim_red.removed_wires.len(), 3);
        assert_eq!(dim_red.elementary_wires_for(0, 0, 2), &[0]);
        assert_eq!(dim_red.elementary_wires_for(0, 1, 2), &[1]);
    }

    #[test]
    fn basic_reduce_keeps_everything_on_identity_gadget_outputs() {
        let (circuit, _) = fixtures::identity_gadget();
        let (reduced, dim_red) = basic_reduce(&circuit, true);
        // x0, x1 are dropped as pure shares; y0, y1 are outputs and survive.
        assert_eq!(reduced.wires.len(), 2);
        assert_eq!(dim_red.removed_wires.len(), 2);
    }

    #[test]
    fn reconstruct_failure_finds_both_shares_from_removed_elementary_wires() {
        let (circuit, _) = fixtures::identity_gadget();
        let (_, dim_red) = basic_reduce(&circuit, true);
        // Reduced tuple is empty; reconstruction must pull both x0 and x1 back in to fail.
        let result = reconstruct_failure(&circuit, &dim_red, &[], 2, 2, 1, false);
        assert!(result.is_some());
    }
}
