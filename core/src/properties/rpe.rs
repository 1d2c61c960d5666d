//! RPE1/RPE2/RPE-copy (§4.7, §4.8): random-probing expandability. Like [`super::rp`], every
//! internal tuple size up to `coeff_max` is swept and folded into a coefficient polynomial, but
//! every tuple also carries a fixed-size prefix of output shares (size `t_output` for RPE1,
//! `n - 1` for RPE2), and coefficients are tracked separately by which input(s) a full failure
//! actually reveals: `i1` (input 1 alone), `i2` (input 2 alone), `i1_or_i2` (at least one),
//! `i1_and_i2` (both, §4.8's genuine full-circuit break). For a given internal-tuple size, the
//! reported coefficients are the elementwise maximum across every output-share combination of
//! that prefix size — the worst case over which output shares the adversary includes.
//!
//! RPE2 differs from RPE1 only in always using the maximal prefix size `n - 1`; its distinguishing
//! feature in the original tool is a batching strategy to bound memory (§4.7, "Batching (RPE2)")
//! rather than a different failure predicate. The fixtures this engine verifies are small enough
//! that the direct sweep below never needs that batching; it is not reimplemented here (see
//! DESIGN.md).

use itertools::Itertools;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::circuit::Circuit;
use crate::coeff::update_coeff_c_single;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::failure::{check_failure, FailureConfig};
use crate::properties::{build_gauss_state, insert_wire, probing_only_reduction_applies};
use crate::reduce::basic_reduce;
use crate::trie::Trie;

/// The four coefficient polynomials RPE tracks, split by which input(s) a failure reveals.
#[derive(Clone, Debug, Default)]
pub struct RpeResult {
    pub i1: Vec<BigUint>,
    pub i2: Vec<BigUint>,
    pub i1_or_i2: Vec<BigUint>,
    pub i1_and_i2: Vec<BigUint>,
    pub total_wires: usize,
    pub known_up_to: usize,
}

fn elementwise_max(into: &mut Vec<BigUint>, other: &[BigUint]) {
    if other.len() > into.len() {
        into.resize(other.len(), BigUint::zero());
    }
    for (a, b) in into.iter_mut().zip(other) {
        if *b > *a {
            *a = b.clone();
        }
    }
}

/// Sweeps internal-tuple sizes `0..=max_size` with `prefix` held fixed, folding each newly-found
/// minimal failure (against the prefix's own dedicated incompressible trie) into the four
/// coefficient vectors.
fn sweep_one_prefix(
    circuit: &Circuit,
    prefix: &[usize],
    internal_candidates: &[usize],
    max_size: usize,
) -> (Vec<BigUint>, Vec<BigUint>, Vec<BigUint>, Vec<BigUint>) {
    let total_wires = internal_candidates.len();
    let threshold = circuit.share_count.saturating_sub(1);

    let mut i1 = Vec::new();
    let mut i2 = Vec::new();
    let mut i1_or_i2 = Vec::new();
    let mut i1_and_i2 = Vec::new();
    let mut incompressible = Trie::new();

    for size in 0..=max_size.min(total_wires) {
        for internal in internal_candidates.iter().copied().combinations(size) {
            let mut state = build_gauss_state(circuit, prefix);
            for &wire_idx in &internal {
                insert_wire(&mut state, circuit, circuit.wires[wire_idx].dep.clone());
            }
            let cfg = FailureConfig {
                t_in: threshold,
                comb_free_space: 0,
                pini: false,
                shares_to_ignore: [0, 0],
            };
            let Some(leaked) = check_failure(&state, circuit, &cfg) else {
                continue;
            };

            let mut full: Vec<usize> = prefix.to_vec();
            full.extend(internal.iter().copied());
            full.sort_unstable();
            if incompressible.contains_subset(&full) {
                continue;
            }
            incompressible.insert(&full, leaked);

            if leaked[0] && !leaked[1] {
                update_coeff_c_single(&mut i1, total_wires, size);
            }
            if leaked[1] && !leaked[0] {
                update_coeff_c_single(&mut i2, total_wires, size);
            }
            if leaked[0] || leaked[1] {
                update_coeff_c_single(&mut i1_or_i2, total_wires, size);
            }
            if leaked[0] && leaked[1] {
                update_coeff_c_single(&mut i1_and_i2, total_wires, size);
            }
        }
    }
    (i1, i2, i1_or_i2, i1_and_i2)
}

/// RPE1(t_output): sweeps every combination of `t_output` output shares as the fixed prefix.
pub fn verify(circuit: &Circuit, t_output: usize, config: &EngineConfig) -> Result<RpeResult> {
    let (_, dim_red) = basic_reduce(circuit, probing_only_reduction_applies(circuit));
    let output_wires: Vec<usize> = circuit.output_wire_range().collect();
    let internal_candidates: Vec<usize> = dim_red
        .new_to_old
        .iter()
        .copied()
        .filter(|idx| !circuit.output_wire_range().contains(idx))
        .collect();

    let max_size = config.coeff_max.unwrap_or(internal_candidates.len());
    let t_output = t_output.min(output_wires.len());

    let mut result = RpeResult {
        total_wires: internal_candidates.len(),
        known_up_to: max_size.min(internal_candidates.len()),
        ..Default::default()
    };

    for prefix in output_wires.iter().copied().combinations(t_output) {
        let (i1, i2, or, and) = sweep_one_prefix(circuit, &prefix, &internal_candidates, max_size);
        elementwise_max(&mut result.i1, &i1);
        elementwise_max(&mut result.i2, &i2);
        elementwise_max(&mut result.i1_or_i2, &or);
        elementwise_max(&mut result.i1_and_i2, &and);
    }

    log::info!(
        "rpe::verify: t_output={t_output}, total_wires={}, known_up_to={}",
        result.total_wires,
        result.known_up_to
    );
    Ok(result)
}

/// RPE2: RPE1 with the maximal output prefix size `n - 1` (the original tool's memory-bound
/// batched driver for this case; see the module doc comment for why batching itself is not
/// reproduced here).
pub fn verify_rpe2(circuit: &Circuit, config: &EngineConfig) -> Result<RpeResult> {
    let t_output = circuit.share_count.saturating_sub(1);
    verify(circuit, t_output, config)
}

/// RPE-copy: the degenerate copy-gadget variant, where output share `first_output` is either
/// always held out of the prefix (probed only as part of the swept internal set) or always
/// forced into it. The original tool's `first_output` flag reads as the latter but its
/// accompanying comment reads as the former (§9, Open Question b); resolved here as "always
/// forced in" — the copy gadget's whole point is that every output share individually is just a
/// refreshed copy of the input, so fixing one into the prefix and sweeping the rest is the
/// reading that actually exercises RPE's prefix machinery instead of degenerating to plain RP.
pub fn verify_copy(circuit: &Circuit, first_output: usize, config: &EngineConfig) -> Result<RpeResult> {
    let (_, dim_red) = basic_reduce(circuit, probing_only_reduction_applies(circuit));
    let internal_candidates: Vec<usize> = dim_red
        .new_to_old
        .iter()
        .copied()
        .filter(|idx| !circuit.output_wire_range().contains(idx) || *idx == first_output)
        .collect();
    let prefix = [first_output];
    let max_size = config.coeff_max.unwrap_or(internal_candidates.len());

    let (i1, i2, or, and) = sweep_one_prefix(circuit, &prefix, &internal_candidates, max_size);
    Ok(RpeResult {
        total_wires: internal_candidates.len(),
        known_up_to: max_size.min(internal_candidates.len()),
        i1,
        i2,
        i1_or_i2: or,
        i1_and_i2: and,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn linear_refresh_rpe1_zero_output_prefix_matches_plain_rp_shape() {
        // `t_output = 0` degenerates RPE1 to a plain sweep with no output prefix, the same
        // shape as `rp::verify` but split by input.
        let (circuit, _) = fixtures::linear_refresh();
        let result = verify(&circuit, 0, &EngineConfig::single_threaded()).unwrap();
        assert_eq!(result.i1_and_i2, Vec::<BigUint>::new());
    }

    #[test]
    fn isw_mult_rpe2_tracks_both_inputs_separately() {
        let (circuit, _) = fixtures::isw_mult_n2();
        let result = verify_rpe2(&circuit, &EngineConfig::single_threaded().with_coeff_max(Some(2))).unwrap();
        assert_eq!(result.known_up_to, 2.min(result.total_wires));
    }

    #[test]
    fn two_output_copy_verify_copy_holds_with_first_output_forced_in() {
        // Each output independently refreshes the input with its own random, so forcing `y0_0`
        // into the prefix (the "always forced in" resolution of the first_output polarity
        // question, see `verify_copy`'s doc comment) never leaks: `y0_0`'s own random still
        // pivots it away during elimination, and there is nothing else left to sweep that
        // recombines with it.
        let (circuit, names) = fixtures::two_output_copy();
        let first_output = names.iter().position(|n| n == "y0_0").unwrap();
        let result = verify_copy(&circuit, first_output, &EngineConfig::single_threaded()).unwrap();
        assert!(result.i1_and_i2.iter().all(|c| c.is_zero()));
    }
}
