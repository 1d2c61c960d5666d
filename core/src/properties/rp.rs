//! RP(coeff_max) (§4.8, §4.9): bounds the probability that a uniformly-random tuple of probed
//! wires fully reveals a secret, as a function of tuple size. Unlike NI/SNI/PINI's "find one
//! counter-example and stop", RP enumerates every tuple of every size up to `coeff_max`,
//! classifies full (all-`share_count`-shares) failures, and folds each newly-found minimal one
//! into the coefficient polynomial via [`update_coeff_c_single`]. Tuple sizes, and the `N` the
//! polynomial is built over, are counted against the dimension-reduced candidate set: a wire
//! `basic_reduce` drops can never appear in a minimal failure, so it never contributes a degree
//! of freedom to the polynomial either.
//!
//! A failure that is a (non-strict) superset of an already-recorded smaller failure contributes
//! nothing new — `update_coeff_c_single` already counts every superset of a minimal failure
//! combinatorially — so every newly-found failure is checked against the incompressible-tuple
//! trie of failures recorded at strictly smaller sizes before it is folded in.

use gadget_verify_maybe_rayon::MaybeParIter;
use itertools::Itertools;
use num_bigint::BigUint;

use crate::circuit::Circuit;
use crate::coeff::update_coeff_c_single;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::failure::{check_failure, FailureConfig};
use crate::properties::{build_gauss_state, probing_only_reduction_applies};
use crate::reduce::basic_reduce;
use crate::trie::Trie;

/// The coefficient polynomial RP computed, plus the tuple size the sweep was run up to: callers
/// pass `known_up_to` straight into [`crate::coeff::compute_leakage_proba`] to get a sound bound
/// even when `coeff_max` cut the sweep short of the full candidate set.
#[derive(Clone, Debug, Default)]
pub struct RpResult {
    pub coeffs: Vec<BigUint>,
    pub total_wires: usize,
    pub known_up_to: usize,
}

pub fn verify(circuit: &Circuit, config: &EngineConfig) -> Result<RpResult> {
    let (_, dim_red) = basic_reduce(circuit, probing_only_reduction_applies(circuit));
    let candidates = dim_red.new_to_old.clone();
    let total_wires = candidates.len();
    let max_size = config.coeff_max.unwrap_or(total_wires).min(total_wires);
    let threshold = circuit.share_count.saturating_sub(1);

    let mut coeffs = Vec::new();
    let mut incompressible = Trie::new();

    for size in 0..=max_size {
        let tuples: Vec<Vec<usize>> = candidates.iter().copied().combinations(size).collect();
        let leaks: Vec<Option<[bool; 2]>> = tuples
            .par_iter()
            .map(|tuple| {
                let state = build_gauss_state(circuit, tuple);
                let cfg = FailureConfig {
                    t_in: threshold,
                    comb_free_space: 0,
                    pini: false,
                    shares_to_ignore: [0, 0],
                };
                check_failure(&state, circuit, &cfg)
            })
            .collect();

        for (tuple, leak) in tuples.iter().zip(leaks) {
            let Some(leak) = leak else { continue };
            let mut sorted = tuple.clone();
            sorted.sort_unstable();
            if incompressible.contains_subset(&sorted) {
                continue;
            }
            incompressible.insert(&sorted, leak);
            update_coeff_c_single(&mut coeffs, total_wires, size);
        }
        log::debug!("rp::verify: size {size}/{max_size} swept, coeffs so far {coeffs:?}");
    }

    log::info!("rp::verify: total_wires={total_wires}, known_up_to={max_size}, coeffs={coeffs:?}");
    Ok(RpResult {
        coeffs,
        total_wires,
        known_up_to: max_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use num_traits::{One, Zero};

    #[test]
    fn single_wire_copy_matches_the_spec_example() {
        // "RP on a single-wire gadget copying x_0. coeffs = [0, 1]" (§8): after reduction the
        // bare input wire drops out (it's a pure single share, not an output), leaving only the
        // output wire itself as a candidate, so `N = 1` and the lone failure sits at size 1.
        let (circuit, _) = fixtures::single_wire_copy();
        let result = verify(&circuit, &EngineConfig::single_threaded()).unwrap();
        assert_eq!(result.total_wires, 1);
        assert_eq!(result.coeffs, vec![BigUint::zero(), BigUint::one()]);
    }

    #[test]
    fn linear_refresh_has_no_single_wire_failures() {
        // A lone wire of the linear refresh (an input share, the random, or an output share)
        // never reveals the full secret on its own, so the size-1 coefficient is zero.
        let (circuit, _) = fixtures::linear_refresh();
        let result = verify(&circuit, &EngineConfig::single_threaded().with_coeff_max(Some(1))).unwrap();
        assert_eq!(result.coeffs.get(1).cloned().unwrap_or_else(BigUint::zero), BigUint::zero());
    }

    #[test]
    fn coeff_max_bounds_the_sweep() {
        let (circuit, _) = fixtures::linear_refresh();
        let result = verify(&circuit, &EngineConfig::single_threaded().with_coeff_max(Some(0))).unwrap();
        assert_eq!(result.known_up_to, 0);
    }
}
