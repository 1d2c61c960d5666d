//! RPC(t, t_out) (§4.8): random-probing variant with explicit probing-order and output-prefix
//! thresholds, rather than [`super::rp`]'s "any size up to coeff_max, full-secret-reveal"
//! definition. A tuple fails when it leaks more than `t` shares of some input — the same
//! predicate NI/SNI use — with the output side fixed at a single combination of `t_out` output
//! shares at a time; the coefficients reported for a given internal-tuple size are the
//! elementwise maximum across every output combination (§4.8: "max across combinations").

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

#[derive(Clone, Debug, Default)]
pub struct RpcResult {
    pub coeffs: Vec<BigUint>,
    pub total_wires: usize,
    pub known_up_to: usize,
}

pub fn verify(circuit: &Circuit, t: usize, t_out: usize, config: &EngineConfig) -> Result<RpcResult> {
    let (_, dim_red) = basic_reduce(circuit, probing_only_reduction_applies(circuit));
    let output_wires: Vec<usize> = circuit.output_wire_range().collect();
    let internal_candidates: Vec<usize> = dim_red
        .new_to_old
        .iter()
        .copied()
        .filter(|idx| !circuit.output_wire_range().contains(idx))
        .collect();

    let total_wires = internal_candidates.len();
    let max_size = config.coeff_max.unwrap_or(total_wires).min(total_wires);
    let t_out = t_out.min(output_wires.len());

    let mut coeffs = Vec::new();

    for prefix in output_wires.iter().copied().combinations(t_out) {
        let mut incompressible = Trie::new();
        let mut local = Vec::new();

        for size in 0..=max_size {
            for internal in internal_candidates.iter().copied().combinations(size) {
                let mut state = build_gauss_state(circuit, &prefix);
                for &wire_idx in &internal {
                    insert_wire(&mut state, circuit, circuit.wires[wire_idx].dep.clone());
                }
                let cfg = FailureConfig {
                    t_in: t,
                    comb_free_space: 0,
                    pini: false,
                    shares_to_ignore: [0, 0],
                };
                let Some(leaked) = check_failure(&state, circuit, &cfg) else {
                    continue;
                };

                let mut full: Vec<usize> = prefix.clone();
                full.extend(internal.iter().copied());
                full.sort_unstable();
                if incompressible.contains_subset(&full) {
                    continue;
                }
                incompressible.insert(&full, leaked);
                update_coeff_c_single(&mut local, total_wires, size);
            }
        }

        if local.len() > coeffs.len() {
            coeffs.resize(local.len(), BigUint::zero());
        }
        for (a, b) in coeffs.iter_mut().zip(&local) {
            if *b > *a {
                *a = b.clone();
            }
        }
    }

    log::info!("rpc::verify: t={t}, t_out={t_out}, total_wires={total_wires}, known_up_to={max_size}");
    Ok(RpcResult {
        coeffs,
        total_wires,
        known_up_to: max_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn linear_refresh_one_out_of_one_rpc_has_no_failures() {
        let (circuit, _) = fixtures::linear_refresh();
        let result = verify(&circuit, 1, 1, &EngineConfig::single_threaded()).unwrap();
        assert!(result.coeffs.iter().all(|c| c.is_zero()));
    }

    #[test]
    fn zero_output_prefix_considers_the_empty_combination_once() {
        // `t_out = 0` has exactly one combination (the empty one), so this degenerates to a
        // single plain-threshold sweep with no output prefix.
        let (circuit, _) = fixtures::isw_mult_n2();
        let result = verify(&circuit, 1, 0, &EngineConfig::single_threaded()).unwrap();
        assert_eq!(result.known_up_to, result.total_wires);
    }
}
