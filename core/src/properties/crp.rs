//! CRP/CRPC (§4.8, §9): combined fault-and-leakage security. Each enumerated fault combination
//! (including the empty one, the unfaulted circuit — "coefficient files ... one block per fault
//! scenario plus a final block for the unfaulted circuit", §6) contributes its own leakage
//! coefficient polynomial; this module composes those polynomials, weighted by an i.i.d.
//! per-wire fault probability `p_fault`, into the three arbitrary-precision bounds the original
//! tool reports: `μ` (mass from enumerated fault scenarios, each weighted by its own leakage
//! probability at `p_leak`), `γ` (worst-case mass of the fault scenarios beyond the enumerated
//! size `k`, assumed to leak with certainty), and `ε = μ + γ` (the overall bound).
//!
//! The fault-scenario file collaborator (§6: parsing a companion script's list of
//! already-corrected scenarios to skip) is out of scope here, same as the textual gadget parser;
//! this module starts from an already-enumerated `Vec<FaultScenario>` — e.g. the one
//! [`enumerate`] produces by faulting every combination of internal wires up to size `k` and
//! running [`super::rp::verify`] (for CRP) or [`super::rpc::verify`] (for CRPC) on each faulted
//! circuit — rather than reading coefficient files off disk.
//!
//! §9 flags this composition as needing more than `f64`'s mantissa: `p_fault^k · C(N, k)`
//! underflows IEEE-754 long before `k` approaches a realistic `N`. Every term here is therefore
//! computed as an exact [`BigRational`].

use num_bigint::BigUint;
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::circuit::Circuit;
use crate::coeff::{compute_leakage_proba, TailBound};
use crate::comb::n_choose_k;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::properties::{faulted_circuit, probing_only_reduction_applies};
use crate::properties::rp;
use crate::reduce::basic_reduce;

/// One fault combination's own leakage-coefficient sweep, plus the combination itself (empty for
/// the unfaulted baseline).
#[derive(Clone, Debug)]
pub struct FaultScenario {
    pub faulted_wires: Vec<usize>,
    pub coeffs: Vec<BigUint>,
    pub total_wires: usize,
    pub known_up_to: usize,
}

/// Enumerates every fault combination of size `0..=k` over the circuit's (dimension-reduced)
/// internal wires, each with every stuck-at assignment, running [`rp::verify`] on the faulted
/// circuit to get that scenario's own coefficient polynomial (§6, "Coefficient files").
pub fn enumerate(circuit: &Circuit, k: usize, config: &EngineConfig) -> Result<Vec<FaultScenario>> {
    use itertools::Itertools;

    let (_, dim_red) = basic_reduce(circuit, probing_only_reduction_applies(circuit));
    let internal_candidates: Vec<usize> = dim_red
        .new_to_old
        .iter()
        .copied()
        .filter(|idx| !circuit.output_wire_range().contains(idx))
        .collect();

    let mut scenarios = Vec::new();
    let baseline = rp::verify(circuit, config)?;
    scenarios.push(FaultScenario {
        faulted_wires: Vec::new(),
        coeffs: baseline.coeffs,
        total_wires: baseline.total_wires,
        known_up_to: baseline.known_up_to,
    });

    for size in 1..=k.min(internal_candidates.len()) {
        for wires in internal_candidates.iter().copied().combinations(size) {
            for assignment in 0..(1u32 << size) {
                let faults: Vec<(usize, bool)> = wires
                    .iter()
                    .enumerate()
                    .map(|(i, &w)| (w, assignment & (1 << i) != 0))
                    .collect();
                let faulted = faulted_circuit(circuit, &faults);
                let result = rp::verify(&faulted, config)?;
                scenarios.push(FaultScenario {
                    faulted_wires: wires.clone(),
                    coeffs: result.coeffs,
                    total_wires: result.total_wires,
                    known_up_to: result.known_up_to,
                });
            }
        }
    }

    log::info!("crp::enumerate: k={k}, {} fault scenario(s) scored", scenarios.len());
    Ok(scenarios)
}

/// The three composed bounds (§9).
#[derive(Clone, Debug)]
pub struct CrpBounds {
    pub mu: BigRational,
    pub gamma: BigRational,
    pub epsilon: BigRational,
}

fn rational_pow(base: &BigRational, exp: usize) -> BigRational {
    let mut result = BigRational::one();
    for _ in 0..exp {
        result *= base;
    }
    result
}

/// Probability that a specific combination of `fault_size` wires (out of `num_fault_candidates`
/// eligible wires) is exactly the fault set the adversary realizes, under an i.i.d. per-wire
/// fault model: that combination's wires are faulted and every other eligible wire is not.
fn scenario_probability(num_fault_candidates: usize, fault_size: usize, p_fault: &BigRational) -> BigRational {
    let one_minus = BigRational::one() - p_fault;
    rational_pow(p_fault, fault_size) * rational_pow(&one_minus, num_fault_candidates - fault_size)
}

/// Composes enumerated fault scenarios into `(μ, γ, ε)` (§9).
///
/// `num_fault_candidates` is the number of wires eligible to be faulted (the universe `k` is
/// drawn from); `max_fault_size` is the largest scenario size actually enumerated in `scenarios`.
pub fn compose(
    scenarios: &[FaultScenario],
    num_fault_candidates: usize,
    max_fault_size: usize,
    p_fault: &BigRational,
    p_leak: &BigRational,
) -> CrpBounds {
    let mut mu = BigRational::zero();
    for scenario in scenarios {
        let weight = scenario_probability(num_fault_candidates, scenario.faulted_wires.len(), p_fault);
        let leak = compute_leakage_proba(
            &scenario.coeffs,
            scenario.total_wires,
            scenario.known_up_to,
            p_leak,
            TailBound::Upper,
        );
        mu += weight * leak;
    }

    let mut enumerated_mass = BigRational::zero();
    for size in 0..=max_fault_size.min(num_fault_candidates) {
        let count = n_choose_k(num_fault_candidates, size);
        enumerated_mass += BigRational::from(count.into()) * scenario_probability(num_fault_candidates, size, p_fault);
    }
    let gamma = (BigRational::one() - enumerated_mass).max(BigRational::zero());

    let epsilon = &mu + &gamma;
    log::info!("crp::compose: mu={mu}, gamma={gamma}, epsilon={epsilon}");
    CrpBounds { mu, gamma, epsilon }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use num_bigint::BigInt;

    fn half() -> BigRational {
        BigRational::new(BigInt::from(1), BigInt::from(2))
    }

    #[test]
    fn gamma_vanishes_when_every_fault_wire_is_enumerated() {
        let (circuit, _) = fixtures::linear_refresh();
        let scenarios = enumerate(&circuit, 4, &EngineConfig::single_threaded()).unwrap();
        // linear_refresh has no internal candidates left after reduction, so the only
        // enumerated scenario is the unfaulted baseline; with zero fault candidates the whole
        // probability mass is already covered and gamma is exactly zero.
        let bounds = compose(&scenarios, 0, 4, &half(), &half());
        assert_eq!(bounds.gamma, BigRational::zero());
    }

    #[test]
    fn epsilon_is_mu_plus_gamma() {
        let (circuit, _) = fixtures::single_wire_copy();
        let scenarios = enumerate(&circuit, 1, &EngineConfig::single_threaded()).unwrap();
        let bounds = compose(&scenarios, 0, 1, &half(), &half());
        assert_eq!(bounds.epsilon, &bounds.mu + &bounds.gamma);
    }
}
