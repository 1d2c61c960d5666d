//! Property drivers (§4.8): each submodule instantiates the shared search engine
//! ([`crate::driver`], [`crate::gauss`], [`crate::failure`]) with a different prefix,
//! enumeration policy and failure predicate.

pub mod cni;
pub mod crp;
pub mod free_sni;
pub mod ni;
pub mod pini;
pub mod rp;
pub mod rpe;
pub mod rpc;
pub mod sni;

use crate::bitdep::BitDep;
use crate::circuit::Circuit;
use crate::factor::factorize_row;
use crate::gauss::GaussState;
use crate::reduce::is_pure_single_random;

/// Builds a copy of `circuit` with each of `faults` forced to a public constant: `(wire, true)`
/// stucks the wire at 1, `(wire, false)` stucks it at 0 (§4.8, CNI/CRP/CRPC).
///
/// Every wire here already carries its fully-lowered [`crate::circuit::Dependency`] in terms of
/// base secret shares, randoms and multiplication terms (§1: the expression-to-dependency
/// lowering that would otherwise have to re-derive every *downstream* wire's dependency after a
/// fault is a collaborator this crate does not own). Faulting a wire is therefore modeled at
/// exactly this crate's boundary: the faulted wire's own row becomes a pure-constant dependency,
/// and every other wire is left exactly as the (already-lowered) circuit described it — except
/// when the faulted wire is itself nothing but a single random. That models a stuck-at fault on
/// the randomness generator, not on one combinational output, so every other wire's dependency
/// that still carries that same random bit has it folded into its own constant, the same way the
/// generator's fixed value would actually propagate to every consumer.
pub fn faulted_circuit(circuit: &Circuit, faults: &[(usize, bool)]) -> Circuit {
    let mut faulted = circuit.clone();
    for &(wire, stuck_at_one) in faults {
        let original = circuit.wires[wire].dep.clone();
        let mut row = circuit.zero_row();
        row.constant = stuck_at_one;
        faulted.wires[wire].dep = row;

        if is_pure_single_random(&original) {
            if let Some((idx, bit)) = original.random_bit_candidates().next() {
                for (i, other) in faulted.wires.iter_mut().enumerate() {
                    if i == wire || !other.dep.random_bit(idx, bit) {
                        continue;
                    }
                    other.dep.clear_random_bit(idx, bit);
                    other.dep.constant ^= stuck_at_one;
                }
            }
        }
    }
    faulted
}

/// Builds a tuple's [`GaussState`] the way every property driver needs it: insert each wire's
/// dependency, expanding correction outputs as it goes, and (when the circuit can carry
/// unrefreshed products) folding in the multiplication factorizer's exposed factor rows (§4.2,
/// §4.3). Shared so NI/SNI/PINI/free-SNI/RP don't each reimplement tuple insertion.
pub fn build_gauss_state(circuit: &Circuit, tuple: &[usize]) -> GaussState {
    let mut state = GaussState::with_capacity(tuple.len() * 2);
    for &wire_idx in tuple {
        insert_wire(&mut state, circuit, circuit.wires[wire_idx].dep.clone());
    }
    state
}

/// Inserts one raw dependency row into `state`: expands correction outputs, gauss-steps it, and
/// if it still carries multiplication-term bits and the circuit allows unrefreshed products,
/// factorizes it and recursively inserts every exposed factor row.
pub fn insert_wire(state: &mut GaussState, circuit: &Circuit, dep: BitDep) {
    let reduced = state.replace_correction_outputs_in_dep(dep, circuit);
    let carries_mults = reduced.popcount_mults() > 0;
    let idx = state.gauss_step(reduced, circuit);

    if carries_mults && circuit.contains_mults && circuit.has_input_rands {
        let row = state.rows[idx].clone();
        if let Ok(factors) = factorize_row(&row, circuit) {
            for factor in factors {
                insert_factor(state, circuit, factor.operand);
            }
        }
    }
}

fn insert_factor(state: &mut GaussState, circuit: &Circuit, operand: BitDep) {
    let reduced = state.replace_correction_outputs_in_dep(operand, circuit);
    state.gauss_step(reduced, circuit);
}

/// Whether the probing-only (no input refresh) variant of dimension reduction may drop bare
/// random wires: true exactly when the circuit has no products that might still need their
/// operands' randoms intact for factorization (§4.4: "(c) ... in the probing-only model").
pub fn probing_only_reduction_applies(circuit: &Circuit) -> bool {
    !(circuit.contains_mults && circuit.has_input_rands)
}
