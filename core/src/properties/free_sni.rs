//! free-SNI / IOS(t) (§4.8): no fixed output prefix. Instead, any output share that ends up in
//! a probe tuple can be assigned, per tuple, to either the leaked-input set `I` (counted
//! normally) or the output-independence set `O` (contributes nothing, on the strength of
//! *output uniformity*: any strict subset of the `n` output shares is uniformly random and
//! independent of the inputs). A tuple is secure if *some* assignment keeps input-share usage
//! (and, for IOS, output-share usage) within the tuple's own size.

use crate::circuit::Circuit;
use crate::config::EngineConfig;
use crate::driver;
use crate::error::{Result, VerificationOutcome, VerifyError};
use crate::gauss::GaussState;
use crate::properties::insert_wire;
use crate::reduce::basic_reduce;

/// Whether the search additionally bounds output-share usage (IOS) or only input-share usage
/// (plain free-SNI).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    FreeSni,
    Ios,
}

/// Verifies output uniformity (§4.8): gauss-reducing the `n` dependency lists of a single
/// output block in share order, the first `n-1` must each pick up a fresh random pivot, and the
/// last must reduce to exactly the full share mask with no randoms left — i.e. the `n` shares
/// are `n-1` independent uniform values plus the share that completes the secret.
fn check_output_uniformity(circuit: &Circuit) -> Result<()> {
    let n = circuit.share_count;
    for block in circuit.output_wire_range().collect::<Vec<_>>().chunks(n) {
        if block.len() != n {
            return Err(VerifyError::malformed("output block", "incomplete output share block"));
        }
        let mut state = GaussState::with_capacity(n);
        for (j, &wire) in block.iter().enumerate() {
            let idx = state.gauss_step(circuit.wires[wire].dep.clone(), circuit);
            let is_last = j == n - 1;
            if !is_last && !state.pivots[idx].is_set {
                return Err(VerifyError::malformed(
                    &circuit.wires[wire].name,
                    "output share does not carry a fresh random column (output uniformity fails)",
                ));
            }
            if is_last && state.rows[idx].has_randoms() {
                return Err(VerifyError::malformed(
                    &circuit.wires[wire].name,
                    "last output share of the block still carries a random after reduction",
                ));
            }
        }
    }
    Ok(())
}

/// Tries every `2^choice_count` assignment of the tuple's output positions to `I` vs `O` and
/// returns `true` if some assignment keeps input-share usage (and output-share usage, for IOS)
/// within `tuple.len()`.
fn some_assignment_is_safe(circuit: &Circuit, tuple: &[usize], mode: Mode) -> bool {
    let output_range = circuit.output_wire_range();
    let output_positions: Vec<usize> = tuple.iter().copied().filter(|w| output_range.contains(w)).collect();
    let internal: Vec<usize> = tuple.iter().copied().filter(|w| !output_range.contains(w)).collect();
    let choice_count = output_positions.len();

    for assignment in 0..(1u32 << choice_count) {
        let mut state = GaussState::with_capacity(tuple.len());
        for &wire in &internal {
            insert_wire(&mut state, circuit, circuit.wires[wire].dep.clone());
        }
        let mut output_usage = 0usize;
        for (k, &wire) in output_positions.iter().enumerate() {
            if assignment & (1 << k) != 0 {
                insert_wire(&mut state, circuit, circuit.wires[wire].dep.clone());
            } else {
                output_usage += 1;
            }
        }

        let mut combined = [0u64; 2];
        for row in state.unpivoted_rows() {
            combined[0] |= row.secrets[0];
            combined[1] |= row.secrets[1];
        }
        let input_usage = combined[0].count_ones() as usize + combined[1].count_ones() as usize;

        let within_budget = input_usage <= tuple.len() && (mode == Mode::FreeSni || output_usage <= tuple.len());
        if within_budget {
            return true;
        }
    }
    false
}

pub fn verify(circuit: &Circuit, t: usize, mode: Mode, config: &EngineConfig) -> Result<VerificationOutcome> {
    check_output_uniformity(circuit)?;

    let (_, dim_red) = basic_reduce(circuit, false);
    let candidates: Vec<usize> = dim_red.new_to_old.clone();

    for size in 0..=t {
        let outcome = driver::parallel_search(config, &[], &candidates, size, true, |tuple| {
            (!some_assignment_is_safe(circuit, tuple, mode)).then_some([true, true])
        });
        if let Some((witness, _)) = outcome.first_failure {
            log::info!("free_sni::verify: {t}-{mode:?} fails, witness {witness:?}");
            return Ok(VerificationOutcome::Leaky {
                witness,
                leaked_inputs: vec![0, 1],
            });
        }
    }
    log::info!("free_sni::verify: {t}-{mode:?} holds");
    Ok(VerificationOutcome::Secure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn linear_refresh_is_one_free_sni_secure() {
        let (circuit, _) = fixtures::linear_refresh();
        let outcome = verify(&circuit, 1, Mode::FreeSni, &EngineConfig::single_threaded()).unwrap();
        assert_eq!(outcome, VerificationOutcome::Secure);
    }

    #[test]
    fn identity_gadget_fails_output_uniformity() {
        let (circuit, _) = fixtures::identity_gadget();
        let err = check_output_uniformity(&circuit).unwrap_err();
        assert!(matches!(err, VerifyError::MalformedCircuit { .. }));
    }
}
