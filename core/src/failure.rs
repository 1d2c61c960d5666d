//! The failure predicate (§4.5): after reduction and Gaussian elimination, decides whether a
//! tuple leaks more shares of some secret input than the probing order allows.

use itertools::Itertools;

use crate::bitdep::BitDep;
use crate::circuit::Circuit;
use crate::gauss::GaussState;

/// Parameters the failure predicate needs beyond the gauss state itself.
#[derive(Clone, Debug)]
pub struct FailureConfig {
    /// The maximum number of shares of an input a tuple may legitimately touch.
    pub t_in: usize,
    /// Extra room the caller can still fill when reconstructing a reduced tuple back to full
    /// size (§4.4, "Reconstruction"); `0` for a direct, non-reduced search.
    pub comb_free_space: usize,
    /// PINI mode: treat the two inputs as one by OR-ing `secrets[0] |= secrets[1]` (§4.5).
    pub pini: bool,
    /// Output-share (or other) positions already conceded and excluded from the popcount,
    /// indexed like `pini` dictates: `shares_to_ignore[0]` is used directly in PINI mode,
    /// `shares_to_ignore[i]` per input otherwise.
    pub shares_to_ignore: [u64; 2],
}

impl FailureConfig {
    pub fn threshold(&self) -> usize {
        self.t_in.saturating_sub(self.comb_free_space)
    }
}

/// The shares of `input` that a row's multiplication-term bits expose even though the row was
/// never routed through the factorizer ([`crate::properties::insert_wire`] only factorizes when
/// the circuit's inputs are refreshed before being multiplied, §4.3). A multiplication term that
/// still sits on an unpivoted row after elimination is itself a witness that both its operands'
/// shares are recoverable, the same way the original tool's `!has_input_rands` special case folds
/// `contained_secrets` of every live mult bit into the leakage mask directly rather than via
/// Gaussian elimination on factor rows.
fn mult_secrets_mask(circuit: &Circuit, row: &BitDep, input: usize) -> u64 {
    row.mult_indices().fold(0u64, |acc, m| acc | circuit.mults[m].contained_secrets[input])
}

fn combined_mask(state: &GaussState, circuit: &Circuit, input: usize, ignore: u64) -> u64 {
    state
        .unpivoted_rows()
        .fold(0u64, |acc, row| acc | row.secrets[input] | mult_secrets_mask(circuit, row, input))
        & !ignore
}

fn combined_mask_pini(state: &GaussState, circuit: &Circuit, ignore: u64) -> u64 {
    state
        .unpivoted_rows()
        .fold(0u64, |acc, row| {
            acc | row.secrets[0]
                | row.secrets[1]
                | mult_secrets_mask(circuit, row, 0)
                | mult_secrets_mask(circuit, row, 1)
        })
        & !ignore
}

/// Evaluates the failure predicate against an already gauss-reduced tuple. Returns which
/// input(s) leak, or `None` if the tuple is secure at this threshold.
pub fn check_failure(state: &GaussState, circuit: &Circuit, cfg: &FailureConfig) -> Option<[bool; 2]> {
    let threshold = cfg.threshold();
    if cfg.pini {
        let mask = combined_mask_pini(state, circuit, cfg.shares_to_ignore[0]);
        (mask.count_ones() as usize > threshold).then_some([true, true])
    } else {
        let mut leaked = [false; 2];
        for i in 0..2 {
            let mask = combined_mask(state, circuit, i, cfg.shares_to_ignore[i]);
            leaked[i] = mask.count_ones() as usize > threshold;
        }
        leaked.contains(&true).then_some(leaked)
    }
}

/// Additional random augmentation (§4.5): when randoms were pre-removed by dimension reduction
/// (the probing-only model), a tuple that does not yet fail is re-checked by trying every
/// subset of size `<= comb_free_space` of the randoms appearing across its raw rows: each
/// candidate subset is zeroed out of the rows (simulating those randoms having been fixed to a
/// constant by the adversary's fault budget) and gauss elimination is rerun from scratch. If
/// any subset's resulting leakage clears the un-discounted threshold, the tuple is a failure.
///
/// `raw_rows` must be the tuple's rows *before* gauss elimination, so their `randoms` fields
/// still reflect which randoms were actually involved.
pub fn augment_with_additional_randoms(
    raw_rows: &[BitDep],
    circuit: &Circuit,
    t_in: usize,
    pini: bool,
    shares_to_ignore: [u64; 2],
    comb_free_space: usize,
) -> Option<[bool; 2]> {
    let mut present = Vec::new();
    for row in raw_rows {
        for (idx, bit) in row.random_bit_candidates() {
            if !present.contains(&(idx, bit)) {
                present.push((idx, bit));
            }
        }
    }

    for size in 0..=comb_free_space.min(present.len()) {
        for subset in present.iter().copied().combinations(size) {
            let mut state = GaussState::with_capacity(raw_rows.len());
            for row in raw_rows {
                let mut candidate = row.clone();
                for &(idx, bit) in &subset {
                    candidate.clear_random_bit(idx, bit);
                }
                let reduced = state.replace_correction_outputs_in_dep(candidate, circuit);
                state.gauss_step(reduced, circuit);
            }
            let cfg = FailureConfig {
                t_in,
                comb_free_space: 0,
                pini,
                shares_to_ignore,
            };
            if let Some(leak) = check_failure(&state, circuit, &cfg) {
                return Some(leak);
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
    fn identity_gadget_both_shares_together_leak_input() {
        let (circuit, _) = fixtures::identity_gadget();
        let mut state = GaussState::new();
        for wire in &circuit.wires[2..4] {
            state.gauss_step(wire.dep.clone(), &circuit);
        }
        let cfg = FailureConfig {
            t_in: 1,
            comb_free_space: 0,
            pini: false,
            shares_to_ignore: [0, 0],
        };
        let leak = check_failure(&state, &circuit, &cfg).unwrap();
        assert!(leak[0]);
    }

    #[test]
    fn single_share_alone_does_not_leak_at_threshold_one() {
        let (circuit, _) = fixtures::identity_gadget();
        let mut state = GaussState::new();
        state.gauss_step(circuit.wires[2].dep.clone(), &circuit);
        let cfg = FailureConfig {
            t_in: 1,
            comb_free_space: 0,
            pini: false,
            shares_to_ignore: [0, 0],
        };
        assert!(check_failure(&state, &circuit, &cfg).is_none());
    }

    #[test]
    fn linear_refresh_single_output_share_does_not_leak() {
        let (circuit, _) = fixtures::linear_refresh();
        let mut state = GaussState::new();
        state.gauss_step(circuit.wires[3].dep.clone(), &circuit);
        let cfg = FailureConfig {
            t_in: 1,
            comb_free_space: 0,
            pini: false,
            shares_to_ignore: [0, 0],
        };
        assert!(check_failure(&state, &circuit, &cfg).is_none());
    }
}
