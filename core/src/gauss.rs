//! Online Gaussian elimination over GF(2), keyed by pivot randoms (§4.2).
//!
//! Rows are added to a [`GaussState`] one at a time as wires are folded into the tuple under
//! test. Each row is first reduced against every earlier row that already has a pivot, then is
//! itself given a pivot if one of its own randoms survives — chosen so that correction-output
//! placeholders can never stand in for, and thereby hide, an otherwise independent random
//! (§9, design notes: "correction outputs do not mask independent randoms").
//!
//! Pivot choice depends only on the order rows are inserted and the deterministic rule in
//! [`set_gauss_rand`]; the same insertion sequence always produces the same pivots and hence
//! the same leakage classification.

use crate::bitdep::BitDep;
use crate::circuit::Circuit;

/// Per-row pivot marker. `mask == 0` (equivalently `is_set == false`) means the row has no
/// pivot and therefore contributes to leakage accounting.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GaussRand {
    pub is_set: bool,
    /// Word index into a row's `randoms` field.
    pub idx: usize,
    /// Single-bit mask of the pivot within that word.
    pub mask: u64,
}

impl GaussRand {
    pub const NONE: GaussRand = GaussRand {
        is_set: false,
        idx: 0,
        mask: 0,
    };

    /// Whether `row` still carries this pivot's random bit set.
    pub fn present_in(&self, row: &BitDep) -> bool {
        self.is_set && row.randoms[self.idx] & self.mask != 0
    }
}

/// Chooses the pivot of `row`, rejecting any candidate random that is entirely explained by a
/// correction output already bound to the row (§4.2).
pub fn set_gauss_rand(row: &BitDep, circuit: &Circuit) -> GaussRand {
    let mut covered = vec![0u64; circuit.bit_rand_len];
    if row.has_correction_outputs() {
        for c in row.correction_output_indices() {
            let mask = &circuit.correction_output_column_masks[c];
            for (cov, m) in covered.iter_mut().zip(mask) {
                *cov |= m;
            }
        }
    }

    for (idx, bit) in row.random_bit_candidates() {
        let bit_mask = 1u64 << bit;
        if covered[idx] & bit_mask == 0 {
            return GaussRand {
                is_set: true,
                idx,
                mask: bit_mask,
            };
        }
    }
    GaussRand::NONE
}

/// The online eliminator's working state: the rows inserted so far and their chosen pivots.
/// Reused across tuples by calling [`GaussState::clear`] rather than reallocating (§9,
/// "dynamic allocation hot paths").
#[derive(Clone, Debug, Default)]
pub struct GaussState {
    pub rows: Vec<BitDep>,
    pub pivots: Vec<GaussRand>,
}

impl GaussState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            pivots: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resets the state for a new tuple without freeing the underlying allocations.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.pivots.clear();
    }

    /// Truncates back to `len` rows, used when the enumerator reports that only a prefix of
    /// the previous tuple survives (`next_comb`'s returned changed-index, §4.6).
    pub fn truncate(&mut self, len: usize) {
        self.rows.truncate(len);
        self.pivots.truncate(len);
    }

    /// Reduces `row` against every pivot already present in the state, in place.
    pub fn reduce_against_pivots(&self, row: &mut BitDep) {
        for (earlier, pivot) in self.rows.iter().zip(&self.pivots) {
            if pivot.present_in(row) {
                row.xor_in_place(earlier);
            }
        }
    }

    /// `gauss_step`: places `new_row`, reduces it against every earlier pivoted row, chooses its
    /// own pivot, and appends it to the state. Returns the index it was inserted at.
    pub fn gauss_step(&mut self, mut new_row: BitDep, circuit: &Circuit) -> usize {
        self.reduce_against_pivots(&mut new_row);
        let pivot = set_gauss_rand(&new_row, circuit);
        let idx = self.rows.len();
        log::trace!("gauss_step: row {idx} pivot_set={}", pivot.is_set);
        self.rows.push(new_row);
        self.pivots.push(pivot);
        idx
    }

    /// `replace_correction_outputs_in_dep`: expands every correction-output bit referenced by
    /// `row`, inserting the expansion rows into the state (gauss-stepping each one against the
    /// current pivots) and folding their reduced value into `row` in place of the placeholder
    /// bit it replaces. Recurses until `row` carries no correction-output bit, since a nested
    /// placeholder inside one expansion is folded into `row` the same way and is picked up by
    /// the next iteration.
    pub fn replace_correction_outputs_in_dep(&mut self, mut row: BitDep, circuit: &Circuit) -> BitDep {
        loop {
            let bits: Vec<usize> = row.correction_output_indices().collect();
            if bits.is_empty() {
                return row;
            }
            for c in bits {
                row.clear_correction_output_bit(c / 64, (c % 64) as u32);
                for expansion_row in &circuit.correction_output_expansions[c] {
                    let mut inserted = expansion_row.clone();
                    self.reduce_against_pivots(&mut inserted);
                    row.xor_in_place(&inserted);
                    self.gauss_step(inserted, circuit);
                }
            }
        }
    }

    /// Rows that ended up without a pivot: these are the rows whose symbolic value, after
    /// elimination, still carries secrets/mults/correction-outputs/constant/out and therefore
    /// contributes to leakage accounting (§4.5).
    pub fn unpivoted_rows(&self) -> impl Iterator<Item = &BitDep> {
        self.rows
            .iter()
            .zip(&self.pivots)
            .filter(|(_, pivot)| !pivot.is_set)
            .map(|(row, _)| row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn second_row_sharing_a_random_eliminates_against_the_first() {
        let (circuit, _) = fixtures::linear_refresh();
        let mut state = GaussState::new();

        let mut a = circuit.zero_row();
        a.secrets[0] = 0b01;
        a.set_random_bit(0, 0);
        state.gauss_step(a, &circuit);

        let mut b = circuit.zero_row();
        b.secrets[0] = 0b10;
        b.set_random_bit(0, 0);
        let idx = state.gauss_step(b, &circuit);

        // The second row shares the first row's pivot random, so it must have been XORed away,
        // leaving no pivot and a combined secret mask.
        assert!(!state.pivots[idx].is_set);
        assert_eq!(state.rows[idx].secrets[0], 0b11);
    }

    #[test]
    fn row_without_randoms_never_gets_a_pivot() {
        let (circuit, _) = fixtures::linear_refresh();
        let mut state = GaussState::new();
        let mut row = circuit.zero_row();
        row.secrets[0] = 0b01;
        let idx = state.gauss_step(row, &circuit);
        assert!(!state.pivots[idx].is_set);
    }

    #[test]
    fn clear_resets_without_shrinking_capacity() {
        let (circuit, _) = fixtures::linear_refresh();
        let mut state = GaussState::with_capacity(4);
        let mut row = circuit.zero_row();
        row.set_random_bit(0, 0);
        state.gauss_step(row, &circuit);
        state.clear();
        assert_eq!(state.len(), 0);
        assert!(state.rows.capacity() >= 4);
    }
}
