//! Bit-packed dependency algebra (§4.1).
//!
//! A [`BitDep`] is the compact, fixed-shape symbolic value the engine actually computes with:
//! rather than the parser's dense per-position integer vector, each field of contributions
//! (secret shares, randoms, multiplication terms, correction outputs) is packed into a bitset
//! of `u64` words. XOR-ing two `BitDep`s computes the symbolic value of the XOR of the two
//! probes they describe; this is the only algebraic operation Gaussian elimination needs.
//!
//! Bitvector lengths (`bit_rand_len`, `bit_mult_len`, `bit_correction_outputs_len`) are derived
//! once from circuit metadata and never stored on the row itself — every function here takes
//! them as parameters, exactly as the design notes require ("rows do not store their own
//! lengths").

use gadget_verify_util::ceil_div_usize;

/// Number of bits per dependency word.
pub const WORD_BITS: usize = 64;

/// Number of `u64` words needed to hold `bits` flags.
pub const fn words_for_bits(bits: usize) -> usize {
    ceil_div_usize(bits, WORD_BITS)
}

/// The compact, fixed-shape symbolic value of a probe (§3, "BitDep (compact form)").
///
/// `secrets[i]` is a bitmask over the `n` shares of secret input `i` (`i < 2`); `n <= 63` so a
/// single `u64` always suffices. `randoms`, `mults` and `correction_outputs` are variable-width
/// bitsets whose word count is fixed for a whole circuit and carried alongside, not inside,
/// the row.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BitDep {
    pub secrets: [u64; 2],
    pub randoms: Vec<u64>,
    pub mults: Vec<u64>,
    pub correction_outputs: Vec<u64>,
    pub constant: bool,
    /// Output-share bitmask; only meaningful to the free-SNI/IOS driver.
    pub out: u64,
}

impl BitDep {
    /// Builds an all-zero row shaped for a circuit with `rand_words`/`mult_words`/
    /// `correction_words` words in each variable-width field.
    pub fn zeroed(rand_words: usize, mult_words: usize, correction_words: usize) -> Self {
        Self {
            secrets: [0, 0],
            randoms: vec![0; rand_words],
            mults: vec![0; mult_words],
            correction_outputs: vec![0; correction_words],
            constant: false,
            out: 0,
        }
    }

    /// Resets `self` to all-zero in place, keeping the existing word-count allocation. Used on
    /// the hot path to recycle scratch rows across tuples without reallocating.
    pub fn zero_out(&mut self) {
        self.secrets = [0, 0];
        self.randoms.iter_mut().for_each(|w| *w = 0);
        self.mults.iter_mut().for_each(|w| *w = 0);
        self.correction_outputs.iter_mut().for_each(|w| *w = 0);
        self.constant = false;
        self.out = 0;
    }

    /// Copies `other` into `self` without reallocating, as long as the shapes already match.
    pub fn copy_from(&mut self, other: &BitDep) {
        self.secrets = other.secrets;
        self.randoms.copy_from_slice(&other.randoms);
        self.mults.copy_from_slice(&other.mults);
        self.correction_outputs
            .copy_from_slice(&other.correction_outputs);
        self.constant = other.constant;
        self.out = other.out;
    }

    /// XORs `other` into `self` in place. This is the one algebraic operation the rest of the
    /// engine needs: gauss elimination, multiplication factorization and failure reconstruction
    /// are all built from it.
    pub fn xor_in_place(&mut self, other: &BitDep) {
        self.secrets[0] ^= other.secrets[0];
        self.secrets[1] ^= other.secrets[1];
        for (a, b) in self.randoms.iter_mut().zip(&other.randoms) {
            *a ^= b;
        }
        for (a, b) in self.mults.iter_mut().zip(&other.mults) {
            *a ^= b;
        }
        for (a, b) in self.correction_outputs.iter_mut().zip(&other.correction_outputs) {
            *a ^= b;
        }
        self.constant ^= other.constant;
        self.out ^= other.out;
    }

    /// Returns a new row that is the XOR of `self` and `other`.
    pub fn xor(&self, other: &BitDep) -> BitDep {
        let mut result = self.clone();
        result.xor_in_place(other);
        result
    }

    pub fn is_zero(&self) -> bool {
        self.secrets == [0, 0]
            && self.randoms.iter().all(|&w| w == 0)
            && self.mults.iter().all(|&w| w == 0)
            && self.correction_outputs.iter().all(|&w| w == 0)
            && !self.constant
            && self.out == 0
    }

    /// Popcount across the secret-share field of input `i`.
    pub fn popcount_secrets(&self, i: usize) -> u32 {
        self.secrets[i].count_ones()
    }

    pub fn popcount_randoms(&self) -> u32 {
        self.randoms.iter().map(|w| w.count_ones()).sum()
    }

    pub fn popcount_mults(&self) -> u32 {
        self.mults.iter().map(|w| w.count_ones()).sum()
    }

    pub fn popcount_correction_outputs(&self) -> u32 {
        self.correction_outputs.iter().map(|w| w.count_ones()).sum()
    }

    /// True if any correction-output bit is set; used by gauss elimination to decide whether a
    /// row needs `replace_correction_outputs_in_dep` expansion.
    pub fn has_correction_outputs(&self) -> bool {
        self.correction_outputs.iter().any(|&w| w != 0)
    }

    /// True if any random bit is set.
    pub fn has_randoms(&self) -> bool {
        self.randoms.iter().any(|&w| w != 0)
    }

    /// Index (word, bit-within-word) of the highest-order set random bit in the lowest
    /// non-zero word, or `None` if `randoms` is entirely zero. This is the scan
    /// `set_gauss_rand` performs before applying the correction-output exclusion rule.
    pub fn highest_random_bit(&self) -> Option<(usize, u32)> {
        for (idx, &word) in self.randoms.iter().enumerate() {
            if word != 0 {
                let bit = WORD_BITS as u32 - 1 - word.leading_zeros();
                return Some((idx, bit));
            }
        }
        None
    }

    /// Candidate pivot randoms in priority order: lowest non-zero word first, then
    /// highest-to-lowest bit within that word, then the next non-zero word. This is the scan
    /// order `set_gauss_rand` (§4.2) walks when its first candidate is rejected by the
    /// correction-output exclusion rule.
    pub fn random_bit_candidates(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.randoms.iter().enumerate().flat_map(|(idx, &word)| {
            (0..WORD_BITS as u32).rev().filter_map(move |bit| (word & (1u64 << bit) != 0).then_some((idx, bit)))
        })
    }

    /// Clears bit `bit` of word `idx` in the randoms field.
    pub fn clear_random_bit(&mut self, idx: usize, bit: u32) {
        self.randoms[idx] &= !(1u64 << bit);
    }

    pub fn set_random_bit(&mut self, idx: usize, bit: u32) {
        self.randoms[idx] |= 1u64 << bit;
    }

    pub fn random_bit(&self, idx: usize, bit: u32) -> bool {
        self.randoms[idx] & (1u64 << bit) != 0
    }

    pub fn set_correction_output_bit(&mut self, idx: usize, bit: u32) {
        self.correction_outputs[idx] |= 1u64 << bit;
    }

    pub fn clear_correction_output_bit(&mut self, idx: usize, bit: u32) {
        self.correction_outputs[idx] &= !(1u64 << bit);
    }

    pub fn correction_output_bit(&self, idx: usize, bit: u32) -> bool {
        self.correction_outputs[idx] & (1u64 << bit) != 0
    }

    /// Iterates every set bit of the correction-outputs field as a flat index.
    pub fn correction_output_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.correction_outputs.iter().enumerate().flat_map(|(word_idx, &word)| {
            (0..WORD_BITS).filter_map(move |bit| {
                (word & (1u64 << bit) != 0).then_some(word_idx * WORD_BITS + bit)
            })
        })
    }

    /// Iterates every set bit of the mults field as a flat index.
    pub fn mult_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.mults.iter().enumerate().flat_map(|(word_idx, &word)| {
            (0..WORD_BITS).filter_map(move |bit| {
                (word & (1u64 << bit) != 0).then_some(word_idx * WORD_BITS + bit)
            })
        })
    }

    pub fn mult_bit(&self, index: usize) -> bool {
        self.mults[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    pub fn set_mult_bit(&mut self, index: usize) {
        self.mults[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
    }

    pub fn clear_mult_bit(&mut self, index: usize) {
        self.mults[index / WORD_BITS] &= !(1u64 << (index % WORD_BITS));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(rand_words: usize) -> BitDep {
        BitDep::zeroed(rand_words, 1, 1)
    }

    #[test]
    fn xor_is_its_own_inverse() {
        let mut a = row(2);
        a.secrets[0] = 0b101;
        a.set_random_bit(0, 3);
        let b = a.clone();
        a.xor_in_place(&b);
        assert!(a.is_zero());
    }

    #[test]
    fn zero_out_clears_everything_but_keeps_shape() {
        let mut a = row(2);
        a.secrets[1] = 7;
        a.constant = true;
        a.set_mult_bit(0);
        a.zero_out();
        assert!(a.is_zero());
        assert_eq!(a.randoms.len(), 2);
    }

    #[test]
    fn highest_random_bit_scans_lowest_nonzero_word_msb_first() {
        let mut a = row(2);
        a.set_random_bit(1, 2);
        a.set_random_bit(1, 5);
        assert_eq!(a.highest_random_bit(), Some((1, 5)));
    }

    #[test]
    fn highest_random_bit_none_when_empty() {
        assert_eq!(row(3).highest_random_bit(), None);
    }

    #[test]
    fn mult_indices_round_trip_through_set_clear() {
        let mut a = BitDep::zeroed(1, 2, 1);
        a.set_mult_bit(0);
        a.set_mult_bit(70);
        let idxs: Vec<_> = a.mult_indices().collect();
        assert_eq!(idxs, vec![0, 70]);
        a.clear_mult_bit(0);
        assert!(!a.mult_bit(0));
        assert!(a.mult_bit(70));
    }

    #[test]
    fn words_for_bits_rounds_up() {
        assert_eq!(words_for_bits(0), 0);
        assert_eq!(words_for_bits(1), 1);
        assert_eq!(words_for_bits(64), 1);
        assert_eq!(words_for_bits(65), 2);
    }
}
