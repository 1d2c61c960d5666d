//! The circuit data model (§3) and the trait boundary external collaborators (the textual
//! gadget parser, the expression-to-dependency lowering, the glitch/transition expander) must
//! satisfy to hand a circuit to the engine (§3.1).
//!
//! The parser itself is out of scope for this crate; [`CircuitSource`] and [`MultSource`] fix
//! the shape it must produce, and [`Circuit::from_source`] does the one-time bit-packing work
//! (dense [`Dependency`] vectors into [`BitDep`] rows, derived bit-widths, [`MultDependency`]
//! invariant checks) so the rest of the engine only ever sees the compact form.

use crate::bitdep::{words_for_bits, BitDep};
use crate::error::{Result, VerifyError};

/// The parser's per-wire dense dependency vector (§3, "Dependency (dense form)"): one flag per
/// secret share, random, correction-output placeholder and multiplication term, plus a
/// constant flag. This is the natural output of expression-to-dependency lowering; the engine
/// never works with it directly; [`Circuit::from_source`] bit-packs it into a [`BitDep`] once.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Dependency {
    /// `secrets[i][j]` is set iff this dependency carries share `j` of secret input `i`.
    pub secrets: [Vec<bool>; 2],
    pub randoms: Vec<bool>,
    pub correction_outputs: Vec<bool>,
    pub mults: Vec<bool>,
    pub constant: bool,
}

impl Dependency {
    pub fn empty(share_count: usize, random_count: usize, correction_count: usize, mult_count: usize) -> Self {
        Self {
            secrets: [vec![false; share_count], vec![false; share_count]],
            randoms: vec![false; random_count],
            correction_outputs: vec![false; correction_count],
            mults: vec![false; mult_count],
            constant: false,
        }
    }

    fn pack_bits(flags: &[bool], word_count: usize) -> Vec<u64> {
        let mut words = vec![0u64; word_count];
        for (i, &flag) in flags.iter().enumerate() {
            if flag {
                words[i / 64] |= 1u64 << (i % 64);
            }
        }
        words
    }

    /// Bit-packs this dense vector into a [`BitDep`] shaped for the given variable-width word
    /// counts (shared across the whole circuit, hence passed in rather than recomputed).
    pub fn pack(&self, rand_words: usize, mult_words: usize, correction_words: usize) -> BitDep {
        let mut secrets = [0u64; 2];
        for i in 0..2 {
            for (j, &flag) in self.secrets[i].iter().enumerate() {
                if flag {
                    secrets[i] |= 1u64 << j;
                }
            }
        }
        BitDep {
            secrets,
            randoms: Self::pack_bits(&self.randoms, rand_words),
            mults: Self::pack_bits(&self.mults, mult_words),
            correction_outputs: Self::pack_bits(&self.correction_outputs, correction_words),
            constant: self.constant,
            out: 0,
        }
    }
}

/// A single wire ("var") of the circuit: an index, a printable name, and its packed dependency.
#[derive(Clone, Debug)]
pub struct Wire {
    pub index: usize,
    pub name: String,
    pub dep: BitDep,
}

/// One multiplication term `left * right` (§3, "MultDependency").
///
/// The constructor invariants mirror the ones the original tool's compiler enforces on the
/// gadget source: for every share position only one operand may carry input-`i` share `j`, and
/// every random may appear in at most one operand. Violating either means the gadget multiplies
/// two shares of the same secret together, or reuses a single random on both multiplicands —
/// both are circuit-format errors, not something the engine can route around.
#[derive(Clone, Debug)]
pub struct MultDependency {
    pub left: BitDep,
    pub right: BitDep,
    /// `contained_secrets[i]` is the union of share masks of secret `i` across both operands;
    /// cached because the failure-predicate and factorizer consult it on every probe.
    pub contained_secrets: [u64; 2],
}

impl MultDependency {
    pub fn new(name: &str, left: BitDep, right: BitDep) -> Result<Self> {
        for i in 0..2 {
            if left.secrets[i] & right.secrets[i] != 0 {
                return Err(VerifyError::malformed(
                    name,
                    format!("input {i} has a share appearing on both sides of a multiplication"),
                ));
            }
        }
        for (l, r) in left.randoms.iter().zip(&right.randoms) {
            if l & r != 0 {
                return Err(VerifyError::malformed(
                    name,
                    "a random appears on both sides of a multiplication",
                ));
            }
        }
        let contained_secrets = [left.secrets[0] | right.secrets[0], left.secrets[1] | right.secrets[1]];
        Ok(Self {
            left,
            right,
            contained_secrets,
        })
    }
}

/// What a gadget-description collaborator (the textual parser, in the full system) must supply
/// about each wire. Out of scope for this crate; fixed here only as the trait boundary so the
/// engine can be built and tested against small hand-written fixtures (see
/// [`crate::fixtures`]) without a real parser.
pub trait CircuitSource {
    fn share_count(&self) -> usize;
    fn secret_count(&self) -> usize;
    fn output_count(&self) -> usize;
    fn random_count(&self) -> usize;
    fn correction_output_count(&self) -> usize;
    fn nb_duplications(&self) -> usize;
    fn has_input_rands(&self) -> bool;
    fn wire_count(&self) -> usize;
    fn wire_name(&self, index: usize) -> String;
    fn dependency(&self, index: usize) -> Dependency;
    /// The precomputed expansion list for a correction-output placeholder: the rows to insert
    /// (and gauss-step) when `replace_correction_outputs_in_dep` (§4.2) encounters it.
    fn correction_output_expansion(&self, correction_index: usize) -> Vec<Dependency>;
}

/// What a gadget-description collaborator must supply about each multiplication term.
pub trait MultSource {
    fn mult_count(&self) -> usize;
    fn mult_name(&self, index: usize) -> String;
    fn operands(&self, index: usize) -> (Dependency, Dependency);
}

/// A fully bit-packed circuit, ready for the engine's property drivers.
#[derive(Clone, Debug)]
pub struct Circuit {
    pub share_count: usize,
    pub secret_count: usize,
    pub output_count: usize,
    pub random_count: usize,
    pub correction_output_count: usize,
    pub nb_duplications: usize,
    pub contains_mults: bool,
    pub has_input_rands: bool,

    pub wires: Vec<Wire>,
    pub mults: Vec<MultDependency>,
    /// Precomputed expansion rows for each correction-output bit, already bit-packed.
    pub correction_output_expansions: Vec<Vec<BitDep>>,
    /// For each correction-output bit, the union of the `randoms` fields across its expansion
    /// rows. `set_gauss_rand` (§4.2) uses this to reject a candidate pivot random that is fully
    /// "explained" by a correction output already bound to the row, so correction outputs can
    /// never mask an otherwise-independent random.
    pub correction_output_column_masks: Vec<Vec<u64>>,

    pub bit_rand_len: usize,
    pub bit_mult_len: usize,
    pub bit_correction_outputs_len: usize,
}

impl Circuit {
    /// The wires that carry output shares: the last `output_count * share_count` vars.
    pub fn output_wire_range(&self) -> std::ops::Range<usize> {
        let total = self.wires.len();
        let output_wires = self.output_count * self.share_count;
        (total - output_wires)..total
    }

    pub fn length(&self) -> usize {
        self.wires.len()
    }

    /// Builds a [`Circuit`] from a [`CircuitSource`] + [`MultSource`] pair, bit-packing every
    /// dependency and checking every [`MultDependency`] invariant once, up front, so the rest
    /// of the engine can assume a well-formed circuit (§3.1).
    pub fn from_source<S: CircuitSource, M: MultSource>(source: &S, mults: &M) -> Result<Self> {
        let share_count = source.share_count();
        if share_count == 0 || share_count > 63 {
            return Err(VerifyError::Config(format!(
                "share_count must be in 1..=63, got {share_count}"
            )));
        }
        let secret_count = source.secret_count();
        if secret_count == 0 || secret_count > 2 {
            return Err(VerifyError::Config(format!(
                "secret_count must be 1 or 2, got {secret_count}"
            )));
        }

        let random_count = source.random_count();
        let mult_count = mults.mult_count();
        let correction_output_count = source.correction_output_count();

        let bit_rand_len = words_for_bits(random_count).max(1);
        let bit_mult_len = words_for_bits(mult_count).max(1);
        let bit_correction_outputs_len = words_for_bits(correction_output_count).max(1);

        let mut wires = Vec::with_capacity(source.wire_count());
        for index in 0..source.wire_count() {
            let dep = source.dependency(index).pack(bit_rand_len, bit_mult_len, bit_correction_outputs_len);
            wires.push(Wire {
                index,
                name: source.wire_name(index),
                dep,
            });
        }

        let mut mult_deps = Vec::with_capacity(mult_count);
        for index in 0..mult_count {
            let (left, right) = mults.operands(index);
            let left = left.pack(bit_rand_len, bit_mult_len, bit_correction_outputs_len);
            let right = right.pack(bit_rand_len, bit_mult_len, bit_correction_outputs_len);
            mult_deps.push(MultDependency::new(&mults.mult_name(index), left, right)?);
        }

        let mut correction_output_expansions = Vec::with_capacity(correction_output_count);
        for index in 0..correction_output_count {
            let expansion = source
                .correction_output_expansion(index)
                .into_iter()
                .map(|dep| dep.pack(bit_rand_len, bit_mult_len, bit_correction_outputs_len))
                .collect();
            correction_output_expansions.push(expansion);
        }

        let correction_output_column_masks = correction_output_expansions
            .iter()
            .map(|expansion| {
                let mut mask = vec![0u64; bit_rand_len];
                for dep in expansion {
                    for (m, r) in mask.iter_mut().zip(&dep.randoms) {
                        *m |= r;
                    }
                }
                mask
            })
            .collect();

        Ok(Self {
            share_count,
            secret_count,
            output_count: source.output_count(),
            random_count,
            correction_output_count,
            nb_duplications: source.nb_duplications(),
            contains_mults: mult_count > 0,
            has_input_rands: source.has_input_rands(),
            wires,
            mults: mult_deps,
            correction_output_expansions,
            correction_output_column_masks,
            bit_rand_len,
            bit_mult_len,
            bit_correction_outputs_len,
        })
    }

    pub fn zero_row(&self) -> BitDep {
        BitDep::zeroed(self.bit_rand_len, self.bit_mult_len, self.bit_correction_outputs_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_round_trips_secret_bits() {
        let mut dep = Dependency::empty(3, 2, 0, 0);
        dep.secrets[0][1] = true;
        dep.randoms[0] = true;
        let packed = dep.pack(1, 1, 1);
        assert_eq!(packed.secrets[0], 0b010);
        assert_eq!(packed.randoms[0], 0b01);
    }

    #[test]
    fn mult_dependency_rejects_shared_input_share() {
        let mut left = BitDep::zeroed(1, 1, 1);
        left.secrets[0] = 0b01;
        let mut right = BitDep::zeroed(1, 1, 1);
        right.secrets[0] = 0b01;
        let err = MultDependency::new("m0", left, right).unwrap_err();
        assert!(matches!(err, VerifyError::MalformedCircuit { .. }));
    }

    #[test]
    fn mult_dependency_rejects_shared_random() {
        let mut left = BitDep::zeroed(1, 1, 1);
        left.set_random_bit(0, 0);
        let mut right = BitDep::zeroed(1, 1, 1);
        right.set_random_bit(0, 0);
        let err = MultDependency::new("m0", left, right).unwrap_err();
        assert!(matches!(err, VerifyError::MalformedCircuit { .. }));
    }

    #[test]
    fn mult_dependency_accepts_disjoint_operands() {
        let mut left = BitDep::zeroed(1, 1, 1);
        left.secrets[0] = 0b01;
        left.set_random_bit(0, 0);
        let mut right = BitDep::zeroed(1, 1, 1);
        right.secrets[0] = 0b10;
        right.set_random_bit(0, 1);
        let m = MultDependency::new("m0", left, right).unwrap();
        assert_eq!(m.contained_secrets[0], 0b11);
    }
}
