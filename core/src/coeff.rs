//! The coefficient accumulator (§4.9): turns found failures into the leakage-probability
//! polynomial `f(p) = sum_j coeffs[j] * p^j * (1-p)^(N-j)` used by the RP/RPE/RPC family and,
//! ultimately, by CRP/CRPC's fault-and-leak composition.
//!
//! Every coefficient and every evaluation is computed with arbitrary-precision arithmetic
//! (`num-bigint`/`num-rational`): for circuits with a few hundred wires, `C(N, j)` and
//! `p^j (1-p)^(N-j)` both move well outside `f64`'s 53-bit mantissa long before `j` approaches
//! `N` (§9, design notes).

use num_bigint::BigUint;
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::comb::n_choose_k;

/// `update_coeff_c_single`: every superset of a `comb_len`-sized failure is itself a failure,
/// so the number of `j`-sized failures extending a given failure is exactly the number of ways
/// to pick the remaining `j - comb_len` wires from the `total_wires - comb_len` wires not in
/// the failure. `coeffs` is indexed by tuple size and resized to `total_wires + 1` on first use.
pub fn update_coeff_c_single(coeffs: &mut Vec<BigUint>, total_wires: usize, comb_len: usize) {
    if coeffs.len() < total_wires + 1 {
        coeffs.resize(total_wires + 1, BigUint::zero());
    }
    for j in comb_len..=total_wires {
        coeffs[j] += n_choose_k(total_wires - comb_len, j - comb_len);
    }
}

fn rational_pow(base: &BigRational, exp: usize) -> BigRational {
    let mut result = BigRational::one();
    for _ in 0..exp {
        result *= base;
    }
    result
}

/// Evaluates `f(p) = sum_j coeffs[j] * p^j * (1-p)^(total_wires-j)` exactly at a rational `p`,
/// using `num-rational` throughout so no precision is lost regardless of `total_wires`.
pub fn evaluate_at(coeffs: &[BigUint], total_wires: usize, p: &BigRational) -> BigRational {
    let one_minus_p = BigRational::one() - p;
    let mut total = BigRational::zero();
    for (j, c) in coeffs.iter().enumerate().take(total_wires + 1) {
        if c.is_zero() {
            continue;
        }
        let term = BigRational::from(c.clone().into()) * rational_pow(p, j) * rational_pow(&one_minus_p, total_wires - j);
        total += term;
    }
    total
}

/// How the coefficients beyond the highest computed tuple size are treated when only a partial
/// sweep (`coeffs[0..=known_up_to]`) has been run (§4.9, `compute_leakage_proba`):
/// substituting `0` gives a lower bound on `f(p)`, substituting `C(N, j)` (every possible tuple
/// of that size is pessimistically assumed to fail) gives an upper bound.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TailBound {
    Lower,
    Upper,
}

/// Extends a partial coefficient vector with a tail bound and evaluates `f(p)` at `p`.
pub fn compute_leakage_proba(
    coeffs: &[BigUint],
    total_wires: usize,
    known_up_to: usize,
    p: &BigRational,
    tail: TailBound,
) -> BigRational {
    let mut full = coeffs.to_vec();
    full.resize(total_wires + 1, BigUint::zero());
    for j in (known_up_to + 1)..=total_wires {
        full[j] = match tail {
            TailBound::Lower => BigUint::zero(),
            TailBound::Upper => n_choose_k(total_wires, j),
        };
    }
    evaluate_at(&full, total_wires, p)
}

/// The amplification order `d`: the smallest tuple size with a non-zero coefficient (§GLOSSARY,
/// "Amplification order"). `None` if every coefficient so far is zero.
pub fn amplification_order(coeffs: &[BigUint]) -> Option<usize> {
    coeffs.iter().position(|c| !c.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn half() -> BigRational {
        BigRational::new(BigInt::from(1), BigInt::from(2))
    }

    #[test]
    fn update_coeff_on_single_wire_gadget_matches_the_spec_example() {
        // "RP on a single-wire gadget copying x_0. coeffs = [0, 1]" (§8).
        let mut coeffs = Vec::new();
        update_coeff_c_single(&mut coeffs, 1, 1);
        assert_eq!(coeffs, vec![BigUint::zero(), BigUint::one()]);
    }

    #[test]
    fn evaluate_at_half_for_single_wire_gadget_is_one_half() {
        let mut coeffs = Vec::new();
        update_coeff_c_single(&mut coeffs, 1, 1);
        let f = evaluate_at(&coeffs, 1, &half());
        assert_eq!(f, half());
    }

    #[test]
    fn amplification_order_finds_first_nonzero_coefficient() {
        let coeffs = vec![BigUint::zero(), BigUint::zero(), BigUint::from(3u32)];
        assert_eq!(amplification_order(&coeffs), Some(2));
        assert_eq!(amplification_order(&[BigUint::zero(); 3]), None);
    }

    #[test]
    fn upper_bound_never_smaller_than_lower_bound() {
        let coeffs = vec![BigUint::zero(), BigUint::one()];
        let p = BigRational::new(BigInt::from(1), BigInt::from(3));
        let lower = compute_leakage_proba(&coeffs, 4, 1, &p, TailBound::Lower);
        let upper = compute_leakage_proba(&coeffs, 4, 1, &p, TailBound::Upper);
        assert!(lower <= upper);
    }
}
