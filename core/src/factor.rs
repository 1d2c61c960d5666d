//! Multiplication factorization (§4.3).
//!
//! A probe whose dependency carries a multiplication-term bit without the product's inputs
//! having been refreshed cannot be reduced by [`crate::gauss`] directly: the pivot random, if
//! any, is hidden inside a product `(Σ aᵢ)(Σ bⱼ)` rather than appearing linearly in the row.
//! Factorization rewrites that product as `Σ_{a ∈ left} a·(Σ b) + Σ_{b ∈ right} b·(Σ a)`,
//! producing one new row per singleton share on either side, each carrying the *other*
//! operand's full dependency. These factor rows are re-gauss-stepped like any other row; a
//! factor row that keeps a pivot means the corresponding single share is still masked by a
//! fresh random, while one that loses its pivot exposes that single share directly.

use crate::bitdep::BitDep;
use crate::circuit::Circuit;
use crate::error::{Result, VerifyError};

/// One term of a factored product: probing `row` is equivalent to probing `source_share`
/// (a single share of one input) combined linearly with everything in `operand`.
#[derive(Clone, Debug)]
pub struct FactorTerm {
    pub source_secret: usize,
    pub source_share: usize,
    pub operand: BitDep,
}

fn set_share_indices(mask: u64) -> impl Iterator<Item = usize> {
    (0..64).filter(move |&bit| mask & (1u64 << bit) != 0)
}

/// Factorizes every multiplication term referenced by `row`, bit `m` of `row.mults`, into its
/// [`FactorTerm`]s. Applies only to circuits with `contains_mults && has_input_rands`, matching
/// §4.3: gadgets without possibly-unrefreshed products have nothing to factor.
pub fn factorize_row(row: &BitDep, circuit: &Circuit) -> Result<Vec<FactorTerm>> {
    let mut factors = Vec::new();
    if !(circuit.contains_mults && circuit.has_input_rands) {
        return Ok(factors);
    }

    for m in row.mult_indices() {
        let mult = circuit.mults.get(m).ok_or_else(|| {
            VerifyError::internal(format!("row references unknown multiplication term {m}"))
        })?;

        for i in 0..2 {
            if mult.left.secrets[i] & mult.right.secrets[i] != 0 {
                return Err(VerifyError::malformed(
                    format!("mult{m}"),
                    format!("input {i} has a share appearing on both sides of a multiplication"),
                ));
            }
        }
        for (l, r) in mult.left.randoms.iter().zip(&mult.right.randoms) {
            if l & r != 0 {
                return Err(VerifyError::malformed(
                    format!("mult{m}"),
                    "a random appears on both sides of a multiplication",
                ));
            }
        }

        for i in 0..2 {
            for share in set_share_indices(mult.left.secrets[i]) {
                factors.push(FactorTerm {
                    source_secret: i,
                    source_share: share,
                    operand: mult.right.clone(),
                });
            }
            for share in set_share_indices(mult.right.secrets[i]) {
                factors.push(FactorTerm {
                    source_secret: i,
                    source_share: share,
                    operand: mult.left.clone(),
                });
            }
        }
    }
    Ok(factors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn non_mult_circuit_has_nothing_to_factorize() {
        let (circuit, _) = fixtures::linear_refresh();
        let row = circuit.zero_row();
        assert!(factorize_row(&row, &circuit).unwrap().is_empty());
    }

    #[test]
    fn mult_circuit_without_has_input_rands_skips_factorization() {
        let (circuit, _) = fixtures::isw_mult_n2();
        assert!(!circuit.has_input_rands);
        let mut row = circuit.zero_row();
        row.set_mult_bit(0);
        assert!(factorize_row(&row, &circuit).unwrap().is_empty());
    }
}
