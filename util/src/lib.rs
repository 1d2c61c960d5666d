#![allow(clippy::new_without_default)]
#![allow(clippy::too_many_arguments)]

use std::arch::asm;
use std::hint::unreachable_unchecked;

/// Returns the position (1-indexed from the LSB) of the highest set bit of `n`, i.e.
/// `1 + floor(log2(n))`, or `0` if `n == 0`.
pub fn bits_u64(n: u64) -> usize {
    (64 - n.leading_zeros()) as usize
}

/// `ceil(a / b)`, used throughout to turn a bit-count into a word-count (e.g.
/// `ceil_div_usize(random_count, 64)` is the number of `u64` words a `randoms` bitset needs).
pub const fn ceil_div_usize(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// Computes `ceil(log_2(n))`.
#[must_use]
pub fn log2_ceil(n: usize) -> usize {
    (usize::BITS - n.saturating_sub(1).leading_zeros()) as usize
}

/// Returns the largest integer `i` such that `base**i <= n`. Used by the coefficient
/// accumulator when sizing decimal-mantissa buffers for the leakage-probability polynomial.
pub const fn log_floor(n: u64, base: u64) -> usize {
    assert!(n > 0);
    assert!(base > 1);
    let mut i = 0;
    let mut cur: u64 = 1;
    loop {
        let (mul, overflow) = cur.overflowing_mul(base);
        if overflow || mul > n {
            return i;
        } else {
            i += 1;
            cur = mul;
        }
    }
}

#[inline(always)]
pub fn assume(p: bool) {
    debug_assert!(p);
    if !p {
        unsafe {
            unreachable_unchecked();
        }
    }
}

/// Try to force Rust to emit a branch. Example:
///     if x > 2 {
///         y = foo();
///         branch_hint();
///     } else {
///         y = bar();
///     }
/// This function has no semantics. It is a hint only.
#[inline(always)]
pub fn branch_hint() {
    unsafe {
        asm!("", options(nomem, nostack, preserves_flags));
    }
}

#[cfg(test)]
mod tests {
    use crate::{bits_u64, ceil_div_usize, log2_ceil, log_floor};

    #[test]
    fn test_bits_u64() {
        assert_eq!(bits_u64(0), 0);
        assert_eq!(bits_u64(1), 1);
        assert_eq!(bits_u64(0b1000), 4);
        assert_eq!(bits_u64(u64::MAX), 64);
    }

    #[test]
    fn test_ceil_div_usize() {
        assert_eq!(ceil_div_usize(0, 64), 0);
        assert_eq!(ceil_div_usize(1, 64), 1);
        assert_eq!(ceil_div_usize(64, 64), 1);
        assert_eq!(ceil_div_usize(65, 64), 2);
    }

    #[test]
    fn test_log2_ceil() {
        assert_eq!(log2_ceil(0), 0);
        assert_eq!(log2_ceil(1), 0);
        assert_eq!(log2_ceil(2), 1);
        assert_eq!(log2_ceil(3), 2);
        assert_eq!(log2_ceil(1 << 18), 18);
    }

    #[test]
    fn test_log_floor() {
        assert_eq!(log_floor(1, 2), 0);
        assert_eq!(log_floor(8, 2), 3);
        assert_eq!(log_floor(9, 2), 3);
        assert_eq!(log_floor(1000, 10), 3);
    }
}
