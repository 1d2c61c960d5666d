//! The combination enumerator (§4.6): incrementing, ranking and unranking `k`-sized tuples of
//! wire indices drawn from a universe of size `N`.
//!
//! `rank`/`unrank` are the standard combinatorial-number-system bijections onto `[0, C(N,k))`;
//! [`next_comb`] advances a combination to the next one *in that same numbering* so that a
//! worker which starts at `unrank(start_rank)` and repeatedly calls `next_comb` walks exactly
//! the contiguous rank interval it was assigned (§4.6, "Ranking... used to partition the tuple
//! space for multithreading").

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};

/// A sorted, strictly-increasing tuple of wire indices (§3, "Comb").
pub type Comb = Vec<usize>;

/// `C(n, k)` as an arbitrary-precision integer; `N` can be large enough (hundreds of wires at
/// tuple sizes in the dozens) that `u64` overflows well before the search does.
pub fn n_choose_k(n: usize, k: usize) -> BigUint {
    if k > n {
        return BigUint::zero();
    }
    let k = k.min(n - k);
    let mut result = BigUint::one();
    for i in 0..k {
        result *= n - i;
        result /= i + 1;
    }
    result
}

/// The lexicographically-first (and colex-numbered rank `0`) combination of size `k`: `{0,1,...,k-1}`.
pub fn first_comb(k: usize) -> Comb {
    (0..k).collect()
}

/// Advances `comb` to the next combination in combinatorial-number-system order in place.
///
/// Returns the smallest index whose value changed. Every position below it is untouched, so a
/// caller walking consecutive combinations could in principle reuse whatever it built from those
/// leading entries instead of recomputing from scratch; [`crate::driver::parallel_search`] reads
/// this value for exactly that reason (see its loop and DESIGN.md for why the reuse itself isn't
/// wired up end to end). Returns `None` once `comb` is already the last combination of its size.
pub fn next_comb(comb: &mut Comb, n: usize) -> Option<usize> {
    let k = comb.len();
    if k == 0 {
        return None;
    }
    let old = comb.clone();

    // Find the smallest position `i` whose value can be bumped without colliding with the
    // next element (or `n`, treated as a sentinel past the last slot).
    let mut i = 0;
    while i < k {
        let upper = if i + 1 < k { comb[i + 1] } else { n };
        if comb[i] + 1 < upper {
            break;
        }
        i += 1;
    }
    if i == k {
        return None;
    }
    comb[i] += 1;
    for j in 0..i {
        comb[j] = j;
    }

    (0..k).find(|&j| comb[j] != old[j])
}

/// The combinatorial-number-system rank of `comb`: `sum_{i=0}^{k-1} C(comb[i], i+1)`.
pub fn rank(comb: &Comb) -> BigUint {
    comb.iter()
        .enumerate()
        .map(|(i, &c)| n_choose_k(c, i + 1))
        .fold(BigUint::zero(), |acc, x| acc + x)
}

/// The inverse of [`rank`]: the `k`-combination of `{0..n}` with the given rank.
pub fn unrank(n: usize, k: usize, target_rank: &BigUint) -> Comb {
    let mut comb = vec![0usize; k];
    let mut remaining = target_rank.clone();
    for i in (0..k).rev() {
        // Largest `c` with `C(c, i+1) <= remaining`, searched from the top since `c` must also
        // leave room for the `i` smaller, strictly-increasing entries below it.
        let mut c = i;
        while n_choose_k(c + 1, i + 1) <= remaining && c + 1 <= n {
            c += 1;
        }
        comb[i] = c;
        remaining -= n_choose_k(c, i + 1);
    }
    comb
}

/// The half-open `[start_rank, start_rank + count)` interval of tuple ranks assigned to worker
/// `worker` of `workers` total workers, out of `total` tuples (§4.6: worker `w` of `W` starts at
/// `floor(w*T/W)` and processes `ceil(T/W)+1` tuples — the `+1` overlap is harmless since the
/// driver stops at `total` regardless).
pub fn worker_range(total: &BigUint, worker: usize, workers: usize) -> (BigUint, BigUint) {
    let workers_big = BigUint::from(workers);
    let start = (BigUint::from(worker) * total) / &workers_big;
    let per_worker = (total + &workers_big - BigUint::one()) / &workers_big;
    let end = (start.clone() + per_worker + BigUint::one()).min(total.clone());
    (start, end)
}

/// Converts a rank interval into an explicit tuple count, clamped so it never reads past `total`.
pub fn worker_tuple_count(total: &BigUint, start: &BigUint, end: &BigUint) -> usize {
    let end = end.min(total);
    if end <= *start {
        0
    } else {
        (end - start).to_usize().unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn n_choose_k_matches_known_values() {
        assert_eq!(n_choose_k(5, 0), BigUint::one());
        assert_eq!(n_choose_k(5, 5), BigUint::one());
        assert_eq!(n_choose_k(5, 2), BigUint::from(10u32));
        assert_eq!(n_choose_k(5, 6), BigUint::zero());
    }

    #[test]
    fn rank_unrank_round_trip_over_small_universe() {
        let n = 7;
        let k = 3;
        let total = n_choose_k(n, k);
        let total_usize = total.to_usize().unwrap();
        for r in 0..total_usize {
            let r_big = BigUint::from(r);
            let comb = unrank(n, k, &r_big);
            assert_eq!(comb.len(), k);
            for pair in comb.windows(2) {
                assert!(pair[0] < pair[1]);
            }
            assert_eq!(rank(&comb), r_big);
        }
    }

    #[test]
    fn next_comb_visits_every_combination_exactly_once_in_rank_order() {
        let n = 6;
        let k = 3;
        let total = n_choose_k(n, k).to_usize().unwrap();
        let mut comb = first_comb(k);
        let mut seen = vec![comb.clone()];
        while let Some(_changed) = next_comb(&mut comb, n) {
            seen.push(comb.clone());
        }
        assert_eq!(seen.len(), total);

        let mut dedup = seen.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), total, "next_comb revisited a combination");

        for (i, c) in seen.iter().enumerate() {
            assert_eq!(rank(c), BigUint::from(i), "rank/next_comb order mismatch at step {i}");
        }
    }

    #[test]
    fn next_comb_returns_smallest_changed_index() {
        let n = 5;
        let mut comb = vec![0, 1, 2];
        let changed = next_comb(&mut comb, n).unwrap();
        assert_eq!(comb, vec![0, 1, 3]);
        assert_eq!(changed, 2);
    }

    #[test]
    fn next_comb_none_at_last_combination() {
        let n = 4;
        let mut comb = vec![1, 2, 3];
        assert_eq!(next_comb(&mut comb, n), None);
    }

    #[test]
    fn worker_range_partitions_exactly_cover_the_tuple_space() {
        let total = n_choose_k(10, 4);
        let workers = 3;
        let mut covered = std::collections::BTreeSet::new();
        for w in 0..workers {
            let (start, end) = worker_range(&total, w, workers);
            let mut r = start;
            while r < end && r < total {
                covered.insert(r.to_usize().unwrap());
                r += BigUint::one();
            }
        }
        let expected: std::collections::BTreeSet<usize> = (0..total.to_usize().unwrap()).collect();
        assert_eq!(covered, expected);
    }
}
