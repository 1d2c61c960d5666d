//! The parallel driver (§4.7, §5): partitions a tuple space across OS threads, deduplicates
//! reported failures through a shared [`Trie`], and supports "stop at first failure" early
//! cancellation.
//!
//! Each worker owns an independent enumerator and [`crate::gauss::GaussState`]; there is no
//! suspension inside a worker, and the only shared mutable state is the trie, the failure
//! counter, and (once found, in cancellation mode) the first witness — all three guarded by a
//! single mutex taken once per *reported failure*, not once per tuple (§5).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::comb::{self, Comb};
use crate::config::EngineConfig;
use crate::trie::Trie;

/// Aggregate result of a parallel search: how many distinct failing tuples were recorded, and
/// (if any were found) the first one, for use as a counter-example witness.
pub struct DriverOutcome {
    pub failure_count: usize,
    pub first_failure: Option<(Comb, [bool; 2])>,
}

struct SharedState {
    trie: Trie,
    failure_count: usize,
    first_failure: Option<(Comb, [bool; 2])>,
}

/// Searches every combination of `suffix_len` indices drawn from `suffix_candidates`
/// (ascending, deduplicated), each one prepended with the fixed `prefix`, across
/// `config.workers` OS threads.
///
/// `check` is called with the full tuple (`prefix` followed by the chosen suffix elements, in
/// whatever order the property driver wants — typically `prefix` first since prefixes are
/// never re-ordered per §4.6) and returns `Some(leaked_inputs)` on failure. It must be `Sync`
/// since every worker calls it concurrently; property drivers typically close over an
/// immutable `&Circuit` and allocate a fresh [`crate::gauss::GaussState`] per call.
///
/// When `stop_at_first` is set, every worker polls a shared atomic flag between tuples and
/// exits as soon as any worker reports a failure (§5, "Cancellation").
pub fn parallel_search<F>(
    config: &EngineConfig,
    prefix: &[usize],
    suffix_candidates: &[usize],
    suffix_len: usize,
    stop_at_first: bool,
    check: F,
) -> DriverOutcome
where
    F: Fn(&[usize]) -> Option<[bool; 2]> + Sync,
{
    let workers = config.workers.resolve();
    let universe = suffix_candidates.len();
    let total = comb::n_choose_k(universe, suffix_len);

    let shared = Mutex::new(SharedState {
        trie: Trie::new(),
        failure_count: 0,
        first_failure: None,
    });
    let done = AtomicBool::new(false);

    std::thread::scope(|scope| {
        for worker in 0..workers {
            let shared = &shared;
            let done = &done;
            let check = &check;
            scope.spawn(move || {
                let (start, end) = comb::worker_range(&total, worker, workers);
                let mut remaining = comb::worker_tuple_count(&total, &start, &end);
                if remaining == 0 {
                    return;
                }
                let mut suffix = comb::unrank(universe, suffix_len, &start);

                loop {
                    if stop_at_first && done.load(Ordering::Relaxed) {
                        return;
                    }

                    let mut full: Comb = Vec::with_capacity(prefix.len() + suffix_len);
                    full.extend_from_slice(prefix);
                    full.extend(suffix.iter().map(|&local| suffix_candidates[local]));

                    if let Some(leaked) = check(&full) {
                        let mut guard = shared.lock().expect("driver mutex poisoned");
                        if guard.trie.insert(&full, leaked) {
                            guard.failure_count += 1;
                            if guard.first_failure.is_none() {
                                guard.first_failure = Some((full, leaked));
                            }
                        }
                        if stop_at_first {
                            done.store(true, Ordering::Relaxed);
                            return;
                        }
                    }

                    remaining -= 1;
                    if remaining == 0 {
                        return;
                    }
                    // `next_comb` reports the lowest position whose value actually moved, which
                    // in principle bounds how much of a per-call GaussState a caller could carry
                    // over to the next tuple instead of rebuilding from `prefix` up. `check` here
                    // is an opaque `Fn`, rebuilt fresh every call by the property driver that
                    // closed over it, so there is no state on this side of the boundary to carry
                    // forward; the index is intentionally unused (see DESIGN.md).
                    if comb::next_comb(&mut suffix, universe).is_none() {
                        return;
                    }
                }
            });
        }
    });

    let guard = shared.into_inner().expect("driver mutex poisoned");
    DriverOutcome {
        failure_count: guard.failure_count,
        first_failure: guard.first_failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkerCount;

    #[test]
    fn single_worker_finds_a_planted_failure() {
        let config = EngineConfig::single_threaded();
        let candidates: Vec<usize> = (0..8).collect();
        let outcome = parallel_search(&config, &[], &candidates, 2, true, |comb| {
            (comb == [2, 5]).then_some([true, false])
        });
        assert_eq!(outcome.failure_count, 1);
        assert_eq!(outcome.first_failure.unwrap().0, vec![2, 5]);
    }

    #[test]
    fn multiple_workers_agree_with_single_worker_on_total_count() {
        let candidates: Vec<usize> = (0..10).collect();
        let check = |comb: &[usize]| (comb.iter().sum::<usize>() % 7 == 0).then_some([true, false]);

        let single = EngineConfig::default().with_workers(WorkerCount::Fixed(1));
        let parallel = EngineConfig::default().with_workers(WorkerCount::Fixed(4));

        let single_outcome = parallel_search(&single, &[], &candidates, 3, false, check);
        let parallel_outcome = parallel_search(&parallel, &[], &candidates, 3, false, check);

        assert_eq!(single_outcome.failure_count, parallel_outcome.failure_count);
    }

    #[test]
    fn no_failures_returns_empty_outcome() {
        let config = EngineConfig::single_threaded();
        let candidates: Vec<usize> = (0..5).collect();
        let outcome = parallel_search(&config, &[], &candidates, 2, false, |_| None);
        assert_eq!(outcome.failure_count, 0);
        assert!(outcome.first_failure.is_none());
    }
}
