use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use gadget_verify::comb::{self, Comb};
use gadget_verify::config::EngineConfig;
use gadget_verify::driver;
use num_bigint::BigUint;

fn bench_next_comb(c: &mut Criterion) {
    const UNIVERSE: usize = 40;
    const SIZE: usize = 6;

    c.bench_function("next_comb/40_choose_6/full_walk", |b| {
        b.iter_batched(
            || comb::first_comb(SIZE),
            |mut tuple: Comb| {
                let mut steps = 0usize;
                while comb::next_comb(&mut tuple, UNIVERSE).is_some() {
                    steps += 1;
                }
                steps
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_rank_unrank(c: &mut Criterion) {
    const UNIVERSE: usize = 60;
    const SIZE: usize = 8;
    let total = comb::n_choose_k(UNIVERSE, SIZE);

    c.bench_function("unrank/60_choose_8/midpoint", |b| {
        b.iter(|| comb::unrank(UNIVERSE, SIZE, &(&total / BigUint::from(2u32))))
    });

    c.bench_function("rank/60_choose_8/midpoint", |b| {
        let tuple = comb::unrank(UNIVERSE, SIZE, &(&total / BigUint::from(2u32)));
        b.iter(|| comb::rank(&tuple))
    });
}

fn bench_parallel_search(c: &mut Criterion) {
    let candidates: Vec<usize> = (0..24).collect();

    c.bench_function("parallel_search/24_choose_4/single_worker_no_hits", |b| {
        b.iter(|| {
            let config = EngineConfig::single_threaded();
            driver::parallel_search(&config, &[], &candidates, 4, false, |_| None)
        })
    });
}

criterion_group!(benches, bench_next_comb, bench_rank_unrank, bench_parallel_search);
criterion_main!(benches);
