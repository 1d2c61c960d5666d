use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use gadget_verify::fixtures;
use gadget_verify::gauss::GaussState;

fn bench_gauss_step(c: &mut Criterion) {
    let (circuit, _) = fixtures::isw_mult_n2();

    c.bench_function("gauss_step/isw_mult_n2/full_tuple", |b| {
        b.iter_batched(
            GaussState::new,
            |mut state| {
                for wire in &circuit.wires {
                    state.gauss_step(wire.dep.clone(), &circuit);
                }
                state
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("gauss_step/isw_mult_n2/clear_and_reinsert", |b| {
        let mut state = GaussState::with_capacity(circuit.wires.len());
        for wire in &circuit.wires {
            state.gauss_step(wire.dep.clone(), &circuit);
        }
        b.iter(|| {
            state.clear();
            for wire in &circuit.wires {
                state.gauss_step(wire.dep.clone(), &circuit);
            }
        })
    });
}

fn bench_correction_output_expansion(c: &mut Criterion) {
    let (circuit, _) = fixtures::linear_refresh();

    c.bench_function("replace_correction_outputs/linear_refresh/no_op", |b| {
        b.iter_batched(
            GaussState::new,
            |mut state| {
                for wire in &circuit.wires {
                    let reduced = state.replace_correction_outputs_in_dep(wire.dep.clone(), &circuit);
                    state.gauss_step(reduced, &circuit);
                }
                state
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_gauss_step, bench_correction_output_expansion);
criterion_main!(benches);
