use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use floodgate::{
    AdmissionGate, Counter, CountingPolicy, ExactCounter, Metrics, SketchCounter, SketchParams,
};
use std::sync::{Arc, RwLock};

/// Benchmark raw sketch update/estimate cost at different widths
fn bench_sketch_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("sketch");

    for width in [64usize, 1024, 16384] {
        let params = SketchParams::new(4, width).unwrap();

        group.bench_with_input(BenchmarkId::new("update", width), &params, |b, &params| {
            let mut sketch = SketchCounter::new(params);
            b.iter(|| sketch.update(black_box("203.0.113.9")))
        });

        group.bench_with_input(
            BenchmarkId::new("estimate", width),
            &params,
            |b, &params| {
                let mut sketch = SketchCounter::new(params);
                sketch.update("203.0.113.9");
                b.iter(|| sketch.estimate(black_box("203.0.113.9")))
            },
        );
    }

    group.finish();
}

/// Benchmark the exact counter for comparison
fn bench_exact_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("exact");

    group.bench_function("update", |b| {
        let mut exact = ExactCounter::new();
        b.iter(|| exact.update(black_box("203.0.113.9")))
    });

    group.bench_function("estimate", |b| {
        let mut exact = ExactCounter::new();
        exact.update("203.0.113.9");
        b.iter(|| exact.estimate(black_box("203.0.113.9")))
    });

    group.finish();
}

/// Benchmark full admission checks through the shared gate
fn bench_gate_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_check");
    group.throughput(Throughput::Elements(1));

    for variant in ["sketch", "exact", "disabled"] {
        let counter = match variant {
            "sketch" => Counter::sketch(SketchParams::new(4, 1024).unwrap()),
            "exact" => Counter::exact(),
            "disabled" => Counter::disabled(),
            _ => unreachable!(),
        };
        let gate = AdmissionGate::new(
            Arc::new(RwLock::new(counter)),
            u64::MAX,
            CountingPolicy::default(),
            Metrics::new(),
        );

        // rotate keys so the exact variant exercises map growth
        let keys: Vec<String> = (0..256).map(|i| format!("10.0.{}.{}", i / 16, i % 16)).collect();

        group.bench_function(variant, |b| {
            let mut next = 0usize;
            b.iter(|| {
                let key = &keys[next % keys.len()];
                next += 1;
                black_box(gate.check(key))
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sketch_operations,
    bench_exact_operations,
    bench_gate_check
);
criterion_main!(benches);
