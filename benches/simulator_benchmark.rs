//! Per-tick simulator benchmarks
//!
//! Every simulator must keep a tick well inside one animation frame.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vizsim::prelude::*;

/// Pendulum ensemble tick for growing ensemble sizes
fn bench_pendulum_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pendulum Step");

    for count in [2, 8, 32, 128].iter() {
        let settings = PendulumSettings {
            pendulum_count: *count,
            seed: Some(1),
            ..Default::default()
        };

        group.bench_with_input(BenchmarkId::new("pendulums", count), count, |b, _| {
            let mut ensemble = PendulumEnsemble::new(settings.clone()).unwrap();
            b.iter(|| black_box(ensemble.step()));
        });
    }

    group.finish();
}

/// All seven optimizers advancing 100 ticks on Rosenbrock
fn bench_optimizer_bank(c: &mut Criterion) {
    let settings = OptimizerSettings {
        landscape_type: LandscapeType::Rosenbrock,
        optimizers: OptimizerKind::ALL.to_vec(),
        noise_level: 0.5,
        seed: Some(2),
        ..Default::default()
    };

    c.bench_function("Optimizer bank 100 ticks (7 runs)", |b| {
        b.iter(|| {
            let mut bank = OptimizerBank::new(settings.clone()).unwrap();
            bank.launch(Vector2::new(-1.0, 1.0));
            bank.advance(black_box(100));
            black_box(bank.metrics());
        });
    });
}

/// Bulk random-walk growth
fn bench_walk_bulk(c: &mut Criterion) {
    let settings = WalkSettings {
        seed: Some(3),
        ..Default::default()
    };

    c.bench_function("Random walk add 10k steps", |b| {
        b.iter(|| {
            let mut walk = RandomWalk::new(settings.clone()).unwrap();
            walk.add_steps(black_box(10_000));
            black_box(walk.metrics());
        });
    });
}

/// Cognitive-model tick including metric refresh, for growing grids
fn bench_cognitive_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("Cognitive Step");

    for agents in [16, 100, 400].iter() {
        let settings = CognitiveSettings {
            num_agents: *agents,
            self_drift: DriftMode::Echo,
            seed: Some(4),
            ..Default::default()
        };

        group.bench_with_input(BenchmarkId::new("agents", agents), agents, |b, _| {
            let mut model = CognitiveModel::new(settings.clone()).unwrap();
            b.iter(|| black_box(model.step()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_pendulum_step,
    bench_optimizer_bank,
    bench_walk_bulk,
    bench_cognitive_step
);
criterion_main!(benches);
