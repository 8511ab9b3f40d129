//! Criterion benchmarks for synthesis hot paths
//!
//! Covers: minimum-jerk profile generation, band-limited tremor noise,
//! submovement planning, and trace diagnostics. All of these run inside
//! the per-move synthesis step, which must stay well under one sample
//! period.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use neuromotor::diagnostics::diagnose;
use neuromotor::kinematics::{minimum_jerk, SubmovementPlanner};
use neuromotor::noise::band_limited_noise;
use neuromotor::{MotorRng, Point, Sample, SubmovementParams, Target, Trace};

fn make_trace(n: usize) -> Trace {
    let samples = (0..n)
        .map(|i| {
            let u = i as f64 / (n - 1) as f64;
            let s = 10.0 * u.powi(3) - 15.0 * u.powi(4) + 6.0 * u.powi(5);
            let tremor = (std::f64::consts::TAU * 10.0 * u).sin();
            Sample::new(u, s * 500.0 + tremor, 20.0 * 4.0 * s * (1.0 - s) + tremor)
        })
        .collect();
    Trace::new(samples, vec![])
}

// ---------------------------------------------------------------------------
// Minimum-jerk profile
// ---------------------------------------------------------------------------

fn bench_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimum_jerk_profile");
    for duration in [0.3, 0.8, 2.0] {
        group.bench_with_input(
            BenchmarkId::from_parameter(duration),
            &duration,
            |b, &duration| {
                b.iter(|| minimum_jerk::profile(black_box(duration), 100.0, 0.42));
            },
        );
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Band-limited tremor noise
// ---------------------------------------------------------------------------

fn bench_tremor(c: &mut Criterion) {
    let mut group = c.benchmark_group("band_limited_noise");
    for n in [64usize, 256, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut rng = MotorRng::new(Some(42));
            b.iter(|| band_limited_noise(&mut rng, black_box(n), 100.0, 10.0, 1.0, 1.2));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Submovement planning
// ---------------------------------------------------------------------------

fn bench_planner(c: &mut Criterion) {
    let planner = SubmovementPlanner::new(SubmovementParams::default(), 0.04);
    let target = Target::new(Point::new(900.0, 400.0), 40.0, 40.0);
    c.bench_function("submovement_plan", |b| {
        let mut rng = MotorRng::new(Some(42));
        b.iter(|| planner.plan(&mut rng, black_box(Point::new(10.0, 10.0)), &target));
    });
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

fn bench_diagnose(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnose");
    for n in [64usize, 256] {
        let trace = make_trace(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &trace, |b, trace| {
            b.iter(|| diagnose(black_box(trace), 50.0).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_profile,
    bench_tremor,
    bench_planner,
    bench_diagnose
);
criterion_main!(benches);
