//! Layout and shot benchmarks (criterion - wall-clock time).
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench stage
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench stage -- layout

use breachfire::layout::spans::free_spans;
use breachfire::{Ray, RoomLayoutGenerator, ShotResolver, Stage, WallSide};
use breachfire_bench::*;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

fn bench_layout(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("layout/free_spans");
        for &n in &[4, 16, 64, 256] {
            let (run, busy) = busy_spans(n);
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
                b.iter(|| free_spans(WallSide::Front, run, &busy));
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("layout/build_room");
        let generator = RoomLayoutGenerator::default();
        for &doors in &[0, 2, 8] {
            let room = busy_room(doors);
            group.bench_with_input(BenchmarkId::from_parameter(doors), &doors, |b, _| {
                b.iter(|| {
                    let mut stage = Stage::default();
                    generator.build_room(&mut stage, &room)
                });
            });
        }
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Shots
// ---------------------------------------------------------------------------

fn bench_shots(c: &mut Criterion) {
    let mut group = c.benchmark_group("shots/resolve_all");
    let resolver = ShotResolver::new();
    for &n in &[10, 100, 500] {
        let (stage, _layout, targets) = crate_field(n).expect("crate field");
        let ray = Ray::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 0.0, 1.0));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| resolver.resolve_all(&stage, &ray, &targets));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout, bench_shots);
criterion_main!(benches);
