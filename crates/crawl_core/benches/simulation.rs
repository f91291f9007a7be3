//! Simulation benchmarks for crawl_core.
//!
//! Run with: `cargo bench -p crawl_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use crawl_core::class::ClassKind;
use crawl_core::combat::compute_damage;
use crawl_core::skills::{Skill, SkillKind};
use crawl_core::stats::Stats;
use crawl_test_utils::fixtures::{attack_at, frame_dt, idle, place_enemies, point, started_run, walk};

/// Frame update with a crowded room and a player swinging every frame.
pub fn frame_benchmark(c: &mut Criterion) {
    let offsets: Vec<(i32, i32)> = (0..20).map(|i| (30 + (i % 5) * 10, (i / 5) * 20 - 40)).collect();

    c.bench_function("update_idle_room", |b| {
        b.iter_batched(
            || started_run(ClassKind::Ranged, 1),
            |mut sim| {
                for _ in 0..60 {
                    black_box(sim.update(frame_dt(), &idle()));
                }
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("update_crowded_melee", |b| {
        b.iter_batched(
            || {
                let mut sim = started_run(ClassKind::Melee, 1);
                place_enemies(&mut sim, &offsets);
                sim
            },
            |mut sim| {
                let swing = attack_at(point(700, 300));
                for _ in 0..60 {
                    black_box(sim.update(frame_dt(), &swing));
                }
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("update_walking", |b| {
        let mut sim = started_run(ClassKind::Caster, 3);
        let input = walk(false, true, false, true);
        b.iter(|| black_box(sim.update(frame_dt(), &input)));
    });
}

/// Damage formula in isolation.
pub fn damage_benchmark(c: &mut Criterion) {
    let spec = Skill::new(SkillKind::Fireball)
        .damage
        .expect("fireball deals damage");
    let stats = Stats::starting();
    c.bench_function("compute_damage", |b| {
        b.iter(|| compute_damage(black_box(&spec), black_box(&stats)));
    });
}

criterion_group!(benches, frame_benchmark, damage_benchmark);
criterion_main!(benches);
