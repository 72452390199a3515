//! Simulation benchmarks for flategy_core.
//!
//! Run with: `cargo bench -p flategy_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use flategy_core::prelude::*;
use flategy_test_utils::fixtures::skirmish;

/// Times world creation and the tick loop on busy battlefields.
pub fn simulation_benchmark(c: &mut Criterion) {
    c.bench_function("create_8_players", |b| {
        b.iter(|| World::create(black_box(GameData::new(8, 42))));
    });

    let empty = TickData::new();
    for (players, squad) in [(2, 10), (4, 20), (8, 25)] {
        let world = skirmish(players, 7, squad);
        c.bench_function(&format!("tick_{players}p_{squad}_squad"), |b| {
            b.iter_batched(
                || world.clone(),
                |mut world| {
                    for _ in 0..10 {
                        black_box(world.tick(&empty));
                    }
                    world
                },
                BatchSize::SmallInput,
            );
        });
    }

    let world = skirmish(4, 7, 20);
    c.bench_function("state_hash", |b| b.iter(|| black_box(&world).state_hash()));
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);
