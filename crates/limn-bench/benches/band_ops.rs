//! Criterion micro-benchmarks for band bookkeeping primitives.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use limn_band::{BandArena, UNQUEUED};
use limn_core::Voxel;
use limn_grid::{DeferredGrid, VolumeDims};

/// Benchmark: acquire/release churn through the element free list.
fn bench_arena_churn(c: &mut Criterion) {
    c.bench_function("arena_churn_10k", |b| {
        b.iter(|| {
            let mut arena = BandArena::new();
            let mut handles = Vec::with_capacity(1000);
            for round in 0..10 {
                for i in 0..1000 {
                    handles.push(arena.acquire(Voxel::new(i, round, 0), UNQUEUED));
                }
                for idx in handles.drain(..) {
                    arena.release(idx);
                }
            }
            black_box(arena.capacity());
        });
    });
}

/// Benchmark: sparse writes into a thin shell of a 64³ deferred grid.
fn bench_deferred_shell_writes(c: &mut Criterion) {
    let dims = VolumeDims::new(64, 64, 64).unwrap();
    c.bench_function("deferred_shell_writes", |b| {
        b.iter(|| {
            let mut grid = DeferredGrid::new(dims, 0.0f64);
            for i in 0..64 {
                grid.set(Voxel::new(i, 32, 32), 1.0);
                grid.set(Voxel::new(32, i, 32), 1.0);
                grid.set(Voxel::new(32, 32, i), 1.0);
            }
            black_box(grid.allocated_tiles());
        });
    });
}

criterion_group!(benches, bench_arena_churn, bench_deferred_shell_writes);
criterion_main!(benches);
