// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lodestone_index::{Aabb, SpatialTree};

fn gen_grid_items(n: usize, cell: f64) -> Vec<(u32, Aabb)> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let id = (y * n + x) as u32;
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push((id, Aabb::from_xywh(x0, y0, cell * 0.8, cell * 0.8)));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_items(count: usize, extent: f64, rect_w: f64, rect_h: f64) -> Vec<(u32, Aabb)> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for id in 0..count {
        let x0 = rng.next_f64() * (extent - rect_w).max(1.0);
        let y0 = rng.next_f64() * (extent - rect_h).max(1.0);
        out.push((id as u32, Aabb::from_xywh(x0, y0, rect_w, rect_h)));
    }
    out
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_build");
    for n in [16usize, 32] {
        let items = gen_grid_items(n, 40.0);
        group.throughput(Throughput::Elements(items.len() as u64));
        group.bench_function(format!("bulk_load/{}", items.len()), |b| {
            b.iter_batched(
                SpatialTree::<u32>::new,
                |mut tree| {
                    tree.bulk_load(black_box(&items));
                    tree
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("incremental/{}", items.len()), |b| {
            b.iter_batched(
                SpatialTree::<u32>::new,
                |mut tree| {
                    for (id, rect) in &items {
                        tree.insert(*id, *rect);
                    }
                    tree
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_query");
    let items = gen_random_items(1024, 4000.0, 60.0, 60.0);
    let mut tree = SpatialTree::new();
    tree.bulk_load(&items);

    // A viewport-sized window over a dense random field.
    let viewport = Aabb::from_xywh(1000.0, 1000.0, 800.0, 600.0);
    group.bench_function("rect/1024", |b| {
        b.iter(|| tree.search_rect(black_box(viewport)));
    });
    group.bench_function("radius/1024", |b| {
        b.iter(|| tree.search_radius(black_box(2000.0), black_box(1500.0), 400.0));
    });
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_update");
    let items = gen_random_items(512, 4000.0, 60.0, 60.0);
    group.bench_function("move_one_of_512", |b| {
        let mut tree = SpatialTree::new();
        tree.bulk_load(&items);
        let mut offset = 0.0;
        b.iter(|| {
            offset += 1.0;
            if offset > 1000.0 {
                offset = 0.0;
            }
            tree.update(7, Aabb::from_xywh(offset, offset, 60.0, 60.0));
        });
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_query, bench_update);
criterion_main!(benches);
