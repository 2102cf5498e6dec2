// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect};
use lodestone_magnet::{
    AlignmentConfig, AlignmentEngine, ElementId, ElementSnapshot, GuideId, GuideKind, GuideLine,
    Orientation,
};

fn scene(n_per_side: usize) -> Vec<ElementSnapshot> {
    let mut out = Vec::with_capacity(n_per_side * n_per_side);
    for row in 0..n_per_side {
        for col in 0..n_per_side {
            out.push(ElementSnapshot {
                id: ElementId((row * n_per_side + col) as u64),
                x: col as f64 * 90.0,
                y: row as f64 * 90.0,
                width: 70.0,
                height: 70.0,
                rotation: 0.0,
            });
        }
    }
    out
}

fn guide_lines(count: usize) -> Vec<GuideLine> {
    (0..count)
        .map(|i| GuideLine {
            id: GuideId(i as u64),
            orientation: if i % 2 == 0 {
                Orientation::Vertical
            } else {
                Orientation::Horizontal
            },
            position: i as f64 * 55.0,
            kind: GuideKind::Manual,
            visible: true,
        })
        .collect()
}

fn bench_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_alignment");
    let elements = scene(20); // 400 elements
    let guides = guide_lines(32);

    // Cold path: every check runs the full geometry pass.
    let mut cold = AlignmentEngine::with_config(AlignmentConfig {
        cache_ttl: Duration::ZERO,
        ..AlignmentConfig::default()
    });
    cold.set_elements(&elements);
    group.bench_function("cold/400el_32guides", |b| {
        let mut step = 0u32;
        b.iter(|| {
            step = step.wrapping_add(1);
            let x = 100.0 + f64::from(step % 64);
            cold.check_alignment(ElementId(0), Point::new(black_box(x), 100.0), &guides)
        });
    });

    // Warm path: identical quantized position, answered from the memo.
    let mut warm = AlignmentEngine::new();
    warm.set_elements(&elements);
    group.bench_function("warm/400el_32guides", |b| {
        b.iter(|| warm.check_alignment(ElementId(0), Point::new(123.4, 56.7), &guides));
    });
    group.finish();
}

fn bench_dynamic_guides(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_guides");
    let mut engine = AlignmentEngine::new();
    engine.set_elements(&scene(20));
    let viewport = Rect::new(400.0, 400.0, 1400.0, 1100.0);
    group.bench_function("viewport/400el", |b| {
        b.iter(|| engine.dynamic_guides(black_box(viewport)));
    });
    group.finish();
}

criterion_group!(benches, bench_check, bench_dynamic_guides);
criterion_main!(benches);
