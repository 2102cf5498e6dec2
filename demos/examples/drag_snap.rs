// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag snapping.
//!
//! Simulate a drag toward a manual guide and watch the smoothed position
//! glide onto it, then derive dynamic guides from the scene.
//!
//! Run:
//! - `cargo run -p lodestone_demos --example drag_snap`

use kurbo::{Point, Rect};
use lodestone_magnet::{
    AlignmentEngine, ElementId, ElementSnapshot, GuideId, GuideKind, GuideLine, Orientation,
};

fn main() {
    let mut engine = AlignmentEngine::new();
    engine.set_elements(&[
        ElementSnapshot {
            id: ElementId(1),
            x: 40.0,
            y: 40.0,
            width: 50.0,
            height: 50.0,
            rotation: 0.0,
        },
        ElementSnapshot {
            id: ElementId(2),
            x: 200.0,
            y: 40.0,
            width: 50.0,
            height: 50.0,
            rotation: 0.0,
        },
    ]);

    let guides = [GuideLine {
        id: GuideId(0),
        orientation: Orientation::Vertical,
        position: 120.0,
        kind: GuideKind::Manual,
        visible: true,
    }];

    // A pointer drags element 1 rightward, one unit per frame. The pointer
    // jitters sub-pixel on the last frames, which the memo cache absorbs.
    println!("frame  proposed_x  smooth_x  strength");
    for frame in 0..10 {
        let proposed = Point::new(108.0 + f64::from(frame.min(7)) + f64::from(frame) * 0.01, 40.0);
        let result = engine.check_alignment(ElementId(1), proposed, &guides);
        println!(
            "{frame:>5}  {:>10.2}  {:>8.2}  {:>8.2}",
            proposed.x, result.smooth_position.x, result.strength
        );
    }

    // Auto-derived guides from element edges and centers in the viewport.
    let dynamic = engine.dynamic_guides(Rect::new(0.0, 0.0, 400.0, 200.0));
    println!("\n{} dynamic guides:", dynamic.len());
    for guide in dynamic.iter().take(6) {
        println!("  {:?} {:?} at {}", guide.kind, guide.orientation, guide.position);
    }

    let stats = engine.stats();
    println!(
        "\nchecks: {}, cache hit rate: {:.0}%",
        stats.checks,
        stats.cache_hit_rate() * 100.0
    );
}
