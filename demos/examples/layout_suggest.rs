// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout suggestions.
//!
//! Analyze a small scene for spacing patterns, alignment groups, and grid
//! structure, then preview the moves a distribute command would make.
//!
//! Run:
//! - `cargo run -p lodestone_demos --example layout_suggest`

use kurbo::Rect;
use lodestone_layout::{Axis, alignment_groups, analyze_spacing, detect_grid, distribute};

fn main() {
    // A slightly ragged row of four cards.
    let row: Vec<(u32, Rect)> = [0.0, 70.0, 141.0, 210.0]
        .iter()
        .enumerate()
        .map(|(i, &x)| (i as u32, Rect::new(x, 20.0, x + 50.0, 70.0)))
        .collect();

    let analysis = analyze_spacing(&row);
    for pattern in &analysis.horizontal {
        println!(
            "spacing {:.1} x{} (confidence {:.2}{})",
            pattern.spacing,
            pattern.count,
            pattern.confidence,
            if pattern.is_primary { ", primary" } else { "" }
        );
    }
    for suggestion in &analysis.suggestions {
        println!(
            "suggest: distribute {:?} at {:.1} (score {:.2})",
            suggestion.axis, suggestion.spacing, suggestion.score
        );
    }

    for group in alignment_groups(&row) {
        println!(
            "aligned {:?}/{:?} at {:.1}: {:?}",
            group.axis, group.anchor, group.position, group.members
        );
    }

    // Snap the ragged row to a clean 20-unit rhythm.
    for mv in distribute(&row, Axis::Horizontal, Some(20.0)) {
        println!("move {} to x = {:.1}", mv.id, mv.position.x);
    }

    // A 3x3 grid of thumbnails.
    let mut thumbs = Vec::new();
    for r in 0..3u32 {
        for c in 0..3u32 {
            let x = f64::from(c) * 100.0;
            let y = 200.0 + f64::from(r) * 100.0;
            thumbs.push((10 + r * 3 + c, Rect::new(x, y, x + 50.0, y + 50.0)));
        }
    }
    match detect_grid(&thumbs) {
        Some(grid) => println!("grid: {} rows x {} cols", grid.rows, grid.cols),
        None => println!("no grid detected"),
    }
}
