// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lodestone Layout: spacing and structure inference over box sets.
//!
//! Lodestone Layout is the once-per-selection half of the Lodestone
//! alignment engine. Where `lodestone_magnet` answers per-frame questions
//! against a spatial index, this crate takes a plain list of `(id, Rect)`
//! pairs and infers the layout structure a designer would see:
//!
//! - [`analyze_spacing`]: cluster consecutive gaps into
//!   [`SpacingPattern`]s with a statistical confidence, and rank
//!   [`DistributionSuggestion`]s across both axes.
//! - [`alignment_groups`]: boxes sharing an edge or centerline within
//!   tolerance.
//! - [`detect_grid`]: infer rows × columns from clustered element centers.
//! - [`suggest()`]: both detectors merged into one feed, best score first.
//! - [`distribute`] and [`align`]: compute the repositioning a suggestion
//!   implies, without mutating anything.
//!
//! Everything is a pure function over caller-supplied geometry; there is no
//! index, no cache, and no interior state. Run it on selection change, not
//! per frame.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Rect;
//! use lodestone_layout::{Axis, analyze_spacing, detect_grid, distribute};
//!
//! // Four 50-wide boxes with three equal 20-unit gaps.
//! let row: Vec<(u32, Rect)> = [0.0, 70.0, 140.0, 210.0]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &x)| (i as u32, Rect::new(x, 0.0, x + 50.0, 50.0)))
//!     .collect();
//!
//! let analysis = analyze_spacing(&row);
//! let primary = &analysis.horizontal[0];
//! assert_eq!(primary.spacing, 20.0);
//! assert_eq!(primary.count, 3);
//! assert!(primary.is_primary);
//!
//! // Re-spread the same row with a 50-unit gap; the first box anchors.
//! let moves = distribute(&row, Axis::Horizontal, Some(50.0));
//! assert_eq!(moves[0].position.x, 100.0);
//!
//! // Not enough structure for a grid.
//! assert!(detect_grid(&row).is_none());
//! ```
//!
//! This crate is `no_std` and uses `alloc`; enable the `libm` feature
//! instead of the default `std` for no_std float support.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod arrange;
mod float;
pub mod grid;
pub mod groups;
pub mod spacing;
pub mod suggest;
pub mod types;

pub use arrange::{NewPosition, align, distribute};
pub use grid::{GridCell, GridLayout, detect_grid, detect_grid_with};
pub use groups::{
    AlignmentGroup, DEFAULT_MIN_GROUP_SIZE, alignment_groups, alignment_groups_with,
};
pub use spacing::{
    DEFAULT_TOLERANCE, DistributionSuggestion, SpacingAnalysis, SpacingPattern, analyze_spacing,
    analyze_spacing_with,
};
pub use suggest::{Suggestion, SuggestionKind, suggest};
pub use types::{Anchor, Axis};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use kurbo::Rect;

    #[test]
    fn suggestion_feed_over_a_mixed_scene() {
        // A tidy row and an unrelated pair; the row should dominate the feed.
        let mut boxes: Vec<(u32, Rect)> = (0..4)
            .map(|i| {
                let x = f64::from(i) * 70.0;
                (i, Rect::new(x, 0.0, x + 50.0, 50.0))
            })
            .collect();
        boxes.push((10, Rect::new(500.0, 300.0, 540.0, 340.0)));
        boxes.push((11, Rect::new(590.0, 300.0, 630.0, 340.0)));

        let analysis = analyze_spacing(&boxes);
        assert!(!analysis.suggestions.is_empty());
        let top = analysis.suggestions[0];
        assert_eq!(top.axis, Axis::Horizontal);
        assert_eq!(top.count, 3);

        let groups = alignment_groups(&boxes);
        assert!(
            groups
                .iter()
                .any(|g| g.axis == Axis::Horizontal && g.members.len() >= 4),
            "the row shares its top edge"
        );
    }
}
