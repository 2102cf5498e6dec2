// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Equal-spacing pattern detection over consecutive gaps.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::float::{abs, sqrt};
use crate::types::Axis;

/// Absolute tolerance for treating two gaps as the same spacing.
pub const DEFAULT_TOLERANCE: f64 = 2.0;

/// A run of (near-)equal gaps along one axis.
#[derive(Clone, Debug, PartialEq)]
pub struct SpacingPattern<I> {
    /// Mean gap of the group.
    pub spacing: f64,
    /// Number of gaps in the group.
    pub count: usize,
    /// The box pairs the gaps sit between, in flow order.
    pub pairs: Vec<(I, I)>,
    /// `1 - min(1, stddev / mean)`: 1 for perfectly regular spacing, falling
    /// toward 0 as the gaps scatter.
    pub confidence: f64,
    /// Whether this group ties for the largest count on its axis.
    pub is_primary: bool,
}

/// A ranked hint that distributing along an axis would regularize the layout.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistributionSuggestion {
    /// Axis the pattern runs along.
    pub axis: Axis,
    /// The spacing to distribute with.
    pub spacing: f64,
    /// How many gaps already follow it.
    pub count: usize,
    /// `confidence × count`; suggestions are returned in descending order.
    pub score: f64,
}

/// Spacing patterns per axis plus ranked distribution suggestions.
#[derive(Clone, Debug, PartialEq)]
pub struct SpacingAnalysis<I> {
    /// Patterns among gaps along x.
    pub horizontal: Vec<SpacingPattern<I>>,
    /// Patterns among gaps along y.
    pub vertical: Vec<SpacingPattern<I>>,
    /// Suggestions from both axes, best first. Ties break arbitrarily.
    pub suggestions: Vec<DistributionSuggestion>,
}

/// Detect spacing patterns with [`DEFAULT_TOLERANCE`].
pub fn analyze_spacing<I: Copy>(boxes: &[(I, Rect)]) -> SpacingAnalysis<I> {
    analyze_spacing_with(boxes, DEFAULT_TOLERANCE)
}

/// Detect spacing patterns with an explicit gap tolerance.
///
/// Boxes are sorted along each axis; consecutive gaps are computed and
/// negative (overlapping) gaps discarded. A gap joins the first existing
/// group whose representative value lies within `tolerance`, else it starts
/// a new group. Groups of at least two gaps become patterns; the group(s)
/// with the maximum count are flagged primary.
pub fn analyze_spacing_with<I: Copy>(boxes: &[(I, Rect)], tolerance: f64) -> SpacingAnalysis<I> {
    let horizontal = axis_patterns(boxes, Axis::Horizontal, tolerance);
    let vertical = axis_patterns(boxes, Axis::Vertical, tolerance);

    let mut suggestions: Vec<DistributionSuggestion> = horizontal
        .iter()
        .map(|p| (Axis::Horizontal, p))
        .chain(vertical.iter().map(|p| (Axis::Vertical, p)))
        .map(|(axis, p)| DistributionSuggestion {
            axis,
            spacing: p.spacing,
            count: p.count,
            score: p.confidence * p.count as f64,
        })
        .collect();
    suggestions.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(core::cmp::Ordering::Equal)
    });

    SpacingAnalysis {
        horizontal,
        vertical,
        suggestions,
    }
}

struct GapGroup<I> {
    representative: f64,
    values: Vec<f64>,
    pairs: Vec<(I, I)>,
}

fn axis_patterns<I: Copy>(boxes: &[(I, Rect)], axis: Axis, tolerance: f64) -> Vec<SpacingPattern<I>> {
    if boxes.len() < 2 {
        return Vec::new();
    }
    let mut sorted: Vec<(I, Rect)> = boxes.to_vec();
    sorted.sort_by(|a, b| {
        axis.span(&a.1)
            .0
            .partial_cmp(&axis.span(&b.1).0)
            .unwrap_or(core::cmp::Ordering::Equal)
    });

    let mut groups: Vec<GapGroup<I>> = Vec::new();
    for pair in sorted.windows(2) {
        let (a_id, a_rect) = pair[0];
        let (b_id, b_rect) = pair[1];
        let gap = axis.span(&b_rect).0 - axis.span(&a_rect).1;
        if gap < 0.0 {
            // Overlapping boxes carry no spacing information.
            continue;
        }
        match groups
            .iter_mut()
            .find(|g| abs(gap - g.representative) <= tolerance)
        {
            Some(group) => {
                group.values.push(gap);
                group.pairs.push((a_id, b_id));
            }
            None => groups.push(GapGroup {
                representative: gap,
                values: alloc::vec![gap],
                pairs: alloc::vec![(a_id, b_id)],
            }),
        }
    }

    let mut patterns: Vec<SpacingPattern<I>> = groups
        .into_iter()
        .filter(|g| g.values.len() >= 2)
        .map(|g| {
            let count = g.values.len();
            let mean = g.values.iter().sum::<f64>() / count as f64;
            let variance =
                g.values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;
            let confidence = if mean > 0.0 {
                1.0 - (sqrt(variance) / mean).min(1.0)
            } else {
                // All-zero gaps: perfectly regular touching boxes.
                1.0
            };
            SpacingPattern {
                spacing: mean,
                count,
                pairs: g.pairs,
                confidence,
                is_primary: false,
            }
        })
        .collect();

    let max_count = patterns.iter().map(|p| p.count).max().unwrap_or(0);
    for pattern in &mut patterns {
        pattern.is_primary = pattern.count == max_count;
    }
    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(xs: &[f64], width: f64) -> Vec<(u32, Rect)> {
        xs.iter()
            .enumerate()
            .map(|(i, &x)| (i as u32, Rect::new(x, 0.0, x + width, 50.0)))
            .collect()
    }

    #[test]
    fn regular_row_yields_one_primary_pattern() {
        let boxes = row(&[0.0, 70.0, 140.0, 210.0], 50.0);
        let analysis = analyze_spacing(&boxes);
        assert_eq!(analysis.horizontal.len(), 1);
        let pattern = &analysis.horizontal[0];
        assert_eq!(pattern.spacing, 20.0);
        assert_eq!(pattern.count, 3);
        assert!(pattern.is_primary);
        assert_eq!(pattern.confidence, 1.0);
        assert_eq!(pattern.pairs, alloc::vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn jitter_within_tolerance_groups_with_lower_confidence() {
        let boxes = row(&[0.0, 70.0, 141.0, 210.0], 50.0);
        let analysis = analyze_spacing(&boxes);
        assert_eq!(analysis.horizontal.len(), 1, "21 and 19 join the 20 group");
        let pattern = &analysis.horizontal[0];
        assert_eq!(pattern.count, 3);
        assert!(pattern.confidence < 1.0 && pattern.confidence > 0.9);
    }

    #[test]
    fn distinct_spacings_become_separate_groups() {
        // Gaps: 20, 20, 60.
        let boxes = row(&[0.0, 70.0, 140.0, 250.0], 50.0);
        let analysis = analyze_spacing(&boxes);
        assert_eq!(analysis.horizontal.len(), 1, "a lone 60 gap is not a pattern");
        assert_eq!(analysis.horizontal[0].spacing, 20.0);
        assert_eq!(analysis.horizontal[0].count, 2);
    }

    #[test]
    fn overlapping_boxes_are_discarded() {
        // Second box overlaps the first; the only usable gaps are 20 and 20.
        let boxes = row(&[0.0, 30.0, 100.0, 170.0], 50.0);
        let analysis = analyze_spacing(&boxes);
        assert_eq!(analysis.horizontal.len(), 1);
        assert_eq!(analysis.horizontal[0].count, 2);
        assert_eq!(analysis.horizontal[0].spacing, 20.0);
    }

    #[test]
    fn suggestions_rank_by_score_descending() {
        // Horizontal: three equal 20 gaps. Vertical: two equal 30 gaps from
        // a separate column of boxes.
        let mut boxes = row(&[0.0, 70.0, 140.0, 210.0], 50.0);
        for (i, y) in [(10_u32, 200.0), (11, 280.0), (12, 360.0)] {
            boxes.push((i, Rect::new(500.0, y, 550.0, y + 50.0)));
        }
        let analysis = analyze_spacing(&boxes);
        assert!(analysis.suggestions.len() >= 2);
        assert!(analysis.suggestions[0].score >= analysis.suggestions[1].score);
        assert_eq!(analysis.suggestions[0].axis, Axis::Horizontal);
        assert_eq!(analysis.suggestions[0].count, 3);
    }

    #[test]
    fn fewer_than_two_boxes_is_empty() {
        let analysis = analyze_spacing(&row(&[0.0], 50.0));
        assert!(analysis.horizontal.is_empty());
        assert!(analysis.vertical.is_empty());
        assert!(analysis.suggestions.is_empty());
    }
}
