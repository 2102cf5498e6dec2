// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Distribute and align: computing the repositioning a suggestion implies.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use crate::types::{Anchor, Axis};

/// A computed new origin for one box. The caller applies the moves; this
/// crate never mutates its inputs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NewPosition<I> {
    /// The box to move.
    pub id: I,
    /// Its new origin (top-left corner).
    pub position: Point,
}

/// Space boxes evenly along an axis.
///
/// Boxes are sorted along the axis; the first box anchors the run and is not
/// moved (and not returned). With `spacing` given, each subsequent box lands
/// at `previous far edge + spacing`. Without it, the spacing that exactly
/// fills the current span is derived:
/// `(last.far - first.near - Σ extents) / (n - 1)`, which may be negative
/// when the boxes overflow their span.
///
/// Fewer than two boxes produce no moves.
pub fn distribute<I: Copy>(
    boxes: &[(I, Rect)],
    axis: Axis,
    spacing: Option<f64>,
) -> Vec<NewPosition<I>> {
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

    let first_near = axis.span(&sorted[0].1).0;
    let spacing = spacing.unwrap_or_else(|| {
        let last_far = axis.span(&sorted[sorted.len() - 1].1).1;
        let total_extent: f64 = sorted.iter().map(|(_, r)| axis.extent(r)).sum();
        (last_far - first_near - total_extent) / (sorted.len() - 1) as f64
    });

    let mut out = Vec::with_capacity(sorted.len() - 1);
    let mut position = first_near;
    for (i, (id, rect)) in sorted.iter().enumerate() {
        if i > 0 {
            let point = match axis {
                Axis::Horizontal => Point::new(position, rect.y0),
                Axis::Vertical => Point::new(rect.x0, position),
            };
            out.push(NewPosition {
                id: *id,
                position: point,
            });
        }
        position += axis.extent(rect) + spacing;
    }
    out
}

/// Line boxes up on a shared anchor.
///
/// The target coordinate is the mean of the chosen anchor across all boxes;
/// every box gets a new origin placing its anchor there, with the orthogonal
/// coordinate untouched. Aligning along [`Axis::Horizontal`] moves y (the
/// boxes form a row); [`Axis::Vertical`] moves x.
pub fn align<I: Copy>(boxes: &[(I, Rect)], axis: Axis, anchor: Anchor) -> Vec<NewPosition<I>> {
    if boxes.is_empty() {
        return Vec::new();
    }
    let mean = boxes
        .iter()
        .map(|(_, r)| axis.anchor_coord(r, anchor))
        .sum::<f64>()
        / boxes.len() as f64;

    boxes
        .iter()
        .map(|(id, rect)| {
            let offset = match anchor {
                Anchor::Start => 0.0,
                Anchor::Center => axis.cross_extent(rect) * 0.5,
                Anchor::End => axis.cross_extent(rect),
            };
            let origin = mean - offset;
            let point = match axis {
                Axis::Horizontal => Point::new(rect.x0, origin),
                Axis::Vertical => Point::new(origin, rect.y0),
            };
            NewPosition {
                id: *id,
                position: point,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribute_with_explicit_spacing() {
        let boxes = [
            ('a', Rect::new(0.0, 0.0, 50.0, 50.0)),
            ('b', Rect::new(70.0, 0.0, 120.0, 50.0)),
            ('c', Rect::new(150.0, 0.0, 200.0, 50.0)),
        ];
        let moves = distribute(&boxes, Axis::Horizontal, Some(50.0));
        assert_eq!(moves.len(), 2, "the first box anchors the run");
        assert_eq!(moves[0].id, 'b');
        assert_eq!(moves[0].position, Point::new(100.0, 0.0));
        assert_eq!(moves[1].id, 'c');
        assert_eq!(moves[1].position, Point::new(200.0, 0.0));
    }

    #[test]
    fn distribute_derives_spacing_from_the_span() {
        let boxes = [
            ('a', Rect::new(0.0, 0.0, 50.0, 50.0)),
            ('b', Rect::new(70.0, 0.0, 120.0, 50.0)),
            ('c', Rect::new(150.0, 0.0, 200.0, 50.0)),
        ];
        // (200 - 0 - 150) / 2 = 25.
        let moves = distribute(&boxes, Axis::Horizontal, None);
        assert_eq!(moves[0].position.x, 75.0);
        assert_eq!(moves[1].position.x, 150.0);
    }

    #[test]
    fn distribute_sorts_before_walking() {
        let boxes = [
            ('c', Rect::new(150.0, 0.0, 200.0, 50.0)),
            ('a', Rect::new(0.0, 0.0, 50.0, 50.0)),
            ('b', Rect::new(70.0, 0.0, 120.0, 50.0)),
        ];
        let moves = distribute(&boxes, Axis::Horizontal, Some(50.0));
        assert_eq!(moves[0].id, 'b');
        assert_eq!(moves[1].id, 'c');
    }

    #[test]
    fn distribute_vertical_moves_y_only() {
        let boxes = [
            ('a', Rect::new(10.0, 0.0, 60.0, 40.0)),
            ('b', Rect::new(500.0, 55.0, 550.0, 95.0)),
        ];
        let moves = distribute(&boxes, Axis::Vertical, Some(10.0));
        assert_eq!(moves, alloc::vec![NewPosition { id: 'b', position: Point::new(500.0, 50.0) }]);
    }

    #[test]
    fn align_tops_uses_the_mean() {
        let boxes = [
            ('a', Rect::new(0.0, 10.0, 50.0, 60.0)),
            ('b', Rect::new(70.0, 20.0, 120.0, 90.0)),
            ('c', Rect::new(140.0, 30.0, 190.0, 50.0)),
        ];
        let moves = align(&boxes, Axis::Horizontal, Anchor::Start);
        assert_eq!(moves.len(), 3);
        for m in &moves {
            assert_eq!(m.position.y, 20.0, "top anchored at mean of 10, 20, 30");
        }
        assert_eq!(moves[0].position.x, 0.0, "x untouched");
    }

    #[test]
    fn align_centers_accounts_for_extents() {
        let boxes = [
            ('a', Rect::new(0.0, 0.0, 50.0, 20.0)),
            ('b', Rect::new(70.0, 0.0, 120.0, 60.0)),
        ];
        // Centers at y = 10 and 30; mean 20.
        let moves = align(&boxes, Axis::Horizontal, Anchor::Center);
        assert_eq!(moves[0].position.y, 10.0);
        assert_eq!(moves[1].position.y, -10.0);
    }

    #[test]
    fn align_right_edges_on_the_vertical_axis() {
        let boxes = [
            ('a', Rect::new(0.0, 0.0, 40.0, 20.0)),
            ('b', Rect::new(10.0, 40.0, 90.0, 60.0)),
        ];
        // Right edges at x = 40 and 90; mean 65.
        let moves = align(&boxes, Axis::Vertical, Anchor::End);
        assert_eq!(moves[0].position.x, 25.0);
        assert_eq!(moves[1].position.x, -15.0);
        assert_eq!(moves[0].position.y, 0.0, "y untouched");
    }

    #[test]
    fn degenerate_inputs_produce_no_moves() {
        let one = [('a', Rect::new(0.0, 0.0, 10.0, 10.0))];
        assert!(distribute(&one, Axis::Horizontal, None).is_empty());
        assert!(align::<char>(&[], Axis::Horizontal, Anchor::Start).is_empty());
    }
}
