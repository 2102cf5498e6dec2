// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis and anchor vocabulary shared by the detectors.

use kurbo::Rect;

/// Flow direction of a run of boxes.
///
/// `Horizontal` describes a row: spacing and distribution run along x, while
/// alignment anchors run along y (top, vertical center, bottom). `Vertical`
/// describes a column with the roles swapped. This matches how designers
/// read "align horizontally": boxes lined up side by side sharing a
/// y-coordinate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Axis {
    /// A row: gaps along x, anchors along y.
    Horizontal,
    /// A column: gaps along y, anchors along x.
    Vertical,
}

/// Which edge (or the midline) of a box anchors an alignment.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Anchor {
    /// Top edge for rows, left edge for columns.
    Start,
    /// Midline.
    Center,
    /// Bottom edge for rows, right edge for columns.
    End,
}

impl Axis {
    /// The box's interval along the flow direction: `(near, far)`.
    pub(crate) fn span(self, rect: &Rect) -> (f64, f64) {
        match self {
            Self::Horizontal => (rect.x0, rect.x1),
            Self::Vertical => (rect.y0, rect.y1),
        }
    }

    /// Extent along the flow direction.
    pub(crate) fn extent(self, rect: &Rect) -> f64 {
        match self {
            Self::Horizontal => rect.width(),
            Self::Vertical => rect.height(),
        }
    }

    /// Extent across the flow direction.
    pub(crate) fn cross_extent(self, rect: &Rect) -> f64 {
        match self {
            Self::Horizontal => rect.height(),
            Self::Vertical => rect.width(),
        }
    }

    /// The anchor coordinate on the cross axis.
    pub(crate) fn anchor_coord(self, rect: &Rect, anchor: Anchor) -> f64 {
        match (self, anchor) {
            (Self::Horizontal, Anchor::Start) => rect.y0,
            (Self::Horizontal, Anchor::Center) => rect.center().y,
            (Self::Horizontal, Anchor::End) => rect.y1,
            (Self::Vertical, Anchor::Start) => rect.x0,
            (Self::Vertical, Anchor::Center) => rect.center().x,
            (Self::Vertical, Anchor::End) => rect.x1,
        }
    }
}
