// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core vocabulary of the alignment engine: elements, guides, alignment
//! points, configuration, and counters.

use core::time::Duration;

use bitflags::bitflags;
use kurbo::{Point, Rect};

use crate::strength::FalloffCurve;

/// Identifier of a canvas element, assigned by the element store.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ElementId(
    /// The raw id value.
    pub u64,
);

/// Identifier of a guide line.
///
/// Manual guides carry ids from the guide-management collaborator; guides
/// produced by [`AlignmentEngine::dynamic_guides`](crate::AlignmentEngine::dynamic_guides)
/// are numbered from zero per call.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct GuideId(
    /// The raw id value.
    pub u64,
);

/// Orientation of a guide line.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Orientation {
    /// A horizontal line: constant y, snaps vertical motion.
    Horizontal,
    /// A vertical line: constant x, snaps horizontal motion.
    Vertical,
}

/// How a guide line came to exist.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum GuideKind {
    /// Placed by the user.
    Manual,
    /// Derived automatically during a drag.
    Auto,
    /// Derived from an element center.
    Center,
    /// Derived from an element edge.
    Edge,
}

/// A horizontal or vertical reference line that dragged elements snap to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GuideLine {
    /// Stable identifier.
    pub id: GuideId,
    /// Line orientation.
    pub orientation: Orientation,
    /// The line's coordinate: x for vertical guides, y for horizontal ones.
    pub position: f64,
    /// Provenance of the line.
    pub kind: GuideKind,
    /// Invisible guides are skipped by alignment checks.
    pub visible: bool,
}

/// One element snapshot as supplied by the canvas/element store.
///
/// `rotation` is in radians about the box center; the engine derives the
/// axis-aligned world envelope internally.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ElementSnapshot {
    /// Element identifier.
    pub id: ElementId,
    /// Left edge of the unrotated box.
    pub x: f64,
    /// Top edge of the unrotated box.
    pub y: f64,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
    /// Rotation about the box center, radians.
    pub rotation: f64,
}

/// Which of an element's nine probe points an [`AlignmentPoint`] is.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PointRole {
    /// Box center.
    Center,
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
    /// Midpoint of the top edge.
    EdgeTop,
    /// Midpoint of the right edge.
    EdgeRight,
    /// Midpoint of the bottom edge.
    EdgeBottom,
    /// Midpoint of the left edge.
    EdgeLeft,
}

impl PointRole {
    /// The [`SnapTargets`] bit governing this role.
    pub fn target(self) -> SnapTargets {
        match self {
            Self::Center => SnapTargets::CENTER,
            Self::TopLeft | Self::TopRight | Self::BottomLeft | Self::BottomRight => {
                SnapTargets::CORNERS
            }
            Self::EdgeTop | Self::EdgeRight | Self::EdgeBottom | Self::EdgeLeft => {
                SnapTargets::EDGE_MIDPOINTS
            }
        }
    }
}

/// One of the nine probe points checked against every guide.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AlignmentPoint {
    /// World position of the probe point.
    pub point: Point,
    /// Element the point belongs to.
    pub element: ElementId,
    /// Which of the nine points this is.
    pub role: PointRole,
}

/// The nine alignment points of a box: center, four corners, and four edge
/// midpoints.
pub fn alignment_points(element: ElementId, rect: Rect) -> [AlignmentPoint; 9] {
    let cx = rect.center().x;
    let cy = rect.center().y;
    let p = |x: f64, y: f64, role: PointRole| AlignmentPoint {
        point: Point::new(x, y),
        element,
        role,
    };
    [
        p(cx, cy, PointRole::Center),
        p(rect.x0, rect.y0, PointRole::TopLeft),
        p(rect.x1, rect.y0, PointRole::TopRight),
        p(rect.x0, rect.y1, PointRole::BottomLeft),
        p(rect.x1, rect.y1, PointRole::BottomRight),
        p(cx, rect.y0, PointRole::EdgeTop),
        p(rect.x1, cy, PointRole::EdgeRight),
        p(cx, rect.y1, PointRole::EdgeBottom),
        p(rect.x0, cy, PointRole::EdgeLeft),
    ]
}

bitflags! {
    /// Which alignment-point roles participate in magnetic checks.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SnapTargets: u8 {
        /// The box center.
        const CENTER         = 0b0000_0001;
        /// The four corners.
        const CORNERS        = 0b0000_0010;
        /// The four edge midpoints.
        const EDGE_MIDPOINTS = 0b0000_0100;
    }
}

impl Default for SnapTargets {
    fn default() -> Self {
        Self::CENTER | Self::CORNERS | Self::EDGE_MIDPOINTS
    }
}

/// Tunables of the alignment engine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AlignmentConfig {
    /// Snap distance in canvas units; beyond it a guide exerts no pull.
    pub threshold: f64,
    /// Falloff shape of the magnetic strength inside the threshold.
    pub curve: FalloffCurve,
    /// Which probe points are checked against guides.
    pub targets: SnapTargets,
    /// How long a memoized alignment result stays valid.
    pub cache_ttl: Duration,
    /// Maximum number of memoized results; oldest entries are evicted first.
    pub cache_capacity: usize,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            threshold: 8.0,
            curve: FalloffCurve::Quadratic,
            targets: SnapTargets::default(),
            cache_ttl: Duration::from_millis(100),
            cache_capacity: 1000,
        }
    }
}

/// Result of one magnetic alignment check.
///
/// `smooth_position` always lies on the segment between the proposed position
/// and the fully snapped `(x, y)`; the interpolation factor is the magnetic
/// strength, so an element glides toward a guide instead of jumping.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MagneticAlignment {
    /// Whether at least one axis matched a guide.
    pub aligned: bool,
    /// Fully snapped x coordinate (equals the proposed x when unmatched).
    pub x: f64,
    /// Fully snapped y coordinate (equals the proposed y when unmatched).
    pub y: f64,
    /// `x` minus the proposed x.
    pub delta_x: f64,
    /// `y` minus the proposed y.
    pub delta_y: f64,
    /// Strongest magnetic pull among the matched axes, in `[0, 1]`.
    pub strength: f64,
    /// Proposed position blended toward the snapped one by the strength.
    pub smooth_position: Point,
    /// The vertical guide that matched, if any.
    pub vertical_guide: Option<GuideId>,
    /// The horizontal guide that matched, if any.
    pub horizontal_guide: Option<GuideId>,
}

impl MagneticAlignment {
    /// An unmatched result passing the proposed position through unchanged.
    pub fn passthrough(proposed: Point) -> Self {
        Self {
            aligned: false,
            x: proposed.x,
            y: proposed.y,
            delta_x: 0.0,
            delta_y: 0.0,
            strength: 0.0,
            smooth_position: proposed,
            vertical_guide: None,
            horizontal_guide: None,
        }
    }
}

/// Running counters exposed for observability; they carry no correctness
/// contract.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Full index rebuilds performed.
    pub rebuilds: u64,
    /// Alignment checks requested (hits and misses).
    pub checks: u64,
    /// Checks answered from the memo cache.
    pub cache_hits: u64,
    /// Checks that ran the full geometry pass.
    pub cache_misses: u64,
    /// Total wall time spent in checks, microseconds.
    pub total_check_micros: u64,
}

impl EngineStats {
    /// Fraction of checks served from the cache, 0 when none ran.
    pub fn cache_hit_rate(&self) -> f64 {
        if self.checks == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.checks as f64
        }
    }

    /// Mean wall time per check in microseconds, 0 when none ran.
    pub fn avg_check_micros(&self) -> f64 {
        if self.checks == 0 {
            0.0
        } else {
            self.total_check_micros as f64 / self.checks as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nine_distinct_points() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        let points = alignment_points(ElementId(1), rect);
        assert_eq!(points.len(), 9);
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                assert_ne!(a.point, b.point, "{:?} and {:?} coincide", a.role, b.role);
            }
        }
        assert_eq!(points[0].point, Point::new(50.0, 25.0));
    }

    #[test]
    fn roles_map_to_their_target_bits() {
        assert_eq!(PointRole::Center.target(), SnapTargets::CENTER);
        assert_eq!(PointRole::TopRight.target(), SnapTargets::CORNERS);
        assert_eq!(PointRole::EdgeLeft.target(), SnapTargets::EDGE_MIDPOINTS);
    }

    #[test]
    fn default_targets_cover_everything() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let targets = SnapTargets::default();
        for p in alignment_points(ElementId(0), rect) {
            assert!(targets.contains(p.role.target()));
        }
    }

    #[test]
    fn stats_rates_handle_zero_checks() {
        let stats = EngineStats::default();
        assert_eq!(stats.cache_hit_rate(), 0.0);
        assert_eq!(stats.avg_check_micros(), 0.0);
    }
}
