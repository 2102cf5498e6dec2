// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lodestone Magnet: magnetic guide snapping over a spatial index.
//!
//! Lodestone Magnet is the per-frame half of the Lodestone alignment engine.
//! A canvas editor feeds it element snapshots once per re-sync and a guide
//! list per pointer move; the engine answers with a magnetically smoothed
//! position in well under a frame budget.
//!
//! - [`AlignmentEngine::set_elements`] rebuilds a
//!   [`lodestone_index::SpatialTree`] (STR bulk load) from `{id, x, y, w, h,
//!   rotation}` snapshots, indexing rotated elements by their axis-aligned
//!   envelope.
//! - [`AlignmentEngine::check_alignment`] probes an element's nine alignment
//!   points (center, corners, edge midpoints) against every visible guide,
//!   resolves each axis independently, and blends the proposed position
//!   toward the snapped one by a distance-graded [`magnetic_strength`]:
//!   continuous attraction, not a binary snap.
//! - Results memoize on `(element, rounded position)` with a ~100 ms TTL and
//!   a capped, oldest-first-evicted cache, so pointer jitter costs a hash
//!   lookup.
//! - [`AlignmentEngine::dynamic_guides`] and
//!   [`AlignmentEngine::detect_equal_spacing`] restrict candidate geometry to
//!   the index's viewport query, keeping the work proportional to local
//!   density.
//!
//! The engine is synchronous and single-threaded: one instance per
//! interaction context, no locking, rebuilds sequenced between drags. This
//! crate requires `std` (the memo cache is wall-clock bounded); its siblings
//! [`lodestone_index`] and `lodestone_layout` are no_std-capable.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Point;
//! use lodestone_magnet::{
//!     AlignmentEngine, ElementId, ElementSnapshot, GuideId, GuideKind, GuideLine, Orientation,
//! };
//!
//! let mut engine = AlignmentEngine::new();
//! engine.set_elements(&[ElementSnapshot {
//!     id: ElementId(1),
//!     x: 100.0,
//!     y: 100.0,
//!     width: 50.0,
//!     height: 50.0,
//!     rotation: 0.0,
//! }]);
//!
//! let guides = [GuideLine {
//!     id: GuideId(7),
//!     orientation: Orientation::Vertical,
//!     position: 103.0,
//!     kind: GuideKind::Manual,
//!     visible: true,
//! }];
//!
//! // A drag frame proposes (100, 100); the left edge is 3 units from the
//! // guide, so the result glides toward x = 103 without jumping there.
//! let result = engine.check_alignment(ElementId(1), Point::new(100.0, 100.0), &guides);
//! assert!(result.aligned);
//! assert_eq!(result.x, 103.0);
//! assert!(result.smooth_position.x > 100.0 && result.smooth_position.x <= 103.0);
//! assert_eq!(result.vertical_guide, Some(GuideId(7)));
//! ```

mod cache;
mod engine;
pub mod strength;
pub mod types;

pub use engine::{AlignmentEngine, EqualSpacingSnap};
pub use strength::{FalloffCurve, magnetic_strength};
pub use types::{
    AlignmentConfig, AlignmentPoint, ElementId, ElementSnapshot, EngineStats, GuideId, GuideKind,
    GuideLine, MagneticAlignment, Orientation, PointRole, SnapTargets, alignment_points,
};
