// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The alignment engine: spatially indexed magnetic snapping.

use std::collections::HashMap;
use std::time::Instant;

use kurbo::{Affine, Point, Rect, Size};
use lodestone_index::{Aabb, SpatialTree};

use crate::cache::{SnapCache, SnapKey};
use crate::strength::magnetic_strength;
use crate::types::{
    AlignmentConfig, ElementId, ElementSnapshot, EngineStats, GuideId, GuideKind, GuideLine,
    MagneticAlignment, Orientation, alignment_points,
};

/// Two dynamic guides closer than this merge into one.
const GUIDE_DEDUP_TOLERANCE: f64 = 0.5;

/// A position at which the dragged element would continue an existing gap
/// rhythm, produced by [`AlignmentEngine::detect_equal_spacing`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EqualSpacingSnap {
    /// `Vertical` candidates propose an x coordinate, `Horizontal` a y.
    pub orientation: Orientation,
    /// Proposed coordinate for the dragged element's leading edge.
    pub position: f64,
    /// The gap being continued.
    pub spacing: f64,
    /// The pair of stationary elements whose gap sets the rhythm.
    pub between: (ElementId, ElementId),
}

/// Magnetic alignment calculator over an indexed element set.
///
/// The engine owns a [`SpatialTree`] rebuilt from element snapshots via
/// [`set_elements`](Self::set_elements) and answers per-frame
/// [`check_alignment`](Self::check_alignment) queries against a caller-owned
/// guide list. It is single-threaded by design: one engine per interaction
/// context, rebuilds sequenced between drags.
#[derive(Debug)]
pub struct AlignmentEngine {
    config: AlignmentConfig,
    tree: SpatialTree<ElementId>,
    bounds: HashMap<ElementId, Rect>,
    cache: SnapCache,
    stats: EngineStats,
}

impl Default for AlignmentEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AlignmentEngine {
    /// Create an engine with [`AlignmentConfig::default`].
    pub fn new() -> Self {
        Self::with_config(AlignmentConfig::default())
    }

    /// Create an engine with explicit tunables.
    pub fn with_config(config: AlignmentConfig) -> Self {
        Self {
            config,
            tree: SpatialTree::new(),
            bounds: HashMap::new(),
            cache: SnapCache::new(config.cache_ttl, config.cache_capacity),
            stats: EngineStats::default(),
        }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    /// Observability counters.
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Number of live memoized results.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop every memoized result.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Drop memoized results for one element, e.g. after it was dropped or
    /// resized outside a rebuild.
    pub fn invalidate(&mut self, element: ElementId) {
        self.cache.invalidate_element(element);
    }

    /// The indexed world envelope of an element, if known.
    pub fn element_bounds(&self, element: ElementId) -> Option<Rect> {
        self.bounds.get(&element).copied()
    }

    /// Rebuild the spatial index from current element snapshots.
    ///
    /// This is the full re-sync path (bulk STR load, not incremental edits)
    /// and must not run concurrently with an active drag's query sequence;
    /// the caller sequences rebuilds between interactions. Rotated elements
    /// are indexed by the axis-aligned envelope of their rotated corners.
    pub fn set_elements(&mut self, elements: &[ElementSnapshot]) {
        self.stats.rebuilds += 1;
        self.bounds.clear();
        let mut items = Vec::with_capacity(elements.len());
        for snap in elements {
            let world = world_bounds(snap);
            self.bounds.insert(snap.id, world);
            items.push((snap.id, rect_to_aabb(world)));
        }
        self.tree.bulk_load(&items);
        self.cache.clear();
    }

    /// Compute the magnetically smoothed position for `element` proposed at
    /// `proposed`, against the given guides.
    ///
    /// The element's nine alignment points are measured against every visible
    /// guide; per axis, the single closest match under the threshold wins.
    /// The two axes resolve independently, so a result can reference a
    /// vertical and a horizontal guide at once. Results are memoized on the
    /// rounded position for the configured TTL; a hit skips all geometry
    /// work.
    pub fn check_alignment(
        &mut self,
        element: ElementId,
        proposed: Point,
        guides: &[GuideLine],
    ) -> MagneticAlignment {
        let started = Instant::now();
        self.stats.checks += 1;
        let key = SnapKey::quantize(element, proposed);
        if let Some(memoized) = self.cache.get(&key) {
            self.stats.cache_hits += 1;
            self.record_elapsed(started);
            return memoized;
        }
        self.stats.cache_misses += 1;

        let size = self
            .bounds
            .get(&element)
            .map(|r| r.size())
            .unwrap_or(Size::ZERO);
        let rect = Rect::from_origin_size(proposed, size);
        let points = alignment_points(element, rect);

        let threshold = self.config.threshold;
        // Per axis: (distance, shift to land the point on the guide, guide).
        let mut best_vertical: Option<(f64, f64, GuideId)> = None;
        let mut best_horizontal: Option<(f64, f64, GuideId)> = None;
        for guide in guides {
            if !guide.visible {
                continue;
            }
            for probe in &points {
                if !self.config.targets.contains(probe.role.target()) {
                    continue;
                }
                match guide.orientation {
                    Orientation::Vertical => {
                        let distance = (probe.point.x - guide.position).abs();
                        if distance < threshold
                            && best_vertical.map(|(d, _, _)| distance < d).unwrap_or(true)
                        {
                            best_vertical =
                                Some((distance, guide.position - probe.point.x, guide.id));
                        }
                    }
                    Orientation::Horizontal => {
                        let distance = (probe.point.y - guide.position).abs();
                        if distance < threshold
                            && best_horizontal.map(|(d, _, _)| distance < d).unwrap_or(true)
                        {
                            best_horizontal =
                                Some((distance, guide.position - probe.point.y, guide.id));
                        }
                    }
                }
            }
        }

        let mut result = MagneticAlignment::passthrough(proposed);
        if let Some((distance, shift, guide)) = best_vertical {
            let strength = magnetic_strength(distance, threshold, self.config.curve);
            result.aligned = true;
            result.x = proposed.x + shift;
            result.delta_x = shift;
            result.smooth_position.x = proposed.x + shift * strength;
            result.vertical_guide = Some(guide);
            result.strength = result.strength.max(strength);
        }
        if let Some((distance, shift, guide)) = best_horizontal {
            let strength = magnetic_strength(distance, threshold, self.config.curve);
            result.aligned = true;
            result.y = proposed.y + shift;
            result.delta_y = shift;
            result.smooth_position.y = proposed.y + shift * strength;
            result.horizontal_guide = Some(guide);
            result.strength = result.strength.max(strength);
        }

        self.cache.insert(key, result);
        self.record_elapsed(started);
        result
    }

    /// Derive snappable guide lines from the element geometry near a
    /// viewport: edges and centers of every indexed element intersecting the
    /// viewport expanded by twice the snap threshold. Lines closer than half
    /// a unit merge, so densely stacked edges produce one guide, not dozens.
    pub fn dynamic_guides(&self, viewport: Rect) -> Vec<GuideLine> {
        let pad = self.config.threshold * 2.0;
        let expanded = viewport.inflate(pad, pad);
        let mut verticals: Vec<(f64, GuideKind)> = Vec::new();
        let mut horizontals: Vec<(f64, GuideKind)> = Vec::new();
        for id in self.tree.search_rect(rect_to_aabb(expanded)) {
            let Some(rect) = self.bounds.get(&id) else {
                continue;
            };
            verticals.push((rect.x0, GuideKind::Edge));
            verticals.push((rect.center().x, GuideKind::Center));
            verticals.push((rect.x1, GuideKind::Edge));
            horizontals.push((rect.y0, GuideKind::Edge));
            horizontals.push((rect.center().y, GuideKind::Center));
            horizontals.push((rect.y1, GuideKind::Edge));
        }

        let mut out = Vec::new();
        let mut next_id = 0_u64;
        for (orientation, mut lines) in [
            (Orientation::Vertical, verticals),
            (Orientation::Horizontal, horizontals),
        ] {
            lines.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(core::cmp::Ordering::Equal));
            let mut last: Option<f64> = None;
            for (position, kind) in lines {
                if last
                    .map(|l| (position - l).abs() <= GUIDE_DEDUP_TOLERANCE)
                    .unwrap_or(false)
                {
                    continue;
                }
                last = Some(position);
                out.push(GuideLine {
                    id: GuideId(next_id),
                    orientation,
                    position,
                    kind,
                    visible: true,
                });
                next_id += 1;
            }
        }
        out
    }

    /// Find positions where the dragged element would continue an existing
    /// equal-gap rhythm among its row and column neighbors.
    ///
    /// Candidates come only from elements the index reports inside the
    /// expanded viewport, so the cost tracks local density rather than the
    /// square of the document size. For every pair of neighbors with gap `g`
    /// the element can extend the run on either side or sit centered between
    /// them; results are sorted by distance from the proposed position.
    pub fn detect_equal_spacing(
        &self,
        element: ElementId,
        proposed: Point,
        viewport: Rect,
    ) -> Vec<EqualSpacingSnap> {
        let Some(stored) = self.bounds.get(&element) else {
            return Vec::new();
        };
        let moving = Rect::from_origin_size(proposed, stored.size());
        let pad = self.config.threshold * 2.0;
        let expanded = viewport.inflate(pad, pad);

        let mut row: Vec<(ElementId, Rect)> = Vec::new();
        let mut column: Vec<(ElementId, Rect)> = Vec::new();
        for id in self.tree.search_rect(rect_to_aabb(expanded)) {
            if id == element {
                continue;
            }
            let Some(rect) = self.bounds.get(&id) else {
                continue;
            };
            if rect.y0 < moving.y1 && moving.y0 < rect.y1 {
                row.push((id, *rect));
            }
            if rect.x0 < moving.x1 && moving.x0 < rect.x1 {
                column.push((id, *rect));
            }
        }
        row.sort_by(|a, b| a.1.x0.partial_cmp(&b.1.x0).unwrap_or(core::cmp::Ordering::Equal));
        column.sort_by(|a, b| a.1.y0.partial_cmp(&b.1.y0).unwrap_or(core::cmp::Ordering::Equal));

        let mut out = Vec::new();
        spacing_candidates(
            &row,
            moving.width(),
            Orientation::Vertical,
            |r| (r.x0, r.x1),
            &mut out,
        );
        spacing_candidates(
            &column,
            moving.height(),
            Orientation::Horizontal,
            |r| (r.y0, r.y1),
            &mut out,
        );

        let reference = |snap: &EqualSpacingSnap| match snap.orientation {
            Orientation::Vertical => (snap.position - proposed.x).abs(),
            Orientation::Horizontal => (snap.position - proposed.y).abs(),
        };
        out.sort_by(|a, b| {
            reference(a)
                .partial_cmp(&reference(b))
                .unwrap_or(core::cmp::Ordering::Equal)
        });
        out
    }

    fn record_elapsed(&mut self, started: Instant) {
        let micros = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.stats.total_check_micros = self.stats.total_check_micros.saturating_add(micros);
    }
}

/// Emit the extend-left, extend-right, and centered-between candidates for
/// every consecutive neighbor pair along one axis.
fn spacing_candidates(
    neighbors: &[(ElementId, Rect)],
    extent: f64,
    orientation: Orientation,
    span_of: impl Fn(&Rect) -> (f64, f64),
    out: &mut Vec<EqualSpacingSnap>,
) {
    for pair in neighbors.windows(2) {
        let (a_id, a_rect) = pair[0];
        let (b_id, b_rect) = pair[1];
        let (a_min, a_max) = span_of(&a_rect);
        let (b_min, b_max) = span_of(&b_rect);
        let gap = b_min - a_max;
        if gap < 0.0 {
            continue;
        }
        let between = (a_id, b_id);
        // Continue the run past either end of the pair.
        out.push(EqualSpacingSnap {
            orientation,
            position: b_max + gap,
            spacing: gap,
            between,
        });
        out.push(EqualSpacingSnap {
            orientation,
            position: a_min - gap - extent,
            spacing: gap,
            between,
        });
        // Sit centered inside the gap when the element fits.
        if gap > extent {
            out.push(EqualSpacingSnap {
                orientation,
                position: a_max + (gap - extent) * 0.5,
                spacing: (gap - extent) * 0.5,
                between,
            });
        }
    }
}

/// Axis-aligned world envelope of a snapshot: the unrotated box, or the
/// bounding box of its four corners rotated about the center.
fn world_bounds(snap: &ElementSnapshot) -> Rect {
    let rect = Rect::new(snap.x, snap.y, snap.x + snap.width, snap.y + snap.height);
    if snap.rotation == 0.0 {
        return rect;
    }
    transform_rect_bbox(Affine::rotate_about(snap.rotation, rect.center()), rect)
}

/// Transform an axis-aligned `Rect` by an `Affine` and return a conservative
/// axis-aligned bounding box.
fn transform_rect_bbox(affine: Affine, rect: Rect) -> Rect {
    let p0 = affine * Point::new(rect.x0, rect.y0);
    let p1 = affine * Point::new(rect.x1, rect.y0);
    let p2 = affine * Point::new(rect.x0, rect.y1);
    let p3 = affine * Point::new(rect.x1, rect.y1);
    let min_x = p0.x.min(p1.x).min(p2.x).min(p3.x);
    let min_y = p0.y.min(p1.y).min(p2.y).min(p3.y);
    let max_x = p0.x.max(p1.x).max(p2.x).max(p3.x);
    let max_y = p0.y.max(p1.y).max(p2.y).max(p3.y);
    Rect::new(min_x, min_y, max_x, max_y)
}

fn rect_to_aabb(r: Rect) -> Aabb {
    Aabb::new(r.x0, r.y0, r.x1, r.y1)
}
