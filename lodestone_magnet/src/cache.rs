// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-bounded memoization of alignment checks.
//!
//! Pointer-move handlers often re-ask about the same quantized position many
//! times in a row (the pointer reports sub-pixel jitter while the rounded
//! position stands still). Memoizing on `(element, round(x), round(y))` with
//! a short TTL turns those frames into hash lookups.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use kurbo::Point;

use crate::types::{ElementId, MagneticAlignment};

/// Composite cache key: element id plus the proposed position rounded to
/// whole canvas units. Fixed-layout, no per-frame allocation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct SnapKey {
    element: ElementId,
    x: i32,
    y: i32,
}

impl SnapKey {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "canvas coordinates fit i32 by a wide margin; saturating on overflow is fine for a cache key"
    )]
    pub(crate) fn quantize(element: ElementId, position: Point) -> Self {
        Self {
            element,
            x: position.x.round() as i32,
            y: position.y.round() as i32,
        }
    }
}

struct Slot {
    stored_at: Instant,
    value: MagneticAlignment,
}

/// TTL-and-capacity bounded map of memoized alignment results.
///
/// Entries expire `ttl` after insertion. Past `capacity` live entries, the
/// oldest inserted entry is evicted first.
pub(crate) struct SnapCache {
    ttl: Duration,
    capacity: usize,
    slots: HashMap<SnapKey, Slot>,
    order: VecDeque<SnapKey>,
}

impl SnapCache {
    pub(crate) fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            slots: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub(crate) fn get(&mut self, key: &SnapKey) -> Option<MagneticAlignment> {
        let slot = self.slots.get(key)?;
        if slot.stored_at.elapsed() >= self.ttl {
            self.slots.remove(key);
            return None;
        }
        Some(slot.value)
    }

    pub(crate) fn insert(&mut self, key: SnapKey, value: MagneticAlignment) {
        if self.capacity == 0 {
            return;
        }
        let slot = Slot {
            stored_at: Instant::now(),
            value,
        };
        if self.slots.insert(key, slot).is_none() {
            self.order.push_back(key);
        }
        while self.slots.len() > self.capacity {
            // The order queue can hold keys whose slots already expired away;
            // keep popping until a live entry is dropped.
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.slots.remove(&oldest);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.order.clear();
    }

    /// Drop every memoized result for one element.
    pub(crate) fn invalidate_element(&mut self, element: ElementId) {
        self.slots.retain(|key, _| key.element != element);
        self.order.retain(|key| key.element != element);
    }
}

impl std::fmt::Debug for SnapCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapCache")
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .field("len", &self.slots.len())
            .finish_non_exhaustive()
    }
}
