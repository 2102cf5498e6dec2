// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lodestone Index: a balanced bounding-box tree for canvas-sized scenes.
//!
//! Lodestone Index is the spatial backbone of the Lodestone alignment engine.
//! It keeps axis-aligned bounding boxes in a height-balanced tree so that the
//! per-frame queries issued during a drag touch only the elements near the
//! pointer instead of the whole document.
//!
//! - Insert, update, and remove boxes keyed by caller-supplied ids.
//! - R*-style insertion: overlap-aware subtree choice and margin-driven node
//!   splits keep query fan-out low under incremental edits.
//! - [`SpatialTree::bulk_load`] packs a fresh tree with Sort-Tile-Recursive
//!   tiling for full re-syncs, independent of input order.
//! - Rectangle queries accept partially open [`Region`]s, so half-plane
//!   questions like "everything right of x" need no sentinel coordinates.
//! - [`SpatialTree::search_radius`] prefilters with the enclosing square and
//!   then applies the exact Euclidean test on stored centers.
//!
//! Removal uses a deliberately simple condense step: a node left underfull is
//! detached whole and its items are reinserted through the normal insertion
//! path. At the element counts a canvas editor sees (hundreds), this is
//! indistinguishable from the classical surgical rebalance and much easier to
//! reason about.
//!
//! # Example
//!
//! ```rust
//! use lodestone_index::{Aabb, Region, SpatialTree};
//!
//! let mut tree = SpatialTree::new();
//! tree.insert(1_u32, Aabb::from_xywh(0.0, 0.0, 50.0, 50.0));
//! tree.insert(2, Aabb::from_xywh(70.0, 0.0, 50.0, 50.0));
//! tree.insert(3, Aabb::from_xywh(300.0, 300.0, 50.0, 50.0));
//!
//! // Everything intersecting a viewport rectangle.
//! let mut near = tree.search_rect(Aabb::from_xywh(-10.0, -10.0, 150.0, 80.0));
//! near.sort_unstable();
//! assert_eq!(near, vec![1, 2]);
//!
//! // Half-plane query: everything right of x = 200.
//! assert_eq!(tree.search(Region::right_of(200.0)), vec![3]);
//!
//! // Centers within 60 units of (35, 25).
//! let mut close = tree.search_radius(35.0, 25.0, 60.0);
//! close.sort_unstable();
//! assert_eq!(close, vec![1, 2]);
//! ```
//!
//! # Error model
//!
//! Every operation is total over well-formed geometry: removing or updating
//! an unknown id is a no-op, and inverted query rectangles return empty
//! results. Structural corruption, on the other hand, is a programmer error
//! and panics rather than silently answering queries wrong.
//!
//! ## Float semantics
//!
//! Coordinates are `f64` and assumed finite (no NaNs). Degenerate zero-area
//! boxes are valid items and valid queries.

#![no_std]

extern crate alloc;

pub mod tree;
pub mod types;

pub use tree::SpatialTree;
pub use types::{Aabb, Region};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn end_to_end_edit_session() {
        let mut tree: SpatialTree<u64> = SpatialTree::new();
        for i in 0..30 {
            tree.insert(i, Aabb::from_xywh(i as f64 * 25.0, 0.0, 20.0, 20.0));
        }
        tree.update(4, Aabb::from_xywh(1000.0, 0.0, 20.0, 20.0));
        tree.remove(5);
        assert_eq!(tree.len(), 29);

        let left: Vec<u64> = tree.search(Region::left_of(100.0));
        assert!(left.contains(&0) && left.contains(&3));
        assert!(!left.contains(&4) && !left.contains(&5));
    }
}
