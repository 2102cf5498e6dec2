// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Balanced bounding-box tree with R*-style insertion and STR bulk loading.

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use crate::types::{Aabb, Region, overlap_area};

/// Arena handle of a tree node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct NodeIx(usize);

impl NodeIx {
    const fn new(i: usize) -> Self {
        Self(i)
    }

    const fn get(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
enum Entry<I> {
    /// Leaf-level entry: a stored item.
    Item { id: I, bounds: Aabb },
    /// Internal entry: a child node handle.
    Child { node: NodeIx, bounds: Aabb },
}

impl<I: Copy> Entry<I> {
    fn bounds(&self) -> Aabb {
        match self {
            Self::Item { bounds, .. } | Self::Child { bounds, .. } => *bounds,
        }
    }
}

#[derive(Clone, Debug)]
struct Node<I> {
    /// Leaves are at height 0; every level above adds one.
    height: usize,
    /// Tight union of the entry bounds.
    bounds: Aabb,
    entries: Vec<Entry<I>>,
}

/// Balanced spatial index over axis-aligned bounding boxes.
///
/// Nodes live in an arena addressed by integer handles; the root-to-leaf path
/// is threaded through the insertion recursion, so nodes carry no parent
/// links. All leaves sit at the same depth.
///
/// Ids are caller-supplied and must be `Copy + Ord`; inserting an id that is
/// already present replaces its previous bounds.
pub struct SpatialTree<I> {
    max_entries: usize,
    min_entries: usize,
    root: Option<NodeIx>,
    arena: Vec<Node<I>>,
    free: Vec<NodeIx>,
    items: BTreeMap<I, Aabb>,
}

impl<I: Copy + Ord + Debug> Default for SpatialTree<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Copy + Ord + Debug> SpatialTree<I> {
    /// Create an empty tree with the default branching factor (8 entries per
    /// node, minimum fill 4).
    pub fn new() -> Self {
        Self::with_branching(8)
    }

    /// Create an empty tree holding up to `max_entries` entries per node.
    ///
    /// The minimum fill is derived as 40% of `max_entries` (at least 2), the
    /// usual R* fill factor.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries < 4`; smaller nodes cannot be split.
    pub fn with_branching(max_entries: usize) -> Self {
        assert!(
            max_entries >= 4,
            "max_entries must be at least 4 to admit a split"
        );
        let min_entries = (max_entries * 2 / 5).max(2);
        Self {
            max_entries,
            min_entries,
            root: None,
            arena: Vec::new(),
            free: Vec::new(),
            items: BTreeMap::new(),
        }
    }

    /// Number of items currently stored.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The stored bounds of `id`, if present. Returned by value; mutating the
    /// copy does not touch the index.
    pub fn bounds_of(&self, id: I) -> Option<Aabb> {
        self.items.get(&id).copied()
    }

    /// Iterate over all stored `(id, bounds)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (I, Aabb)> + '_ {
        self.items.iter().map(|(id, b)| (*id, *b))
    }

    /// Remove every item and release all nodes.
    pub fn clear(&mut self) {
        self.root = None;
        self.arena.clear();
        self.free.clear();
        self.items.clear();
    }

    /// Insert `id` with the given bounds, replacing any previous entry for
    /// the same id. Amortized O(log n).
    pub fn insert(&mut self, id: I, bounds: Aabb) {
        debug_assert!(!bounds.is_empty(), "inserted bounds must not be inverted");
        if self.items.contains_key(&id) {
            self.remove(id);
        }
        self.items.insert(id, bounds);
        self.insert_at_root(id, bounds);
    }

    /// Remove `id` from the tree. Unknown ids are a silent no-op.
    ///
    /// A node left underfull by the removal is detached whole; every item of
    /// its subtree is collected and reinserted through the normal insertion
    /// path. This trades the classical surgical rebalance for simplicity and
    /// behaves well at canvas-sized element counts.
    pub fn remove(&mut self, id: I) {
        let Some(bounds) = self.items.remove(&id) else {
            return;
        };
        let Some(root) = self.root else {
            unreachable!("item table had an entry but the tree has no root");
        };
        let mut orphans = Vec::new();
        let found = self.remove_rec(root, id, &bounds, &mut orphans);
        debug_assert!(found, "item table out of sync with tree structure");

        // Shrink the root: drop it when empty, collapse single-child chains.
        loop {
            let Some(r) = self.root else { break };
            let node = &self.arena[r.get()];
            if node.entries.is_empty() {
                self.release(r);
                self.root = None;
                break;
            }
            if node.height > 0 && node.entries.len() == 1 {
                let child = match node.entries[0] {
                    Entry::Child { node, .. } => node,
                    Entry::Item { .. } => unreachable!("item entry in an internal node"),
                };
                self.release(r);
                self.root = Some(child);
                continue;
            }
            break;
        }

        for (oid, ob) in orphans {
            self.insert_at_root(oid, ob);
        }
    }

    /// Replace the bounds of `id`. Equivalent to `remove` followed by
    /// `insert`; inserts fresh if the id was never stored.
    pub fn update(&mut self, id: I, bounds: Aabb) {
        self.remove(id);
        self.insert(id, bounds);
    }

    /// Discard the current tree and rebuild it from `items` with
    /// Sort-Tile-Recursive packing: sort by center x, tile into vertical
    /// slices, sort each slice by center y, chunk into leaves, then build
    /// parent levels bottom-up the same way. O(n log n), no splitting, and
    /// the result is height-balanced regardless of input order.
    ///
    /// Later duplicates of an id win over earlier ones.
    pub fn bulk_load(&mut self, items: &[(I, Aabb)]) {
        self.clear();
        for (id, bounds) in items {
            debug_assert!(!bounds.is_empty(), "loaded bounds must not be inverted");
            self.items.insert(*id, *bounds);
        }
        if self.items.is_empty() {
            return;
        }

        let mut list: Vec<(I, Aabb)> = self.items.iter().map(|(id, b)| (*id, *b)).collect();
        let n = list.len();
        let leaf_count = n.div_ceil(self.max_entries);
        let slices = ceil_sqrt(leaf_count);
        list.sort_by(|a, b| {
            a.1.center_x()
                .partial_cmp(&b.1.center_x())
                .unwrap_or(Ordering::Equal)
        });
        let mut level: Vec<NodeIx> = Vec::with_capacity(leaf_count);
        for slice_range in balanced_ranges(n, slices) {
            let slice = &mut list[slice_range];
            slice.sort_by(|a, b| {
                a.1.center_y()
                    .partial_cmp(&b.1.center_y())
                    .unwrap_or(Ordering::Equal)
            });
            let filled = slice.len();
            for chunk_range in balanced_ranges(filled, filled.div_ceil(self.max_entries)) {
                let entries: Vec<Entry<I>> = slice[chunk_range]
                    .iter()
                    .map(|(id, bounds)| Entry::Item {
                        id: *id,
                        bounds: *bounds,
                    })
                    .collect();
                let bounds = entries_bounds(&entries);
                level.push(self.alloc(Node {
                    height: 0,
                    bounds,
                    entries,
                }));
            }
        }

        let mut height = 0;
        while level.len() > 1 {
            height += 1;
            level = self.build_parent_level(level, height);
        }
        self.root = Some(level[0]);
    }

    /// Return the ids of all items whose bounds intersect the resolved query
    /// region. Open sides of the region default to ±∞; an inverted region
    /// yields no results.
    pub fn search(&self, region: Region) -> Vec<I> {
        self.search_rect(region.resolve())
    }

    /// Return the ids of all items whose bounds intersect `rect` (touching
    /// edges count). Inverted rectangles yield no results.
    pub fn search_rect(&self, rect: Aabb) -> Vec<I> {
        let mut out = Vec::new();
        if rect.is_empty() {
            return out;
        }
        let Some(root) = self.root else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(ix) = stack.pop() {
            let node = &self.arena[ix.get()];
            if !node.bounds.intersects(&rect) {
                continue;
            }
            for entry in &node.entries {
                match entry {
                    Entry::Item { id, bounds } => {
                        if bounds.intersects(&rect) {
                            out.push(*id);
                        }
                    }
                    Entry::Child { node: child, bounds } => {
                        if bounds.intersects(&rect) {
                            stack.push(*child);
                        }
                    }
                }
            }
        }
        out
    }

    /// Return the ids of all items whose stored center lies within `radius`
    /// of `(cx, cy)` (boundary included). Prefilters with a rectangle query
    /// on the enclosing square, then applies the exact Euclidean test.
    pub fn search_radius(&self, cx: f64, cy: f64, radius: f64) -> Vec<I> {
        if radius < 0.0 {
            return Vec::new();
        }
        let square = Aabb::new(cx - radius, cy - radius, cx + radius, cy + radius);
        let mut out = self.search_rect(square);
        out.retain(|id| {
            let b = self
                .items
                .get(id)
                .expect("search returned an id missing from the item table");
            let dx = b.center_x() - cx;
            let dy = b.center_y() - cy;
            dx * dx + dy * dy <= radius * radius
        });
        out
    }

    // --- internals ---

    fn alloc(&mut self, node: Node<I>) -> NodeIx {
        if let Some(ix) = self.free.pop() {
            self.arena[ix.get()] = node;
            ix
        } else {
            let ix = NodeIx::new(self.arena.len());
            self.arena.push(node);
            ix
        }
    }

    fn release(&mut self, ix: NodeIx) {
        self.arena[ix.get()].entries.clear();
        self.free.push(ix);
    }

    fn insert_at_root(&mut self, id: I, bounds: Aabb) {
        match self.root {
            None => {
                let root = self.alloc(Node {
                    height: 0,
                    bounds,
                    entries: vec![Entry::Item { id, bounds }],
                });
                self.root = Some(root);
            }
            Some(root) => {
                if let Some(sibling) = self.insert_rec(root, id, bounds) {
                    self.grow_root(root, sibling);
                }
            }
        }
    }

    /// Descend to a leaf, insert, and propagate splits back up the recursion.
    /// Returns the handle of a new right sibling when the node at `ix` split.
    fn insert_rec(&mut self, ix: NodeIx, id: I, bounds: Aabb) -> Option<NodeIx> {
        let max_entries = self.max_entries;
        if self.arena[ix.get()].height == 0 {
            {
                let node = &mut self.arena[ix.get()];
                node.entries.push(Entry::Item { id, bounds });
                node.bounds = node.bounds.union(&bounds);
            }
            if self.arena[ix.get()].entries.len() > max_entries {
                return Some(self.split(ix));
            }
            return None;
        }

        let pos = self.choose_subtree(ix, &bounds);
        let child = match self.arena[ix.get()].entries[pos] {
            Entry::Child { node, .. } => node,
            Entry::Item { .. } => unreachable!("item entry in an internal node"),
        };
        let split = self.insert_rec(child, id, bounds);

        let child_bounds = self.arena[child.get()].bounds;
        match &mut self.arena[ix.get()].entries[pos] {
            Entry::Child { bounds: b, .. } => *b = child_bounds,
            Entry::Item { .. } => unreachable!("item entry in an internal node"),
        }
        if let Some(sibling) = split {
            let sb = self.arena[sibling.get()].bounds;
            self.arena[ix.get()].entries.insert(
                pos + 1,
                Entry::Child {
                    node: sibling,
                    bounds: sb,
                },
            );
        }
        let tight = entries_bounds(&self.arena[ix.get()].entries);
        self.arena[ix.get()].bounds = tight;

        if self.arena[ix.get()].entries.len() > max_entries {
            return Some(self.split(ix));
        }
        None
    }

    /// Pick the child entry to descend into: least overlap increase with the
    /// sibling entries, then least area enlargement, then least area.
    fn choose_subtree(&self, ix: NodeIx, new: &Aabb) -> usize {
        let entries = &self.arena[ix.get()].entries;
        let mut best = 0;
        let mut best_cost = (f64::INFINITY, f64::INFINITY, f64::INFINITY);
        for (i, entry) in entries.iter().enumerate() {
            let eb = entry.bounds();
            let enlarged = eb.union(new);
            let mut overlap_increase = 0.0;
            for (j, sibling) in entries.iter().enumerate() {
                if i == j {
                    continue;
                }
                let sb = sibling.bounds();
                overlap_increase += overlap_area(&enlarged, &sb) - overlap_area(&eb, &sb);
            }
            let cost = (overlap_increase, enlarged.area() - eb.area(), eb.area());
            if cost < best_cost {
                best_cost = cost;
                best = i;
            }
        }
        best
    }

    /// Split an overflowing node in place; the surviving node keeps the left
    /// group and the returned handle owns the right group.
    fn split(&mut self, ix: NodeIx) -> NodeIx {
        debug_assert!(
            self.arena[ix.get()].entries.len() > self.max_entries,
            "split invoked without overflow"
        );
        let min_entries = self.min_entries;
        let height = self.arena[ix.get()].height;
        let entries = core::mem::take(&mut self.arena[ix.get()].entries);
        let (left, right) = split_entries(entries, min_entries);
        let left_bounds = entries_bounds(&left);
        let right_bounds = entries_bounds(&right);
        {
            let node = &mut self.arena[ix.get()];
            node.entries = left;
            node.bounds = left_bounds;
        }
        self.alloc(Node {
            height,
            bounds: right_bounds,
            entries: right,
        })
    }

    fn grow_root(&mut self, left: NodeIx, right: NodeIx) {
        let height = self.arena[left.get()].height + 1;
        let lb = self.arena[left.get()].bounds;
        let rb = self.arena[right.get()].bounds;
        let root = self.alloc(Node {
            height,
            bounds: lb.union(&rb),
            entries: vec![
                Entry::Child {
                    node: left,
                    bounds: lb,
                },
                Entry::Child {
                    node: right,
                    bounds: rb,
                },
            ],
        });
        self.root = Some(root);
    }

    /// Locate and delete the item, guided by its stored bounds. On the way
    /// back up, a child left underfull is detached whole and its subtree's
    /// items land in `orphans` for reinsertion.
    fn remove_rec(&mut self, ix: NodeIx, id: I, bounds: &Aabb, orphans: &mut Vec<(I, Aabb)>) -> bool {
        if !self.arena[ix.get()].bounds.intersects(bounds) {
            return false;
        }
        if self.arena[ix.get()].height == 0 {
            let node = &mut self.arena[ix.get()];
            let before = node.entries.len();
            node.entries
                .retain(|e| !matches!(e, Entry::Item { id: eid, .. } if *eid == id));
            if node.entries.len() == before {
                return false;
            }
            node.bounds = entries_bounds(&node.entries);
            return true;
        }

        let child_count = self.arena[ix.get()].entries.len();
        for pos in 0..child_count {
            let (child, child_bounds) = match self.arena[ix.get()].entries[pos] {
                Entry::Child { node, bounds } => (node, bounds),
                Entry::Item { .. } => unreachable!("item entry in an internal node"),
            };
            if !child_bounds.intersects(bounds) {
                continue;
            }
            if !self.remove_rec(child, id, bounds, orphans) {
                continue;
            }
            if self.arena[child.get()].entries.len() < self.min_entries {
                self.arena[ix.get()].entries.remove(pos);
                self.collect_items(child, orphans);
            } else {
                let cb = self.arena[child.get()].bounds;
                match &mut self.arena[ix.get()].entries[pos] {
                    Entry::Child { bounds: b, .. } => *b = cb,
                    Entry::Item { .. } => unreachable!("item entry in an internal node"),
                }
            }
            let tight = entries_bounds(&self.arena[ix.get()].entries);
            self.arena[ix.get()].bounds = tight;
            return true;
        }
        false
    }

    /// Flatten a detached subtree into orphan items, releasing its nodes.
    fn collect_items(&mut self, ix: NodeIx, orphans: &mut Vec<(I, Aabb)>) {
        let entries = core::mem::take(&mut self.arena[ix.get()].entries);
        for entry in entries {
            match entry {
                Entry::Item { id, bounds } => orphans.push((id, bounds)),
                Entry::Child { node, .. } => self.collect_items(node, orphans),
            }
        }
        self.release(ix);
    }

    /// Tile one tree level into parents with the same STR pass used for
    /// leaves.
    fn build_parent_level(&mut self, mut level: Vec<NodeIx>, height: usize) -> Vec<NodeIx> {
        let n = level.len();
        let parent_count = n.div_ceil(self.max_entries);
        let slices = ceil_sqrt(parent_count);
        level.sort_by(|a, b| {
            self.arena[a.get()]
                .bounds
                .center_x()
                .partial_cmp(&self.arena[b.get()].bounds.center_x())
                .unwrap_or(Ordering::Equal)
        });
        let mut next = Vec::with_capacity(parent_count);
        for slice_range in balanced_ranges(n, slices) {
            let slice = &mut level[slice_range];
            slice.sort_by(|a, b| {
                self.arena[a.get()]
                    .bounds
                    .center_y()
                    .partial_cmp(&self.arena[b.get()].bounds.center_y())
                    .unwrap_or(Ordering::Equal)
            });
            let filled = slice.len();
            for chunk_range in balanced_ranges(filled, filled.div_ceil(self.max_entries)) {
                let entries: Vec<Entry<I>> = slice[chunk_range]
                    .iter()
                    .map(|ix| Entry::Child {
                        node: *ix,
                        bounds: self.arena[ix.get()].bounds,
                    })
                    .collect();
                let bounds = entries_bounds(&entries);
                next.push(self.alloc(Node {
                    height,
                    bounds,
                    entries,
                }));
            }
        }
        next
    }
}

impl<I: Copy + Ord + Debug> Debug for SpatialTree<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpatialTree")
            .field("max_entries", &self.max_entries)
            .field("min_entries", &self.min_entries)
            .field("len", &self.items.len())
            .field("arena_nodes", &self.arena.len())
            .field("free_nodes", &self.free.len())
            .finish_non_exhaustive()
    }
}

fn entries_bounds<I: Copy>(entries: &[Entry<I>]) -> Aabb {
    entries
        .iter()
        .fold(Aabb::EMPTY, |acc, e| acc.union(&e.bounds()))
}

/// R* split: the axis with the smaller total margin over all candidate
/// distributions wins; on that axis the split index minimizes overlap area
/// plus total area of the two groups.
fn split_entries<I: Copy>(entries: Vec<Entry<I>>, min_entries: usize) -> (Vec<Entry<I>>, Vec<Entry<I>>) {
    let mut by_x = entries.clone();
    by_x.sort_by(|a, b| {
        let (ab, bb) = (a.bounds(), b.bounds());
        (ab.min_x, ab.max_x)
            .partial_cmp(&(bb.min_x, bb.max_x))
            .unwrap_or(Ordering::Equal)
    });
    let mut by_y = entries;
    by_y.sort_by(|a, b| {
        let (ab, bb) = (a.bounds(), b.bounds());
        (ab.min_y, ab.max_y)
            .partial_cmp(&(bb.min_y, bb.max_y))
            .unwrap_or(Ordering::Equal)
    });

    let (margin_x, split_x) = split_candidates(&by_x, min_entries);
    let (margin_y, split_y) = split_candidates(&by_y, min_entries);
    let (mut chosen, at) = if margin_x <= margin_y {
        (by_x, split_x)
    } else {
        (by_y, split_y)
    };
    let right = chosen.split_off(at);
    (chosen, right)
}

/// Evaluate every legal split index on a pre-sorted entry list, using prefix
/// and suffix bounding boxes so each candidate costs O(1). Returns the total
/// margin (the axis-selection metric) and the best split index.
fn split_candidates<I: Copy>(sorted: &[Entry<I>], min_entries: usize) -> (f64, usize) {
    let n = sorted.len();
    debug_assert!(n >= 2 * min_entries, "split requires overflow");

    let mut prefix = Vec::with_capacity(n);
    let mut acc = Aabb::EMPTY;
    for entry in sorted {
        acc = acc.union(&entry.bounds());
        prefix.push(acc);
    }
    let mut suffix = vec![Aabb::EMPTY; n];
    let mut acc = Aabb::EMPTY;
    for i in (0..n).rev() {
        acc = acc.union(&sorted[i].bounds());
        suffix[i] = acc;
    }

    let mut margin_sum = 0.0;
    let mut best_at = min_entries;
    let mut best_cost = f64::INFINITY;
    for at in min_entries..=(n - min_entries) {
        let lb = prefix[at - 1];
        let rb = suffix[at];
        margin_sum += lb.margin() + rb.margin();
        let cost = overlap_area(&lb, &rb) + lb.area() + rb.area();
        if cost < best_cost {
            best_cost = cost;
            best_at = at;
        }
    }
    (margin_sum, best_at)
}

/// Smallest `k` with `k * k >= n`.
fn ceil_sqrt(n: usize) -> usize {
    let mut k = 1;
    while k * k < n {
        k += 1;
    }
    k
}

/// Split `0..len` into `pieces` consecutive ranges whose lengths differ by at
/// most one. Greedy fixed-size chunking would leave a runt tail below the
/// minimum fill; balancing keeps every packed node inside the fill bounds.
fn balanced_ranges(len: usize, pieces: usize) -> impl Iterator<Item = core::ops::Range<usize>> {
    debug_assert!(pieces > 0 && pieces <= len, "pieces must be in 1..=len");
    let base = len / pieces;
    let extra = len % pieces;
    let mut start = 0;
    (0..pieces).map(move |i| {
        let size = base + usize::from(i < extra);
        let range = start..start + size;
        start += size;
        range
    })
}
