// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared-edge and shared-center alignment group detection.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::float::abs;
use crate::spacing::DEFAULT_TOLERANCE;
use crate::types::{Anchor, Axis};

/// Minimum number of boxes before a shared anchor counts as a group.
pub const DEFAULT_MIN_GROUP_SIZE: usize = 3;

/// A set of boxes sharing an anchor coordinate within tolerance.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignmentGroup<I> {
    /// Flow direction of the group (a row shares y anchors).
    pub axis: Axis,
    /// Which anchor the members share.
    pub anchor: Anchor,
    /// The reference coordinate the members cluster around.
    pub position: f64,
    /// Ids of the member boxes, in input order.
    pub members: Vec<I>,
}

/// Detect alignment groups with the default tolerance and minimum size.
pub fn alignment_groups<I: Copy>(boxes: &[(I, Rect)]) -> Vec<AlignmentGroup<I>> {
    alignment_groups_with(boxes, DEFAULT_TOLERANCE, DEFAULT_MIN_GROUP_SIZE)
}

/// Detect alignment groups with explicit tolerance and minimum size.
///
/// For each axis and anchor, boxes whose anchor coordinate lies within
/// `tolerance` of a reference box's coordinate are grouped greedily, earliest
/// reference first. A box joins at most one group per `(axis, anchor)`
/// combination but may appear under several anchors (a box can share its top
/// with one neighbor set and its center with another).
pub fn alignment_groups_with<I: Copy>(
    boxes: &[(I, Rect)],
    tolerance: f64,
    min_group_size: usize,
) -> Vec<AlignmentGroup<I>> {
    let mut out = Vec::new();
    for axis in [Axis::Horizontal, Axis::Vertical] {
        for anchor in [Anchor::Start, Anchor::Center, Anchor::End] {
            collect_groups(boxes, axis, anchor, tolerance, min_group_size, &mut out);
        }
    }
    out
}

fn collect_groups<I: Copy>(
    boxes: &[(I, Rect)],
    axis: Axis,
    anchor: Anchor,
    tolerance: f64,
    min_group_size: usize,
    out: &mut Vec<AlignmentGroup<I>>,
) {
    let mut grouped = alloc::vec![false; boxes.len()];
    for i in 0..boxes.len() {
        if grouped[i] {
            continue;
        }
        let reference = axis.anchor_coord(&boxes[i].1, anchor);
        let members: Vec<usize> = (i..boxes.len())
            .filter(|&j| {
                !grouped[j] && abs(axis.anchor_coord(&boxes[j].1, anchor) - reference) <= tolerance
            })
            .collect();
        if members.len() < min_group_size {
            continue;
        }
        for &j in &members {
            grouped[j] = true;
        }
        out.push(AlignmentGroup {
            axis,
            anchor,
            position: reference,
            members: members.into_iter().map(|j| boxes[j].0).collect(),
        });
    }
}
