// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The merged suggestion feed a layout panel consumes.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::groups::{AlignmentGroup, alignment_groups};
use crate::spacing::{DistributionSuggestion, analyze_spacing};

/// What a [`Suggestion`] proposes to do.
#[derive(Clone, Debug, PartialEq)]
pub enum SuggestionKind<I> {
    /// Distribute along an axis at an observed spacing.
    Distribute(DistributionSuggestion),
    /// Align a group of boxes on their shared anchor.
    Align(AlignmentGroup<I>),
}

/// One ranked entry of the suggestion feed.
#[derive(Clone, Debug, PartialEq)]
pub struct Suggestion<I> {
    /// Ranking score: `confidence × count` for spacing patterns, the group
    /// size for alignment groups. Higher is offered first; ties break
    /// arbitrarily.
    pub score: f64,
    /// The proposed action.
    pub kind: SuggestionKind<I>,
}

/// Analyze `boxes` and return distribution and alignment suggestions merged
/// into one list, best first.
pub fn suggest<I: Copy>(boxes: &[(I, Rect)]) -> Vec<Suggestion<I>> {
    let analysis = analyze_spacing(boxes);
    let mut out: Vec<Suggestion<I>> = analysis
        .suggestions
        .into_iter()
        .map(|d| Suggestion {
            score: d.score,
            kind: SuggestionKind::Distribute(d),
        })
        .collect();
    for group in alignment_groups(boxes) {
        out.push(Suggestion {
            score: group.members.len() as f64,
            kind: SuggestionKind::Align(group),
        });
    }
    out.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(core::cmp::Ordering::Equal)
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Axis;

    #[test]
    fn feed_mixes_both_kinds_in_score_order() {
        // A row of four with equal gaps: one spacing pattern (score 3) plus
        // shared top/bottom edge groups of four (score 4).
        let boxes: Vec<(u32, Rect)> = (0..4)
            .map(|i| {
                let x = f64::from(i) * 70.0;
                (i, Rect::new(x, 0.0, x + 50.0, 50.0))
            })
            .collect();
        let feed = suggest(&boxes);
        assert!(feed.len() >= 2);
        for pair in feed.windows(2) {
            assert!(pair[0].score >= pair[1].score, "feed must be descending");
        }
        assert!(
            matches!(&feed[0].kind, SuggestionKind::Align(g) if g.members.len() == 4),
            "the 4-box alignment group outranks the 3-gap pattern"
        );
        assert!(
            feed.iter().any(|s| matches!(
                &s.kind,
                SuggestionKind::Distribute(d) if d.axis == Axis::Horizontal && d.count == 3
            )),
            "the spacing pattern still appears in the feed"
        );
    }

    #[test]
    fn empty_input_is_an_empty_feed() {
        assert!(suggest::<u32>(&[]).is_empty());
    }
}
