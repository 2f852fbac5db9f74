//! Score normalization and ranking shared by the similarity recommenders

use crate::matrix::RatingMatrix;
use crate::types::{RatingBounds, ScoredItem};
use ndarray::{Array1, ArrayView1};
use std::cmp::Ordering;

/// Raw scores rescaled onto a rating scale
#[derive(Debug, Clone)]
pub struct NormalizedScores {
    pub scores: Array1<f64>,
    /// All raw scores were equal; every item got the midpoint of the scale
    pub degenerate: bool,
}

/// Min-max normalize `raw` into `bounds`
///
/// When every raw score is the same the range is undefined and each item
/// receives `bounds.midpoint()` instead.
pub fn normalize(raw: ArrayView1<f64>, bounds: RatingBounds) -> NormalizedScores {
    if raw.is_empty() {
        return NormalizedScores {
            scores: Array1::zeros(0),
            degenerate: false,
        };
    }

    let (min, max) = raw
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    let range = max - min;

    if !range.is_finite() || range <= 0.0 {
        tracing::warn!(
            raw_score = min,
            fallback = bounds.midpoint(),
            "Degenerate score range, using midpoint"
        );
        return NormalizedScores {
            scores: Array1::from_elem(raw.len(), bounds.midpoint()),
            degenerate: true,
        };
    }

    let scores = raw.mapv(|x| bounds.clamp(bounds.min + (x - min) / range * bounds.span()));

    NormalizedScores {
        scores,
        degenerate: false,
    }
}

/// Stable sort by descending score; ties keep their incoming order
pub fn rank(items: &mut [ScoredItem]) {
    items.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// Attach item identifiers and the user's rated flags to per-column scores,
/// then rank
pub(crate) fn ranked_items(
    matrix: &RatingMatrix,
    user: usize,
    scores: ArrayView1<f64>,
) -> Vec<ScoredItem> {
    let mut items: Vec<ScoredItem> = matrix
        .items()
        .iter()
        .zip(scores.iter())
        .enumerate()
        .map(|(col, (item_id, &score))| ScoredItem {
            item_id: item_id.clone(),
            score,
            already_rated: matrix.is_observed(user, col),
        })
        .collect();
    rank(&mut items);
    items
}

/// Unrated items only, best first, at most `limit`
pub(crate) fn unrated_top(items: Vec<ScoredItem>, limit: usize) -> Vec<ScoredItem> {
    items
        .into_iter()
        .filter(|item| !item.already_rated)
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityId;
    use ndarray::array;

    #[test]
    fn test_normalize_spans_bounds() {
        let raw = array![2.0, 4.0, 3.0];
        let result = normalize(raw.view(), RatingBounds::new(1.0, 10.0));

        assert!(!result.degenerate);
        assert_eq!(result.scores[0], 1.0);
        assert_eq!(result.scores[1], 10.0);
        assert!((result.scores[2] - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_degenerate_uses_midpoint() {
        let raw = array![0.7, 0.7, 0.7];
        let result = normalize(raw.view(), RatingBounds::new(1.0, 10.0));

        assert!(result.degenerate);
        for score in result.scores.iter() {
            assert_eq!(*score, 5.5);
        }
    }

    #[test]
    fn test_normalize_single_item_is_degenerate() {
        let raw = array![3.2];
        let result = normalize(raw.view(), RatingBounds::new(0.0, 10.0));
        assert!(result.degenerate);
        assert_eq!(result.scores[0], 5.0);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let mut items = vec![
            ScoredItem {
                item_id: EntityId::from("A"),
                score: 1.0,
                already_rated: false,
            },
            ScoredItem {
                item_id: EntityId::from("B"),
                score: 9.0,
                already_rated: false,
            },
            ScoredItem {
                item_id: EntityId::from("C"),
                score: 1.0,
                already_rated: true,
            },
        ];
        rank(&mut items);

        let order: Vec<String> = items.iter().map(|i| i.item_id.to_string()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_unrated_top_filters_and_limits() {
        let items = vec![
            ScoredItem {
                item_id: EntityId::from("A"),
                score: 9.0,
                already_rated: true,
            },
            ScoredItem {
                item_id: EntityId::from("B"),
                score: 7.0,
                already_rated: false,
            },
            ScoredItem {
                item_id: EntityId::from("C"),
                score: 2.0,
                already_rated: false,
            },
        ];
        let top = unrated_top(items, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].item_id, EntityId::from("B"));
    }
}
