//! User-based collaborative filtering
//!
//! raw_score(item) = sum over other users u of sim(target, u) * rating(u, item),
//! i.e. the target's similarity row times the rating matrix, then min-max
//! normalized onto the rating scale.

use crate::error::{RecommendError, Result};
use crate::matrix::RatingMatrix;
use crate::scoring::{normalize, ranked_items, unrated_top};
use crate::similarity::{Axis, SimilarityMatrix};
use crate::types::{EntityId, RatingBounds, ScoredItem};
use ndarray::Array1;

pub struct UserBasedRecommender<'a> {
    matrix: &'a RatingMatrix,
    similarity: &'a SimilarityMatrix,
    bounds: RatingBounds,
}

impl<'a> UserBasedRecommender<'a> {
    /// `similarity` must be the user similarity of this exact matrix build
    pub fn new(
        matrix: &'a RatingMatrix,
        similarity: &'a SimilarityMatrix,
        bounds: RatingBounds,
    ) -> Result<Self> {
        if similarity.axis() != Axis::Users || !similarity.is_current_for(matrix) {
            return Err(RecommendError::InvalidConfig(
                "user-based recommender needs the user similarity of the current matrix"
                    .to_string(),
            ));
        }
        Ok(Self {
            matrix,
            similarity,
            bounds,
        })
    }

    /// Similarity-weighted rating sums for every item, before normalization
    pub fn raw_scores(&self, user: usize) -> Array1<f64> {
        // The diagonal is zero, so the target's own ratings never contribute.
        self.similarity.row(user).dot(self.matrix.dense_ratings())
    }

    /// Every item with its normalized score, best first
    pub fn recommend(&self, user_id: &EntityId) -> Result<Vec<ScoredItem>> {
        let user = self.matrix.user_index(user_id)?;
        let raw = self.raw_scores(user);
        let normalized = normalize(raw.view(), self.bounds);

        if normalized.degenerate {
            tracing::debug!(user = %user_id, "No user-based signal, all items at midpoint");
        }

        Ok(ranked_items(self.matrix, user, normalized.scores.view()))
    }

    /// Top `limit` items the user has not rated yet
    pub fn recommend_unrated(&self, user_id: &EntityId, limit: usize) -> Result<Vec<ScoredItem>> {
        Ok(unrated_top(self.recommend(user_id)?, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RatingRecord;

    fn sample_matrix() -> RatingMatrix {
        RatingMatrix::build(&[
            RatingRecord::new("u1", "A", 5.0),
            RatingRecord::new("u1", "B", 3.0),
            RatingRecord::new("u2", "A", 4.0),
            RatingRecord::new("u2", "C", 5.0),
            RatingRecord::new("u3", "B", 4.0),
            RatingRecord::new("u3", "C", 2.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_raw_scores_are_weighted_sums() {
        let matrix = sample_matrix();
        let sim = SimilarityMatrix::compute(&matrix, Axis::Users);
        let rec = UserBasedRecommender::new(&matrix, &sim, RatingBounds::default()).unwrap();

        let raw = rec.raw_scores(0);
        let s12 = sim.get(0, 1);
        let s13 = sim.get(0, 2);
        assert!((raw[0] - s12 * 4.0).abs() < 1e-12);
        assert!((raw[1] - s13 * 4.0).abs() < 1e-12);
        assert!((raw[2] - (s12 * 5.0 + s13 * 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_recommend_ranks_and_flags() {
        let matrix = sample_matrix();
        let sim = SimilarityMatrix::compute(&matrix, Axis::Users);
        let rec = UserBasedRecommender::new(&matrix, &sim, RatingBounds::new(1.0, 10.0)).unwrap();

        let result = rec.recommend(&"u1".into()).unwrap();
        let order: Vec<String> = result.iter().map(|i| i.item_id.to_string()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
        assert_eq!(result[0].score, 10.0);
        assert_eq!(result[2].score, 1.0);
        assert!(!result[0].already_rated);
        assert!(result[1].already_rated);

        let novel = rec.recommend_unrated(&"u1".into(), 5).unwrap();
        assert_eq!(novel.len(), 1);
        assert_eq!(novel[0].item_id, EntityId::from("C"));
    }

    #[test]
    fn test_unknown_user() {
        let matrix = sample_matrix();
        let sim = SimilarityMatrix::compute(&matrix, Axis::Users);
        let rec = UserBasedRecommender::new(&matrix, &sim, RatingBounds::default()).unwrap();

        assert!(matches!(
            rec.recommend(&"ghost".into()),
            Err(RecommendError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn test_isolated_user_gets_midpoint() {
        // u2 shares no items with u1, so every similarity is zero.
        let matrix = RatingMatrix::build(&[
            RatingRecord::new("u1", "A", 5.0),
            RatingRecord::new("u2", "B", 4.0),
        ])
        .unwrap();
        let sim = SimilarityMatrix::compute(&matrix, Axis::Users);
        let rec = UserBasedRecommender::new(&matrix, &sim, RatingBounds::new(1.0, 10.0)).unwrap();

        let result = rec.recommend(&"u1".into()).unwrap();
        assert_eq!(result.len(), 2);
        for item in &result {
            assert_eq!(item.score, 5.5);
        }
        // Ties keep column order.
        assert_eq!(result[0].item_id, EntityId::from("A"));
    }

    #[test]
    fn test_rejects_item_similarity() {
        let matrix = sample_matrix();
        let sim = SimilarityMatrix::compute(&matrix, Axis::Items);
        assert!(UserBasedRecommender::new(&matrix, &sim, RatingBounds::default()).is_err());
    }
}
