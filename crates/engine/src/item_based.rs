//! Item-based collaborative filtering
//!
//! score(item) = sum over the user's rated items r of sim(item, r). A user
//! with a single rated item is the one-term case of the same sum.

use crate::error::{RecommendError, Result};
use crate::matrix::RatingMatrix;
use crate::scoring::{normalize, ranked_items, unrated_top};
use crate::similarity::{Axis, SimilarityMatrix};
use crate::types::{EntityId, RatingBounds, ScoredItem};
use ndarray::Array1;

pub struct ItemBasedRecommender<'a> {
    matrix: &'a RatingMatrix,
    similarity: &'a SimilarityMatrix,
    bounds: RatingBounds,
}

impl<'a> ItemBasedRecommender<'a> {
    /// `similarity` must be the item similarity of this exact matrix build
    pub fn new(
        matrix: &'a RatingMatrix,
        similarity: &'a SimilarityMatrix,
        bounds: RatingBounds,
    ) -> Result<Self> {
        if similarity.axis() != Axis::Items || !similarity.is_current_for(matrix) {
            return Err(RecommendError::InvalidConfig(
                "item-based recommender needs the item similarity of the current matrix"
                    .to_string(),
            ));
        }
        Ok(Self {
            matrix,
            similarity,
            bounds,
        })
    }

    /// Summed similarity to the user's rated items, before normalization
    pub fn raw_scores(&self, user_id: &EntityId) -> Result<Array1<f64>> {
        let user = self.matrix.user_index(user_id)?;
        self.summed_similarity(user, user_id)
    }

    fn summed_similarity(&self, user: usize, user_id: &EntityId) -> Result<Array1<f64>> {
        let rated = self.matrix.rated_items(user);
        if rated.is_empty() {
            return Err(RecommendError::InsufficientHistory {
                user: user_id.clone(),
            });
        }

        let mut scores = Array1::<f64>::zeros(self.matrix.item_count());
        for &item in &rated {
            // Symmetric, so row `item` is also column `item`.
            scores += &self.similarity.row(item);
        }
        Ok(scores)
    }

    /// Every item with its normalized score, best first
    pub fn recommend(&self, user_id: &EntityId) -> Result<Vec<ScoredItem>> {
        let user = self.matrix.user_index(user_id)?;
        let raw = self.summed_similarity(user, user_id)?;
        let normalized = normalize(raw.view(), self.bounds);

        if normalized.degenerate {
            tracing::debug!(user = %user_id, "No item-based signal, all items at midpoint");
        }

        Ok(ranked_items(self.matrix, user, normalized.scores.view()))
    }

    /// Top `limit` items the user has not rated yet
    pub fn recommend_unrated(&self, user_id: &EntityId, limit: usize) -> Result<Vec<ScoredItem>> {
        Ok(unrated_top(self.recommend(user_id)?, limit))
    }
}
