//! Ensemble combiner
//!
//! Inner-joins the user-based, item-based and latent-factor results on item
//! identifier and averages the three scores. An item missing from any source
//! is dropped, never imputed, so the ensemble only covers items all three
//! models scored.

use crate::types::{EntityId, ScoredItem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One joined item with its component scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleRow {
    pub item_id: EntityId,
    pub user_cf: f64,
    pub item_cf: f64,
    pub factorization: f64,
    /// round(mean of the three component scores)
    pub score: f64,
}

impl EnsembleRow {
    pub fn new(item_id: EntityId, user_cf: f64, item_cf: f64, factorization: f64) -> Self {
        let score = ((user_cf + item_cf + factorization) / 3.0).round();
        Self {
            item_id,
            user_cf,
            item_cf,
            factorization,
            score,
        }
    }
}

/// Item to score, first occurrence wins
pub(crate) fn score_lookup(items: &[ScoredItem]) -> HashMap<&EntityId, f64> {
    let mut lookup = HashMap::with_capacity(items.len());
    for item in items {
        lookup.entry(&item.item_id).or_insert(item.score);
    }
    lookup
}

/// Join three result sets for the same user
///
/// Rows follow the order of `user_cf`.
pub fn combine(
    user_cf: &[ScoredItem],
    item_cf: &[ScoredItem],
    factorization: &[ScoredItem],
) -> Vec<EnsembleRow> {
    let item_scores = score_lookup(item_cf);
    let factor_scores = score_lookup(factorization);

    let mut rows = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for item in user_cf {
        if !seen.insert(&item.item_id) {
            continue;
        }
        if let (Some(&ic), Some(&mf)) = (
            item_scores.get(&item.item_id),
            factor_scores.get(&item.item_id),
        ) {
            rows.push(EnsembleRow::new(item.item_id.clone(), item.score, ic, mf));
        }
    }

    tracing::debug!(
        joined = rows.len(),
        dropped = seen.len() - rows.len(),
        "Combined recommender outputs"
    );

    rows
}
