//! Dense user-item rating matrix
//!
//! Converts (user, item, rating) records into a dense `users x items` matrix
//! with a fill value for unobserved cells, plus stable identifier tables so
//! recommenders can work on positions and translate back to identifiers at
//! the output boundary.

use crate::config::RatingConfig;
use crate::error::{RecommendError, Result};
use crate::types::{EntityId, IndexedRating, RatingRecord};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Insertion-ordered identifier table
#[derive(Debug, Clone, Default)]
pub struct IdIndex {
    ids: Vec<EntityId>,
    positions: HashMap<EntityId, usize>,
}

impl IdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the position of `id`, assigning the next one on first sight
    pub fn insert(&mut self, id: &EntityId) -> usize {
        if let Some(&idx) = self.positions.get(id) {
            return idx;
        }
        let idx = self.ids.len();
        self.ids.push(id.clone());
        self.positions.insert(id.clone(), idx);
        idx
    }

    pub fn index_of(&self, id: &EntityId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn id_at(&self, idx: usize) -> Option<&EntityId> {
        self.ids.get(idx)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityId> {
        self.ids.iter()
    }
}

/// How repeated (user, item) pairs are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Merge repeats into their arithmetic mean
    #[default]
    Average,
    /// Fail on the first repeated pair
    Reject,
}

#[derive(Debug, Clone)]
pub struct RatingMatrixBuilder {
    fill_value: f64,
    duplicates: DuplicatePolicy,
    known_users: Vec<EntityId>,
    known_items: Vec<EntityId>,
}

impl Default for RatingMatrixBuilder {
    fn default() -> Self {
        Self {
            fill_value: 0.0,
            duplicates: DuplicatePolicy::Average,
            known_users: Vec::new(),
            known_items: Vec::new(),
        }
    }
}

impl RatingMatrixBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RatingConfig) -> Self {
        Self::new()
            .with_fill_value(config.fill_value)
            .with_duplicate_policy(config.duplicates)
    }

    pub fn with_fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = fill_value;
        self
    }

    pub fn with_duplicate_policy(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Register users ahead of the records, e.g. the full user table when
    /// building from a training split. They occupy the first rows.
    pub fn with_users(mut self, users: impl IntoIterator<Item = EntityId>) -> Self {
        self.known_users.extend(users);
        self
    }

    /// Register items ahead of the records. They occupy the first columns.
    pub fn with_items(mut self, items: impl IntoIterator<Item = EntityId>) -> Self {
        self.known_items.extend(items);
        self
    }

    /// Build the matrix. Row and column order follow registration, then
    /// first appearance in `records`.
    pub fn build(&self, records: &[RatingRecord]) -> Result<RatingMatrix> {
        if records.is_empty() {
            return Err(RecommendError::EmptyInput {
                what: "rating records",
            });
        }

        let mut users = IdIndex::new();
        let mut items = IdIndex::new();
        for id in &self.known_users {
            users.insert(id);
        }
        for id in &self.known_items {
            items.insert(id);
        }
        // (user_idx, item_idx) -> (sum, count)
        let mut cells: HashMap<(usize, usize), (f64, usize)> = HashMap::new();
        let mut merged_duplicates = 0;

        for record in records {
            if !record.rating.is_finite() {
                return Err(RecommendError::InvalidRating {
                    user: record.user_id.clone(),
                    item: record.item_id.clone(),
                    rating: record.rating,
                });
            }

            let user_idx = users.insert(&record.user_id);
            let item_idx = items.insert(&record.item_id);

            match cells.entry((user_idx, item_idx)) {
                Entry::Vacant(slot) => {
                    slot.insert((record.rating, 1));
                }
                Entry::Occupied(mut slot) => {
                    if self.duplicates == DuplicatePolicy::Reject {
                        return Err(RecommendError::DuplicateRating {
                            user: record.user_id.clone(),
                            item: record.item_id.clone(),
                        });
                    }
                    let (sum, count) = slot.get_mut();
                    *sum += record.rating;
                    *count += 1;
                    merged_duplicates += 1;
                }
            }
        }

        let shape = (users.len(), items.len());
        let mut values = Array2::from_elem(shape, self.fill_value);
        let mut ratings = Array2::<f64>::zeros(shape);
        let mut observed = Array2::from_elem(shape, false);

        for (&(u, i), &(sum, count)) in &cells {
            let rating = sum / count as f64;
            values[[u, i]] = rating;
            ratings[[u, i]] = rating;
            observed[[u, i]] = true;
        }

        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            users = shape.0,
            items = shape.1,
            observed = cells.len(),
            merged_duplicates,
            generation,
            "Built rating matrix"
        );

        Ok(RatingMatrix {
            values,
            ratings,
            observed,
            users,
            items,
            fill_value: self.fill_value,
            observed_count: cells.len(),
            merged_duplicates,
            generation,
        })
    }
}

/// Immutable dense rating matrix with identifier tables
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    /// Ratings with `fill_value` in unobserved cells
    values: Array2<f64>,
    /// Ratings with 0.0 in unobserved cells, independent of the fill value
    ratings: Array2<f64>,
    observed: Array2<bool>,
    users: IdIndex,
    items: IdIndex,
    fill_value: f64,
    observed_count: usize,
    merged_duplicates: usize,
    generation: u64,
}

impl RatingMatrix {
    pub fn build(records: &[RatingRecord]) -> Result<Self> {
        RatingMatrixBuilder::new().build(records)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Ratings where unobserved cells read as zero; the input to similarity math
    pub fn dense_ratings(&self) -> &Array2<f64> {
        &self.ratings
    }

    pub fn get(&self, user: usize, item: usize) -> f64 {
        self.values[[user, item]]
    }

    pub fn is_observed(&self, user: usize, item: usize) -> bool {
        self.observed[[user, item]]
    }

    /// Column positions the user has rated, in column order
    pub fn rated_items(&self, user: usize) -> Vec<usize> {
        self.observed
            .row(user)
            .iter()
            .enumerate()
            .filter(|(_, &seen)| seen)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Observed cells as positional triples, row-major
    pub fn observed_triples(&self) -> Vec<IndexedRating> {
        self.observed
            .indexed_iter()
            .filter(|(_, &seen)| seen)
            .map(|((user, item), _)| IndexedRating {
                user,
                item,
                rating: self.ratings[[user, item]],
            })
            .collect()
    }

    pub fn user_index(&self, user_id: &EntityId) -> Result<usize> {
        self.users
            .index_of(user_id)
            .ok_or_else(|| RecommendError::unknown_user(user_id))
    }

    pub fn item_index(&self, item_id: &EntityId) -> Result<usize> {
        self.items
            .index_of(item_id)
            .ok_or_else(|| RecommendError::unknown_item(item_id))
    }

    pub fn users(&self) -> &IdIndex {
        &self.users
    }

    pub fn items(&self) -> &IdIndex {
        &self.items
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn observed_count(&self) -> usize {
        self.observed_count
    }

    pub fn merged_duplicates(&self) -> usize {
        self.merged_duplicates
    }

    pub fn fill_value(&self) -> f64 {
        self.fill_value
    }

    /// Process-unique build number, used to detect stale derived artifacts
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
