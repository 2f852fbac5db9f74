//! Deterministic train/test partitioning

use crate::error::{RecommendError, Result};
use crate::types::{EntityId, RatingRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Records partitioned into a training and a held-out set
#[derive(Debug, Clone, Default)]
pub struct RatingSplit {
    pub train: Vec<RatingRecord>,
    pub test: Vec<RatingRecord>,
}

impl RatingSplit {
    /// Held-out records of a single user
    pub fn for_user(&self, user_id: &EntityId) -> Vec<RatingRecord> {
        self.test
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect()
    }
}

/// Shuffle `0..n` with `seed` and hold out `round(n * ratio)` positions.
///
/// Both returned lists are sorted ascending so callers keep input order.
pub fn holdout_indices(n: usize, ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let held = ((n as f64) * ratio).round().clamp(0.0, n as f64) as usize;
    let mut test = order.split_off(n - held);
    order.sort_unstable();
    test.sort_unstable();
    (order, test)
}

/// Split records into train and test sets with a seeded shuffle
pub fn train_test_split(records: &[RatingRecord], test_ratio: f64, seed: u64) -> Result<RatingSplit> {
    if !(0.0..1.0).contains(&test_ratio) {
        return Err(RecommendError::InvalidConfig(format!(
            "test ratio must be in [0, 1), got {}",
            test_ratio
        )));
    }

    let (train_idx, test_idx) = holdout_indices(records.len(), test_ratio, seed);

    tracing::debug!(
        train = train_idx.len(),
        test = test_idx.len(),
        seed,
        "Split rating records"
    );

    Ok(RatingSplit {
        train: train_idx.iter().map(|&i| records[i].clone()).collect(),
        test: test_idx.iter().map(|&i| records[i].clone()).collect(),
    })
}
