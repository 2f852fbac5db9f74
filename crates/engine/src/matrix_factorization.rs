//! Latent-factor model: non-negative matrix factorization by projected SGD
//!
//! Factorizes the observed entries of the rating matrix into user factors
//! `[num_users x rank]` and item factors `[num_items x rank]`. Only observed
//! ratings enter the objective; unobserved cells are never treated as zeros.
//! Rank, learning rate and the two L2 penalties are picked by a grid search
//! scored on a held-out slice of the training triples.

use crate::error::{RecommendError, Result};
use crate::split::holdout_indices;
use crate::types::{EntityId, IndexedRating, RatingBounds};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One point of the hyperparameter grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorizationParams {
    /// Number of latent factors
    pub rank: usize,
    /// SGD step size
    pub learning_rate: f64,
    /// L2 penalty on user factors
    pub user_l2: f64,
    /// L2 penalty on item factors
    pub item_l2: f64,
}

/// Hyperparameter grid and training budget
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchGrid {
    pub ranks: Vec<usize>,
    pub learning_rates: Vec<f64>,
    pub user_l2: Vec<f64>,
    pub item_l2: Vec<f64>,
    /// Epochs per candidate during the search
    pub search_iterations: usize,
    /// Epochs for the final model
    pub final_iterations: usize,
    /// Worker threads for the search; affects speed only
    pub threads: usize,
    /// Share of training triples held out to score candidates
    pub validation_ratio: f64,
    pub seed: u64,
}

impl Default for SearchGrid {
    fn default() -> Self {
        Self {
            ranks: vec![4, 8],
            learning_rates: vec![0.01, 0.05],
            user_l2: vec![0.01, 0.1],
            item_l2: vec![0.01, 0.1],
            search_iterations: 30,
            final_iterations: 100,
            threads: 4,
            validation_ratio: 0.2,
            seed: 42,
        }
    }
}

impl SearchGrid {
    /// Grid with a single combination; the search is trivial
    pub fn fixed(params: FactorizationParams, iterations: usize) -> Self {
        Self {
            ranks: vec![params.rank],
            learning_rates: vec![params.learning_rate],
            user_l2: vec![params.user_l2],
            item_l2: vec![params.item_l2],
            search_iterations: iterations,
            final_iterations: iterations,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(RecommendError::InvalidConfig(msg.to_string()));

        if self.ranks.is_empty()
            || self.learning_rates.is_empty()
            || self.user_l2.is_empty()
            || self.item_l2.is_empty()
        {
            return invalid("every hyperparameter axis needs at least one value");
        }
        if self.ranks.contains(&0) {
            return invalid("rank must be greater than 0");
        }
        if self.learning_rates.iter().any(|lr| !lr.is_finite() || *lr <= 0.0) {
            return invalid("learning rates must be positive");
        }
        if self
            .user_l2
            .iter()
            .chain(self.item_l2.iter())
            .any(|l2| !l2.is_finite() || *l2 < 0.0)
        {
            return invalid("L2 penalties must be non-negative");
        }
        if self.search_iterations == 0 || self.final_iterations == 0 {
            return invalid("iteration counts must be greater than 0");
        }
        if self.threads == 0 {
            return invalid("threads must be greater than 0");
        }
        if !(self.validation_ratio > 0.0 && self.validation_ratio < 1.0) {
            return invalid("validation_ratio must be in (0, 1)");
        }
        Ok(())
    }

    /// Cartesian product in rank, learning rate, user L2, item L2 order
    pub fn candidates(&self) -> Vec<FactorizationParams> {
        let mut out = Vec::with_capacity(
            self.ranks.len() * self.learning_rates.len() * self.user_l2.len() * self.item_l2.len(),
        );
        for &rank in &self.ranks {
            for &learning_rate in &self.learning_rates {
                for &user_l2 in &self.user_l2 {
                    for &item_l2 in &self.item_l2 {
                        out.push(FactorizationParams {
                            rank,
                            learning_rate,
                            user_l2,
                            item_l2,
                        });
                    }
                }
            }
        }
        out
    }
}

/// Trained factor matrices
#[derive(Debug, Clone)]
pub struct LatentFactors {
    /// User latent factors: [num_users x rank]
    pub user_factors: Array2<f64>,
    /// Item latent factors: [num_items x rank]
    pub item_factors: Array2<f64>,
}

impl LatentFactors {
    pub fn predict(&self, user: usize, item: usize) -> f64 {
        self.user_factors
            .row(user)
            .dot(&self.item_factors.row(item))
    }

    /// Root mean squared error over `triples`, 0.0 when empty
    pub fn rmse(&self, triples: &[IndexedRating]) -> f64 {
        observed_rmse(&self.user_factors, &self.item_factors, triples)
    }

    pub fn is_finite(&self) -> bool {
        self.user_factors.iter().all(|v| v.is_finite())
            && self.item_factors.iter().all(|v| v.is_finite())
    }
}

fn observed_rmse(users: &Array2<f64>, items: &Array2<f64>, triples: &[IndexedRating]) -> f64 {
    if triples.is_empty() {
        return 0.0;
    }
    let sse: f64 = triples
        .iter()
        .map(|t| (t.rating - users.row(t.user).dot(&items.row(t.item))).powi(2))
        .sum();
    (sse / triples.len() as f64).sqrt()
}

/// Largest tolerated prediction error, as a multiple of the largest rating
const DIVERGENCE_FACTOR: f64 = 10.0;

/// Fit factors to the observed `triples` with projected SGD
///
/// `shape` is `(num_users, num_items)`. Factors start uniform in
/// `[0, 1/sqrt(rank))`, every epoch visits the triples in a fresh seeded
/// order, and each update is projected back onto `x >= 0`.
///
/// The projection maps NaN and large negative overshoots to zero, so a
/// blown-up step would otherwise leave a silent all-zero model. Training
/// fails with [`RecommendError::Diverged`] as soon as a prediction error is
/// non-finite or exceeds `DIVERGENCE_FACTOR` times the largest rating.
pub fn train_factors(
    triples: &[IndexedRating],
    shape: (usize, usize),
    params: &FactorizationParams,
    iterations: usize,
    seed: u64,
) -> Result<LatentFactors> {
    let k = params.rank;
    let lr = params.learning_rate;
    let mut rng = StdRng::seed_from_u64(seed);

    let diverged = || RecommendError::Diverged {
        rank: params.rank,
        learning_rate: params.learning_rate,
    };
    let max_rating = triples
        .iter()
        .fold(1.0f64, |acc, t| acc.max(t.rating.abs()));
    let error_limit = DIVERGENCE_FACTOR * max_rating;

    let scale = (1.0 / k as f64).sqrt();
    let mut user_factors = Array2::from_shape_fn((shape.0, k), |_| rng.gen::<f64>() * scale);
    let mut item_factors = Array2::from_shape_fn((shape.1, k), |_| rng.gen::<f64>() * scale);

    let mut order: Vec<usize> = (0..triples.len()).collect();

    for epoch in 0..iterations {
        order.shuffle(&mut rng);

        for &idx in &order {
            let t = triples[idx];
            let err = t.rating - user_factors.row(t.user).dot(&item_factors.row(t.item));
            if !err.is_finite() || err.abs() > error_limit {
                tracing::debug!(epoch, err, rank = k, learning_rate = lr, "SGD diverged");
                return Err(diverged());
            }

            for f in 0..k {
                let p = user_factors[[t.user, f]];
                let q = item_factors[[t.item, f]];
                let next_p = p + lr * (err * q - params.user_l2 * p);
                let next_q = q + lr * (err * p - params.item_l2 * q);
                if !next_p.is_finite() || !next_q.is_finite() {
                    return Err(diverged());
                }
                user_factors[[t.user, f]] = next_p.max(0.0);
                item_factors[[t.item, f]] = next_q.max(0.0);
            }
        }

        if epoch % 10 == 0 {
            tracing::trace!(
                epoch,
                rank = k,
                rmse = observed_rmse(&user_factors, &item_factors, triples),
                "SGD epoch"
            );
        }
    }

    Ok(LatentFactors {
        user_factors,
        item_factors,
    })
}

/// Validation score of one grid point
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CandidateScore {
    pub params: FactorizationParams,
    pub validation_rmse: f64,
}

/// Outcome of the hyperparameter search
#[derive(Debug, Clone, Serialize)]
pub struct TuningReport {
    /// Every evaluated candidate, in grid order
    pub candidates: Vec<CandidateScore>,
    pub best: FactorizationParams,
    /// False when the data was too small to hold out a validation set
    pub searched: bool,
}

/// Lifecycle of the trainer; predictions are only served when `Trained`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerPhase {
    Untrained,
    Tuning,
    Trained,
}

impl fmt::Display for TrainerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainerPhase::Untrained => f.write_str("untrained"),
            TrainerPhase::Tuning => f.write_str("tuning"),
            TrainerPhase::Trained => f.write_str("trained"),
        }
    }
}

enum TrainerState {
    Untrained,
    Tuning,
    Trained {
        factors: LatentFactors,
        report: TuningReport,
    },
}

/// Grid-searched latent-factor trainer and predictor
pub struct MatrixFactorization {
    grid: SearchGrid,
    state: TrainerState,
}

impl MatrixFactorization {
    pub fn new(grid: SearchGrid) -> Self {
        Self {
            grid,
            state: TrainerState::Untrained,
        }
    }

    pub fn grid(&self) -> &SearchGrid {
        &self.grid
    }

    pub fn phase(&self) -> TrainerPhase {
        match self.state {
            TrainerState::Untrained => TrainerPhase::Untrained,
            TrainerState::Tuning => TrainerPhase::Tuning,
            TrainerState::Trained { .. } => TrainerPhase::Trained,
        }
    }

    /// Search the grid, then train the final model on all `triples`
    ///
    /// `triples` use zero-based contiguous indices within `shape`
    /// (`(num_users, num_items)`). On failure the trainer returns to
    /// `Untrained`.
    pub fn fit(&mut self, triples: &[IndexedRating], shape: (usize, usize)) -> Result<TuningReport> {
        self.grid.validate()?;
        if triples.is_empty() {
            return Err(RecommendError::EmptyInput {
                what: "training triples",
            });
        }
        if let Some(t) = triples
            .iter()
            .find(|t| t.user >= shape.0 || t.item >= shape.1)
        {
            return Err(RecommendError::InvalidConfig(format!(
                "triple ({}, {}) outside a {}x{} matrix",
                t.user, t.item, shape.0, shape.1
            )));
        }

        self.state = TrainerState::Tuning;

        match self.search(triples, shape).and_then(|report| {
            let factors = self.train_final(triples, shape, &report.best)?;
            Ok((factors, report))
        }) {
            Ok((factors, report)) => {
                tracing::info!(
                    rank = report.best.rank,
                    learning_rate = report.best.learning_rate,
                    user_l2 = report.best.user_l2,
                    item_l2 = report.best.item_l2,
                    train_rmse = factors.rmse(triples),
                    "Trained latent-factor model"
                );
                self.state = TrainerState::Trained {
                    factors,
                    report: report.clone(),
                };
                Ok(report)
            }
            Err(e) => {
                self.state = TrainerState::Untrained;
                Err(e)
            }
        }
    }

    fn search(&self, triples: &[IndexedRating], shape: (usize, usize)) -> Result<TuningReport> {
        let candidates = self.grid.candidates();
        let (train_idx, valid_idx) =
            holdout_indices(triples.len(), self.grid.validation_ratio, self.grid.seed);

        if train_idx.is_empty() || valid_idx.is_empty() {
            tracing::warn!(
                triples = triples.len(),
                "Too few ratings to hold out a validation set, using first grid point"
            );
            return Ok(TuningReport {
                candidates: Vec::new(),
                best: candidates[0],
                searched: false,
            });
        }

        let train: Vec<IndexedRating> = train_idx.iter().map(|&i| triples[i]).collect();
        let valid: Vec<IndexedRating> = valid_idx.iter().map(|&i| triples[i]).collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.grid.threads)
            .build()?;

        let iterations = self.grid.search_iterations;
        let seed = self.grid.seed;
        let scores: Vec<CandidateScore> = pool.install(|| {
            candidates
                .par_iter()
                .map(|params| {
                    let validation_rmse = match train_factors(&train, shape, params, iterations, seed) {
                        Ok(factors) => {
                            let rmse = factors.rmse(&valid);
                            if rmse.is_finite() {
                                rmse
                            } else {
                                f64::INFINITY
                            }
                        }
                        Err(_) => f64::INFINITY,
                    };
                    tracing::debug!(
                        rank = params.rank,
                        learning_rate = params.learning_rate,
                        user_l2 = params.user_l2,
                        item_l2 = params.item_l2,
                        validation_rmse,
                        "Evaluated candidate"
                    );
                    CandidateScore {
                        params: *params,
                        validation_rmse,
                    }
                })
                .collect()
        });

        // Strict comparison keeps the earliest grid point on ties.
        let mut best = scores[0];
        for score in &scores[1..] {
            if score.validation_rmse < best.validation_rmse {
                best = *score;
            }
        }

        Ok(TuningReport {
            best: best.params,
            candidates: scores,
            searched: true,
        })
    }

    fn train_final(
        &self,
        triples: &[IndexedRating],
        shape: (usize, usize),
        params: &FactorizationParams,
    ) -> Result<LatentFactors> {
        let factors = train_factors(
            triples,
            shape,
            params,
            self.grid.final_iterations,
            self.grid.seed,
        )?;
        if !factors.is_finite() {
            return Err(RecommendError::Diverged {
                rank: params.rank,
                learning_rate: params.learning_rate,
            });
        }
        Ok(factors)
    }

    pub fn factors(&self) -> Result<&LatentFactors> {
        match &self.state {
            TrainerState::Trained { factors, .. } => Ok(factors),
            _ => Err(RecommendError::InvalidTrainerState {
                phase: self.phase(),
            }),
        }
    }

    pub fn tuning_report(&self) -> Option<&TuningReport> {
        match &self.state {
            TrainerState::Trained { report, .. } => Some(report),
            _ => None,
        }
    }

    /// Dot product of the user's and item's factor rows
    pub fn predict(&self, user: usize, item: usize) -> Result<f64> {
        let factors = self.factors()?;
        if user >= factors.user_factors.nrows() {
            return Err(RecommendError::unknown_user(EntityId::Int(user as i64)));
        }
        if item >= factors.item_factors.nrows() {
            return Err(RecommendError::unknown_item(EntityId::Int(item as i64)));
        }
        Ok(factors.predict(user, item))
    }

    /// Prediction clipped onto the rating scale
    pub fn predict_clipped(&self, user: usize, item: usize, bounds: RatingBounds) -> Result<f64> {
        Ok(bounds.clamp(self.predict(user, item)?))
    }

    /// Drop the trained model, e.g. after the rating matrix changed
    pub fn reset(&mut self) {
        self.state = TrainerState::Untrained;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fully observed 4x4 matrix generated by non-negative rank-1 factors
    fn rank_one_triples() -> Vec<IndexedRating> {
        let users = [1.0, 2.0, 3.0, 4.0];
        let items = [1.0, 2.0, 1.0, 2.0];
        let mut triples = Vec::new();
        for (u, pu) in users.iter().enumerate() {
            for (i, qi) in items.iter().enumerate() {
                triples.push(IndexedRating {
                    user: u,
                    item: i,
                    rating: pu * qi,
                });
            }
        }
        triples
    }

    fn params() -> FactorizationParams {
        FactorizationParams {
            rank: 2,
            learning_rate: 0.01,
            user_l2: 0.0,
            item_l2: 0.0,
        }
    }

    #[test]
    fn test_predict_before_training_fails() {
        let mf = MatrixFactorization::new(SearchGrid::default());
        assert_eq!(mf.phase(), TrainerPhase::Untrained);

        match mf.predict(0, 0) {
            Err(RecommendError::InvalidTrainerState { phase }) => {
                assert_eq!(phase, TrainerPhase::Untrained)
            }
            other => panic!("expected InvalidTrainerState, got {other:?}"),
        }
        assert!(mf.tuning_report().is_none());
    }

    #[test]
    fn test_train_factors_fits_low_rank_data() {
        let triples = rank_one_triples();
        let untrained = train_factors(&triples, (4, 4), &params(), 0, 7).unwrap();
        let trained = train_factors(&triples, (4, 4), &params(), 1000, 7).unwrap();

        assert!(trained.rmse(&triples) < 0.5);
        assert!(trained.rmse(&triples) < untrained.rmse(&triples) / 4.0);
    }

    #[test]
    fn test_factors_are_non_negative() {
        let triples = rank_one_triples();
        let factors = train_factors(&triples, (4, 4), &params(), 200, 3).unwrap();

        assert!(factors.user_factors.iter().all(|&v| v >= 0.0));
        assert!(factors.item_factors.iter().all(|&v| v >= 0.0));
        assert_eq!(factors.user_factors.dim(), (4, 2));
        assert_eq!(factors.item_factors.dim(), (4, 2));
    }

    #[test]
    fn test_training_is_deterministic() {
        let triples = rank_one_triples();
        let a = train_factors(&triples, (4, 4), &params(), 50, 11).unwrap();
        let b = train_factors(&triples, (4, 4), &params(), 50, 11).unwrap();
        assert_eq!(a.user_factors, b.user_factors);
        assert_eq!(a.item_factors, b.item_factors);
    }

    #[test]
    fn test_only_observed_entries_are_fitted() {
        // User 1 never rated item 1; its factor row must not be pulled to zero.
        let triples = vec![
            IndexedRating { user: 0, item: 0, rating: 4.0 },
            IndexedRating { user: 0, item: 1, rating: 4.0 },
            IndexedRating { user: 1, item: 0, rating: 4.0 },
        ];
        let rank_one = FactorizationParams {
            rank: 1,
            ..params()
        };
        let factors = train_factors(&triples, (2, 2), &rank_one, 2000, 5).unwrap();
        assert!(factors.predict(1, 1) > 2.0);
    }

    #[test]
    fn test_fit_with_search() {
        let grid = SearchGrid {
            ranks: vec![1, 2],
            learning_rates: vec![0.01],
            user_l2: vec![0.0, 0.01],
            item_l2: vec![0.0],
            search_iterations: 50,
            final_iterations: 200,
            threads: 2,
            validation_ratio: 0.25,
            seed: 9,
        };
        let mut mf = MatrixFactorization::new(grid);
        let report = mf.fit(&rank_one_triples(), (4, 4)).unwrap();

        assert!(report.searched);
        assert_eq!(report.candidates.len(), 4);
        assert!(report
            .candidates
            .iter()
            .any(|c| c.params == report.best));
        let best_rmse = report
            .candidates
            .iter()
            .find(|c| c.params == report.best)
            .map(|c| c.validation_rmse)
            .unwrap();
        assert!(report
            .candidates
            .iter()
            .all(|c| c.validation_rmse >= best_rmse));

        assert_eq!(mf.phase(), TrainerPhase::Trained);
        assert!(mf.predict(3, 3).unwrap().is_finite());
        let clipped = mf
            .predict_clipped(3, 1, RatingBounds::new(1.0, 5.0))
            .unwrap();
        assert!((1.0..=5.0).contains(&clipped));
    }

    #[test]
    fn test_search_is_thread_count_independent() {
        let base = SearchGrid {
            ranks: vec![1, 2],
            learning_rates: vec![0.01, 0.02],
            user_l2: vec![0.01],
            item_l2: vec![0.01],
            search_iterations: 20,
            final_iterations: 40,
            threads: 1,
            validation_ratio: 0.25,
            seed: 4,
        };
        let mut single = MatrixFactorization::new(base.clone());
        let mut multi = MatrixFactorization::new(SearchGrid { threads: 4, ..base });

        let a = single.fit(&rank_one_triples(), (4, 4)).unwrap();
        let b = multi.fit(&rank_one_triples(), (4, 4)).unwrap();

        assert_eq!(a.best, b.best);
        assert_eq!(single.predict(2, 3).unwrap(), multi.predict(2, 3).unwrap());
    }

    #[test]
    fn test_tiny_input_skips_search() {
        let mut mf = MatrixFactorization::new(SearchGrid::fixed(params(), 10));
        let triples = vec![IndexedRating { user: 0, item: 0, rating: 3.0 }];
        let report = mf.fit(&triples, (1, 1)).unwrap();

        assert!(!report.searched);
        assert_eq!(report.best, params());
        assert_eq!(mf.phase(), TrainerPhase::Trained);
    }

    #[test]
    fn test_out_of_range_prediction() {
        let mut mf = MatrixFactorization::new(SearchGrid::fixed(params(), 10));
        mf.fit(&rank_one_triples(), (4, 4)).unwrap();

        assert!(matches!(
            mf.predict(4, 0),
            Err(RecommendError::UnknownEntity { .. })
        ));
        assert!(matches!(
            mf.predict(0, 9),
            Err(RecommendError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let mut mf = MatrixFactorization::new(SearchGrid::default());
        assert!(matches!(
            mf.fit(&[], (0, 0)),
            Err(RecommendError::EmptyInput { .. })
        ));

        let stray = vec![IndexedRating { user: 5, item: 0, rating: 1.0 }];
        assert!(mf.fit(&stray, (2, 2)).is_err());
        assert_eq!(mf.phase(), TrainerPhase::Untrained);
    }

    /// Fully observed 4x4 matrix with ratings between 8 and 10
    fn high_ratings() -> Vec<IndexedRating> {
        let mut triples = Vec::new();
        for user in 0..4 {
            for item in 0..4 {
                triples.push(IndexedRating {
                    user,
                    item,
                    rating: 8.0 + ((user + item) % 3) as f64,
                });
            }
        }
        triples
    }

    fn oversized_step() -> FactorizationParams {
        FactorizationParams {
            rank: 4,
            learning_rate: 5.0,
            user_l2: 0.01,
            item_l2: 0.01,
        }
    }

    #[test]
    fn test_large_learning_rate_diverges() {
        let result = train_factors(&high_ratings(), (4, 4), &oversized_step(), 50, 42);
        match result {
            Err(RecommendError::Diverged {
                rank,
                learning_rate,
            }) => {
                assert_eq!(rank, 4);
                assert_eq!(learning_rate, 5.0);
            }
            Err(e) => panic!("expected Diverged, got {e}"),
            Ok(factors) => panic!(
                "expected Diverged, got a model with rmse {}",
                factors.rmse(&high_ratings())
            ),
        }
    }

    #[test]
    fn test_fit_reports_divergence_instead_of_zero_model() {
        let mut mf = MatrixFactorization::new(SearchGrid::fixed(oversized_step(), 50));
        assert!(matches!(
            mf.fit(&high_ratings(), (4, 4)),
            Err(RecommendError::Diverged { .. })
        ));
        assert_eq!(mf.phase(), TrainerPhase::Untrained);
        assert!(matches!(
            mf.predict(0, 0),
            Err(RecommendError::InvalidTrainerState { .. })
        ));
    }

    #[test]
    fn test_search_skips_diverging_candidates() {
        let grid = SearchGrid {
            ranks: vec![2],
            learning_rates: vec![5.0, 0.01],
            user_l2: vec![0.01],
            item_l2: vec![0.01],
            search_iterations: 30,
            final_iterations: 100,
            threads: 2,
            validation_ratio: 0.25,
            seed: 42,
        };
        let mut mf = MatrixFactorization::new(grid);
        let report = mf.fit(&high_ratings(), (4, 4)).unwrap();

        assert_eq!(report.candidates[0].validation_rmse, f64::INFINITY);
        assert!(report.candidates[1].validation_rmse.is_finite());
        assert_eq!(report.best.learning_rate, 0.01);
        assert!(mf.predict(0, 0).unwrap() > 1.0);
    }

    #[test]
    fn test_reset_returns_to_untrained() {
        let mut mf = MatrixFactorization::new(SearchGrid::fixed(params(), 10));
        mf.fit(&rank_one_triples(), (4, 4)).unwrap();
        mf.reset();
        assert!(matches!(
            mf.predict(0, 0),
            Err(RecommendError::InvalidTrainerState { .. })
        ));
    }

    #[test]
    fn test_grid_validation() {
        assert!(SearchGrid::default().validate().is_ok());
        assert_eq!(SearchGrid::default().candidates().len(), 16);

        let empty_ranks = SearchGrid {
            ranks: vec![],
            ..SearchGrid::default()
        };
        assert!(empty_ranks.validate().is_err());

        let bad_lr = SearchGrid {
            learning_rates: vec![0.0],
            ..SearchGrid::default()
        };
        assert!(bad_lr.validate().is_err());

        let bad_ratio = SearchGrid {
            validation_ratio: 1.0,
            ..SearchGrid::default()
        };
        assert!(bad_ratio.validate().is_err());
    }
}
