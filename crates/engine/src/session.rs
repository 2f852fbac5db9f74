//! Single-user recommendation pipeline
//!
//! Owns the rating matrix built from training records, the similarity cache
//! derived from it and the latent-factor trainer. Replacing the ratings
//! rebuilds the matrix, drops cached similarities and untrains the model.

use crate::config::EngineConfig;
use crate::ensemble::{combine, score_lookup, EnsembleRow};
use crate::error::{RecommendError, Result};
use crate::evaluation::{ErrorMetrics, EvaluationReport};
use crate::item_based::ItemBasedRecommender;
use crate::matrix::{RatingMatrix, RatingMatrixBuilder};
use crate::matrix_factorization::{MatrixFactorization, TrainerPhase, TuningReport};
use crate::scoring::rank;
use crate::similarity::{Axis, SimilarityCache};
use crate::types::{EntityId, RatingBounds, RatingRecord, ScoredItem};
use crate::user_based::UserBasedRecommender;
use std::collections::HashMap;

pub const USER_CF_RUN: &str = "user_cf";
pub const ITEM_CF_RUN: &str = "item_cf";
pub const FACTORIZATION_RUN: &str = "matrix_factorization";
pub const ENSEMBLE_RUN: &str = "ensemble";

pub struct RecommendationSession {
    config: EngineConfig,
    matrix: RatingMatrix,
    similarities: SimilarityCache,
    trainer: MatrixFactorization,
}

impl RecommendationSession {
    pub fn new(config: EngineConfig, records: &[RatingRecord]) -> Result<Self> {
        config.validate()?;
        let matrix = RatingMatrixBuilder::from_config(&config.ratings).build(records)?;
        let trainer = MatrixFactorization::new(config.factorization.clone());

        Ok(Self {
            config,
            matrix,
            similarities: SimilarityCache::new(),
            trainer,
        })
    }

    /// Rebuild from new records; on error the previous state is kept
    pub fn replace_ratings(&mut self, records: &[RatingRecord]) -> Result<()> {
        let matrix = RatingMatrixBuilder::from_config(&self.config.ratings).build(records)?;
        self.matrix = matrix;
        self.similarities.invalidate();
        self.trainer.reset();
        tracing::info!(
            users = self.matrix.user_count(),
            items = self.matrix.item_count(),
            "Replaced session ratings"
        );
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn matrix(&self) -> &RatingMatrix {
        &self.matrix
    }

    pub fn bounds(&self) -> RatingBounds {
        self.config.ratings.bounds()
    }

    pub fn trainer_phase(&self) -> TrainerPhase {
        self.trainer.phase()
    }

    pub fn user_based(&mut self, user_id: &EntityId) -> Result<Vec<ScoredItem>> {
        let bounds = self.bounds();
        let similarity = self.similarities.get_or_compute(&self.matrix, Axis::Users);
        UserBasedRecommender::new(&self.matrix, similarity, bounds)?.recommend(user_id)
    }

    pub fn item_based(&mut self, user_id: &EntityId) -> Result<Vec<ScoredItem>> {
        let bounds = self.bounds();
        let similarity = self.similarities.get_or_compute(&self.matrix, Axis::Items);
        ItemBasedRecommender::new(&self.matrix, similarity, bounds)?.recommend(user_id)
    }

    /// Fit the latent-factor model to every observed rating
    pub fn train_factors(&mut self) -> Result<TuningReport> {
        let triples = self.matrix.observed_triples();
        self.trainer.fit(
            &triples,
            (self.matrix.user_count(), self.matrix.item_count()),
        )
    }

    /// Clipped latent-factor scores for `items`, best first
    pub fn factor_predictions(
        &self,
        user_id: &EntityId,
        items: &[EntityId],
    ) -> Result<Vec<ScoredItem>> {
        let user = self.matrix.user_index(user_id)?;
        let bounds = self.bounds();

        let mut scored = items
            .iter()
            .map(|item_id| {
                let item = self.matrix.item_index(item_id)?;
                Ok(ScoredItem {
                    item_id: item_id.clone(),
                    score: self.trainer.predict_clipped(user, item, bounds)?,
                    already_rated: self.matrix.is_observed(user, item),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        rank(&mut scored);
        Ok(scored)
    }

    /// Items known to the training matrix, in input order
    fn known_items(&self, items: &[EntityId]) -> Vec<EntityId> {
        let known: Vec<EntityId> = items
            .iter()
            .filter(|id| self.matrix.item_index(id).is_ok())
            .cloned()
            .collect();
        if known.len() < items.len() {
            tracing::debug!(
                skipped = items.len() - known.len(),
                "Skipping items absent from training ratings"
            );
        }
        known
    }

    /// Join the three models over the user's test items
    ///
    /// The latent-factor model must already be trained.
    pub fn ensemble(&mut self, user_id: &EntityId, test_items: &[EntityId]) -> Result<Vec<EnsembleRow>> {
        let items = self.known_items(test_items);
        let factorization = self.factor_predictions(user_id, &items)?;
        let user_cf = self.user_based(user_id)?;
        let item_cf = self.item_based(user_id)?;
        Ok(combine(&user_cf, &item_cf, &factorization))
    }

    /// Score every model against the user's held-out ratings
    ///
    /// Trains the latent-factor model first if it is not trained yet.
    pub fn evaluate_user(
        &mut self,
        user_id: &EntityId,
        held_out: &[RatingRecord],
    ) -> Result<EvaluationReport> {
        let held_out: Vec<&RatingRecord> = held_out
            .iter()
            .filter(|r| &r.user_id == user_id && self.matrix.item_index(&r.item_id).is_ok())
            .collect();
        if held_out.is_empty() {
            return Err(RecommendError::EmptyInput {
                what: "held-out ratings for known items",
            });
        }
        if self.trainer.phase() != TrainerPhase::Trained {
            self.train_factors()?;
        }

        let items: Vec<EntityId> = held_out.iter().map(|r| r.item_id.clone()).collect();
        let truth: Vec<f64> = held_out.iter().map(|r| r.rating).collect();

        let user_cf = self.user_based(user_id)?;
        let item_cf = self.item_based(user_id)?;
        let factorization = self.factor_predictions(user_id, &items)?;

        let mut report = EvaluationReport::new();
        for (name, scored) in [
            (USER_CF_RUN, &user_cf),
            (ITEM_CF_RUN, &item_cf),
            (FACTORIZATION_RUN, &factorization),
        ] {
            let predicted = scores_for(scored, &items)?;
            report.push(name, ErrorMetrics::compute(&truth, &predicted)?);
        }

        let rows = combine(&user_cf, &item_cf, &factorization);
        let mut actual: HashMap<&EntityId, f64> = HashMap::new();
        for record in &held_out {
            actual.entry(&record.item_id).or_insert(record.rating);
        }
        let (joined_truth, joined_scores): (Vec<f64>, Vec<f64>) = rows
            .iter()
            .filter_map(|row| actual.get(&row.item_id).map(|&t| (t, row.score)))
            .unzip();
        report.push(
            ENSEMBLE_RUN,
            ErrorMetrics::compute(&joined_truth, &joined_scores)?,
        );

        tracing::info!(
            user = %user_id,
            held_out = held_out.len(),
            ensemble_rows = rows.len(),
            "Evaluated models"
        );

        Ok(report)
    }
}

/// Scores of `items` in order; an item missing from `scored` is an error
fn scores_for(scored: &[ScoredItem], items: &[EntityId]) -> Result<Vec<f64>> {
    let lookup = score_lookup(scored);
    items
        .iter()
        .map(|id| {
            lookup
                .get(id)
                .copied()
                .ok_or_else(|| RecommendError::unknown_item(id))
        })
        .collect()
}
