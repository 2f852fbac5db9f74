//! Book recommendation engine
//!
//! Collaborative filtering over explicit user-item ratings: user-based and
//! item-based cosine neighbourhoods, a non-negative latent-factor model with
//! grid-searched hyperparameters, an averaging ensemble of the three, and
//! error metrics for comparing them on held-out ratings.

pub mod config;
pub mod ensemble;
pub mod error;
pub mod evaluation;
pub mod item_based;
pub mod matrix;
pub mod matrix_factorization;
pub mod observability;
pub mod scoring;
pub mod session;
pub mod similarity;
pub mod split;
pub mod types;
pub mod user_based;

// Re-export key types
pub use config::{EngineConfig, RatingConfig};
pub use ensemble::{combine, EnsembleRow};
pub use error::{EntityKind, RecommendError, Result};
pub use evaluation::{ErrorMetrics, EvaluationReport, ModelRun};
pub use item_based::ItemBasedRecommender;
pub use matrix::{DuplicatePolicy, IdIndex, RatingMatrix, RatingMatrixBuilder};
pub use matrix_factorization::{
    FactorizationParams, LatentFactors, MatrixFactorization, SearchGrid, TrainerPhase,
    TuningReport,
};
pub use observability::{init_logging, LogConfig, LogFormat};
pub use scoring::{normalize, rank, NormalizedScores};
pub use session::RecommendationSession;
pub use similarity::{cosine_similarity, pairwise_cosine, Axis, SimilarityCache, SimilarityMatrix};
pub use split::{train_test_split, RatingSplit};
pub use types::{EntityId, IndexedRating, RatingBounds, RatingRecord, ScoredItem};
pub use user_based::UserBasedRecommender;
