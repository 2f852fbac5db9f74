//! Error types for the recommendation engine

use crate::matrix_factorization::TrainerPhase;
use crate::types::EntityId;
use std::fmt;

pub type Result<T> = std::result::Result<T, RecommendError>;

/// Which identifier table a failed lookup went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Item,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::User => f.write_str("user"),
            EntityKind::Item => f.write_str("item"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("Unknown {kind}: {id}")]
    UnknownEntity { kind: EntityKind, id: EntityId },

    #[error("User {user} has no observed ratings")]
    InsufficientHistory { user: EntityId },

    #[error("Trainer is {phase}, predictions require a trained model")]
    InvalidTrainerState { phase: TrainerPhase },

    #[error("Length mismatch: {truth} true values vs {predicted} predictions")]
    ShapeMismatch { truth: usize, predicted: usize },

    #[error("Empty input: {what}")]
    EmptyInput { what: &'static str },

    #[error("Duplicate rating for user {user}, item {item}")]
    DuplicateRating { user: EntityId, item: EntityId },

    #[error("Rating {rating} for user {user}, item {item} is not a finite number")]
    InvalidRating {
        user: EntityId,
        item: EntityId,
        rating: f64,
    },

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("Factorization diverged (rank {rank}, learning rate {learning_rate})")]
    Diverged { rank: usize, learning_rate: f64 },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl RecommendError {
    pub fn unknown_user(id: impl Into<EntityId>) -> Self {
        RecommendError::UnknownEntity {
            kind: EntityKind::User,
            id: id.into(),
        }
    }

    pub fn unknown_item(id: impl Into<EntityId>) -> Self {
        RecommendError::UnknownEntity {
            kind: EntityKind::Item,
            id: id.into(),
        }
    }
}
