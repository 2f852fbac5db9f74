//! Engine configuration
//!
//! Layered loading: built-in defaults, then an optional `config/bookrec`
//! file (any format the `config` crate understands), then environment
//! variables prefixed with `BOOKREC`, nested keys separated by `__`.
//!
//! ```bash
//! export BOOKREC_RATINGS__MAX_RATING=5
//! export BOOKREC_FACTORIZATION__THREADS=8
//! export BOOKREC_LOGGING__FORMAT=json
//! ```

use crate::error::{RecommendError, Result};
use crate::matrix::DuplicatePolicy;
use crate::matrix_factorization::SearchGrid;
use crate::observability::LogConfig;
use crate::types::RatingBounds;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Rating scale and matrix construction
    #[serde(default)]
    pub ratings: RatingConfig,

    /// Latent-factor hyperparameter grid
    #[serde(default)]
    pub factorization: SearchGrid,

    #[serde(default)]
    pub logging: LogConfig,
}

/// Rating scale and matrix construction settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Lowest score a recommender emits
    pub min_rating: f64,

    /// Highest score a recommender emits
    pub max_rating: f64,

    /// Value stored in unobserved matrix cells
    pub fill_value: f64,

    /// Resolution of repeated (user, item) pairs
    pub duplicates: DuplicatePolicy,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            min_rating: 1.0,
            max_rating: 10.0,
            fill_value: 0.0,
            duplicates: DuplicatePolicy::Average,
        }
    }
}

impl RatingConfig {
    pub fn bounds(&self) -> RatingBounds {
        RatingBounds::new(self.min_rating, self.max_rating)
    }
}

impl EngineConfig {
    /// Load configuration from config file and environment
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/bookrec").required(false))
            .add_source(
                config::Environment::with_prefix("BOOKREC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let ratings = &self.ratings;
        if !ratings.min_rating.is_finite() || !ratings.max_rating.is_finite() {
            return Err(RecommendError::InvalidConfig(
                "rating bounds must be finite".to_string(),
            ));
        }
        if ratings.min_rating >= ratings.max_rating {
            return Err(RecommendError::InvalidConfig(format!(
                "min_rating ({}) must be below max_rating ({})",
                ratings.min_rating, ratings.max_rating
            )));
        }

        self.factorization.validate()
    }
}
