//! Core data types shared across the recommenders

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque user or item identifier
///
/// Ratings tables key users and books by either numeric ids or strings
/// (ISBNs), so both are accepted and compared as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Str(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(id) => write!(f, "{}", id),
            EntityId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId::Int(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId::Str(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId::Str(id)
    }
}

impl From<&EntityId> for EntityId {
    fn from(id: &EntityId) -> Self {
        id.clone()
    }
}

/// A single explicit rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub user_id: EntityId,
    pub item_id: EntityId,
    pub rating: f64,
}

impl RatingRecord {
    pub fn new(user_id: impl Into<EntityId>, item_id: impl Into<EntityId>, rating: f64) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            rating,
        }
    }
}

/// Rating addressed by matrix position instead of identifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedRating {
    pub user: usize,
    pub item: usize,
    pub rating: f64,
}

/// Inclusive output scale for normalized scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingBounds {
    pub min: f64,
    pub max: f64,
}

impl RatingBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Fallback score when a score range collapses to a single value
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for RatingBounds {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 10.0,
        }
    }
}

/// One entry of a recommendation list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item_id: EntityId,
    pub score: f64,
    pub already_rated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_untagged_serde() {
        let ids: Vec<EntityId> = serde_json::from_str(r#"[276725, "034545104X"]"#).unwrap();
        assert_eq!(ids[0], EntityId::Int(276725));
        assert_eq!(ids[1], EntityId::from("034545104X"));

        let json = serde_json::to_string(&ids).unwrap();
        assert_eq!(json, r#"[276725,"034545104X"]"#);
    }

    #[test]
    fn test_rating_record_from_json() {
        let record: RatingRecord =
            serde_json::from_str(r#"{"user_id": 8, "item_id": "0002005018", "rating": 5}"#)
                .unwrap();
        assert_eq!(record.user_id, EntityId::Int(8));
        assert_eq!(record.rating, 5.0);
    }

    #[test]
    fn test_bounds_midpoint_and_clamp() {
        let bounds = RatingBounds::new(1.0, 10.0);
        assert_eq!(bounds.midpoint(), 5.5);
        assert_eq!(bounds.clamp(12.0), 10.0);
        assert_eq!(bounds.clamp(-3.0), 1.0);
        assert!(bounds.contains(10.0));
        assert!(!bounds.contains(0.5));
    }
}
