//! Pairwise cosine similarity between users or items
//!
//! Produces square, symmetric, zero-diagonal matrices. The upper triangle is
//! computed in parallel, one task per row index; every cell depends only on
//! its two input vectors, so the result does not depend on scheduling.

use crate::matrix::RatingMatrix;
use ndarray::{Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;

/// Which vectors of the rating matrix are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Row vectors: user-user similarity
    Users,
    /// Column vectors: item-item similarity
    Items,
}

/// Cosine similarity of two vectors, 0.0 when either has zero norm
pub fn cosine_similarity(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (a.dot(&b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Cosine similarity between every pair of rows of `vectors`
pub fn pairwise_cosine(vectors: ArrayView2<f64>) -> Array2<f64> {
    let n = vectors.nrows();
    let norms: Vec<f64> = vectors.rows().into_iter().map(|r| r.dot(&r).sqrt()).collect();

    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let vi = vectors.row(i);
            ((i + 1)..n)
                .map(|j| {
                    let denom = norms[i] * norms[j];
                    if denom == 0.0 {
                        0.0
                    } else {
                        (vi.dot(&vectors.row(j)) / denom).clamp(-1.0, 1.0)
                    }
                })
                .collect()
        })
        .collect();

    // Diagonal stays at zero: only off-diagonal cells are ever written.
    let mut sim = Array2::<f64>::zeros((n, n));
    for (i, row) in upper.into_iter().enumerate() {
        for (offset, value) in row.into_iter().enumerate() {
            let j = i + 1 + offset;
            sim[[i, j]] = value;
            sim[[j, i]] = value;
        }
    }
    sim
}

/// Similarity matrix derived from one build of a [`RatingMatrix`]
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    values: Array2<f64>,
    axis: Axis,
    generation: u64,
}

impl SimilarityMatrix {
    pub fn compute(matrix: &RatingMatrix, axis: Axis) -> Self {
        let ratings = matrix.dense_ratings();
        let values = match axis {
            Axis::Users => pairwise_cosine(ratings.view()),
            Axis::Items => pairwise_cosine(ratings.t()),
        };

        tracing::debug!(
            axis = ?axis,
            size = values.nrows(),
            generation = matrix.generation(),
            "Computed similarity matrix"
        );

        Self {
            values,
            axis,
            generation: matrix.generation(),
        }
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.values.row(i)
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Generation of the rating matrix this was computed from
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current_for(&self, matrix: &RatingMatrix) -> bool {
        self.generation == matrix.generation()
    }
}

/// Holds the most recent user and item similarity matrices
///
/// An entry is reused while it matches the generation of the rating matrix
/// it is asked about and recomputed otherwise.
#[derive(Debug, Default)]
pub struct SimilarityCache {
    users: Option<SimilarityMatrix>,
    items: Option<SimilarityMatrix>,
}

impl SimilarityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(&mut self, matrix: &RatingMatrix, axis: Axis) -> &SimilarityMatrix {
        let slot = match axis {
            Axis::Users => &mut self.users,
            Axis::Items => &mut self.items,
        };

        if slot.as_ref().is_some_and(|s| !s.is_current_for(matrix)) {
            *slot = None;
        }

        slot.get_or_insert_with(|| SimilarityMatrix::compute(matrix, axis))
    }

    pub fn is_cached(&self, matrix: &RatingMatrix, axis: Axis) -> bool {
        let slot = match axis {
            Axis::Users => &self.users,
            Axis::Items => &self.items,
        };
        slot.as_ref().is_some_and(|s| s.is_current_for(matrix))
    }

    pub fn invalidate(&mut self) {
        self.users = None;
        self.items = None;
    }
}
