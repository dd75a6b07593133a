use nalgebra::DMatrix;

use crate::error::{Error, Result};
use crate::model::Entity;
use crate::similarity::SimilarityProvider;

/// Lower bound applied to every derived distance.
pub const DISTANCE_EPSILON: f64 = 0.001;

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Symmetric N×N similarity scores with a unit diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    values: DMatrix<f64>,
}

impl SimilarityMatrix {
    /// Builds the matrix from entity embeddings. Only the upper triangle is queried; the lower
    /// triangle is mirrored so the result is symmetric regardless of the provider.
    ///
    /// Entities without an embedding score 0.0 against everything.
    pub fn from_entities(entities: &[Entity], provider: &dyn SimilarityProvider) -> Self {
        let n = entities.len();
        let mut values = DMatrix::<f64>::identity(n, n);
        for i in 0..n {
            for j in (i + 1)..n {
                let s = match (&entities[i].embedding, &entities[j].embedding) {
                    (Some(a), Some(b)) => provider.similarity(a, b),
                    _ => 0.0,
                };
                values[(i, j)] = s;
                values[(j, i)] = s;
            }
        }
        Self { values }
    }

    /// Builds the matrix from explicit rows. Rows must form a square, symmetric matrix; pairs
    /// where both entries are non-finite count as symmetric. The upper triangle is kept and
    /// mirrored, so pairs accepted within tolerance come out exactly equal.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        for (row, r) in rows.iter().enumerate() {
            if r.len() != n {
                return Err(Error::NotSquare {
                    row,
                    len: r.len(),
                    expected: n,
                });
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (rows[i][j], rows[j][i]);
                let both_bad = !a.is_finite() && !b.is_finite();
                if !both_bad && !((a - b).abs() <= SYMMETRY_TOLERANCE) {
                    return Err(Error::Asymmetric { i, j, a, b });
                }
            }
        }
        let values = DMatrix::from_fn(n, n, |i, j| {
            if i <= j { rows[i][j] } else { rows[j][i] }
        });
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Applies the distance transform: `max(epsilon, 1 - similarity)`, with non-finite
    /// similarities read as unrelated (distance 1).
    pub fn to_distances(&self) -> DistanceMatrix {
        DistanceMatrix::from_similarity(self)
    }
}

/// Floored dissimilarities used as relaxation targets. The diagonal is never read.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    values: DMatrix<f64>,
}

impl DistanceMatrix {
    pub fn from_similarity(similarity: &SimilarityMatrix) -> Self {
        let values = similarity.values.map(similarity_to_distance);
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }
}

pub fn similarity_to_distance(similarity: f64) -> f64 {
    let s = if similarity.is_finite() {
        similarity
    } else {
        0.0
    };
    (1.0 - s).max(DISTANCE_EPSILON)
}
