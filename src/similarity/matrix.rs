// Precomputed pairwise similarity (the older bag-of-words model).
//
// Entry (i, j) is the similarity between positions i and j, computed offline.
// Lookups are a row copy with no arithmetic, at the cost of n^2 memory, so
// this only suits small catalogs.

use tracing::warn;

use super::traits::{check_position, SimilaritySource};
use crate::error::{ArtifactError, RecommendError};

/// Asymmetry above this is logged at load time.
const SYMMETRY_TOLERANCE: f64 = 1e-6;

/// Square, immutable similarity matrix indexed by catalog position.
#[derive(Debug, Clone)]
pub struct PairwiseSimilarityMatrix {
    rows: Vec<Vec<f64>>,
}

impl PairwiseSimilarityMatrix {
    /// Validate that the matrix is square and finite.
    ///
    /// Asymmetry is tolerated (logged) since some exporters write the upper
    /// triangle with float noise; a non-square matrix is rejected.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, ArtifactError> {
        let n = rows.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(ArtifactError::Invalid {
                    artifact: "similarity matrix",
                    reason: format!("row {i} has {} columns, expected {n}", row.len()),
                });
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(ArtifactError::Invalid {
                    artifact: "similarity matrix",
                    reason: format!("row {i} contains a non-finite value"),
                });
            }
        }

        let asymmetric = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .filter(|&(i, j)| (rows[i][j] - rows[j][i]).abs() > SYMMETRY_TOLERANCE)
            .count();
        if asymmetric > 0 {
            warn!(asymmetric, "Similarity matrix is not symmetric");
        }

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.rows.get(i).and_then(|r| r.get(j)).copied()
    }
}

/// Similarity source that returns matrix rows directly.
pub struct MatrixSource {
    matrix: PairwiseSimilarityMatrix,
}

impl MatrixSource {
    pub fn new(matrix: PairwiseSimilarityMatrix) -> Self {
        Self { matrix }
    }
}

impl SimilaritySource for MatrixSource {
    fn name(&self) -> &'static str {
        "matrix"
    }

    fn len(&self) -> usize {
        self.matrix.len()
    }

    fn score_all(&self, base: usize) -> Result<Vec<f64>, RecommendError> {
        check_position(base, self.matrix.len())?;
        Ok(self.matrix.rows[base].clone())
    }
}
