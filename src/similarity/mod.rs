// Similarity sources — embedding cosine, precomputed matrix, popularity,
// and the weighted hybrid over them.

pub mod embedding;
pub mod hybrid;
pub mod matrix;
pub mod popularity;
pub mod traits;

pub use embedding::{cosine_similarity, EmbeddingMatrix, EmbeddingSource};
pub use hybrid::{Component, HybridScorer, HybridWeights};
pub use matrix::{MatrixSource, PairwiseSimilarityMatrix};
pub use popularity::{PopularitySource, PopularityVector};
pub use traits::SimilaritySource;
