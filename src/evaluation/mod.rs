// Offline evaluation — genre precision@K over a random sample.

pub mod histogram;
pub mod precision;

pub use histogram::Histogram;
pub use precision::{evaluate, evaluate_with_progress, EvaluationParams, EvaluationReport};
