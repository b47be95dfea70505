// Ranking — deterministic, self-excluding top-K selection.

pub mod topk;

pub use topk::{rank_scores, top_k, Recommendation};
