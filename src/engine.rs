// Recommendation engine — the service context built once at startup.
//
// Holds the catalog, the title index and every loaded similarity source.
// Nothing here mutates after construction, so a single Recommender can be
// shared across request handlers behind an Arc.
//
// A failed load does not abort the process. The engine starts Unavailable,
// keeps the reason for status reporting, and refuses every recommendation
// request until the artifacts are fixed and the process restarted.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::artifacts::{load_artifacts, Artifacts};
use crate::catalog::{Catalog, CatalogItem, DuplicatePolicy, TitleIndex};
use crate::error::{ArtifactError, RecommendError};
use crate::evaluation::{self, EvaluationParams, EvaluationReport};
use crate::ranking::{self, Recommendation};
use crate::similarity::{
    EmbeddingSource, HybridScorer, HybridWeights, MatrixSource, PopularitySource,
    SimilaritySource,
};

/// Which scoring strategy a request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScorerChoice {
    /// Cosine similarity over dense item embeddings
    #[default]
    Embedding,
    /// Rows of the precomputed pairwise similarity matrix
    Matrix,
    /// Weighted blend of embedding, matrix and popularity
    Hybrid,
}

impl ScorerChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScorerChoice::Embedding => "embedding",
            ScorerChoice::Matrix => "matrix",
            ScorerChoice::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for ScorerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScorerChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "embedding" | "semantic" => Ok(ScorerChoice::Embedding),
            "matrix" | "lexical" => Ok(ScorerChoice::Matrix),
            "hybrid" => Ok(ScorerChoice::Hybrid),
            other => Err(format!("unknown scorer '{other}'")),
        }
    }
}

/// Construction-time settings that are not artifacts.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub weights: HybridWeights,
    pub duplicate_policy: DuplicatePolicy,
}

/// A recommendation joined back to catalog metadata for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedMovie {
    pub position: usize,
    pub external_id: i64,
    pub title: String,
    pub score: f64,
    /// Filled in later by the poster layer; never affects ranking
    pub poster_url: Option<String>,
}

/// Summary for the status command and the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub available: bool,
    pub reason: Option<String>,
    pub items: usize,
    pub distinct_titles: usize,
    pub embedding_dim: Option<usize>,
    pub scorers: Vec<ScorerChoice>,
    pub has_popularity: bool,
    pub loaded_at: DateTime<Utc>,
}

/// Fully initialized engine state.
pub struct LoadedEngine {
    catalog: Catalog,
    index: TitleIndex,
    embedding: Option<Arc<EmbeddingSource>>,
    matrix: Option<Arc<MatrixSource>>,
    popularity: Option<Arc<PopularitySource>>,
    hybrid: Option<HybridScorer>,
}

impl LoadedEngine {
    fn build(artifacts: Artifacts, options: &EngineOptions) -> Result<Self, ArtifactError> {
        artifacts.validate()?;

        let popularity_values = artifacts.popularity.as_ref().map(|p| p.values().to_vec());
        let index = TitleIndex::build(&artifacts.catalog)
            .with_policy(options.duplicate_policy, popularity_values);

        let embedding = artifacts
            .embeddings
            .map(|m| Arc::new(EmbeddingSource::new(m)));
        let matrix = artifacts
            .similarity
            .map(|m| Arc::new(MatrixSource::new(m)));
        let popularity = artifacts
            .popularity
            .map(|p| Arc::new(PopularitySource::new(p)));

        let hybrid = match HybridScorer::from_weights(
            options.weights,
            embedding
                .clone()
                .map(|s| s as Arc<dyn SimilaritySource>),
            matrix.clone().map(|s| s as Arc<dyn SimilaritySource>),
            popularity
                .clone()
                .map(|s| s as Arc<dyn SimilaritySource>),
        ) {
            Ok(h) => Some(h),
            Err(e) => {
                warn!(error = %e, "Hybrid scorer disabled");
                None
            }
        };

        Ok(Self {
            catalog: artifacts.catalog,
            index,
            embedding,
            matrix,
            popularity,
            hybrid,
        })
    }

    fn scorer(&self, choice: ScorerChoice) -> Result<&dyn SimilaritySource, RecommendError> {
        let source: Option<&dyn SimilaritySource> = match choice {
            ScorerChoice::Embedding => self.embedding.as_deref().map(|s| s as &dyn SimilaritySource),
            ScorerChoice::Matrix => self.matrix.as_deref().map(|s| s as &dyn SimilaritySource),
            ScorerChoice::Hybrid => self.hybrid.as_ref().map(|s| s as &dyn SimilaritySource),
        };
        source.ok_or_else(|| RecommendError::ScorerUnavailable {
            scorer: choice.to_string(),
            reason: "its artifacts were not loaded".to_string(),
        })
    }

    fn available_scorers(&self) -> Vec<ScorerChoice> {
        [
            ScorerChoice::Embedding,
            ScorerChoice::Matrix,
            ScorerChoice::Hybrid,
        ]
        .into_iter()
        .filter(|c| self.scorer(*c).is_ok())
        .collect()
    }
}

/// Load state of the engine.
pub enum EngineState {
    Ready(LoadedEngine),
    Unavailable { reason: String },
}

/// The recommendation service. Construct once, share by reference.
pub struct Recommender {
    state: EngineState,
    loaded_at: DateTime<Utc>,
}

impl Recommender {
    /// Load artifacts from `dir`. Never fails: a load error leaves the engine
    /// Unavailable and is reported through `status()`.
    pub fn load(dir: &Path, options: &EngineOptions) -> Self {
        let result = load_artifacts(dir).and_then(|a| LoadedEngine::build(a, options));
        match result {
            Ok(engine) => {
                info!(
                    items = engine.catalog.len(),
                    scorers = ?engine.available_scorers(),
                    "Recommendation engine ready"
                );
                Self {
                    state: EngineState::Ready(engine),
                    loaded_at: Utc::now(),
                }
            }
            Err(e) => {
                error!(error = %e, dir = %dir.display(), "Failed to load artifacts; recommendations disabled");
                Self::unavailable(e.to_string())
            }
        }
    }

    /// Build a ready engine from in-memory artifacts.
    pub fn from_artifacts(
        artifacts: Artifacts,
        options: &EngineOptions,
    ) -> Result<Self, ArtifactError> {
        Ok(Self {
            state: EngineState::Ready(LoadedEngine::build(artifacts, options)?),
            loaded_at: Utc::now(),
        })
    }

    /// An engine that refuses every request.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: EngineState::Unavailable {
                reason: reason.into(),
            },
            loaded_at: Utc::now(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, EngineState::Ready(_))
    }

    fn ready(&self) -> Result<&LoadedEngine, RecommendError> {
        match &self.state {
            EngineState::Ready(engine) => Ok(engine),
            EngineState::Unavailable { reason } => Err(RecommendError::CatalogUnavailable {
                reason: reason.clone(),
            }),
        }
    }

    /// Resolve a free-text title to a catalog position.
    /// Always None while the engine is unavailable.
    pub fn resolve(&self, title: &str) -> Option<usize> {
        self.ready().ok()?.index.resolve(title)
    }

    /// Catalog metadata for a position.
    pub fn item(&self, position: usize) -> Option<&CatalogItem> {
        self.ready().ok()?.catalog.get(position)
    }

    /// Every catalog title in order (empty while unavailable).
    pub fn titles(&self) -> Vec<&str> {
        match self.ready() {
            Ok(engine) => engine.catalog.titles().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.ready().ok().map(|e| &e.catalog)
    }

    pub fn scorer(&self, choice: ScorerChoice) -> Result<&dyn SimilaritySource, RecommendError> {
        self.ready()?.scorer(choice)
    }

    /// Top-K neighbors of `position`. Empty while unavailable.
    pub fn top_k(
        &self,
        position: usize,
        k: usize,
        choice: ScorerChoice,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        let engine = match self.ready() {
            Ok(engine) => engine,
            Err(_) => return Ok(Vec::new()),
        };
        ranking::top_k(position, k, engine.scorer(choice)?)
    }

    /// Resolve `title`, rank its neighbors and join them with catalog data.
    pub fn recommend(
        &self,
        title: &str,
        k: usize,
        choice: ScorerChoice,
    ) -> Result<Vec<RecommendedMovie>, RecommendError> {
        let engine = self.ready()?;
        let base = engine
            .index
            .resolve(title)
            .ok_or_else(|| RecommendError::TitleNotFound {
                query: title.to_string(),
            })?;

        let ranked = ranking::top_k(base, k, engine.scorer(choice)?)?;

        info!(
            query = title,
            base,
            scorer = %choice,
            results = ranked.len(),
            "Ranked recommendations"
        );

        Ok(ranked
            .into_iter()
            .filter_map(|r| {
                engine.catalog.get(r.position).map(|item| RecommendedMovie {
                    position: r.position,
                    external_id: item.external_id,
                    title: item.title.clone(),
                    score: r.score,
                    poster_url: None,
                })
            })
            .collect())
    }

    /// Run the genre precision@K evaluation with the chosen scorer.
    pub fn evaluate(
        &self,
        params: &EvaluationParams,
        choice: ScorerChoice,
    ) -> Result<EvaluationReport, RecommendError> {
        let engine = self.ready()?;
        evaluation::evaluate(&engine.catalog, engine.scorer(choice)?, params)
    }

    /// Same as `evaluate`, reporting progress after each sampled item.
    pub fn evaluate_with_progress<F: FnMut(usize)>(
        &self,
        params: &EvaluationParams,
        choice: ScorerChoice,
        on_item: F,
    ) -> Result<EvaluationReport, RecommendError> {
        let engine = self.ready()?;
        evaluation::evaluate_with_progress(&engine.catalog, engine.scorer(choice)?, params, on_item)
    }

    pub fn status(&self) -> EngineStatus {
        match &self.state {
            EngineState::Ready(engine) => EngineStatus {
                available: true,
                reason: None,
                items: engine.catalog.len(),
                distinct_titles: engine.index.len(),
                embedding_dim: engine.embedding.as_ref().map(|e| e.matrix().dim()),
                scorers: engine.available_scorers(),
                has_popularity: engine.popularity.is_some(),
                loaded_at: self.loaded_at,
            },
            EngineState::Unavailable { reason } => EngineStatus {
                available: false,
                reason: Some(reason.clone()),
                items: 0,
                distinct_titles: 0,
                embedding_dim: None,
                scorers: Vec::new(),
                has_popularity: false,
                loaded_at: self.loaded_at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scorer_choice_from_str() {
        assert_eq!("Embedding".parse(), Ok(ScorerChoice::Embedding));
        assert_eq!("lexical".parse(), Ok(ScorerChoice::Matrix));
        assert_eq!(" hybrid ".parse(), Ok(ScorerChoice::Hybrid));
        assert!("bm25".parse::<ScorerChoice>().is_err());
    }

    #[test]
    fn test_unavailable_refuses_everything() {
        let engine = Recommender::unavailable("movies.json missing");
        assert!(!engine.is_available());
        assert_eq!(engine.resolve("Avatar"), None);
        assert!(engine.titles().is_empty());
        assert!(engine.top_k(0, 5, ScorerChoice::Embedding).unwrap().is_empty());
        assert!(matches!(
            engine.recommend("Avatar", 5, ScorerChoice::Embedding),
            Err(RecommendError::CatalogUnavailable { .. })
        ));
        let status = engine.status();
        assert!(!status.available);
        assert_eq!(status.reason.as_deref(), Some("movies.json missing"));
    }

    #[test]
    fn test_load_from_missing_dir_is_unavailable() {
        let dir = std::env::temp_dir().join("marquee-engine-test-nonexistent");
        let engine = Recommender::load(&dir, &EngineOptions::default());
        assert!(!engine.is_available());
    }
}
