// GET /api/recommend?title=&k=&scorer=&posters=
//
// Negative k is treated as 0. Posters are attached after ranking and only
// when asked for, so a slow image service never blocks a plain request.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::engine::ScorerChoice;
use crate::posters::{attach_posters, DEFAULT_CONCURRENCY};
use crate::web::{api_error, recommend_error, AppState};

#[derive(Deserialize, Default)]
pub struct RecommendQuery {
    pub title: Option<String>,
    pub k: Option<i64>,
    pub scorer: Option<String>,
    #[serde(default)]
    pub posters: bool,
}

pub async fn recommend(
    State(state): State<AppState>,
    Query(params): Query<RecommendQuery>,
) -> Response {
    let title = match params.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => return api_error(StatusCode::BAD_REQUEST, "Please select a movie."),
    };

    let scorer = match params.scorer.as_deref() {
        Some(raw) => match raw.parse::<ScorerChoice>() {
            Ok(choice) => choice,
            Err(e) => return api_error(StatusCode::BAD_REQUEST, &e),
        },
        None => state.config.default_scorer,
    };

    let k = match params.k {
        Some(k) => k.max(0) as usize,
        None => state.config.default_top_k,
    };

    let movies = match state.engine.recommend(&title, k, scorer) {
        Ok(movies) => movies,
        Err(e) => return recommend_error(&e),
    };

    let movies = if params.posters {
        attach_posters(state.posters.as_ref(), movies, DEFAULT_CONCURRENCY).await
    } else {
        movies
    };

    Json(serde_json::json!({
        "query": title,
        "scorer": scorer,
        "k": k,
        "results": movies,
    }))
    .into_response()
}
