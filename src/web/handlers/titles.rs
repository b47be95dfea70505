// GET /api/titles — catalog titles for the movie picker.
//
// Optional ?q= narrows the list with a case-insensitive substring match.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::web::{api_error, AppState};

#[derive(Deserialize, Default)]
pub struct TitlesQuery {
    pub q: Option<String>,
}

pub async fn list_titles(
    State(state): State<AppState>,
    Query(params): Query<TitlesQuery>,
) -> Response {
    if let Some(reason) = state.engine.status().reason {
        return api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            &format!("Recommendations unavailable: {reason}"),
        );
    }

    let mut titles = state.engine.titles();
    if let Some(q) = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let q_lower = q.to_lowercase();
        titles.retain(|t| t.to_lowercase().contains(&q_lower));
    }

    Json(serde_json::json!({
        "total": titles.len(),
        "titles": titles,
    }))
    .into_response()
}
