// Web server — Axum-based JSON API over the recommendation engine.
//
// The engine is loaded once before the server starts and shared read-only
// through AppState. When artifacts failed to load the server still comes
// up: /health reports the reason and recommendation routes answer 503.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::engine::Recommender;
use crate::error::RecommendError;
use crate::posters::traits::PosterSource;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Recommender>,
    pub posters: Arc<dyn PosterSource>,
    pub config: Arc<Config>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(
    config: Config,
    engine: Recommender,
    posters: Arc<dyn PosterSource>,
    port: u16,
    bind: &str,
) -> Result<()> {
    let state = AppState {
        engine: Arc::new(engine),
        posters,
        config: Arc::new(config),
    };

    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("Marquee API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/titles", get(handlers::titles::list_titles))
        .route("/api/recommend", get(handlers::recommend::recommend))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check. Always 200 so the process is considered alive; the body
/// says whether the engine can actually serve recommendations.
async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> impl IntoResponse {
    let status = state.engine.status();
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({
            "status": if status.available { "ok" } else { "degraded" },
            "engine": status,
        })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}

/// Map an engine error onto an HTTP status.
pub fn recommend_error(err: &RecommendError) -> Response {
    let status = match err {
        RecommendError::TitleNotFound { .. } => StatusCode::NOT_FOUND,
        RecommendError::CatalogUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        RecommendError::ScorerUnavailable { .. } | RecommendError::InvalidParameter { .. } => {
            StatusCode::BAD_REQUEST
        }
        RecommendError::PositionOutOfRange { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, &err.to_string())
}
