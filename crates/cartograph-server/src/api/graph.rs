use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use cartograph_core::{GraphNode, GraphPath, GraphStats};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search))
        .route("/paths", get(find_paths))
        .route("/stats", get(stats))
}

const fn default_limit() -> usize {
    20
}

const fn default_max_depth() -> usize {
    3
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub results: Vec<GraphNode>,
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let results = state.pipeline.store().search(&query.q, query.limit).await;
    Json(SearchResponse {
        count: results.len(),
        results,
    })
}

#[derive(Debug, Deserialize)]
pub struct PathsQuery {
    start: String,
    end: String,
    #[serde(default = "default_max_depth")]
    max_depth: usize,
}

#[derive(Debug, Serialize)]
pub struct PathsResponse {
    pub count: usize,
    pub paths: Vec<GraphPath>,
}

async fn find_paths(
    State(state): State<AppState>,
    Query(query): Query<PathsQuery>,
) -> Json<PathsResponse> {
    let paths = state
        .pipeline
        .store()
        .find_paths(&query.start, &query.end, query.max_depth)
        .await;
    Json(PathsResponse {
        count: paths.len(),
        paths,
    })
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    document_id: Option<String>,
}

async fn stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Json<GraphStats> {
    Json(
        state
            .pipeline
            .store()
            .stats(query.document_id.as_deref())
            .await,
    )
}
