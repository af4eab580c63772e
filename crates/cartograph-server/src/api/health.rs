use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Extraction strategy fixed at startup.
    pub strategy: &'static str,
    /// Whether graph builds are persisted or ephemeral-only.
    pub graph_connected: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        strategy: state.pipeline.strategy().as_str(),
        graph_connected: state.pipeline.store().is_persistent(),
    })
}
