mod documents;
mod graph;
mod health;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/documents", documents::router())
        .nest("/graph", graph::router())
        .nest("/health", health::router())
}
