use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use cartograph_core::{BuildMode, EntityMention, GraphView, RelationTriple};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(process_document))
        .route("/{id}/graph", get(document_graph))
}

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    /// Caller-supplied id; one is generated when absent.
    pub document_id: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Artifacts were merged into the durable graph.
    Succeeded,
    /// Extraction ran but the graph is ephemeral.
    DegradedFallback,
    /// Extraction itself failed; artifacts are empty.
    FailedUpstream,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub document_id: String,
    pub status: ProcessingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub entities: Vec<EntityMention>,
    pub relations: Vec<RelationTriple>,
    pub graph: GraphView,
    pub processed_at: String,
}

/// Runs the full pipeline for one document. Always answers 200 with a status
/// field; extraction failures are reported in-band, not as HTTP errors.
async fn process_document(
    State(state): State<AppState>,
    Json(req): Json<ProcessRequest>,
) -> Json<ProcessResponse> {
    let document_id = req
        .document_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match state.pipeline.process(&document_id, &req.text).await {
        Ok(output) => {
            let (status, detail) = match output.mode {
                BuildMode::Persisted => (ProcessingStatus::Succeeded, None),
                BuildMode::Ephemeral { reason } => {
                    (ProcessingStatus::DegradedFallback, Some(reason))
                }
            };
            Json(ProcessResponse {
                document_id,
                status,
                detail,
                entities: output.entities,
                relations: output.relations,
                graph: output.graph,
                processed_at: Utc::now().to_rfc3339(),
            })
        }
        Err(err) => {
            tracing::error!(document_id, error = %err, "document processing failed");
            Json(ProcessResponse {
                document_id,
                status: ProcessingStatus::FailedUpstream,
                detail: Some(err.to_string()),
                entities: Vec::new(),
                relations: Vec::new(),
                graph: GraphView::default(),
                processed_at: Utc::now().to_rfc3339(),
            })
        }
    }
}

async fn document_graph(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<GraphView> {
    Json(state.pipeline.store().document_view(&id).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_value(ProcessingStatus::Succeeded).unwrap(),
            "succeeded"
        );
        assert_eq!(
            serde_json::to_value(ProcessingStatus::DegradedFallback).unwrap(),
            "degraded_fallback"
        );
        assert_eq!(
            serde_json::to_value(ProcessingStatus::FailedUpstream).unwrap(),
            "failed_upstream"
        );
    }

    #[test]
    fn test_detail_omitted_when_absent() {
        let response = ProcessResponse {
            document_id: "doc-1".to_string(),
            status: ProcessingStatus::Succeeded,
            detail: None,
            entities: Vec::new(),
            relations: Vec::new(),
            graph: GraphView::default(),
            processed_at: Utc::now().to_rfc3339(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("detail").is_none());
        assert_eq!(value["status"], "succeeded");
    }
}
