use std::collections::HashMap;
use std::sync::Arc;

use super::backend::{GraphBackend, GraphNode, GraphResult};
use super::view::{GraphPath, GraphStats, GraphView};
use crate::entity::EntityMention;
use crate::relation::RelationTriple;

/// How a build result was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildMode {
    /// Artifacts were merged into the backend; the view reflects stored state.
    Persisted,
    /// The view was assembled from the artifacts alone and is not stored.
    Ephemeral { reason: String },
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub graph: GraphView,
    pub mode: BuildMode,
}

/// Facade over the optional graph backend.
///
/// A build never fails the caller: backend errors degrade the result to an
/// ephemeral view. Query methods likewise swallow backend errors into empty
/// results, logging a warning.
pub struct GraphStore {
    backend: Option<Arc<dyn GraphBackend>>,
}

impl GraphStore {
    #[must_use]
    pub fn new(backend: Arc<dyn GraphBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Store with no backend at all. Every build is ephemeral and every
    /// query comes back empty.
    #[must_use]
    pub fn detached() -> Self {
        Self { backend: None }
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.backend.is_some()
    }

    /// Merges one document's artifacts into the backend and returns the
    /// stored projection, or an ephemeral one when that is not possible.
    pub async fn build(
        &self,
        document_id: &str,
        entities: &[EntityMention],
        relations: &[RelationTriple],
    ) -> BuildReport {
        let Some(backend) = &self.backend else {
            return BuildReport {
                graph: GraphView::ephemeral(entities, relations),
                mode: BuildMode::Ephemeral {
                    reason: "no graph backend configured".to_string(),
                },
            };
        };

        match persist(backend.as_ref(), document_id, entities, relations).await {
            Ok(graph) => BuildReport {
                graph,
                mode: BuildMode::Persisted,
            },
            Err(err) => {
                tracing::warn!(
                    document_id,
                    error = %err,
                    "graph build failed, serving ephemeral view"
                );
                BuildReport {
                    graph: GraphView::ephemeral(entities, relations),
                    mode: BuildMode::Ephemeral {
                        reason: err.to_string(),
                    },
                }
            }
        }
    }

    pub async fn document_view(&self, document_id: &str) -> GraphView {
        match &self.backend {
            Some(backend) => backend
                .document_view(document_id)
                .await
                .unwrap_or_else(|err| {
                    tracing::warn!(document_id, error = %err, "graph view query failed");
                    GraphView::default()
                }),
            None => GraphView::default(),
        }
    }

    pub async fn search(&self, query: &str, limit: usize) -> Vec<GraphNode> {
        match &self.backend {
            Some(backend) => backend.search(query, limit).await.unwrap_or_else(|err| {
                tracing::warn!(error = %err, "graph search failed");
                Vec::new()
            }),
            None => Vec::new(),
        }
    }

    pub async fn find_paths(&self, start: &str, end: &str, max_depth: usize) -> Vec<GraphPath> {
        match &self.backend {
            Some(backend) => backend
                .shortest_paths(start, end, max_depth)
                .await
                .unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "graph path query failed");
                    Vec::new()
                }),
            None => Vec::new(),
        }
    }

    pub async fn stats(&self, document_id: Option<&str>) -> GraphStats {
        match &self.backend {
            Some(backend) => backend.stats(document_id).await.unwrap_or_else(|err| {
                tracing::warn!(error = %err, "graph stats query failed");
                GraphStats::default()
            }),
            None => GraphStats::default(),
        }
    }
}

/// Upserts entities first so relations can be wired by stored node id.
/// Relations whose endpoints did not resolve to an upserted entity are
/// skipped, not errors.
async fn persist(
    backend: &dyn GraphBackend,
    document_id: &str,
    entities: &[EntityMention],
    relations: &[RelationTriple],
) -> GraphResult<GraphView> {
    let mut ids_by_text: HashMap<&str, String> = HashMap::with_capacity(entities.len());
    for entity in entities {
        let id = backend.upsert_entity(document_id, entity).await?;
        ids_by_text.insert(entity.text.as_str(), id);
    }

    for relation in relations {
        let (Some(source), Some(target)) = (
            ids_by_text.get(relation.subject.as_str()),
            ids_by_text.get(relation.object.as_str()),
        ) else {
            tracing::debug!(
                subject = %relation.subject,
                object = %relation.object,
                "skipping relation with unresolved endpoint"
            );
            continue;
        };
        backend
            .upsert_relation(document_id, source, target, relation)
            .await?;
    }

    backend.document_view(document_id).await
}
