use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::view::{GraphPath, GraphStats, GraphView};
use crate::entity::{EntityLabel, EntityMention};
use crate::relation::RelationTriple;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Graph backend unavailable: {0}")]
    Unavailable(String),

    #[error("Graph query failed: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Malformed graph record: {0}")]
    Malformed(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Upper bound on paths returned by one path query.
pub const MAX_PATHS: usize = 10;

/// Requested path depths are clamped to `1..=MAX_PATH_DEPTH` hops.
pub const MAX_PATH_DEPTH: usize = 10;

/// A stored node as returned by queries. Nodes are unique per
/// (text, document_id); the id is assigned on first insert and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub text: String,
    pub label: EntityLabel,
    pub confidence: f64,
    pub document_id: String,
}

/// Durable graph storage. Upserts follow max-confidence merge semantics:
/// on an existing key the stored confidence only ever increases, and the
/// other mutable fields follow only when the incoming confidence is strictly
/// greater. Implementations serialize concurrent upserts of the same key.
#[async_trait::async_trait]
pub trait GraphBackend: Send + Sync {
    /// Upserts one entity node, returning the id stored for the
    /// (text, document) key.
    async fn upsert_entity(
        &self,
        document_id: &str,
        entity: &EntityMention,
    ) -> GraphResult<String>;

    /// Upserts one relation between two already-stored nodes. The edge key is
    /// (source, target, predicate, document).
    async fn upsert_relation(
        &self,
        document_id: &str,
        source_id: &str,
        target_id: &str,
        relation: &RelationTriple,
    ) -> GraphResult<()>;

    /// Projection of one document's nodes and edges. Unknown documents give
    /// an empty view.
    async fn document_view(&self, document_id: &str) -> GraphResult<GraphView>;

    /// Case-insensitive substring search over node text, across all
    /// documents, ordered by confidence descending.
    async fn search(&self, query: &str, limit: usize) -> GraphResult<Vec<GraphNode>>;

    /// Shortest paths between nodes matching the two texts exactly,
    /// traversing edges in either direction, at most `max_depth` hops.
    /// Returns up to ten paths.
    async fn shortest_paths(
        &self,
        start: &str,
        end: &str,
        max_depth: usize,
    ) -> GraphResult<Vec<GraphPath>>;

    /// Aggregate counts, scoped to one document when given.
    async fn stats(&self, document_id: Option<&str>) -> GraphResult<GraphStats>;
}
