use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entity::EntityMention;
use crate::relation::RelationTriple;

/// Visualization-ready projection of one document's graph. Node and edge
/// display weights are derived from confidence on every read, never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub stats: ViewStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeView {
    pub id: String,
    /// Display label, the entity text.
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub confidence: f64,
    pub size: f64,
}

impl NodeView {
    #[must_use]
    pub fn new(id: String, label: String, node_type: String, confidence: f64) -> Self {
        Self {
            id,
            label,
            node_type,
            confidence,
            size: node_size(confidence),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeView {
    pub source: String,
    pub target: String,
    pub relation: String,
    pub confidence: f64,
    pub context: String,
    pub width: f64,
}

impl EdgeView {
    #[must_use]
    pub fn new(
        source: String,
        target: String,
        relation: String,
        confidence: f64,
        context: String,
    ) -> Self {
        Self {
            source,
            target,
            relation,
            confidence,
            context,
            width: edge_width(confidence),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewStats {
    pub total_nodes: usize,
    pub total_edges: usize,
}

fn node_size(confidence: f64) -> f64 {
    (confidence * 20.0).clamp(10.0, 30.0)
}

fn edge_width(confidence: f64) -> f64 {
    (confidence * 3.0).max(1.0)
}

impl GraphView {
    /// Non-persistent projection built straight from extraction artifacts.
    /// Node ids are synthetic and only stable within this one view. Edges
    /// whose endpoints are not among the entities are dropped.
    #[must_use]
    pub fn ephemeral(entities: &[EntityMention], relations: &[RelationTriple]) -> Self {
        let mut nodes = Vec::with_capacity(entities.len());
        let mut ids_by_text: HashMap<&str, String> = HashMap::with_capacity(entities.len());

        for (i, entity) in entities.iter().enumerate() {
            let id = format!("node_{i}");
            ids_by_text.insert(entity.text.as_str(), id.clone());
            nodes.push(NodeView::new(
                id,
                entity.text.clone(),
                entity.label.to_string(),
                entity.confidence,
            ));
        }

        let mut edges = Vec::new();
        for relation in relations {
            let (Some(source), Some(target)) = (
                ids_by_text.get(relation.subject.as_str()),
                ids_by_text.get(relation.object.as_str()),
            ) else {
                continue;
            };
            edges.push(EdgeView::new(
                source.clone(),
                target.clone(),
                relation.predicate.to_string(),
                relation.confidence,
                relation.context.clone(),
            ));
        }

        let stats = ViewStats {
            total_nodes: nodes.len(),
            total_edges: edges.len(),
        };
        Self { nodes, edges, stats }
    }
}

/// Aggregate counts over stored nodes and edges, optionally scoped to one
/// document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_entities: u64,
    pub total_relations: u64,
    pub entity_types: Vec<String>,
    pub relation_types: Vec<String>,
}

/// One step of a path: paths alternate node and relationship segments,
/// starting and ending with a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathSegment {
    Node {
        id: String,
        text: String,
        label: String,
    },
    Relationship {
        relation: String,
        confidence: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphPath {
    pub segments: Vec<PathSegment>,
}
