use std::collections::{BTreeSet, HashMap};

use dashmap::DashMap;
use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};
use uuid::Uuid;

use super::backend::{GraphBackend, GraphNode, GraphResult, MAX_PATHS, MAX_PATH_DEPTH};
use super::view::{EdgeView, GraphPath, GraphStats, GraphView, NodeView, PathSegment, ViewStats};
use crate::entity::EntityMention;
use crate::relation::{RelationLabel, RelationTriple};

/// In-process graph backend, used when no Neo4j server is configured.
///
/// Documents map to independent entries, so upserts for one document are
/// serialized by its shard lock while other documents proceed in parallel.
/// Insertion order is preserved for stable projections.
#[derive(Default)]
pub struct MemoryGraph {
    documents: DashMap<String, DocumentGraph>,
}

#[derive(Default)]
struct DocumentGraph {
    nodes: Vec<GraphNode>,
    ids_by_text: HashMap<String, usize>,
    edges: Vec<StoredEdge>,
    edge_index: HashMap<(String, String, RelationLabel), usize>,
}

struct StoredEdge {
    source_id: String,
    target_id: String,
    predicate: RelationLabel,
    confidence: f64,
    context: String,
}

impl MemoryGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl GraphBackend for MemoryGraph {
    async fn upsert_entity(
        &self,
        document_id: &str,
        entity: &EntityMention,
    ) -> GraphResult<String> {
        let mut entry = self.documents.entry(document_id.to_string()).or_default();
        let doc = entry.value_mut();

        if let Some(&index) = doc.ids_by_text.get(&entity.text) {
            let stored = &mut doc.nodes[index];
            if entity.confidence > stored.confidence {
                stored.confidence = entity.confidence;
                stored.label = entity.label;
            }
            return Ok(stored.id.clone());
        }

        let node = GraphNode {
            id: Uuid::new_v4().to_string(),
            text: entity.text.clone(),
            label: entity.label,
            confidence: entity.confidence,
            document_id: document_id.to_string(),
        };
        let id = node.id.clone();
        doc.ids_by_text.insert(entity.text.clone(), doc.nodes.len());
        doc.nodes.push(node);
        Ok(id)
    }

    async fn upsert_relation(
        &self,
        document_id: &str,
        source_id: &str,
        target_id: &str,
        relation: &RelationTriple,
    ) -> GraphResult<()> {
        let mut entry = self.documents.entry(document_id.to_string()).or_default();
        let doc = entry.value_mut();

        let key = (
            source_id.to_string(),
            target_id.to_string(),
            relation.predicate,
        );
        if let Some(&index) = doc.edge_index.get(&key) {
            let stored = &mut doc.edges[index];
            if relation.confidence > stored.confidence {
                stored.confidence = relation.confidence;
                stored.context = relation.context.clone();
            }
            return Ok(());
        }

        doc.edge_index.insert(key, doc.edges.len());
        doc.edges.push(StoredEdge {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            predicate: relation.predicate,
            confidence: relation.confidence,
            context: relation.context.clone(),
        });
        Ok(())
    }

    async fn document_view(&self, document_id: &str) -> GraphResult<GraphView> {
        let Some(doc) = self.documents.get(document_id) else {
            return Ok(GraphView::default());
        };

        let nodes: Vec<NodeView> = doc
            .nodes
            .iter()
            .map(|node| {
                NodeView::new(
                    node.id.clone(),
                    node.text.clone(),
                    node.label.to_string(),
                    node.confidence,
                )
            })
            .collect();

        let edges: Vec<EdgeView> = doc
            .edges
            .iter()
            .map(|edge| {
                EdgeView::new(
                    edge.source_id.clone(),
                    edge.target_id.clone(),
                    edge.predicate.to_string(),
                    edge.confidence,
                    edge.context.clone(),
                )
            })
            .collect();

        let stats = ViewStats {
            total_nodes: nodes.len(),
            total_edges: edges.len(),
        };
        Ok(GraphView { nodes, edges, stats })
    }

    async fn search(&self, query: &str, limit: usize) -> GraphResult<Vec<GraphNode>> {
        let needle = query.to_lowercase();
        let mut matches: Vec<GraphNode> = Vec::new();

        for entry in &self.documents {
            for node in &entry.value().nodes {
                if node.text.to_lowercase().contains(&needle) {
                    matches.push(node.clone());
                }
            }
        }

        matches.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.text.cmp(&b.text))
        });
        matches.truncate(limit);
        Ok(matches)
    }

    async fn shortest_paths(
        &self,
        start: &str,
        end: &str,
        max_depth: usize,
    ) -> GraphResult<Vec<GraphPath>> {
        let max_depth = max_depth.clamp(1, MAX_PATH_DEPTH);

        // Snapshot the whole store into one undirected graph. Node ids are
        // globally unique, so documents can share the index map.
        let mut graph: UnGraph<PathNode, PathEdge> = UnGraph::new_undirected();
        let mut indices: HashMap<String, NodeIndex> = HashMap::new();
        let mut starts: Vec<NodeIndex> = Vec::new();
        let mut ends: Vec<NodeIndex> = Vec::new();

        for entry in &self.documents {
            for node in &entry.value().nodes {
                let index = graph.add_node(PathNode {
                    id: node.id.clone(),
                    text: node.text.clone(),
                    label: node.label.to_string(),
                });
                indices.insert(node.id.clone(), index);
                if node.text == start {
                    starts.push(index);
                }
                if node.text == end {
                    ends.push(index);
                }
            }
            for edge in &entry.value().edges {
                let (Some(&source), Some(&target)) = (
                    indices.get(&edge.source_id),
                    indices.get(&edge.target_id),
                ) else {
                    continue;
                };
                graph.add_edge(
                    source,
                    target,
                    PathEdge {
                        relation: edge.predicate.to_string(),
                        confidence: edge.confidence,
                    },
                );
            }
        }

        let mut paths = Vec::new();
        'pairs: for &from in &starts {
            for &to in &ends {
                if from == to {
                    continue;
                }
                let Some((hops, steps)) = astar(&graph, from, |n| n == to, |_| 1usize, |_| 0) else {
                    continue;
                };
                if hops > max_depth {
                    continue;
                }
                paths.push(build_path(&graph, &steps));
                if paths.len() == MAX_PATHS {
                    break 'pairs;
                }
            }
        }
        Ok(paths)
    }

    async fn stats(&self, document_id: Option<&str>) -> GraphResult<GraphStats> {
        let mut total_entities = 0u64;
        let mut total_relations = 0u64;
        let mut entity_types = BTreeSet::new();
        let mut relation_types = BTreeSet::new();

        for entry in &self.documents {
            if document_id.is_some_and(|id| id != entry.key()) {
                continue;
            }
            total_entities += entry.value().nodes.len() as u64;
            total_relations += entry.value().edges.len() as u64;
            for node in &entry.value().nodes {
                entity_types.insert(node.label.to_string());
            }
            for edge in &entry.value().edges {
                relation_types.insert(edge.predicate.to_string());
            }
        }

        Ok(GraphStats {
            total_entities,
            total_relations,
            entity_types: entity_types.into_iter().collect(),
            relation_types: relation_types.into_iter().collect(),
        })
    }
}

struct PathNode {
    id: String,
    text: String,
    label: String,
}

struct PathEdge {
    relation: String,
    confidence: f64,
}

fn build_path(graph: &UnGraph<PathNode, PathEdge>, steps: &[NodeIndex]) -> GraphPath {
    let mut segments = Vec::with_capacity(steps.len() * 2);

    for (position, &index) in steps.iter().enumerate() {
        if position > 0 {
            let previous = steps[position - 1];
            if let Some(edge) = graph
                .find_edge(previous, index)
                .and_then(|e| graph.edge_weight(e))
            {
                segments.push(PathSegment::Relationship {
                    relation: edge.relation.clone(),
                    confidence: edge.confidence,
                });
            }
        }
        if let Some(node) = graph.node_weight(index) {
            segments.push(PathSegment::Node {
                id: node.id.clone(),
                text: node.text.clone(),
                label: node.label.clone(),
            });
        }
    }

    GraphPath { segments }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityLabel;

    fn mention(text: &str, label: EntityLabel, confidence: f64) -> EntityMention {
        EntityMention::new(text.to_string(), label, 0, text.chars().count(), confidence)
    }

    fn triple(
        subject: &str,
        predicate: RelationLabel,
        object: &str,
        confidence: f64,
    ) -> RelationTriple {
        RelationTriple::new(
            subject.to_string(),
            predicate,
            object.to_string(),
            confidence,
            format!("{subject}...{object}"),
        )
    }

    #[tokio::test]
    async fn test_upsert_entity_is_idempotent_per_key() {
        let backend = MemoryGraph::new();
        let first = backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Person, 0.6))
            .await
            .unwrap();
        let second = backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Person, 0.6))
            .await
            .unwrap();
        assert_eq!(first, second);

        let view = backend.document_view("doc-1").await.unwrap();
        assert_eq!(view.nodes.len(), 1);
    }

    #[tokio::test]
    async fn test_same_text_different_documents_are_distinct() {
        let backend = MemoryGraph::new();
        let a = backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Person, 0.6))
            .await
            .unwrap();
        let b = backend
            .upsert_entity("doc-2", &mention("张伟", EntityLabel::Person, 0.6))
            .await
            .unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_merge_keeps_max_confidence() {
        let backend = MemoryGraph::new();
        backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Person, 0.8))
            .await
            .unwrap();
        backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Org, 0.5))
            .await
            .unwrap();

        let view = backend.document_view("doc-1").await.unwrap();
        assert!((view.nodes[0].confidence - 0.8).abs() < f64::EPSILON);
        // Lower-confidence upsert does not touch the label either.
        assert_eq!(view.nodes[0].node_type, "PERSON");
    }

    #[tokio::test]
    async fn test_merge_updates_fields_on_strictly_greater_confidence() {
        let backend = MemoryGraph::new();
        backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Person, 0.6))
            .await
            .unwrap();
        backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Org, 0.9))
            .await
            .unwrap();

        let view = backend.document_view("doc-1").await.unwrap();
        assert!((view.nodes[0].confidence - 0.9).abs() < f64::EPSILON);
        assert_eq!(view.nodes[0].node_type, "ORG");
    }

    #[tokio::test]
    async fn test_equal_confidence_does_not_update() {
        let backend = MemoryGraph::new();
        backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Person, 0.6))
            .await
            .unwrap();
        backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Gpe, 0.6))
            .await
            .unwrap();

        let view = backend.document_view("doc-1").await.unwrap();
        assert_eq!(view.nodes[0].node_type, "PERSON");
    }

    #[tokio::test]
    async fn test_edge_merge_follows_confidence() {
        let backend = MemoryGraph::new();
        let s = backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Person, 0.6))
            .await
            .unwrap();
        let t = backend
            .upsert_entity("doc-1", &mention("北京大学", EntityLabel::Org, 0.7))
            .await
            .unwrap();

        backend
            .upsert_relation(
                "doc-1",
                &s,
                &t,
                &triple("张伟", RelationLabel::WorksAt, "北京大学", 0.6),
            )
            .await
            .unwrap();
        backend
            .upsert_relation(
                "doc-1",
                &s,
                &t,
                &triple("张伟", RelationLabel::WorksAt, "北京大学", 0.7),
            )
            .await
            .unwrap();
        backend
            .upsert_relation(
                "doc-1",
                &s,
                &t,
                &triple("张伟", RelationLabel::LocatedIn, "北京大学", 0.6),
            )
            .await
            .unwrap();

        let view = backend.document_view("doc-1").await.unwrap();
        // Same predicate merged, different predicate kept separate.
        assert_eq!(view.edges.len(), 2);
        let works = view
            .edges
            .iter()
            .find(|e| e.relation == "works_at")
            .unwrap();
        assert!((works.confidence - 0.7).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_search_orders_by_confidence() {
        let backend = MemoryGraph::new();
        backend
            .upsert_entity("doc-1", &mention("北京大学", EntityLabel::Org, 0.7))
            .await
            .unwrap();
        backend
            .upsert_entity("doc-2", &mention("北京市", EntityLabel::Gpe, 0.6))
            .await
            .unwrap();
        backend
            .upsert_entity("doc-1", &mention("上海市", EntityLabel::Gpe, 0.6))
            .await
            .unwrap();

        let results = backend.search("北京", 20).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "北京大学");
        assert_eq!(results[1].text, "北京市");

        let capped = backend.search("北京", 1).await.unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[tokio::test]
    async fn test_search_no_match_is_empty() {
        let backend = MemoryGraph::new();
        backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Person, 0.6))
            .await
            .unwrap();
        assert!(backend.search("李明", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shortest_path_two_hops() {
        let backend = MemoryGraph::new();
        let a = backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Person, 0.6))
            .await
            .unwrap();
        let b = backend
            .upsert_entity("doc-1", &mention("北京大学", EntityLabel::Org, 0.7))
            .await
            .unwrap();
        let c = backend
            .upsert_entity("doc-1", &mention("北京市", EntityLabel::Gpe, 0.6))
            .await
            .unwrap();

        backend
            .upsert_relation(
                "doc-1",
                &a,
                &b,
                &triple("张伟", RelationLabel::WorksAt, "北京大学", 0.6),
            )
            .await
            .unwrap();
        backend
            .upsert_relation(
                "doc-1",
                &b,
                &c,
                &triple("北京大学", RelationLabel::LocatedIn, "北京市", 0.6),
            )
            .await
            .unwrap();

        let paths = backend.shortest_paths("张伟", "北京市", 3).await.unwrap();
        assert_eq!(paths.len(), 1);

        let segments = &paths[0].segments;
        assert_eq!(segments.len(), 5);
        assert!(matches!(
            &segments[0],
            PathSegment::Node { text, .. } if text == "张伟"
        ));
        assert!(matches!(
            &segments[1],
            PathSegment::Relationship { relation, .. } if relation == "works_at"
        ));
        assert!(matches!(
            &segments[4],
            PathSegment::Node { text, .. } if text == "北京市"
        ));
    }

    #[tokio::test]
    async fn test_path_depth_limit() {
        let backend = MemoryGraph::new();
        let a = backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Person, 0.6))
            .await
            .unwrap();
        let b = backend
            .upsert_entity("doc-1", &mention("北京大学", EntityLabel::Org, 0.7))
            .await
            .unwrap();
        let c = backend
            .upsert_entity("doc-1", &mention("北京市", EntityLabel::Gpe, 0.6))
            .await
            .unwrap();

        backend
            .upsert_relation(
                "doc-1",
                &a,
                &b,
                &triple("张伟", RelationLabel::WorksAt, "北京大学", 0.6),
            )
            .await
            .unwrap();
        backend
            .upsert_relation(
                "doc-1",
                &b,
                &c,
                &triple("北京大学", RelationLabel::LocatedIn, "北京市", 0.6),
            )
            .await
            .unwrap();

        let paths = backend.shortest_paths("张伟", "北京市", 1).await.unwrap();
        assert!(paths.is_empty());
    }

    #[tokio::test]
    async fn test_paths_traverse_edges_undirected() {
        let backend = MemoryGraph::new();
        let a = backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Person, 0.6))
            .await
            .unwrap();
        let b = backend
            .upsert_entity("doc-1", &mention("北京大学", EntityLabel::Org, 0.7))
            .await
            .unwrap();

        backend
            .upsert_relation(
                "doc-1",
                &a,
                &b,
                &triple("张伟", RelationLabel::WorksAt, "北京大学", 0.6),
            )
            .await
            .unwrap();

        // Query against the edge direction.
        let paths = backend.shortest_paths("北京大学", "张伟", 3).await.unwrap();
        assert_eq!(paths.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_endpoint_has_no_paths() {
        let backend = MemoryGraph::new();
        backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Person, 0.6))
            .await
            .unwrap();
        let paths = backend.shortest_paths("张伟", "李明", 3).await.unwrap();
        assert!(paths.is_empty());
    }

    #[tokio::test]
    async fn test_stats_scoping() {
        let backend = MemoryGraph::new();
        let a = backend
            .upsert_entity("doc-1", &mention("张伟", EntityLabel::Person, 0.6))
            .await
            .unwrap();
        let b = backend
            .upsert_entity("doc-1", &mention("北京大学", EntityLabel::Org, 0.7))
            .await
            .unwrap();
        backend
            .upsert_entity("doc-2", &mention("上海市", EntityLabel::Gpe, 0.6))
            .await
            .unwrap();
        backend
            .upsert_relation(
                "doc-1",
                &a,
                &b,
                &triple("张伟", RelationLabel::WorksAt, "北京大学", 0.6),
            )
            .await
            .unwrap();

        let scoped = backend.stats(Some("doc-1")).await.unwrap();
        assert_eq!(scoped.total_entities, 2);
        assert_eq!(scoped.total_relations, 1);
        assert_eq!(scoped.entity_types, ["ORG", "PERSON"]);
        assert_eq!(scoped.relation_types, ["works_at"]);

        let global = backend.stats(None).await.unwrap();
        assert_eq!(global.total_entities, 3);
        assert_eq!(global.entity_types, ["GPE", "ORG", "PERSON"]);

        let missing = backend.stats(Some("doc-9")).await.unwrap();
        assert_eq!(missing, GraphStats::default());
    }

    #[tokio::test]
    async fn test_document_view_for_unknown_document_is_empty() {
        let backend = MemoryGraph::new();
        let view = backend.document_view("missing").await.unwrap();
        assert!(view.nodes.is_empty());
        assert!(view.edges.is_empty());
    }
}
