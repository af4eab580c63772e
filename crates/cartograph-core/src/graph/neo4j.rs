use neo4rs::{query, Graph};
use uuid::Uuid;

use super::backend::{GraphBackend, GraphError, GraphNode, GraphResult, MAX_PATHS, MAX_PATH_DEPTH};
use super::view::{EdgeView, GraphPath, GraphStats, GraphView, NodeView, PathSegment, ViewStats};
use crate::entity::EntityMention;
use crate::relation::RelationTriple;

/// Neo4j-backed graph storage. Merge semantics live in the Cypher MERGE
/// statements, so concurrent upserts of the same key are serialized by the
/// server.
pub struct Neo4jGraph {
    graph: Graph,
}

impl Neo4jGraph {
    /// Connects and runs a probe query so a bad address or credentials
    /// surface here rather than on the first document.
    pub async fn connect(uri: &str, user: &str, password: &str) -> GraphResult<Self> {
        let graph = Graph::new(uri, user, password).await?;
        let mut rows = graph.execute(query("RETURN 1 AS ok")).await?;
        rows.next().await?;
        tracing::info!(uri, "connected to neo4j");
        Ok(Self { graph })
    }
}

#[async_trait::async_trait]
impl GraphBackend for Neo4jGraph {
    async fn upsert_entity(
        &self,
        document_id: &str,
        entity: &EntityMention,
    ) -> GraphResult<String> {
        let candidate_id = Uuid::new_v4().to_string();
        let mut rows = self
            .graph
            .execute(
                query(
                    "MERGE (n:Entity {text: $text, document_id: $document_id}) \
                     ON CREATE SET n.id = $id, n.label = $label, \
                         n.confidence = $confidence, n.created_at = datetime() \
                     ON MATCH SET n.label = \
                         CASE WHEN $confidence > n.confidence THEN $label ELSE n.label END, \
                         n.confidence = \
                         CASE WHEN $confidence > n.confidence THEN $confidence ELSE n.confidence END \
                     RETURN n.id AS id",
                )
                .param("text", entity.text.clone())
                .param("document_id", document_id.to_string())
                .param("id", candidate_id)
                .param("label", entity.label.to_string())
                .param("confidence", entity.confidence),
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Err(GraphError::Malformed(
                "entity upsert returned no row".to_string(),
            ));
        };
        row.get::<String>("id").map_err(malformed)
    }

    async fn upsert_relation(
        &self,
        document_id: &str,
        source_id: &str,
        target_id: &str,
        relation: &RelationTriple,
    ) -> GraphResult<()> {
        self.graph
            .run(
                query(
                    "MATCH (s:Entity {id: $source_id}), (o:Entity {id: $target_id}) \
                     MERGE (s)-[r:RELATION {type: $predicate, document_id: $document_id}]->(o) \
                     ON CREATE SET r.confidence = $confidence, r.context = $context, \
                         r.created_at = datetime() \
                     ON MATCH SET r.context = \
                         CASE WHEN $confidence > r.confidence THEN $context ELSE r.context END, \
                         r.confidence = \
                         CASE WHEN $confidence > r.confidence THEN $confidence ELSE r.confidence END",
                )
                .param("source_id", source_id.to_string())
                .param("target_id", target_id.to_string())
                .param("predicate", relation.predicate.to_string())
                .param("document_id", document_id.to_string())
                .param("confidence", relation.confidence)
                .param("context", relation.context.clone()),
            )
            .await?;
        Ok(())
    }

    async fn document_view(&self, document_id: &str) -> GraphResult<GraphView> {
        let mut nodes = Vec::new();
        let mut rows = self
            .graph
            .execute(
                query(
                    "MATCH (n:Entity {document_id: $document_id}) \
                     RETURN n.id AS id, n.text AS text, n.label AS label, \
                            n.confidence AS confidence",
                )
                .param("document_id", document_id.to_string()),
            )
            .await?;
        while let Some(row) = rows.next().await? {
            nodes.push(NodeView::new(
                row.get::<String>("id").map_err(malformed)?,
                row.get::<String>("text").map_err(malformed)?,
                row.get::<String>("label").map_err(malformed)?,
                row.get::<f64>("confidence").map_err(malformed)?,
            ));
        }

        let mut edges = Vec::new();
        let mut rows = self
            .graph
            .execute(
                query(
                    "MATCH (s:Entity {document_id: $document_id})\
                     -[r:RELATION {document_id: $document_id}]->\
                     (o:Entity {document_id: $document_id}) \
                     RETURN s.id AS source, o.id AS target, r.type AS relation, \
                            r.confidence AS confidence, r.context AS context",
                )
                .param("document_id", document_id.to_string()),
            )
            .await?;
        while let Some(row) = rows.next().await? {
            edges.push(EdgeView::new(
                row.get::<String>("source").map_err(malformed)?,
                row.get::<String>("target").map_err(malformed)?,
                row.get::<String>("relation").map_err(malformed)?,
                row.get::<f64>("confidence").map_err(malformed)?,
                row.get::<String>("context").map_err(malformed)?,
            ));
        }

        let stats = ViewStats {
            total_nodes: nodes.len(),
            total_edges: edges.len(),
        };
        Ok(GraphView { nodes, edges, stats })
    }

    async fn search(&self, needle: &str, limit: usize) -> GraphResult<Vec<GraphNode>> {
        let mut rows = self
            .graph
            .execute(
                query(
                    "MATCH (n:Entity) \
                     WHERE toLower(n.text) CONTAINS toLower($needle) \
                     RETURN n.id AS id, n.text AS text, n.label AS label, \
                            n.confidence AS confidence, n.document_id AS document_id \
                     ORDER BY n.confidence DESC \
                     LIMIT $limit",
                )
                .param("needle", needle.to_string())
                .param("limit", i64::try_from(limit).unwrap_or(i64::MAX)),
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            let label: String = row.get("label").map_err(malformed)?;
            results.push(GraphNode {
                id: row.get::<String>("id").map_err(malformed)?,
                text: row.get::<String>("text").map_err(malformed)?,
                label: label.parse().map_err(malformed)?,
                confidence: row.get::<f64>("confidence").map_err(malformed)?,
                document_id: row.get::<String>("document_id").map_err(malformed)?,
            });
        }
        Ok(results)
    }

    async fn shortest_paths(
        &self,
        start: &str,
        end: &str,
        max_depth: usize,
    ) -> GraphResult<Vec<GraphPath>> {
        // Variable-length bounds cannot be parameterized in Cypher, so the
        // clamped depth is inlined into the statement.
        let depth = max_depth.clamp(1, MAX_PATH_DEPTH);
        let statement = format!(
            "MATCH p = shortestPath((a:Entity {{text: $start}})-[*1..{depth}]-(b:Entity {{text: $end}})) \
             RETURN [x IN nodes(p) | x.id] AS node_ids, \
                    [x IN nodes(p) | x.text] AS node_texts, \
                    [x IN nodes(p) | x.label] AS node_labels, \
                    [x IN relationships(p) | x.type] AS relation_types, \
                    [x IN relationships(p) | x.confidence] AS relation_confidences \
             LIMIT {MAX_PATHS}"
        );

        let mut rows = self
            .graph
            .execute(
                query(&statement)
                    .param("start", start.to_string())
                    .param("end", end.to_string()),
            )
            .await?;

        let mut paths = Vec::new();
        while let Some(row) = rows.next().await? {
            let node_ids: Vec<String> = row.get("node_ids").map_err(malformed)?;
            let node_texts: Vec<String> = row.get("node_texts").map_err(malformed)?;
            let node_labels: Vec<String> = row.get("node_labels").map_err(malformed)?;
            let relation_types: Vec<String> = row.get("relation_types").map_err(malformed)?;
            let relation_confidences: Vec<f64> =
                row.get("relation_confidences").map_err(malformed)?;

            if node_texts.len() != node_ids.len()
                || node_labels.len() != node_ids.len()
                || relation_types.len() + 1 != node_ids.len()
                || relation_confidences.len() != relation_types.len()
            {
                return Err(GraphError::Malformed(
                    "path columns disagree in length".to_string(),
                ));
            }

            let mut segments = Vec::with_capacity(node_ids.len() * 2);
            for i in 0..node_ids.len() {
                if i > 0 {
                    segments.push(PathSegment::Relationship {
                        relation: relation_types[i - 1].clone(),
                        confidence: relation_confidences[i - 1],
                    });
                }
                segments.push(PathSegment::Node {
                    id: node_ids[i].clone(),
                    text: node_texts[i].clone(),
                    label: node_labels[i].clone(),
                });
            }
            paths.push(GraphPath { segments });
        }
        Ok(paths)
    }

    async fn stats(&self, document_id: Option<&str>) -> GraphResult<GraphStats> {
        let scoped = query(
            "MATCH (n:Entity {document_id: $document_id}) \
             OPTIONAL MATCH (n)-[r:RELATION {document_id: $document_id}]->(m) \
             RETURN count(DISTINCT n) AS entities, count(r) AS relations, \
                    collect(DISTINCT n.label) AS entity_types, \
                    collect(DISTINCT r.type) AS relation_types",
        );
        let global = query(
            "MATCH (n:Entity) \
             OPTIONAL MATCH (n)-[r:RELATION]->(m) \
             RETURN count(DISTINCT n) AS entities, count(r) AS relations, \
                    collect(DISTINCT n.label) AS entity_types, \
                    collect(DISTINCT r.type) AS relation_types",
        );

        let statement = match document_id {
            Some(id) => scoped.param("document_id", id.to_string()),
            None => global,
        };

        let mut rows = self.graph.execute(statement).await?;
        let Some(row) = rows.next().await? else {
            return Ok(GraphStats::default());
        };

        let entities: i64 = row.get("entities").map_err(malformed)?;
        let relations: i64 = row.get("relations").map_err(malformed)?;
        Ok(GraphStats {
            total_entities: u64::try_from(entities).unwrap_or_default(),
            total_relations: u64::try_from(relations).unwrap_or_default(),
            entity_types: row.get("entity_types").map_err(malformed)?,
            relation_types: row.get("relation_types").map_err(malformed)?,
        })
    }
}

fn malformed(err: impl std::fmt::Display) -> GraphError {
    GraphError::Malformed(err.to_string())
}
