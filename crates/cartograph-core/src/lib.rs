pub mod entity;
pub mod error;
pub mod extract;
pub mod graph;
pub mod relation;

pub use entity::{EntityLabel, EntityMention};
pub use error::{Error, Result};
pub use extract::{
    Annotation, EntityExtractor, EntityMerger, EntityStrategy, ExtractionPipeline, HttpNerModel,
    ModelError, ModelResult, NerModel, PipelineError, PipelineOutput, PipelineResult,
    RelationExtractor, RuleBasedExtractor, TextNormalizer,
};
pub use graph::{
    BuildMode, BuildReport, EdgeView, GraphBackend, GraphError, GraphNode, GraphPath, GraphResult,
    GraphStats, GraphStore, GraphView, MemoryGraph, Neo4jGraph, NodeView, PathSegment, ViewStats,
};
pub use relation::{RelationLabel, RelationTriple};
