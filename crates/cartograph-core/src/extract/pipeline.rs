use thiserror::Error;

use super::entities::{EntityExtractor, EntityStrategy};
use super::merger::EntityMerger;
use super::model::ModelError;
use super::normalizer::TextNormalizer;
use super::relations::{RelationExtractor, dedupe_relations};
use crate::entity::EntityMention;
use crate::graph::{BuildMode, GraphStore, GraphView};
use crate::relation::RelationTriple;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Entity extraction failed: {0}")]
    Extraction(#[from] ModelError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Everything produced for one document: the deduplicated extraction
/// artifacts, the graph projection, and how that projection was built.
#[derive(Debug)]
pub struct PipelineOutput {
    pub entities: Vec<EntityMention>,
    pub relations: Vec<RelationTriple>,
    pub graph: GraphView,
    pub mode: BuildMode,
}

/// Runs the full extraction chain for a document: normalize, extract
/// mentions, merge duplicates, extract relations, dedupe, then hand the
/// artifacts to the graph store.
pub struct ExtractionPipeline {
    normalizer: TextNormalizer,
    extractor: EntityExtractor,
    merger: EntityMerger,
    relations: RelationExtractor,
    store: GraphStore,
}

impl ExtractionPipeline {
    #[must_use]
    pub fn new(extractor: EntityExtractor, store: GraphStore) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            extractor,
            merger: EntityMerger::new(),
            relations: RelationExtractor::new(),
            store,
        }
    }

    #[must_use]
    pub fn strategy(&self) -> EntityStrategy {
        self.extractor.strategy()
    }

    #[must_use]
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Extraction stages only, no graph writes. Relation extraction sees the
    /// merged entities and the same normalized text.
    pub async fn extract(
        &self,
        text: &str,
    ) -> PipelineResult<(Vec<EntityMention>, Vec<RelationTriple>)> {
        let normalized = self.normalizer.normalize(text);
        let mentions = self.extractor.extract(&normalized).await?;
        let entities = self.merger.merge(mentions);
        let candidates = self.relations.extract(&normalized, &entities);
        let relations = dedupe_relations(candidates);
        Ok((entities, relations))
    }

    /// Full run for one document. Extraction failures propagate; graph
    /// failures do not, they degrade the build to an ephemeral view.
    pub async fn process(&self, document_id: &str, text: &str) -> PipelineResult<PipelineOutput> {
        let (entities, relations) = self.extract(text).await?;
        tracing::debug!(
            document_id,
            entities = entities.len(),
            relations = relations.len(),
            "extraction complete"
        );

        let report = self.store.build(document_id, &entities, &relations).await;
        Ok(PipelineOutput {
            entities,
            relations,
            graph: report.graph,
            mode: report.mode,
        })
    }
}
