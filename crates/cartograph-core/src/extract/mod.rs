mod entities;
mod lexicon;
mod merger;
mod model;
mod normalizer;
mod pipeline;
mod relations;

pub use entities::{EntityExtractor, EntityStrategy, RuleBasedExtractor};
pub use merger::EntityMerger;
pub use model::{Annotation, HttpNerModel, ModelError, ModelResult, NerModel};
pub use normalizer::TextNormalizer;
pub use pipeline::{ExtractionPipeline, PipelineError, PipelineOutput, PipelineResult};
pub use relations::{RelationExtractor, dedupe_relations};
