use std::sync::Arc;

use cartograph_core::{
    EntityExtractor, ExtractionPipeline, GraphStore, HttpNerModel, MemoryGraph, Neo4jGraph,
    NerModel,
};

use crate::config::{GraphBackendChoice, ServerConfig};

/// Application state shared across all requests.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ExtractionPipeline>,
}

impl AppState {
    /// Wires the pipeline up from configuration. Unreachable collaborators
    /// degrade with a warning instead of refusing to start: no NER service
    /// means rule-based extraction, no graph backend means ephemeral views.
    pub async fn new(config: &ServerConfig) -> Self {
        let model: Option<Arc<dyn NerModel>> = match &config.ner_url {
            Some(url) => match HttpNerModel::connect(url).await {
                Ok(model) => {
                    tracing::info!(url = %url, "using model-based entity extraction");
                    Some(Arc::new(model))
                }
                Err(err) => {
                    tracing::warn!(
                        url = %url,
                        error = %err,
                        "NER model unavailable, extraction will be rule-based"
                    );
                    None
                }
            },
            None => None,
        };

        let store = match config.backend {
            GraphBackendChoice::Neo4j => {
                match Neo4jGraph::connect(
                    &config.neo4j_uri,
                    &config.neo4j_user,
                    &config.neo4j_password,
                )
                .await
                {
                    Ok(backend) => GraphStore::new(Arc::new(backend)),
                    Err(err) => {
                        tracing::warn!(
                            uri = %config.neo4j_uri,
                            error = %err,
                            "neo4j unreachable, graphs will not be persisted"
                        );
                        GraphStore::detached()
                    }
                }
            }
            GraphBackendChoice::Memory => GraphStore::new(Arc::new(MemoryGraph::new())),
            GraphBackendChoice::Detached => GraphStore::detached(),
        };

        Self::with_pipeline(ExtractionPipeline::new(EntityExtractor::new(model), store))
    }

    #[must_use]
    pub fn with_pipeline(pipeline: ExtractionPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}
