/// Which graph backend the server should wire up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphBackendChoice {
    Neo4j,
    Memory,
    Detached,
}

/// Server configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub backend: GraphBackendChoice,
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub ner_url: Option<String>,
}

impl ServerConfig {
    /// Unset variables fall back to local defaults. The backend defaults to
    /// neo4j when a URI is configured and to the in-process store otherwise.
    #[must_use]
    pub fn from_env() -> Self {
        let neo4j_uri = std::env::var("CARTOGRAPH_NEO4J_URI").ok();
        let backend = match std::env::var("CARTOGRAPH_GRAPH").as_deref() {
            Ok("neo4j") => GraphBackendChoice::Neo4j,
            Ok("memory") => GraphBackendChoice::Memory,
            Ok("none") => GraphBackendChoice::Detached,
            _ => {
                if neo4j_uri.is_some() {
                    GraphBackendChoice::Neo4j
                } else {
                    GraphBackendChoice::Memory
                }
            }
        };

        Self {
            bind_addr: std::env::var("CARTOGRAPH_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            backend,
            neo4j_uri: neo4j_uri.unwrap_or_else(|| "bolt://localhost:7687".to_string()),
            neo4j_user: std::env::var("CARTOGRAPH_NEO4J_USER")
                .unwrap_or_else(|_| "neo4j".to_string()),
            neo4j_password: std::env::var("CARTOGRAPH_NEO4J_PASSWORD")
                .unwrap_or_else(|_| "password".to_string()),
            ner_url: std::env::var("CARTOGRAPH_NER_URL").ok(),
        }
    }
}
