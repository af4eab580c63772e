use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    #[error("Model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid model endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

pub type ModelResult<T> = Result<T, ModelError>;

/// A labeled span returned by an external NER model. Offsets are character
/// offsets into the submitted text, `end` exclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// Capability to annotate text with named entities.
#[async_trait::async_trait]
pub trait NerModel: Send + Sync {
    async fn annotate(&self, text: &str) -> ModelResult<Vec<Annotation>>;
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for a remote NER service speaking a small JSON protocol:
/// `POST /annotate` with `{"text": ...}` returns `{"entities": [...]}`.
pub struct HttpNerModel {
    client: reqwest::Client,
    annotate_url: Url,
    health_url: Url,
}

#[derive(Debug, Serialize)]
struct AnnotateRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    entities: Vec<Annotation>,
}

impl HttpNerModel {
    /// Builds a client for the service at `base_url` and probes its health
    /// endpoint once. An unreachable service surfaces here, at construction,
    /// so the caller can decide to run rule-based instead.
    pub async fn connect(base_url: &str) -> ModelResult<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let model = Self {
            annotate_url: base.join("annotate")?,
            health_url: base.join("health")?,
            client,
        };
        model.ping().await?;
        Ok(model)
    }

    async fn ping(&self) -> ModelResult<()> {
        let response = self.client.get(self.health_url.clone()).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ModelError::Unavailable(format!(
                "health check returned {}",
                response.status()
            )))
        }
    }
}

#[async_trait::async_trait]
impl NerModel for HttpNerModel {
    async fn annotate(&self, text: &str) -> ModelResult<Vec<Annotation>> {
        let response = self
            .client
            .post(self.annotate_url.clone())
            .json(&AnnotateRequest { text })
            .send()
            .await?
            .error_for_status()?;

        let body: AnnotateResponse = response.json().await?;
        Ok(body.entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let result = HttpNerModel::connect("not a url").await;
        assert!(matches!(result, Err(ModelError::Endpoint(_))));
    }
}
