//! Shared state for the HTTP layer.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::pipeline::evaluation::{EvaluationPipeline, ModelClient, OpenAiClient};
use crate::pipeline::render::DocumentStore;

/// Shared context for all routes. Cheap to clone.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<EvaluationPipeline>,
    pub store: Arc<DocumentStore>,
}

impl ApiContext {
    pub fn new(config: AppConfig, client: Arc<dyn ModelClient>) -> Self {
        let store = Arc::new(DocumentStore::new(
            config.reports_dir.clone(),
            &config.public_base_url,
        ));
        let pipeline = Arc::new(EvaluationPipeline::from_config(&config, client, store.clone()));
        Self {
            config: Arc::new(config),
            pipeline,
            store,
        }
    }

    /// Production wiring with the OpenAI-compatible client.
    ///
    /// Builds a blocking HTTP client; call outside any async runtime.
    pub fn from_config(config: AppConfig) -> Result<Self, String> {
        let client = OpenAiClient::new(&config.api_base_url, &config.api_key)
            .map_err(|e| e.to_string())?;
        Ok(Self::new(config, Arc::new(client)))
    }
}
