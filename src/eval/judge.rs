//! Judge model used by the evaluation metrics.

use crate::config::LlmConfig;
use crate::error::{Result, SyllabusError};
use crate::llm::{Generator, LlmClient};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// A model that can judge test cases.
///
/// Replies are parsed as JSON. Use [`from_schema`] to turn the returned
/// value into a typed schema.
#[async_trait]
pub trait JudgeModel: Generator {
    /// The model that answers judge prompts.
    fn load_model(&self) -> &dyn Generator;

    /// Generate from outside an async runtime.
    ///
    /// Must not be called from within a tokio runtime.
    fn generate_blocking(&self, prompt: &str) -> Result<String> {
        generate_blocking(self, prompt)
    }

    /// Generate and parse the JSON object in the reply.
    async fn generate_with_schema(&self, prompt: &str) -> Result<Value> {
        let response = self.generate(prompt).await?;
        parse_schema(&response)
    }

    /// Blocking [`JudgeModel::generate_with_schema`].
    fn generate_with_schema_blocking(&self, prompt: &str) -> Result<Value> {
        let response = generate_blocking(self, prompt)?;
        parse_schema(&response)
    }
}

/// Generative model wrapped for use as an LLM judge.
#[derive(Clone)]
pub struct GeminiJudge {
    client: LlmClient,
}

impl GeminiJudge {
    /// Create a judge talking to the configured judge model.
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: LlmClient::new(config.for_judge()),
        }
    }
}

#[async_trait]
impl Generator for GeminiJudge {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client.complete(None, prompt).await
    }

    fn model_name(&self) -> &str {
        &self.client.config().model
    }
}

impl JudgeModel for GeminiJudge {
    fn load_model(&self) -> &dyn Generator {
        &self.client
    }
}

/// Run `model.generate` on a fresh current-thread runtime.
pub fn generate_blocking<G: Generator + ?Sized>(model: &G, prompt: &str) -> Result<String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| SyllabusError::LlmApi(format!("failed to start runtime: {}", e)))?;
    runtime.block_on(model.generate(prompt))
}

/// Deserialize a judge reply value into `T`.
pub fn from_schema<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| SyllabusError::LlmParse(format!("Judge response has the wrong shape: {}", e)))
}

/// Deserialize the JSON object embedded in a model reply.
pub fn parse_schema<T: DeserializeOwned>(response: &str) -> Result<T> {
    let json_str = extract_json(response);
    debug!(len = json_str.len(), "parsing judge response");

    serde_json::from_str(json_str).map_err(|e| {
        SyllabusError::LlmParse(format!(
            "Failed to parse judge response: {}. Response: {}",
            e, response
        ))
    })
}

/// Extract JSON from a reply that may be fenced or surrounded by prose.
pub fn extract_json(response: &str) -> &str {
    let response = response.trim();

    if let Some(rest) = response.strip_prefix("```json") {
        if let Some(end) = rest.rfind("```") {
            return rest[..end].trim();
        }
    }

    if let Some(rest) = response.strip_prefix("```") {
        if let Some(end) = rest.rfind("```") {
            let start = rest.find('\n').map(|n| n + 1).unwrap_or(0);
            if end > start {
                return rest[start..end].trim();
            }
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end > start {
                return &response[start..=end];
            }
        }
    }

    response
}
