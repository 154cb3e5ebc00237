//! OpenAI-compatible LLM client.
//!
//! Works with any endpoint that speaks the OpenAI chat-completions and
//! embeddings APIs. `api_base` is the versioned root the resource paths hang
//! off, e.g. `https://api.openai.com/v1` or Gemini's
//! `https://generativelanguage.googleapis.com/v1beta/openai`.

use crate::config::LlmConfig;
use crate::embedding::Embedder;
use crate::error::{Result, SyllabusError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Message role in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Anything that turns a prompt into generated text.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for a single user prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Name of the underlying model.
    fn model_name(&self) -> &str;
}

/// Request body for chat completion.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Response from chat completion.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

/// OpenAI API error response.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Response from an LLM call including metadata.
#[derive(Debug)]
pub struct LlmResponse {
    /// The generated content.
    pub content: String,
    /// Token usage (if available).
    pub usage: Option<TokenUsage>,
}

#[derive(Debug)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// OpenAI-compatible LLM client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{}/{}", base, path)
    }

    /// POST a JSON body and return the successful response body.
    async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<String> {
        let url = self.endpoint(path);
        debug!(%url, "sending request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
                return Err(SyllabusError::LlmApi(format!(
                    "API error ({}): {}",
                    status, api_error.error.message
                )));
            }
            return Err(SyllabusError::LlmApi(format!(
                "Request failed ({}): {}",
                status, body
            )));
        }

        Ok(body)
    }

    /// Send a chat completion request.
    pub async fn chat(&self, messages: Vec<Message>) -> Result<LlmResponse> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        };

        let body = self.post_json("chat/completions", &request).await?;
        let completion: ChatCompletionResponse = serde_json::from_str(&body)?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SyllabusError::LlmApi("No choices in response".to_string()))?;

        let usage = completion.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        if let Some(u) = &usage {
            debug!(
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "chat completion usage"
            );
        }

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            usage,
        })
    }

    /// Convenience method: single user message with optional system prompt.
    pub async fn complete(&self, system: Option<&str>, user: &str) -> Result<String> {
        let mut messages = Vec::new();

        if let Some(sys) = system {
            messages.push(Message::system(sys));
        }
        messages.push(Message::user(user));

        let response = self.chat(messages).await?;
        Ok(response.content)
    }

    /// Embed a batch of texts with the configured embedding model.
    pub async fn embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.config.embedding_model,
            input: texts,
        };

        let body = self.post_json("embeddings", &request).await?;
        let response: EmbeddingResponse = serde_json::from_str(&body)
            .map_err(|e| SyllabusError::Embedding(format!("invalid embeddings response: {}", e)))?;

        order_embeddings(response.data, texts.len())
    }

    /// Test connectivity to the API.
    pub async fn test_connection(&self) -> Result<()> {
        let messages = vec![Message::user("Say 'hello' and nothing else.")];

        let response = self.chat(messages).await?;

        if response.content.to_lowercase().contains("hello") {
            Ok(())
        } else {
            Err(SyllabusError::LlmApi(format!(
                "Unexpected response: {}",
                response.content
            )))
        }
    }
}

/// Put embeddings back in input order and check nothing went missing.
fn order_embeddings(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f32>>> {
    if data.len() != expected {
        return Err(SyllabusError::Embedding(format!(
            "expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }

    if data.iter().all(|d| d.index.is_some()) {
        data.sort_by_key(|d| d.index);
    }

    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl Generator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(None, prompt).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Embedder for LlmClient {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.embeddings(texts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_serialize_with_lowercase_roles() {
        let turns = [
            Message::system("Answer from the syllabus context only."),
            Message::user("Which unit covers corrosion?"),
        ];
        let json = serde_json::to_value(&turns).unwrap();

        assert_eq!(json[0]["role"], "system");
        assert_eq!(json[1]["role"], "user");
        assert_eq!(json[1]["content"], "Which unit covers corrosion?");
    }

    #[test]
    fn test_endpoint_construction() {
        let config = LlmConfig {
            api_base: "https://api.openai.com/v1/".to_string(),
            api_key: "test".to_string(),
            model: "gpt-4o-mini".to_string(),
            ..Default::default()
        };
        let client = LlmClient::new(config);
        assert_eq!(
            client.endpoint("chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            client.endpoint("embeddings"),
            "https://api.openai.com/v1/embeddings"
        );
    }

    #[test]
    fn test_endpoint_on_gemini_openai_base() {
        let client = LlmClient::new(LlmConfig {
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            ..Default::default()
        });
        assert_eq!(
            client.endpoint("chat/completions"),
            "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
        );
        assert_eq!(
            client.endpoint("embeddings"),
            "https://generativelanguage.googleapis.com/v1beta/openai/embeddings"
        );
    }

    #[test]
    fn test_order_embeddings_by_index() {
        let data = vec![
            EmbeddingData {
                embedding: vec![2.0],
                index: Some(1),
            },
            EmbeddingData {
                embedding: vec![1.0],
                index: Some(0),
            },
        ];
        let ordered = order_embeddings(data, 2).unwrap();
        assert_eq!(ordered, vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn test_order_embeddings_rejects_missing() {
        let data = vec![EmbeddingData {
            embedding: vec![1.0],
            index: None,
        }];
        assert!(matches!(
            order_embeddings(data, 2),
            Err(SyllabusError::Embedding(_))
        ));
    }

    #[test]
    fn test_model_name_reports_configured_model() {
        let client = LlmClient::new(LlmConfig {
            model: "gemini-1.5-pro-002".to_string(),
            ..Default::default()
        });
        assert_eq!(Generator::model_name(&client), "gemini-1.5-pro-002");
    }
}
