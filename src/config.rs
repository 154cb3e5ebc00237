//! Configuration for syllabus-buddy.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.
//! A `.env` file in the working directory is read before the environment.

use crate::error::{Result, SyllabusError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Versioned root of the OpenAI-compatible API, e.g.
    /// `https://generativelanguage.googleapis.com/v1beta/openai`
    pub api_base: String,

    /// API key for authentication
    pub api_key: String,

    /// Model that answers syllabus questions
    pub model: String,

    /// Model used as judge by the evaluation metrics
    #[serde(default = "default_judge_model")]
    pub judge_model: String,

    /// Model used to embed chunks and queries
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Maximum tokens for response (optional)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for generation (optional)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_judge_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.0
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            api_key: String::new(),
            model: "gemini-1.5-pro-002".to_string(),
            judge_model: default_judge_model(),
            embedding_model: default_embedding_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl LlmConfig {
    /// Copy of this config that talks to the judge model instead.
    pub fn for_judge(&self) -> Self {
        Self {
            model: self.judge_model.clone(),
            ..self.clone()
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory prefix; a department store lives at `<prefix><code>`.
    pub prefix: String,

    /// Number of chunks retrieved per query.
    pub top_k: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            prefix: "chromadb_".to_string(),
            top_k: 5,
        }
    }
}

/// Web UI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".to_string(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM settings
    pub llm: LlmConfig,
    /// Vector store settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Web UI settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    llm: Option<LlmFileSection>,
    store: Option<StoreFileSection>,
    server: Option<ServerFileSection>,
}

#[derive(Debug, Deserialize)]
struct LlmFileSection {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    judge_model: Option<String>,
    embedding_model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct StoreFileSection {
    prefix: Option<String>,
    top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ServerFileSection {
    bind: Option<String>,
}

impl Config {
    /// Load configuration from `.env`, environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (LLM_API_BASE, LLM_API_KEY, LLM_MODEL, ...)
    /// 2. Config file (~/.config/syllabus-buddy/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    /// Override fields from a variable lookup.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(api_base) = var("LLM_API_BASE") {
            self.llm.api_base = api_base;
        }
        if let Some(api_key) = var("LLM_API_KEY") {
            self.llm.api_key = api_key;
        }
        if let Some(model) = var("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(model) = var("LLM_JUDGE_MODEL") {
            self.llm.judge_model = model;
        }
        if let Some(model) = var("LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = model;
        }
        if let Some(tokens) = var("LLM_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.llm.max_tokens = tokens;
        }
        if let Some(temp) = var("LLM_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.llm.temperature = temp;
        }
        if let Some(prefix) = var("SYLLABUS_STORE_PREFIX") {
            self.store.prefix = prefix;
        }
        if let Some(top_k) = var("SYLLABUS_TOP_K").and_then(|v| v.parse().ok()) {
            self.store.top_k = top_k;
        }
        if let Some(bind) = var("SYLLABUS_BIND") {
            self.server.bind = bind;
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SyllabusError::io(path, e))?;
        Self::from_yaml(&content)
    }

    fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| SyllabusError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(llm) = file_config.llm {
            if let Some(api_base) = llm.api_base {
                config.llm.api_base = api_base;
            }
            if let Some(api_key) = llm.api_key {
                config.llm.api_key = api_key;
            }
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            if let Some(model) = llm.judge_model {
                config.llm.judge_model = model;
            }
            if let Some(model) = llm.embedding_model {
                config.llm.embedding_model = model;
            }
            if let Some(max_tokens) = llm.max_tokens {
                config.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                config.llm.temperature = temperature;
            }
        }

        if let Some(store) = file_config.store {
            if let Some(prefix) = store.prefix {
                config.store.prefix = prefix;
            }
            if let Some(top_k) = store.top_k {
                config.store.top_k = top_k;
            }
        }

        if let Some(server) = file_config.server {
            if let Some(bind) = server.bind {
                config.server.bind = bind;
            }
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "syllabus-buddy")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_base.is_empty() {
            return Err(SyllabusError::Config(
                "LLM API base URL is required. Set LLM_API_BASE environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.api_key.is_empty() {
            return Err(SyllabusError::Config(
                "LLM API key is required. Set LLM_API_KEY environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.model.is_empty() {
            return Err(SyllabusError::Config(
                "LLM model is required. Set LLM_MODEL environment variable or add to config file."
                    .to_string(),
            ));
        }

        if self.store.top_k == 0 {
            return Err(SyllabusError::InvalidConfig(
                "store.top_k must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
