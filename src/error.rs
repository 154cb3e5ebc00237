//! Error types for syllabus-buddy.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, SyllabusError>;

/// Errors that can occur while answering or evaluating syllabus queries.
#[derive(Error, Debug)]
pub enum SyllabusError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The question was empty or whitespace.
    #[error("Please enter a query.")]
    EmptyQuery,

    /// The department code or label is not one of the known departments.
    #[error("Unknown department '{0}'")]
    UnknownDepartment(String),

    /// The department's vector store has not been built.
    #[error("Vector store not found at '{0}'. Run 'ingest' for this department first.")]
    StoreNotFound(PathBuf),

    /// The documents directory for ingestion does not exist.
    #[error("Documents path '{0}' does not exist or is not a directory")]
    InvalidDocumentsPath(PathBuf),

    /// An embedding does not match the store's dimension.
    #[error("Embedding dimension mismatch: store has {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The store holds vectors from a different embedding model.
    #[error("Store was built with '{store}', not '{configured}'. Re-run with --reset.")]
    EmbeddingModelMismatch { store: String, configured: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// LLM API error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// LLM response parsing error.
    #[error("Failed to parse LLM response: {0}")]
    LlmParse(String),

    /// Embedding API error.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyllabusError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for SyllabusError {
    fn from(err: reqwest::Error) -> Self {
        SyllabusError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for SyllabusError {
    fn from(err: serde_json::Error) -> Self {
        SyllabusError::LlmParse(err.to_string())
    }
}
