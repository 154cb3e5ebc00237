//! Syllabus Buddy - question answering over university syllabus documents.
//!
//! Each department has its own vector store of embedded syllabus chunks. A
//! question is embedded, the closest chunks are retrieved, and a generative
//! model answers from them. A separate evaluation harness scores answers with
//! LLM-as-judge metrics.
//!
//! # Quick Start
//!
//! ```no_run
//! use syllabus_buddy::{Config, Department, LlmClient, QueryPipeline};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let client = Arc::new(LlmClient::new(config.llm.clone()));
//!     let pipeline = QueryPipeline::new(client.clone(), client, config.store.prefix.clone())
//!         .with_top_k(config.store.top_k);
//!
//!     let answer = pipeline
//!         .query("what are the prerequisites for software engineering?", Department::Cse)
//!         .await?;
//!
//!     println!("{}", answer.formatted_response());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Department**: the six departments and their store paths
//! - **LlmClient**: OpenAI-compatible client for chat and embeddings
//! - **VectorStore**: flat persisted store with cosine top-k search
//! - **QueryPipeline**: retrieval, prompt assembly and generation
//! - **eval**: judge model, metrics and the syllabus test cases

pub mod chunking;
pub mod config;
pub mod department;
pub mod embedding;
pub mod error;
pub mod eval;
pub mod ingest;
pub mod llm;
pub mod rag;
pub mod store;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use department::Department;
pub use embedding::Embedder;
pub use error::{Result, SyllabusError};
pub use llm::{Generator, LlmClient};
pub use rag::{QueryPipeline, RagAnswer, assemble_context, format_prompt};
pub use store::{ScoredChunk, VectorStore};
