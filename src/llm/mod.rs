//! LLM integration module.
//!
//! Provides an OpenAI-compatible client for chat and embedding calls and
//! the prompts used for answering and judging.

mod client;
mod prompts;

pub use client::{Generator, LlmClient, LlmResponse, Message, Role, TokenUsage};
pub use prompts::{Prompts, fill};
