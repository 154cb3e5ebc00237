//! Query pipeline: retrieve syllabus chunks for a department and ask the
//! model to answer from them.

use crate::department::Department;
use crate::embedding::Embedder;
use crate::error::{Result, SyllabusError};
use crate::llm::{Generator, Prompts, fill};
use crate::store::{ScoredChunk, VectorStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Separator placed between retrieved chunks in the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Number of chunks retrieved per question unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 5;

/// Substitute the context and question into the answer template.
pub fn format_prompt(context: &str, question: &str) -> String {
    fill(
        Prompts::syllabus_answer(),
        &[("context", context), ("question", question)],
    )
}

/// Join retrieved chunk texts into one context block.
pub fn assemble_context(results: &[ScoredChunk]) -> String {
    results
        .iter()
        .map(|r| r.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// An answer together with what it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    /// Raw model response.
    pub response_text: String,
    /// Ids of the retrieved chunks, best match first.
    pub sources: Vec<Option<String>>,
    /// The context block the model was given.
    pub context: String,
}

impl RagAnswer {
    /// One-string rendering of the answer and its sources.
    pub fn formatted_response(&self) -> String {
        format!(
            "Response: {}\n\nSources: {:?}",
            self.response_text, self.sources
        )
    }
}

/// Embeds a question, searches a department store and generates an answer.
#[derive(Clone)]
pub struct QueryPipeline {
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    store_prefix: String,
    top_k: usize,
}

impl QueryPipeline {
    /// Create a pipeline reading stores under `store_prefix`.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        store_prefix: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            generator,
            store_prefix: store_prefix.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set the number of chunks retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer a question from the given department's syllabus store.
    pub async fn query(&self, question: &str, department: Department) -> Result<RagAnswer> {
        if question.trim().is_empty() {
            return Err(SyllabusError::EmptyQuery);
        }

        let store_path = department.store_path(&self.store_prefix);
        let store = VectorStore::load(&store_path)?;

        let query_embedding = self.embedder.embed(question).await?;
        let results = store.similarity_search_with_score(&query_embedding, self.top_k)?;
        info!(
            department = department.code(),
            retrieved = results.len(),
            "retrieved syllabus chunks"
        );

        let context = assemble_context(&results);
        let prompt = format_prompt(&context, question);

        let response_text = self.generator.generate(&prompt).await?;
        info!(model = self.generator.model_name(), "generated answer");

        let sources = results.into_iter().map(|r| r.metadata.id).collect();

        Ok(RagAnswer {
            response_text,
            sources,
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ChunkMetadata, SaveFormat, StoredChunk};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Embeds every text as a fixed vector.
    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| self.0.clone()).collect())
        }
    }

    /// Records the prompt and answers with a canned string.
    #[derive(Default)]
    struct RecordingGenerator {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Generator for RecordingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("Electrochemistry and corrosion.".to_string())
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    fn build_store(dir: &std::path::Path, chunks: usize) {
        let mut store = VectorStore::new("fixed");
        for i in 0..chunks {
            store
                .add(StoredChunk {
                    content: format!("UNIT {} content", i),
                    metadata: ChunkMetadata {
                        id: Some(format!("chem.txt:{}", i)),
                        source: "chem.txt".to_string(),
                        chunk_index: i,
                    },
                    embedding: vec![1.0, i as f32],
                })
                .unwrap();
        }
        store.save(dir, SaveFormat::Bincode).unwrap();
    }

    fn pipeline(prefix: &str, generator: Arc<RecordingGenerator>) -> QueryPipeline {
        QueryPipeline::new(Arc::new(FixedEmbedder(vec![1.0, 0.0])), generator, prefix)
    }

    #[test]
    fn test_format_prompt_substitutes_exactly() {
        let prompt = format_prompt("CTX {question}", "What is in unit 3?");
        let expected = "
You are a helpful assistant that helps students by giving answers to syllabus-related queries.
You are given a context below. Give an answer to the question below using only information from this context.

CTX {question}

---

Answer the question based on the above context: What is in unit 3?
";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn test_assemble_context_joins_with_separator() {
        let chunk = |text: &str| ScoredChunk {
            content: text.to_string(),
            metadata: ChunkMetadata {
                id: None,
                source: "s".to_string(),
                chunk_index: 0,
            },
            score: 1.0,
        };
        assert_eq!(
            assemble_context(&[chunk("one"), chunk("two")]),
            "one\n\n---\n\ntwo"
        );
        assert_eq!(assemble_context(&[]), "");
    }

    #[test]
    fn test_formatted_response() {
        let answer = RagAnswer {
            response_text: "Books".to_string(),
            sources: vec![Some("ai.txt:0".to_string()), None],
            context: String::new(),
        };
        assert_eq!(
            answer.formatted_response(),
            "Response: Books\n\nSources: [Some(\"ai.txt:0\"), None]"
        );
    }

    #[tokio::test]
    async fn test_query_caps_sources_at_top_k() {
        let dir = TempDir::new().unwrap();
        let prefix = format!("{}/chromadb_", dir.path().display());
        build_store(&Department::Cse.store_path(&prefix), 8);

        let generator = Arc::new(RecordingGenerator::default());
        let answer = pipeline(&prefix, generator.clone())
            .query("what is in unit 3?", Department::Cse)
            .await
            .unwrap();

        assert_eq!(answer.sources.len(), DEFAULT_TOP_K);
        assert_eq!(answer.sources[0].as_deref(), Some("chem.txt:0"));
        assert_eq!(answer.response_text, "Electrochemistry and corrosion.");
        assert_eq!(answer.context.matches(CONTEXT_SEPARATOR).count(), 4);

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains(&answer.context));
        assert!(prompts[0].ends_with("context: what is in unit 3?\n"));
    }

    #[tokio::test]
    async fn test_query_small_store_returns_all() {
        let dir = TempDir::new().unwrap();
        let prefix = format!("{}/chromadb_", dir.path().display());
        build_store(&Department::Ds.store_path(&prefix), 2);

        let answer = pipeline(&prefix, Arc::new(RecordingGenerator::default()))
            .query("books?", Department::Ds)
            .await
            .unwrap();
        assert_eq!(answer.sources.len(), 2);
    }

    #[tokio::test]
    async fn test_query_rejects_empty_question() {
        let generator = Arc::new(RecordingGenerator::default());
        let result = pipeline("unused_", generator.clone())
            .query("   ", Department::It)
            .await;

        assert!(matches!(result, Err(SyllabusError::EmptyQuery)));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_missing_store() {
        let dir = TempDir::new().unwrap();
        let prefix = format!("{}/chromadb_", dir.path().display());

        let result = pipeline(&prefix, Arc::new(RecordingGenerator::default()))
            .query("anything", Department::Ece)
            .await;
        assert!(matches!(result, Err(SyllabusError::StoreNotFound(_))));
    }
}
