//! Per-department vector store: a flat list of embedded chunks with exact
//! cosine search, persisted to a directory.
//!
//! Supports both JSON (human-readable) and bincode (efficient binary) files.

use crate::embedding::cosine_similarity;
use crate::error::{Result, SyllabusError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filename of the binary store inside a store directory.
pub const BINARY_STORE_FILENAME: &str = "store.bin";

/// Filename of the JSON store inside a store directory.
pub const JSON_STORE_FILENAME: &str = "store.json";

/// Save format for vector stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// JSON format (human-readable, larger).
    Json,
    /// Bincode format (binary, compact).
    Bincode,
}

impl SaveFormat {
    fn filename(&self) -> &'static str {
        match self {
            SaveFormat::Json => JSON_STORE_FILENAME,
            SaveFormat::Bincode => BINARY_STORE_FILENAME,
        }
    }
}

/// Where a chunk came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Stable chunk id, `<source>:<chunk index>`.
    pub id: Option<String>,
    /// Source file, relative to the ingested directory.
    pub source: String,
    /// Position of the chunk within its source.
    pub chunk_index: usize,
}

/// An embedded chunk held by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub content: String,
    pub metadata: ChunkMetadata,
    pub embedding: Vec<f32>,
}

/// A chunk returned by a similarity search.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub content: String,
    pub metadata: ChunkMetadata,
    /// Cosine similarity to the query.
    pub score: f32,
}

/// Flat vector store for one department.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorStore {
    /// Embedding model the vectors were produced with.
    pub embedding_model: String,
    entries: Vec<StoredChunk>,
}

impl VectorStore {
    /// Create an empty store for vectors from the given model.
    pub fn new(embedding_model: impl Into<String>) -> Self {
        Self {
            embedding_model: embedding_model.into(),
            entries: Vec::new(),
        }
    }

    /// Number of chunks in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension, if any chunk is stored.
    pub fn dimension(&self) -> Option<usize> {
        self.entries.first().map(|e| e.embedding.len())
    }

    /// Get all entries.
    pub fn entries(&self) -> &[StoredChunk] {
        &self.entries
    }

    /// Ids of all stored chunks.
    pub fn ids(&self) -> HashSet<&str> {
        self.entries
            .iter()
            .filter_map(|e| e.metadata.id.as_deref())
            .collect()
    }

    /// Add a chunk. All chunks must share one embedding dimension.
    pub fn add(&mut self, chunk: StoredChunk) -> Result<()> {
        if let Some(expected) = self.dimension() {
            if chunk.embedding.len() != expected {
                return Err(SyllabusError::DimensionMismatch {
                    expected,
                    actual: chunk.embedding.len(),
                });
            }
        }
        self.entries.push(chunk);
        Ok(())
    }

    /// Remove every chunk.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Tag the store with `model`, refusing if it already holds vectors from
    /// another model.
    pub fn adopt_embedding_model(&mut self, model: &str) -> Result<()> {
        if !self.is_empty() && self.embedding_model != model {
            return Err(SyllabusError::EmbeddingModelMismatch {
                store: self.embedding_model.clone(),
                configured: model.to_string(),
            });
        }
        self.embedding_model = model.to_string();
        Ok(())
    }

    /// The `k` chunks most similar to the query vector, best first.
    pub fn similarity_search_with_score(
        &self,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        if let Some(expected) = self.dimension() {
            if query_embedding.len() != expected {
                return Err(SyllabusError::DimensionMismatch {
                    expected,
                    actual: query_embedding.len(),
                });
            }
        }

        let mut scored: Vec<(f32, &StoredChunk)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(query_embedding, &entry.embedding), entry))
            .collect();

        // NaN ranks below every real score.
        let rank = |score: f32| if score.is_nan() { f32::NEG_INFINITY } else { score };
        scored.sort_by(|a, b| rank(b.0).total_cmp(&rank(a.0)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(score, entry)| ScoredChunk {
                content: entry.content.clone(),
                metadata: entry.metadata.clone(),
                score,
            })
            .collect())
    }

    /// Load the store persisted in `dir`, preferring the binary file.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(SyllabusError::StoreNotFound(dir.to_path_buf()));
        }

        let binary = dir.join(BINARY_STORE_FILENAME);
        if binary.is_file() {
            return Self::load_with_format(&binary, SaveFormat::Bincode);
        }

        let json = dir.join(JSON_STORE_FILENAME);
        if json.is_file() {
            return Self::load_with_format(&json, SaveFormat::Json);
        }

        Err(SyllabusError::StoreNotFound(dir.to_path_buf()))
    }

    /// Load the store at `dir`, or an empty one if nothing is persisted yet.
    pub fn load_or_new(dir: &Path, embedding_model: &str) -> Result<Self> {
        match Self::load(dir) {
            Ok(store) => Ok(store),
            Err(SyllabusError::StoreNotFound(_)) => Ok(Self::new(embedding_model)),
            Err(e) => Err(e),
        }
    }

    fn load_with_format(path: &Path, format: SaveFormat) -> Result<Self> {
        let data = fs::read(path).map_err(|e| SyllabusError::io(path, e))?;

        let store: VectorStore = match format {
            SaveFormat::Json => serde_json::from_slice(&data)
                .map_err(|e| SyllabusError::Serialization(e.to_string()))?,
            SaveFormat::Bincode => {
                let config = bincode::config::standard();
                let (store, _): (VectorStore, usize) =
                    bincode::serde::decode_from_slice(&data, config)
                        .map_err(|e| SyllabusError::Serialization(e.to_string()))?;
                store
            }
        };

        debug!(path = %path.display(), chunks = store.len(), "loaded vector store");
        Ok(store)
    }

    /// Persist the store into `dir`, creating it if needed. Returns the file written.
    pub fn save(&self, dir: &Path, format: SaveFormat) -> Result<PathBuf> {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| SyllabusError::io(dir, e))?;
        }

        let data = match format {
            SaveFormat::Json => serde_json::to_vec_pretty(self)
                .map_err(|e| SyllabusError::Serialization(e.to_string()))?,
            SaveFormat::Bincode => {
                let config = bincode::config::standard();
                bincode::serde::encode_to_vec(self, config)
                    .map_err(|e| SyllabusError::Serialization(e.to_string()))?
            }
        };

        let path = dir.join(format.filename());
        fs::write(&path, &data).map_err(|e| SyllabusError::io(&path, e))?;

        // Only one format may live in a directory, or `load` would pick a stale file.
        let other = match format {
            SaveFormat::Json => dir.join(BINARY_STORE_FILENAME),
            SaveFormat::Bincode => dir.join(JSON_STORE_FILENAME),
        };
        if other.is_file() {
            fs::remove_file(&other).map_err(|e| SyllabusError::io(&other, e))?;
        }

        Ok(path)
    }
}

/// Size in bytes of the persisted store in `dir`.
pub fn store_size(dir: &Path) -> Result<u64> {
    for name in [BINARY_STORE_FILENAME, JSON_STORE_FILENAME] {
        let path = dir.join(name);
        if path.is_file() {
            let metadata = fs::metadata(&path).map_err(|e| SyllabusError::io(&path, e))?;
            return Ok(metadata.len());
        }
    }
    Err(SyllabusError::StoreNotFound(dir.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn chunk(id: &str, content: &str, embedding: Vec<f32>) -> StoredChunk {
        StoredChunk {
            content: content.to_string(),
            metadata: ChunkMetadata {
                id: Some(id.to_string()),
                source: "syllabus.txt".to_string(),
                chunk_index: 0,
            },
            embedding,
        }
    }

    fn create_test_store() -> VectorStore {
        let mut store = VectorStore::new("test-embedding");
        store
            .add(chunk("a:0", "Unit I: Thermodynamics", vec![1.0, 0.0, 0.0]))
            .unwrap();
        store
            .add(chunk("a:1", "Unit III: Electrochemistry", vec![0.0, 1.0, 0.0]))
            .unwrap();
        store
            .add(chunk("a:2", "Unit IV: Polymers", vec![0.6, 0.8, 0.0]))
            .unwrap();
        store
    }

    #[test]
    fn test_search_orders_by_score() {
        let store = create_test_store();
        let results = store
            .similarity_search_with_score(&[0.0, 1.0, 0.0], 2)
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].metadata.id.as_deref(), Some("a:1"));
        assert_eq!(results[1].metadata.id.as_deref(), Some("a:2"));
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn test_search_returns_at_most_store_size() {
        let store = create_test_store();
        let results = store
            .similarity_search_with_score(&[1.0, 0.0, 0.0], 5)
            .unwrap();
        assert_eq!(results.len(), 3);

        let empty = VectorStore::new("test-embedding");
        assert!(
            empty
                .similarity_search_with_score(&[1.0, 0.0], 5)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_adopt_embedding_model() {
        let mut store = create_test_store();
        assert!(store.adopt_embedding_model("test-embedding").is_ok());
        assert!(matches!(
            store.adopt_embedding_model("text-embedding-004"),
            Err(SyllabusError::EmbeddingModelMismatch { .. })
        ));
        assert_eq!(store.embedding_model, "test-embedding");

        store.clear();
        store.adopt_embedding_model("text-embedding-004").unwrap();
        assert_eq!(store.embedding_model, "text-embedding-004");
    }

    #[test]
    fn test_search_ranks_nan_scores_last() {
        let mut store = VectorStore::new("test-embedding");
        store
            .add(chunk("n:0", "corrupt", vec![f32::NAN, 0.0, 0.0]))
            .unwrap();
        store
            .add(chunk("n:1", "Unit II: Water", vec![0.0, 1.0, 0.0]))
            .unwrap();
        store
            .add(chunk("n:2", "Unit V: Fuels", vec![1.0, 1.0, 0.0]))
            .unwrap();

        let results = store
            .similarity_search_with_score(&[0.0, 1.0, 0.0], 3)
            .unwrap();
        let ids: Vec<_> = results
            .iter()
            .map(|r| r.metadata.id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, vec!["n:1", "n:2", "n:0"]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut store = create_test_store();
        assert!(matches!(
            store.add(chunk("b:0", "x", vec![1.0])),
            Err(SyllabusError::DimensionMismatch {
                expected: 3,
                actual: 1
            })
        ));
        assert!(store.similarity_search_with_score(&[1.0], 1).is_err());
    }

    #[test]
    fn test_save_and_load_bincode() {
        let dir = TempDir::new().unwrap();
        let store_dir = dir.path().join("chromadb_cse");

        let original = create_test_store();
        original.save(&store_dir, SaveFormat::Bincode).unwrap();

        let loaded = VectorStore::load(&store_dir).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.embedding_model, "test-embedding");
        assert_eq!(loaded.entries()[1].content, "Unit III: Electrochemistry");
        assert!(store_size(&store_dir).unwrap() > 0);
    }

    #[test]
    fn test_save_json_replaces_binary() {
        let dir = TempDir::new().unwrap();
        let store_dir = dir.path().join("chromadb_it");

        let mut store = create_test_store();
        store.save(&store_dir, SaveFormat::Bincode).unwrap();
        store.clear();
        let path = store.save(&store_dir, SaveFormat::Json).unwrap();

        assert!(path.ends_with(JSON_STORE_FILENAME));
        assert!(!store_dir.join(BINARY_STORE_FILENAME).exists());
        assert!(VectorStore::load(&store_dir).unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_directory() {
        let result = VectorStore::load(Path::new("/nonexistent/chromadb_ds"));
        assert!(matches!(result, Err(SyllabusError::StoreNotFound(_))));
    }

    #[test]
    fn test_load_or_new_on_empty_directory() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::load_or_new(dir.path(), "m").unwrap();
        assert!(store.is_empty());
        assert_eq!(store.embedding_model, "m");
    }

    #[test]
    fn test_ids() {
        let store = create_test_store();
        let ids = store.ids();
        assert!(ids.contains("a:0"));
        assert_eq!(ids.len(), 3);
    }
}
