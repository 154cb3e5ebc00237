//! Building a department store from a directory of syllabus text files.

use crate::chunking::{ChunkConfig, chunk_text};
use crate::embedding::Embedder;
use crate::error::{Result, SyllabusError};
use crate::store::{ChunkMetadata, StoredChunk, VectorStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// File extensions picked up by ingestion.
const TEXT_EXTENSIONS: [&str; 3] = ["txt", "md", "text"];

/// Chunks sent to the embedding API per request.
const EMBED_BATCH_SIZE: usize = 32;

/// Options for an ingestion run.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub chunk_config: ChunkConfig,
    /// Drop every existing chunk before adding new ones.
    pub reset: bool,
    /// Embedding model the new vectors come from. A store holding vectors
    /// from another model is refused unless `reset` is set.
    pub embedding_model: Option<String>,
}

/// What an ingestion run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub files: usize,
    pub added: usize,
    pub skipped_existing: usize,
    pub total: usize,
}

/// Text files under `dir`, sorted for stable ids.
pub fn collect_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SyllabusError::InvalidDocumentsPath(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Chunk every document under `dir`, embed new chunks and add them to `store`.
///
/// Chunks whose id is already in the store are skipped unless `reset` is set.
/// Nothing is embedded when the store belongs to another embedding model.
pub async fn ingest_directory(
    store: &mut VectorStore,
    dir: &Path,
    embedder: &dyn Embedder,
    options: &IngestOptions,
) -> Result<IngestReport> {
    let files = collect_documents(dir)?;

    if options.reset {
        info!(removed = store.len(), "clearing existing store");
        store.clear();
    }
    if let Some(model) = &options.embedding_model {
        store.adopt_embedding_model(model)?;
    }

    let mut pending = Vec::new();
    let mut skipped_existing = 0;
    {
        let existing = store.ids();
        for path in &files {
            let text = fs::read_to_string(path).map_err(|e| SyllabusError::io(path, e))?;
            let source = path
                .strip_prefix(dir)
                .unwrap_or(path.as_path())
                .to_string_lossy()
                .replace('\\', "/");

            for chunk in chunk_text(&text, &options.chunk_config) {
                let id = format!("{}:{}", source, chunk.index);
                if existing.contains(id.as_str()) {
                    skipped_existing += 1;
                    continue;
                }
                pending.push((
                    chunk.text,
                    ChunkMetadata {
                        id: Some(id),
                        source: source.clone(),
                        chunk_index: chunk.index,
                    },
                ));
            }
        }
    }

    info!(
        files = files.len(),
        new_chunks = pending.len(),
        skipped = skipped_existing,
        "embedding chunks"
    );

    let mut added = 0;
    for batch in pending.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<&str> = batch.iter().map(|(text, _)| text.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;
        if embeddings.len() != batch.len() {
            return Err(SyllabusError::Embedding(format!(
                "expected {} embeddings, got {}",
                batch.len(),
                embeddings.len()
            )));
        }

        for ((content, metadata), embedding) in batch.iter().cloned().zip(embeddings) {
            store.add(StoredChunk {
                content,
                metadata,
                embedding,
            })?;
            added += 1;
        }
    }

    Ok(IngestReport {
        files: files.len(),
        added,
        skipped_existing,
        total: store.len(),
    })
}
