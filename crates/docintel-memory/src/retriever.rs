use docintel_llm::EmbeddingProvider;

use crate::document::Chunk;
use crate::error::MemoryError;
use crate::index::{EmbeddingIndex, ScoredChunk};

/// Embeds chunks into an [`EmbeddingIndex`] and answers similarity queries against it.
pub struct Retriever<E> {
    embedder: E,
    index: EmbeddingIndex,
}

impl<E: std::fmt::Debug> std::fmt::Debug for Retriever<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("embedder", &self.embedder)
            .field("index", &self.index)
            .finish()
    }
}

impl<E: EmbeddingProvider> Retriever<E> {
    #[must_use]
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            index: EmbeddingIndex::new(),
        }
    }

    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    /// Embed `chunks` in one batch and replace the index with them.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding fails; the previous index is left intact.
    pub async fn index(&mut self, chunks: Vec<Chunk>) -> Result<usize, MemoryError> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = if texts.is_empty() {
            Vec::new()
        } else {
            self.embedder.embed_batch(&texts).await?
        };

        let count = self.index.replace(chunks, vectors)?;
        tracing::info!(
            chunks = count,
            dimension = self.index.dimension(),
            embedder = self.embedder.name(),
            "indexed document chunks"
        );
        Ok(count)
    }

    /// Best `top_k` chunks for `query`. An empty index yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be embedded.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>, MemoryError> {
        if self.index.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query).await?;
        let results = self.index.search(&query_vector, top_k)?;
        tracing::debug!(
            top_k,
            returned = results.len(),
            best = results.first().map(|r| r.score),
            "retrieved chunks"
        );
        Ok(results)
    }
}
