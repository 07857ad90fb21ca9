use crate::document::Chunk;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("got {vectors} vectors for {chunks} chunks")]
    LengthMismatch { chunks: usize, vectors: usize },

    #[error("vector dimension {actual} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

struct StoredChunk {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// Chunk vectors for the current document, kept in chunk order.
#[derive(Default)]
pub struct EmbeddingIndex {
    entries: Vec<StoredChunk>,
    dimension: usize,
}

impl std::fmt::Debug for EmbeddingIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingIndex")
            .field("len", &self.entries.len())
            .field("dimension", &self.dimension)
            .finish()
    }
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl EmbeddingIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole index. On error the previous content is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if `vectors` does not pair 1:1 with `chunks` or the
    /// vectors disagree on dimensionality.
    pub fn replace(&mut self, chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<usize, IndexError> {
        if chunks.len() != vectors.len() {
            return Err(IndexError::LengthMismatch {
                chunks: chunks.len(),
                vectors: vectors.len(),
            });
        }
        let dimension = vectors.first().map_or(0, Vec::len);
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(IndexError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }

        self.entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| StoredChunk { chunk, vector })
            .collect();
        self.dimension = dimension;
        Ok(self.entries.len())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Top `limit` chunks by cosine similarity, best first. Equal scores keep
    /// chunk order; a NaN score ranks last as negative infinity.
    ///
    /// # Errors
    ///
    /// Returns an error if `query` has a different dimension than the stored vectors.
    pub fn search(&self, query: &[f32], limit: usize) -> Result<Vec<ScoredChunk>, IndexError> {
        if self.entries.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let score = cosine_similarity(query, &e.vector);
                (i, if score.is_nan() { f32::NEG_INFINITY } else { score })
            })
            .collect();

        // sort_by is stable, so ties stay in chunk order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(i, score)| ScoredChunk {
                chunk: self.entries[i].chunk.clone(),
                score,
            })
            .collect())
    }
}
