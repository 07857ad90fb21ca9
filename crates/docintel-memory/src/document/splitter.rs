use super::error::DocumentError;
use super::types::{Chunk, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitterConfig {
    /// Window length in words.
    pub chunk_size: usize,
    /// Words shared between consecutive windows.
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Fixed-size sliding window over whitespace-delimited words.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidChunking`] when `chunk_size <= chunk_overlap`,
    /// since the window would never advance.
    pub fn new(config: SplitterConfig) -> Result<Self, DocumentError> {
        if config.chunk_size <= config.chunk_overlap {
            return Err(DocumentError::InvalidChunking {
                chunk_size: config.chunk_size,
                chunk_overlap: config.chunk_overlap,
            });
        }
        Ok(Self { config })
    }

    /// Number of words the window advances by; always at least one.
    #[must_use]
    pub fn step(&self) -> usize {
        self.config.chunk_size - self.config.chunk_overlap
    }

    #[must_use]
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        split_words(&document.content, self.config.chunk_size, self.step())
            .into_iter()
            .enumerate()
            .map(|(i, content)| Chunk {
                content,
                metadata: document.metadata.clone(),
                chunk_index: i,
            })
            .collect()
    }
}

fn split_words(text: &str, chunk_size: usize, step: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut chunks = Vec::with_capacity(words.len().div_ceil(step));
    let mut start = 0;

    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        start += step;
    }

    chunks
}
